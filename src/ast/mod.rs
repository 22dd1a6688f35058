//! Abstract Syntax Tree (AST) representation for Java--
//!
//! The parser hands over a tree of kind-tagged nodes with string attributes.
//! Nodes live in an arena ([`Ast`]) and are addressed by stable [`NodeId`]
//! indices; the optimizer replaces subtrees by rewiring a parent's child slot.

mod builder;
mod json;
mod nodes;
mod ops;
mod printer;
mod visitor;

pub use builder::*;
pub use json::*;
pub use nodes::*;
pub use ops::*;
pub use printer::*;
pub use visitor::*;

use std::fmt;
use thiserror::Error;

/// Structural problems with a tree handed to the core
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AstError {
    #[error("node {node} ({kind}) has no child at index {index}")]
    MissingChild { node: NodeId, kind: NodeKind, index: usize },
    #[error("node {node} ({kind}) has no attribute '{attr}'")]
    MissingAttribute { node: NodeId, kind: NodeKind, attr: String },
    #[error("node {node}: expected {expected}, found {found}")]
    UnexpectedKind { node: NodeId, expected: NodeKind, found: NodeKind },
    #[error("node {node} ({kind}) is not allowed here")]
    UnexpectedNode { node: NodeId, kind: NodeKind },
    #[error("node {0} has no parent")]
    Detached(NodeId),
    #[error("unknown node kind '{0}'")]
    UnknownKind(String),
    #[error("invalid integer literal '{0}'")]
    InvalidLiteral(String),
}

pub type AstResult<T> = Result<T, AstError>;

/// Source location information
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Location {
    pub line: u32,
    pub column: u32,
}

impl Location {
    pub fn new(line: u32, column: u32) -> Self {
        Self { line, column }
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

/// Stable index of a node inside its [`Ast`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub usize);

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Arena holding a whole compilation unit
#[derive(Debug, Clone, PartialEq)]
pub struct Ast {
    nodes: Vec<Node>,
    root: NodeId,
}

impl Ast {
    /// Wrap an arena whose parent links are already consistent.
    pub(crate) fn from_parts(nodes: Vec<Node>, root: NodeId) -> Self {
        Self { nodes, root }
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.0]
    }

    pub fn kind(&self, id: NodeId) -> NodeKind {
        self.node(id).kind
    }

    pub fn location(&self, id: NodeId) -> Location {
        self.node(id).location
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        &self.node(id).children
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.node(id).parent
    }

    pub fn attr(&self, id: NodeId, key: &str) -> Option<&str> {
        self.node(id).attr(key)
    }

    pub fn flag(&self, id: NodeId, key: &str) -> bool {
        self.node(id).flag(key)
    }

    /// Attribute lookup that treats absence as a malformed tree
    pub fn require_attr(&self, id: NodeId, key: &str) -> AstResult<&str> {
        self.attr(id, key).ok_or_else(|| AstError::MissingAttribute {
            node: id,
            kind: self.kind(id),
            attr: key.to_string(),
        })
    }

    pub fn child(&self, id: NodeId, index: usize) -> AstResult<NodeId> {
        self.children(id)
            .get(index)
            .copied()
            .ok_or(AstError::MissingChild { node: id, kind: self.kind(id), index })
    }

    pub fn children_of_kind(&self, id: NodeId, kind: NodeKind) -> impl Iterator<Item = NodeId> + '_ {
        self.children(id).iter().copied().filter(move |c| self.kind(*c) == kind)
    }

    pub fn first_child_of_kind(&self, id: NodeId, kind: NodeKind) -> Option<NodeId> {
        self.children_of_kind(id, kind).next()
    }

    /// All nodes below `id` in pre-order, excluding `id` itself
    pub fn descendants(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack: Vec<NodeId> = self.children(id).iter().rev().copied().collect();
        while let Some(next) = stack.pop() {
            out.push(next);
            stack.extend(self.children(next).iter().rev().copied());
        }
        out
    }

    /// Closest ancestor (excluding `id`) of the given kind
    pub fn ancestor_of_kind(&self, id: NodeId, kind: NodeKind) -> Option<NodeId> {
        let mut current = self.parent(id);
        while let Some(node) = current {
            if self.kind(node) == kind {
                return Some(node);
            }
            current = self.parent(node);
        }
        None
    }

    /// Index of `id` inside its parent's child list
    pub fn index_in_parent(&self, id: NodeId) -> Option<usize> {
        let parent = self.parent(id)?;
        self.children(parent).iter().position(|c| *c == id)
    }

    /// The class declaration of the compilation unit
    pub fn class_decl(&self) -> AstResult<NodeId> {
        if self.kind(self.root) == NodeKind::ClassDecl {
            return Ok(self.root);
        }
        self.first_child_of_kind(self.root, NodeKind::ClassDecl)
            .ok_or(AstError::UnexpectedKind {
                node: self.root,
                expected: NodeKind::ClassDecl,
                found: self.kind(self.root),
            })
    }

    /// Add a detached node to the arena
    pub fn add_node(&mut self, node: Node) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(node);
        id
    }

    /// Append `child` to `parent`'s children and fix the parent link
    pub fn push_child(&mut self, parent: NodeId, child: NodeId) {
        self.nodes[parent.0].children.push(child);
        self.nodes[child.0].parent = Some(parent);
    }

    /// Replace `old` with `new` in `old`'s parent.
    ///
    /// `old` stays in the arena, detached. Node ids of everything else are
    /// untouched.
    pub fn replace(&mut self, old: NodeId, new: NodeId) -> AstResult<()> {
        let parent = self.parent(old).ok_or(AstError::Detached(old))?;
        let slot = self
            .index_in_parent(old)
            .ok_or(AstError::Detached(old))?;
        self.nodes[parent.0].children[slot] = new;
        self.nodes[new.0].parent = Some(parent);
        self.nodes[old.0].parent = None;
        Ok(())
    }

    /// Deep-copy the subtree at `id` into fresh, detached arena nodes
    pub fn clone_subtree(&mut self, id: NodeId) -> NodeId {
        let mut copy = self.node(id).clone();
        let children = std::mem::take(&mut copy.children);
        copy.parent = None;
        let new_id = self.add_node(copy);
        for child in children {
            let child_copy = self.clone_subtree(child);
            self.push_child(new_id, child_copy);
        }
        new_id
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::symtab::Type;

    fn sample() -> (Ast, NodeId, NodeId) {
        let mut b = AstBuilder::new();
        let lhs = b.int_lit(2, 3);
        let rhs = b.int_lit(3, 3);
        let sum = b.binary("+", lhs, rhs, 3);
        let assign = b.assign("x", sum, 3);
        let x = b.var_decl("x", Type::int(), 2);
        let method = b.method("f", Type::void(), vec![], vec![x, assign], 1);
        let class = b.class("A", None, vec![method], 1);
        let ast = b.program(&[], class);
        (ast, sum, assign)
    }

    #[test]
    fn replace_rewires_parent_slot() {
        let (mut ast, sum, assign) = sample();
        let five = ast.add_node(Node::new(NodeKind::IntLiteral, Location::new(3, 1)).with_attr("value", "5"));
        ast.replace(sum, five).unwrap();
        assert_eq!(ast.children(assign), &[five]);
        assert_eq!(ast.parent(five), Some(assign));
        assert_eq!(ast.parent(sum), None);
        assert_eq!(ast.replace(sum, five), Err(AstError::Detached(sum)));
    }

    #[test]
    fn descendants_are_preorder() {
        let (ast, sum, assign) = sample();
        let all = ast.descendants(assign);
        assert_eq!(all[0], sum);
        assert_eq!(all.len(), 3);
        assert_eq!(ast.ancestor_of_kind(sum, NodeKind::MethodDecl).map(|m| ast.kind(m)), Some(NodeKind::MethodDecl));
    }

    #[test]
    fn missing_child_is_reported() {
        let (ast, _, assign) = sample();
        assert!(matches!(ast.child(assign, 3), Err(AstError::MissingChild { index: 3, .. })));
        assert!(ast.require_attr(assign, "op").is_err());
    }
}

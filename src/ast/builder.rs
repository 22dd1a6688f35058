//! Bottom-up construction of [`Ast`] values.
//!
//! Used by the JSON loader and by tests in place of the external parser.
//! Children are created first and handed to their parent's constructor,
//! which links them.

use super::{Ast, Location, Node, NodeId, NodeKind};
use crate::symtab::Type;

#[derive(Debug, Default)]
pub struct AstBuilder {
    nodes: Vec<Node>,
}

impl AstBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a node with explicit attributes and children
    pub fn raw(
        &mut self,
        kind: NodeKind,
        location: Location,
        attrs: &[(&str, &str)],
        children: Vec<NodeId>,
    ) -> NodeId {
        let mut node = Node::new(kind, location);
        for (key, value) in attrs {
            node.attrs.insert((*key).to_string(), (*value).to_string());
        }
        let id = NodeId(self.nodes.len());
        self.nodes.push(node);
        self.attach(id, children);
        id
    }

    fn make(&mut self, kind: NodeKind, line: u32, attrs: &[(&str, &str)], children: Vec<NodeId>) -> NodeId {
        self.raw(kind, Location::new(line, 1), attrs, children)
    }

    pub fn attach(&mut self, parent: NodeId, children: Vec<NodeId>) {
        for child in children {
            self.nodes[child.0].parent = Some(parent);
            self.nodes[parent.0].children.push(child);
        }
    }

    pub fn set_column(&mut self, id: NodeId, column: u32) {
        self.nodes[id.0].location.column = column;
    }

    /// Finish with a `Program` root holding the imports and the class
    pub fn program(mut self, imports: &[&str], class: NodeId) -> Ast {
        let mut children = Vec::with_capacity(imports.len() + 1);
        for path in imports {
            children.push(self.make(NodeKind::ImportDecl, 1, &[("name", *path)], vec![]));
        }
        children.push(class);
        let root = self.make(NodeKind::Program, 1, &[], children);
        Ast::from_parts(self.nodes, root)
    }

    /// Finish with an arbitrary root
    pub fn finish(self, root: NodeId) -> Ast {
        Ast::from_parts(self.nodes, root)
    }

    // Declarations

    pub fn type_node(&mut self, ty: &Type, varargs: bool, line: u32) -> NodeId {
        let is_array = if ty.is_array { "true" } else { "false" };
        let is_varargs = if varargs { "true" } else { "false" };
        self.make(
            NodeKind::Type,
            line,
            &[("name", ty.name.as_str()), ("isArray", is_array), ("isVarargs", is_varargs)],
            vec![],
        )
    }

    pub fn class(&mut self, name: &str, extends: Option<&str>, members: Vec<NodeId>, line: u32) -> NodeId {
        match extends {
            Some(parent) => self.make(NodeKind::ClassDecl, line, &[("name", name), ("extends", parent)], members),
            None => self.make(NodeKind::ClassDecl, line, &[("name", name)], members),
        }
    }

    pub fn var_decl(&mut self, name: &str, ty: Type, line: u32) -> NodeId {
        let ty = self.type_node(&ty, false, line);
        self.make(NodeKind::VarDecl, line, &[("name", name)], vec![ty])
    }

    /// `int... name` in a plain declaration (rejected by the varargs check)
    pub fn varargs_var_decl(&mut self, name: &str, line: u32) -> NodeId {
        let ty = self.type_node(&Type::int_array(), true, line);
        self.make(NodeKind::VarDecl, line, &[("name", name)], vec![ty])
    }

    pub fn param(&mut self, name: &str, ty: Type, line: u32) -> NodeId {
        let ty = self.type_node(&ty, false, line);
        self.make(NodeKind::Param, line, &[("name", name)], vec![ty])
    }

    /// `int... name`
    pub fn varargs_param(&mut self, name: &str, line: u32) -> NodeId {
        let ty = self.type_node(&Type::int_array(), true, line);
        self.make(NodeKind::Param, line, &[("name", name)], vec![ty])
    }

    fn method_with(
        &mut self,
        name: &str,
        return_type: Type,
        params: Vec<NodeId>,
        body: Vec<NodeId>,
        is_static: bool,
        line: u32,
    ) -> NodeId {
        let ret = self.type_node(&return_type, false, line);
        let mut children = vec![ret];
        children.extend(params);
        children.extend(body);
        let is_static = if is_static { "true" } else { "false" };
        self.make(
            NodeKind::MethodDecl,
            line,
            &[("name", name), ("isStatic", is_static), ("isPublic", "true")],
            children,
        )
    }

    /// Public instance method; `body` holds var decls followed by statements
    pub fn method(&mut self, name: &str, return_type: Type, params: Vec<NodeId>, body: Vec<NodeId>, line: u32) -> NodeId {
        self.method_with(name, return_type, params, body, false, line)
    }

    pub fn static_method(
        &mut self,
        name: &str,
        return_type: Type,
        params: Vec<NodeId>,
        body: Vec<NodeId>,
        line: u32,
    ) -> NodeId {
        self.method_with(name, return_type, params, body, true, line)
    }

    /// `public static void main(String[] args)`
    pub fn main_method(&mut self, body: Vec<NodeId>, line: u32) -> NodeId {
        let args = self.param("args", Type::string_array(), line);
        self.method_with("main", Type::void(), vec![args], body, true, line)
    }

    // Statements

    pub fn block(&mut self, statements: Vec<NodeId>, line: u32) -> NodeId {
        self.make(NodeKind::Block, line, &[], statements)
    }

    pub fn if_else(&mut self, cond: NodeId, then: NodeId, otherwise: Option<NodeId>, line: u32) -> NodeId {
        let mut children = vec![cond, then];
        children.extend(otherwise);
        self.make(NodeKind::If, line, &[], children)
    }

    pub fn while_loop(&mut self, cond: NodeId, body: NodeId, line: u32) -> NodeId {
        self.make(NodeKind::While, line, &[], vec![cond, body])
    }

    pub fn for_loop(&mut self, init: NodeId, cond: NodeId, update: NodeId, body: NodeId, line: u32) -> NodeId {
        self.make(NodeKind::For, line, &[], vec![init, cond, update, body])
    }

    pub fn expr_stmt(&mut self, expr: NodeId, line: u32) -> NodeId {
        self.make(NodeKind::ExprStmt, line, &[], vec![expr])
    }

    pub fn assign(&mut self, name: &str, value: NodeId, line: u32) -> NodeId {
        self.make(NodeKind::Assign, line, &[("name", name)], vec![value])
    }

    pub fn array_assign(&mut self, name: &str, index: NodeId, value: NodeId, line: u32) -> NodeId {
        self.make(NodeKind::ArrayAssign, line, &[("name", name)], vec![index, value])
    }

    pub fn ret(&mut self, value: Option<NodeId>, line: u32) -> NodeId {
        self.make(NodeKind::Return, line, &[], value.into_iter().collect())
    }

    // Expressions

    pub fn binary(&mut self, op: &str, lhs: NodeId, rhs: NodeId, line: u32) -> NodeId {
        self.make(NodeKind::BinaryOp, line, &[("op", op)], vec![lhs, rhs])
    }

    pub fn unary(&mut self, op: &str, operand: NodeId, line: u32) -> NodeId {
        self.make(NodeKind::UnaryOp, line, &[("op", op)], vec![operand])
    }

    pub fn paren(&mut self, inner: NodeId, line: u32) -> NodeId {
        self.make(NodeKind::Paren, line, &[], vec![inner])
    }

    pub fn array_access(&mut self, base: NodeId, index: NodeId, line: u32) -> NodeId {
        self.make(NodeKind::ArrayAccess, line, &[], vec![base, index])
    }

    pub fn length(&mut self, base: NodeId, line: u32) -> NodeId {
        self.make(NodeKind::ArrayLength, line, &[], vec![base])
    }

    pub fn call(&mut self, receiver: NodeId, name: &str, args: Vec<NodeId>, line: u32) -> NodeId {
        let mut children = vec![receiver];
        children.extend(args);
        self.make(NodeKind::MethodCall, line, &[("name", name)], children)
    }

    pub fn new_int_array(&mut self, size: NodeId, line: u32) -> NodeId {
        self.make(NodeKind::NewIntArray, line, &[], vec![size])
    }

    pub fn new_object(&mut self, class: &str, line: u32) -> NodeId {
        self.make(NodeKind::NewObject, line, &[("name", class)], vec![])
    }

    pub fn array_lit(&mut self, elements: Vec<NodeId>, line: u32) -> NodeId {
        self.make(NodeKind::ArrayLiteral, line, &[], elements)
    }

    pub fn int_lit(&mut self, value: i32, line: u32) -> NodeId {
        let value = value.to_string();
        self.make(NodeKind::IntLiteral, line, &[("value", value.as_str())], vec![])
    }

    pub fn bool_lit(&mut self, value: bool, line: u32) -> NodeId {
        let value = if value { "true" } else { "false" };
        self.make(NodeKind::BooleanLiteral, line, &[("value", value)], vec![])
    }

    pub fn ident(&mut self, name: &str, line: u32) -> NodeId {
        self.make(NodeKind::Identifier, line, &[("name", name)], vec![])
    }

    pub fn this(&mut self, line: u32) -> NodeId {
        self.make(NodeKind::This, line, &[], vec![])
    }
}

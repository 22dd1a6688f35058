use super::{Location, NodeId};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Every node kind the parser hands over.
///
/// The set is closed; visitors match on it exhaustively.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
    // Declarations
    Program,
    ImportDecl,
    ClassDecl,
    VarDecl,
    MethodDecl,
    Param,
    Type,

    // Statements
    Block,
    If,
    While,
    For,
    ExprStmt,
    Assign,
    ArrayAssign,
    Return,

    // Expressions
    BinaryOp,
    UnaryOp,
    Paren,
    ArrayAccess,
    ArrayLength,
    MethodCall,
    NewIntArray,
    NewObject,
    ArrayLiteral,
    IntLiteral,
    BooleanLiteral,
    Identifier,
    This,
}

impl NodeKind {
    pub const ALL: [NodeKind; 28] = [
        NodeKind::Program,
        NodeKind::ImportDecl,
        NodeKind::ClassDecl,
        NodeKind::VarDecl,
        NodeKind::MethodDecl,
        NodeKind::Param,
        NodeKind::Type,
        NodeKind::Block,
        NodeKind::If,
        NodeKind::While,
        NodeKind::For,
        NodeKind::ExprStmt,
        NodeKind::Assign,
        NodeKind::ArrayAssign,
        NodeKind::Return,
        NodeKind::BinaryOp,
        NodeKind::UnaryOp,
        NodeKind::Paren,
        NodeKind::ArrayAccess,
        NodeKind::ArrayLength,
        NodeKind::MethodCall,
        NodeKind::NewIntArray,
        NodeKind::NewObject,
        NodeKind::ArrayLiteral,
        NodeKind::IntLiteral,
        NodeKind::BooleanLiteral,
        NodeKind::Identifier,
        NodeKind::This,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            NodeKind::Program => "Program",
            NodeKind::ImportDecl => "ImportDecl",
            NodeKind::ClassDecl => "ClassDecl",
            NodeKind::VarDecl => "VarDecl",
            NodeKind::MethodDecl => "MethodDecl",
            NodeKind::Param => "Param",
            NodeKind::Type => "Type",
            NodeKind::Block => "Block",
            NodeKind::If => "If",
            NodeKind::While => "While",
            NodeKind::For => "For",
            NodeKind::ExprStmt => "ExprStmt",
            NodeKind::Assign => "Assign",
            NodeKind::ArrayAssign => "ArrayAssign",
            NodeKind::Return => "Return",
            NodeKind::BinaryOp => "BinaryOp",
            NodeKind::UnaryOp => "UnaryOp",
            NodeKind::Paren => "Paren",
            NodeKind::ArrayAccess => "ArrayAccess",
            NodeKind::ArrayLength => "ArrayLength",
            NodeKind::MethodCall => "MethodCall",
            NodeKind::NewIntArray => "NewIntArray",
            NodeKind::NewObject => "NewObject",
            NodeKind::ArrayLiteral => "ArrayLiteral",
            NodeKind::IntLiteral => "IntLiteral",
            NodeKind::BooleanLiteral => "BooleanLiteral",
            NodeKind::Identifier => "Identifier",
            NodeKind::This => "This",
        }
    }

    pub fn is_statement(&self) -> bool {
        matches!(
            self,
            NodeKind::Block
                | NodeKind::If
                | NodeKind::While
                | NodeKind::For
                | NodeKind::ExprStmt
                | NodeKind::Assign
                | NodeKind::ArrayAssign
                | NodeKind::Return
        )
    }

    pub fn is_expression(&self) -> bool {
        matches!(
            self,
            NodeKind::BinaryOp
                | NodeKind::UnaryOp
                | NodeKind::Paren
                | NodeKind::ArrayAccess
                | NodeKind::ArrayLength
                | NodeKind::MethodCall
                | NodeKind::NewIntArray
                | NodeKind::NewObject
                | NodeKind::ArrayLiteral
                | NodeKind::IntLiteral
                | NodeKind::BooleanLiteral
                | NodeKind::Identifier
                | NodeKind::This
        )
    }

    pub fn is_literal(&self) -> bool {
        matches!(self, NodeKind::IntLiteral | NodeKind::BooleanLiteral)
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for NodeKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        NodeKind::ALL
            .iter()
            .copied()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| s.to_string())
    }
}

/// One node of the arena.
///
/// Attributes are plain strings; boolean attributes hold `"true"`/`"false"`.
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    pub kind: NodeKind,
    pub attrs: BTreeMap<String, String>,
    pub children: Vec<NodeId>,
    pub parent: Option<NodeId>,
    pub location: Location,
}

impl Node {
    pub fn new(kind: NodeKind, location: Location) -> Self {
        Self {
            kind,
            attrs: BTreeMap::new(),
            children: Vec::new(),
            parent: None,
            location,
        }
    }

    pub fn with_attr(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.attrs.insert(key.into(), value.into());
        self
    }

    pub fn attr(&self, key: &str) -> Option<&str> {
        self.attrs.get(key).map(String::as_str)
    }

    pub fn flag(&self, key: &str) -> bool {
        self.attr(key) == Some("true")
    }
}

use crate::ast::{Ast, AstError, AstResult, NodeId, NodeKind};
use crate::consts::{BOOLEAN_TYPE, INT_TYPE, STRING_TYPE, UNKNOWN_TYPE, VOID_TYPE};
use std::fmt;

/// Value type of the language: a name plus a single array level
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Type {
    pub name: String,
    pub is_array: bool,
}

impl Type {
    pub fn new(name: impl Into<String>, is_array: bool) -> Self {
        Self { name: name.into(), is_array }
    }

    pub fn int() -> Self {
        Self::new(INT_TYPE, false)
    }

    pub fn int_array() -> Self {
        Self::new(INT_TYPE, true)
    }

    pub fn boolean() -> Self {
        Self::new(BOOLEAN_TYPE, false)
    }

    pub fn void() -> Self {
        Self::new(VOID_TYPE, false)
    }

    pub fn string() -> Self {
        Self::new(STRING_TYPE, false)
    }

    pub fn string_array() -> Self {
        Self::new(STRING_TYPE, true)
    }

    pub fn class(name: impl Into<String>) -> Self {
        Self::new(name, false)
    }

    /// Sentinel for types that cannot be determined locally
    pub fn unknown() -> Self {
        Self::new(UNKNOWN_TYPE, false)
    }

    pub fn is_int(&self) -> bool {
        self.name == INT_TYPE && !self.is_array
    }

    pub fn is_boolean(&self) -> bool {
        self.name == BOOLEAN_TYPE && !self.is_array
    }

    pub fn is_void(&self) -> bool {
        self.name == VOID_TYPE && !self.is_array
    }

    pub fn is_unknown(&self) -> bool {
        self.name == UNKNOWN_TYPE
    }

    /// `int`, `boolean` or `void` (array-of-primitive is not primitive)
    pub fn is_primitive(&self) -> bool {
        !self.is_array && is_primitive_name(&self.name)
    }

    /// Class-typed (not primitive, not array, not the sentinel)
    pub fn is_class(&self) -> bool {
        !self.is_array && !is_primitive_name(&self.name) && !self.is_unknown()
    }

    /// Element type of an array; the type itself otherwise
    pub fn element_type(&self) -> Type {
        Type::new(self.name.clone(), false)
    }

    pub fn array_of(&self) -> Type {
        Type::new(self.name.clone(), true)
    }

    /// Read a `Type` node: returns the type and whether it is variadic
    pub fn from_node(ast: &Ast, id: NodeId) -> AstResult<(Type, bool)> {
        if ast.kind(id) != NodeKind::Type {
            return Err(AstError::UnexpectedKind {
                node: id,
                expected: NodeKind::Type,
                found: ast.kind(id),
            });
        }
        let name = ast.require_attr(id, "name")?;
        let varargs = ast.flag(id, "isVarargs");
        // varargs always denotes an array of the named element type
        let is_array = ast.flag(id, "isArray") || varargs;
        Ok((Type::new(name, is_array), varargs))
    }

    /// Type of a declaration node (`VarDecl`, `Param`, `MethodDecl`) from its `Type` child
    pub fn of_decl(ast: &Ast, decl: NodeId) -> AstResult<(Type, bool)> {
        let ty = ast
            .first_child_of_kind(decl, NodeKind::Type)
            .ok_or(AstError::MissingChild { node: decl, kind: ast.kind(decl), index: 0 })?;
        Type::from_node(ast, ty)
    }
}

fn is_primitive_name(name: &str) -> bool {
    name == INT_TYPE || name == BOOLEAN_TYPE || name == VOID_TYPE
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_array {
            write!(f, "{}[]", self.name)
        } else {
            f.write_str(&self.name)
        }
    }
}

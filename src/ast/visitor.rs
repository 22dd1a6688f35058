use super::*;
use crate::consts::ENTRY_METHOD;

/// The method a visited node belongs to.
///
/// Threaded explicitly through every visit call instead of living in
/// visitor fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MethodContext<'a> {
    pub name: &'a str,
    pub node: NodeId,
    pub is_static: bool,
}

impl<'a> MethodContext<'a> {
    pub fn of(ast: &'a Ast, method: NodeId) -> AstResult<Self> {
        let name = ast.require_attr(method, "name")?;
        Ok(Self {
            name,
            node: method,
            is_static: ast.flag(method, "isStatic") || name == ENTRY_METHOD,
        })
    }
}

/// Where the walker currently is: inside a method, or at class level
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Scope<'a> {
    pub method: Option<MethodContext<'a>>,
}

impl<'a> Scope<'a> {
    pub fn class_level() -> Self {
        Self { method: None }
    }

    pub fn method_name(&self) -> Option<&'a str> {
        self.method.map(|m| m.name)
    }

    pub fn is_static(&self) -> bool {
        self.method.map(|m| m.is_static).unwrap_or(false)
    }
}

/// AST visitor trait for traversing kind-tagged nodes.
///
/// Every hook defaults to a no-op, so a visitor only overrides the kinds it
/// is interested in. [`walk`] drives a pre-order traversal.
#[allow(unused_variables)]
pub trait AstVisitor {
    type Error: From<AstError>;

    // Declarations
    fn visit_program(&mut self, ast: &Ast, id: NodeId, scope: &Scope<'_>) -> Result<(), Self::Error> { Ok(()) }
    fn visit_import_decl(&mut self, ast: &Ast, id: NodeId, scope: &Scope<'_>) -> Result<(), Self::Error> { Ok(()) }
    fn visit_class_decl(&mut self, ast: &Ast, id: NodeId, scope: &Scope<'_>) -> Result<(), Self::Error> { Ok(()) }
    fn visit_var_decl(&mut self, ast: &Ast, id: NodeId, scope: &Scope<'_>) -> Result<(), Self::Error> { Ok(()) }
    fn visit_method_decl(&mut self, ast: &Ast, id: NodeId, scope: &Scope<'_>) -> Result<(), Self::Error> { Ok(()) }
    fn visit_param(&mut self, ast: &Ast, id: NodeId, scope: &Scope<'_>) -> Result<(), Self::Error> { Ok(()) }
    fn visit_type(&mut self, ast: &Ast, id: NodeId, scope: &Scope<'_>) -> Result<(), Self::Error> { Ok(()) }

    // Statements
    fn visit_block(&mut self, ast: &Ast, id: NodeId, scope: &Scope<'_>) -> Result<(), Self::Error> { Ok(()) }
    fn visit_if(&mut self, ast: &Ast, id: NodeId, scope: &Scope<'_>) -> Result<(), Self::Error> { Ok(()) }
    fn visit_while(&mut self, ast: &Ast, id: NodeId, scope: &Scope<'_>) -> Result<(), Self::Error> { Ok(()) }
    fn visit_for(&mut self, ast: &Ast, id: NodeId, scope: &Scope<'_>) -> Result<(), Self::Error> { Ok(()) }
    fn visit_expr_stmt(&mut self, ast: &Ast, id: NodeId, scope: &Scope<'_>) -> Result<(), Self::Error> { Ok(()) }
    fn visit_assign(&mut self, ast: &Ast, id: NodeId, scope: &Scope<'_>) -> Result<(), Self::Error> { Ok(()) }
    fn visit_array_assign(&mut self, ast: &Ast, id: NodeId, scope: &Scope<'_>) -> Result<(), Self::Error> { Ok(()) }
    fn visit_return(&mut self, ast: &Ast, id: NodeId, scope: &Scope<'_>) -> Result<(), Self::Error> { Ok(()) }

    // Expressions
    fn visit_binary_op(&mut self, ast: &Ast, id: NodeId, scope: &Scope<'_>) -> Result<(), Self::Error> { Ok(()) }
    fn visit_unary_op(&mut self, ast: &Ast, id: NodeId, scope: &Scope<'_>) -> Result<(), Self::Error> { Ok(()) }
    fn visit_paren(&mut self, ast: &Ast, id: NodeId, scope: &Scope<'_>) -> Result<(), Self::Error> { Ok(()) }
    fn visit_array_access(&mut self, ast: &Ast, id: NodeId, scope: &Scope<'_>) -> Result<(), Self::Error> { Ok(()) }
    fn visit_array_length(&mut self, ast: &Ast, id: NodeId, scope: &Scope<'_>) -> Result<(), Self::Error> { Ok(()) }
    fn visit_method_call(&mut self, ast: &Ast, id: NodeId, scope: &Scope<'_>) -> Result<(), Self::Error> { Ok(()) }
    fn visit_new_int_array(&mut self, ast: &Ast, id: NodeId, scope: &Scope<'_>) -> Result<(), Self::Error> { Ok(()) }
    fn visit_new_object(&mut self, ast: &Ast, id: NodeId, scope: &Scope<'_>) -> Result<(), Self::Error> { Ok(()) }
    fn visit_array_literal(&mut self, ast: &Ast, id: NodeId, scope: &Scope<'_>) -> Result<(), Self::Error> { Ok(()) }
    fn visit_int_literal(&mut self, ast: &Ast, id: NodeId, scope: &Scope<'_>) -> Result<(), Self::Error> { Ok(()) }
    fn visit_boolean_literal(&mut self, ast: &Ast, id: NodeId, scope: &Scope<'_>) -> Result<(), Self::Error> { Ok(()) }
    fn visit_identifier(&mut self, ast: &Ast, id: NodeId, scope: &Scope<'_>) -> Result<(), Self::Error> { Ok(()) }
    fn visit_this(&mut self, ast: &Ast, id: NodeId, scope: &Scope<'_>) -> Result<(), Self::Error> { Ok(()) }
}

/// Route one node to the hook for its kind
pub fn dispatch<V: AstVisitor + ?Sized>(
    ast: &Ast,
    id: NodeId,
    scope: &Scope<'_>,
    visitor: &mut V,
) -> Result<(), V::Error> {
    match ast.kind(id) {
        NodeKind::Program => visitor.visit_program(ast, id, scope),
        NodeKind::ImportDecl => visitor.visit_import_decl(ast, id, scope),
        NodeKind::ClassDecl => visitor.visit_class_decl(ast, id, scope),
        NodeKind::VarDecl => visitor.visit_var_decl(ast, id, scope),
        NodeKind::MethodDecl => visitor.visit_method_decl(ast, id, scope),
        NodeKind::Param => visitor.visit_param(ast, id, scope),
        NodeKind::Type => visitor.visit_type(ast, id, scope),
        NodeKind::Block => visitor.visit_block(ast, id, scope),
        NodeKind::If => visitor.visit_if(ast, id, scope),
        NodeKind::While => visitor.visit_while(ast, id, scope),
        NodeKind::For => visitor.visit_for(ast, id, scope),
        NodeKind::ExprStmt => visitor.visit_expr_stmt(ast, id, scope),
        NodeKind::Assign => visitor.visit_assign(ast, id, scope),
        NodeKind::ArrayAssign => visitor.visit_array_assign(ast, id, scope),
        NodeKind::Return => visitor.visit_return(ast, id, scope),
        NodeKind::BinaryOp => visitor.visit_binary_op(ast, id, scope),
        NodeKind::UnaryOp => visitor.visit_unary_op(ast, id, scope),
        NodeKind::Paren => visitor.visit_paren(ast, id, scope),
        NodeKind::ArrayAccess => visitor.visit_array_access(ast, id, scope),
        NodeKind::ArrayLength => visitor.visit_array_length(ast, id, scope),
        NodeKind::MethodCall => visitor.visit_method_call(ast, id, scope),
        NodeKind::NewIntArray => visitor.visit_new_int_array(ast, id, scope),
        NodeKind::NewObject => visitor.visit_new_object(ast, id, scope),
        NodeKind::ArrayLiteral => visitor.visit_array_literal(ast, id, scope),
        NodeKind::IntLiteral => visitor.visit_int_literal(ast, id, scope),
        NodeKind::BooleanLiteral => visitor.visit_boolean_literal(ast, id, scope),
        NodeKind::Identifier => visitor.visit_identifier(ast, id, scope),
        NodeKind::This => visitor.visit_this(ast, id, scope),
    }
}

/// Pre-order traversal of the whole tree
pub fn walk<V: AstVisitor + ?Sized>(ast: &Ast, visitor: &mut V) -> Result<(), V::Error> {
    walk_from(ast, ast.root(), &Scope::class_level(), visitor)
}

/// Pre-order traversal of the subtree at `id`.
///
/// Entering a `MethodDecl` switches the scope to that method for the
/// declaration itself and everything below it.
pub fn walk_from<V: AstVisitor + ?Sized>(
    ast: &Ast,
    id: NodeId,
    scope: &Scope<'_>,
    visitor: &mut V,
) -> Result<(), V::Error> {
    if ast.kind(id) == NodeKind::MethodDecl {
        let inner = Scope { method: Some(MethodContext::of(ast, id)?) };
        dispatch(ast, id, &inner, visitor)?;
        for child in ast.children(id) {
            walk_from(ast, *child, &inner, visitor)?;
        }
        return Ok(());
    }
    dispatch(ast, id, scope, visitor)?;
    for child in ast.children(id) {
        walk_from(ast, *child, scope, visitor)?;
    }
    Ok(())
}

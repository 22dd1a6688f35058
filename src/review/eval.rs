//! Structural type inference for expressions
//!
//! A pure function of the node, the current method and the symbol table.
//! Failures come back as [`EvalError`]; callers turn them into reports.

use crate::ast::{Ast, AstError, BinaryOperator, NodeId, NodeKind, OperatorFamily, UnaryOperator};
use crate::symtab::{SymbolTable, Type, VarRef};

#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum EvalError {
    #[error("undefined identifier '{0}'")]
    UndefinedIdentifier(String),
    #[error("expression of type '{0}' is not an array")]
    NotAnArray(Type),
    #[error("array initializer mixes element types '{first}' and '{other}'")]
    InconsistentArrayInitializer { first: Type, other: Type },
    #[error("unknown operator '{0}'")]
    UnknownOperator(String),
    #[error("{0} is not an expression")]
    NotAnExpression(NodeKind),
    #[error(transparent)]
    Ast(#[from] AstError),
}

pub type EvalResult<T> = Result<T, EvalError>;

#[derive(Debug, Clone, Copy)]
pub struct TypeEvaluator<'a> {
    table: &'a SymbolTable,
}

impl<'a> TypeEvaluator<'a> {
    pub fn new(table: &'a SymbolTable) -> Self {
        Self { table }
    }

    pub fn table(&self) -> &'a SymbolTable {
        self.table
    }

    /// Type of a named variable: local, parameter, field, then imported class
    pub fn variable_type(&self, method: Option<&str>, name: &str) -> EvalResult<Type> {
        match self.table.resolve(method, name) {
            VarRef::Local(s) | VarRef::Parameter(_, s) | VarRef::Field(s) => Ok(s.ty.clone()),
            VarRef::Imported(simple) => Ok(Type::class(simple)),
            VarRef::Unresolved => Err(EvalError::UndefinedIdentifier(name.to_string())),
        }
    }

    pub fn expr_type(&self, ast: &Ast, node: NodeId, method: Option<&str>) -> EvalResult<Type> {
        match ast.kind(node) {
            NodeKind::IntLiteral => Ok(Type::int()),
            NodeKind::BooleanLiteral => Ok(Type::boolean()),
            NodeKind::This => Ok(Type::class(self.table.class_name())),
            NodeKind::Paren => self.expr_type(ast, ast.child(node, 0)?, method),
            NodeKind::Identifier => self.variable_type(method, ast.require_attr(node, "name")?),
            NodeKind::NewIntArray => Ok(Type::int_array()),
            NodeKind::NewObject => Ok(Type::class(ast.require_attr(node, "name")?)),
            NodeKind::ArrayLength => Ok(Type::int()),
            NodeKind::UnaryOp => {
                let op = ast.require_attr(node, "op")?;
                match UnaryOperator::parse(op) {
                    Some(UnaryOperator::Not) => Ok(Type::boolean()),
                    Some(UnaryOperator::Neg) => Ok(Type::int()),
                    None => Err(EvalError::UnknownOperator(op.to_string())),
                }
            }
            NodeKind::BinaryOp => self.binary_type(ast, node, method),
            NodeKind::ArrayAccess => {
                let base = self.expr_type(ast, ast.child(node, 0)?, method)?;
                if base.is_unknown() {
                    Ok(base)
                } else if base.is_array {
                    Ok(base.element_type())
                } else {
                    Err(EvalError::NotAnArray(base))
                }
            }
            NodeKind::MethodCall => self.call_type(ast, node, method),
            NodeKind::ArrayLiteral => self.array_literal_type(ast, node, method),
            other => Err(EvalError::NotAnExpression(other)),
        }
    }

    fn binary_type(&self, ast: &Ast, node: NodeId, method: Option<&str>) -> EvalResult<Type> {
        let op = ast.require_attr(node, "op")?;
        let op = BinaryOperator::parse(op).ok_or_else(|| EvalError::UnknownOperator(op.to_string()))?;
        match op.family() {
            OperatorFamily::Arithmetic => Ok(Type::int()),
            OperatorFamily::Relational | OperatorFamily::Equality | OperatorFamily::Logical => Ok(Type::boolean()),
            OperatorFamily::CompoundAssign => self.expr_type(ast, ast.child(node, 0)?, method),
        }
    }

    /// Declared return type for calls on `this`/the own class; `unknown` otherwise
    fn call_type(&self, ast: &Ast, node: NodeId, method: Option<&str>) -> EvalResult<Type> {
        let receiver = ast.child(node, 0)?;
        let receiver_type = self.expr_type(ast, receiver, method)?;
        let name = ast.require_attr(node, "name")?;
        if ast.kind(receiver) == NodeKind::This || self.table.is_own_class(&receiver_type) {
            if let Some(ret) = self.table.return_type(name) {
                return Ok(ret.clone());
            }
        }
        Ok(Type::unknown())
    }

    fn array_literal_type(&self, ast: &Ast, node: NodeId, method: Option<&str>) -> EvalResult<Type> {
        let mut elements = ast.children(node).iter();
        let Some(first) = elements.next() else {
            return Ok(Type::int_array());
        };
        let first = self.expr_type(ast, *first, method)?;
        for element in elements {
            let other = self.expr_type(ast, *element, method)?;
            if other != first {
                return Err(EvalError::InconsistentArrayInitializer { first, other });
            }
        }
        Ok(first.array_of())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::AstBuilder;

    struct Fixture {
        ast: Ast,
        table: SymbolTable,
        exprs: Vec<NodeId>,
    }

    /// class A { int[] arr; int f(int a){ <exprs as expression statements> } }
    fn fixture(build: impl FnOnce(&mut AstBuilder) -> Vec<NodeId>) -> Fixture {
        let mut b = AstBuilder::new();
        let exprs = build(&mut b);
        let stmts: Vec<NodeId> = exprs.iter().map(|e| b.expr_stmt(*e, 5)).collect();
        let field = b.var_decl("arr", Type::int_array(), 2);
        let p = b.param("a", Type::int(), 3);
        let f = b.method("f", Type::int(), vec![p], stmts, 3);
        let class = b.class("A", None, vec![field, f], 1);
        let ast = b.program(&["io"], class);
        let table = SymbolTable::build(&ast).unwrap();
        Fixture { ast, table, exprs }
    }

    fn types_of(fx: &Fixture) -> Vec<EvalResult<Type>> {
        let eval = TypeEvaluator::new(&fx.table);
        fx.exprs.iter().map(|e| eval.expr_type(&fx.ast, *e, Some("f"))).collect()
    }

    #[test]
    fn operator_families() {
        let fx = fixture(|b| {
            let a = b.ident("a", 5);
            let one = b.int_lit(1, 5);
            let add = b.binary("+", a, one, 5);
            let a2 = b.ident("a", 5);
            let two = b.int_lit(2, 5);
            let lt = b.binary("<", a2, two, 5);
            let arr = b.ident("arr", 5);
            let three = b.int_lit(3, 5);
            let compound = b.binary("+=", arr, three, 5);
            vec![add, lt, compound]
        });
        let types = types_of(&fx);
        assert_eq!(types[0], Ok(Type::int()));
        assert_eq!(types[1], Ok(Type::boolean()));
        assert_eq!(types[2], Ok(Type::int_array()));
    }

    #[test]
    fn calls_on_this_use_declared_return_type_and_imports_are_unknown() {
        let fx = fixture(|b| {
            let this = b.this(5);
            let own = b.call(this, "f", vec![], 5);
            let io = b.ident("io", 5);
            let external = b.call(io, "println", vec![], 5);
            let this2 = b.this(5);
            let inherited = b.call(this2, "missing", vec![], 5);
            vec![own, external, inherited]
        });
        let types = types_of(&fx);
        assert_eq!(types[0], Ok(Type::int()));
        assert_eq!(types[1], Ok(Type::unknown()));
        assert_eq!(types[2], Ok(Type::unknown()));
    }

    #[test]
    fn array_rules() {
        let fx = fixture(|b| {
            let arr = b.ident("arr", 5);
            let i = b.int_lit(0, 5);
            let access = b.array_access(arr, i, 5);
            let a = b.ident("a", 5);
            let i2 = b.int_lit(0, 5);
            let bad = b.array_access(a, i2, 5);
            let empty = b.array_lit(vec![], 5);
            let one = b.int_lit(1, 5);
            let t = b.bool_lit(true, 5);
            let mixed = b.array_lit(vec![one, t], 5);
            vec![access, bad, empty, mixed]
        });
        let types = types_of(&fx);
        assert_eq!(types[0], Ok(Type::int()));
        assert_eq!(types[1], Err(EvalError::NotAnArray(Type::int())));
        assert_eq!(types[2], Ok(Type::int_array()));
        assert_eq!(
            types[3],
            Err(EvalError::InconsistentArrayInitializer { first: Type::int(), other: Type::boolean() })
        );
    }

    #[test]
    fn undefined_identifier_fails() {
        let fx = fixture(|b| vec![b.ident("ghost", 5)]);
        assert_eq!(types_of(&fx)[0], Err(EvalError::UndefinedIdentifier("ghost".into())));
    }
}

use super::{int_value, replace_with_literal, AstRewrite};
use crate::ast::{Ast, AstResult, BinaryOperator, NodeKind, OperatorFamily};
use crate::symtab::SymbolTable;

/// `x = 2 + 3` becomes `x = 5`.
///
/// Only binary nodes directly under a simple assignment with two integer
/// literal operands are folded; `/ 0` is left alone.
pub struct ConstantFolding;

impl AstRewrite for ConstantFolding {
    fn name(&self) -> &'static str {
        "constant-folding"
    }

    fn rewrite(&mut self, ast: &mut Ast, _table: &SymbolTable) -> AstResult<usize> {
        let mut folded = Vec::new();
        for id in ast.descendants(ast.root()) {
            if ast.kind(id) != NodeKind::BinaryOp {
                continue;
            }
            if ast.parent(id).map(|p| ast.kind(p)) != Some(NodeKind::Assign) {
                continue;
            }
            let Some(op) = ast.attr(id, "op").and_then(BinaryOperator::parse) else { continue };
            if op.family() != OperatorFamily::Arithmetic {
                continue;
            }
            let (lhs, rhs) = (ast.child(id, 0)?, ast.child(id, 1)?);
            if ast.kind(lhs) != NodeKind::IntLiteral || ast.kind(rhs) != NodeKind::IntLiteral {
                continue;
            }
            if let Some(value) = op.fold(int_value(ast, lhs)?, int_value(ast, rhs)?) {
                folded.push((id, value));
            }
        }

        for (id, value) in &folded {
            replace_with_literal(ast, *id, NodeKind::IntLiteral, &value.to_string())?;
        }
        Ok(folded.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::AstBuilder;
    use crate::symtab::Type;

    #[test]
    fn folds_only_under_assignment() {
        let mut b = AstBuilder::new();
        let x = b.var_decl("x", Type::int(), 2);
        let two = b.int_lit(2, 3);
        let three = b.int_lit(3, 3);
        let sum = b.binary("+", two, three, 3);
        let assign = b.assign("x", sum, 3);
        let one = b.int_lit(1, 4);
        let four = b.int_lit(4, 4);
        let returned = b.binary("+", one, four, 4);
        let ret = b.ret(Some(returned), 4);
        let f = b.method("f", Type::int(), vec![], vec![x, assign, ret], 1);
        let class = b.class("A", None, vec![f], 1);
        let mut ast = b.program(&[], class);
        let table = SymbolTable::build(&ast).unwrap();

        assert_eq!(ConstantFolding.rewrite(&mut ast, &table).unwrap(), 1);
        let value = ast.child(assign, 0).unwrap();
        assert_eq!(ast.kind(value), NodeKind::IntLiteral);
        assert_eq!(ast.attr(value, "value"), Some("5"));
        assert_eq!(ast.kind(ast.child(ret, 0).unwrap()), NodeKind::BinaryOp);

        assert_eq!(ConstantFolding.rewrite(&mut ast, &table).unwrap(), 0);
    }

    #[test]
    fn division_by_zero_is_kept() {
        let mut b = AstBuilder::new();
        let x = b.var_decl("x", Type::int(), 2);
        let seven = b.int_lit(7, 3);
        let zero = b.int_lit(0, 3);
        let div = b.binary("/", seven, zero, 3);
        let assign = b.assign("x", div, 3);
        let f = b.method("f", Type::void(), vec![], vec![x, assign], 1);
        let class = b.class("A", None, vec![f], 1);
        let mut ast = b.program(&[], class);
        let table = SymbolTable::build(&ast).unwrap();

        assert_eq!(ConstantFolding.rewrite(&mut ast, &table).unwrap(), 0);
        assert_eq!(ast.child(assign, 0).unwrap(), div);
    }
}

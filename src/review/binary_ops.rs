use super::{EvalError, ReviewContext, ReviewError, ReviewResult, SemanticPass};
use crate::ast::{walk, Ast, AstError, AstVisitor, BinaryOperator, NodeId, OperatorFamily, Scope, UnaryOperator};
use crate::report::Report;
use crate::symtab::Type;

/// Operand types of binary and unary operators
pub struct OperatorTypes;

impl SemanticPass for OperatorTypes {
    fn name(&self) -> &'static str {
        "operator-types"
    }

    fn run(&mut self, cx: &ReviewContext<'_>, reports: &mut Vec<Report>) -> ReviewResult<()> {
        walk(cx.ast, &mut Checker { cx, reports })
    }
}

struct Checker<'c, 'a> {
    cx: &'c ReviewContext<'a>,
    reports: &'c mut Vec<Report>,
}

/// `unknown` satisfies every operand requirement
fn is_plain(ty: &Type, name_check: fn(&Type) -> bool) -> bool {
    ty.is_unknown() || (!ty.is_array && name_check(ty))
}

impl AstVisitor for Checker<'_, '_> {
    type Error = AstError;

    fn visit_binary_op(&mut self, ast: &Ast, id: NodeId, scope: &Scope<'_>) -> ReviewResult<()> {
        let raw = ast.require_attr(id, "op")?;
        let Some(op) = BinaryOperator::parse(raw) else {
            self.reports.push(self.cx.error(id, EvalError::UnknownOperator(raw.to_string())));
            return Ok(());
        };
        let (lhs_node, rhs_node) = (ast.child(id, 0)?, ast.child(id, 1)?);
        let Some(lhs) = self.cx.type_or_report(lhs_node, scope, self.reports)? else { return Ok(()) };
        let Some(rhs) = self.cx.type_or_report(rhs_node, scope, self.reports)? else { return Ok(()) };

        let valid = match op.family() {
            OperatorFamily::Arithmetic | OperatorFamily::CompoundAssign => {
                if lhs.is_array || rhs.is_array {
                    self.reports.push(self.cx.error(id, ReviewError::ArrayInArithmetic(op.to_string())));
                    return Ok(());
                }
                is_plain(&lhs, Type::is_int) && is_plain(&rhs, Type::is_int)
            }
            OperatorFamily::Relational => is_plain(&lhs, Type::is_int) && is_plain(&rhs, Type::is_int),
            OperatorFamily::Logical => is_plain(&lhs, Type::is_boolean) && is_plain(&rhs, Type::is_boolean),
            OperatorFamily::Equality => lhs.is_unknown() || rhs.is_unknown() || lhs == rhs,
        };
        if !valid {
            self.reports.push(self.cx.error(id, ReviewError::InvalidOperands { op: op.to_string(), lhs, rhs }));
        }
        Ok(())
    }

    fn visit_unary_op(&mut self, ast: &Ast, id: NodeId, scope: &Scope<'_>) -> ReviewResult<()> {
        let raw = ast.require_attr(id, "op")?;
        let Some(op) = UnaryOperator::parse(raw) else {
            self.reports.push(self.cx.error(id, EvalError::UnknownOperator(raw.to_string())));
            return Ok(());
        };
        let Some(operand) = self.cx.type_or_report(ast.child(id, 0)?, scope, self.reports)? else {
            return Ok(());
        };
        let valid = match op {
            UnaryOperator::Not => is_plain(&operand, Type::is_boolean),
            UnaryOperator::Neg => is_plain(&operand, Type::is_int),
        };
        if !valid {
            self.reports.push(self.cx.error(id, ReviewError::InvalidOperand { op: op.to_string(), operand }));
        }
        Ok(())
    }
}

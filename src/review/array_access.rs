use super::{ReviewContext, ReviewError, ReviewResult, SemanticPass};
use crate::ast::{walk, Ast, AstError, AstVisitor, NodeId, Scope};
use crate::report::Report;

/// Indexed bases are arrays, indices are `int`, `.length` applies to arrays
pub struct ArrayAccess;

impl SemanticPass for ArrayAccess {
    fn name(&self) -> &'static str {
        "array-access"
    }

    fn run(&mut self, cx: &ReviewContext<'_>, reports: &mut Vec<Report>) -> ReviewResult<()> {
        walk(cx.ast, &mut Checker { cx, reports })
    }
}

struct Checker<'c, 'a> {
    cx: &'c ReviewContext<'a>,
    reports: &'c mut Vec<Report>,
}

impl AstVisitor for Checker<'_, '_> {
    type Error = AstError;

    fn visit_array_access(&mut self, ast: &Ast, id: NodeId, scope: &Scope<'_>) -> ReviewResult<()> {
        let base = ast.child(id, 0)?;
        let index = ast.child(id, 1)?;
        if let Some(ty) = self.cx.type_or_report(base, scope, self.reports)? {
            if !ty.is_array && !ty.is_unknown() {
                self.reports.push(self.cx.error(base, ReviewError::IndexedNonArray(ty)));
            }
        }
        if let Some(ty) = self.cx.type_or_report(index, scope, self.reports)? {
            if ty.is_array || !(ty.is_int() || ty.is_unknown()) {
                self.reports.push(self.cx.error(index, ReviewError::NonIntegerIndex(ty)));
            }
        }
        Ok(())
    }

    fn visit_array_length(&mut self, ast: &Ast, id: NodeId, scope: &Scope<'_>) -> ReviewResult<()> {
        let base = ast.child(id, 0)?;
        if let Some(ty) = self.cx.type_or_report(base, scope, self.reports)? {
            if !ty.is_array && !ty.is_unknown() {
                self.reports.push(self.cx.error(base, ReviewError::LengthOfNonArray(ty)));
            }
        }
        Ok(())
    }
}

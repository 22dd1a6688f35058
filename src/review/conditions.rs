use super::{ReviewContext, ReviewError, ReviewResult, SemanticPass};
use crate::ast::{walk, Ast, AstError, AstVisitor, NodeId, Scope};
use crate::report::Report;

/// `if`, `while` and `for` conditions are plain `boolean`
pub struct Conditions;

impl SemanticPass for Conditions {
    fn name(&self) -> &'static str {
        "conditions"
    }

    fn run(&mut self, cx: &ReviewContext<'_>, reports: &mut Vec<Report>) -> ReviewResult<()> {
        walk(cx.ast, &mut Checker { cx, reports })
    }
}

struct Checker<'c, 'a> {
    cx: &'c ReviewContext<'a>,
    reports: &'c mut Vec<Report>,
}

impl Checker<'_, '_> {
    fn check(&mut self, cond: NodeId, scope: &Scope<'_>) -> ReviewResult<()> {
        if let Some(ty) = self.cx.type_or_report(cond, scope, self.reports)? {
            if !ty.is_boolean() && !ty.is_unknown() {
                self.reports.push(self.cx.error(cond, ReviewError::NonBooleanCondition(ty)));
            }
        }
        Ok(())
    }
}

impl AstVisitor for Checker<'_, '_> {
    type Error = AstError;

    fn visit_if(&mut self, ast: &Ast, id: NodeId, scope: &Scope<'_>) -> ReviewResult<()> {
        self.check(ast.child(id, 0)?, scope)
    }

    fn visit_while(&mut self, ast: &Ast, id: NodeId, scope: &Scope<'_>) -> ReviewResult<()> {
        self.check(ast.child(id, 0)?, scope)
    }

    fn visit_for(&mut self, ast: &Ast, id: NodeId, scope: &Scope<'_>) -> ReviewResult<()> {
        self.check(ast.child(id, 1)?, scope)
    }
}

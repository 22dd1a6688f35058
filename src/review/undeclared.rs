use super::{ReviewContext, ReviewError, ReviewResult, SemanticPass};
use crate::ast::{walk, Ast, AstError, AstVisitor, NodeId, Scope};
use crate::report::Report;

/// Every variable reference resolves to a local, parameter, field or import
pub struct UndeclaredVariables;

impl SemanticPass for UndeclaredVariables {
    fn name(&self) -> &'static str {
        "undeclared-variables"
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
    fn check(&mut self, ast: &Ast, id: NodeId, scope: &Scope<'_>) -> ReviewResult<()> {
        let name = ast.require_attr(id, "name")?;
        if !self.cx.table.resolve(scope.method_name(), name).is_resolved() {
            self.reports.push(self.cx.error(id, ReviewError::UndeclaredVariable(name.to_string())));
        }
        Ok(())
    }
}

impl AstVisitor for Checker<'_, '_> {
    type Error = AstError;

    fn visit_identifier(&mut self, ast: &Ast, id: NodeId, scope: &Scope<'_>) -> ReviewResult<()> {
        self.check(ast, id, scope)
    }

    fn visit_assign(&mut self, ast: &Ast, id: NodeId, scope: &Scope<'_>) -> ReviewResult<()> {
        self.check(ast, id, scope)
    }

    fn visit_array_assign(&mut self, ast: &Ast, id: NodeId, scope: &Scope<'_>) -> ReviewResult<()> {
        self.check(ast, id, scope)
    }
}

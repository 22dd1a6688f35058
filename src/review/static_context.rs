use super::{ReviewContext, ReviewError, ReviewResult, SemanticPass};
use crate::ast::{walk, Ast, AstError, AstVisitor, NodeId, Scope};
use crate::report::Report;
use crate::symtab::VarRef;

/// No `this` and no instance fields inside static methods (including `main`)
pub struct StaticContext;

impl SemanticPass for StaticContext {
    fn name(&self) -> &'static str {
        "static-context"
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
    fn check_variable(&mut self, ast: &Ast, id: NodeId, scope: &Scope<'_>) -> ReviewResult<()> {
        let Some(method) = scope.method.filter(|m| m.is_static) else { return Ok(()) };
        let name = ast.require_attr(id, "name")?;
        if let VarRef::Field(field) = self.cx.table.resolve(Some(method.name), name) {
            self.reports.push(self.cx.error(
                id,
                ReviewError::FieldInStaticContext { method: method.name.to_string(), field: field.name.clone() },
            ));
        }
        Ok(())
    }
}

impl AstVisitor for Checker<'_, '_> {
    type Error = AstError;

    fn visit_this(&mut self, _ast: &Ast, id: NodeId, scope: &Scope<'_>) -> ReviewResult<()> {
        if let Some(method) = scope.method.filter(|m| m.is_static) {
            self.reports.push(self.cx.error(id, ReviewError::ThisInStaticContext(method.name.to_string())));
        }
        Ok(())
    }

    fn visit_identifier(&mut self, ast: &Ast, id: NodeId, scope: &Scope<'_>) -> ReviewResult<()> {
        self.check_variable(ast, id, scope)
    }

    fn visit_assign(&mut self, ast: &Ast, id: NodeId, scope: &Scope<'_>) -> ReviewResult<()> {
        self.check_variable(ast, id, scope)
    }

    fn visit_array_assign(&mut self, ast: &Ast, id: NodeId, scope: &Scope<'_>) -> ReviewResult<()> {
        self.check_variable(ast, id, scope)
    }
}

use super::{assignable, ReviewContext, ReviewError, ReviewResult, SemanticPass};
use crate::ast::{walk, Ast, AstError, AstVisitor, NodeId, NodeKind, Scope};
use crate::report::Report;
use crate::symtab::Type;

pub struct Assignments;

impl SemanticPass for Assignments {
    fn name(&self) -> &'static str {
        "assignments"
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
    fn target_type(&mut self, id: NodeId, name: &str, scope: &Scope<'_>) -> Option<Type> {
        match self.cx.eval.variable_type(scope.method_name(), name) {
            Ok(ty) => Some(ty),
            Err(err) => {
                self.reports.push(self.cx.error(id, err));
                None
            }
        }
    }

    fn check_value(
        &mut self,
        ast: &Ast,
        target: &str,
        expected: &Type,
        value: NodeId,
        scope: &Scope<'_>,
    ) -> ReviewResult<()> {
        // array literal placement has its own pass
        if ast.kind(value) == NodeKind::ArrayLiteral {
            return Ok(());
        }
        let Some(found) = self.cx.type_or_report(value, scope, self.reports)? else { return Ok(()) };
        if !assignable(self.cx.table, expected, &found) {
            self.reports.push(self.cx.error(
                value,
                ReviewError::IncompatibleAssignment { target: target.to_string(), expected: expected.clone(), found },
            ));
        }
        Ok(())
    }
}

impl AstVisitor for Checker<'_, '_> {
    type Error = AstError;

    fn visit_assign(&mut self, ast: &Ast, id: NodeId, scope: &Scope<'_>) -> ReviewResult<()> {
        let name = ast.require_attr(id, "name")?;
        let value = ast.child(id, 0)?;
        if let Some(expected) = self.target_type(id, name, scope) {
            self.check_value(ast, name, &expected, value, scope)?;
        }
        Ok(())
    }

    fn visit_array_assign(&mut self, ast: &Ast, id: NodeId, scope: &Scope<'_>) -> ReviewResult<()> {
        let name = ast.require_attr(id, "name")?;
        let index = ast.child(id, 0)?;
        let value = ast.child(id, 1)?;
        let Some(target) = self.target_type(id, name, scope) else { return Ok(()) };
        if !target.is_array && !target.is_unknown() {
            self.reports.push(self.cx.error(id, ReviewError::AssignToNonArray { target: name.to_string(), found: target }));
            return Ok(());
        }
        if let Some(ty) = self.cx.type_or_report(index, scope, self.reports)? {
            if !ty.is_int() && !ty.is_unknown() {
                self.reports.push(self.cx.error(index, ReviewError::NonIntegerIndex(ty)));
            }
        }
        let element = if target.is_unknown() { target } else { target.element_type() };
        self.check_value(ast, name, &element, value, scope)
    }
}

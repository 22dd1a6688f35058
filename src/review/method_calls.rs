use super::{assignable, ReviewContext, ReviewError, ReviewResult, SemanticPass};
use crate::ast::{walk, Ast, AstError, AstVisitor, NodeId, NodeKind, Scope};
use crate::report::Report;

/// Calls on the current class: the method exists (or may be inherited) and
/// the arguments fit the declared parameters.
///
/// Calls on imported or otherwise unknown receivers are not checked beyond
/// the receiver itself.
pub struct MethodCalls;

impl SemanticPass for MethodCalls {
    fn name(&self) -> &'static str {
        "method-calls"
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
    fn check_arguments(&mut self, ast: &Ast, call: NodeId, method: &str, scope: &Scope<'_>) -> ReviewResult<()> {
        let table = self.cx.table;
        let params = table.parameters(method);
        let args = &ast.children(call)[1..];
        let varargs = table.is_varargs(method);

        // with a variadic tail only the fixed prefix is matched positionally
        let fixed = if varargs { params.len() - 1 } else { params.len() };
        let count_ok = if varargs { args.len() >= fixed } else { args.len() == fixed };
        if !count_ok {
            let expected = if varargs { format!("at least {}", fixed) } else { fixed.to_string() };
            self.reports.push(self.cx.error(
                call,
                ReviewError::ArgumentCount { method: method.to_string(), expected, found: args.len() },
            ));
            return Ok(());
        }

        for (position, (arg, param)) in args.iter().zip(&params[..fixed]).enumerate() {
            // array literal placement is checked separately
            if ast.kind(*arg) == NodeKind::ArrayLiteral {
                continue;
            }
            let Some(found) = self.cx.type_or_report(*arg, scope, self.reports)? else { continue };
            if !assignable(table, &param.ty, &found) {
                self.reports.push(self.cx.error(
                    *arg,
                    ReviewError::ArgumentType {
                        method: method.to_string(),
                        position: position + 1,
                        expected: param.ty.clone(),
                        found,
                    },
                ));
            }
        }
        Ok(())
    }
}

impl AstVisitor for Checker<'_, '_> {
    type Error = AstError;

    fn visit_method_call(&mut self, ast: &Ast, id: NodeId, scope: &Scope<'_>) -> ReviewResult<()> {
        let name = ast.require_attr(id, "name")?;
        let receiver = ast.child(id, 0)?;
        let Some(receiver_type) = self.cx.type_or_report(receiver, scope, self.reports)? else {
            return Ok(());
        };

        if receiver_type.is_primitive() {
            self.reports.push(self.cx.error(
                id,
                ReviewError::CallOnPrimitive { method: name.to_string(), receiver: receiver_type },
            ));
            return Ok(());
        }

        let table = self.cx.table;
        let on_own_class = ast.kind(receiver) == NodeKind::This || table.is_own_class(&receiver_type);
        if !on_own_class {
            return Ok(());
        }
        if table.has_method(name) {
            self.check_arguments(ast, id, name, scope)
        } else {
            if !table.has_super() {
                self.reports.push(self.cx.error(id, ReviewError::UndeclaredMethod(name.to_string())));
            }
            Ok(())
        }
    }
}

use super::{methods, returnable, ReviewContext, ReviewError, ReviewResult, SemanticPass};
use crate::ast::{MethodContext, NodeKind, Scope};
use crate::report::Report;
use crate::symtab::Type;

/// Non-void methods return something compatible; void methods return nothing
pub struct Returns;

impl SemanticPass for Returns {
    fn name(&self) -> &'static str {
        "returns"
    }

    fn run(&mut self, cx: &ReviewContext<'_>, reports: &mut Vec<Report>) -> ReviewResult<()> {
        let ast = cx.ast;
        for method in methods(ast)? {
            let context = MethodContext::of(ast, method)?;
            let scope = Scope { method: Some(context) };
            let (declared, _) = Type::of_decl(ast, method)?;
            let returns: Vec<_> = ast
                .descendants(method)
                .into_iter()
                .filter(|id| ast.kind(*id) == NodeKind::Return)
                .collect();

            if !declared.is_void() && returns.is_empty() {
                reports.push(cx.error(method, ReviewError::MissingReturn(context.name.to_string())));
                continue;
            }

            for ret in returns {
                let value = ast.children(ret).first().copied();
                match value {
                    Some(_) if declared.is_void() => {
                        reports.push(cx.error(ret, ReviewError::VoidReturnWithValue(context.name.to_string())));
                    }
                    None if !declared.is_void() => {
                        reports.push(cx.error(ret, ReviewError::MissingReturnValue(context.name.to_string())));
                    }
                    Some(value) => {
                        // array literal placement has its own pass
                        if ast.kind(value) == NodeKind::ArrayLiteral {
                            continue;
                        }
                        let Some(found) = cx.type_or_report(value, &scope, reports)? else { continue };
                        if !returnable(cx.table, &declared, &found) {
                            reports.push(cx.error(
                                value,
                                ReviewError::IncompatibleReturn {
                                    method: context.name.to_string(),
                                    expected: declared.clone(),
                                    found,
                                },
                            ));
                        }
                    }
                    None => {}
                }
            }
        }
        Ok(())
    }
}

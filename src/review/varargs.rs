use super::{methods, ReviewContext, ReviewError, ReviewResult, SemanticPass};
use crate::ast::NodeKind;
use crate::report::Report;
use crate::symtab::Type;

/// Placement of `int...`: last parameter, once per method, nowhere else
pub struct Varargs;

impl SemanticPass for Varargs {
    fn name(&self) -> &'static str {
        "varargs"
    }

    fn run(&mut self, cx: &ReviewContext<'_>, reports: &mut Vec<Report>) -> ReviewResult<()> {
        let ast = cx.ast;
        for method in methods(ast)? {
            let method_name = ast.require_attr(method, "name")?;
            if Type::of_decl(ast, method)?.1 {
                reports.push(cx.error(method, ReviewError::VarargsReturnType(method_name.to_string())));
            }

            let params: Vec<_> = ast.children_of_kind(method, NodeKind::Param).collect();
            let mut variadic = Vec::new();
            for (position, param) in params.iter().enumerate() {
                if Type::of_decl(ast, *param)?.1 {
                    variadic.push((position, *param));
                }
            }
            if variadic.len() > 1 {
                reports.push(cx.error(method, ReviewError::MultipleVarargs(method_name.to_string())));
            }
            for (position, param) in variadic {
                if position + 1 != params.len() {
                    let name = ast.require_attr(param, "name")?;
                    reports.push(cx.error(
                        param,
                        ReviewError::VarargsNotLast { method: method_name.to_string(), name: name.to_string() },
                    ));
                }
            }
        }

        for decl in ast.descendants(ast.root()) {
            if ast.kind(decl) == NodeKind::VarDecl && Type::of_decl(ast, decl)?.1 {
                let name = ast.require_attr(decl, "name")?;
                reports.push(cx.error(decl, ReviewError::VarargsVariable(name.to_string())));
            }
        }
        Ok(())
    }
}

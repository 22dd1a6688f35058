use super::{ReviewContext, ReviewError, ReviewResult, SemanticPass};
use crate::ast::NodeKind;
use crate::report::Report;
use crate::symtab::Type;

pub struct VoidVariables;

impl SemanticPass for VoidVariables {
    fn name(&self) -> &'static str {
        "void-variables"
    }

    fn run(&mut self, cx: &ReviewContext<'_>, reports: &mut Vec<Report>) -> ReviewResult<()> {
        let ast = cx.ast;
        for decl in ast.descendants(ast.root()) {
            if ast.kind(decl) != NodeKind::VarDecl {
                continue;
            }
            let (ty, _) = Type::of_decl(ast, decl)?;
            if ty.is_void() {
                let name = ast.require_attr(decl, "name")?;
                reports.push(cx.error(decl, ReviewError::VoidVariable(name.to_string())));
            }
        }
        Ok(())
    }
}

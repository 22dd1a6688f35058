use super::{methods, ReviewContext, ReviewError, ReviewResult, SemanticPass};
use crate::ast::{Ast, NodeId, NodeKind};
use crate::report::Report;
use crate::symtab::simple_name;
use std::collections::HashSet;

/// Imports by simple name, fields, methods, and per-method parameters and locals
pub struct DuplicateDeclarations;

impl SemanticPass for DuplicateDeclarations {
    fn name(&self) -> &'static str {
        "duplicate-declarations"
    }

    fn run(&mut self, cx: &ReviewContext<'_>, reports: &mut Vec<Report>) -> ReviewResult<()> {
        let ast = cx.ast;
        let class = ast.class_decl()?;

        if ast.kind(ast.root()) == NodeKind::Program {
            let mut seen = HashSet::new();
            for import in ast.children_of_kind(ast.root(), NodeKind::ImportDecl) {
                let simple = simple_name(ast.require_attr(import, "name")?);
                if !seen.insert(simple) {
                    reports.push(cx.error(import, ReviewError::DuplicateImport(simple.to_string())));
                }
            }
        }

        let fields: Vec<NodeId> = ast.children_of_kind(class, NodeKind::VarDecl).collect();
        for (decl, name) in repeated(ast, &fields)? {
            reports.push(cx.error(decl, ReviewError::DuplicateField(name)));
        }

        let methods = methods(ast)?;
        for (decl, name) in repeated(ast, &methods)? {
            reports.push(cx.error(decl, ReviewError::DuplicateMethod(name)));
        }

        for method in methods {
            let method_name = ast.require_attr(method, "name")?;
            let params: Vec<NodeId> = ast.children_of_kind(method, NodeKind::Param).collect();
            for (decl, name) in repeated(ast, &params)? {
                reports.push(cx.error(decl, ReviewError::DuplicateParameter { method: method_name.to_string(), name }));
            }

            let locals: Vec<NodeId> = ast
                .descendants(method)
                .into_iter()
                .filter(|id| ast.kind(*id) == NodeKind::VarDecl)
                .collect();
            for (decl, name) in repeated(ast, &locals)? {
                reports.push(cx.error(decl, ReviewError::DuplicateLocal { method: method_name.to_string(), name }));
            }

            let param_names = params
                .iter()
                .map(|p| ast.require_attr(*p, "name"))
                .collect::<Result<HashSet<_>, _>>()?;
            for local in locals {
                let name = ast.require_attr(local, "name")?;
                if param_names.contains(name) {
                    reports.push(cx.error(
                        local,
                        ReviewError::LocalShadowsParameter { method: method_name.to_string(), name: name.to_string() },
                    ));
                }
            }
        }
        Ok(())
    }
}

/// Declarations whose `name` already appeared earlier in `decls`
fn repeated(ast: &Ast, decls: &[NodeId]) -> ReviewResult<Vec<(NodeId, String)>> {
    let mut seen = HashSet::new();
    let mut out = Vec::new();
    for decl in decls {
        let name = ast.require_attr(*decl, "name")?;
        if !seen.insert(name) {
            out.push((*decl, name.to_string()));
        }
    }
    Ok(out)
}

use super::{methods, ReviewContext, ReviewError, ReviewResult, SemanticPass};
use crate::ast::NodeKind;
use crate::report::Report;
use crate::symtab::VarRef;
use std::collections::HashMap;

/// Locals may not be read or assigned above their declaration line
pub struct DeclarationOrder;

impl SemanticPass for DeclarationOrder {
    fn name(&self) -> &'static str {
        "declaration-order"
    }

    fn run(&mut self, cx: &ReviewContext<'_>, reports: &mut Vec<Report>) -> ReviewResult<()> {
        let ast = cx.ast;
        for method in methods(ast)? {
            let method_name = ast.require_attr(method, "name")?;
            let mut declared = HashMap::new();
            let mut first_use = HashMap::new();

            for id in ast.descendants(method) {
                let line = ast.location(id).line;
                match ast.kind(id) {
                    NodeKind::VarDecl => {
                        declared.entry(ast.require_attr(id, "name")?).or_insert(line);
                    }
                    NodeKind::Identifier | NodeKind::Assign | NodeKind::ArrayAssign => {
                        let name = ast.require_attr(id, "name")?;
                        if !matches!(cx.table.resolve(Some(method_name), name), VarRef::Local(_)) {
                            continue;
                        }
                        let entry = first_use.entry(name).or_insert((line, id));
                        if line < entry.0 {
                            *entry = (line, id);
                        }
                    }
                    _ => {}
                }
            }

            let mut uses: Vec<_> = first_use.into_iter().collect();
            uses.sort_by_key(|(_, (line, id))| (*line, *id));
            for (name, (used, node)) in uses {
                let Some(&declared) = declared.get(name) else { continue };
                if used < declared {
                    reports.push(cx.error(
                        node,
                        ReviewError::UsedBeforeDeclaration { name: name.to_string(), used, declared },
                    ));
                }
            }
        }
        Ok(())
    }
}

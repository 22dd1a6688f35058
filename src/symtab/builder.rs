use super::{MethodSignature, Symbol, SymbolTable, Type};
use crate::ast::{Ast, AstResult, MethodContext, NodeId, NodeKind};
use std::collections::HashMap;

impl SymbolTable {
    /// Build the table for the compilation unit rooted at `ast.root()`.
    ///
    /// Declaration order is preserved. When a method name repeats, the first
    /// declaration's signature is kept.
    pub fn build(ast: &Ast) -> AstResult<SymbolTable> {
        let class = ast.class_decl()?;

        let imports = if ast.kind(ast.root()) == NodeKind::Program {
            ast.children_of_kind(ast.root(), NodeKind::ImportDecl)
                .map(|id| ast.require_attr(id, "name").map(str::to_string))
                .collect::<AstResult<Vec<_>>>()?
        } else {
            Vec::new()
        };

        let class_name = ast.require_attr(class, "name")?.to_string();
        let super_name = ast.attr(class, "extends").unwrap_or_default().to_string();

        let mut fields = Vec::new();
        for decl in ast.children_of_kind(class, NodeKind::VarDecl) {
            fields.push(symbol_of(ast, decl)?);
        }

        let mut methods = Vec::new();
        let mut signatures = HashMap::new();
        for method in ast.children_of_kind(class, NodeKind::MethodDecl) {
            let cx = MethodContext::of(ast, method)?;
            methods.push(cx.name.to_string());
            if signatures.contains_key(cx.name) {
                continue;
            }
            signatures.insert(cx.name.to_string(), signature_of(ast, method, cx.is_static)?);
        }

        log::debug!(
            "symbol table built: class={} fields={} methods={}",
            class_name,
            fields.len(),
            methods.len()
        );

        Ok(SymbolTable { class_name, super_name, imports, fields, methods, signatures })
    }
}

fn symbol_of(ast: &Ast, decl: NodeId) -> AstResult<Symbol> {
    let name = ast.require_attr(decl, "name")?;
    let (ty, varargs) = Type::of_decl(ast, decl)?;
    Ok(Symbol { name: name.to_string(), ty, varargs })
}

fn signature_of(ast: &Ast, method: NodeId, is_static: bool) -> AstResult<MethodSignature> {
    let (return_type, _) = Type::of_decl(ast, method)?;
    let parameters = ast
        .children_of_kind(method, NodeKind::Param)
        .map(|p| symbol_of(ast, p))
        .collect::<AstResult<Vec<_>>>()?;
    // locals may sit at the top of the body or inside nested blocks
    let locals = ast
        .descendants(method)
        .into_iter()
        .filter(|id| ast.kind(*id) == NodeKind::VarDecl)
        .map(|id| symbol_of(ast, id))
        .collect::<AstResult<Vec<_>>>()?;
    Ok(MethodSignature { return_type, parameters, locals, is_static })
}

use super::{replace_with_literal, AstRewrite};
use crate::ast::{Ast, AstResult, BinaryOperator, MethodContext, NodeId, NodeKind, OperatorFamily};
use crate::symtab::{SymbolTable, VarRef};
use std::collections::{HashMap, HashSet};

/// Literal value known for a local at some program point
#[derive(Debug, Clone, PartialEq, Eq)]
struct Known {
    kind: NodeKind,
    value: String,
}

type Env = HashMap<String, Known>;

/// Replaces reads of locals holding a known literal with that literal.
///
/// Assignment targets are never substituted. Loops forget every local they
/// assign; after an `if` only facts shared by both branches survive.
pub struct ConstantPropagation;

impl AstRewrite for ConstantPropagation {
    fn name(&self) -> &'static str {
        "constant-propagation"
    }

    fn rewrite(&mut self, ast: &mut Ast, table: &SymbolTable) -> AstResult<usize> {
        let class = ast.class_decl()?;
        let methods: Vec<NodeId> = ast.children_of_kind(class, NodeKind::MethodDecl).collect();
        let mut replaced = 0;
        for method in methods {
            let name = MethodContext::of(ast, method)?.name.to_string();
            let mut propagator = Propagator { table, method: &name, replaced: 0 };
            let mut env = Env::new();
            let body: Vec<NodeId> = ast
                .children(method)
                .iter()
                .copied()
                .filter(|c| !matches!(ast.kind(*c), NodeKind::Type | NodeKind::Param))
                .collect();
            for stmt in body {
                propagator.statement(ast, stmt, &mut env)?;
            }
            replaced += propagator.replaced;
        }
        Ok(replaced)
    }
}

struct Propagator<'a> {
    table: &'a SymbolTable,
    method: &'a str,
    replaced: usize,
}

impl Propagator<'_> {
    fn is_local(&self, name: &str) -> bool {
        matches!(self.table.resolve(Some(self.method), name), VarRef::Local(_))
    }

    fn statement(&mut self, ast: &mut Ast, id: NodeId, env: &mut Env) -> AstResult<()> {
        match ast.kind(id) {
            NodeKind::Block => {
                for stmt in ast.children(id).to_vec() {
                    self.statement(ast, stmt, env)?;
                }
            }
            NodeKind::ExprStmt | NodeKind::Return => {
                if let Some(expr) = ast.children(id).first().copied() {
                    self.expression(ast, expr, env)?;
                }
            }
            NodeKind::ArrayAssign => {
                for expr in ast.children(id).to_vec() {
                    self.expression(ast, expr, env)?;
                }
            }
            NodeKind::Assign => {
                let value = ast.child(id, 0)?;
                let value = self.expression(ast, value, env)?;
                let target = ast.require_attr(id, "name")?.to_string();
                if !self.is_local(&target) {
                    return Ok(());
                }
                match ast.kind(value) {
                    kind @ (NodeKind::IntLiteral | NodeKind::BooleanLiteral) => {
                        let value = ast.require_attr(value, "value")?.to_string();
                        env.insert(target, Known { kind, value });
                    }
                    _ => {
                        env.remove(&target);
                    }
                }
            }
            NodeKind::If => {
                let (cond, then) = (ast.child(id, 0)?, ast.child(id, 1)?);
                self.expression(ast, cond, env)?;
                let mut then_env = env.clone();
                self.statement(ast, then, &mut then_env)?;
                let mut else_env = env.clone();
                if let Some(otherwise) = ast.children(id).get(2).copied() {
                    self.statement(ast, otherwise, &mut else_env)?;
                }
                then_env.retain(|name, known| else_env.get(name) == Some(known));
                *env = then_env;
            }
            NodeKind::While => {
                let (cond, body) = (ast.child(id, 0)?, ast.child(id, 1)?);
                self.kill_assigned(ast, id, env);
                self.expression(ast, cond, env)?;
                let mut body_env = env.clone();
                self.statement(ast, body, &mut body_env)?;
            }
            NodeKind::For => {
                let (init, cond) = (ast.child(id, 0)?, ast.child(id, 1)?);
                let (update, body) = (ast.child(id, 2)?, ast.child(id, 3)?);
                self.statement(ast, init, env)?;
                self.kill_assigned(ast, id, env);
                self.expression(ast, cond, env)?;
                let mut body_env = env.clone();
                self.statement(ast, body, &mut body_env)?;
                self.statement(ast, update, &mut body_env)?;
            }
            _ => {}
        }
        Ok(())
    }

    /// Forget every local written anywhere below `id`
    fn kill_assigned(&self, ast: &Ast, id: NodeId, env: &mut Env) {
        for name in written_names(ast, id) {
            env.remove(&name);
        }
    }

    /// Substitute known locals inside an expression and return the node now
    /// standing in its place
    fn expression(&mut self, ast: &mut Ast, id: NodeId, env: &mut Env) -> AstResult<NodeId> {
        match ast.kind(id) {
            NodeKind::Identifier => {
                let name = ast.require_attr(id, "name")?;
                if !self.is_local(name) {
                    return Ok(id);
                }
                let Some(known) = env.get(name).cloned() else { return Ok(id) };
                self.replaced += 1;
                replace_with_literal(ast, id, known.kind, &known.value)
            }
            NodeKind::BinaryOp if is_compound(ast, id) => {
                // `x += e`: `x` is written, only `e` is read as a value
                let (target, value) = (ast.child(id, 0)?, ast.child(id, 1)?);
                self.expression(ast, value, env)?;
                if ast.kind(target) == NodeKind::Identifier {
                    let name = ast.require_attr(target, "name")?.to_string();
                    env.remove(&name);
                } else {
                    self.expression(ast, target, env)?;
                }
                Ok(id)
            }
            _ => {
                for child in ast.children(id).to_vec() {
                    self.expression(ast, child, env)?;
                }
                Ok(id)
            }
        }
    }
}

fn is_compound(ast: &Ast, id: NodeId) -> bool {
    ast.attr(id, "op")
        .and_then(BinaryOperator::parse)
        .map(|op| op.family() == OperatorFamily::CompoundAssign)
        .unwrap_or(false)
}

/// Names assigned by `Assign`/`ArrayAssign` or compound operators below `id`
fn written_names(ast: &Ast, id: NodeId) -> HashSet<String> {
    let mut names = HashSet::new();
    for node in ast.descendants(id) {
        match ast.kind(node) {
            NodeKind::Assign | NodeKind::ArrayAssign => {
                if let Some(name) = ast.attr(node, "name") {
                    names.insert(name.to_string());
                }
            }
            NodeKind::BinaryOp if is_compound(ast, node) => {
                if let Some(target) = ast.children(node).first() {
                    if let Some(name) = ast.attr(*target, "name") {
                        names.insert(name.to_string());
                    }
                }
            }
            _ => {}
        }
    }
    names
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::AstBuilder;
    use crate::symtab::Type;

    #[test]
    fn substitutes_reads_but_not_targets() {
        // x = 1; y = x; x = x + 2;
        let mut b = AstBuilder::new();
        let x = b.var_decl("x", Type::int(), 2);
        let y = b.var_decl("y", Type::int(), 2);
        let one = b.int_lit(1, 3);
        let set_x = b.assign("x", one, 3);
        let read = b.ident("x", 4);
        let set_y = b.assign("y", read, 4);
        let again = b.ident("x", 5);
        let two = b.int_lit(2, 5);
        let sum = b.binary("+", again, two, 5);
        let bump = b.assign("x", sum, 5);
        let f = b.method("f", Type::void(), vec![], vec![x, y, set_x, set_y, bump], 1);
        let class = b.class("A", None, vec![f], 1);
        let mut ast = b.program(&[], class);
        let table = SymbolTable::build(&ast).unwrap();

        assert_eq!(ConstantPropagation.rewrite(&mut ast, &table).unwrap(), 2);
        let y_value = ast.child(set_y, 0).unwrap();
        assert_eq!(ast.kind(y_value), NodeKind::IntLiteral);
        assert_eq!(ast.attr(bump, "name"), Some("x"));
        assert_eq!(ast.kind(ast.child(sum, 0).unwrap()), NodeKind::IntLiteral);
    }

    #[test]
    fn loops_forget_assigned_locals() {
        // i = 0; while (i < 10) { i = i + 1; }
        let mut b = AstBuilder::new();
        let i = b.var_decl("i", Type::int(), 2);
        let zero = b.int_lit(0, 3);
        let init = b.assign("i", zero, 3);
        let cond_i = b.ident("i", 4);
        let ten = b.int_lit(10, 4);
        let cond = b.binary("<", cond_i, ten, 4);
        let body_i = b.ident("i", 5);
        let one = b.int_lit(1, 5);
        let inc = b.binary("+", body_i, one, 5);
        let step = b.assign("i", inc, 5);
        let body = b.block(vec![step], 4);
        let lp = b.while_loop(cond, body, 4);
        let f = b.method("f", Type::void(), vec![], vec![i, init, lp], 1);
        let class = b.class("A", None, vec![f], 1);
        let mut ast = b.program(&[], class);
        let table = SymbolTable::build(&ast).unwrap();

        assert_eq!(ConstantPropagation.rewrite(&mut ast, &table).unwrap(), 0);
        assert_eq!(ast.child(cond, 0).unwrap(), cond_i);
    }
}

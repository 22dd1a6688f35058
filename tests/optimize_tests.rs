mod common;

use common::{assert_clean, class, instructions};
use jmmc::ast::{Ast, NodeKind};
use jmmc::optimize::{optimize, AstRewrite, ConstantFolding, ConstantPropagation, Optimizer};
use jmmc::symtab::{SymbolTable, Type};
use jmmc::Config;

/// int f() { int x; int y; x = 2; y = x + 3; return y; }
fn propagate_then_fold() -> Ast {
    class(|b| {
        let x = b.var_decl("x", Type::int(), 2);
        let y = b.var_decl("y", Type::int(), 2);
        let two = b.int_lit(2, 3);
        let set_x = b.assign("x", two, 3);
        let rx = b.ident("x", 4);
        let three = b.int_lit(3, 4);
        let sum = b.binary("+", rx, three, 4);
        let set_y = b.assign("y", sum, 4);
        let ry = b.ident("y", 5);
        let ret = b.ret(Some(ry), 5);
        vec![b.method("f", Type::int(), vec![], vec![x, y, set_x, set_y, ret], 1)]
    })
}

#[test]
fn folding_is_idempotent() {
    let mut ast = class(|b| {
        let x = b.var_decl("x", Type::int(), 2);
        let two = b.int_lit(2, 3);
        let three = b.int_lit(3, 3);
        let sum = b.binary("+", two, three, 3);
        let assign = b.assign("x", sum, 3);
        vec![b.method("f", Type::void(), vec![], vec![x, assign], 1)]
    });
    let table = SymbolTable::build(&ast).unwrap();

    assert_eq!(ConstantFolding.rewrite(&mut ast, &table).unwrap(), 1);
    let literal = ast
        .descendants(ast.root())
        .into_iter()
        .find(|id| ast.kind(*id) == NodeKind::IntLiteral)
        .unwrap();
    assert_eq!(ast.attr(literal, "value"), Some("5"));

    let snapshot = ast.clone();
    assert_eq!(ConstantFolding.rewrite(&mut ast, &table).unwrap(), 0);
    assert_eq!(ast, snapshot);
}

#[test]
fn optimizer_reaches_fixpoint() {
    let mut ast = propagate_then_fold();
    assert_clean(&ast);
    let table = SymbolTable::build(&ast).unwrap();
    let summary = optimize(&mut ast, &table, &Config::default().with_optimize(true)).unwrap();

    assert_eq!(summary.replacements, 3);
    assert_eq!(summary.rounds, 3);
}

#[test]
fn optimizer_respects_round_limit() {
    let mut ast = propagate_then_fold();
    let table = SymbolTable::build(&ast).unwrap();
    let mut optimizer = Optimizer::new(vec![Box::new(ConstantFolding), Box::new(ConstantPropagation)], 1);
    let summary = optimizer.run(&mut ast, &table).unwrap();

    assert_eq!(summary.rounds, 1);
    assert_eq!(summary.replacements, 1);
}

#[test]
fn optimize_flag_off_changes_nothing() {
    let mut ast = propagate_then_fold();
    let before = ast.clone();
    let table = SymbolTable::build(&ast).unwrap();
    let summary = optimize(&mut ast, &table, &Config::default()).unwrap();

    assert_eq!(summary.replacements, 0);
    assert_eq!(ast, before);
}

#[test]
fn optimized_program_lowers_to_constants() {
    let compilation = jmmc::compile(propagate_then_fold(), &Config::default().with_optimize(true)).unwrap();
    let unit = compilation.class_unit.as_ref().unwrap();
    assert_eq!(
        instructions(unit, "f"),
        vec!["x.i32 :=.i32 2.i32;", "y.i32 :=.i32 5.i32;", "ret.i32 5.i32;"]
    );
}

#[test]
fn propagation_keeps_assignment_targets() {
    // x = 1; x = x + 1;  the second target stays `x`
    let mut ast = class(|b| {
        let x = b.var_decl("x", Type::int(), 2);
        let one = b.int_lit(1, 3);
        let first = b.assign("x", one, 3);
        let rx = b.ident("x", 4);
        let one_more = b.int_lit(1, 4);
        let sum = b.binary("+", rx, one_more, 4);
        let second = b.assign("x", sum, 4);
        vec![b.method("f", Type::void(), vec![], vec![x, first, second], 1)]
    });
    let table = SymbolTable::build(&ast).unwrap();
    optimize(&mut ast, &table, &Config::default().with_optimize(true)).unwrap();

    let assigns: Vec<_> = ast
        .descendants(ast.root())
        .into_iter()
        .filter(|id| ast.kind(*id) == NodeKind::Assign)
        .collect();
    assert_eq!(assigns.len(), 2);
    for assign in assigns {
        assert_eq!(ast.attr(assign, "name"), Some("x"));
    }
    // x = 1 + 1 was folded on the next round
    let values: Vec<_> = ast
        .descendants(ast.root())
        .into_iter()
        .filter(|id| ast.kind(*id) == NodeKind::IntLiteral)
        .filter_map(|id| ast.attr(id, "value").map(str::to_string))
        .collect();
    assert!(values.contains(&"2".to_string()), "{values:?}");
}

#[test]
fn branches_only_keep_shared_facts() {
    // if (c) { x = 1; } else { x = 2; } return x;  x is not constant after the if
    let mut ast = class(|b| {
        let c = b.param("c", Type::boolean(), 1);
        let x = b.var_decl("x", Type::int(), 2);
        let cond = b.ident("c", 3);
        let one = b.int_lit(1, 3);
        let then_assign = b.assign("x", one, 3);
        let then = b.block(vec![then_assign], 3);
        let two = b.int_lit(2, 4);
        let else_assign = b.assign("x", two, 4);
        let otherwise = b.block(vec![else_assign], 4);
        let branch = b.if_else(cond, then, Some(otherwise), 3);
        let rx = b.ident("x", 5);
        let ret = b.ret(Some(rx), 5);
        vec![b.method("f", Type::int(), vec![c], vec![x, branch, ret], 1)]
    });
    let table = SymbolTable::build(&ast).unwrap();
    let summary = optimize(&mut ast, &table, &Config::default().with_optimize(true)).unwrap();

    assert_eq!(summary.replacements, 0);
    let ret = ast
        .descendants(ast.root())
        .into_iter()
        .find(|id| ast.kind(*id) == NodeKind::Return)
        .unwrap();
    assert_eq!(ast.kind(ast.child(ret, 0).unwrap()), NodeKind::Identifier);
}

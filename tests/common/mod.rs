// Common test utilities
#![allow(dead_code)]

use jmmc::ast::{Ast, AstBuilder, NodeId};
use jmmc::ollir::{lower_class, ClassUnit};
use jmmc::review::review;
use jmmc::symtab::SymbolTable;
use jmmc::Report;

/// Route `log` output through the test harness
pub fn init_logging() {
    let _ = env_logger::builder()
        .is_test(true)
        .filter_level(log::LevelFilter::Debug)
        .try_init();
}

/// Program with a single class `Test` and no imports
pub fn class(build: impl FnOnce(&mut AstBuilder) -> Vec<NodeId>) -> Ast {
    class_with(&[], None, build)
}

pub fn class_with(imports: &[&str], extends: Option<&str>, build: impl FnOnce(&mut AstBuilder) -> Vec<NodeId>) -> Ast {
    let mut b = AstBuilder::new();
    let members = build(&mut b);
    let class = b.class("Test", extends, members, 1);
    b.program(imports, class)
}

pub fn reports(ast: &Ast) -> Vec<Report> {
    init_logging();
    let table = SymbolTable::build(ast).expect("symbol table");
    review(ast, &table)
}

pub fn error_messages(ast: &Ast) -> Vec<String> {
    reports(ast).into_iter().filter(|r| r.is_error()).map(|r| r.message).collect()
}

pub fn assert_clean(ast: &Ast) {
    let errors = error_messages(ast);
    assert!(errors.is_empty(), "unexpected errors: {errors:?}");
}

/// First error whose message contains `needle`
pub fn expect_error(ast: &Ast, needle: &str) -> Report {
    let all = reports(ast);
    match all.iter().find(|r| r.is_error() && r.message.contains(needle)) {
        Some(report) => report.clone(),
        None => panic!("no error containing '{needle}' in {all:?}"),
    }
}

/// Check then lower; panics if the program does not pass review
pub fn lower(ast: &Ast) -> ClassUnit {
    assert_clean(ast);
    let table = SymbolTable::build(ast).expect("symbol table");
    lower_class(ast, &table).expect("lowering")
}

/// Rendered instructions of one method, one per line, trimmed
pub fn instructions(unit: &ClassUnit, method: &str) -> Vec<String> {
    let method = unit.method(method).unwrap_or_else(|| panic!("no method '{method}'"));
    method.instructions.iter().map(|i| i.to_string()).collect()
}

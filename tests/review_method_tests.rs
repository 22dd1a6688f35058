mod common;

use common::{assert_clean, class, class_with, error_messages, expect_error, reports};
use jmmc::ast::{AstError, NodeKind};
use jmmc::review::{Analyzer, ReviewContext, ReviewResult, SemanticPass};
use jmmc::symtab::{SymbolTable, Type};
use jmmc::{Report, ReportType};

#[test]
fn call_on_this_checks_arity() {
    // int sq(int n) { return n * n; }  void f() { this.sq(1, 2); }
    let ast = class(|b| {
        let n = b.param("n", Type::int(), 2);
        let l = b.ident("n", 2);
        let r = b.ident("n", 2);
        let prod = b.binary("*", l, r, 2);
        let ret = b.ret(Some(prod), 2);
        let sq = b.method("sq", Type::int(), vec![n], vec![ret], 2);

        let this = b.this(4);
        let one = b.int_lit(1, 4);
        let two = b.int_lit(2, 4);
        let call = b.call(this, "sq", vec![one, two], 4);
        let stmt = b.expr_stmt(call, 4);
        let f = b.method("f", Type::void(), vec![], vec![stmt], 3);
        vec![sq, f]
    });
    expect_error(&ast, "method 'sq' expects 1 argument(s), found 2");
}

#[test]
fn call_on_this_checks_argument_types() {
    let ast = class(|b| {
        let n = b.param("n", Type::int(), 2);
        let sq = b.method("sq", Type::void(), vec![n], vec![], 2);
        let this = b.this(4);
        let yes = b.bool_lit(true, 4);
        let call = b.call(this, "sq", vec![yes], 4);
        let stmt = b.expr_stmt(call, 4);
        let f = b.method("f", Type::void(), vec![], vec![stmt], 3);
        vec![sq, f]
    });
    expect_error(&ast, "argument 1 of 'sq' expects 'int', found 'boolean'");
}

#[test]
fn unknown_method_without_superclass() {
    let ast = class(|b| {
        let this = b.this(3);
        let call = b.call(this, "missing", vec![], 3);
        let stmt = b.expr_stmt(call, 3);
        vec![b.method("f", Type::void(), vec![], vec![stmt], 2)]
    });
    expect_error(&ast, "method 'missing' is not declared and the class has no superclass");
}

#[test]
fn unknown_method_may_be_inherited() {
    let ast = class_with(&["Base"], Some("Base"), |b| {
        let this = b.this(3);
        let call = b.call(this, "inherited", vec![], 3);
        let stmt = b.expr_stmt(call, 3);
        vec![b.method("f", Type::void(), vec![], vec![stmt], 2)]
    });
    assert_clean(&ast);
}

#[test]
fn call_on_primitive_receiver() {
    let ast = class(|b| {
        let x = b.var_decl("x", Type::int(), 2);
        let recv = b.ident("x", 3);
        let call = b.call(recv, "foo", vec![], 3);
        let stmt = b.expr_stmt(call, 3);
        vec![b.method("f", Type::void(), vec![], vec![x, stmt], 1)]
    });
    expect_error(&ast, "cannot call method 'foo' on primitive type 'int'");
}

#[test]
fn varargs_call_accepts_any_tail() {
    // int sum(int... xs) { return xs.length; }  calls: sum(), sum(1, 2, 3)
    let ast = class(|b| {
        let xs = b.varargs_param("xs", 2);
        let base = b.ident("xs", 2);
        let len = b.length(base, 2);
        let ret = b.ret(Some(len), 2);
        let sum = b.method("sum", Type::int(), vec![xs], vec![ret], 2);

        let r1 = b.this(4);
        let empty = b.call(r1, "sum", vec![], 4);
        let s1 = b.expr_stmt(empty, 4);
        let r2 = b.this(5);
        let args = vec![b.int_lit(1, 5), b.int_lit(2, 5), b.int_lit(3, 5)];
        let three = b.call(r2, "sum", args, 5);
        let s2 = b.expr_stmt(three, 5);
        let f = b.method("f", Type::void(), vec![], vec![s1, s2], 3);
        vec![sum, f]
    });
    assert_clean(&ast);
}

#[test]
fn varargs_must_be_last() {
    let ast = class(|b| {
        let xs = b.varargs_param("xs", 2);
        let n = b.param("n", Type::int(), 2);
        vec![b.method("f", Type::void(), vec![xs, n], vec![], 2)]
    });
    expect_error(&ast, "varargs parameter 'xs' must be the last parameter of 'f'");
}

#[test]
fn varargs_only_once_per_method() {
    let ast = class(|b| {
        let xs = b.varargs_param("xs", 2);
        let ys = b.varargs_param("ys", 2);
        vec![b.method("f", Type::void(), vec![xs, ys], vec![], 2)]
    });
    expect_error(&ast, "method 'f' declares more than one varargs parameter");
}

#[test]
fn varargs_field_is_rejected() {
    let ast = class(|b| vec![b.varargs_var_decl("xs", 2)]);
    expect_error(&ast, "varargs type is not allowed on variable 'xs'");
}

#[test]
fn this_in_static_method() {
    let ast = class(|b| {
        let this = b.this(3);
        let call = b.call(this, "g", vec![], 3);
        let stmt = b.expr_stmt(call, 3);
        let f = b.static_method("f", Type::void(), vec![], vec![stmt], 2);
        let g = b.method("g", Type::void(), vec![], vec![], 5);
        vec![f, g]
    });
    let report = expect_error(&ast, "'this' cannot be used in static method 'f'");
    assert_eq!(report.line, 3);
}

#[test]
fn field_in_main() {
    let ast = class(|b| {
        let count = b.var_decl("count", Type::int(), 2);
        let one = b.int_lit(1, 4);
        let assign = b.assign("count", one, 4);
        let main = b.main_method(vec![assign], 3);
        vec![count, main]
    });
    expect_error(&ast, "instance field 'count' cannot be used in static method 'main'");
}

#[test]
fn missing_return_reported_per_method() {
    // int f() { int x; x = 1; }  boolean g() { }
    let ast = class(|b| {
        let x = b.var_decl("x", Type::int(), 3);
        let one = b.int_lit(1, 4);
        let assign = b.assign("x", one, 4);
        let f = b.method("f", Type::int(), vec![], vec![x, assign], 2);
        let g = b.method("g", Type::boolean(), vec![], vec![], 6);
        vec![f, g]
    });
    let errors = error_messages(&ast);
    let missing: Vec<_> = errors.iter().filter(|e| e.contains("must return a value")).collect();
    assert_eq!(missing.len(), 2, "{errors:?}");
    assert!(missing.iter().any(|e| e.contains("'f'")));
    assert!(missing.iter().any(|e| e.contains("'g'")));
}

#[test]
fn single_method_without_return() {
    let ast = class(|b| vec![b.method("f", Type::int(), vec![], vec![], 2)]);
    let errors = error_messages(&ast);
    assert_eq!(errors, vec!["method 'f' must return a value".to_string()]);
}

#[test]
fn bare_return_in_int_method() {
    // int f() { return; }
    let ast = class(|b| {
        let ret = b.ret(None, 3);
        vec![b.method("f", Type::int(), vec![], vec![ret], 2)]
    });
    let errors = error_messages(&ast);
    assert_eq!(errors, vec!["return in method 'f' needs a value".to_string()]);
    assert!(errors.iter().all(|e| !e.contains("must return a value")));
}

#[test]
fn void_method_returning_a_value() {
    let ast = class(|b| {
        let one = b.int_lit(1, 3);
        let ret = b.ret(Some(one), 3);
        vec![b.method("f", Type::void(), vec![], vec![ret], 2)]
    });
    expect_error(&ast, "void method 'f' cannot return a value");
}

#[test]
fn return_type_mismatch() {
    let ast = class(|b| {
        let yes = b.bool_lit(true, 3);
        let ret = b.ret(Some(yes), 3);
        vec![b.method("f", Type::int(), vec![], vec![ret], 2)]
    });
    expect_error(&ast, "method 'f' returns 'boolean' but declares 'int'");
}

#[test]
fn imported_classes_are_interchangeable_in_returns() {
    let ast = class_with(&["A", "B"], None, |b| {
        let local = b.var_decl("a", Type::class("A"), 3);
        let value = b.new_object("A", 4);
        let assign = b.assign("a", value, 4);
        let read = b.ident("a", 5);
        let ret = b.ret(Some(read), 5);
        vec![b.method("f", Type::class("B"), vec![], vec![local, assign, ret], 2)]
    });
    assert_clean(&ast);
}

/// Pass that always trips over a malformed tree
struct Broken;

impl SemanticPass for Broken {
    fn name(&self) -> &'static str {
        "broken"
    }

    fn run(&mut self, _cx: &ReviewContext<'_>, _reports: &mut Vec<Report>) -> ReviewResult<()> {
        Err(AstError::UnknownKind("Mystery".to_string()))
    }
}

/// Pass that flags every method declaration
struct FlagMethods;

impl SemanticPass for FlagMethods {
    fn name(&self) -> &'static str {
        "flag-methods"
    }

    fn run(&mut self, cx: &ReviewContext<'_>, reports: &mut Vec<Report>) -> ReviewResult<()> {
        for id in cx.ast.descendants(cx.ast.root()) {
            if cx.ast.kind(id) == NodeKind::MethodDecl {
                reports.push(Report::semantic_error(cx.ast, id, "flagged"));
            }
        }
        Ok(())
    }
}

#[test]
fn pass_fault_does_not_halt() {
    let ast = class(|b| vec![b.method("f", Type::void(), vec![], vec![], 2)]);
    let table = SymbolTable::build(&ast).unwrap();
    let mut analyzer = Analyzer::new(vec![Box::new(Broken), Box::new(FlagMethods)]);
    let reports = analyzer.analyze(&ast, &table);

    assert_eq!(reports.len(), 2, "{reports:?}");
    assert!(reports[0].message.starts_with("pass 'broken' failed unexpectedly"));
    assert_eq!(reports[0].line, -1);
    assert_eq!(reports[0].column, -1);
    assert_eq!(reports[1].message, "flagged");
    assert!(reports.iter().all(|r| r.report_type == ReportType::Error));
}

#[test]
fn default_analyzer_matches_review() {
    let ast = class(|b| vec![b.method("f", Type::int(), vec![], vec![], 2)]);
    let table = SymbolTable::build(&ast).unwrap();
    assert_eq!(Analyzer::default().analyze(&ast, &table), reports(&ast));
}

mod common;

use common::{assert_clean, class, class_with, error_messages, expect_error, reports};
use jmmc::ast::{AstBuilder, Location, NodeId, NodeKind};
use jmmc::symtab::Type;

/// `void f() { <decls>; <stmt> }` where `stmt` is built from the builder
fn in_method(decls: &[(&str, Type)], stmt: impl FnOnce(&mut AstBuilder) -> NodeId) -> jmmc::ast::Ast {
    class(|b| {
        let mut body: Vec<NodeId> = decls.iter().map(|(name, ty)| b.var_decl(name, ty.clone(), 2)).collect();
        body.push(stmt(b));
        vec![b.method("f", Type::void(), vec![], body, 1)]
    })
}

#[test]
fn array_operand_in_arithmetic_fails() {
    for op in ["+", "-", "*", "/"] {
        let ast = in_method(&[("a", Type::int_array()), ("x", Type::int())], |b| {
            let lhs = b.ident("a", 3);
            let rhs = b.int_lit(1, 3);
            let sum = b.binary(op, lhs, rhs, 3);
            b.assign("x", sum, 3)
        });
        expect_error(&ast, &format!("array cannot be used in arithmetic operation '{op}'"));
    }
}

#[test]
fn int_and_boolean_do_not_add() {
    let ast = in_method(&[("x", Type::int())], |b| {
        let lhs = b.int_lit(1, 3);
        let rhs = b.bool_lit(true, 3);
        let sum = b.binary("+", lhs, rhs, 3);
        b.assign("x", sum, 3)
    });
    expect_error(&ast, "operator '+' cannot be applied to 'int' and 'boolean'");
}

#[test]
fn logical_operators_need_booleans() {
    let ast = in_method(&[("ok", Type::boolean())], |b| {
        let lhs = b.int_lit(1, 3);
        let rhs = b.bool_lit(false, 3);
        let and = b.binary("&&", lhs, rhs, 3);
        b.assign("ok", and, 3)
    });
    expect_error(&ast, "operator '&&'");
}

#[test]
fn negation_needs_boolean() {
    let ast = in_method(&[("ok", Type::boolean())], |b| {
        let five = b.int_lit(5, 3);
        let not = b.unary("!", five, 3);
        b.assign("ok", not, 3)
    });
    expect_error(&ast, "operator '!' cannot be applied to 'int'");
}

#[test]
fn imported_values_are_unknown_and_accepted() {
    // x = Lib.value() + 1;
    let ast = class_with(&["Lib"], None, |b| {
        let x = b.var_decl("x", Type::int(), 2);
        let lib = b.ident("Lib", 3);
        let call = b.call(lib, "value", vec![], 3);
        let one = b.int_lit(1, 3);
        let sum = b.binary("+", call, one, 3);
        let assign = b.assign("x", sum, 3);
        vec![b.method("f", Type::void(), vec![], vec![x, assign], 1)]
    });
    assert_clean(&ast);
}

#[test]
fn indexing_a_non_array() {
    let ast = in_method(&[("n", Type::int()), ("x", Type::int())], |b| {
        let base = b.ident("n", 3);
        let zero = b.int_lit(0, 3);
        let access = b.array_access(base, zero, 3);
        b.assign("x", access, 3)
    });
    expect_error(&ast, "cannot index a value of type 'int'");
}

#[test]
fn boolean_index() {
    let ast = in_method(&[("a", Type::int_array()), ("x", Type::int())], |b| {
        let base = b.ident("a", 3);
        let index = b.bool_lit(true, 3);
        let access = b.array_access(base, index, 3);
        b.assign("x", access, 3)
    });
    expect_error(&ast, "array index must be of type 'int', found 'boolean'");
}

#[test]
fn length_of_non_array() {
    let ast = in_method(&[("n", Type::int()), ("x", Type::int())], |b| {
        let base = b.ident("n", 3);
        let len = b.length(base, 3);
        b.assign("x", len, 3)
    });
    expect_error(&ast, "length is only defined on arrays");
}

#[test]
fn incompatible_assignment() {
    let ast = in_method(&[("x", Type::int())], |b| {
        let yes = b.bool_lit(true, 3);
        b.assign("x", yes, 3)
    });
    let report = expect_error(&ast, "cannot assign 'boolean' to 'x' of type 'int'");
    assert_eq!(report.line, 3);
}

#[test]
fn subclass_assigns_to_superclass() {
    // class Test extends Base { void f() { Base b; b = new Test(); } }
    let ast = class_with(&["Base"], Some("Base"), |b| {
        let var = b.var_decl("b", Type::class("Base"), 2);
        let object = b.new_object("Test", 3);
        let assign = b.assign("b", object, 3);
        vec![b.method("f", Type::void(), vec![], vec![var, assign], 1)]
    });
    assert_clean(&ast);
}

#[test]
fn superclass_does_not_assign_to_subclass() {
    let ast = class_with(&["Base"], Some("Base"), |b| {
        let var = b.var_decl("t", Type::class("Test"), 2);
        let object = b.new_object("Base", 3);
        let assign = b.assign("t", object, 3);
        vec![b.method("f", Type::void(), vec![], vec![var, assign], 1)]
    });
    expect_error(&ast, "cannot assign 'Base' to 't' of type 'Test'");
}

#[test]
fn element_store_into_non_array() {
    let ast = in_method(&[("n", Type::int())], |b| {
        let zero = b.int_lit(0, 3);
        let one = b.int_lit(1, 3);
        b.array_assign("n", zero, one, 3)
    });
    expect_error(&ast, "'n' of type 'int' is not an array");
}

#[test]
fn element_store_checks_value_type() {
    let ast = in_method(&[("a", Type::int_array())], |b| {
        let zero = b.int_lit(0, 3);
        let yes = b.bool_lit(true, 3);
        b.array_assign("a", zero, yes, 3)
    });
    expect_error(&ast, "cannot assign 'boolean' to 'a' of type 'int'");
}

#[test]
fn non_boolean_conditions_fail() {
    let while_int = in_method(&[], |b| {
        let cond = b.int_lit(1, 3);
        let body = b.block(vec![], 3);
        b.while_loop(cond, body, 3)
    });
    expect_error(&while_int, "condition must be of type 'boolean', found 'int'");

    let if_array = in_method(&[("a", Type::int_array())], |b| {
        let cond = b.ident("a", 3);
        let then = b.block(vec![], 3);
        b.if_else(cond, then, None, 3)
    });
    expect_error(&if_array, "found 'int[]'");

    let for_int = in_method(&[("i", Type::int())], |b| {
        let zero = b.int_lit(0, 3);
        let init = b.assign("i", zero, 3);
        let cond = b.ident("i", 3);
        let one = b.int_lit(1, 3);
        let update = b.assign("i", one, 3);
        let body = b.block(vec![], 3);
        b.for_loop(init, cond, update, body, 3)
    });
    expect_error(&for_int, "condition must be of type 'boolean'");
}

#[test]
fn relational_condition_is_fine() {
    let ast = in_method(&[("i", Type::int())], |b| {
        let i = b.ident("i", 3);
        let ten = b.int_lit(10, 3);
        let cond = b.binary("<", i, ten, 3);
        let body = b.block(vec![], 3);
        b.while_loop(cond, body, 3)
    });
    assert_clean(&ast);
}

#[test]
fn array_initializer_placement() {
    // a = [1, 2]; is fine
    let ok = in_method(&[("a", Type::int_array())], |b| {
        let one = b.int_lit(1, 3);
        let two = b.int_lit(2, 3);
        let lit = b.array_lit(vec![one, two], 3);
        b.assign("a", lit, 3)
    });
    assert_clean(&ok);

    // x = [1]; with x: int is not
    let misplaced = in_method(&[("x", Type::int())], |b| {
        let one = b.int_lit(1, 3);
        let lit = b.array_lit(vec![one], 3);
        b.assign("x", lit, 3)
    });
    expect_error(&misplaced, "array initializer is only allowed where 'int[]' is expected");
}

#[test]
fn array_initializer_as_expression_statement() {
    let ast = in_method(&[], |b| {
        let one = b.int_lit(1, 3);
        let lit = b.array_lit(vec![one], 3);
        b.expr_stmt(lit, 3)
    });
    let errors = error_messages(&ast);
    assert_eq!(errors, vec!["array initializer is only allowed where 'int[]' is expected".to_string()]);
}

#[test]
fn array_initializer_with_mixed_elements() {
    let ast = in_method(&[("a", Type::int_array())], |b| {
        let one = b.int_lit(1, 3);
        let yes = b.bool_lit(true, 3);
        let lit = b.array_lit(vec![one, yes], 3);
        b.assign("a", lit, 3)
    });
    expect_error(&ast, "array initializer mixes element types 'int' and 'boolean'");
}

#[test]
fn malformed_condition_is_a_pass_fault() {
    // if (<array access without children>) { }
    let ast = in_method(&[], |b| {
        let broken = b.raw(NodeKind::ArrayAccess, Location::new(3, 9), &[], Vec::new());
        let then = b.block(vec![], 3);
        b.if_else(broken, then, None, 3)
    });
    let reports = reports(&ast);

    assert!(!reports.is_empty());
    for report in &reports {
        assert!(report.message.starts_with("pass '"), "{}", report.message);
        assert_eq!((report.line, report.column), (-1, -1));
    }
    assert!(
        reports.iter().any(|r| r.message.starts_with("pass 'conditions' failed unexpectedly")),
        "{reports:?}"
    );
}

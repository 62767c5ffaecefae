mod common;

use rox::ast::{Expr, Stmt};
use rox::interpreter::Interpreter;
use rox::parser::Parser;
use rox::resolver::Resolver;
use rox::scanner::scan_tokens;

use common::{run_ok, run_runtime_err, run_static_err};

fn parse(source: &str) -> Vec<Stmt> {
    let (tokens, errors) = scan_tokens(source);
    assert!(errors.is_empty(), "lex errors: {:?}", errors);

    Parser::new(&tokens).parse().expect("source should parse")
}

fn resolved(source: &str) -> (Vec<Stmt>, Interpreter) {
    let statements = parse(source);
    let mut interpreter = Interpreter::new();

    Resolver::new(&mut interpreter)
        .resolve(&statements)
        .expect("source should resolve");

    (statements, interpreter)
}

#[test]
fn nested_block_reference_resolves_one_scope_out() {
    let (statements, interpreter) = resolved("{ var a = 1; { print a; } }");

    let Stmt::Block(outer) = &statements[0] else {
        panic!("expected block")
    };
    let Stmt::Block(inner) = &outer[1] else {
        panic!("expected inner block")
    };
    let Stmt::Print(Expr::Variable { id, .. }) = &inner[0] else {
        panic!("expected print of a variable")
    };

    assert_eq!(interpreter.locals().get(id), Some(&1));
}

#[test]
fn parameters_live_in_the_function_scope() {
    let (statements, interpreter) = resolved("fun f(x) { print x; }");

    let Stmt::Function(decl) = &statements[0] else {
        panic!("expected function")
    };
    let Stmt::Print(Expr::Variable { id, .. }) = &decl.body[0] else {
        panic!("expected print of a variable")
    };

    assert_eq!(interpreter.locals().get(id), Some(&0));
}

#[test]
fn globals_get_no_entry() {
    let (statements, interpreter) = resolved("var g = 1; print g;");

    let Stmt::Print(Expr::Variable { id, .. }) = &statements[1] else {
        panic!("expected print of a variable")
    };

    assert!(interpreter.locals().get(id).is_none());
    assert!(interpreter.locals().is_empty());
}

#[test]
fn resolving_is_deterministic() {
    let statements = parse(
        "class A { m() { return this; } }
         class B < A { m() { var x = super.m(); { print x; } return x; } }
         fun outer() { var n = 0; fun inner() { n = n + 1; return n; } return inner; }",
    );

    let mut first = Interpreter::new();
    let mut second = Interpreter::new();
    Resolver::new(&mut first).resolve(&statements).unwrap();
    Resolver::new(&mut second).resolve(&statements).unwrap();

    assert!(!first.locals().is_empty());
    assert_eq!(first.locals(), second.locals());

    // Re-resolving the same tree only rewrites identical entries.
    let snapshot = first.locals().clone();
    Resolver::new(&mut first).resolve(&statements).unwrap();
    assert_eq!(first.locals(), &snapshot);
}

#[test]
fn closures_bind_lexically() {
    let output = run_ok(
        r#"
        var a = "global";
        {
          fun showA() { print a; }
          showA();
          var a = "block";
          showA();
        }
        "#,
    );

    assert_eq!(output, ["global", "global"]);
}

#[test]
fn duplicate_local_declaration() {
    assert_eq!(
        run_static_err("{ var a = 1; var a = 2; }"),
        ["[line 1] Error at 'a': Already a variable with this name in this scope."]
    );
    assert_eq!(
        run_static_err("fun f(a, a) {}"),
        ["[line 1] Error at 'a': Already a variable with this name in this scope."]
    );
}

#[test]
fn globals_may_be_redeclared() {
    assert_eq!(run_ok("var a = 1; var a = 2; print a;"), ["2"]);
}

#[test]
fn local_read_in_own_initializer() {
    assert_eq!(
        run_static_err("{ var a = a; }"),
        ["[line 1] Error at 'a': Can't read local variable in its own initializer."]
    );

    // At top level the same code is legal and fails only when run.
    let (_, report) = run_runtime_err("var a = a;");
    assert_eq!(report, "Undefined variable 'a'.\n[line 1]");
}

#[test]
fn return_outside_function() {
    assert_eq!(
        run_static_err("return 1;"),
        ["[line 1] Error at 'return': Can't return from top-level code."]
    );
}

#[test]
fn return_value_from_initializer() {
    assert_eq!(
        run_static_err("class A { init() { return 1; } }"),
        ["[line 1] Error at 'return': Can't return a value from an initializer."]
    );

    assert!(run_ok("class A { init() { return; } } A();").is_empty());
}

#[test]
fn this_outside_class() {
    assert_eq!(
        run_static_err("print this;"),
        ["[line 1] Error at 'this': Can't use 'this' outside of a class."]
    );
    assert_eq!(
        run_static_err("fun f() { return this; }"),
        ["[line 1] Error at 'this': Can't use 'this' outside of a class."]
    );
}

#[test]
fn super_outside_class() {
    assert_eq!(
        run_static_err("print super.x;"),
        ["[line 1] Error at 'super': Can't use 'super' outside of a class."]
    );
}

#[test]
fn super_without_superclass() {
    assert_eq!(
        run_static_err("class A { m() { return super.m(); } }"),
        ["[line 1] Error at 'super': Can't use 'super' in a class with no superclass."]
    );
}

#[test]
fn class_inheriting_from_itself() {
    assert_eq!(
        run_static_err("class A < A {}"),
        ["[line 1] Error at 'A': A class can't inherit from itself."]
    );
}

#[test]
fn all_static_errors_are_reported_together() {
    assert_eq!(
        run_static_err("return 1;\nprint this;\n{ var b = b; }"),
        [
            "[line 1] Error at 'return': Can't return from top-level code.",
            "[line 2] Error at 'this': Can't use 'this' outside of a class.",
            "[line 3] Error at 'b': Can't read local variable in its own initializer.",
        ]
    );
}

#[test]
fn lex_and_parse_errors_are_combined() {
    assert_eq!(
        run_static_err("var x = @;"),
        [
            "[line 1] Error: Unexpected character: @",
            "[line 1] Error at ';': Expect expression.",
        ]
    );
}

#[test]
fn static_errors_prevent_any_execution() {
    assert!(run_static_err("print \"before\";\nreturn;").len() == 1);
}

mod common;

use common::{run_ok, run_runtime_err, Session};

#[test]
fn arithmetic() {
    assert_eq!(
        run_ok("print 1 + 2 * 3; print (1 + 2) * 3; print 10 / 4; print -3 - -1;"),
        ["7", "9", "2.5", "-2"]
    );
}

#[test]
fn string_concatenation() {
    assert_eq!(run_ok(r#"print "foo" + "bar";"#), ["foobar"]);
}

#[test]
fn number_formatting() {
    assert_eq!(
        run_ok("print 3.0; print 100; print 0.5; print 1/0; print -1/0; print 0/0;"),
        ["3", "100", "0.5", "Infinity", "-Infinity", "NaN"]
    );
}

#[test]
fn equality() {
    assert_eq!(
        run_ok(
            r#"
            print 1 == 1;
            print "a" == "a";
            print nil == nil;
            print nil == false;
            print 1 == "1";
            print 1 != 2;
            var n = 0/0;
            print n == n;
            "#
        ),
        ["true", "true", "true", "false", "false", "true", "false"]
    );
}

#[test]
fn truthiness() {
    assert_eq!(
        run_ok(
            r#"
            if (0) print "zero";
            if ("") print "empty";
            if (nil) print "nil"; else print "no nil";
            print !false;
            print !!0;
            "#
        ),
        ["zero", "empty", "no nil", "true", "true"]
    );
}

#[test]
fn logical_operators_return_an_operand() {
    assert_eq!(
        run_ok(
            r#"
            print nil or "x";
            print "a" and "b";
            print false and boom;
            print 1 or boom;
            "#
        ),
        ["x", "b", "false", "1"]
    );
}

#[test]
fn block_scoping_and_shadowing() {
    assert_eq!(
        run_ok(
            r#"
            var a = "outer";
            {
              var a = "inner";
              print a;
            }
            print a;
            var b = 1;
            { b = 2; }
            print b;
            "#
        ),
        ["inner", "outer", "2"]
    );
}

#[test]
fn loops() {
    assert_eq!(
        run_ok("for (var i = 0; i < 3; i = i + 1) print i; var j = 3; while (j > 0) j = j - 1; print j;"),
        ["0", "1", "2", "0"]
    );
}

#[test]
fn closures_keep_their_own_counters() {
    assert_eq!(
        run_ok(
            r#"
            fun makeCounter() {
              var i = 0;
              fun count() {
                i = i + 1;
                return i;
              }
              return count;
            }

            var c = makeCounter();
            print c();
            print c();
            var d = makeCounter();
            print d();
            print c();
            "#
        ),
        ["1", "2", "1", "3"]
    );
}

#[test]
fn loop_closures_share_one_binding() {
    // The loop variable lives in one scope for the whole loop, so a closure
    // captured on the first pass sees the final value.
    assert_eq!(
        run_ok(
            r#"
            var fs;
            for (var i = 0; i < 2; i = i + 1) {
              fun f() { print i; }
              if (i == 0) fs = f;
            }
            fs();
            "#
        ),
        ["2"]
    );
}

#[test]
fn recursion() {
    assert_eq!(
        run_ok(
            r#"
            fun fib(n) {
              if (n < 2) return n;
              return fib(n - 1) + fib(n - 2);
            }
            print fib(10);
            "#
        ),
        ["55"]
    );
}

#[test]
fn return_unwinds_through_loops() {
    assert_eq!(
        run_ok(
            r#"
            fun first() {
              var i = 0;
              while (true) {
                if (i == 3) return i;
                i = i + 1;
              }
            }
            print first();
            fun nothing() {}
            print nothing();
            "#
        ),
        ["3", "nil"]
    );
}

#[test]
fn functions_are_values() {
    assert_eq!(
        run_ok(
            r#"
            fun f() {}
            var g = f;
            print f;
            print f == g;
            print clock;
            print clock() > 0;
            "#
        ),
        ["<fn f>", "true", "<native fn>", "true"]
    );
}

#[test]
fn operand_type_errors() {
    assert_eq!(
        run_runtime_err(r#"print -"a";"#).1,
        "Operand must be a number.\n[line 1]"
    );
    assert_eq!(
        run_runtime_err(r#"print 1 + "a";"#).1,
        "Operands must be two numbers or two strings.\n[line 1]"
    );
    assert_eq!(
        run_runtime_err(r#"print 1 < "a";"#).1,
        "Operands must be numbers.\n[line 1]"
    );
}

#[test]
fn undefined_variables() {
    assert_eq!(
        run_runtime_err("print nope;").1,
        "Undefined variable 'nope'.\n[line 1]"
    );
    // Assignment never creates a binding.
    assert_eq!(
        run_runtime_err("x = 1;").1,
        "Undefined variable 'x'.\n[line 1]"
    );
}

#[test]
fn calling_errors() {
    assert_eq!(
        run_runtime_err(r#""str"();"#).1,
        "Can only call functions and classes.\n[line 1]"
    );
    assert_eq!(
        run_runtime_err("fun f(a, b) {}\nf(1);").1,
        "Expected 2 arguments but got 1.\n[line 2]"
    );
    assert_eq!(
        run_runtime_err("clock(1);").1,
        "Expected 0 arguments but got 1.\n[line 1]"
    );
}

#[test]
fn runtime_error_aborts_the_rest() {
    let (output, report) = run_runtime_err("print 1;\nprint 2;\nprint nil + 1;\nprint 3;");

    assert_eq!(output, ["1", "2"]);
    assert_eq!(report, "Operands must be two numbers or two strings.\n[line 3]");
}

#[test]
fn session_state_persists_between_runs() {
    let mut session = Session::new();

    session.run("var a = 1;").unwrap();
    session.run("fun f() { return a; }").unwrap();
    session.run("var h; { var x = 2; fun g() { return x; } h = g; }").unwrap();
    session.run("print f(); print h();").unwrap();

    assert_eq!(session.lines(), ["1", "2"]);
}

#[test]
fn failed_block_restores_the_global_scope() {
    let mut session = Session::new();

    assert!(session.run("{ var inner = 1; nil + 1; }").is_err());
    session.run("var b = 2;").unwrap();
    session.run("print b;").unwrap();

    assert!(session.run("print inner;").is_err());
    assert_eq!(session.lines(), ["2"]);
}

#[test]
fn exit_codes() {
    let mut session = Session::new();

    assert_eq!(session.run("print ;").unwrap_err().exit_code(), 65);
    assert_eq!(session.run("print -nil;").unwrap_err().exit_code(), 70);
}

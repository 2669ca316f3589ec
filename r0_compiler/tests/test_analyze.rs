use r0_compiler::{
    compile::Analyzer,
    error::{CompileError, Phase},
    lex::Lexer,
    parsing::{Parse, Program},
    token_stream::TokenStream,
};

const SOURCE: &str = include_str!("expr.r0");

fn analyze(source: &str) -> Result<(), CompileError> {
    let tokens = Lexer::new(source).scan().unwrap();
    let mut stream = TokenStream::new(tokens);
    let mut program = Program::parse(&mut stream).unwrap();
    Analyzer::new().check(&mut program)
}

fn analyze_err(source: &str) -> CompileError {
    let err = analyze(source).unwrap_err();
    assert_eq!(err.phase, Phase::Semantic);
    err
}

#[test]
fn test_analyze_fixture() {
    analyze(SOURCE).unwrap();
}

#[test]
fn test_forward_reference_and_recursion() {
    analyze(
        "fn even(n: int) -> int {\n\
             if n == 0 { return 1; }\n\
             return odd(n - 1);\n\
         }\n\
         fn odd(n: int) -> int {\n\
             if n == 0 { return 0; }\n\
             return even(n - 1);\n\
         }",
    )
    .unwrap();
}

#[test]
fn test_shadowing_across_scopes() {
    analyze(
        "fn f(x: int) -> int {\n\
             while x > 0 {\n\
                 let x: double = 1.0;\n\
                 putdouble(x);\n\
             }\n\
             return x;\n\
         }",
    )
    .unwrap();
}

#[test]
fn test_return_type_mismatch() {
    // Scenario: `fn f() -> int { return 1.0; }` fails at the return.
    let err = analyze_err("fn f() -> int { return 1.0; }");
    assert_eq!(
        err.render("prog.r0"),
        "prog.r0:1:17: semantic error: return type mismatch in function 'f'"
    );
}

#[test]
fn test_return_value_rules() {
    let err = analyze_err("fn f() -> void { return 1; }");
    assert!(err.message.contains("returns void"));

    let err = analyze_err("fn f() -> int { return; }");
    assert!(err.message.contains("missing return value"));
}

#[test]
fn test_undeclared_names() {
    assert!(analyze_err("fn f() -> void { x = 1; }")
        .message
        .contains("undefined variable 'x'"));
    assert!(analyze_err("fn f() -> int { return y; }")
        .message
        .contains("undeclared variable 'y'"));
    assert!(analyze_err("fn f() -> void { putstr(1); }")
        .message
        .contains("undefined function 'putstr'"));
}

#[test]
fn test_typed_lookup() {
    // Calling a variable is reported as an undefined function.
    let err = analyze_err("fn f() -> void { let g: int = 1; g(); }");
    assert!(err.message.contains("undefined function 'g'"));

    // Reading a function as a variable is an undeclared variable.
    let err = analyze_err(
        "fn g() -> int { return 1; }\n\
         fn f() -> void { let a: int = 0; a = g; }",
    );
    assert!(err.message.contains("undeclared variable 'g'"));
}

#[test]
fn test_redeclarations() {
    assert!(analyze_err("let a: int = 0;\nlet a: int = 1;\nfn f() -> void { }")
        .message
        .contains("redeclaration of symbol 'a'"));
    assert!(analyze_err("fn f() -> void { }\nfn f() -> void { }")
        .message
        .contains("redeclared function 'f'"));
    assert!(analyze_err("fn putint() -> void { }")
        .message
        .contains("redeclared function 'putint'"));
    assert!(analyze_err("fn f(a: int, a: int) -> void { }")
        .message
        .contains("duplicated parameter name 'a'"));
}

#[test]
fn test_const_rules() {
    let err = analyze_err("const g: int = 1;\nfn f() -> void { g = 2; }");
    assert!(err.message.contains("cannot assign to const variable 'g'"));

    let err = analyze_err("fn f(const x: int) -> void { x = 1; }");
    assert!(err.message.contains("cannot assign to const variable 'x'"));
}

#[test]
fn test_operand_type_rules() {
    // Mixed int and double operands.
    assert!(analyze("fn f() -> int { return 1 + 1.0; }").is_err());
    // Comparison results cannot feed arithmetic.
    assert!(analyze("fn f() -> int { return (1 == 2) + 3; }").is_err());
    // Negating a comparison result.
    assert!(analyze("fn f() -> void { let a: int = 0; a = -(1 < 2); }").is_err());
    // Assignments produce void and cannot be used as values.
    assert!(analyze("fn f() -> void { let a: int = 0; let c: int = a = 1; }").is_err());
}

#[test]
fn test_call_rules() {
    let err = analyze_err("fn f() -> void { putint(); }");
    assert!(err.message.contains("expected 1 arguments"));

    let err = analyze_err("fn f() -> void { putint(1.5); }");
    assert!(err.message.contains("argument type mismatch"));

    // Call results type-check as arguments and initializers.
    analyze("fn f() -> void { putint(getint()); }").unwrap();
    analyze("let x: int = getint();\nfn f() -> void { }").unwrap();
    assert!(analyze("fn f() -> void { putint(getdouble()); }").is_err());
}

#[test]
fn test_decl_initializer_rules() {
    let err = analyze_err("fn f() -> void { let a: double = 1; }");
    assert!(err.message.contains("cannot assign expression of type int"));

    // Conditions are expressions of any non-void operand type.
    analyze("fn f() -> void { while 1 { } }").unwrap();
}

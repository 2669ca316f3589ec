use r0_compiler::{
    lex::Lexer,
    parsing::{BinOp, Expr, Parse, Program, Stmt},
    token_stream::TokenStream,
};

const SOURCE: &str = include_str!("expr.r0");

fn parse(source: &str) -> Program {
    let tokens = Lexer::new(source).scan().unwrap();
    let mut stream = TokenStream::new(tokens);
    Program::parse(&mut stream).unwrap()
}

fn parse_err(source: &str) -> String {
    let tokens = Lexer::new(source).scan().unwrap();
    let mut stream = TokenStream::new(tokens);
    Program::parse(&mut stream).unwrap_err().message
}

/// First expression of the only statement of `fn f() -> int { ... }`.
fn first_expr(program: &Program) -> &Expr {
    match &program.functions[0].body.statements[0] {
        Stmt::Return(stmt) => stmt.expr.as_ref().unwrap(),
        Stmt::Expr(stmt) => &stmt.expr,
        other => panic!("unexpected statement: {:?}", other),
    }
}

#[test]
fn test_lex_fixture() {
    r0_compiler::lex::debug_print_tokens(SOURCE);
}

#[test]
fn test_parse_fixture() {
    let program = parse(SOURCE);
    assert_eq!(program.globals.len(), 2);
    assert!(!program.globals[0].is_const);
    assert!(program.globals[1].is_const);
    assert_eq!(program.functions.len(), 2);
    assert_eq!(program.functions[0].name, "weigh");
    assert_eq!(program.functions[0].params.len(), 2);
    assert!(program.functions[0].body.is_func_body);
}

#[test]
fn test_precedence_climbing() {
    let program = parse("fn f() -> int { return 1 + 2 * 3; }");
    // `*` binds tighter: Add(1, Mul(2, 3))
    match first_expr(&program) {
        Expr::Binary(add) => {
            assert_eq!(add.op, BinOp::Add);
            match add.right.as_ref() {
                Expr::Binary(mul) => assert_eq!(mul.op, BinOp::Mul),
                other => panic!("expected multiplication, got {:?}", other),
            }
        }
        other => panic!("expected binary op, got {:?}", other),
    }
}

#[test]
fn test_left_associativity() {
    let program = parse("fn f() -> int { return 10 - 4 - 3; }");
    // Sub(Sub(10, 4), 3)
    match first_expr(&program) {
        Expr::Binary(outer) => {
            assert_eq!(outer.op, BinOp::Sub);
            assert!(matches!(outer.left.as_ref(), Expr::Binary(inner) if inner.op == BinOp::Sub));
        }
        other => panic!("expected binary op, got {:?}", other),
    }
}

#[test]
fn test_negate_takes_full_expression() {
    let program = parse("fn f() -> int { return -1 + 2; }");
    // Unary minus is right-associative over the whole expression:
    // Negate(Add(1, 2))
    match first_expr(&program) {
        Expr::Negate(negate) => {
            assert!(matches!(negate.operand.as_ref(), Expr::Binary(add) if add.op == BinOp::Add));
        }
        other => panic!("expected negate, got {:?}", other),
    }
}

#[test]
fn test_assignment_lookahead() {
    let program = parse("fn f() -> void { x = y + 1; }");
    match first_expr(&program) {
        Expr::Assign(assign) => {
            assert_eq!(assign.lhs, "x");
            assert!(matches!(assign.rhs.as_ref(), Expr::Binary(_)));
        }
        other => panic!("expected assignment, got {:?}", other),
    }

    // A bare identifier followed by `(` is a call instead.
    let program = parse("fn f() -> void { x(y, 1); }");
    match first_expr(&program) {
        Expr::Call(call) => {
            assert_eq!(call.callee, "x");
            assert_eq!(call.args.len(), 2);
        }
        other => panic!("expected call, got {:?}", other),
    }
}

#[test]
fn test_else_if_chain() {
    let program = parse(
        "fn f(x: int) -> int {\
             if x < 0 { return -1; } else if x == 0 { return 0; } else { return 1; }\
         }",
    );
    match &program.functions[0].body.statements[0] {
        Stmt::If(stmt) => {
            assert_eq!(stmt.elif_part.len(), 1);
            assert!(stmt.else_part.is_some());
        }
        other => panic!("expected if, got {:?}", other),
    }
}

#[test]
fn test_tree_printer() {
    let program = parse("fn f() -> int { return 1 + 2 * 3; }");
    let tree = program.to_string();
    let lines: Vec<&str> = tree.lines().collect();
    assert_eq!(
        lines,
        vec![
            "Program",
            "  Fn f() -> int",
            "    Block",
            "      Return",
            "        BinaryOp +",
            "          Literal 1",
            "          BinaryOp *",
            "            Literal 2",
            "            Literal 3",
        ]
    );
}

#[test]
fn test_empty_program_is_valid() {
    let program = parse("");
    assert!(program.globals.is_empty());
    assert!(program.functions.is_empty());
}

#[test]
fn test_syntax_errors() {
    assert!(parse_err("const c: int;").contains("uninitialized constant 'c'"));
    assert!(parse_err("fn f() -> void { let b: bool = 1; }").contains("'int' or 'double'"));
    assert!(parse_err("fn f() -> void { if 1 { } else return; }")
        .contains("expected an 'if' or '{' after 'else'"));
    assert!(parse_err("fn f() -> int { return (1 + 2; }").contains("')'"));
    assert!(parse_err("let g: int = 0; 5;").contains("unexpected token"));
    assert!(parse_err("fn f() -> void { }\nlet late: int = 0;")
        .contains("at end of program"));
}

#[test]
fn test_as_is_rejected() {
    // `as` is tokenized as a keyword but has no grammar rule; it
    // surfaces as an ordinary syntax error.
    let message = parse_err("fn f() -> void { let a: int = 1; a as int; }");
    assert!(message.contains("'as'"), "got: {}", message);
}

#[test]
fn test_return_records_enclosing_function() {
    let program = parse("fn f() -> int { return 1; }");
    match &program.functions[0].body.statements[0] {
        Stmt::Return(stmt) => {
            assert_eq!(stmt.func_name, "f");
            assert_eq!(stmt.return_type, r0_compiler::parsing::VarType::Int);
        }
        other => panic!("expected return, got {:?}", other),
    }
}

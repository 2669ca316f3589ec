//! Expressions and precedence climbing.
use smol_str::SmolStr;
use std::fmt;

use super::{ExprType, Parse};
use crate::{
    error::{CompileError, CompileResult},
    token_stream::TokenStream,
    tokens::{Position, TokenKind},
};

#[derive(Debug)]
pub enum Expr {
    Literal(LiteralExpr),
    Ident(IdentExpr),
    Assign(AssignExpr),
    Call(CallExpr),
    Binary(BinaryExpr),
    Negate(NegateExpr),
}

#[derive(Debug)]
pub struct LiteralExpr {
    pub lexeme: SmolStr,
    pub value: LitValue,
    pub ty: ExprType,
    pub pos: Position,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LitValue {
    Int(i64),
    Double(f64),
}

#[derive(Debug)]
pub struct IdentExpr {
    pub name: SmolStr,
    pub ty: ExprType,
    pub pos: Position,
}

#[derive(Debug)]
pub struct AssignExpr {
    pub lhs: SmolStr,
    pub rhs: Box<Expr>,
    pub ty: ExprType,
    pub pos: Position,
}

#[derive(Debug)]
pub struct CallExpr {
    pub callee: SmolStr,
    pub args: Vec<Expr>,
    pub ty: ExprType,
    pub pos: Position,
}

#[derive(Debug)]
pub struct BinaryExpr {
    pub op: BinOp,
    pub left: Box<Expr>,
    pub right: Box<Expr>,
    pub ty: ExprType,
    pub pos: Position,
}

#[derive(Debug)]
pub struct NegateExpr {
    pub operand: Box<Expr>,
    pub ty: ExprType,
    pub pos: Position,
}

impl Expr {
    pub fn pos(&self) -> Position {
        match self {
            Expr::Literal(e) => e.pos,
            Expr::Ident(e) => e.pos,
            Expr::Assign(e) => e.pos,
            Expr::Call(e) => e.pos,
            Expr::Binary(e) => e.pos,
            Expr::Negate(e) => e.pos,
        }
    }

    pub fn ty(&self) -> ExprType {
        match self {
            Expr::Literal(e) => e.ty,
            Expr::Ident(e) => e.ty,
            Expr::Assign(e) => e.ty,
            Expr::Call(e) => e.ty,
            Expr::Binary(e) => e.ty,
            Expr::Negate(e) => e.ty,
        }
    }
}

/// Binary operators, in climbing-precedence order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinOp {
    Add,
    Sub,
    Mul,
    Div,
    Lt,
    Gt,
    LtEq,
    GtEq,
    Eq,
    NotEq,
}

impl BinOp {
    #[rustfmt::skip]
    fn from_token(kind: TokenKind) -> Option<Self> {
        use TokenKind as T;
        match kind {
            T::Plus  => Some(BinOp::Add),
            T::Minus => Some(BinOp::Sub),
            T::Star  => Some(BinOp::Mul),
            T::Slash => Some(BinOp::Div),
            T::Lt    => Some(BinOp::Lt),
            T::Gt    => Some(BinOp::Gt),
            T::LtEq  => Some(BinOp::LtEq),
            T::GtEq  => Some(BinOp::GtEq),
            T::Eq    => Some(BinOp::Eq),
            T::NotEq => Some(BinOp::NotEq),
            _        => None,
        }
    }

    /// Higher binds tighter.
    pub fn precedence(self) -> u8 {
        match self {
            BinOp::Mul | BinOp::Div => 4,
            BinOp::Add | BinOp::Sub => 3,
            _ => 2,
        }
    }

    pub fn is_comparison(self) -> bool {
        self.precedence() == 2
    }
}

impl fmt::Display for BinOp {
    #[rustfmt::skip]
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            BinOp::Add   => write!(f, "+"),
            BinOp::Sub   => write!(f, "-"),
            BinOp::Mul   => write!(f, "*"),
            BinOp::Div   => write!(f, "/"),
            BinOp::Lt    => write!(f, "<"),
            BinOp::Gt    => write!(f, ">"),
            BinOp::LtEq  => write!(f, "<="),
            BinOp::GtEq  => write!(f, ">="),
            BinOp::Eq    => write!(f, "=="),
            BinOp::NotEq => write!(f, "!="),
        }
    }
}

const MIN_PRECEDENCE: u8 = 1;

impl Parse for Expr {
    type Output = Self;

    fn parse(input: &mut TokenStream) -> CompileResult<Expr> {
        parse_expr(input, MIN_PRECEDENCE)
    }
}

/// Precedence climbing entry point.
///
/// Assignment is not an operator here; it is recognized up front by the
/// `IDENT '='` two-token lookahead, and its right-hand side is a full
/// expression.
fn parse_expr(input: &mut TokenStream, min_precedence: u8) -> CompileResult<Expr> {
    use TokenKind as T;

    let left = match input.peek_kind(0) {
        T::LeftParen => {
            input.next_token();
            let expr = parse_expr(input, MIN_PRECEDENCE)?;
            input.consume(T::RightParen)?;
            expr
        }
        T::Minus => parse_negate(input)?,
        T::Int | T::Double => parse_literal(input)?,
        T::Ident => match input.peek_kind(1) {
            T::LeftParen => parse_call(input)?,
            T::Assign => parse_assign(input)?,
            _ => parse_ident(input)?,
        },
        _ => {
            return Err(CompileError::syntax(input.peek(0).pos, "invalid expression"));
        }
    };

    parse_binary_rhs(input, left, min_precedence)
}

/// Climbing loop: left-associativity comes from requesting the
/// sub-expression at `precedence + 1`.
fn parse_binary_rhs(
    input: &mut TokenStream,
    mut left: Expr,
    min_precedence: u8,
) -> CompileResult<Expr> {
    loop {
        let op = match BinOp::from_token(input.peek_kind(0)) {
            Some(op) if op.precedence() >= min_precedence => op,
            _ => break,
        };
        let pos = input.next_token().pos;

        let right = parse_expr(input, op.precedence() + 1)?;
        left = Expr::Binary(BinaryExpr {
            op,
            left: Box::new(left),
            right: Box::new(right),
            ty: ExprType::default(),
            pos,
        });
    }

    Ok(left)
}

/// Literals carry their computed type and const flag out of the parser.
fn parse_literal(input: &mut TokenStream) -> CompileResult<Expr> {
    use super::VarType;

    let token = input.next_token();
    let (value, ty) = match token.kind {
        TokenKind::Int => {
            let value = token.lexeme.parse::<i64>().map_err(|_| {
                CompileError::syntax(
                    token.pos,
                    format!("integer literal '{}' is out of range", token.lexeme),
                )
            })?;
            (LitValue::Int(value), VarType::Int)
        }
        TokenKind::Double => {
            let value = token.lexeme.parse::<f64>().map_err(|_| {
                CompileError::syntax(
                    token.pos,
                    format!("invalid float literal '{}'", token.lexeme),
                )
            })?;
            (LitValue::Double(value), VarType::Double)
        }
        _ => unreachable!("literal parser called on a non-literal token"),
    };

    Ok(Expr::Literal(LiteralExpr {
        lexeme: token.lexeme,
        value,
        ty: ExprType { ty, is_const: true },
        pos: token.pos,
    }))
}

/// A leading `-` takes a full expression as its operand.
fn parse_negate(input: &mut TokenStream) -> CompileResult<Expr> {
    let pos = input.consume(TokenKind::Minus)?.pos;
    let operand = parse_expr(input, MIN_PRECEDENCE)?;

    Ok(Expr::Negate(NegateExpr {
        operand: Box::new(operand),
        ty: ExprType::default(),
        pos,
    }))
}

fn parse_assign(input: &mut TokenStream) -> CompileResult<Expr> {
    let lhs = input.consume(TokenKind::Ident)?.lexeme;
    let pos = input.consume(TokenKind::Assign)?.pos;
    let rhs = parse_expr(input, MIN_PRECEDENCE)?;

    Ok(Expr::Assign(AssignExpr {
        lhs,
        rhs: Box::new(rhs),
        ty: ExprType::default(),
        pos,
    }))
}

fn parse_call(input: &mut TokenStream) -> CompileResult<Expr> {
    let name = input.consume(TokenKind::Ident)?;
    input.consume(TokenKind::LeftParen)?;

    let mut args = vec![];
    if input.peek_kind(0) != TokenKind::RightParen {
        loop {
            args.push(parse_expr(input, MIN_PRECEDENCE)?);
            if !input.match_token(TokenKind::Comma) {
                break;
            }
        }
    }
    input.consume(TokenKind::RightParen)?;

    Ok(Expr::Call(CallExpr {
        callee: name.lexeme,
        args,
        ty: ExprType::default(),
        pos: name.pos,
    }))
}

fn parse_ident(input: &mut TokenStream) -> CompileResult<Expr> {
    let token = input.consume(TokenKind::Ident)?;

    Ok(Expr::Ident(IdentExpr {
        name: token.lexeme,
        ty: ExprType::default(),
        pos: token.pos,
    }))
}

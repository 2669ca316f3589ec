//! Statement parsing.
use smol_str::SmolStr;

use super::{parse_var_type, Expr, FuncCtx, Parse, VarType};
use crate::{
    error::{CompileError, CompileResult},
    token_stream::TokenStream,
    tokens::{KeywordKind, Position, TokenKind},
};

#[derive(Debug)]
pub enum Stmt {
    Decl(DeclStmt),
    If(IfStmt),
    While(WhileStmt),
    Return(ReturnStmt),
    /// Nested block
    Block(BlockStmt),
    Expr(ExprStmt),
}

impl Stmt {
    /// Dispatch on the first token of the statement.
    pub fn parse_in(input: &mut TokenStream, func: &FuncCtx) -> CompileResult<Stmt> {
        use KeywordKind as K;
        use TokenKind as T;

        match input.peek_kind(0) {
            T::Keyword(K::Let) | T::Keyword(K::Const) => DeclStmt::parse(input).map(Stmt::Decl),
            T::Keyword(K::If) => IfStmt::parse_in(input, func).map(Stmt::If),
            T::Keyword(K::While) => WhileStmt::parse_in(input, func).map(Stmt::While),
            T::Keyword(K::Return) => ReturnStmt::parse_in(input, func).map(Stmt::Return),
            T::LeftBrace => BlockStmt::parse_in(input, func).map(Stmt::Block),
            _ => ExprStmt::parse(input).map(Stmt::Expr),
        }
    }
}

/// Declaration of a variable, constant or parameter.
///
/// ```text
/// let x: int = 7;
/// const y: double = 1.5;
/// ```
#[derive(Debug)]
pub struct DeclStmt {
    pub name: SmolStr,
    pub ty: VarType,
    pub is_const: bool,
    pub initializer: Option<Expr>,
    pub pos: Position,
}

impl Parse for DeclStmt {
    type Output = Self;

    fn parse(input: &mut TokenStream) -> CompileResult<Self> {
        use KeywordKind as K;
        use TokenKind as T;

        let keyword = input.next_token();
        let is_const = match keyword.kind {
            T::Keyword(K::Let) => false,
            T::Keyword(K::Const) => true,
            _ => unreachable!("declaration parser called without 'let' or 'const'"),
        };

        let name = input.consume(T::Ident)?.lexeme;
        input.consume(T::Colon)?;
        let ty = parse_var_type(input)?;

        let initializer = if input.match_token(T::Assign) {
            Some(Expr::parse(input)?)
        } else {
            None
        };

        // A constant must be initialized.
        if is_const && initializer.is_none() {
            return Err(CompileError::syntax(
                keyword.pos,
                format!("uninitialized constant '{}'", name),
            ));
        }

        input.consume(T::Semicolon)?;

        Ok(DeclStmt {
            name,
            ty,
            is_const,
            initializer,
            pos: keyword.pos,
        })
    }
}

#[derive(Debug)]
pub struct BlockStmt {
    pub statements: Vec<Stmt>,
    /// A function body shares the scope its parameters were
    /// inserted into, so the analyzer must not push another one.
    pub is_func_body: bool,
    pub pos: Position,
}

impl BlockStmt {
    pub fn parse_in(input: &mut TokenStream, func: &FuncCtx) -> CompileResult<Self> {
        input.consume(TokenKind::LeftBrace)?;
        let pos = input.peek(0).pos;

        let mut statements = vec![];
        loop {
            match input.peek_kind(0) {
                TokenKind::RightBrace => break,
                TokenKind::Eof => {
                    return Err(CompileError::syntax(
                        input.peek(0).pos,
                        "unexpected end of file in block, expected '}'",
                    ));
                }
                _ => statements.push(Stmt::parse_in(input, func)?),
            }
        }
        input.consume(TokenKind::RightBrace)?;

        Ok(BlockStmt {
            statements,
            is_func_body: false,
            pos,
        })
    }
}

/// One `condition { body }` arm of an if-statement.
#[derive(Debug)]
pub struct CondBody {
    pub condition: Expr,
    pub body: BlockStmt,
}

#[derive(Debug)]
pub struct IfStmt {
    pub if_part: CondBody,
    /// `else if` arms in source order.
    pub elif_part: Vec<CondBody>,
    pub else_part: Option<BlockStmt>,
    pub pos: Position,
}

impl IfStmt {
    fn parse_in(input: &mut TokenStream, func: &FuncCtx) -> CompileResult<Self> {
        use KeywordKind as K;
        use TokenKind as T;

        let pos = input.consume(T::Keyword(K::If))?.pos;
        let if_part = CondBody {
            condition: Expr::parse(input)?,
            body: BlockStmt::parse_in(input, func)?,
        };

        let mut elif_part = vec![];
        let mut else_part = None;
        while input.match_token(T::Keyword(K::Else)) {
            match input.peek_kind(0) {
                // A final else block ends the chain.
                T::LeftBrace => {
                    else_part = Some(BlockStmt::parse_in(input, func)?);
                    break;
                }
                T::Keyword(K::If) => {
                    input.next_token();
                    elif_part.push(CondBody {
                        condition: Expr::parse(input)?,
                        body: BlockStmt::parse_in(input, func)?,
                    });
                }
                _ => {
                    return Err(CompileError::syntax(
                        input.peek(0).pos,
                        "expected an 'if' or '{' after 'else'",
                    ));
                }
            }
        }

        Ok(IfStmt {
            if_part,
            elif_part,
            else_part,
            pos,
        })
    }
}

#[derive(Debug)]
pub struct WhileStmt {
    pub condition: Expr,
    pub body: BlockStmt,
    pub pos: Position,
}

impl WhileStmt {
    fn parse_in(input: &mut TokenStream, func: &FuncCtx) -> CompileResult<Self> {
        let pos = input.consume(TokenKind::Keyword(KeywordKind::While))?.pos;

        Ok(WhileStmt {
            condition: Expr::parse(input)?,
            body: BlockStmt::parse_in(input, func)?,
            pos,
        })
    }
}

/// A return statement records the signature of its enclosing function,
/// threaded through statement parsing.
#[derive(Debug)]
pub struct ReturnStmt {
    pub func_name: SmolStr,
    pub return_type: VarType,
    pub expr: Option<Expr>,
    pub pos: Position,
}

impl ReturnStmt {
    fn parse_in(input: &mut TokenStream, func: &FuncCtx) -> CompileResult<Self> {
        let pos = input.consume(TokenKind::Keyword(KeywordKind::Return))?.pos;

        let expr = if input.peek_kind(0) != TokenKind::Semicolon {
            Some(Expr::parse(input)?)
        } else {
            None
        };
        input.consume(TokenKind::Semicolon)?;

        Ok(ReturnStmt {
            func_name: func.name.clone(),
            return_type: func.return_type,
            expr,
            pos,
        })
    }
}

/// Expression statement, terminated by a semicolon.
#[derive(Debug)]
pub struct ExprStmt {
    pub expr: Expr,
    pub pos: Position,
}

impl Parse for ExprStmt {
    type Output = Self;

    fn parse(input: &mut TokenStream) -> CompileResult<Self> {
        let pos = input.peek(0).pos;
        let expr = Expr::parse(input)?;
        input.consume(TokenKind::Semicolon)?;

        Ok(ExprStmt { expr, pos })
    }
}

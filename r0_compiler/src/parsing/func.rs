//! Function definitions.
use smol_str::SmolStr;

use super::{parse_return_type, parse_var_type, BlockStmt, DeclStmt, Parse, VarType};
use crate::{
    error::CompileResult,
    token_stream::TokenStream,
    tokens::{KeywordKind, Position, TokenKind},
};

#[derive(Debug)]
pub struct FuncDef {
    pub name: SmolStr,
    /// Parameters are declarations without initializers.
    pub params: Vec<DeclStmt>,
    pub return_type: VarType,
    pub body: BlockStmt,
    pub pos: Position,
}

/// Signature of the function whose body is being parsed.
///
/// Threaded through statement parsing so `return` statements can record
/// their enclosing function without a back-pointer into the tree.
pub struct FuncCtx {
    pub name: SmolStr,
    pub return_type: VarType,
}

impl Parse for FuncDef {
    type Output = Self;

    fn parse(input: &mut TokenStream) -> CompileResult<Self> {
        input.consume(TokenKind::Keyword(KeywordKind::Fn))?;
        let name = input.consume(TokenKind::Ident)?;

        input.consume(TokenKind::LeftParen)?;
        let params = parse_params(input)?;
        input.consume(TokenKind::RightParen)?;

        input.consume(TokenKind::Arrow)?;
        let return_type = parse_return_type(input)?;

        let ctx = FuncCtx {
            name: name.lexeme.clone(),
            return_type,
        };
        let mut body = BlockStmt::parse_in(input, &ctx)?;
        body.is_func_body = true;

        Ok(FuncDef {
            name: name.lexeme,
            params,
            return_type,
            body,
            pos: name.pos,
        })
    }
}

/// Comma separated `'const'? IDENT ':' type` list.
fn parse_params(input: &mut TokenStream) -> CompileResult<Vec<DeclStmt>> {
    use KeywordKind as K;
    use TokenKind as T;

    let mut params = vec![];

    loop {
        let is_const = match input.peek_kind(0) {
            T::Keyword(K::Const) => {
                input.next_token();
                true
            }
            T::Ident => false,
            _ => break,
        };

        let name = input.consume(T::Ident)?;
        input.consume(T::Colon)?;
        let ty = parse_var_type(input)?;

        params.push(DeclStmt {
            name: name.lexeme,
            ty,
            is_const,
            initializer: None,
            pos: name.pos,
        });

        if !input.match_token(T::Comma) {
            break;
        }
    }

    Ok(params)
}

//! Program root.
use super::{DeclStmt, FuncDef, Parse};
use crate::{
    error::{CompileError, CompileResult},
    token_stream::TokenStream,
    tokens::{KeywordKind, TokenKind},
};

/// A whole compilation unit: global declarations followed by function
/// definitions.
#[derive(Debug)]
pub struct Program {
    pub globals: Vec<DeclStmt>,
    pub functions: Vec<FuncDef>,
}

impl Parse for Program {
    type Output = Self;

    fn parse(input: &mut TokenStream) -> CompileResult<Self> {
        use KeywordKind as K;
        use TokenKind as T;

        let mut globals = vec![];
        loop {
            match input.peek_kind(0) {
                T::Keyword(K::Let) | T::Keyword(K::Const) => {
                    globals.push(DeclStmt::parse(input)?);
                }
                T::Keyword(K::Fn) | T::Eof => break,
                kind => {
                    return Err(CompileError::syntax(
                        input.peek(0).pos,
                        format!("unexpected token '{}'", kind),
                    ));
                }
            }
        }

        let mut functions = vec![];
        while input.peek_kind(0) == T::Keyword(K::Fn) {
            functions.push(FuncDef::parse(input)?);
        }

        if !input.at_end() {
            return Err(CompileError::syntax(
                input.peek(0).pos,
                format!(
                    "unexpected token '{}' at end of program",
                    input.peek_kind(0)
                ),
            ));
        }

        Ok(Program { globals, functions })
    }
}

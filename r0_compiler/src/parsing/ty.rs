//! Value types of the r0 language.
use std::fmt;

use crate::{
    error::{CompileError, CompileResult},
    token_stream::TokenStream,
    tokens::TokenKind,
};

/// Type of a variable, parameter or expression.
///
/// `Bool` only arises as the result of a comparison operator; no source
/// syntax names it. `Void` is a function return type and the type of an
/// assignment expression.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum VarType {
    Int,
    Double,
    Bool,
    #[default]
    Void,
}

impl fmt::Display for VarType {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            VarType::Int => write!(f, "int"),
            VarType::Double => write!(f, "double"),
            VarType::Bool => write!(f, "bool"),
            VarType::Void => write!(f, "void"),
        }
    }
}

/// Type annotation computed for an expression node.
#[derive(Debug, Clone, Copy, Default)]
pub struct ExprType {
    pub ty: VarType,
    /// Set on literals only; used for diagnostics.
    pub is_const: bool,
}

/// Parse the type of a variable or parameter. Only `int` and `double`
/// may be named here.
pub fn parse_var_type(input: &mut TokenStream) -> CompileResult<VarType> {
    let token = input.consume(TokenKind::Ident)?;
    match token.lexeme.as_str() {
        "int" => Ok(VarType::Int),
        "double" => Ok(VarType::Double),
        _ => Err(CompileError::syntax(
            token.pos,
            format!("expected 'int' or 'double', found '{}'", token.lexeme),
        )),
    }
}

/// Parse a function return type, which additionally accepts `void`.
pub fn parse_return_type(input: &mut TokenStream) -> CompileResult<VarType> {
    let token = input.consume(TokenKind::Ident)?;
    match token.lexeme.as_str() {
        "int" => Ok(VarType::Int),
        "double" => Ok(VarType::Double),
        "void" => Ok(VarType::Void),
        _ => Err(CompileError::syntax(
            token.pos,
            format!("expected a return type, found '{}'", token.lexeme),
        )),
    }
}

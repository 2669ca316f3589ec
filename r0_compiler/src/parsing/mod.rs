//! Syntactic analysis (recursive descent parser).
mod expr;
mod func;
mod print;
mod prog;
mod stmts;
mod ty;

pub use expr::*;
pub use func::*;
pub use prog::*;
pub use stmts::*;
pub use ty::*;

use crate::{error::CompileResult, token_stream::TokenStream};

pub trait Parse: Sized {
    type Output;

    fn parse(input: &mut TokenStream) -> CompileResult<Self::Output>;
}

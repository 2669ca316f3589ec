//! Compiler for the r0 language.
//!
//! Data flows strictly forward through the pipeline: source text is
//! scanned into tokens, parsed into a tree, analyzed (names resolved,
//! types checked and written into the tree), compiled into basic
//! blocks with patched jumps, and serialized into a VM image.
pub mod compile;
pub mod error;
pub mod lex;
pub mod parsing;
pub mod token_stream;
pub mod tokens;

use error::CompileResult;
use parsing::Parse;
use r0_bytecode::ProgramImage;

/// Compile source text into a program image.
pub fn compile_image(source: &str) -> CompileResult<ProgramImage> {
    // Lexical analysis
    let tokens = lex::Lexer::new(source).scan()?;
    let mut stream = token_stream::TokenStream::new(tokens);

    // Syntactic analysis
    let mut program = parsing::Program::parse(&mut stream)?;

    // Semantic analysis
    compile::Analyzer::new().check(&mut program)?;

    // Code generation
    compile::CodeGen::new().compile(&program)
}

/// Compile source text into serialized image bytes.
pub fn compile_str(source: &str) -> CompileResult<Vec<u8>> {
    compile_image(source).map(|image| image.to_bytes())
}

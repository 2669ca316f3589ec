//! Semantic analysis and code generation.
mod analyzer;
mod block;
pub mod builtins;
mod codegen;
mod symbol;

pub use analyzer::Analyzer;
pub use block::{BasicBlock, BlockId};
pub use codegen::{CodeGen, VarScope, Variable};
pub use symbol::{Binding, FuncBinding, Scope, ScopeStack, VarBinding};

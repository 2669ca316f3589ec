//! Binary image format for the r0 virtual machine.
//!
//! An image is a global constant pool, a function table, and the
//! per-function instruction streams, serialized big-endian. The VM's
//! entry convention is the synthesized `_start` function; this crate
//! only defines the container, the compiler decides its contents.
pub mod image;
pub mod instr;
pub mod utils;

pub use self::{
    image::{Function, GlobalDef, ProgramImage, MAGIC, VERSION},
    instr::{opcodes, Instr},
};

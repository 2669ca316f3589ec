//! Program image records and the container serializer.
use std::io::{self, Write};

use crate::instr::Instr;
use crate::utils::{write_u32, write_u8};

/// First four bytes of every r0 image, `r0;>`.
pub const MAGIC: u32 = 0x72303b3e;
/// Container format version.
pub const VERSION: u32 = 0x00000001;

/// An entry in the image's global table.
///
/// Variable slots are 4-byte placeholders whose initial value is written
/// at runtime by `_start`; function names occupy their UTF-8 bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GlobalDef {
    pub is_const: u8,
    pub value: Vec<u8>,
}

impl GlobalDef {
    /// Placeholder slot for a global variable.
    pub fn placeholder(is_const: bool) -> Self {
        Self {
            is_const: is_const as u8,
            value: vec![0; 4],
        }
    }

    /// Name blob for an entry in the function table or a runtime builtin.
    pub fn name(name: &str) -> Self {
        Self {
            is_const: 1,
            value: name.as_bytes().to_vec(),
        }
    }
}

/// An entry in the image's function table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Function {
    /// Global-table index of this function's name.
    pub name_index: u32,
    pub return_slots: u32,
    pub param_slots: u32,
    pub loc_slots: u32,
    pub instructions: Vec<Instr>,
}

/// A complete program image ready for serialization.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ProgramImage {
    pub globals: Vec<GlobalDef>,
    pub functions: Vec<Function>,
}

impl ProgramImage {
    /// Serialize the image. Layout:
    ///
    /// ```text
    /// magic    u32
    /// version  u32
    /// globals  u32, then per global: is_const u8, length u32, bytes
    /// funcs    u32, then per function: name u32, return_slots u32,
    ///          param_slots u32, loc_slots u32, instruction count u32,
    ///          then each instruction as opcode u8 + immediate
    /// ```
    pub fn write_to(&self, out: &mut impl Write) -> io::Result<()> {
        write_u32(out, MAGIC)?;
        write_u32(out, VERSION)?;

        write_u32(out, self.globals.len() as u32)?;
        for global in &self.globals {
            write_u8(out, global.is_const)?;
            write_u32(out, global.value.len() as u32)?;
            out.write_all(&global.value)?;
        }

        write_u32(out, self.functions.len() as u32)?;
        for func in &self.functions {
            write_u32(out, func.name_index)?;
            write_u32(out, func.return_slots)?;
            write_u32(out, func.param_slots)?;
            write_u32(out, func.loc_slots)?;
            write_u32(out, func.instructions.len() as u32)?;
            for instr in &func.instructions {
                instr.write_to(out)?;
            }
        }

        Ok(())
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        let mut buf = Vec::new();
        self.write_to(&mut buf)
            .expect("writing to an in-memory buffer cannot fail");
        buf
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_empty_image_header() {
        let bytes = ProgramImage::default().to_bytes();
        assert_eq!(&bytes[0..4], &[0x72, 0x30, 0x3b, 0x3e]);
        assert_eq!(&bytes[4..8], &[0, 0, 0, 1]);
        // Zero globals, zero functions.
        assert_eq!(&bytes[8..16], &[0; 8]);
    }

    #[test]
    fn test_write_globals() {
        let image = ProgramImage {
            globals: vec![GlobalDef::placeholder(false), GlobalDef::name("f")],
            functions: vec![],
        };
        let bytes = image.to_bytes();
        assert_eq!(
            &bytes[8..],
            &[
                0, 0, 0, 2, // global count
                0, 0, 0, 0, 4, 0, 0, 0, 0, // 4-byte placeholder
                1, 0, 0, 0, 1, b'f', // name blob
                0, 0, 0, 0, // function count
            ]
        );
    }

    #[test]
    fn test_write_function() {
        let image = ProgramImage {
            globals: vec![],
            functions: vec![Function {
                name_index: 1,
                return_slots: 1,
                param_slots: 2,
                loc_slots: 0,
                instructions: vec![Instr::Arga(0), Instr::Ret],
            }],
        };
        let bytes = image.to_bytes();
        assert_eq!(
            &bytes[12..],
            &[
                0, 0, 0, 1, // function count
                0, 0, 0, 1, // name index
                0, 0, 0, 1, // return slots
                0, 0, 0, 2, // param slots
                0, 0, 0, 0, // local slots
                0, 0, 0, 2, // instruction count
                0x0b, 0, 0, 0, 0, // arga 0
                0x49, // ret
            ]
        );
    }
}

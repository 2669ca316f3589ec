//! Byte-order helpers for the image writer.
//!
//! Every multi-byte integer in an r0 image is big-endian.
use std::io::{self, Write};

#[inline(always)]
pub fn write_u8(out: &mut impl Write, value: u8) -> io::Result<()> {
    out.write_all(&[value])
}

#[inline(always)]
pub fn write_u32(out: &mut impl Write, value: u32) -> io::Result<()> {
    out.write_all(&value.to_be_bytes())
}

#[inline(always)]
pub fn write_u64(out: &mut impl Write, value: u64) -> io::Result<()> {
    out.write_all(&value.to_be_bytes())
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_big_endian_order() {
        let mut buf = Vec::new();
        write_u32(&mut buf, 0x72303b3e).unwrap();
        assert_eq!(buf, [0x72, 0x30, 0x3b, 0x3e]);

        buf.clear();
        write_u64(&mut buf, 7).unwrap();
        assert_eq!(buf, [0, 0, 0, 0, 0, 0, 0, 7]);
    }
}

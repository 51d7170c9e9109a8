//! Little-endian field I/O.
//!
//! Wire format: 4-byte signed integers and 8-byte IEEE-754 doubles, both
//! little-endian, no framing beyond field order. End of input inside a
//! field is a truncation fault; end of input on the first byte of a field
//! is reported separately so the session can treat a close between
//! commands as a normal shutdown.

use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};
use std::io::{self, ErrorKind, Read, Write};

use crate::error::ProtoError;

/// Read an `i32` field; EOF anywhere inside it is a truncation fault.
pub fn read_i32(r: &mut impl Read) -> Result<i32, ProtoError> {
    r.read_i32::<LittleEndian>().map_err(map_eof)
}

/// Read an `f64` field; EOF anywhere inside it is a truncation fault.
pub fn read_f64(r: &mut impl Read) -> Result<f64, ProtoError> {
    r.read_f64::<LittleEndian>().map_err(map_eof)
}

/// Read an `i32` field, distinguishing a clean end of input.
///
/// Returns `Ok(None)` when the stream ends before the first byte of the
/// field; EOF after at least one byte is a truncation fault.
pub fn try_read_i32(r: &mut impl Read) -> Result<Option<i32>, ProtoError> {
    let mut buf = [0u8; 4];
    let mut filled = 0;
    while filled < buf.len() {
        match r.read(&mut buf[filled..]) {
            Ok(0) if filled == 0 => return Ok(None),
            Ok(0) => return Err(ProtoError::Truncated),
            Ok(n) => filled += n,
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => return Err(ProtoError::Io(e)),
        }
    }
    Ok(Some(i32::from_le_bytes(buf)))
}

pub fn write_i32(w: &mut impl Write, value: i32) -> io::Result<()> {
    w.write_i32::<LittleEndian>(value)
}

pub fn write_f64(w: &mut impl Write, value: f64) -> io::Result<()> {
    w.write_f64::<LittleEndian>(value)
}

fn map_eof(e: io::Error) -> ProtoError {
    if e.kind() == ErrorKind::UnexpectedEof {
        ProtoError::Truncated
    } else {
        ProtoError::Io(e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::io::Cursor;

    #[test]
    fn fields_are_little_endian() {
        let mut buf = Vec::new();
        write_i32(&mut buf, 7).unwrap();
        write_f64(&mut buf, 1.0).unwrap();
        assert_eq!(
            buf,
            [7, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0xF0, 0x3F],
            "low byte first"
        );
        let mut cursor = Cursor::new(buf);
        assert_eq!(read_i32(&mut cursor).unwrap(), 7);
        assert_eq!(read_f64(&mut cursor).unwrap(), 1.0);
    }

    #[test]
    fn truncated_field_is_a_fault() {
        let mut cursor = Cursor::new(vec![0x01, 0x02]);
        assert!(matches!(
            read_i32(&mut cursor).unwrap_err(),
            ProtoError::Truncated
        ));
        let mut cursor = Cursor::new(vec![0x01, 0x02]);
        assert!(matches!(
            try_read_i32(&mut cursor).unwrap_err(),
            ProtoError::Truncated
        ));
    }

    #[test]
    fn clean_eof_reads_as_none() {
        let mut cursor = Cursor::new(Vec::new());
        assert!(try_read_i32(&mut cursor).unwrap().is_none());
    }

    proptest! {
        #[test]
        fn i32_round_trips(value in any::<i32>()) {
            let mut buf = Vec::new();
            write_i32(&mut buf, value).unwrap();
            prop_assert_eq!(buf.len(), 4);
            let mut cursor = Cursor::new(buf);
            prop_assert_eq!(read_i32(&mut cursor).unwrap(), value);
        }

        #[test]
        fn f64_round_trips(value in any::<f64>()) {
            let mut buf = Vec::new();
            write_f64(&mut buf, value).unwrap();
            prop_assert_eq!(buf.len(), 8);
            let mut cursor = Cursor::new(buf);
            let back = read_f64(&mut cursor).unwrap();
            prop_assert_eq!(back.to_bits(), value.to_bits());
        }
    }
}

//! LEB128 varints.
//!
//! Unsigned values are written 7 bits at a time, least significant group
//! first, with the high bit set on every byte except the last. Signed values
//! go through zig-zag first so small magnitudes stay short.

use byteorder::ReadBytesExt;
use std::io::{Read, Result as IoResult, Write};

use crate::CodingError;

/// Longest encoding of a `u64`.
const MAX_VARINT_BYTES: usize = 10;

/// Writes `v` as an unsigned LEB128 varint, returning the number of bytes written.
pub fn write_varuint<W: Write>(w: &mut W, mut v: u64) -> IoResult<usize> {
    let mut buf = [0u8; MAX_VARINT_BYTES];
    let mut n = 0;
    loop {
        let byte = (v & 0x7f) as u8;
        v >>= 7;
        if v == 0 {
            buf[n] = byte;
            n += 1;
            break;
        }
        buf[n] = byte | 0x80;
        n += 1;
    }
    w.write_all(&buf[..n])?;
    Ok(n)
}

/// Reads an unsigned LEB128 varint.
pub fn read_varuint<R: Read>(r: &mut R) -> Result<u64, CodingError> {
    let mut value = 0u64;
    for i in 0..MAX_VARINT_BYTES {
        let byte = r.read_u8()?;
        value |= u64::from(byte & 0x7f) << (7 * i);
        if byte & 0x80 == 0 {
            return Ok(value);
        }
    }
    Err(CodingError::VarintOverflow)
}

/// Maps signed to unsigned so that `0, -1, 1, -2, ...` become `0, 1, 2, 3, ...`.
#[inline]
pub fn zigzag_encode(v: i64) -> u64 {
    ((v << 1) ^ (v >> 63)) as u64
}

#[inline]
pub fn zigzag_decode(v: u64) -> i64 {
    ((v >> 1) as i64) ^ -((v & 1) as i64)
}

/// Writes a signed value as a zig-zag varint.
pub fn write_varint<W: Write>(w: &mut W, v: i64) -> IoResult<usize> {
    write_varuint(w, zigzag_encode(v))
}

/// Reads a zig-zag varint.
pub fn read_varint<R: Read>(r: &mut R) -> Result<i64, CodingError> {
    Ok(zigzag_decode(read_varuint(r)?))
}

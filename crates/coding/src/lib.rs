//! # Coding - low-level byte encodings
//!
//! Building blocks shared by the raw feature stream, the container format
//! and the generator:
//!
//! | Module          | Purpose                                              |
//! |-----------------|------------------------------------------------------|
//! | [`varint`]      | LEB128 unsigned varints and zig-zag signed varints   |
//! | [`point_coding`]| Coordinate quantization and point-sequence codec     |
//! | [`reader`]      | Random-access readers (memory, file, sub-window)     |
//!
//! ## Point coding
//!
//! Coordinates live in a square world of `[-180, 180]` on both axes. A
//! [`GeometryCodingParams`] fixes the bit depth and a base point for one
//! file; every point is stored as a zig-zag varint delta, the first one
//! against the base point and the following ones against their predecessor.
//!
//! ```rust
//! use coding::{GeometryCodingParams, PointU};
//!
//! let params = GeometryCodingParams::new(27, (0.0, 0.0));
//! let q = params.quantize((12.5, -3.25));
//! let back = params.dequantize(q);
//! assert!((back.0 - 12.5).abs() < 1e-5);
//! assert_eq!(params.quantize(back), q);
//! # let _ = PointU { x: 0, y: 0 };
//! ```

pub mod point_coding;
pub mod reader;
pub mod varint;

pub use point_coding::{
    decode_point, decode_points, encode_point, encode_points, GeometryCodingParams, PointU, MAX_COORD_BITS, WORLD_MAX,
    WORLD_MIN,
};
pub use reader::{FileReader, MemReader, Reader, ReaderSource, SubReader};
pub use varint::{read_varint, read_varuint, write_varint, write_varuint, zigzag_decode, zigzag_encode};

use std::io;
use thiserror::Error;

/// Errors raised while decoding coded data.
#[derive(Debug, Error)]
pub enum CodingError {
    /// An underlying I/O error.
    #[error("io error: {0}")]
    Io(#[from] io::Error),

    /// A varint ran past 10 bytes.
    #[error("varint overflow")]
    VarintOverflow,

    /// A read window fell outside of the underlying reader.
    #[error("read of {len} bytes at {pos} is out of bounds (size {size})")]
    OutOfBounds { pos: u64, len: u64, size: u64 },
}

#[cfg(test)]
mod tests;

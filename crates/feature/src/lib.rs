//! # Feature - source records of the generator
//!
//! A [`FeatureRecord`] is one geographic object: its geometry, the type
//! codes it carries, optional metadata, address fields and the id it had in
//! the upstream source.
//!
//! Records reach the generator through the raw intermediate file written by
//! [`RawFeatureWriter`]. The generator reads that file twice: once in file
//! order to compute sort keys, then once more by offset in sorted order.
//!
//! ## Raw record format
//!
//! ```text
//! [record_len: u32 LE][crc32: u32 LE][body ...]
//! ```
//!
//! Body:
//!
//! ```text
//! geom_type(u8) | types_count(varuint) | types(varuint...)
//! geometry      | point: x(f64) y(f64)
//!               | line:  count(varuint) then x(f64) y(f64) per point
//!               | area:  rings(varuint) then one line-encoded ring each
//! metadata      | count(varuint) then key(u8) len(varuint) bytes
//! address       | presence mask(u8) then len(varuint) bytes per present field
//! source id     | present(u8) [id(u64)]
//! ```
//!
//! `record_len` covers the CRC and the body but not itself. Coordinates are
//! stored as raw `f64` so the intermediate file is lossless.

mod raw;
mod record;

pub use raw::{RawFeatureError, RawFeatureReader, RawFeatureWriter, MAX_RECORD_SIZE};
pub use record::{AddressData, FeatureRecord, GeomType, Geometry, Metadata};

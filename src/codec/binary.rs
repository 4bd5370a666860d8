//! Binary container layout.
//!
//! A serialized gtype value is a length-prefixed buffer whose root is a
//! container:
//!
//! ```text
//! Offset  Size  Field
//! 0       4     total byte length (u32 LE, includes this prefix)
//! 4       4     root container header
//! 8       …     root entries + payload
//! ```
//!
//! Container layout (offsets relative to the container start):
//!
//! ```text
//! 0             u32 header: count (12 bits) | flags (SCALAR/OBJECT/ARRAY/BINARY)
//! 4             u32 entries × n (n = count for arrays, 2*count for objects)
//! 4 + 4n        child payloads, concatenated
//! ```
//!
//! Each entry packs `type (3 bits) | has_offset (1 bit) | offlen (28 bits)`.
//! To bound random access without ruining compressibility, every
//! `OFFSET_STRIDE`-th entry stores the child's absolute end offset into the
//! payload; all other entries store the child's byte length. A lookup walks
//! backwards at most `OFFSET_STRIDE` entries to recover an offset.
//!
//! Object children are laid out keys-first in sorted key order, then the
//! values in matching order, which keeps key lookups cache-friendly.
//!
//! Children that need 4-byte alignment (numeric, container, extended) are
//! padded at the front; the pad bytes count toward the child's entry
//! length and decoding realigns past them.

use std::fmt;

use rust_decimal::Decimal;

use crate::codec::{ext, MAX_NESTING_DEPTH};
use crate::error::{GraphError, Result};
use crate::value::GtypeValue;

// ── Container header ───────────────────────────────────────────────

pub const HDR_COUNT_MASK: u32 = 0x0000_0FFF;
pub const HDR_SCALAR: u32 = 0x0000_1000;
pub const HDR_OBJECT: u32 = 0x0000_2000;
pub const HDR_ARRAY: u32 = 0x0000_4000;
pub const HDR_BINARY: u32 = 0x0000_8000;

/// For BINARY containers the count field carries the blob subtype instead.
pub const BINARY_SUBTYPE_MASK: u32 = 0x0000_0FFF;
/// Subtype of the graphid-array blob emitted by the VLE engine.
pub const BINARY_TYPE_VLE_PATH: u32 = 0x0001;

// ── Entry word ─────────────────────────────────────────────────────

pub const ENTRY_OFFLEN_MASK: u32 = 0x0FFF_FFFF;
pub const ENTRY_TYPE_MASK: u32 = 0x7000_0000;
pub const ENTRY_HAS_OFF: u32 = 0x8000_0000;

pub const ENTRY_IS_STRING: u32 = 0x0000_0000;
pub const ENTRY_IS_NUMERIC: u32 = 0x1000_0000;
pub const ENTRY_IS_BOOL_FALSE: u32 = 0x2000_0000;
pub const ENTRY_IS_BOOL_TRUE: u32 = 0x3000_0000;
pub const ENTRY_IS_NULL: u32 = 0x4000_0000;
pub const ENTRY_IS_CONTAINER: u32 = 0x5000_0000;
/// Extended scalar: payload starts with a u32 type-tag header.
pub const ENTRY_IS_EXTENDED: u32 = 0x7000_0000;

/// Offsets are stored every this many entries; the rest store lengths.
pub const OFFSET_STRIDE: usize = 32;

#[inline]
pub fn entry_offlen(entry: u32) -> u32 {
    entry & ENTRY_OFFLEN_MASK
}

#[inline]
pub fn entry_type(entry: u32) -> u32 {
    entry & ENTRY_TYPE_MASK
}

#[inline]
pub fn entry_has_off(entry: u32) -> bool {
    entry & ENTRY_HAS_OFF != 0
}

/// Round up to 4-byte alignment.
#[inline]
pub fn align4(offset: usize) -> usize {
    (offset + 3) & !3
}

fn read_u32(bytes: &[u8], at: usize) -> Result<u32> {
    bytes
        .get(at..at + 4)
        .map(|b| u32::from_le_bytes([b[0], b[1], b[2], b[3]]))
        .ok_or_else(|| GraphError::Internal(format!("container truncated at offset {}", at)))
}

// ── Owned blob ─────────────────────────────────────────────────────

/// An owned, immutable serialized gtype value.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct Gtype {
    data: Vec<u8>,
}

impl Gtype {
    /// Wrap raw blob bytes, validating the length prefix.
    pub fn from_bytes(data: Vec<u8>) -> Result<Self> {
        if data.len() < 8 {
            return Err(GraphError::Internal("gtype blob too small".into()));
        }
        let declared = u32::from_le_bytes([data[0], data[1], data[2], data[3]]) as usize;
        if declared != data.len() {
            return Err(GraphError::Internal(format!(
                "gtype length prefix {} does not match buffer size {}",
                declared,
                data.len()
            )));
        }
        Ok(Gtype { data })
    }

    /// Serialize an in-memory value. A bare scalar is wrapped as a
    /// one-element raw-scalar array.
    pub fn from_value(value: &GtypeValue) -> Result<Self> {
        crate::codec::serialize::serialize_root(value)
    }

    /// Deserialize back to the in-memory representation. Raw-scalar
    /// roots unwrap to the bare scalar.
    pub fn to_value(&self) -> Result<GtypeValue> {
        let root = self.root();
        if root.is_binary() {
            return Ok(GtypeValue::Binary {
                flags: root.header() & BINARY_SUBTYPE_MASK,
                bytes: root.bytes().to_vec(),
            });
        }
        let v = decode_container(&root, 0)?;
        Ok(v.unwrap_raw_scalar())
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.data
    }

    pub fn root(&self) -> ContainerRef<'_> {
        ContainerRef {
            bytes: &self.data[4..],
        }
    }
}

impl fmt::Debug for Gtype {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Gtype({} bytes)", self.data.len())
    }
}

// ── Borrowed container view ────────────────────────────────────────

/// A borrowed view over one container's bytes (header, entries, payload).
#[derive(Clone, Copy)]
pub struct ContainerRef<'a> {
    pub(crate) bytes: &'a [u8],
}

impl<'a> ContainerRef<'a> {
    pub fn bytes(&self) -> &'a [u8] {
        self.bytes
    }

    pub fn header(&self) -> u32 {
        u32::from_le_bytes([self.bytes[0], self.bytes[1], self.bytes[2], self.bytes[3]])
    }

    pub fn count(&self) -> usize {
        (self.header() & HDR_COUNT_MASK) as usize
    }

    pub fn is_object(&self) -> bool {
        self.header() & HDR_OBJECT != 0
    }

    pub fn is_array(&self) -> bool {
        self.header() & HDR_ARRAY != 0
    }

    pub fn is_scalar(&self) -> bool {
        self.header() & HDR_SCALAR != 0
    }

    pub fn is_binary(&self) -> bool {
        self.header() & HDR_BINARY != 0
    }

    /// Number of entry words: objects store two children per pair.
    pub fn n_entries(&self) -> usize {
        if self.is_object() {
            self.count() * 2
        } else {
            self.count()
        }
    }

    pub fn entry(&self, i: usize) -> Result<u32> {
        read_u32(self.bytes, 4 + i * 4)
    }

    /// Byte offset of the payload area, relative to the container start.
    pub fn payload_base(&self) -> usize {
        4 + self.n_entries() * 4
    }

    /// Payload for BINARY containers (no entry table).
    pub fn binary_payload(&self) -> &'a [u8] {
        &self.bytes[4..]
    }

    /// End offset (exclusive, payload-relative) of child `i`.
    ///
    /// Walks backwards until an entry with a stored offset is found, then
    /// re-accumulates lengths forward — at most `OFFSET_STRIDE` entries.
    pub fn child_end_offset(&self, i: usize) -> Result<usize> {
        let mut total: usize = 0;
        let mut j = i;
        loop {
            let e = self.entry(j)?;
            if entry_has_off(e) {
                // the stored value is the absolute end offset of child j
                return Ok(total + entry_offlen(e) as usize);
            }
            total += entry_offlen(e) as usize;
            if j == 0 {
                return Ok(total);
            }
            j -= 1;
        }
    }

    /// Payload-relative byte range of child `i` (before pad realignment).
    pub fn child_range(&self, i: usize) -> Result<(usize, usize)> {
        let end = self.child_end_offset(i)?;
        let start = if i == 0 {
            0
        } else {
            self.child_end_offset(i - 1)?
        };
        if start > end {
            return Err(GraphError::Internal(format!(
                "entry {} has negative extent",
                i
            )));
        }
        Ok((start, end))
    }

    /// Raw payload bytes of child `i`, with leading alignment pad removed
    /// for the types that carry one.
    pub fn child_bytes(&self, i: usize) -> Result<&'a [u8]> {
        let e = self.entry(i)?;
        let (start, end) = self.child_range(i)?;
        let base = self.payload_base();
        let mut abs_start = base + start;
        let abs_end = base + end;
        if matches!(
            entry_type(e),
            ENTRY_IS_NUMERIC | ENTRY_IS_CONTAINER | ENTRY_IS_EXTENDED
        ) {
            abs_start = align4(abs_start);
        }
        if abs_start > abs_end || abs_end > self.bytes.len() {
            return Err(GraphError::Internal(format!(
                "child {} extent [{}, {}) escapes container of {} bytes",
                i,
                abs_start,
                abs_end,
                self.bytes.len()
            )));
        }
        Ok(&self.bytes[abs_start..abs_end])
    }

    /// Decode child `i` to its in-memory value. Containers decode
    /// recursively.
    pub fn decode_child(&self, i: usize, depth: usize) -> Result<GtypeValue> {
        let e = self.entry(i)?;
        let bytes = self.child_bytes(i)?;
        match entry_type(e) {
            ENTRY_IS_NULL => Ok(GtypeValue::Null),
            ENTRY_IS_BOOL_TRUE => Ok(GtypeValue::Bool(true)),
            ENTRY_IS_BOOL_FALSE => Ok(GtypeValue::Bool(false)),
            ENTRY_IS_STRING => {
                let s = std::str::from_utf8(bytes)
                    .map_err(|_| GraphError::Internal("invalid UTF-8 in string child".into()))?;
                Ok(GtypeValue::String(s.to_string()))
            }
            ENTRY_IS_NUMERIC => {
                let arr: [u8; 16] = bytes
                    .get(..16)
                    .and_then(|b| b.try_into().ok())
                    .ok_or_else(|| GraphError::Internal("numeric child too short".into()))?;
                Ok(GtypeValue::Numeric(Decimal::deserialize(arr)))
            }
            ENTRY_IS_CONTAINER => {
                let nested = ContainerRef { bytes };
                decode_container(&nested, depth + 1)
            }
            ENTRY_IS_EXTENDED => {
                if bytes.len() < 4 {
                    return Err(GraphError::Internal("extended child missing header".into()));
                }
                let tag = u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]);
                ext::deserialize(tag, &bytes[4..])
            }
            other => Err(GraphError::Internal(format!(
                "unknown entry type {:#x}",
                other
            ))),
        }
    }

    /// Container child `i` as a borrowed sub-container, if it is one.
    pub fn child_container(&self, i: usize) -> Result<Option<ContainerRef<'a>>> {
        let e = self.entry(i)?;
        if entry_type(e) != ENTRY_IS_CONTAINER {
            return Ok(None);
        }
        Ok(Some(ContainerRef {
            bytes: self.child_bytes(i)?,
        }))
    }

    /// `nth(container, i)`: element `i` of an array container.
    pub fn nth(&self, i: usize) -> Result<Option<GtypeValue>> {
        if !self.is_array() || i >= self.count() {
            return Ok(None);
        }
        self.decode_child(i, 0).map(Some)
    }

    /// Key string of pair `i` in an object container.
    fn key_str(&self, i: usize) -> Result<&'a str> {
        let bytes = self.child_bytes(i)?;
        std::str::from_utf8(bytes)
            .map_err(|_| GraphError::Internal("invalid UTF-8 in object key".into()))
    }

    /// `find(container, key)`: binary search over the sorted key block.
    pub fn find(&self, key: &str) -> Result<Option<GtypeValue>> {
        if !self.is_object() {
            return Ok(None);
        }
        let count = self.count();
        let mut lo = 0usize;
        let mut hi = count;
        while lo < hi {
            let mid = (lo + hi) / 2;
            match self.key_str(mid)?.cmp(key) {
                std::cmp::Ordering::Less => lo = mid + 1,
                std::cmp::Ordering::Greater => hi = mid,
                std::cmp::Ordering::Equal => {
                    return self.decode_child(count + mid, 0).map(Some);
                }
            }
        }
        Ok(None)
    }
}

/// Decode a whole container recursively (depth-guarded).
pub fn decode_container(c: &ContainerRef<'_>, depth: usize) -> Result<GtypeValue> {
    if depth > MAX_NESTING_DEPTH {
        return Err(GraphError::LimitExceeded(format!(
            "container nesting exceeds {} levels",
            MAX_NESTING_DEPTH
        )));
    }
    if c.is_binary() {
        return Ok(GtypeValue::Binary {
            flags: c.header() & BINARY_SUBTYPE_MASK,
            bytes: c.bytes().to_vec(),
        });
    }
    if c.is_object() {
        let count = c.count();
        let mut pairs = Vec::with_capacity(count);
        for i in 0..count {
            let key = c.key_str(i)?.to_string();
            let value = c.decode_child(count + i, depth)?;
            pairs.push((key, value));
        }
        Ok(GtypeValue::Object(pairs))
    } else {
        let count = c.count();
        let mut elems = Vec::with_capacity(count);
        for i in 0..count {
            elems.push(c.decode_child(i, depth)?);
        }
        Ok(GtypeValue::Array {
            elems,
            raw_scalar: c.is_scalar(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_align4() {
        assert_eq!(align4(0), 0);
        assert_eq!(align4(1), 4);
        assert_eq!(align4(4), 4);
        assert_eq!(align4(7), 8);
    }

    #[test]
    fn test_entry_field_masks_are_disjoint() {
        assert_eq!(ENTRY_OFFLEN_MASK & ENTRY_TYPE_MASK, 0);
        assert_eq!(ENTRY_OFFLEN_MASK & ENTRY_HAS_OFF, 0);
        assert_eq!(ENTRY_TYPE_MASK & ENTRY_HAS_OFF, 0);
        assert_eq!(
            ENTRY_OFFLEN_MASK | ENTRY_TYPE_MASK | ENTRY_HAS_OFF,
            u32::MAX
        );
    }

    #[test]
    fn test_from_bytes_validates_prefix() {
        assert!(Gtype::from_bytes(vec![1, 2, 3]).is_err());
        let mut blob = vec![0u8; 12];
        blob[0..4].copy_from_slice(&(12u32).to_le_bytes());
        blob[4..8].copy_from_slice(&(HDR_ARRAY).to_le_bytes());
        assert!(Gtype::from_bytes(blob).is_ok());
        let mut bad = vec![0u8; 12];
        bad[0..4].copy_from_slice(&(99u32).to_le_bytes());
        assert!(Gtype::from_bytes(bad).is_err());
    }
}

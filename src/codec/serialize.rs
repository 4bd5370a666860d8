//! Conversion from the in-memory value tree to the contiguous binary
//! form. Children are appended depth-first into a single buffer; entry
//! words are back-patched once a container's payload size is known.

use crate::codec::binary::{
    align4, Gtype, BINARY_SUBTYPE_MASK, ENTRY_HAS_OFF, ENTRY_IS_BOOL_FALSE, ENTRY_IS_BOOL_TRUE,
    ENTRY_IS_CONTAINER, ENTRY_IS_EXTENDED, ENTRY_IS_NULL, ENTRY_IS_NUMERIC, ENTRY_IS_STRING,
    ENTRY_OFFLEN_MASK, HDR_ARRAY, HDR_COUNT_MASK, HDR_OBJECT, HDR_SCALAR, OFFSET_STRIDE,
};
use crate::codec::{ext, MAX_NESTING_DEPTH};
use crate::error::{GraphError, Result};
use crate::value::GtypeValue;

/// Serialize a value as a complete length-prefixed blob. A bare scalar
/// is wrapped in a one-element raw-scalar array first.
pub fn serialize_root(value: &GtypeValue) -> Result<Gtype> {
    let mut out = vec![0u8; 4]; // length prefix, patched below
    match value {
        GtypeValue::Binary { flags, bytes } => {
            if bytes.len() < 4 {
                return Err(GraphError::Internal("binary blob missing header".into()));
            }
            debug_assert_eq!(
                u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]])
                    & BINARY_SUBTYPE_MASK,
                *flags & BINARY_SUBTYPE_MASK
            );
            out.extend_from_slice(bytes);
        }
        GtypeValue::Array { .. } | GtypeValue::Object(_) => {
            write_container(&mut out, value, 0)?;
        }
        scalar => {
            let wrapped = GtypeValue::Array {
                elems: vec![scalar.clone()],
                raw_scalar: true,
            };
            write_container(&mut out, &wrapped, 0)?;
        }
    }
    let total = out.len();
    if total > ENTRY_OFFLEN_MASK as usize {
        return Err(GraphError::LimitExceeded(format!(
            "serialized value of {} bytes exceeds the entry mask",
            total
        )));
    }
    out[0..4].copy_from_slice(&(total as u32).to_le_bytes());
    Gtype::from_bytes(out)
}

/// Append one container at the current (4-aligned) position.
fn write_container(out: &mut Vec<u8>, value: &GtypeValue, depth: usize) -> Result<()> {
    if depth > MAX_NESTING_DEPTH {
        return Err(GraphError::LimitExceeded(format!(
            "value nesting exceeds {} levels",
            MAX_NESTING_DEPTH
        )));
    }
    debug_assert_eq!(out.len() % 4, 0, "container must start 4-aligned");

    match value {
        GtypeValue::Array { elems, raw_scalar } => {
            let count = elems.len();
            check_count(count)?;
            let mut header = count as u32 | HDR_ARRAY;
            if *raw_scalar {
                header |= HDR_SCALAR;
            }
            out.extend_from_slice(&header.to_le_bytes());
            let entries_pos = out.len();
            out.resize(entries_pos + count * 4, 0);
            let payload_base = out.len();

            let mut entries = Vec::with_capacity(count);
            for (i, elem) in elems.iter().enumerate() {
                let before = out.len();
                let etype = write_child(out, elem, depth)?;
                entries.push(make_entry(etype, i, before, out.len(), payload_base)?);
            }
            patch_entries(out, entries_pos, &entries);
        }
        GtypeValue::Object(pairs) => {
            let count = pairs.len();
            check_count(count)?;
            debug_assert!(
                pairs.windows(2).all(|w| w[0].0 < w[1].0),
                "object keys must be sorted and unique before serialization"
            );
            let header = count as u32 | HDR_OBJECT;
            out.extend_from_slice(&header.to_le_bytes());
            let entries_pos = out.len();
            out.resize(entries_pos + count * 2 * 4, 0);
            let payload_base = out.len();

            let mut entries = Vec::with_capacity(count * 2);
            // all keys first, in sorted order
            for (i, (key, _)) in pairs.iter().enumerate() {
                let before = out.len();
                check_string(key)?;
                out.extend_from_slice(key.as_bytes());
                entries.push(make_entry(
                    ENTRY_IS_STRING,
                    i,
                    before,
                    out.len(),
                    payload_base,
                )?);
            }
            // then the values in matching order
            for (i, (_, val)) in pairs.iter().enumerate() {
                let before = out.len();
                let etype = write_child(out, val, depth)?;
                entries.push(make_entry(
                    etype,
                    count + i,
                    before,
                    out.len(),
                    payload_base,
                )?);
            }
            patch_entries(out, entries_pos, &entries);
        }
        other => {
            return Err(GraphError::Internal(format!(
                "write_container invoked on {}",
                other.type_name()
            )))
        }
    }
    Ok(())
}

/// Append one child payload, returning its entry type bits. Children
/// that need alignment get their leading pad here, counted into their
/// entry length.
fn write_child(out: &mut Vec<u8>, value: &GtypeValue, depth: usize) -> Result<u32> {
    match value {
        GtypeValue::Null => Ok(ENTRY_IS_NULL),
        GtypeValue::Bool(true) => Ok(ENTRY_IS_BOOL_TRUE),
        GtypeValue::Bool(false) => Ok(ENTRY_IS_BOOL_FALSE),
        GtypeValue::String(s) => {
            check_string(s)?;
            out.extend_from_slice(s.as_bytes());
            Ok(ENTRY_IS_STRING)
        }
        GtypeValue::Numeric(d) => {
            pad_to_alignment(out);
            out.extend_from_slice(&d.serialize());
            Ok(ENTRY_IS_NUMERIC)
        }
        GtypeValue::Array { .. } | GtypeValue::Object(_) => {
            pad_to_alignment(out);
            write_container(out, value, depth + 1)?;
            Ok(ENTRY_IS_CONTAINER)
        }
        GtypeValue::Binary { bytes, .. } => {
            pad_to_alignment(out);
            out.extend_from_slice(bytes);
            Ok(ENTRY_IS_CONTAINER)
        }
        scalar => {
            let (tag, payload) = ext::serialize_scalar(scalar)?.ok_or_else(|| {
                GraphError::Internal(format!("unencodable scalar {}", scalar.type_name()))
            })?;
            pad_to_alignment(out);
            out.extend_from_slice(&tag.to_le_bytes());
            out.extend_from_slice(&payload);
            Ok(ENTRY_IS_EXTENDED)
        }
    }
}

fn pad_to_alignment(out: &mut Vec<u8>) {
    let target = align4(out.len());
    out.resize(target, 0);
}

fn check_count(count: usize) -> Result<()> {
    if count > HDR_COUNT_MASK as usize {
        return Err(GraphError::LimitExceeded(format!(
            "container with {} children exceeds the count field",
            count
        )));
    }
    Ok(())
}

fn check_string(s: &str) -> Result<()> {
    if s.len() > ENTRY_OFFLEN_MASK as usize {
        return Err(GraphError::LimitExceeded(format!(
            "string of {} bytes exceeds the entry mask",
            s.len()
        )));
    }
    Ok(())
}

/// Build the entry word for child `i`: a length normally, the absolute
/// end offset (with the offset bit) every `OFFSET_STRIDE`-th entry.
fn make_entry(
    etype: u32,
    i: usize,
    child_start: usize,
    child_end: usize,
    payload_base: usize,
) -> Result<u32> {
    let len = child_end - child_start;
    if len > ENTRY_OFFLEN_MASK as usize {
        return Err(GraphError::LimitExceeded(format!(
            "child payload of {} bytes exceeds the entry mask",
            len
        )));
    }
    if i % OFFSET_STRIDE == 0 {
        let end_offset = child_end - payload_base;
        if end_offset > ENTRY_OFFLEN_MASK as usize {
            return Err(GraphError::LimitExceeded(format!(
                "payload offset {} exceeds the entry mask",
                end_offset
            )));
        }
        Ok(etype | ENTRY_HAS_OFF | end_offset as u32)
    } else {
        Ok(etype | len as u32)
    }
}

fn patch_entries(out: &mut [u8], entries_pos: usize, entries: &[u32]) {
    for (i, e) in entries.iter().enumerate() {
        let at = entries_pos + i * 4;
        out[at..at + 4].copy_from_slice(&e.to_le_bytes());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn roundtrip(v: GtypeValue) -> GtypeValue {
        let blob = serialize_root(&v).unwrap();
        let back = blob.to_value().unwrap();
        assert_eq!(back, v);
        // serialization is canonical: same value, same bytes
        let again = serialize_root(&back).unwrap();
        assert_eq!(blob.as_bytes(), again.as_bytes());
        back
    }

    #[test]
    fn test_scalar_roots_wrap_as_raw_scalar() {
        let blob = serialize_root(&GtypeValue::Integer(42)).unwrap();
        let root = blob.root();
        assert!(root.is_array());
        assert!(root.is_scalar());
        assert_eq!(root.count(), 1);
        assert_eq!(blob.to_value().unwrap(), GtypeValue::Integer(42));
    }

    #[test]
    fn test_array_roundtrip() {
        roundtrip(GtypeValue::Array {
            elems: vec![
                GtypeValue::Integer(1),
                GtypeValue::Null,
                GtypeValue::Bool(true),
                GtypeValue::String("hello".into()),
                GtypeValue::Float(2.5),
            ],
            raw_scalar: false,
        });
    }

    #[test]
    fn test_object_roundtrip_and_key_block() {
        let v = GtypeValue::Object(vec![
            ("alpha".to_string(), GtypeValue::Integer(1)),
            ("beta".to_string(), GtypeValue::String("two".into())),
            ("gamma".to_string(), GtypeValue::Null),
        ]);
        let blob = serialize_root(&v).unwrap();
        let root = blob.root();
        assert!(root.is_object());
        assert_eq!(root.count(), 3);
        assert_eq!(
            root.find("beta").unwrap(),
            Some(GtypeValue::String("two".into()))
        );
        assert_eq!(root.find("zeta").unwrap(), None);
        roundtrip(v);
    }

    #[test]
    fn test_nested_containers() {
        roundtrip(GtypeValue::Array {
            elems: vec![
                GtypeValue::Object(vec![(
                    "inner".to_string(),
                    GtypeValue::Array {
                        elems: vec![GtypeValue::Integer(1), GtypeValue::Integer(2)],
                        raw_scalar: false,
                    },
                )]),
                GtypeValue::Integer(3),
            ],
            raw_scalar: false,
        });
    }

    #[test]
    fn test_stride_offsets_in_large_array() {
        let elems: Vec<GtypeValue> = (0..100).map(GtypeValue::Integer).collect();
        let v = GtypeValue::Array {
            elems,
            raw_scalar: false,
        };
        let blob = serialize_root(&v).unwrap();
        let root = blob.root();
        // offset entries at the stride boundaries, lengths elsewhere
        assert!(crate::codec::binary::entry_has_off(root.entry(0).unwrap()));
        assert!(crate::codec::binary::entry_has_off(root.entry(32).unwrap()));
        assert!(!crate::codec::binary::entry_has_off(root.entry(1).unwrap()));
        assert!(!crate::codec::binary::entry_has_off(root.entry(33).unwrap()));
        assert_eq!(root.nth(77).unwrap(), Some(GtypeValue::Integer(77)));
        assert_eq!(root.nth(100).unwrap(), None);
        roundtrip(v);
    }

    #[test]
    fn test_sum_of_lengths_matches_offsets() {
        let elems: Vec<GtypeValue> = (0..40)
            .map(|i| GtypeValue::String(format!("s{}", i)))
            .collect();
        let v = GtypeValue::Array {
            elems,
            raw_scalar: false,
        };
        let blob = serialize_root(&v).unwrap();
        let root = blob.root();
        let mut cumulative = 0usize;
        for i in 0..root.count() {
            let (start, end) = root.child_range(i).unwrap();
            assert_eq!(start, cumulative);
            cumulative = end;
            assert_eq!(root.child_end_offset(i).unwrap(), cumulative);
        }
    }

    #[test]
    fn test_too_many_children() {
        let elems: Vec<GtypeValue> = (0..4096).map(GtypeValue::Integer).collect();
        let v = GtypeValue::Array {
            elems,
            raw_scalar: false,
        };
        assert!(matches!(
            serialize_root(&v),
            Err(GraphError::LimitExceeded(_))
        ));
    }

    #[test]
    fn test_depth_limit() {
        let mut v = GtypeValue::Integer(0);
        for _ in 0..(MAX_NESTING_DEPTH + 2) {
            v = GtypeValue::Array {
                elems: vec![v],
                raw_scalar: false,
            };
        }
        assert!(matches!(
            serialize_root(&v),
            Err(GraphError::LimitExceeded(_))
        ));
    }

    #[test]
    fn test_extended_scalars_in_containers() {
        roundtrip(GtypeValue::Array {
            elems: vec![
                GtypeValue::Timestamp(1_000_000),
                GtypeValue::Inet("10.0.0.0/8".parse().unwrap()),
                GtypeValue::Vector(
                    crate::scalar::vector::VectorData::new(vec![1.0, 2.0]).unwrap(),
                ),
            ],
            raw_scalar: false,
        });
    }
}

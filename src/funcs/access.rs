//! Accessor functions: `->`, `->>`, slice, keys, size, head, last,
//! reverse. Missing fields and out-of-range indexes yield NULL rather
//! than errors, matching operator semantics; only wrong argument types
//! error.

use crate::error::{GraphError, Result};
use crate::parser::render::render_scalar_text;
use crate::value::GtypeValue;

/// `container -> key_or_index`
pub fn access(container: &GtypeValue, accessor: &GtypeValue) -> Result<GtypeValue> {
    match (container, accessor) {
        (GtypeValue::Object(_), GtypeValue::String(key)) => Ok(container
            .object_get(key)
            .cloned()
            .unwrap_or(GtypeValue::Null)),
        (GtypeValue::Vertex(v), GtypeValue::String(key)) => {
            Ok(v.property(key).cloned().unwrap_or(GtypeValue::Null))
        }
        (GtypeValue::Edge(e), GtypeValue::String(key)) => {
            Ok(e.property(key).cloned().unwrap_or(GtypeValue::Null))
        }
        (GtypeValue::Array { elems, .. }, GtypeValue::Integer(i)) => {
            Ok(index_of(elems.len(), *i)
                .and_then(|idx| elems.get(idx))
                .cloned()
                .unwrap_or(GtypeValue::Null))
        }
        _ => Err(GraphError::TypeMismatch {
            op: "->",
            left: container.type_name(),
            right: accessor.type_name(),
        }),
    }
}

/// `container ->> key_or_index`: like `->` but stringifies the result.
pub fn access_as_text(container: &GtypeValue, accessor: &GtypeValue) -> Result<GtypeValue> {
    match access(container, accessor)? {
        GtypeValue::Null => Ok(GtypeValue::Null),
        GtypeValue::String(s) => Ok(GtypeValue::String(s)),
        other if other.is_scalar() => Ok(GtypeValue::String(render_scalar_text(&other))),
        other => Ok(GtypeValue::String(crate::parser::render(&other))),
    }
}

/// Negative indexes address from the end.
fn index_of(len: usize, i: i64) -> Option<usize> {
    if i >= 0 {
        let i = i as usize;
        (i < len).then_some(i)
    } else {
        len.checked_sub(i.unsigned_abs() as usize)
    }
}

/// `list[from..to]` with negative-index clamping; either bound optional.
pub fn slice(
    value: &GtypeValue,
    from: Option<i64>,
    to: Option<i64>,
) -> Result<GtypeValue> {
    let elems = value.as_array().ok_or(GraphError::TypeMismatch {
        op: "slice",
        left: value.type_name(),
        right: "integer",
    })?;
    let len = elems.len() as i64;
    let clamp = |i: i64| -> usize {
        let i = if i < 0 { len + i } else { i };
        i.clamp(0, len) as usize
    };
    let start = clamp(from.unwrap_or(0));
    let end = clamp(to.unwrap_or(len));
    let out = if start < end {
        elems[start..end].to_vec()
    } else {
        Vec::new()
    };
    Ok(GtypeValue::Array {
        elems: out,
        raw_scalar: false,
    })
}

/// `keys(map)` — the sorted key list as an array of strings.
pub fn keys(value: &GtypeValue) -> Result<GtypeValue> {
    let pairs = match value {
        GtypeValue::Object(pairs) => pairs,
        GtypeValue::Vertex(v) => match &v.properties {
            GtypeValue::Object(pairs) => pairs,
            _ => return Err(keys_mismatch(value)),
        },
        GtypeValue::Edge(e) => match &e.properties {
            GtypeValue::Object(pairs) => pairs,
            _ => return Err(keys_mismatch(value)),
        },
        _ => return Err(keys_mismatch(value)),
    };
    Ok(GtypeValue::Array {
        elems: pairs
            .iter()
            .map(|(k, _)| GtypeValue::String(k.clone()))
            .collect(),
        raw_scalar: false,
    })
}

fn keys_mismatch(value: &GtypeValue) -> GraphError {
    GraphError::TypeMismatch {
        op: "keys",
        left: "map",
        right: value.type_name(),
    }
}

/// `size(x)`: list length, string character count, map pair count, or a
/// path's edge count.
pub fn size(value: &GtypeValue) -> Result<GtypeValue> {
    let n = match value {
        GtypeValue::Array { elems, .. } => elems.len(),
        GtypeValue::String(s) => s.chars().count(),
        GtypeValue::Object(pairs) => pairs.len(),
        GtypeValue::Path(elems) | GtypeValue::PartialPath(elems) => {
            crate::entity::path_edges(elems).len()
        }
        _ => {
            return Err(GraphError::TypeMismatch {
                op: "size",
                left: "list",
                right: value.type_name(),
            })
        }
    };
    Ok(GtypeValue::Integer(n as i64))
}

/// `head(list)` — first element, NULL when empty.
pub fn head(value: &GtypeValue) -> Result<GtypeValue> {
    let elems = value.as_array().ok_or(GraphError::TypeMismatch {
        op: "head",
        left: "list",
        right: value.type_name(),
    })?;
    Ok(elems.first().cloned().unwrap_or(GtypeValue::Null))
}

/// `last(list)` — last element, NULL when empty.
pub fn last(value: &GtypeValue) -> Result<GtypeValue> {
    let elems = value.as_array().ok_or(GraphError::TypeMismatch {
        op: "last",
        left: "list",
        right: value.type_name(),
    })?;
    Ok(elems.last().cloned().unwrap_or(GtypeValue::Null))
}

/// `reverse(list | string)`.
pub fn reverse(value: &GtypeValue) -> Result<GtypeValue> {
    match value {
        GtypeValue::Array { elems, .. } => Ok(GtypeValue::Array {
            elems: elems.iter().rev().cloned().collect(),
            raw_scalar: false,
        }),
        GtypeValue::String(s) => Ok(GtypeValue::String(crate::scalar::text::reverse(s))),
        _ => Err(GraphError::TypeMismatch {
            op: "reverse",
            left: "list",
            right: value.type_name(),
        }),
    }
}

//! Path-family builders: traversal/route (vertex-bracketed) and
//! partial-route/variable-edge (edge-bracketed).
//!
//! A traversal alternates `vertex, edge, vertex, …, vertex` (odd length);
//! a partial route alternates `edge, vertex, edge, …, edge` (even count of
//! interior positions, edge at both ends). A variable-edge argument inside
//! a traversal is flattened into its element sequence.

use std::cmp::Ordering;

use crate::error::{GraphError, Result};
use crate::value::GtypeValue;

/// Build a vertex-bracketed path from alternating arguments.
///
/// Even positions must hold vertices, odd positions edges or variable
/// edges (flattened in place). A trailing edge is a schema error.
pub fn build_path(args: Vec<GtypeValue>) -> Result<GtypeValue> {
    if args.is_empty() {
        return Err(GraphError::Schema("path", "path requires at least one vertex".into()));
    }
    let mut elems: Vec<GtypeValue> = Vec::with_capacity(args.len());
    for arg in args {
        let expect_vertex = elems.len() % 2 == 0;
        match arg {
            GtypeValue::Vertex(_) if expect_vertex => elems.push(arg),
            GtypeValue::Edge(_) if !expect_vertex => elems.push(arg),
            // a VLE match splices in as edge, vertex, …, edge
            GtypeValue::PartialPath(inner) if !expect_vertex => {
                for item in inner {
                    let expect_edge = elems.len() % 2 == 1;
                    let ok = match &item {
                        GtypeValue::Edge(_) => expect_edge,
                        GtypeValue::Vertex(_) => !expect_edge,
                        _ => false,
                    };
                    if !ok {
                        return Err(GraphError::Schema(
                            "path",
                            "variable edge does not alternate edge/vertex".into(),
                        ));
                    }
                    elems.push(item);
                }
            }
            other => {
                return Err(GraphError::Schema(
                    "path",
                    format!(
                        "expected {} at position {}, got {}",
                        if expect_vertex { "vertex" } else { "edge" },
                        elems.len(),
                        other.type_name()
                    ),
                ))
            }
        }
    }
    if elems.len() % 2 == 0 {
        return Err(GraphError::Schema(
            "path",
            "path cannot end in an edge".into(),
        ));
    }
    Ok(GtypeValue::Path(elems))
}

/// `build_traversal` and `build_route` share the path layout.
pub fn build_traversal(args: Vec<GtypeValue>) -> Result<GtypeValue> {
    build_path(args)
}

pub fn build_route(args: Vec<GtypeValue>) -> Result<GtypeValue> {
    build_path(args)
}

/// Build an edge-bracketed partial route: `edge, vertex, …, edge`.
pub fn build_partial_route(args: Vec<GtypeValue>) -> Result<GtypeValue> {
    if args.is_empty() {
        return Err(GraphError::Schema(
            "partial route",
            "partial route requires at least one edge".into(),
        ));
    }
    for (i, arg) in args.iter().enumerate() {
        let ok = if i % 2 == 0 {
            matches!(arg, GtypeValue::Edge(_))
        } else {
            matches!(arg, GtypeValue::Vertex(_))
        };
        if !ok {
            return Err(GraphError::Schema(
                "partial route",
                format!(
                    "expected {} at position {}, got {}",
                    if i % 2 == 0 { "edge" } else { "vertex" },
                    i,
                    arg.type_name()
                ),
            ));
        }
    }
    if args.len() % 2 == 0 {
        return Err(GraphError::Schema(
            "partial route",
            "partial route must end with an edge".into(),
        ));
    }
    Ok(GtypeValue::PartialPath(args))
}

/// A variable edge is a partial route produced by the VLE engine.
pub fn build_variable_edge(args: Vec<GtypeValue>) -> Result<GtypeValue> {
    build_partial_route(args)
}

// ── Accessors ──────────────────────────────────────────────────────

/// Vertices of a path or partial path, in order.
pub fn path_vertices(elems: &[GtypeValue]) -> Vec<&GtypeValue> {
    elems
        .iter()
        .filter(|e| matches!(e, GtypeValue::Vertex(_)))
        .collect()
}

/// Edges of a path or partial path, in order.
pub fn path_edges(elems: &[GtypeValue]) -> Vec<&GtypeValue> {
    elems
        .iter()
        .filter(|e| matches!(e, GtypeValue::Edge(_)))
        .collect()
}

/// The embedded id sequence used by composite ordering.
pub fn path_id_sequence(elems: &[GtypeValue]) -> Vec<i64> {
    elems
        .iter()
        .map(|e| match e {
            GtypeValue::Vertex(v) => v.id,
            GtypeValue::Edge(e) => e.id,
            _ => 0,
        })
        .collect()
}

/// Compare id sequences pairwise, then by length.
pub fn cmp_id_sequence(a: &[GtypeValue], b: &[GtypeValue]) -> Ordering {
    let ia = path_id_sequence(a);
    let ib = path_id_sequence(b);
    for (x, y) in ia.iter().zip(ib.iter()) {
        let o = x.cmp(y);
        if o != Ordering::Equal {
            return o;
        }
    }
    ia.len().cmp(&ib.len())
}

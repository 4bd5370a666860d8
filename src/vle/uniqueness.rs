//! Edge-uniqueness enforcement across the rows of a MATCH, plus the
//! VLE continuation predicates.

use std::collections::HashSet;

use crate::entity::Edge;
use crate::error::{GraphError, Result};
use crate::value::GtypeValue;
use crate::vle::engine::PathContainer;

/// Insert every edge id found in `args` into one set; false on the
/// first duplicate. Arguments may be bare graphids (integers), edges,
/// paths, or partial paths / variable edges.
pub fn enforce_edge_uniqueness(args: &[GtypeValue]) -> Result<bool> {
    let mut seen: HashSet<i64> = HashSet::new();
    for arg in args {
        match arg {
            GtypeValue::Integer(id) => {
                if !seen.insert(*id) {
                    return Ok(false);
                }
            }
            GtypeValue::Edge(e) => {
                if !seen.insert(e.id) {
                    return Ok(false);
                }
            }
            GtypeValue::Path(elems) | GtypeValue::PartialPath(elems) => {
                for elem in elems {
                    if let GtypeValue::Edge(e) = elem {
                        if !seen.insert(e.id) {
                            return Ok(false);
                        }
                    }
                }
            }
            GtypeValue::Null => {
                return Err(GraphError::Domain(
                    "edge uniqueness argument must not be null".into(),
                ))
            }
            other => {
                return Err(GraphError::TypeMismatch {
                    op: "enforce_edge_uniqueness",
                    left: "edge or path",
                    right: other.type_name(),
                })
            }
        }
    }
    Ok(true)
}

/// Container-level variant used before materialisation.
pub fn container_edge_uniqueness(containers: &[PathContainer]) -> bool {
    let mut seen: HashSet<i64> = HashSet::new();
    for c in containers {
        for id in c.edge_ids() {
            if !seen.insert(id) {
                return false;
            }
        }
    }
    true
}

/// Is the edge one of the variable edge's matched edges?
pub fn edge_contained_in_variable_edge(edge: &Edge, variable_edge: &[GtypeValue]) -> bool {
    variable_edge
        .iter()
        .step_by(2)
        .any(|e| matches!(e, GtypeValue::Edge(inner) if inner.id == edge.id))
}

/// Endpoint-touch check for joining two VLE matches: the first edge of
/// `lhs` must share an endpoint with the last edge of `rhs`.
pub fn match_vles(lhs: &[GtypeValue], rhs: &[GtypeValue]) -> bool {
    let first = match lhs.first() {
        Some(GtypeValue::Edge(e)) => e,
        _ => return false,
    };
    let last = match rhs.last() {
        Some(GtypeValue::Edge(e)) => e,
        _ => return false,
    };
    first.start_id == last.start_id
        || first.start_id == last.end_id
        || first.end_id == last.start_id
        || first.end_id == last.end_id
}

#[cfg(test)]
mod tests {
    use super::*;

    fn edge(id: i64, start: i64, end: i64) -> GtypeValue {
        GtypeValue::Edge(Box::new(
            Edge::build(id, start, end, "E", GtypeValue::Object(vec![])).unwrap(),
        ))
    }

    fn vertex(id: i64) -> GtypeValue {
        GtypeValue::Vertex(Box::new(
            crate::entity::Vertex::build(id, "V", GtypeValue::Object(vec![])).unwrap(),
        ))
    }

    #[test]
    fn test_uniqueness_over_edges() {
        assert!(enforce_edge_uniqueness(&[edge(1, 0, 1), edge(2, 1, 2), edge(3, 2, 3)]).unwrap());
        assert!(!enforce_edge_uniqueness(&[edge(1, 0, 1), edge(2, 1, 2), edge(1, 0, 1)]).unwrap());
    }

    #[test]
    fn test_uniqueness_over_graphids() {
        let ids: Vec<GtypeValue> = [5, 6, 7].iter().map(|i| GtypeValue::Integer(*i)).collect();
        assert!(enforce_edge_uniqueness(&ids).unwrap());
        let dup: Vec<GtypeValue> = [5, 6, 5].iter().map(|i| GtypeValue::Integer(*i)).collect();
        assert!(!enforce_edge_uniqueness(&dup).unwrap());
    }

    #[test]
    fn test_uniqueness_spans_arguments() {
        let ve = GtypeValue::PartialPath(vec![edge(1, 0, 1), vertex(1), edge(2, 1, 2)]);
        // a bare graphid colliding with an edge inside the variable edge
        assert!(!enforce_edge_uniqueness(&[ve.clone(), GtypeValue::Integer(2)]).unwrap());
        assert!(enforce_edge_uniqueness(&[ve, GtypeValue::Integer(9)]).unwrap());
    }

    #[test]
    fn test_uniqueness_rejects_null_and_wrong_types() {
        assert!(enforce_edge_uniqueness(&[GtypeValue::Null]).is_err());
        assert!(enforce_edge_uniqueness(&[GtypeValue::Bool(true)]).is_err());
    }

    #[test]
    fn test_container_uniqueness() {
        let a = PathContainer {
            graph: "g".into(),
            ids: vec![1, 101, 2],
        };
        let b = PathContainer {
            graph: "g".into(),
            ids: vec![2, 102, 3],
        };
        let dup = PathContainer {
            graph: "g".into(),
            ids: vec![3, 101, 4],
        };
        assert!(container_edge_uniqueness(&[a.clone(), b.clone()]));
        assert!(!container_edge_uniqueness(&[a, b, dup]));
    }

    #[test]
    fn test_edge_contained_in_variable_edge() {
        let ve = vec![edge(1, 0, 1), vertex(1), edge(2, 1, 2)];
        let e1 = Edge::build(1, 0, 1, "E", GtypeValue::Object(vec![])).unwrap();
        let e9 = Edge::build(9, 0, 1, "E", GtypeValue::Object(vec![])).unwrap();
        assert!(edge_contained_in_variable_edge(&e1, &ve));
        assert!(!edge_contained_in_variable_edge(&e9, &ve));
    }

    #[test]
    fn test_match_vles_endpoint_touch() {
        let lhs = vec![edge(1, 5, 6)];
        let rhs = vec![edge(2, 4, 5)];
        assert!(match_vles(&lhs, &rhs));
        let far = vec![edge(3, 8, 9)];
        assert!(!match_vles(&lhs, &far));
    }
}

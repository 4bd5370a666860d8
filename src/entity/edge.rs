//! Edge entity: `id | start_id | end_id | label | properties`.

use std::cmp::Ordering;

use crate::error::{GraphError, Result};
use crate::value::GtypeValue;

#[derive(Debug, Clone, PartialEq)]
pub struct Edge {
    pub id: i64,
    pub start_id: i64,
    pub end_id: i64,
    pub label: String,
    /// Always an object.
    pub properties: GtypeValue,
}

impl Edge {
    /// Build an edge. `properties` must be an object.
    pub fn build(
        id: i64,
        start_id: i64,
        end_id: i64,
        label: impl Into<String>,
        properties: GtypeValue,
    ) -> Result<Self> {
        if !matches!(properties, GtypeValue::Object(_)) {
            return Err(GraphError::TypeMismatch {
                op: "build_edge",
                left: "map",
                right: properties.type_name(),
            });
        }
        Ok(Edge {
            id,
            start_id,
            end_id,
            label: label.into(),
            properties,
        })
    }

    pub fn property(&self, key: &str) -> Option<&GtypeValue> {
        self.properties.object_get(key)
    }

    /// True when the edge touches the given vertex.
    pub fn touches(&self, vertex_id: i64) -> bool {
        self.start_id == vertex_id || self.end_id == vertex_id
    }

    /// The endpoint opposite `vertex_id`, if the edge touches it.
    pub fn opposite(&self, vertex_id: i64) -> Option<i64> {
        if self.start_id == vertex_id {
            Some(self.end_id)
        } else if self.end_id == vertex_id {
            Some(self.start_id)
        } else {
            None
        }
    }

    pub fn cmp_order(&self, other: &Edge) -> Ordering {
        self.id.cmp(&other.id)
    }
}

pub fn build_edge(
    id: i64,
    start_id: i64,
    end_id: i64,
    label: impl Into<String>,
    properties: GtypeValue,
) -> Result<GtypeValue> {
    Ok(GtypeValue::Edge(Box::new(Edge::build(
        id, start_id, end_id, label, properties,
    )?)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_requires_object_properties() {
        assert!(Edge::build(1, 2, 3, "KNOWS", GtypeValue::Object(vec![])).is_ok());
        let err = Edge::build(1, 2, 3, "KNOWS", GtypeValue::Null).unwrap_err();
        assert_eq!(err.code(), "TYPE_ERROR");
    }

    #[test]
    fn test_endpoints() {
        let e = Edge::build(10, 1, 2, "KNOWS", GtypeValue::Object(vec![])).unwrap();
        assert!(e.touches(1));
        assert!(e.touches(2));
        assert!(!e.touches(3));
        assert_eq!(e.opposite(1), Some(2));
        assert_eq!(e.opposite(2), Some(1));
        assert_eq!(e.opposite(9), None);
    }
}

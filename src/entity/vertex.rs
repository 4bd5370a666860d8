//! Vertex entity: `id | label | properties`.

use std::cmp::Ordering;

use crate::error::{GraphError, Result};
use crate::value::GtypeValue;

#[derive(Debug, Clone, PartialEq)]
pub struct Vertex {
    pub id: i64,
    pub label: String,
    /// Always an object.
    pub properties: GtypeValue,
}

impl Vertex {
    /// Build a vertex. `properties` must be an object.
    pub fn build(id: i64, label: impl Into<String>, properties: GtypeValue) -> Result<Self> {
        if !matches!(properties, GtypeValue::Object(_)) {
            return Err(GraphError::TypeMismatch {
                op: "build_vertex",
                left: "map",
                right: properties.type_name(),
            });
        }
        Ok(Vertex {
            id,
            label: label.into(),
            properties,
        })
    }

    pub fn property(&self, key: &str) -> Option<&GtypeValue> {
        self.properties.object_get(key)
    }

    /// Ordering follows the embedded id.
    pub fn cmp_order(&self, other: &Vertex) -> Ordering {
        self.id.cmp(&other.id)
    }
}

pub fn build_vertex(id: i64, label: impl Into<String>, properties: GtypeValue) -> Result<GtypeValue> {
    Ok(GtypeValue::Vertex(Box::new(Vertex::build(
        id, label, properties,
    )?)))
}

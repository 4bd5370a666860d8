//! In-memory graph cache: vertex and edge entries keyed by id, with
//! per-vertex out/in/self edge lists in stable insertion order.
//!
//! The cache is read-only for the duration of a query; concurrent
//! queries may share it. The catalog maps graph names to caches and is
//! the only source of `GraphNotFound`.

use std::collections::HashMap;

use serde::Deserialize;

use crate::codec::Gtype;
use crate::entity::{Edge, Vertex};
use crate::error::{GraphError, Result};
use crate::value::GtypeValue;

#[derive(Debug)]
pub struct VertexEntry {
    pub id: i64,
    pub label: String,
    /// Serialized property object, decoded on rehydration.
    pub properties: Gtype,
    pub edges_out: Vec<i64>,
    pub edges_in: Vec<i64>,
    pub edges_self: Vec<i64>,
}

#[derive(Debug)]
pub struct EdgeEntry {
    pub id: i64,
    pub start_id: i64,
    pub end_id: i64,
    pub label: String,
    pub properties: Gtype,
}

#[derive(Debug, Default)]
pub struct GraphCache {
    name: String,
    vertices: HashMap<i64, VertexEntry>,
    edges: HashMap<i64, EdgeEntry>,
}

impl GraphCache {
    pub fn new(name: impl Into<String>) -> Self {
        GraphCache {
            name: name.into(),
            vertices: HashMap::new(),
            edges: HashMap::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn add_vertex(
        &mut self,
        id: i64,
        label: impl Into<String>,
        properties: GtypeValue,
    ) -> Result<()> {
        if !matches!(properties, GtypeValue::Object(_)) {
            return Err(GraphError::TypeMismatch {
                op: "add_vertex",
                left: "map",
                right: properties.type_name(),
            });
        }
        let entry = VertexEntry {
            id,
            label: label.into(),
            properties: Gtype::from_value(&properties)?,
            edges_out: Vec::new(),
            edges_in: Vec::new(),
            edges_self: Vec::new(),
        };
        self.vertices.insert(id, entry);
        Ok(())
    }

    /// Insert an edge and link it into its endpoints' edge lists. Both
    /// endpoints must already be present; self-loops go on the self list
    /// only.
    pub fn add_edge(
        &mut self,
        id: i64,
        start_id: i64,
        end_id: i64,
        label: impl Into<String>,
        properties: GtypeValue,
    ) -> Result<()> {
        if !matches!(properties, GtypeValue::Object(_)) {
            return Err(GraphError::TypeMismatch {
                op: "add_edge",
                left: "map",
                right: properties.type_name(),
            });
        }
        if !self.vertices.contains_key(&start_id) || !self.vertices.contains_key(&end_id) {
            return Err(GraphError::Domain(format!(
                "edge {} references missing endpoint ({} -> {})",
                id, start_id, end_id
            )));
        }
        let entry = EdgeEntry {
            id,
            start_id,
            end_id,
            label: label.into(),
            properties: Gtype::from_value(&properties)?,
        };
        self.edges.insert(id, entry);
        if start_id == end_id {
            if let Some(v) = self.vertices.get_mut(&start_id) {
                v.edges_self.push(id);
            }
        } else {
            if let Some(v) = self.vertices.get_mut(&start_id) {
                v.edges_out.push(id);
            }
            if let Some(v) = self.vertices.get_mut(&end_id) {
                v.edges_in.push(id);
            }
        }
        Ok(())
    }

    pub fn get_vertex_entry(&self, id: i64) -> Option<&VertexEntry> {
        self.vertices.get(&id)
    }

    pub fn get_edge_entry(&self, id: i64) -> Option<&EdgeEntry> {
        self.edges.get(&id)
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    /// Rebuild a full vertex value from its cache entry.
    pub fn rehydrate_vertex(&self, id: i64) -> Result<GtypeValue> {
        let ve = self
            .get_vertex_entry(id)
            .ok_or_else(|| GraphError::Internal(format!("vertex {} missing from cache", id)))?;
        let props = ve.properties.to_value()?;
        Ok(GtypeValue::Vertex(Box::new(Vertex::build(
            ve.id,
            ve.label.clone(),
            props,
        )?)))
    }

    /// Rebuild a full edge value from its cache entry.
    pub fn rehydrate_edge(&self, id: i64) -> Result<GtypeValue> {
        let ee = self
            .get_edge_entry(id)
            .ok_or_else(|| GraphError::Internal(format!("edge {} missing from cache", id)))?;
        let props = ee.properties.to_value()?;
        Ok(GtypeValue::Edge(Box::new(Edge::build(
            ee.id,
            ee.start_id,
            ee.end_id,
            ee.label.clone(),
            props,
        )?)))
    }

    /// Load a cache from the JSON fixture form:
    /// `{"vertices": [{id, label, properties}], "edges": [{id, start, end, label, properties}]}`
    pub fn from_json(name: impl Into<String>, json: &str) -> Result<Self> {
        #[derive(Deserialize)]
        struct VertexFixture {
            id: i64,
            label: String,
            #[serde(default)]
            properties: serde_json::Map<String, serde_json::Value>,
        }

        #[derive(Deserialize)]
        struct EdgeFixture {
            id: i64,
            start: i64,
            end: i64,
            label: String,
            #[serde(default)]
            properties: serde_json::Map<String, serde_json::Value>,
        }

        #[derive(Deserialize)]
        struct GraphFixture {
            #[serde(default)]
            vertices: Vec<VertexFixture>,
            #[serde(default)]
            edges: Vec<EdgeFixture>,
        }

        let fixture: GraphFixture =
            serde_json::from_str(json).map_err(|e| GraphError::InvalidInput {
                target: "graph fixture",
                input: e.to_string(),
            })?;
        let mut cache = GraphCache::new(name);
        for v in fixture.vertices {
            cache.add_vertex(
                v.id,
                v.label,
                GtypeValue::from(serde_json::Value::Object(v.properties)),
            )?;
        }
        for e in fixture.edges {
            cache.add_edge(
                e.id,
                e.start,
                e.end,
                e.label,
                GtypeValue::from(serde_json::Value::Object(e.properties)),
            )?;
        }
        Ok(cache)
    }
}

/// Named graph caches, as the graph catalog service hands them to the
/// path engine.
#[derive(Debug, Default)]
pub struct GraphCatalog {
    graphs: HashMap<String, GraphCache>,
}

impl GraphCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, cache: GraphCache) {
        self.graphs.insert(cache.name.clone(), cache);
    }

    pub fn get(&self, name: &str) -> Result<&GraphCache> {
        self.graphs
            .get(name)
            .ok_or_else(|| GraphError::GraphNotFound(name.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> GraphCache {
        let mut c = GraphCache::new("g");
        c.add_vertex(1, "Person", GtypeValue::Object(vec![])).unwrap();
        c.add_vertex(2, "Person", GtypeValue::Object(vec![])).unwrap();
        c.add_edge(10, 1, 2, "KNOWS", GtypeValue::Object(vec![]))
            .unwrap();
        c.add_edge(11, 1, 1, "SELF", GtypeValue::Object(vec![]))
            .unwrap();
        c
    }

    #[test]
    fn test_edge_lists() {
        let c = sample();
        let v1 = c.get_vertex_entry(1).unwrap();
        assert_eq!(v1.edges_out, vec![10]);
        assert_eq!(v1.edges_self, vec![11]);
        assert!(v1.edges_in.is_empty());
        let v2 = c.get_vertex_entry(2).unwrap();
        assert_eq!(v2.edges_in, vec![10]);
    }

    #[test]
    fn test_edge_requires_endpoints() {
        let mut c = sample();
        assert!(c
            .add_edge(12, 1, 99, "KNOWS", GtypeValue::Object(vec![]))
            .is_err());
    }

    #[test]
    fn test_rehydration() {
        let mut c = GraphCache::new("g");
        c.add_vertex(
            1,
            "Person",
            serde_json::json!({"name": "Ada"}).into(),
        )
        .unwrap();
        let v = c.rehydrate_vertex(1).unwrap();
        match &v {
            GtypeValue::Vertex(vx) => {
                assert_eq!(vx.label, "Person");
                assert_eq!(
                    vx.property("name"),
                    Some(&GtypeValue::String("Ada".into()))
                );
            }
            other => panic!("expected vertex, got {:?}", other),
        }
        assert!(c.rehydrate_vertex(2).is_err());
    }

    #[test]
    fn test_catalog_lookup() {
        let mut cat = GraphCatalog::new();
        cat.insert(sample());
        assert!(cat.get("g").is_ok());
        assert_eq!(
            cat.get("missing").unwrap_err(),
            GraphError::GraphNotFound("missing".into())
        );
    }

    #[test]
    fn test_fixture_loading() {
        let cache = GraphCache::from_json(
            "fixture",
            r#"{
                "vertices": [
                    {"id": 1, "label": "A", "properties": {"k": 1}},
                    {"id": 2, "label": "B"}
                ],
                "edges": [
                    {"id": 10, "start": 1, "end": 2, "label": "E"}
                ]
            }"#,
        )
        .unwrap();
        assert_eq!(cache.vertex_count(), 2);
        assert_eq!(cache.edge_count(), 1);
        assert_eq!(cache.get_edge_entry(10).unwrap().end_id, 2);
    }
}

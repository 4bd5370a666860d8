//! Bounded-depth DFS path finder.
//!
//! One call to `next()` returns one matched path; the traversal state
//! (work stacks plus the per-edge state map) lives in the finder between
//! calls, so the query engine can drive it as a set-returning iterator
//! and drop it at any point for O(1) teardown.
//!
//! The state machine keeps three stacks. `edge_stack` holds candidate
//! edges not yet taken; `path_stack` holds the edges currently on the
//! active path (top = most recently taken); `vertex_stack` is maintained
//! only for undirected traversal, recording each candidate edge's source
//! vertex so the walk knows which endpoint it entered from.

use std::collections::HashMap;

use tracing::trace;

use crate::error::{GraphError, Result};
use crate::value::GtypeValue;
use crate::codec::binary::{Gtype, BINARY_TYPE_VLE_PATH, HDR_BINARY};
use crate::codec::compare::deep_contains;
use crate::vle::cache::{EdgeEntry, GraphCache, GraphCatalog};
use crate::vle::queue::GraphidStack;

/// Direction of the VLE edge pattern relative to the start vertex.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EdgeDirection {
    Left,
    Right,
    None,
}

/// Edge match prototype: optional label plus a property pattern that
/// must be deeply contained in a candidate edge's properties.
#[derive(Debug, Clone, Default)]
pub struct EdgePrototype {
    pub label: Option<String>,
    pub properties: Option<GtypeValue>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PathMode {
    /// Paths between a start and a provided end vertex.
    Between,
    /// All paths from a start vertex.
    From,
}

/// Per-edge traversal state. The match result is memoised so each edge
/// is tested against the prototype at most once per traversal.
#[derive(Debug, Clone, Copy, Default)]
struct EdgeState {
    used_in_path: bool,
    has_been_matched: bool,
    matched: bool,
}

/// One matched path as a graphid array: `[v, e, v, …, e, v]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathContainer {
    pub graph: String,
    pub ids: Vec<i64>,
}

impl PathContainer {
    pub fn edge_count(&self) -> usize {
        self.ids.len() / 2
    }

    pub fn edge_ids(&self) -> impl Iterator<Item = i64> + '_ {
        self.ids.iter().skip(1).step_by(2).copied()
    }

    pub fn vertex_ids(&self) -> impl Iterator<Item = i64> + '_ {
        self.ids.iter().step_by(2).copied()
    }

    /// Serialize as a BINARY gtype blob (graphid array with a subtype
    /// header), the form handed across the set-returning boundary.
    pub fn to_gtype(&self) -> Result<Gtype> {
        let mut bytes = Vec::with_capacity(12 + self.ids.len() * 8);
        bytes.extend_from_slice(&(HDR_BINARY | BINARY_TYPE_VLE_PATH).to_le_bytes());
        bytes.extend_from_slice(&(self.ids.len() as u32).to_le_bytes());
        for id in &self.ids {
            bytes.extend_from_slice(&id.to_le_bytes());
        }
        Gtype::from_value(&GtypeValue::Binary {
            flags: BINARY_TYPE_VLE_PATH,
            bytes,
        })
    }

    /// Decode the BINARY blob form back into a container.
    pub fn from_gtype(graph: impl Into<String>, blob: &Gtype) -> Result<Self> {
        let root = blob.root();
        if !root.is_binary()
            || root.header() & crate::codec::binary::BINARY_SUBTYPE_MASK != BINARY_TYPE_VLE_PATH
        {
            return Err(GraphError::Internal(
                "blob is not a VLE path container".into(),
            ));
        }
        let payload = root.binary_payload();
        if payload.len() < 4 {
            return Err(GraphError::Internal("VLE path container truncated".into()));
        }
        let count = u32::from_le_bytes(payload[0..4].try_into().unwrap()) as usize;
        let mut ids = Vec::with_capacity(count);
        for i in 0..count {
            let at = 4 + i * 8;
            let chunk = payload
                .get(at..at + 8)
                .ok_or_else(|| GraphError::Internal("VLE path container truncated".into()))?;
            ids.push(i64::from_le_bytes(chunk.try_into().unwrap()));
        }
        Ok(PathContainer {
            graph: graph.into(),
            ids,
        })
    }

    /// Materialise the full path value: `[v, e, v, …, v]`.
    pub fn materialize_path(&self, cache: &GraphCache) -> Result<GtypeValue> {
        let mut elems = Vec::with_capacity(self.ids.len());
        for (i, id) in self.ids.iter().enumerate() {
            if i % 2 == 0 {
                elems.push(cache.rehydrate_vertex(*id)?);
            } else {
                elems.push(cache.rehydrate_edge(*id)?);
            }
        }
        Ok(GtypeValue::Path(elems))
    }

    /// Materialise the variable-edge value: the interior sequence
    /// `[e, v, e, …, e]` with the endpoint vertices dropped (they are
    /// bound to other query variables).
    pub fn materialize_partial_path(&self, cache: &GraphCache) -> Result<GtypeValue> {
        let mut elems = Vec::new();
        for (i, id) in self.ids.iter().enumerate() {
            if i == 0 || i + 1 == self.ids.len() {
                continue;
            }
            if i % 2 == 1 {
                elems.push(cache.rehydrate_edge(*id)?);
            } else {
                elems.push(cache.rehydrate_vertex(*id)?);
            }
        }
        Ok(GtypeValue::PartialPath(elems))
    }

    /// Materialise just the matched edges as a list.
    pub fn materialize_edge_list(&self, cache: &GraphCache) -> Result<GtypeValue> {
        let mut elems = Vec::with_capacity(self.edge_count());
        for id in self.edge_ids() {
            elems.push(cache.rehydrate_edge(id)?);
        }
        Ok(GtypeValue::Array {
            elems,
            raw_scalar: false,
        })
    }
}

/// Resumable DFS over a shared read-only graph cache.
#[derive(Debug)]
pub struct VlePathFinder<'g> {
    cache: &'g GraphCache,
    vsid: i64,
    veid: Option<i64>,
    prototype: EdgePrototype,
    lidx: u64,
    /// None = unbounded.
    uidx: Option<u64>,
    direction: EdgeDirection,
    mode: PathMode,
    edge_state: HashMap<i64, EdgeState>,
    vertex_stack: GraphidStack,
    edge_stack: GraphidStack,
    path_stack: GraphidStack,
    /// Pending zero-length emission for `lidx = 0`.
    emit_trivial: bool,
}

impl<'g> VlePathFinder<'g> {
    /// Build a finder for paths between two vertices.
    #[allow(clippy::too_many_arguments)]
    pub fn paths_between(
        catalog: &'g GraphCatalog,
        graph: &str,
        vsid: i64,
        veid: i64,
        prototype: EdgePrototype,
        lidx: u64,
        uidx: Option<u64>,
        direction: EdgeDirection,
    ) -> Result<Self> {
        Self::build(
            catalog,
            graph,
            vsid,
            Some(veid),
            prototype,
            lidx,
            uidx,
            direction,
            PathMode::Between,
        )
    }

    /// Build a finder for all paths from a start vertex.
    #[allow(clippy::too_many_arguments)]
    pub fn paths_from(
        catalog: &'g GraphCatalog,
        graph: &str,
        vsid: i64,
        prototype: EdgePrototype,
        lidx: u64,
        uidx: Option<u64>,
        direction: EdgeDirection,
    ) -> Result<Self> {
        Self::build(
            catalog,
            graph,
            vsid,
            None,
            prototype,
            lidx,
            uidx,
            direction,
            PathMode::From,
        )
    }

    #[allow(clippy::too_many_arguments)]
    fn build(
        catalog: &'g GraphCatalog,
        graph: &str,
        vsid: i64,
        veid: Option<i64>,
        prototype: EdgePrototype,
        lidx: u64,
        uidx: Option<u64>,
        direction: EdgeDirection,
        mode: PathMode,
    ) -> Result<Self> {
        let cache = catalog.get(graph)?;
        let mut finder = VlePathFinder {
            cache,
            vsid,
            veid,
            prototype,
            lidx,
            uidx,
            direction,
            mode,
            edge_state: HashMap::new(),
            vertex_stack: GraphidStack::new(),
            edge_stack: GraphidStack::new(),
            path_stack: GraphidStack::new(),
            emit_trivial: false,
        };

        // a missing endpoint yields zero rows, not an error
        let endpoints_exist = cache.get_vertex_entry(vsid).is_some()
            && veid.map_or(true, |id| cache.get_vertex_entry(id).is_some());
        if endpoints_exist {
            finder.emit_trivial = lidx == 0
                && match mode {
                    PathMode::From => true,
                    PathMode::Between => Some(vsid) == veid,
                };
            finder.load_initial_edges(vsid)?;
        }
        Ok(finder)
    }

    /// Push the start vertex's candidate edges, as the first expansion
    /// of the DFS.
    fn load_initial_edges(&mut self, vsid: i64) -> Result<()> {
        self.add_valid_vertex_edges(vsid)
    }

    fn is_edge_match(&self, ee: &EdgeEntry) -> Result<bool> {
        if let Some(label) = &self.prototype.label {
            if label != &ee.label {
                return Ok(false);
            }
        }
        if let Some(pattern) = &self.prototype.properties {
            let props = ee.properties.to_value()?;
            if !deep_contains(&props, pattern) {
                return Ok(false);
            }
        }
        Ok(true)
    }

    /// Expand `vertex_id`: push every matching, unused incident edge
    /// (filtered by direction) onto the edge stack. For undirected
    /// traversal, the source vertex is pushed alongside each edge.
    fn add_valid_vertex_edges(&mut self, vertex_id: i64) -> Result<()> {
        let ve = self.cache.get_vertex_entry(vertex_id).ok_or_else(|| {
            GraphError::Internal(format!("vertex {} missing from cache", vertex_id))
        })?;

        let mut candidates: Vec<i64> = Vec::new();
        if self.direction != EdgeDirection::Left {
            candidates.extend_from_slice(&ve.edges_out);
        }
        if self.direction != EdgeDirection::Right {
            candidates.extend_from_slice(&ve.edges_in);
        }
        candidates.extend_from_slice(&ve.edges_self);

        for edge_id in candidates {
            let state = self.edge_state.get(&edge_id).copied().unwrap_or_default();
            // an edge already on the path would close a loop
            if state.used_in_path {
                continue;
            }
            let matched = if state.has_been_matched {
                state.matched
            } else {
                let ee = self.cache.get_edge_entry(edge_id).ok_or_else(|| {
                    GraphError::Internal(format!("edge {} missing from cache", edge_id))
                })?;
                let matched = self.is_edge_match(ee)?;
                let entry = self.edge_state.entry(edge_id).or_default();
                entry.has_been_matched = true;
                entry.matched = matched;
                matched
            };
            if matched {
                if self.direction == EdgeDirection::None {
                    self.vertex_stack.push(vertex_id);
                }
                self.edge_stack.push(edge_id);
            }
        }
        Ok(())
    }

    /// The vertex the walk moves to after taking `ee`, given the edge
    /// direction. Undirected traversal picks the endpoint opposite the
    /// edge's recorded source vertex.
    fn next_vertex(&self, ee: &EdgeEntry) -> Result<i64> {
        match self.direction {
            EdgeDirection::Right => Ok(ee.end_id),
            EdgeDirection::Left => Ok(ee.start_id),
            EdgeDirection::None => {
                let parent = self.vertex_stack.peek().ok_or_else(|| {
                    GraphError::Internal("vertex stack empty in undirected walk".into())
                })?;
                if ee.start_id == parent {
                    Ok(ee.end_id)
                } else if ee.end_id == parent {
                    Ok(ee.start_id)
                } else {
                    Err(GraphError::Internal(format!(
                        "edge {} does not touch its source vertex {}",
                        ee.id, parent
                    )))
                }
            }
        }
    }

    fn within_upper(&self, len: u64) -> bool {
        self.uidx.map_or(true, |u| len <= u)
    }

    fn below_upper(&self, len: u64) -> bool {
        self.uidx.map_or(true, |u| len < u)
    }

    /// Advance the DFS until the next complete path, or exhaustion.
    ///
    /// The top of the edge stack is inspected but left in place when an
    /// edge is taken into the path; it is removed later when the walk
    /// backtracks over it. An already-used edge on top of the edge stack
    /// means either backtracking (it is also the top of the path stack)
    /// or a loop-forming candidate to discard.
    fn dfs_find_a_path(&mut self) -> Result<bool> {
        while let Some(edge_id) = self.edge_stack.peek() {
            let state = self.edge_state.get(&edge_id).copied().unwrap_or_default();

            if state.used_in_path {
                if self.path_stack.peek() == Some(edge_id) {
                    // backtracking over the path's last edge
                    self.path_stack.pop();
                    if let Some(s) = self.edge_state.get_mut(&edge_id) {
                        s.used_in_path = false;
                    }
                }
                self.edge_stack.pop();
                if self.direction == EdgeDirection::None {
                    self.vertex_stack.pop();
                }
                continue;
            }

            // take the edge: mark it and extend the active path
            if let Some(s) = self.edge_state.get_mut(&edge_id) {
                s.used_in_path = true;
            }
            self.path_stack.push(edge_id);

            let ee = self.cache.get_edge_entry(edge_id).ok_or_else(|| {
                GraphError::Internal(format!("edge {} missing from cache", edge_id))
            })?;
            let next_vertex = self.next_vertex(ee)?;
            let len = self.path_stack.len() as u64;
            trace!(edge_id, next_vertex, len, "vle step");

            let found = match self.mode {
                PathMode::Between => {
                    Some(next_vertex) == self.veid
                        && len >= self.lidx
                        && self.within_upper(len)
                }
                PathMode::From => len >= self.lidx && self.within_upper(len),
            };

            // reached the end vertex beyond the upper bound: back up
            // without expanding further
            if self.mode == PathMode::Between
                && Some(next_vertex) == self.veid
                && !self.within_upper(len)
            {
                continue;
            }

            if self.below_upper(len) {
                self.add_valid_vertex_edges(next_vertex)?;
            }

            if found {
                return Ok(true);
            }
        }
        Ok(false)
    }

    /// Materialise the active path as a graphid array, start to end.
    /// The path stack stores edges bottom-up; interior vertices are
    /// recovered by walking the endpoints forward from the start.
    fn build_path_container(&self) -> PathContainer {
        let edge_ids: Vec<i64> = self.path_stack.iter_from_bottom().collect();
        let mut ids = Vec::with_capacity(edge_ids.len() * 2 + 1);
        let mut vid = self.vsid;
        ids.push(vid);
        for edge_id in edge_ids {
            ids.push(edge_id);
            if let Some(ee) = self.cache.get_edge_entry(edge_id) {
                vid = if vid == ee.start_id {
                    ee.end_id
                } else {
                    ee.start_id
                };
            }
            ids.push(vid);
        }
        PathContainer {
            graph: self.cache.name().to_string(),
            ids,
        }
    }
}

impl Iterator for VlePathFinder<'_> {
    type Item = Result<PathContainer>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.emit_trivial {
            self.emit_trivial = false;
            return Some(Ok(PathContainer {
                graph: self.cache.name().to_string(),
                ids: vec![self.vsid],
            }));
        }
        match self.dfs_find_a_path() {
            Err(e) => Some(Err(e)),
            Ok(true) => Some(Ok(self.build_path_container())),
            Ok(false) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vle::cache::GraphCache;

    fn catalog_with(cache: GraphCache) -> GraphCatalog {
        let mut cat = GraphCatalog::new();
        cat.insert(cache);
        cat
    }

    /// The 4-cycle v1-e1-v2-e2-v3-e3-v4-e4-v1.
    fn four_cycle() -> GraphCatalog {
        let mut c = GraphCache::new("cycle");
        for id in 1..=4 {
            c.add_vertex(id, "V", GtypeValue::Object(vec![])).unwrap();
        }
        c.add_edge(101, 1, 2, "E", GtypeValue::Object(vec![])).unwrap();
        c.add_edge(102, 2, 3, "E", GtypeValue::Object(vec![])).unwrap();
        c.add_edge(103, 3, 4, "E", GtypeValue::Object(vec![])).unwrap();
        c.add_edge(104, 4, 1, "E", GtypeValue::Object(vec![])).unwrap();
        catalog_with(c)
    }

    fn collect(finder: VlePathFinder<'_>) -> Vec<PathContainer> {
        finder.map(|r| r.unwrap()).collect()
    }

    #[test]
    fn test_missing_graph() {
        let cat = GraphCatalog::new();
        let err = VlePathFinder::paths_from(
            &cat,
            "nope",
            1,
            EdgePrototype::default(),
            1,
            None,
            EdgeDirection::None,
        )
        .unwrap_err();
        assert_eq!(err, GraphError::GraphNotFound("nope".into()));
    }

    #[test]
    fn test_missing_endpoint_yields_zero_rows() {
        let cat = four_cycle();
        let finder = VlePathFinder::paths_between(
            &cat,
            "cycle",
            1,
            99,
            EdgePrototype::default(),
            1,
            None,
            EdgeDirection::None,
        )
        .unwrap();
        assert!(collect(finder).is_empty());
    }

    #[test]
    fn test_cycle_between_bounds() {
        // between v1 and v3 with 2 <= len <= 3: exactly the two length-2
        // arcs; no length-3 row exists without repeating an edge
        let cat = four_cycle();
        let finder = VlePathFinder::paths_between(
            &cat,
            "cycle",
            1,
            3,
            EdgePrototype::default(),
            2,
            Some(3),
            EdgeDirection::None,
        )
        .unwrap();
        let mut rows = collect(finder);
        rows.sort_by_key(|p| p.ids.clone());
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].ids, vec![1, 101, 2, 102, 3]);
        assert_eq!(rows[1].ids, vec![1, 104, 4, 103, 3]);
        for row in &rows {
            assert_eq!(row.edge_count(), 2);
        }
    }

    #[test]
    fn test_no_edge_reuse_within_path() {
        let cat = four_cycle();
        let finder = VlePathFinder::paths_from(
            &cat,
            "cycle",
            1,
            EdgePrototype::default(),
            1,
            Some(10),
            EdgeDirection::None,
        )
        .unwrap();
        for row in collect(finder) {
            let mut seen = std::collections::HashSet::new();
            for e in row.edge_ids() {
                assert!(seen.insert(e), "edge {} repeated in {:?}", e, row.ids);
            }
        }
    }

    #[test]
    fn test_bounds_respected() {
        let cat = four_cycle();
        let finder = VlePathFinder::paths_from(
            &cat,
            "cycle",
            1,
            EdgePrototype::default(),
            2,
            Some(3),
            EdgeDirection::None,
        )
        .unwrap();
        for row in collect(finder) {
            assert!(row.edge_count() >= 2 && row.edge_count() <= 3);
        }
    }

    #[test]
    fn test_directed_right_walk() {
        let cat = four_cycle();
        let finder = VlePathFinder::paths_between(
            &cat,
            "cycle",
            1,
            3,
            EdgePrototype::default(),
            1,
            None,
            EdgeDirection::Right,
        )
        .unwrap();
        let rows = collect(finder);
        // only the forward arc exists when following edge direction
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].ids, vec![1, 101, 2, 102, 3]);
    }

    #[test]
    fn test_directed_left_walk() {
        let cat = four_cycle();
        let finder = VlePathFinder::paths_between(
            &cat,
            "cycle",
            3,
            1,
            EdgePrototype::default(),
            1,
            None,
            EdgeDirection::Left,
        )
        .unwrap();
        let rows = collect(finder);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].ids, vec![3, 102, 2, 101, 1]);
    }

    #[test]
    fn test_label_filter() {
        let mut c = GraphCache::new("g");
        for id in 1..=3 {
            c.add_vertex(id, "V", GtypeValue::Object(vec![])).unwrap();
        }
        c.add_edge(101, 1, 2, "KNOWS", GtypeValue::Object(vec![])).unwrap();
        c.add_edge(102, 1, 2, "LIKES", GtypeValue::Object(vec![])).unwrap();
        let cat = catalog_with(c);
        let finder = VlePathFinder::paths_between(
            &cat,
            "g",
            1,
            2,
            EdgePrototype {
                label: Some("KNOWS".into()),
                properties: None,
            },
            1,
            None,
            EdgeDirection::Right,
        )
        .unwrap();
        let rows = collect(finder);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].ids, vec![1, 101, 2]);
    }

    #[test]
    fn test_property_pattern_filter() {
        let mut c = GraphCache::new("g");
        c.add_vertex(1, "V", GtypeValue::Object(vec![])).unwrap();
        c.add_vertex(2, "V", GtypeValue::Object(vec![])).unwrap();
        c.add_edge(
            101,
            1,
            2,
            "E",
            serde_json::json!({"weight": 5, "kind": "road"}).into(),
        )
        .unwrap();
        c.add_edge(102, 1, 2, "E", serde_json::json!({"weight": 9}).into())
            .unwrap();
        let cat = catalog_with(c);
        let finder = VlePathFinder::paths_between(
            &cat,
            "g",
            1,
            2,
            EdgePrototype {
                label: None,
                properties: Some(serde_json::json!({"weight": 5}).into()),
            },
            1,
            None,
            EdgeDirection::Right,
        )
        .unwrap();
        let rows = collect(finder);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].ids[1], 101);
    }

    #[test]
    fn test_self_loop() {
        let mut c = GraphCache::new("g");
        c.add_vertex(1, "V", GtypeValue::Object(vec![])).unwrap();
        c.add_edge(101, 1, 1, "E", GtypeValue::Object(vec![])).unwrap();
        let cat = catalog_with(c);
        let finder = VlePathFinder::paths_between(
            &cat,
            "g",
            1,
            1,
            EdgePrototype::default(),
            1,
            None,
            EdgeDirection::Right,
        )
        .unwrap();
        let rows = collect(finder);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].ids, vec![1, 101, 1]);
    }

    #[test]
    fn test_trivial_path_with_zero_lower_bound() {
        let cat = four_cycle();
        let finder = VlePathFinder::paths_from(
            &cat,
            "cycle",
            1,
            EdgePrototype::default(),
            0,
            Some(1),
            EdgeDirection::None,
        )
        .unwrap();
        let rows = collect(finder);
        assert_eq!(rows[0].ids, vec![1]);
        assert!(rows.len() > 1);
        // between-mode zero bound needs matching endpoints
        let finder = VlePathFinder::paths_between(
            &cat,
            "cycle",
            1,
            3,
            EdgePrototype::default(),
            0,
            Some(1),
            EdgeDirection::None,
        )
        .unwrap();
        assert!(collect(finder).iter().all(|p| !p.ids.is_empty() && p.ids.len() > 1));
    }

    #[test]
    fn test_determinism() {
        let cat = four_cycle();
        let run = || {
            let finder = VlePathFinder::paths_from(
                &cat,
                "cycle",
                1,
                EdgePrototype::default(),
                1,
                Some(4),
                EdgeDirection::None,
            )
            .unwrap();
            collect(finder)
                .into_iter()
                .map(|p| p.ids)
                .collect::<Vec<_>>()
        };
        assert_eq!(run(), run());
    }

    #[test]
    fn test_container_blob_roundtrip() {
        let pc = PathContainer {
            graph: "g".into(),
            ids: vec![1, 101, 2, 102, 3],
        };
        let blob = pc.to_gtype().unwrap();
        let back = PathContainer::from_gtype("g", &blob).unwrap();
        assert_eq!(back, pc);
    }

    #[test]
    fn test_materialized_path_alternates() {
        let cat = four_cycle();
        let cache = cat.get("cycle").unwrap();
        let finder = VlePathFinder::paths_between(
            &cat,
            "cycle",
            1,
            3,
            EdgePrototype::default(),
            2,
            Some(2),
            EdgeDirection::None,
        )
        .unwrap();
        for row in collect(finder) {
            let path = row.materialize_path(cache).unwrap();
            match &path {
                GtypeValue::Path(elems) => {
                    assert_eq!(elems.len() % 2, 1);
                    for (i, e) in elems.iter().enumerate() {
                        if i % 2 == 0 {
                            assert!(matches!(e, GtypeValue::Vertex(_)));
                        } else {
                            assert!(matches!(e, GtypeValue::Edge(_)));
                        }
                    }
                }
                other => panic!("expected path, got {:?}", other),
            }
            let partial = row.materialize_partial_path(cache).unwrap();
            match &partial {
                GtypeValue::PartialPath(elems) => {
                    assert!(matches!(elems[0], GtypeValue::Edge(_)));
                    assert!(matches!(
                        elems[elems.len() - 1],
                        GtypeValue::Edge(_)
                    ));
                }
                other => panic!("expected partial path, got {:?}", other),
            }
        }
    }
}

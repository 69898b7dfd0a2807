//! Shortest paths over a `TerrainGraph` with suffix memoization.
//!
//! Every successful A* search caches each node-to-target suffix of the found
//! path (and the reversed pairs), so later queries that share a suffix are
//! answered without searching. Failed searches are cached for both orders of
//! the pair. The cache lives inside the graph and is cleared whenever a node
//! is added or removed.

use crate::graph::*;
use crate::location::*;
use fnv::FnvHashMap;
use log::*;
use pathfinding::directed::astar::astar;

/// Memoized answer for one ordered pair of nodes.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct CachedPath {
    /// Walking distance, `None` when the target cannot be reached.
    pub distance: Option<u32>,
    /// First node to step onto. Equal to the target when start == target.
    pub next: Option<NodeId>,
}

impl CachedPath {
    pub const UNREACHABLE: CachedPath = CachedPath {
        distance: None,
        next: None,
    };
}

#[derive(Default)]
pub struct PathCache {
    entries: FnvHashMap<(NodeId, NodeId), CachedPath>,
}

impl PathCache {
    pub fn get(&self, start: NodeId, target: NodeId) -> Option<CachedPath> {
        self.entries.get(&(start, target)).copied()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        if !self.entries.is_empty() {
            trace!("Clearing {} cached paths", self.entries.len());
        }
        self.entries.clear();
    }

    /// Cache every suffix of `path` toward its last node, plus the reversed
    /// pairs from the last node back to each path node.
    fn record_path(&mut self, path: &[NodeId]) {
        let target = match path.last() {
            Some(target) => *target,
            None => return,
        };
        let length = path.len() - 1;
        let back_step = if length > 0 { path[length - 1] } else { target };

        for (i, node) in path.iter().enumerate() {
            let distance = (length - i) as u32;
            let next = path.get(i + 1).copied().unwrap_or(target);
            self.entries.insert(
                (*node, target),
                CachedPath {
                    distance: Some(distance),
                    next: Some(next),
                },
            );
            if *node != target {
                self.entries.insert(
                    (target, *node),
                    CachedPath {
                        distance: Some(distance),
                        next: Some(back_step),
                    },
                );
            }
        }
    }

    fn record_unreachable(&mut self, start: NodeId, target: NodeId) {
        self.entries.insert((start, target), CachedPath::UNREACHABLE);
        self.entries.insert((target, start), CachedPath::UNREACHABLE);
    }
}

/// A* between two present nodes with unit step cost and a Manhattan heuristic.
fn find_path(graph: &TerrainGraph, start: NodeId, target: NodeId) -> Option<Vec<NodeId>> {
    let goal = graph.location_of(target);

    astar(
        &start,
        |&id| graph.neighbors(id).map(|n| (n, 1u32)).collect::<Vec<_>>(),
        |&id| graph.location_of(id).distance_to(goal),
        |&id| id == target,
    )
    .map(|(path, _cost)| path)
}

impl TerrainGraph {
    fn resolve_path(&mut self, start: Location, target: Location) -> CachedPath {
        let (start_id, target_id) = match (self.node_id(start), self.node_id(target)) {
            (Some(s), Some(t)) => (s, t),
            _ => return CachedPath::UNREACHABLE,
        };

        if let Some(cached) = self.paths.get(start_id, target_id) {
            return cached;
        }

        match find_path(self, start_id, target_id) {
            Some(path) => {
                trace!("Path {} -> {} has {} steps", start, target, path.len() - 1);
                self.paths.record_path(&path);
            }
            None => {
                trace!("No path {} -> {}", start, target);
                self.paths.record_unreachable(start_id, target_id);
            }
        }

        self.paths
            .get(start_id, target_id)
            .unwrap_or(CachedPath::UNREACHABLE)
    }

    /// Shortest walking distance, `None` when unreachable or either end is
    /// not part of this graph.
    pub fn distance_between(&mut self, start: Location, target: Location) -> Option<u32> {
        self.resolve_path(start, target).distance
    }

    pub fn is_reachable(&mut self, start: Location, target: Location) -> bool {
        self.distance_between(start, target).is_some()
    }

    /// First step on a shortest path from `start` to `target`.
    pub fn next_node_on_path_to(&mut self, start: Location, target: Location) -> Option<Location> {
        self.resolve_path(start, target)
            .next
            .map(|id| self.location_of(id))
    }

    pub fn path_cache(&self) -> &PathCache {
        &self.paths
    }
}

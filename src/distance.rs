//! Multi-source BFS distance fields over a `TerrainGraph`.
//!
//! Each field seeds its source layer, then expands one layer at a time; a node
//! is assigned exactly once, at the first layer that reaches it. Nodes that
//! are never reached keep `None`.

use crate::config::TileWeights;
use crate::graph::*;
use crate::location::*;
use crate::terrain::*;
use std::collections::VecDeque;

/// Expand `frontier` layer by layer, assigning `first` to the first new layer.
fn expand_layers(
    graph: &TerrainGraph,
    field: &mut [Option<u32>],
    mut frontier: Vec<NodeId>,
    first: u32,
) {
    let mut distance = first;
    while !frontier.is_empty() {
        let mut next = Vec::new();
        for &id in &frontier {
            for neighbor in graph.neighbors(id) {
                if field[neighbor].is_none() {
                    field[neighbor] = Some(distance);
                    next.push(neighbor);
                }
            }
        }
        frontier = next;
        distance += 1;
    }
}

impl TerrainGraph {
    fn empty_field(&self) -> Vec<Option<u32>> {
        vec![None; self.columns() * self.rows()]
    }

    fn store_field<F>(&mut self, field: &[Option<u32>], mut store: F)
    where
        F: FnMut(&mut Node, Option<u32>),
    {
        let ids: Vec<NodeId> = self.node_ids().collect();
        for id in ids {
            if let Some(node) = self.node_mut(id) {
                store(node, field[id]);
            }
        }
    }

    /// Water nodes get 0, dry nodes next to water 1, then +1 per layer inland.
    pub fn calculate_distance_to_water(&mut self) {
        let mut field = self.empty_field();
        let mut frontier = Vec::new();
        for id in self.node_ids() {
            if let Some(node) = self.node(id) {
                if node.is_next_to_water() {
                    field[id] = Some(1);
                    frontier.push(id);
                } else if node.is_water() {
                    field[id] = Some(0);
                }
            }
        }
        expand_layers(self, &mut field, frontier, 2);
        self.store_field(&field, |node, d| node.distance_to_water = d);
    }

    /// Flooded nodes and their neighbours get 0, then +1 per layer.
    pub fn calculate_distance_to_flooded(&mut self) {
        let mut field = self.empty_field();
        let mut frontier = Vec::new();
        for id in self.node_ids() {
            let is_source = self.node(id).map(|n| n.state()) == Some(TileState::Flooded)
                || self
                    .neighbors(id)
                    .any(|n| self.node(n).map(|n| n.state()) == Some(TileState::Flooded));
            if is_source {
                field[id] = Some(0);
                frontier.push(id);
            }
        }
        expand_layers(self, &mut field, frontier, 1);
        self.store_field(&field, |node, d| node.distance_to_flooded = d);
    }

    /// Dry nodes get 0, water nodes next to land 1, then +1 per layer seaward.
    pub fn calculate_distance_to_land(&mut self) {
        let mut field = self.empty_field();
        let mut frontier = Vec::new();
        for id in self.node_ids() {
            if let Some(node) = self.node(id) {
                if node.is_dry() {
                    field[id] = Some(0);
                } else if node.is_next_to_land() {
                    field[id] = Some(1);
                    frontier.push(id);
                }
            }
        }
        expand_layers(self, &mut field, frontier, 2);
        self.store_field(&field, |node, d| node.distance_to_land = d);
    }

    /// 0 for water, otherwise 1 plus the neighbours' distance to water.
    /// Expects `calculate_distance_to_water` to have run.
    pub fn middle_value(&self, id: NodeId) -> u32 {
        match self.node(id) {
            Some(node) if node.is_dry() => {
                1 + self
                    .neighbors(id)
                    .filter_map(|n| self.node(n).and_then(|n| n.distance_to_water()))
                    .sum::<u32>()
            }
            _ => 0,
        }
    }

    /// The node deepest inside the land, first in row-major order on ties.
    pub fn get_middle(&mut self) -> Option<Location> {
        self.calculate_distance_to_water();

        let mut best: Option<(NodeId, u32)> = None;
        for id in self.node_ids() {
            let value = self.middle_value(id);
            match best {
                Some((_, best_value)) if value <= best_value => {}
                _ => best = Some((id, value)),
            }
        }
        best.map(|(id, _)| self.location_of(id))
    }

    /// Weighted tile count used to rank islands.
    pub fn island_value(&self, weights: &TileWeights) -> u32 {
        self.nodes().map(|n| weights.weight(n.state())).sum()
    }
}

/// BFS walking distance from a set of seed locations over the graph's links.
/// Seeds that are not part of the graph are ignored.
pub fn flood_fill_distance(graph: &TerrainGraph, seeds: &[Location]) -> GridArray<Option<u32>> {
    let mut data: GridArray<Option<u32>> = GridArray::new(graph.columns(), graph.rows(), None);
    let mut queue = VecDeque::new();

    for seed in seeds {
        if let Some(id) = graph.node_id(*seed) {
            data.set(seed.x() as usize, seed.y() as usize, Some(0));
            queue.push_back((id, 0u32));
        }
    }

    while let Some((id, dist)) = queue.pop_front() {
        let next_dist = dist + 1;
        for neighbor in graph.neighbors(id) {
            let loc = graph.location_of(neighbor);
            let (ux, uy) = (loc.x() as usize, loc.y() as usize);
            if data.get(ux, uy).is_none() {
                data.set(ux, uy, Some(next_dist));
                queue.push_back((neighbor, next_dist));
            }
        }
    }

    data
}

//! Connected components of a graph view.

use crate::graph::*;

/// Node ids of each connected component, in the order of their first node
/// (row-major). Uses an explicit worklist, so board size never limits depth.
pub fn connected_components(graph: &TerrainGraph) -> Vec<Vec<NodeId>> {
    let mut visited = vec![false; graph.columns() * graph.rows()];
    let mut components = Vec::new();

    for start in graph.node_ids() {
        if visited[start] {
            continue;
        }

        let mut component = Vec::new();
        let mut stack = vec![start];
        visited[start] = true;

        while let Some(id) = stack.pop() {
            component.push(id);
            for neighbor in graph.neighbors(id) {
                if !visited[neighbor] {
                    visited[neighbor] = true;
                    stack.push(neighbor);
                }
            }
        }

        component.sort_unstable();
        components.push(component);
    }

    components
}

/// Split a graph into one sub-graph per connected component.
pub fn split_into_subgraphs(graph: &TerrainGraph) -> Vec<TerrainGraph> {
    connected_components(graph)
        .into_iter()
        .map(|component| TerrainGraph::restrict(graph, component))
        .collect()
}

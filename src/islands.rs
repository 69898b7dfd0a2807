//! Extended islands: dry cores plus the flooded tiles closest to them.
//!
//! Every flooded, walkable tile is owned by at most one island, recorded in a
//! single ownership table. Growth runs breadth-first from all cores at once,
//! so a tile is claimed by the core with the shortest walking distance over
//! flooded tiles; when two cores reach it at the same distance the lower
//! island id wins. Flooded tiles that no core can reach stay unowned.

use crate::components::connected_components;
use crate::config::TileWeights;
use crate::errors::GridError;
use crate::graph::*;
use crate::location::*;
use crate::terrain::*;
use log::*;

pub type IslandId = usize;

pub struct ExtendedIsland {
    id: IslandId,
    core_size: usize,
    graph: TerrainGraph,
}

impl ExtendedIsland {
    pub fn id(&self) -> IslandId {
        self.id
    }

    /// Number of dry and redried tiles in the core.
    pub fn core_size(&self) -> usize {
        self.core_size
    }

    pub fn graph(&self) -> &TerrainGraph {
        &self.graph
    }

    pub fn graph_mut(&mut self) -> &mut TerrainGraph {
        &mut self.graph
    }

    pub fn contains(&self, location: Location) -> bool {
        self.graph.contains(location)
    }

    pub fn value(&self, weights: &TileWeights) -> u32 {
        self.graph.island_value(weights)
    }

    /// Some tile of the island, used as a reachability probe.
    pub fn anchor(&self) -> Option<Location> {
        self.graph.locations().next()
    }
}

pub struct ExtendedIslands {
    owners: GridArray<Option<IslandId>>,
    islands: Vec<ExtendedIsland>,
}

impl ExtendedIslands {
    pub fn owner_of(&self, location: Location) -> Option<IslandId> {
        if (location.x() as usize) < self.owners.columns()
            && (location.y() as usize) < self.owners.rows()
        {
            *self.owners.at(location)
        } else {
            None
        }
    }

    pub fn islands(&self) -> &[ExtendedIsland] {
        &self.islands
    }

    pub fn get(&self, id: IslandId) -> Option<&ExtendedIsland> {
        self.islands.get(id)
    }

    pub fn get_mut(&mut self, id: IslandId) -> Option<&mut ExtendedIsland> {
        self.islands.get_mut(id)
    }

    pub fn len(&self) -> usize {
        self.islands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.islands.is_empty()
    }

    /// Mirror a state change into the island that owns `location`.
    pub fn set_state(&mut self, location: Location, state: TileState) -> Result<(), GridError> {
        if let Some(id) = self.owner_of(location) {
            if let Some(island) = self.islands.get_mut(id) {
                island.graph.set_state(location, state)?;
            }
        }
        Ok(())
    }

    pub fn into_vec(self) -> Vec<ExtendedIsland> {
        self.islands
    }
}

/// Partition the walkable part of `graph` into extended islands.
///
/// `graph` may be any view; drowned tiles are dropped and dry cores are taken
/// from its dry tiles. Each island graph carries `distance_to_land`: 0 on the
/// core, growing by one per flooded tile away from it.
pub fn split_into_extended_islands(graph: &TerrainGraph) -> ExtendedIslands {
    let walkable = make_walkable(graph);
    let dry = make_dry(graph);
    let cores = connected_components(&dry);

    let size = walkable.columns() * walkable.rows();
    let mut owner: Vec<Option<IslandId>> = vec![None; size];
    let mut distance: Vec<Option<u32>> = vec![None; size];

    let mut frontier: Vec<NodeId> = Vec::new();
    for (island, core) in cores.iter().enumerate() {
        for &id in core {
            owner[id] = Some(island);
            distance[id] = Some(0);
            frontier.push(id);
        }
    }

    let mut layer = 1;
    while !frontier.is_empty() {
        let mut next = Vec::new();
        for &id in &frontier {
            let claimant = owner[id];
            for neighbor in walkable.neighbors(id) {
                if walkable.node(neighbor).map(|n| n.state()) != Some(TileState::Flooded) {
                    continue;
                }
                match distance[neighbor] {
                    None => {
                        distance[neighbor] = Some(layer);
                        owner[neighbor] = claimant;
                        next.push(neighbor);
                    }
                    Some(d) if d == layer && claimant < owner[neighbor] => {
                        trace!(
                            "Reassigning {} from island {:?} to {:?} at distance {}",
                            walkable.location_of(neighbor),
                            owner[neighbor],
                            claimant,
                            d
                        );
                        owner[neighbor] = claimant;
                    }
                    _ => {}
                }
            }
        }
        frontier = next;
        layer += 1;
    }

    let mut members: Vec<Vec<NodeId>> = vec![Vec::new(); cores.len()];
    let mut owners = GridArray::new(walkable.columns(), walkable.rows(), None);
    for id in walkable.node_ids() {
        if let Some(island) = owner[id] {
            members[island].push(id);
            let location = walkable.location_of(id);
            owners.set(location.x() as usize, location.y() as usize, Some(island));
        }
    }

    let islands: Vec<ExtendedIsland> = members
        .into_iter()
        .zip(cores.iter())
        .enumerate()
        .map(|(id, (nodes, core))| {
            let mut island_graph = TerrainGraph::restrict(&walkable, nodes.iter().copied());
            for &node_id in &nodes {
                if let Some(node) = island_graph.node_mut(node_id) {
                    node.distance_to_land = distance[node_id];
                }
            }
            debug!(
                "Extended island {}: {} core tiles, {} tiles total",
                id,
                core.len(),
                nodes.len()
            );
            ExtendedIsland {
                id,
                core_size: core.len(),
                graph: island_graph,
            }
        })
        .collect();

    ExtendedIslands { owners, islands }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::arbitrary::TestBoard;
    use crate::distance::flood_fill_distance;
    use quickcheck::quickcheck;

    fn full(board: &str) -> TerrainGraph {
        TerrainGraph::from_grid(&TerrainGrid::parse(board).unwrap(), StateMask::all())
    }

    fn at(x: u32, y: u32) -> Location {
        Location::from_coords(x, y)
    }

    #[test]
    fn single_island_takes_its_ring() {
        let islands = split_into_extended_islands(&full(
            "
oooooo
o####o
o###~o
ooooo.",
        ));
        assert_eq!(islands.len(), 1);
        let island = &islands.islands()[0];
        assert_eq!(island.core_size(), 8);
        assert_eq!(island.graph().len(), 23);
        assert_eq!(island.value(&TileWeights::default()), 15 * 2 + 3 + 7 * 4);
        assert!(!island.contains(at(5, 3)));
        assert_eq!(
            island.graph().get_node(at(0, 0)).unwrap().distance_to_land(),
            Some(2)
        );
        assert_eq!(
            island.graph().get_node(at(1, 0)).unwrap().distance_to_land(),
            Some(1)
        );
    }

    #[test]
    fn flooded_tiles_go_to_the_nearest_core() {
        // Core A at x=0, core B at x=6. Tiles 1..=2 are closer to A, 4..=5 to B,
        // x=3 is equidistant and goes to the lower id.
        let islands = split_into_extended_islands(&full("#ooooo#"));
        assert_eq!(islands.len(), 2);
        for x in 0..=3 {
            assert_eq!(islands.owner_of(at(x, 0)), Some(0), "x = {}", x);
        }
        for x in 4..=6 {
            assert_eq!(islands.owner_of(at(x, 0)), Some(1), "x = {}", x);
        }
    }

    #[test]
    fn unreachable_flood_is_unowned() {
        let islands = split_into_extended_islands(&full("##.oo"));
        assert_eq!(islands.len(), 1);
        assert_eq!(islands.owner_of(at(3, 0)), None);
        assert_eq!(islands.owner_of(at(4, 0)), None);
        assert_eq!(islands.owner_of(at(2, 0)), None);
    }

    #[test]
    fn growth_only_crosses_flooded_tiles() {
        // The drowned tile splits the flood between the two cores.
        let islands = split_into_extended_islands(&full("#o.o#"));
        assert_eq!(islands.owner_of(at(1, 0)), Some(0));
        assert_eq!(islands.owner_of(at(3, 0)), Some(1));
    }

    #[test]
    fn state_changes_reach_the_owning_island() {
        let mut islands = split_into_extended_islands(&full("#o"));
        islands.set_state(at(1, 0), TileState::Redried).unwrap();
        assert_eq!(
            islands.islands()[0].graph().get_node(at(1, 0)).unwrap().state(),
            TileState::Redried
        );
    }

    quickcheck! {
        fn ownership_follows_nearest_core(board: TestBoard) -> bool {
            let full = TerrainGraph::from_grid(&board.grid, StateMask::all());
            let walkable = make_walkable(&full);
            let islands = split_into_extended_islands(&full);

            // Each tile is held by at most one island, matching owner_of.
            for location in walkable.locations() {
                let holders: Vec<IslandId> = islands
                    .islands()
                    .iter()
                    .filter(|i| i.contains(location))
                    .map(|i| i.id())
                    .collect();
                if holders.len() > 1 || holders.first().copied() != islands.owner_of(location) {
                    return false;
                }
            }

            // Independent check: BFS from each core over flooded tiles only.
            let cores = connected_components(&make_dry(&full));
            let flooded: Vec<NodeId> = walkable
                .node_ids()
                .filter(|&id| walkable.node(id).map(|n| n.state()) == Some(TileState::Flooded))
                .collect();
            let per_core: Vec<GridArray<Option<u32>>> = cores
                .iter()
                .map(|core| {
                    let sub = TerrainGraph::restrict(
                        &walkable,
                        core.iter().copied().chain(flooded.iter().copied()),
                    );
                    let seeds: Vec<Location> = core.iter().map(|&id| walkable.location_of(id)).collect();
                    flood_fill_distance(&sub, &seeds)
                })
                .collect();

            for (index, core) in cores.iter().enumerate() {
                if core.iter().any(|&id| islands.owner_of(walkable.location_of(id)) != Some(index)) {
                    return false;
                }
            }

            for &id in &flooded {
                let location = walkable.location_of(id);
                let best = per_core
                    .iter()
                    .enumerate()
                    .filter_map(|(i, field)| field.at(location).map(|d| (d, i)))
                    .min();
                if islands.owner_of(location) != best.map(|(_, i)| i) {
                    return false;
                }
                if let Some((d, i)) = best {
                    let stored = islands.islands()[i]
                        .graph()
                        .get_node(location)
                        .and_then(|n| n.distance_to_land());
                    if stored != Some(d) {
                        return false;
                    }
                }
            }
            true
        }
    }
}

//! Arena-backed 4-connected grid graph.
//!
//! A `TerrainGraph` owns one optional slot per board tile. Empty slots are
//! tiles excluded from the current view (e.g. drowned tiles in the walkable
//! view). Neighbour links are never stored: they are looked up from the slot
//! array, so a link from A to B exists exactly when both slots are occupied
//! and adjacent, which keeps connectivity symmetric after every mutation.
//!
//! Derived predicates (`is_water`, `is_next_to_water`, `is_next_to_land`) are
//! cached per node and recomputed eagerly for a node and its neighbours
//! whenever a state or slot changes.

use crate::errors::GridError;
use crate::location::*;
use crate::path::PathCache;
use crate::terrain::*;
use bitflags::*;
use log::*;

/// Index of a slot in the arena, `y * columns + x`. Stable across views of
/// the same board, so ids from one view can be used to look up another.
pub type NodeId = usize;

bitflags! {
    /// Cached derived predicates of a node.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
    pub struct NodeFlags: u8 {
        const WATER = 1;
        const NEXT_TO_WATER = 2;
        const NEXT_TO_LAND = 4;
    }
}

#[derive(Clone, Debug)]
pub struct Node {
    location: Location,
    state: TileState,
    flags: NodeFlags,
    pub(crate) distance_to_water: Option<u32>,
    pub(crate) distance_to_flooded: Option<u32>,
    pub(crate) distance_to_land: Option<u32>,
}

impl Node {
    fn new(location: Location, state: TileState) -> Node {
        Node {
            location,
            state,
            flags: NodeFlags::empty(),
            distance_to_water: None,
            distance_to_flooded: None,
            distance_to_land: None,
        }
    }

    #[inline]
    pub fn location(&self) -> Location {
        self.location
    }

    #[inline]
    pub fn x(&self) -> u16 {
        self.location.x()
    }

    #[inline]
    pub fn y(&self) -> u16 {
        self.location.y()
    }

    #[inline]
    pub fn state(&self) -> TileState {
        self.state
    }

    #[inline]
    pub fn is_water(&self) -> bool {
        self.flags.contains(NodeFlags::WATER)
    }

    #[inline]
    pub fn is_dry(&self) -> bool {
        !self.is_water()
    }

    /// Dry and bordering water. A missing neighbour (board edge or a tile
    /// excluded from the view) counts as water.
    #[inline]
    pub fn is_next_to_water(&self) -> bool {
        self.flags.contains(NodeFlags::NEXT_TO_WATER)
    }

    /// Water and bordering at least one dry tile.
    #[inline]
    pub fn is_next_to_land(&self) -> bool {
        self.flags.contains(NodeFlags::NEXT_TO_LAND)
    }

    /// `None` until `calculate_distance_to_water` ran, or when unreachable.
    pub fn distance_to_water(&self) -> Option<u32> {
        self.distance_to_water
    }

    pub fn distance_to_flooded(&self) -> Option<u32> {
        self.distance_to_flooded
    }

    pub fn distance_to_land(&self) -> Option<u32> {
        self.distance_to_land
    }
}

pub struct TerrainGraph {
    columns: usize,
    rows: usize,
    slots: Vec<Option<Node>>,
    node_count: usize,
    pub(crate) paths: PathCache,
}

impl TerrainGraph {
    fn empty(columns: usize, rows: usize) -> TerrainGraph {
        TerrainGraph {
            columns,
            rows,
            slots: vec![None; columns * rows],
            node_count: 0,
            paths: PathCache::default(),
        }
    }

    /// Build a graph containing every tile of `grid` whose state is in `view`.
    pub fn from_grid(grid: &TerrainGrid, view: StateMask) -> TerrainGraph {
        let mut graph = TerrainGraph::empty(grid.columns(), grid.rows());
        for (location, state) in grid.iter() {
            if view.contains(state.mask()) {
                let id = graph.id_unchecked(location);
                graph.slots[id] = Some(Node::new(location, state));
                graph.node_count += 1;
            }
        }
        graph.refresh_all();
        graph
    }

    /// Copy the nodes of `graph` whose state is in `view` into a new graph.
    /// Distance fields and the path cache are not carried over.
    pub fn from_graph(graph: &TerrainGraph, view: StateMask) -> TerrainGraph {
        TerrainGraph::restrict(
            graph,
            graph
                .nodes()
                .filter(|n| view.contains(n.state.mask()))
                .map(|n| graph.id_unchecked(n.location)),
        )
    }

    /// Sub-graph of `graph` containing only the given nodes. Ids that are not
    /// present in `graph` are skipped.
    pub fn restrict<I>(graph: &TerrainGraph, ids: I) -> TerrainGraph
    where
        I: IntoIterator<Item = NodeId>,
    {
        let mut sub = TerrainGraph::empty(graph.columns, graph.rows);
        for id in ids {
            if let Some(Some(node)) = graph.slots.get(id) {
                if sub.slots[id].is_none() {
                    sub.slots[id] = Some(Node::new(node.location, node.state));
                    sub.node_count += 1;
                }
            }
        }
        sub.refresh_all();
        sub
    }

    #[inline]
    pub fn columns(&self) -> usize {
        self.columns
    }

    #[inline]
    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn len(&self) -> usize {
        self.node_count
    }

    pub fn is_empty(&self) -> bool {
        self.node_count == 0
    }

    pub fn in_bounds(&self, location: Location) -> bool {
        (location.x() as usize) < self.columns && (location.y() as usize) < self.rows
    }

    fn check_bounds(&self, location: Location) -> Result<NodeId, GridError> {
        if self.in_bounds(location) {
            Ok(self.id_unchecked(location))
        } else {
            Err(GridError::OutOfBounds {
                location,
                columns: self.columns,
                rows: self.rows,
            })
        }
    }

    #[inline]
    fn id_unchecked(&self, location: Location) -> NodeId {
        location.y() as usize * self.columns + location.x() as usize
    }

    /// Id of the node at `location`, if the slot is occupied.
    pub fn node_id(&self, location: Location) -> Option<NodeId> {
        if !self.in_bounds(location) {
            return None;
        }
        let id = self.id_unchecked(location);
        self.slots[id].as_ref().map(|_| id)
    }

    pub fn contains(&self, location: Location) -> bool {
        self.node_id(location).is_some()
    }

    pub fn get_node(&self, location: Location) -> Option<&Node> {
        self.node_id(location).and_then(|id| self.node(id))
    }

    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.slots.get(id).and_then(|slot| slot.as_ref())
    }

    pub(crate) fn node_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.slots.get_mut(id).and_then(|slot| slot.as_mut())
    }

    pub fn location_of(&self, id: NodeId) -> Location {
        Location::from_coords((id % self.columns) as u32, (id / self.columns) as u32)
    }

    /// All present nodes in row-major order.
    pub fn nodes(&self) -> impl Iterator<Item = &Node> {
        self.slots.iter().filter_map(|slot| slot.as_ref())
    }

    pub fn node_ids(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.slots
            .iter()
            .enumerate()
            .filter_map(|(id, slot)| slot.as_ref().map(|_| id))
    }

    pub fn locations(&self) -> impl Iterator<Item = Location> + '_ {
        self.nodes().map(|n| n.location)
    }

    /// The neighbour of `id` in `direction`, if both slots are occupied.
    pub fn neighbor(&self, id: NodeId, direction: Direction) -> Option<NodeId> {
        if direction == Direction::Current {
            return None;
        }
        let location = self.node(id)?.location;
        let next = location.step(direction)?;
        self.node_id(next)
    }

    /// Present neighbours in North, East, South, West order.
    pub fn neighbors(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        Direction::CARDINAL
            .into_iter()
            .filter_map(move |direction| self.neighbor(id, direction))
    }

    pub fn neighbors_with_direction(
        &self,
        id: NodeId,
    ) -> impl Iterator<Item = (Direction, NodeId)> + '_ {
        Direction::CARDINAL
            .into_iter()
            .filter_map(move |direction| self.neighbor(id, direction).map(|n| (direction, n)))
    }

    /// Change a node's state. Slots are left alone even if the new state no
    /// longer matches the view the graph was built with.
    pub fn set_state(&mut self, location: Location, state: TileState) -> Result<(), GridError> {
        let id = self.check_bounds(location)?;
        if let Some(node) = self.node_mut(id) {
            node.state = state;
            self.refresh_around(id);
        }
        Ok(())
    }

    /// Insert (or replace) the node at `location`. Clears the path cache.
    pub fn add_node(&mut self, location: Location, state: TileState) -> Result<(), GridError> {
        let id = self.check_bounds(location)?;
        if self.slots[id].is_none() {
            self.node_count += 1;
        }
        self.slots[id] = Some(Node::new(location, state));
        self.refresh_around(id);
        self.paths.clear();
        Ok(())
    }

    /// Remove the node at `location`, returning it. Clears the path cache.
    pub fn remove_node(&mut self, location: Location) -> Result<Option<Node>, GridError> {
        let id = self.check_bounds(location)?;
        let removed = self.slots[id].take();
        if removed.is_some() {
            self.node_count -= 1;
            self.refresh_around(id);
            self.paths.clear();
        }
        Ok(removed)
    }

    /// Verify that every link has a matching back link.
    pub fn validate_links(&self) -> Result<(), GridError> {
        for id in self.node_ids() {
            for (direction, neighbor) in self.neighbors_with_direction(id) {
                if self.neighbor(neighbor, direction.opposite()) != Some(id) {
                    return Err(GridError::AsymmetricLink {
                        location: self.location_of(id),
                        direction,
                    });
                }
            }
        }
        Ok(())
    }

    fn refresh_all(&mut self) {
        for id in 0..self.slots.len() {
            self.refresh_node(id);
        }
    }

    fn refresh_around(&mut self, id: NodeId) {
        self.refresh_node(id);
        let location = self.location_of(id);
        for direction in Direction::CARDINAL {
            if let Some(next) = location.step(direction) {
                if self.in_bounds(next) {
                    let next_id = self.id_unchecked(next);
                    self.refresh_node(next_id);
                }
            }
        }
    }

    fn refresh_node(&mut self, id: NodeId) {
        let (is_water, location) = match self.node(id) {
            Some(node) => (node.state.is_water(), node.location),
            None => return,
        };

        let mut has_water_neighbor = false;
        let mut has_dry_neighbor = false;
        let mut missing_link = false;
        for direction in Direction::CARDINAL {
            let neighbor = location
                .step(direction)
                .and_then(|next| self.get_node(next));
            match neighbor {
                Some(n) if n.state.is_water() => has_water_neighbor = true,
                Some(_) => has_dry_neighbor = true,
                None => missing_link = true,
            }
        }

        let mut flags = NodeFlags::empty();
        if is_water {
            flags |= NodeFlags::WATER;
            if has_dry_neighbor {
                flags |= NodeFlags::NEXT_TO_LAND;
            }
        } else if has_water_neighbor || missing_link {
            flags |= NodeFlags::NEXT_TO_WATER;
        }

        if let Some(node) = self.node_mut(id) {
            if node.flags != flags {
                trace!("Node {} flags {:?} -> {:?}", location, node.flags, flags);
            }
            node.flags = flags;
        }
    }
}

/// Graph of every tile the bot can stand on (all but drowned).
pub fn make_walkable(graph: &TerrainGraph) -> TerrainGraph {
    TerrainGraph::from_graph(graph, StateMask::WALKABLE)
}

/// Graph of the dry and redried tiles only.
pub fn make_dry(graph: &TerrainGraph) -> TerrainGraph {
    TerrainGraph::from_graph(graph, StateMask::LAND)
}

#[cfg(test)]
mod tests {
    use super::*;
    use quickcheck::quickcheck;

    use crate::arbitrary::{BoardMutations, TestBoard};

    const G1: &str = "
oooooo
o####o
o####o
ooooo.";

    const G2: &str = "
.oooo.
o####o
o####o
o####o
.oooo.
......";

    fn full(board: &str) -> TerrainGraph {
        TerrainGraph::from_grid(&TerrainGrid::parse(board).unwrap(), StateMask::all())
    }

    fn at(x: u32, y: u32) -> Location {
        Location::from_coords(x, y)
    }

    #[test]
    fn graph_matches_board() {
        let g = full(G1);
        assert_eq!(g.rows(), 4);
        assert_eq!(g.columns(), 6);
        for (y, line) in G1.split_whitespace().enumerate() {
            for (x, c) in line.chars().enumerate() {
                let node = g.get_node(at(x as u32, y as u32)).unwrap();
                assert_eq!(node.state().as_char(), c);
                assert_eq!(node.x() as usize, x);
                assert_eq!(node.y() as usize, y);
            }
        }
    }

    #[test]
    fn connections_follow_the_grid() {
        let g = full(G1);
        let corner = g.node_id(at(0, 0)).unwrap();
        assert_eq!(g.neighbor(corner, Direction::West), None);
        assert_eq!(g.neighbor(corner, Direction::North), None);
        assert_eq!(g.neighbor(corner, Direction::East), g.node_id(at(1, 0)));
        assert_eq!(g.neighbor(corner, Direction::South), g.node_id(at(0, 1)));

        assert_eq!(g.neighbors(corner).count(), 2);
        assert_eq!(g.neighbors(g.node_id(at(0, 1)).unwrap()).count(), 3);
        assert_eq!(g.neighbors(g.node_id(at(1, 1)).unwrap()).count(), 4);
    }

    #[test]
    fn water_predicates() {
        let g = full(G2);
        assert!(g.get_node(at(0, 0)).unwrap().is_water());
        assert!(!g.get_node(at(1, 1)).unwrap().is_water());
        assert!(g.get_node(at(1, 1)).unwrap().is_next_to_water());
        assert!(!g.get_node(at(2, 2)).unwrap().is_next_to_water());
        assert!(g.get_node(at(1, 0)).unwrap().is_next_to_land());
        assert!(!g.get_node(at(0, 0)).unwrap().is_next_to_land());
    }

    #[test]
    fn board_edge_counts_as_water() {
        let g = full("###\n###");
        assert!(g.get_node(at(0, 0)).unwrap().is_next_to_water());
        assert!(g.get_node(at(1, 1)).unwrap().is_next_to_water());
    }

    #[test]
    fn walkable_view_drops_drowned() {
        let g = full(G2);
        let walkable = make_walkable(&g);
        for (y, line) in G2.split_whitespace().enumerate() {
            for (x, c) in line.chars().enumerate() {
                assert_eq!(walkable.contains(at(x as u32, y as u32)), c != '.');
            }
        }
        assert_eq!(walkable.len(), 6 * 6 - 10);
        let id = walkable.node_id(at(0, 1)).unwrap();
        assert_eq!(walkable.neighbor(id, Direction::North), None);
    }

    #[test]
    fn dry_view_is_idempotent_over_walkable() {
        let g = full(G2);
        let dry = make_dry(&g);
        let dry2 = make_dry(&make_walkable(&g));
        assert_eq!(dry.len(), 3 * 4);
        assert_eq!(
            dry.locations().collect::<Vec<_>>(),
            dry2.locations().collect::<Vec<_>>()
        );
        for node in dry.nodes() {
            assert_eq!(node.state(), TileState::Dry);
        }
        let id = dry.node_id(at(1, 1)).unwrap();
        assert_eq!(dry.neighbor(id, Direction::West), None);
        assert!(dry.get_node(at(1, 1)).unwrap().is_next_to_water());
    }

    #[test]
    fn remove_and_add_keep_links_consistent() {
        let mut g = full(G1);
        let centre = at(2, 1);
        let removed = g.remove_node(centre).unwrap();
        assert!(removed.is_some());
        assert!(!g.contains(centre));
        let west = g.node_id(at(1, 1)).unwrap();
        assert_eq!(g.neighbor(west, Direction::East), None);
        assert!(g.get_node(at(1, 1)).unwrap().is_next_to_water());
        assert!(g.validate_links().is_ok());

        g.add_node(centre, TileState::Dry).unwrap();
        assert_eq!(g.neighbor(west, Direction::East), g.node_id(centre));
        assert!(g.validate_links().is_ok());
        assert_eq!(g.len(), 24);
    }

    #[test]
    fn set_state_refreshes_neighbours() {
        let mut g = full("###\n###\n###");
        assert!(!g.get_node(at(1, 1)).unwrap().is_next_to_water());
        g.set_state(at(1, 0), TileState::Flooded).unwrap();
        assert!(g.get_node(at(1, 1)).unwrap().is_next_to_water());
        assert!(g.get_node(at(1, 0)).unwrap().is_next_to_land());
        g.set_state(at(1, 0), TileState::Redried).unwrap();
        assert!(!g.get_node(at(1, 1)).unwrap().is_next_to_water());
    }

    #[test]
    fn out_of_range_mutations_fail() {
        let mut g = full("##");
        assert!(matches!(
            g.add_node(at(5, 0), TileState::Dry),
            Err(GridError::OutOfBounds { .. })
        ));
        assert!(matches!(
            g.remove_node(at(0, 3)),
            Err(GridError::OutOfBounds { .. })
        ));
    }

    quickcheck! {
        fn predicates_match_state(board: TestBoard) -> bool {
            let g = TerrainGraph::from_grid(&board.grid, StateMask::all());
            let consistent = g.nodes().all(|n| {
                n.is_water() == matches!(n.state(), TileState::Flooded | TileState::Drowned)
                    && n.is_dry() == !n.is_water()
            });
            consistent
        }

        fn links_stay_symmetric(mutations: BoardMutations) -> bool {
            let mut g = make_walkable(&TerrainGraph::from_grid(&mutations.board.grid, StateMask::all()));
            if g.validate_links().is_err() {
                return false;
            }
            for (location, add) in mutations.edits {
                let result = if add {
                    g.add_node(location, TileState::Dry)
                } else {
                    g.remove_node(location).map(|_| ())
                };
                if result.is_err() || g.validate_links().is_err() {
                    return false;
                }
            }
            g.len() == g.nodes().count()
        }
    }
}

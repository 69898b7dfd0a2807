//! Per-turn decision making.
//!
//! Each round the engine rebuilds the walkable graph and the extended islands
//! from the persistent `TerrainGrid`, picks a mode, and synthesizes exactly
//! `ACTIONS_PER_TURN` actions:
//!
//! * `Farming` - the bot stands on the most valuable island: dry the tile
//!   underneath or next to it, otherwise walk to the best flooded cluster.
//! * `Moving` - a better island is reachable: dry what is at hand, otherwise
//!   walk toward the middle of the most valuable reachable island.
//! * `DryMax` - nothing is reachable: dry whatever is adjacent, then drift
//!   toward the nearest flooded tile.
//!
//! Every DRY is applied to the grid, the walkable graph and the island graphs
//! before the next action is chosen.

use crate::components::connected_components;
use crate::config::*;
use crate::constants::*;
use crate::distance::flood_fill_distance;
use crate::errors::GridError;
use crate::graph::*;
use crate::islands::*;
use crate::location::*;
use crate::terrain::*;
use itertools::Itertools;
use log::*;
use serde::{Deserialize, Serialize};
use std::cmp::Reverse;
use std::fmt;

/// One command sent back to the server.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Action {
    Go(Direction),
    Dry(Direction),
}

impl Action {
    pub const STAY: Action = Action::Go(Direction::Current);

    pub fn direction(self) -> Direction {
        match self {
            Action::Go(direction) | Action::Dry(direction) => direction,
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Action::Go(direction) => write!(f, "GO {}", direction),
            Action::Dry(direction) => write!(f, "DRY {}", direction),
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Mode {
    Farming,
    Moving,
    DryMax,
}

/// The outcome of one round.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TurnPlan {
    pub mode: Mode,
    pub actions: [Action; ACTIONS_PER_TURN],
    /// Where the bot ends up after the actions.
    pub final_position: Location,
}

pub struct StrategyEngine {
    config: StrategyConfig,
}

impl Default for StrategyEngine {
    fn default() -> Self {
        StrategyEngine::new(StrategyConfig::default())
    }
}

impl StrategyEngine {
    pub fn new(config: StrategyConfig) -> Self {
        StrategyEngine { config }
    }

    pub fn config(&self) -> &StrategyConfig {
        &self.config
    }

    /// Decide the actions for one round and apply their DRY effects to `grid`.
    ///
    /// Fails without touching `grid` if `position` lies outside the board or
    /// the rebuilt graph is inconsistent.
    pub fn play(&self, grid: &mut TerrainGrid, position: Location) -> Result<TurnPlan, GridError> {
        if !grid.contains(position) {
            return Err(GridError::OutOfBounds {
                location: position,
                columns: grid.columns(),
                rows: grid.rows(),
            });
        }

        let full = TerrainGraph::from_grid(grid, StateMask::all());
        let walkable = make_walkable(&full);
        walkable.validate_links()?;
        let islands = split_into_extended_islands(&full);

        let mut turn = Turn {
            config: &self.config,
            grid,
            walkable,
            islands,
            position,
            actions: Vec::with_capacity(ACTIONS_PER_TURN),
        };

        let mode = match self.config.strategy {
            StrategyKind::DryMax => Mode::DryMax,
            StrategyKind::Adaptive => turn.evaluate_mode(),
        };
        debug!("Playing {:?} from {}", mode, position);

        match mode {
            Mode::Farming => turn.farm()?,
            Mode::Moving => turn.travel()?,
            Mode::DryMax => turn.dry_max()?,
        }

        let mut actions = [Action::STAY; ACTIONS_PER_TURN];
        for (slot, action) in actions.iter_mut().zip(turn.actions.iter()) {
            *slot = *action;
        }
        debug!(
            "Actions: {}",
            actions.iter().map(|a| a.to_string()).join(", ")
        );

        Ok(TurnPlan {
            mode,
            actions,
            final_position: turn.position,
        })
    }
}

/// Scratch state of a single round.
struct Turn<'a> {
    config: &'a StrategyConfig,
    grid: &'a mut TerrainGrid,
    walkable: TerrainGraph,
    islands: ExtendedIslands,
    position: Location,
    actions: Vec<Action>,
}

impl<'a> Turn<'a> {
    fn remaining(&self) -> bool {
        self.actions.len() < ACTIONS_PER_TURN
    }

    /// Islands by value, best first; lower id first on equal value.
    fn ranked_islands(&self) -> Vec<(IslandId, u32)> {
        self.islands
            .islands()
            .iter()
            .map(|island| (island.id(), island.value(&self.config.weights)))
            .sorted_by_key(|&(id, value)| (Reverse(value), id))
            .collect()
    }

    fn is_island_reachable(&mut self, id: IslandId) -> bool {
        match self.islands.get(id).and_then(|island| island.anchor()) {
            Some(anchor) => self.walkable.is_reachable(self.position, anchor),
            None => false,
        }
    }

    fn evaluate_mode(&mut self) -> Mode {
        let ranked = self.ranked_islands();
        let (best, best_value) = match ranked.first() {
            Some(&entry) => entry,
            None => {
                debug!("No islands left");
                return Mode::DryMax;
            }
        };
        trace!("Island ranking: {:?}", ranked);

        if self.islands.owner_of(self.position) == Some(best) {
            debug!("Standing on best island {} (value {})", best, best_value);
            return Mode::Farming;
        }

        if ranked.iter().any(|&(id, _)| self.is_island_reachable(id)) {
            Mode::Moving
        } else {
            Mode::DryMax
        }
    }

    fn stay(&mut self) {
        self.actions.push(Action::STAY);
    }

    fn go(&mut self, next: Location) {
        let direction = self.position.direction_to(next);
        if direction == Direction::Current {
            self.stay();
            return;
        }
        trace!("GO {} to {}", direction, next);
        self.actions.push(Action::Go(direction));
        self.position = next;
    }

    fn dry(&mut self, direction: Direction, location: Location) -> Result<(), GridError> {
        trace!("DRY {} at {}", direction, location);
        self.grid.dry(location)?;
        self.walkable.set_state(location, TileState::Redried)?;
        self.islands.set_state(location, TileState::Redried)?;
        self.actions.push(Action::Dry(direction));
        Ok(())
    }

    /// Dry the tile underneath, else the first flooded neighbour in
    /// North, East, South, West order.
    fn dry_one_if_possible(&mut self) -> Result<bool, GridError> {
        let current = match self.walkable.node_id(self.position) {
            Some(id) => id,
            None => return Ok(false),
        };

        if self.walkable.node(current).map(|n| n.state()) == Some(TileState::Flooded) {
            self.dry(Direction::Current, self.position)?;
            return Ok(true);
        }

        let target = self
            .walkable
            .neighbors_with_direction(current)
            .find(|&(_, n)| self.walkable.node(n).map(|n| n.state()) == Some(TileState::Flooded))
            .map(|(direction, n)| (direction, self.walkable.location_of(n)));

        match target {
            Some((direction, location)) => {
                self.dry(direction, location)?;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Next step toward the flooded cluster with the best
    /// `value - penalty * distance`, measured to its nearest tile. Ties go to
    /// the earlier cluster and, within a cluster, to the first tile in
    /// row-major order.
    fn step_towards_flooded_cluster(&mut self) -> Option<Location> {
        let flooded = TerrainGraph::from_graph(&self.walkable, StateMask::FLOODED);
        if flooded.is_empty() {
            return None;
        }
        let distances = flood_fill_distance(&self.walkable, &[self.position]);

        let mut best: Option<(i64, Location)> = None;
        for cluster in connected_components(&flooded) {
            let nearest = cluster
                .iter()
                .filter_map(|&id| {
                    let location = flooded.location_of(id);
                    distances.at(location).map(|d| (d, location))
                })
                .min_by_key(|&(d, location)| (d, location.y(), location.x()));
            let (distance, target) = match nearest {
                Some(entry) => entry,
                None => continue,
            };

            let value =
                TerrainGraph::restrict(&flooded, cluster).island_value(&self.config.weights);
            let score = value as i64 - self.config.cluster_distance_penalty * distance as i64;
            trace!(
                "Cluster near {}: value {}, distance {}, score {}",
                target,
                value,
                distance,
                score
            );
            if best.map_or(true, |(best_score, _)| score > best_score) {
                best = Some((score, target));
            }
        }

        let (_, target) = best?;
        self.walkable
            .next_node_on_path_to(self.position, target)
            .filter(|next| *next != self.position)
    }

    /// Neighbour with the smallest distance to a flooded tile, if any
    /// flooded tile is reachable at all.
    fn step_towards_flood(&mut self) -> Option<Location> {
        self.walkable.calculate_distance_to_flooded();
        let current = self.walkable.node_id(self.position)?;
        self.walkable
            .neighbors(current)
            .filter_map(|n| {
                self.walkable
                    .node(n)
                    .and_then(|node| node.distance_to_flooded())
                    .map(|d| (n, d))
            })
            .min_by_key(|&(_, d)| d)
            .map(|(n, _)| self.walkable.location_of(n))
    }

    /// Middle of the most valuable island reachable from the bot.
    fn find_target(&mut self) -> Option<Location> {
        for (id, value) in self.ranked_islands() {
            if self.is_island_reachable(id) {
                let middle = self.islands.get_mut(id)?.graph_mut().get_middle();
                trace!("Target island {} (value {}), middle {:?}", id, value, middle);
                return middle;
            }
        }
        None
    }

    fn farm(&mut self) -> Result<(), GridError> {
        while self.remaining() {
            if self.dry_one_if_possible()? {
                continue;
            }
            match self.step_towards_flooded_cluster() {
                Some(next) => self.go(next),
                None => self.stay(),
            }
        }
        Ok(())
    }

    fn travel(&mut self) -> Result<(), GridError> {
        while self.remaining() {
            if self.dry_one_if_possible()? {
                continue;
            }
            let next = match self.find_target() {
                Some(target) if target != self.position => {
                    self.walkable.next_node_on_path_to(self.position, target)
                }
                _ => self.step_towards_flood(),
            };
            match next {
                Some(next) => self.go(next),
                None => self.stay(),
            }
        }
        Ok(())
    }

    fn dry_max(&mut self) -> Result<(), GridError> {
        while self.remaining() && self.dry_one_if_possible()? {}
        while self.remaining() {
            match self.step_towards_flood() {
                Some(next) => self.go(next),
                None => self.stay(),
            }
        }
        Ok(())
    }
}

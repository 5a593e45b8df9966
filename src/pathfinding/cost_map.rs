//! Per-side cost maps
//!
//! For every hex, the summed cost for a side's units to get there and how many
//! of them can. The average tells how quickly the side can bring force to a
//! hex; comparing two sides' averages finds the contested border.

use crate::board::GameBoard;
use crate::core::types::SideId;
use crate::map::Location;
use crate::pathfinding::astar::NO_PATH_VALUE;
use crate::pathfinding::calculator::MoveCostCalculator;
use crate::pathfinding::flood::{flood, ReachMap};
use crate::units::{UnitType, UnitTypeRegistry};

/// Average cost of a hex nobody can reach. Zero is a valid cost.
pub const UNREACHABLE: f64 = -1.0;

/// Below this many mobile units, recruitable types are flooded from the leaders
pub const PHANTOM_UNIT_THRESHOLD: usize = 5;

#[derive(Debug, Clone, Copy, Default, PartialEq)]
struct CostCell {
    sum: f64,
    count: u32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CostMap {
    width: u32,
    height: u32,
    cells: Vec<CostCell>,
}

impl CostMap {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            cells: vec![CostCell::default(); (width * height) as usize],
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    fn index(&self, loc: Location) -> Option<usize> {
        if loc.x < 0 || loc.y < 0 || loc.x as u32 >= self.width || loc.y as u32 >= self.height {
            return None;
        }
        Some(loc.y as usize * self.width as usize + loc.x as usize)
    }

    /// Record one unit reaching `loc` at `cost`
    pub fn add(&mut self, loc: Location, cost: f64) {
        if let Some(i) = self.index(loc) {
            self.cells[i].sum += cost;
            self.cells[i].count += 1;
        }
    }

    /// Fold one unit's reachability into the map
    pub fn add_reach(&mut self, reach: &ReachMap) {
        for (loc, cost) in reach.reached() {
            self.add(loc, cost);
        }
    }

    /// Fold another map of the same size into this one
    pub fn merge(&mut self, other: &CostMap) {
        if other.width != self.width || other.height != self.height {
            tracing::warn!(
                "cost map merge: size {}x{} does not match {}x{}",
                other.width, other.height, self.width, self.height
            );
            return;
        }
        for (cell, theirs) in self.cells.iter_mut().zip(&other.cells) {
            cell.sum += theirs.sum;
            cell.count += theirs.count;
        }
    }

    pub fn cost_sum_at(&self, loc: Location) -> f64 {
        self.index(loc).map(|i| self.cells[i].sum).unwrap_or(0.0)
    }

    pub fn count_at(&self, loc: Location) -> u32 {
        self.index(loc).map(|i| self.cells[i].count).unwrap_or(0)
    }

    /// Mean cost over the units that reach `loc`, or `UNREACHABLE`
    pub fn average_cost_at(&self, loc: Location) -> f64 {
        match self.index(loc).map(|i| self.cells[i]) {
            Some(cell) if cell.count > 0 => cell.sum / cell.count as f64,
            _ => UNREACHABLE,
        }
    }
}

fn flood_type(board: &GameBoard, unit_type: &UnitType, side: SideId, origin: Location) -> ReachMap {
    let calc = MoveCostCalculator::new(board, unit_type, side).ignoring_units();
    let map = board.map();
    flood(&calc, origin, map.width(), map.height(), NO_PATH_VALUE)
}

/// Cost map of every mobile non-leader unit of `side`.
///
/// When the side has fewer than `PHANTOM_UNIT_THRESHOLD` such units, every
/// type its leaders could recruit is flooded from the leader's hex as well.
pub fn build_cost_map(board: &GameBoard, registry: &UnitTypeRegistry, side: SideId) -> CostMap {
    let map = board.map();
    let mut cost_map = CostMap::new(map.width(), map.height());

    let mut unit_count = 0;
    for unit in board.units_of(side).filter(|u| u.is_fighting_unit()) {
        let Some(unit_type) = registry.find(&unit.type_id) else {
            tracing::warn!("cost map: unknown unit type '{}' for {}", unit.type_id, unit.id);
            continue;
        };
        cost_map.add_reach(&flood_type(board, unit_type, side, unit.location));
        unit_count += 1;
    }

    if unit_count < PHANTOM_UNIT_THRESHOLD {
        let team_recruits = board.side(side).map(|s| s.recruits().to_vec()).unwrap_or_default();
        for leader in board.leaders_of(side).filter(|u| !u.incapacitated) {
            for type_id in team_recruits.iter().chain(leader.extra_recruits.iter()) {
                let Some(unit_type) = registry.find(type_id) else {
                    tracing::warn!("cost map: unknown recruit '{}' for {}", type_id, side);
                    continue;
                };
                cost_map.add_reach(&flood_type(board, unit_type, side, leader.location));
            }
        }
    }

    tracing::debug!("cost map for {}: {} units, phantoms: {}", side, unit_count, unit_count < PHANTOM_UNIT_THRESHOLD);
    cost_map
}

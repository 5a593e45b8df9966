//! Movement cost calculator for units on a game board

use crate::board::GameBoard;
use crate::core::types::SideId;
use crate::map::Location;
use crate::pathfinding::astar::{CostCalculator, NO_PATH_VALUE};
use crate::units::UnitType;

/// Prices steps with a unit type's terrain movement costs.
///
/// Unless `ignore_units` is set, hexes holding units hostile to `side` are
/// impassable.
pub struct MoveCostCalculator<'a> {
    board: &'a GameBoard,
    unit_type: &'a UnitType,
    side: SideId,
    ignore_units: bool,
}

impl<'a> MoveCostCalculator<'a> {
    pub fn new(board: &'a GameBoard, unit_type: &'a UnitType, side: SideId) -> Self {
        Self {
            board,
            unit_type,
            side,
            ignore_units: false,
        }
    }

    /// Terrain only, as if the map were empty
    pub fn ignoring_units(mut self) -> Self {
        self.ignore_units = true;
        self
    }
}

impl CostCalculator for MoveCostCalculator<'_> {
    fn cost(&self, _from: Location, to: Location, _so_far: f64, _is_dst: bool) -> f64 {
        let Some(terrain) = self.board.map().terrain_at(to) else {
            return NO_PATH_VALUE;
        };
        let Some(cost) = self.unit_type.movement_cost(terrain) else {
            return NO_PATH_VALUE;
        };
        if !self.ignore_units {
            if let Some(occupant) = self.board.unit_at(to) {
                if self.board.is_enemy(self.side, occupant.side) {
                    return NO_PATH_VALUE;
                }
            }
        }
        cost as f64
    }
}

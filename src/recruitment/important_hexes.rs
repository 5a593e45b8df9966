//! Hexes where the next fights are likely to happen
//!
//! Two sources: hexes around own units already in contact with an enemy, and
//! the contested border where both sides arrive at about the same average
//! cost. The terrain mix of these hexes weights unit defenses in the combat
//! analysis.

use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};

use crate::board::GameBoard;
use crate::core::types::SideId;
use crate::map::{Location, Terrain};
use crate::pathfinding::{build_cost_map, CostMap, UNREACHABLE};
use crate::units::UnitTypeRegistry;

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ImportantHexes {
    pub hexes: BTreeSet<Location>,
    /// How many important hexes have each terrain
    pub terrain: BTreeMap<Terrain, u32>,
    pub units_in_combat: u32,
}

fn enemy_in_radius(board: &GameBoard, side: SideId, center: Location, radius: u32) -> bool {
    board
        .units()
        .iter()
        .any(|u| !u.incapacitated && board.is_enemy(side, u.side) && u.location.distance(&center) <= radius)
}

/// Merged cost map of every side hostile to `side`
pub fn enemy_cost_map(board: &GameBoard, registry: &UnitTypeRegistry, side: SideId) -> CostMap {
    let map = board.map();
    let mut merged = CostMap::new(map.width(), map.height());
    for enemy in board.sides().filter(|s| board.is_enemy(side, s.id)) {
        merged.merge(&build_cost_map(board, registry, enemy.id));
    }
    merged
}

/// Battle zones plus the contested border.
///
/// A hex is on the border when both sides reach it and
/// `|own - offensive_shift - enemy| < border_thickness` for the average costs.
pub fn find_important_hexes(
    board: &GameBoard,
    registry: &UnitTypeRegistry,
    side: SideId,
    offensive_shift: f64,
    border_thickness: f64,
) -> ImportantHexes {
    let map = board.map();
    let mut important = ImportantHexes::default();

    for unit in board.units_of(side).filter(|u| !u.incapacitated) {
        if enemy_in_radius(board, side, unit.location, 1) {
            important.units_in_combat += 1;
            important.hexes.extend(
                unit.location
                    .tiles_within_radius(1)
                    .into_iter()
                    .filter(|loc| map.on_board(*loc)),
            );
        }
    }

    let own_costs = build_cost_map(board, registry, side);
    let enemy_costs = enemy_cost_map(board, registry, side);
    for loc in map.locations() {
        let own = own_costs.average_cost_at(loc);
        let enemy = enemy_costs.average_cost_at(loc);
        if own == UNREACHABLE || enemy == UNREACHABLE {
            continue;
        }
        if (own - offensive_shift - enemy).abs() < border_thickness {
            important.hexes.insert(loc);
        }
    }

    for loc in &important.hexes {
        if let Some(terrain) = map.terrain_at(*loc) {
            *important.terrain.entry(terrain).or_insert(0) += 1;
        }
    }

    tracing::debug!(
        "{}: {} important hexes, {} units in combat",
        side,
        important.hexes.len(),
        important.units_in_combat
    );
    important
}

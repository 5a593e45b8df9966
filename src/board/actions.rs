//! Recruit and recall actions
//!
//! Checks and execution return an `ActionOutcome`. Running out of gold or
//! castle space is an ordinary outcome, not an error.

use serde::{Deserialize, Serialize};

use crate::board::game_board::GameBoard;
use crate::core::types::{Gold, UnitId};
use crate::map::Location;
use crate::units::UnitTypeRegistry;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ActionOutcome {
    /// The unit is (or would be) placed at `location`
    Ok { location: Location },
    NoGold,
    NoVacantCastle,
    LeaderNotOnKeep,
    CannotRecruitType,
    UnitNotRecallable,
}

impl ActionOutcome {
    pub fn is_ok(&self) -> bool {
        matches!(self, ActionOutcome::Ok { .. })
    }

    pub fn location(&self) -> Option<Location> {
        match self {
            ActionOutcome::Ok { location } => Some(*location),
            _ => None,
        }
    }
}

/// Validates and performs recruits and recalls on behalf of a leader
pub trait ActionExecutor {
    fn check_recruit(&self, board: &GameBoard, leader: UnitId, type_id: &str) -> ActionOutcome;

    fn check_recall(&self, board: &GameBoard, leader: UnitId, unit: UnitId) -> ActionOutcome;

    fn execute_recruit(&mut self, board: &mut GameBoard, leader: UnitId, type_id: &str) -> ActionOutcome;

    fn execute_recall(&mut self, board: &mut GameBoard, leader: UnitId, unit: UnitId) -> ActionOutcome;
}

/// Applies actions directly to a `GameBoard`
#[derive(Debug, Clone, Copy)]
pub struct BoardActions<'a> {
    registry: &'a UnitTypeRegistry,
}

impl<'a> BoardActions<'a> {
    pub fn new(registry: &'a UnitTypeRegistry) -> Self {
        Self { registry }
    }

    /// Gold, keep and castle checks shared by recruits and recalls
    fn check_placement(&self, board: &GameBoard, leader: UnitId, price: Gold) -> ActionOutcome {
        let Some(leader) = board.unit(leader) else {
            return ActionOutcome::LeaderNotOnKeep;
        };
        let gold = board.side(leader.side).map(|s| s.gold).unwrap_or(0);
        if price > gold {
            return ActionOutcome::NoGold;
        }
        if !board.map().is_keep(leader.location) {
            return ActionOutcome::LeaderNotOnKeep;
        }
        match board.find_vacant_castle(leader.location) {
            Some(location) => ActionOutcome::Ok { location },
            None => ActionOutcome::NoVacantCastle,
        }
    }
}

impl ActionExecutor for BoardActions<'_> {
    fn check_recruit(&self, board: &GameBoard, leader: UnitId, type_id: &str) -> ActionOutcome {
        let Some(leader_unit) = board.unit(leader).filter(|u| u.can_recruit) else {
            return ActionOutcome::LeaderNotOnKeep;
        };
        let on_list = board
            .side(leader_unit.side)
            .is_some_and(|s| s.recruits().iter().any(|r| r == type_id))
            || leader_unit.extra_recruits.iter().any(|r| r == type_id);
        let Some(unit_type) = self.registry.find(type_id).filter(|_| on_list) else {
            return ActionOutcome::CannotRecruitType;
        };
        self.check_placement(board, leader, unit_type.cost)
    }

    fn check_recall(&self, board: &GameBoard, leader: UnitId, unit: UnitId) -> ActionOutcome {
        let Some(leader_unit) = board.unit(leader).filter(|u| u.can_recruit) else {
            return ActionOutcome::LeaderNotOnKeep;
        };
        let Some(side) = board.side(leader_unit.side) else {
            return ActionOutcome::UnitNotRecallable;
        };
        let allowed = side
            .recall_list
            .iter()
            .find(|u| u.id == unit)
            .is_some_and(|u| leader_unit.can_recall(u));
        if !allowed {
            return ActionOutcome::UnitNotRecallable;
        }
        self.check_placement(board, leader, side.recall_cost)
    }

    fn execute_recruit(&mut self, board: &mut GameBoard, leader: UnitId, type_id: &str) -> ActionOutcome {
        let outcome = self.check_recruit(board, leader, type_id);
        let ActionOutcome::Ok { location } = outcome else {
            tracing::debug!("recruit of {} by {} refused: {:?}", type_id, leader, outcome);
            return outcome;
        };
        let (Some(unit_type), Some(side)) = (self.registry.find(type_id), board.unit(leader).map(|u| u.side)) else {
            return ActionOutcome::CannotRecruitType;
        };

        if let Err(e) = board.recruit_unit(unit_type, side, location, unit_type.cost) {
            tracing::error!("recruit of {} failed: {}", type_id, e);
            return ActionOutcome::NoVacantCastle;
        }
        outcome
    }

    fn execute_recall(&mut self, board: &mut GameBoard, leader: UnitId, unit: UnitId) -> ActionOutcome {
        let outcome = self.check_recall(board, leader, unit);
        let ActionOutcome::Ok { location } = outcome else {
            tracing::debug!("recall of {} by {} refused: {:?}", unit, leader, outcome);
            return outcome;
        };
        let Some(side) = board.unit(leader).map(|u| u.side) else {
            return ActionOutcome::LeaderNotOnKeep;
        };
        let price = board.side(side).map(|s| s.recall_cost).unwrap_or(0);

        if let Err(e) = board.recall_unit(side, unit, location, price) {
            tracing::error!("recall of {} failed: {}", unit, e);
            return ActionOutcome::UnitNotRecallable;
        }
        outcome
    }
}

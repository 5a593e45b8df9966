//! Recruitment state machine and the economy figures driving it

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::board::GameBoard;
use crate::core::config::SaveGoldConfig;
use crate::core::types::{Gold, SideId};
use crate::recruitment::constants::{
    BASE_INCOME, NO_ENEMY_RATIO, VILLAGE_INCOME, VILLAGE_SUPPORT,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RecruitmentState {
    #[default]
    Normal,
    SaveGold,
    SpendAllGold,
    LeaderInDanger,
}

impl fmt::Display for RecruitmentState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RecruitmentState::Normal => "NORMAL",
            RecruitmentState::SaveGold => "SAVE_GOLD",
            RecruitmentState::SpendAllGold => "SPEND_ALL_GOLD",
            RecruitmentState::LeaderInDanger => "LEADER_IN_DANGER",
        };
        f.write_str(name)
    }
}

impl RecruitmentState {
    /// States only left at the end of a pass
    pub fn is_sticky(&self) -> bool {
        matches!(self, RecruitmentState::LeaderInDanger | RecruitmentState::SpendAllGold)
    }

    /// One step of the state machine.
    ///
    /// `income` is only consulted when entering SAVE_GOLD; callers that save
    /// on negative income pass any positive value.
    pub fn transition(self, config: &SaveGoldConfig, gold: Gold, ratio: f64, income: impl FnOnce() -> f64) -> Self {
        if self.is_sticky() {
            return self;
        }
        if config.spend_all_gold > 0.0 && gold as f64 >= config.spend_all_gold {
            return RecruitmentState::SpendAllGold;
        }
        match self {
            RecruitmentState::Normal if ratio > config.begin && income() > 0.0 => RecruitmentState::SaveGold,
            RecruitmentState::SaveGold if ratio < config.end => RecruitmentState::Normal,
            state => state,
        }
    }

    /// State after a pass is over
    pub fn end_of_pass(self, ran_out_of_gold: bool) -> Self {
        match self {
            RecruitmentState::LeaderInDanger => RecruitmentState::Normal,
            RecruitmentState::SpendAllGold if ran_out_of_gold => RecruitmentState::SaveGold,
            state => state,
        }
    }
}

/// Strength of `side` and its allies relative to its enemies.
///
/// Each mobile non-leader unit is worth `cost * hp / max_hp`. Returns
/// `min(own / enemy * allied_sides, team / enemy)`, 0 when neither the side
/// nor its team has anything and there are no enemies, and
/// `NO_ENEMY_RATIO` when only the enemies have nothing.
pub fn unit_ratio(board: &GameBoard, side: SideId) -> f64 {
    let mut own = 0.0;
    let mut team = 0.0;
    let mut enemy = 0.0;

    for unit in board.units().iter().filter(|u| u.is_fighting_unit()) {
        let value = unit.cost as f64 * unit.hp_fraction();
        if board.is_enemy(side, unit.side) {
            enemy += value;
        } else {
            team += value;
            if unit.side == side {
                own += value;
            }
        }
    }

    let allies = board.sides().filter(|s| !board.is_enemy(side, s.id)).count() as f64;

    if (own == 0.0 || team == 0.0) && enemy == 0.0 {
        return 0.0;
    }
    if enemy == 0.0 {
        return NO_ENEMY_RATIO;
    }
    let own_ratio = own / enemy * allies;
    let team_ratio = team / enemy;
    own_ratio.min(team_ratio)
}

/// Summed level of the side's non-leader units
pub fn side_upkeep(board: &GameBoard, side: SideId) -> f64 {
    board
        .units_of(side)
        .filter(|u| !u.can_recruit)
        .map(|u| u.level as f64)
        .sum()
}

/// Villages a side can expect to take per turn
pub fn estimated_village_gain(board: &GameBoard) -> f64 {
    let sides = board.side_count().max(1);
    (board.neutral_village_count() / sides) as f64 / 4.0
}

/// Income summed over the next `turns` turns, assuming the side keeps
/// taking its share of neutral villages and recruits nothing.
pub fn estimated_income(board: &GameBoard, side: SideId, turns: u32) -> f64 {
    let villages = board.village_count(side) as f64;
    let village_gain = estimated_village_gain(board);
    let upkeep = side_upkeep(board, side);

    (1..=turns)
        .map(|turn| {
            let owned = villages + village_gain * turn as f64;
            let income = owned * VILLAGE_INCOME;
            let unpaid_upkeep = (upkeep - owned * VILLAGE_SUPPORT).max(0.0);
            BASE_INCOME + income - unpaid_upkeep
        })
        .sum()
}

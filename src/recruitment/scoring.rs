//! Recruit scores: combat analysis, similarity penalty, noise and bonuses

use rand::Rng;
use std::collections::BTreeMap;

use crate::board::GameBoard;
use crate::combat::{CombatContext, CombatEstimator};
use crate::core::types::SideId;
use crate::recruitment::constants::{MIN_DIVERSITY, MORE_BONUS, UNIT_THRESHOLD};
use crate::recruitment::instructions::recruit_matches_type;
use crate::recruitment::leader_data::LeaderRecruitmentData;
use crate::units::UnitTypeRegistry;

/// One enemy the candidates are measured against
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnemyUnit {
    pub type_id: String,
    pub hitpoints: u32,
}

/// The enemy army, one entry per unit.
///
/// When fewer than `UNIT_THRESHOLD` enemy units are on the map, every type
/// the enemies could recruit is added once more at full hitpoints.
pub fn enemy_units(board: &GameBoard, registry: &UnitTypeRegistry, side: SideId) -> Vec<EnemyUnit> {
    let mut enemies: Vec<EnemyUnit> = board
        .units()
        .iter()
        .filter(|unit| board.is_enemy(side, unit.side) && !unit.incapacitated)
        .map(|unit| EnemyUnit {
            type_id: unit.type_id.clone(),
            hitpoints: unit.hitpoints,
        })
        .collect();

    if enemies.len() < UNIT_THRESHOLD {
        for enemy in board.sides().filter(|s| board.is_enemy(side, s.id)) {
            let mut possible: Vec<&String> = enemy.recruits().iter().collect();
            for leader in board.leaders_of(enemy.id) {
                possible.extend(leader.extra_recruits.iter());
            }
            possible.sort();
            possible.dedup();
            for type_id in possible {
                if let Some(unit_type) = registry.find(type_id) {
                    enemies.push(EnemyUnit {
                        type_id: type_id.clone(),
                        hitpoints: unit_type.hitpoints,
                    });
                }
            }
        }
    }
    enemies
}

/// `x^power` with the sign of `x` kept
fn signed_power(x: f64, power: f64) -> f64 {
    x.signum() * x.abs().powf(power)
}

/// Map raw combat scores linearly onto [0, 100].
///
/// The best score maps to 100. Scores at or below
/// `max - diversity * (max - average)` map to 0.
pub fn rescale_scores(raw: &BTreeMap<String, f64>, diversity: f64) -> BTreeMap<String, f64> {
    if raw.is_empty() {
        return BTreeMap::new();
    }
    let max = raw.values().copied().fold(f64::NEG_INFINITY, f64::max);
    let average = raw.values().sum::<f64>() / raw.len() as f64;

    let new_100 = max;
    let diversity = if diversity <= 0.0 { MIN_DIVERSITY } else { diversity };
    let mut new_0 = max - diversity * (max - average);
    if new_100 == new_0 {
        new_0 -= 0.000_001;
    }

    raw.iter()
        .map(|(recruit, score)| {
            let scaled = 100.0 * ((score - new_0) / (new_100 - new_0));
            (recruit.clone(), scaled.max(0.0))
        })
        .collect()
}

/// Raw score of `recruit`: `sum((value * hp)^power)` over the enemy units
fn combat_score(
    recruit: &str,
    enemies: &[EnemyUnit],
    estimator: &mut CombatEstimator,
    registry: &UnitTypeRegistry,
    context: &CombatContext,
    power: f64,
) -> f64 {
    enemies
        .iter()
        .map(|enemy| {
            let value = estimator.compare_unit_types(registry, recruit, &enemy.type_id, context);
            signed_power(value * enemy.hitpoints as f64, power)
        })
        .sum()
}

/// Add combat scores in [0, 100] to every leader's candidates.
///
/// Each candidate is compared with each enemy unit; the result is weighted by
/// that unit's hitpoints and raised to `power` before summing.
pub fn analyze_combat(
    leaders: &mut [LeaderRecruitmentData],
    enemies: &[EnemyUnit],
    estimator: &mut CombatEstimator,
    registry: &UnitTypeRegistry,
    context: &CombatContext,
    power: f64,
    diversity: f64,
) {
    if enemies.is_empty() {
        tracing::debug!("combat analysis: no enemies to compare against");
        return;
    }
    for leader in leaders.iter_mut() {
        let mut raw: BTreeMap<String, f64> = BTreeMap::new();
        for recruit in &leader.recruits {
            let total = combat_score(recruit, enemies, estimator, registry, context, power);
            raw.insert(recruit.clone(), total);
        }
        for (recruit, score) in rescale_scores(&raw, diversity) {
            *leader.scores.entry(recruit).or_insert(0.0) += score;
        }
    }
}

/// How many advancement links each candidate shares with the others
pub fn similarities(scores: &BTreeMap<String, f64>, registry: &UnitTypeRegistry) -> BTreeMap<String, u32> {
    let mut similarity: BTreeMap<String, u32> = BTreeMap::new();
    for recruit in scores.keys() {
        for advanced in registry.advancement_tree(recruit) {
            if scores.contains_key(&advanced) {
                *similarity.entry(recruit.clone()).or_insert(0) += 1;
                *similarity.entry(advanced).or_insert(0) += 1;
            }
        }
    }
    similarity
}

/// Divide each score by `1 + similarity`
pub fn apply_similarity_penalty(leaders: &mut [LeaderRecruitmentData], registry: &UnitTypeRegistry) {
    for leader in leaders.iter_mut() {
        let similarity = similarities(&leader.scores, registry);
        for (recruit, score) in leader.scores.iter_mut() {
            let count = similarity.get(recruit).copied().unwrap_or(0);
            *score /= 1.0 + count as f64;
        }
    }
}

/// Add uniform noise in `[0, randomness]` to every score
pub fn apply_randomness<R: Rng + ?Sized>(leaders: &mut [LeaderRecruitmentData], rng: &mut R, randomness: f64) {
    if randomness <= 0.0 {
        return;
    }
    for leader in leaders.iter_mut() {
        for score in leader.scores.values_mut() {
            *score += rng.gen_range(0.0..=randomness);
        }
    }
}

/// `MORE_BONUS` for each `recruitment_more` entry a candidate matches
pub fn apply_recruitment_more(leaders: &mut [LeaderRecruitmentData], registry: &UnitTypeRegistry, more: &[String]) {
    for pattern in more {
        for leader in leaders.iter_mut() {
            for (recruit, score) in leader.scores.iter_mut() {
                if recruit_matches_type(registry, recruit, pattern) {
                    *score += MORE_BONUS;
                }
            }
        }
    }
}

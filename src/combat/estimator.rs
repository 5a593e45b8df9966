//! Combat value of one unit type against another
//!
//! `compare_unit_types(a, b)` is positive when `a` is the better buy against
//! `b`: 2.0 means a does twice the damage per gold spent. Both directions of
//! attack are simulated with each side choosing its best weapon.

use std::collections::BTreeMap;

use crate::combat::cache::CombatCache;
use crate::combat::simulation::{simulate, BattleOutcome, Combatant};
use crate::core::config::CombatCachePolicy;
use crate::map::Terrain;
use crate::units::{UnitType, UnitTypeRegistry, WeaponSpecial};

/// Value when only one side can deal damage at all
pub const ONE_SIDED_VALUE: f64 = 2.0;

/// Terrain weighting and time of day used for one recruitment pass
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CombatContext {
    /// How often each terrain appears among the important hexes
    pub important_terrain: BTreeMap<Terrain, u32>,
    pub average_lawful_bonus: i32,
}

/// Defense of `unit_type` averaged over the important terrain, 0 if none
pub fn average_defense(unit_type: &UnitType, important_terrain: &BTreeMap<Terrain, u32>) -> f64 {
    let total: u32 = important_terrain.values().sum();
    if total == 0 {
        return 0.0;
    }
    let weighted: f64 = important_terrain
        .iter()
        .map(|(terrain, count)| unit_type.defense_on(*terrain) as f64 * *count as f64)
        .sum();
    weighted / total as f64
}

/// One attack of `attacker` on `defender` with fixed weapons
fn simulate_weapons(
    attacker: &UnitType,
    attacker_weapon: usize,
    defender: &UnitType,
    defender_weapon: Option<usize>,
    attacker_defense: f64,
    defender_defense: f64,
    lawful_bonus: i32,
) -> BattleOutcome {
    let att_weapon = attacker.attacks.get(attacker_weapon);
    let def_weapon = defender_weapon.and_then(|i| defender.attacks.get(i));
    let charge = att_weapon.is_some_and(|w| w.has_special(WeaponSpecial::Charge));

    let att = Combatant::resolve(attacker, att_weapon, defender, defender_defense, true, charge, lawful_bonus);
    let def = Combatant::resolve(defender, def_weapon, attacker, attacker_defense, false, charge, lawful_bonus);
    simulate(&att, &def)
}

/// Expected (damage to attacker, damage to defender) when `attacker` attacks
/// with its best weapon and `defender` answers with its best response.
pub fn simulate_attack(
    attacker: &UnitType,
    defender: &UnitType,
    attacker_defense: f64,
    defender_defense: f64,
    lawful_bonus: i32,
) -> (f64, f64) {
    let mut best_attack: Option<BattleOutcome> = None;

    for (index, weapon) in attacker.attacks.iter().enumerate() {
        let mut best_response: Option<BattleOutcome> = None;
        for (def_index, def_weapon) in defender.attacks.iter().enumerate() {
            if def_weapon.range != weapon.range {
                continue;
            }
            let outcome = simulate_weapons(
                attacker,
                index,
                defender,
                Some(def_index),
                attacker_defense,
                defender_defense,
                lawful_bonus,
            );
            if best_response.map_or(true, |best| outcome.better_for_defender(&best)) {
                best_response = Some(outcome);
            }
        }
        let response = best_response.unwrap_or_else(|| {
            simulate_weapons(attacker, index, defender, None, attacker_defense, defender_defense, lawful_bonus)
        });

        if best_attack.map_or(true, |best| response.better_for_attacker(&best)) {
            best_attack = Some(response);
        }
    }

    match best_attack {
        Some(outcome) => (
            outcome.attacker.average_damage_taken(),
            outcome.defender.average_damage_taken(),
        ),
        None => (0.0, 0.0),
    }
}

/// Combat value estimator with its memo cache
#[derive(Debug, Clone, Default)]
pub struct CombatEstimator {
    cache: CombatCache,
}

impl CombatEstimator {
    pub fn new(policy: CombatCachePolicy) -> Self {
        Self {
            cache: CombatCache::new(policy),
        }
    }

    pub fn cache(&self) -> &CombatCache {
        &self.cache
    }

    pub fn cache_mut(&mut self) -> &mut CombatCache {
        &mut self.cache
    }

    pub fn begin_pass(&mut self) {
        self.cache.begin_pass();
    }

    /// Signed relative value of type `a` against type `b`.
    ///
    /// Unknown types score 0. Values for the one-sided cases (0, +2, -2) are
    /// returned without being cached.
    pub fn compare_unit_types(
        &mut self,
        registry: &UnitTypeRegistry,
        a: &str,
        b: &str,
        context: &CombatContext,
    ) -> f64 {
        let (Some(type_a), Some(type_b)) = (registry.find(a), registry.find(b)) else {
            tracing::warn!("compare_unit_types: unknown unit type in '{}' vs '{}'", a, b);
            return 0.0;
        };

        let defense_a = average_defense(type_a, &context.important_terrain);
        let defense_b = average_defense(type_b, &context.important_terrain);

        if let Some(value) = self.cache.lookup(a, b, defense_a, defense_b) {
            return value;
        }

        let lawful_bonus = context.average_lawful_bonus;
        let mut damage_to_a = 0.0;
        let mut damage_to_b = 0.0;

        let (to_a, to_b) = simulate_attack(type_a, type_b, defense_a, defense_b, lawful_bonus);
        damage_to_a += to_a;
        damage_to_b += to_b;
        let (to_b, to_a) = simulate_attack(type_b, type_a, defense_b, defense_a, lawful_bonus);
        damage_to_a += to_a;
        damage_to_b += to_b;

        if damage_to_a <= 0.0 && damage_to_b <= 0.0 {
            return 0.0;
        }
        if damage_to_b <= 0.0 {
            return -ONE_SIDED_VALUE;
        }
        if damage_to_a <= 0.0 {
            return ONE_SIDED_VALUE;
        }

        let a_cost = type_a.cost.max(1) as f64;
        let b_cost = type_b.cost.max(1) as f64;
        let a_max_hp = type_a.hitpoints.max(1) as f64;
        let b_max_hp = type_b.hitpoints.max(1) as f64;

        let value_of_a = damage_to_b / (b_max_hp * a_cost);
        let value_of_b = damage_to_a / (a_max_hp * b_cost);

        let value = if value_of_a > value_of_b {
            value_of_a / value_of_b
        } else if value_of_a < value_of_b {
            -value_of_b / value_of_a
        } else {
            0.0
        };

        tracing::trace!("combat value {} vs {}: {:.3}", a, b, value);
        self.cache.insert(a, b, defense_a, defense_b, value);
        value
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::units::{Attack, AttackRange, DamageType};

    fn registry() -> UnitTypeRegistry {
        let mut registry = UnitTypeRegistry::new();

        let mut spearman = UnitType::new("Spearman", 14, 36, 5);
        spearman.defense.insert(Terrain::Flat, 40);
        spearman.defense.insert(Terrain::Forest, 50);
        spearman.attacks.push(
            Attack::new("spear", AttackRange::Melee, 7, 3, DamageType::Pierce)
                .with_special(WeaponSpecial::Firststrike),
        );
        spearman.attacks.push(Attack::new("javelin", AttackRange::Ranged, 6, 1, DamageType::Pierce));
        registry.add(spearman);

        let mut grunt = UnitType::new("Grunt", 12, 38, 5);
        grunt.defense.insert(Terrain::Flat, 40);
        grunt.defense.insert(Terrain::Forest, 50);
        grunt.attacks.push(Attack::new("greatsword", AttackRange::Melee, 9, 2, DamageType::Blade));
        registry.add(grunt);

        let mut archer = UnitType::new("Archer", 14, 29, 5);
        archer.attacks.push(Attack::new("bow", AttackRange::Ranged, 6, 3, DamageType::Pierce));
        registry.add(archer);

        let mut tower = UnitType::new("Tower", 10, 40, 0);
        tower.defense.insert(Terrain::Flat, 100);
        registry.add(tower);

        registry.add(UnitType::new("Peasant", 8, 18, 5));
        registry
    }

    fn context() -> CombatContext {
        CombatContext {
            important_terrain: [(Terrain::Flat, 3), (Terrain::Forest, 1)].into_iter().collect(),
            average_lawful_bonus: 0,
        }
    }

    #[test]
    fn test_average_defense_weighting() {
        let registry = registry();
        let spearman = registry.find("Spearman").unwrap();
        assert_eq!(average_defense(spearman, &context().important_terrain), 42.5);
        assert_eq!(average_defense(spearman, &BTreeMap::new()), 0.0);
    }

    #[test]
    fn test_unknown_type_scores_zero() {
        let registry = registry();
        let mut estimator = CombatEstimator::default();
        assert_eq!(estimator.compare_unit_types(&registry, "Spearman", "Dragon", &context()), 0.0);
        assert!(estimator.cache().is_empty());
    }

    #[test]
    fn test_compare_is_antisymmetric() {
        let registry = registry();
        let mut estimator = CombatEstimator::new(CombatCachePolicy::Persistent);
        let ab = estimator.compare_unit_types(&registry, "Spearman", "Grunt", &context());
        let ba = estimator.compare_unit_types(&registry, "Grunt", "Spearman", &context());
        assert_ne!(ab, 0.0);
        assert_eq!(ab, -ba);
        assert!(ab.abs() >= 1.0);
    }

    #[test]
    fn test_one_sided_values_are_not_cached() {
        let registry = registry();
        let mut estimator = CombatEstimator::new(CombatCachePolicy::Persistent);
        // the archer hits the unarmed peasant, nothing hits back
        assert_eq!(estimator.compare_unit_types(&registry, "Archer", "Peasant", &context()), ONE_SIDED_VALUE);
        assert_eq!(estimator.compare_unit_types(&registry, "Peasant", "Archer", &context()), -ONE_SIDED_VALUE);
        // nobody can hurt anybody
        assert_eq!(estimator.compare_unit_types(&registry, "Peasant", "Tower", &context()), 0.0);
        assert!(estimator.cache().is_empty());
    }

    #[test]
    fn test_normal_values_are_cached() {
        let registry = registry();
        let mut estimator = CombatEstimator::new(CombatCachePolicy::Persistent);
        let first = estimator.compare_unit_types(&registry, "Spearman", "Grunt", &context());
        assert_eq!(estimator.cache().len(), 1);
        let second = estimator.compare_unit_types(&registry, "Spearman", "Grunt", &context());
        assert_eq!(first.to_bits(), second.to_bits());
        assert_eq!(estimator.cache().hits(), 1);
    }

    #[test]
    fn test_defender_without_matching_range_takes_damage_for_free() {
        let registry = registry();
        let grunt = registry.find("Grunt").unwrap();
        let archer = registry.find("Archer").unwrap();
        let (to_archer, to_grunt) = simulate_attack(archer, grunt, 0.0, 40.0, 0);
        assert_eq!(to_archer, 0.0);
        // 3 strikes of 6 at 60%
        assert!((to_grunt - 10.8).abs() < 1e-9);
    }

    #[test]
    fn test_attacker_picks_best_weapon() {
        let registry = registry();
        let spearman = registry.find("Spearman").unwrap();
        let archer = registry.find("Archer").unwrap();
        // melee is free against the archer; the javelin would draw the bow
        let (to_spearman, to_archer) = simulate_attack(spearman, archer, 0.0, 0.0, 0);
        assert_eq!(to_spearman, 0.0);
        assert!((to_archer - 21.0).abs() < 1e-9);
    }
}

//! Exact outcome distribution of one attack
//!
//! Both combatants start at full health and trade strikes in turn. The state
//! space (hp of both sides plus slow and poison flags) is small, so every
//! branch is tracked with its probability instead of sampling.

use std::collections::BTreeMap;

use crate::units::{Attack, UnitType, WeaponSpecial};

/// Hitpoints lost to poison before it can be cured
pub const POISON_AMOUNT: f64 = 8.0;

/// Outcomes closer than this are treated as equal
const COMPARE_EPSILON: f64 = 0.01;

/// Scale `base` by `numerator / denominator`, rounding to nearest with ties
/// towards the base value. Any hit deals at least 1.
pub fn round_damage(base: u32, numerator: i64, denominator: i64) -> u32 {
    if base == 0 {
        return 0;
    }
    let rounding = denominator / 2 - if numerator < denominator { 0 } else { 1 };
    let scaled = (base as i64 * numerator.max(0) + rounding) / denominator;
    scaled.max(1) as u32
}

/// One side of a fight with every modifier already applied
#[derive(Debug, Clone, PartialEq)]
pub struct Combatant {
    pub max_hitpoints: u32,
    pub damage: u32,
    /// Damage per strike while slowed
    pub slowed_damage: u32,
    pub strikes: u32,
    /// Percent chance that a strike lands
    pub hit_chance: f64,
    pub poisons: bool,
    pub slows: bool,
    pub drains: bool,
    pub firststrike: bool,
}

impl Combatant {
    /// A side that cannot strike back
    pub fn unarmed(max_hitpoints: u32) -> Self {
        Self {
            max_hitpoints,
            damage: 0,
            slowed_damage: 0,
            strikes: 0,
            hit_chance: 0.0,
            poisons: false,
            slows: false,
            drains: false,
            firststrike: false,
        }
    }

    /// Resolve `unit`'s use of `weapon` against `opponent`.
    ///
    /// `opponent_defense` is the opponent's percent chance to evade.
    /// `charge` doubles damage (it applies to both sides of a charge).
    pub fn resolve(
        unit: &UnitType,
        weapon: Option<&Attack>,
        opponent: &UnitType,
        opponent_defense: f64,
        is_attacker: bool,
        charge: bool,
        lawful_bonus: i32,
    ) -> Self {
        let Some(weapon) = weapon else {
            return Self::unarmed(unit.hitpoints);
        };

        let mut chance = (100.0 - opponent_defense).clamp(0.0, 100.0);
        if weapon.has_special(WeaponSpecial::Magical) {
            chance = 70.0;
        } else if is_attacker && weapon.has_special(WeaponSpecial::Marksman) {
            chance = chance.max(60.0);
        }

        let resistance = opponent.resistance_to(weapon.damage_type) as i64;
        let tod = unit.alignment.damage_bonus(lawful_bonus) as i64;
        let mut numerator = (100 - resistance) * (100 + tod);
        if charge {
            numerator *= 2;
        }

        Self {
            max_hitpoints: unit.hitpoints,
            damage: round_damage(weapon.damage, numerator, 10_000),
            slowed_damage: round_damage(weapon.damage, numerator, 20_000),
            strikes: weapon.strikes,
            hit_chance: chance,
            poisons: weapon.has_special(WeaponSpecial::Poison),
            slows: weapon.has_special(WeaponSpecial::Slow),
            drains: weapon.has_special(WeaponSpecial::Drains),
            firststrike: weapon.has_special(WeaponSpecial::Firststrike),
        }
    }
}

/// Summary of one side after the fight
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CombatantOutcome {
    pub original_hitpoints: u32,
    pub average_hitpoints: f64,
    pub death_chance: f64,
    /// Chance to survive poisoned
    pub poison_chance: f64,
    pub slow_chance: f64,
}

impl CombatantOutcome {
    pub fn average_damage_taken(&self) -> f64 {
        self.original_hitpoints as f64 - self.average_hitpoints
    }
}

/// Is outcome `a` better for "us" than outcome `b`?
///
/// Kill chance difference first, then hp difference counting poison, then the
/// raw damage dealt.
pub fn better_combat(
    us_a: &CombatantOutcome,
    them_a: &CombatantOutcome,
    us_b: &CombatantOutcome,
    them_b: &CombatantOutcome,
) -> bool {
    let a = them_a.death_chance - us_a.death_chance;
    let b = them_b.death_chance - us_b.death_chance;
    if a - b < -COMPARE_EPSILON {
        return false;
    }
    if a - b > COMPARE_EPSILON {
        return true;
    }

    let a = (us_a.average_hitpoints - us_a.poison_chance * POISON_AMOUNT)
        - (them_a.average_hitpoints - them_a.poison_chance * POISON_AMOUNT);
    let b = (us_b.average_hitpoints - us_b.poison_chance * POISON_AMOUNT)
        - (them_b.average_hitpoints - them_b.poison_chance * POISON_AMOUNT);
    if a - b < -COMPARE_EPSILON {
        return false;
    }
    if a - b > COMPARE_EPSILON {
        return true;
    }

    them_a.average_hitpoints < them_b.average_hitpoints
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BattleOutcome {
    pub attacker: CombatantOutcome,
    pub defender: CombatantOutcome,
}

impl BattleOutcome {
    pub fn better_for_attacker(&self, other: &BattleOutcome) -> bool {
        better_combat(&self.attacker, &self.defender, &other.attacker, &other.defender)
    }

    pub fn better_for_defender(&self, other: &BattleOutcome) -> bool {
        better_combat(&self.defender, &self.attacker, &other.defender, &other.attacker)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
struct FightState {
    hitpoints: [u32; 2],
    slowed: [bool; 2],
    poisoned: [bool; 2],
}

/// Full distribution of one attack, both sides starting at full health
pub fn simulate(attacker: &Combatant, defender: &Combatant) -> BattleOutcome {
    let sides = [attacker, defender];
    let mut dist: BTreeMap<FightState, f64> = BTreeMap::new();
    dist.insert(
        FightState {
            hitpoints: [attacker.max_hitpoints, defender.max_hitpoints],
            slowed: [false; 2],
            poisoned: [false; 2],
        },
        1.0,
    );

    let order = if defender.firststrike && !attacker.firststrike {
        [1, 0]
    } else {
        [0, 1]
    };
    let rounds = attacker.strikes.max(defender.strikes);
    for round in 0..rounds {
        for &striker in &order {
            if round < sides[striker].strikes {
                dist = strike(dist, striker, sides[striker], sides[1 - striker]);
            }
        }
    }

    let summarize = |who: usize| {
        let mut outcome = CombatantOutcome {
            original_hitpoints: sides[who].max_hitpoints,
            average_hitpoints: 0.0,
            death_chance: 0.0,
            poison_chance: 0.0,
            slow_chance: 0.0,
        };
        for (state, p) in &dist {
            outcome.average_hitpoints += p * state.hitpoints[who] as f64;
            if state.hitpoints[who] == 0 {
                outcome.death_chance += p;
            } else {
                if state.poisoned[who] {
                    outcome.poison_chance += p;
                }
                if state.slowed[who] {
                    outcome.slow_chance += p;
                }
            }
        }
        outcome
    };

    BattleOutcome {
        attacker: summarize(0),
        defender: summarize(1),
    }
}

fn strike(
    dist: BTreeMap<FightState, f64>,
    striker: usize,
    me: &Combatant,
    them: &Combatant,
) -> BTreeMap<FightState, f64> {
    let victim = 1 - striker;
    let chance = (me.hit_chance / 100.0).clamp(0.0, 1.0);
    let mut next: BTreeMap<FightState, f64> = BTreeMap::new();

    for (state, p) in dist {
        if state.hitpoints[0] == 0 || state.hitpoints[1] == 0 || chance == 0.0 {
            *next.entry(state).or_insert(0.0) += p;
            continue;
        }
        if chance < 1.0 {
            *next.entry(state).or_insert(0.0) += p * (1.0 - chance);
        }

        let damage = if state.slowed[striker] { me.slowed_damage } else { me.damage };
        let mut hit = state;
        let dealt = damage.min(hit.hitpoints[victim]);
        hit.hitpoints[victim] -= dealt;
        if me.drains {
            hit.hitpoints[striker] = (hit.hitpoints[striker] + dealt / 2).min(me.max_hitpoints);
        }
        if hit.hitpoints[victim] > 0 {
            if me.poisons {
                hit.poisoned[victim] = true;
            }
            if me.slows {
                hit.slowed[victim] = true;
            }
        }
        debug_assert!(hit.hitpoints[victim] <= them.max_hitpoints);
        *next.entry(hit).or_insert(0.0) += p * chance;
    }
    next
}

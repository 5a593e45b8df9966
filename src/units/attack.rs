//! Weapons and their specials

use serde::{Deserialize, Serialize};
use std::fmt;

/// Melee attacks can only be answered by melee attacks, ranged by ranged
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum AttackRange {
    #[default]
    Melee,
    Ranged,
}

impl fmt::Display for AttackRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AttackRange::Melee => f.write_str("melee"),
            AttackRange::Ranged => f.write_str("ranged"),
        }
    }
}

/// Damage types; resistances are keyed by these
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum DamageType {
    Blade,
    Pierce,
    Impact,
    Fire,
    Cold,
    Arcane,
}

impl DamageType {
    pub const ALL: [DamageType; 6] = [
        DamageType::Blade,
        DamageType::Pierce,
        DamageType::Impact,
        DamageType::Fire,
        DamageType::Cold,
        DamageType::Arcane,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            DamageType::Blade => "blade",
            DamageType::Pierce => "pierce",
            DamageType::Impact => "impact",
            DamageType::Fire => "fire",
            DamageType::Cold => "cold",
            DamageType::Arcane => "arcane",
        }
    }
}

impl TryFrom<String> for DamageType {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        DamageType::ALL
            .into_iter()
            .find(|t| t.name() == value)
            .ok_or_else(|| format!("unknown damage type '{}'", value))
    }
}

impl From<DamageType> for String {
    fn from(damage_type: DamageType) -> Self {
        damage_type.name().to_string()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WeaponSpecial {
    /// Doubles the damage of both sides when used offensively
    Charge,
    /// Always 70% chance to hit
    Magical,
    /// At least 60% chance to hit when used offensively
    Marksman,
    Poison,
    /// Halves the damage of the slowed unit until the fight ends
    Slow,
    /// Strikes first even when defending
    Firststrike,
    /// Heals for half the damage dealt
    Drains,
}

/// One weapon of a unit type
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Attack {
    pub name: String,
    #[serde(default)]
    pub range: AttackRange,
    pub damage: u32,
    pub strikes: u32,
    pub damage_type: DamageType,
    #[serde(default)]
    pub specials: Vec<WeaponSpecial>,
}

impl Attack {
    pub fn new(name: &str, range: AttackRange, damage: u32, strikes: u32, damage_type: DamageType) -> Self {
        Self {
            name: name.to_string(),
            range,
            damage,
            strikes,
            damage_type,
            specials: Vec::new(),
        }
    }

    pub fn with_special(mut self, special: WeaponSpecial) -> Self {
        if !self.specials.contains(&special) {
            self.specials.push(special);
        }
        self
    }

    pub fn has_special(&self, special: WeaponSpecial) -> bool {
        self.specials.contains(&special)
    }
}

impl fmt::Display for Attack {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}-{} ({})", self.name, self.damage, self.strikes, self.range)
    }
}

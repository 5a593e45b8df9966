//! Unit types, weapons and unit instances

pub mod attack;
pub mod registry;
pub mod unit;
pub mod unit_type;

pub use attack::{Attack, AttackRange, DamageType, WeaponSpecial};
pub use registry::UnitTypeRegistry;
pub use unit::Unit;
pub use unit_type::{matches_type_pattern, Alignment, UnitType, IMPASSABLE};

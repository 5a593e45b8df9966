//! Unit type registry loaded from a TOML roster

use ahash::AHashMap;
use serde::Deserialize;
use std::collections::BTreeSet;
use std::path::Path;

use crate::core::error::{RecruitError, Result};
use crate::units::unit_type::UnitType;

/// All known unit types, by id
#[derive(Debug, Clone, Default)]
pub struct UnitTypeRegistry {
    types: AHashMap<String, UnitType>,
}

/// TOML representation of a roster file
#[derive(Debug, Deserialize)]
struct TomlRoster {
    #[serde(default)]
    unit_type: Vec<UnitType>,
}

impl UnitTypeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace a unit type
    pub fn add(&mut self, unit_type: UnitType) {
        self.types.insert(unit_type.id.clone(), unit_type);
    }

    pub fn find(&self, id: &str) -> Option<&UnitType> {
        self.types.get(id)
    }

    /// Like `find`, for callers that treat a missing type as an error
    pub fn get(&self, id: &str) -> Result<&UnitType> {
        self.find(id)
            .ok_or_else(|| RecruitError::UnknownUnitType(id.to_string()))
    }

    pub fn contains(&self, id: &str) -> bool {
        self.types.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    /// Type ids in sorted order
    pub fn ids(&self) -> Vec<&str> {
        let mut ids: Vec<&str> = self.types.keys().map(String::as_str).collect();
        ids.sort_unstable();
        ids
    }

    /// Every type reachable from `id` by one or more advancements
    pub fn advancement_tree(&self, id: &str) -> BTreeSet<String> {
        let mut tree = BTreeSet::new();
        let mut stack: Vec<&str> = vec![id];
        while let Some(current) = stack.pop() {
            let Some(unit_type) = self.find(current) else {
                continue;
            };
            for next in &unit_type.advances_to {
                if tree.insert(next.clone()) {
                    stack.push(next);
                }
            }
        }
        tree.remove(id);
        tree
    }

    /// Load a roster from a TOML file
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_toml_str(&contents)
    }

    /// Parse a roster of `[[unit_type]]` tables
    pub fn from_toml_str(contents: &str) -> Result<Self> {
        let roster: TomlRoster = toml::from_str(contents)?;

        let mut registry = Self::new();
        for unit_type in roster.unit_type {
            if unit_type.id.is_empty() {
                return Err(RecruitError::InvalidConfig("unit type without an id".into()));
            }
            if unit_type.hitpoints == 0 {
                return Err(RecruitError::InvalidConfig(format!(
                    "unit type '{}' has no hitpoints",
                    unit_type.id
                )));
            }
            if registry.contains(&unit_type.id) {
                return Err(RecruitError::InvalidConfig(format!(
                    "unit type '{}' defined twice",
                    unit_type.id
                )));
            }
            registry.add(unit_type);
        }

        for id in registry.ids() {
            if let Some(unit_type) = registry.find(id) {
                for target in &unit_type.advances_to {
                    if !registry.contains(target) {
                        tracing::warn!("unit type '{}' advances to unknown type '{}'", id, target);
                    }
                }
            }
        }

        tracing::debug!("loaded {} unit types", registry.len());
        Ok(registry)
    }
}

use thiserror::Error;

use crate::core::types::{SideId, UnitId};
use crate::map::Location;

#[derive(Error, Debug)]
pub enum RecruitError {
    #[error("Unknown unit type: {0}")]
    UnknownUnitType(String),

    #[error("Unknown side: {0}")]
    UnknownSide(SideId),

    #[error("Unit not found: {0}")]
    UnitNotFound(UnitId),

    #[error("Location {0} is off the map")]
    InvalidLocation(Location),

    #[error("Location {0} is already occupied")]
    Occupied(Location),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Invalid internal state: {0}")]
    InvalidState(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error("Serialization error: {0}")]
    SerdeError(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, RecruitError>;

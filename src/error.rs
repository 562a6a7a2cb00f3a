use thiserror::Error;

use crate::construct::{ColourId, PartId, ShapeId};

#[derive(Error, Debug)]
pub enum BrickError {
    #[error("Config error: {0}")]
    Config(String),
    #[error("Persistence error: {0}")]
    Persistence(String),
    #[error("Lock poisoned: {0}")]
    Lock(String),
    #[error("Unknown part: {0}")]
    UnknownPart(PartId),
    #[error("Unknown colour: {0}")]
    UnknownColour(ColourId),
    #[error("Unknown shape: {0}")]
    UnknownShape(ShapeId),
    #[error("Import error: {0}")]
    Import(String),
    #[error("Server error: {0}")]
    Server(String),
}

pub type Result<T> = std::result::Result<T, BrickError>;

// Helper conversions
impl From<rusqlite::Error> for BrickError {
    fn from(e: rusqlite::Error) -> Self { Self::Persistence(e.to_string()) }
}
impl From<serde_json::Error> for BrickError {
    fn from(e: serde_json::Error) -> Self { Self::Import(e.to_string()) }
}
impl From<std::io::Error> for BrickError {
    fn from(e: std::io::Error) -> Self { Self::Import(e.to_string()) }
}
impl From<::config::ConfigError> for BrickError {
    fn from(e: ::config::ConfigError) -> Self { Self::Config(e.to_string()) }
}
impl<T> From<std::sync::PoisonError<T>> for BrickError {
    fn from(e: std::sync::PoisonError<T>) -> Self { Self::Lock(e.to_string()) }
}

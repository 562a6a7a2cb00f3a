use std::path::Path;

use ::config::{Config, Environment, File};
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::persist::PersistenceMode;

pub const DEFAULT_DATABASE: &str = ":memory:";
pub const DEFAULT_BIND: &str = "127.0.0.1:8000";
pub const DEFAULT_LOG_FILTER: &str = "info";

/// Runtime settings, layered as defaults, then `brickstore.toml` (or the
/// file given explicitly), then `BRICKSTORE_*` environment variables.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    pub database: String,
    pub bind: String,
    pub log_filter: String,
}

impl Settings {
    pub fn load(file: Option<&Path>) -> Result<Self> {
        let builder = Config::builder()
            .set_default("database", DEFAULT_DATABASE)?
            .set_default("bind", DEFAULT_BIND)?
            .set_default("log_filter", DEFAULT_LOG_FILTER)?;
        let builder = match file {
            Some(path) => builder.add_source(File::from(path).required(true)),
            None => builder.add_source(File::with_name("brickstore").required(false)),
        };
        let settings = builder
            .add_source(Environment::with_prefix("BRICKSTORE"))
            .build()?
            .try_deserialize()?;
        Ok(settings)
    }

    pub fn persistence_mode(&self) -> PersistenceMode {
        PersistenceMode::from_location(&self.database)
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            database: DEFAULT_DATABASE.to_owned(),
            bind: DEFAULT_BIND.to_owned(),
            log_filter: DEFAULT_LOG_FILTER.to_owned(),
        }
    }
}

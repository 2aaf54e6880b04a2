use std::path::Path;

use ::config::{Config, Environment, File};
use serde::Deserialize;

use crate::adapter::DEFAULT_DISCRIMINATOR;
use crate::datatype::{DEFAULT_LANGUAGE, is_language_tag};
use crate::error::{ActivityError, Result};

/// Prefix of the environment variables that override file settings,
/// e.g. `ACTIVITY_JSON_PRETTY=true`.
pub const ENV_PREFIX: &str = "ACTIVITY_JSON";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Write indented JSON instead of the compact form.
    pub pretty: bool,
    /// Field naming the type of a top-level document.
    pub discriminator_field: String,
    /// Language tag given to text that arrives without one.
    pub default_language: String,
    /// Absorb lookup failures into simple type values.
    pub silent_resolution: bool,
    /// Let decoding pick up cached type descriptions and prefetch missing ones.
    pub resolve_on_decode: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            pretty: false,
            discriminator_field: String::from(DEFAULT_DISCRIMINATOR),
            default_language: String::from(DEFAULT_LANGUAGE),
            silent_resolution: false,
            resolve_on_decode: true,
        }
    }
}

impl EngineConfig {
    /// Reads settings from an optional file (any format the `config` crate knows)
    /// and then from the environment.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut builder = Config::builder();
        if let Some(path) = path {
            builder = builder.add_source(File::from(path).required(true));
        }
        let settings = builder
            .add_source(Environment::with_prefix(ENV_PREFIX).try_parsing(true))
            .build()?;
        let loaded: EngineConfig = settings.try_deserialize()?;
        loaded.validate()?;
        Ok(loaded)
    }

    pub fn validate(&self) -> Result<()> {
        if self.discriminator_field.is_empty() {
            return Err(ActivityError::Configuration(String::from("the discriminator field cannot be empty")));
        }
        if !is_language_tag(&self.default_language) {
            return Err(ActivityError::Configuration(format!(
                "'{}' is not a language tag",
                self.default_language
            )));
        }
        Ok(())
    }
}

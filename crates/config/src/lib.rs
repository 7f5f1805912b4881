//! Configuration loader for the TSG crates.
//!
//! `defaults/tsg.default.toml` is embedded into the crate so the documented
//! defaults and the runtime ones cannot drift. Callers layer their own files
//! and overrides on top through [`Loader`] before deserializing into
//! [`TsgConfig`].

use config::builder::DefaultState;
use config::{Config, ConfigBuilder, ConfigError, File, FileFormat, ValueKind};
use serde::Deserialize;
use std::path::Path;
use tsg_corpus::{FilterConfig, PatternConfig};
use tsg_prob::ComputerConfig;

const DEFAULT_TOML: &str = include_str!("../defaults/tsg.default.toml");

/// Top-level configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct TsgConfig {
    pub probability: ComputerConfig,
    pub filter: FilterConfig,
    pub patterns: PatternConfig,
}

/// Layers user overrides over the built-in defaults.
#[derive(Debug, Clone)]
pub struct Loader {
    builder: ConfigBuilder<DefaultState>,
}

impl Loader {
    /// Start a loader seeded with the embedded defaults.
    pub fn new() -> Self {
        let defaults = File::from_str(DEFAULT_TOML, FileFormat::Toml);
        let builder = Config::builder().add_source(defaults);
        Self { builder }
    }

    /// Layer a TOML file. A missing file is an error at [`Loader::build`].
    pub fn with_file(mut self, path: impl AsRef<Path>) -> Self {
        let source = File::from(path.as_ref())
            .format(FileFormat::Toml)
            .required(true);
        self.builder = self.builder.add_source(source);
        self
    }

    /// Layer a TOML file if it exists.
    pub fn with_optional_file(mut self, path: impl AsRef<Path>) -> Self {
        let source = File::from(path.as_ref())
            .format(FileFormat::Toml)
            .required(false);
        self.builder = self.builder.add_source(source);
        self
    }

    /// Override one key, e.g. `probability.matching`.
    pub fn set_override<I>(mut self, key: &str, value: I) -> Result<Self, ConfigError>
    where
        I: Into<ValueKind>,
    {
        self.builder = self.builder.set_override(key, value)?;
        Ok(self)
    }

    pub fn build(self) -> Result<TsgConfig, ConfigError> {
        self.builder.build()?.try_deserialize()
    }
}

impl Default for Loader {
    fn default() -> Self {
        Self::new()
    }
}

/// The embedded defaults alone.
pub fn load_defaults() -> Result<TsgConfig, ConfigError> {
    Loader::new().build()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tsg_prob::MatchPolicy;

    #[test]
    fn defaults_match_component_defaults() {
        let config = load_defaults().expect("defaults to deserialize");
        assert_eq!(config.probability, ComputerConfig::default());
        assert_eq!(config.filter, FilterConfig::default());
        assert_eq!(config.patterns, PatternConfig::default());
    }

    #[test]
    fn supports_overrides() {
        let config = Loader::new()
            .set_override("probability.matching", "partial")
            .expect("override to apply")
            .set_override("probability.cfg_fallback", false)
            .expect("override to apply")
            .set_override("filter.count_limit", 5i64)
            .expect("override to apply")
            .build()
            .expect("config to build");
        assert_eq!(config.probability.matching, MatchPolicy::Partial);
        assert!(!config.probability.cfg_fallback);
        assert_eq!(config.filter.count_limit, 5);
        assert_eq!(config.patterns.n_previous_nodes, 10);
    }

    #[test]
    fn rejects_unknown_matching_policy() {
        let result = Loader::new()
            .set_override("probability.matching", "fuzzy")
            .expect("override to apply")
            .build();
        assert!(result.is_err());
    }

    #[test]
    fn missing_optional_file_is_ignored() {
        let config = Loader::new()
            .with_optional_file("does/not/exist.toml")
            .build()
            .expect("config to build");
        assert_eq!(config.filter.count_limit, 2);
    }

    #[test]
    fn missing_required_file_fails() {
        let result = Loader::new().with_file("does/not/exist.toml").build();
        assert!(result.is_err());
    }
}

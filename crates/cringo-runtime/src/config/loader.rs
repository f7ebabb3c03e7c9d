//! Configuration loader using figment.
//!
//! - **Multiple sources**: TOML/YAML files, environment variables, programmatic defaults
//! - **Layered configuration**: later sources override earlier ones
//! - **Profile support**: `cringo.{profile}.toml` next to the main file
//!
//! # Feature Flags
//!
//! - `toml-config`: enables TOML configuration files (`cringo.toml`, `config.toml`)
//! - `yaml-config`: enables YAML configuration files (`cringo.yaml`, `cringo.yml`, etc.)
//!
//! # Configuration Priority (lowest to highest)
//!
//! 1. Built-in defaults
//! 2. Profile-specific config file (`cringo.{profile}.toml` / `cringo.{profile}.yaml`)
//! 3. Main config file (`cringo.toml` / `cringo.yaml`)
//! 4. Environment variables (`CRINGO_*`)
//! 5. Programmatic configuration passed to [`ConfigLoader::merge`]
//!
//! # Environment Variable Mapping
//!
//! `CRINGO_` prefix, `__` between sections:
//!
//! - `CRINGO_LOGGING__LEVEL=debug` → `logging.level = "debug"`
//! - `CRINGO_GAME__ROUND_SECS=20` → `game.round_secs = 20`
//! - `CRINGO_PAYOUT__HOME_VENUE=lobby` → `payout.home_venue = "lobby"`
//!
//! # Example
//!
//! ```rust,ignore
//! use cringo_runtime::config::ConfigLoader;
//!
//! let config = ConfigLoader::new()
//!     .profile("production")
//!     .file("./deploy/cringo.toml")
//!     .load()?;
//! ```

use std::path::{Path, PathBuf};

use figment::Figment;
#[cfg(any(feature = "yaml-config", feature = "toml-config"))]
use figment::providers::Format;
#[cfg(feature = "toml-config")]
use figment::providers::Toml;
#[cfg(feature = "yaml-config")]
use figment::providers::Yaml;
use figment::providers::{Env, Serialized};
use tracing::{debug, info, trace, warn};

use super::error::{ConfigError, ConfigResult};
use super::schema::CringoConfig;
use super::validation::validate_config;

/// Configuration profile for environment-specific settings.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Profile {
    #[default]
    Development,
    Production,
    Custom(String),
}

impl Profile {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Development => "development",
            Self::Production => "production",
            Self::Custom(name) => name,
        }
    }

    /// Reads `CRINGO_PROFILE`, defaulting to [`Profile::Development`].
    pub fn from_env() -> Self {
        std::env::var("CRINGO_PROFILE")
            .map(|p| Self::parse(&p))
            .unwrap_or_default()
    }

    fn parse(name: &str) -> Self {
        match name.to_lowercase().as_str() {
            "production" | "prod" => Self::Production,
            "development" | "dev" => Self::Development,
            other => Self::Custom(other.to_string()),
        }
    }
}

impl std::fmt::Display for Profile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Loads [`CringoConfig`] from every configured source.
pub struct ConfigLoader {
    figment: Figment,
    profile: Profile,
    search_paths: Vec<PathBuf>,
    load_env: bool,
    /// Overrides the search when set.
    config_file: Option<PathBuf>,
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigLoader {
    pub fn new() -> Self {
        Self {
            figment: Figment::new(),
            profile: Profile::from_env(),
            search_paths: Vec::new(),
            load_env: true,
            config_file: None,
        }
    }

    pub fn profile(mut self, profile: impl Into<String>) -> Self {
        self.profile = Profile::parse(&profile.into());
        self
    }

    /// Adds a search path for configuration files.
    ///
    /// Without any, the current directory and the user config directory
    /// (`~/.config/cringo` on Linux) are searched.
    pub fn search_path<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.search_paths.push(path.as_ref().to_path_buf());
        self
    }

    pub fn with_current_dir(self) -> Self {
        if let Ok(cwd) = std::env::current_dir() {
            self.search_path(cwd)
        } else {
            self
        }
    }

    pub fn with_user_config_dir(self) -> Self {
        if let Some(config_dir) = dirs::config_dir() {
            self.search_path(config_dir.join("cringo"))
        } else {
            self
        }
    }

    /// Loads exactly this file instead of searching.
    pub fn file<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.config_file = Some(path.as_ref().to_path_buf());
        self
    }

    /// Enables loading environment variables (default: true).
    pub fn with_env(mut self) -> Self {
        self.load_env = true;
        self
    }

    pub fn without_env(mut self) -> Self {
        self.load_env = false;
        self
    }

    /// Merges configuration programmatically. Overrides files and
    /// environment variables.
    pub fn merge(mut self, config: CringoConfig) -> Self {
        self.figment = self.figment.merge(Serialized::defaults(config));
        self
    }

    /// Loads, extracts and validates the configuration.
    pub fn load(self) -> ConfigResult<CringoConfig> {
        let profile = self.profile.clone();
        let figment = self.build_figment()?;

        let config: CringoConfig = figment.extract()?;
        validate_config(&config)?;

        debug!(
            profile = %profile,
            logging_level = %config.logging.level,
            card_size = config.game.default_card_size,
            "Configuration loaded successfully"
        );

        Ok(config)
    }

    fn build_figment(mut self) -> ConfigResult<Figment> {
        let mut figment = Figment::from(Serialized::defaults(CringoConfig::default()));

        if let Some(path) = &self.config_file {
            if path.exists() {
                info!(path = %path.display(), "Loading configuration file");
                figment = Self::merge_config_file(figment, path)?;
            } else {
                return Err(ConfigError::FileNotFound(path.clone()));
            }
        } else {
            figment = self.load_config_files(figment);
        }

        if self.load_env {
            trace!("Loading environment variables with CRINGO_ prefix");
            figment = figment.merge(Env::prefixed("CRINGO_").split("__"));
        }

        Ok(figment.merge(std::mem::take(&mut self.figment)))
    }

    /// Only extensions enabled via feature flags are accepted.
    fn merge_config_file(figment: Figment, path: &Path) -> ConfigResult<Figment> {
        let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("");
        match ext {
            #[cfg(feature = "toml-config")]
            "toml" => Ok(figment.merge(Toml::file(path))),
            #[cfg(feature = "yaml-config")]
            "yaml" | "yml" => Ok(figment.merge(Yaml::file(path))),
            _ => {
                let _ = figment;
                Err(ConfigError::ParseError(format!(
                    "Unsupported or disabled configuration file format: .{ext}"
                )))
            }
        }
    }

    fn resolve_search_paths(&self) -> Vec<PathBuf> {
        if !self.search_paths.is_empty() {
            return self.search_paths.clone();
        }
        let mut paths = Vec::new();
        if let Ok(cwd) = std::env::current_dir() {
            paths.push(cwd);
        }
        if let Some(config_dir) = dirs::config_dir() {
            paths.push(config_dir.join("cringo"));
        }
        paths
    }

    /// Walks `search_paths × base_names`, merging a profile-specific variant
    /// before its base file. Stops at the first base file found.
    #[cfg(any(feature = "toml-config", feature = "yaml-config"))]
    fn load_format_files<F>(
        &self,
        mut figment: Figment,
        search_paths: &[PathBuf],
        base_names: &[&str],
        merge_fn: F,
    ) -> (Figment, bool)
    where
        F: Fn(Figment, &Path) -> Figment,
    {
        for search_path in search_paths {
            for base_name in base_names {
                let Some((stem, ext)) = base_name.rsplit_once('.') else {
                    continue;
                };

                let profile_path =
                    search_path.join(format!("{stem}.{}.{ext}", self.profile.as_str()));
                if profile_path.exists() {
                    debug!(path = %profile_path.display(), "Loading profile-specific config");
                    figment = merge_fn(figment, &profile_path);
                }

                let base_path = search_path.join(base_name);
                if base_path.exists() {
                    info!(path = %base_path.display(), "Loading configuration file");
                    return (merge_fn(figment, &base_path), true);
                }
            }
        }
        (figment, false)
    }

    #[allow(unused_mut)]
    fn load_config_files(&self, mut figment: Figment) -> Figment {
        let search_paths = self.resolve_search_paths();
        let mut found = false;

        #[cfg(feature = "toml-config")]
        {
            let (f, ok) = self.load_format_files(
                figment,
                &search_paths,
                &["cringo.toml", "config.toml"],
                |fig, path| fig.merge(Toml::file(path)),
            );
            figment = f;
            found |= ok;
        }

        #[cfg(feature = "yaml-config")]
        {
            let (f, ok) = self.load_format_files(
                figment,
                &search_paths,
                &["cringo.yaml", "cringo.yml", "config.yaml", "config.yml"],
                |fig, path| fig.merge(Yaml::file(path)),
            );
            figment = f;
            found |= ok;
        }

        if !found {
            warn!(paths = ?search_paths, "No configuration file found, using defaults");
        }
        figment
    }
}

/// Loads configuration from the default locations.
pub fn load_config() -> ConfigResult<CringoConfig> {
    ConfigLoader::new().load()
}

/// Loads configuration from one file plus `CRINGO_*` environment variables.
pub fn load_config_from_file<P: AsRef<Path>>(path: P) -> ConfigResult<CringoConfig> {
    ConfigLoader::new().file(path).load()
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use figment::Jail;

    use super::*;
    use crate::config::LogLevel;

    #[test]
    fn test_default_config() {
        Jail::expect_with(|jail| {
            let config = ConfigLoader::new()
                .search_path(jail.directory())
                .without_env()
                .load()
                .map_err(|e| e.to_string())?;

            assert_eq!(config.logging.level.as_str(), "info");
            assert_eq!(config.game.command_name, "cringo");
            assert_eq!(config.game.round_secs, 25);
            Ok(())
        });
    }

    #[test]
    fn test_profile_from_env() {
        Jail::expect_with(|jail| {
            jail.set_env("CRINGO_PROFILE", "prod");
            assert_eq!(Profile::from_env(), Profile::Production);

            jail.set_env("CRINGO_PROFILE", "staging");
            assert_eq!(Profile::from_env(), Profile::Custom("staging".to_string()));
            Ok(())
        });
    }

    #[test]
    fn test_env_overrides_sections() {
        Jail::expect_with(|jail| {
            jail.set_env("CRINGO_LOGGING__LEVEL", "debug");
            jail.set_env("CRINGO_GAME__ROUND_SECS", "12");
            jail.set_env("CRINGO_PAYOUT__HOME_VENUE", "home-guild");

            let config = ConfigLoader::new()
                .search_path(jail.directory())
                .load()
                .map_err(|e| e.to_string())?;

            assert_eq!(config.logging.level, LogLevel::Debug);
            assert_eq!(config.game.round_secs, 12);
            assert_eq!(
                config.payout.home_venue.as_ref().map(|v| v.as_str()),
                Some("home-guild")
            );
            Ok(())
        });
    }

    #[test]
    fn test_invalid_values_are_rejected() {
        Jail::expect_with(|jail| {
            jail.set_env("CRINGO_GAME__JOIN_CAPACITY", "25");

            let result = ConfigLoader::new().search_path(jail.directory()).load();
            assert!(matches!(result, Err(ConfigError::ValidationError { .. })));
            Ok(())
        });
    }

    #[test]
    fn test_missing_file() {
        let result = ConfigLoader::new()
            .without_env()
            .file("/nonexistent/cringo.toml")
            .load();
        assert!(matches!(result, Err(ConfigError::FileNotFound(_))));
    }

    #[test]
    fn test_programmatic_overrides_env() {
        Jail::expect_with(|jail| {
            jail.set_env("CRINGO_GAME__ROUND_SECS", "12");

            let mut overrides = CringoConfig::default();
            overrides.game.round_secs = 20;
            let config = ConfigLoader::new()
                .search_path(jail.directory())
                .merge(overrides)
                .load()
                .map_err(|e| e.to_string())?;

            assert_eq!(config.game.round_secs, 20);
            Ok(())
        });
    }

    #[cfg(feature = "toml-config")]
    #[test]
    fn test_file_then_env() {
        Jail::expect_with(|jail| {
            jail.create_file(
                "cringo.toml",
                r#"
                [game]
                command_prefix = "?"
                round_secs = 40

                [payout]
                home_bonus = 1.5
                "#,
            )?;
            jail.set_env("CRINGO_GAME__ROUND_SECS", "15");

            let config = ConfigLoader::new()
                .search_path(jail.directory())
                .load()
                .map_err(|e| e.to_string())?;

            assert_eq!(config.game.command_prefix, "?");
            assert_eq!(config.game.round_secs, 15);
            assert_eq!(config.payout.home_bonus, 1.5);
            Ok(())
        });
    }
}

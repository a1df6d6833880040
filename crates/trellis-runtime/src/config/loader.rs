//! Configuration loader using figment.
//!
//! Supports layered configuration from multiple sources, lowest to highest
//! priority:
//!
//! 1. Built-in defaults
//! 2. Profile-specific config file (`trellis.{profile}.toml`)
//! 3. Main config file (`trellis.toml` / `config.toml`)
//! 4. Environment variables (`TRELLIS_*`)
//! 5. Programmatic overrides
//!
//! # Feature Flags
//!
//! - `toml-config`: enables TOML configuration files
//! - `yaml-config`: enables YAML configuration files
//!
//! # Environment Variable Mapping
//!
//! Variables use the `TRELLIS_` prefix with `__` as section separator:
//! `TRELLIS_LOGGING__LEVEL=debug` maps to `logging.level = "debug"`,
//! `TRELLIS_STORE__MAX_PAGES_PER_SESSION=8` to
//! `store.max_pages_per_session = 8`.

use std::path::{Path, PathBuf};

use figment::Figment;
#[cfg(any(feature = "toml-config", feature = "yaml-config"))]
use figment::providers::Format;
#[cfg(feature = "toml-config")]
use figment::providers::Toml;
#[cfg(feature = "yaml-config")]
use figment::providers::Yaml;
use figment::providers::{Env, Serialized};
use tracing::{debug, info, warn};

use super::error::{ConfigError, ConfigResult};
use super::schema::TrellisConfig;
use super::validation::validate_config;

/// Base names searched for configuration files, in priority order.
#[cfg(feature = "toml-config")]
const TOML_FILES: &[&str] = &["trellis.toml", "config.toml"];
#[cfg(feature = "yaml-config")]
const YAML_FILES: &[&str] = &["trellis.yaml", "trellis.yml"];

/// Configuration loader with figment-based multi-source support.
///
/// # Example
///
/// ```rust,ignore
/// let config = ConfigLoader::new()
///     .file("config/trellis.toml")
///     .profile("production")
///     .load()?;
/// ```
pub struct ConfigLoader {
    overrides: Figment,
    profile: String,
    search_paths: Vec<PathBuf>,
    load_env: bool,
    config_file: Option<PathBuf>,
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigLoader {
    /// Creates a loader with defaults: profile from `TRELLIS_PROFILE` (or
    /// `development`), environment variables enabled, no search paths.
    pub fn new() -> Self {
        Self {
            overrides: Figment::new(),
            profile: std::env::var("TRELLIS_PROFILE")
                .unwrap_or_else(|_| "development".to_string()),
            search_paths: Vec::new(),
            load_env: true,
            config_file: None,
        }
    }

    /// Sets the configuration profile (e.g. `"production"`).
    pub fn profile(mut self, profile: impl Into<String>) -> Self {
        self.profile = profile.into();
        self
    }

    /// Adds a search path for configuration files.
    pub fn search_path<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.search_paths.push(path.as_ref().to_path_buf());
        self
    }

    /// Adds the current directory to the search paths.
    pub fn with_current_dir(self) -> Self {
        match std::env::current_dir() {
            Ok(cwd) => self.search_path(cwd),
            Err(_) => self,
        }
    }

    /// Adds the user configuration directory (`~/.config/trellis`) to the
    /// search paths.
    pub fn with_user_config_dir(self) -> Self {
        match dirs::config_dir() {
            Some(dir) => self.search_path(dir.join("trellis")),
            None => self,
        }
    }

    /// Loads a specific configuration file instead of searching.
    pub fn file<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.config_file = Some(path.as_ref().to_path_buf());
        self
    }

    /// Enables environment variable loading (default).
    pub fn with_env(mut self) -> Self {
        self.load_env = true;
        self
    }

    /// Disables environment variable loading.
    pub fn without_env(mut self) -> Self {
        self.load_env = false;
        self
    }

    /// Merges programmatic overrides on top of all other sources.
    pub fn merge(mut self, config: TrellisConfig) -> Self {
        self.overrides = self.overrides.merge(Serialized::defaults(config));
        self
    }

    /// Loads, validates, and returns the configuration.
    pub fn load(self) -> ConfigResult<TrellisConfig> {
        let profile = self.profile.clone();
        let figment = self.build_figment()?;

        let config: TrellisConfig = figment
            .extract()
            .map_err(|e| ConfigError::ParseError(format!("failed to extract configuration: {e}")))?;

        validate_config(&config)?;

        debug!(
            %profile,
            mount_path = %config.application.mount_path,
            logging_level = %config.logging.level,
            "Configuration loaded"
        );
        Ok(config)
    }

    fn build_figment(self) -> ConfigResult<Figment> {
        let mut figment = Figment::from(Serialized::defaults(TrellisConfig::default()));

        if let Some(path) = &self.config_file {
            if !path.exists() {
                return Err(ConfigError::FileNotFound(path.clone()));
            }
            info!(path = %path.display(), "Loading configuration file");
            figment = Self::merge_file(figment, path)?;
        } else {
            figment = self.search_files(figment);
        }

        if self.load_env {
            figment = figment.merge(
                Env::prefixed("TRELLIS_")
                    .split("__")
                    .map(|key| key.as_str().replace("__", ".").into()),
            );
        }

        Ok(figment.merge(self.overrides))
    }

    /// Merges a single config file, dispatching on extension. Only formats
    /// enabled via feature flags are accepted.
    fn merge_file(figment: Figment, path: &Path) -> ConfigResult<Figment> {
        let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("");
        match ext {
            #[cfg(feature = "toml-config")]
            "toml" => Ok(figment.merge(Toml::file(path))),
            #[cfg(feature = "yaml-config")]
            "yaml" | "yml" => Ok(figment.merge(Yaml::file(path))),
            _ => Err(ConfigError::ParseError(format!(
                "unsupported or disabled configuration file format: .{ext}"
            ))),
        }
    }

    /// Searches the configured paths for config files, merging a
    /// profile-specific variant before the base file.
    #[allow(unused_mut, unused_variables)]
    fn search_files(&self, mut figment: Figment) -> Figment {
        let search_paths = if self.search_paths.is_empty() {
            std::env::current_dir().map(|cwd| vec![cwd]).unwrap_or_default()
        } else {
            self.search_paths.clone()
        };

        let mut found = false;

        #[cfg(feature = "toml-config")]
        for dir in &search_paths {
            for base in TOML_FILES {
                let (stem, ext) = base.rsplit_once('.').unwrap_or((base, ""));
                let profile_path = dir.join(format!("{stem}.{}.{ext}", self.profile));
                if profile_path.exists() {
                    debug!(path = %profile_path.display(), "Loading profile-specific config");
                    figment = figment.merge(Toml::file(profile_path));
                }
                let base_path = dir.join(base);
                if base_path.exists() {
                    info!(path = %base_path.display(), "Loading configuration file");
                    figment = figment.merge(Toml::file(base_path));
                    found = true;
                    break;
                }
            }
            if found {
                break;
            }
        }

        #[cfg(feature = "yaml-config")]
        for dir in &search_paths {
            for base in YAML_FILES {
                let base_path = dir.join(base);
                if base_path.exists() {
                    info!(path = %base_path.display(), "Loading configuration file");
                    figment = figment.merge(Yaml::file(base_path));
                    found = true;
                    break;
                }
            }
            if found {
                break;
            }
        }

        if !found {
            warn!("No configuration file found, using defaults");
        }
        figment
    }
}

/// Loads configuration from default locations.
pub fn load_config() -> ConfigResult<TrellisConfig> {
    ConfigLoader::new().with_current_dir().load()
}

/// Loads configuration from a specific file.
pub fn load_config_from_file<P: AsRef<Path>>(path: P) -> ConfigResult<TrellisConfig> {
    ConfigLoader::new().file(path).load()
}

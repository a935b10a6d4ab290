//! Configuration management with layered loading
//!
//! Precedence (lowest to highest):
//! 1. Compiled defaults
//! 2. Global config: `$XDG_CONFIG_HOME/avltree/avltree.toml`
//! 3. Local config: `<dir>/.avltree.toml`
//! 4. Explicit config file (`--config` / `AVLTREE_CONFIG`)
//! 5. Environment variables: `AVLTREE_*` prefix

use std::path::{Path, PathBuf};

use config::{Config, Environment};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use crate::errors::{SettingsError, SettingsResult};
use crate::iter::TraversalOrder;

/// Effective settings for the `avltree` command.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Settings {
    /// Traversal order used when none is given on the command line
    pub order: TraversalOrder,
    /// Printed between keys of a traversal
    pub separator: String,
    /// Node limit for trees built by the CLI, unbounded when absent
    #[serde(skip_serializing_if = "Option::is_none")]
    pub capacity: Option<usize>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            order: TraversalOrder::PreOrder,
            separator: " ".into(),
            capacity: None,
        }
    }
}

/// Raw settings for intermediate parsing (`None` means "not specified").
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default, deny_unknown_fields)]
pub struct RawSettings {
    pub order: Option<TraversalOrder>,
    pub separator: Option<String>,
    pub capacity: Option<usize>,
}

/// Get the XDG config directory for avltree.
pub fn global_config_dir() -> Option<PathBuf> {
    ProjectDirs::from("", "", "avltree").map(|dirs| dirs.config_dir().to_path_buf())
}

/// Get the path to the global config file.
pub fn global_config_path() -> Option<PathBuf> {
    global_config_dir().map(|dir| dir.join("avltree.toml"))
}

/// Get the path to the local config file in `dir`.
pub fn local_config_path(dir: &Path) -> PathBuf {
    dir.join(".avltree.toml")
}

/// Load a TOML file into RawSettings for manual merging.
fn load_raw_settings(path: &Path) -> SettingsResult<RawSettings> {
    let content = std::fs::read_to_string(path).map_err(|source| SettingsError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    toml::from_str(&content).map_err(|e| SettingsError::Parse {
        origin: path.display().to_string(),
        message: e.to_string(),
    })
}

fn env_err(e: config::ConfigError) -> SettingsError {
    SettingsError::Parse {
        origin: "environment".into(),
        message: e.to_string(),
    }
}

impl Settings {
    /// Overlay wins where it specifies a value.
    fn merge_with(&self, overlay: &RawSettings) -> Self {
        Self {
            order: overlay.order.unwrap_or(self.order),
            separator: overlay
                .separator
                .clone()
                .unwrap_or_else(|| self.separator.clone()),
            capacity: overlay.capacity.or(self.capacity),
        }
    }

    fn merge_file(self, path: &Path) -> SettingsResult<Self> {
        let raw = load_raw_settings(path)?;
        debug!(path = %path.display(), "merged config file");
        Ok(self.merge_with(&raw))
    }

    /// Load settings with layered precedence.
    ///
    /// # Arguments
    /// * `local_dir` - Optional directory holding a `.avltree.toml`
    /// * `explicit` - Optional config file; must exist when given
    #[instrument(level = "debug")]
    pub fn load(local_dir: Option<&Path>, explicit: Option<&Path>) -> SettingsResult<Self> {
        // 1. Start with defaults
        let mut current = Self::default();

        // 2. Global config
        if let Some(global_path) = global_config_path() {
            if global_path.exists() {
                current = current.merge_file(&global_path)?;
            }
        }

        // 3. Local config, only if present
        if let Some(dir) = local_dir {
            let local_path = local_config_path(dir);
            if local_path.exists() {
                current = current.merge_file(&local_path)?;
            }
        }

        // 4. Explicit file, missing is an error
        if let Some(path) = explicit {
            current = current.merge_file(path)?;
        }

        // 5. Environment variables
        current = Self::apply_env_overrides(current)?;

        current.validate()?;
        Ok(current)
    }

    /// Apply AVLTREE_* environment variables as explicit overrides.
    fn apply_env_overrides(mut settings: Self) -> SettingsResult<Self> {
        let config = Config::builder()
            .add_source(
                Environment::with_prefix("AVLTREE")
                    .prefix_separator("_")
                    .separator("__"),
            )
            .build()
            .map_err(env_err)?;

        if let Ok(val) = config.get_string("order") {
            settings.order = val.parse().map_err(|e: crate::iter::ParseOrderError| {
                SettingsError::Invalid {
                    key: "order".into(),
                    reason: e.to_string(),
                }
            })?;
        }
        if let Ok(val) = config.get_string("separator") {
            settings.separator = val;
        }
        if let Ok(val) = config.get_string("capacity") {
            let capacity = val.trim().parse::<usize>().map_err(|e| SettingsError::Invalid {
                key: "capacity".into(),
                reason: format!("'{}': {}", val, e),
            })?;
            settings.capacity = Some(capacity);
        }

        Ok(settings)
    }

    fn validate(&self) -> SettingsResult<()> {
        if self.capacity == Some(0) {
            return Err(SettingsError::Invalid {
                key: "capacity".into(),
                reason: "must be at least 1".into(),
            });
        }
        Ok(())
    }

    /// Render as TOML, the same shape the config files use.
    pub fn to_toml(&self) -> SettingsResult<String> {
        toml::to_string_pretty(self).map_err(|e| SettingsError::Parse {
            origin: "settings".into(),
            message: e.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn given_defaults_then_preorder_with_space_separator() {
        let settings = Settings::default();
        assert_eq!(settings.order, TraversalOrder::PreOrder);
        assert_eq!(settings.separator, " ");
        assert_eq!(settings.capacity, None);
    }

    #[test]
    fn given_partial_overlay_when_merging_then_unspecified_fields_kept() {
        let base = Settings {
            capacity: Some(8),
            ..Settings::default()
        };
        let overlay = RawSettings {
            order: Some(TraversalOrder::InOrder),
            ..RawSettings::default()
        };
        let merged = base.merge_with(&overlay);
        assert_eq!(merged.order, TraversalOrder::InOrder);
        assert_eq!(merged.separator, " ");
        assert_eq!(merged.capacity, Some(8));
    }

    #[test]
    fn given_zero_capacity_when_validating_then_rejected() {
        let settings = Settings {
            capacity: Some(0),
            ..Settings::default()
        };
        assert!(matches!(
            settings.validate(),
            Err(SettingsError::Invalid { key, .. }) if key == "capacity"
        ));
    }

    #[test]
    fn given_settings_when_rendered_then_parses_back() {
        let settings = Settings {
            order: TraversalOrder::PostOrder,
            separator: ",".into(),
            capacity: Some(3),
        };
        let text = settings.to_toml().unwrap();
        assert!(text.contains("order = \"postorder\""));
        let raw: RawSettings = toml::from_str(&text).unwrap();
        assert_eq!(Settings::default().merge_with(&raw), settings);
    }
}

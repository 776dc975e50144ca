//! Configuration management with layered loading
//!
//! Precedence (lowest to highest):
//! 1. Compiled defaults
//! 2. Global config: `$XDG_CONFIG_HOME/rsutil/rsutil.toml`
//! 3. Local config: `<dir>/.rsutil.toml` (the working directory for the CLI)
//! 4. Environment variables: `RSUTIL_*` prefix, `__` between table and key
//!    (`RSUTIL_TREE__ID_FIELD=key`)

use std::path::{Path, PathBuf};

use config::{Config, ConfigError, Environment};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

use crate::application::ApplicationError;
use crate::domain::builder::{DEFAULT_CHILDREN_FIELD, DEFAULT_ID_FIELD, DEFAULT_PARENT_ID_FIELD};
use crate::domain::TreeFields;
use crate::util::file::DEFAULT_MAX_WIDTH;
use crate::util::time::DEFAULT_DATE_FORMAT;

/// Attribute names used by `data tree` and `data branches`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct TreeConfig {
    pub id_field: String,
    pub parent_id_field: String,
    pub children_field: String,
}

impl Default for TreeConfig {
    fn default() -> Self {
        Self {
            id_field: DEFAULT_ID_FIELD.into(),
            parent_id_field: DEFAULT_PARENT_ID_FIELD.into(),
            children_field: DEFAULT_CHILDREN_FIELD.into(),
        }
    }
}

impl TreeConfig {
    pub fn fields(&self) -> TreeFields {
        TreeFields::new(
            Some(self.id_field.as_str()),
            Some(self.parent_id_field.as_str()),
            Some(self.children_field.as_str()),
        )
    }
}

/// Defaults for `data group`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(default)]
pub struct GroupConfig {
    /// Key attribute used when `--key` is not given
    pub key: Option<String>,
}

/// Defaults for `file compress`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ImageConfig {
    /// Longest side after scaling, in pixels
    pub max_width: u32,
    /// JPEG quality in 0-1; unset picks it from the input size
    pub quality: Option<f32>,
}

impl Default for ImageConfig {
    fn default() -> Self {
        Self {
            max_width: DEFAULT_MAX_WIDTH,
            quality: None,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct RawTreeConfig {
    pub id_field: Option<String>,
    pub parent_id_field: Option<String>,
    pub children_field: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct RawGroupConfig {
    pub key: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct RawImageConfig {
    pub max_width: Option<u32>,
    pub quality: Option<f32>,
}

/// Raw settings for intermediate parsing.
///
/// Every field is optional so a file layer only overrides what it names.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct RawSettings {
    pub date_format: Option<String>,
    pub size_decimals: Option<usize>,
    pub gradient_steps: Option<usize>,
    pub tree: RawTreeConfig,
    pub group: RawGroupConfig,
    pub image: RawImageConfig,
}

/// Unified configuration for rsutil.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Settings {
    /// Output pattern for `time format` (default: `YYYY-MM-DD HH:mm:ss`)
    pub date_format: String,
    /// Decimals for `file size`
    pub size_decimals: usize,
    /// Steps for `color gradient`
    pub gradient_steps: usize,
    pub tree: TreeConfig,
    pub group: GroupConfig,
    pub image: ImageConfig,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            date_format: DEFAULT_DATE_FORMAT.into(),
            size_decimals: 2,
            gradient_steps: 5,
            tree: TreeConfig::default(),
            group: GroupConfig::default(),
            image: ImageConfig::default(),
        }
    }
}

/// Get the XDG config directory for rsutil.
pub fn global_config_dir() -> Option<PathBuf> {
    ProjectDirs::from("", "", "rsutil").map(|dirs| dirs.config_dir().to_path_buf())
}

/// Get the path to the global config file.
pub fn global_config_path() -> Option<PathBuf> {
    global_config_dir().map(|dir| dir.join("rsutil.toml"))
}

/// Get the path to the local config file in `dir`.
pub fn local_config_path(dir: &Path) -> PathBuf {
    dir.join(".rsutil.toml")
}

/// Load a TOML file into RawSettings for manual merging.
fn load_raw_settings(path: &Path) -> Result<RawSettings, ApplicationError> {
    let content = std::fs::read_to_string(path).map_err(|e| ApplicationError::Config {
        message: format!("read {}: {}", path.display(), e),
    })?;
    toml::from_str(&content).map_err(|e| ApplicationError::Config {
        message: format!("parse {}: {}", path.display(), e),
    })
}

impl Settings {
    /// Overlay the fields `raw` names onto self.
    fn merge_with(&self, raw: &RawSettings) -> Self {
        Self {
            date_format: raw
                .date_format
                .clone()
                .unwrap_or_else(|| self.date_format.clone()),
            size_decimals: raw.size_decimals.unwrap_or(self.size_decimals),
            gradient_steps: raw.gradient_steps.unwrap_or(self.gradient_steps),
            tree: TreeConfig {
                id_field: raw
                    .tree
                    .id_field
                    .clone()
                    .unwrap_or_else(|| self.tree.id_field.clone()),
                parent_id_field: raw
                    .tree
                    .parent_id_field
                    .clone()
                    .unwrap_or_else(|| self.tree.parent_id_field.clone()),
                children_field: raw
                    .tree
                    .children_field
                    .clone()
                    .unwrap_or_else(|| self.tree.children_field.clone()),
            },
            group: GroupConfig {
                key: raw.group.key.clone().or_else(|| self.group.key.clone()),
            },
            image: ImageConfig {
                max_width: raw.image.max_width.unwrap_or(self.image.max_width),
                quality: raw.image.quality.or(self.image.quality),
            },
        }
    }

    /// Load settings with layered precedence.
    ///
    /// # Arguments
    /// * `local_dir` - Optional directory holding a `.rsutil.toml`
    ///
    /// # Precedence (lowest to highest)
    /// 1. Compiled defaults
    /// 2. Global config: `$XDG_CONFIG_HOME/rsutil/rsutil.toml`
    /// 3. Local config: `<local_dir>/.rsutil.toml`
    /// 4. Environment variables: `RSUTIL_*` prefix
    pub fn load(local_dir: Option<&Path>) -> Result<Self, ApplicationError> {
        let mut current = Self::default();

        if let Some(global_path) = global_config_path() {
            if global_path.exists() {
                let raw = load_raw_settings(&global_path)?;
                current = current.merge_with(&raw);
            }
        }

        if let Some(dir) = local_dir {
            let local_path = local_config_path(dir);
            if local_path.exists() {
                let raw = load_raw_settings(&local_path)?;
                current = current.merge_with(&raw);
            }
        }

        current = Self::apply_env_overrides(current)?;
        current.validate()?;

        Ok(current)
    }

    /// Apply RSUTIL_* environment variables as explicit overrides.
    fn apply_env_overrides(settings: Self) -> Result<Self, ApplicationError> {
        let config = Config::builder()
            .add_source(
                Environment::with_prefix("RSUTIL")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .map_err(config_err)?;

        // Deserializing into the raw form keeps unset keys as None
        let raw: RawSettings = config.try_deserialize().map_err(config_err)?;
        Ok(settings.merge_with(&raw))
    }

    fn validate(&self) -> Result<(), ApplicationError> {
        if let Some(quality) = self.image.quality {
            if !(0.0..=1.0).contains(&quality) {
                return Err(ApplicationError::Config {
                    message: format!("image.quality must be within 0-1, got {quality}"),
                });
            }
        }
        if self.image.max_width == 0 {
            return Err(ApplicationError::Config {
                message: "image.max_width must be positive".into(),
            });
        }
        Ok(())
    }

    /// Show the effective configuration as TOML.
    pub fn to_toml(&self) -> Result<String, ApplicationError> {
        toml::to_string_pretty(self).map_err(|e| ApplicationError::Config {
            message: format!("serialize config: {e}"),
        })
    }

    /// Generate a template config file.
    pub fn template() -> String {
        r#"# rsutil configuration
#
# Locations (by precedence, lowest to highest):
#   Global: ~/.config/rsutil/rsutil.toml
#   Local:  ./.rsutil.toml
#   Env:    RSUTIL_* environment variables, e.g. RSUTIL_TREE__ID_FIELD=key

# Output pattern for `rsutil time format`
# date_format = "YYYY-MM-DD HH:mm:ss"

# Decimals for `rsutil file size`
# size_decimals = 2

# Steps for `rsutil color gradient`
# gradient_steps = 5

[tree]
# id_field = "id"
# parent_id_field = "parentId"
# children_field = "children"

[group]
# key = "category"

[image]
# max_width = 1000
# quality = 0.8
"#
        .to_string()
    }
}

fn config_err(e: ConfigError) -> ApplicationError {
    ApplicationError::Config {
        message: e.to_string(),
    }
}

//! Companion CLI configuration for a model
//!
//! A [`CliConfig`] sits next to a model's schema rather than inside it, so the
//! model's business fields stay free of CLI concerns. Values are layered with
//! figment in this order (later wins):
//!
//! 1. Built-in defaults ([`CliConfig::default`])
//! 2. The values declared by the model (`CliModel::cli_config`)
//! 3. The environment variable named by `json_config_env_var`, which sets
//!    `json_config_path`
//! 4. An explicit `--<json_key>` flag, merged in by override resolution

use crate::error::ConfigurationError;
use figment::{
    providers::{Env, Serialized},
    Figment,
};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::trace;

pub const DEFAULT_JSON_KEY: &str = "json-config";
pub const DEFAULT_JSON_CONFIG_ENV_VAR: &str = "PCLI_JSON_CONFIG";
pub const DEFAULT_SHELL_COMPLETION_FLAG: &str = "--emit-completion";
pub const DEFAULT_ENABLE_PREFIX: &str = "enable-";
pub const DEFAULT_DISABLE_PREFIX: &str = "disable-";

/// CLI knobs attached to a model
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CliConfig {
    /// Long flag name (without dashes) of the JSON config file option
    pub json_key: String,
    pub json_enable: bool,
    /// Environment variable that may point at the JSON config file
    pub json_config_env_var: String,
    pub json_config_path: Option<PathBuf>,
    /// Fail instead of warning when the JSON config file does not exist
    pub json_validate_path: bool,
    pub shell_completion_enable: bool,
    pub shell_completion_flag: String,
    /// Prefixes used to synthesize `--enable-x` / `--disable-x` boolean flags
    pub bool_prefix: (String, String),
    /// Custom flag tokens per field, e.g. `"hdf_file" => ["-f", "--hdf5"]`
    pub flags: IndexMap<String, Vec<String>>,
}

impl Default for CliConfig {
    fn default() -> Self {
        Self {
            json_key: DEFAULT_JSON_KEY.to_string(),
            json_enable: false,
            json_config_env_var: DEFAULT_JSON_CONFIG_ENV_VAR.to_string(),
            json_config_path: None,
            json_validate_path: true,
            shell_completion_enable: false,
            shell_completion_flag: DEFAULT_SHELL_COMPLETION_FLAG.to_string(),
            bool_prefix: (
                DEFAULT_ENABLE_PREFIX.to_string(),
                DEFAULT_DISABLE_PREFIX.to_string(),
            ),
            flags: IndexMap::new(),
        }
    }
}

impl CliConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Enable the JSON config file flag
    pub fn json_enable(mut self, enable: bool) -> Self {
        self.json_enable = enable;
        self
    }

    pub fn json_key(mut self, key: impl Into<String>) -> Self {
        self.json_key = key.into();
        self
    }

    pub fn json_config_env_var(mut self, name: impl Into<String>) -> Self {
        self.json_config_env_var = name.into();
        self
    }

    pub fn json_config_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.json_config_path = Some(path.into());
        self
    }

    pub fn json_validate_path(mut self, validate: bool) -> Self {
        self.json_validate_path = validate;
        self
    }

    pub fn shell_completion(mut self, enable: bool) -> Self {
        self.shell_completion_enable = enable;
        self
    }

    pub fn shell_completion_flag(mut self, flag: impl Into<String>) -> Self {
        self.shell_completion_flag = flag.into();
        self
    }

    pub fn bool_prefix(mut self, enable: impl Into<String>, disable: impl Into<String>) -> Self {
        self.bool_prefix = (enable.into(), disable.into());
        self
    }

    /// Declare custom flag tokens for a field
    pub fn flag<I, S>(mut self, field: impl Into<String>, tokens: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.flags
            .insert(field.into(), tokens.into_iter().map(Into::into).collect());
        self
    }

    /// Custom flag tokens declared for `field`, if any
    pub fn flags_for(&self, field: &str) -> Option<&[String]> {
        self.flags.get(field).map(Vec::as_slice)
    }

    /// Figment holding every layer up to (and including) the environment
    ///
    /// Callers holding an explicit JSON config path merge it on top before
    /// extracting.
    pub fn figment(&self) -> Figment {
        let env_var = self.json_config_env_var.clone();
        Figment::new()
            .merge(Serialized::defaults(CliConfig::default()))
            .merge(Serialized::defaults(self))
            .merge(
                Env::raw()
                    .only(&[env_var.as_str()])
                    .map(|_| "json_config_path".into()),
            )
    }

    /// Resolve the effective configuration from defaults, declaration and environment
    pub fn resolve(&self) -> Result<CliConfig, ConfigurationError> {
        Self::extract(self.figment())
    }

    /// Resolve with an explicit JSON config path taking precedence over every other layer
    pub fn resolve_with_path(&self, path: &Path) -> Result<CliConfig, ConfigurationError> {
        Self::extract(
            self.figment()
                .merge(Serialized::default("json_config_path", path)),
        )
    }

    fn extract(figment: Figment) -> Result<CliConfig, ConfigurationError> {
        let mut config: CliConfig =
            figment
                .extract()
                .map_err(|e| ConfigurationError::Resolution {
                    message: e.to_string(),
                })?;

        if config
            .json_config_path
            .as_ref()
            .is_some_and(|p| p.as_os_str().is_empty())
        {
            config.json_config_path = None;
        }

        config.check()?;
        trace!(
            "Resolved CLI config: json_enable={} json_config_path={:?}",
            config.json_enable,
            config.json_config_path
        );
        Ok(config)
    }

    /// Reject configurations that cannot produce a usable parser
    pub fn check(&self) -> Result<(), ConfigurationError> {
        let (enable, disable) = &self.bool_prefix;
        if enable.is_empty() || disable.is_empty() {
            return Err(ConfigurationError::InvalidBoolPrefix {
                enable: enable.clone(),
                disable: disable.clone(),
                reason: "prefixes must not be empty".to_string(),
            });
        }
        if enable == disable {
            return Err(ConfigurationError::InvalidBoolPrefix {
                enable: enable.clone(),
                disable: disable.clone(),
                reason: "prefixes must differ".to_string(),
            });
        }

        if self.json_key.is_empty() || self.json_key.starts_with('-') {
            return Err(ConfigurationError::InvalidFlag {
                field: "json_key".to_string(),
                token: self.json_key.clone(),
                reason: "expected a flag name without leading dashes".to_string(),
            });
        }

        let completion = &self.shell_completion_flag;
        if !completion.starts_with("--") || completion.len() < 3 {
            return Err(ConfigurationError::InvalidFlag {
                field: "shell_completion_flag".to_string(),
                token: completion.clone(),
                reason: "expected a long flag such as --emit-completion".to_string(),
            });
        }

        Ok(())
    }

    /// Long flag, with dashes, of the JSON config option
    pub fn json_flag(&self) -> String {
        format!("--{}", self.json_key)
    }
}

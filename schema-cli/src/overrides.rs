//! Override resolution
//!
//! Before the real parser exists, argv is scanned for the JSON config flag
//! alone. The resolved file (explicit flag > environment > declared default)
//! is loaded as a flat field -> value map; those values later replace field
//! defaults and relax requiredness in the parser builder.

use anyhow::Context;
use clap::{Arg, ArgAction, ArgMatches, Command};
use serde_json::{Map, Value};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, warn};

use crate::config::CliConfig;
use crate::error::{ErrorSeverity, Severity};

/// Field name -> value overrides loaded from a JSON config file
pub type OverrideMap = Map<String, Value>;

/// Problems reading a JSON config file that was found on disk
#[derive(Debug, Error)]
pub enum ResourceError {
    #[error("Unable to read JSON config file {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid JSON in config file {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("JSON config file {} must contain an object at the top level", path.display())]
    NotAnObject { path: PathBuf },
}

impl Severity for ResourceError {
    fn severity(&self) -> ErrorSeverity {
        ErrorSeverity::Error
    }
}

/// Result of the pre-pass: the effective CLI config and the loaded overrides
#[derive(Debug, Clone, Default)]
pub struct ResolvedOverrides {
    pub config: CliConfig,
    /// Path given explicitly on the command line, if any
    pub explicit_path: Option<PathBuf>,
    pub overrides: OverrideMap,
}

/// Long flag names of an assembled command tree, one set per (sub-)command
///
/// The real parser accepts any unambiguous prefix of a long flag, so the
/// pre-scans resolve abbreviations against the same names. An empty set
/// only recognizes the exact flag.
#[derive(Debug, Clone, Default)]
pub struct LongFlags {
    scopes: Vec<Vec<String>>,
}

impl LongFlags {
    pub fn of(command: &Command) -> Self {
        let mut scopes = Vec::new();
        collect_longs(command, &mut scopes);
        Self { scopes }
    }

    /// Whether `--<name>` on the command line selects `--<target>`
    pub fn selects(&self, name: &str, target: &str) -> bool {
        if name == target {
            return true;
        }
        if name.is_empty() || !target.starts_with(name) {
            return false;
        }
        self.scopes
            .iter()
            .filter(|longs| longs.iter().any(|long| long == target))
            .any(|longs| {
                !longs.iter().any(|long| long == name)
                    && longs.iter().filter(|long| long.starts_with(name)).count() == 1
            })
    }
}

fn collect_longs(command: &Command, scopes: &mut Vec<Vec<String>>) {
    scopes.push(
        command
            .get_arguments()
            .filter_map(Arg::get_long)
            .map(String::from)
            .collect(),
    );
    for sub in command.get_subcommands() {
        collect_longs(sub, scopes);
    }
}

/// Resolve the JSON config overrides for `args` (program name excluded)
pub fn resolve_overrides(
    args: &[String],
    declared: &CliConfig,
    longs: &LongFlags,
) -> anyhow::Result<ResolvedOverrides> {
    if !declared.json_enable {
        return Ok(ResolvedOverrides {
            config: declared.resolve()?,
            explicit_path: None,
            overrides: OverrideMap::new(),
        });
    }

    let explicit_path = scan_json_path(args, &declared.json_key, longs)?;
    let config = match &explicit_path {
        Some(path) => declared.resolve_with_path(path)?,
        None => declared.resolve()?,
    };

    let overrides = match config.json_config_path.as_deref().and_then(resolve_path_or_warn) {
        Some(path) => {
            let overrides = load_json_object(&path)?;
            debug!(
                "Loaded {} override(s) from {}",
                overrides.len(),
                path.display()
            );
            overrides
        }
        None => OverrideMap::new(),
    };

    Ok(ResolvedOverrides {
        config,
        explicit_path,
        overrides,
    })
}

/// Find the value of `--<json_key>` in argv, ignoring every other token
pub fn scan_json_path(
    args: &[String],
    json_key: &str,
    longs: &LongFlags,
) -> anyhow::Result<Option<PathBuf>> {
    let arg = Arg::new("json_config")
        .long(json_key.to_string())
        .action(ArgAction::Set)
        .num_args(1)
        .value_parser(clap::value_parser!(PathBuf));
    let matches = prescan_flag(args, json_key, arg, longs)
        .with_context(|| format!("Failed to read --{json_key} from the command line"))?;
    Ok(matches.get_one::<PathBuf>("json_config").cloned())
}

/// Parse only the tokens belonging to `--<long>` with a one-flag command
///
/// clap has no "parse known args" mode, so argv is filtered down to the flag
/// (in `--flag value` or `--flag=value` form, abbreviated as `longs` allows)
/// before parsing. Scanning stops at a bare `--`.
pub(crate) fn prescan_flag(
    args: &[String],
    long: &str,
    arg: Arg,
    longs: &LongFlags,
) -> Result<ArgMatches, clap::Error> {
    let mut filtered = Vec::new();
    let mut tokens = args.iter();
    while let Some(token) = tokens.next() {
        if token == "--" {
            break;
        }
        let Some(flag) = token.strip_prefix("--") else {
            continue;
        };
        match flag.split_once('=') {
            Some((name, value)) if longs.selects(name, long) => {
                filtered.push(format!("--{long}={value}"));
            }
            Some(_) => {}
            None if longs.selects(flag, long) => {
                filtered.push(format!("--{long}"));
                if let Some(value) = tokens.next() {
                    filtered.push(value.clone());
                }
            }
            None => {}
        }
    }

    Command::new("prescan")
        .no_binary_name(true)
        .disable_help_flag(true)
        .disable_version_flag(true)
        .args_override_self(true)
        .arg(arg)
        .try_get_matches_from(filtered)
}

/// Absolute form of `path` if it exists
pub fn resolve_existing_path(path: &Path) -> Option<PathBuf> {
    std::fs::canonicalize(path).ok()
}

/// Like [`resolve_existing_path`], warning when the path does not exist
pub fn resolve_path_or_warn(path: &Path) -> Option<PathBuf> {
    let resolved = resolve_existing_path(path);
    if resolved.is_none() {
        warn!("Unable to find {}", path.display());
    }
    resolved
}

/// Absolute form of `path`, failing with the underlying `NotFound` I/O error
pub fn require_path(path: &Path) -> anyhow::Result<PathBuf> {
    std::fs::canonicalize(path)
        .with_context(|| format!("Unable to find path ({})", path.display()))
}

/// Load a JSON file whose top level is an object
pub fn load_json_object(path: &Path) -> Result<OverrideMap, ResourceError> {
    let text = std::fs::read_to_string(path).map_err(|source| ResourceError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let value: Value = serde_json::from_str(&text).map_err(|source| ResourceError::Parse {
        path: path.to_path_buf(),
        source,
    })?;
    match value {
        Value::Object(map) => Ok(map),
        _ => Err(ResourceError::NotAnObject {
            path: path.to_path_buf(),
        }),
    }
}

//! Model-to-parser builder
//!
//! Assembles a `clap::Command` from a [`Schema`]: one set of flag
//! registrations per field (after applying overrides), then the optional JSON
//! config and shell completion flags, `--help`, and `--version` when a version
//! string is supplied. clap's built-in help/version handling is disabled so
//! every name on the command line is registered, and checked for collisions,
//! here.

use clap::{Arg, ArgAction, ArgMatches, Command};
use clap_complete::Shell;
use std::collections::HashMap;
use std::path::PathBuf;
use tracing::{debug, trace};

use crate::config::CliConfig;
use crate::conversion::{extract_values, ConversionError, ParsedArgs};
use crate::error::ConfigurationError;
use crate::flags::{synthesize, FieldFlags, FlagSpec};
use crate::overrides::OverrideMap;
use crate::schema::{FieldDescriptor, Schema};

/// clap id of the JSON config path flag
pub const JSON_CONFIG_ID: &str = "__json_config";
/// clap id of the shell completion flag
pub const SHELL_COMPLETION_ID: &str = "__shell_completion";
const HELP_ID: &str = "__help";
const VERSION_ID: &str = "__version";

/// A field as it is registered: effective descriptor plus its flags
#[derive(Debug, Clone)]
pub struct FieldBinding {
    /// Descriptor with any override applied as its default
    pub descriptor: FieldDescriptor,
    pub flags: FieldFlags,
}

/// Parser assembled for one model
#[derive(Debug, Clone)]
pub struct ModelParser {
    command: Command,
    bindings: Vec<FieldBinding>,
    json_key: Option<String>,
}

impl ModelParser {
    pub fn command(&self) -> &Command {
        &self.command
    }

    pub fn into_command(self) -> Command {
        self.command
    }

    pub fn bindings(&self) -> &[FieldBinding] {
        &self.bindings
    }

    /// Field values (and the JSON config path, if given) from a parse of this parser
    pub fn extract(&self, matches: &ArgMatches) -> Result<ParsedArgs, ConversionError> {
        let mut values = extract_values(&self.bindings, matches)?;
        if let Some(key) = &self.json_key {
            if let Some(path) = json_config_path(matches) {
                values.insert(key.clone(), path.display().to_string().into());
            }
        }
        Ok(values)
    }
}

/// JSON config path given on the command line, if the flag is registered
pub fn json_config_path(matches: &ArgMatches) -> Option<PathBuf> {
    matches
        .try_get_one::<PathBuf>(JSON_CONFIG_ID)
        .ok()
        .flatten()
        .cloned()
}

/// Builder for [`ModelParser`]
pub struct ParserBuilder<'a> {
    name: String,
    schema: &'a Schema,
    config: &'a CliConfig,
    overrides: Option<&'a OverrideMap>,
    description: Option<String>,
    version: Option<String>,
}

impl<'a> ParserBuilder<'a> {
    pub fn new(name: impl Into<String>, schema: &'a Schema, config: &'a CliConfig) -> Self {
        Self {
            name: name.into(),
            schema,
            config,
            overrides: None,
            description: None,
            version: None,
        }
    }

    /// Values that replace field defaults and make those fields optional
    pub fn overrides(mut self, overrides: &'a OverrideMap) -> Self {
        self.overrides = Some(overrides);
        self
    }

    pub fn description(mut self, description: Option<impl Into<String>>) -> Self {
        self.description = description.map(Into::into);
        self
    }

    pub fn version(mut self, version: Option<impl Into<String>>) -> Self {
        self.version = version.map(Into::into);
        self
    }

    pub fn build(self) -> Result<ModelParser, ConfigurationError> {
        self.config.check()?;
        for field in self.config.flags.keys() {
            if !self.schema.contains(field) {
                return Err(ConfigurationError::UnknownField {
                    field: field.clone(),
                });
            }
        }

        let mut command = Command::new(self.name.clone())
            .disable_help_flag(true)
            .disable_version_flag(true)
            .disable_help_subcommand(true)
            .infer_long_args(true)
            .args_override_self(true);
        if let Some(description) = self
            .description
            .clone()
            .or_else(|| self.schema.description().map(String::from))
        {
            command = command.about(description);
        }

        let mut registry = FlagRegistry::default();
        let mut bindings = Vec::with_capacity(self.schema.len());

        for field in self.schema.fields() {
            let descriptor = match self.overrides.and_then(|o| o.get(&field.name)) {
                Some(value) => {
                    trace!("Override for '{}' becomes its default", field.name);
                    field.with_override(value.clone())
                }
                None => field.clone(),
            };

            let custom = self
                .config
                .flags_for(&descriptor.name)
                .or(descriptor.custom_flags.as_deref());
            let flags = synthesize(&descriptor, custom, &self.config.bool_prefix)?;

            for flag in &flags.flags {
                registry.register_flag(flag)?;
                command = command.arg(flag.to_arg());
            }
            if let Some(group) = &flags.group {
                command = command.group(group.to_group());
            }
            bindings.push(FieldBinding { descriptor, flags });
        }

        let json_key = if self.config.json_enable {
            let flag = self.config.json_flag();
            registry.register(&flag, "JSON config")?;
            command = command.arg(json_config_arg(self.config));
            Some(self.config.json_key.clone())
        } else {
            None
        };

        if self.config.shell_completion_enable {
            let flag = &self.config.shell_completion_flag;
            registry.register(flag, "shell completion")?;
            command = command.arg(shell_completion_arg(flag));
        }

        registry.register("-h", "help")?;
        registry.register("--help", "help")?;
        command = command.arg(help_arg());

        if let Some(version) = &self.version {
            registry.register("--version", "version")?;
            command = command.version(version.clone()).arg(version_arg());
        }

        debug!(
            "Built parser '{}' with {} field(s)",
            self.name,
            bindings.len()
        );
        Ok(ModelParser {
            command,
            bindings,
            json_key,
        })
    }
}

fn json_config_arg(config: &CliConfig) -> Arg {
    let default_path = config
        .json_config_path
        .as_ref()
        .map(|p| p.display().to_string())
        .unwrap_or_else(|| "none".to_string());
    Arg::new(JSON_CONFIG_ID)
        .long(config.json_key.clone())
        .value_name("PATH")
        .action(ArgAction::Set)
        .num_args(1)
        .value_parser(clap::value_parser!(PathBuf))
        .help(format!(
            "Path to configuration JSON file. Can be set using ENV VAR ({}) (default:{default_path})",
            config.json_config_env_var
        ))
}

/// Eager `-h/--help`
pub(crate) fn help_arg() -> Arg {
    Arg::new(HELP_ID)
        .short('h')
        .long("help")
        .action(ArgAction::Help)
        .help("Print help and exit")
}

/// Eager `--version`; the command must carry a version string
pub(crate) fn version_arg() -> Arg {
    Arg::new(VERSION_ID)
        .long("version")
        .action(ArgAction::Version)
        .help("Print version and exit")
}

/// Shell completion flag registration, shared with the completion pre-scan
pub(crate) fn shell_completion_arg(flag: &str) -> Arg {
    Arg::new(SHELL_COMPLETION_ID)
        .long(flag.trim_start_matches('-').to_string())
        .value_name("SHELL")
        .action(ArgAction::Set)
        .num_args(1)
        .value_parser(clap::value_parser!(Shell))
        .help("Print the shell completion script for SHELL and exit")
}

/// Tracks every short and long name to detect collisions
#[derive(Default)]
struct FlagRegistry {
    owners: HashMap<String, String>,
}

impl FlagRegistry {
    fn register_flag(&mut self, flag: &FlagSpec) -> Result<(), ConfigurationError> {
        if let Some(c) = flag.short {
            self.register(&format!("-{c}"), &flag.field)?;
        }
        if let Some(long) = &flag.long {
            self.register(&format!("--{long}"), &flag.field)?;
        }
        Ok(())
    }

    fn register(&mut self, name: &str, owner: &str) -> Result<(), ConfigurationError> {
        match self.owners.get(name) {
            Some(first) => Err(ConfigurationError::DuplicateFlag {
                flag: name.to_string(),
                first: first.clone(),
                second: owner.to_string(),
            }),
            None => {
                self.owners.insert(name.to_string(), owner.to_string());
                Ok(())
            }
        }
    }
}

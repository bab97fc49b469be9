//! Command dispatch
//!
//! A runner drives either one model or a set of named sub-commands, each with
//! its own model. [`Dispatch`] assembles the top-level clap command for both
//! shapes and, after parsing, hands back the selected command together with
//! its parsed arguments. The selected sub-command's name is recorded in the
//! parsed arguments under [`SUBCOMMAND_KEY`].

use anyhow::{anyhow, bail};
use clap::{ArgMatches, Command};
use indexmap::IndexMap;
use serde_json::Value;
use tracing::debug;

use crate::builder::{
    help_arg, json_config_path, shell_completion_arg, version_arg, ModelParser, ParserBuilder,
};
use crate::config::CliConfig;
use crate::conversion::ParsedArgs;
use crate::model::CmdSpec;
use crate::overrides::{require_path, ResolvedOverrides};
use crate::schema::Schema;

/// Parsed-argument key naming the selected sub-command
pub const SUBCOMMAND_KEY: &str = "__subcommand";

/// One runnable command after its parser has been built
pub(crate) struct Target<'a> {
    pub name: Option<String>,
    pub spec: &'a CmdSpec,
    pub schema: Schema,
    pub config: CliConfig,
    pub parser: ModelParser,
}

impl Target<'_> {
    /// Fail with the underlying `NotFound` error when strict JSON path validation applies
    fn check_json_path(&self, matches: &ArgMatches) -> anyhow::Result<()> {
        if !(self.config.json_enable && self.config.json_validate_path) {
            return Ok(());
        }
        let path = json_config_path(matches).or_else(|| self.config.json_config_path.clone());
        if let Some(path) = path {
            require_path(&path)?;
        }
        Ok(())
    }
}

/// Top-level parser plus the commands it can select
pub(crate) struct Dispatch<'a> {
    command: Command,
    targets: Vec<Target<'a>>,
    subcommands: bool,
}

/// Shared knobs of the top-level command
pub(crate) struct DispatchOptions<'o> {
    pub name: &'o str,
    pub description: Option<&'o str>,
    pub version: Option<&'o str>,
}

impl<'a> Dispatch<'a> {
    /// Parser for a single model; its fields are the top-level flags
    pub fn single(
        spec: &'a CmdSpec,
        resolved: &ResolvedOverrides,
        options: &DispatchOptions<'_>,
    ) -> anyhow::Result<Self> {
        let schema = spec.schema()?;
        let config = resolved.config.clone();
        let parser = ParserBuilder::new(options.name, &schema, &config)
            .overrides(&resolved.overrides)
            .description(options.description.or(spec.get_description()))
            .version(options.version)
            .build()?;

        Ok(Self {
            command: parser.command().clone().no_binary_name(true),
            targets: vec![Target {
                name: None,
                spec,
                schema,
                config,
                parser,
            }],
            subcommands: false,
        })
    }

    /// Parser with one sub-command per entry
    ///
    /// JSON config overrides come from a single shared pre-pass; every
    /// sub-command is built with the same override map.
    pub fn subcommands(
        specs: &'a IndexMap<String, CmdSpec>,
        resolved: &ResolvedOverrides,
        options: &DispatchOptions<'_>,
    ) -> anyhow::Result<Self> {
        if specs.is_empty() {
            bail!("No sub-commands registered");
        }

        let mut command = Command::new(options.name.to_string())
            .no_binary_name(true)
            .disable_help_flag(true)
            .disable_version_flag(true)
            .disable_help_subcommand(true)
            .subcommand_required(true)
            .infer_long_args(true)
            .args_override_self(true)
            .arg(help_arg());
        if let Some(description) = options.description {
            command = command.about(description.to_string());
        }
        if let Some(version) = options.version {
            command = command.version(version.to_string()).arg(version_arg());
        }
        if resolved.config.shell_completion_enable {
            command = command.arg(shell_completion_arg(&resolved.config.shell_completion_flag));
        }

        let mut targets = Vec::with_capacity(specs.len());
        for (name, spec) in specs {
            let schema = spec.schema()?;
            let config = spec.cli_config().resolve()?;
            let parser = ParserBuilder::new(name.clone(), &schema, &config)
                .overrides(&resolved.overrides)
                .description(spec.get_description())
                .build()?;
            command = command.subcommand(parser.command().clone());
            targets.push(Target {
                name: Some(name.clone()),
                spec,
                schema,
                config,
                parser,
            });
        }

        Ok(Self {
            command,
            targets,
            subcommands: true,
        })
    }

    pub fn command(&self) -> &Command {
        &self.command
    }

    /// Select the command chosen on the command line and extract its arguments
    pub fn parse_args(&self, matches: &ArgMatches) -> anyhow::Result<(&Target<'a>, ParsedArgs)> {
        let (target, matches) = if self.subcommands {
            let (name, sub_matches) = matches
                .subcommand()
                .ok_or_else(|| anyhow!("A sub-command is required"))?;
            let target = self
                .targets
                .iter()
                .find(|t| t.name.as_deref() == Some(name))
                .ok_or_else(|| anyhow!("Unknown sub-command '{name}'"))?;
            debug!("Selected sub-command '{name}'");
            (target, sub_matches)
        } else {
            let target = self
                .targets
                .first()
                .ok_or_else(|| anyhow!("No command registered"))?;
            (target, matches)
        };

        target.check_json_path(matches)?;
        let mut values = target.parser.extract(matches)?;
        if let Some(name) = &target.name {
            values.insert(SUBCOMMAND_KEY.to_string(), Value::String(name.clone()));
        }
        Ok((target, values))
    }
}

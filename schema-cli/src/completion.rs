//! Shell completion emission
//!
//! The completion flag is eager: when present it wins over everything else on
//! the command line, including missing required flags. It is detected with a
//! pre-scan before the real parse for that reason.

use anyhow::Context;
use clap::{ArgMatches, Command};
use clap_complete::Shell;
use std::io::Write;
use tracing::debug;

use crate::builder::{shell_completion_arg, SHELL_COMPLETION_ID};
use crate::config::CliConfig;
use crate::overrides::{prescan_flag, LongFlags};

/// Shell requested through the completion flag, if it is enabled and present
pub fn requested_shell(
    args: &[String],
    config: &CliConfig,
    longs: &LongFlags,
) -> anyhow::Result<Option<Shell>> {
    if !config.shell_completion_enable {
        return Ok(None);
    }
    let flag = &config.shell_completion_flag;
    let matches = prescan_flag(
        args,
        flag.trim_start_matches('-'),
        shell_completion_arg(flag),
        longs,
    )
    .with_context(|| format!("Failed to read {flag} from the command line"))?;
    Ok(matches.get_one::<Shell>(SHELL_COMPLETION_ID).copied())
}

/// Shell selected in a full parse, on the top level or the chosen sub-command
pub(crate) fn matched_shell(matches: &ArgMatches) -> Option<Shell> {
    let shell = |m: &ArgMatches| {
        m.try_get_one::<Shell>(SHELL_COMPLETION_ID)
            .ok()
            .flatten()
            .copied()
    };
    shell(matches).or_else(|| matches.subcommand().and_then(|(_, sub)| shell(sub)))
}

/// Write the completion script for `command` to `out`
pub fn write_completion(
    command: &Command,
    shell: Shell,
    bin_name: &str,
    out: &mut dyn Write,
) -> anyhow::Result<()> {
    let mut command = command.clone();
    clap_complete::generate(shell, &mut command, bin_name, &mut *out);
    out.flush().context("Failed to flush completion script")?;
    debug!("Emitted {shell} completion for {bin_name}");
    Ok(())
}

/// Print the completion script to stdout and report on stderr
pub fn print_completion(command: &Command, shell: Shell, bin_name: &str) -> anyhow::Result<()> {
    write_completion(command, shell, bin_name, &mut std::io::stdout())?;
    eprintln!("Completed writing {shell} shell output to stdout");
    Ok(())
}

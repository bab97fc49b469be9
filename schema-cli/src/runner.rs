//! Execution orchestrator
//!
//! One invocation walks these stages in order:
//!
//! ```text
//! START -> OVERRIDES_RESOLVED -> PARSER_BUILT -> ARGS_PARSED -> MODEL_CONSTRUCTED
//!       -> VALIDATED -> PROLOGUE_RUN -> HANDLER_RUN -> EPILOGUE_RUN -> DONE
//! ```
//!
//! Any stage after START may fail; the error goes to the exception handler,
//! which picks the exit code. Eager flags (`--help`, `--version`, shell
//! completion) end the pipeline early with [`Outcome::Terminated`] and exit
//! code 0. The epilogue always runs with the final exit code.

use clap::error::ErrorKind;
use indexmap::IndexMap;
use std::fmt;
use std::time::{Duration, Instant};
use tracing::debug;

use crate::completion::{matched_shell, print_completion, requested_shell};
use crate::exit_codes::EXIT_SUCCESS;
use crate::handlers::{
    default_epilogue_handler, default_exception_handler, default_prologue_handler,
    failed_execution_code, EpilogueHandler, ExceptionHandler, PrologueHandler,
};
use crate::model::{Cmd, CmdSpec, Model};
use crate::overrides::{resolve_overrides, LongFlags, ResolvedOverrides};
use crate::subcommands::{Dispatch, DispatchOptions};

/// Pipeline stages, logged as the orchestrator enters them
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Start,
    OverridesResolved,
    ParserBuilt,
    ArgsParsed,
    ModelConstructed,
    Validated,
    PrologueRun,
    HandlerRun,
    EpilogueRun,
    Done,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Start => "START",
            Stage::OverridesResolved => "OVERRIDES_RESOLVED",
            Stage::ParserBuilt => "PARSER_BUILT",
            Stage::ArgsParsed => "ARGS_PARSED",
            Stage::ModelConstructed => "MODEL_CONSTRUCTED",
            Stage::Validated => "VALIDATED",
            Stage::PrologueRun => "PROLOGUE_RUN",
            Stage::HandlerRun => "HANDLER_RUN",
            Stage::EpilogueRun => "EPILOGUE_RUN",
            Stage::Done => "DONE",
        };
        f.write_str(name)
    }
}

fn enter(stage: Stage) {
    debug!("Entering stage {stage}");
}

/// How the pipeline ended before the epilogue
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Outcome {
    /// The handler ran and returned this exit code
    Completed(i32),
    /// An eager flag finished the invocation; the handler never ran
    Terminated,
}

/// Terminal artifact of one invocation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExitOutcome {
    pub exit_code: i32,
    pub elapsed: Duration,
}

enum Commands {
    Single(CmdSpec),
    Sub(IndexMap<String, CmdSpec>),
}

/// Parses the command line into a model and runs it
pub struct Runner {
    commands: Commands,
    name: String,
    description: Option<String>,
    version: Option<String>,
    exception_handler: ExceptionHandler,
    prologue_handler: PrologueHandler,
    epilogue_handler: EpilogueHandler,
}

impl Runner {
    /// Runner for a single command
    pub fn new(spec: CmdSpec) -> Self {
        Self::with_commands(Commands::Single(spec))
    }

    /// Runner selecting one of several named sub-commands
    pub fn subcommands<I, S>(commands: I) -> Self
    where
        I: IntoIterator<Item = (S, CmdSpec)>,
        S: Into<String>,
    {
        Self::with_commands(Commands::Sub(
            commands
                .into_iter()
                .map(|(name, spec)| (name.into(), spec))
                .collect(),
        ))
    }

    fn with_commands(commands: Commands) -> Self {
        Self {
            commands,
            name: program_name(),
            description: None,
            version: None,
            exception_handler: Box::new(default_exception_handler),
            prologue_handler: Box::new(default_prologue_handler),
            epilogue_handler: Box::new(default_epilogue_handler),
        }
    }

    /// Program name shown in usage and completion scripts
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Version string; enables `--version`
    pub fn version(mut self, version: impl Into<String>) -> Self {
        self.version = Some(version.into());
        self
    }

    pub fn exception_handler<F>(mut self, handler: F) -> Self
    where
        F: Fn(&anyhow::Error) -> i32 + 'static,
    {
        self.exception_handler = Box::new(handler);
        self
    }

    pub fn prologue_handler<F>(mut self, handler: F) -> Self
    where
        F: Fn(&dyn Model) -> anyhow::Result<()> + 'static,
    {
        self.prologue_handler = Box::new(handler);
        self
    }

    pub fn epilogue_handler<F>(mut self, handler: F) -> Self
    where
        F: Fn(i32, Duration) + 'static,
    {
        self.epilogue_handler = Box::new(handler);
        self
    }

    /// Run with `args` (program name excluded) and return the exit code
    pub fn run<I, S>(&self, args: I) -> i32
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.run_outcome(args).exit_code
    }

    /// Run with `args` (program name excluded)
    pub fn run_outcome<I, S>(&self, args: I) -> ExitOutcome
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let args: Vec<String> = args.into_iter().map(Into::into).collect();
        let started = Instant::now();
        enter(Stage::Start);

        let exit_code = match self.execute(&args) {
            Ok(Outcome::Completed(code)) => code,
            Ok(Outcome::Terminated) => EXIT_SUCCESS,
            Err(err) => {
                let handled = (self.exception_handler)(&err);
                failed_execution_code(&err).unwrap_or(handled)
            }
        };

        let elapsed = started.elapsed();
        enter(Stage::EpilogueRun);
        (self.epilogue_handler)(exit_code, elapsed);
        enter(Stage::Done);

        ExitOutcome { exit_code, elapsed }
    }

    /// Run with the process arguments and exit with the resulting code
    pub fn run_and_exit(self) -> ! {
        let code = self.run(std::env::args().skip(1));
        std::process::exit(code)
    }

    fn execute(&self, args: &[String]) -> anyhow::Result<Outcome> {
        // Sub-commands share one pre-pass; the last registered command's config drives it
        let declared = match &self.commands {
            Commands::Single(spec) => spec.cli_config(),
            Commands::Sub(specs) => specs
                .values()
                .last()
                .map(CmdSpec::cli_config)
                .unwrap_or_default(),
        };
        // Flag names do not depend on overrides; a parser built without them resolves abbreviations
        let longs = LongFlags::of(
            self.dispatch(&ResolvedOverrides {
                config: declared.resolve()?,
                ..ResolvedOverrides::default()
            })?
            .command(),
        );
        let resolved = resolve_overrides(args, &declared, &longs)?;
        enter(Stage::OverridesResolved);

        let dispatch = self.dispatch(&resolved)?;
        enter(Stage::ParserBuilt);

        if let Some(shell) = requested_shell(args, &resolved.config, &longs)? {
            print_completion(dispatch.command(), shell, &self.name)?;
            return Ok(Outcome::Terminated);
        }

        let matches = match dispatch.command().clone().try_get_matches_from(args) {
            Ok(matches) => matches,
            Err(err) if matches!(err.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) => {
                err.print()?;
                return Ok(Outcome::Terminated);
            }
            Err(err) => return Err(err.into()),
        };
        if let Some(shell) = matched_shell(&matches) {
            print_completion(dispatch.command(), shell, &self.name)?;
            return Ok(Outcome::Terminated);
        }
        let (target, mut values) = dispatch.parse_args(&matches)?;
        enter(Stage::ArgsParsed);

        values.retain(|key, _| {
            let keep = target.schema.contains(key);
            if !keep {
                debug!("Dropping non-field key '{key}'");
            }
            keep
        });
        let model = target.spec.construct(&target.schema, values)?;
        enter(Stage::ModelConstructed);

        target.spec.validate(&*model, &target.schema)?;
        enter(Stage::Validated);

        (self.prologue_handler)(&*model)?;
        enter(Stage::PrologueRun);

        let exit_code = target.spec.run(model)?;
        enter(Stage::HandlerRun);

        Ok(Outcome::Completed(exit_code))
    }

    fn dispatch(&self, resolved: &ResolvedOverrides) -> anyhow::Result<Dispatch<'_>> {
        let options = DispatchOptions {
            name: &self.name,
            description: self.description.as_deref(),
            version: self.version.as_deref(),
        };
        match &self.commands {
            Commands::Single(spec) => Dispatch::single(spec, resolved, &options),
            Commands::Sub(specs) => Dispatch::subcommands(specs, resolved, &options),
        }
    }
}

fn program_name() -> String {
    std::env::args_os()
        .next()
        .as_deref()
        .map(std::path::Path::new)
        .and_then(|p| p.file_stem())
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_else(|| "cli".to_string())
}

/// Runner for a self-running command model
pub fn to_runner<C: Cmd>() -> Runner {
    Runner::new(CmdSpec::from_cmd::<C>())
}

/// Parse the process arguments into `C`, run it and exit
pub fn run_and_exit<C: Cmd>() -> ! {
    to_runner::<C>().run_and_exit()
}

//! Model traits and command definitions
//!
//! A model is a plain serde struct that also derives `schemars::JsonSchema`.
//! [`CmdSpec`] erases the model type so a runner can hold several commands
//! with different models.

use anyhow::anyhow;
use schemars::JsonSchema;
use serde::{de::DeserializeOwned, Serialize};
use std::any::Any;
use std::fmt::Debug;
use tracing::trace;

use crate::config::CliConfig;
use crate::conversion::ParsedArgs;
use crate::error::ValidationError;
use crate::exit_codes::EXIT_SUCCESS;
use crate::schema::{Schema, SchemaError};
use crate::validation::{construct, ModelValidator};

/// A data model that can be populated from the command line
pub trait CliModel: Serialize + DeserializeOwned + JsonSchema + Debug + 'static {
    /// Companion CLI configuration for this model
    fn cli_config() -> CliConfig {
        CliConfig::default()
    }

    /// Business rules checked after schema validation
    fn validate(&self) -> anyhow::Result<()> {
        Ok(())
    }
}

/// A model that knows how to run itself
pub trait Cmd: CliModel {
    fn run(&self) -> anyhow::Result<()>;
}

/// Type-erased view of a constructed model, as seen by the prologue hook
pub trait Model: Debug + Any {
    fn as_any(&self) -> &dyn Any;
    fn into_any(self: Box<Self>) -> Box<dyn Any>;
}

impl<T: Debug + Any> Model for T {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn into_any(self: Box<Self>) -> Box<dyn Any> {
        self
    }
}

type ConstructFn = fn(&Schema, ParsedArgs) -> anyhow::Result<Box<dyn Model>>;
type ValidateFn = fn(&dyn Model, &Schema) -> anyhow::Result<()>;
type RunFn = Box<dyn Fn(Box<dyn Model>) -> anyhow::Result<i32>>;

/// One runnable command: a model type plus what to do with it
pub struct CmdSpec {
    schema: fn() -> Result<Schema, SchemaError>,
    config: fn() -> CliConfig,
    description: Option<String>,
    construct: ConstructFn,
    validate: ValidateFn,
    run: RunFn,
}

impl CmdSpec {
    /// Command whose model runs itself through [`Cmd::run`]
    pub fn from_cmd<C: Cmd>() -> Self {
        Self::new::<C>(Box::new(|model| {
            let cmd = downcast::<C>(model)?;
            cmd.run()?;
            Ok(EXIT_SUCCESS)
        }))
    }

    /// Command handled by an external function returning the exit code
    pub fn with_handler<M, F>(handler: F) -> Self
    where
        M: CliModel,
        F: Fn(M) -> anyhow::Result<i32> + 'static,
    {
        Self::new::<M>(Box::new(move |model| handler(downcast::<M>(model)?)))
    }

    fn new<M: CliModel>(run: RunFn) -> Self {
        Self {
            schema: Schema::for_model::<M>,
            config: M::cli_config,
            description: None,
            construct: construct_model::<M>,
            validate: validate_model::<M>,
            run,
        }
    }

    /// Help text for this command when it is used as a sub-command
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub(crate) fn get_description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub(crate) fn schema(&self) -> Result<Schema, SchemaError> {
        (self.schema)()
    }

    pub(crate) fn cli_config(&self) -> CliConfig {
        (self.config)()
    }

    pub(crate) fn construct(&self, schema: &Schema, values: ParsedArgs) -> anyhow::Result<Box<dyn Model>> {
        (self.construct)(schema, values)
    }

    pub(crate) fn validate(&self, model: &dyn Model, schema: &Schema) -> anyhow::Result<()> {
        (self.validate)(model, schema)
    }

    pub(crate) fn run(&self, model: Box<dyn Model>) -> anyhow::Result<i32> {
        (self.run)(model)
    }
}

fn construct_model<M: CliModel>(schema: &Schema, values: ParsedArgs) -> anyhow::Result<Box<dyn Model>> {
    let model: M = construct(schema, values)?;
    Ok(Box::new(model))
}

/// Re-check a constructed model: schema validation of its serialized form, then [`CliModel::validate`]
fn validate_model<M: CliModel>(model: &dyn Model, schema: &Schema) -> anyhow::Result<()> {
    let model = model
        .as_any()
        .downcast_ref::<M>()
        .ok_or_else(|| anyhow!("Model is not a {}", std::any::type_name::<M>()))?;

    let instance = serde_json::to_value(model)?;
    trace!("Validating {}", schema.name());
    ModelValidator::new(schema)?.check(&instance)?;

    model
        .validate()
        .map_err(|e| ValidationError::message(schema.name(), format!("{e:#}")).into())
}

fn downcast<M: 'static>(model: Box<dyn Model>) -> anyhow::Result<M> {
    model
        .into_any()
        .downcast::<M>()
        .map(|boxed| *boxed)
        .map_err(|_| anyhow!("Model is not a {}", std::any::type_name::<M>()))
}

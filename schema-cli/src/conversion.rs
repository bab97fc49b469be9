//! Parsed argument extraction
//!
//! Converts clap matches back into a JSON field map the validator and serde
//! can consume. Raw strings are coerced toward each field's JSON type; values
//! that were not given on the command line fall back to the field's default
//! (which already includes JSON config overrides).

use clap::ArgMatches;
use serde_json::{Map, Number, Value};
use thiserror::Error;

use crate::builder::FieldBinding;
use crate::error::{ErrorSeverity, Severity};
use crate::flags::FlagAction;
use crate::schema::{choice_label, FieldDescriptor, FieldType};

/// Errors that can occur while converting parsed arguments
#[derive(Debug, Error)]
pub enum ConversionError {
    #[error("Missing required argument: {field}")]
    MissingRequired { field: String },

    #[error("Failed to parse {field} as {expected}: '{value}'")]
    InvalidValue {
        field: String,
        expected: String,
        value: String,
    },

    #[error("Unable to read parsed value for {field}: {source}")]
    Matches {
        field: String,
        #[source]
        source: clap::parser::MatchesError,
    },
}

impl Severity for ConversionError {
    fn severity(&self) -> ErrorSeverity {
        match self {
            ConversionError::MissingRequired { .. } => ErrorSeverity::Error,
            ConversionError::InvalidValue { .. } => ErrorSeverity::Error,
            ConversionError::Matches { .. } => ErrorSeverity::Critical,
        }
    }
}

/// Destination key -> value mapping produced from one parse
///
/// Besides model fields this may hold routing entries (the JSON config path,
/// the selected sub-command) that must be stripped before construction.
pub type ParsedArgs = Map<String, Value>;

/// Collect the value of every bound field from `matches`
pub fn extract_values<'a>(
    bindings: impl IntoIterator<Item = &'a FieldBinding>,
    matches: &ArgMatches,
) -> Result<ParsedArgs, ConversionError> {
    let mut values = ParsedArgs::new();

    for binding in bindings {
        let descriptor = &binding.descriptor;
        let value = match extract_field(binding, matches)? {
            Some(value) => Some(value),
            None => descriptor.default.clone(),
        };

        match value {
            Some(value) => {
                values.insert(descriptor.name.clone(), value);
            }
            None if descriptor.required => {
                return Err(ConversionError::MissingRequired {
                    field: descriptor.name.clone(),
                });
            }
            None => {
                // Not given and no default: leave it to the model's own serde defaults
            }
        }
    }

    Ok(values)
}

fn extract_field(
    binding: &FieldBinding,
    matches: &ArgMatches,
) -> Result<Option<Value>, ConversionError> {
    let descriptor = &binding.descriptor;
    let matches_err = |source| ConversionError::Matches {
        field: descriptor.name.clone(),
        source,
    };

    for flag in &binding.flags.flags {
        match flag.action {
            FlagAction::Switch { value } => {
                let present = matches
                    .try_get_one::<bool>(&flag.id)
                    .map_err(matches_err)?
                    .copied()
                    .unwrap_or(false);
                if present {
                    return Ok(Some(Value::Bool(value)));
                }
            }
            FlagAction::Single => {
                if let Some(raw) = matches.try_get_one::<String>(&flag.id).map_err(matches_err)? {
                    return coerce(descriptor, raw).map(Some);
                }
            }
            FlagAction::Multiple => {
                if let Some(raws) = matches.try_get_many::<String>(&flag.id).map_err(matches_err)? {
                    let mut items = raws
                        .map(|raw| coerce(descriptor, raw))
                        .collect::<Result<Vec<_>, _>>()?;
                    if descriptor.unique_items {
                        // Set-valued fields: repeated tokens collapse to the first occurrence
                        let mut seen = Vec::with_capacity(items.len());
                        items.retain(|item| {
                            let fresh = !seen.contains(item);
                            if fresh {
                                seen.push(item.clone());
                            }
                            fresh
                        });
                    }
                    return Ok(Some(Value::Array(items)));
                }
            }
        }
    }

    Ok(None)
}

/// Coerce one raw command-line token toward the field's JSON type
///
/// Nullable non-string fields also accept `null` / `none`.
pub fn coerce(descriptor: &FieldDescriptor, raw: &str) -> Result<Value, ConversionError> {
    let invalid = || ConversionError::InvalidValue {
        field: descriptor.name.clone(),
        expected: descriptor.type_label(),
        value: raw.to_string(),
    };

    if descriptor.nullable
        && descriptor.field_type != FieldType::String
        && (raw.eq_ignore_ascii_case("null") || raw.eq_ignore_ascii_case("none"))
    {
        return Ok(Value::Null);
    }

    match &descriptor.field_type {
        FieldType::String => Ok(Value::String(raw.to_string())),
        FieldType::Integer => raw
            .parse::<i64>()
            .map(Value::from)
            .or_else(|_| raw.parse::<u64>().map(Value::from))
            .map_err(|_| invalid()),
        FieldType::Number => raw
            .parse::<f64>()
            .ok()
            .and_then(Number::from_f64)
            .map(Value::Number)
            .ok_or_else(invalid),
        FieldType::Boolean => parse_bool(raw).map(Value::Bool).ok_or_else(invalid),
        FieldType::Enum(values) => values
            .iter()
            .find(|v| choice_label(v) == raw)
            .cloned()
            .ok_or_else(invalid),
    }
}

/// Accept the usual command-line spellings of a boolean
pub fn parse_bool(raw: &str) -> Option<bool> {
    match raw.to_ascii_lowercase().as_str() {
        "true" | "yes" | "y" | "1" | "on" => Some(true),
        "false" | "no" | "n" | "0" | "off" => Some(false),
        _ => None,
    }
}

//! Flag synthesis
//!
//! Turns one [`FieldDescriptor`] into the flag registrations that represent it
//! on the command line. Scalars, enums and sequences map to a single valued
//! flag. Booleans map to switches in one of two modes:
//!
//! - **negate**: the field has a concrete, non-null default. A single switch
//!   (`--enable-x` when the default is `false`, `--disable-x` when `true`)
//!   stores the negation of the default.
//! - **paired**: anything else. Two mutually exclusive switches store `true`
//!   and `false`; the pair forms a group that is required iff the field is.
//!   A switch that would store the field's own default is not registered.

use clap::builder::PossibleValuesParser;
use clap::{Arg, ArgAction, ArgGroup};
use std::fmt;
use tracing::trace;

use crate::error::ConfigurationError;
use crate::schema::FieldDescriptor;

/// One token of a custom flag spec
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FlagToken {
    /// `-x`
    Short(char),
    /// `--name`, stored without dashes
    Long(String),
    /// `name`, a positional argument
    Positional(String),
}

impl FlagToken {
    /// Classify a raw token, rejecting shapes clap cannot register
    pub fn parse(field: &str, token: &str) -> Result<Self, ConfigurationError> {
        let invalid = |reason: &str| ConfigurationError::InvalidFlag {
            field: field.to_string(),
            token: token.to_string(),
            reason: reason.to_string(),
        };

        if token.is_empty() || token.chars().any(char::is_whitespace) {
            return Err(invalid("flags must be non-empty and contain no whitespace"));
        }

        if let Some(name) = token.strip_prefix("--") {
            if name.is_empty() || name.starts_with('-') || name.contains('=') {
                return Err(invalid("expected a long flag of the form --name"));
            }
            return Ok(FlagToken::Long(name.to_string()));
        }

        if let Some(rest) = token.strip_prefix('-') {
            let mut chars = rest.chars();
            return match (chars.next(), chars.next()) {
                (Some(c), None) if c != '-' && c != '=' => Ok(FlagToken::Short(c)),
                _ => Err(invalid(
                    "short flags must be exactly two characters, e.g. -x",
                )),
            };
        }

        Ok(FlagToken::Positional(token.to_string()))
    }
}

impl fmt::Display for FlagToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FlagToken::Short(c) => write!(f, "-{c}"),
            FlagToken::Long(name) => write!(f, "--{name}"),
            FlagToken::Positional(name) => write!(f, "{name}"),
        }
    }
}

/// How a registered flag consumes the command line
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FlagAction {
    /// Exactly one value
    Single,
    /// One or more values, accumulated across repeats
    Multiple,
    /// No value; presence stores `value` into the field
    Switch { value: bool },
}

/// One flag registration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlagSpec {
    /// clap argument id; also the destination key in the parsed matches
    pub id: String,
    /// Model field this flag writes to
    pub field: String,
    pub short: Option<char>,
    pub long: Option<String>,
    pub positional: bool,
    pub action: FlagAction,
    pub choices: Option<Vec<String>>,
    pub required: bool,
    pub help: String,
    pub value_name: String,
}

impl FlagSpec {
    /// Every name this flag answers to on the command line, e.g. `-f`, `--hdf5`
    pub fn names(&self) -> Vec<String> {
        let mut names = Vec::new();
        if let Some(c) = self.short {
            names.push(format!("-{c}"));
        }
        if let Some(long) = &self.long {
            names.push(format!("--{long}"));
        }
        if self.positional {
            names.push(self.value_name.clone());
        }
        names
    }

    /// Build the clap registration
    pub fn to_arg(&self) -> Arg {
        let mut arg = Arg::new(self.id.clone()).help(self.help.clone());
        if let Some(c) = self.short {
            arg = arg.short(c);
        }
        if let Some(long) = &self.long {
            arg = arg.long(long.clone());
        }

        arg = match self.action {
            FlagAction::Switch { .. } => arg.action(ArgAction::SetTrue),
            FlagAction::Single => arg
                .action(ArgAction::Set)
                .num_args(1)
                .value_name(self.value_name.clone())
                .required(self.required),
            FlagAction::Multiple => arg
                .action(ArgAction::Append)
                .num_args(1..)
                .value_name(self.value_name.clone())
                .required(self.required),
        };

        if let Some(choices) = &self.choices {
            arg = arg.value_parser(PossibleValuesParser::new(choices.clone()));
        }
        arg
    }
}

/// Mutually exclusive switches of a paired boolean
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoolGroup {
    /// Group id, the field name
    pub id: String,
    pub args: Vec<String>,
    pub required: bool,
}

impl BoolGroup {
    pub fn to_group(&self) -> ArgGroup {
        ArgGroup::new(self.id.clone())
            .args(self.args.clone())
            .multiple(false)
            .required(self.required)
    }
}

/// All registrations synthesized for one field
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldFlags {
    pub field: String,
    pub flags: Vec<FlagSpec>,
    pub group: Option<BoolGroup>,
}

/// clap id of the paired-mode switch that stores `value` into `field`
pub fn bool_arg_id(field: &str, value: bool) -> String {
    format!("{field}:{value}")
}

/// Synthesize the flags for `field`
///
/// `custom` is the field's custom token spec (companion config first, then the
/// schema's `x-cli` extension); `bool_prefix` is the (enable, disable) prefix
/// pair used to name boolean switches.
pub fn synthesize(
    field: &FieldDescriptor,
    custom: Option<&[String]>,
    bool_prefix: &(String, String),
) -> Result<FieldFlags, ConfigurationError> {
    let tokens = match custom {
        Some(raw) => Some(parse_custom(&field.name, raw)?),
        None => None,
    };

    let flags = if field.is_bool() {
        synthesize_bool(field, tokens.as_deref(), bool_prefix)?
    } else {
        FieldFlags {
            field: field.name.clone(),
            flags: vec![synthesize_value(field, tokens.as_deref())?],
            group: None,
        }
    };

    for flag in &flags.flags {
        trace!("Field '{}' registers {:?}", field.name, flag.names());
    }
    Ok(flags)
}

fn parse_custom(field: &str, raw: &[String]) -> Result<Vec<FlagToken>, ConfigurationError> {
    if raw.is_empty() || raw.len() > 2 {
        return Err(ConfigurationError::InvalidArity {
            field: field.to_string(),
            count: raw.len(),
        });
    }
    raw.iter().map(|t| FlagToken::parse(field, t)).collect()
}

fn invalid_combination(field: &str, tokens: &[FlagToken], reason: &str) -> ConfigurationError {
    ConfigurationError::InvalidFlag {
        field: field.to_string(),
        token: tokens
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(" "),
        reason: reason.to_string(),
    }
}

fn synthesize_value(
    field: &FieldDescriptor,
    tokens: Option<&[FlagToken]>,
) -> Result<FlagSpec, ConfigurationError> {
    let default_long = Some(field.name.clone());
    let (short, long, positional) = match tokens {
        None => (None, default_long, false),
        Some([FlagToken::Short(c)]) => (Some(*c), default_long, false),
        Some([FlagToken::Long(l)]) => (None, Some(l.clone()), false),
        Some([FlagToken::Positional(_)]) => (None, None, true),
        Some([FlagToken::Short(c), FlagToken::Long(l)])
        | Some([FlagToken::Long(l), FlagToken::Short(c)]) => (Some(*c), Some(l.clone()), false),
        Some(other) => {
            return Err(invalid_combination(
                &field.name,
                other,
                "two-token specs must be one short and one long flag",
            ))
        }
    };

    let value_name = match tokens {
        Some([FlagToken::Positional(name)]) => name.clone(),
        _ => field.name.to_uppercase(),
    };

    Ok(FlagSpec {
        id: field.name.clone(),
        field: field.name.clone(),
        short,
        long,
        positional,
        action: if field.is_sequence {
            FlagAction::Multiple
        } else {
            FlagAction::Single
        },
        choices: field.field_type.choices(),
        required: field.required,
        help: field.help_text(),
        value_name,
    })
}

/// Names a custom spec gives a boolean: an optional short alias and up to two longs
struct BoolNames {
    short: Option<char>,
    first: Option<String>,
    second: Option<String>,
}

fn bool_names(field: &str, tokens: Option<&[FlagToken]>) -> Result<BoolNames, ConfigurationError> {
    let names = match tokens {
        None => BoolNames {
            short: None,
            first: None,
            second: None,
        },
        Some([FlagToken::Short(c)]) => BoolNames {
            short: Some(*c),
            first: None,
            second: None,
        },
        Some([FlagToken::Long(l)]) => BoolNames {
            short: None,
            first: Some(l.clone()),
            second: None,
        },
        Some([FlagToken::Short(c), FlagToken::Long(l)])
        | Some([FlagToken::Long(l), FlagToken::Short(c)]) => BoolNames {
            short: Some(*c),
            first: Some(l.clone()),
            second: None,
        },
        Some([FlagToken::Long(a), FlagToken::Long(b)]) => BoolNames {
            short: None,
            first: Some(a.clone()),
            second: Some(b.clone()),
        },
        Some(other) => {
            return Err(invalid_combination(
                field,
                other,
                "boolean fields take -x, --name, (-x, --name) or (--enable, --disable)",
            ))
        }
    };
    Ok(names)
}

fn synthesize_bool(
    field: &FieldDescriptor,
    tokens: Option<&[FlagToken]>,
    (enable_prefix, disable_prefix): &(String, String),
) -> Result<FieldFlags, ConfigurationError> {
    let names = bool_names(&field.name, tokens)?;
    let enable_long = format!("{enable_prefix}{}", field.name);
    let disable_long = format!("{disable_prefix}{}", field.name);
    let help = field.help_text();

    match field.bool_default() {
        Some(default) if !field.nullable => {
            let long = match (names.first, names.second) {
                (Some(enable), Some(disable)) => {
                    if default {
                        disable
                    } else {
                        enable
                    }
                }
                (Some(only), None) => only,
                _ if default => disable_long,
                _ => enable_long,
            };
            let flag = FlagSpec {
                id: field.name.clone(),
                field: field.name.clone(),
                short: names.short,
                long: Some(long),
                positional: false,
                action: FlagAction::Switch { value: !default },
                choices: None,
                required: false,
                help: format!("{help} [sets {}={}]", field.name, !default),
                value_name: field.name.to_uppercase(),
            };
            Ok(FieldFlags {
                field: field.name.clone(),
                flags: vec![flag],
                group: None,
            })
        }
        default => {
            let enable = FlagSpec {
                id: bool_arg_id(&field.name, true),
                field: field.name.clone(),
                short: names.short,
                long: Some(names.first.unwrap_or(enable_long)),
                positional: false,
                action: FlagAction::Switch { value: true },
                choices: None,
                required: false,
                help: format!("{help} [sets {}=true]", field.name),
                value_name: field.name.to_uppercase(),
            };
            let disable = FlagSpec {
                id: bool_arg_id(&field.name, false),
                field: field.name.clone(),
                short: None,
                long: Some(names.second.unwrap_or(disable_long)),
                positional: false,
                action: FlagAction::Switch { value: false },
                choices: None,
                required: false,
                help: format!("Set {} to false", field.name),
                value_name: field.name.to_uppercase(),
            };

            let flags: Vec<FlagSpec> = [enable, disable]
                .into_iter()
                .filter(|f| match f.action {
                    FlagAction::Switch { value } => default != Some(value),
                    _ => true,
                })
                .collect();

            let group = BoolGroup {
                id: field.name.clone(),
                args: flags.iter().map(|f| f.id.clone()).collect(),
                required: field.required,
            };
            Ok(FieldFlags {
                field: field.name.clone(),
                flags,
                group: Some(group),
            })
        }
    }
}

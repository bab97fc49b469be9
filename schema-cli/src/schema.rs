//! Field descriptor extraction
//!
//! Walks a model's JSON Schema (as produced by `schemars::schema_for!`, or
//! written by hand) and normalizes every property into a [`FieldDescriptor`].
//! Wrappers emitted by schemars are unwrapped on the way:
//!
//! - `$ref` into `definitions` / `$defs`
//! - single-element `allOf` (schemars wraps documented `$ref` fields this way)
//! - `anyOf` / `oneOf` with a `{"type": "null"}` branch (`Option<T>` fields)
//! - `type: [T, "null"]`
//! - `oneOf` whose branches are all literal `enum` / `const` values
//!   (enums with documented variants)

use indexmap::IndexMap;
use schemars::JsonSchema;
use serde_json::Value;
use std::fmt;
use thiserror::Error;

use crate::error::{ErrorSeverity, Severity};

/// JSON Schema extension key carrying custom flag tokens for a property
pub const CLI_EXTENSION_KEY: &str = "x-cli";

const MAX_REF_DEPTH: usize = 32;

/// Errors raised while extracting field descriptors from a schema
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SchemaError {
    #[error("Model schema must be a JSON object")]
    NotAnObject,

    #[error("Failed to produce schema for model: {message}")]
    Generation { message: String },

    #[error("Unresolvable reference '{reference}' for field '{field}'")]
    UnresolvedRef { field: String, reference: String },

    #[error("Unsupported schema type '{schema_type}' for field '{field}'")]
    UnsupportedType { field: String, schema_type: String },

    #[error("Invalid 'x-cli' annotation for field '{field}': {message}")]
    InvalidExtension { field: String, message: String },
}

impl Severity for SchemaError {
    fn severity(&self) -> ErrorSeverity {
        ErrorSeverity::Critical
    }
}

/// Scalar type of a field (the element type for sequences)
#[derive(Debug, Clone, PartialEq)]
pub enum FieldType {
    String,
    Integer,
    Number,
    Boolean,
    /// Closed set of allowed values, in declaration order
    Enum(Vec<Value>),
}

impl FieldType {
    /// Allowed values rendered the way they are typed on the command line
    pub fn choices(&self) -> Option<Vec<String>> {
        match self {
            FieldType::Enum(values) => Some(values.iter().map(choice_label).collect()),
            _ => None,
        }
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldType::String => write!(f, "string"),
            FieldType::Integer => write!(f, "integer"),
            FieldType::Number => write!(f, "number"),
            FieldType::Boolean => write!(f, "boolean"),
            FieldType::Enum(_) => write!(f, "choice"),
        }
    }
}

/// Render a JSON literal as a command-line token
pub fn choice_label(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Normalized metadata of one model field
#[derive(Debug, Clone, PartialEq)]
pub struct FieldDescriptor {
    pub name: String,
    pub field_type: FieldType,
    /// List or set valued field, parsed with variadic arity
    pub is_sequence: bool,
    /// Set-like sequence (`uniqueItems`)
    pub unique_items: bool,
    /// The type admits `null` (an `Option<T>` field)
    pub nullable: bool,
    pub required: bool,
    /// `None` means "no default"; `Some(Value::Null)` is an explicit null default
    pub default: Option<Value>,
    pub description: Option<String>,
    /// Custom flag tokens from the `x-cli` extension
    pub custom_flags: Option<Vec<String>>,
}

impl FieldDescriptor {
    /// Boolean field with a concrete, non-null default
    pub fn bool_default(&self) -> Option<bool> {
        match (&self.field_type, self.is_sequence, &self.default) {
            (FieldType::Boolean, false, Some(Value::Bool(b))) => Some(*b),
            _ => None,
        }
    }

    pub fn is_bool(&self) -> bool {
        self.field_type == FieldType::Boolean && !self.is_sequence
    }

    /// Copy of this descriptor with `value` as its default; never required
    pub fn with_override(&self, value: Value) -> Self {
        Self {
            default: Some(value),
            required: false,
            ..self.clone()
        }
    }

    /// Human readable type, e.g. `integer` or `list of string`
    pub fn type_label(&self) -> String {
        let scalar = match self.field_type.choices() {
            Some(choices) => format!("one of {}", choices.join("|")),
            None => self.field_type.to_string(),
        };
        match (self.is_sequence, self.unique_items) {
            (true, true) => format!("set of {scalar}"),
            (true, false) => format!("list of {scalar}"),
            _ => scalar,
        }
    }

    /// Help text: description followed by a type/default/required annotation
    pub fn help_text(&self) -> String {
        let status = match &self.default {
            _ if self.required => "required".to_string(),
            Some(value) => format!("default: {}", render_default(value)),
            None => "optional".to_string(),
        };
        let annotation = format!("(type: {}, {status})", self.type_label());
        match self.description.as_deref().map(str::trim) {
            Some(desc) if !desc.is_empty() => format!("{desc} {annotation}"),
            _ => annotation,
        }
    }
}

fn render_default(value: &Value) -> String {
    match value {
        Value::Null => "none".to_string(),
        Value::Array(items) => items.iter().map(choice_label).collect::<Vec<_>>().join(" "),
        other => choice_label(other),
    }
}

/// Ordered field descriptors of one model plus its raw JSON Schema
#[derive(Debug, Clone)]
pub struct Schema {
    title: Option<String>,
    description: Option<String>,
    fields: IndexMap<String, FieldDescriptor>,
    raw: Value,
}

impl Schema {
    /// Extract the schema of a type deriving `JsonSchema`
    pub fn for_model<M: JsonSchema>() -> Result<Self, SchemaError> {
        let root = schemars::schema_for!(M);
        let value = serde_json::to_value(root).map_err(|e| SchemaError::Generation {
            message: e.to_string(),
        })?;
        Self::from_json_schema(value)
    }

    /// Extract descriptors from a JSON Schema document describing an object
    pub fn from_json_schema(raw: Value) -> Result<Self, SchemaError> {
        let root = raw.as_object().ok_or(SchemaError::NotAnObject)?;

        let required: Vec<&str> = root
            .get("required")
            .and_then(Value::as_array)
            .map(|arr| arr.iter().filter_map(Value::as_str).collect())
            .unwrap_or_default();

        let mut fields = IndexMap::new();
        if let Some(properties) = root.get("properties").and_then(Value::as_object) {
            for (name, property) in properties {
                let descriptor =
                    extract_field(name, property, &raw, required.contains(&name.as_str()))?;
                fields.insert(name.clone(), descriptor);
            }
        }

        Ok(Self {
            title: root.get("title").and_then(Value::as_str).map(String::from),
            description: root
                .get("description")
                .and_then(Value::as_str)
                .map(String::from),
            fields,
            raw,
        })
    }

    /// Model name used in messages
    pub fn name(&self) -> &str {
        self.title.as_deref().unwrap_or("Model")
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn fields(&self) -> impl Iterator<Item = &FieldDescriptor> {
        self.fields.values()
    }

    pub fn field(&self, name: &str) -> Option<&FieldDescriptor> {
        self.fields.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.fields.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// The JSON Schema document the descriptors were extracted from
    pub fn raw(&self) -> &Value {
        &self.raw
    }
}

/// Shape of a property after unwrapping references and nullable wrappers
struct Shape {
    field_type: FieldType,
    is_sequence: bool,
    unique_items: bool,
    nullable: bool,
}

impl Shape {
    fn scalar(field_type: FieldType) -> Self {
        Self {
            field_type,
            is_sequence: false,
            unique_items: false,
            nullable: false,
        }
    }
}

fn extract_field(
    name: &str,
    property: &Value,
    root: &Value,
    listed_required: bool,
) -> Result<FieldDescriptor, SchemaError> {
    let shape = resolve_shape(name, property, root, 0)?;
    let default = property.get("default").cloned();
    let description = find_description(property, root);
    let custom_flags = extract_custom_flags(name, property)?;

    // A nullable type alone does not make a field optional; only a default does.
    let required = default.is_none() && (listed_required || shape.nullable);

    Ok(FieldDescriptor {
        name: name.to_string(),
        field_type: shape.field_type,
        is_sequence: shape.is_sequence,
        unique_items: shape.unique_items,
        nullable: shape.nullable,
        required,
        default,
        description,
        custom_flags,
    })
}

fn resolve_shape(
    field: &str,
    node: &Value,
    root: &Value,
    depth: usize,
) -> Result<Shape, SchemaError> {
    let Some(obj) = node.as_object() else {
        // `true` / `{}` schemas accept anything; treat as string
        return Ok(Shape::scalar(FieldType::String));
    };

    if let Some(reference) = obj.get("$ref").and_then(Value::as_str) {
        let target = reference
            .strip_prefix('#')
            .and_then(|pointer| root.pointer(pointer))
            .filter(|_| depth < MAX_REF_DEPTH)
            .ok_or_else(|| SchemaError::UnresolvedRef {
                field: field.to_string(),
                reference: reference.to_string(),
            })?;
        return resolve_shape(field, target, root, depth + 1);
    }

    if let Some(all) = obj.get("allOf").and_then(Value::as_array) {
        return match all.as_slice() {
            [single] => resolve_shape(field, single, root, depth + 1),
            _ => Err(unsupported(field, "allOf")),
        };
    }

    for key in ["anyOf", "oneOf"] {
        if let Some(variants) = obj.get(key).and_then(Value::as_array) {
            return resolve_union(field, key, variants, root, depth);
        }
    }

    let (type_name, nullable) = declared_type(field, obj)?;

    if let Some(values) = obj.get("enum").and_then(Value::as_array) {
        let has_null = values.iter().any(Value::is_null);
        let values = values.iter().filter(|v| !v.is_null()).cloned().collect();
        let mut shape = Shape::scalar(FieldType::Enum(values));
        shape.nullable = nullable || has_null;
        return Ok(shape);
    }
    if let Some(value) = obj.get("const") {
        let mut shape = Shape::scalar(FieldType::Enum(vec![value.clone()]));
        shape.nullable = nullable;
        return Ok(shape);
    }

    let mut shape = match type_name.as_deref() {
        None | Some("string") => Shape::scalar(FieldType::String),
        Some("integer") => Shape::scalar(FieldType::Integer),
        Some("number") => Shape::scalar(FieldType::Number),
        Some("boolean") => Shape::scalar(FieldType::Boolean),
        Some("array") => {
            let any = Value::Bool(true);
            let items = obj.get("items").unwrap_or(&any);
            if items.is_array() {
                return Err(unsupported(field, "tuple array"));
            }
            let element = resolve_shape(field, items, root, depth + 1)?;
            if element.is_sequence {
                return Err(unsupported(field, "nested array"));
            }
            Shape {
                field_type: element.field_type,
                is_sequence: true,
                unique_items: obj
                    .get("uniqueItems")
                    .and_then(Value::as_bool)
                    .unwrap_or(false),
                nullable: false,
            }
        }
        Some(other) => return Err(unsupported(field, other)),
    };
    shape.nullable = nullable;
    Ok(shape)
}

fn resolve_union(
    field: &str,
    key: &str,
    variants: &[Value],
    root: &Value,
    depth: usize,
) -> Result<Shape, SchemaError> {
    let (nulls, others): (Vec<&Value>, Vec<&Value>) =
        variants.iter().partition(|v| is_null_schema(v));
    let nullable = !nulls.is_empty();

    if others.len() > 1 && others.iter().all(|v| is_literal_schema(v)) {
        let values = others
            .iter()
            .flat_map(|v| literal_values(v))
            .collect::<Vec<_>>();
        let mut shape = Shape::scalar(FieldType::Enum(values));
        shape.nullable = nullable;
        return Ok(shape);
    }

    match others.as_slice() {
        [single] => {
            let mut shape = resolve_shape(field, single, root, depth + 1)?;
            shape.nullable |= nullable;
            Ok(shape)
        }
        _ => Err(unsupported(field, key)),
    }
}

/// Read `type`, accepting `"T"` or `["T", "null"]`
fn declared_type(
    field: &str,
    obj: &serde_json::Map<String, Value>,
) -> Result<(Option<String>, bool), SchemaError> {
    match obj.get("type") {
        None => Ok((None, false)),
        Some(Value::String(t)) if t == "null" => Err(unsupported(field, "null")),
        Some(Value::String(t)) => Ok((Some(t.clone()), false)),
        Some(Value::Array(types)) => {
            let names: Vec<&str> = types.iter().filter_map(Value::as_str).collect();
            let nullable = names.contains(&"null");
            let concrete: Vec<&str> = names.into_iter().filter(|t| *t != "null").collect();
            match concrete.as_slice() {
                [single] => Ok((Some(single.to_string()), nullable)),
                [] => Err(unsupported(field, "null")),
                many => Err(unsupported(field, &many.join("|"))),
            }
        }
        Some(other) => Err(unsupported(field, &other.to_string())),
    }
}

fn is_null_schema(value: &Value) -> bool {
    value.get("type").and_then(Value::as_str) == Some("null")
}

fn is_literal_schema(value: &Value) -> bool {
    value.get("const").is_some() || value.get("enum").is_some_and(Value::is_array)
}

fn literal_values(value: &Value) -> Vec<Value> {
    if let Some(c) = value.get("const") {
        return vec![c.clone()];
    }
    value
        .get("enum")
        .and_then(Value::as_array)
        .map(|values| values.iter().filter(|v| !v.is_null()).cloned().collect())
        .unwrap_or_default()
}

/// Description from the property, falling back to a referenced definition
fn find_description(property: &Value, root: &Value) -> Option<String> {
    if let Some(desc) = property.get("description").and_then(Value::as_str) {
        return Some(desc.to_string());
    }
    let reference = property
        .get("$ref")
        .or_else(|| {
            property
                .get("allOf")
                .and_then(Value::as_array)
                .and_then(|all| all.first())
                .and_then(|first| first.get("$ref"))
        })
        .and_then(Value::as_str)?;
    root.pointer(reference.strip_prefix('#')?)?
        .get("description")
        .and_then(Value::as_str)
        .map(String::from)
}

fn extract_custom_flags(name: &str, property: &Value) -> Result<Option<Vec<String>>, SchemaError> {
    let invalid = |message: &str| SchemaError::InvalidExtension {
        field: name.to_string(),
        message: message.to_string(),
    };

    match property.get(CLI_EXTENSION_KEY) {
        None => Ok(None),
        Some(Value::String(token)) => Ok(Some(vec![token.clone()])),
        Some(Value::Array(tokens)) => tokens
            .iter()
            .map(|t| {
                t.as_str()
                    .map(String::from)
                    .ok_or_else(|| invalid("expected an array of strings"))
            })
            .collect::<Result<Vec<_>, _>>()
            .map(Some),
        Some(_) => Err(invalid("expected a string or an array of strings")),
    }
}

fn unsupported(field: &str, schema_type: &str) -> SchemaError {
    SchemaError::UnsupportedType {
        field: field.to_string(),
        schema_type: schema_type.to_string(),
    }
}

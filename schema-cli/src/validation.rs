//! Model construction and validation
//!
//! The parsed field map is checked against the model's JSON Schema with
//! `jsonschema` (collecting every offending field) and then deserialized into
//! the typed model with serde.

use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::trace;

use crate::conversion::ParsedArgs;
use crate::error::{FieldError, ValidationError};
use crate::schema::Schema;

/// Compiled validator for one model schema
pub struct ModelValidator {
    model: String,
    validator: jsonschema::Validator,
}

impl ModelValidator {
    pub fn new(schema: &Schema) -> Result<Self, ValidationError> {
        let validator = jsonschema::validator_for(schema.raw()).map_err(|e| {
            ValidationError::message(schema.name(), format!("Invalid model schema: {e}"))
        })?;
        Ok(Self {
            model: schema.name().to_string(),
            validator,
        })
    }

    /// Check `instance`, reporting every violation
    pub fn check(&self, instance: &Value) -> Result<(), ValidationError> {
        let errors: Vec<FieldError> = self
            .validator
            .iter_errors(instance)
            .map(|e| FieldError {
                path: e.instance_path.to_string(),
                message: e.to_string(),
            })
            .collect();

        if errors.is_empty() {
            Ok(())
        } else {
            Err(ValidationError::new(self.model.clone(), errors))
        }
    }
}

/// Validate `values` against `schema` and build the typed model
pub fn construct<M: DeserializeOwned>(schema: &Schema, values: ParsedArgs) -> Result<M, ValidationError> {
    let instance = Value::Object(values);
    trace!("Constructing {} from {}", schema.name(), instance);

    ModelValidator::new(schema)?.check(&instance)?;
    serde_json::from_value(instance)
        .map_err(|e| ValidationError::message(schema.name(), e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use schemars::JsonSchema;
    use serde::Deserialize;
    use serde_json::json;

    #[derive(Debug, Deserialize, JsonSchema, PartialEq)]
    struct Options {
        input_file: String,
        max_records: u32,
    }

    fn values(value: Value) -> ParsedArgs {
        match value {
            Value::Object(map) => map,
            _ => unreachable!(),
        }
    }

    #[test]
    fn test_construct() {
        let schema = Schema::for_model::<Options>().unwrap();
        let options: Options = construct(
            &schema,
            values(json!({"input_file": "f.txt", "max_records": 10})),
        )
        .unwrap();
        assert_eq!(
            options,
            Options {
                input_file: "f.txt".to_string(),
                max_records: 10
            }
        );
    }

    #[test]
    fn test_construct_reports_each_field() {
        let schema = Schema::for_model::<Options>().unwrap();
        let err = construct::<Options>(
            &schema,
            values(json!({"input_file": 3, "max_records": -1})),
        )
        .unwrap_err();

        assert_eq!(err.model, "Options");
        let paths: Vec<&str> = err.errors.iter().map(|e| e.path.as_str()).collect();
        assert!(paths.contains(&"/input_file"));
        assert!(paths.contains(&"/max_records"));
    }

    #[test]
    fn test_construct_missing_field() {
        let schema = Schema::for_model::<Options>().unwrap();
        let err = construct::<Options>(&schema, values(json!({"input_file": "f"}))).unwrap_err();
        assert!(err.to_string().contains("max_records"));
    }

    #[test]
    fn test_enum_membership() {
        let schema = Schema::from_json_schema(json!({
            "title": "Job",
            "type": "object",
            "properties": {"state": {"enum": ["RUNNING", "FAILED"]}},
            "required": ["state"]
        }))
        .unwrap();
        let validator = ModelValidator::new(&schema).unwrap();
        assert!(validator.check(&json!({"state": "RUNNING"})).is_ok());
        assert!(validator.check(&json!({"state": "BAD_STATE"})).is_err());
    }
}

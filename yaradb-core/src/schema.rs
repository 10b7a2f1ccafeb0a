// yaradb-core/src/schema.rs
// JSON-Schema enforcement for table bodies

use serde_json::{Map, Value};

use crate::error::{Result, YaraDbError};

/// Validate a document body against a table's declared schema.
///
/// Compilation and validation failures both surface as `Validation`;
/// schemas are small and tables few, so compiling per call keeps the
/// table metadata free of non-serializable compiled state.
pub fn validate_body(schema: &Value, body: &Map<String, Value>) -> Result<()> {
    let validator = jsonschema::validator_for(schema)
        .map_err(|err| YaraDbError::Validation(format!("invalid table schema: {err}")))?;

    let instance = Value::Object(body.clone());
    validator
        .validate(&instance)
        .map_err(|err| YaraDbError::Validation(format!("schema validation failed: {err}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn map(value: Value) -> Map<String, Value> {
        value.as_object().unwrap().clone()
    }

    fn users_schema(strict: bool) -> Value {
        let mut schema = json!({
            "type": "object",
            "required": ["username", "age"],
            "properties": {
                "username": {"type": "string"},
                "age": {"type": "integer"}
            }
        });
        if strict {
            schema["additionalProperties"] = json!(false);
        }
        schema
    }

    #[test]
    fn test_valid_body_passes() {
        let schema = users_schema(true);
        let body = map(json!({"username": "alice", "age": 25}));
        assert!(validate_body(&schema, &body).is_ok());
    }

    #[test]
    fn test_strict_rejects_extra_fields() {
        let schema = users_schema(true);
        let body = map(json!({"username": "bob", "age": 30, "city": "London"}));
        let err = validate_body(&schema, &body).unwrap_err();
        assert!(matches!(err, YaraDbError::Validation(_)));
    }

    #[test]
    fn test_free_schema_allows_extra_fields() {
        let schema = users_schema(false);
        let body = map(json!({"username": "bob", "age": 30, "city": "London"}));
        assert!(validate_body(&schema, &body).is_ok());
    }

    #[test]
    fn test_missing_required_field_fails() {
        let schema = users_schema(false);
        let body = map(json!({"username": "carol"}));
        assert!(validate_body(&schema, &body).is_err());
    }

    #[test]
    fn test_wrong_type_fails() {
        let schema = users_schema(false);
        let body = map(json!({"username": "dave", "age": "old"}));
        assert!(validate_body(&schema, &body).is_err());
    }

    #[test]
    fn test_malformed_schema_is_validation_error() {
        let schema = json!({"type": 12});
        let body = map(json!({}));
        assert!(matches!(
            validate_body(&schema, &body),
            Err(YaraDbError::Validation(_))
        ));
    }
}

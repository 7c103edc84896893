//! JSON schema builders for MCP tools.

use serde_json::{Map, Value, json};

/// Build an object schema from a `json!` properties map and required keys.
pub(crate) fn object_schema(properties: Value, required: &[&str]) -> Map<String, Value> {
    let mut schema = Map::new();
    schema.insert("type".into(), Value::String("object".into()));
    schema.insert("properties".into(), properties);
    if !required.is_empty() {
        schema.insert(
            "required".into(),
            Value::Array(
                required
                    .iter()
                    .map(|&key| Value::String(key.into()))
                    .collect(),
            ),
        );
    }
    schema.insert("additionalProperties".into(), Value::Bool(false));
    schema
}

/// Schema representing an empty object (used for parameterless tools).
pub(crate) fn empty_object_schema() -> Map<String, Value> {
    object_schema(json!({}), &[])
}

pub(crate) fn string_prop(description: &str) -> Value {
    json!({ "type": "string", "description": description })
}

pub(crate) fn boolean_prop(description: &str) -> Value {
    json!({ "type": "boolean", "description": description })
}

pub(crate) fn integer_prop(description: &str) -> Value {
    json!({ "type": "integer", "description": description })
}

/// Free-form JSON object property, used for query DSL and settings bodies the
/// cluster validates itself.
pub(crate) fn object_prop(description: &str) -> Value {
    json!({ "type": "object", "description": description })
}

pub(crate) fn string_array_prop(description: &str) -> Value {
    json!({ "type": "array", "items": { "type": "string" }, "description": description })
}

pub(crate) fn object_array_prop(description: &str) -> Value {
    json!({ "type": "array", "items": { "type": "object" }, "description": description })
}

pub(crate) fn number_array_prop(description: &str) -> Value {
    json!({ "type": "array", "items": { "type": "number" }, "description": description })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn object_schema_lists_required_keys_and_rejects_extras() {
        let schema = object_schema(
            json!({ "index": string_prop("Index name") }),
            &["index"],
        );
        assert_eq!(schema["type"], "object");
        assert_eq!(schema["required"], json!(["index"]));
        assert_eq!(schema["additionalProperties"], json!(false));
    }

    #[test]
    fn empty_object_schema_has_no_required_list() {
        let schema = empty_object_schema();
        assert!(!schema.contains_key("required"));
    }
}

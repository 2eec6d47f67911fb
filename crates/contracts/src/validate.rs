//! Schema validation: turn an untyped candidate into a typed record.
//!
//! Validation is purely structural: presence, JSON type, literal sets and
//! minimum lengths. Every violation is collected (not just the first) so the
//! retry prompt can tell the agent everything that was wrong at once.

use serde_json::{Map, Value};

use crate::schema::{FieldType, Schema, StructuredOutput};
use crate::{FieldViolation, ValidationError};

/// Validate `candidate` against `T`'s schema and deserialize it.
pub fn validate<T: StructuredOutput>(candidate: &Value) -> Result<T, ValidationError> {
    let schema = T::schema();
    let cleaned = validate_against(candidate, &schema)?;
    serde_json::from_value(cleaned).map_err(|e| ValidationError {
        type_name: schema.name.clone(),
        violations: vec![FieldViolation::new("$", e.to_string())],
    })
}

/// Validate `candidate` against a runtime schema.
///
/// Returns the candidate with null optional fields removed, ready for
/// deserialization.
pub fn validate_against(candidate: &Value, schema: &Schema) -> Result<Value, ValidationError> {
    let mut violations = Vec::new();
    let cleaned = check_object(candidate, schema, "", &mut violations);
    if violations.is_empty() {
        Ok(cleaned)
    } else {
        Err(ValidationError {
            type_name: schema.name.clone(),
            violations,
        })
    }
}

fn check_object(
    value: &Value,
    schema: &Schema,
    path: &str,
    violations: &mut Vec<FieldViolation>,
) -> Value {
    let Some(object) = value.as_object() else {
        violations.push(FieldViolation::new(
            display_path(path),
            format!("expected object, got {}", json_type(value)),
        ));
        return value.clone();
    };

    let mut cleaned: Map<String, Value> = object
        .iter()
        .filter(|(key, _)| schema.get(key).is_none())
        .map(|(key, v)| (key.clone(), v.clone()))
        .collect();

    for field in &schema.fields {
        let field_path = join(path, &field.name);
        match object.get(&field.name) {
            None | Some(Value::Null) => {
                if field.required {
                    violations.push(FieldViolation::new(field_path, "field required"));
                }
            }
            Some(v) => {
                let checked = check_value(v, &field.ty, &field_path, violations);
                cleaned.insert(field.name.clone(), checked);
            }
        }
    }

    Value::Object(cleaned)
}

fn check_value(
    value: &Value,
    ty: &FieldType,
    path: &str,
    violations: &mut Vec<FieldViolation>,
) -> Value {
    match ty {
        FieldType::Bool if value.is_boolean() => value.clone(),
        FieldType::Integer if value.is_i64() || value.is_u64() => value.clone(),
        FieldType::Number if value.is_number() => value.clone(),
        FieldType::String { min_len } => match value.as_str() {
            Some(s) => {
                if s.chars().count() < *min_len {
                    violations.push(FieldViolation::new(
                        path,
                        format!("must be at least {min_len} characters, got {}", s.chars().count()),
                    ));
                }
                value.clone()
            }
            None => mismatch(value, ty, path, violations),
        },
        FieldType::OneOf(choices) => match value.as_str() {
            Some(s) if choices.iter().any(|c| c == s) => value.clone(),
            Some(s) => {
                violations.push(FieldViolation::new(
                    path,
                    format!("must be one of [{}], got \"{s}\"", choices.join(", ")),
                ));
                value.clone()
            }
            None => mismatch(value, ty, path, violations),
        },
        FieldType::List { item, min_len } => match value.as_array() {
            Some(items) => {
                if items.len() < *min_len {
                    violations.push(FieldViolation::new(
                        path,
                        format!("must contain at least {min_len} item(s), got {}", items.len()),
                    ));
                }
                Value::Array(
                    items
                        .iter()
                        .enumerate()
                        .map(|(i, v)| check_value(v, item, &format!("{path}[{i}]"), violations))
                        .collect(),
                )
            }
            None => mismatch(value, ty, path, violations),
        },
        FieldType::Object(schema) => check_object(value, schema, path, violations),
        _ => mismatch(value, ty, path, violations),
    }
}

fn mismatch(
    value: &Value,
    ty: &FieldType,
    path: &str,
    violations: &mut Vec<FieldViolation>,
) -> Value {
    violations.push(FieldViolation::new(
        path,
        format!("expected {}, got {}", ty.type_name(), json_type(value)),
    ));
    value.clone()
}

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(n) if n.is_f64() => "number",
        Value::Number(_) => "integer",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

fn join(path: &str, field: &str) -> String {
    if path.is_empty() {
        field.to_string()
    } else {
        format!("{path}.{field}")
    }
}

fn display_path(path: &str) -> &str {
    if path.is_empty() { "$" } else { path }
}

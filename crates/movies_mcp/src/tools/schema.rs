//! Tool input schemas and argument validation.
//!
//! Every tool registers an [`InputSchema`]: an ordered field list from which
//! the registry derives the JSON Schema served by `tools/list` and the
//! decoder that collapses the wire's untyped arguments map into a clean,
//! coerced map before the handler runs. Raw untyped maps never travel past
//! this boundary.
//!
//! Validation rules:
//! - required fields must be present and non-null;
//! - numeric fields accept integer, floating-point, and numeric-string
//!   forms, converted in that order;
//! - string fields are trimmed for validation only, never mutated;
//! - a scalar string is accepted where a string array is declared;
//! - `minimum`/`maximum`/`enum` are enforced where declared;
//! - defaults are injected for absent optional fields;
//! - unknown fields are dropped, not rejected.

use movies_domain::{DomainError, Result};
use serde_json::{Map, Value};

/// Field type of a tool input property.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    String,
    Integer,
    Number,
    Boolean,
    /// Array of strings; a bare string is accepted as a one-element array.
    StringArray,
    /// Opaque object, passed through uncoerced.
    Object,
    /// Array of opaque objects, passed through uncoerced.
    ObjectArray,
}

impl FieldKind {
    fn json_type(&self) -> &'static str {
        match self {
            Self::String => "string",
            Self::Integer => "integer",
            Self::Number => "number",
            Self::Boolean => "boolean",
            Self::StringArray | Self::ObjectArray => "array",
            Self::Object => "object",
        }
    }
}

/// One declared input property.
#[derive(Debug, Clone)]
pub struct FieldSpec {
    name: &'static str,
    kind: FieldKind,
    description: &'static str,
    required: bool,
    default: Option<Value>,
    minimum: Option<f64>,
    maximum: Option<f64>,
    enum_values: Option<Vec<&'static str>>,
}

impl FieldSpec {
    fn new(name: &'static str, kind: FieldKind, description: &'static str) -> Self {
        Self {
            name,
            kind,
            description,
            required: false,
            default: None,
            minimum: None,
            maximum: None,
            enum_values: None,
        }
    }

    pub fn string(name: &'static str, description: &'static str) -> Self {
        Self::new(name, FieldKind::String, description)
    }

    pub fn integer(name: &'static str, description: &'static str) -> Self {
        Self::new(name, FieldKind::Integer, description)
    }

    pub fn number(name: &'static str, description: &'static str) -> Self {
        Self::new(name, FieldKind::Number, description)
    }

    pub fn boolean(name: &'static str, description: &'static str) -> Self {
        Self::new(name, FieldKind::Boolean, description)
    }

    pub fn string_array(name: &'static str, description: &'static str) -> Self {
        Self::new(name, FieldKind::StringArray, description)
    }

    pub fn object(name: &'static str, description: &'static str) -> Self {
        Self::new(name, FieldKind::Object, description)
    }

    pub fn object_array(name: &'static str, description: &'static str) -> Self {
        Self::new(name, FieldKind::ObjectArray, description)
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn default_value(mut self, value: impl Into<Value>) -> Self {
        self.default = Some(value.into());
        self
    }

    pub fn minimum(mut self, min: f64) -> Self {
        self.minimum = Some(min);
        self
    }

    pub fn maximum(mut self, max: f64) -> Self {
        self.maximum = Some(max);
        self
    }

    pub fn one_of(mut self, values: &[&'static str]) -> Self {
        self.enum_values = Some(values.to_vec());
        self
    }
}

/// Ordered input schema for one tool.
#[derive(Debug, Clone, Default)]
pub struct InputSchema {
    fields: Vec<FieldSpec>,
}

impl InputSchema {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn field(mut self, spec: FieldSpec) -> Self {
        self.fields.push(spec);
        self
    }

    /// The JSON Schema object served by `tools/list`.
    pub fn to_value(&self) -> Value {
        let mut properties = Map::new();
        let mut required = Vec::new();

        for field in &self.fields {
            let mut prop = Map::new();
            prop.insert("type".to_string(), Value::from(field.kind.json_type()));
            prop.insert("description".to_string(), Value::from(field.description));
            if field.kind == FieldKind::StringArray {
                prop.insert("items".to_string(), serde_json::json!({"type": "string"}));
            }
            if field.kind == FieldKind::ObjectArray {
                prop.insert("items".to_string(), serde_json::json!({"type": "object"}));
            }
            if let Some(ref default) = field.default {
                prop.insert("default".to_string(), default.clone());
            }
            if let Some(min) = field.minimum {
                prop.insert("minimum".to_string(), number(min, field.kind));
            }
            if let Some(max) = field.maximum {
                prop.insert("maximum".to_string(), number(max, field.kind));
            }
            if let Some(ref values) = field.enum_values {
                prop.insert(
                    "enum".to_string(),
                    Value::Array(values.iter().map(|v| Value::from(*v)).collect()),
                );
            }
            properties.insert(field.name.to_string(), Value::Object(prop));
            if field.required {
                required.push(Value::from(field.name));
            }
        }

        let mut schema = Map::new();
        schema.insert("type".to_string(), Value::from("object"));
        schema.insert("properties".to_string(), Value::Object(properties));
        if !required.is_empty() {
            schema.insert("required".to_string(), Value::Array(required));
        }
        Value::Object(schema)
    }

    /// Validate and coerce an untyped arguments value into a clean map
    /// containing only declared fields.
    pub fn validate(&self, args: &Value) -> Result<Map<String, Value>> {
        let source = match args {
            Value::Null => Map::new(),
            Value::Object(map) => map.clone(),
            _ => {
                return Err(DomainError::validation(
                    "tool arguments must be an object",
                ))
            }
        };

        let mut clean = Map::new();
        for field in &self.fields {
            let raw = source.get(field.name);
            let raw = match raw {
                None | Some(Value::Null) => {
                    if field.required {
                        return Err(DomainError::validation(format!(
                            "missing required field: {}",
                            field.name
                        )));
                    }
                    if let Some(ref default) = field.default {
                        clean.insert(field.name.to_string(), default.clone());
                    }
                    continue;
                }
                Some(value) => value,
            };

            let coerced = coerce(field, raw)?;
            check_bounds(field, &coerced)?;
            check_enum(field, &coerced)?;
            clean.insert(field.name.to_string(), coerced);
        }
        Ok(clean)
    }
}

fn number(value: f64, kind: FieldKind) -> Value {
    if kind == FieldKind::Integer && value.fract() == 0.0 {
        Value::from(value as i64)
    } else {
        Value::from(value)
    }
}

fn coerce(field: &FieldSpec, raw: &Value) -> Result<Value> {
    match field.kind {
        FieldKind::String => match raw {
            Value::String(s) => {
                if field.required && s.trim().is_empty() {
                    return Err(DomainError::validation(format!(
                        "field {} must not be empty",
                        field.name
                    )));
                }
                Ok(raw.clone())
            }
            _ => Err(type_error(field, "a string")),
        },
        FieldKind::Integer => coerce_integer(field, raw),
        FieldKind::Number => coerce_number(field, raw),
        FieldKind::Boolean => match raw {
            Value::Bool(_) => Ok(raw.clone()),
            _ => Err(type_error(field, "a boolean")),
        },
        FieldKind::StringArray => match raw {
            Value::String(_) => Ok(Value::Array(vec![raw.clone()])),
            Value::Array(items) => {
                for item in items {
                    if !item.is_string() {
                        return Err(type_error(field, "an array of strings"));
                    }
                }
                Ok(raw.clone())
            }
            _ => Err(type_error(field, "an array of strings")),
        },
        FieldKind::Object => match raw {
            Value::Object(_) => Ok(raw.clone()),
            _ => Err(type_error(field, "an object")),
        },
        FieldKind::ObjectArray => match raw {
            Value::Array(items) => {
                for item in items {
                    if !item.is_object() {
                        return Err(type_error(field, "an array of objects"));
                    }
                }
                Ok(raw.clone())
            }
            _ => Err(type_error(field, "an array of objects")),
        },
    }
}

/// Integer, then float, then numeric string - in that order.
fn coerce_integer(field: &FieldSpec, raw: &Value) -> Result<Value> {
    match raw {
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                return Ok(Value::from(i));
            }
            if let Some(f) = n.as_f64() {
                if f.fract() == 0.0 {
                    return Ok(Value::from(f as i64));
                }
            }
            Err(type_error(field, "an integer"))
        }
        Value::String(s) => {
            let trimmed = s.trim();
            if let Ok(i) = trimmed.parse::<i64>() {
                return Ok(Value::from(i));
            }
            if let Ok(f) = trimmed.parse::<f64>() {
                if f.fract() == 0.0 && f.is_finite() {
                    return Ok(Value::from(f as i64));
                }
            }
            Err(type_error(field, "an integer"))
        }
        _ => Err(type_error(field, "an integer")),
    }
}

fn coerce_number(field: &FieldSpec, raw: &Value) -> Result<Value> {
    match raw {
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                return Ok(Value::from(i as f64));
            }
            n.as_f64()
                .map(Value::from)
                .ok_or_else(|| type_error(field, "a number"))
        }
        Value::String(s) => s
            .trim()
            .parse::<f64>()
            .ok()
            .filter(|f| f.is_finite())
            .map(Value::from)
            .ok_or_else(|| type_error(field, "a number")),
        _ => Err(type_error(field, "a number")),
    }
}

fn check_bounds(field: &FieldSpec, value: &Value) -> Result<()> {
    let numeric = match value {
        Value::Number(n) => n.as_f64(),
        _ => None,
    };
    let Some(numeric) = numeric else {
        return Ok(());
    };
    if let Some(min) = field.minimum {
        if numeric < min {
            return Err(DomainError::validation(format!(
                "field {} must be >= {}",
                field.name, min
            )));
        }
    }
    if let Some(max) = field.maximum {
        if numeric > max {
            return Err(DomainError::validation(format!(
                "field {} must be <= {}",
                field.name, max
            )));
        }
    }
    Ok(())
}

fn check_enum(field: &FieldSpec, value: &Value) -> Result<()> {
    let Some(ref allowed) = field.enum_values else {
        return Ok(());
    };
    let Value::String(s) = value else {
        return Ok(());
    };
    if !allowed.contains(&s.trim()) {
        return Err(DomainError::validation(format!(
            "field {} must be one of: {}",
            field.name,
            allowed.join(", ")
        )));
    }
    Ok(())
}

fn type_error(field: &FieldSpec, expected: &str) -> DomainError {
    DomainError::validation(format!("field {} must be {expected}", field.name))
}

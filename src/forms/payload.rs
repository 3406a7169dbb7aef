use std::collections::BTreeMap;
use std::fmt;

use secrecy::ExposeSecret;
use serde::Serialize;
use serde_json::{Map, Value};

use crate::core::AppError;

use super::normalizer::FieldValue;
use super::schema::{EntitySchema, PayloadRule};

/// Normalized request body for a registration submit.
#[derive(Clone, Serialize, PartialEq)]
#[serde(transparent)]
pub struct Payload(Map<String, Value>);

impl Payload {
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn carries_credentials(&self) -> bool {
        self.0.contains_key("password")
    }
}

impl fmt::Debug for Payload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut map = f.debug_map();
        for (key, value) in &self.0 {
            if key == "password" {
                map.entry(key, &"[REDACTED]");
            } else {
                map.entry(key, value);
            }
        }
        map.finish()
    }
}

pub fn build_payload(
    schema: &EntitySchema,
    values: &BTreeMap<&'static str, FieldValue>,
) -> Result<Payload, AppError> {
    let text_of = |name: &str| -> String {
        match values.get(name) {
            Some(FieldValue::Text(text)) => text.trim().to_string(),
            _ => String::new(),
        }
    };

    let mut body = Map::new();
    for spec in schema.fields() {
        let value = match (spec.payload, values.get(spec.name)) {
            (PayloadRule::Flag, Some(FieldValue::Flag(flag))) => Value::Bool(*flag),
            (PayloadRule::Flag, _) => Value::Bool(false),
            (PayloadRule::Secret, Some(FieldValue::Secret(secret))) => {
                Value::String(secret.expose_secret().clone())
            }
            (PayloadRule::Secret, _) => Value::String(String::new()),
            (PayloadRule::Text, _) => Value::String(text_of(spec.name)),
            (PayloadRule::Code, _) => Value::String(text_of(spec.name).to_uppercase()),
            (PayloadRule::IdString, _) => Value::String(text_of(spec.name)),
            (PayloadRule::Integer, _) => Value::from(parse_integer(spec.label, &text_of(spec.name))?),
            (PayloadRule::OptionalInteger, _) => {
                let raw = text_of(spec.name);
                if raw.is_empty() {
                    continue;
                }
                Value::from(parse_integer(spec.label, &raw)?)
            }
            (PayloadRule::DefaultsTo(primary), _) => {
                let raw = text_of(spec.name);
                if raw.is_empty() {
                    Value::String(text_of(primary))
                } else {
                    Value::String(raw)
                }
            }
        };
        body.insert(spec.name.to_string(), value);
    }
    Ok(Payload(body))
}

fn parse_integer(label: &str, raw: &str) -> Result<i64, AppError> {
    raw.parse::<i64>()
        .map_err(|_| AppError::validation_error(format!("{} must be a whole number", label)))
}

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::core::id_as_string;

/// Accepts an identifier sent either as a JSON number or a string.
pub fn flexible_id<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    id_as_string(&value).ok_or_else(|| serde::de::Error::custom("expected a numeric or string id"))
}

pub fn optional_flexible_id<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.as_ref().and_then(id_as_string))
}

/// One entry of a searchable selector.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Choice {
    pub id: String,
    pub label: String,
}

impl Choice {
    pub fn new(id: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
        }
    }
}

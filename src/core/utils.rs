use serde::de::DeserializeOwned;
use serde_json::Value;

/// Where a record list was found inside a response body.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnvelopeShape {
    TopLevelArray,
    Data,
    DataNamed,
    DataList,
    DataRecords,
    Users,
    SingleObject,
    Unrecognized,
}

impl EnvelopeShape {
    /// `{ "data": [...] }` is the documented envelope, everything else is tolerated.
    pub fn is_canonical(&self) -> bool {
        matches!(self, EnvelopeShape::Data)
    }
}

/// Describes which keys to probe when pulling a list out of a response.
#[derive(Debug, Clone, Copy)]
pub struct ListLookup<'a> {
    pub plural: &'a str,
    pub id_keys: &'a [&'a str],
    pub users_key: bool,
}

pub fn extract_list(body: &Value, lookup: ListLookup<'_>) -> (Vec<Value>, EnvelopeShape) {
    if let Some(items) = body.as_array() {
        return (items.clone(), EnvelopeShape::TopLevelArray);
    }

    let data = body.get("data");
    let candidates = [
        (data, EnvelopeShape::Data),
        (data.and_then(|d| d.get(lookup.plural)), EnvelopeShape::DataNamed),
        (data.and_then(|d| d.get("list")), EnvelopeShape::DataList),
        (data.and_then(|d| d.get("records")), EnvelopeShape::DataRecords),
        (
            body.get("users").filter(|_| lookup.users_key),
            EnvelopeShape::Users,
        ),
    ];
    for (candidate, shape) in candidates {
        if let Some(items) = candidate.and_then(Value::as_array) {
            return (items.clone(), shape);
        }
    }

    let has_id = |value: &Value| {
        value.is_object() && lookup.id_keys.iter().any(|key| value.get(*key).is_some())
    };
    if let Some(single) = data.filter(|d| has_id(d)) {
        return (vec![single.clone()], EnvelopeShape::SingleObject);
    }
    if has_id(body) {
        return (vec![body.clone()], EnvelopeShape::SingleObject);
    }

    (Vec::new(), EnvelopeShape::Unrecognized)
}

/// Decodes every entry that fits `T`; entries that don't are dropped and logged.
pub fn decode_records<T: DeserializeOwned>(items: Vec<Value>) -> Vec<T> {
    items
        .into_iter()
        .filter_map(|item| match serde_json::from_value::<T>(item) {
            Ok(record) => Some(record),
            Err(e) => {
                tracing::warn!(error.message = %e, "skipping malformed record in list response");
                None
            }
        })
        .collect()
}

/// First key in `aliases` holding a non-negative number (or a numeric string).
pub fn first_count(body: &Value, aliases: &[&str]) -> Option<u64> {
    aliases.iter().find_map(|key| match body.get(*key)? {
        Value::Number(n) => n.as_u64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    })
}

/// Reads an identifier that may arrive as a JSON number or string.
pub fn id_as_string(value: &Value) -> Option<String> {
    match value {
        Value::Number(n) => Some(n.to_string()),
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        _ => None,
    }
}

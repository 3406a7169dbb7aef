use secrecy::{ExposeSecret, Secret};

/// How keystrokes for a field are constrained before they reach form state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldClass {
    Text,
    /// Digits only, optionally truncated to a fixed length.
    Digits(Option<usize>),
    Flag,
    Secret,
}

/// Raw value as typed or clicked by the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldInput {
    Text(String),
    Flag(bool),
}

impl From<&str> for FieldInput {
    fn from(value: &str) -> Self {
        FieldInput::Text(value.to_string())
    }
}

impl From<String> for FieldInput {
    fn from(value: String) -> Self {
        FieldInput::Text(value)
    }
}

impl From<bool> for FieldInput {
    fn from(value: bool) -> Self {
        FieldInput::Flag(value)
    }
}

#[derive(Debug)]
pub enum FieldValue {
    Text(String),
    Flag(bool),
    Secret(Secret<String>),
}

impl FieldValue {
    pub fn empty(class: FieldClass) -> Self {
        match class {
            FieldClass::Flag => FieldValue::Flag(false),
            FieldClass::Secret => FieldValue::Secret(Secret::new(String::new())),
            FieldClass::Text | FieldClass::Digits(_) => FieldValue::Text(String::new()),
        }
    }

    /// Text view used by the validator. Flags have none.
    pub fn as_checked_str(&self) -> Option<&str> {
        match self {
            FieldValue::Text(text) => Some(text.as_str()),
            FieldValue::Secret(secret) => Some(secret.expose_secret().as_str()),
            FieldValue::Flag(_) => None,
        }
    }

    pub fn same_as(&self, other: &FieldValue) -> bool {
        match (self, other) {
            (FieldValue::Text(a), FieldValue::Text(b)) => a == b,
            (FieldValue::Flag(a), FieldValue::Flag(b)) => a == b,
            (FieldValue::Secret(a), FieldValue::Secret(b)) => a.expose_secret() == b.expose_secret(),
            _ => false,
        }
    }
}

pub fn digits_only(raw: &str, max_len: Option<usize>) -> String {
    let digits = raw.chars().filter(|c| c.is_ascii_digit());
    match max_len {
        Some(max) => digits.take(max).collect(),
        None => digits.collect(),
    }
}

fn parse_flag(raw: &str) -> bool {
    matches!(
        raw.trim().to_ascii_lowercase().as_str(),
        "true" | "1" | "yes" | "y" | "on"
    )
}

/// Shapes a raw input for storage. Only digit fields and flags are touched.
pub fn normalize(class: FieldClass, input: FieldInput) -> FieldValue {
    match (class, input) {
        (FieldClass::Flag, FieldInput::Flag(flag)) => FieldValue::Flag(flag),
        (FieldClass::Flag, FieldInput::Text(raw)) => FieldValue::Flag(parse_flag(&raw)),
        (FieldClass::Digits(max_len), FieldInput::Text(raw)) => {
            FieldValue::Text(digits_only(&raw, max_len))
        }
        (FieldClass::Secret, FieldInput::Text(raw)) => FieldValue::Secret(Secret::new(raw)),
        (FieldClass::Text, FieldInput::Text(raw)) => FieldValue::Text(raw),
        (FieldClass::Secret, FieldInput::Flag(flag)) => {
            FieldValue::Secret(Secret::new(flag.to_string()))
        }
        (_, FieldInput::Flag(flag)) => FieldValue::Text(flag.to_string()),
    }
}

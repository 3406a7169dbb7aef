use std::collections::BTreeMap;

use chrono::NaiveDate;
use once_cell::sync::Lazy;
use regex::Regex;
use unicode_segmentation::UnicodeSegmentation;

use super::normalizer::FieldValue;
use super::schema::EntitySchema;

static PINCODE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[0-9]{6}$").expect("pincode pattern"));
static PHONE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[0-9]{10}$").expect("phone pattern"));
static GUARDIAN_PHONE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[6-9][0-9]{9}$").expect("guardian phone pattern"));
static EMAIL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email pattern"));
static AADHAR: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[0-9]{12}$").expect("aadhar pattern"));

pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Field name to message. Empty means the form may be submitted.
pub type FieldErrors = BTreeMap<&'static str, String>;

/// A single predicate over a field value.
///
/// `Required` is the only rule that looks at blank values; every other rule
/// is skipped while the field is empty, which is what makes a field optional.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rule {
    Required,
    MinChars(usize),
    MaxGraphemes(usize),
    Phone,
    GuardianPhone,
    Pincode,
    Aadhar,
    Email,
    Url,
    OneOf(&'static [&'static str]),
    IntRange(i64, i64),
    PositiveInt,
    Date,
    PastDate,
}

impl Rule {
    pub fn check(&self, label: &str, raw: &str) -> Result<(), String> {
        let value = raw.trim();
        if value.is_empty() {
            return match self {
                Rule::Required => Err(format!("{} is required", label)),
                _ => Ok(()),
            };
        }

        let ok = match self {
            Rule::Required => true,
            Rule::MinChars(min) => raw.chars().count() >= *min,
            Rule::MaxGraphemes(max) => value.graphemes(true).count() <= *max,
            Rule::Phone => PHONE.is_match(value),
            Rule::GuardianPhone => GUARDIAN_PHONE.is_match(value),
            Rule::Pincode => PINCODE.is_match(value),
            Rule::Aadhar => AADHAR.is_match(value),
            Rule::Email => EMAIL.is_match(value),
            Rule::Url => validator::validate_url(value),
            Rule::OneOf(allowed) => allowed.iter().any(|a| a.eq_ignore_ascii_case(value)),
            Rule::IntRange(min, max) => value
                .parse::<i64>()
                .map(|n| (*min..=*max).contains(&n))
                .unwrap_or(false),
            Rule::PositiveInt => value.parse::<i64>().map(|n| n > 0).unwrap_or(false),
            Rule::Date => NaiveDate::parse_from_str(value, DATE_FORMAT).is_ok(),
            Rule::PastDate => NaiveDate::parse_from_str(value, DATE_FORMAT)
                .map(|date| date < chrono::Local::now().date_naive())
                .unwrap_or(false),
        };

        if ok {
            Ok(())
        } else {
            Err(self.message(label))
        }
    }

    fn message(&self, label: &str) -> String {
        match self {
            Rule::Required => format!("{} is required", label),
            Rule::MinChars(min) => format!("{} must be at least {} characters", label, min),
            Rule::MaxGraphemes(max) => format!("{} must be at most {} characters", label, max),
            Rule::Phone => format!("{} must be exactly 10 digits", label),
            Rule::GuardianPhone => format!(
                "{} must be a valid 10-digit mobile number starting with 6-9",
                label
            ),
            Rule::Pincode => format!("{} must be exactly 6 digits", label),
            Rule::Aadhar => format!("{} must be exactly 12 digits", label),
            Rule::Email => format!("{} must be a valid email address", label),
            Rule::Url => format!("{} must be a valid URL", label),
            Rule::OneOf(allowed) => format!("{} must be one of: {}", label, allowed.join(", ")),
            Rule::IntRange(min, max) => format!("{} must be between {} and {}", label, min, max),
            Rule::PositiveInt => format!("{} must be a positive whole number", label),
            Rule::Date => format!("{} must be a valid date (YYYY-MM-DD)", label),
            Rule::PastDate => format!("{} must be a valid date in the past (YYYY-MM-DD)", label),
        }
    }
}

/// Runs every rule of every field. Pure: the same values always give the same errors.
pub fn validate_fields(
    schema: &EntitySchema,
    values: &BTreeMap<&'static str, FieldValue>,
) -> FieldErrors {
    let mut errors = FieldErrors::new();
    for spec in schema.fields() {
        let Some(raw) = values.get(spec.name).and_then(FieldValue::as_checked_str) else {
            continue;
        };
        if let Some(message) = spec
            .rules
            .iter()
            .find_map(|rule| rule.check(spec.label, raw).err())
        {
            errors.insert(spec.name, message);
        }
    }
    errors
}

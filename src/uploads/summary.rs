use serde_json::Value;

use crate::core::{first_count, id_as_string};

/// Row-level errors shown before the rest are summarised by count.
pub const MAX_SAMPLE_ERRORS: usize = 5;

const VALID_KEYS: &[&str] = &["success_count", "success", "valid_rows"];
const FAILED_KEYS: &[&str] = &["failed_count", "failed", "invalid_rows"];
const TOTAL_KEYS: &[&str] = &["total_count", "total", "total_rows"];
const ROW_KEYS: &[&str] = &["row", "row_number", "line"];

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UploadCounts {
    pub valid: Option<u64>,
    pub failed: Option<u64>,
    pub total: Option<u64>,
}

impl UploadCounts {
    pub fn from_body(body: &Value) -> Self {
        Self {
            valid: first_count(body, VALID_KEYS),
            failed: first_count(body, FAILED_KEYS),
            total: first_count(body, TOTAL_KEYS),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.valid.is_none() && self.failed.is_none() && self.total.is_none()
    }

    pub fn has_failures(&self) -> bool {
        self.failed.map_or(false, |failed| failed > 0)
    }

    /// `Total: 10, Success: 8, Failed: 2`, skipping counts the server left out.
    pub fn describe(&self) -> String {
        [("Total", self.total), ("Success", self.valid), ("Failed", self.failed)]
            .iter()
            .filter_map(|(label, count)| count.map(|count| format!("{}: {}", label, count)))
            .collect::<Vec<_>>()
            .join(", ")
    }
}

fn server_text(body: &Value, key: &str) -> Option<String> {
    body.get(key)
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|text| !text.is_empty())
        .map(str::to_string)
}

fn describe_row_error(item: &Value) -> Option<String> {
    match item {
        Value::String(text) if !text.trim().is_empty() => Some(text.trim().to_string()),
        Value::Object(_) => {
            let message = server_text(item, "message")
                .or_else(|| server_text(item, "error"))
                .or_else(|| {
                    let parts: Vec<String> = item
                        .get("errors")?
                        .as_array()?
                        .iter()
                        .filter_map(Value::as_str)
                        .map(str::to_string)
                        .collect();
                    (!parts.is_empty()).then(|| parts.join("; "))
                })?;
            let row = ROW_KEYS
                .iter()
                .find_map(|key| item.get(*key).and_then(id_as_string));
            Some(match row {
                Some(row) => format!("Row {}: {}", row, message),
                None => message,
            })
        }
        _ => None,
    }
}

/// First few row errors reported under `errors`, rendered as text.
fn sample_errors(body: &Value) -> (Vec<String>, usize) {
    let Some(items) = body.get("errors").and_then(Value::as_array) else {
        return (Vec::new(), 0);
    };
    let described: Vec<String> = items.iter().filter_map(describe_row_error).collect();
    let total = described.len();
    (described.into_iter().take(MAX_SAMPLE_ERRORS).collect(), total)
}

/// What the dry-run endpoint said about a file, for the confirm dialog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadPreview {
    pub file_name: String,
    pub status: String,
    pub message: Option<String>,
    pub counts: UploadCounts,
    pub errors: Vec<String>,
    pub error_total: usize,
}

impl UploadPreview {
    pub fn from_body(file_name: &str, body: &Value) -> Self {
        let status = server_text(body, "status").unwrap_or_else(|| {
            match body.get("success").and_then(Value::as_bool) {
                Some(false) => "invalid".to_string(),
                _ => "valid".to_string(),
            }
        });
        let (errors, error_total) = sample_errors(body);
        Self {
            file_name: file_name.to_string(),
            status,
            message: server_text(body, "message"),
            counts: UploadCounts::from_body(body),
            errors,
            error_total,
        }
    }

    pub fn render(&self) -> String {
        let mut lines = vec![
            format!("File: {}", self.file_name),
            format!("Status: {}", self.status),
        ];
        if let Some(message) = &self.message {
            lines.push(format!("Message: {}", message));
        }
        if !self.counts.is_empty() {
            lines.push(self.counts.describe());
        }
        if !self.errors.is_empty() {
            lines.push("Errors:".to_string());
            lines.extend(self.errors.iter().map(|error| format!("  - {}", error)));
            if self.error_total > self.errors.len() {
                lines.push(format!("  ... and {} more", self.error_total - self.errors.len()));
            }
        }
        lines.join("\n")
    }
}

/// Result of a committed upload, as shown to the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadSummary {
    pub counts: UploadCounts,
    pub message: String,
    pub errors: Vec<String>,
}

impl UploadSummary {
    pub fn from_body(body: &Value) -> Self {
        let counts = UploadCounts::from_body(body);
        let (errors, _) = sample_errors(body);

        let mut message = if counts.is_empty() {
            server_text(body, "message").unwrap_or_else(|| "File uploaded successfully".to_string())
        } else {
            format!("Upload complete. {}", counts.describe())
        };
        if !errors.is_empty() {
            message.push('\n');
            message.push_str(&errors.join("\n"));
        }

        Self {
            counts,
            message,
            errors,
        }
    }

    /// The batch was accepted but some rows were not.
    pub fn is_partial(&self) -> bool {
        self.counts.has_failures()
    }
}

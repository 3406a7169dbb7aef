use std::collections::BTreeMap;

use serde_json::Value;

use crate::api::{ApiClient, UploadFile};
use crate::core::AppError;
use crate::notify::{Notification, Notifier};

use super::summary::{UploadPreview, UploadSummary};
use super::UploadKind;

const UPLOAD_FALLBACK: &str = "Upload failed. Please try again.";
const VALIDATE_FALLBACK: &str = "File validation failed. Please try again.";

/// Asks the user whether a validated file should be committed.
pub trait Confirmer {
    fn confirm(&self, preview: &UploadPreview) -> bool;
}

/// Answers every confirmation the same way.
pub struct AutoConfirm(pub bool);

impl Confirmer for AutoConfirm {
    fn confirm(&self, _preview: &UploadPreview) -> bool {
        self.0
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum UploadOutcome {
    /// Refused before any request: no file, wrong type or missing form fields.
    Rejected { message: String },
    Busy,
    /// The user declined the dry-run result. Nothing was committed.
    Cancelled { preview: UploadPreview },
    Completed { summary: UploadSummary, response: Value },
    Failed { message: String },
}

/// One upload panel: the picked file, its extra form fields and the busy flag.
#[derive(Debug)]
pub struct UploadController {
    kind: UploadKind,
    selected: Option<UploadFile>,
    extra: BTreeMap<&'static str, String>,
    uploading: bool,
}

impl UploadController {
    pub fn new(kind: UploadKind) -> Self {
        Self {
            kind,
            selected: None,
            extra: BTreeMap::new(),
            uploading: false,
        }
    }

    pub fn kind(&self) -> UploadKind {
        self.kind
    }

    pub fn selected(&self) -> Option<&UploadFile> {
        self.selected.as_ref()
    }

    pub fn is_uploading(&self) -> bool {
        self.uploading
    }

    pub fn select(&mut self, file: UploadFile) {
        self.selected = Some(file);
    }

    /// Sets one of the kind's extra form fields. Unknown keys are rejected.
    pub fn set_extra(&mut self, key: &str, value: impl Into<String>) -> Result<(), AppError> {
        let field = self
            .kind
            .spec()
            .extra_fields
            .iter()
            .copied()
            .find(|field| *field == key)
            .ok_or_else(|| {
                AppError::upload_error(format!(
                    "{} uploads do not take a '{}' field",
                    self.kind.as_str(),
                    key
                ))
            })?;
        self.extra.insert(field, value.into());
        Ok(())
    }

    fn checked_file(&self) -> Result<UploadFile, AppError> {
        let file = self
            .selected
            .as_ref()
            .ok_or_else(|| AppError::upload_error("Please select a file to upload"))?;
        if !self.kind.accepts(&file.file_name) {
            return Err(AppError::upload_error(format!(
                "Invalid file type. Allowed: {}",
                self.kind.allowed_list()
            )));
        }
        Ok(file.clone())
    }

    fn extra_fields(&self) -> Result<Vec<(String, String)>, AppError> {
        self.kind
            .spec()
            .extra_fields
            .iter()
            .map(|field| {
                let value = self
                    .extra
                    .get(field)
                    .map(|value| value.trim())
                    .filter(|value| !value.is_empty())
                    .ok_or_else(|| AppError::upload_error(format!("{} is required", field)))?;
                Ok((field.to_string(), value.to_string()))
            })
            .collect()
    }

    /// Runs the kind's flow end to end. The busy flag is always cleared on return.
    #[tracing::instrument(name = "Bulk upload", skip_all, fields(kind = self.kind.as_str()))]
    pub async fn run(
        &mut self,
        api: &ApiClient,
        confirmer: &dyn Confirmer,
        notifier: &dyn Notifier,
    ) -> UploadOutcome {
        if self.uploading {
            return UploadOutcome::Busy;
        }
        let (file, extra) = match self.checked_file().and_then(|file| Ok((file, self.extra_fields()?))) {
            Ok(checked) => checked,
            Err(e) => {
                let message = e.message();
                notifier.notify(Notification::error(message.clone()));
                return UploadOutcome::Rejected { message };
            }
        };

        self.uploading = true;
        let outcome = self.transfer(api, &file, &extra, confirmer, notifier).await;
        self.uploading = false;

        if matches!(outcome, UploadOutcome::Completed { .. }) {
            self.selected = None;
        }
        outcome
    }

    async fn transfer(
        &self,
        api: &ApiClient,
        file: &UploadFile,
        extra: &[(String, String)],
        confirmer: &dyn Confirmer,
        notifier: &dyn Notifier,
    ) -> UploadOutcome {
        let spec = self.kind.spec();

        if let Some(validate_endpoint) = spec.validate_endpoint {
            let body = match api.upload(validate_endpoint, spec.field_name, file, extra).await {
                Ok(body) => body,
                Err(e) => return Self::fail(e, VALIDATE_FALLBACK, notifier),
            };
            let preview = UploadPreview::from_body(&file.file_name, &body);
            if !confirmer.confirm(&preview) {
                tracing::info!(file_name = %file.file_name, "upload cancelled after validation");
                return UploadOutcome::Cancelled { preview };
            }
        }

        match api.upload(spec.endpoint, spec.field_name, file, extra).await {
            Ok(response) => {
                let summary = UploadSummary::from_body(&response);
                if summary.is_partial() {
                    tracing::warn!(
                        file_name = %file.file_name,
                        failed = ?summary.counts.failed,
                        "upload accepted with failed rows"
                    );
                    notifier.notify(Notification::warning(summary.message.clone()));
                } else {
                    tracing::info!(file_name = %file.file_name, "upload accepted");
                    notifier.notify(Notification::success(summary.message.clone()));
                }
                UploadOutcome::Completed { summary, response }
            }
            Err(e) => Self::fail(e, UPLOAD_FALLBACK, notifier),
        }
    }

    fn fail(error: AppError, fallback: &str, notifier: &dyn Notifier) -> UploadOutcome {
        let message = error.message_or(fallback);
        tracing::error!(
            error.cause_chain = ?error,
            error.message = %error,
            "upload failed"
        );
        notifier.notify(Notification::error(message.clone()));
        UploadOutcome::Failed { message }
    }
}

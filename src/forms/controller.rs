use std::collections::BTreeMap;

use serde_json::Value;
use uuid::Uuid;

use crate::api::ApiClient;
use crate::core::AppError;
use crate::loader::{fetch_choices, FetchedPage, LoadState, LoadTicket, ReferenceList};
use crate::models::Choice;
use crate::notify::{Notification, Notifier};

use super::draft::FormDraft;
use super::normalizer::FieldInput;
use super::payload::{build_payload, Payload};
use super::rules::FieldErrors;
use super::schema::{EntityKind, ListSource};

#[derive(Debug, Clone, PartialEq)]
pub enum SubmitOutcome {
    /// Local validation failed; nothing was sent.
    Invalid(FieldErrors),
    /// A submit for this form is already in flight.
    Busy,
    Submitted { message: String, response: Value },
    Failed { message: String },
}

/// A selector fetch the caller must run and hand back through [`FormController::apply`].
#[derive(Debug, Clone)]
pub struct PendingLoad {
    pub field: &'static str,
    pub source: ListSource,
    pub ticket: LoadTicket,
}

/// A submit that passed validation and is waiting on the network.
#[derive(Debug)]
pub struct PendingSubmission {
    pub kind: EntityKind,
    pub payload: Payload,
    pub submission_id: Uuid,
}

/// Drives one registration form: edits, cascading selectors and submit.
#[derive(Debug)]
pub struct FormController {
    draft: FormDraft,
    submitting: bool,
    schools: Option<ReferenceList<Choice>>,
    dependents: BTreeMap<&'static str, ReferenceList<Choice>>,
}

impl FormController {
    pub fn new(kind: EntityKind, page_size: u32) -> Self {
        let schema = kind.schema();
        let schools = schema
            .scope
            .map(|_| ReferenceList::paged(page_size, ListSource::Schools.empty_message()));
        let dependents = schema
            .dependents
            .iter()
            .map(|dependent| {
                let list = match dependent.source {
                    ListSource::UsersOfSchool(_) => {
                        ReferenceList::unpaged(page_size, dependent.source.empty_message())
                    }
                    _ => ReferenceList::paged(page_size, dependent.source.empty_message()),
                };
                (dependent.field, list)
            })
            .collect();

        Self {
            draft: FormDraft::new(kind),
            submitting: false,
            schools,
            dependents,
        }
    }

    pub fn kind(&self) -> EntityKind {
        self.draft.kind()
    }

    pub fn draft(&self) -> &FormDraft {
        &self.draft
    }

    pub fn is_submitting(&self) -> bool {
        self.submitting
    }

    /// Options backing a selector field, if it is one.
    pub fn options(&self, field: &str) -> Option<&ReferenceList<Choice>> {
        if self.draft.schema().is_scope(field) {
            return self.schools.as_ref();
        }
        self.dependents.get(field)
    }

    fn list_mut(&mut self, field: &str) -> Option<&mut ReferenceList<Choice>> {
        if self.draft.schema().is_scope(field) {
            return self.schools.as_mut();
        }
        self.dependents.get_mut(field)
    }

    fn source_of(&self, field: &str) -> Option<ListSource> {
        let schema = self.draft.schema();
        if schema.is_scope(field) {
            return Some(ListSource::Schools);
        }
        schema.dependent(field).map(|dependent| dependent.source)
    }

    /// Tab activation: loads the all-schools list unless it is already there.
    pub fn activate(&mut self) -> Vec<PendingLoad> {
        let Some(scope) = self.draft.schema().scope else {
            return Vec::new();
        };
        self.schools
            .as_mut()
            .and_then(ReferenceList::activate)
            .map(|ticket| PendingLoad {
                field: scope,
                source: ListSource::Schools,
                ticket,
            })
            .into_iter()
            .collect()
    }

    /// Re-fetches the all-schools list from its first page.
    pub fn refresh_schools(&mut self) -> Vec<PendingLoad> {
        let Some(scope) = self.draft.schema().scope else {
            return Vec::new();
        };
        self.schools
            .as_mut()
            .and_then(ReferenceList::refresh)
            .map(|ticket| PendingLoad {
                field: scope,
                source: ListSource::Schools,
                ticket,
            })
            .into_iter()
            .collect()
    }

    /// Stores an edit. A scope change empties the dependent selections in the
    /// same step and returns the fetches for their new option lists.
    pub fn set_field(&mut self, field: &str, input: FieldInput) -> Result<Vec<PendingLoad>, AppError> {
        let change = self.draft.set(field, input)?;
        let Some(scope) = change.scope else {
            return Ok(Vec::new());
        };

        let mut loads = Vec::new();
        for dependent in self.draft.schema().dependents {
            let Some(list) = self.dependents.get_mut(dependent.field) else {
                continue;
            };
            if let Some(ticket) = list.rescope(&scope) {
                loads.push(PendingLoad {
                    field: dependent.field,
                    source: dependent.source,
                    ticket,
                });
            }
        }
        Ok(loads)
    }

    pub fn load_more(&mut self, field: &str) -> Option<PendingLoad> {
        let source = self.source_of(field)?;
        let spec = self.draft.schema().field(field)?;
        let ticket = self.list_mut(field)?.load_more()?;
        Some(PendingLoad {
            field: spec.name,
            source,
            ticket,
        })
    }

    /// Applies a fetch result and drops any selection the new list no longer offers.
    pub fn apply(&mut self, load: &PendingLoad, result: Result<FetchedPage<Choice>, AppError>) -> bool {
        let selected = self
            .draft
            .text(load.field)
            .map(|selected| selected.trim().to_string())
            .filter(|selected| !selected.is_empty());
        let Some(list) = self.list_mut(load.field) else {
            return false;
        };
        if !list.complete(&load.ticket, result) {
            return false;
        }
        let fully_loaded = !list.has_more();
        let stale_selection = selected
            .as_deref()
            .map(|selected| !list.contains(selected))
            .unwrap_or(false);

        if stale_selection && fully_loaded {
            tracing::info!(field = load.field, "clearing selection missing from refreshed list");
            if self.draft.schema().is_scope(load.field) {
                // Goes through `set_field` so the dependents are emptied as well.
                if let Ok(loads) = self.set_field(load.field, FieldInput::Text(String::new())) {
                    debug_assert!(loads.is_empty());
                }
            } else {
                self.draft.clear_selection(load.field);
            }
        }
        true
    }

    pub async fn run_loads(&mut self, api: &ApiClient, loads: Vec<PendingLoad>) {
        for load in loads {
            let result = fetch_choices(
                api,
                load.source,
                load.ticket.scope.as_deref(),
                load.ticket.page,
            )
            .await;
            self.apply(&load, result);
        }
    }

    /// Pulls every remaining page of a selector's options.
    pub async fn load_remaining(&mut self, api: &ApiClient, field: &str) {
        while let Some(load) = self.load_more(field) {
            self.run_loads(api, vec![load]).await;
        }
    }

    pub async fn open(&mut self, api: &ApiClient) {
        let loads = self.activate();
        self.run_loads(api, loads).await;
    }

    pub async fn input(
        &mut self,
        api: &ApiClient,
        field: &str,
        input: impl Into<FieldInput>,
    ) -> Result<(), AppError> {
        let loads = self.set_field(field, input.into())?;
        self.run_loads(api, loads).await;
        Ok(())
    }

    /// Full validation plus a check that every selection is one the user could pick.
    pub fn validate(&mut self) -> bool {
        let mut valid = self.draft.validate();
        let selector_fields: Vec<&'static str> = self
            .draft
            .schema()
            .scope
            .into_iter()
            .chain(self.draft.schema().dependents.iter().map(|d| d.field))
            .collect();

        for field in selector_fields {
            if self.draft.errors().contains_key(field) {
                continue;
            }
            let selected = self.draft.text(field).unwrap_or_default().trim().to_string();
            let Some(list) = self.options(field) else {
                continue;
            };
            if selected.is_empty() {
                continue;
            }
            let label = self
                .draft
                .schema()
                .field(field)
                .map(|spec| spec.label)
                .unwrap_or(field);
            let message = match list.state() {
                LoadState::Ready if list.contains(&selected) => continue,
                LoadState::Ready => format!("Select a {} from the list", label.to_lowercase()),
                LoadState::Loading => format!("Options for {} are still loading", label.to_lowercase()),
                LoadState::Idle => continue,
            };
            self.draft.add_error(field, message);
            valid = false;
        }
        valid
    }

    pub fn begin_submit(&mut self) -> Result<PendingSubmission, SubmitOutcome> {
        if self.submitting {
            return Err(SubmitOutcome::Busy);
        }
        if !self.validate() {
            tracing::debug!(
                kind = self.kind().as_str(),
                errors = self.draft.errors().len(),
                "registration blocked by validation"
            );
            return Err(SubmitOutcome::Invalid(self.draft.errors().clone()));
        }
        let payload = build_payload(self.draft.schema(), self.draft.values()).map_err(|e| {
            SubmitOutcome::Failed {
                message: e.message(),
            }
        })?;

        self.submitting = true;
        Ok(PendingSubmission {
            kind: self.kind(),
            payload,
            submission_id: Uuid::new_v4(),
        })
    }

    pub fn finish_submit(
        &mut self,
        pending: PendingSubmission,
        result: Result<Value, AppError>,
        notifier: &dyn Notifier,
    ) -> SubmitOutcome {
        self.submitting = false;

        match result {
            Ok(response) => {
                let message = response
                    .get("message")
                    .and_then(Value::as_str)
                    .filter(|m| !m.trim().is_empty())
                    .map(str::to_string)
                    .unwrap_or_else(|| pending.kind.success_message());
                tracing::info!(
                    submission_id = %pending.submission_id,
                    kind = pending.kind.as_str(),
                    "registration succeeded"
                );
                notifier.notify(Notification::success(message.clone()));
                self.reset();
                SubmitOutcome::Submitted { message, response }
            }
            Err(e) => {
                let message = e.message_or(&pending.kind.failure_fallback());
                tracing::error!(
                    submission_id = %pending.submission_id,
                    kind = pending.kind.as_str(),
                    error.cause_chain = ?e,
                    error.message = %e,
                    "registration failed"
                );
                notifier.notify(Notification::error(message.clone()));
                SubmitOutcome::Failed { message }
            }
        }
    }

    #[tracing::instrument(name = "Submit registration", skip(self, api, notifier), fields(kind = self.kind().as_str()))]
    pub async fn submit(&mut self, api: &ApiClient, notifier: &dyn Notifier) -> SubmitOutcome {
        let pending = match self.begin_submit() {
            Ok(pending) => pending,
            Err(SubmitOutcome::Failed { message }) => {
                notifier.notify(Notification::error(message.clone()));
                return SubmitOutcome::Failed { message };
            }
            Err(outcome) => return outcome,
        };
        let result = api.register(pending.kind, &pending.payload).await;
        self.finish_submit(pending, result, notifier)
    }

    fn reset(&mut self) {
        self.draft.reset();
        for list in self.dependents.values_mut() {
            list.clear();
        }
    }
}

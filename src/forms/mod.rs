//! Registration forms: one engine driven by per-entity schemas.

pub mod controller;
pub mod draft;
pub mod normalizer;
pub mod payload;
pub mod rules;
pub mod schema;

pub use controller::{FormController, PendingLoad, PendingSubmission, SubmitOutcome};
pub use draft::{FieldChange, FormDraft};
pub use normalizer::{FieldClass, FieldInput, FieldValue};
pub use payload::Payload;
pub use rules::{FieldErrors, Rule};
pub use schema::{EntityKind, ListSource};

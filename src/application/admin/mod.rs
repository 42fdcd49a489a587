//! Admin authoring workflow: editor forms, delete confirmation, notifications
//! and the orchestrator that sequences them.

pub mod confirm;
pub mod forms;
pub mod notifications;
pub mod orchestrator;

pub use orchestrator::{AdminOrchestrator, AdminView, DeleteOutcome, EditorDraft, SubmitOutcome};

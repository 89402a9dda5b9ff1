use crate::setup_step::SetupStep;
use crate::validation::FieldErrors;

#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Form has {} invalid field(s)", .0.len())]
    InvalidForm(FieldErrors),

    #[error("Cannot move from {} to {} while the workflow is locked", from.label(), to.label())]
    InvalidTransition { from: SetupStep, to: SetupStep },

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Storage error: {0}")]
    Storage(String),
}

use thiserror::Error;

use super::models::WizardStep;
use crate::core::error::AppError;
use crate::shared::constants::MAX_DESCRIPTION_CHARS;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum WizardError {
    #[error("The hazard wizard is not open")]
    NotOpen,

    #[error("Action not available on step {0:?}")]
    WrongStep(WizardStep),

    #[error("Unknown hazard category {0}")]
    UnknownCategory(i64),

    #[error("Unknown subcategory code '{0}'")]
    UnknownSubcategory(String),

    #[error("Description exceeds {} characters", MAX_DESCRIPTION_CHARS)]
    DescriptionTooLong,

    #[error("No attached file at index {0}")]
    MediaIndexOutOfRange(usize),

    #[error("Select an option to continue")]
    SelectionRequired,

    #[error("Cannot go back from this step")]
    CannotGoBack,

    #[error("Category and subcategory are required")]
    Incomplete,
}

impl From<WizardError> for AppError {
    fn from(err: WizardError) -> Self {
        match err {
            WizardError::UnknownCategory(_) | WizardError::MediaIndexOutOfRange(_) => {
                AppError::NotFound(err.to_string())
            }
            WizardError::DescriptionTooLong | WizardError::UnknownSubcategory(_) => {
                AppError::Validation(err.to_string())
            }
            WizardError::NotOpen
            | WizardError::WrongStep(_)
            | WizardError::SelectionRequired
            | WizardError::CannotGoBack
            | WizardError::Incomplete => AppError::Conflict(err.to_string()),
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum OrchestratorError {
    #[error("A hazard submission is already in progress")]
    SubmissionInFlight,

    #[error("Click on the map to place the hazard first")]
    NoCapturedPoint,
}

impl From<OrchestratorError> for AppError {
    fn from(err: OrchestratorError) -> Self {
        AppError::Conflict(err.to_string())
    }
}

//! Identity-provider failures and the user-facing messages they map to.
//!
//! The provider reports failures as a machine code (`EMAIL_NOT_FOUND`,
//! `WEAK_PASSWORD : Password should be at least 6 characters`, ...). A closed
//! set of codes gets a specific message; everything else falls back to a
//! generic message that depends on the flow the user was in.

use thiserror::Error;

use crate::core::error::AppError;

/// Which user-facing flow a failure happened in
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthFlow {
    Login,
    Register,
}

impl AuthFlow {
    fn generic_message(&self) -> &'static str {
        match self {
            AuthFlow::Login => "An error occurred during login.",
            AuthFlow::Register => "Failed to register. Please try again.",
        }
    }
}

/// Provider error codes with a dedicated message
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthErrorCode {
    UserNotFound,
    WrongPassword,
    InvalidEmail,
    UserDisabled,
    EmailAlreadyInUse,
    WeakPassword,
    Other(String),
}

impl AuthErrorCode {
    /// Parse the provider's `error.message` field
    pub fn from_provider_message(message: &str) -> Self {
        // "WEAK_PASSWORD : Password should be at least 6 characters"
        let code = message.split(':').next().unwrap_or_default().trim();

        match code {
            "EMAIL_NOT_FOUND" => AuthErrorCode::UserNotFound,
            "INVALID_PASSWORD" => AuthErrorCode::WrongPassword,
            "INVALID_EMAIL" => AuthErrorCode::InvalidEmail,
            "USER_DISABLED" => AuthErrorCode::UserDisabled,
            "EMAIL_EXISTS" => AuthErrorCode::EmailAlreadyInUse,
            "WEAK_PASSWORD" => AuthErrorCode::WeakPassword,
            other => AuthErrorCode::Other(other.to_string()),
        }
    }

    pub fn user_message(&self, flow: AuthFlow) -> &'static str {
        match self {
            AuthErrorCode::UserNotFound => "No user found with this email address.",
            AuthErrorCode::WrongPassword => "Incorrect password.",
            AuthErrorCode::InvalidEmail => "Invalid email address.",
            AuthErrorCode::UserDisabled => "This account has been disabled.",
            AuthErrorCode::EmailAlreadyInUse => "This email is already in use.",
            AuthErrorCode::WeakPassword => "Password is too weak. Please use a stronger password.",
            AuthErrorCode::Other(_) => flow.generic_message(),
        }
    }
}

/// Failures from the identity provider or the profile document store
#[derive(Debug, Error)]
pub enum IdentityError {
    #[error("identity provider rejected the request: {0:?}")]
    Rejected(AuthErrorCode),

    #[error("username is already taken")]
    UsernameTaken,

    #[error("identity service unavailable: {0}")]
    Unavailable(String),
}

impl IdentityError {
    /// Convert into an API error carrying the message for `flow`
    pub fn into_app_error(self, flow: AuthFlow) -> AppError {
        match self {
            IdentityError::Rejected(code) => {
                let message = code.user_message(flow).to_string();
                match code {
                    AuthErrorCode::UserNotFound => AppError::NotFound(message),
                    AuthErrorCode::WrongPassword => AppError::Unauthorized(message),
                    AuthErrorCode::UserDisabled => AppError::Forbidden(message),
                    AuthErrorCode::EmailAlreadyInUse => AppError::Conflict(message),
                    AuthErrorCode::InvalidEmail | AuthErrorCode::WeakPassword => {
                        AppError::Validation(message)
                    }
                    AuthErrorCode::Other(ref raw) => {
                        tracing::warn!("Unmapped identity provider code: {}", raw);
                        AppError::Auth(message)
                    }
                }
            }
            IdentityError::UsernameTaken => AppError::Conflict(
                "Username already exists. Please choose a different one.".to_string(),
            ),
            IdentityError::Unavailable(detail) => {
                tracing::error!("Identity service unavailable: {}", detail);
                AppError::ExternalServiceError(flow.generic_message().to_string())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_provider_codes_map_to_closed_set() {
        assert_eq!(
            AuthErrorCode::from_provider_message("EMAIL_NOT_FOUND"),
            AuthErrorCode::UserNotFound
        );
        assert_eq!(
            AuthErrorCode::from_provider_message("INVALID_PASSWORD"),
            AuthErrorCode::WrongPassword
        );
        assert_eq!(
            AuthErrorCode::from_provider_message("WEAK_PASSWORD : Password should be at least 6 characters"),
            AuthErrorCode::WeakPassword
        );
        assert_eq!(
            AuthErrorCode::from_provider_message("EMAIL_EXISTS"),
            AuthErrorCode::EmailAlreadyInUse
        );
        assert_eq!(
            AuthErrorCode::from_provider_message("TOO_MANY_ATTEMPTS_TRY_LATER"),
            AuthErrorCode::Other("TOO_MANY_ATTEMPTS_TRY_LATER".to_string())
        );
    }

    #[test]
    fn test_unknown_code_falls_back_per_flow() {
        let code = AuthErrorCode::Other("OPERATION_NOT_ALLOWED".to_string());
        assert_eq!(
            code.user_message(AuthFlow::Login),
            "An error occurred during login."
        );
        assert_eq!(
            code.user_message(AuthFlow::Register),
            "Failed to register. Please try again."
        );
    }

    #[test]
    fn test_into_app_error_status_classes() {
        let err = IdentityError::Rejected(AuthErrorCode::WrongPassword).into_app_error(AuthFlow::Login);
        assert!(matches!(err, AppError::Unauthorized(ref m) if m == "Incorrect password."));

        let err = IdentityError::Rejected(AuthErrorCode::UserDisabled).into_app_error(AuthFlow::Login);
        assert!(matches!(err, AppError::Forbidden(_)));

        let err = IdentityError::UsernameTaken.into_app_error(AuthFlow::Register);
        assert!(
            matches!(err, AppError::Conflict(ref m) if m == "Username already exists. Please choose a different one.")
        );
    }
}

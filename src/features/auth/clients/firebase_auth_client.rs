use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::core::config::FirebaseConfig;
use crate::features::auth::clients::{IdentityProvider, ProviderSession};
use crate::features::auth::errors::{AuthErrorCode, IdentityError};

/// Request body for password sign-in and sign-up
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct PasswordRequest<'a> {
    email: &'a str,
    password: &'a str,
    return_secure_token: bool,
}

/// Identity Toolkit response for sign-in and sign-up
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PasswordResponse {
    local_id: String,
    #[serde(default)]
    email: Option<String>,
    id_token: String,
    refresh_token: String,
    expires_in: String,
}

/// Secure token endpoint response
#[derive(Debug, Deserialize)]
struct RefreshResponse {
    id_token: String,
    refresh_token: String,
    expires_in: String,
    user_id: String,
}

/// Provider error envelope: `{"error": {"code": 400, "message": "EMAIL_NOT_FOUND"}}`
#[derive(Debug, Deserialize)]
struct ProviderErrorResponse {
    error: ProviderErrorBody,
}

#[derive(Debug, Deserialize)]
struct ProviderErrorBody {
    #[serde(default)]
    message: String,
}

/// Client for the Identity Toolkit REST API
pub struct FirebaseAuthClient {
    config: FirebaseConfig,
    http_client: reqwest::Client,
}

impl FirebaseAuthClient {
    pub fn new(config: FirebaseConfig) -> Self {
        Self {
            config,
            http_client: reqwest::Client::new(),
        }
    }

    async fn password_call(
        &self,
        action: &str,
        email: &str,
        password: &str,
    ) -> Result<ProviderSession, IdentityError> {
        let url = format!("{}/accounts:{}", self.config.auth_url, action);

        tracing::debug!("Calling identity provider {} for {}", action, email);

        let response = self
            .http_client
            .post(&url)
            .query(&[("key", self.config.api_key.as_str())])
            .json(&PasswordRequest {
                email,
                password,
                return_secure_token: true,
            })
            .send()
            .await
            .map_err(|e| {
                tracing::error!("Identity provider request failed: {}", e);
                IdentityError::Unavailable(e.to_string())
            })?;

        let status = response.status();
        let body = response.text().await.unwrap_or_default();

        if !status.is_success() {
            return Err(rejection_from_body(status, &body));
        }

        let parsed: PasswordResponse = serde_json::from_str(&body).map_err(|e| {
            tracing::error!("Failed to parse identity provider response: {}", e);
            IdentityError::Unavailable(format!("Failed to parse response: {}", e))
        })?;

        Ok(ProviderSession {
            uid: parsed.local_id,
            email: parsed.email,
            id_token: parsed.id_token,
            refresh_token: parsed.refresh_token,
            expires_in: parse_expires_in(&parsed.expires_in),
        })
    }
}

#[async_trait]
impl IdentityProvider for FirebaseAuthClient {
    async fn sign_in(&self, email: &str, password: &str) -> Result<ProviderSession, IdentityError> {
        self.password_call("signInWithPassword", email, password)
            .await
    }

    async fn sign_up(&self, email: &str, password: &str) -> Result<ProviderSession, IdentityError> {
        let session = self.password_call("signUp", email, password).await?;
        tracing::info!("Created account: {}", session.uid);
        Ok(session)
    }

    async fn refresh(&self, refresh_token: &str) -> Result<ProviderSession, IdentityError> {
        let response = self
            .http_client
            .post(&self.config.token_url)
            .query(&[("key", self.config.api_key.as_str())])
            .form(&[
                ("grant_type", "refresh_token"),
                ("refresh_token", refresh_token),
            ])
            .send()
            .await
            .map_err(|e| {
                tracing::error!("Token refresh request failed: {}", e);
                IdentityError::Unavailable(e.to_string())
            })?;

        let status = response.status();
        let body = response.text().await.unwrap_or_default();

        if !status.is_success() {
            return Err(rejection_from_body(status, &body));
        }

        let parsed: RefreshResponse = serde_json::from_str(&body).map_err(|e| {
            tracing::error!("Failed to parse token refresh response: {}", e);
            IdentityError::Unavailable(format!("Failed to parse response: {}", e))
        })?;

        Ok(ProviderSession {
            uid: parsed.user_id,
            email: None,
            id_token: parsed.id_token,
            refresh_token: parsed.refresh_token,
            expires_in: parse_expires_in(&parsed.expires_in),
        })
    }
}

/// Map a non-2xx provider response to an identity error
fn rejection_from_body(status: reqwest::StatusCode, body: &str) -> IdentityError {
    match serde_json::from_str::<ProviderErrorResponse>(body) {
        Ok(parsed) if status.is_client_error() => {
            tracing::debug!("Identity provider rejected request: {}", parsed.error.message);
            IdentityError::Rejected(AuthErrorCode::from_provider_message(
                &parsed.error.message,
            ))
        }
        _ => {
            tracing::error!("Identity provider error: HTTP {} - {}", status, body);
            IdentityError::Unavailable(format!("HTTP {}", status))
        }
    }
}

/// The provider sends lifetimes as decimal strings ("3600")
fn parse_expires_in(raw: &str) -> i64 {
    raw.parse().unwrap_or(3600)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejection_from_body_maps_code() {
        let body = r#"{"error":{"code":400,"message":"EMAIL_NOT_FOUND","errors":[]}}"#;
        let err = rejection_from_body(reqwest::StatusCode::BAD_REQUEST, body);
        assert!(matches!(
            err,
            IdentityError::Rejected(AuthErrorCode::UserNotFound)
        ));
    }

    #[test]
    fn test_rejection_from_body_server_error_is_unavailable() {
        let err = rejection_from_body(reqwest::StatusCode::BAD_GATEWAY, "<html>");
        assert!(matches!(err, IdentityError::Unavailable(_)));
    }

    #[test]
    fn test_parse_password_response() {
        let body = r#"{
            "kind": "identitytoolkit#VerifyPasswordResponse",
            "localId": "abc123",
            "email": "reporter@example.com",
            "displayName": "",
            "idToken": "token",
            "registered": true,
            "refreshToken": "refresh",
            "expiresIn": "3600"
        }"#;
        let parsed: PasswordResponse = serde_json::from_str(body).unwrap();
        assert_eq!(parsed.local_id, "abc123");
        assert_eq!(parse_expires_in(&parsed.expires_in), 3600);
    }
}

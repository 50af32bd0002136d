mod firebase_auth_client;
mod firestore_client;

pub use firebase_auth_client::FirebaseAuthClient;
pub use firestore_client::FirestoreClient;

use async_trait::async_trait;

use crate::features::auth::errors::IdentityError;

/// Tokens and identity returned by a successful sign-in, sign-up or refresh
#[derive(Debug, Clone)]
pub struct ProviderSession {
    pub uid: String,
    pub email: Option<String>,
    pub id_token: String,
    pub refresh_token: String,
    pub expires_in: i64,
}

/// Credential-based identity provider
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    async fn sign_in(&self, email: &str, password: &str) -> Result<ProviderSession, IdentityError>;

    async fn sign_up(&self, email: &str, password: &str) -> Result<ProviderSession, IdentityError>;

    async fn refresh(&self, refresh_token: &str) -> Result<ProviderSession, IdentityError>;
}

/// Stored profile fields; absent fields fall back to defaults at the session layer
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserProfile {
    pub username: Option<String>,
    pub email: Option<String>,
    pub role: Option<String>,
}

/// Document store holding user profiles and the username registry
#[async_trait]
pub trait ProfileDirectory: Send + Sync {
    /// Read `users/{uid}`; `None` when the document does not exist
    async fn get_profile(
        &self,
        uid: &str,
        id_token: &str,
    ) -> Result<Option<UserProfile>, IdentityError>;

    /// Whether `usernames/{username}` exists
    async fn username_exists(&self, username: &str) -> Result<bool, IdentityError>;

    /// Create `usernames/{username}`; fails with `UsernameTaken` if it already exists
    async fn reserve_username(
        &self,
        username: &str,
        uid: &str,
        id_token: &str,
    ) -> Result<(), IdentityError>;

    /// Create `users/{uid}`
    async fn create_profile(
        &self,
        uid: &str,
        profile: &UserProfile,
        id_token: &str,
    ) -> Result<(), IdentityError>;
}

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::core::config::FirebaseConfig;
use crate::features::auth::clients::{ProfileDirectory, UserProfile};
use crate::features::auth::errors::IdentityError;
use crate::shared::constants::{USERNAMES_COLLECTION, USERS_COLLECTION};

/// Firestore document as returned by the REST API
#[derive(Debug, Default, Serialize, Deserialize)]
struct Document {
    #[serde(default)]
    fields: HashMap<String, Value>,
}

/// Typed Firestore value; only string fields are used here
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Value {
    #[serde(skip_serializing_if = "Option::is_none")]
    string_value: Option<String>,
}

impl Value {
    fn string(value: &str) -> Self {
        Self {
            string_value: Some(value.to_string()),
        }
    }
}

impl Document {
    fn string_field(&self, key: &str) -> Option<String> {
        self.fields
            .get(key)
            .and_then(|v| v.string_value.clone())
            .filter(|s| !s.is_empty())
    }

    fn with_string(mut self, key: &str, value: &str) -> Self {
        self.fields.insert(key.to_string(), Value::string(value));
        self
    }
}

/// Client for the Firestore REST API (profiles and the username registry)
pub struct FirestoreClient {
    config: FirebaseConfig,
    http_client: reqwest::Client,
}

impl FirestoreClient {
    pub fn new(config: FirebaseConfig) -> Self {
        Self {
            config,
            http_client: reqwest::Client::new(),
        }
    }

    fn collection_url(&self, collection: &str) -> String {
        format!(
            "{}/projects/{}/databases/(default)/documents/{}",
            self.config.firestore_url, self.config.project_id, collection
        )
    }

    fn document_url(&self, collection: &str, id: &str) -> String {
        format!(
            "{}/{}",
            self.collection_url(collection),
            urlencoding::encode(id)
        )
    }

    async fn get_document(
        &self,
        collection: &str,
        id: &str,
        id_token: Option<&str>,
    ) -> Result<Option<Document>, IdentityError> {
        let url = self.document_url(collection, id);

        tracing::debug!("Reading document {}/{}", collection, id);

        let mut request = self
            .http_client
            .get(&url)
            .query(&[("key", self.config.api_key.as_str())]);
        if let Some(token) = id_token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await.map_err(|e| {
            tracing::error!("Failed to read document {}/{}: {}", collection, id, e);
            IdentityError::Unavailable(e.to_string())
        })?;

        let status = response.status();

        if status == reqwest::StatusCode::NOT_FOUND {
            return Ok(None);
        }

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::error!("Document store error: HTTP {} - {}", status, body);
            return Err(IdentityError::Unavailable(format!(
                "Document store error: HTTP {}",
                status
            )));
        }

        let document = response.json::<Document>().await.map_err(|e| {
            tracing::error!("Failed to parse document: {}", e);
            IdentityError::Unavailable(format!("Failed to parse document: {}", e))
        })?;

        Ok(Some(document))
    }

    /// Create-only write; an existing document yields `Ok(false)`
    async fn create_document(
        &self,
        collection: &str,
        id: &str,
        document: &Document,
        id_token: &str,
    ) -> Result<bool, IdentityError> {
        let url = self.collection_url(collection);

        tracing::debug!("Creating document {}/{}", collection, id);

        let response = self
            .http_client
            .post(&url)
            .query(&[("documentId", id), ("key", self.config.api_key.as_str())])
            .bearer_auth(id_token)
            .json(document)
            .send()
            .await
            .map_err(|e| {
                tracing::error!("Failed to create document {}/{}: {}", collection, id, e);
                IdentityError::Unavailable(e.to_string())
            })?;

        let status = response.status();

        if status == reqwest::StatusCode::CONFLICT {
            return Ok(false);
        }

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::error!("Document store error: HTTP {} - {}", status, body);
            return Err(IdentityError::Unavailable(format!(
                "Document store error: HTTP {}",
                status
            )));
        }

        Ok(true)
    }
}

#[async_trait]
impl ProfileDirectory for FirestoreClient {
    async fn get_profile(
        &self,
        uid: &str,
        id_token: &str,
    ) -> Result<Option<UserProfile>, IdentityError> {
        let document = self
            .get_document(USERS_COLLECTION, uid, Some(id_token))
            .await?;

        Ok(document.map(|doc| UserProfile {
            username: doc.string_field("username"),
            email: doc.string_field("email"),
            role: doc.string_field("role"),
        }))
    }

    async fn username_exists(&self, username: &str) -> Result<bool, IdentityError> {
        let document = self
            .get_document(USERNAMES_COLLECTION, username, None)
            .await?;
        Ok(document.is_some())
    }

    async fn reserve_username(
        &self,
        username: &str,
        uid: &str,
        id_token: &str,
    ) -> Result<(), IdentityError> {
        let document = Document::default().with_string("uid", uid);

        let created = self
            .create_document(USERNAMES_COLLECTION, username, &document, id_token)
            .await?;

        if !created {
            return Err(IdentityError::UsernameTaken);
        }

        Ok(())
    }

    async fn create_profile(
        &self,
        uid: &str,
        profile: &UserProfile,
        id_token: &str,
    ) -> Result<(), IdentityError> {
        let mut document = Document::default();
        if let Some(username) = &profile.username {
            document = document.with_string("username", username);
        }
        if let Some(email) = &profile.email {
            document = document.with_string("email", email);
        }
        if let Some(role) = &profile.role {
            document = document.with_string("role", role);
        }

        let created = self
            .create_document(USERS_COLLECTION, uid, &document, id_token)
            .await?;

        if !created {
            tracing::warn!("Profile document for {} already exists", uid);
        }

        Ok(())
    }
}

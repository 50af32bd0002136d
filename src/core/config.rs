use std::env;
use std::time::Duration;

use crate::shared::constants::{
    DEFAULT_FEATURE_SERVICE_URL, DEFAULT_HAZARD_LAYER_IDS, DEFAULT_SESSION_IDLE_TIMEOUT_SECS,
};

#[derive(Debug, Clone)]
pub struct Config {
    pub app: AppConfig,
    pub feature_service: FeatureServiceConfig,
    pub firebase: FirebaseConfig,
    pub auth: AuthConfig,
    pub swagger: SwaggerConfig,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub cors_allowed_origins: Vec<String>,
    /// Body limit for one media upload batch (all files of a single selection)
    pub max_media_batch_size: usize,
    /// Hazard sessions untouched for this long are torn down
    pub session_idle_timeout: Duration,
}

/// Remote feature-service (map layers, feature writes, attachments)
#[derive(Debug, Clone)]
pub struct FeatureServiceConfig {
    /// FeatureServer base URL, without a trailing slash
    pub url: String,
    /// Optional ArcGIS token appended to every request
    pub token: Option<String>,
    /// Layer ids offered as hazard categories, in catalog order
    pub hazard_layer_ids: Vec<i64>,
    pub request_timeout: Duration,
}

/// Firebase project used for identity and profile documents
#[derive(Debug, Clone)]
pub struct FirebaseConfig {
    pub api_key: String,
    pub project_id: String,
    /// Identity Toolkit base (`.../v1`)
    pub auth_url: String,
    /// Secure token endpoint used for refresh
    pub token_url: String,
    /// Firestore REST base (`.../v1`)
    pub firestore_url: String,
}

#[derive(Clone, Debug)]
pub struct AuthConfig {
    pub issuer: String,
    pub audience: String,
    pub jwks_url: String,
    pub jwks_cache_ttl: Duration,
    pub jwt_leeway: Duration,
}

#[derive(Debug, Clone)]
pub struct SwaggerConfig {
    pub username: Option<String>,
    pub password: Option<String>,
    pub title: String,
    pub version: String,
    pub description: String,
}

impl Config {
    pub fn from_env() -> Result<Self, String> {
        // Load .env file if exists, ignore if not found (optional for production)
        if let Err(e) = dotenvy::dotenv() {
            if !e.to_string().contains("not found") {
                eprintln!("Warning: Error loading .env file: {}", e);
            }
        }

        let firebase = FirebaseConfig::from_env()?;
        let auth = AuthConfig::from_env(&firebase.project_id)?;

        Ok(Config {
            app: AppConfig::from_env()?,
            feature_service: FeatureServiceConfig::from_env()?,
            firebase,
            auth,
            swagger: SwaggerConfig::from_env()?,
        })
    }
}

impl AppConfig {
    const DEFAULT_MAX_MEDIA_BATCH_SIZE: usize = 64 * 1024 * 1024; // 64MB

    pub fn from_env() -> Result<Self, String> {
        let host = env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port = env::var("PORT")
            .unwrap_or_else(|_| "3000".to_string())
            .parse::<u16>()
            .map_err(|e| format!("Invalid PORT: {}", e))?;

        // Parse CORS allowed origins from comma-separated string
        let cors_allowed_origins = env::var("CORS_ALLOWED_ORIGINS")
            .unwrap_or_else(|_| "*".to_string())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let max_media_batch_size = env::var("MAX_MEDIA_BATCH_SIZE")
            .unwrap_or_else(|_| Self::DEFAULT_MAX_MEDIA_BATCH_SIZE.to_string())
            .parse::<usize>()
            .map_err(|_| "MAX_MEDIA_BATCH_SIZE must be a valid number".to_string())?;

        let session_idle_timeout = env::var("HAZARD_SESSION_IDLE_SECS")
            .unwrap_or_else(|_| DEFAULT_SESSION_IDLE_TIMEOUT_SECS.to_string())
            .parse::<u64>()
            .map(Duration::from_secs)
            .map_err(|_| "HAZARD_SESSION_IDLE_SECS must be a valid number".to_string())?;

        Ok(Self {
            host,
            port,
            cors_allowed_origins,
            max_media_batch_size,
            session_idle_timeout,
        })
    }

    pub fn server_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl FeatureServiceConfig {
    const DEFAULT_TIMEOUT_SECS: u64 = 30;

    pub fn from_env() -> Result<Self, String> {
        let url = env::var("FEATURE_SERVICE_URL")
            .unwrap_or_else(|_| DEFAULT_FEATURE_SERVICE_URL.to_string())
            .trim_end_matches('/')
            .to_string();

        let token = env::var("ARCGIS_TOKEN").ok().filter(|s| !s.is_empty());

        let hazard_layer_ids = match env::var("HAZARD_LAYER_IDS") {
            Ok(raw) => parse_layer_ids(&raw)?,
            Err(_) => DEFAULT_HAZARD_LAYER_IDS.to_vec(),
        };

        let timeout_secs = env::var("HTTP_TIMEOUT_SECS")
            .unwrap_or_else(|_| Self::DEFAULT_TIMEOUT_SECS.to_string())
            .parse::<u64>()
            .map_err(|_| "HTTP_TIMEOUT_SECS must be a valid number".to_string())?;

        Ok(Self {
            url,
            token,
            hazard_layer_ids,
            request_timeout: Duration::from_secs(timeout_secs),
        })
    }
}

/// Parse a comma-separated list of layer ids ("1, 2,3")
fn parse_layer_ids(raw: &str) -> Result<Vec<i64>, String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| {
            s.parse::<i64>()
                .map_err(|_| format!("HAZARD_LAYER_IDS contains an invalid id: {}", s))
        })
        .collect()
}

impl FirebaseConfig {
    pub fn from_env() -> Result<Self, String> {
        let api_key = env::var("FIREBASE_API_KEY")
            .map_err(|_| "FIREBASE_API_KEY environment variable is required".to_string())?;

        let project_id = env::var("FIREBASE_PROJECT_ID")
            .map_err(|_| "FIREBASE_PROJECT_ID environment variable is required".to_string())?;

        let auth_url = env::var("FIREBASE_AUTH_URL")
            .unwrap_or_else(|_| "https://identitytoolkit.googleapis.com/v1".to_string());

        let token_url = env::var("FIREBASE_TOKEN_URL")
            .unwrap_or_else(|_| "https://securetoken.googleapis.com/v1/token".to_string());

        let firestore_url = env::var("FIRESTORE_URL")
            .unwrap_or_else(|_| "https://firestore.googleapis.com/v1".to_string());

        Ok(Self {
            api_key,
            project_id,
            auth_url: auth_url.trim_end_matches('/').to_string(),
            token_url,
            firestore_url: firestore_url.trim_end_matches('/').to_string(),
        })
    }
}

impl AuthConfig {
    // Default values for ID token verification
    const DEFAULT_JWKS_CACHE_TTL_SECS: u64 = 3600; // 1 hour
    const DEFAULT_JWT_LEEWAY_SECS: u64 = 60; // 1 minute

    pub fn from_env(project_id: &str) -> Result<Self, String> {
        let issuer = format!("https://securetoken.google.com/{}", project_id);

        let jwks_url = env::var("FIREBASE_JWKS_URL").unwrap_or_else(|_| {
            "https://www.googleapis.com/service_accounts/v1/jwk/securetoken@system.gserviceaccount.com"
                .to_string()
        });

        let jwks_cache_ttl_secs = env::var("JWKS_CACHE_TTL")
            .unwrap_or_else(|_| Self::DEFAULT_JWKS_CACHE_TTL_SECS.to_string())
            .parse::<u64>()
            .map_err(|_| "JWKS_CACHE_TTL must be a valid number".to_string())?;

        let jwt_leeway_secs = env::var("JWT_LEEWAY")
            .unwrap_or_else(|_| Self::DEFAULT_JWT_LEEWAY_SECS.to_string())
            .parse::<u64>()
            .map_err(|_| "JWT_LEEWAY must be a valid number".to_string())?;

        Ok(Self {
            issuer,
            audience: project_id.to_string(),
            jwks_url,
            jwks_cache_ttl: Duration::from_secs(jwks_cache_ttl_secs),
            jwt_leeway: Duration::from_secs(jwt_leeway_secs),
        })
    }
}

impl SwaggerConfig {
    pub fn from_env() -> Result<Self, String> {
        // Only use credentials if they are non-empty
        let username = env::var("SWAGGER_USERNAME").ok().filter(|s| !s.is_empty());
        let password = env::var("SWAGGER_PASSWORD").ok().filter(|s| !s.is_empty());
        let title = env::var("SWAGGER_TITLE").unwrap_or_else(|_| "SafeSigns API".to_string());
        let version = env::var("SWAGGER_VERSION").unwrap_or_else(|_| "0.1.0".to_string());
        let description = env::var("SWAGGER_DESCRIPTION")
            .unwrap_or_else(|_| "Hazard reporting API for SafeSigns".to_string());

        Ok(Self {
            username,
            password,
            title,
            version,
            description,
        })
    }

    /// Returns credentials in "username:password" format if auth is enabled
    pub fn credentials(&self) -> Option<String> {
        match (&self.username, &self.password) {
            (Some(user), Some(pass)) => Some(format!("{}:{}", user, pass)),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_layer_ids() {
        assert_eq!(parse_layer_ids("1, 2,3").unwrap(), vec![1, 2, 3]);
        assert_eq!(parse_layer_ids("4,,5,").unwrap(), vec![4, 5]);
        assert!(parse_layer_ids("1,two").is_err());
    }

    #[test]
    fn test_swagger_credentials() {
        let mut config = SwaggerConfig {
            username: Some("admin".to_string()),
            password: None,
            title: String::new(),
            version: String::new(),
            description: String::new(),
        };
        assert_eq!(config.credentials(), None);

        config.password = Some("secret".to_string());
        assert_eq!(config.credentials(), Some("admin:secret".to_string()));
    }
}

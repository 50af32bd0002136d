use async_trait::async_trait;
use std::sync::Arc;

use crate::core::error::Result;
use crate::features::auth::clients::{
    IdentityProvider, ProfileDirectory, ProviderSession, UserProfile,
};
use crate::features::auth::dtos::{
    AuthResponseDto, LoginRequestDto, RefreshTokenRequestDto, RegisterRequestDto,
};
use crate::features::auth::errors::{AuthFlow, IdentityError};
use crate::features::auth::model::{AuthenticatedUser, Role, SessionUser};
use crate::shared::constants::FALLBACK_USERNAME;

/// Notified when a user signs out so per-user state can be torn down
#[async_trait]
pub trait SessionObserver: Send + Sync {
    async fn on_sign_out(&self, user_id: &str);
}

/// Service for authentication operations (register, login, refresh, logout)
pub struct AuthService {
    identity: Arc<dyn IdentityProvider>,
    profiles: Arc<dyn ProfileDirectory>,
    observers: Vec<Arc<dyn SessionObserver>>,
}

impl AuthService {
    pub fn new(identity: Arc<dyn IdentityProvider>, profiles: Arc<dyn ProfileDirectory>) -> Self {
        Self {
            identity,
            profiles,
            observers: Vec::new(),
        }
    }

    pub fn with_observer(mut self, observer: Arc<dyn SessionObserver>) -> Self {
        self.observers.push(observer);
        self
    }

    /// Register a new user.
    ///
    /// The username registry is checked before the account is created, so a
    /// taken username never leaves an orphaned account behind.
    pub async fn register(&self, dto: RegisterRequestDto) -> Result<AuthResponseDto> {
        let flow = AuthFlow::Register;

        let taken = self
            .profiles
            .username_exists(&dto.username)
            .await
            .map_err(|e| e.into_app_error(flow))?;
        if taken {
            tracing::info!("Registration rejected, username taken: {}", dto.username);
            return Err(IdentityError::UsernameTaken.into_app_error(flow));
        }

        let session = self
            .identity
            .sign_up(&dto.email, &dto.password)
            .await
            .map_err(|e| e.into_app_error(flow))?;

        self.profiles
            .reserve_username(&dto.username, &session.uid, &session.id_token)
            .await
            .map_err(|e| e.into_app_error(flow))?;

        let profile = UserProfile {
            username: Some(dto.username.clone()),
            email: Some(dto.email.clone()),
            role: Some(Role::User.as_str().to_string()),
        };
        self.profiles
            .create_profile(&session.uid, &profile, &session.id_token)
            .await
            .map_err(|e| e.into_app_error(flow))?;

        tracing::info!("User registered: {} ({})", dto.username, session.uid);

        let user = session_user_from_profile(&session.uid, session.email.clone(), Some(profile));
        Ok(auth_response(session, user))
    }

    /// Login with email and password
    pub async fn login(&self, dto: LoginRequestDto) -> Result<AuthResponseDto> {
        let flow = AuthFlow::Login;

        let session = self
            .identity
            .sign_in(&dto.email, &dto.password)
            .await
            .map_err(|e| e.into_app_error(flow))?;

        let profile = self
            .profiles
            .get_profile(&session.uid, &session.id_token)
            .await
            .map_err(|e| e.into_app_error(flow))?;

        let user = session_user_from_profile(&session.uid, session.email.clone(), profile);
        tracing::info!("User logged in: {} ({})", user.username, user.id);

        Ok(auth_response(session, user))
    }

    /// Exchange a refresh token for a new ID token
    pub async fn refresh_token(&self, dto: RefreshTokenRequestDto) -> Result<AuthResponseDto> {
        let flow = AuthFlow::Login;

        let session = self
            .identity
            .refresh(&dto.refresh_token)
            .await
            .map_err(|e| e.into_app_error(flow))?;

        let profile = self
            .profiles
            .get_profile(&session.uid, &session.id_token)
            .await
            .map_err(|e| e.into_app_error(flow))?;

        let user = session_user_from_profile(&session.uid, session.email.clone(), profile);
        Ok(auth_response(session, user))
    }

    /// Resolve a verified token into the session user, applying profile fallbacks
    pub async fn resolve_session_user(&self, user: &AuthenticatedUser) -> Result<SessionUser> {
        let profile = self
            .profiles
            .get_profile(&user.uid, &user.id_token)
            .await
            .map_err(|e| e.into_app_error(AuthFlow::Login))?;

        Ok(session_user_from_profile(&user.uid, user.email.clone(), profile))
    }

    /// Sign out: ID tokens are stateless, so this only tears down server-side state
    pub async fn logout(&self, user: &SessionUser) -> Result<()> {
        for observer in &self.observers {
            observer.on_sign_out(&user.id).await;
        }
        tracing::info!("User logged out: {} ({})", user.username, user.id);
        Ok(())
    }
}

fn session_user_from_profile(
    uid: &str,
    token_email: Option<String>,
    profile: Option<UserProfile>,
) -> SessionUser {
    let profile = profile.unwrap_or_default();

    SessionUser {
        id: uid.to_string(),
        username: profile
            .username
            .unwrap_or_else(|| FALLBACK_USERNAME.to_string()),
        email: token_email.or(profile.email),
        role: Role::from_profile(profile.role.as_deref()),
    }
}

fn auth_response(session: ProviderSession, user: SessionUser) -> AuthResponseDto {
    AuthResponseDto {
        access_token: session.id_token,
        token_type: "Bearer".to_string(),
        expires_in: session.expires_in,
        refresh_token: session.refresh_token,
        user,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::error::AppError;
    use crate::features::auth::errors::AuthErrorCode;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    #[derive(Default)]
    struct FakeIdentity {
        sign_ups: AtomicUsize,
        reject_sign_in: Option<AuthErrorCode>,
    }

    fn provider_session(uid: &str, email: &str) -> ProviderSession {
        ProviderSession {
            uid: uid.to_string(),
            email: Some(email.to_string()),
            id_token: format!("id-token-{}", uid),
            refresh_token: format!("refresh-{}", uid),
            expires_in: 3600,
        }
    }

    #[async_trait]
    impl IdentityProvider for FakeIdentity {
        async fn sign_in(
            &self,
            email: &str,
            _password: &str,
        ) -> std::result::Result<ProviderSession, IdentityError> {
            if let Some(code) = &self.reject_sign_in {
                return Err(IdentityError::Rejected(code.clone()));
            }
            Ok(provider_session("uid-existing", email))
        }

        async fn sign_up(
            &self,
            email: &str,
            _password: &str,
        ) -> std::result::Result<ProviderSession, IdentityError> {
            let n = self.sign_ups.fetch_add(1, Ordering::SeqCst);
            Ok(provider_session(&format!("uid-new-{}", n), email))
        }

        async fn refresh(
            &self,
            _refresh_token: &str,
        ) -> std::result::Result<ProviderSession, IdentityError> {
            Ok(provider_session("uid-existing", "reporter@example.com"))
        }
    }

    #[derive(Default)]
    struct FakeProfiles {
        usernames: Mutex<HashMap<String, String>>,
        users: Mutex<HashMap<String, UserProfile>>,
    }

    #[async_trait]
    impl ProfileDirectory for FakeProfiles {
        async fn get_profile(
            &self,
            uid: &str,
            _id_token: &str,
        ) -> std::result::Result<Option<UserProfile>, IdentityError> {
            Ok(self.users.lock().unwrap().get(uid).cloned())
        }

        async fn username_exists(&self, username: &str) -> std::result::Result<bool, IdentityError> {
            Ok(self.usernames.lock().unwrap().contains_key(username))
        }

        async fn reserve_username(
            &self,
            username: &str,
            uid: &str,
            _id_token: &str,
        ) -> std::result::Result<(), IdentityError> {
            let mut usernames = self.usernames.lock().unwrap();
            if usernames.contains_key(username) {
                return Err(IdentityError::UsernameTaken);
            }
            usernames.insert(username.to_string(), uid.to_string());
            Ok(())
        }

        async fn create_profile(
            &self,
            uid: &str,
            profile: &UserProfile,
            _id_token: &str,
        ) -> std::result::Result<(), IdentityError> {
            self.users
                .lock()
                .unwrap()
                .insert(uid.to_string(), profile.clone());
            Ok(())
        }
    }

    #[derive(Default)]
    struct RecordingObserver {
        signed_out: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl SessionObserver for RecordingObserver {
        async fn on_sign_out(&self, user_id: &str) {
            self.signed_out.lock().unwrap().push(user_id.to_string());
        }
    }

    fn register_dto(username: &str) -> RegisterRequestDto {
        RegisterRequestDto {
            email: "new@example.com".to_string(),
            password: "secret123".to_string(),
            username: username.to_string(),
        }
    }

    #[tokio::test]
    async fn test_register_creates_account_registry_entry_and_profile() {
        let identity = Arc::new(FakeIdentity::default());
        let profiles = Arc::new(FakeProfiles::default());
        let service = AuthService::new(identity.clone(), profiles.clone());

        let response = service.register(register_dto("river_watch")).await.unwrap();

        assert_eq!(response.user.username, "river_watch");
        assert_eq!(response.user.role, Role::User);
        assert_eq!(response.token_type, "Bearer");
        assert_eq!(identity.sign_ups.load(Ordering::SeqCst), 1);
        assert_eq!(
            profiles.usernames.lock().unwrap().get("river_watch"),
            Some(&response.user.id)
        );
        let stored = profiles.users.lock().unwrap().get(&response.user.id).cloned();
        assert_eq!(stored.and_then(|p| p.role), Some("User".to_string()));
    }

    #[tokio::test]
    async fn test_register_duplicate_username_never_creates_account() {
        let identity = Arc::new(FakeIdentity::default());
        let profiles = Arc::new(FakeProfiles::default());
        profiles
            .usernames
            .lock()
            .unwrap()
            .insert("river_watch".to_string(), "uid-other".to_string());
        let service = AuthService::new(identity.clone(), profiles.clone());

        let err = service.register(register_dto("river_watch")).await.unwrap_err();

        assert!(
            matches!(err, AppError::Conflict(ref m) if m == "Username already exists. Please choose a different one.")
        );
        assert_eq!(identity.sign_ups.load(Ordering::SeqCst), 0);
        assert!(profiles.users.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_login_applies_profile_fallbacks() {
        let service = AuthService::new(
            Arc::new(FakeIdentity::default()),
            Arc::new(FakeProfiles::default()),
        );

        let response = service
            .login(LoginRequestDto {
                email: "reporter@example.com".to_string(),
                password: "secret123".to_string(),
            })
            .await
            .unwrap();

        assert_eq!(response.user.username, "User");
        assert_eq!(response.user.role, Role::User);
        assert_eq!(response.user.email.as_deref(), Some("reporter@example.com"));
    }

    #[tokio::test]
    async fn test_login_reads_role_from_profile() {
        let profiles = Arc::new(FakeProfiles::default());
        profiles.users.lock().unwrap().insert(
            "uid-existing".to_string(),
            UserProfile {
                username: Some("city_crew".to_string()),
                email: None,
                role: Some("SpecialUser".to_string()),
            },
        );
        let service = AuthService::new(Arc::new(FakeIdentity::default()), profiles);

        let response = service
            .login(LoginRequestDto {
                email: "crew@example.com".to_string(),
                password: "secret123".to_string(),
            })
            .await
            .unwrap();

        assert_eq!(response.user.username, "city_crew");
        assert!(response.user.can_edit_features());
    }

    #[tokio::test]
    async fn test_login_wrong_password_message() {
        let identity = FakeIdentity {
            reject_sign_in: Some(AuthErrorCode::WrongPassword),
            ..Default::default()
        };
        let service = AuthService::new(Arc::new(identity), Arc::new(FakeProfiles::default()));

        let err = service
            .login(LoginRequestDto {
                email: "reporter@example.com".to_string(),
                password: "nope".to_string(),
            })
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::Unauthorized(ref m) if m == "Incorrect password."));
    }

    #[tokio::test]
    async fn test_logout_notifies_observers() {
        let observer = Arc::new(RecordingObserver::default());
        let service = AuthService::new(
            Arc::new(FakeIdentity::default()),
            Arc::new(FakeProfiles::default()),
        )
        .with_observer(observer.clone());

        let user = SessionUser {
            id: "uid-1".to_string(),
            username: "river_watch".to_string(),
            email: None,
            role: Role::User,
        };
        service.logout(&user).await.unwrap();

        assert_eq!(*observer.signed_out.lock().unwrap(), vec!["uid-1".to_string()]);
    }
}

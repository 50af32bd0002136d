use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Identity proven by a verified ID token
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AuthenticatedUser {
    /// Provider user id (`sub` claim)
    pub uid: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    /// The raw ID token, forwarded to the profile document store
    #[serde(skip)]
    pub id_token: String,
}

/// Authorization tier stored on the user profile document
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
pub enum Role {
    Admin,
    SpecialUser,
    User,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "Admin",
            Role::SpecialUser => "SpecialUser",
            Role::User => "User",
        }
    }

    /// Parse the profile document value.
    ///
    /// A missing role is a plain `User`; an unrecognised one is logged and
    /// downgraded to `User`, the least privileged tier.
    pub fn from_profile(value: Option<&str>) -> Self {
        match value {
            Some("Admin") => Role::Admin,
            Some("SpecialUser") => Role::SpecialUser,
            Some("User") | None => Role::User,
            Some(other) => {
                tracing::warn!("Unknown role '{}' on profile, treating as User", other);
                Role::User
            }
        }
    }
}

/// The signed-in user as seen by every feature
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct SessionUser {
    pub id: String,
    pub username: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    pub role: Role,
}

impl SessionUser {
    pub fn has_role(&self, role: Role) -> bool {
        self.role == role
    }

    /// Any role tier may place hazard reports
    pub fn can_report_hazards(&self) -> bool {
        matches!(self.role, Role::Admin | Role::SpecialUser | Role::User)
    }

    /// Admins and special users may edit features directly on the map
    pub fn can_edit_features(&self) -> bool {
        self.has_role(Role::Admin) || self.has_role(Role::SpecialUser)
    }
}

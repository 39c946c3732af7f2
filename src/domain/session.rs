use serde::{Deserialize, Serialize};

/// Operator role for navigation purposes.
///
/// Derived purely from the username; the backend issues no role claim. This is
/// a UI affordance, not an authorization boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    User,
}

impl Role {
    pub fn from_username(username: &str) -> Self {
        if username == "admin" {
            Self::Admin
        } else {
            Self::User
        }
    }

    pub fn as_label(self) -> &'static str {
        match self {
            Self::Admin => "admin",
            Self::User => "user",
        }
    }
}

/// Basic-Auth credential pair for the backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

/// The operator identity held while logged in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub user_id: String,
    pub username: String,
    pub role: Role,
    pub email: String,
}

impl Session {
    /// Builds a session for a freshly validated login.
    pub fn for_login(username: &str, user_id: String) -> Self {
        Self {
            user_id,
            username: username.to_owned(),
            role: Role::from_username(username),
            email: format!("{username}@gowa.com"),
        }
    }
}

/// Lifecycle of the session store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SessionPhase {
    #[default]
    Unauthenticated,
    /// Stored or submitted credentials are being checked against the backend.
    Validating,
    Authenticated,
}

impl SessionPhase {
    pub fn as_label(self) -> &'static str {
        match self {
            Self::Unauthenticated => "SESSION_UNAUTHENTICATED",
            Self::Validating => "SESSION_VALIDATING",
            Self::Authenticated => "SESSION_AUTHENTICATED",
        }
    }
}

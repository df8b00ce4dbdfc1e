//! Users and their API-client role.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::types::ObjectId;

/// Role granted to a user's wiki API client.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Responsibility {
    Viewer,
    Editor,
    Admin,
}

impl Responsibility {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Viewer => "VIEWER",
            Self::Editor => "EDITOR",
            Self::Admin => "ADMIN",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.to_ascii_uppercase().as_str() {
            "VIEWER" => Some(Self::Viewer),
            "EDITOR" => Some(Self::Editor),
            "ADMIN" => Some(Self::Admin),
            _ => None,
        }
    }
}

impl std::fmt::Display for Responsibility {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The API client attached to an approved user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WikiApiClient {
    #[serde(default)]
    pub id: Option<ObjectId>,
    #[serde(default)]
    pub description: Option<String>,
    pub responsibility: Responsibility,
    #[serde(default = "default_true")]
    pub is_enabled: bool,
}

fn default_true() -> bool {
    true
}

/// The signed-in user as returned by `GET /user/me`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: ObjectId,
    pub email: String,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub second_name: Option<String>,
    #[serde(default)]
    pub position: Option<String>,
    /// Absent until an administrator approves the account.
    #[serde(default)]
    pub wiki_api_client: Option<WikiApiClient>,
}

impl User {
    /// Approved users may open workspaces and profiles.
    pub fn is_approved(&self) -> bool {
        self.wiki_api_client.is_some()
    }

    /// Admin-only surfaces are gated on this.
    pub fn is_admin(&self) -> bool {
        self.responsibility() == Some(Responsibility::Admin)
    }

    pub fn responsibility(&self) -> Option<Responsibility> {
        self.wiki_api_client.as_ref().map(|c| c.responsibility)
    }

    /// Fail with [`CoreError::Forbidden`] unless the user is an admin.
    pub fn require_admin(&self) -> Result<(), CoreError> {
        if self.is_admin() {
            Ok(())
        } else {
            Err(CoreError::Forbidden(format!(
                "user {} is not an administrator",
                self.email
            )))
        }
    }

    /// Fail with [`CoreError::Forbidden`] unless the user has been approved.
    pub fn require_approved(&self) -> Result<(), CoreError> {
        if self.is_approved() {
            Ok(())
        } else {
            Err(CoreError::Forbidden(format!(
                "user {} has not been approved yet",
                self.email
            )))
        }
    }
}

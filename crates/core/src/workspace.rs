//! Organizations and workspaces, plus the request bodies that create them.

use serde::{Deserialize, Serialize};

use crate::block::BlockKind;
use crate::error::CoreError;
use crate::types::ObjectId;
use crate::user::{Responsibility, User};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Organization {
    pub id: ObjectId,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub access: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Workspace {
    pub id: ObjectId,
    pub title: String,
    #[serde(default, alias = "owner")]
    pub owner_user: Option<User>,
}

/// Body of `POST /organization/`.
#[derive(Debug, Clone, Serialize)]
pub struct NewOrganization {
    pub name: String,
    pub description: String,
    pub access: String,
}

/// Body of `POST /workspace`.
#[derive(Debug, Clone, Serialize)]
pub struct NewWorkspace {
    pub title: String,
}

/// Body of `POST /document`.
#[derive(Debug, Clone, Serialize)]
pub struct NewDocument {
    pub title: String,
    pub workspace_id: ObjectId,
    pub parent_document_id: Option<ObjectId>,
}

/// Body of `POST /blocks`. The server assigns the id and starts with empty content.
#[derive(Debug, Clone, Serialize)]
pub struct NewBlock {
    pub document_id: ObjectId,
    pub position: i32,
    pub type_block: BlockKind,
}

impl NewBlock {
    /// Only the kinds this client knows can be put on the wire.
    pub fn validate(&self) -> Result<(), CoreError> {
        if self.type_block == BlockKind::Unsupported {
            return Err(CoreError::Validation(
                "Only TEXT and IMG blocks can be created".into(),
            ));
        }
        Ok(())
    }
}

/// Body of `POST /auth/signup`.
#[derive(Debug, Clone, Serialize)]
pub struct Signup {
    pub email: String,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub second_name: Option<String>,
    pub position: Option<String>,
    pub organization_id: Option<ObjectId>,
    pub is_user_agreement_accepted: bool,
}

/// Body of `POST /admins/approve_user`.
#[derive(Debug, Clone, Serialize)]
pub struct ApproveUser {
    pub responsibility: Responsibility,
    pub api_client_description: String,
}

/// Body of `POST /user/verified`: an account an administrator creates
/// already verified and approved, with its API client attached.
#[derive(Debug, Clone, Serialize)]
pub struct NewApprovedUser {
    pub email: String,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub second_name: Option<String>,
    pub position: Option<String>,
    pub is_enabled: bool,
    pub is_user_agreement_accepted: bool,
    pub is_verified_email: bool,
    pub wiki_api_client: NewWikiApiClient,
}

#[derive(Debug, Clone, Serialize)]
pub struct NewWikiApiClient {
    pub description: String,
    pub is_enabled: bool,
    pub responsibility: Responsibility,
}

impl NewApprovedUser {
    /// An enabled account with an enabled client holding `responsibility`.
    pub fn new(
        email: impl Into<String>,
        username: impl Into<String>,
        first_name: impl Into<String>,
        last_name: impl Into<String>,
        responsibility: Responsibility,
    ) -> Self {
        Self {
            email: email.into(),
            username: username.into(),
            first_name: first_name.into(),
            last_name: last_name.into(),
            second_name: None,
            position: None,
            is_enabled: true,
            is_user_agreement_accepted: true,
            is_verified_email: true,
            wiki_api_client: NewWikiApiClient {
                description: String::new(),
                is_enabled: true,
                responsibility,
            },
        }
    }
}

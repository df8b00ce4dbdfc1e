//! The backend contract the editor is written against.
//!
//! Every call is a single request/response; there is no retry, caching or
//! token refresh at this layer.

use async_trait::async_trait;
use wikidocs_core::block::{Block, BlockKind};
use wikidocs_core::document::{Document, DocumentTree};
use wikidocs_core::types::ObjectId;
use wikidocs_core::user::User;
use wikidocs_core::version::Version;
use wikidocs_core::workspace::{
    ApproveUser, NewApprovedUser, NewDocument, NewOrganization, NewWorkspace, Organization,
    Signup, Workspace,
};

use crate::error::ApiError;

#[async_trait]
pub trait WikiApi: Send + Sync {
    // ---- auth ----

    /// Start sign-in; returns the verify token the code is checked against.
    async fn login(&self, email: &str) -> Result<String, ApiError>;

    /// Register a new account; returns the verify token.
    async fn signup(&self, signup: &Signup) -> Result<String, ApiError>;

    /// Exchange the e-mailed code for an access token and remember it.
    async fn verify(&self, verify_token: &str, code: &str) -> Result<String, ApiError>;

    /// Forget the access token.
    async fn logout(&self) -> Result<(), ApiError>;

    async fn me(&self) -> Result<User, ApiError>;

    // ---- users & organizations ----

    async fn users(&self) -> Result<Vec<User>, ApiError>;

    async fn approve_user(&self, username: &str, approval: &ApproveUser) -> Result<(), ApiError>;

    /// Admin only: create an account that is approved from the start.
    async fn create_approved_user(&self, user: &NewApprovedUser) -> Result<User, ApiError>;

    async fn organizations(&self) -> Result<Vec<Organization>, ApiError>;

    async fn create_organization(&self, organization: &NewOrganization) -> Result<(), ApiError>;

    // ---- workspaces & documents ----

    async fn workspaces(&self) -> Result<Vec<Workspace>, ApiError>;

    async fn create_workspace(&self, workspace: &NewWorkspace) -> Result<(), ApiError>;

    async fn workspace_info(&self, workspace_id: ObjectId) -> Result<Workspace, ApiError>;

    async fn document_tree(&self, workspace_id: ObjectId) -> Result<DocumentTree, ApiError>;

    /// Title and placement of one document.
    async fn document_info(&self, document_id: ObjectId) -> Result<Document, ApiError>;

    async fn create_document(&self, document: &NewDocument) -> Result<(), ApiError>;

    /// Commit the document's current blocks as a new version.
    async fn save_document(&self, document_id: ObjectId) -> Result<(), ApiError>;

    async fn publish_document(&self, document_id: ObjectId) -> Result<(), ApiError>;

    // ---- blocks ----

    async fn get_blocks(&self, document_id: ObjectId) -> Result<Vec<Block>, ApiError>;

    /// Create an empty block; the server assigns its id.
    async fn add_block(
        &self,
        document_id: ObjectId,
        position: i32,
        kind: BlockKind,
    ) -> Result<(), ApiError>;

    async fn delete_block(&self, block_id: ObjectId) -> Result<(), ApiError>;

    async fn update_block_data(
        &self,
        block_id: ObjectId,
        kind: BlockKind,
        content: &str,
    ) -> Result<(), ApiError>;

    // ---- versioning ----

    async fn block_versions(&self, block_id: ObjectId) -> Result<Vec<Version>, ApiError>;

    async fn document_versions(&self, document_id: ObjectId) -> Result<Vec<Version>, ApiError>;

    /// Restore a block to `commit_id`; the server commits a new version and
    /// returns the restored block.
    async fn rollback_block(&self, block_id: ObjectId, commit_id: &str) -> Result<Block, ApiError>;

    /// Restore every block of a document to `commit_id`.
    async fn rollback_document(
        &self,
        document_id: ObjectId,
        commit_id: &str,
    ) -> Result<Vec<Block>, ApiError>;

    /// Server-side `ndiff` of a block between two commits.
    async fn block_diff(
        &self,
        block_id: ObjectId,
        commit_id_1: &str,
        commit_id_2: &str,
    ) -> Result<String, ApiError>;
}

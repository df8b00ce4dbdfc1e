//! Workspace selection and the document tree around the editor.
//!
//! Admin-only calls are checked against the cached user before any request
//! is made; the backend enforces the same rules.

use std::sync::Arc;

use wikidocs_client::WikiApi;
use wikidocs_core::document::DocumentTree;
use wikidocs_core::types::ObjectId;
use wikidocs_core::user::User;
use wikidocs_core::workspace::{
    ApproveUser, NewApprovedUser, NewDocument, NewOrganization, NewWorkspace, Organization,
    Workspace,
};

use crate::error::{EditorError, EditorResult};

pub struct Navigator {
    api: Arc<dyn WikiApi>,
    user: Option<User>,
    workspace: Option<Workspace>,
    tree: DocumentTree,
}

impl Navigator {
    pub fn new(api: Arc<dyn WikiApi>) -> Self {
        Self {
            api,
            user: None,
            workspace: None,
            tree: DocumentTree::default(),
        }
    }

    pub fn user(&self) -> Option<&User> {
        self.user.as_ref()
    }

    pub fn workspace(&self) -> Option<&Workspace> {
        self.workspace.as_ref()
    }

    pub fn tree(&self) -> &DocumentTree {
        &self.tree
    }

    /// Fetch the signed-in user and cache it.
    pub async fn refresh_user(&mut self) -> EditorResult<&User> {
        let user = self.api.me().await?;
        tracing::debug!(email = %user.email, approved = user.is_approved(), "User refreshed");
        Ok(&*self.user.insert(user))
    }

    async fn require_admin(&mut self) -> EditorResult<()> {
        if self.user.is_none() {
            self.refresh_user().await?;
        }
        if let Some(user) = &self.user {
            user.require_admin()?;
        }
        Ok(())
    }

    /// Every workspace the signed-in user can see.
    pub async fn workspaces(&self) -> EditorResult<Vec<Workspace>> {
        Ok(self.api.workspaces().await?)
    }

    /// Make `workspace_id` current and load its document tree.
    pub async fn select_workspace(&mut self, workspace_id: ObjectId) -> EditorResult<&DocumentTree> {
        let workspace = self.api.workspace_info(workspace_id).await?;
        let tree = self.api.document_tree(workspace_id).await?;
        tracing::info!(%workspace_id, documents = tree.len(), "Workspace selected");
        self.workspace = Some(workspace);
        self.tree = tree;
        Ok(&self.tree)
    }

    pub async fn create_workspace(&self, title: &str) -> EditorResult<()> {
        let body = NewWorkspace {
            title: title.trim().to_string(),
        };
        self.api.create_workspace(&body).await?;
        tracing::info!(title = %body.title, "Workspace created");
        Ok(())
    }

    /// Create a document in the current workspace and reload the tree.
    pub async fn create_document(
        &mut self,
        title: &str,
        parent_document_id: Option<ObjectId>,
    ) -> EditorResult<&DocumentTree> {
        let workspace_id = self
            .workspace
            .as_ref()
            .map(|w| w.id)
            .ok_or(EditorError::NoWorkspace)?;
        let body = NewDocument {
            title: title.trim().to_string(),
            workspace_id,
            parent_document_id,
        };
        self.api.create_document(&body).await?;
        tracing::info!(%workspace_id, title = %body.title, "Document created");

        self.tree = self.api.document_tree(workspace_id).await?;
        Ok(&self.tree)
    }

    /// All organizations; used to pick one at sign-up.
    pub async fn organizations(&self) -> EditorResult<Vec<Organization>> {
        Ok(self.api.organizations().await?)
    }

    /// Admin only: every account, approved or not.
    pub async fn users(&mut self) -> EditorResult<Vec<User>> {
        self.require_admin().await?;
        Ok(self.api.users().await?)
    }

    pub async fn approve_user(&mut self, username: &str, approval: &ApproveUser) -> EditorResult<()> {
        self.require_admin().await?;
        self.api.approve_user(username, approval).await?;
        tracing::info!(username, responsibility = %approval.responsibility, "User approved");
        Ok(())
    }

    /// Admin only: create an account that can sign in and work right away.
    pub async fn create_approved_user(&mut self, new_user: &NewApprovedUser) -> EditorResult<User> {
        self.require_admin().await?;
        let user = self.api.create_approved_user(new_user).await?;
        tracing::info!(
            username = %new_user.username,
            responsibility = %new_user.wiki_api_client.responsibility,
            "Approved user created"
        );
        Ok(user)
    }

    pub async fn create_organization(&mut self, organization: &NewOrganization) -> EditorResult<()> {
        self.require_admin().await?;
        self.api.create_organization(organization).await?;
        tracing::info!(name = %organization.name, "Organization created");
        Ok(())
    }
}

//! In-memory [`WikiApi`] used by the editor tests.
//!
//! Keeps a server-side copy of every document's blocks, records each call in
//! arrival order and can be told to fail specific requests.

#![allow(dead_code)]

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use uuid::Uuid;
use wikidocs_client::{ApiError, WikiApi};
use wikidocs_core::block::{Block, BlockKind};
use wikidocs_core::document::{Document, DocumentNode, DocumentTree};
use wikidocs_core::types::ObjectId;
use wikidocs_core::user::{Responsibility, User, WikiApiClient};
use wikidocs_core::version::Version;
use wikidocs_core::workspace::{
    ApproveUser, NewApprovedUser, NewDocument, NewOrganization, NewWorkspace, Organization,
    Signup, Workspace,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    GetBlocks(ObjectId),
    UpdateBlock { block_id: ObjectId, content: String },
    SaveDocument(ObjectId),
    AddBlock { document_id: ObjectId, position: i32, kind: BlockKind },
    DeleteBlock(ObjectId),
    PublishDocument(ObjectId),
    BlockVersions(ObjectId),
    DocumentVersions(ObjectId),
    RollbackBlock { block_id: ObjectId, commit_id: String },
    RollbackDocument { document_id: ObjectId, commit_id: String },
    BlockDiff(ObjectId),
    Me,
    Users,
    ApproveUser(String),
    CreateApprovedUser(String),
    CreateOrganization(String),
    WorkspaceInfo(ObjectId),
    DocumentTree(ObjectId),
    CreateWorkspace(String),
    CreateDocument(String),
}

#[derive(Default)]
struct Inner {
    calls: Vec<Call>,
    blocks: HashMap<ObjectId, Vec<Block>>,
    versions: HashMap<ObjectId, Vec<Version>>,
    snapshots: HashMap<String, String>,
    user: Option<User>,
    tree: Vec<DocumentNode>,
    failing_updates: HashSet<ObjectId>,
    fail_get_blocks: bool,
    fail_versions: bool,
    update_delay: Option<Duration>,
}

#[derive(Default)]
pub struct FakeApi {
    inner: Mutex<Inner>,
}

fn unavailable() -> ApiError {
    ApiError::Api {
        status: 503,
        message: "Service unavailable".into(),
    }
}

fn not_found() -> ApiError {
    ApiError::Api {
        status: 404,
        message: "Not found".into(),
    }
}

pub fn text_block(document_id: ObjectId, position: i32, content: &str) -> Block {
    Block {
        id: Uuid::new_v4(),
        document_id,
        position,
        kind: BlockKind::Text,
        content: content.into(),
        link: None,
        created_at: None,
    }
}

pub fn version(object_id: ObjectId, hex: char) -> Version {
    Version {
        id: hex.to_string().repeat(64),
        wiki_object_id: object_id,
        committer: None,
        created_at: None,
    }
}

pub fn user(responsibility: Option<Responsibility>) -> User {
    User {
        id: Uuid::new_v4(),
        email: "ann@example.com".into(),
        username: Some("ann".into()),
        first_name: None,
        last_name: None,
        second_name: None,
        position: None,
        wiki_api_client: responsibility.map(|responsibility| WikiApiClient {
            id: None,
            description: None,
            responsibility,
            is_enabled: true,
        }),
    }
}

impl FakeApi {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    fn with<R>(&self, f: impl FnOnce(&mut Inner) -> R) -> R {
        f(&mut self.inner.lock().unwrap())
    }

    pub fn put_document(&self, document_id: ObjectId, blocks: Vec<Block>) {
        self.with(|i| i.blocks.insert(document_id, blocks));
    }

    pub fn put_versions(&self, object_id: ObjectId, versions: Vec<Version>) {
        self.with(|i| i.versions.insert(object_id, versions));
    }

    /// Content a block or document returns to when rolled back to `commit_id`.
    pub fn put_snapshot(&self, commit_id: &str, content: &str) {
        self.with(|i| i.snapshots.insert(commit_id.into(), content.into()));
    }

    pub fn set_user(&self, user: User) {
        self.with(|i| i.user = Some(user));
    }

    pub fn set_tree(&self, roots: Vec<DocumentNode>) {
        self.with(|i| i.tree = roots);
    }

    pub fn fail_update_of(&self, block_id: ObjectId) {
        self.with(|i| i.failing_updates.insert(block_id));
    }

    pub fn heal(&self) {
        self.with(|i| {
            i.failing_updates.clear();
            i.fail_get_blocks = false;
            i.fail_versions = false;
        });
    }

    pub fn fail_get_blocks(&self) {
        self.with(|i| i.fail_get_blocks = true);
    }

    pub fn fail_versions(&self) {
        self.with(|i| i.fail_versions = true);
    }

    /// Make every block update take `delay` before answering.
    pub fn slow_updates(&self, delay: Duration) {
        self.with(|i| i.update_delay = Some(delay));
    }

    pub fn calls(&self) -> Vec<Call> {
        self.with(|i| i.calls.clone())
    }

    pub fn clear_calls(&self) {
        self.with(|i| i.calls.clear());
    }

    /// Calls that write: block updates and document saves.
    pub fn saves(&self) -> Vec<Call> {
        self.calls()
            .into_iter()
            .filter(|c| matches!(c, Call::UpdateBlock { .. } | Call::SaveDocument(_)))
            .collect()
    }

    pub fn server_blocks(&self, document_id: ObjectId) -> Vec<Block> {
        self.with(|i| i.blocks.get(&document_id).cloned().unwrap_or_default())
    }

    fn record(&self, call: Call) {
        self.with(|i| i.calls.push(call));
    }
}

#[async_trait]
impl WikiApi for FakeApi {
    async fn login(&self, _email: &str) -> Result<String, ApiError> {
        Ok("verify-token".into())
    }

    async fn signup(&self, _signup: &Signup) -> Result<String, ApiError> {
        Ok("verify-token".into())
    }

    async fn verify(&self, _verify_token: &str, _code: &str) -> Result<String, ApiError> {
        Ok("access-token".into())
    }

    async fn logout(&self) -> Result<(), ApiError> {
        Ok(())
    }

    async fn me(&self) -> Result<User, ApiError> {
        self.record(Call::Me);
        self.with(|i| i.user.clone()).ok_or(ApiError::Unauthenticated)
    }

    async fn users(&self) -> Result<Vec<User>, ApiError> {
        self.record(Call::Users);
        Ok(self.with(|i| i.user.clone()).into_iter().collect())
    }

    async fn approve_user(&self, username: &str, _approval: &ApproveUser) -> Result<(), ApiError> {
        self.record(Call::ApproveUser(username.into()));
        Ok(())
    }

    async fn create_approved_user(&self, new: &NewApprovedUser) -> Result<User, ApiError> {
        self.record(Call::CreateApprovedUser(new.username.clone()));
        Ok(User {
            id: Uuid::new_v4(),
            email: new.email.clone(),
            username: Some(new.username.clone()),
            first_name: Some(new.first_name.clone()),
            last_name: Some(new.last_name.clone()),
            second_name: new.second_name.clone(),
            position: new.position.clone(),
            wiki_api_client: Some(WikiApiClient {
                id: Some(Uuid::new_v4()),
                description: Some(new.wiki_api_client.description.clone()),
                responsibility: new.wiki_api_client.responsibility,
                is_enabled: new.wiki_api_client.is_enabled,
            }),
        })
    }

    async fn organizations(&self) -> Result<Vec<Organization>, ApiError> {
        Ok(Vec::new())
    }

    async fn create_organization(&self, organization: &NewOrganization) -> Result<(), ApiError> {
        self.record(Call::CreateOrganization(organization.name.clone()));
        Ok(())
    }

    async fn workspaces(&self) -> Result<Vec<Workspace>, ApiError> {
        Ok(Vec::new())
    }

    async fn create_workspace(&self, workspace: &NewWorkspace) -> Result<(), ApiError> {
        self.record(Call::CreateWorkspace(workspace.title.clone()));
        Ok(())
    }

    async fn workspace_info(&self, workspace_id: ObjectId) -> Result<Workspace, ApiError> {
        self.record(Call::WorkspaceInfo(workspace_id));
        Ok(Workspace {
            id: workspace_id,
            title: "Handbook".into(),
            owner_user: None,
        })
    }

    async fn document_tree(&self, workspace_id: ObjectId) -> Result<DocumentTree, ApiError> {
        self.record(Call::DocumentTree(workspace_id));
        Ok(DocumentTree::new(self.with(|i| i.tree.clone())))
    }

    async fn document_info(&self, _document_id: ObjectId) -> Result<Document, ApiError> {
        Err(not_found())
    }

    async fn create_document(&self, document: &NewDocument) -> Result<(), ApiError> {
        self.record(Call::CreateDocument(document.title.clone()));
        let node = DocumentNode {
            id: Uuid::new_v4(),
            title: document.title.clone(),
            children: Vec::new(),
        };
        self.with(|i| i.tree.push(node));
        Ok(())
    }

    async fn save_document(&self, document_id: ObjectId) -> Result<(), ApiError> {
        self.record(Call::SaveDocument(document_id));
        Ok(())
    }

    async fn publish_document(&self, document_id: ObjectId) -> Result<(), ApiError> {
        self.record(Call::PublishDocument(document_id));
        Ok(())
    }

    async fn get_blocks(&self, document_id: ObjectId) -> Result<Vec<Block>, ApiError> {
        self.record(Call::GetBlocks(document_id));
        self.with(|i| {
            if i.fail_get_blocks {
                return Err(unavailable());
            }
            i.blocks.get(&document_id).cloned().ok_or_else(not_found)
        })
    }

    async fn add_block(
        &self,
        document_id: ObjectId,
        position: i32,
        kind: BlockKind,
    ) -> Result<(), ApiError> {
        self.record(Call::AddBlock {
            document_id,
            position,
            kind,
        });
        self.with(|i| {
            let blocks = i.blocks.entry(document_id).or_default();
            for block in blocks.iter_mut().filter(|b| b.position >= position) {
                block.position += 1;
            }
            blocks.push(Block {
                id: Uuid::new_v4(),
                document_id,
                position,
                kind,
                content: String::new(),
                link: None,
                created_at: None,
            });
        });
        Ok(())
    }

    async fn delete_block(&self, block_id: ObjectId) -> Result<(), ApiError> {
        self.record(Call::DeleteBlock(block_id));
        self.with(|i| {
            for blocks in i.blocks.values_mut() {
                blocks.retain(|b| b.id != block_id);
            }
        });
        Ok(())
    }

    async fn update_block_data(
        &self,
        block_id: ObjectId,
        _kind: BlockKind,
        content: &str,
    ) -> Result<(), ApiError> {
        self.record(Call::UpdateBlock {
            block_id,
            content: content.into(),
        });
        if let Some(delay) = self.with(|i| i.update_delay) {
            tokio::time::sleep(delay).await;
        }
        self.with(|i| {
            if i.failing_updates.contains(&block_id) {
                return Err(unavailable());
            }
            let block = i
                .blocks
                .values_mut()
                .flat_map(|blocks| blocks.iter_mut())
                .find(|b| b.id == block_id)
                .ok_or_else(not_found)?;
            block.content = content.into();
            Ok(())
        })
    }

    async fn block_versions(&self, block_id: ObjectId) -> Result<Vec<Version>, ApiError> {
        self.record(Call::BlockVersions(block_id));
        self.with(|i| {
            if i.fail_versions {
                return Err(unavailable());
            }
            Ok(i.versions.get(&block_id).cloned().unwrap_or_default())
        })
    }

    async fn document_versions(&self, document_id: ObjectId) -> Result<Vec<Version>, ApiError> {
        self.record(Call::DocumentVersions(document_id));
        self.with(|i| {
            if i.fail_versions {
                return Err(unavailable());
            }
            Ok(i.versions.get(&document_id).cloned().unwrap_or_default())
        })
    }

    async fn rollback_block(&self, block_id: ObjectId, commit_id: &str) -> Result<Block, ApiError> {
        self.record(Call::RollbackBlock {
            block_id,
            commit_id: commit_id.into(),
        });
        self.with(|i| {
            let content = i.snapshots.get(commit_id).cloned().ok_or_else(not_found)?;
            let block = i
                .blocks
                .values_mut()
                .flat_map(|blocks| blocks.iter_mut())
                .find(|b| b.id == block_id)
                .ok_or_else(not_found)?;
            block.content = content;
            Ok(block.clone())
        })
    }

    /// Every block of the document gets the snapshot content.
    async fn rollback_document(
        &self,
        document_id: ObjectId,
        commit_id: &str,
    ) -> Result<Vec<Block>, ApiError> {
        self.record(Call::RollbackDocument {
            document_id,
            commit_id: commit_id.into(),
        });
        self.with(|i| {
            let content = i.snapshots.get(commit_id).cloned().ok_or_else(not_found)?;
            let blocks = i.blocks.get_mut(&document_id).ok_or_else(not_found)?;
            for block in blocks.iter_mut() {
                block.content = content.clone();
            }
            Ok(blocks.clone())
        })
    }

    async fn block_diff(
        &self,
        block_id: ObjectId,
        commit_id_1: &str,
        commit_id_2: &str,
    ) -> Result<String, ApiError> {
        self.record(Call::BlockDiff(block_id));
        Ok(format!("- {commit_id_1}\n+ {commit_id_2}"))
    }
}

//! REST implementation of [`WikiApi`].

use std::sync::Arc;

use async_trait::async_trait;
use reqwest::Method;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use wikidocs_core::block::{Block, BlockKind};
use wikidocs_core::document::{Document, DocumentTree};
use wikidocs_core::types::ObjectId;
use wikidocs_core::user::User;
use wikidocs_core::version::Version;
use wikidocs_core::workspace::{
    ApproveUser, NewApprovedUser, NewBlock, NewDocument, NewOrganization, NewWorkspace,
    Organization, Signup, Workspace,
};
use wikidocs_core::error::CoreError;

use crate::api::WikiApi;
use crate::config::ClientConfig;
use crate::error::ApiError;
use crate::token::TokenStore;

/// HTTP client for one wiki backend.
pub struct HttpWikiApi {
    client: reqwest::Client,
    api_url: String,
    tokens: Arc<TokenStore>,
}

/// Response of `POST /auth/login` and `POST /auth/signup`.
#[derive(Debug, Deserialize)]
struct VerifyTokenResponse {
    verify_token: String,
}

/// Response of `GET /auth/verify`; `msg` carries the access token.
#[derive(Debug, Deserialize)]
struct AccessTokenResponse {
    msg: String,
}

/// Paginated list envelope used by the user and organization listings.
#[derive(Debug, Deserialize)]
struct Items<T> {
    items: Vec<T>,
}

/// Error body shapes the backend produces.
#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    detail: Option<serde_json::Value>,
}

impl HttpWikiApi {
    /// Create a client for `api_url` (e.g. `http://host:8000/api/v1`).
    pub fn new(api_url: impl Into<String>) -> Self {
        Self::with_client(reqwest::Client::new(), api_url, Arc::new(TokenStore::default()))
    }

    /// Reuse an existing [`reqwest::Client`] and token store.
    pub fn with_client(
        client: reqwest::Client,
        api_url: impl Into<String>,
        tokens: Arc<TokenStore>,
    ) -> Self {
        Self {
            client,
            api_url: api_url.into().trim_end_matches('/').to_string(),
            tokens,
        }
    }

    /// Build a client from configuration, applying the request timeout and
    /// any stored token.
    pub fn from_config(config: &ClientConfig) -> Result<Self, ApiError> {
        let client = reqwest::Client::builder()
            .timeout(config.request_timeout())
            .build()?;
        let tokens = Arc::new(TokenStore::new(config.token.clone()));
        Ok(Self::with_client(client, config.api_url.clone(), tokens))
    }

    pub fn tokens(&self) -> &Arc<TokenStore> {
        &self.tokens
    }

    pub fn api_url(&self) -> &str {
        &self.api_url
    }

    // ---- private helpers ----

    fn request(&self, method: Method, path: &str) -> reqwest::RequestBuilder {
        tracing::debug!(%method, path, "Wiki API request");
        let builder = self
            .client
            .request(method, format!("{}{}", self.api_url, path));
        match self.tokens.get() {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    fn authed(&self, method: Method, path: &str) -> Result<reqwest::RequestBuilder, ApiError> {
        if !self.tokens.is_signed_in() {
            return Err(ApiError::Unauthenticated);
        }
        Ok(self.request(method, path))
    }

    /// Ensure the response has a success status code, turning the body into
    /// an [`ApiError::Api`] otherwise.
    async fn ensure_success(response: reqwest::Response) -> Result<reqwest::Response, ApiError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response
            .text()
            .await
            .unwrap_or_else(|_| "<unreadable body>".to_string());
        let message = extract_error_message(&body).unwrap_or(body);
        tracing::warn!(status = status.as_u16(), %message, "Wiki API returned an error");
        Err(ApiError::Api {
            status: status.as_u16(),
            message,
        })
    }

    /// Send and decode a JSON response body.
    async fn fetch<T: DeserializeOwned>(builder: reqwest::RequestBuilder) -> Result<T, ApiError> {
        let response = Self::ensure_success(builder.send().await?).await?;
        let body = response.text().await?;
        Ok(serde_json::from_str(&body)?)
    }

    /// Send and discard the response body.
    async fn execute(builder: reqwest::RequestBuilder) -> Result<(), ApiError> {
        Self::ensure_success(builder.send().await?).await?;
        Ok(())
    }
}

/// Pull the human-readable message out of an error body, if it has one.
fn extract_error_message(body: &str) -> Option<String> {
    let parsed: ErrorBody = serde_json::from_str(body).ok()?;
    if let Some(message) = parsed.message {
        return Some(message);
    }
    match parsed.detail? {
        serde_json::Value::String(s) => Some(s),
        other => Some(other.to_string()),
    }
}

#[async_trait]
impl WikiApi for HttpWikiApi {
    async fn login(&self, email: &str) -> Result<String, ApiError> {
        let body = serde_json::json!({ "email": email });
        let resp: VerifyTokenResponse =
            Self::fetch(self.request(Method::POST, "/auth/login").json(&body)).await?;
        Ok(resp.verify_token)
    }

    async fn signup(&self, signup: &Signup) -> Result<String, ApiError> {
        let resp: VerifyTokenResponse =
            Self::fetch(self.request(Method::POST, "/auth/signup").json(signup)).await?;
        Ok(resp.verify_token)
    }

    async fn verify(&self, verify_token: &str, code: &str) -> Result<String, ApiError> {
        let resp: AccessTokenResponse = Self::fetch(
            self.request(Method::GET, "/auth/verify")
                .query(&[("token", verify_token), ("verification_code", code)]),
        )
        .await?;
        self.tokens.set(resp.msg.clone());
        tracing::info!("Signed in");
        Ok(resp.msg)
    }

    async fn logout(&self) -> Result<(), ApiError> {
        self.tokens.clear();
        tracing::info!("Signed out");
        Ok(())
    }

    async fn me(&self) -> Result<User, ApiError> {
        Self::fetch(self.authed(Method::GET, "/user/me")?).await
    }

    async fn users(&self) -> Result<Vec<User>, ApiError> {
        let page: Items<User> = Self::fetch(self.authed(Method::GET, "/user/all")?).await?;
        Ok(page.items)
    }

    async fn approve_user(&self, username: &str, approval: &ApproveUser) -> Result<(), ApiError> {
        Self::execute(
            self.authed(Method::POST, "/admins/approve_user")?
                .query(&[("username", username)])
                .json(approval),
        )
        .await
    }

    async fn create_approved_user(&self, user: &NewApprovedUser) -> Result<User, ApiError> {
        Self::fetch(self.authed(Method::POST, "/user/verified")?.json(user)).await
    }

    async fn organizations(&self) -> Result<Vec<Organization>, ApiError> {
        let page: Items<Organization> =
            Self::fetch(self.authed(Method::GET, "/organization/all")?).await?;
        Ok(page.items)
    }

    async fn create_organization(&self, organization: &NewOrganization) -> Result<(), ApiError> {
        Self::execute(self.authed(Method::POST, "/organization/")?.json(organization)).await
    }

    async fn workspaces(&self) -> Result<Vec<Workspace>, ApiError> {
        Self::fetch(self.authed(Method::GET, "/workspace/all")?).await
    }

    async fn create_workspace(&self, workspace: &NewWorkspace) -> Result<(), ApiError> {
        Self::execute(self.authed(Method::POST, "/workspace")?.json(workspace)).await
    }

    async fn workspace_info(&self, workspace_id: ObjectId) -> Result<Workspace, ApiError> {
        Self::fetch(
            self.authed(Method::GET, "/workspace/info")?
                .query(&[("workspace_id", workspace_id.to_string())]),
        )
        .await
    }

    async fn document_tree(&self, workspace_id: ObjectId) -> Result<DocumentTree, ApiError> {
        Self::fetch(
            self.authed(Method::GET, "/document/tree")?
                .query(&[("workspace_id", workspace_id.to_string())]),
        )
        .await
    }

    async fn document_info(&self, document_id: ObjectId) -> Result<Document, ApiError> {
        Self::fetch(
            self.authed(Method::GET, "/document/info")?
                .query(&[("document_id", document_id.to_string())]),
        )
        .await
    }

    async fn create_document(&self, document: &NewDocument) -> Result<(), ApiError> {
        Self::execute(self.authed(Method::POST, "/document")?.json(document)).await
    }

    async fn save_document(&self, document_id: ObjectId) -> Result<(), ApiError> {
        Self::execute(self.authed(Method::POST, &format!("/document/{document_id}/save"))?).await
    }

    async fn publish_document(&self, document_id: ObjectId) -> Result<(), ApiError> {
        Self::execute(self.authed(Method::POST, &format!("/document/{document_id}/publish"))?)
            .await
    }

    async fn get_blocks(&self, document_id: ObjectId) -> Result<Vec<Block>, ApiError> {
        Self::fetch(
            self.authed(Method::GET, "/blocks/data")?
                .query(&[("document_id", document_id.to_string())]),
        )
        .await
    }

    async fn add_block(
        &self,
        document_id: ObjectId,
        position: i32,
        kind: BlockKind,
    ) -> Result<(), ApiError> {
        let body = NewBlock {
            document_id,
            position,
            type_block: kind,
        };
        body.validate()?;
        Self::execute(self.authed(Method::POST, "/blocks")?.json(&body)).await
    }

    async fn delete_block(&self, block_id: ObjectId) -> Result<(), ApiError> {
        Self::execute(
            self.authed(Method::DELETE, "/blocks")?
                .query(&[("block_id", block_id.to_string())]),
        )
        .await
    }

    async fn update_block_data(
        &self,
        block_id: ObjectId,
        kind: BlockKind,
        content: &str,
    ) -> Result<(), ApiError> {
        if kind == BlockKind::Unsupported {
            return Err(CoreError::Validation(format!(
                "block {block_id} has a kind this client cannot write"
            ))
            .into());
        }
        let body = serde_json::json!({
            "block_id": block_id,
            "type_block": kind.as_str(),
            "content": content,
        });
        Self::execute(self.authed(Method::PUT, "/blocks/data")?.json(&body)).await
    }

    async fn block_versions(&self, block_id: ObjectId) -> Result<Vec<Version>, ApiError> {
        Self::fetch(self.authed(Method::GET, &format!("/versioning/block/{block_id}/info"))?).await
    }

    async fn document_versions(&self, document_id: ObjectId) -> Result<Vec<Version>, ApiError> {
        Self::fetch(self.authed(
            Method::GET,
            &format!("/versioning/document/{document_id}/info"),
        )?)
        .await
    }

    async fn rollback_block(&self, block_id: ObjectId, commit_id: &str) -> Result<Block, ApiError> {
        Self::fetch(
            self.authed(Method::POST, &format!("/versioning/block/{block_id}/rollback"))?
                .query(&[("rollback_commit_id", commit_id)]),
        )
        .await
    }

    async fn rollback_document(
        &self,
        document_id: ObjectId,
        commit_id: &str,
    ) -> Result<Vec<Block>, ApiError> {
        Self::fetch(
            self.authed(
                Method::POST,
                &format!("/versioning/document/{document_id}/rollback"),
            )?
            .query(&[("rollback_commit_id", commit_id)]),
        )
        .await
    }

    async fn block_diff(
        &self,
        block_id: ObjectId,
        commit_id_1: &str,
        commit_id_2: &str,
    ) -> Result<String, ApiError> {
        Self::fetch(
            self.authed(Method::GET, &format!("/versioning/block/{block_id}/diff"))?
                .query(&[("commit_id_1", commit_id_1), ("commit_id_2", commit_id_2)]),
        )
        .await
    }
}

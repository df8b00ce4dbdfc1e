//! Subcommands of the `wikidocs` binary.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use uuid::Uuid;

use wikidocs_client::{ClientConfig, HttpWikiApi, WikiApi};
use wikidocs_core::block::BlockKind;
use wikidocs_core::render::BlockMode;
use wikidocs_editor::{BlockComponent, DocumentSession, Navigator, SessionEvent, VersionList};

#[derive(Debug, Parser)]
#[command(name = "wikidocs", version, about = "Command-line client for the wiki editor")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Request a verification code by e-mail.
    Login { email: String },
    /// Exchange the verification code for an access token.
    Verify { verify_token: String, code: String },
    /// Show the signed-in user.
    Me,
    /// List workspaces.
    Workspaces,
    /// Print the document tree of a workspace.
    Tree { workspace_id: Uuid },
    /// Print the blocks of a document.
    Blocks { document_id: Uuid },
    /// Replace the content of one block and save the document.
    Edit {
        document_id: Uuid,
        block_id: Uuid,
        content: String,
        /// Let the autosave timer flush instead of saving immediately.
        #[arg(long)]
        wait: bool,
    },
    /// Add an empty block.
    AddBlock {
        document_id: Uuid,
        #[arg(long, default_value_t = 0)]
        position: i32,
        /// TEXT or IMG.
        #[arg(long, default_value = "TEXT", value_parser = parse_kind)]
        kind: BlockKind,
    },
    /// Delete a block.
    DeleteBlock { document_id: Uuid, block_id: Uuid },
    /// List the versions of a block (or of a document with --document).
    Versions {
        id: Uuid,
        #[arg(long)]
        document: bool,
    },
    /// Restore a block (or a document with --document) to a commit.
    Rollback {
        id: Uuid,
        commit_id: String,
        #[arg(long)]
        document: bool,
    },
    /// Server-side diff of a block between two commits.
    Diff {
        block_id: Uuid,
        commit_id_1: String,
        commit_id_2: String,
    },
    /// Line diff of a block's current content against a text file, computed locally.
    DiffLocal {
        document_id: Uuid,
        block_id: Uuid,
        /// File holding the content to compare with (e.g. an exported snapshot).
        against: PathBuf,
    },
    /// Make a document publicly visible.
    Publish { document_id: Uuid },
}

fn parse_kind(s: &str) -> Result<BlockKind, String> {
    BlockKind::parse(s).ok_or_else(|| format!("unknown block kind '{s}' (expected TEXT or IMG)"))
}

pub async fn run(command: Command, api: Arc<HttpWikiApi>, config: &ClientConfig) -> anyhow::Result<()> {
    match command {
        Command::Login { email } => {
            let verify_token = api.login(&email).await?;
            println!("Verification code sent to {email}.");
            println!("verify token: {verify_token}");
        }
        Command::Verify { verify_token, code } => {
            let token = api
                .verify(&verify_token, &code)
                .await
                .map_err(|e| anyhow::anyhow!(e.user_message()))?;
            println!("Signed in. Export the token to stay signed in:");
            println!("WIKI_TOKEN={token}");
        }
        Command::Me => {
            let user = api.me().await?;
            println!("{} <{}>", user.username.as_deref().unwrap_or("-"), user.email);
            match user.responsibility() {
                Some(r) => println!("role: {r}"),
                None => println!("role: awaiting approval"),
            }
        }
        Command::Workspaces => {
            let nav = Navigator::new(api);
            for ws in nav.workspaces().await? {
                println!("{}  {}", ws.id, ws.title);
            }
        }
        Command::Tree { workspace_id } => {
            let mut nav = Navigator::new(api);
            let tree = nav.select_workspace(workspace_id).await?;
            if tree.is_empty() {
                println!("(no documents)");
            }
            for (depth, node) in tree.walk() {
                println!("{}{}  {}", "  ".repeat(depth), node.id, node.title);
            }
        }
        Command::Blocks { document_id } => {
            let document = api.document_info(document_id).await?;
            println!("{}", document.title);
            let session = open(api, config, document_id).await?;
            for block in session.blocks().await {
                println!("#{} {} [{}]", block.position, block.id, block.kind);
                println!("{}", block.content);
            }
        }
        Command::Edit {
            document_id,
            block_id,
            content,
            wait,
        } => {
            let session = open(api, config, document_id).await?;
            let block = session
                .block(block_id)
                .await
                .with_context(|| format!("block {block_id} is not in document {document_id}"))?;

            let mut events = session.subscribe();
            let mut component = BlockComponent::new(session.clone(), block, BlockMode::Edit);
            component.apply_edit(content).await?;

            if wait {
                tracing::info!(delay_ms = config.autosave_delay_ms, "Waiting for autosave");
                loop {
                    match events.recv().await? {
                        SessionEvent::Saved { .. } => break,
                        SessionEvent::SaveFailed { error, .. } => bail!("autosave failed: {error}"),
                        _ => {}
                    }
                }
            } else {
                session.save_now().await?;
            }
            println!("Saved.");
        }
        Command::AddBlock {
            document_id,
            position,
            kind,
        } => {
            let session = open(api, config, document_id).await?;
            session.add_block(position, kind).await?;
            session.close().await?;
            println!("Document now has {} blocks.", session.blocks().await.len());
        }
        Command::DeleteBlock {
            document_id,
            block_id,
        } => {
            let session = open(api, config, document_id).await?;
            session.delete_block(block_id).await?;
            println!("Deleted. {} blocks left.", session.blocks().await.len());
        }
        Command::Versions { id, document } => {
            let mut list = VersionList::for_object(api, id, !document);
            list.mount().await;
            if list.is_loading() {
                bail!("could not load versions");
            }
            for version in list.versions() {
                let who = version
                    .committer
                    .as_ref()
                    .map(|c| c.display_name())
                    .unwrap_or_default();
                let when = version
                    .created_at
                    .map(|t| t.to_rfc3339())
                    .unwrap_or_default();
                println!("{}  {when}  {who}", version.id);
            }
        }
        Command::Rollback {
            id,
            commit_id,
            document,
        } => {
            if document {
                let session = open(api, config, id).await?;
                session.rollback_document(&commit_id).await?;
                println!("Document restored ({} blocks).", session.blocks().await.len());
            } else {
                let block = api.rollback_block(id, &commit_id).await?;
                println!("{}", block.content);
            }
        }
        Command::Diff {
            block_id,
            commit_id_1,
            commit_id_2,
        } => {
            print!("{}", api.block_diff(block_id, &commit_id_1, &commit_id_2).await?);
        }
        Command::DiffLocal {
            document_id,
            block_id,
            against,
        } => {
            let previous = tokio::fs::read_to_string(&against)
                .await
                .with_context(|| format!("failed to read {}", against.display()))?;
            let session = open(api, config, document_id).await?;
            let block = session
                .block(block_id)
                .await
                .with_context(|| format!("block {block_id} is not in document {document_id}"))?;
            let component = BlockComponent::new(session, block, BlockMode::View);
            match component.describe_changes_since(&previous) {
                Some(diff) => println!("{diff}"),
                None => println!("No changes."),
            }
        }
        Command::Publish { document_id } => {
            let session = open(api, config, document_id).await?;
            session.publish().await?;
            println!("Published.");
        }
    }
    Ok(())
}

async fn open(
    api: Arc<HttpWikiApi>,
    config: &ClientConfig,
    document_id: Uuid,
) -> anyhow::Result<Arc<DocumentSession>> {
    let session = DocumentSession::new(api, config.autosave_delay());
    session
        .load_document(document_id)
        .await
        .with_context(|| format!("failed to open document {document_id}"))?;
    Ok(session)
}

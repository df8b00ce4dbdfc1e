//! One block on screen: its rendering, its editor and its contextual menu.

use std::sync::Arc;

use wikidocs_core::block::Block;
use wikidocs_core::diff::{compute_line_diff, format_diff, has_changes, DiffLine};
use wikidocs_core::render::{render_block, BlockMode, RenderedBlock};

use crate::error::{EditorError, EditorResult};
use crate::session::DocumentSession;
use crate::versions::VersionList;

/// Entries of a block's contextual menu (edit mode only).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuAction {
    Delete,
    ShowHistory,
    ToggleEditor,
}

/// Requests a block hands to its parent instead of acting on them itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockCommand {
    /// Remove this block from the document.
    Delete(wikidocs_core::types::ObjectId),
}

/// Displays and edits a single block of the open document.
///
/// Edits go into the component's own copy and into the session's shared
/// block list; the session is then told that something changed, without
/// saying what.
pub struct BlockComponent {
    session: Arc<DocumentSession>,
    block: Block,
    mode: BlockMode,
    show_editor: bool,
    versions: VersionList,
}

impl BlockComponent {
    pub fn new(session: Arc<DocumentSession>, block: Block, mode: BlockMode) -> Self {
        let versions = VersionList::for_object(session.api().clone(), block.id, true);
        Self {
            session,
            block,
            mode,
            show_editor: false,
            versions,
        }
    }

    /// Load the block's history. Called once when the block is first shown.
    pub async fn mount(&mut self) {
        self.versions.mount().await;
    }

    pub fn block(&self) -> &Block {
        &self.block
    }

    pub fn mode(&self) -> BlockMode {
        self.mode
    }

    pub fn is_editor_shown(&self) -> bool {
        self.show_editor
    }

    pub fn versions(&self) -> &VersionList {
        &self.versions
    }

    pub fn render(&self) -> RenderedBlock {
        render_block(&self.block, self.mode, self.show_editor)
    }

    fn require_edit(&self) -> EditorResult<()> {
        if self.mode.allows_editing() {
            Ok(())
        } else {
            Err(EditorError::ReadOnly(self.mode))
        }
    }

    /// Switch between the read view and the editor.
    pub fn toggle_editor(&mut self) -> EditorResult<()> {
        self.require_edit()?;
        self.show_editor = !self.show_editor;
        Ok(())
    }

    /// The editor produced new content.
    pub async fn apply_edit(&mut self, content: impl Into<String>) -> EditorResult<()> {
        self.require_edit()?;
        let content = content.into();
        self.session
            .update_block_content(self.block.id, content.clone())
            .await?;
        self.block.content = content;
        self.session.on_block_changed().await;
        Ok(())
    }

    /// Run a menu entry. Deletion is returned to the caller as a
    /// [`BlockCommand`]; the block does not remove itself.
    pub fn handle_menu(&mut self, action: MenuAction) -> EditorResult<Option<BlockCommand>> {
        self.require_edit()?;
        match action {
            MenuAction::Delete => Ok(Some(BlockCommand::Delete(self.block.id))),
            MenuAction::ShowHistory => {
                self.versions.toggle_visible();
                Ok(None)
            }
            MenuAction::ToggleEditor => {
                self.show_editor = !self.show_editor;
                Ok(None)
            }
        }
    }

    /// Restore this block to the snapshot at `commit_id`.
    ///
    /// The server commits the restored content as a new version; the
    /// restored content then flows through the session like any edit.
    pub async fn rollback_to(&mut self, commit_id: &str) -> EditorResult<()> {
        self.require_edit()?;
        let restored = self
            .session
            .api()
            .rollback_block(self.block.id, commit_id)
            .await?;
        tracing::info!(block_id = %self.block.id, commit_id, "Block rolled back");

        self.session
            .update_block_content(self.block.id, restored.content.clone())
            .await?;
        self.block.content = restored.content;
        self.session.on_block_changed().await;
        Ok(())
    }

    /// Line diff from `version_content` to the current local content.
    pub fn diff_against(&self, version_content: &str) -> Vec<DiffLine> {
        compute_line_diff(version_content, &self.block.content)
    }

    /// [`diff_against`](Self::diff_against) as printable text, or `None`
    /// when the content matches `version_content` line for line.
    pub fn describe_changes_since(&self, version_content: &str) -> Option<String> {
        let diff = self.diff_against(version_content);
        has_changes(&diff).then(|| format_diff(&diff))
    }

    /// Diff between two committed versions, computed by the server.
    pub async fn server_diff(&self, commit_id_1: &str, commit_id_2: &str) -> EditorResult<String> {
        Ok(self
            .session
            .api()
            .block_diff(self.block.id, commit_id_1, commit_id_2)
            .await?)
    }
}

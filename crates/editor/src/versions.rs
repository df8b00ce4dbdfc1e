//! History panel of a block or a document.
//!
//! The list is fetched once when mounted and never refreshed. A failed
//! fetch is logged and the panel keeps showing its loading state.

use std::sync::Arc;

use wikidocs_client::WikiApi;
use wikidocs_core::types::ObjectId;
use wikidocs_core::version::Version;

/// Whose history a [`VersionList`] shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VersionTarget {
    Block(ObjectId),
    Document(ObjectId),
}

impl VersionTarget {
    /// Build a target from an id and an "is this a block" flag.
    pub fn for_object(id: ObjectId, is_block: bool) -> Self {
        if is_block {
            Self::Block(id)
        } else {
            Self::Document(id)
        }
    }

    pub fn id(&self) -> ObjectId {
        match self {
            Self::Block(id) | Self::Document(id) => *id,
        }
    }
}

/// What a visible [`VersionList`] displays.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VersionListView<'a> {
    Loading,
    /// Versions in the order the server returned them.
    Items(&'a [Version]),
}

pub struct VersionList {
    api: Arc<dyn WikiApi>,
    target: VersionTarget,
    visible: bool,
    loading: bool,
    mounted: bool,
    versions: Vec<Version>,
}

impl VersionList {
    /// A hidden list for `target`; nothing is fetched until [`mount`](Self::mount).
    pub fn new(api: Arc<dyn WikiApi>, target: VersionTarget) -> Self {
        Self {
            api,
            target,
            visible: false,
            loading: true,
            mounted: false,
            versions: Vec::new(),
        }
    }

    /// [`new`](Self::new) for a block (`is_block`) or a document.
    pub fn for_object(api: Arc<dyn WikiApi>, id: ObjectId, is_block: bool) -> Self {
        Self::new(api, VersionTarget::for_object(id, is_block))
    }

    pub fn target(&self) -> VersionTarget {
        self.target
    }

    /// Fetch the history. Only the first call does anything.
    pub async fn mount(&mut self) {
        if self.mounted {
            return;
        }
        self.mounted = true;

        let fetched = match self.target {
            VersionTarget::Block(id) => self.api.block_versions(id).await,
            VersionTarget::Document(id) => self.api.document_versions(id).await,
        };
        match fetched {
            Ok(versions) => {
                tracing::debug!(target_id = %self.target.id(), count = versions.len(), "Versions loaded");
                self.versions = versions;
                self.loading = false;
            }
            Err(e) => {
                tracing::warn!(target_id = %self.target.id(), error = %e, "Failed to load versions");
            }
        }
    }

    /// `None` while hidden.
    pub fn render(&self) -> Option<VersionListView<'_>> {
        if !self.visible {
            return None;
        }
        if self.loading {
            Some(VersionListView::Loading)
        } else {
            Some(VersionListView::Items(&self.versions))
        }
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn set_visible(&mut self, visible: bool) {
        self.visible = visible;
    }

    pub fn toggle_visible(&mut self) {
        self.visible = !self.visible;
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    /// The fetched history; empty until a mount succeeds.
    pub fn versions(&self) -> &[Version] {
        &self.versions
    }
}

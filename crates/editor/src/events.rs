//! Notifications published by a [`DocumentSession`](crate::DocumentSession).
//!
//! Hosts subscribe with [`DocumentSession::subscribe`](crate::DocumentSession::subscribe)
//! to redraw the block list or the save indicator.

use wikidocs_core::types::ObjectId;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    /// The block list was emptied ahead of loading `document_id`.
    Cleared { document_id: ObjectId },
    /// The block list was replaced with the server's.
    Loaded {
        document_id: ObjectId,
        block_count: usize,
    },
    /// Fetching the block list failed; the list stays empty.
    LoadFailed { document_id: ObjectId, error: String },
    /// A flush was scheduled for the first unsaved edit.
    FlushScheduled { generation: u64 },
    /// A flush began sending blocks.
    FlushStarted {
        document_id: ObjectId,
        block_count: usize,
    },
    /// Every block and the document save went through.
    Saved { document_id: ObjectId },
    /// A flush stopped part way; the document is still dirty.
    SaveFailed { document_id: ObjectId, error: String },
}

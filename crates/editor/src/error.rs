use wikidocs_client::ApiError;
use wikidocs_core::error::CoreError;
use wikidocs_core::render::BlockMode;
use wikidocs_core::types::ObjectId;

/// Errors surfaced by the editing layer.
#[derive(Debug, thiserror::Error)]
pub enum EditorError {
    /// A backend call failed.
    #[error(transparent)]
    Api(#[from] ApiError),

    /// A domain rule rejected the operation.
    #[error(transparent)]
    Core(#[from] CoreError),

    #[error("No document is open")]
    NoDocument,

    #[error("Block {0} is not part of the open document")]
    BlockNotFound(ObjectId),

    #[error("Block is displayed read-only ({0:?} mode)")]
    ReadOnly(BlockMode),

    #[error("No workspace is selected")]
    NoWorkspace,
}

pub type EditorResult<T> = Result<T, EditorError>;

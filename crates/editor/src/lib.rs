//! Editing layer of the wiki client.
//!
//! A [`DocumentSession`] owns the in-memory blocks of the open document and
//! keeps them in sync with the server through a debounced autosave.
//! [`BlockComponent`] edits one block through the session, and
//! [`VersionList`] shows a block's or document's history.
//! [`Navigator`] covers workspace selection and the document tree.

pub mod block;
pub mod error;
pub mod events;
pub mod navigator;
pub mod session;
pub mod versions;

pub use block::{BlockCommand, BlockComponent, MenuAction};
pub use error::EditorError;
pub use events::SessionEvent;
pub use navigator::Navigator;
pub use session::DocumentSession;
pub use versions::{VersionList, VersionListView, VersionTarget};

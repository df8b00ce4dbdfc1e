//! Domain model for the wiki document editor.
//!
//! Everything here is free of I/O so it can be shared by the HTTP client,
//! the editor session layer and the command-line front end.

pub mod autosave;
pub mod block;
pub mod diff;
pub mod document;
pub mod error;
pub mod render;
pub mod types;
pub mod user;
pub mod version;
pub mod workspace;

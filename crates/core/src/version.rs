//! Version history entries (immutable snapshots of a block or document).

use serde::{Deserialize, Serialize};

use crate::types::{CommitId, ObjectId, Timestamp};

/// The user who committed a version.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Committer {
    pub id: ObjectId,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
}

impl Committer {
    /// Best human-readable name available.
    pub fn display_name(&self) -> String {
        self.username
            .clone()
            .or_else(|| self.email.clone())
            .unwrap_or_else(|| self.id.to_string())
    }
}

/// One entry of a block's or document's version history.
///
/// Read-only from the client's point of view; the only action on a version
/// is rolling back to it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Version {
    /// Commit the snapshot belongs to.
    #[serde(alias = "commit_id")]
    pub id: CommitId,
    /// The block or document this version snapshots.
    #[serde(alias = "wikiObjectId", alias = "block_id", alias = "document_id")]
    pub wiki_object_id: ObjectId,
    #[serde(default, alias = "committer_user")]
    pub committer: Option<Committer>,
    #[serde(default)]
    pub created_at: Option<Timestamp>,
}

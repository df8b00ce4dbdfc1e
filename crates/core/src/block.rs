//! Content blocks: the atomic text or image units a document is made of.

use serde::{Deserialize, Serialize};

use crate::types::{ObjectId, Timestamp};

/// The kind of content a block carries.
///
/// Serialized with the backend's `type_block` spelling. Kinds this client
/// cannot display (the backend also knows `FILE` and `VIDEO`) decode to
/// [`BlockKind::Unsupported`] so one odd block does not fail a whole list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BlockKind {
    #[serde(rename = "TEXT")]
    Text,
    #[serde(rename = "IMG")]
    Image,
    #[serde(other, skip_serializing)]
    Unsupported,
}

impl BlockKind {
    /// Wire name, as sent in `type_block`.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Text => "TEXT",
            Self::Image => "IMG",
            Self::Unsupported => "UNSUPPORTED",
        }
    }

    /// Parse a user-supplied kind name (case-insensitive).
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_ascii_uppercase().as_str() {
            "TEXT" => Some(Self::Text),
            "IMG" | "IMAGE" => Some(Self::Image),
            _ => None,
        }
    }
}

impl std::fmt::Display for BlockKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A block row as returned by `GET /blocks/data`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Block {
    pub id: ObjectId,
    pub document_id: ObjectId,
    pub position: i32,
    #[serde(rename = "type_block")]
    pub kind: BlockKind,
    /// TEXT: HTML produced by the rich-text editor. IMG: image source URL.
    #[serde(default)]
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<Timestamp>,
}

/// Sort blocks in place by `position`, keeping server order for ties.
pub fn order_by_position(blocks: &mut [Block]) {
    blocks.sort_by_key(|b| b.position);
}

/// Whether every block in the list has a distinct position.
///
/// Positions are meant to be unique and increasing within a document, but
/// nothing on either side enforces it. This is only used for diagnostics.
pub fn has_unique_positions(blocks: &[Block]) -> bool {
    let mut positions: Vec<i32> = blocks.iter().map(|b| b.position).collect();
    positions.sort_unstable();
    positions.windows(2).all(|w| w[0] != w[1])
}

//! Per-kind block rendering.
//!
//! Each [`BlockKind`] that can be displayed has a [`BlockRenderer`]; the
//! dispatch happens once in [`renderer_for`] instead of at every call site.
//!
//! # Trusted markup
//!
//! TEXT content is HTML produced by the rich-text editor and is emitted
//! verbatim, without sanitizing. Any script a user manages to store in a
//! block runs in every viewer's page (cross-site scripting). [`TrustedHtml`]
//! marks every place this policy applies so a host can audit or swap it.

use serde::Serialize;

use crate::block::{Block, BlockKind};

/// Capability set a block is displayed with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BlockMode {
    /// Read-only document view.
    View,
    /// Editable: read view or editor, plus the contextual menu.
    Edit,
    /// Read-only rendering of a historical snapshot.
    VersionOnly,
}

impl BlockMode {
    pub fn allows_editing(&self) -> bool {
        matches!(self, Self::Edit)
    }
}

/// HTML inserted into the page without sanitizing. See the module docs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct TrustedHtml(String);

impl TrustedHtml {
    pub fn new(html: impl Into<String>) -> Self {
        Self(html.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// The editor widget used for a block kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EditorKind {
    /// Rich-text (WYSIWYG) editor producing HTML.
    Wysiwyg,
    /// Image upload producing a source URL.
    FileUploader,
}

/// Result of rendering one block.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RenderedBlock {
    Markup { html: TrustedHtml },
    Image { src: String, alt: String },
    Editor { editor: EditorKind, initial: String },
    /// Kinds with no renderer display nothing.
    Nothing,
}

/// Rendering capability for one block kind.
pub trait BlockRenderer {
    /// Read-only view of the block.
    fn view(&self, block: &Block) -> RenderedBlock;

    /// Editor widget for the block.
    fn editor(&self, block: &Block) -> RenderedBlock;
}

pub struct TextRenderer;

impl BlockRenderer for TextRenderer {
    fn view(&self, block: &Block) -> RenderedBlock {
        RenderedBlock::Markup {
            html: TrustedHtml::new(block.content.clone()),
        }
    }

    fn editor(&self, block: &Block) -> RenderedBlock {
        RenderedBlock::Editor {
            editor: EditorKind::Wysiwyg,
            initial: block.content.clone(),
        }
    }
}

pub struct ImageRenderer;

impl BlockRenderer for ImageRenderer {
    fn view(&self, block: &Block) -> RenderedBlock {
        let src = block.link.clone().unwrap_or_else(|| block.content.clone());
        if src.is_empty() {
            return RenderedBlock::Nothing;
        }
        RenderedBlock::Image {
            src,
            alt: format!("image block {}", block.id),
        }
    }

    fn editor(&self, block: &Block) -> RenderedBlock {
        RenderedBlock::Editor {
            editor: EditorKind::FileUploader,
            initial: block.content.clone(),
        }
    }
}

/// Look up the renderer for a kind. `None` for kinds that render nothing.
pub fn renderer_for(kind: BlockKind) -> Option<&'static dyn BlockRenderer> {
    match kind {
        BlockKind::Text => Some(&TextRenderer),
        BlockKind::Image => Some(&ImageRenderer),
        BlockKind::Unsupported => None,
    }
}

/// Render `block` in `mode`. `show_editor` only matters in [`BlockMode::Edit`].
pub fn render_block(block: &Block, mode: BlockMode, show_editor: bool) -> RenderedBlock {
    let Some(renderer) = renderer_for(block.kind) else {
        return RenderedBlock::Nothing;
    };
    match mode {
        BlockMode::Edit if show_editor => renderer.editor(block),
        BlockMode::View | BlockMode::Edit | BlockMode::VersionOnly => renderer.view(block),
    }
}

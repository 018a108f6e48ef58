//! Page layout for text-heavy reports.
//!
//! Layout works in page coordinates measured from the top-left corner, with y
//! growing downward, and produces a flat list of [`DrawCommand`]s separated by
//! [`DrawCommand::PageBreak`]. Nothing here touches PDF objects; turning the
//! commands into pages is the job of [`render`](crate::render).
//!
//! The building blocks are:
//!
//! - [`wrap_text`] / [`wrap_words`] - greedy word wrapping against a [`TextMeasure`]
//! - [`wrap_paragraphs`] - wrapping that recognises bulleted items and indents them
//! - [`layout_box`] - a bordered block of lines, split across pages as needed
//! - [`layout_bar`] - a filled single-line heading
//! - [`layout_row`] - a table row whose height follows its tallest cell
//!
//! # Example
//!
//! ```
//! use gabma_docs::layout::*;
//! use gabma_docs::Pt;
//!
//! let ctx = LayoutContext::new(Pt(20.0), Pt(200.0), Pt(12.0), Monospace::new(Pt(6.0)))
//!     .with_padding(Pt(2.0));
//! let lines = ctx.wrap("Lorem ipsum dolor sit amet, consectetur adipiscing elit", &BulletMarkers::default());
//!
//! let mut cursor = PageCursor::new(Pt(36.0), Pt(800.0));
//! let style = BoxStyle {
//!     border: Some(RectStyle::outline()),
//!     text: TextStyle::regular(Pt(10.0)),
//!     align: Align::Left,
//! };
//! let commands = layout_box(&lines, &ctx, &style, &mut cursor).expect("fits on the page");
//! assert!(!commands.is_empty());
//! assert!(cursor.y > Pt(36.0));
//! ```

mod command;
mod cursor;
mod margins;
mod measure;
mod paginate;
mod paragraph;
mod table;
mod wrap;

pub use command::*;
pub use cursor::*;
pub use margins::*;
pub use measure::*;
pub use paginate::*;
pub use paragraph::*;
pub use table::*;
pub use wrap::*;

use crate::Pt;
use thiserror::Error;

/// Errors raised while placing content on pages
#[derive(Error, Debug, Clone, PartialEq)]
pub enum LayoutError {
    /// Even an empty page cannot hold a single line
    #[error("a single line needs {needed} but an empty page only has {available}")]
    PageTooSmall { needed: Pt, available: Pt },

    #[error("line height must be positive, got {0}")]
    InvalidLineHeight(Pt),
}

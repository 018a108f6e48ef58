use crate::units::{Mm, Pt};
use serde::{Deserialize, Serialize};

/// Margins are used when laying out objects on a page. Layout functions keep
/// their output inside them; the margins are also applied to [`Page`](crate::Page)s
/// to determine the `ArtBox` attribute of each page in the generated PDF.
///
/// The bottom margin doubles as the page-break trigger: a
/// [`PageCursor`](crate::layout::PageCursor) advances to a new page before
/// content would cross it.
#[derive(Debug, Default, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct Margins {
    pub top: Pt,
    pub right: Pt,
    pub bottom: Pt,
    pub left: Pt,
}

impl Margins {
    /// Create margins by specifying individual components in a clockwise fashion
    /// starting at the top (in the same order as CSS margins)
    pub fn trbl<D: Into<Pt>>(top: D, right: D, bottom: D, left: D) -> Margins {
        Margins {
            top: top.into(),
            right: right.into(),
            bottom: bottom.into(),
            left: left.into(),
        }
    }

    /// Create margins where all values are equal
    pub fn all<D: Into<Pt>>(value: D) -> Margins {
        let value: Pt = value.into();
        Margins {
            top: value,
            right: value,
            bottom: value,
            left: value,
        }
    }

    /// Margins given in millimetres, in CSS order
    pub fn mm(top: f32, right: f32, bottom: f32, left: f32) -> Margins {
        Margins::trbl(Mm(top), Mm(right), Mm(bottom), Mm(left))
    }

    /// Create margins where all values are 0.0
    pub fn empty() -> Margins {
        Margins::all(Pt::ZERO)
    }

    /// Sum of the left and right margins
    pub fn horizontal(&self) -> Pt {
        self.left + self.right
    }
}

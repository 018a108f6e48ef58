use super::command::DrawCommand;
use super::margins::Margins;
use crate::pagesize::PageSize;
use crate::Pt;

/// Tracks where the next piece of content goes while a report is laid out.
///
/// `y` grows downward from the top of the page. Content that would extend
/// below `bottom_trigger` has to move to a new page, where `y` restarts at `top`.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct PageCursor {
    pub y: Pt,
    pub top: Pt,
    pub bottom_trigger: Pt,
    /// Zero-based index of the current page
    pub page: usize,
}

impl PageCursor {
    pub fn new(top: Pt, bottom_trigger: Pt) -> PageCursor {
        PageCursor {
            y: top,
            top,
            bottom_trigger,
            page: 0,
        }
    }

    /// A cursor for a page of `size` whose content stays within `margins`
    pub fn for_page(size: PageSize, margins: &Margins) -> PageCursor {
        PageCursor::new(margins.top, size.1 - margins.bottom)
    }

    /// Space left between the cursor and the page-break trigger
    pub fn remaining(&self) -> Pt {
        self.bottom_trigger - self.y
    }

    /// Space available on a fresh page
    pub fn usable_height(&self) -> Pt {
        self.bottom_trigger - self.top
    }

    pub fn at_page_top(&self) -> bool {
        self.y <= self.top
    }

    pub fn fits(&self, height: Pt) -> bool {
        self.y + height <= self.bottom_trigger
    }

    /// Move down by `dy` without checking for a page break
    pub fn skip(&mut self, dy: Pt) {
        self.y += dy;
    }

    /// Start a new page, returning the command that marks the break
    pub fn advance_page(&mut self) -> DrawCommand {
        self.page += 1;
        self.y = self.top;
        tracing::debug!(page = self.page + 1, "starting new page");
        DrawCommand::PageBreak
    }
}

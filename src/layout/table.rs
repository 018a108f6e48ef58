use super::command::{Align, DrawCommand, RectStyle, TextCommand, TextStyle};
use super::cursor::PageCursor;
use super::measure::TextMeasure;
use super::wrap::wrap_text;
use super::LayoutError;
use crate::{Pt, Rect};

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Column {
    pub width: Pt,
    pub align: Align,
}

/// Fixed column layout for a simple bordered table
#[derive(Debug, Clone, PartialEq)]
pub struct TableSpec {
    pub columns: Vec<Column>,
}

impl TableSpec {
    /// Columns of the given widths, all with the same alignment
    pub fn new<W: Into<Pt> + Copy>(widths: &[W], align: Align) -> TableSpec {
        TableSpec {
            columns: widths
                .iter()
                .map(|&width| Column {
                    width: width.into(),
                    align,
                })
                .collect(),
        }
    }

    pub fn total_width(&self) -> Pt {
        self.columns.iter().map(|c| c.width).sum()
    }
}

/// How every cell in a row is drawn
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct RowStyle {
    pub border: RectStyle,
    pub text: TextStyle,
    /// Horizontal inset of the text inside each cell
    pub padding: Pt,
    pub line_height: Pt,
}

/// Lay out one table row starting at `x`.
///
/// Each cell is wrapped to its column's width less padding, and every cell in
/// the row gets the height of the tallest one. A row that doesn't fit below
/// the cursor moves to a new page first; a row taller than a whole page is
/// drawn anyway, running past the bottom margin. Missing cells are drawn empty
/// and surplus cells are ignored.
pub fn layout_row<S, M>(
    table: &TableSpec,
    x: Pt,
    cells: &[S],
    style: &RowStyle,
    measure: M,
    cursor: &mut PageCursor,
) -> Result<Vec<DrawCommand>, LayoutError>
where
    S: AsRef<str>,
    M: TextMeasure,
{
    if style.line_height <= Pt::ZERO {
        return Err(LayoutError::InvalidLineHeight(style.line_height));
    }
    if table.columns.is_empty() {
        return Ok(Vec::new());
    }
    if cells.len() > table.columns.len() {
        tracing::warn!(
            cells = cells.len(),
            columns = table.columns.len(),
            "row has more cells than columns, ignoring the rest"
        );
    }

    let wrapped: Vec<_> = table
        .columns
        .iter()
        .enumerate()
        .map(|(i, column)| {
            let text = cells.get(i).map(AsRef::as_ref).unwrap_or("");
            wrap_text(text, column.width - style.padding * 2.0, &measure)
        })
        .collect();
    let tallest = wrapped.iter().map(Vec::len).max().unwrap_or(1).max(1);
    let row_height = style.line_height * tallest as f32;

    if style.line_height > cursor.usable_height() {
        return Err(LayoutError::PageTooSmall {
            needed: style.line_height,
            available: cursor.usable_height(),
        });
    }

    let mut commands = Vec::new();
    if !cursor.fits(row_height) && !cursor.at_page_top() {
        commands.push(cursor.advance_page());
    }
    if !cursor.fits(row_height) {
        tracing::warn!(
            height = %row_height,
            available = %cursor.remaining(),
            "table row is taller than a page, it will run past the bottom margin"
        );
    }

    let mut left = x;
    for (column, lines) in table.columns.iter().zip(wrapped) {
        commands.push(DrawCommand::Rect {
            rect: Rect::from_xywh(left, cursor.y, column.width, row_height),
            style: style.border,
        });
        for (i, line) in lines.into_iter().enumerate() {
            if line.text.is_empty() {
                continue;
            }
            commands.push(DrawCommand::Text(TextCommand {
                x: left + style.padding,
                y: cursor.y + style.line_height * i as f32,
                width: column.width - style.padding * 2.0,
                line_height: style.line_height,
                text: line.text,
                align: column.align,
                style: style.text,
            }));
        }
        left += column.width;
    }

    cursor.skip(row_height);
    Ok(commands)
}

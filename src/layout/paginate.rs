use super::command::{Align, DrawCommand, RectStyle, TextCommand, TextStyle};
use super::cursor::PageCursor;
use super::measure::TextMeasure;
use super::paragraph::LayoutContext;
use super::wrap::WrappedLine;
use super::LayoutError;
use crate::{Pt, Rect};

/// How a block of wrapped lines is drawn
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct BoxStyle {
    /// Drawn around each page's portion of the box, if any
    pub border: Option<RectStyle>,
    pub text: TextStyle,
    pub align: Align,
}

/// A full-width, single-line bar such as a title or section heading
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct BarStyle {
    pub height: Pt,
    pub fill: RectStyle,
    pub text: TextStyle,
    pub align: Align,
}

fn check_line_height(line_height: Pt) -> Result<(), LayoutError> {
    if line_height > Pt::ZERO {
        Ok(())
    } else {
        Err(LayoutError::InvalidLineHeight(line_height))
    }
}

/// Lay out already-wrapped lines as a box, splitting it across as many pages
/// as needed.
///
/// On each page the box holds as many lines as fit between the cursor and the
/// page-break trigger (after `ctx.padding` above and below). When not even one
/// line fits the cursor moves to a new page first. Each page's share of the box
/// gets its own border rectangle. Lines are drawn in order and none are lost.
///
/// Fails with [LayoutError::PageTooSmall] when a single line does not fit on an
/// empty page, since no amount of page breaking could make progress.
pub fn layout_box<M: TextMeasure>(
    lines: &[WrappedLine],
    ctx: &LayoutContext<M>,
    style: &BoxStyle,
    cursor: &mut PageCursor,
) -> Result<Vec<DrawCommand>, LayoutError> {
    check_line_height(ctx.line_height)?;

    let mut commands = Vec::with_capacity(lines.len() + 2);
    let mut remaining = lines;
    while !remaining.is_empty() {
        let available = cursor.remaining() - ctx.padding * 2.0;
        let per_page = (available / ctx.line_height).floor();
        if per_page < 1.0 {
            if cursor.at_page_top() {
                return Err(LayoutError::PageTooSmall {
                    needed: ctx.line_height + ctx.padding * 2.0,
                    available: cursor.usable_height(),
                });
            }
            commands.push(cursor.advance_page());
            continue;
        }

        let count = (per_page as usize).min(remaining.len());
        let (chunk, rest) = remaining.split_at(count);
        let height = ctx.line_height * count as f32 + ctx.padding * 2.0;

        if let Some(border) = style.border.filter(RectStyle::is_visible) {
            commands.push(DrawCommand::Rect {
                rect: Rect::from_xywh(ctx.x, cursor.y, ctx.column_width, height),
                style: border,
            });
        }

        let top = cursor.y + ctx.padding;
        for (i, line) in chunk.iter().enumerate() {
            commands.push(DrawCommand::Text(TextCommand {
                x: ctx.x + ctx.padding + line.indent,
                y: top + ctx.line_height * i as f32,
                width: ctx.text_width() - line.indent,
                line_height: ctx.line_height,
                text: line.text.clone(),
                align: style.align,
                style: style.text,
            }));
        }

        cursor.skip(height);
        remaining = rest;
        if !remaining.is_empty() {
            tracing::trace!(drawn = count, left = remaining.len(), "box continues on next page");
        }
    }
    Ok(commands)
}

/// Lay out a filled bar holding a single line of text across `x .. x + width`.
/// Moves to a new page first if the bar does not fit below the cursor.
pub fn layout_bar(
    text: &str,
    x: Pt,
    width: Pt,
    style: &BarStyle,
    cursor: &mut PageCursor,
) -> Result<Vec<DrawCommand>, LayoutError> {
    check_line_height(style.height)?;

    let mut commands = Vec::with_capacity(3);
    if !cursor.fits(style.height) {
        if cursor.at_page_top() || style.height > cursor.usable_height() {
            return Err(LayoutError::PageTooSmall {
                needed: style.height,
                available: cursor.usable_height(),
            });
        }
        commands.push(cursor.advance_page());
    }

    if style.fill.is_visible() {
        commands.push(DrawCommand::Rect {
            rect: Rect::from_xywh(x, cursor.y, width, style.height),
            style: style.fill,
        });
    }
    commands.push(DrawCommand::Text(TextCommand {
        x,
        y: cursor.y,
        width,
        line_height: style.height,
        text: text.to_string(),
        align: style.align,
        style: style.text,
    }));
    cursor.skip(style.height);
    Ok(commands)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::colour::colours;
    use crate::layout::Monospace;

    fn lines(n: usize) -> Vec<WrappedLine> {
        (0..n).map(|i| WrappedLine::new(format!("line {i}"), Pt::ZERO)).collect()
    }

    fn ctx() -> LayoutContext<Monospace> {
        LayoutContext::new(Pt(10.0), Pt(100.0), Pt(10.0), Monospace::new(Pt(5.0)))
    }

    fn plain() -> BoxStyle {
        BoxStyle {
            border: Some(RectStyle::outline()),
            text: TextStyle::regular(Pt(9.0)),
            align: Align::Left,
        }
    }

    fn rect_heights(commands: &[DrawCommand]) -> Vec<Pt> {
        commands
            .iter()
            .filter_map(|c| match c {
                DrawCommand::Rect { rect, .. } => Some(rect.height()),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn box_splits_across_pages() {
        let mut cursor = PageCursor::new(Pt(0.0), Pt(100.0));
        cursor.skip(Pt(70.0));

        let commands = layout_box(&lines(7), &ctx(), &plain(), &mut cursor).unwrap();

        let breaks = commands.iter().filter(|c| c.is_page_break()).count();
        assert_eq!(breaks, 1);
        assert_eq!(rect_heights(&commands), vec![Pt(30.0), Pt(40.0)]);

        let texts: Vec<&str> = commands
            .iter()
            .filter_map(DrawCommand::as_text)
            .map(|t| t.text.as_str())
            .collect();
        assert_eq!(texts, (0..7).map(|i| format!("line {i}")).collect::<Vec<_>>());

        let first_after_break = commands
            .iter()
            .skip_while(|c| !c.is_page_break())
            .find_map(DrawCommand::as_text)
            .unwrap();
        assert_eq!(first_after_break.y, Pt(0.0));
        assert_eq!(cursor.y, Pt(40.0));
        assert_eq!(cursor.page, 1);
    }

    #[test]
    fn box_breaks_first_when_no_line_fits() {
        let mut cursor = PageCursor::new(Pt(0.0), Pt(100.0));
        cursor.skip(Pt(95.0));
        let commands = layout_box(&lines(2), &ctx(), &plain(), &mut cursor).unwrap();
        assert!(commands[0].is_page_break());
        assert_eq!(rect_heights(&commands), vec![Pt(20.0)]);
    }

    #[test]
    fn padding_is_kept_inside_the_border() {
        let mut cursor = PageCursor::new(Pt(0.0), Pt(100.0));
        let ctx = ctx().with_padding(Pt(2.0));
        let commands = layout_box(&lines(2), &ctx, &plain(), &mut cursor).unwrap();
        assert_eq!(rect_heights(&commands), vec![Pt(24.0)]);
        let first = commands[1].as_text().unwrap();
        assert_eq!((first.x, first.y, first.width), (Pt(12.0), Pt(2.0), Pt(96.0)));
    }

    #[test]
    fn indent_shifts_lines() {
        let mut cursor = PageCursor::new(Pt(0.0), Pt(100.0));
        let lines = vec![WrappedLine::new("• a", Pt(4.0))];
        let style = BoxStyle { border: None, ..plain() };
        let commands = layout_box(&lines, &ctx(), &style, &mut cursor).unwrap();
        assert_eq!(commands.len(), 1);
        let text = commands[0].as_text().unwrap();
        assert_eq!(text.x, Pt(14.0));
        assert_eq!(text.width, Pt(96.0));
    }

    #[test]
    fn page_too_small_is_an_error() {
        let mut cursor = PageCursor::new(Pt(0.0), Pt(5.0));
        let err = layout_box(&lines(1), &ctx(), &plain(), &mut cursor).unwrap_err();
        assert!(matches!(err, LayoutError::PageTooSmall { .. }));
    }

    #[test]
    fn no_lines_draws_nothing() {
        let mut cursor = PageCursor::new(Pt(0.0), Pt(100.0));
        let commands = layout_box(&[], &ctx(), &plain(), &mut cursor).unwrap();
        assert!(commands.is_empty());
        assert_eq!(cursor.y, Pt(0.0));
    }

    #[test]
    fn zero_line_height_is_rejected() {
        let mut cursor = PageCursor::new(Pt(0.0), Pt(100.0));
        let ctx = LayoutContext::new(Pt(0.0), Pt(100.0), Pt(0.0), Monospace::new(Pt(5.0)));
        assert!(matches!(
            layout_box(&lines(1), &ctx, &plain(), &mut cursor),
            Err(LayoutError::InvalidLineHeight(_))
        ));
    }

    #[test]
    fn bar_moves_to_next_page() {
        let style = BarStyle {
            height: Pt(20.0),
            fill: RectStyle::filled(colours::BAR_GREY),
            text: TextStyle::bold(Pt(11.0)),
            align: Align::Left,
        };
        let mut cursor = PageCursor::new(Pt(0.0), Pt(100.0));
        cursor.skip(Pt(90.0));
        let commands = layout_bar("Seção", Pt(0.0), Pt(50.0), &style, &mut cursor).unwrap();
        assert_eq!(commands.len(), 3);
        assert!(commands[0].is_page_break());
        assert_eq!(cursor.y, Pt(20.0));
    }
}

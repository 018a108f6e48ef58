use super::measure::TextMeasure;
use super::wrap::{wrap_words, TextBlock, WrappedLine};
use crate::Pt;

/// Everything needed to lay out text inside one column of a page.
///
/// The column spans `x .. x + column_width`. Text is inset by `padding` on
/// both sides, and bulleted items are further indented by `bullet_indent`.
#[derive(Debug, Clone)]
pub struct LayoutContext<M> {
    pub x: Pt,
    pub column_width: Pt,
    pub line_height: Pt,
    pub padding: Pt,
    pub bullet_indent: Pt,
    pub measure: M,
}

impl<M: TextMeasure> LayoutContext<M> {
    pub fn new(x: Pt, column_width: Pt, line_height: Pt, measure: M) -> LayoutContext<M> {
        LayoutContext {
            x,
            column_width,
            line_height,
            padding: Pt::ZERO,
            bullet_indent: Pt::ZERO,
            measure,
        }
    }

    pub fn with_padding(self, padding: Pt) -> Self {
        LayoutContext { padding, ..self }
    }

    pub fn with_bullet_indent(self, bullet_indent: Pt) -> Self {
        LayoutContext {
            bullet_indent,
            ..self
        }
    }

    /// Width available to text once padding is taken off both sides
    pub fn text_width(&self) -> Pt {
        self.column_width - self.padding * 2.0
    }

    /// Wrap `text` to fit this column, see [wrap_paragraphs]
    pub fn wrap<'a, T: Into<TextBlock<'a>>>(&self, text: T, markers: &BulletMarkers) -> Vec<WrappedLine> {
        wrap_paragraphs(text, self, markers)
    }
}

/// Strings that mark the start of a bulleted item.
///
/// Plain markers (`•`, `-`, `->`) count when a line starts with them. Tag
/// markers (`<li>`) may appear anywhere in a line; each one starts a new item
/// and is rendered as `• `.
#[derive(Debug, Clone, PartialEq)]
pub struct BulletMarkers {
    prefixes: Vec<String>,
    tags: Vec<String>,
}

impl Default for BulletMarkers {
    fn default() -> Self {
        BulletMarkers::new(["•", "->", "-", "<li>"])
    }
}

impl BulletMarkers {
    pub fn new<I, S>(markers: I) -> BulletMarkers
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut prefixes = Vec::new();
        let mut tags = Vec::new();
        for marker in markers.into_iter().map(Into::into) {
            if marker.is_empty() {
                continue;
            }
            if marker.starts_with('<') {
                tags.push(marker.to_ascii_lowercase());
            } else {
                prefixes.push(marker);
            }
        }
        BulletMarkers { prefixes, tags }
    }

    /// No markers at all; every line is a plain paragraph
    pub fn none() -> BulletMarkers {
        BulletMarkers::new(std::iter::empty::<String>())
    }

    fn is_bullet(&self, line: &str) -> bool {
        self.prefixes.iter().any(|p| line.starts_with(p.as_str()))
    }

    /// Byte offsets and lengths of every tag marker in `line`
    fn tag_positions(&self, line: &str) -> Vec<(usize, usize)> {
        let lower = line.to_ascii_lowercase();
        let mut positions: Vec<(usize, usize)> = self
            .tags
            .iter()
            .flat_map(|tag| lower.match_indices(tag.as_str()).map(|(at, m)| (at, m.len())))
            .collect();
        positions.sort();
        positions
    }
}

#[derive(Debug, PartialEq)]
struct Item {
    text: String,
    bulleted: bool,
}

fn split_items(text: &str, markers: &BulletMarkers) -> Vec<Item> {
    let mut items = Vec::new();
    for line in text.trim_end_matches(['\n', '\r']).split('\n') {
        let line = line.trim_end_matches('\r');
        let tags = markers.tag_positions(line);
        if tags.is_empty() {
            let trimmed = line.trim();
            items.push(Item {
                bulleted: markers.is_bullet(trimmed),
                text: trimmed.to_string(),
            });
            continue;
        }

        let head = line[..tags[0].0].trim();
        if !head.is_empty() {
            items.push(Item {
                bulleted: markers.is_bullet(head),
                text: head.to_string(),
            });
        }
        for (i, &(at, len)) in tags.iter().enumerate() {
            let end = tags.get(i + 1).map(|&(next, _)| next).unwrap_or(line.len());
            let body = line[(at + len).min(end)..end].trim();
            if body.is_empty() {
                continue;
            }
            items.push(Item {
                text: format!("• {body}"),
                bulleted: true,
            });
        }
    }
    items
}

/// Wrap `text` into lines for `ctx`, indenting bulleted items.
///
/// Every line of a bulleted item, including its continuation lines, is indented
/// by `ctx.bullet_indent` and wrapped to the correspondingly narrower width, so
/// that the indented text still ends inside the column. Other lines are wrapped
/// to the full [text width](LayoutContext::text_width). Empty input yields one
/// empty line.
pub fn wrap_paragraphs<'a, T, M>(text: T, ctx: &LayoutContext<M>, markers: &BulletMarkers) -> Vec<WrappedLine>
where
    T: Into<TextBlock<'a>>,
    M: TextMeasure,
{
    let text = text.into().as_str();
    if text.trim().is_empty() {
        return vec![WrappedLine::blank()];
    }

    let full = ctx.text_width();
    let mut lines = Vec::new();
    for item in split_items(text, markers) {
        let (indent, width) = if item.bulleted {
            (ctx.bullet_indent, full - ctx.bullet_indent)
        } else {
            (Pt::ZERO, full)
        };
        lines.extend(wrap_words(&item.text, width, &ctx.measure).map(|line| WrappedLine::new(line, indent)));
    }

    if lines.is_empty() {
        lines.push(WrappedLine::blank());
    }
    lines
}

//! Turns a laid-out [Report] into PDF bytes.
//!
//! Layout works top-down from the top-left corner of the page while PDF
//! space starts at the bottom-left, so every position is flipped here. Text
//! alignment is resolved against the embedded fonts, and rectangles are drawn
//! as raw content-stream operators.

use crate::content::{set_fill, set_stroke};
use crate::layout::{pages, Align, DrawCommand, FontMeasure, FontRole, RectStyle, TextCommand, TextMeasure};
use crate::pagesize::PageSize;
use crate::report::Report;
use crate::{Document, Font, FontSet, Image, ImageLayout, Info, PDFError, Page, Pt, Rect, SpanFont, SpanLayout};
use id_arena::{Arena, Id};
use pdf_writer::Content;

/// The document's fonts, by role
struct EmbeddedFonts<'a> {
    fonts: &'a Arena<Font>,
    regular: Id<Font>,
    bold: Id<Font>,
}

impl EmbeddedFonts<'_> {
    fn get(&self, role: FontRole) -> Option<(Id<Font>, &Font)> {
        let id = match role {
            FontRole::Regular => self.regular,
            FontRole::Bold => self.bold,
        };
        self.fonts.get(id).map(|font| (id, font))
    }
}

/// Render `report` with `fonts`, returning the bytes of the PDF file.
///
/// `info` fills the document properties; its title defaults to the report's.
pub fn render_pdf(report: Report, fonts: FontSet, info: Info) -> Result<Vec<u8>, PDFError> {
    let Report {
        title,
        page_size,
        commands,
        images,
    } = report;

    let mut doc = Document::default();
    doc.set_info(if info.title.is_some() { info } else { info.title(title) });

    let FontSet { regular, bold } = fonts;
    let regular = doc.add_font(regular);
    let bold = match bold {
        Some(bold) => doc.add_font(bold),
        None => regular,
    };
    let image_ids: Vec<Id<Image>> = images.into_iter().map(|image| doc.add_image(image)).collect();

    let built: Vec<Page> = {
        let fonts = EmbeddedFonts {
            fonts: &doc.fonts,
            regular,
            bold,
        };
        pages(&commands)
            .map(|page| build_page(page, page_size, &fonts, &image_ids))
            .collect::<Result<_, _>>()?
    };
    for page in built {
        doc.add_page(page);
    }
    tracing::info!(pages = doc.page_count(), "rendered report");

    doc.to_bytes()
}

fn build_page(
    commands: &[DrawCommand],
    size: PageSize,
    fonts: &EmbeddedFonts<'_>,
    image_ids: &[Id<Image>],
) -> Result<Page, PDFError> {
    let mut page = Page::new(size, None);
    let height = size.1;

    for command in commands {
        match command {
            DrawCommand::Rect { rect, style } => {
                if let Some(content) = rect_content(&rect.flipped(height), style) {
                    page.add_content(content);
                }
            }
            DrawCommand::Text(text) => {
                if text.text.is_empty() {
                    continue;
                }
                page.add_span(place_text(text, fonts, height)?);
            }
            DrawCommand::Image { rect, slot } => match image_ids.get(*slot) {
                Some(&image_id) => page.add_image(ImageLayout {
                    image_id,
                    position: rect.flipped(height),
                }),
                None => tracing::warn!(slot, "image slot has no image, skipping"),
            },
            DrawCommand::PageBreak => {}
        }
    }
    Ok(page)
}

/// Position a line of text in PDF space: aligned horizontally within its slot
/// and with its glyphs centred vertically in the line
fn place_text(text: &TextCommand, fonts: &EmbeddedFonts<'_>, page_height: Pt) -> Result<SpanLayout, PDFError> {
    let (id, font) = fonts.get(text.style.role).ok_or(PDFError::FontMissing)?;
    let size = text.style.size;

    let x = match text.align {
        Align::Left => text.x,
        align => {
            let width = FontMeasure { font, size }.width_or_estimate(&text.text);
            text.x + align.offset(text.width, width)
        }
    };

    let ascent = font.ascent(size);
    let descent = font.descent(size);
    let baseline = text.y + (text.line_height - (ascent - descent)) / 2.0 + ascent;

    Ok(SpanLayout {
        text: text.text.clone(),
        font: SpanFont { id, size },
        colour: text.style.colour,
        coords: (x, page_height - baseline),
    })
}

/// Operators for a rectangle already in PDF space, [None] if it would be invisible
fn rect_content(rect: &Rect, style: &RectStyle) -> Option<Content> {
    if !style.is_visible() {
        return None;
    }

    let mut content = Content::new();
    if let Some(fill) = style.fill {
        set_fill(&mut content, fill);
    }
    if let Some(stroke) = style.stroke {
        set_stroke(&mut content, stroke);
        content.set_line_width(*style.line_width);
    }
    content.rect(*rect.x1, *rect.y1, *rect.width(), *rect.height());
    match (style.fill.is_some(), style.stroke.is_some()) {
        (true, true) => content.fill_nonzero_and_stroke(),
        (true, false) => content.fill_nonzero(),
        _ => content.stroke(),
    };
    Some(content)
}

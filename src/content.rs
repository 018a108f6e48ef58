//! Conversion of page contents into PDF content-stream operators.

use crate::colour::Colour;
use crate::font::Font;
use crate::page::{ImageLayout, PageContents, SpanFont, SpanLayout};
use id_arena::Arena;
use pdf_writer::{Content, Name, Str};

/// The content stream for everything on a page, in drawing order. Each item
/// is drawn in its own saved graphics state.
pub(crate) fn render_contents(contents: &[PageContents], fonts: &Arena<Font>) -> Vec<u8> {
    let mut stream = Vec::new();
    for item in contents {
        let bytes = match item {
            PageContents::Text(spans) if spans.is_empty() => continue,
            PageContents::Text(spans) => text_content(spans, fonts).finish(),
            PageContents::Image(image) => image_content(image).finish(),
            PageContents::RawContent(raw) => {
                let mut open = Content::new();
                open.save_state();
                let mut bytes = open.finish();
                bytes.push(b'\n');
                bytes.extend_from_slice(raw);
                bytes.push(b'\n');
                let mut close = Content::new();
                close.restore_state();
                bytes.extend(close.finish());
                bytes
            }
        };
        stream.extend(bytes);
        stream.push(b'\n');
    }
    stream
}

/// Glyph to draw for `ch`, substituting the replacement character, then `?`,
/// then glyph 0 (`.notdef`) when the font lacks it
fn glyph_for(font: &Font, ch: char) -> u16 {
    font.glyph_id(ch)
        .or_else(|| font.replacement_glyph_id())
        .or_else(|| font.glyph_id('?'))
        .unwrap_or(0)
}

fn text_content(spans: &[SpanLayout], fonts: &Arena<Font>) -> Content {
    let mut content = Content::new();
    content.save_state();

    let mut current_font: Option<SpanFont> = None;
    let mut current_colour: Option<Colour> = None;
    for span in spans {
        let Some(font) = fonts.get(span.font.id) else {
            tracing::warn!(font = span.font.id.index(), "span refers to a missing font, skipping");
            continue;
        };
        if current_colour != Some(span.colour) {
            set_fill(&mut content, span.colour);
            current_colour = Some(span.colour);
        }

        content.begin_text();
        if current_font != Some(span.font) {
            let name = format!("F{}", span.font.id.index());
            content.set_font(Name(name.as_bytes()), *span.font.size);
            current_font = Some(span.font);
        }
        // Identity-H: two bytes per glyph id
        let glyphs: Vec<u8> = span
            .text
            .chars()
            .flat_map(|ch| glyph_for(font, ch).to_be_bytes())
            .collect();
        content
            .next_line(*span.coords.0, *span.coords.1)
            .show(Str(&glyphs))
            .end_text();
    }

    content.restore_state();
    content
}

fn image_content(image: &ImageLayout) -> Content {
    let at = &image.position;
    let name = format!("I{}", image.image_id.index());
    let mut content = Content::new();
    content
        .save_state()
        .transform([*at.width(), 0.0, 0.0, *at.height(), *at.x1, *at.y1])
        .x_object(Name(name.as_bytes()))
        .restore_state();
    content
}

pub(crate) fn set_fill(content: &mut Content, colour: Colour) {
    match colour {
        Colour::RGB { r, g, b } => content.set_fill_rgb(r, g, b),
        Colour::CMYK { c, m, y, k } => content.set_fill_cmyk(c, m, y, k),
        Colour::Grey { g } => content.set_fill_gray(g),
    };
}

pub(crate) fn set_stroke(content: &mut Content, colour: Colour) {
    match colour {
        Colour::RGB { r, g, b } => content.set_stroke_rgb(r, g, b),
        Colour::CMYK { c, m, y, k } => content.set_stroke_cmyk(c, m, y, k),
        Colour::Grey { g } => content.set_stroke_gray(g),
    };
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Image, Pt, Rect};

    #[test]
    fn raw_content_is_wrapped_in_graphics_state() {
        let fonts = Arena::new();
        let out = render_contents(&[PageContents::RawContent(b"0 0 1 1 re f".to_vec())], &fonts);
        let out = String::from_utf8(out).unwrap();
        let ops: Vec<&str> = out.lines().filter(|l| !l.is_empty()).collect();
        assert_eq!(ops, vec!["q", "0 0 1 1 re f", "Q"]);
    }

    #[test]
    fn images_are_scaled_into_place() {
        let mut images: Arena<Image> = Arena::new();
        let image_id = images.alloc(Image::new_raster(image::DynamicImage::new_rgb8(2, 2)));
        let layout = ImageLayout {
            image_id,
            position: Rect::from_xywh(Pt(10.0), Pt(20.0), Pt(100.0), Pt(50.0)),
        };
        let out = String::from_utf8(image_content(&layout).finish()).unwrap();
        assert!(out.contains("100 0 0 50 10 20 cm"), "{out}");
        assert!(out.contains("/I0 Do"), "{out}");
    }

    #[test]
    fn nothing_to_draw() {
        let fonts = Arena::new();
        assert!(render_contents(&[], &fonts).is_empty());
        assert!(render_contents(&[PageContents::Text(Vec::new())], &fonts).is_empty());
    }
}

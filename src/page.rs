use crate::colour::Colour;
use crate::content::render_contents;
use crate::font::Font;
use crate::image::Image;
use crate::layout::Margins;
use crate::pagesize::PageSize;
use crate::refs::{ObjectReferences, RefType};
use crate::{PDFError, Pt, Rect};
use id_arena::{Arena, Id};
use pdf_writer::{Finish, Name, Pdf, Ref};

#[derive(Copy, Clone, PartialEq, Debug)]
pub struct SpanFont {
    pub id: Id<Font>,
    pub size: Pt,
}

/// A run of text in a single font and colour, starting at a baseline point in PDF space
#[derive(Clone, PartialEq, Debug)]
pub struct SpanLayout {
    pub text: String,
    pub font: SpanFont,
    pub colour: Colour,
    pub coords: (Pt, Pt),
}

#[derive(Clone, PartialEq, Debug)]
pub struct ImageLayout {
    pub image_id: Id<Image>,
    pub position: Rect,
}

#[derive(Clone, PartialEq, Debug)]
pub enum PageContents {
    Text(Vec<SpanLayout>),
    Image(ImageLayout),
    /// Pre-built content stream operators, drawn inside their own graphics state
    RawContent(Vec<u8>),
}

/// A single page of a [Document](crate::Document), holding everything drawn on it
pub struct Page {
    /// The size of the page
    pub media_box: Rect,
    /// Where content can live, i.e. within the margins
    pub content_box: Rect,
    pub contents: Vec<PageContents>,
}

impl Page {
    pub fn new(size: PageSize, margins: Option<Margins>) -> Page {
        let (width, height) = size;
        let margins = margins.unwrap_or_else(Margins::empty);
        Page {
            media_box: Rect {
                x1: Pt::ZERO,
                y1: Pt::ZERO,
                x2: width,
                y2: height,
            },
            content_box: Rect {
                x1: margins.left,
                y1: margins.bottom,
                x2: width - margins.right,
                y2: height - margins.top,
            },
            contents: Vec::default(),
        }
    }

    pub fn width(&self) -> Pt {
        self.media_box.width()
    }

    pub fn height(&self) -> Pt {
        self.media_box.height()
    }

    /// Consecutive spans are collected into one text object
    pub fn add_span(&mut self, span: SpanLayout) {
        if let Some(PageContents::Text(spans)) = self.contents.last_mut() {
            spans.push(span);
        } else {
            self.contents.push(PageContents::Text(vec![span]));
        }
    }

    pub fn add_image(&mut self, image: ImageLayout) {
        self.contents.push(PageContents::Image(image));
    }

    /// Add arbitrary drawing operators, typically built with [pdf_writer::Content]
    pub fn add_content(&mut self, content: pdf_writer::Content) {
        self.contents.push(PageContents::RawContent(content.finish()));
    }

    /// Write the page object and its content stream. Every font and image in
    /// the document is listed in the page resources as `/F<n>` and `/I<n>`.
    pub(crate) fn write(
        &self,
        refs: &mut ObjectReferences,
        page_index: usize,
        fonts: &Arena<Font>,
        images: &Arena<Image>,
        writer: &mut Pdf,
    ) -> Result<(), PDFError> {
        let id = refs.get(RefType::Page(page_index)).ok_or(PDFError::PageMissing)?;
        let parent = refs.get(RefType::PageTree).ok_or(PDFError::PageMissing)?;
        let content_id = refs.gen(RefType::ContentForPage(page_index));

        let font_names: Vec<(String, Ref)> = fonts
            .iter()
            .filter_map(|(font, _)| Some((format!("F{}", font.index()), refs.get(RefType::Font(font.index()))?)))
            .collect();
        let image_names: Vec<(String, Ref)> = images
            .iter()
            .filter_map(|(image, _)| Some((format!("I{}", image.index()), refs.get(RefType::Image(image.index()))?)))
            .collect();

        let mut page = writer.page(id);
        page.media_box(self.media_box.into())
            .art_box(self.content_box.into())
            .parent(parent)
            .contents(content_id);
        {
            let mut resources = page.resources();
            resources
                .fonts()
                .pairs(font_names.iter().map(|(name, r)| (Name(name.as_bytes()), *r)));
            resources
                .x_objects()
                .pairs(image_names.iter().map(|(name, r)| (Name(name.as_bytes()), *r)));
        }
        page.finish();

        writer.stream(content_id, &render_contents(&self.contents, fonts));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pagesize;

    #[test]
    fn content_box_is_inside_margins() {
        let page = Page::new(pagesize::A4, Some(Margins::all(Pt(36.0))));
        assert_eq!(page.content_box.x1, Pt(36.0));
        assert_eq!(page.content_box.y2, pagesize::A4.1 - Pt(36.0));
        assert_eq!(page.height(), pagesize::A4.1);
    }

    #[test]
    fn raw_content_is_kept_in_order() {
        let mut page = Page::new(pagesize::A5, None);
        let mut content = pdf_writer::Content::new();
        content.rect(0.0, 0.0, 10.0, 10.0);
        content.fill_nonzero();
        page.add_content(content);
        assert!(matches!(page.contents[0], PageContents::RawContent(ref bytes) if !bytes.is_empty()));
    }
}

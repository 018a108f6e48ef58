use crate::font::Font;
use crate::image::Image;
use crate::info::Info;
use crate::page::Page;
use crate::refs::{ObjectReferences, RefType};
use crate::PDFError;
use id_arena::{Arena, Id};
use pdf_writer::{Pdf, Ref};
use std::io::Write;

/// Everything that goes into one PDF file. Fonts and images live in shared
/// arenas; pages refer to them by [Id] and are written in the order they
/// were added.
#[derive(Default)]
pub struct Document {
    /// Written as the document information dictionary when set
    pub info: Option<Info>,
    pub pages: Arena<Page>,
    pub page_order: Vec<Id<Page>>,
    pub fonts: Arena<Font>,
    pub images: Arena<Image>,
}

impl Document {
    pub fn set_info(&mut self, info: Info) {
        self.info = Some(info);
    }

    /// Append a page
    pub fn add_page(&mut self, page: Page) -> Id<Page> {
        let id = self.pages.alloc(page);
        self.page_order.push(id);
        id
    }

    pub fn page_count(&self) -> usize {
        self.page_order.len()
    }

    pub fn add_font(&mut self, font: Font) -> Id<Font> {
        self.fonts.alloc(font)
    }

    /// Images are embedded once however many times they are drawn
    pub fn add_image(&mut self, image: Image) -> Id<Image> {
        self.images.alloc(image)
    }

    /// Serialize the whole document in memory
    pub fn to_bytes(self) -> Result<Vec<u8>, PDFError> {
        let mut refs = ObjectReferences::new();
        let catalog = refs.gen(RefType::Catalog);
        let page_tree = refs.gen(RefType::PageTree);
        let mut pdf = Pdf::new();

        if let Some(info) = &self.info {
            info.write(&mut refs, &mut pdf);
        }

        let kids: Vec<Ref> = (0..self.page_order.len())
            .map(|index| refs.gen(RefType::Page(index)))
            .collect();
        pdf.catalog(catalog).pages(page_tree);
        pdf.pages(page_tree).kids(kids.iter().copied()).count(kids.len() as i32);

        for (id, font) in self.fonts.iter() {
            font.write(&mut refs, id, &mut pdf);
        }
        for (id, image) in self.images.iter() {
            image.write(&mut refs, id.index(), &mut pdf);
        }
        for (index, id) in self.page_order.iter().enumerate() {
            let page = self.pages.get(*id).ok_or(PDFError::PageMissing)?;
            page.write(&mut refs, index, &self.fonts, &self.images, &mut pdf)?;
        }

        tracing::debug!(
            pages = self.page_order.len(),
            fonts = self.fonts.len(),
            images = self.images.len(),
            "serialized pdf"
        );
        Ok(pdf.finish())
    }

    /// Serialize the document and write it to `w` in one go
    pub fn write<W: Write>(self, mut w: W) -> Result<(), PDFError> {
        let bytes = self.to_bytes()?;
        w.write_all(&bytes)?;
        Ok(())
    }
}

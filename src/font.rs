use crate::layout::{FontProvider, FontRole};
use crate::{
    refs::{ObjectReferences, RefType},
    PDFError, Pt,
};
use id_arena::Id;
use owned_ttf_parser::{AsFaceRef, OwnedFace};
use pdf_writer::{
    types::{FontFlags, SystemInfo},
    Finish, Name, Pdf, Ref, Str,
};
use std::collections::{BTreeMap, HashMap};
use std::path::Path;

/// A parsed font object. Fonts can be TTF or OTF fonts, and will be embedded in their
/// entirety in the generated PDF, so large fonts may dramatically increase the size of
/// the generated PDF.
///
/// Typically, fonts are referred to throughout a document by their [Id] within
/// the [Document](crate::Document)'s font arena.
pub struct Font {
    pub face: OwnedFace,
}

impl Font {
    /// Load a font from raw bytes, parsing the font and returning an error if the font
    /// could not be parsed
    pub fn load(bytes: Vec<u8>) -> Result<Font, PDFError> {
        let face = OwnedFace::from_vec(bytes, 0)?;

        Ok(Font { face })
    }

    /// Read and parse a font file from disk
    pub fn load_file<P: AsRef<Path>>(path: P) -> Result<Font, PDFError> {
        let bytes = std::fs::read(path.as_ref())?;
        Font::load(bytes)
    }

    fn name_entry(&self, name_id: u16) -> Option<String> {
        self.face
            .as_face_ref()
            .names()
            .into_iter()
            .find(|name| name.name_id == name_id && name.is_unicode())
            .and_then(|name| name.to_string())
    }

    /// Obtain the full name of the font, or `"Unnamed"` if the font carries none
    pub fn name(&self) -> String {
        self.name_entry(owned_ttf_parser::name_id::FULL_NAME)
            .unwrap_or_else(|| "Unnamed".to_string())
    }

    /// Obtain the family name of the font, falling back to its full name
    pub fn family(&self) -> String {
        self.name_entry(owned_ttf_parser::name_id::FAMILY)
            .unwrap_or_else(|| self.name())
    }

    fn scaling(&self, size: Pt) -> Pt {
        size / self.face.as_face_ref().units_per_em() as f32
    }

    /// Calculate the ascent (distance from the baseline to the top of the font) for the given font size
    pub fn ascent(&self, size: Pt) -> Pt {
        self.scaling(size) * self.face.as_face_ref().ascender() as f32
    }

    /// Calculate the descent (distance from the baseline to the bottom of the font) for the given font size.
    /// Note: this is usually negative
    pub fn descent(&self, size: Pt) -> Pt {
        self.scaling(size) * self.face.as_face_ref().descender() as f32
    }

    /// Calculate the default line height of the font for the given size. The returned value is
    /// how much to vertically offset a second row of text below a first row of text.
    pub fn line_height(&self, size: Pt) -> Pt {
        let leading = self.scaling(size) * self.face.as_face_ref().line_gap() as f32;
        leading + self.ascent(size) - self.descent(size)
    }

    /// Width of `text` set at `size`. Returns [None] as soon as one character has
    /// no glyph in this font, so callers can decide how to estimate instead.
    pub fn width_of_text(&self, text: &str, size: Pt) -> Option<Pt> {
        let scaling = self.scaling(size);
        let face = self.face.as_face_ref();
        text.chars()
            .map(|ch| {
                let gid = face.glyph_index(ch)?;
                Some(scaling * face.glyph_hor_advance(gid).unwrap_or_default() as f32)
            })
            .sum()
    }

    /// Every glyph the unicode cmap can reach, keyed and ordered by glyph id
    fn glyph_table(&self) -> GlyphTable {
        let face = self.face.as_face_ref();
        let mut glyphs = BTreeMap::new();
        let Some(cmap) = face.tables().cmap else {
            return GlyphTable { glyphs };
        };

        for subtable in cmap.subtables.into_iter().filter(|t| t.is_unicode()) {
            subtable.codepoints(|codepoint| {
                let Some(ch) = char::from_u32(codepoint) else {
                    return;
                };
                let Some(gid) = subtable.glyph_index(codepoint).filter(|g| g.0 > 0) else {
                    return;
                };
                if glyphs.contains_key(&gid.0) {
                    return;
                }
                let Some(advance) = face.glyph_hor_advance(gid) else {
                    return;
                };
                let height = face
                    .glyph_bounding_box(gid)
                    .map(|bbox| bbox.y_max - bbox.y_min - face.descender())
                    .unwrap_or(1000);
                glyphs.insert(gid.0, Glyph { ch, advance, height });
            });
        }

        GlyphTable { glyphs }
    }

    /// Glyph space is 1000 units per em in PDF
    fn pdf_scale(&self) -> f32 {
        1000.0 / self.face.as_face_ref().units_per_em() as f32
    }

    fn write_cid(&self, refs: &mut ObjectReferences, font_index: usize, glyphs: &GlyphTable, writer: &mut Pdf) -> Ref {
        let descriptor = self.write_descriptor(refs, font_index, glyphs, writer);
        let id = refs.gen(RefType::CidFont(font_index));
        let scale = self.pdf_scale();

        let mut cid_font = writer.cid_font(id);
        cid_font
            .subtype(pdf_writer::types::CidFontType::Type2)
            .base_font(Name(format!("F{font_index}").as_bytes()))
            .system_info(SystemInfo {
                registry: Str(b"Adobe"),
                ordering: Str(b"Identity"),
                supplement: 0,
            })
            .font_descriptor(descriptor)
            .default_width(glyphs.most_common_advance().map_or(1000.0, |w| w as f32 * scale));

        let mut widths = cid_font.widths();
        widths.consecutive(0, [1000.0]);
        for (start, run) in glyphs.runs() {
            widths.consecutive(start, run.iter().map(|&advance| advance as f32 * scale));
        }
        widths.finish();

        cid_font.cid_to_gid_map_predefined(Name(b"Identity"));
        id
    }

    fn write_descriptor(
        &self,
        refs: &mut ObjectReferences,
        font_index: usize,
        glyphs: &GlyphTable,
        writer: &mut Pdf,
    ) -> Ref {
        let data = refs.gen(RefType::FontData(font_index));
        writer
            .stream(data, self.face.as_slice())
            .pair(Name(b"Length1"), self.face.as_slice().len() as i32);

        let face = self.face.as_face_ref();
        let scale = self.pdf_scale();
        let max_advance = glyphs.glyphs.values().map(|g| g.advance).max().unwrap_or_default() as f32 * scale;
        let max_height = glyphs.glyphs.values().map(|g| g.height).max().unwrap_or_default() as f32 * scale;
        let total_advance: f32 = glyphs.glyphs.values().map(|g| g.advance as f32).sum::<f32>() * scale;
        let avg_advance = total_advance / glyphs.glyphs.len().max(1) as f32;

        let mut flags = FontFlags::empty();
        flags.set(FontFlags::FIXED_PITCH, face.is_monospaced());
        flags.set(FontFlags::ITALIC, face.is_italic());

        let cap_height = face.capital_height().map(|h| h as f32 * scale);
        let id = refs.gen(RefType::FontDescriptor(font_index));
        writer
            .font_descriptor(id)
            .name(Name(self.name().as_bytes()))
            .family(Str(self.family().as_bytes()))
            .weight(face.weight().to_number())
            .flags(flags)
            .bbox(pdf_writer::Rect::new(0.0, 0.0, total_advance, max_height))
            .italic_angle(face.italic_angle())
            .ascent(face.ascender() as f32 * scale)
            .descent(face.descender() as f32 * scale)
            .leading(face.line_gap() as f32 * scale)
            .cap_height(cap_height.unwrap_or(1000.0))
            .x_height(face.x_height().map(|h| h as f32 * scale).or(cap_height).unwrap_or_default())
            // truetype carries no stem width
            .stem_v(80.0)
            .avg_width(avg_advance)
            .max_width(max_advance)
            .missing_width(max_advance)
            .font_file2(data);

        id
    }

    fn write_to_unicode(&self, refs: &mut ObjectReferences, font_index: usize, glyphs: &GlyphTable, writer: &mut Pdf) -> Ref {
        let id = refs.gen(RefType::ToUnicode(font_index));

        let mut cmap = String::from(concat!(
            "/CIDInit /ProcSet findresource begin\n",
            "12 dict begin\n",
            "begincmap\n",
            "/CIDSystemInfo << /Registry (Adobe) /Ordering (UCS) /Supplement 0 >> def\n",
            "/CMapName /Adobe-Identity-UCS def\n",
            "/CMapType 2 def\n",
            "1 begincodespacerange\n<0000> <FFFF>\nendcodespacerange\n",
        ));
        for block in glyphs.bfchar_blocks() {
            cmap.push_str(&format!("{} beginbfchar\n", block.len()));
            for (gid, ch) in block {
                cmap.push_str(&format!("<{gid:04x}> <{:04x}>\n", ch as u32));
            }
            cmap.push_str("endbfchar\n");
        }
        cmap.push_str("endcmap CMapName currentdict /CMap defineresource pop end end\n");

        let compressed = miniz_oxide::deflate::compress_to_vec_zlib(
            cmap.as_bytes(),
            miniz_oxide::deflate::CompressionLevel::DefaultLevel as u8,
        );
        writer
            .stream(id, compressed.as_slice())
            .filter(pdf_writer::Filter::FlateDecode);

        id
    }

    /// Embed the whole font as a Type0 font with an Identity-H encoding, so that
    /// content streams can address glyphs directly by id
    pub(crate) fn write(&self, refs: &mut ObjectReferences, id: Id<Font>, writer: &mut Pdf) {
        let font_index = id.index();
        let glyphs = self.glyph_table();
        tracing::debug!(font = %self.name(), glyphs = glyphs.glyphs.len(), "embedding font");

        let font_id = refs.gen(RefType::Font(font_index));
        let cid_font = self.write_cid(refs, font_index, &glyphs, writer);
        let to_unicode = self.write_to_unicode(refs, font_index, &glyphs, writer);

        writer
            .type0_font(font_id)
            .base_font(Name(format!("F{font_index}").as_bytes()))
            .encoding_predefined(Name(b"Identity-H"))
            .descendant_font(cid_font)
            .to_unicode(to_unicode);
    }

    pub fn glyph_id(&self, ch: char) -> Option<u16> {
        self.face.as_face_ref().glyph_index(ch).map(|i| i.0)
    }

    pub fn replacement_glyph_id(&self) -> Option<u16> {
        self.face.as_face_ref().glyph_index('\u{FFFD}').map(|i| i.0)
    }
}

struct Glyph {
    ch: char,
    /// Horizontal advance in font units
    advance: u16,
    height: i16,
}

struct GlyphTable {
    glyphs: BTreeMap<u16, Glyph>,
}

impl GlyphTable {
    fn most_common_advance(&self) -> Option<u16> {
        let mut counts: HashMap<u16, usize> = HashMap::new();
        for glyph in self.glyphs.values() {
            *counts.entry(glyph.advance).or_default() += 1;
        }
        counts.into_iter().max_by_key(|&(advance, count)| (count, advance)).map(|(advance, _)| advance)
    }

    /// Advances grouped into runs of consecutive glyph ids
    fn runs(&self) -> Vec<(u16, Vec<u16>)> {
        let mut runs: Vec<(u16, Vec<u16>)> = Vec::new();
        for (&gid, glyph) in &self.glyphs {
            match runs.last_mut() {
                Some((start, run)) if usize::from(gid - *start) == run.len() => run.push(glyph.advance),
                _ => runs.push((gid, vec![glyph.advance])),
            }
        }
        runs
    }

    /// ToUnicode entries in blocks of at most 100 sharing the same high byte
    fn bfchar_blocks(&self) -> Vec<Vec<(u16, char)>> {
        let mut blocks: Vec<Vec<(u16, char)>> = Vec::new();
        for (&gid, glyph) in &self.glyphs {
            match blocks.last_mut() {
                Some(block) if block.len() < 100 && block[0].0 >> 8 == gid >> 8 => block.push((gid, glyph.ch)),
                _ => blocks.push(vec![(gid, glyph.ch)]),
            }
        }
        blocks
    }
}

/// The regular and (optional) bold faces a report is set in. Bold text falls
/// back to the regular face when no bold font was supplied.
pub struct FontSet {
    pub regular: Font,
    pub bold: Option<Font>,
}

impl FontSet {
    pub fn new(regular: Font, bold: Option<Font>) -> FontSet {
        FontSet { regular, bold }
    }

    /// Load the regular face and, if given, the bold face from disk
    pub fn load_files<P: AsRef<Path>>(regular: P, bold: Option<P>) -> Result<FontSet, PDFError> {
        let regular = Font::load_file(regular)?;
        let bold = bold.map(Font::load_file).transpose()?;
        Ok(FontSet { regular, bold })
    }

    pub fn font(&self, role: FontRole) -> &Font {
        match role {
            FontRole::Bold => self.bold.as_ref().unwrap_or(&self.regular),
            FontRole::Regular => &self.regular,
        }
    }
}

impl FontProvider for FontSet {
    fn text_width(&self, role: FontRole, size: Pt, text: &str) -> Option<Pt> {
        self.font(role).width_of_text(text, size)
    }

    fn ascent(&self, role: FontRole, size: Pt) -> Pt {
        self.font(role).ascent(size)
    }

    fn descent(&self, role: FontRole, size: Pt) -> Pt {
        self.font(role).descent(size)
    }
}

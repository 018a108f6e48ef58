//! Width measurement capabilities used by the layout engine.
//!
//! The engine never talks to a font directly; it asks a [`TextMeasure`] how
//! wide a string is. Fonts are reached through a [`FontProvider`], which can
//! hand out a [`StyledMeasure`] for any role and size.

use crate::font::Font;
use crate::units::Pt;
use serde::{Deserialize, Serialize};

/// Measures the rendered width of strings in one particular font and size.
pub trait TextMeasure {
    /// Width of `text` when rendered, or [None] if some glyph could not be measured
    fn text_width(&self, text: &str) -> Option<Pt>;

    /// Conservative width of a single character, used whenever measuring fails
    fn fallback_char_width(&self) -> Pt;

    /// Representative width of a wide glyph, used to size forced word chunks
    fn widest_char_width(&self) -> Pt {
        self.text_width("M")
            .unwrap_or_else(|| self.fallback_char_width())
    }

    /// Width of `text`, falling back to a fixed per-character estimate when the
    /// text cannot be measured
    fn width_or_estimate(&self, text: &str) -> Pt {
        match self.text_width(text) {
            Some(width) => width,
            None => {
                let estimate = self.fallback_char_width() * text.chars().count() as f32;
                tracing::debug!(text, %estimate, "text not measurable, using fixed-width estimate");
                estimate
            }
        }
    }
}

impl<M: TextMeasure + ?Sized> TextMeasure for &M {
    fn text_width(&self, text: &str) -> Option<Pt> {
        (**self).text_width(text)
    }

    fn fallback_char_width(&self) -> Pt {
        (**self).fallback_char_width()
    }

    fn widest_char_width(&self) -> Pt {
        (**self).widest_char_width()
    }
}

/// Every character has the same advance. Handy for previews and tests.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Monospace {
    pub advance: Pt,
}

impl Monospace {
    pub fn new(advance: Pt) -> Monospace {
        Monospace { advance }
    }
}

impl TextMeasure for Monospace {
    fn text_width(&self, text: &str) -> Option<Pt> {
        Some(self.advance * text.chars().count() as f32)
    }

    fn fallback_char_width(&self) -> Pt {
        self.advance
    }
}

/// Measures text set in an embedded TrueType [Font] at a given size
pub struct FontMeasure<'a> {
    pub font: &'a Font,
    pub size: Pt,
}

impl TextMeasure for FontMeasure<'_> {
    fn text_width(&self, text: &str) -> Option<Pt> {
        self.font.width_of_text(text, self.size)
    }

    fn fallback_char_width(&self) -> Pt {
        self.size
    }
}

/// Which face of the family a piece of text is set in
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FontRole {
    #[default]
    Regular,
    Bold,
}

/// Supplies metrics for the fonts a document is set in.
pub trait FontProvider {
    /// Width of `text` in the font for `role` at `size`, [None] if unmeasurable
    fn text_width(&self, role: FontRole, size: Pt, text: &str) -> Option<Pt>;

    /// Distance from the baseline to the top of the font
    fn ascent(&self, role: FontRole, size: Pt) -> Pt;

    /// Distance from the baseline to the bottom of the font. Usually negative
    fn descent(&self, role: FontRole, size: Pt) -> Pt;

    /// A [TextMeasure] bound to one role and size
    fn measure(&self, role: FontRole, size: Pt) -> StyledMeasure<'_, Self>
    where
        Self: Sized,
    {
        StyledMeasure {
            fonts: self,
            role,
            size,
        }
    }
}

/// A [FontProvider] narrowed down to a single role and size
pub struct StyledMeasure<'a, P: ?Sized> {
    pub fonts: &'a P,
    pub role: FontRole,
    pub size: Pt,
}

impl<P: FontProvider + ?Sized> TextMeasure for StyledMeasure<'_, P> {
    fn text_width(&self, text: &str) -> Option<Pt> {
        self.fonts.text_width(self.role, self.size, text)
    }

    fn fallback_char_width(&self) -> Pt {
        self.size
    }
}

/// Font metrics for a fictional monospaced family: every glyph advances by
/// `advance_em` of the font size. Lets reports be laid out without any font files.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct MonospaceFonts {
    pub advance_em: f32,
}

impl Default for MonospaceFonts {
    fn default() -> Self {
        MonospaceFonts { advance_em: 0.6 }
    }
}

impl FontProvider for MonospaceFonts {
    fn text_width(&self, _role: FontRole, size: Pt, text: &str) -> Option<Pt> {
        Some(size * self.advance_em * text.chars().count() as f32)
    }

    fn ascent(&self, _role: FontRole, size: Pt) -> Pt {
        size * 0.8
    }

    fn descent(&self, _role: FontRole, size: Pt) -> Pt {
        size * -0.2
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Can't measure anything, like a font missing every glyph
    struct Blind;

    impl TextMeasure for Blind {
        fn text_width(&self, _text: &str) -> Option<Pt> {
            None
        }

        fn fallback_char_width(&self) -> Pt {
            Pt(7.0)
        }
    }

    #[test]
    fn monospace_counts_chars_not_bytes() {
        let m = Monospace::new(Pt(10.0));
        assert_eq!(m.text_width("ação"), Some(Pt(40.0)));
        assert_eq!(m.widest_char_width(), Pt(10.0));
    }

    #[test]
    fn unmeasurable_text_falls_back_to_estimate() {
        assert_eq!(Blind.width_or_estimate("abc"), Pt(21.0));
        assert_eq!(Blind.widest_char_width(), Pt(7.0));
    }

    #[test]
    fn styled_measure_scales_with_size() {
        let fonts = MonospaceFonts { advance_em: 0.5 };
        let m = fonts.measure(FontRole::Bold, Pt(10.0));
        assert_eq!(m.text_width("abcd"), Some(Pt(20.0)));
        assert_eq!(m.fallback_char_width(), Pt(10.0));
    }
}

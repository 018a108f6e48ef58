use super::measure::FontRole;
use crate::{colour::colours, Colour, Pt, Rect};
use serde::{Deserialize, Serialize};

/// Horizontal placement of a line of text within the width it was given
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Align {
    #[default]
    Left,
    Center,
    Right,
}

impl Align {
    /// Offset from the left edge of a slot `available` wide for text `width` wide.
    /// Text wider than its slot is never pushed left of the slot's start.
    pub fn offset(self, available: Pt, width: Pt) -> Pt {
        let slack = (available - width).max(Pt::ZERO);
        match self {
            Align::Left => Pt::ZERO,
            Align::Center => slack / 2.0,
            Align::Right => slack,
        }
    }
}

/// Font and colour a piece of text is drawn with
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextStyle {
    #[serde(default)]
    pub role: FontRole,
    pub size: Pt,
    #[serde(default = "default_text_colour")]
    pub colour: Colour,
}

fn default_text_colour() -> Colour {
    colours::BLACK
}

impl TextStyle {
    pub fn regular(size: Pt) -> TextStyle {
        TextStyle {
            role: FontRole::Regular,
            size,
            colour: colours::BLACK,
        }
    }

    pub fn bold(size: Pt) -> TextStyle {
        TextStyle {
            role: FontRole::Bold,
            ..TextStyle::regular(size)
        }
    }

    pub fn with_colour(self, colour: Colour) -> TextStyle {
        TextStyle { colour, ..self }
    }
}

/// How a rectangle is painted. A rectangle with neither stroke nor fill is invisible.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct RectStyle {
    #[serde(default)]
    pub stroke: Option<Colour>,
    #[serde(default)]
    pub fill: Option<Colour>,
    #[serde(default = "default_line_width")]
    pub line_width: Pt,
}

fn default_line_width() -> Pt {
    Pt(0.57)
}

impl RectStyle {
    /// A thin black outline
    pub fn outline() -> RectStyle {
        RectStyle {
            stroke: Some(colours::BLACK),
            fill: None,
            line_width: default_line_width(),
        }
    }

    /// A solid fill with no outline
    pub fn filled(colour: Colour) -> RectStyle {
        RectStyle {
            stroke: None,
            fill: Some(colour),
            line_width: default_line_width(),
        }
    }

    pub fn is_visible(&self) -> bool {
        self.stroke.is_some() || self.fill.is_some()
    }
}

/// A single line of text placed on a page.
///
/// `x`, `y` are the top-left corner of the line's slot, measured from the
/// top-left corner of the page. The renderer centres the glyphs vertically in
/// `line_height` and aligns them horizontally within `width`.
#[derive(Debug, Clone, PartialEq)]
pub struct TextCommand {
    pub x: Pt,
    pub y: Pt,
    pub width: Pt,
    pub line_height: Pt,
    pub text: String,
    pub align: Align,
    pub style: TextStyle,
}

/// The output of the layout engine: an ordered list of things to draw, with
/// explicit page breaks between pages. Coordinates are measured from the top
/// left corner of the page, y growing downward.
#[derive(Debug, Clone, PartialEq)]
pub enum DrawCommand {
    Rect { rect: Rect, style: RectStyle },
    Text(TextCommand),
    /// Draw the report's image number `slot` scaled into `rect`
    Image { rect: Rect, slot: usize },
    PageBreak,
}

impl DrawCommand {
    pub fn is_page_break(&self) -> bool {
        matches!(self, DrawCommand::PageBreak)
    }

    pub fn as_text(&self) -> Option<&TextCommand> {
        match self {
            DrawCommand::Text(text) => Some(text),
            _ => None,
        }
    }
}

/// Split a command stream at its page breaks. There is always at least one page.
pub fn pages(commands: &[DrawCommand]) -> impl Iterator<Item = &[DrawCommand]> {
    commands.split(DrawCommand::is_page_break)
}

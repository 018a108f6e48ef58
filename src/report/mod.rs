//! The printable documents built from records.
//!
//! A report is laid out once into [DrawCommand]s and then handed to
//! [render_pdf](crate::render::render_pdf). All sizes and colours come from a
//! [ReportStyle], which can be loaded from a JSON file; every field has a
//! default, so a style file only needs the values it changes.

mod convenio;
mod rotina;

pub use convenio::*;
pub use rotina::*;

use crate::colour::colours;
use crate::layout::{pages, DrawCommand, TextCommand};
use crate::pagesize::{PageSize, Paper};
use crate::units::{Mm, Pt};
use crate::{Colour, Image};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Layout of the convênio technical guide. Lengths in millimetres, font sizes in points.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConvenioStyle {
    pub margin: Mm,
    /// Distance from the bottom edge at which content moves to a new page
    pub bottom_margin: Mm,
    pub title_height: Mm,
    pub title_size: Pt,
    pub title_gap: Mm,
    pub section_height: Mm,
    pub section_size: Pt,
    pub section_gap: Mm,
    pub body_size: Pt,
    pub body_line_height: Mm,
    pub section_spacing: Mm,
    pub column_widths: Vec<Mm>,
    pub table_size: Pt,
    pub table_line_height: Mm,
    pub table_padding: Mm,
    pub block_title_height: Mm,
    pub block_title_size: Pt,
    pub block_size: Pt,
    pub block_line_height: Mm,
    pub block_padding: Mm,
    pub block_gap: Mm,
    pub footer: String,
    /// Distance from the bottom edge to the top of the footer line
    pub footer_offset: Mm,
    pub footer_height: Mm,
    pub footer_size: Pt,
}

impl Default for ConvenioStyle {
    fn default() -> Self {
        ConvenioStyle {
            margin: Mm(10.0),
            bottom_margin: Mm(15.0),
            title_height: Mm(15.0),
            title_size: Pt(16.0),
            title_gap: Mm(5.0),
            section_height: Mm(8.0),
            section_size: Pt(11.0),
            section_gap: Mm(2.0),
            body_size: Pt(9.0),
            body_line_height: Mm(7.0),
            section_spacing: Mm(5.0),
            column_widths: vec![Mm(45.0), Mm(30.0), Mm(25.0), Mm(25.0), Mm(65.0)],
            table_size: Pt(8.0),
            table_line_height: Mm(7.0),
            table_padding: Mm(1.0),
            block_title_height: Mm(7.0),
            block_title_size: Pt(11.0),
            block_size: Pt(9.0),
            block_line_height: Mm(5.0),
            block_padding: Mm(1.0),
            block_gap: Mm(3.0),
            footer: "GABMA Consultoria - Sistema Técnico de Convênios".to_string(),
            footer_offset: Mm(20.0),
            footer_height: Mm(10.0),
            footer_size: Pt(8.0),
        }
    }
}

/// Layout of the rotina document. Lengths in millimetres, font sizes in points.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RotinaStyle {
    pub margin_left: Mm,
    pub margin_top: Mm,
    pub margin_right: Mm,
    pub bottom_margin: Mm,
    pub title_height: Mm,
    pub title_size: Pt,
    pub title_gap: Mm,
    pub sector_height: Mm,
    pub sector_size: Pt,
    pub sector_gap: Mm,
    pub image_width: Mm,
    pub image_gap: Mm,
    pub bar_spacing: Mm,
    pub bar_height: Mm,
    pub bar_size: Pt,
    pub bar_gap: Mm,
    pub body_size: Pt,
    pub body_line_height: Mm,
    /// Horizontal inset of the description on each side
    pub body_inset: Mm,
    pub bullet_indent: Mm,
}

impl Default for RotinaStyle {
    fn default() -> Self {
        RotinaStyle {
            margin_left: Mm(15.0),
            margin_top: Mm(12.0),
            margin_right: Mm(15.0),
            bottom_margin: Mm(15.0),
            title_height: Mm(14.0),
            title_size: Pt(18.0),
            title_gap: Mm(4.0),
            sector_height: Mm(7.0),
            sector_size: Pt(11.0),
            sector_gap: Mm(2.0),
            image_width: Mm(120.0),
            image_gap: Mm(10.0),
            bar_spacing: Mm(3.0),
            bar_height: Mm(8.0),
            bar_size: Pt(12.0),
            bar_gap: Mm(2.0),
            body_size: Pt(10.0),
            body_line_height: Mm(6.4),
            body_inset: Mm(2.0),
            bullet_indent: Mm(4.0),
        }
    }
}

/// Everything that decides how reports look
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportStyle {
    pub paper: Paper,
    pub primary: Colour,
    pub bar_grey: Colour,
    pub block_grey: Colour,
    pub muted_text: Colour,
    pub footer_text: Colour,
    pub convenio: ConvenioStyle,
    pub rotina: RotinaStyle,
}

impl Default for ReportStyle {
    fn default() -> Self {
        ReportStyle {
            paper: Paper::A4,
            primary: colours::PRIMARY,
            bar_grey: colours::BAR_GREY,
            block_grey: colours::BLOCK_GREY,
            muted_text: colours::MUTED_TEXT,
            footer_text: colours::FOOTER_TEXT,
            convenio: ConvenioStyle::default(),
            rotina: RotinaStyle::default(),
        }
    }
}

impl ReportStyle {
    pub fn from_json(json: &str) -> Result<ReportStyle, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<ReportStyle, std::io::Error> {
        let json = std::fs::read_to_string(path)?;
        ReportStyle::from_json(&json).map_err(std::io::Error::from)
    }
}

/// A laid-out document, ready to be rendered
pub struct Report {
    pub title: String,
    pub page_size: PageSize,
    pub commands: Vec<DrawCommand>,
    /// Images referred to by [DrawCommand::Image] slots
    pub images: Vec<Image>,
}

impl Report {
    pub fn page_count(&self) -> usize {
        pages(&self.commands).count()
    }

    /// The commands of each page in turn
    pub fn pages(&self) -> impl Iterator<Item = &[DrawCommand]> {
        pages(&self.commands)
    }

    /// All text drawn in the report, one entry per line, in drawing order
    pub fn text_lines(&self) -> impl Iterator<Item = &str> {
        self.commands
            .iter()
            .filter_map(DrawCommand::as_text)
            .map(|t| t.text.as_str())
    }
}

/// Repeat `footer` at the end of every page of `commands`
fn stamp_footer(commands: Vec<DrawCommand>, footer: &TextCommand) -> Vec<DrawCommand> {
    let mut stamped = Vec::with_capacity(commands.len() + 4);
    for command in commands {
        if command.is_page_break() {
            stamped.push(DrawCommand::Text(footer.clone()));
        }
        stamped.push(command);
    }
    stamped.push(DrawCommand::Text(footer.clone()));
    stamped
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn style_files_only_need_overrides() {
        let style = ReportStyle::from_json(r##"{"primary": "#FF0000", "rotina": {"image_width": 90}}"##).unwrap();
        assert_eq!(style.primary, Colour::from_hex("#ff0000").unwrap());
        assert_eq!(style.rotina.image_width, Mm(90.0));
        assert_eq!(style.rotina.body_line_height, Mm(6.4));
        assert_eq!(style.convenio, ConvenioStyle::default());
    }

    #[test]
    fn bad_colours_are_rejected() {
        assert!(ReportStyle::from_json(r#"{"primary": "blue"}"#).is_err());
    }

    #[test]
    fn footer_on_every_page() {
        let footer = TextCommand {
            x: Pt(0.0),
            y: Pt(0.0),
            width: Pt(10.0),
            line_height: Pt(10.0),
            text: "rodapé".into(),
            align: crate::layout::Align::Center,
            style: crate::layout::TextStyle::regular(Pt(8.0)),
        };
        let stamped = stamp_footer(vec![DrawCommand::PageBreak, DrawCommand::PageBreak], &footer);
        let report = Report {
            title: String::new(),
            page_size: crate::pagesize::A4,
            commands: stamped,
            images: Vec::new(),
        };
        assert_eq!(report.page_count(), 3);
        assert!(report.pages().all(|page| page.iter().filter_map(DrawCommand::as_text).count() == 1));
    }
}

use super::{Report, ReportStyle};
use crate::colour::colours;
use crate::layout::{
    layout_bar, layout_box, Align, BarStyle, BoxStyle, BulletMarkers, DrawCommand, FontProvider, FontRole,
    LayoutContext, LayoutError, PageCursor, RectStyle, TextStyle,
};
use crate::records::Rotina;
use crate::sanitize::{clean_html, sanitize_text};
use crate::units::Pt;
use crate::{Image, Rect};

/// Lay out the document for one rotina: title, sector, screenshot and the
/// description with its bulleted steps.
///
/// A screenshot that can't be decoded is left out of the document; the
/// problem is logged rather than failing the whole report.
pub fn rotina_report<F: FontProvider>(rotina: &Rotina, fonts: &F, style: &ReportStyle) -> Result<Report, LayoutError> {
    let s = &style.rotina;
    let page_size = style.paper.size();
    let left: Pt = s.margin_left.into();
    let content_width = page_size.0 - left - Pt::from(s.margin_right);
    let mut cursor = PageCursor::new(s.margin_top.into(), page_size.1 - Pt::from(s.bottom_margin));
    let mut commands = Vec::new();
    let mut images = Vec::new();

    let nome = sanitize_text(Some(rotina.nome())).trim().to_uppercase();
    let title = if nome.is_empty() { "ROTINA".to_string() } else { nome };
    tracing::debug!(rotina = rotina.id, %title, "laying out rotina document");

    let title_bar = BarStyle {
        height: s.title_height.into(),
        fill: RectStyle::filled(style.primary),
        text: TextStyle::bold(s.title_size).with_colour(colours::WHITE),
        align: Align::Center,
    };
    commands.extend(layout_bar(&title, left, content_width, &title_bar, &mut cursor)?);
    cursor.skip(s.title_gap.into());

    let setor = sanitize_text(Some(rotina.setor()));
    if !setor.trim().is_empty() {
        let sector = BarStyle {
            height: s.sector_height.into(),
            fill: RectStyle {
                stroke: None,
                fill: None,
                line_width: Pt::ZERO,
            },
            text: TextStyle::regular(s.sector_size).with_colour(style.muted_text),
            align: Align::Center,
        };
        commands.extend(layout_bar(
            &format!("Setor: {}", setor.trim()),
            left,
            content_width,
            &sector,
            &mut cursor,
        )?);
        cursor.skip(s.sector_gap.into());
    }

    let screenshot = rotina.print_b64();
    if !screenshot.trim().is_empty() {
        match Image::from_data_url(screenshot) {
            Ok(image) => {
                let mut width = Pt::from(s.image_width).min(content_width);
                let mut height = image.scaled_height(width);
                if height > cursor.usable_height() {
                    // shrink to a full page rather than run off the bottom
                    let scale = cursor.usable_height() / height;
                    height = cursor.usable_height();
                    width = width * scale;
                }
                if !cursor.fits(height) && !cursor.at_page_top() {
                    commands.push(cursor.advance_page());
                }
                commands.push(DrawCommand::Image {
                    rect: Rect::from_xywh(left, cursor.y, width, height),
                    slot: images.len(),
                });
                images.push(image);
                cursor.skip(height);
                cursor.skip(s.image_gap.into());
            }
            Err(e) => {
                tracing::warn!(rotina = rotina.id, error = %e, "screenshot could not be decoded, leaving it out");
            }
        }
    }

    cursor.skip(s.bar_spacing.into());
    let bar = BarStyle {
        height: s.bar_height.into(),
        fill: RectStyle::filled(style.bar_grey),
        text: TextStyle::bold(s.bar_size),
        align: Align::Left,
    };
    commands.extend(layout_bar(" DESCRIÇÃO", left, content_width, &bar, &mut cursor)?);
    cursor.skip(s.bar_gap.into());

    let inset: Pt = s.body_inset.into();
    let body = LayoutContext::new(
        left + inset,
        content_width - inset * 2.0,
        s.body_line_height.into(),
        fonts.measure(FontRole::Regular, s.body_size),
    )
    .with_bullet_indent(s.bullet_indent.into());
    let description = clean_html(&sanitize_text(Some(rotina.descricao())));
    let lines = body.wrap(&description, &BulletMarkers::default());
    let plain = BoxStyle {
        border: None,
        text: TextStyle::regular(s.body_size),
        align: Align::Left,
    };
    commands.extend(layout_box(&lines, &body, &plain, &mut cursor)?);

    Ok(Report {
        title: format!("Rotina - {title}"),
        page_size,
        commands,
        images,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::MonospaceFonts;
    use crate::units::Mm;

    #[test]
    fn untitled_rotina() {
        let report = rotina_report(&Rotina::default(), &MonospaceFonts::default(), &ReportStyle::default()).unwrap();
        let lines: Vec<&str> = report.text_lines().collect();
        assert_eq!(lines[0], "ROTINA");
        assert!(!lines.iter().any(|l| l.starts_with("Setor:")));
        assert!(lines.contains(&" DESCRIÇÃO"));
        assert_eq!(report.page_count(), 1);
    }

    #[test]
    fn bullets_are_indented_from_the_inset() {
        let mut rotina = Rotina::new(4, "Faturamento");
        rotina.setor = Some("Financeiro".into());
        rotina.descricao = Some("<p>Passos:</p><ul><li>conferir guias</li><li>gerar lote</li></ul>".into());

        let report = rotina_report(&rotina, &MonospaceFonts::default(), &ReportStyle::default()).unwrap();
        let texts: Vec<_> = report.commands.iter().filter_map(DrawCommand::as_text).collect();
        assert_eq!(texts[0].text, "FATURAMENTO");
        assert_eq!(texts[1].text, "Setor: Financeiro");

        let left: Pt = Mm(15.0).into();
        let inset: Pt = Mm(2.0).into();
        let indent: Pt = Mm(4.0).into();
        let intro = texts.iter().find(|t| t.text == "Passos:").unwrap();
        let bullet = texts.iter().find(|t| t.text == "• conferir guias").unwrap();
        assert_eq!(intro.x, left + inset);
        assert_eq!(bullet.x, left + inset + indent);
        assert!(bullet.y > intro.y);
    }

    #[test]
    fn broken_screenshot_is_skipped() {
        let mut rotina = Rotina::new(1, "x");
        rotina.print_b64 = Some("data:image/png;base64,bm90IGFuIGltYWdl".into());
        let report = rotina_report(&rotina, &MonospaceFonts::default(), &ReportStyle::default()).unwrap();
        assert!(report.images.is_empty());
        assert!(!report.commands.iter().any(|c| matches!(c, DrawCommand::Image { .. })));
    }

    #[test]
    fn long_description_flows_onto_more_pages() {
        let mut rotina = Rotina::new(2, "Longa");
        rotina.descricao = Some((0..200).map(|i| format!("<p>passo {i}</p>")).collect());
        let report = rotina_report(&rotina, &MonospaceFonts::default(), &ReportStyle::default()).unwrap();
        assert!(report.page_count() > 1);
        assert_eq!(report.text_lines().filter(|l| l.starts_with("passo ")).count(), 200);
    }
}

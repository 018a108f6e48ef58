use base64::Engine;
use gabma_docs::layout::{DrawCommand, MonospaceFonts};
use gabma_docs::records::{Convenio, Rotina};
use gabma_docs::report::{convenio_report, rotina_report, Report, ReportStyle};
use gabma_docs::Pt;
use image::{ImageFormat, Rgb, RgbImage};
use std::io::Cursor;

const FOOTER: &str = "GABMA Consultoria - Sistema Técnico de Convênios";

fn png_data_url(width: u32, height: u32) -> String {
    let img = RgbImage::from_pixel(width, height, Rgb([0x20, 0x60, 0xa0]));
    let mut png = Cursor::new(Vec::new());
    img.write_to(&mut png, ImageFormat::Png).unwrap();
    format!(
        "data:image/png;base64,{}",
        base64::engine::general_purpose::STANDARD.encode(png.into_inner())
    )
}

/// Everything drawn must land on the paper
fn assert_on_page(report: &Report) {
    let (width, height) = report.page_size;
    for command in &report.commands {
        match command {
            DrawCommand::Text(text) => {
                assert!(text.y >= Pt::ZERO && text.y + text.line_height <= height, "{text:?}");
                assert!(text.x >= Pt::ZERO && text.x + text.width <= width, "{text:?}");
            }
            DrawCommand::Rect { rect, .. } | DrawCommand::Image { rect, .. } => {
                assert!(rect.y1 >= Pt::ZERO && rect.y2 <= height, "{rect:?}");
                assert!(rect.x1 >= Pt::ZERO && rect.x2 <= width, "{rect:?}");
            }
            DrawCommand::PageBreak => {}
        }
    }
}

#[test]
fn long_observations_spill_onto_new_pages_with_footers() {
    let mut convenio = Convenio::named("Amil");
    convenio.observacoes = Some(lipsum::lipsum(1500));
    convenio.config_gerador = Some(lipsum::lipsum(200));

    let report = convenio_report(&convenio, &MonospaceFonts::default(), &ReportStyle::default()).unwrap();
    assert!(report.page_count() > 1);
    assert_on_page(&report);

    for page in report.pages() {
        let footers = page
            .iter()
            .filter_map(DrawCommand::as_text)
            .filter(|t| t.text == FOOTER)
            .count();
        assert_eq!(footers, 1);
    }
}

#[test]
fn body_never_runs_into_the_footer() {
    let mut convenio = Convenio::named("Bradesco Saúde");
    convenio.config_gerador = Some(lipsum::lipsum(300));
    convenio.observacoes = Some(lipsum::lipsum(1500));

    let report = convenio_report(&convenio, &MonospaceFonts::default(), &ReportStyle::default()).unwrap();
    assert!(report.page_count() > 2);

    for (index, page) in report.pages().enumerate() {
        let footer_top = page
            .iter()
            .filter_map(DrawCommand::as_text)
            .find(|t| t.text == FOOTER)
            .map(|t| t.y)
            .unwrap();
        for command in page {
            let bottom = match command {
                DrawCommand::Text(text) if text.text == FOOTER => continue,
                DrawCommand::Text(text) => text.y + text.line_height,
                DrawCommand::Rect { rect, .. } | DrawCommand::Image { rect, .. } => rect.y2,
                DrawCommand::PageBreak => continue,
            };
            assert!(
                bottom <= footer_top + Pt(0.01),
                "page {index}: {command:?} ends at {bottom} below the footer at {footer_top}"
            );
        }
    }
}

#[test]
fn every_observation_word_is_kept_in_order() {
    let observations = lipsum::lipsum(400);
    let mut convenio = Convenio::named("Cassi");
    convenio.observacoes = Some(observations.clone());

    let report = convenio_report(&convenio, &MonospaceFonts::default(), &ReportStyle::default()).unwrap();
    let text: Vec<&str> = report
        .text_lines()
        .filter(|line| *line != FOOTER)
        .flat_map(|line| line.split_whitespace())
        .collect();
    let words: Vec<&str> = observations.split_whitespace().collect();
    let start = text
        .windows(words.len())
        .position(|window| window == words.as_slice());
    assert!(start.is_some(), "observations were not laid out contiguously");
}

#[test]
fn rotina_with_screenshot_and_steps() {
    let mut rotina = Rotina::new(7, "Conferência de guias");
    rotina.setor = Some("Faturamento".into());
    rotina.print_b64 = Some(png_data_url(400, 200));
    rotina.descricao = Some("<p>Antes de fechar o lote:</p><ul><li>Abrir o sistema</li><li>Conferir &amp; assinar</li></ul>".into());

    let report = rotina_report(&rotina, &MonospaceFonts::default(), &ReportStyle::default()).unwrap();
    assert_eq!(report.title, "Rotina - CONFERÊNCIA DE GUIAS");
    assert_eq!(report.images.len(), 1);
    assert_on_page(&report);

    let lines: Vec<&str> = report.text_lines().collect();
    assert_eq!(lines[0], "CONFERÊNCIA DE GUIAS");
    assert!(lines.contains(&"Setor: Faturamento"));
    assert!(lines.contains(&"• Abrir o sistema"));
    assert!(lines.contains(&"• Conferir & assinar"));

    let image = report
        .commands
        .iter()
        .find_map(|c| match c {
            DrawCommand::Image { rect, slot } => Some((*rect, *slot)),
            _ => None,
        })
        .unwrap();
    assert_eq!(image.1, 0);
    // 2:1 aspect ratio is kept
    assert!((image.0.width() - image.0.height() * 2.0).abs() < Pt(0.5));
}

#[test]
fn tall_screenshot_is_shrunk_to_fit_a_page() {
    let mut rotina = Rotina::new(8, "Print gigante");
    rotina.print_b64 = Some(png_data_url(50, 2000));

    let report = rotina_report(&rotina, &MonospaceFonts::default(), &ReportStyle::default()).unwrap();
    assert_eq!(report.images.len(), 1);
    assert_on_page(&report);
}

#[test]
fn style_changes_paper_size() {
    let style = ReportStyle::from_json(r#"{ "paper": "letter" }"#).unwrap();
    let report = convenio_report(&Convenio::named("Geap"), &MonospaceFonts::default(), &style).unwrap();
    assert_eq!(report.page_size, gabma_docs::pagesize::LETTER);
    assert_on_page(&report);
}

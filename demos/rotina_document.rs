use base64::Engine;
use gabma_docs::records::Rotina;
use gabma_docs::render::render_pdf;
use gabma_docs::report::{rotina_report, ReportStyle};
use gabma_docs::{FontSet, Info};
use image::{ImageFormat, Rgb, RgbImage};
use std::io::Cursor;

/// A fake screenshot: a window with a title bar and a few grey rows
fn screenshot() -> String {
    let img = RgbImage::from_fn(640, 400, |_, y| match y {
        0..=39 => Rgb([0x00, 0x33, 0x66]),
        _ if (y / 40) % 2 == 0 => Rgb([0xf0, 0xf0, 0xf0]),
        _ => Rgb([0xff, 0xff, 0xff]),
    });
    let mut png = Cursor::new(Vec::new());
    img.write_to(&mut png, ImageFormat::Png).expect("can encode png");
    format!(
        "data:image/png;base64,{}",
        base64::engine::general_purpose::STANDARD.encode(png.into_inner())
    )
}

fn main() {
    // usage: rotina-document <regular.ttf> [bold.ttf]
    let mut args = std::env::args().skip(1);
    let regular = args.next().expect("path to a regular TrueType font");
    let bold = args.next();
    let fonts = FontSet::load_files(regular, bold).expect("can load fonts");

    let mut rotina = Rotina::new(1, "Fechamento de lote");
    rotina.setor = Some("Faturamento".into());
    rotina.print_b64 = Some(screenshot());
    rotina.descricao = Some(format!(
        "<p>{}</p><ul><li>Conferir as guias do período</li><li>{}</li><li>Gerar o XML &amp; enviar</li></ul><p>{}</p>",
        lipsum::lipsum(40),
        lipsum::lipsum(30),
        lipsum::lipsum(200),
    ));

    let report = rotina_report(&rotina, &fonts, &ReportStyle::default()).expect("can lay out rotina");
    println!("laid out {} page(s)", report.page_count());

    let bytes = render_pdf(report, fonts, Info::new().author("GABMA Consultoria")).expect("can render pdf");
    std::fs::write("rotina-document.pdf", bytes).expect("can write pdf");
}

use gabma_docs::layout::{wrap_text, BulletMarkers, LayoutContext, Monospace};
use gabma_docs::Pt;

fn main() {
    // usage: wrap-preview [columns]
    let columns: usize = std::env::args()
        .nth(1)
        .and_then(|c| c.parse().ok())
        .unwrap_or(48);

    // one point per character, so widths read as column counts
    let measure = Monospace::new(Pt(1.0));
    let width = Pt(columns as f32);
    let rule = "-".repeat(columns);

    println!("{rule}");
    for line in wrap_text(lipsum::lipsum(80).as_str(), width, measure) {
        println!("{}", line.text);
    }

    println!("{rule}");
    let steps = format!(
        "Passos:\n• {}\n-> {}\n- {}",
        lipsum::lipsum(20),
        lipsum::lipsum(12),
        "x".repeat(columns * 2)
    );
    let ctx = LayoutContext::new(Pt::ZERO, width, Pt(1.0), measure).with_bullet_indent(Pt(2.0));
    for line in ctx.wrap(&steps, &BulletMarkers::default()) {
        println!("{}{}", " ".repeat(*line.indent as usize), line.text);
    }
    println!("{rule}");
}

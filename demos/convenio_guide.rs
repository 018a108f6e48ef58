use gabma_docs::records::Convenio;
use gabma_docs::render::render_pdf;
use gabma_docs::report::{convenio_report, ReportStyle};
use gabma_docs::{FontSet, Info};

fn main() {
    // usage: convenio-guide <regular.ttf> [bold.ttf]
    let mut args = std::env::args().skip(1);
    let regular = args.next().expect("path to a regular TrueType font");
    let bold = args.next();
    let fonts = FontSet::load_files(regular, bold).expect("can load fonts");

    let mut convenio = Convenio::named("Saúde Total");
    convenio.codigo = Some("4471".into());
    convenio.empresa = Some("Hospital Central".into());
    convenio.sistema_utilizado = Some("Orizon".into());
    convenio.site = Some("https://portal.saudetotal.example.com/prestador/login".into());
    convenio.login = Some("faturamento".into());
    convenio.senha = Some("troque-me".into());
    convenio.prazo_retorno = Some("30".into());
    convenio.envio = Some("Até o dia 10".into());
    convenio.validade = Some("60".into());
    convenio.xml = Some("Sim".into());
    convenio.versao_xml = Some("4.01.00".into());
    convenio.nf = Some("Sim".into());
    convenio.fluxo_nf = Some("Envio da NF junto ao XML".into());
    convenio.config_gerador = Some("Lote por competência\nUm protocolo por guia".into());
    convenio.doc_digitalizacao = Some("Guia assinada, pedido médico e laudo".into());
    convenio.observacoes = Some(format!("{}\n\n{}", lipsum::lipsum(60), lipsum::lipsum(120)));

    let report = convenio_report(&convenio, &fonts, &ReportStyle::default()).expect("can lay out guide");
    println!("laid out {} page(s)", report.page_count());

    let bytes = render_pdf(report, fonts, Info::new().author("GABMA Consultoria")).expect("can render pdf");
    std::fs::write("convenio-guide.pdf", bytes).expect("can write pdf");
}

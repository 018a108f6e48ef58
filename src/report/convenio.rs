use super::{stamp_footer, Report, ReportStyle};
use crate::colour::colours;
use crate::layout::{
    layout_bar, layout_box, layout_row, Align, BarStyle, BoxStyle, BulletMarkers, FontProvider, FontRole,
    LayoutContext, LayoutError, PageCursor, RectStyle, RowStyle, TableSpec, TextCommand, TextStyle,
};
use crate::records::Convenio;
use crate::sanitize::sanitize_text;
use crate::units::Pt;

const TABLE_HEADER: [&str; 5] = ["Prazo Envio", "Validade Guia", "XML / Versão", "Nota Fiscal", "Fluxo NF"];

/// Lay out the technical guide for one convênio: identification and access
/// data, billing schedule table, free-text blocks and a footer on every page.
pub fn convenio_report<F: FontProvider>(
    convenio: &Convenio,
    fonts: &F,
    style: &ReportStyle,
) -> Result<Report, LayoutError> {
    let s = &style.convenio;
    let page_size = style.paper.size();
    let margin: Pt = s.margin.into();
    let x = margin;
    let content_width = page_size.0 - margin * 2.0;
    // body content stops above the footer band as well as the bottom margin
    let reserved = Pt::from(s.bottom_margin).max(Pt::from(s.footer_offset));
    let mut cursor = PageCursor::new(margin, page_size.1 - reserved);
    let mut commands = Vec::new();

    let nome = sanitize_text(Some(convenio.nome()));
    tracing::debug!(convenio = %nome, "laying out convênio guide");

    let title = BarStyle {
        height: s.title_height.into(),
        fill: RectStyle::filled(style.primary),
        text: TextStyle::bold(s.title_size).with_colour(colours::WHITE),
        align: Align::Center,
    };
    commands.extend(layout_bar(
        &format!("GUIA TÉCNICA: {}", nome.to_uppercase()),
        x,
        content_width,
        &title,
        &mut cursor,
    )?);
    cursor.skip(s.title_gap.into());

    let section = BarStyle {
        height: s.section_height.into(),
        fill: RectStyle::filled(style.bar_grey),
        text: TextStyle::bold(s.section_size),
        align: Align::Left,
    };

    // identification and access
    commands.extend(layout_bar(
        " 1. DADOS DE IDENTIFICAÇÃO E ACESSO",
        x,
        content_width,
        &section,
        &mut cursor,
    )?);
    cursor.skip(s.section_gap.into());

    let body = LayoutContext::new(
        x,
        content_width,
        s.body_line_height.into(),
        fonts.measure(FontRole::Regular, s.body_size),
    );
    let identification = [
        format!("Empresa: {} | Código: {}", convenio.empresa(), convenio.codigo()),
        format!("Portal: {}", convenio.site()),
        format!("Login: {}  |  Senha: {}", convenio.login(), convenio.senha()),
        format!(
            "Sistema: {} | Retorno: {}",
            convenio.sistema_utilizado(),
            convenio.prazo_retorno()
        ),
    ];
    let lines: Vec<_> = identification
        .iter()
        .flat_map(|line| body.wrap(&sanitize_text(Some(line.as_str())), &BulletMarkers::none()))
        .collect();
    let plain = BoxStyle {
        border: None,
        text: TextStyle::regular(s.body_size),
        align: Align::Left,
    };
    commands.extend(layout_box(&lines, &body, &plain, &mut cursor)?);
    cursor.skip(s.section_spacing.into());

    // schedule and technical rules
    commands.extend(layout_bar(
        " 2. CRONOGRAMA E REGRAS TÉCNICAS",
        x,
        content_width,
        &section,
        &mut cursor,
    )?);
    cursor.skip(s.section_gap.into());

    let table = TableSpec::new(s.column_widths.as_slice(), Align::Center);
    let header = RowStyle {
        border: RectStyle::outline(),
        text: TextStyle::bold(s.table_size),
        padding: s.table_padding.into(),
        line_height: s.table_line_height.into(),
    };
    commands.extend(layout_row(
        &table,
        x,
        &TABLE_HEADER,
        &header,
        fonts.measure(FontRole::Bold, s.table_size),
        &mut cursor,
    )?);

    let row = [
        convenio.envio().to_string(),
        format!("{} dias", convenio.validade()),
        format!("{} / {}", convenio.xml(), convenio.versao_xml()),
        convenio.nf().to_string(),
        convenio.fluxo_nf().to_string(),
    ]
    .map(|cell| sanitize_text(Some(cell.as_str())));
    let data = RowStyle {
        text: TextStyle::regular(s.table_size),
        ..header
    };
    commands.extend(layout_row(
        &table,
        x,
        &row,
        &data,
        fonts.measure(FontRole::Regular, s.table_size),
        &mut cursor,
    )?);
    cursor.skip(s.section_spacing.into());

    // free-text blocks, only when filled in
    let block_title = BarStyle {
        height: s.block_title_height.into(),
        fill: RectStyle::filled(style.block_grey),
        text: TextStyle::bold(s.block_title_size),
        align: Align::Left,
    };
    let block = LayoutContext::new(
        x,
        content_width,
        s.block_line_height.into(),
        fonts.measure(FontRole::Regular, s.block_size),
    )
    .with_padding(s.block_padding.into());
    let bordered = BoxStyle {
        border: Some(RectStyle::outline()),
        text: TextStyle::regular(s.block_size),
        align: Align::Left,
    };
    let blocks = [
        ("CONFIGURAÇÃO DO GERADOR XML", convenio.config_gerador()),
        ("DIGITALIZAÇÃO E DOCUMENTAÇÃO", convenio.doc_digitalizacao()),
        ("OBSERVAÇÕES CRÍTICAS", convenio.observacoes()),
    ];
    for (heading, content) in blocks {
        let content = sanitize_text(Some(content));
        if content.trim().is_empty() {
            continue;
        }
        commands.extend(layout_bar(
            &format!(" {heading}"),
            x,
            content_width,
            &block_title,
            &mut cursor,
        )?);
        let lines = block.wrap(&content, &BulletMarkers::none());
        commands.extend(layout_box(&lines, &block, &bordered, &mut cursor)?);
        cursor.skip(s.block_gap.into());
    }

    let footer = TextCommand {
        x,
        y: page_size.1 - Pt::from(s.footer_offset),
        width: content_width,
        line_height: s.footer_height.into(),
        text: s.footer.clone(),
        align: Align::Center,
        style: TextStyle::regular(s.footer_size).with_colour(style.footer_text),
    };

    Ok(Report {
        title: format!("Guia Técnica - {nome}"),
        page_size,
        commands: stamp_footer(commands, &footer),
        images: Vec::new(),
    })
}

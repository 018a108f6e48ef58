//! Cleanup of user-entered text before it is laid out.
//!
//! Text typed into web forms tends to carry invisible characters (zero-width
//! spaces, bidi overrides, stray control codes) that fonts cannot draw, and
//! rich-text fields arrive as HTML. [sanitize_text] strips the former and
//! [clean_html] flattens the latter into plain lines, keeping `<li>` markers
//! so the bullet-aware wrapper can indent list items.

use regex::{Captures, Regex};
use std::sync::LazyLock;

static TAG: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)<!--.*?-->|<(/?)([a-zA-Z][a-zA-Z0-9]*)\b[^>]*>").expect("tag pattern is valid")
});

static ENTITY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"&(#[xX][0-9a-fA-F]+|#[0-9]+|[a-zA-Z]+);").expect("entity pattern is valid"));

/// Remove characters that cannot be rendered, keeping tabs (as four spaces)
/// and line feeds. Absent text becomes the empty string.
pub fn sanitize_text(text: Option<&str>) -> String {
    let Some(text) = text else {
        return String::new();
    };

    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '\t' => out.push_str("    "),
            '\n' => out.push('\n'),
            '\u{0}'..='\u{1F}' | '\u{7F}' => {}
            '\u{200B}'..='\u{200F}' | '\u{202A}'..='\u{202E}' | '\u{2060}'..='\u{206F}' => {}
            ch => out.push(ch),
        }
    }
    out
}

fn is_block_tag(name: &str) -> bool {
    matches!(
        name,
        "p" | "div" | "br" | "li" | "ul" | "ol" | "tr" | "table" | "h1" | "h2" | "h3" | "h4" | "h5" | "h6"
    )
}

fn replace_tag(caps: &Captures) -> &'static str {
    let Some(name) = caps.get(2) else {
        // comment
        return " ";
    };
    let name = name.as_str().to_ascii_lowercase();
    let closing = caps.get(1).is_some_and(|m| !m.as_str().is_empty());
    match (name.as_str(), closing) {
        ("li", false) => "\n<li>",
        ("br", _) => "\n",
        (name, true) if is_block_tag(name) => "\n",
        ("p" | "div", false) => "\n",
        _ => " ",
    }
}

fn decode_entity(caps: &Captures) -> String {
    let entity = &caps[1];
    let decoded = if let Some(hex) = entity.strip_prefix("#x").or_else(|| entity.strip_prefix("#X")) {
        u32::from_str_radix(hex, 16).ok().and_then(char::from_u32)
    } else if let Some(dec) = entity.strip_prefix('#') {
        dec.parse::<u32>().ok().and_then(char::from_u32)
    } else {
        match entity {
            "nbsp" => Some(' '),
            "amp" => Some('&'),
            "lt" => Some('<'),
            "gt" => Some('>'),
            "quot" => Some('"'),
            "apos" => Some('\''),
            "ndash" => Some('–'),
            "mdash" => Some('—'),
            "hellip" => Some('…'),
            "bull" => Some('•'),
            _ => None,
        }
    };
    match decoded {
        Some('\u{A0}') => " ".to_string(),
        Some(ch) => ch.to_string(),
        None => caps[0].to_string(),
    }
}

/// Flatten an HTML fragment into plain text lines.
///
/// Block-level tags end a line, `<li>` is kept as a list marker at the start
/// of its own line, every other tag becomes a space. Entities are decoded,
/// runs of spaces collapse to one, lines are trimmed and empty lines dropped.
pub fn clean_html(raw: &str) -> String {
    if raw.trim().is_empty() {
        return String::new();
    }

    let flattened = TAG.replace_all(raw, replace_tag);
    let decoded = ENTITY.replace_all(&flattened, decode_entity);

    decoded
        .split('\n')
        .map(|line| {
            line.split([' ', '\t', '\r', '\u{A0}'])
                .filter(|word| !word.is_empty())
                .collect::<Vec<_>>()
                .join(" ")
        })
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_invisible_characters() {
        let dirty = "a\u{200B}b\u{202E}c\u{2060}d\u{7}e\r\nf\tg";
        assert_eq!(sanitize_text(Some(dirty)), "abcde\nf    g");
        assert_eq!(sanitize_text(None), "");
    }

    #[test]
    fn keeps_accents() {
        assert_eq!(sanitize_text(Some("Configuração não é ação")), "Configuração não é ação");
    }

    #[test]
    fn flattens_paragraphs_and_lists() {
        let html = "<p>Abrir o <b>sistema</b>&nbsp;e:</p><ul><li>gerar lote</li><li class=\"x\">enviar   XML</li></ul>";
        assert_eq!(clean_html(html), "Abrir o sistema e:\n<li>gerar lote\n<li>enviar XML");
    }

    #[test]
    fn breaks_and_entities() {
        assert_eq!(clean_html("um<br>dois<br/>tr&ecirc;s &amp; &#233;&#x21;"), "um\ndois\ntr&ecirc;s & é!");
    }

    #[test]
    fn blank_lines_are_dropped() {
        assert_eq!(clean_html("<p>a</p><p></p><p></p><p>b</p>"), "a\nb");
        assert_eq!(clean_html(""), "");
        assert_eq!(clean_html("<p> </p>"), "");
    }

    #[test]
    fn comparison_is_not_a_tag() {
        assert_eq!(clean_html("prazo < 30 dias"), "prazo < 30 dias");
    }
}

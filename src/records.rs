//! The two kinds of record the back office keeps: convênios (insurance
//! partners) and rotinas (department routines).
//!
//! Records are stored as JSON objects written by hand and by older tools, so
//! every text field is optional, numbers and booleans are accepted where text
//! is expected, and fields this crate does not know about are kept untouched
//! through a load/save cycle.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use thiserror::Error;

/// TISS (health insurance data exchange) versions a convênio can require
pub const TISS_VERSIONS: [&str; 6] = ["4.03.00", "4.02.00", "4.01.00", "01.06.00", "3.05.00", "3.04.01"];

/// Billing systems convênios are submitted through
pub const BILLING_SYSTEMS: [&str; 6] = ["Orizon", "Benner", "Maida", "Facil", "Visual TISS", "Próprio"];

/// How invoices accompany a billing batch
pub const INVOICE_FLOWS: [&str; 2] = ["Envia XML sem nota", "Envia NF junto com o lote"];

/// Why a record can't be saved
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RecordError {
    #[error("a name is required")]
    MissingName,

    #[error("unsupported TISS version {0:?}")]
    UnknownTissVersion(String),
}

fn require_name(nome: &str) -> Result<(), RecordError> {
    if nome.trim().is_empty() {
        Err(RecordError::MissingName)
    } else {
        Ok(())
    }
}

fn lenient_text<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<String>, D::Error> {
    Ok(match Value::deserialize(deserializer)? {
        Value::Null => None,
        Value::String(text) => Some(text),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        other => Some(other.to_string()),
    })
}

fn lenient_id<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u64, D::Error> {
    use serde::de::Error;
    match Value::deserialize(deserializer)? {
        Value::Number(n) => n
            .as_u64()
            .or_else(|| n.as_f64().filter(|f| *f >= 0.0 && f.fract() == 0.0).map(|f| f as u64))
            .ok_or_else(|| D::Error::custom(format!("invalid record id {n}"))),
        Value::String(s) => s
            .trim()
            .parse()
            .map_err(|_| D::Error::custom(format!("invalid record id {s:?}"))),
        Value::Null => Ok(0),
        other => Err(D::Error::custom(format!("invalid record id {other}"))),
    }
}

/// What identifies a record within its collection
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordKey<'a> {
    Name(&'a str),
    Id(u64),
}

impl fmt::Display for RecordKey<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecordKey::Name(name) => write!(f, "{name:?}"),
            RecordKey::Id(id) => write!(f, "#{id}"),
        }
    }
}

/// A record that can be found, replaced and removed by its key
pub trait Record {
    fn key(&self) -> RecordKey<'_>;
}

pub fn find<'a, T: Record>(records: &'a [T], key: RecordKey<'_>) -> Option<&'a T> {
    records.iter().find(|r| r.key() == key)
}

/// Replace the record with the same key, or append it. Returns `true` if a
/// record was replaced.
pub fn upsert<T: Record>(records: &mut Vec<T>, record: T) -> bool {
    let position = records.iter().position(|r| r.key() == record.key());
    match position {
        Some(index) => {
            records[index] = record;
            true
        }
        None => {
            records.push(record);
            false
        }
    }
}

/// Remove every record with `key`, returning how many were removed
pub fn remove<T: Record>(records: &mut Vec<T>, key: RecordKey<'_>) -> usize {
    let before = records.len();
    records.retain(|r| r.key() != key);
    before - records.len()
}

macro_rules! text_accessors {
    ($($(#[$doc:meta])* $field:ident => $default:expr;)*) => {
        $(
            $(#[$doc])*
            pub fn $field(&self) -> &str {
                self.$field.as_deref().unwrap_or($default)
            }
        )*
    };
}

/// An insurance partner and the technical rules for billing it
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct Convenio {
    #[serde(default, deserialize_with = "lenient_text", skip_serializing_if = "Option::is_none")]
    pub nome: Option<String>,
    #[serde(default, deserialize_with = "lenient_text", skip_serializing_if = "Option::is_none")]
    pub codigo: Option<String>,
    #[serde(default, deserialize_with = "lenient_text", skip_serializing_if = "Option::is_none")]
    pub empresa: Option<String>,
    #[serde(default, deserialize_with = "lenient_text", skip_serializing_if = "Option::is_none")]
    pub sistema_utilizado: Option<String>,
    #[serde(default, deserialize_with = "lenient_text", skip_serializing_if = "Option::is_none")]
    pub site: Option<String>,
    #[serde(default, deserialize_with = "lenient_text", skip_serializing_if = "Option::is_none")]
    pub login: Option<String>,
    #[serde(default, deserialize_with = "lenient_text", skip_serializing_if = "Option::is_none")]
    pub senha: Option<String>,
    #[serde(default, deserialize_with = "lenient_text", skip_serializing_if = "Option::is_none")]
    pub prazo_retorno: Option<String>,
    #[serde(default, deserialize_with = "lenient_text", skip_serializing_if = "Option::is_none")]
    pub envio: Option<String>,
    #[serde(default, deserialize_with = "lenient_text", skip_serializing_if = "Option::is_none")]
    pub validade: Option<String>,
    #[serde(default, deserialize_with = "lenient_text", skip_serializing_if = "Option::is_none")]
    pub nf: Option<String>,
    #[serde(default, deserialize_with = "lenient_text", skip_serializing_if = "Option::is_none")]
    pub fluxo_nf: Option<String>,
    #[serde(default, deserialize_with = "lenient_text", skip_serializing_if = "Option::is_none")]
    pub xml: Option<String>,
    #[serde(default, deserialize_with = "lenient_text", skip_serializing_if = "Option::is_none")]
    pub versao_xml: Option<String>,
    #[serde(default, deserialize_with = "lenient_text", skip_serializing_if = "Option::is_none")]
    pub config_gerador: Option<String>,
    #[serde(default, deserialize_with = "lenient_text", skip_serializing_if = "Option::is_none")]
    pub doc_digitalizacao: Option<String>,
    #[serde(default, deserialize_with = "lenient_text", skip_serializing_if = "Option::is_none")]
    pub observacoes: Option<String>,

    /// Fields written by other tools, kept as-is
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Convenio {
    pub fn named<S: Into<String>>(nome: S) -> Convenio {
        Convenio {
            nome: Some(nome.into()),
            ..Convenio::default()
        }
    }

    text_accessors! {
        nome => "";
        /// Partner code, `"N/A"` when unknown
        codigo => "N/A";
        /// Company the partner is billed through
        empresa => "N/A";
        sistema_utilizado => "N/A";
        /// Web portal address
        site => "";
        login => "";
        senha => "";
        prazo_retorno => "N/A";
        /// Submission deadline
        envio => "";
        /// Validity of an authorisation, in days
        validade => "";
        nf => "";
        fluxo_nf => "N/A";
        /// Whether XML is sent, usually "Sim" or "Não"
        xml => "";
        versao_xml => "-";
        config_gerador => "";
        doc_digitalizacao => "";
        observacoes => "";
    }
}

impl Convenio {
    /// Check the record before it is saved. A name is required, and the XML
    /// version, when given, must be a known TISS version. Systems and invoice
    /// flows outside the usual lists are accepted but logged.
    pub fn validate(&self) -> Result<(), RecordError> {
        require_name(self.nome())?;

        if let Some(version) = self.versao_xml.as_deref().map(str::trim).filter(|v| !v.is_empty()) {
            if !TISS_VERSIONS.contains(&version) {
                return Err(RecordError::UnknownTissVersion(version.to_string()));
            }
        }
        if let Some(system) = self.sistema_utilizado.as_deref() {
            if !BILLING_SYSTEMS.contains(&system) {
                tracing::warn!(convenio = self.nome(), system, "unusual billing system");
            }
        }
        if let Some(flow) = self.fluxo_nf.as_deref() {
            if !INVOICE_FLOWS.contains(&flow) {
                tracing::warn!(convenio = self.nome(), flow, "unusual invoice flow");
            }
        }
        Ok(())
    }
}

impl Record for Convenio {
    fn key(&self) -> RecordKey<'_> {
        RecordKey::Name(self.nome())
    }
}

/// A documented department routine, optionally illustrated by a screenshot
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct Rotina {
    #[serde(default, deserialize_with = "lenient_id")]
    pub id: u64,
    #[serde(default, deserialize_with = "lenient_text", skip_serializing_if = "Option::is_none")]
    pub nome: Option<String>,
    #[serde(default, deserialize_with = "lenient_text", skip_serializing_if = "Option::is_none")]
    pub setor: Option<String>,
    /// Rich-text description, as HTML
    #[serde(default, deserialize_with = "lenient_text", skip_serializing_if = "Option::is_none")]
    pub descricao: Option<String>,
    /// Screenshot as a `data:image/png;base64,...` URL
    #[serde(default, deserialize_with = "lenient_text", skip_serializing_if = "Option::is_none")]
    pub print_b64: Option<String>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Rotina {
    pub fn new<S: Into<String>>(id: u64, nome: S) -> Rotina {
        Rotina {
            id,
            nome: Some(nome.into()),
            ..Rotina::default()
        }
    }

    text_accessors! {
        nome => "";
        setor => "";
        descricao => "";
        print_b64 => "";
    }
}

impl Rotina {
    /// A rotina only needs a name to be saved
    pub fn validate(&self) -> Result<(), RecordError> {
        require_name(self.nome())
    }
}

impl Record for Rotina {
    fn key(&self) -> RecordKey<'_> {
        RecordKey::Id(self.id)
    }
}

/// The id a new rotina should get: one more than the largest in use, or 1
pub fn next_rotina_id(rotinas: &[Rotina]) -> u64 {
    rotinas.iter().map(|r| r.id).max().map_or(1, |max| max + 1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn accessors_fall_back_to_defaults() {
        let c = Convenio::named("Unimed");
        assert_eq!(c.nome(), "Unimed");
        assert_eq!(c.codigo(), "N/A");
        assert_eq!(c.empresa(), "N/A");
        assert_eq!(c.versao_xml(), "-");
        assert_eq!(c.site(), "");
        assert_eq!(c.fluxo_nf(), "N/A");
    }

    #[test]
    fn lenient_fields_and_unknown_keys() {
        let value = json!({
            "nome": "Bradesco",
            "validade": 30,
            "codigo": null,
            "cor_favorita": "azul"
        });
        let c: Convenio = serde_json::from_value(value).unwrap();
        assert_eq!(c.validade(), "30");
        assert_eq!(c.codigo(), "N/A");
        assert_eq!(c.extra.get("cor_favorita"), Some(&json!("azul")));

        let back = serde_json::to_value(&c).unwrap();
        assert_eq!(back["cor_favorita"], json!("azul"));
        assert_eq!(back["validade"], json!("30"));
        assert!(back.get("codigo").is_none());
    }

    #[test]
    fn rotina_ids() {
        let r: Rotina = serde_json::from_value(json!({"id": "7", "nome": "Fechamento"})).unwrap();
        assert_eq!(r.id, 7);
        assert!(serde_json::from_value::<Rotina>(json!({"id": "sete"})).is_err());

        assert_eq!(next_rotina_id(&[]), 1);
        assert_eq!(next_rotina_id(&[Rotina::new(3, "a"), Rotina::new(9, "b"), Rotina::new(4, "c")]), 10);
    }

    #[test]
    fn upsert_find_remove() {
        let mut list = vec![Convenio::named("A"), Convenio::named("B")];
        let mut updated = Convenio::named("B");
        updated.codigo = Some("123".into());

        assert!(upsert(&mut list, updated));
        assert!(!upsert(&mut list, Convenio::named("C")));
        assert_eq!(list.len(), 3);
        assert_eq!(find(&list, RecordKey::Name("B")).map(Convenio::codigo), Some("123"));

        assert_eq!(remove(&mut list, RecordKey::Name("A")), 1);
        assert_eq!(remove(&mut list, RecordKey::Name("A")), 0);
        assert!(find(&list, RecordKey::Name("A")).is_none());
    }

    #[test]
    fn convenio_validation() {
        let mut c = Convenio::named("Geap");
        assert_eq!(c.validate(), Ok(()));

        c.versao_xml = Some("4.01.00".into());
        c.sistema_utilizado = Some("Planilha".into());
        assert_eq!(c.validate(), Ok(()));

        c.versao_xml = Some("2.0".into());
        assert_eq!(c.validate(), Err(RecordError::UnknownTissVersion("2.0".into())));

        c.versao_xml = Some(" ".into());
        assert_eq!(c.validate(), Ok(()));

        assert_eq!(Convenio::named("  ").validate(), Err(RecordError::MissingName));
        assert_eq!(Convenio::default().validate(), Err(RecordError::MissingName));
    }

    #[test]
    fn rotina_needs_a_name() {
        assert_eq!(Rotina::new(0, "").validate(), Err(RecordError::MissingName));
        assert_eq!(Rotina::new(0, "Abertura").validate(), Ok(()));
    }
}

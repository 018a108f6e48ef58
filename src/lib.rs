//! Technical documents for the GABMA back office.
//!
//! Convênio (insurance partner) and rotina (department routine) records are
//! kept as JSON in a version-guarded [store], laid out into pages by the
//! [layout] engine and written out as PDF with [render::render_pdf].
//!
//! ```
//! use gabma_docs::layout::MonospaceFonts;
//! use gabma_docs::records::Convenio;
//! use gabma_docs::report::{convenio_report, ReportStyle};
//!
//! let mut convenio = Convenio::named("Unimed");
//! convenio.site = Some("https://portal.example.com".into());
//!
//! let report = convenio_report(&convenio, &MonospaceFonts::default(), &ReportStyle::default())
//!     .expect("fits on A4");
//! assert_eq!(report.page_count(), 1);
//! ```

mod colour;
pub use colour::*;

mod content;

mod document;
pub use document::*;

mod font;
pub use font::*;

mod image;
pub use self::image::*;

mod info;
pub use info::*;

/// Wrapping, pagination and table layout producing draw commands
pub mod layout;

mod page;
pub use page::*;

pub mod pagesize;

mod rect;
pub use rect::*;

pub(crate) mod refs;

pub mod records;
pub mod render;
pub mod report;
pub mod sanitize;
pub mod store;

mod units;
pub use units::*;

mod error;
pub use error::*;

/// Re-export PDF-writer functionality, mostly for custom [pdf_writer::Content] generation
pub use pdf_writer;

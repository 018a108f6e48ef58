//! `gabma` - save, render, list and delete back-office records from the command line.

use anyhow::{anyhow, Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use gabma_docs::records::{self, Convenio, RecordKey, Rotina};
use gabma_docs::render::render_pdf;
use gabma_docs::report::{convenio_report, rotina_report, Report, ReportStyle};
use gabma_docs::store::{FileStore, RecordStore, StoreError};
use gabma_docs::{FontSet, Image, Info};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "gabma", version, about = "Technical documents for convênios and rotinas")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Write a record out as a PDF document
    Render {
        #[command(subcommand)]
        target: RenderTarget,
    },
    /// Create a record, or replace the one with the same name (convênio) or id (rotina)
    Save {
        #[command(subcommand)]
        target: SaveTarget,
    },
    /// Print the records in a database file
    List {
        #[arg(value_enum)]
        kind: Kind,
        #[arg(long)]
        db: PathBuf,
    },
    /// Permanently remove a record
    Delete {
        #[command(subcommand)]
        target: DeleteTarget,
    },
}

#[derive(Subcommand)]
enum RenderTarget {
    /// The technical guide of a convênio, looked up by name
    Convenio {
        #[arg(long)]
        db: PathBuf,
        #[arg(long)]
        name: String,
        #[command(flatten)]
        output: OutputArgs,
    },
    /// The document of a rotina, looked up by id
    Rotina {
        #[arg(long)]
        db: PathBuf,
        #[arg(long)]
        id: u64,
        #[command(flatten)]
        output: OutputArgs,
    },
}

#[derive(Subcommand)]
enum SaveTarget {
    /// Save a convênio read from a JSON object
    Convenio {
        #[arg(long)]
        db: PathBuf,
        /// JSON file holding the record
        #[arg(long)]
        from: PathBuf,
    },
    /// Save a rotina read from a JSON object; without an id it is added as a new rotina
    Rotina {
        #[arg(long)]
        db: PathBuf,
        #[arg(long)]
        from: PathBuf,
        /// Screenshot to attach, replacing any stored one
        #[arg(long)]
        image: Option<PathBuf>,
    },
}

#[derive(Subcommand)]
enum DeleteTarget {
    Rotina {
        #[arg(long)]
        db: PathBuf,
        #[arg(long)]
        id: u64,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum Kind {
    Convenios,
    Rotinas,
}

#[derive(Args)]
struct OutputArgs {
    /// TrueType font for regular text
    #[arg(long)]
    font: PathBuf,
    /// TrueType font for bold text, defaults to the regular font
    #[arg(long)]
    bold_font: Option<PathBuf>,
    /// JSON file overriding the default report style
    #[arg(long)]
    style: Option<PathBuf>,
    /// Where to write the PDF
    #[arg(short, long)]
    output: Option<PathBuf>,
}

impl OutputArgs {
    fn load_style(&self) -> Result<ReportStyle> {
        match &self.style {
            Some(path) => ReportStyle::load(path).with_context(|| format!("reading style {}", path.display())),
            None => Ok(ReportStyle::default()),
        }
    }

    fn load_fonts(&self) -> Result<FontSet> {
        FontSet::load_files(&self.font, self.bold_font.as_ref())
            .with_context(|| format!("loading font {}", self.font.display()))
    }
}

fn open<T>(db: &Path) -> RecordStore<FileStore, T>
where
    T: serde::Serialize + serde::de::DeserializeOwned,
{
    RecordStore::new(FileStore::new(db))
}

fn write_report(report: Report, fonts: FontSet, output: &Path) -> Result<()> {
    let info = Info::new().author("GABMA Consultoria");
    let bytes = render_pdf(report, fonts, info).context("rendering pdf")?;
    std::fs::write(output, bytes).with_context(|| format!("writing {}", output.display()))?;
    tracing::info!(path = %output.display(), "wrote report");
    Ok(())
}

/// Turn a record name into something safe to use in a file name
fn file_stem(name: &str) -> String {
    name.chars()
        .map(|c| if c.is_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
        .collect()
}

fn render(target: RenderTarget) -> Result<()> {
    match target {
        RenderTarget::Convenio { db, name, output } => {
            let loaded = open::<Convenio>(&db).load().with_context(|| format!("reading {}", db.display()))?;
            let convenio = records::find(&loaded.records, RecordKey::Name(&name))
                .ok_or_else(|| StoreError::NotFound(RecordKey::Name(&name).to_string()))?;

            let style = output.load_style()?;
            let fonts = output.load_fonts()?;
            let report = convenio_report(convenio, &fonts, &style).context("laying out convênio guide")?;
            let path = output
                .output
                .clone()
                .unwrap_or_else(|| PathBuf::from(format!("GABMA_{}.pdf", file_stem(&name))));
            write_report(report, fonts, &path)
        }
        RenderTarget::Rotina { db, id, output } => {
            let loaded = open::<Rotina>(&db).load().with_context(|| format!("reading {}", db.display()))?;
            let rotina = records::find(&loaded.records, RecordKey::Id(id))
                .ok_or_else(|| StoreError::NotFound(RecordKey::Id(id).to_string()))?;

            let style = output.load_style()?;
            let fonts = output.load_fonts()?;
            let report = rotina_report(rotina, &fonts, &style).context("laying out rotina document")?;
            let path = output
                .output
                .clone()
                .unwrap_or_else(|| PathBuf::from(format!("Rotina_{}.pdf", file_stem(rotina.nome()))));
            write_report(report, fonts, &path)
        }
    }
}

fn read_record<T: serde::de::DeserializeOwned>(from: &Path) -> Result<T> {
    let json = std::fs::read_to_string(from).with_context(|| format!("reading {}", from.display()))?;
    serde_json::from_str(&json).with_context(|| format!("parsing {}", from.display()))
}

/// Explain a failed save. The input file is never written, so on a conflict
/// the same command can simply be run again.
fn save_failed(err: StoreError, db: &Path, from: &Path) -> anyhow::Error {
    match err {
        StoreError::Conflict { .. } => anyhow!(
            "{} was changed by someone else while saving; nothing was written, run the command again to save {}",
            db.display(),
            from.display()
        ),
        other => anyhow::Error::new(other).context(format!("saving {} to {}", from.display(), db.display())),
    }
}

fn save(target: SaveTarget) -> Result<()> {
    match target {
        SaveTarget::Convenio { db, from } => {
            let convenio: Convenio = read_record(&from)?;
            let replaced = open::<Convenio>(&db)
                .save_convenio(&convenio)
                .map_err(|e| save_failed(e, &db, &from))?;
            let action = if replaced { "updated" } else { "added" };
            println!("{action} convênio {}", convenio.nome());
        }
        SaveTarget::Rotina { db, from, image } => {
            let mut rotina: Rotina = read_record(&from)?;
            if let Some(image) = image {
                let bytes = std::fs::read(&image).with_context(|| format!("reading {}", image.display()))?;
                rotina.print_b64 =
                    Some(Image::png_data_url(&bytes).with_context(|| format!("decoding {}", image.display()))?);
            }
            let id = open::<Rotina>(&db)
                .save_rotina(&rotina)
                .map_err(|e| save_failed(e, &db, &from))?;
            println!("saved rotina {id} {}", rotina.nome());
        }
    }
    Ok(())
}

fn list(kind: Kind, db: &Path) -> Result<()> {
    match kind {
        Kind::Convenios => {
            let loaded = open::<Convenio>(db).load().with_context(|| format!("reading {}", db.display()))?;
            for c in &loaded.records {
                println!("{}\t{}\t{}", c.nome(), c.codigo(), c.sistema_utilizado());
            }
        }
        Kind::Rotinas => {
            let loaded = open::<Rotina>(db).load().with_context(|| format!("reading {}", db.display()))?;
            for r in &loaded.records {
                println!("{}\t{}\t{}", r.id, r.nome(), r.setor());
            }
        }
    }
    Ok(())
}

fn delete(target: DeleteTarget) -> Result<()> {
    match target {
        DeleteTarget::Rotina { db, id } => {
            open::<Rotina>(&db)
                .update(|list| match records::remove(list, RecordKey::Id(id)) {
                    0 => Err(StoreError::NotFound(RecordKey::Id(id).to_string())),
                    _ => Ok(()),
                })
                .with_context(|| format!("deleting rotina {id} from {}", db.display()))?;
            tracing::info!(id, "deleted rotina");
        }
    }
    Ok(())
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.command {
        Command::Render { target } => render(target),
        Command::Save { target } => save(target),
        Command::List { kind, db } => list(kind, &db),
        Command::Delete { target } => delete(target),
    }
}

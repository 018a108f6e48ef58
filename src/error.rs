use crate::image::ImageError;
use thiserror::Error;

/// All errors that can occur while turning a report into a PDF
#[derive(Error, Debug)]
pub enum PDFError {
    #[error(transparent)]
    /// An I/O error occurred
    Io(#[from] std::io::Error),

    #[error(transparent)]
    /// [owned_ttf_parser] failed to parse the font
    FaceParsingError(#[from] owned_ttf_parser::FaceParsingError),

    #[error(transparent)]
    /// An image could not be read or encoded
    Image(#[from] ImageError),

    #[error("no font was loaded for this text")]
    /// Text refers to a font the document does not have
    FontMissing,

    #[error("page is missing from the document arena")]
    /// A page listed in the page order no longer exists
    PageMissing,
}

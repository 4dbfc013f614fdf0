//! OCR fallback: regenerating a text layer with an external tool.

mod ocrmypdf;

pub use ocrmypdf::OcrMyPdf;

use std::path::Path;

use crate::error::OcrError;

/// Result type for OCR operations.
pub type Result<T> = std::result::Result<T, OcrError>;

/// A tool that writes an OCR'd copy of a PDF.
pub trait OcrTool {
    /// Recognize `input` and write a PDF with a fresh text layer to
    /// `output`. Success means the tool reported success; the caller still
    /// has to read the output.
    fn regenerate(&self, input: &Path, output: &Path) -> impl Future<Output = Result<()>> + Send;
}

//! Text acquisition: embedded text layer first, OCR regeneration once.

use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use crate::error::{InvexError, OcrError};
use crate::models::config::AcquisitionConfig;
use crate::ocr::{OcrMyPdf, OcrTool};
use crate::pdf;

/// Reads the text layer of a PDF on disk.
pub trait TextReader {
    fn read_text(&self, path: &Path) -> pdf::Result<String>;
}

/// [`TextReader`] backed by the lopdf/pdf-extract extractor.
#[derive(Debug, Clone, Copy, Default)]
pub struct PdfTextReader;

impl TextReader for PdfTextReader {
    fn read_text(&self, path: &Path) -> pdf::Result<String> {
        pdf::read_text(path)
    }
}

/// Where the acquired text came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TextSource {
    /// The PDF's own text layer.
    Embedded,
    /// The text layer of an OCR'd copy.
    Ocr { path: PathBuf },
    /// Neither read produced text.
    Unavailable,
}

/// Result of acquiring one document's text.
#[derive(Debug)]
pub struct Acquisition {
    /// Acquired text; empty when `source` is [`TextSource::Unavailable`].
    pub text: String,
    pub source: TextSource,
    /// Failures that were collapsed into empty text along the way.
    pub errors: Vec<InvexError>,
}

impl Acquisition {
    pub fn is_empty(&self) -> bool {
        self.text.trim().is_empty()
    }
}

/// DirectRead, then OCRFallback at most once.
#[derive(Debug, Clone)]
pub struct TextAcquirer<R, O> {
    reader: R,
    ocr: Option<O>,
    scratch_dir: PathBuf,
}

impl TextAcquirer<PdfTextReader, OcrMyPdf> {
    pub fn from_config(config: &AcquisitionConfig) -> Self {
        let ocr = config.ocr_enabled.then(|| OcrMyPdf::from_config(config));
        Self::new(PdfTextReader, ocr, config.scratch_dir.clone())
    }
}

impl<R: TextReader, O: OcrTool> TextAcquirer<R, O> {
    /// `ocr: None` disables the fallback.
    pub fn new(reader: R, ocr: Option<O>, scratch_dir: impl Into<PathBuf>) -> Self {
        Self {
            reader,
            ocr,
            scratch_dir: scratch_dir.into(),
        }
    }

    pub fn scratch_dir(&self) -> &Path {
        &self.scratch_dir
    }

    /// Acquire text for `path`. Never fails: read and OCR errors are kept
    /// in [`Acquisition::errors`] and the text is left empty.
    pub async fn acquire(&self, path: &Path) -> Acquisition {
        let mut errors = Vec::new();

        match self.reader.read_text(path) {
            Ok(text) if !text.trim().is_empty() => {
                debug!("Read {} characters of embedded text from {}", text.len(), path.display());
                return Acquisition {
                    text,
                    source: TextSource::Embedded,
                    errors,
                };
            }
            Ok(_) => debug!("{} has no embedded text", path.display()),
            Err(e) => {
                debug!("Direct read of {} failed: {}", path.display(), e);
                errors.push(e.into());
            }
        }

        match self.ocr_fallback(path).await {
            Ok((text, ocr_path)) if !text.trim().is_empty() => Acquisition {
                text,
                source: TextSource::Ocr { path: ocr_path },
                errors,
            },
            Ok((_, ocr_path)) => {
                warn!("OCR output {} still has no text", ocr_path.display());
                Self::unavailable(errors)
            }
            Err(e) => {
                warn!("OCR failed for {}: {}", path.display(), e);
                errors.push(e);
                Self::unavailable(errors)
            }
        }
    }

    async fn ocr_fallback(&self, path: &Path) -> Result<(String, PathBuf), InvexError> {
        let ocr = self.ocr.as_ref().ok_or(OcrError::Disabled)?;
        let name = path.file_name().unwrap_or(path.as_os_str());
        info!("No text found in {}, running OCR", name.to_string_lossy());

        tokio::fs::create_dir_all(&self.scratch_dir)
            .await
            .map_err(|source| OcrError::ScratchDir {
                path: self.scratch_dir.clone(),
                source,
            })?;

        let output = self.scratch_dir.join(name);
        ocr.regenerate(path, &output).await?;

        let text = self.reader.read_text(&output)?;
        Ok((text, output))
    }

    fn unavailable(errors: Vec<InvexError>) -> Acquisition {
        Acquisition {
            text: String::new(),
            source: TextSource::Unavailable,
            errors,
        }
    }
}

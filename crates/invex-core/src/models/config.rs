//! Configuration structures for the extraction pipeline.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::{InvexError, Result};

/// Main configuration for the invex pipeline.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct InvexConfig {
    /// Text acquisition and OCR fallback configuration.
    pub acquisition: AcquisitionConfig,

    /// Header field extraction configuration.
    pub extraction: ExtractionConfig,

    /// Line item table segmentation configuration.
    pub segmentation: SegmentationConfig,

    /// Output file configuration.
    pub output: OutputConfig,
}

/// Text acquisition configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AcquisitionConfig {
    /// Regenerate the text layer with OCR when direct extraction is empty.
    pub ocr_enabled: bool,

    /// External OCR program.
    pub ocr_program: String,

    /// Arguments passed before the input and output paths.
    pub ocr_args: Vec<String>,

    /// Seconds before the OCR process is killed.
    pub ocr_timeout_secs: u64,

    /// Directory receiving OCR'd copies, keyed by input file name.
    pub scratch_dir: PathBuf,
}

impl Default for AcquisitionConfig {
    fn default() -> Self {
        Self {
            ocr_enabled: true,
            ocr_program: "ocrmypdf".to_string(),
            ocr_args: [
                "--force-ocr",
                "--optimize",
                "3",
                "--deskew",
                "--clean",
                "--output-type",
                "pdf",
            ]
            .iter()
            .map(|s| s.to_string())
            .collect(),
            ocr_timeout_secs: 600,
            scratch_dir: PathBuf::from("ocr_output"),
        }
    }
}

impl AcquisitionConfig {
    pub fn ocr_timeout(&self) -> Duration {
        Duration::from_secs(self.ocr_timeout_secs)
    }
}

/// Header field extraction configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractionConfig {
    /// Value of `freight_inc_gst` when no freight amount matches.
    pub freight_default: String,

    /// Separator between distinct order numbers in the summary record.
    pub order_separator: String,

    /// Separator used on line items when a document has several orders.
    pub line_order_separator: String,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            freight_default: "0.00".to_string(),
            order_separator: ", ".to_string(),
            line_order_separator: ";".to_string(),
        }
    }
}

/// Line item segmentation configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SegmentationConfig {
    /// Keyword groups a header line must satisfy. Each group lists
    /// alternatives; one of them must occur inside some token of the line.
    pub header_keywords: Vec<Vec<String>>,

    /// Line prefixes (case-insensitive) that end the table.
    pub stop_prefixes: Vec<String>,

    /// Rows with fewer cells are dropped.
    pub min_cells: usize,

    /// Cells kept per row.
    pub max_cells: usize,
}

impl Default for SegmentationConfig {
    fn default() -> Self {
        let group = |alternatives: &[&str]| -> Vec<String> {
            alternatives.iter().map(|s| s.to_string()).collect()
        };
        Self {
            header_keywords: vec![
                group(&["description"]),
                group(&["sku"]),
                group(&["qty", "quantity"]),
                group(&["unit"]),
                group(&["price"]),
                group(&["amount"]),
            ],
            stop_prefixes: ["total", "subtotal", "gst", "grand"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            min_cells: 4,
            max_cells: 5,
        }
    }
}

/// Output file configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Invoice summary file name.
    pub invoices_file: PathBuf,

    /// Line item file name.
    pub line_items_file: PathBuf,

    /// Append a local timestamp to output file stems.
    pub timestamped: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            invoices_file: PathBuf::from("extracted_invoice_data.csv"),
            line_items_file: PathBuf::from("line_items.csv"),
            timestamped: false,
        }
    }
}

impl InvexConfig {
    /// Load configuration from a JSON file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        serde_json::from_str(&content)
            .map_err(|e| InvexError::Config(format!("{}: {}", path.display(), e)))
    }

    /// Save configuration to a JSON file.
    pub fn save(&self, path: &Path) -> Result<()> {
        let content = serde_json::to_string_pretty(self)
            .map_err(|e| InvexError::Config(e.to_string()))?;
        std::fs::write(path, content)?;
        Ok(())
    }
}

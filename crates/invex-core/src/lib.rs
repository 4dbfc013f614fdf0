//! Core library for invoice PDF extraction.
//!
//! This crate provides:
//! - Text acquisition from a PDF's embedded text layer, with a one-shot
//!   OCR fallback through an external tool (ocrmypdf)
//! - Header field extraction from a declarative pattern table
//! - Line item table segmentation over linearized text
//! - Aggregation into invoice summary and line item records

pub mod acquisition;
pub mod error;
pub mod invoice;
pub mod models;
pub mod ocr;
pub mod pdf;
pub mod pipeline;

pub use acquisition::{Acquisition, PdfTextReader, TextAcquirer, TextReader, TextSource};
pub use error::{InvexError, OcrError, PdfError, Result};
pub use invoice::{FieldExtractor, LineItemSegmenter, PatternLibrary, ResultAggregator};
pub use models::{
    DocumentRecords, HeaderField, HeaderFields, InvexConfig, InvoiceRecord, LineItemRecord,
    RawLineItem, INVOICE_COLUMNS, LINE_ITEM_COLUMNS,
};
pub use ocr::{OcrMyPdf, OcrTool};
pub use pdf::{PdfExtractor, PdfProcessor, PdfType};
pub use pipeline::{BatchResult, DocumentOutcome, InvoicePipeline, SkippedDocument};

//! Per-document pipeline and batch accumulation.
//!
//! Each document runs acquisition, header extraction, table segmentation
//! and aggregation to completion before the next one starts. Failures are
//! captured per document and never stop a batch.

use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::{debug, info};

use crate::acquisition::{PdfTextReader, TextAcquirer, TextReader, TextSource};
use crate::error::InvexError;
use crate::invoice::{FieldExtractor, LineItemSegmenter, ResultAggregator};
use crate::models::config::InvexConfig;
use crate::models::{DocumentRecords, InvoiceRecord, LineItemRecord, SourceDocument};
use crate::ocr::{OcrMyPdf, OcrTool};

/// What happened to one document.
#[derive(Debug)]
pub enum DocumentOutcome {
    /// Header fields matched; records are ready for output.
    Extracted { records: DocumentRecords, source: TextSource },
    /// No text after direct read and OCR fallback.
    NoText { errors: Vec<InvexError> },
    /// Text was found but no header rule matched.
    NoFields,
}

impl DocumentOutcome {
    pub fn records(&self) -> Option<&DocumentRecords> {
        match self {
            DocumentOutcome::Extracted { records, .. } => Some(records),
            _ => None,
        }
    }

    /// Human readable reason a document produced no records.
    pub fn skip_reason(&self) -> Option<String> {
        match self {
            DocumentOutcome::Extracted { .. } => None,
            DocumentOutcome::NoText { errors } => Some(match errors.last() {
                Some(e) => format!("no text: {}", e),
                None => "no text".to_string(),
            }),
            DocumentOutcome::NoFields => Some("no header fields matched".to_string()),
        }
    }
}

/// A document that contributed nothing to either output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkippedDocument {
    pub pdf_filename: String,
    pub reason: String,
}

/// Accumulated output of a batch, in input order.
#[derive(Debug, Clone, Default, Serialize)]
pub struct BatchResult {
    pub invoices: Vec<InvoiceRecord>,
    pub line_items: Vec<LineItemRecord>,
    pub skipped: Vec<SkippedDocument>,
    #[serde(skip)]
    order_separator: String,
}

impl BatchResult {
    /// Number of documents seen.
    pub fn documents(&self) -> usize {
        self.invoices.len() + self.skipped.len()
    }

    /// One `(pdf_filename, order_number)` pair per distinct order of each
    /// emitted invoice.
    pub fn order_rows(&self) -> Vec<(&str, &str)> {
        let separator = match self.order_separator.as_str() {
            "" => ", ",
            s => s,
        };
        self.invoices
            .iter()
            .flat_map(|invoice| {
                invoice
                    .fields
                    .order_number
                    .split(separator)
                    .filter(|order| !order.is_empty())
                    .map(move |order| (invoice.pdf_filename.as_str(), order))
            })
            .collect()
    }

    fn push(&mut self, filename: String, outcome: DocumentOutcome) {
        match outcome {
            DocumentOutcome::Extracted { records, .. } => {
                self.invoices.push(records.invoice);
                self.line_items.extend(records.line_items);
            }
            other => {
                let reason = other.skip_reason().unwrap_or_default();
                self.skipped.push(SkippedDocument {
                    pdf_filename: filename,
                    reason,
                });
            }
        }
    }
}

/// Acquisition, extraction, segmentation and aggregation wired together.
pub struct InvoicePipeline<R, O> {
    acquirer: TextAcquirer<R, O>,
    extractor: FieldExtractor,
    segmenter: LineItemSegmenter,
    aggregator: ResultAggregator,
}

impl InvoicePipeline<PdfTextReader, OcrMyPdf> {
    pub fn from_config(config: &InvexConfig) -> Self {
        Self::new(
            TextAcquirer::from_config(&config.acquisition),
            FieldExtractor::from_config(&config.extraction),
            LineItemSegmenter::from_config(&config.segmentation),
            ResultAggregator::from_config(&config.extraction),
        )
    }
}

impl<R: TextReader, O: OcrTool> InvoicePipeline<R, O> {
    pub fn new(
        acquirer: TextAcquirer<R, O>,
        extractor: FieldExtractor,
        segmenter: LineItemSegmenter,
        aggregator: ResultAggregator,
    ) -> Self {
        Self {
            acquirer,
            extractor,
            segmenter,
            aggregator,
        }
    }

    /// Run one document to completion.
    pub async fn process(&self, path: &Path) -> DocumentOutcome {
        let document = SourceDocument::new(path);
        let filename = document.filename();
        info!("Processing: {}", filename);

        let acquisition = self.acquirer.acquire(document.path()).await;
        if acquisition.is_empty() {
            info!("{}: no text after OCR fallback, skipping", filename);
            return DocumentOutcome::NoText {
                errors: acquisition.errors,
            };
        }

        let outcome = self.process_text(&filename, &acquisition.text);
        match outcome {
            Some(records) => DocumentOutcome::Extracted {
                records,
                source: acquisition.source,
            },
            None => DocumentOutcome::NoFields,
        }
    }

    /// Extraction, segmentation and aggregation over already acquired text.
    pub fn process_text(&self, filename: &str, text: &str) -> Option<DocumentRecords> {
        let fields = self.extractor.extract(text);
        if !fields.order_number.is_empty() {
            info!("Order numbers found in {}: {}", filename, fields.order_number);
        }

        let records = self
            .aggregator
            .aggregate(filename, fields, self.segmenter.segment(text))?;
        debug!("{}: {} line items", filename, records.line_items.len());
        Some(records)
    }

    /// Process `paths` strictly in order. `on_document` is called after
    /// each document, e.g. to advance a progress bar.
    pub async fn run_batch_with<I, P, F>(&self, paths: I, mut on_document: F) -> BatchResult
    where
        I: IntoIterator<Item = P>,
        P: AsRef<Path>,
        F: FnMut(&Path, &DocumentOutcome),
    {
        let mut result = BatchResult {
            order_separator: self.extractor.order_separator().to_string(),
            ..Default::default()
        };

        for path in paths {
            let path = path.as_ref();
            let outcome = self.process(path).await;
            on_document(path, &outcome);
            result.push(SourceDocument::new(path).filename(), outcome);
        }

        result
    }

    pub async fn run_batch<I, P>(&self, paths: I) -> BatchResult
    where
        I: IntoIterator<Item = P>,
        P: AsRef<Path>,
    {
        self.run_batch_with(paths, |_, _| {}).await
    }
}

/// Order input paths by file name so batch output is deterministic.
pub fn sort_by_filename(mut paths: Vec<PathBuf>) -> Vec<PathBuf> {
    paths.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
    paths
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::acquisition::tests::{FakeOcr, FakeReader};
    use pretty_assertions::assert_eq;

    const INVOICE: &str = "\
Invoice No: INV-2023-8821
Supplier: Acme Building Supplies
PO 31001234567

SKU   Description   Qty   Unit Price   Amount
D-001  Steel Frame  2  350.00  700.00
D-002  Bracket Set  4  13.00  52.00
Subtotal   752.00

Freight Inc GST: $15.55";

    const TWO_ORDERS: &str = "\
Invoice No: INV-2023-9000
Order 31009999999
Order 31001111111

SKU   Description   Qty   Unit Price   Amount
A-1  Widget  1  5.00  5.00
A-2  Gadget  2  7.50  15.00
";

    fn pipeline<'a>(
        reader: FakeReader,
        ocr: &'a FakeOcr,
        scratch: &Path,
    ) -> InvoicePipeline<FakeReader, &'a FakeOcr> {
        InvoicePipeline::new(
            TextAcquirer::new(reader, Some(ocr), scratch),
            FieldExtractor::new(),
            LineItemSegmenter::new(),
            ResultAggregator::new(),
        )
    }

    #[tokio::test]
    async fn test_end_to_end_single_invoice() {
        let dir = tempfile::tempdir().unwrap();
        let ocr = FakeOcr::default();
        let pipeline = pipeline(FakeReader::with(&[("inv.pdf", INVOICE)]), &ocr, dir.path());

        let outcome = pipeline.process(Path::new("inv.pdf")).await;
        let records = outcome.records().unwrap();

        assert_eq!(records.invoice.pdf_filename, "inv.pdf");
        assert_eq!(records.invoice.fields.order_number, "31001234567");
        assert_eq!(records.invoice.fields.invoice_number, "INV-2023-8821");
        assert_eq!(records.invoice.fields.freight_inc_gst, "15.55");
        assert_eq!(records.line_items.len(), 2);
        for line in &records.line_items {
            assert_eq!(line.order_number, "31001234567");
            assert_eq!(line.invoice_number, "INV-2023-8821");
            assert_eq!(line.freight_inc_gst, "15.55");
        }
        assert_eq!(records.line_items[0].sku, "D-001");
        assert_eq!(records.line_items[1].amount, "52.00");
        assert_eq!(ocr.calls(), 0);
    }

    #[tokio::test]
    async fn test_document_without_text_is_dropped() {
        let dir = tempfile::tempdir().unwrap();
        let ocr = FakeOcr::failing();
        let pipeline = pipeline(FakeReader::with(&[("scan.pdf", "")]), &ocr, dir.path());

        let result = pipeline.run_batch(["scan.pdf"]).await;

        assert!(result.invoices.is_empty());
        assert!(result.line_items.is_empty());
        assert_eq!(result.skipped.len(), 1);
        assert_eq!(result.skipped[0].pdf_filename, "scan.pdf");
        assert!(result.skipped[0].reason.starts_with("no text"));
        assert_eq!(ocr.calls(), 1);
    }

    #[tokio::test]
    async fn test_text_without_fields_is_dropped() {
        let dir = tempfile::tempdir().unwrap();
        let ocr = FakeOcr::default();
        let pipeline = pipeline(FakeReader::with(&[("memo.pdf", "ok, n/a")]), &ocr, dir.path());

        let outcome = pipeline.process(Path::new("memo.pdf")).await;
        assert!(matches!(outcome, DocumentOutcome::NoFields));
    }

    #[tokio::test]
    async fn test_multi_order_fan_out() {
        let dir = tempfile::tempdir().unwrap();
        let ocr = FakeOcr::default();
        let pipeline = pipeline(FakeReader::with(&[("two.pdf", TWO_ORDERS)]), &ocr, dir.path());

        let result = pipeline.run_batch(["two.pdf"]).await;

        assert_eq!(result.invoices[0].fields.order_number, "31001111111, 31009999999");
        assert_eq!(result.line_items.len(), 2);
        for line in &result.line_items {
            assert_eq!(line.order_number, "31001111111;31009999999");
        }
        assert_eq!(
            result.order_rows(),
            vec![("two.pdf", "31001111111"), ("two.pdf", "31009999999")]
        );
    }

    #[tokio::test]
    async fn test_batch_keeps_input_order_and_continues_after_failures() {
        let dir = tempfile::tempdir().unwrap();
        let ocr = FakeOcr::failing();
        let reader = FakeReader::with(&[("b.pdf", TWO_ORDERS), ("c.pdf", INVOICE)]);
        let pipeline = pipeline(reader, &ocr, dir.path());

        let mut seen = Vec::new();
        let result = pipeline
            .run_batch_with(["b.pdf", "missing.pdf", "c.pdf"], |path, _| {
                seen.push(path.to_path_buf())
            })
            .await;

        let names: Vec<&str> = result.invoices.iter().map(|i| i.pdf_filename.as_str()).collect();
        assert_eq!(names, vec!["b.pdf", "c.pdf"]);
        assert_eq!(result.line_items.len(), 4);
        assert_eq!(result.line_items[2].pdf_filename, "c.pdf");
        assert_eq!(result.line_items[2].line_index, 0);
        assert_eq!(result.skipped[0].pdf_filename, "missing.pdf");
        assert_eq!(result.documents(), 3);
        assert_eq!(seen.len(), 3);
    }

    #[tokio::test]
    async fn test_process_is_deterministic() {
        let dir = tempfile::tempdir().unwrap();
        let ocr = FakeOcr::default();
        let pipeline = pipeline(FakeReader::with(&[("inv.pdf", INVOICE)]), &ocr, dir.path());

        let first = pipeline.process_text("inv.pdf", INVOICE);
        let second = pipeline.process_text("inv.pdf", INVOICE);
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn test_embedded_text_layer_of_generated_pdf() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("inv.pdf");
        let lines: Vec<&str> = INVOICE.lines().collect();
        crate::pdf::tests::write_text_pdf(&path, &lines);
        let pipeline = InvoicePipeline::new(
            TextAcquirer::new(PdfTextReader, None::<&FakeOcr>, dir.path().join("scratch")),
            FieldExtractor::new(),
            LineItemSegmenter::new(),
            ResultAggregator::new(),
        );

        let outcome = pipeline.process(&path).await;
        let records = outcome.records().unwrap();

        assert_eq!(records.invoice.fields.invoice_number, "INV-2023-8821");
        assert_eq!(records.invoice.fields.order_number, "31001234567");
        assert_eq!(records.invoice.fields.freight_inc_gst, "15.55");
        let skus: Vec<&str> = records.line_items.iter().map(|l| l.sku.as_str()).collect();
        assert_eq!(skus, ["D-001", "D-002"]);
        assert_eq!(records.line_items[0].description, "Steel Frame");
        assert!(!dir.path().join("scratch").exists());
    }

    #[test]
    fn test_sort_by_filename() {
        let paths = vec![
            PathBuf::from("x/b.PDF"),
            PathBuf::from("y/a.pdf"),
            PathBuf::from("c.pdf"),
        ];
        assert_eq!(
            sort_by_filename(paths),
            vec![PathBuf::from("y/a.pdf"), PathBuf::from("x/b.PDF"), PathBuf::from("c.pdf")]
        );
    }
}

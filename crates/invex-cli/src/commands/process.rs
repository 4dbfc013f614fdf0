//! Process command - extract records from a single invoice PDF.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;

use clap::Args;
use console::style;
use serde::Serialize;
use tracing::debug;

use invex_core::models::{DocumentRecords, InvoiceRecord, LineItemRecord};
use invex_core::pdf::{PdfExtractor, PdfProcessor, PdfType};
use invex_core::{DocumentOutcome, InvoicePipeline, TextSource};

use super::load_config;

/// Arguments for the process command.
#[derive(Args)]
pub struct ProcessArgs {
    /// Input PDF file
    #[arg(required = true)]
    input: PathBuf,

    /// Output file (default: stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "json")]
    format: OutputFormat,

    /// Skip the OCR fallback and use only the embedded text layer
    #[arg(long)]
    no_ocr: bool,
}

#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub enum OutputFormat {
    /// JSON output
    Json,
    /// Plain text summary
    Text,
}

/// JSON shape of a processed document.
#[derive(Serialize)]
struct ProcessOutput<'a> {
    source: String,
    invoice: &'a InvoiceRecord,
    line_items: &'a [LineItemRecord],
}

pub async fn run(args: ProcessArgs, config_path: Option<&Path>) -> anyhow::Result<()> {
    let start = Instant::now();

    let mut config = load_config(config_path)?;
    if args.no_ocr {
        config.acquisition.ocr_enabled = false;
    }

    if !args.input.exists() {
        anyhow::bail!("Input file not found: {}", args.input.display());
    }

    let pipeline = InvoicePipeline::from_config(&config);
    let (records, source) = match pipeline.process(&args.input).await {
        DocumentOutcome::Extracted { records, source } => (records, source),
        outcome => anyhow::bail!(
            "No records extracted from {}: {}",
            args.input.display(),
            outcome.skip_reason().unwrap_or_default()
        ),
    };

    let output = match args.format {
        OutputFormat::Json => serde_json::to_string_pretty(&ProcessOutput {
            source: source_label(&source),
            invoice: &records.invoice,
            line_items: &records.line_items,
        })?,
        OutputFormat::Text => format_text(&args.input, &records, &source),
    };

    if let Some(output_path) = &args.output {
        fs::write(output_path, &output)?;
        println!(
            "{} Output written to {}",
            style("✓").green(),
            output_path.display()
        );
    } else {
        println!("{}", output);
    }

    debug!("Total processing time: {:?}", start.elapsed());
    Ok(())
}

fn source_label(source: &TextSource) -> String {
    match source {
        TextSource::Embedded => "embedded".to_string(),
        TextSource::Ocr { path } => format!("ocr ({})", path.display()),
        TextSource::Unavailable => "unavailable".to_string(),
    }
}

/// Page count and content type of the input, when it can be parsed.
fn describe_pdf(path: &Path) -> Option<(u32, PdfType)> {
    let data = fs::read(path).ok()?;
    let mut extractor = PdfExtractor::new();
    extractor.load(&data).ok()?;
    Some((extractor.page_count(), extractor.analyze()))
}

fn format_text(path: &Path, records: &DocumentRecords, source: &TextSource) -> String {
    let invoice = &records.invoice;
    let fields = &invoice.fields;
    let mut output = String::new();

    output.push_str(&format!("File: {}\n", invoice.pdf_filename));
    if let Some((pages, pdf_type)) = describe_pdf(path) {
        output.push_str(&format!("Pages: {} ({:?})\n", pages, pdf_type));
    }
    output.push_str(&format!("Text: {}\n", source_label(source)));
    output.push('\n');

    output.push_str(&format!("Invoice:   {}\n", fields.invoice_number));
    output.push_str(&format!("Orders:    {}\n", fields.order_number));
    output.push_str(&format!("PO:        {}\n", fields.po_number));
    output.push_str(&format!("Supplier:  {}\n", fields.supplier));
    output.push_str(&format!("ABN:       {}\n", fields.abn));
    output.push_str(&format!("Date:      {}\n", fields.invoice_date));
    output.push_str(&format!("Due:       {}\n", fields.due_date));
    output.push_str(&format!("Total:     {}\n", fields.total_amount));
    output.push_str(&format!("Freight:   {}\n", fields.freight_inc_gst));

    if !records.line_items.is_empty() {
        output.push_str("\nLine items:\n");
        for line in &records.line_items {
            output.push_str(&format!(
                "  {:>3}  {:<12} {:<30} {:>6} {:>10} {:>10}\n",
                line.line_index, line.sku, line.description, line.qty, line.unit_price, line.amount
            ));
        }
    }

    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use invex_core::models::{HeaderField, HeaderFields};

    fn sample() -> DocumentRecords {
        let mut fields = HeaderFields::empty("0.00");
        fields.set(HeaderField::InvoiceNumber, "INV-77");
        fields.set(HeaderField::OrderNumber, "31001234567");
        DocumentRecords {
            invoice: InvoiceRecord {
                pdf_filename: "a.pdf".to_string(),
                fields,
            },
            line_items: vec![LineItemRecord {
                pdf_filename: "a.pdf".to_string(),
                line_index: 0,
                order_number: "31001234567".to_string(),
                invoice_number: "INV-77".to_string(),
                sku: "D-001".to_string(),
                description: "Steel Frame".to_string(),
                qty: "2".to_string(),
                unit_price: "350.00".to_string(),
                amount: "700.00".to_string(),
                freight_inc_gst: "0.00".to_string(),
            }],
        }
    }

    #[test]
    fn test_text_summary() {
        let text = format_text(Path::new("/nonexistent/a.pdf"), &sample(), &TextSource::Embedded);
        assert!(text.starts_with("File: a.pdf\nText: embedded\n"));
        assert!(text.contains("Invoice:   INV-77"));
        assert!(text.contains("Freight:   0.00"));
        assert!(text.contains("D-001"));
    }

    #[test]
    fn test_source_label() {
        let source = TextSource::Ocr {
            path: PathBuf::from("ocr_output/a.pdf"),
        };
        assert_eq!(source_label(&source), "ocr (ocr_output/a.pdf)");
    }
}

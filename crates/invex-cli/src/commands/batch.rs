//! Batch command - extract every invoice PDF in a directory into CSV files.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;

use chrono::Local;
use clap::Args;
use console::style;
use glob::{glob_with, MatchOptions, Pattern};
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{debug, info, warn};

use invex_core::models::config::OutputConfig;
use invex_core::models::{INVOICE_COLUMNS, LINE_ITEM_COLUMNS};
use invex_core::pipeline::sort_by_filename;
use invex_core::{BatchResult, InvoicePipeline};

use super::load_config;

/// Arguments for the batch command.
#[derive(Args)]
pub struct BatchArgs {
    /// Directory containing the invoice PDFs
    #[arg(required = true)]
    input_dir: PathBuf,

    /// Invoice summary CSV (default from config)
    #[arg(long)]
    invoices_output: Option<PathBuf>,

    /// Line item CSV (default from config)
    #[arg(long)]
    line_items_output: Option<PathBuf>,

    /// Directory for the output files
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// Append a timestamp to the output file names
    #[arg(long)]
    timestamp: bool,

    /// Also write a pdf_filename,order_number CSV
    #[arg(long)]
    orders_output: Option<PathBuf>,

    /// Skip the OCR fallback and use only the embedded text layer
    #[arg(long)]
    no_ocr: bool,
}

/// Where the output files go.
#[derive(Debug, PartialEq)]
struct OutputPaths {
    invoices: PathBuf,
    line_items: PathBuf,
    orders: Option<PathBuf>,
}

impl OutputPaths {
    fn resolve(args: &BatchArgs, config: &OutputConfig, stamp: &str) -> Self {
        let suffix = if args.timestamp || config.timestamped { stamp } else { "" };
        let place = |path: &Path| {
            let path = with_suffix(path, suffix);
            match &args.output_dir {
                Some(dir) => dir.join(path),
                None => path,
            }
        };

        Self {
            invoices: place(
                args.invoices_output
                    .as_deref()
                    .unwrap_or(config.invoices_file.as_path()),
            ),
            line_items: place(
                args.line_items_output
                    .as_deref()
                    .unwrap_or(config.line_items_file.as_path()),
            ),
            orders: args.orders_output.as_deref().map(place),
        }
    }
}

/// `dir/name.csv` + `_20240101_120000` -> `dir/name_20240101_120000.csv`.
fn with_suffix(path: &Path, suffix: &str) -> PathBuf {
    if suffix.is_empty() {
        return path.to_path_buf();
    }
    let stem = path.file_stem().map(|s| s.to_string_lossy()).unwrap_or_default();
    let name = match path.extension() {
        Some(ext) => format!("{}{}.{}", stem, suffix, ext.to_string_lossy()),
        None => format!("{}{}", stem, suffix),
    };
    path.with_file_name(name)
}

/// Every `*.pdf` (any case) directly inside `dir`, sorted by file name.
fn find_pdfs(dir: &Path) -> anyhow::Result<Vec<PathBuf>> {
    if !dir.is_dir() {
        anyhow::bail!("Input directory not found: {}", dir.display());
    }

    let pattern = format!("{}/*.pdf", Pattern::escape(&dir.to_string_lossy()));
    let options = MatchOptions {
        case_sensitive: false,
        ..Default::default()
    };

    let files = glob_with(&pattern, options)?
        .filter_map(|r| r.ok())
        .filter(|p| p.is_file())
        .collect();
    Ok(sort_by_filename(files))
}

pub async fn run(args: BatchArgs, config_path: Option<&Path>) -> anyhow::Result<()> {
    let start = Instant::now();

    let mut config = load_config(config_path)?;
    if args.no_ocr {
        config.acquisition.ocr_enabled = false;
    }

    let files = find_pdfs(&args.input_dir)?;
    if files.is_empty() {
        warn!("No PDF files found in {}", args.input_dir.display());
    }

    println!("{} Found {} PDF files to process", style("ℹ").blue(), files.len());

    let stamp = Local::now().format("_%Y%m%d_%H%M%S").to_string();
    let outputs = OutputPaths::resolve(&args, &config.output, &stamp);

    let pb = ProgressBar::new(files.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template(
                "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} files {msg}",
            )?
            .progress_chars("=>-"),
    );

    let pipeline = InvoicePipeline::from_config(&config);
    let result = pipeline
        .run_batch_with(&files, |path, outcome| {
            if let Some(reason) = outcome.skip_reason() {
                debug!("Skipped {}: {}", path.display(), reason);
            }
            let name = path.file_name().map(|n| n.to_string_lossy().into_owned());
            pb.set_message(name.unwrap_or_default());
            pb.inc(1);
        })
        .await;
    pb.finish_and_clear();

    write_outputs(&outputs, &result)?;

    let elapsed = start.elapsed();
    info!(
        "Processed {} files in {:.2} seconds",
        result.documents(),
        elapsed.as_secs_f64()
    );
    print_summary(&result, &outputs, elapsed.as_secs_f64());

    Ok(())
}

fn write_outputs(outputs: &OutputPaths, result: &BatchResult) -> anyhow::Result<()> {
    let mut targets = vec![&outputs.invoices, &outputs.line_items];
    targets.extend(outputs.orders.as_ref());
    for path in targets {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
    }

    let mut wtr = csv::Writer::from_path(&outputs.invoices)?;
    wtr.write_record(INVOICE_COLUMNS)?;
    for invoice in &result.invoices {
        wtr.write_record(invoice.values())?;
    }
    wtr.flush()?;

    let mut wtr = csv::Writer::from_path(&outputs.line_items)?;
    wtr.write_record(LINE_ITEM_COLUMNS)?;
    for line in &result.line_items {
        wtr.write_record(line.values())?;
    }
    wtr.flush()?;

    if let Some(path) = &outputs.orders {
        let mut wtr = csv::Writer::from_path(path)?;
        wtr.write_record(["pdf_filename", "order_number"])?;
        for (filename, order) in result.order_rows() {
            wtr.write_record([filename, order])?;
        }
        wtr.flush()?;
    }

    Ok(())
}

fn print_summary(result: &BatchResult, outputs: &OutputPaths, seconds: f64) {
    println!();
    println!(
        "{} Processed {} files in {:.2}s",
        style("✓").green(),
        result.documents(),
        seconds
    );
    println!(
        "   {} invoices, {} line items, {} skipped",
        style(result.invoices.len()).green(),
        style(result.line_items.len()).green(),
        style(result.skipped.len()).yellow()
    );
    println!("   Invoices:   {}", outputs.invoices.display());
    println!("   Line items: {}", outputs.line_items.display());
    if let Some(orders) = &outputs.orders {
        println!("   Orders:     {}", orders.display());
    }

    if !result.skipped.is_empty() {
        println!();
        println!("{}", style("Skipped files:").yellow());
        for skipped in &result.skipped {
            println!("  - {}: {}", skipped.pdf_filename, skipped.reason);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn args(extra: &[&str]) -> BatchArgs {
        use clap::Parser;

        #[derive(Parser)]
        struct Wrapper {
            #[command(flatten)]
            batch: BatchArgs,
        }

        let mut argv = vec!["invex", "in"];
        argv.extend_from_slice(extra);
        Wrapper::parse_from(argv).batch
    }

    #[test]
    fn test_with_suffix() {
        assert_eq!(
            with_suffix(Path::new("out/line_items.csv"), "_20240101_120000"),
            PathBuf::from("out/line_items_20240101_120000.csv")
        );
        assert_eq!(with_suffix(Path::new("report"), "_x"), PathBuf::from("report_x"));
        assert_eq!(with_suffix(Path::new("a.csv"), ""), PathBuf::from("a.csv"));
    }

    #[test]
    fn test_default_output_paths() {
        let outputs = OutputPaths::resolve(&args(&[]), &OutputConfig::default(), "_stamp");
        assert_eq!(
            outputs,
            OutputPaths {
                invoices: PathBuf::from("extracted_invoice_data.csv"),
                line_items: PathBuf::from("line_items.csv"),
                orders: None,
            }
        );
    }

    #[test]
    fn test_output_dir_and_timestamp() {
        let outputs = OutputPaths::resolve(
            &args(&["--output-dir", "out", "--timestamp", "--orders-output", "orders.csv"]),
            &OutputConfig::default(),
            "_stamp",
        );
        assert_eq!(outputs.invoices, PathBuf::from("out/extracted_invoice_data_stamp.csv"));
        assert_eq!(outputs.line_items, PathBuf::from("out/line_items_stamp.csv"));
        assert_eq!(outputs.orders, Some(PathBuf::from("out/orders_stamp.csv")));
    }

    #[test]
    fn test_find_pdfs_is_case_insensitive_and_sorted() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["b.PDF", "a.pdf", "notes.txt", "c.Pdf"] {
            fs::write(dir.path().join(name), b"").unwrap();
        }
        fs::create_dir(dir.path().join("nested.pdf")).unwrap();

        let names: Vec<String> = find_pdfs(dir.path())
            .unwrap()
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["a.pdf", "b.PDF", "c.Pdf"]);
    }

    #[test]
    fn test_find_pdfs_missing_dir() {
        assert!(find_pdfs(Path::new("/nonexistent/invoices")).is_err());
    }

    #[test]
    fn test_header_only_outputs_for_empty_batch() {
        let dir = tempfile::tempdir().unwrap();
        let outputs = OutputPaths {
            invoices: dir.path().join("inv.csv"),
            line_items: dir.path().join("sub").join("lines.csv"),
            orders: Some(dir.path().join("orders.csv")),
        };

        write_outputs(&outputs, &BatchResult::default()).unwrap();

        assert_eq!(
            fs::read_to_string(&outputs.invoices).unwrap(),
            format!("{}\n", INVOICE_COLUMNS.join(","))
        );
        assert_eq!(
            fs::read_to_string(&outputs.line_items).unwrap(),
            format!("{}\n", LINE_ITEM_COLUMNS.join(","))
        );
        assert_eq!(
            fs::read_to_string(outputs.orders.unwrap()).unwrap(),
            "pdf_filename,order_number\n"
        );
    }
}

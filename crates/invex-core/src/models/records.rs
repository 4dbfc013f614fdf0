//! Record types produced for each source document.
//!
//! Column order of [`InvoiceRecord`] and [`LineItemRecord`] is the contract
//! with the delimited writers: see [`INVOICE_COLUMNS`] and
//! [`LINE_ITEM_COLUMNS`].

use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Column names of the invoice summary stream, in output order.
pub const INVOICE_COLUMNS: [&str; 10] = [
    "pdf_filename",
    "order_number",
    "invoice_number",
    "invoice_date",
    "due_date",
    "total_amount",
    "freight_inc_gst",
    "supplier",
    "abn",
    "po_number",
];

/// Column names of the line item stream, in output order.
pub const LINE_ITEM_COLUMNS: [&str; 10] = [
    "pdf_filename",
    "line_index",
    "order_number",
    "invoice_number",
    "sku",
    "description",
    "qty",
    "unit_price",
    "amount",
    "freight_inc_gst",
];

/// An input PDF. Opened read-only, never modified.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceDocument {
    path: PathBuf,
}

impl SourceDocument {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// File name used to key output rows. Falls back to the full path when
    /// the path has no final component.
    pub fn filename(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.path.display().to_string())
    }
}

/// The closed set of invoice-level attributes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HeaderField {
    OrderNumber,
    InvoiceNumber,
    InvoiceDate,
    DueDate,
    TotalAmount,
    FreightIncGst,
    Supplier,
    Abn,
    PoNumber,
}

impl HeaderField {
    /// Every field, in output column order.
    pub const ALL: [HeaderField; 9] = [
        HeaderField::OrderNumber,
        HeaderField::InvoiceNumber,
        HeaderField::InvoiceDate,
        HeaderField::DueDate,
        HeaderField::TotalAmount,
        HeaderField::FreightIncGst,
        HeaderField::Supplier,
        HeaderField::Abn,
        HeaderField::PoNumber,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            HeaderField::OrderNumber => "order_number",
            HeaderField::InvoiceNumber => "invoice_number",
            HeaderField::InvoiceDate => "invoice_date",
            HeaderField::DueDate => "due_date",
            HeaderField::TotalAmount => "total_amount",
            HeaderField::FreightIncGst => "freight_inc_gst",
            HeaderField::Supplier => "supplier",
            HeaderField::Abn => "abn",
            HeaderField::PoNumber => "po_number",
        }
    }
}

impl fmt::Display for HeaderField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Header fields recovered from one document.
///
/// Every field is always present; unmatched fields hold an empty string,
/// except `freight_inc_gst` which holds the configured default.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeaderFields {
    /// Distinct order numbers, sorted, joined with `", "`.
    pub order_number: String,
    pub invoice_number: String,
    pub invoice_date: String,
    pub due_date: String,
    pub total_amount: String,
    pub freight_inc_gst: String,
    pub supplier: String,
    pub abn: String,
    pub po_number: String,
}

impl HeaderFields {
    /// All fields unmatched, freight set to `freight_default`.
    pub fn empty(freight_default: &str) -> Self {
        Self {
            order_number: String::new(),
            invoice_number: String::new(),
            invoice_date: String::new(),
            due_date: String::new(),
            total_amount: String::new(),
            freight_inc_gst: freight_default.to_string(),
            supplier: String::new(),
            abn: String::new(),
            po_number: String::new(),
        }
    }

    pub fn get(&self, field: HeaderField) -> &str {
        match field {
            HeaderField::OrderNumber => &self.order_number,
            HeaderField::InvoiceNumber => &self.invoice_number,
            HeaderField::InvoiceDate => &self.invoice_date,
            HeaderField::DueDate => &self.due_date,
            HeaderField::TotalAmount => &self.total_amount,
            HeaderField::FreightIncGst => &self.freight_inc_gst,
            HeaderField::Supplier => &self.supplier,
            HeaderField::Abn => &self.abn,
            HeaderField::PoNumber => &self.po_number,
        }
    }

    pub fn set(&mut self, field: HeaderField, value: impl Into<String>) {
        let slot = match field {
            HeaderField::OrderNumber => &mut self.order_number,
            HeaderField::InvoiceNumber => &mut self.invoice_number,
            HeaderField::InvoiceDate => &mut self.invoice_date,
            HeaderField::DueDate => &mut self.due_date,
            HeaderField::TotalAmount => &mut self.total_amount,
            HeaderField::FreightIncGst => &mut self.freight_inc_gst,
            HeaderField::Supplier => &mut self.supplier,
            HeaderField::Abn => &mut self.abn,
            HeaderField::PoNumber => &mut self.po_number,
        };
        *slot = value.into();
    }

    /// True when no rule produced a value: every field is empty and freight
    /// still holds its default.
    pub fn is_unmatched(&self, freight_default: &str) -> bool {
        HeaderField::ALL.iter().all(|&field| match field {
            HeaderField::FreightIncGst => self.freight_inc_gst == freight_default,
            _ => self.get(field).is_empty(),
        })
    }
}

/// One row of table text, interpreted positionally.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawLineItem {
    pub sku: String,
    pub description: String,
    pub qty: String,
    pub unit_price: String,
    pub amount: String,
}

impl RawLineItem {
    /// Build an item from split cells. Cells past the fifth are ignored and
    /// missing trailing cells become empty strings.
    pub fn from_cells<I, S>(cells: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut cells = cells.into_iter().map(Into::into);
        let mut next = || cells.next().unwrap_or_default();
        Self {
            sku: next(),
            description: next(),
            qty: next(),
            unit_price: next(),
            amount: next(),
        }
    }
}

/// Summary record: one per document that produced header fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvoiceRecord {
    pub pdf_filename: String,
    #[serde(flatten)]
    pub fields: HeaderFields,
}

impl InvoiceRecord {
    /// Values in [`INVOICE_COLUMNS`] order.
    pub fn values(&self) -> [&str; 10] {
        [
            &self.pdf_filename,
            &self.fields.order_number,
            &self.fields.invoice_number,
            &self.fields.invoice_date,
            &self.fields.due_date,
            &self.fields.total_amount,
            &self.fields.freight_inc_gst,
            &self.fields.supplier,
            &self.fields.abn,
            &self.fields.po_number,
        ]
    }
}

/// A line item joined with its document-level context.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineItemRecord {
    pub pdf_filename: String,
    /// Zero-based position within the document.
    pub line_index: usize,
    /// The single order number, or every order joined with `;`.
    pub order_number: String,
    pub invoice_number: String,
    pub sku: String,
    pub description: String,
    pub qty: String,
    pub unit_price: String,
    pub amount: String,
    /// Document-level freight, repeated on every line.
    pub freight_inc_gst: String,
}

impl LineItemRecord {
    /// Values in [`LINE_ITEM_COLUMNS`] order.
    pub fn values(&self) -> [String; 10] {
        [
            self.pdf_filename.clone(),
            self.line_index.to_string(),
            self.order_number.clone(),
            self.invoice_number.clone(),
            self.sku.clone(),
            self.description.clone(),
            self.qty.clone(),
            self.unit_price.clone(),
            self.amount.clone(),
            self.freight_inc_gst.clone(),
        ]
    }
}

/// Both record streams for a single document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentRecords {
    pub invoice: InvoiceRecord,
    pub line_items: Vec<LineItemRecord>,
}

//! Data models: per-document records and pipeline configuration.

pub mod config;
pub mod records;

pub use config::InvexConfig;
pub use records::{
    DocumentRecords, HeaderField, HeaderFields, InvoiceRecord, LineItemRecord, RawLineItem,
    SourceDocument, INVOICE_COLUMNS, LINE_ITEM_COLUMNS,
};

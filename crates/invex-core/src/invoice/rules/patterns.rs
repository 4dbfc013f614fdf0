//! The standard header field rules.
//!
//! Rules are deliberately permissive so that formatting drift between
//! vendors still yields a value. False positives are accepted.

use lazy_static::lazy_static;

use super::{MatchMode, PatternLibrary, PatternRule};
use crate::models::HeaderField;

/// 11-digit order numbers starting with `3100`, optionally labelled.
pub const ORDER_NUMBER: &str =
    r"(?i)(?:purchase\s*order|po|order\s*no\.?)?\s*[:\-]?\s*(3100\d{7})";

/// Optional invoice label, then any 4+ character token.
pub const INVOICE_NUMBER: &str =
    r"(?i)(invoice[\s:_#-]*no\.?|inv[\s:_#-]*number)?\s*[:#-]?\s*([A-Z0-9\-/]{4,})";

pub const INVOICE_DATE: &str =
    r"(?i)(invoice\s*date|date\s*of\s*issue)\s*[:#-]?\s*(\d{1,2}[/\-.]\d{1,2}[/\-.]\d{2,4})";

pub const DUE_DATE: &str = r"(?i)(due\s*date)\s*[:#-]?\s*(\d{1,2}[/\-.]\d{1,2}[/\-.]\d{2,4})";

/// A leading currency symbol is consumed outside the value group, so
/// `Total amount € 75.10` captures `75.10`, not `€ 75.10`.
pub const TOTAL_AMOUNT: &str = concat!(
    r"(?i)(grand\s*total|total\s*amount|amount\s*due)\s*[:$AUD\s]*",
    r"(?:[$€£]\s*)?(\d{1,3}(?:,\d{3})*(?:\.\d{2})?)"
);

/// Label is optional: any amount may match, and the last one wins.
pub const FREIGHT_INC_GST: &str =
    r"(?i)(freight[\s_]*(?:inc)?[\s_]*gst)?\s*[:\-]?\s*(?:[$€£]\s*)?(\d+(?:\.\d{2})?)";

pub const SUPPLIER: &str = r"(?i)(from|seller|vendor|supplier)\s*[:\-]?\s*(.+)";

pub const ABN: &str = r"(?i)(ABN|GST\s*number|VAT\s*number|Tax\s*ID)[\s:]*([A-Z0-9\- ]{8,})";

pub const PO_NUMBER: &str =
    r"(?i)(PO[\s_-]?Number|Purchase\s*Order|Reference)\s*[:#-]?\s*([A-Z0-9\-/]{4,})";

/// Field, match mode, expression, capture group.
pub const RULE_TABLE: [(HeaderField, MatchMode, &str, usize); 9] = [
    (HeaderField::OrderNumber, MatchMode::All, ORDER_NUMBER, 1),
    (HeaderField::InvoiceNumber, MatchMode::First, INVOICE_NUMBER, 2),
    (HeaderField::InvoiceDate, MatchMode::First, INVOICE_DATE, 2),
    (HeaderField::DueDate, MatchMode::First, DUE_DATE, 2),
    (HeaderField::TotalAmount, MatchMode::First, TOTAL_AMOUNT, 2),
    (HeaderField::FreightIncGst, MatchMode::All, FREIGHT_INC_GST, 2),
    (HeaderField::Supplier, MatchMode::First, SUPPLIER, 2),
    (HeaderField::Abn, MatchMode::First, ABN, 2),
    (HeaderField::PoNumber, MatchMode::First, PO_NUMBER, 2),
];

lazy_static! {
    pub static ref STANDARD_LIBRARY: PatternLibrary = PatternLibrary::new(
        RULE_TABLE
            .iter()
            .map(|&(field, mode, pattern, group)| {
                PatternRule::new(field, mode, pattern, group).unwrap()
            })
            .collect()
    );
}

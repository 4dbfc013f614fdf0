//! Joins header fields with line items into the two output records.

use tracing::debug;

use crate::models::config::ExtractionConfig;
use crate::models::{DocumentRecords, HeaderFields, InvoiceRecord, LineItemRecord, RawLineItem};

/// Builds the invoice and line item records of one document.
#[derive(Debug, Clone)]
pub struct ResultAggregator {
    order_separator: String,
    line_order_separator: String,
    freight_default: String,
}

impl ResultAggregator {
    pub fn new() -> Self {
        Self::from_config(&ExtractionConfig::default())
    }

    pub fn from_config(config: &ExtractionConfig) -> Self {
        Self {
            order_separator: config.order_separator.clone(),
            line_order_separator: config.line_order_separator.clone(),
            freight_default: config.freight_default.clone(),
        }
    }

    /// Order value attached to each line: the single order, or every order
    /// joined with the line separator when the document lists several.
    pub fn line_order_number(&self, order_number: &str) -> String {
        let orders: Vec<&str> = order_number.split(self.order_separator.as_str()).collect();
        match orders.as_slice() {
            [single] => single.to_string(),
            many => many.join(self.line_order_separator.as_str()),
        }
    }

    /// Build both records. Returns `None` when no header rule matched, in
    /// which case the document contributes nothing to either output.
    pub fn aggregate<I>(
        &self,
        filename: &str,
        fields: HeaderFields,
        items: I,
    ) -> Option<DocumentRecords>
    where
        I: IntoIterator<Item = RawLineItem>,
    {
        if fields.is_unmatched(&self.freight_default) {
            debug!("{}: no header fields matched, dropping", filename);
            return None;
        }

        let order_number = self.line_order_number(&fields.order_number);
        let line_items: Vec<LineItemRecord> = items
            .into_iter()
            .enumerate()
            .map(|(line_index, item)| LineItemRecord {
                pdf_filename: filename.to_string(),
                line_index,
                order_number: order_number.clone(),
                invoice_number: fields.invoice_number.clone(),
                sku: item.sku,
                description: item.description,
                qty: item.qty,
                unit_price: item.unit_price,
                amount: item.amount,
                freight_inc_gst: fields.freight_inc_gst.clone(),
            })
            .collect();

        Some(DocumentRecords {
            invoice: InvoiceRecord {
                pdf_filename: filename.to_string(),
                fields,
            },
            line_items,
        })
    }
}

impl Default for ResultAggregator {
    fn default() -> Self {
        Self::new()
    }
}

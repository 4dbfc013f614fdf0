//! Header field extraction.

use std::collections::BTreeSet;

use tracing::{debug, trace};

use super::rules::{PatternLibrary, RuleMatch};
use crate::models::config::ExtractionConfig;
use crate::models::{HeaderField, HeaderFields};

/// Applies a [`PatternLibrary`] to acquired text.
#[derive(Debug, Clone)]
pub struct FieldExtractor {
    library: PatternLibrary,
    freight_default: String,
    order_separator: String,
}

impl FieldExtractor {
    /// Create an extractor with the standard rules and default settings.
    pub fn new() -> Self {
        Self::from_config(&ExtractionConfig::default())
    }

    pub fn from_config(config: &ExtractionConfig) -> Self {
        Self {
            library: PatternLibrary::default(),
            freight_default: config.freight_default.clone(),
            order_separator: config.order_separator.clone(),
        }
    }

    /// Use a different rule table.
    pub fn with_library(mut self, library: PatternLibrary) -> Self {
        self.library = library;
        self
    }

    pub fn freight_default(&self) -> &str {
        &self.freight_default
    }

    pub fn order_separator(&self) -> &str {
        &self.order_separator
    }

    /// Raw outcome of every rule, in table order. Rules run independently.
    pub fn matches(&self, text: &str) -> Vec<(HeaderField, RuleMatch)> {
        self.library
            .rules()
            .iter()
            .map(|rule| (rule.field, rule.apply(text)))
            .collect()
    }

    /// Extract every header field. Unmatched fields are empty, except
    /// freight which falls back to the configured default.
    pub fn extract(&self, text: &str) -> HeaderFields {
        let mut fields = HeaderFields::empty(&self.freight_default);

        for (field, outcome) in self.matches(text) {
            match outcome {
                RuleMatch::NoMatch => trace!("no match for {}", field),
                RuleMatch::First(value) => fields.set(field, clean_first(field, &value)),
                RuleMatch::All(values) => fields.set(field, self.reduce_all(field, values)),
            }
        }

        debug!(
            order_number = %fields.order_number,
            invoice_number = %fields.invoice_number,
            freight_inc_gst = %fields.freight_inc_gst,
            "extracted header fields"
        );

        fields
    }

    /// Collapse a find-all result: freight keeps the last match, everything
    /// else becomes a sorted, de-duplicated list.
    fn reduce_all(&self, field: HeaderField, values: Vec<String>) -> String {
        match field {
            HeaderField::FreightIncGst => values
                .last()
                .map(|v| v.trim().to_string())
                .unwrap_or_else(|| self.freight_default.clone()),
            _ => {
                let distinct: BTreeSet<String> =
                    values.iter().map(|v| v.trim().to_string()).collect();
                distinct.into_iter().collect::<Vec<_>>().join(self.order_separator.as_str())
            }
        }
    }
}

impl Default for FieldExtractor {
    fn default() -> Self {
        Self::new()
    }
}

fn clean_first(field: HeaderField, value: &str) -> String {
    match field {
        // The capture may run into the next line of raw text.
        HeaderField::Supplier => value.split('\n').next().unwrap_or_default().trim().to_string(),
        _ => value.trim().to_string(),
    }
}

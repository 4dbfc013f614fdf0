//! Invoice field extraction, line item segmentation and aggregation.

mod aggregate;
mod fields;
pub mod rules;
mod segment;

pub use aggregate::ResultAggregator;
pub use fields::FieldExtractor;
pub use rules::{MatchMode, PatternLibrary, PatternRule, RuleMatch};
pub use segment::{LineItemSegmenter, SegmentState, Segments};

//! Line item table segmentation over linearized page text.
//!
//! A single forward pass over the lines, driven by [`SegmentState`]:
//! lines are skipped until a header line is found, then every following
//! line is split into cells until a blank line or a summary line ends the
//! table. Nothing is layout-aware; only whitespace runs separate columns.

use lazy_static::lazy_static;
use regex::Regex;
use tracing::trace;

use crate::models::config::SegmentationConfig;
use crate::models::RawLineItem;

lazy_static! {
    /// Two or more whitespace characters, or a single tab.
    static ref CELL_SEPARATOR: Regex = Regex::new(r"\s{2,}|\t").unwrap();

    /// Universal newlines: `\r\n`, lone `\r`, vertical tab, form feed, the
    /// ASCII separators, NEL and the Unicode line/paragraph separators.
    static ref LINE_BREAK: Regex =
        Regex::new(r"\r\n|[\n\r\x0B\x0C\x1C-\x1E\x{85}\x{2028}\x{2029}]").unwrap();
}

/// Position of a [`Segments`] scan.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SegmentState {
    /// Looking for the table header line.
    SeekingHeader,
    /// Reading data rows.
    InTable,
    /// Table ended or text exhausted. Terminal.
    Done,
}

/// Finds the line item table in acquired text.
#[derive(Debug, Clone)]
pub struct LineItemSegmenter {
    header_keywords: Vec<Vec<String>>,
    stop_prefixes: Vec<String>,
    min_cells: usize,
    max_cells: usize,
}

impl LineItemSegmenter {
    pub fn new() -> Self {
        Self::from_config(&SegmentationConfig::default())
    }

    pub fn from_config(config: &SegmentationConfig) -> Self {
        let lower = |words: &[String]| -> Vec<String> {
            words.iter().map(|w| w.to_lowercase()).collect()
        };
        Self {
            header_keywords: config
                .header_keywords
                .iter()
                .map(|g| lower(g.as_slice()))
                .collect(),
            stop_prefixes: lower(config.stop_prefixes.as_slice()),
            min_cells: config.min_cells,
            max_cells: config.max_cells,
        }
    }

    /// Scan `text` for line items, in document order.
    pub fn segment<'a>(&'a self, text: &'a str) -> Segments<'a> {
        Segments {
            segmenter: self,
            lines: LINE_BREAK.split(text),
            state: SegmentState::SeekingHeader,
        }
    }

    /// Every keyword group has an alternative contained in some
    /// whitespace-delimited token of the line.
    pub fn is_header(&self, line: &str) -> bool {
        let lower = line.to_lowercase();
        let tokens: Vec<&str> = lower.split_whitespace().collect();
        !tokens.is_empty()
            && self.header_keywords.iter().all(|alternatives| {
                alternatives
                    .iter()
                    .any(|keyword| tokens.iter().any(|token| token.contains(keyword.as_str())))
            })
    }

    /// A blank line, or a line starting with a stop prefix. Prefixes are
    /// checked against the raw line, so indented summary lines do not end
    /// the table.
    pub fn is_table_end(&self, line: &str) -> bool {
        line.trim().is_empty()
            || self.stop_prefixes.iter().any(|prefix| {
                line.get(..prefix.len())
                    .is_some_and(|head| head.eq_ignore_ascii_case(prefix))
            })
    }

    /// Split a data line into an item. Rows with too few cells are noise.
    pub fn split_row(&self, line: &str) -> Option<RawLineItem> {
        let cells: Vec<&str> = CELL_SEPARATOR.split(line.trim()).collect();
        if cells.len() < self.min_cells {
            trace!(cells = cells.len(), "dropping short row: {:?}", line);
            return None;
        }
        Some(RawLineItem::from_cells(cells.into_iter().take(self.max_cells)))
    }
}

impl Default for LineItemSegmenter {
    fn default() -> Self {
        Self::new()
    }
}

/// Iterator over the rows of one document's table. Not restartable.
#[derive(Debug)]
pub struct Segments<'a> {
    segmenter: &'a LineItemSegmenter,
    lines: regex::Split<'static, 'a>,
    state: SegmentState,
}

impl Segments<'_> {
    pub fn state(&self) -> SegmentState {
        self.state
    }
}

impl Iterator for Segments<'_> {
    type Item = RawLineItem;

    fn next(&mut self) -> Option<RawLineItem> {
        loop {
            match self.state {
                SegmentState::Done => return None,
                SegmentState::SeekingHeader => {
                    let Some(line) = self.lines.next() else {
                        self.state = SegmentState::Done;
                        continue;
                    };
                    if self.segmenter.is_header(line) {
                        trace!("table header: {:?}", line);
                        self.state = SegmentState::InTable;
                    }
                }
                SegmentState::InTable => {
                    let Some(line) = self.lines.next() else {
                        self.state = SegmentState::Done;
                        continue;
                    };
                    if self.segmenter.is_table_end(line) {
                        trace!("table end: {:?}", line);
                        self.state = SegmentState::Done;
                        continue;
                    }
                    if let Some(item) = self.segmenter.split_row(line) {
                        return Some(item);
                    }
                }
            }
        }
    }
}

impl std::iter::FusedIterator for Segments<'_> {}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const HEADER: &str = "SKU   Description   Qty   Unit Price   Amount";

    fn items(text: &str) -> Vec<RawLineItem> {
        LineItemSegmenter::new().segment(text).collect()
    }

    #[test]
    fn test_header_detection() {
        let segmenter = LineItemSegmenter::new();
        assert!(segmenter.is_header(HEADER));
        assert!(segmenter.is_header("Item/SKU  DESCRIPTION  Quantity  Unit-Price  Amount(AUD)"));
        assert!(!segmenter.is_header("SKU   Description   Qty   Amount"));
        assert!(!segmenter.is_header(""));
    }

    #[test]
    fn test_stops_before_subtotal() {
        let text = [
            HEADER,
            "D-001  Steel Frame  2  350.00  700.00",
            "D-002  Bracket Set  4  13.00  52.00",
            "Subtotal   752.00",
            "D-003  Late Row  1  1.00  1.00",
        ]
        .join("\n");
        let segmenter = LineItemSegmenter::new();
        let mut segments = segmenter.segment(&text);

        let rows: Vec<RawLineItem> = segments.by_ref().collect();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].sku, "D-001");
        assert_eq!(rows[1].amount, "52.00");
        assert_eq!(segments.state(), SegmentState::Done);
    }

    #[test]
    fn test_four_cells_pad_amount() {
        let rows = items(&format!("{}\nD-001  Steel Frame  2  350.00", HEADER));
        assert_eq!(
            rows,
            vec![RawLineItem {
                sku: "D-001".to_string(),
                description: "Steel Frame".to_string(),
                qty: "2".to_string(),
                unit_price: "350.00".to_string(),
                amount: String::new(),
            }]
        );
    }

    #[test]
    fn test_no_header_no_items() {
        assert!(items("D-001  Steel Frame  2  350.00  700.00").is_empty());
        assert!(items("").is_empty());
    }

    #[test]
    fn test_lines_before_header_are_ignored() {
        let text = format!("A-9  Not  A  Row  0.00\n{}\nB-1  Bolt  10  0.50  5.00", HEADER);
        let rows = items(&text);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].sku, "B-1");
    }

    #[test]
    fn test_short_rows_dropped_without_stopping() {
        let text = format!(
            "{}\nB-1  Bolt  10  0.50  5.00\ncontinued description text\nB-2  Nut  10  0.20  2.00",
            HEADER
        );
        let rows = items(&text);
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[1].sku, "B-2");
    }

    #[test]
    fn test_blank_line_ends_table() {
        let text = format!("{}\nB-1  Bolt  10  0.50  5.00\n   \nB-2  Nut  10  0.20  2.00", HEADER);
        assert_eq!(items(&text).len(), 1);
    }

    #[test]
    fn test_stop_prefixes_are_case_insensitive() {
        for stop in ["TOTAL 7.00", "gst  0.70", "Grand Total 7.70"] {
            let text = format!(
                "{}\nB-1  Bolt  10  0.50  5.00\n{}\nB-2  Nut  10  0.20  2.00",
                HEADER, stop
            );
            assert_eq!(items(&text).len(), 1, "{} should end the table", stop);
        }
    }

    #[test]
    fn test_indented_summary_line_is_only_dropped() {
        let text = format!(
            "{}\nB-1  Bolt  10  0.50  5.00\n   Subtotal   5.00\nB-2  Nut  10  0.20  2.00",
            HEADER
        );
        assert_eq!(items(&text).len(), 2);
    }

    #[test]
    fn test_tab_separated_row_keeps_five_cells() {
        let rows = items(&format!("{}\nA-1\tWidget\t3\t2.50\t7.50\tGST", HEADER));
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].description, "Widget");
        assert_eq!(rows[0].amount, "7.50");
    }

    #[test]
    fn test_header_split_over_two_lines_is_not_detected() {
        let text = "SKU   Description\nQty   Unit Price   Amount\nB-1  Bolt  10  0.50  5.00";
        assert!(items(text).is_empty());
    }

    #[test]
    fn test_segmentation_is_deterministic() {
        let text = format!("{}\nB-1  Bolt  10  0.50  5.00\nB-2  Nut  10  0.20  2.00", HEADER);
        assert_eq!(items(&text), items(&text));
    }

    #[test]
    fn test_lone_carriage_returns_split_lines() {
        let text = format!(
            "{}\rB-1  Bolt  10  0.50  5.00\rTotal  5.00\rB-2  Nut  1  0.20  0.20",
            HEADER
        );
        let rows = items(&text);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].sku, "B-1");
    }

    #[test]
    fn test_crlf_is_one_break() {
        let text = format!(
            "{}\r\nB-1  Bolt  10  0.50  5.00\r\nB-2  Nut  10  0.20  2.00\r\n",
            HEADER
        );
        assert_eq!(items(&text).len(), 2);
    }

    #[test]
    fn test_form_feed_and_unicode_separators_split_lines() {
        let text = format!(
            "{}\x0cB-1  Bolt  10  0.50  5.00\u{2028}B-2  Nut  10  0.20  2.00",
            HEADER
        );
        assert_eq!(items(&text).len(), 2);
    }
}

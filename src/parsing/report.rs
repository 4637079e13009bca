//! Report table parser.
//!
//! An EDGAR report page ("R file") renders one statement as an HTML table.
//! The table is visually tabular but structurally ambiguous:
//!
//! - The header spans one row (balance-sheet-style: title + instant dates) or
//!   two rows (duration-style: title + duration label, then the dates).
//! - Body rows mix *marker rows* that only set grouping context (an Axis or
//!   Abstract concept) with *data rows* carrying one value per date column.
//! - Each body row's concept identifier is not an attribute of the row; it is
//!   packed into the `onclick` handler of the first cell's anchor, wrapped in
//!   fixed `top.Show.showAR(...)` literals.
//!
//! The parser does a single pass over the rows, threading the two marker
//! accumulators through it. Markers persist until the next marker of the same
//! kind and never reset each other. Defective rows (bad anchor, wrong cell
//! count) are dropped and recorded as [`ParseIssue`]s; only a page with no
//! table or no header at all fails outright.

use crate::error::{ExtractError, IssueKind, ParseIssue, Result};
use crate::summary::StatementKind;
use scraper::{ElementRef, Html, Selector};

/// Literal wrapping the concept identifier in a row anchor's onclick handler.
const ONCLICK_PREFIX: &str = "top.Show.showAR( this, '";
const ONCLICK_SUFFIX: &str = "', window );";

/// Substrings that classify a concept identifier as a marker row.
const AXIS_MARKER: &str = "Axis";
const ABSTRACT_MARKER: &str = "Abstract";

/// One data row of a report table.
#[derive(Debug, Clone, PartialEq)]
pub struct DataRow {
    /// Line-item label from the first cell.
    pub item: String,
    /// Concept identifier recovered from the row anchor (e.g.
    /// `defref_us-gaap_CashAndCashEquivalentsAtCarryingValue`).
    pub tag: String,
    /// Axis marker in effect when this row was read, or empty.
    pub axis: String,
    /// Abstract marker in effect when this row was read, or empty.
    pub abstract_marker: String,
    /// One value per date column, in column order.
    pub values: Vec<String>,
}

/// A fully reconstructed report table.
#[derive(Debug, Clone)]
pub struct ParsedReport {
    pub kind: StatementKind,
    /// Statement title from the first header cell.
    pub title: String,
    /// Duration label (e.g. "12 Months Ended"); duration-style reports only.
    pub duration: Option<String>,
    /// Date column labels, in column order.
    pub dates: Vec<String>,
    /// Data rows that passed the column-count check.
    pub rows: Vec<DataRow>,
    /// Rows dropped along the way.
    pub issues: Vec<ParseIssue>,
}

impl ParsedReport {
    /// Concept tags of the surviving rows, in row order.
    pub fn tags(&self) -> impl Iterator<Item = &str> {
        self.rows.iter().map(|r| r.tag.as_str())
    }
}

/// Recovers a concept identifier from a row anchor's `onclick` attribute.
///
/// The handler is a fixed-format string (`top.Show.showAR( this, '<id>',
/// window );`); anything else fails explicitly rather than being silently
/// truncated.
pub fn concept_from_onclick(onclick: &str) -> Result<String> {
    onclick
        .trim()
        .strip_prefix(ONCLICK_PREFIX)
        .and_then(|rest| rest.strip_suffix(ONCLICK_SUFFIX))
        .map(str::to_string)
        .ok_or_else(|| {
            ExtractError::InvalidFormat(format!("unrecognized report anchor handler: {}", onclick))
        })
}

/// Full text of a table cell with whitespace collapsed.
fn cell_text(cell: ElementRef<'_>) -> String {
    cell.text()
        .collect::<String>()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// Parses one report page into a [`ParsedReport`].
///
/// The parser is statement-kind-aware because the header layout differs:
/// balance sheets put the dates in the first header row, while duration-style
/// statements (income, cash flow) put a duration label there and the dates in
/// a second header row.
///
/// # Examples
///
/// ```ignore
/// use statementkit::parsing::report::ReportParser;
/// use statementkit::StatementKind;
///
/// let parser = ReportParser::new(StatementKind::BalanceSheet);
/// let report = parser.parse(&html)?;
/// println!("{} rows x {} dates", report.rows.len(), report.dates.len());
/// ```
pub struct ReportParser {
    kind: StatementKind,
}

impl ReportParser {
    pub fn new(kind: StatementKind) -> Self {
        Self { kind }
    }

    /// Parses raw HTML. See [`ReportParser::parse_document`].
    pub fn parse(&self, html: &str) -> Result<ParsedReport> {
        let document = Html::parse_document(html);
        self.parse_document(&document)
    }

    /// Parses an already-parsed document.
    ///
    /// Exposed separately so callers can reuse the same [`Html`] for concept
    /// metadata resolution, which lives in other blocks of the same page.
    ///
    /// # Errors
    ///
    /// `ExtractError::MalformedDocument` if the page has no table, no header
    /// row, or (duration-style) no dates row. Row-level defects do not error;
    /// they are recorded in [`ParsedReport::issues`].
    pub fn parse_document(&self, document: &Html) -> Result<ParsedReport> {
        let table_sel = Selector::parse("table").unwrap();
        let tr_sel = Selector::parse("tr").unwrap();
        let th_sel = Selector::parse("th").unwrap();
        let td_sel = Selector::parse("td").unwrap();
        let a_sel = Selector::parse("a").unwrap();

        let table = document.select(&table_sel).next().ok_or_else(|| {
            ExtractError::MalformedDocument("report page contains no table".to_string())
        })?;

        let mut title = String::new();
        let mut duration = None;
        let mut dates: Vec<String> = Vec::new();
        let mut rows: Vec<DataRow> = Vec::new();
        let mut issues: Vec<ParseIssue> = Vec::new();

        // Marker state carried across rows; scoped to this one parse call.
        let mut axis = String::new();
        let mut abstract_marker = String::new();

        let mut header_seen = false;
        let mut dates_seen = !self.kind.is_duration_style();

        for row in table.select(&tr_sel) {
            if !header_seen {
                let headers: Vec<String> = row.select(&th_sel).map(cell_text).collect();
                if headers.is_empty() {
                    return Err(ExtractError::MalformedDocument(
                        "report table has no header row".to_string(),
                    ));
                }
                title = headers[0].clone();
                if self.kind.is_duration_style() {
                    match headers.get(1) {
                        Some(label) => duration = Some(label.clone()),
                        None => issues.push(ParseIssue::new(
                            IssueKind::StructuralMismatch,
                            "header",
                            "duration-style header row has no duration cell",
                        )),
                    }
                } else {
                    dates = headers[1..].to_vec();
                }
                header_seen = true;
                continue;
            }

            if !dates_seen {
                // Second header row of a duration-style report; the title cell
                // spans both rows, so every th here is a date.
                dates = row.select(&th_sel).map(cell_text).collect();
                if dates.is_empty() {
                    return Err(ExtractError::MalformedDocument(
                        "duration-style report is missing its dates header row".to_string(),
                    ));
                }
                dates_seen = true;
                continue;
            }

            let cells: Vec<ElementRef> = row.select(&td_sel).collect();
            let Some(first) = cells.first() else {
                // Spacer or stray header row; nothing to extract.
                continue;
            };

            let Some(onclick) = first
                .select(&a_sel)
                .next()
                .and_then(|a| a.value().attr("onclick"))
            else {
                let subject = cell_text(*first);
                tracing::warn!("Dropping row '{}': no concept anchor", subject);
                issues.push(ParseIssue::new(
                    IssueKind::StructuralMismatch,
                    subject,
                    "row has no interactive concept anchor",
                ));
                continue;
            };

            let tag = match concept_from_onclick(onclick) {
                Ok(tag) => tag,
                Err(e) => {
                    let subject = cell_text(*first);
                    tracing::warn!("Dropping row '{}': {}", subject, e);
                    issues.push(ParseIssue::new(
                        IssueKind::StructuralMismatch,
                        subject,
                        e.to_string(),
                    ));
                    continue;
                }
            };

            // Marker rows set context for the rows below them and carry no
            // values themselves. Axis and abstract update independently.
            if tag.contains(AXIS_MARKER) {
                axis = tag;
                continue;
            }
            if tag.contains(ABSTRACT_MARKER) {
                abstract_marker = tag;
                continue;
            }

            let item = cell_text(*first);
            let values: Vec<String> = cells[1..].iter().map(|c| cell_text(*c)).collect();

            if values.len() != dates.len() {
                tracing::warn!(
                    "Dropping row '{}' ({}): expected {} value cells, found {}",
                    item,
                    tag,
                    dates.len(),
                    values.len()
                );
                issues.push(ParseIssue::new(
                    IssueKind::StructuralMismatch,
                    tag,
                    format!(
                        "expected {} value cells, found {}",
                        dates.len(),
                        values.len()
                    ),
                ));
                continue;
            }

            rows.push(DataRow {
                item,
                tag,
                axis: axis.clone(),
                abstract_marker: abstract_marker.clone(),
                values,
            });
        }

        if !header_seen {
            return Err(ExtractError::MalformedDocument(
                "report table has no rows".to_string(),
            ));
        }

        Ok(ParsedReport {
            kind: self.kind,
            title,
            duration,
            dates,
            rows,
            issues,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn anchor(tag: &str) -> String {
        format!(
            "<a class=\"a\" href=\"javascript:void(0);\" onclick=\"top.Show.showAR( this, '{}', window );\">x</a>",
            tag
        )
    }

    fn balance_sheet_html(body_rows: &str) -> String {
        format!(
            "<html><body><table class=\"report\">\
             <tr><th class=\"tl\">CONSOLIDATED BALANCE SHEETS - USD ($)</th>\
             <th class=\"th\">Dec. 31, 2020</th><th class=\"th\">Dec. 31, 2019</th></tr>\
             {}</table></body></html>",
            body_rows
        )
    }

    fn data_row(tag: &str, item: &str, values: &[&str]) -> String {
        let cells: String = values
            .iter()
            .map(|v| format!("<td class=\"nump\">{}</td>", v))
            .collect();
        format!("<tr><td class=\"pl\">{}{}</td>{}</tr>", anchor(tag), item, cells)
    }

    fn marker_row(tag: &str, label: &str) -> String {
        format!("<tr><td class=\"pl\">{}{}</td></tr>", anchor(tag), label)
    }

    #[test]
    fn test_concept_from_onclick() {
        let tag = concept_from_onclick(
            "top.Show.showAR( this, 'defref_us-gaap_CashAndCashEquivalentsAtCarryingValue', window );",
        )
        .unwrap();
        assert_eq!(tag, "defref_us-gaap_CashAndCashEquivalentsAtCarryingValue");
    }

    #[test]
    fn test_concept_from_onclick_rejects_other_handlers() {
        assert!(matches!(
            concept_from_onclick("toggleVisibility(this)"),
            Err(ExtractError::InvalidFormat(_))
        ));
        assert!(concept_from_onclick("top.Show.showAR( this, 'truncated").is_err());
        assert!(concept_from_onclick("").is_err());
    }

    #[test]
    fn test_balance_sheet_header_and_rows() {
        let html = balance_sheet_html(&data_row(
            "defref_us-gaap_Cash",
            "Cash and cash equivalents",
            &["$ 1,234", "$ 987"],
        ));
        let report = ReportParser::new(StatementKind::BalanceSheet)
            .parse(&html)
            .unwrap();

        assert_eq!(report.title, "CONSOLIDATED BALANCE SHEETS - USD ($)");
        assert_eq!(report.dates, vec!["Dec. 31, 2020", "Dec. 31, 2019"]);
        assert!(report.duration.is_none());
        assert_eq!(report.rows.len(), 1);
        assert_eq!(report.rows[0].item, "Cash and cash equivalents");
        assert_eq!(report.rows[0].tag, "defref_us-gaap_Cash");
        assert_eq!(report.rows[0].values, vec!["$ 1,234", "$ 987"]);
        assert!(report.issues.is_empty());
    }

    #[test]
    fn test_marker_carry_forward_is_independent() {
        // Sequence: Axis=A1, item, Abstract=B1, item, Axis=A2, item
        let body = [
            marker_row("defref_us-gaap_StatementClassOfStockAxis", "Class of Stock [Axis]"),
            data_row("defref_t_One", "One", &["1", "1"]),
            marker_row("defref_us-gaap_AssetsAbstract", "Assets [Abstract]"),
            data_row("defref_t_Two", "Two", &["2", "2"]),
            marker_row("defref_us-gaap_StatementScenarioAxis", "Scenario [Axis]"),
            data_row("defref_t_Three", "Three", &["3", "3"]),
        ]
        .join("");
        let report = ReportParser::new(StatementKind::BalanceSheet)
            .parse(&balance_sheet_html(&body))
            .unwrap();

        let axes: Vec<&str> = report.rows.iter().map(|r| r.axis.as_str()).collect();
        let abstracts: Vec<&str> = report
            .rows
            .iter()
            .map(|r| r.abstract_marker.as_str())
            .collect();

        assert_eq!(
            axes,
            vec![
                "defref_us-gaap_StatementClassOfStockAxis",
                "defref_us-gaap_StatementClassOfStockAxis",
                "defref_us-gaap_StatementScenarioAxis",
            ]
        );
        assert_eq!(
            abstracts,
            vec!["", "defref_us-gaap_AssetsAbstract", "defref_us-gaap_AssetsAbstract"]
        );
    }

    #[test]
    fn test_mismatched_row_is_dropped_not_fatal() {
        let body = [
            data_row("defref_t_Short", "Short row", &["only one value"]),
            data_row("defref_t_Good", "Good row", &["10", "20"]),
        ]
        .join("");
        let report = ReportParser::new(StatementKind::BalanceSheet)
            .parse(&balance_sheet_html(&body))
            .unwrap();

        assert_eq!(report.rows.len(), 1);
        assert_eq!(report.rows[0].tag, "defref_t_Good");
        assert_eq!(report.issues.len(), 1);
        assert_eq!(report.issues[0].kind, IssueKind::StructuralMismatch);
        assert_eq!(report.issues[0].subject, "defref_t_Short");
    }

    #[test]
    fn test_row_without_anchor_is_dropped() {
        let body = format!(
            "{}{}",
            "<tr><td class=\"pl\">No anchor here</td><td>1</td><td>2</td></tr>",
            data_row("defref_t_Good", "Good row", &["10", "20"]),
        );
        let report = ReportParser::new(StatementKind::BalanceSheet)
            .parse(&balance_sheet_html(&body))
            .unwrap();

        assert_eq!(report.rows.len(), 1);
        assert_eq!(report.issues.len(), 1);
        assert_eq!(report.issues[0].subject, "No anchor here");
    }

    #[test]
    fn test_duration_style_two_row_header() {
        let html = format!(
            "<table class=\"report\">\
             <tr><th class=\"tl\" rowspan=\"2\">CONSOLIDATED STATEMENTS OF OPERATIONS - USD ($)</th>\
             <th class=\"th\" colspan=\"2\">12 Months Ended</th></tr>\
             <tr><th class=\"th\">Dec. 31, 2020</th><th class=\"th\">Dec. 31, 2019</th></tr>\
             {}</table>",
            data_row("defref_us-gaap_Revenues", "Revenues", &["5,000", "4,000"])
        );
        let report = ReportParser::new(StatementKind::IncomeStatement)
            .parse(&html)
            .unwrap();

        assert_eq!(report.title, "CONSOLIDATED STATEMENTS OF OPERATIONS - USD ($)");
        assert_eq!(report.duration.as_deref(), Some("12 Months Ended"));
        assert_eq!(report.dates, vec!["Dec. 31, 2020", "Dec. 31, 2019"]);
        assert_eq!(report.rows.len(), 1);
        assert_eq!(report.rows[0].values, vec!["5,000", "4,000"]);
    }

    #[test]
    fn test_no_table_is_malformed() {
        let err = ReportParser::new(StatementKind::BalanceSheet)
            .parse("<html><body><p>nothing here</p></body></html>")
            .unwrap_err();
        assert!(matches!(err, ExtractError::MalformedDocument(_)));
    }

    #[test]
    fn test_missing_header_row_is_malformed() {
        let html = "<table><tr><td>data without headers</td></tr></table>";
        let err = ReportParser::new(StatementKind::BalanceSheet)
            .parse(html)
            .unwrap_err();
        assert!(matches!(err, ExtractError::MalformedDocument(_)));
    }

    #[test]
    fn test_duration_style_missing_dates_row_is_malformed() {
        let html = "<table>\
            <tr><th rowspan=\"2\">Title</th><th>12 Months Ended</th></tr>\
            <tr><td>not a header row</td></tr>\
            </table>";
        let err = ReportParser::new(StatementKind::CashFlowStatement)
            .parse(html)
            .unwrap_err();
        assert!(matches!(err, ExtractError::MalformedDocument(_)));
    }

    #[test]
    fn test_cell_text_collapses_markup_whitespace() {
        let html = balance_sheet_html(
            "<tr><td class=\"pl\"><a href=\"#\" onclick=\"top.Show.showAR( this, 'defref_t_X', window );\">\
             </a><span>Total  current</span>\n  <span>assets</span></td><td>1</td><td>2</td></tr>",
        );
        let report = ReportParser::new(StatementKind::BalanceSheet)
            .parse(&html)
            .unwrap();
        assert_eq!(report.rows[0].item, "Total current assets");
    }
}

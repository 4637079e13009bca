//! Filing summary parsing and statement location.
//!
//! Every XBRL filing directory contains a `FilingSummary.xml` that acts as a
//! manifest of the generated report pages ("R files"): one `<Report>` entry per
//! page, with a display title and the page filename. Statement identity is not
//! tagged anywhere in that manifest, so it has to be inferred from the report
//! titles, which vary across registrants ("Consolidated Balance Sheets",
//! "Statements of Financial Condition", ...). This module owns both the XML
//! model and that inference.
//!
//! Resolution is first-match-wins in catalog order. Filings occasionally carry
//! several plausible matches per statement (restated statements, parenthetical
//! sub-reports); the first non-excluded match is taken and later ones are
//! ignored. A kind with no match at all is left unresolved, which callers must
//! treat as a per-statement failure rather than a fatal one.

use crate::error::{ExtractError, Result};
use quick_xml::de::from_str;
use serde::{Deserialize, Serialize};

/// Parsed `FilingSummary.xml` document.
///
/// Only the subset of the manifest this crate consumes is modeled strictly;
/// the remaining scalar fields are kept optional because their presence varies
/// across filing years.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct FilingSummary {
    #[serde(default)]
    pub version: Option<String>,
    #[serde(default)]
    pub processing_time: Option<String>,
    #[serde(default)]
    pub report_format: Option<String>,
    #[serde(default)]
    pub context_count: Option<String>,
    #[serde(default)]
    pub element_count: Option<String>,
    #[serde(default)]
    pub entity_count: Option<String>,
    pub my_reports: MyReports,
    #[serde(default)]
    pub input_files: Option<InputFiles>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MyReports {
    #[serde(rename = "Report", default)]
    pub report: Vec<Report>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InputFiles {
    #[serde(rename = "File", default)]
    pub file: Vec<String>,
}

/// One generated report page listed in the filing summary.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Report {
    /// Instance document this report was generated from.
    #[serde(rename = "@instance", default)]
    pub instance: Option<String>,
    #[serde(default)]
    pub is_default: Option<String>,
    #[serde(default)]
    pub has_embedded_reports: Option<String>,
    /// Page filename relative to the filing directory (e.g. `R2.htm`).
    #[serde(default)]
    pub html_file_name: String,
    /// Display title used for statement matching.
    #[serde(default)]
    pub long_name: String,
    #[serde(default)]
    pub report_type: Option<String>,
    #[serde(default)]
    pub role: Option<String>,
    #[serde(default)]
    pub short_name: Option<String>,
    #[serde(default)]
    pub menu_category: Option<String>,
    #[serde(default)]
    pub position: Option<String>,
}

impl FilingSummary {
    /// Parses a `FilingSummary.xml` document from its text content.
    pub fn parse(content: &str) -> Result<Self> {
        Ok(from_str(content)?)
    }

    /// The report catalog, in document order.
    pub fn reports(&self) -> &[Report] {
        &self.my_reports.report
    }
}

/// The three financial statements this crate extracts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StatementKind {
    BalanceSheet,
    IncomeStatement,
    CashFlowStatement,
}

impl StatementKind {
    pub const ALL: [StatementKind; 3] = [
        StatementKind::BalanceSheet,
        StatementKind::IncomeStatement,
        StatementKind::CashFlowStatement,
    ];

    /// Lowercase title fragments that identify a report as this statement.
    ///
    /// Registrants title these pages inconsistently; the fragment lists cover
    /// the synonyms observed across 10-K/10-Q filings.
    pub fn name_fragments(&self) -> &'static [&'static str] {
        match self {
            StatementKind::BalanceSheet => &[
                "balance sheet",
                "statements of financial condition",
                "statements of condition",
            ],
            StatementKind::IncomeStatement => &[
                "statements of income",
                "statements of operation",
                "statement of income",
                "statements of earnings",
                "statements of comprehensive loss",
                "statement of operations and comprehensive loss",
            ],
            StatementKind::CashFlowStatement => {
                &["statements of cash flow", "statement of cash flow"]
            }
        }
    }

    /// Lowercase title fragments that disqualify an otherwise matching report.
    ///
    /// Balance sheets come with a "(Parenthetical)" companion page holding
    /// only the amounts disclosed in parentheses; it must not shadow the real
    /// statement.
    pub fn exclusion_fragments(&self) -> &'static [&'static str] {
        match self {
            StatementKind::BalanceSheet => &["parenthetical"],
            _ => &[],
        }
    }

    /// Whether the report's columns represent time periods rather than
    /// point-in-time balances. Duration-style reports carry an extra header
    /// row (see [`crate::parsing::report::ReportParser`]).
    pub fn is_duration_style(&self) -> bool {
        !matches!(self, StatementKind::BalanceSheet)
    }

    /// Case-insensitive title match: at least one name fragment, none of the
    /// exclusion fragments.
    pub fn matches_title(&self, title: &str) -> bool {
        let title = title.to_lowercase();
        self.name_fragments().iter().any(|f| title.contains(f))
            && !self.exclusion_fragments().iter().any(|f| title.contains(f))
    }
}

impl std::fmt::Display for StatementKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            StatementKind::BalanceSheet => "balance sheet",
            StatementKind::IncomeStatement => "income statement",
            StatementKind::CashFlowStatement => "cash flow statement",
        };
        write!(f, "{}", name)
    }
}

/// Resolved report page URLs, one per statement kind.
///
/// An unresolved kind is `None`; [`StatementUrls::require`] turns that into a
/// `StatementNotFound` error for callers that need a hard failure.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StatementUrls {
    pub balance_sheet: Option<String>,
    pub income_statement: Option<String>,
    pub cash_flow: Option<String>,
}

impl StatementUrls {
    pub fn get(&self, kind: StatementKind) -> Option<&str> {
        match kind {
            StatementKind::BalanceSheet => self.balance_sheet.as_deref(),
            StatementKind::IncomeStatement => self.income_statement.as_deref(),
            StatementKind::CashFlowStatement => self.cash_flow.as_deref(),
        }
    }

    pub fn require(&self, kind: StatementKind) -> Result<&str> {
        self.get(kind)
            .ok_or(ExtractError::StatementNotFound(kind))
    }

    fn slot_mut(&mut self, kind: StatementKind) -> &mut Option<String> {
        match kind {
            StatementKind::BalanceSheet => &mut self.balance_sheet,
            StatementKind::IncomeStatement => &mut self.income_statement,
            StatementKind::CashFlowStatement => &mut self.cash_flow,
        }
    }

    pub fn is_complete(&self) -> bool {
        StatementKind::ALL.iter().all(|k| self.get(*k).is_some())
    }
}

/// Finds the report page URL for each statement kind.
///
/// Scans the catalog in document order; the first report whose title matches a
/// kind claims it, and scanning stops early once all three kinds are resolved.
/// `base_url` is the filing directory URL the page filenames are relative to.
pub fn resolve_statement_urls(reports: &[Report], base_url: &str) -> StatementUrls {
    let base = base_url.trim_end_matches('/');
    let mut urls = StatementUrls::default();

    for report in reports {
        for kind in StatementKind::ALL {
            let slot = urls.slot_mut(kind);
            if slot.is_none() && kind.matches_title(&report.long_name) {
                tracing::debug!(
                    "Matched {} to report '{}' ({})",
                    kind,
                    report.long_name,
                    report.html_file_name
                );
                *slot = Some(format!("{}/{}", base, report.html_file_name));
            }
        }
        if urls.is_complete() {
            break;
        }
    }

    urls
}

#[cfg(test)]
mod tests {
    use super::*;

    fn report(long_name: &str, file: &str) -> Report {
        Report {
            long_name: long_name.to_string(),
            html_file_name: file.to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_kind_matching_synonyms() {
        assert!(StatementKind::BalanceSheet.matches_title("CONSOLIDATED BALANCE SHEETS"));
        assert!(StatementKind::BalanceSheet.matches_title("Statements of Financial Condition"));
        assert!(StatementKind::IncomeStatement.matches_title("Consolidated Statements of Operations"));
        assert!(StatementKind::IncomeStatement.matches_title("STATEMENTS OF EARNINGS"));
        assert!(StatementKind::CashFlowStatement.matches_title("Consolidated Statement of Cash Flows"));
        assert!(!StatementKind::CashFlowStatement.matches_title("Consolidated Balance Sheets"));
    }

    #[test]
    fn test_parenthetical_excluded_for_balance_sheet_only() {
        assert!(!StatementKind::BalanceSheet.matches_title("Consolidated Balance Sheets (Parenthetical)"));
        // Exclusion list is scoped to the balance sheet
        assert!(
            StatementKind::IncomeStatement
                .matches_title("Consolidated Statements of Income (Parenthetical)")
        );
    }

    #[test]
    fn test_first_match_wins() {
        let reports = vec![
            report("0001 - Document - Cover Page", "R1.htm"),
            report("0002 - Statement - Consolidated Statements of Income", "R2.htm"),
            report("0003 - Statement - Condensed Statements of Income", "R3.htm"),
        ];
        let urls = resolve_statement_urls(&reports, "https://www.sec.gov/Archives/edgar/data/1/2");
        assert_eq!(
            urls.income_statement.as_deref(),
            Some("https://www.sec.gov/Archives/edgar/data/1/2/R2.htm")
        );
    }

    #[test]
    fn test_parenthetical_report_skipped() {
        let reports = vec![
            report("Consolidated Balance Sheets (Parenthetical)", "R3.htm"),
            report("Consolidated Balance Sheets", "R2.htm"),
        ];
        let urls = resolve_statement_urls(&reports, "https://example.test/filing/");
        assert_eq!(
            urls.balance_sheet.as_deref(),
            Some("https://example.test/filing/R2.htm")
        );
    }

    #[test]
    fn test_unresolved_kind_is_absent() {
        let reports = vec![report("Consolidated Balance Sheets", "R2.htm")];
        let urls = resolve_statement_urls(&reports, "https://example.test/filing");
        assert!(urls.balance_sheet.is_some());
        assert!(urls.cash_flow.is_none());
        assert!(matches!(
            urls.require(StatementKind::CashFlowStatement),
            Err(ExtractError::StatementNotFound(StatementKind::CashFlowStatement))
        ));
    }

    #[test]
    fn test_parse_minimal_summary() {
        let xml = r#"<?xml version="1.0" encoding="utf-8"?>
<FilingSummary>
  <Version>3.22.4</Version>
  <ReportFormat>Html</ReportFormat>
  <MyReports>
    <Report instance="acme-20201231.htm">
      <IsDefault>false</IsDefault>
      <HtmlFileName>R2.htm</HtmlFileName>
      <LongName>0000002 - Statement - CONSOLIDATED BALANCE SHEETS</LongName>
      <ReportType>Sheet</ReportType>
      <ShortName>CONSOLIDATED BALANCE SHEETS</ShortName>
      <MenuCategory>Statements</MenuCategory>
      <Position>2</Position>
    </Report>
  </MyReports>
</FilingSummary>"#;
        let summary = FilingSummary::parse(xml).unwrap();
        assert_eq!(summary.reports().len(), 1);
        assert_eq!(summary.reports()[0].html_file_name, "R2.htm");
        assert_eq!(summary.reports()[0].instance.as_deref(), Some("acme-20201231.htm"));
        assert_eq!(summary.version.as_deref(), Some("3.22.4"));
    }

    #[test]
    fn test_parse_invalid_xml() {
        assert!(FilingSummary::parse("not xml at all").is_err());
    }
}

//! Filing-level statement extraction.
//!
//! This module ties the pipeline together: resolve the report page for each
//! statement kind from `FilingSummary.xml`, parse the report table, resolve
//! concept metadata from the same page, and assemble flat records. A filing
//! where one statement is missing or malformed still yields the others; the
//! failure is reported on [`FilingStatements::issues`] instead of aborting.

use crate::core::EdgarClient;
use crate::error::{ExtractError, IssueKind, Result, StatementIssue};
use crate::parsing::concepts::resolve_concepts;
use crate::parsing::report::ReportParser;
use crate::records::{
    BalanceSheetItem, FilingContext, IncomeOrCashFlowStatementItem, assemble_balance_sheet,
    assemble_income_or_cash_flow,
};
use crate::summary::{FilingSummary, StatementKind, StatementUrls, resolve_statement_urls};
use crate::traits::StatementOperations;
use async_trait::async_trait;
use scraper::Html;
use tracing::{debug, warn};

/// Everything extracted from one filing.
///
/// A `None` statement means it could not be extracted; the reason is among
/// [`FilingStatements::issues`]. Row-level issues from statements that did
/// extract are collected there too.
#[derive(Debug)]
pub struct FilingStatements {
    pub context: FilingContext,
    pub balance_sheet: Option<Vec<BalanceSheetItem>>,
    pub income_statement: Option<Vec<IncomeOrCashFlowStatementItem>>,
    pub cash_flow: Option<Vec<IncomeOrCashFlowStatementItem>>,
    pub issues: Vec<StatementIssue>,
}

impl FilingStatements {
    fn new(context: FilingContext) -> Self {
        Self {
            context,
            balance_sheet: None,
            income_statement: None,
            cash_flow: None,
            issues: Vec::new(),
        }
    }

    /// True if at least one statement was extracted.
    pub fn has_any(&self) -> bool {
        self.balance_sheet.is_some() || self.income_statement.is_some() || self.cash_flow.is_some()
    }

    fn record_unavailable(&mut self, statement: StatementKind, err: &ExtractError) {
        warn!(
            cik = %self.context.cik,
            year = self.context.year,
            %statement,
            error = %err,
            "statement unavailable"
        );
        self.issues.push(StatementIssue {
            statement,
            kind: IssueKind::StatementUnavailable,
            subject: statement.to_string(),
            detail: err.to_string(),
        });
    }
}

/// Extracts balance sheet records from a report page document.
///
/// The defref concept blocks live on the same page as the table, so a single
/// parsed document serves both passes.
pub fn balance_sheet_from_document(
    document: &Html,
    context: &FilingContext,
) -> Result<(Vec<BalanceSheetItem>, Vec<StatementIssue>)> {
    let kind = StatementKind::BalanceSheet;
    let mut report = ReportParser::new(kind).parse_document(document)?;
    let (metadata, concept_issues) = resolve_concepts(document, report.tags());
    let records = assemble_balance_sheet(&report, &metadata, context);

    let mut issues = Vec::with_capacity(report.issues.len() + concept_issues.len());
    issues.extend(
        report
            .issues
            .drain(..)
            .map(|issue| StatementIssue::from_parse(kind, issue)),
    );
    issues.extend(
        concept_issues
            .into_iter()
            .map(|issue| StatementIssue::from_parse(kind, issue)),
    );
    Ok((records, issues))
}

/// Extracts income statement or cash-flow statement records from a report
/// page document. `kind` must be one of the two duration-style kinds.
pub fn income_or_cash_flow_from_document(
    kind: StatementKind,
    document: &Html,
    context: &FilingContext,
) -> Result<(Vec<IncomeOrCashFlowStatementItem>, Vec<StatementIssue>)> {
    debug_assert!(kind.is_duration_style());
    let mut report = ReportParser::new(kind).parse_document(document)?;
    let (metadata, concept_issues) = resolve_concepts(document, report.tags());
    let records = assemble_income_or_cash_flow(&report, &metadata, context);

    let mut issues = Vec::with_capacity(report.issues.len() + concept_issues.len());
    issues.extend(
        report
            .issues
            .drain(..)
            .map(|issue| StatementIssue::from_parse(kind, issue)),
    );
    issues.extend(
        concept_issues
            .into_iter()
            .map(|issue| StatementIssue::from_parse(kind, issue)),
    );
    Ok((records, issues))
}

/// [`balance_sheet_from_document`] over raw HTML.
pub fn balance_sheet_from_str(
    html: &str,
    context: &FilingContext,
) -> Result<(Vec<BalanceSheetItem>, Vec<StatementIssue>)> {
    let document = Html::parse_document(html);
    balance_sheet_from_document(&document, context)
}

/// [`income_or_cash_flow_from_document`] over raw HTML.
pub fn income_or_cash_flow_from_str(
    kind: StatementKind,
    html: &str,
    context: &FilingContext,
) -> Result<(Vec<IncomeOrCashFlowStatementItem>, Vec<StatementIssue>)> {
    let document = Html::parse_document(html);
    income_or_cash_flow_from_document(kind, &document, context)
}

async fn fetch_statement(
    client: &EdgarClient,
    urls: &StatementUrls,
    kind: StatementKind,
) -> Result<String> {
    let url = urls.require(kind)?;
    debug!(%kind, url, "fetching statement report page");
    client.get(url).await
}

/// Statement operations for a single filing directory.
///
/// # Examples
///
/// ```ignore
/// use statementkit::{EdgarClient, FilingContext, Quarter, StatementOperations};
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let client = EdgarClient::new("MyApp contact@example.com")?;
///     let context = FilingContext::new(2020, Quarter::Q4, "320193");
///
///     let statements = client
///         .extract_statements(
///             "https://www.sec.gov/Archives/edgar/data/320193/000032019320000096",
///             &context,
///         )
///         .await?;
///
///     if let Some(records) = &statements.balance_sheet {
///         println!("{} balance sheet records", records.len());
///     }
///     Ok(())
/// }
/// ```
#[async_trait]
impl StatementOperations for EdgarClient {
    /// Downloads and parses `FilingSummary.xml` from a filing directory.
    ///
    /// # Errors
    /// * `ExtractError::NotFound` if the filing has no summary document
    /// * `ExtractError::XmlError` if it does not deserialize
    async fn filing_summary(&self, filing_dir_url: &str) -> Result<FilingSummary> {
        let url = format!(
            "{}/FilingSummary.xml",
            filing_dir_url.trim_end_matches('/')
        );
        let content = self.get(&url).await?;
        FilingSummary::parse(&content)
    }

    /// Extracts every available core statement from a filing directory.
    ///
    /// Fails only when the filing summary itself cannot be fetched or
    /// parsed; individual statements that are missing or malformed are
    /// skipped and reported as issues.
    async fn extract_statements(
        &self,
        filing_dir_url: &str,
        context: &FilingContext,
    ) -> Result<FilingStatements> {
        let summary = self.filing_summary(filing_dir_url).await?;
        let urls = resolve_statement_urls(summary.reports(), filing_dir_url);
        let mut result = FilingStatements::new(context.clone());

        match fetch_statement(self, &urls, StatementKind::BalanceSheet).await {
            Ok(html) => {
                let document = Html::parse_document(&html);
                match balance_sheet_from_document(&document, context) {
                    Ok((records, issues)) => {
                        result.balance_sheet = Some(records);
                        result.issues.extend(issues);
                    }
                    Err(err) => result.record_unavailable(StatementKind::BalanceSheet, &err),
                }
            }
            Err(err) => result.record_unavailable(StatementKind::BalanceSheet, &err),
        }

        for kind in [
            StatementKind::IncomeStatement,
            StatementKind::CashFlowStatement,
        ] {
            match fetch_statement(self, &urls, kind).await {
                Ok(html) => {
                    let document = Html::parse_document(&html);
                    match income_or_cash_flow_from_document(kind, &document, context) {
                        Ok((records, issues)) => {
                            match kind {
                                StatementKind::IncomeStatement => {
                                    result.income_statement = Some(records);
                                }
                                _ => result.cash_flow = Some(records),
                            }
                            result.issues.extend(issues);
                        }
                        Err(err) => result.record_unavailable(kind, &err),
                    }
                }
                Err(err) => result.record_unavailable(kind, &err),
            }
        }

        Ok(result)
    }
}

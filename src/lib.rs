//! # StatementKit - Financial statement extraction from SEC EDGAR filings
//!
//! StatementKit turns the XBRL-tagged report pages of an EDGAR filing into
//! flat, analytics-ready records. It locates the balance sheet, income
//! statement, and cash-flow statement inside a filing, parses their rendered
//! report tables, and joins each line item with its XBRL concept metadata
//! (definition, data type, balance type, period type).
//!
//! ## Features
//!
//! - **Rate-limited HTTP client** - Complies with SEC.gov fair access rules
//! - **Index operations** - Discover XBRL filings from the quarterly full-index
//! - **Statement location** - Resolve report pages from `FilingSummary.xml`
//! - **Table extraction** - Multi-row headers, axis/abstract markers, concept
//!   anchors
//! - **Record assembly** - One record per line item per reporting date, with
//!   CSV export
//!
//! ## Requirements
//!
//! StatementKit is an async-first library and requires an async runtime. We
//! recommend [tokio](https://tokio.rs), which is the most widely used async
//! runtime in the Rust ecosystem.
//!
//! ## Basic Usage
//!
//! ```ignore
//! use statementkit::{
//!     EdgarClient, FilingContext, FilingPeriod, IndexOperations, IndexOptions,
//!     Quarter, StatementOperations,
//! };
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // Initialize with a proper user agent (required by SEC.gov)
//!     let client = EdgarClient::new("YourAppName contact@example.com")?;
//!
//!     // Find 10-K and 10-Q filings for a quarter
//!     let period = FilingPeriod::new(2020, Quarter::Q4)?;
//!     let filings = client
//!         .xbrl_filings(period, Some(IndexOptions::financial_statements()))
//!         .await?;
//!
//!     // Extract the statements of the first filing
//!     if let Some(filing) = filings.first() {
//!         let context = FilingContext::new(2020, Quarter::Q4, filing.cik.to_string());
//!         let url = filing.filing_directory_url(client.archives_url());
//!         let statements = client.extract_statements(&url, &context).await?;
//!
//!         if let Some(records) = &statements.balance_sheet {
//!             println!("{} balance sheet records", records.len());
//!         }
//!     }
//!
//!     Ok(())
//! }
//! ```

mod config;
mod core;
mod error;
mod index;
mod records;
mod statements;
mod summary;
mod traits;
pub mod parsing;

pub use config::{ClientConfig, EdgarUrls};
pub use core::EdgarClient;
pub use error::{ExtractError, IssueKind, ParseIssue, Result, StatementIssue};

pub use index::{
    DirectoryListing, FilingPeriod, IndexEntry, IndexOptions, Quarter, parse_xbrl_index,
};
pub use records::{
    BalanceSheetItem, FilingContext, IncomeOrCashFlowStatementItem, assemble_balance_sheet,
    assemble_income_or_cash_flow, to_csv_string, write_csv,
};
pub use statements::{
    FilingStatements, balance_sheet_from_str, income_or_cash_flow_from_str,
};
pub use summary::{
    FilingSummary, Report, StatementKind, StatementUrls, resolve_statement_urls,
};

pub use traits::{IndexOperations, StatementOperations};

/// Current crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

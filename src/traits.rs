//! Operation traits implemented by [`EdgarClient`](crate::EdgarClient).
//!
//! Splitting the client surface into traits keeps each concern importable on
//! its own and lets callers mock an operation set in tests without standing
//! up a real client.

use crate::error::Result;
use crate::index::{DirectoryListing, FilingPeriod, IndexEntry, IndexOptions, Quarter};
use crate::records::FilingContext;
use crate::statements::FilingStatements;
use crate::summary::FilingSummary;
use async_trait::async_trait;

/// Operations against the EDGAR full-index tree.
#[async_trait]
pub trait IndexOperations {
    /// Downloads the quarterly XBRL index (`xbrl.gz`) and returns its
    /// entries, optionally filtered.
    async fn xbrl_filings(
        &self,
        period: FilingPeriod,
        options: Option<IndexOptions>,
    ) -> Result<Vec<IndexEntry>>;

    /// Fetches the `index.json` directory listing for the full-index tree,
    /// optionally scoped to a year or a year + quarter.
    async fn index_listing(
        &self,
        year: Option<i32>,
        quarter: Option<Quarter>,
    ) -> Result<DirectoryListing>;
}

/// Operations for locating and extracting financial statements from a single
/// filing.
#[async_trait]
pub trait StatementOperations {
    /// Downloads and parses `FilingSummary.xml` from a filing directory.
    async fn filing_summary(&self, filing_dir_url: &str) -> Result<FilingSummary>;

    /// Extracts every available core statement from a filing directory.
    ///
    /// Statements that cannot be located or parsed are reported as issues on
    /// the result rather than failing the whole filing.
    async fn extract_statements(
        &self,
        filing_dir_url: &str,
        context: &FilingContext,
    ) -> Result<FilingStatements>;
}

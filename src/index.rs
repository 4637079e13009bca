//! Quarterly XBRL filing indices.
//!
//! EDGAR publishes a quarterly `xbrl.gz` index listing every XBRL-tagged
//! filing in that quarter as pipe-delimited records
//! (`CIK|Company Name|Form Type|Date Filed|Filename`). This is the discovery
//! side of the pipeline: filter the index to 10-K/10-Q entries, derive each
//! filing's directory URL from its accession number, and hand those URLs to
//! [`StatementOperations`](crate::StatementOperations).
//!
//! The SEC also exposes `index.json` directory listings at each level of the
//! full-index tree, which is how callers enumerate available years and
//! quarters without guessing.

use super::core::EdgarClient;
use super::error::{ExtractError, Result};
use super::traits::IndexOperations;
use async_trait::async_trait;
use chrono::Datelike;
use flate2::read::GzDecoder;
use serde::{Deserialize, Serialize};
use std::io::Read;

/// XBRL indices exist from 2005 onwards.
const FIRST_XBRL_YEAR: i32 = 2005;

/// Fiscal quarter (Q1-Q4). Index directories are grouped as `QTR1`..`QTR4`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Quarter {
    Q1 = 1,
    Q2 = 2,
    Q3 = 3,
    Q4 = 4,
}

impl Quarter {
    /// Creates a Quarter from a month number (1-12).
    pub fn from_month(month: u32) -> Result<Self> {
        match month {
            1..=3 => Ok(Quarter::Q1),
            4..=6 => Ok(Quarter::Q2),
            7..=9 => Ok(Quarter::Q3),
            10..=12 => Ok(Quarter::Q4),
            _ => Err(ExtractError::InvalidQuarter),
        }
    }

    /// Creates a Quarter from its number (1-4).
    pub fn from_number(quarter: u32) -> Result<Self> {
        match quarter {
            1 => Ok(Quarter::Q1),
            2 => Ok(Quarter::Q2),
            3 => Ok(Quarter::Q3),
            4 => Ok(Quarter::Q4),
            _ => Err(ExtractError::InvalidQuarter),
        }
    }

    pub fn as_i32(&self) -> i32 {
        *self as i32
    }

    /// Directory name used by EDGAR (`QTR1`..`QTR4`).
    pub fn dir_name(&self) -> String {
        format!("QTR{}", self.as_i32())
    }
}

/// A year + quarter locating one quarterly XBRL index.
#[derive(Debug, Clone, Copy)]
pub struct FilingPeriod {
    year: i32,
    quarter: Quarter,
}

impl FilingPeriod {
    /// Creates a new period (year must be 2005 or greater; XBRL indices do
    /// not exist before that).
    pub fn new(year: i32, quarter: Quarter) -> Result<Self> {
        if year < FIRST_XBRL_YEAR {
            return Err(ExtractError::InvalidXbrlYear);
        }
        Ok(Self { year, quarter })
    }

    /// The period containing today's date.
    pub fn current() -> Self {
        let now = chrono::Local::now();
        Self {
            year: now.year(),
            // Month is always 1-12 here
            quarter: Quarter::from_month(now.month()).unwrap(),
        }
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn quarter(&self) -> Quarter {
        self.quarter
    }
}

/// SEC `index.json` directory listing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DirectoryListing {
    pub directory: Directory,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Directory {
    /// Directory items (files and subdirectories).
    pub item: Vec<DirectoryItem>,

    /// Directory name (typically ends with a trailing `/`).
    pub name: String,

    /// Parent directory path as reported by the SEC listing.
    #[serde(rename = "parent-dir")]
    pub parent_dir: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DirectoryItem {
    /// Last modified timestamp, as formatted by the SEC listing.
    #[serde(rename = "last-modified")]
    pub last_modified: String,

    /// Item name (filename or directory name).
    pub name: String,

    /// `"dir"` or `"file"`.
    #[serde(rename = "type")]
    pub type_: String,

    /// Relative URL path.
    pub href: String,

    /// File size (human-readable, as provided by the SEC listing).
    pub size: String,
}

/// One filing listed in a quarterly XBRL index.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexEntry {
    pub cik: u64,
    pub company_name: String,
    pub form_type: String,
    pub date_filed: String,
    /// Path of the complete-filing text file, relative to the archives root
    /// (e.g. `edgar/data/1000045/0000950170-23-002704.txt`).
    pub filing_path: String,
}

impl IndexEntry {
    /// Derives the filing's directory URL from its text-file path.
    ///
    /// The directory name is the accession number with its hyphens removed
    /// and the `.txt` suffix dropped:
    /// `edgar/data/1/0000950170-23-002704.txt` becomes
    /// `<archives>/edgar/data/1/000095017023002704`.
    pub fn filing_directory_url(&self, archives_url: &str) -> String {
        let path = self.filing_path.replacen('-', "", 2);
        let path = path.strip_suffix(".txt").unwrap_or(&path);
        format!("{}/{}", archives_url.trim_end_matches('/'), path)
    }
}

/// Filters applied to parsed index entries.
#[derive(Debug, Clone, Default)]
pub struct IndexOptions {
    pub form_types: Option<Vec<String>>,
    pub ciks: Option<Vec<u64>>,
    pub offset: Option<usize>,
    pub limit: Option<usize>,
}

impl IndexOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Keeps only the annual and quarterly reports (10-K, 10-Q), the forms
    /// that carry full financial statements.
    pub fn financial_statements() -> Self {
        Self::new().with_form_types(vec!["10-K".to_string(), "10-Q".to_string()])
    }

    pub fn with_form_type(mut self, form_type: impl Into<String>) -> Self {
        self.form_types = Some(vec![form_type.into()]);
        self
    }

    pub fn with_form_types(mut self, form_types: Vec<String>) -> Self {
        self.form_types = Some(form_types);
        self
    }

    pub fn with_cik(mut self, cik: u64) -> Self {
        self.ciks = Some(vec![cik]);
        self
    }

    pub fn with_offset(mut self, offset: usize) -> Self {
        self.offset = Some(offset);
        self
    }

    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }
}

/// Parses the text of a quarterly XBRL index into entries.
///
/// The header block is skipped by scanning for the dashed separator line;
/// lines that do not split into the five expected fields, or whose CIK is not
/// numeric, are skipped with a warning rather than failing the whole index.
pub fn parse_xbrl_index(content: &str) -> Vec<IndexEntry> {
    const SEPARATOR: &str = "---";

    let mut entries = Vec::new();
    let mut in_body = false;

    for line in content.lines() {
        if !in_body {
            if line.contains(SEPARATOR) {
                in_body = true;
            }
            continue;
        }
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        let fields: Vec<&str> = line.split('|').map(str::trim).collect();
        if fields.len() < 5 {
            tracing::warn!("Skipping short index line: {}", line);
            continue;
        }

        let Ok(cik) = fields[0].trim_start_matches('0').parse::<u64>() else {
            tracing::warn!("Skipping index line with non-numeric CIK: {}", line);
            continue;
        };

        entries.push(IndexEntry {
            cik,
            company_name: fields[1].to_string(),
            form_type: fields[2].to_string(),
            date_filed: fields[3].to_string(),
            filing_path: fields[4].to_string(),
        });
    }

    entries
}

fn apply_filters(mut entries: Vec<IndexEntry>, opts: &IndexOptions) -> Vec<IndexEntry> {
    if let Some(ref form_types) = opts.form_types {
        entries.retain(|entry| form_types.iter().any(|ft| ft == &entry.form_type));
    }
    if let Some(ref ciks) = opts.ciks {
        entries.retain(|entry| ciks.contains(&entry.cik));
    }
    if let Some(offset) = opts.offset {
        entries = entries.into_iter().skip(offset).collect();
    }
    if let Some(limit) = opts.limit {
        entries.truncate(limit);
    }
    entries
}

/// Decompresses a gzipped index file into text.
fn gunzip(content: &[u8]) -> Result<String> {
    let mut decoder = GzDecoder::new(content);
    let mut result = String::new();
    decoder.read_to_string(&mut result)?;
    Ok(result)
}

/// Index operations for the EDGAR full-index tree.
///
/// # Examples
///
/// ```ignore
/// use statementkit::{EdgarClient, FilingPeriod, IndexOperations, IndexOptions, Quarter};
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let client = EdgarClient::new("MyApp contact@example.com")?;
///
///     let period = FilingPeriod::new(2020, Quarter::Q1)?;
///     let filings = client
///         .xbrl_filings(period, Some(IndexOptions::financial_statements()))
///         .await?;
///
///     for filing in &filings {
///         println!("{} {} {}", filing.cik, filing.form_type, filing.date_filed);
///     }
///     Ok(())
/// }
/// ```
#[async_trait]
impl IndexOperations for EdgarClient {
    /// Downloads and parses the quarterly XBRL index, applying any filters
    /// in-memory after parsing.
    ///
    /// # Errors
    /// * `ExtractError::InvalidXbrlYear` via [`FilingPeriod::new`]
    /// * `ExtractError::NotFound` if the index file does not exist yet
    /// * `ExtractError::RequestError` for network issues
    async fn xbrl_filings(
        &self,
        period: FilingPeriod,
        options: Option<IndexOptions>,
    ) -> Result<Vec<IndexEntry>> {
        let url = format!(
            "{}/{}/{}/xbrl.gz",
            self.edgar_full_index_url,
            period.year(),
            period.quarter().dir_name()
        );
        let bytes = self.get_bytes(&url).await?;
        let content = gunzip(&bytes)?;
        let mut entries = parse_xbrl_index(&content);

        if let Some(opts) = options {
            entries = apply_filters(entries, &opts);
        }

        Ok(entries)
    }

    /// Fetches the `index.json` directory listing for the full-index tree,
    /// optionally scoped to a year or a year + quarter.
    async fn index_listing(
        &self,
        year: Option<i32>,
        quarter: Option<Quarter>,
    ) -> Result<DirectoryListing> {
        if let Some(y) = year {
            if y < 1994 {
                return Err(ExtractError::InvalidYear);
            }
        }
        let url = match (year, quarter) {
            (None, _) => format!("{}/index.json", self.edgar_full_index_url),
            (Some(y), None) => format!("{}/{}/index.json", self.edgar_full_index_url, y),
            (Some(y), Some(q)) => format!(
                "{}/{}/{}/index.json",
                self.edgar_full_index_url,
                y,
                q.dir_name()
            ),
        };
        let response = self.get(&url).await?;
        Ok(serde_json::from_str(&response)?)
    }
}

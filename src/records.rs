//! Output records and record assembly.
//!
//! The assemblers flatten one parsed report into analytics-ready rows: one
//! record per (line item, date column) pair, enriched with the filing context
//! and the item's concept metadata. Iteration is date-major then item-minor,
//! matching the source table's visual layout; downstream consumers rely on
//! that ordering being stable.
//!
//! Field names are serde-renamed to the warehouse column names so a record
//! batch can be handed to any columnar sink (or flattened to CSV with
//! [`write_csv`]) without a mapping layer.

use crate::error::Result;
use crate::index::Quarter;
use crate::parsing::concepts::ConceptMetadata;
use crate::parsing::report::ParsedReport;
use serde::Serialize;
use std::collections::HashMap;
use std::io::Write;

/// The filing a batch of records came from.
#[derive(Debug, Clone)]
pub struct FilingContext {
    pub year: i32,
    pub quarter: Quarter,
    /// SEC Central Index Key of the registrant.
    pub cik: String,
}

impl FilingContext {
    pub fn new(year: i32, quarter: Quarter, cik: impl Into<String>) -> Self {
        Self {
            year,
            quarter,
            cik: cik.into(),
        }
    }
}

/// One balance sheet line item at one reporting date.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct BalanceSheetItem {
    #[serde(rename = "Year")]
    pub year: i32,
    #[serde(rename = "Quarter")]
    pub quarter: i32,
    #[serde(rename = "CIK")]
    pub cik: String,
    #[serde(rename = "Title")]
    pub title: String,
    #[serde(rename = "Date")]
    pub date: String,
    #[serde(rename = "Item")]
    pub item: String,
    #[serde(rename = "Value")]
    pub value: String,
    #[serde(rename = "Axis")]
    pub axis: String,
    #[serde(rename = "Abstract")]
    pub abstract_marker: String,
    #[serde(rename = "Tag")]
    pub tag: String,
    #[serde(rename = "Definition")]
    pub definition: String,
    #[serde(rename = "DataType")]
    pub data_type: String,
    #[serde(rename = "BalanceType")]
    pub balance_type: String,
    #[serde(rename = "PeriodType")]
    pub period_type: String,
}

/// One income or cash-flow statement line item for one reported period.
///
/// Identical to [`BalanceSheetItem`] except for the extra duration label
/// ("12 Months Ended", ...) that qualifies each date column.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct IncomeOrCashFlowStatementItem {
    #[serde(rename = "Year")]
    pub year: i32,
    #[serde(rename = "Quarter")]
    pub quarter: i32,
    #[serde(rename = "CIK")]
    pub cik: String,
    #[serde(rename = "Title")]
    pub title: String,
    #[serde(rename = "Date")]
    pub date: String,
    #[serde(rename = "Item")]
    pub item: String,
    #[serde(rename = "Value")]
    pub value: String,
    #[serde(rename = "Duration")]
    pub duration: String,
    #[serde(rename = "Axis")]
    pub axis: String,
    #[serde(rename = "Abstract")]
    pub abstract_marker: String,
    #[serde(rename = "Tag")]
    pub tag: String,
    #[serde(rename = "Definition")]
    pub definition: String,
    #[serde(rename = "DataType")]
    pub data_type: String,
    #[serde(rename = "BalanceType")]
    pub balance_type: String,
    #[serde(rename = "PeriodType")]
    pub period_type: String,
}

/// Assembles balance sheet records: the rows-by-dates cross product in
/// date-major, item-minor order.
///
/// Tags missing from `metadata` produce records with empty metadata fields;
/// the resolver has already recorded those gaps as issues.
pub fn assemble_balance_sheet(
    report: &ParsedReport,
    metadata: &HashMap<String, ConceptMetadata>,
    ctx: &FilingContext,
) -> Vec<BalanceSheetItem> {
    let empty = ConceptMetadata::default();
    let mut records = Vec::with_capacity(report.rows.len() * report.dates.len());

    for (ii, date) in report.dates.iter().enumerate() {
        for row in &report.rows {
            let meta = metadata.get(&row.tag).unwrap_or(&empty);
            records.push(BalanceSheetItem {
                year: ctx.year,
                quarter: ctx.quarter.as_i32(),
                cik: ctx.cik.clone(),
                title: report.title.clone(),
                date: date.clone(),
                item: row.item.clone(),
                value: row.values[ii].clone(),
                axis: row.axis.clone(),
                abstract_marker: row.abstract_marker.clone(),
                tag: row.tag.clone(),
                definition: meta.definition.clone(),
                data_type: meta.data_type.clone(),
                balance_type: meta.balance_type.clone(),
                period_type: meta.period_type.clone(),
            });
        }
    }

    records
}

/// Assembles income or cash-flow statement records; same shape as
/// [`assemble_balance_sheet`] plus the report's duration label on every
/// record.
pub fn assemble_income_or_cash_flow(
    report: &ParsedReport,
    metadata: &HashMap<String, ConceptMetadata>,
    ctx: &FilingContext,
) -> Vec<IncomeOrCashFlowStatementItem> {
    let empty = ConceptMetadata::default();
    let duration = report.duration.clone().unwrap_or_default();
    let mut records = Vec::with_capacity(report.rows.len() * report.dates.len());

    for (ii, date) in report.dates.iter().enumerate() {
        for row in &report.rows {
            let meta = metadata.get(&row.tag).unwrap_or(&empty);
            records.push(IncomeOrCashFlowStatementItem {
                year: ctx.year,
                quarter: ctx.quarter.as_i32(),
                cik: ctx.cik.clone(),
                title: report.title.clone(),
                date: date.clone(),
                item: row.item.clone(),
                value: row.values[ii].clone(),
                duration: duration.clone(),
                axis: row.axis.clone(),
                abstract_marker: row.abstract_marker.clone(),
                tag: row.tag.clone(),
                definition: meta.definition.clone(),
                data_type: meta.data_type.clone(),
                balance_type: meta.balance_type.clone(),
                period_type: meta.period_type.clone(),
            });
        }
    }

    records
}

/// Flattens a record batch into delimited text (CSV with a header row),
/// suitable for a direct-download response body.
pub fn write_csv<W: Write, S: Serialize>(records: &[S], writer: W) -> Result<()> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    for record in records {
        csv_writer.serialize(record)?;
    }
    csv_writer.flush()?;
    Ok(())
}

/// [`write_csv`] into an owned string.
pub fn to_csv_string<S: Serialize>(records: &[S]) -> Result<String> {
    let mut buf = Vec::new();
    write_csv(records, &mut buf)?;
    Ok(String::from_utf8(buf)?)
}

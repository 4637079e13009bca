//! Concept metadata resolution.
//!
//! Report pages embed a hidden definition block per referenced concept: a
//! table whose `id` is the concept tag, holding the authoritative definition
//! paragraph and a small property table (data type, balance type, period
//! type). The block's layout is positional, not named, so all knowledge of
//! the positions lives in one decoder ([`decode_concept_block`]) instead of
//! being scattered through the lookup code.
//!
//! A tag with no block, or a block that does not match the expected layout,
//! yields empty metadata plus a [`ParseIssue`] for that tag only; resolution
//! of the remaining tags continues.

use crate::error::{IssueKind, ParseIssue};
use scraper::{ElementRef, Html, Selector};
use std::collections::HashMap;

/// Definition-block property table layout: the third `div` under `div.body`
/// holds the property table, and these are the row indices whose second cell
/// carries each value.
const DETAILS_DIV_INDEX: usize = 2;
const DATA_TYPE_ROW: usize = 2;
const BALANCE_TYPE_ROW: usize = 3;
const PERIOD_TYPE_ROW: usize = 4;
const VALUE_CELL_INDEX: usize = 1;

/// Authoritative metadata for one concept tag.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConceptMetadata {
    pub definition: String,
    pub data_type: String,
    pub balance_type: String,
    pub period_type: String,
}

fn text_of(el: ElementRef<'_>) -> String {
    el.text()
        .collect::<String>()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// Decodes one `div.body` definition block into [`ConceptMetadata`].
///
/// This function owns the block's positional layout: a definition paragraph
/// in the first nested `div`, then a property table in the third `div` whose
/// rows 2, 3 and 4 carry the data type, balance type and period type in their
/// second cell. Returns `None` when any of that structure is absent, which
/// callers report as a missed concept rather than an error.
pub fn decode_concept_block(body: ElementRef<'_>) -> Option<ConceptMetadata> {
    let div_sel = Selector::parse("div").unwrap();
    let p_sel = Selector::parse("p").unwrap();
    let tr_sel = Selector::parse("tr").unwrap();
    let td_sel = Selector::parse("td").unwrap();

    let definition = body
        .select(&div_sel)
        .next()?
        .select(&p_sel)
        .next()
        .map(text_of)?;

    let details = body.select(&div_sel).nth(DETAILS_DIV_INDEX)?;
    let rows: Vec<ElementRef> = details.select(&tr_sel).collect();
    let property = |row: usize| -> Option<String> {
        rows.get(row)?
            .select(&td_sel)
            .nth(VALUE_CELL_INDEX)
            .map(text_of)
    };

    Some(ConceptMetadata {
        definition,
        data_type: property(DATA_TYPE_ROW)?,
        balance_type: property(BALANCE_TYPE_ROW)?,
        period_type: property(PERIOD_TYPE_ROW)?,
    })
}

/// Resolves metadata for every distinct tag, in first-occurrence order.
///
/// Always returns an entry per tag; unresolvable tags get empty metadata and
/// a [`IssueKind::ConceptNotFound`] issue so records can still be emitted.
pub fn resolve_concepts<'a, I>(
    document: &Html,
    tags: I,
) -> (HashMap<String, ConceptMetadata>, Vec<ParseIssue>)
where
    I: IntoIterator<Item = &'a str>,
{
    let block_sel = Selector::parse("table[id]").unwrap();
    let body_sel = Selector::parse("div.body").unwrap();

    // Index the definition blocks once; pages reference dozens of concepts.
    let blocks: HashMap<&str, ElementRef> = document
        .select(&block_sel)
        .filter_map(|t| t.value().attr("id").map(|id| (id, t)))
        .collect();

    let mut metadata: HashMap<String, ConceptMetadata> = HashMap::new();
    let mut issues: Vec<ParseIssue> = Vec::new();

    for tag in tags {
        if metadata.contains_key(tag) {
            continue;
        }

        let decoded = blocks
            .get(tag)
            .and_then(|block| block.select(&body_sel).next())
            .and_then(decode_concept_block);

        match decoded {
            Some(meta) => {
                metadata.insert(tag.to_string(), meta);
            }
            None => {
                tracing::warn!("No definition block resolved for concept '{}'", tag);
                issues.push(ParseIssue::new(
                    IssueKind::ConceptNotFound,
                    tag,
                    "no definition block with the expected structure",
                ));
                metadata.insert(tag.to_string(), ConceptMetadata::default());
            }
        }
    }

    (metadata, issues)
}

//! Pure parsing layer for XBRL report pages.
//!
//! Everything here is a synchronous transformation over an already-fetched
//! document: no I/O, no shared state between calls. [`report`] reconstructs a
//! report page's header and item-by-date value matrix; [`concepts`] resolves the
//! per-concept definition blocks embedded in the same page.

pub mod concepts;
pub mod report;

//! Catalog rows -> validated [`Assessment`]s.
//!
//! Catalog files come from an external scraper as CSV or JSON. Representation quirks
//! (`test_type` as `"['K']"` text, `duration` as `"7.0"`) are resolved here with the
//! same coercion rules the [`crate::normalize`] module applies to query results.

pub mod assessment;
pub mod error;
pub mod loader;

#[cfg(test)]
mod tests;

pub use assessment::{Assessment, TestType};
pub use error::{CatalogError, RowRejection};
pub use loader::{
    CatalogLoad, RejectedRow, assessments_from_rows, load_catalog, read_csv_rows, read_json_rows,
};

//! Comparison tables of FDA biosimilar approvals, one per reference-product market.
//!
//! Four record sets (applicants, reference products, products, presentations)
//! are fetched through a [`source::TableReader`] and joined in memory into a
//! [`comparison::TableModel`]: one row per product, one column per
//! strength/dosage form, each cell classified as Reference, Biosimilar,
//! Interchangeable or Discontinued.

pub mod comparison;
pub mod config;
pub mod dashboard;
pub mod error;
pub mod export;
pub mod logging;
pub mod mappings;
pub mod markets;
pub mod records;
pub mod render;
pub mod source;

pub use comparison::{build_market_view, DuplicatePolicy, NameOrder, Row, TableModel, ViewOptions};
pub use dashboard::{Dashboard, TableData};
pub use error::{FetchError, MarketError};
pub use mappings::CellStatus;
pub use markets::{market_tiles, resolve_market};
pub use records::{Applicant, PresentationDetail, Product, ReferenceProductMaster, Snapshot};
pub use source::{JsonDirReader, RestTableReader, TableReader};

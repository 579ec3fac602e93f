//! Error types for loading record sets and building market views.

use thiserror::Error;

/// A required table could not be loaded. Fatal to the whole dashboard until retried.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("failed to fetch table '{table}': {message}")]
pub struct FetchError {
    pub table: String,
    pub message: String,
}

impl FetchError {
    pub fn new(table: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            message: message.into(),
        }
    }
}

/// Errors scoped to one selected market.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MarketError {
    /// The market's master row or its 351(a) product is missing.
    #[error("{entity} not found for market '{market}'")]
    NotFound {
        market: String,
        entity: &'static str,
    },

    /// None of the market's products has a presentation row.
    #[error("no presentations recorded for market '{market}'")]
    NoPresentations { market: String },
}

impl MarketError {
    pub fn market(&self) -> &str {
        match self {
            MarketError::NotFound { market, .. } | MarketError::NoPresentations { market } => {
                market
            }
        }
    }
}

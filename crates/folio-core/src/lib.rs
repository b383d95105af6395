//! # Folio Core
//!
//! Core types and abstractions for the Folio portfolio risk engine.
//!
//! This crate provides the foundational building blocks used throughout Folio:
//!
//! - **Types**: Domain types like [`Ticker`], [`PortfolioId`] and [`Portfolio`]
//! - **Traits**: The [`PortfolioSource`] lookup abstraction implemented by stores
//!
//! ## Design Philosophy
//!
//! - **Type Safety**: Newtypes prevent mixing tickers with portfolio identifiers
//! - **Validated Construction**: A [`Portfolio`] only exists once its weights check out
//! - **Explicit Over Implicit**: Asset ordering is the ticker ordering, always
//!
//! ## Example
//!
//! ```rust
//! use folio_core::prelude::*;
//!
//! let portfolio = PortfolioBuilder::new()
//!     .name("Balanced")
//!     .asset("SPY", 0.6)
//!     .asset("AGG", 0.4)
//!     .build()
//!     .unwrap();
//!
//! assert_eq!(portfolio.num_assets(), 2);
//! assert_eq!(portfolio.tickers()[0].as_str(), "AGG");
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::doc_markdown)]
#![allow(clippy::return_self_not_must_use)]
#![allow(clippy::uninlined_format_args)]

pub mod error;
pub mod traits;
pub mod types;

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::error::{CoreError, CoreResult};
    pub use crate::traits::PortfolioSource;
    pub use crate::types::{Portfolio, PortfolioBuilder, PortfolioId, PortfolioUpdate, Ticker};
}

// Re-export commonly used types at crate root
pub use error::{CoreError, CoreResult};
pub use traits::PortfolioSource;
pub use types::{
    Portfolio, PortfolioBuilder, PortfolioId, PortfolioUpdate, Ticker, MAX_TICKER_LEN,
    WEIGHT_SUM_TOLERANCE,
};

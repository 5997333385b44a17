//! Core contracts for salesgen.
//!
//! This crate defines the record types shared by the generator, the
//! evaluation crate and the CLI, plus the dataset invariant checks.

pub mod error;
pub mod records;
pub mod types;
pub mod validation;

pub use error::{Error, Result};
pub use records::{Customer, MONEY_SCALE, Product, Sale, sale_total, to_money};
pub use types::{CustomerId, NormalizedEmail};
pub use validation::validate_dataset;

/// Column layout version of the emitted CSV files.
pub const DATASET_VERSION: &str = "0.1";

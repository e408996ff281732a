//! Error types for lagoon operations

mod builders;
mod display;
mod types;

pub use types::{Error, Result};

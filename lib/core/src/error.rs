//! Error handling foundation for the portcullis crates.
//!
//! Only the `Result` alias lives here. Each crate defines its own error enum
//! and wraps it in a rootcause `Report` at the points where it talks to an
//! external service.

use rootcause::Report;

/// A Result type alias using rootcause's Report for error handling.
pub type Result<T, C = ()> = std::result::Result<T, Report<C>>;

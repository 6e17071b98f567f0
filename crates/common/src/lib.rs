//! Error helpers shared across the hush crates.

pub mod error;

pub use error::FromMessage;

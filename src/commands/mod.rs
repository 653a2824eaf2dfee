//! Command implementations for the CLI
//!
//! - start: Start the API server
//! - test: Validate the configuration file
//! - quote: Price a move offline

pub mod quote;
pub mod start;
pub mod test;

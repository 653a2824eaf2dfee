pub mod auth;
pub mod config;
pub mod error;
pub mod handlers;
pub mod logging;
pub mod metrics;
pub mod pricing;
pub mod rate_limit;
pub mod server;
pub mod signals;
pub mod store;
pub mod support;

pub use logging::init_tracing;

//! Tracing setup and log-safe rendering of customer data.
//!
//! API keys and customer e-mail addresses never reach the logs in clear text;
//! wrap them in [`SensitiveApiKey`] or [`MaskedEmail`] before logging.

use std::fmt;
use tracing_subscriber::{fmt as subscriber_fmt, prelude::*, EnvFilter};

/// Initialize tracing with the configured level and format
///
/// `RUST_LOG` overrides `log_level`. `log_format` is "json" or "pretty".
/// Returns an error if a global subscriber is already installed.
pub fn init_tracing(log_level: &str, log_format: &str) -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new(log_level))?;

    let registry = tracing_subscriber::registry().with(filter);
    match log_format {
        "pretty" => registry
            .with(subscriber_fmt::layer().pretty().with_target(true))
            .try_init()?,
        _ => registry
            .with(subscriber_fmt::layer().json().with_target(true).with_level(true))
            .try_init()?,
    }

    Ok(())
}

/// API key rendered with only its first 8 characters visible
#[derive(Clone, Debug)]
pub struct SensitiveApiKey<'a> {
    inner: &'a str,
}

impl<'a> SensitiveApiKey<'a> {
    pub fn new(key: &'a str) -> Self {
        Self { inner: key }
    }
}

impl<'a> fmt::Display for SensitiveApiKey<'a> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let visible: String = self.inner.chars().take(8).collect();
        if visible.len() == self.inner.len() {
            // Too short to show any of it
            write!(f, "***")
        } else {
            write!(f, "{}***", visible)
        }
    }
}

/// E-mail address with the local part reduced to its first character
///
/// `anna.svensson@gmail.com` renders as `a***@gmail.com`.
#[derive(Clone, Debug)]
pub struct MaskedEmail<'a> {
    inner: &'a str,
}

impl<'a> MaskedEmail<'a> {
    pub fn new(email: &'a str) -> Self {
        Self { inner: email }
    }
}

impl<'a> fmt::Display for MaskedEmail<'a> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.inner.split_once('@') {
            Some((local, domain)) => {
                let first: String = local.chars().take(1).collect();
                write!(f, "{}***@{}", first, domain)
            }
            None => write!(f, "***"),
        }
    }
}

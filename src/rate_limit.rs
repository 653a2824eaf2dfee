use arc_swap::ArcSwap;
use axum::{
    extract::{ConnectInfo, Request, State},
    middleware::Next,
    response::Response,
};
use dashmap::DashMap;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::{config::Config, error::AppError};

#[derive(Debug, Clone, Copy)]
struct Window {
    started: Instant,
    count: u32,
}

/// Fixed-window request counter per client address
///
/// Limits are read from the live config on every request, so a SIGHUP
/// reload takes effect without restarting.
#[derive(Clone)]
pub struct RateLimiter {
    config: Arc<ArcSwap<Config>>,
    windows: Arc<DashMap<String, Window>>,
}

impl RateLimiter {
    pub fn new(config: Arc<ArcSwap<Config>>) -> Self {
        Self {
            config,
            windows: Arc::new(DashMap::new()),
        }
    }

    /// Count one request from `client`; on rejection returns seconds until the window resets
    pub fn check(&self, client: &str, now: Instant) -> Result<(), u64> {
        let config = self.config.load();
        let limits = &config.rate_limit;
        if !limits.enabled {
            return Ok(());
        }
        let window_len = Duration::from_secs(limits.window_seconds);

        let mut entry = self.windows.entry(client.to_string()).or_insert(Window {
            started: now,
            count: 0,
        });

        if now.duration_since(entry.started) >= window_len {
            entry.started = now;
            entry.count = 0;
        }

        if entry.count >= limits.max_requests {
            let elapsed = now.duration_since(entry.started);
            let remaining = window_len.saturating_sub(elapsed);
            return Err(remaining.as_secs().max(1));
        }

        entry.count += 1;
        Ok(())
    }

    /// Drop windows that have already expired
    pub fn prune(&self, now: Instant) {
        let window_len = Duration::from_secs(self.config.load().rate_limit.window_seconds);
        self.windows
            .retain(|_client, window| now.duration_since(window.started) < window_len);
    }

    pub fn tracked_clients(&self) -> usize {
        self.windows.len()
    }

    /// Periodic pruning (background task)
    pub async fn cleanup_loop(self) {
        let mut interval = tokio::time::interval(Duration::from_secs(60));

        loop {
            interval.tick().await;
            self.prune(Instant::now());
            tracing::debug!(clients = self.tracked_clients(), "Rate limit windows pruned");
        }
    }
}

/// Client identity: the peer address, or the first `X-Forwarded-For` hop when trusted
fn client_key(req: &Request, trust_forwarded_for: bool) -> String {
    if trust_forwarded_for {
        if let Some(forwarded) = req
            .headers()
            .get("x-forwarded-for")
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.split(',').next())
            .map(str::trim)
            .filter(|v| !v.is_empty())
        {
            return forwarded.to_string();
        }
    }

    req.extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.ip().to_string())
        .unwrap_or_else(|| "unknown".to_string())
}

pub async fn rate_limit_middleware(
    State(limiter): State<RateLimiter>,
    req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let trust_forwarded_for = limiter.config.load().rate_limit.trust_forwarded_for;
    let client = client_key(&req, trust_forwarded_for);

    if let Err(retry_after_secs) = limiter.check(&client, Instant::now()) {
        tracing::warn!(client = %client, retry_after_secs, "Rate limit exceeded");
        return Err(AppError::RateLimited { retry_after_secs });
    }

    Ok(next.run(req).await)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::tests::create_test_config;
    use axum::body::Body;

    fn limiter(max_requests: u32, window_seconds: u64) -> RateLimiter {
        let mut config = create_test_config();
        config.rate_limit.max_requests = max_requests;
        config.rate_limit.window_seconds = window_seconds;
        RateLimiter::new(Arc::new(ArcSwap::from_pointee(config)))
    }

    #[test]
    fn test_allows_up_to_limit() {
        let limiter = limiter(3, 60);
        let now = Instant::now();
        for _ in 0..3 {
            assert!(limiter.check("10.0.0.1", now).is_ok());
        }
        let retry = limiter.check("10.0.0.1", now + Duration::from_secs(15)).unwrap_err();
        assert_eq!(retry, 45);

        // Other clients have their own window
        assert!(limiter.check("10.0.0.2", now).is_ok());
    }

    #[test]
    fn test_window_resets() {
        let limiter = limiter(1, 60);
        let now = Instant::now();
        assert!(limiter.check("c", now).is_ok());
        assert!(limiter.check("c", now).is_err());
        assert!(limiter.check("c", now + Duration::from_secs(60)).is_ok());
    }

    #[test]
    fn test_disabled_limit_never_rejects() {
        let limiter = limiter(1, 60);
        let mut config = create_test_config();
        config.rate_limit.enabled = false;
        limiter.config.store(Arc::new(config));

        let now = Instant::now();
        for _ in 0..10 {
            assert!(limiter.check("c", now).is_ok());
        }
    }

    #[test]
    fn test_prune_drops_expired_windows() {
        let limiter = limiter(5, 60);
        let now = Instant::now();
        limiter.check("old", now).unwrap();
        limiter.check("new", now + Duration::from_secs(50)).unwrap();

        limiter.prune(now + Duration::from_secs(70));
        assert_eq!(limiter.tracked_clients(), 1);
    }

    #[test]
    fn test_client_key_uses_peer_address() {
        let mut req = axum::http::Request::builder()
            .header("x-forwarded-for", "203.0.113.7")
            .body(Body::empty())
            .unwrap();
        assert_eq!(client_key(&req, false), "unknown");

        req.extensions_mut()
            .insert(ConnectInfo(SocketAddr::from(([192, 168, 1, 20], 5555))));
        assert_eq!(client_key(&req, false), "192.168.1.20");
    }

    #[test]
    fn test_client_key_honours_trusted_forwarded_for() {
        let mut req = axum::http::Request::builder()
            .header("x-forwarded-for", "203.0.113.7, 10.0.0.1")
            .body(Body::empty())
            .unwrap();
        req.extensions_mut()
            .insert(ConnectInfo(SocketAddr::from(([10, 0, 0, 1], 443))));
        assert_eq!(client_key(&req, true), "203.0.113.7");

        let req = axum::http::Request::builder()
            .header("x-forwarded-for", " ")
            .body(Body::empty())
            .unwrap();
        assert_eq!(client_key(&req, true), "unknown");
    }
}

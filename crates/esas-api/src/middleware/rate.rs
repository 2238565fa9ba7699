use std::collections::HashMap;
use std::net::SocketAddr;
use std::time::{Duration, Instant};

use axum::extract::{ConnectInfo, Request, State};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};

use crate::error::ApiError;
use crate::state::AppState;

const WINDOW: Duration = Duration::from_secs(60);

/// Sliding one-minute window of request times per client.
///
/// Counters live in this process only, so the limit is per instance. It
/// slows casual abuse of the anonymous endpoints and is not a security
/// boundary.
#[derive(Debug)]
pub struct RateLimiter {
    windows: HashMap<String, Vec<Instant>>,
    per_minute: u32,
}

impl RateLimiter {
    pub fn new(per_minute: u32) -> Self {
        Self {
            windows: HashMap::new(),
            per_minute,
        }
    }

    /// Record a request from `client`, or return the seconds until it
    /// may retry.
    pub fn check(&mut self, client: &str) -> Result<(), u64> {
        self.check_at(client, Instant::now())
    }

    pub fn check_at(&mut self, client: &str, now: Instant) -> Result<(), u64> {
        // Drop idle clients so the map does not grow without bound.
        self.windows.retain(|_, times| {
            times.retain(|t| now.saturating_duration_since(*t) < WINDOW);
            !times.is_empty()
        });

        let times = self.windows.entry(client.to_string()).or_default();
        if times.len() as u32 >= self.per_minute {
            let oldest = times.first().copied().unwrap_or(now);
            let wait = WINDOW.saturating_sub(now.saturating_duration_since(oldest));
            return Err(wait.as_secs().max(1));
        }
        times.push(now);
        Ok(())
    }
}

/// First `x-forwarded-for` hop, else the socket peer, else a shared key.
fn client_key(req: &Request) -> String {
    req.headers()
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .or_else(|| {
            req.extensions()
                .get::<ConnectInfo<SocketAddr>>()
                .map(|ConnectInfo(addr)| addr.ip().to_string())
        })
        .unwrap_or_else(|| "unknown".to_string())
}

/// Per-client rate limiting. Returns 429 with `Retry-After` if exceeded.
pub async fn limit(State(state): State<AppState>, req: Request, next: Next) -> Response {
    let key = client_key(&req);

    // The guard is not Send; release it before awaiting.
    let verdict = match state.rate_limiter.lock() {
        Ok(mut limiter) => limiter.check(&key),
        Err(_) => return ApiError::Internal("rate limiter lock poisoned".to_string()).into_response(),
    };

    match verdict {
        Ok(()) => next.run(req).await,
        Err(retry_after) => {
            tracing::warn!(client = %key, retry_after, "rate limit exceeded");
            ApiError::RateLimited { retry_after }.into_response()
        }
    }
}

//! Request rate limiting and timeouts.

use std::num::NonZeroU32;
use std::time::Duration;

use axum::{
    extract::{Request, State},
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Response},
};
use governor::{DefaultDirectRateLimiter, Quota, RateLimiter};
use nonzero_ext::nonzero;

use crate::AppState;
use crate::config::ResilienceConfig;

/// Global token-bucket limiter shared by all sessions.
pub type AppRateLimiter = DefaultDirectRateLimiter;

/// Request timeout applied unless `resilience.timeout_disabled` is set.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Build the limiter from config. Zero rates are treated as 1.
#[must_use]
pub fn rate_limiter(config: &ResilienceConfig) -> AppRateLimiter {
    let per_second = NonZeroU32::new(config.requests_per_second).unwrap_or(nonzero!(1u32));
    let burst = NonZeroU32::new(config.burst_size).unwrap_or(per_second);
    RateLimiter::direct(Quota::per_second(per_second).allow_burst(burst))
}

/// Middleware to enforce rate limits
pub async fn rate_limit_middleware(
    State(state): State<AppState>,
    req: Request,
    next: Next,
) -> Result<Response, StatusCode> {
    if state.config.resilience.rate_limit_enabled && state.rate_limiter.check().is_err() {
        tracing::debug!(name: "request.rate_limited", uri = %req.uri(), "Rate limit exceeded");
        return Err(StatusCode::TOO_MANY_REQUESTS);
    }
    Ok(next.run(req).await)
}

/// Middleware that fails slow handlers with `408`.
///
/// Only covers producing the response head; streaming bodies (SSE) run on.
pub async fn timeout_middleware(State(state): State<AppState>, req: Request, next: Next) -> Response {
    if state.config.resilience.timeout_disabled {
        return next.run(req).await;
    }
    match tokio::time::timeout(REQUEST_TIMEOUT, next.run(req)).await {
        Ok(res) => res,
        Err(_) => (StatusCode::REQUEST_TIMEOUT, "Request timed out").into_response(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(requests_per_second: u32, burst_size: u32) -> ResilienceConfig {
        ResilienceConfig {
            rate_limit_enabled: true,
            timeout_disabled: false,
            requests_per_second,
            burst_size,
        }
    }

    #[test]
    fn test_burst_then_reject() {
        let limiter = rate_limiter(&config(1, 3));

        assert!(limiter.check().is_ok());
        assert!(limiter.check().is_ok());
        assert!(limiter.check().is_ok());
        assert!(limiter.check().is_err());
    }

    #[test]
    fn test_zero_rate_is_clamped() {
        let limiter = rate_limiter(&config(0, 0));
        assert!(limiter.check().is_ok());
        assert!(limiter.check().is_err());
    }
}

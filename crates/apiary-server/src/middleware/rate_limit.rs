// Rate limiting middleware for API protection
// Fixed window per client IP: a client may send `max_requests` requests per
// `window_duration`, after which it gets 429 until the window rolls over

use std::sync::Arc;
use std::time::{Duration, Instant};

use actix_service::forward_ready;
use actix_utils::future::{Ready, ok};
use actix_web::{
    Error,
    body::EitherBody,
    dev::{Service, ServiceRequest, ServiceResponse, Transform},
    http::{
        StatusCode,
        header::{HeaderName, HeaderValue},
    },
};
use dashmap::DashMap;
use futures::future::LocalBoxFuture;
use tokio_util::sync::CancellationToken;

use crate::error::ErrorBody;

pub const TOO_MANY_REQUESTS_MESSAGE: &str = "Too many requests";

/// Rate limiter configuration
#[derive(Clone, Debug)]
pub struct RateLimitConfig {
    /// Maximum requests per window
    pub max_requests: u32,
    /// Time window duration
    pub window_duration: Duration,
    /// Whether rate limiting is enabled
    pub enabled: bool,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            max_requests: 100,
            window_duration: Duration::from_secs(60),
            enabled: false,
        }
    }
}

/// Request count for one client in the current window
struct Window {
    started: Instant,
    count: u32,
}

impl Window {
    fn new(now: Instant) -> Self {
        Self {
            started: now,
            count: 0,
        }
    }
}

/// Outcome of a rate limit check
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Decision {
    pub allowed: bool,
    pub remaining: u32,
    /// Seconds until the current window closes
    pub reset_after: u64,
}

/// Rate limiter state shared across workers
pub struct RateLimiterState {
    windows: DashMap<String, Window>,
    config: RateLimitConfig,
}

impl RateLimiterState {
    pub fn new(config: RateLimitConfig) -> Self {
        Self {
            windows: DashMap::new(),
            config,
        }
    }

    pub fn config(&self) -> &RateLimitConfig {
        &self.config
    }

    pub fn check_rate_limit(&self, key: &str) -> Decision {
        self.check_at(key, Instant::now())
    }

    fn check_at(&self, key: &str, now: Instant) -> Decision {
        let window_duration = self.config.window_duration;
        if !self.config.enabled {
            return Decision {
                allowed: true,
                remaining: self.config.max_requests,
                reset_after: window_duration.as_secs(),
            };
        }

        let mut window = self
            .windows
            .entry(key.to_string())
            .or_insert_with(|| Window::new(now));
        if now.duration_since(window.started) >= window_duration {
            *window = Window::new(now);
        }

        let reset_after = window_duration
            .saturating_sub(now.duration_since(window.started))
            .as_secs()
            .max(1);

        if window.count >= self.config.max_requests {
            return Decision {
                allowed: false,
                remaining: 0,
                reset_after,
            };
        }

        window.count += 1;
        Decision {
            allowed: true,
            remaining: self.config.max_requests - window.count,
            reset_after,
        }
    }

    /// Drop windows that closed long enough ago to be irrelevant
    pub fn cleanup(&self) {
        let now = Instant::now();
        let max_age = self.config.window_duration * 2;
        self.windows
            .retain(|_, window| now.duration_since(window.started) < max_age);
    }

    pub fn tracked_clients(&self) -> usize {
        self.windows.len()
    }
}

/// Rate limiting middleware factory
#[derive(Clone)]
pub struct RateLimiter {
    state: Arc<RateLimiterState>,
}

impl RateLimiter {
    pub fn new(config: RateLimitConfig) -> Self {
        Self {
            state: Arc::new(RateLimiterState::new(config)),
        }
    }

    pub fn state(&self) -> Arc<RateLimiterState> {
        self.state.clone()
    }
}

impl<S, B> Transform<S, ServiceRequest> for RateLimiter
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Transform = RateLimiterMiddleware<S>;
    type InitError = ();
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ok(RateLimiterMiddleware {
            service,
            state: self.state.clone(),
        })
    }
}

pub struct RateLimiterMiddleware<S> {
    service: S,
    state: Arc<RateLimiterState>,
}

fn header_value(value: impl ToString) -> HeaderValue {
    HeaderValue::from_str(&value.to_string()).unwrap_or_else(|_| HeaderValue::from_static("0"))
}

impl<S, B> Service<ServiceRequest> for RateLimiterMiddleware<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        if !self.state.config.enabled {
            let fut = self.service.call(req);
            return Box::pin(async move { fut.await.map(ServiceResponse::map_into_left_body) });
        }

        // Get client IP for rate limiting key
        let client_ip = req
            .connection_info()
            .realip_remote_addr()
            .unwrap_or("unknown")
            .to_string();

        let decision = self.state.check_rate_limit(&client_ip);
        let max_requests = self.state.config.max_requests;

        if !decision.allowed {
            tracing::warn!(client = %client_ip, "Rate limit exceeded");
            let response = actix_web::HttpResponse::build(StatusCode::TOO_MANY_REQUESTS)
                .insert_header(("X-RateLimit-Limit", max_requests.to_string()))
                .insert_header(("X-RateLimit-Remaining", "0"))
                .insert_header(("Retry-After", decision.reset_after.to_string()))
                .json(ErrorBody::new(TOO_MANY_REQUESTS_MESSAGE));

            return Box::pin(async move { Ok(req.into_response(response).map_into_right_body()) });
        }

        let fut = self.service.call(req);

        Box::pin(async move {
            let mut res = fut.await?;

            res.headers_mut().insert(
                HeaderName::from_static("x-ratelimit-limit"),
                header_value(max_requests),
            );
            res.headers_mut().insert(
                HeaderName::from_static("x-ratelimit-remaining"),
                header_value(decision.remaining),
            );

            Ok(res.map_into_left_body())
        })
    }
}

/// Cleanup interval for rate limiter entries (5 minutes)
const CLEANUP_INTERVAL_SECS: u64 = 300;

/// Periodically drop stale client windows until the token is cancelled.
pub fn start_cleanup_task(
    state: Arc<RateLimiterState>,
    token: CancellationToken,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(Duration::from_secs(CLEANUP_INTERVAL_SECS));
        loop {
            tokio::select! {
                _ = token.cancelled() => break,
                _ = interval.tick() => {
                    state.cleanup();
                    tracing::debug!(clients = state.tracked_clients(), "Rate limiter cleanup completed");
                }
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn limited(max_requests: u32) -> RateLimiterState {
        RateLimiterState::new(RateLimitConfig {
            max_requests,
            window_duration: Duration::from_secs(60),
            enabled: true,
        })
    }

    #[test]
    fn test_window_allows_up_to_limit() {
        let state = limited(3);
        let now = Instant::now();

        for expected_remaining in [2, 1, 0] {
            let decision = state.check_at("10.0.0.1", now);
            assert!(decision.allowed);
            assert_eq!(decision.remaining, expected_remaining);
        }

        let denied = state.check_at("10.0.0.1", now);
        assert!(!denied.allowed);
        assert_eq!(denied.reset_after, 60);
    }

    #[test]
    fn test_window_resets_after_duration() {
        let state = limited(1);
        let start = Instant::now();

        assert!(state.check_at("10.0.0.1", start).allowed);
        assert!(!state.check_at("10.0.0.1", start + Duration::from_secs(30)).allowed);
        assert!(state.check_at("10.0.0.1", start + Duration::from_secs(61)).allowed);
    }

    #[test]
    fn test_clients_are_counted_separately() {
        let state = limited(1);
        let now = Instant::now();

        assert!(state.check_at("10.0.0.1", now).allowed);
        assert!(state.check_at("10.0.0.2", now).allowed);
        assert!(!state.check_at("10.0.0.1", now).allowed);
        assert_eq!(state.tracked_clients(), 2);
    }

    #[test]
    fn test_rate_limiter_disabled() {
        let state = RateLimiterState::new(RateLimitConfig {
            max_requests: 1,
            window_duration: Duration::from_secs(60),
            enabled: false,
        });

        for _ in 0..10 {
            assert!(state.check_rate_limit("test-ip").allowed);
        }
        assert_eq!(state.tracked_clients(), 0);
    }
}

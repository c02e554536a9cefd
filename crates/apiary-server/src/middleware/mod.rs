// HTTP middleware implementations
// Authentication, role gating, rate limiting and request ids

pub mod auth;
pub mod rate_limit;
pub mod request_id;

pub use auth::{Authentication, RequireRole};
pub use rate_limit::{RateLimitConfig, RateLimiter};
pub use request_id::RequestTracing;

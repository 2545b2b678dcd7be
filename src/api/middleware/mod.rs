//! API middleware.
//!
//! Execution order (outermost → innermost):
//! 1. Auth validator: bearer token to `UserIdentity` (protected routes only)
//! 2. Access logger: method, path, status, latency

pub mod audit;
pub mod auth;

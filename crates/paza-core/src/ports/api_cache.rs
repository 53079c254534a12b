//! API cache port
//!
//! After a sync pass replays deferred writes, the application's cached API
//! responses are stale. The engine invalidates them through this port,
//! unconditionally, at the end of every non-empty pass.

/// Port trait for invalidating the application's API response cache
///
/// ## Implementation Notes
///
/// - `clear` is infallible by contract: implementations must swallow their
///   own errors (logging them if useful) and must be safe to call when no
///   cache exists at all.
#[async_trait::async_trait]
pub trait IApiCache: Send + Sync {
    /// Drops all cached API responses
    async fn clear(&self);
}

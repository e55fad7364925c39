//! Rate limiting for cart writes and checkout, keyed by client IP.

use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;

use axum::extract::ConnectInfo;
use axum::http::Request;
use governor::clock::QuantaInstant;
use governor::middleware::NoOpMiddleware;
use tower_governor::{GovernorError, GovernorLayer, governor::GovernorConfigBuilder};

/// Proxy headers carrying the client IP, most trusted first.
const CLIENT_IP_HEADERS: [&str; 4] = [
    "cf-connecting-ip",
    "x-forwarded-for",
    "x-real-ip",
    "fly-client-ip",
];

/// Keys requests by the real client IP behind Cloudflare and Fly.io,
/// falling back to the socket peer.
#[derive(Clone, Copy)]
pub struct ShopperIpKeyExtractor;

impl tower_governor::key_extractor::KeyExtractor for ShopperIpKeyExtractor {
    type Key = IpAddr;

    fn extract<T>(&self, req: &Request<T>) -> Result<Self::Key, GovernorError> {
        let headers = req.headers();
        CLIENT_IP_HEADERS
            .iter()
            .find_map(|name| {
                headers
                    .get(*name)
                    .and_then(|v| v.to_str().ok())
                    // x-forwarded-for is a chain; the client is the first hop
                    .and_then(|s| s.split(',').next())
                    .and_then(|s| s.trim().parse::<IpAddr>().ok())
            })
            .or_else(|| {
                req.extensions()
                    .get::<ConnectInfo<SocketAddr>>()
                    .map(|ConnectInfo(addr)| addr.ip())
            })
            .ok_or(GovernorError::UnableToExtractKey)
    }
}

pub type RateLimiterLayer =
    GovernorLayer<ShopperIpKeyExtractor, NoOpMiddleware<QuantaInstant>, axum::body::Body>;

/// Checkout submissions: one token every 6 seconds, burst of 3.
///
/// # Panics
///
/// Does not panic: `per_second(6)` and `burst_size(3)` are always accepted
/// by `GovernorConfigBuilder`.
#[must_use]
#[allow(clippy::expect_used)]
pub fn checkout_rate_limiter() -> RateLimiterLayer {
    let config = GovernorConfigBuilder::default()
        .key_extractor(ShopperIpKeyExtractor)
        .per_second(6)
        .burst_size(3)
        .finish()
        .expect("rate limiter config with per_second(6) and burst_size(3) is valid");
    GovernorLayer::new(Arc::new(config))
}

/// Cart and wishlist writes: one token per second, burst of 50.
///
/// # Panics
///
/// Does not panic: `per_second(1)` and `burst_size(50)` are always accepted
/// by `GovernorConfigBuilder`.
#[must_use]
#[allow(clippy::expect_used)]
pub fn cart_rate_limiter() -> RateLimiterLayer {
    let config = GovernorConfigBuilder::default()
        .key_extractor(ShopperIpKeyExtractor)
        .per_second(1)
        .burst_size(50)
        .finish()
        .expect("rate limiter config with per_second(1) and burst_size(50) is valid");
    GovernorLayer::new(Arc::new(config))
}

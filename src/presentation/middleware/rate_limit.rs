use axum::{body::Body, extract::ConnectInfo};
use governor::{clock::QuantaInstant, middleware::NoOpMiddleware};
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::sync::Arc;
use tower_governor::{GovernorLayer, governor::GovernorConfigBuilder, key_extractor::KeyExtractor};

pub type AuthRateLimitLayer = GovernorLayer<ClientIpKeyExtractor, NoOpMiddleware<QuantaInstant>, Body>;

/// Keys the limiter by peer address
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ClientIpKeyExtractor;

impl KeyExtractor for ClientIpKeyExtractor {
    type Key = IpAddr;

    fn extract<B>(
        &self,
        req: &axum::http::Request<B>,
    ) -> Result<Self::Key, tower_governor::errors::GovernorError> {
        // Requests driven without a socket (tests) share the loopback bucket
        Ok(req
            .extensions()
            .get::<ConnectInfo<SocketAddr>>()
            .map(|ConnectInfo(addr)| addr.ip())
            .unwrap_or(IpAddr::V4(Ipv4Addr::LOCALHOST)))
    }
}

/// Token-bucket limiter allowing `requests_per_minute` with an equal burst
pub fn rate_limit_layer(requests_per_minute: u64) -> anyhow::Result<AuthRateLimitLayer> {
    if requests_per_minute == 0 {
        anyhow::bail!("Rate limit must allow at least one request per minute");
    }
    let quota_duration_ms = (60_000 / requests_per_minute).max(1);

    let config = Arc::new(
        GovernorConfigBuilder::default()
            .per_millisecond(quota_duration_ms)
            .burst_size(requests_per_minute.min(u32::MAX as u64) as u32)
            .key_extractor(ClientIpKeyExtractor)
            .finish()
            .ok_or_else(|| anyhow::anyhow!("Failed to finish governor config"))?,
    );

    Ok(GovernorLayer::new(config))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_rate_is_rejected() {
        assert!(rate_limit_layer(0).is_err());
    }

    #[test]
    fn test_layer_builds_for_common_rates() {
        for rate in [1, 60, 6000, 120_000] {
            assert!(rate_limit_layer(rate).is_ok(), "rate {} should build", rate);
        }
    }
}

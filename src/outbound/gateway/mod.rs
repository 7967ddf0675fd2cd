//! Simulated gateway adapter.
//!
//! Stands in for a real SMS/WhatsApp provider behind the `MessageGateway`
//! port: sleeps a uniformly random 50–200 ms, then succeeds with the
//! configured probability or fails with a reason drawn from a closed set.
//! Swap the implementation behind the port to integrate a live provider.

use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::domain::ports::{DeliveryReceipt, MessageGateway};
use crate::domain::Channel;

/// Simulated latency bounds, inclusive.
const LATENCY_RANGE_MS: std::ops::RangeInclusive<u64> = 50..=200;

/// Closed set of simulated failure reasons.
const FAILURE_REASONS: [&str; 5] = [
    "network timeout",
    "invalid phone number",
    "rate limit exceeded",
    "service temporarily unavailable",
    "insufficient balance",
];

/// Latency-simulating gateway with a configurable success probability.
pub struct SimulatedGateway {
    success_rate: f64,
    rng: Mutex<StdRng>,
}

impl SimulatedGateway {
    /// Create a gateway with the given success probability, clamped to
    /// `[0.0, 1.0]`, seeded from entropy.
    pub fn new(success_rate: f64) -> Self {
        Self::with_rng(success_rate, StdRng::from_entropy())
    }

    /// Create a deterministic gateway from a fixed seed, for tests.
    pub fn with_seed(success_rate: f64, seed: u64) -> Self {
        Self::with_rng(success_rate, StdRng::seed_from_u64(seed))
    }

    fn with_rng(success_rate: f64, rng: StdRng) -> Self {
        Self {
            success_rate: success_rate.clamp(0.0, 1.0),
            rng: Mutex::new(rng),
        }
    }

    /// The configured success probability.
    pub fn success_rate(&self) -> f64 {
        self.success_rate
    }
}

#[async_trait]
impl MessageGateway for SimulatedGateway {
    async fn send(&self, _channel: Channel, _phone: String, _body: String) -> DeliveryReceipt {
        // Draw everything before sleeping so the lock never crosses an
        // await point.
        let (latency_ms, success, reason) = {
            let mut rng = self.rng.lock().expect("gateway rng lock poisoned");
            let latency_ms = rng.gen_range(LATENCY_RANGE_MS);
            let success = rng.gen::<f64>() < self.success_rate;
            let reason = FAILURE_REASONS[rng.gen_range(0..FAILURE_REASONS.len())];
            (latency_ms, success, reason)
        };

        tokio::time::sleep(Duration::from_millis(latency_ms)).await;

        let latency = Duration::from_millis(latency_ms);
        if success {
            DeliveryReceipt::delivered(latency)
        } else {
            DeliveryReceipt::rejected(latency, reason)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn certain_success_always_delivers() {
        let gateway = SimulatedGateway::with_seed(1.0, 42);
        for _ in 0..20 {
            let receipt = gateway
                .send(Channel::Sms, "+1".into(), "hello".into())
                .await;
            assert!(receipt.success);
            assert!(receipt.error.is_none());
        }
    }

    #[tokio::test(start_paused = true)]
    async fn certain_failure_reports_a_known_reason() {
        let gateway = SimulatedGateway::with_seed(0.0, 42);
        for _ in 0..20 {
            let receipt = gateway
                .send(Channel::WhatsApp, "+1".into(), "hello".into())
                .await;
            assert!(!receipt.success);
            let reason = receipt.error.expect("failure carries a reason");
            assert!(
                FAILURE_REASONS.contains(&reason.as_str()),
                "unexpected reason: {reason}"
            );
        }
    }

    #[tokio::test(start_paused = true)]
    async fn latency_stays_within_bounds() {
        let gateway = SimulatedGateway::with_seed(1.0, 7);
        for _ in 0..20 {
            let receipt = gateway.send(Channel::Sms, "+1".into(), "hi".into()).await;
            let ms = receipt.latency.as_millis() as u64;
            assert!(LATENCY_RANGE_MS.contains(&ms), "latency out of range: {ms}");
        }
    }

    #[tokio::test(start_paused = true)]
    async fn identical_seeds_produce_identical_outcomes() {
        let first = SimulatedGateway::with_seed(0.5, 99);
        let second = SimulatedGateway::with_seed(0.5, 99);
        for _ in 0..20 {
            let a = first.send(Channel::Sms, "+1".into(), "hi".into()).await;
            let b = second.send(Channel::Sms, "+1".into(), "hi".into()).await;
            assert_eq!(a, b);
        }
    }

    #[test]
    fn success_rate_is_clamped() {
        assert_eq!(SimulatedGateway::new(1.7).success_rate(), 1.0);
        assert_eq!(SimulatedGateway::new(-0.3).success_rate(), 0.0);
        assert_eq!(SimulatedGateway::new(0.95).success_rate(), 0.95);
    }
}

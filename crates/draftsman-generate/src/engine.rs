use std::time::Duration;

use chrono::{DateTime, Utc};
use draftsman_core::DocumentKind;
use tracing::debug;

/// How long a generation request should appear to take.
pub trait Latency: Send + Sync {
    fn delay(&self, kind: DocumentKind) -> Duration;
}

/// Answer immediately.
pub struct NoLatency;

impl Latency for NoLatency {
    fn delay(&self, _kind: DocumentKind) -> Duration {
        Duration::ZERO
    }
}

/// The same delay for every document kind.
pub struct FixedLatency(pub Duration);

impl Latency for FixedLatency {
    fn delay(&self, _kind: DocumentKind) -> Duration {
        self.0
    }
}

pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Always returns the same instant. Useful for reproducible ids and timestamps.
pub struct FixedClock(pub DateTime<Utc>);

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}

pub(crate) async fn simulate(latency: &dyn Latency, kind: DocumentKind) {
    let delay = latency.delay(kind);
    if delay.is_zero() {
        return;
    }
    debug!(%kind, delay_ms = delay.as_millis() as u64, "simulating generation latency");
    tokio::time::sleep(delay).await;
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[tokio::test(start_paused = true)]
    async fn fixed_latency_sleeps_for_its_duration() {
        let start = tokio::time::Instant::now();
        simulate(&FixedLatency(Duration::from_millis(1500)), DocumentKind::UseCase).await;
        assert!(start.elapsed() >= Duration::from_millis(1500));
    }

    #[tokio::test(start_paused = true)]
    async fn no_latency_returns_immediately() {
        let start = tokio::time::Instant::now();
        simulate(&NoLatency, DocumentKind::Architecture).await;
        assert_eq!(start.elapsed(), Duration::ZERO);
    }

    #[test]
    fn fixed_clock_is_stable() {
        let at = Utc.with_ymd_and_hms(2024, 1, 2, 3, 4, 5).unwrap();
        let clock = FixedClock(at);
        assert_eq!(clock.now(), clock.now());
        assert_eq!(clock.now(), at);
    }
}

use std::time::Duration;

use rand::Rng;

use crate::config::PacingConfig;

/// Randomized delay between consecutive browser actions, to avoid tripping
/// automated-traffic defenses. A scheduling policy only; it carries no
/// correctness weight and is disabled for tests.
#[derive(Debug, Clone)]
pub struct Pacer {
    enabled: bool,
    min: Duration,
    max: Duration,
}

impl Pacer {
    pub fn new(config: &PacingConfig) -> Self {
        let min = Duration::from_millis(config.min_delay_ms);
        // Tolerate a config with max below min.
        let max = Duration::from_millis(config.max_delay_ms.max(config.min_delay_ms));
        Self {
            enabled: config.enabled,
            min,
            max,
        }
    }

    pub fn disabled() -> Self {
        Self {
            enabled: false,
            min: Duration::ZERO,
            max: Duration::ZERO,
        }
    }

    /// Draw the next delay, or None when pacing is off.
    pub fn next_delay(&self) -> Option<Duration> {
        if !self.enabled {
            return None;
        }
        if self.max <= self.min {
            return Some(self.min);
        }
        let millis = rand::thread_rng()
            .gen_range(self.min.as_millis() as u64..=self.max.as_millis() as u64);
        Some(Duration::from_millis(millis))
    }

    pub async fn pause(&self) {
        if let Some(delay) = self.next_delay() {
            tokio::time::sleep(delay).await;
        }
    }
}

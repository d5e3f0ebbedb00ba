//! Fixed-timestep tick loop driving the host's update hook.

use std::time::{Duration, Instant};

use tracing::{info, warn};

use keystone_host::LocalHost;

/// Configuration for the tick loop.
#[derive(Debug, Clone)]
pub struct TickConfig {
    /// Target ticks per second.
    pub tick_rate: f64,
    /// Maximum number of ticks to run (0 = unlimited).
    pub max_ticks: u64,
}

impl Default for TickConfig {
    fn default() -> Self {
        Self {
            tick_rate: 60.0,
            max_ticks: 0,
        }
    }
}

/// Drives [`LocalHost::tick`] at a fixed rate.
#[derive(Debug)]
pub struct TickLoop {
    config: TickConfig,
}

impl TickLoop {
    /// Create a tick loop with the given configuration.
    #[must_use]
    pub fn new(config: TickConfig) -> Self {
        Self { config }
    }

    /// Run for the configured number of ticks, or indefinitely.
    pub async fn run(&self, host: &LocalHost) {
        let tick_duration = Duration::from_secs_f64(1.0 / self.config.tick_rate);
        let mut tick_count = 0u64;

        info!(
            tick_rate = self.config.tick_rate,
            max_ticks = self.config.max_ticks,
            "starting tick loop"
        );

        loop {
            let start = Instant::now();

            let tick_id = host.tick(tick_duration.as_secs_f64());

            tick_count += 1;
            if self.config.max_ticks > 0 && tick_count >= self.config.max_ticks {
                info!(ticks = tick_count, "tick loop complete");
                break;
            }

            let elapsed = start.elapsed();
            if elapsed < tick_duration {
                tokio::time::sleep(tick_duration - elapsed).await;
            } else {
                warn!(
                    tick_id,
                    elapsed_ms = elapsed.as_millis() as u64,
                    budget_ms = tick_duration.as_millis() as u64,
                    "tick exceeded time budget"
                );
            }
        }
    }
}

use std::time::Duration;

use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

use crate::job::FanoutJob;

/// Runs a [`FanoutJob`] on a fixed period.
pub struct FanoutScheduler {
    job: FanoutJob,
    period: Duration,
}

impl FanoutScheduler {
    pub fn new(job: FanoutJob, period: Duration) -> Self {
        Self { job, period }
    }

    pub fn period(&self) -> Duration {
        self.period
    }

    /// Tick until `cancel` fires. The first run happens one period after
    /// start. A failed run is logged and the next tick proceeds normally.
    pub async fn run(&self, cancel: CancellationToken) {
        let mut interval = interval_at(Instant::now() + self.period, self.period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

        tracing::info!(period_secs = self.period.as_secs_f64(), "fanout scheduler started");

        loop {
            tokio::select! {
                _ = cancel.cancelled() => {
                    tracing::info!("fanout scheduler cancelled");
                    break;
                }
                _ = interval.tick() => {
                    if let Err(e) = self.job.run_once().await {
                        tracing::error!(error = %e, "fanout run failed");
                    }
                }
            }
        }
    }
}

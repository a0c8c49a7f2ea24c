//! Watch mode: the aggregation job on a fixed interval

use crate::job::AggregationJob;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::interval;
use tracing::{error, info};

/// Re-runs the aggregation job on a fixed interval
pub struct AggregationScheduler {
    job: Arc<AggregationJob>,
    period: Duration,
}

impl AggregationScheduler {
    pub fn new(job: Arc<AggregationJob>) -> Self {
        let period = Duration::from_secs(job.config().interval_hours * 3600);
        Self { job, period }
    }

    /// Run immediately, then once per period. Never returns.
    pub async fn start(&self) {
        info!("Starting aggregation scheduler, every {:?}", self.period);
        let mut ticker = interval(self.period);

        loop {
            ticker.tick().await;

            // A failed run waits for the next tick, there is no retry
            match self.job.run().await {
                Ok(summary) => info!(
                    "Scheduled aggregation completed: {} leagues, {} failed",
                    summary.leagues_processed, summary.leagues_failed
                ),
                Err(e) => error!("Scheduled aggregation failed: {:#}", e),
            }
        }
    }
}

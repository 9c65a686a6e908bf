//! Periodic pipeline runs.
//!
//! Each cadence is one task that awaits its own pass, so a slow pass never
//! overlaps itself; ticks missed meanwhile are skipped. Generation and
//! resolution run independently and may overlap each other.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tracing::{debug, error, info};

use crate::application::Pipeline;
use crate::infrastructure::config::service::ScheduleConfig;
use crate::port::outbound::store::Store;

/// Handles of the running cadence tasks.
pub struct Scheduler {
    handles: Vec<JoinHandle<()>>,
}

impl Scheduler {
    /// Start both cadences. They stop when `shutdown` flips to true.
    pub fn start<S: Store + 'static>(
        pipeline: Arc<Pipeline<S>>,
        config: &ScheduleConfig,
        shutdown: watch::Receiver<bool>,
    ) -> Self {
        let generation = {
            let pipeline = Arc::clone(&pipeline);
            spawn_cadence(
                "generation",
                Duration::from_secs(config.generation_interval_secs),
                config.run_on_start,
                shutdown.clone(),
                move || {
                    let pipeline = Arc::clone(&pipeline);
                    async move {
                        pipeline.generate().await;
                    }
                },
            )
        };
        let resolution = spawn_cadence(
            "resolution",
            Duration::from_secs(config.resolution_interval_secs),
            config.run_on_start,
            shutdown,
            move || {
                let pipeline = Arc::clone(&pipeline);
                async move {
                    if let Err(err) = pipeline.resolve().await {
                        error!(error = %err, "Resolution pass failed");
                    }
                }
            },
        );
        info!(
            generation_secs = config.generation_interval_secs,
            resolution_secs = config.resolution_interval_secs,
            "Scheduler started"
        );
        Self {
            handles: vec![generation, resolution],
        }
    }

    /// Wait for both cadences to stop.
    pub async fn join(self) {
        for handle in self.handles {
            if let Err(err) = handle.await {
                error!(error = %err, "Scheduler task panicked");
            }
        }
    }
}

fn spawn_cadence<F, Fut>(
    name: &'static str,
    period: Duration,
    run_on_start: bool,
    mut shutdown: watch::Receiver<bool>,
    mut pass: F,
) -> JoinHandle<()>
where
    F: FnMut() -> Fut + Send + 'static,
    Fut: Future<Output = ()> + Send + 'static,
{
    tokio::spawn(async move {
        let period = period.max(Duration::from_secs(1));
        let start = if run_on_start {
            Instant::now()
        } else {
            Instant::now() + period
        };
        let mut ticker = interval_at(start, period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    debug!(cadence = name, "Pass starting");
                    pass().await;
                }
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        info!(cadence = name, "Cadence stopping");
                        break;
                    }
                }
            }
        }
    })
}

//! `trendsmith serve`: HTTP service plus the scheduled pipeline.

use std::sync::Arc;

use tokio::signal;
use tokio::sync::watch;
use tracing::{info, warn};

use super::command::ServeArgs;
use super::output;
use crate::adapter::inbound::http;
use crate::error::Result;
use crate::infrastructure::bootstrap;
use crate::infrastructure::config::settings::Config;
use crate::infrastructure::scheduler::Scheduler;

/// Run until ctrl-c, then stop the server, janitor and scheduler.
pub async fn execute(config: &Config, args: &ServeArgs) -> Result<()> {
    config.require_contract()?;
    let ctx = Arc::new(bootstrap::build(config, true)?);
    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    let janitor = ctx.workflow.spawn_janitor(shutdown_rx.clone());
    let scheduler = if config.schedule.enabled && !args.no_scheduler {
        Some(Scheduler::start(
            Arc::clone(&ctx.pipeline),
            &config.schedule,
            shutdown_rx.clone(),
        ))
    } else {
        info!("Scheduler disabled");
        None
    };

    let address = config.server.bind_address();
    output::header(env!("CARGO_PKG_VERSION"));
    output::field("Listening", &address);
    output::field("Dry run", config.dry_run);
    output::field("Scheduler", scheduler.is_some());

    let server = http::serve(http::router(Arc::clone(&ctx)), &address, shutdown_rx);
    tokio::pin!(server);

    let served = tokio::select! {
        result = &mut server => result,
        _ = signal::ctrl_c() => {
            info!("Shutdown signal received");
            let _ = shutdown_tx.send(true);
            server.await
        }
    };
    let _ = shutdown_tx.send(true);

    if let Err(err) = janitor.await {
        warn!(error = %err, "Session janitor panicked");
    }
    if let Some(scheduler) = scheduler {
        scheduler.join().await;
    }
    info!("trendsmith stopped");
    served
}

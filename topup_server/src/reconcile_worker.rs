use log::*;
use reseller_tools::VipResellerApi;
use tokio::{task::JoinHandle, time::Instant};
use topup_engine::{checkout_objects::ReconcileReport, events::EventProducers, ReconcileApi, SqliteDatabase};

use crate::config::ReconcileConfig;

/// Starts the reconciliation worker, which replays [`ReconcileApi::reconcile_pending`] over stale pending
/// transactions: once at start-up if `on_startup` is set, and then every `interval` if one is configured.
///
/// Returns `None` if neither is enabled. Do not await the returned JoinHandle when an interval is set, as it will run
/// indefinitely.
pub fn start_reconcile_worker(
    db: SqliteDatabase,
    gateway: VipResellerApi,
    producers: EventProducers,
    config: ReconcileConfig,
) -> Option<JoinHandle<()>> {
    if !config.on_startup && config.interval.is_none() {
        info!("🔄️ Background reconciliation is disabled");
        return None;
    }
    let handle = tokio::spawn(async move {
        let api = ReconcileApi::new(db, gateway, producers);
        if config.on_startup {
            info!("🔄️ Running the start-up reconciliation sweep");
            run_sweep(&api, config.batch_size).await;
        }
        let Some(interval) = config.interval else {
            return;
        };
        info!("🔄️ Reconciliation worker started. Sweeping every {}s", interval.as_secs());
        let mut timer = tokio::time::interval_at(Instant::now() + interval, interval);
        loop {
            timer.tick().await;
            run_sweep(&api, config.batch_size).await;
        }
    });
    Some(handle)
}

async fn run_sweep(api: &ReconcileApi<SqliteDatabase, VipResellerApi>, batch_size: i64) {
    match api.reconcile_pending(batch_size).await {
        Ok(report) => {
            info!("🔄️ {} transactions reconciled. {} updated", report.total_count(), report.updated.len());
            debug!("🔄️ {}", report_summary(&report));
        },
        Err(e) => {
            error!("🔄️ Error running the reconciliation sweep: {e}");
        },
    }
}

fn report_summary(report: &ReconcileReport) -> String {
    let failed = report.failed.iter().map(|f| format!("{} ({})", f.invoice, f.reason)).collect::<Vec<_>>().join(", ");
    let updated = report.updated.iter().map(|i| i.to_string()).collect::<Vec<_>>().join(", ");
    format!("Updated: [{updated}]. Failed: [{failed}]. Unchanged: {}", report.unchanged.len())
}

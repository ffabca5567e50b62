use chrono::{Local, NaiveDate};
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tenant_ops::error::AppError;
use tenant_ops::workflows::pdc::PdcLifecycleService;
use tracing::{info, warn};

const DAILY: Duration = Duration::from_secs(24 * 60 * 60);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub(crate) struct DailyRunSummary {
    pub(crate) today: NaiveDate,
    pub(crate) marked_due: usize,
    pub(crate) reminders_sent: usize,
}

/// One pass of the daily cheque job: mark cheques due, then remind tenants.
pub(crate) fn run_daily(
    service: &PdcLifecycleService,
    today: NaiveDate,
) -> Result<DailyRunSummary, AppError> {
    let marked_due = service.transition_received_to_due(today)?;
    let reminders_sent = service.send_due_reminders(today)?;
    let summary = DailyRunSummary {
        today,
        marked_due,
        reminders_sent,
    };
    info!(%today, marked_due, reminders_sent, "daily cheque job finished");
    Ok(summary)
}

/// Run the daily job on a fixed interval for as long as the server lives.
pub(crate) fn spawn_daily(service: Arc<PdcLifecycleService>) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(DAILY);
        loop {
            ticker.tick().await;
            let today = Local::now().date_naive();
            if let Err(err) = run_daily(&service, today) {
                warn!(%today, error = %err, "daily cheque job failed");
            }
        }
    })
}

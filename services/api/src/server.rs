use crate::cli::ServeArgs;
use crate::infra::{AppState, InMemoryDirectory, Workflows};
use crate::routes::with_workflow_routes;
use crate::scheduler::spawn_daily;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use tenant_ops::config::{AppConfig, AppEnvironment};
use tenant_ops::error::AppError;
use tenant_ops::telemetry;
use tracing::info;

pub(crate) async fn run(mut args: ServeArgs) -> Result<(), AppError> {
    let mut config = AppConfig::load()?;

    if let Some(host) = args.host.take() {
        config.server.host = host;
    }
    if let Some(port) = args.port.take() {
        config.server.port = port;
    }

    telemetry::init(&config.telemetry)?;

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(std::sync::atomic::AtomicBool::new(false));
    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
    };

    let directory = match config.environment {
        AppEnvironment::Production => InMemoryDirectory::default(),
        AppEnvironment::Development | AppEnvironment::Test => {
            InMemoryDirectory::with_demo_tenants()
        }
    };
    let workflows = Workflows::in_memory(&config.workflows, directory);

    let app = with_workflow_routes(&workflows)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    if !args.no_scheduler {
        spawn_daily(workflows.pdc.clone());
    }
    readiness_flag.store(true, Ordering::Release);

    info!(
        ?config.environment,
        %addr,
        due_window_days = config.workflows.pdc_due_window_days,
        approval_threshold = %config.workflows.refund_approval_threshold,
        "tenant operations service ready"
    );

    axum::serve(listener, app).await?;
    Ok(())
}

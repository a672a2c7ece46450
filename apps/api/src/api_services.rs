use std::sync::Arc;
use std::time::Duration;

use terreno_application::{DashboardConfigSource, DashboardService, HierarchyService};
use terreno_core::AppError;
use terreno_infrastructure::{HttpDashboardConfigSource, InMemoryDashboardConfigSource};
use tracing::info;

use crate::api_config::{ApiConfig, ConfigSourceKind, UpstreamConfig};
use crate::state::AppState;

pub fn build_app_state(config: &ApiConfig) -> Result<AppState, AppError> {
    let source = build_config_source(config)?;

    Ok(AppState {
        dashboard_service: DashboardService::new(source.clone()),
        hierarchy_service: HierarchyService::new(source, config.aggregate_source),
    })
}

fn build_config_source(config: &ApiConfig) -> Result<Arc<dyn DashboardConfigSource>, AppError> {
    match (config.config_source, config.upstream.as_ref()) {
        (ConfigSourceKind::Memory, _) => {
            info!("serving built-in demo dashboard documents");
            Ok(Arc::new(InMemoryDashboardConfigSource::demo()))
        }
        (ConfigSourceKind::Http, Some(upstream)) => {
            info!(upstream = %upstream.base_url, "using remote dashboard documents");
            Ok(Arc::new(build_http_source(upstream)?))
        }
        (ConfigSourceKind::Http, None) => Err(AppError::Validation(
            "TERRENO_UPSTREAM_URL is required".to_owned(),
        )),
    }
}

fn build_http_source(upstream: &UpstreamConfig) -> Result<HttpDashboardConfigSource, AppError> {
    let http_client = reqwest::Client::builder()
        .timeout(Duration::from_millis(upstream.timeout_ms))
        .build()
        .map_err(|error| AppError::Internal(format!("failed to build HTTP client: {error}")))?;

    HttpDashboardConfigSource::new(
        http_client,
        upstream.base_url.as_str(),
        upstream.bearer_token.clone(),
        upstream.max_attempts,
        upstream.retry_backoff_ms,
    )
}

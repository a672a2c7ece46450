use axum::Json;
use axum::extract::{Extension, Path, State};
use axum::http::StatusCode;
use terreno_core::{AppError, SessionIdentity};
use terreno_domain::DashboardSection;

use crate::dto::{DashboardSectionsResponse, PermissionRefreshResponse, SectionVisibilityResponse};
use crate::error::ApiResult;
use crate::state::AppState;

pub async fn list_sections_handler(
    State(state): State<AppState>,
    Extension(identity): Extension<SessionIdentity>,
) -> Json<DashboardSectionsResponse> {
    let role = state.dashboard_service.session_role(&identity);
    let sections = state.dashboard_service.section_visibilities(&identity).await;

    Json(DashboardSectionsResponse::new(role, sections))
}

pub async fn section_handler(
    State(state): State<AppState>,
    Extension(identity): Extension<SessionIdentity>,
    Path(section_key): Path<String>,
) -> ApiResult<Json<SectionVisibilityResponse>> {
    let section = DashboardSection::from_transport(section_key.as_str())?;
    let visibility = state
        .dashboard_service
        .section_visibility(&identity, section)
        .await;

    Ok(Json(visibility.into()))
}

pub async fn refresh_permissions_handler(
    State(state): State<AppState>,
    Extension(identity): Extension<SessionIdentity>,
) -> ApiResult<Json<PermissionRefreshResponse>> {
    let role = state
        .dashboard_service
        .session_role(&identity)
        .ok_or_else(|| AppError::Unauthorized("session has no recognized role".to_owned()))?;
    let report = state.dashboard_service.refresh_permissions(role).await;

    Ok(Json(report.into()))
}

pub async fn reset_permissions_handler(
    State(state): State<AppState>,
    Extension(identity): Extension<SessionIdentity>,
) -> ApiResult<StatusCode> {
    let role = state
        .dashboard_service
        .session_role(&identity)
        .ok_or_else(|| AppError::Unauthorized("session has no recognized role".to_owned()))?;
    state.dashboard_service.invalidate(role);

    Ok(StatusCode::NO_CONTENT)
}

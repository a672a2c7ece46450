use axum::Json;
use axum::extract::{Extension, State};
use terreno_core::SessionIdentity;
use terreno_domain::DashboardSection;

use crate::dto::HierarchyResponse;
use crate::error::ApiResult;
use crate::state::AppState;

pub async fn hierarchy_handler(
    State(state): State<AppState>,
    Extension(identity): Extension<SessionIdentity>,
) -> ApiResult<Json<HierarchyResponse>> {
    state
        .dashboard_service
        .require_section(&identity, DashboardSection::NetworkStructure)
        .await?;

    let snapshot = state.hierarchy_service.load_hierarchy(&identity).await?;

    Ok(Json(HierarchyResponse::from(&snapshot)))
}

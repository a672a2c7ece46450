use terreno_application::{DashboardService, HierarchyService};

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub dashboard_service: DashboardService,
    pub hierarchy_service: HierarchyService,
}

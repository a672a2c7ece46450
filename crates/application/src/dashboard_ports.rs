use async_trait::async_trait;
use terreno_core::{AppResult, SessionIdentity};
use terreno_domain::{HierarchyPayload, ProfileConfigurationDocument, Role, WidgetConfigDocument};

/// Port for the remote documents that drive the dashboard.
///
/// Implementations own transport concerns such as retries and authentication.
#[async_trait]
pub trait DashboardConfigSource: Send + Sync {
    /// Fetches the profile configuration of one role.
    async fn fetch_feature_permissions(
        &self,
        role: Role,
    ) -> AppResult<ProfileConfigurationDocument>;

    /// Fetches the dashboard widget configuration of every role.
    async fn fetch_widget_config(&self) -> AppResult<WidgetConfigDocument>;

    /// Fetches the leadership hierarchy visible to the session.
    async fn fetch_hierarchy(&self, identity: &SessionIdentity) -> AppResult<HierarchyPayload>;
}

use std::collections::BTreeMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use terreno_core::{AppError, AppResult, SessionIdentity};
use terreno_domain::{
    DashboardSection, HierarchyPayload, ProfileConfiguration, ProfileConfigurationDocument, Role,
    RoleWidgetEntry, WidgetConfigDocument,
};

use super::DashboardService;
use crate::{DashboardConfigSource, LoadOutcome, VisibilityDecision};

#[derive(Default)]
struct FakeDashboardConfigSource {
    profiles: BTreeMap<Role, Vec<String>>,
    widgets: Option<WidgetConfigDocument>,
    profile_fetches: AtomicUsize,
}

#[async_trait]
impl DashboardConfigSource for FakeDashboardConfigSource {
    async fn fetch_feature_permissions(
        &self,
        role: Role,
    ) -> AppResult<ProfileConfigurationDocument> {
        self.profile_fetches.fetch_add(1, Ordering::SeqCst);
        self.profiles
            .get(&role)
            .map(|options| ProfileConfigurationDocument {
                configuracion: ProfileConfiguration {
                    opciones_web: options.clone(),
                },
            })
            .ok_or_else(|| AppError::NotFound(format!("no profile for role '{role}'")))
    }

    async fn fetch_widget_config(&self) -> AppResult<WidgetConfigDocument> {
        self.widgets
            .clone()
            .ok_or_else(|| AppError::Internal("dashboard configuration unavailable".to_owned()))
    }

    async fn fetch_hierarchy(&self, _identity: &SessionIdentity) -> AppResult<HierarchyPayload> {
        Ok(HierarchyPayload::default())
    }
}

fn widget_document(entries: &[(&str, &[&str])]) -> WidgetConfigDocument {
    entries
        .iter()
        .map(|(role, widgets)| {
            (
                (*role).to_owned(),
                RoleWidgetEntry {
                    widgets: widgets.iter().map(|widget| (*widget).to_owned()).collect(),
                },
            )
        })
        .collect()
}

fn identity(role: &str) -> SessionIdentity {
    SessionIdentity::new(Some("u-1".to_owned()), Some(role.to_owned()))
}

#[tokio::test]
async fn first_query_loads_documents_for_the_role() {
    let source = Arc::new(FakeDashboardConfigSource {
        profiles: BTreeMap::from([(Role::Admin, vec!["personas".to_owned()])]),
        widgets: Some(widget_document(&[("admin", &["total-personas"])])),
        ..FakeDashboardConfigSource::default()
    });
    let service = DashboardService::new(source.clone());

    let visibility = service
        .section_visibility(&identity("admin"), DashboardSection::People)
        .await;
    assert_eq!(visibility.decision, VisibilityDecision::Visible);

    service
        .section_visibility(&identity("admin"), DashboardSection::Leaders)
        .await;
    assert_eq!(source.profile_fetches.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn failed_widget_document_hides_gated_sections() {
    let source = Arc::new(FakeDashboardConfigSource {
        profiles: BTreeMap::from([(Role::LiderZona, vec!["personas".to_owned()])]),
        widgets: None,
        ..FakeDashboardConfigSource::default()
    });
    let service = DashboardService::new(source);

    let report = service.refresh_permissions(Role::LiderZona).await;
    assert_eq!(report.feature_permissions, LoadOutcome::Applied);
    assert_eq!(report.widget_config, LoadOutcome::Failed);

    let visibility = service
        .section_visibility(&identity("lider_zona"), DashboardSection::People)
        .await;
    assert_eq!(
        visibility.decision,
        VisibilityDecision::WidgetConfigNotLoaded
    );
}

#[tokio::test]
async fn unknown_session_role_sees_nothing() {
    let service = DashboardService::new(Arc::new(FakeDashboardConfigSource::default()));

    let visibilities = service
        .section_visibilities(&identity("coordinador"))
        .await;
    assert!(
        visibilities
            .iter()
            .all(|visibility| visibility.decision == VisibilityDecision::NoRole)
    );
    assert_eq!(visibilities.len(), DashboardSection::all().len());
}

#[tokio::test]
async fn require_section_forbids_hidden_sections() {
    let source = Arc::new(FakeDashboardConfigSource {
        profiles: BTreeMap::from([(Role::LiderZona, vec!["estructura-red".to_owned()])]),
        widgets: Some(widget_document(&[("lider_zona", &["total-personas"])])),
        ..FakeDashboardConfigSource::default()
    });
    let service = DashboardService::new(source);

    let result = service
        .require_section(&identity("lider_zona"), DashboardSection::NetworkStructure)
        .await;
    assert!(matches!(result, Err(AppError::Forbidden(_))));
}

#[tokio::test]
async fn invalidate_drops_documents_until_next_refresh() {
    let source = Arc::new(FakeDashboardConfigSource {
        profiles: BTreeMap::from([(Role::Admin, vec!["personas".to_owned()])]),
        widgets: Some(widget_document(&[("admin", &["total-personas"])])),
        ..FakeDashboardConfigSource::default()
    });
    let service = DashboardService::new(source);
    service.refresh_permissions(Role::Admin).await;

    service.invalidate(Role::Admin);
    let visibility = service
        .section_visibility(&identity("admin"), DashboardSection::People)
        .await;
    assert_eq!(
        visibility.decision,
        VisibilityDecision::FeaturePermissionsNotLoaded
    );

    service.refresh_permissions(Role::Admin).await;
    let visibility = service
        .section_visibility(&identity("admin"), DashboardSection::People)
        .await;
    assert!(visibility.decision.is_visible());
}

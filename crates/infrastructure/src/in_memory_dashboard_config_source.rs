use std::collections::BTreeMap;

use async_trait::async_trait;
use terreno_application::DashboardConfigSource;
use terreno_core::{AppError, AppResult, SessionIdentity};
use terreno_domain::{
    HierarchyNodePayload, HierarchyPayload, NodeIdPayload, ProfileConfiguration,
    ProfileConfigurationDocument, Role, RoleWidgetEntry, WidgetConfigDocument,
};
use tokio::sync::RwLock;

#[derive(Debug, Clone, Default)]
struct Documents {
    profiles: BTreeMap<Role, ProfileConfigurationDocument>,
    widgets: Option<WidgetConfigDocument>,
    hierarchy: Option<HierarchyPayload>,
}

/// In-memory adapter serving dashboard documents held in process.
#[derive(Default)]
pub struct InMemoryDashboardConfigSource {
    documents: RwLock<Documents>,
}

impl InMemoryDashboardConfigSource {
    /// Creates an empty source; every fetch fails until documents are set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a source preloaded with a small demo network.
    #[must_use]
    pub fn demo() -> Self {
        let profiles = Role::all()
            .iter()
            .map(|role| (*role, profile_document(demo_features(*role))))
            .collect();
        let widgets = Role::all()
            .iter()
            .map(|role| {
                (
                    role.as_str().to_owned(),
                    RoleWidgetEntry {
                        widgets: demo_widgets(*role).iter().map(|key| (*key).to_owned()).collect(),
                    },
                )
            })
            .collect();

        Self {
            documents: RwLock::new(Documents {
                profiles,
                widgets: Some(widgets),
                hierarchy: Some(demo_hierarchy()),
            }),
        }
    }

    /// Replaces the profile configuration of one role.
    pub async fn set_profile(&self, role: Role, document: ProfileConfigurationDocument) {
        self.documents.write().await.profiles.insert(role, document);
    }

    /// Replaces the widget configuration document.
    pub async fn set_widget_config(&self, document: WidgetConfigDocument) {
        self.documents.write().await.widgets = Some(document);
    }

    /// Replaces the hierarchy payload.
    pub async fn set_hierarchy(&self, payload: HierarchyPayload) {
        self.documents.write().await.hierarchy = Some(payload);
    }
}

#[async_trait]
impl DashboardConfigSource for InMemoryDashboardConfigSource {
    async fn fetch_feature_permissions(
        &self,
        role: Role,
    ) -> AppResult<ProfileConfigurationDocument> {
        self.documents
            .read()
            .await
            .profiles
            .get(&role)
            .cloned()
            .ok_or_else(|| {
                AppError::NotFound(format!("no profile configuration for role '{role}'"))
            })
    }

    async fn fetch_widget_config(&self) -> AppResult<WidgetConfigDocument> {
        self.documents
            .read()
            .await
            .widgets
            .clone()
            .ok_or_else(|| AppError::NotFound("no dashboard configuration".to_owned()))
    }

    async fn fetch_hierarchy(&self, _identity: &SessionIdentity) -> AppResult<HierarchyPayload> {
        self.documents
            .read()
            .await
            .hierarchy
            .clone()
            .ok_or_else(|| AppError::NotFound("no hierarchy payload".to_owned()))
    }
}

fn profile_document(features: &[&str]) -> ProfileConfigurationDocument {
    ProfileConfigurationDocument {
        configuracion: ProfileConfiguration {
            opciones_web: features.iter().map(|key| (*key).to_owned()).collect(),
        },
    }
}

fn demo_features(role: Role) -> &'static [&'static str] {
    match role {
        Role::SuperAdmin | Role::Admin => &[
            "perfil",
            "personas",
            "lideres",
            "estadisticas",
            "reportes",
            "eventos",
            "estructura-red",
        ],
        Role::LiderDepartamental | Role::LiderMunicipal => &[
            "perfil",
            "personas",
            "lideres",
            "eventos",
            "estructura-red",
        ],
        Role::LiderZona | Role::LiderComunal => &[
            "perfil",
            "personas",
            "eventos",
            "estructura-red",
        ],
        Role::Digitador => &["perfil", "personas"],
        Role::Ciudadano => &["perfil", "reportes"],
    }
}

fn demo_widgets(role: Role) -> &'static [&'static str] {
    match role {
        Role::SuperAdmin | Role::Admin => &[
            "total-personas",
            "total-lideres",
            "estadisticas-generales",
            "reportes-ciudadanos",
            "proximos-eventos",
            "estructura-red",
        ],
        Role::LiderDepartamental | Role::LiderMunicipal => &[
            "total-personas",
            "total-lideres",
            "proximos-eventos",
            "estructura-red",
        ],
        Role::LiderZona | Role::LiderComunal => &["total-personas", "proximos-eventos"],
        Role::Digitador => &["total-personas"],
        Role::Ciudadano => &["reportes-ciudadanos"],
    }
}

fn demo_node(
    id: i64,
    name: &str,
    role: Role,
    direct: i64,
    subordinates: Vec<HierarchyNodePayload>,
) -> HierarchyNodePayload {
    HierarchyNodePayload {
        id: NodeIdPayload::Number(id),
        nombre: name.to_owned(),
        rol: role.as_str().to_owned(),
        personas_directas: Some(direct),
        total_personas: None,
        total_subordinados: None,
        subordinados: subordinates,
    }
}

fn demo_hierarchy() -> HierarchyPayload {
    let root = demo_node(
        1,
        "Dirección general",
        Role::LiderDepartamental,
        4,
        vec![
            demo_node(
                2,
                "Municipio norte",
                Role::LiderMunicipal,
                3,
                vec![
                    demo_node(4, "Zona 1", Role::LiderZona, 6, vec![]),
                    demo_node(
                        5,
                        "Zona 2",
                        Role::LiderZona,
                        2,
                        vec![demo_node(7, "Comuna 2A", Role::LiderComunal, 5, vec![])],
                    ),
                ],
            ),
            demo_node(
                3,
                "Municipio sur",
                Role::LiderMunicipal,
                1,
                vec![demo_node(6, "Zona 3", Role::LiderZona, 8, vec![])],
            ),
        ],
    );

    HierarchyPayload {
        lider_general: Some(root),
        total_personas_red: None,
        total_lideres_red: None,
        niveles_jerarquia: None,
    }
}

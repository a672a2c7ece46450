use serde::Serialize;
use terreno_application::{HierarchySnapshot, PermissionRefreshReport, SectionVisibility};
use terreno_domain::{AggregateSource, HierarchyNode, HierarchyTree, NetworkSummary, Role};
use ts_rs::TS;

/// Health response payload.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/health-response.ts"
)]
pub struct HealthResponse {
    pub status: &'static str,
}

/// API representation of one dashboard section and its visibility.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/section-visibility-response.ts"
)]
pub struct SectionVisibilityResponse {
    pub section: String,
    pub permission_key: String,
    pub widget_key: String,
    pub visible: bool,
    pub reason: String,
}

impl From<SectionVisibility> for SectionVisibilityResponse {
    fn from(value: SectionVisibility) -> Self {
        let requirement = value.section.requirement();
        Self {
            section: value.section.as_str().to_owned(),
            permission_key: requirement.permission_key.to_owned(),
            widget_key: requirement.widget.as_str().to_owned(),
            visible: value.decision.is_visible(),
            reason: value.decision.as_str().to_owned(),
        }
    }
}

/// Dashboard sections for the calling session.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/dashboard-sections-response.ts"
)]
pub struct DashboardSectionsResponse {
    pub role: Option<String>,
    pub role_label: Option<String>,
    pub sections: Vec<SectionVisibilityResponse>,
}

impl DashboardSectionsResponse {
    pub fn new(role: Option<Role>, sections: Vec<SectionVisibility>) -> Self {
        Self {
            role: role.map(|role| role.as_str().to_owned()),
            role_label: role.map(|role| role.label().to_owned()),
            sections: sections.into_iter().map(Into::into).collect(),
        }
    }
}

/// Outcome of reloading the permission documents.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/permission-refresh-response.ts"
)]
pub struct PermissionRefreshResponse {
    pub role: String,
    pub feature_permissions: String,
    pub widget_config: String,
}

impl From<PermissionRefreshReport> for PermissionRefreshResponse {
    fn from(value: PermissionRefreshReport) -> Self {
        Self {
            role: value.role.as_str().to_owned(),
            feature_permissions: value.feature_permissions.as_str().to_owned(),
            widget_config: value.widget_config.as_str().to_owned(),
        }
    }
}

/// One node of the flattened hierarchy, in depth-first order.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/hierarchy-node-response.ts"
)]
pub struct HierarchyNodeResponse {
    pub id: String,
    pub parent_id: Option<String>,
    pub name: String,
    pub role: String,
    pub role_label: String,
    pub depth: u32,
    pub child_count: u32,
    #[ts(type = "number")]
    pub direct_person_count: u64,
    #[ts(type = "number")]
    pub total_person_count: u64,
    #[ts(type = "number")]
    pub total_subordinate_count: u64,
}

impl HierarchyNodeResponse {
    fn from_node(tree: &HierarchyTree, node: &HierarchyNode, snapshot: &HierarchySnapshot) -> Self {
        Self {
            id: node.id().to_owned(),
            parent_id: tree.parent(node).map(|parent| parent.id().to_owned()),
            name: node.name().to_owned(),
            role: node.role().as_str().to_owned(),
            role_label: node.role().label().to_owned(),
            depth: u32::try_from(node.depth()).unwrap_or(u32::MAX),
            child_count: u32::try_from(node.child_count()).unwrap_or(u32::MAX),
            direct_person_count: node.direct_person_count(),
            total_person_count: node.person_total(snapshot.aggregate_source),
            total_subordinate_count: node.subordinate_total(snapshot.aggregate_source),
        }
    }
}

/// Network-wide totals.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/network-summary-response.ts"
)]
pub struct NetworkSummaryResponse {
    #[ts(type = "number")]
    pub total_people: u64,
    #[ts(type = "number")]
    pub total_leaders: u64,
    #[ts(type = "number")]
    pub levels: u64,
}

impl From<NetworkSummary> for NetworkSummaryResponse {
    fn from(value: NetworkSummary) -> Self {
        Self {
            total_people: value.total_people,
            total_leaders: value.total_leaders,
            levels: value.levels,
        }
    }
}

/// Aggregated leadership hierarchy.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/hierarchy-response.ts"
)]
pub struct HierarchyResponse {
    pub summary: NetworkSummaryResponse,
    pub uses_reported_totals: bool,
    pub mismatch_count: u32,
    pub nodes: Vec<HierarchyNodeResponse>,
}

impl From<&HierarchySnapshot> for HierarchyResponse {
    fn from(value: &HierarchySnapshot) -> Self {
        Self {
            summary: value.summary().into(),
            uses_reported_totals: value.aggregate_source == AggregateSource::Reported,
            mismatch_count: u32::try_from(value.mismatches.len()).unwrap_or(u32::MAX),
            nodes: value
                .tree
                .traverse()
                .map(|(node, _)| HierarchyNodeResponse::from_node(&value.tree, node, value))
                .collect(),
        }
    }
}

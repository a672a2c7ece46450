//! Domain entities and invariants.

#![forbid(unsafe_code)]

mod dashboard;
mod hierarchy;
mod permission_documents;
mod role;

pub use dashboard::{DashboardSection, SectionRequirement, UNGATED_WIDGET_KEY, WidgetGate};
pub use hierarchy::{
    AggregateMismatch, AggregateSource, FlatHierarchyRecord, HierarchyNode,
    HierarchyNodePayload, HierarchyPayload, HierarchyTree, MismatchScope, NetworkSummary,
    NodeIdPayload, ReportedNetworkSummary, ReportedTotals, StructuralError, Traverse,
};
pub use permission_documents::{
    FeaturePermissionSet, ProfileConfiguration, ProfileConfigurationDocument, RoleWidgetEntry,
    WidgetConfig, WidgetConfigDocument,
};
pub use role::Role;

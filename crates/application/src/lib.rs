//! Application services and ports.

#![forbid(unsafe_code)]

mod dashboard_ports;
mod dashboard_service;
mod hierarchy_service;
mod permission_store;
mod visibility;

pub use dashboard_ports::DashboardConfigSource;
pub use dashboard_service::{DashboardService, PermissionRefreshReport};
pub use hierarchy_service::{HierarchyService, HierarchySnapshot};
pub use permission_store::{
    DocumentKind, DocumentState, LoadOutcome, LoadTicket, PermissionSnapshot, PermissionStore,
};
pub use visibility::{
    SectionVisibility, VisibilityDecision, VisibilityResolver, explain_visibility,
};

use std::sync::Arc;

use terreno_domain::{DashboardSection, Role, WidgetGate};
use tracing::debug;

use crate::{PermissionSnapshot, PermissionStore};

/// Why a section is shown or hidden.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VisibilityDecision {
    /// Both permission layers allow the section.
    Visible,
    /// The session has no role.
    NoRole,
    /// The feature permission document is pending or failed.
    FeaturePermissionsNotLoaded,
    /// The role lacks the section's feature key.
    FeatureNotGranted,
    /// The widget configuration document is pending or failed.
    WidgetConfigNotLoaded,
    /// The role's dashboard does not enable the section's widget.
    WidgetNotEnabled,
}

impl VisibilityDecision {
    /// Returns whether the decision shows the section.
    #[must_use]
    pub fn is_visible(&self) -> bool {
        matches!(self, Self::Visible)
    }

    /// Returns a stable transport value for this decision.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Visible => "visible",
            Self::NoRole => "no_role",
            Self::FeaturePermissionsNotLoaded => "feature_permissions_not_loaded",
            Self::FeatureNotGranted => "feature_not_granted",
            Self::WidgetConfigNotLoaded => "widget_config_not_loaded",
            Self::WidgetNotEnabled => "widget_not_enabled",
        }
    }
}

/// Visibility of one section for one role.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SectionVisibility {
    /// Evaluated section.
    pub section: DashboardSection,
    /// Decision and its reason.
    pub decision: VisibilityDecision,
}

/// Decides a section's visibility against one snapshot.
///
/// Missing documents hide the section; the result only depends on the inputs.
#[must_use]
pub fn explain_visibility(
    snapshot: &PermissionSnapshot,
    section: DashboardSection,
    role: Option<Role>,
) -> VisibilityDecision {
    let Some(role) = role else {
        return VisibilityDecision::NoRole;
    };
    let requirement = section.requirement();

    let Some(feature_permissions) = snapshot.feature_permissions.loaded() else {
        return VisibilityDecision::FeaturePermissionsNotLoaded;
    };
    if !feature_permissions.allows(role, requirement.permission_key) {
        return VisibilityDecision::FeatureNotGranted;
    }

    let Some(widget_config) = snapshot.widget_config.loaded() else {
        return VisibilityDecision::WidgetConfigNotLoaded;
    };
    match requirement.widget {
        WidgetGate::Ungated => VisibilityDecision::Visible,
        WidgetGate::Widget(widget_key) if widget_config.enables(role, widget_key) => {
            VisibilityDecision::Visible
        }
        WidgetGate::Widget(_) => VisibilityDecision::WidgetNotEnabled,
    }
}

/// Resolves section visibility against a permission store.
#[derive(Debug, Clone)]
pub struct VisibilityResolver {
    store: Arc<PermissionStore>,
}

impl VisibilityResolver {
    /// Creates a resolver over a store.
    #[must_use]
    pub fn new(store: Arc<PermissionStore>) -> Self {
        Self { store }
    }

    /// Returns whether the section may be shown to the role.
    #[must_use]
    pub fn is_visible(&self, section: DashboardSection, role: Option<Role>) -> bool {
        self.explain(section, role).is_visible()
    }

    /// Returns the decision for one section with its reason.
    #[must_use]
    pub fn explain(&self, section: DashboardSection, role: Option<Role>) -> VisibilityDecision {
        let decision = explain_visibility(self.store.snapshot().as_ref(), section, role);
        debug!(
            section = section.as_str(),
            role = role.map(|role| role.as_str()).unwrap_or("none"),
            decision = decision.as_str(),
            "resolved section visibility"
        );
        decision
    }

    /// Evaluates every section against a single snapshot.
    #[must_use]
    pub fn section_visibilities(&self, role: Option<Role>) -> Vec<SectionVisibility> {
        let snapshot = self.store.snapshot();
        DashboardSection::all()
            .iter()
            .map(|section| SectionVisibility {
                section: *section,
                decision: explain_visibility(snapshot.as_ref(), *section, role),
            })
            .collect()
    }

    /// Returns the visible sections in dashboard order.
    #[must_use]
    pub fn visible_sections(&self, role: Option<Role>) -> Vec<DashboardSection> {
        self.section_visibilities(role)
            .into_iter()
            .filter(|visibility| visibility.decision.is_visible())
            .map(|visibility| visibility.section)
            .collect()
    }
}

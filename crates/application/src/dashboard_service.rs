use std::collections::HashMap;
use std::str::FromStr;
use std::sync::Arc;

use parking_lot::RwLock;
use terreno_core::{AppError, AppResult, SessionIdentity};
use terreno_domain::{DashboardSection, FeaturePermissionSet, Role, WidgetConfig};
use tracing::{info, warn};

use crate::{
    DashboardConfigSource, DocumentKind, LoadOutcome, PermissionStore, SectionVisibility,
    VisibilityResolver,
};

/// Outcome of reloading both permission documents for one role.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PermissionRefreshReport {
    /// Role whose documents were reloaded.
    pub role: Role,
    /// Feature permission load outcome.
    pub feature_permissions: LoadOutcome,
    /// Widget configuration load outcome.
    pub widget_config: LoadOutcome,
}

/// Application service answering which dashboard sections a session may see.
#[derive(Clone)]
pub struct DashboardService {
    source: Arc<dyn DashboardConfigSource>,
    stores: Arc<RwLock<HashMap<Role, Arc<PermissionStore>>>>,
}

impl DashboardService {
    /// Creates a dashboard service over a document source.
    #[must_use]
    pub fn new(source: Arc<dyn DashboardConfigSource>) -> Self {
        Self {
            source,
            stores: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Resolves the session role; unknown role keys count as no role.
    #[must_use]
    pub fn session_role(&self, identity: &SessionIdentity) -> Option<Role> {
        let role_key = identity.role_key()?;
        match Role::from_str(role_key) {
            Ok(role) => Some(role),
            Err(error) => {
                warn!(role_key, error = %error, "ignoring unknown session role");
                None
            }
        }
    }

    /// Reloads both permission documents for a role.
    ///
    /// The two documents load concurrently and publish independently; a failed
    /// load hides the affected sections instead of surfacing an error.
    pub async fn refresh_permissions(&self, role: Role) -> PermissionRefreshReport {
        let store = self.store_for(role);
        let feature_ticket = store.begin_load(DocumentKind::FeaturePermissions);
        let widget_ticket = store.begin_load(DocumentKind::WidgetConfig);

        let (feature_document, widget_document) = futures::join!(
            self.source.fetch_feature_permissions(role),
            self.source.fetch_widget_config()
        );

        let feature_permissions = store.complete_feature_permissions(
            feature_ticket,
            feature_document
                .map(|document| FeaturePermissionSet::from_profile_document(role, document))
                .map_err(|error| error.to_string()),
        );

        let widget_config = store.complete_widget_config(
            widget_ticket,
            widget_document
                .map(|document| {
                    let config = WidgetConfig::from_document(document);
                    if !config.ignored_role_keys().is_empty() {
                        warn!(
                            ignored_roles = ?config.ignored_role_keys(),
                            "widget configuration lists unknown roles"
                        );
                    }
                    config
                })
                .map_err(|error| error.to_string()),
        );

        info!(
            role = role.as_str(),
            feature_permissions = ?feature_permissions,
            widget_config = ?widget_config,
            "permission documents refreshed"
        );

        PermissionRefreshReport {
            role,
            feature_permissions,
            widget_config,
        }
    }

    /// Drops the loaded documents of a role, e.g. after a role change.
    pub fn invalidate(&self, role: Role) {
        if let Some(store) = self.stores.read().get(&role) {
            store.reset();
        }
    }

    /// Returns every section with its visibility decision for the session.
    pub async fn section_visibilities(
        &self,
        identity: &SessionIdentity,
    ) -> Vec<SectionVisibility> {
        let role = self.session_role(identity);
        self.resolver(role).await.section_visibilities(role)
    }

    /// Returns the visibility decision of one section for the session.
    pub async fn section_visibility(
        &self,
        identity: &SessionIdentity,
        section: DashboardSection,
    ) -> SectionVisibility {
        let role = self.session_role(identity);
        SectionVisibility {
            section,
            decision: self.resolver(role).await.explain(section, role),
        }
    }

    /// Ensures the session may see a section.
    pub async fn require_section(
        &self,
        identity: &SessionIdentity,
        section: DashboardSection,
    ) -> AppResult<()> {
        let visibility = self.section_visibility(identity, section).await;
        if visibility.decision.is_visible() {
            return Ok(());
        }

        Err(AppError::Forbidden(format!(
            "section '{}' is hidden for this session ({})",
            section.as_str(),
            visibility.decision.as_str()
        )))
    }

    async fn resolver(&self, role: Option<Role>) -> VisibilityResolver {
        let Some(role) = role else {
            return VisibilityResolver::new(Arc::new(PermissionStore::new()));
        };

        let existing = self.stores.read().get(&role).cloned();
        let store = match existing {
            Some(store) => store,
            None => {
                self.refresh_permissions(role).await;
                self.store_for(role)
            }
        };

        VisibilityResolver::new(store)
    }

    fn store_for(&self, role: Role) -> Arc<PermissionStore> {
        if let Some(store) = self.stores.read().get(&role) {
            return Arc::clone(store);
        }

        Arc::clone(
            self.stores
                .write()
                .entry(role)
                .or_insert_with(|| Arc::new(PermissionStore::new())),
        )
    }
}

#[cfg(test)]
mod tests;

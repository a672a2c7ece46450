use std::sync::Arc;

use parking_lot::RwLock;
use terreno_domain::{FeaturePermissionSet, WidgetConfig};
use tracing::{debug, warn};

/// Load state of one configuration document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DocumentState<T> {
    /// No load has completed yet.
    NotLoaded,
    /// The latest load succeeded.
    Loaded(Arc<T>),
    /// The latest load failed with this reason.
    Failed(String),
}

impl<T> DocumentState<T> {
    /// Returns the document when it is loaded.
    #[must_use]
    pub fn loaded(&self) -> Option<&T> {
        match self {
            Self::Loaded(document) => Some(document.as_ref()),
            Self::NotLoaded | Self::Failed(_) => None,
        }
    }

    /// Returns whether the document is loaded.
    #[must_use]
    pub fn is_loaded(&self) -> bool {
        matches!(self, Self::Loaded(_))
    }
}

/// Immutable view of both permission documents at one point in time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PermissionSnapshot {
    /// Feature permissions per role.
    pub feature_permissions: DocumentState<FeaturePermissionSet>,
    /// Enabled dashboard widgets per role.
    pub widget_config: DocumentState<WidgetConfig>,
}

impl PermissionSnapshot {
    /// Returns a snapshot where neither document is loaded.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            feature_permissions: DocumentState::NotLoaded,
            widget_config: DocumentState::NotLoaded,
        }
    }
}

impl Default for PermissionSnapshot {
    fn default() -> Self {
        Self::empty()
    }
}

/// Permission documents loaded independently of each other.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DocumentKind {
    /// Profile feature permissions.
    FeaturePermissions,
    /// Dashboard widget configuration.
    WidgetConfig,
}

impl DocumentKind {
    /// Returns a stable log value for this document kind.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::FeaturePermissions => "feature_permissions",
            Self::WidgetConfig => "widget_config",
        }
    }
}

/// Handle for one in-flight document load.
///
/// Only the most recently issued ticket of a kind may publish its result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadTicket {
    kind: DocumentKind,
    generation: u64,
}

impl LoadTicket {
    /// Returns the document kind this ticket loads.
    #[must_use]
    pub fn kind(&self) -> DocumentKind {
        self.kind
    }
}

/// Result of publishing a load.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    /// The document replaced the previous one.
    Applied,
    /// The document load failed and the kind is now marked failed.
    Failed,
    /// A newer load or a reset superseded the ticket; nothing changed.
    Stale,
}

impl LoadOutcome {
    /// Returns a stable transport value for this outcome.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Applied => "applied",
            Self::Failed => "failed",
            Self::Stale => "stale",
        }
    }
}

#[derive(Debug)]
struct StoreState {
    snapshot: Arc<PermissionSnapshot>,
    next_generation: u64,
    latest_feature_permissions: Option<u64>,
    latest_widget_config: Option<u64>,
}

impl StoreState {
    fn latest_mut(&mut self, kind: DocumentKind) -> &mut Option<u64> {
        match kind {
            DocumentKind::FeaturePermissions => &mut self.latest_feature_permissions,
            DocumentKind::WidgetConfig => &mut self.latest_widget_config,
        }
    }
}

/// Session holder of the permission documents.
///
/// Every load publishes a new snapshot that replaces the previous one atomically;
/// readers always see one complete snapshot.
#[derive(Debug)]
pub struct PermissionStore {
    state: RwLock<StoreState>,
}

impl Default for PermissionStore {
    fn default() -> Self {
        Self::new()
    }
}

impl PermissionStore {
    /// Creates a store with no documents loaded.
    #[must_use]
    pub fn new() -> Self {
        Self {
            state: RwLock::new(StoreState {
                snapshot: Arc::new(PermissionSnapshot::empty()),
                next_generation: 0,
                latest_feature_permissions: None,
                latest_widget_config: None,
            }),
        }
    }

    /// Returns the current snapshot.
    #[must_use]
    pub fn snapshot(&self) -> Arc<PermissionSnapshot> {
        Arc::clone(&self.state.read().snapshot)
    }

    /// Starts a load of one document kind, superseding older loads of that kind.
    pub fn begin_load(&self, kind: DocumentKind) -> LoadTicket {
        let mut state = self.state.write();
        state.next_generation = state.next_generation.saturating_add(1);
        let generation = state.next_generation;
        *state.latest_mut(kind) = Some(generation);

        LoadTicket { kind, generation }
    }

    /// Publishes the result of a feature permission load.
    pub fn complete_feature_permissions(
        &self,
        ticket: LoadTicket,
        result: Result<FeaturePermissionSet, String>,
    ) -> LoadOutcome {
        self.publish(ticket, DocumentKind::FeaturePermissions, |snapshot| {
            PermissionSnapshot {
                feature_permissions: document_state(result),
                widget_config: snapshot.widget_config.clone(),
            }
        })
    }

    /// Publishes the result of a widget configuration load.
    pub fn complete_widget_config(
        &self,
        ticket: LoadTicket,
        result: Result<WidgetConfig, String>,
    ) -> LoadOutcome {
        self.publish(ticket, DocumentKind::WidgetConfig, |snapshot| {
            PermissionSnapshot {
                feature_permissions: snapshot.feature_permissions.clone(),
                widget_config: document_state(result),
            }
        })
    }

    /// Drops both documents and invalidates every outstanding ticket.
    pub fn reset(&self) {
        let mut state = self.state.write();
        state.snapshot = Arc::new(PermissionSnapshot::empty());
        state.latest_feature_permissions = None;
        state.latest_widget_config = None;
    }

    fn publish(
        &self,
        ticket: LoadTicket,
        expected_kind: DocumentKind,
        replace: impl FnOnce(&PermissionSnapshot) -> PermissionSnapshot,
    ) -> LoadOutcome {
        let mut state = self.state.write();
        let latest = *state.latest_mut(expected_kind);
        if ticket.kind != expected_kind || latest != Some(ticket.generation) {
            debug!(
                document = expected_kind.as_str(),
                generation = ticket.generation,
                "discarding superseded permission document load"
            );
            return LoadOutcome::Stale;
        }

        *state.latest_mut(expected_kind) = None;
        let next = replace(state.snapshot.as_ref());
        let outcome = match (&next.feature_permissions, &next.widget_config, expected_kind) {
            (DocumentState::Failed(reason), _, DocumentKind::FeaturePermissions)
            | (_, DocumentState::Failed(reason), DocumentKind::WidgetConfig) => {
                warn!(
                    document = expected_kind.as_str(),
                    reason = %reason,
                    "permission document load failed; affected sections stay hidden"
                );
                LoadOutcome::Failed
            }
            _ => LoadOutcome::Applied,
        };
        state.snapshot = Arc::new(next);

        outcome
    }
}

fn document_state<T>(result: Result<T, String>) -> DocumentState<T> {
    match result {
        Ok(document) => DocumentState::Loaded(Arc::new(document)),
        Err(reason) => DocumentState::Failed(reason),
    }
}

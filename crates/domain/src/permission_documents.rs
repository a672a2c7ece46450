use std::collections::{BTreeMap, BTreeSet};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::Role;

/// Profile configuration document returned for the current role.
///
/// Shape: `{ "configuracion": { "opciones_web": ["personas", ...] } }`.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ProfileConfigurationDocument {
    /// Profile configuration body.
    #[serde(default)]
    pub configuracion: ProfileConfiguration,
}

/// Body of a profile configuration document.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ProfileConfiguration {
    /// Feature section keys the role may open.
    #[serde(default)]
    pub opciones_web: Vec<String>,
}

/// Widget list of one role inside the dashboard configuration document.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct RoleWidgetEntry {
    /// Enabled widget keys.
    #[serde(default)]
    pub widgets: Vec<String>,
}

/// Dashboard configuration document: `{ "<role>": { "widgets": [...] } }`.
pub type WidgetConfigDocument = BTreeMap<String, RoleWidgetEntry>;

/// Feature keys each role is allowed to access.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FeaturePermissionSet {
    features: BTreeMap<Role, BTreeSet<String>>,
}

impl FeaturePermissionSet {
    /// Creates a permission set from explicit role grants.
    #[must_use]
    pub fn new<I, K>(grants: impl IntoIterator<Item = (Role, I)>) -> Self
    where
        I: IntoIterator<Item = K>,
        K: Into<String>,
    {
        let features = grants
            .into_iter()
            .map(|(role, keys)| (role, normalize_keys(keys)))
            .collect();

        Self { features }
    }

    /// Builds the permission set carried by one role's profile document.
    #[must_use]
    pub fn from_profile_document(role: Role, document: ProfileConfigurationDocument) -> Self {
        Self::new([(role, document.configuracion.opciones_web)])
    }

    /// Returns whether the role holds the feature key.
    #[must_use]
    pub fn allows(&self, role: Role, permission_key: &str) -> bool {
        self.features
            .get(&role)
            .is_some_and(|keys| keys.contains(permission_key))
    }

    /// Returns the feature keys granted to a role.
    #[must_use]
    pub fn features_for(&self, role: Role) -> Option<&BTreeSet<String>> {
        self.features.get(&role)
    }
}

/// Widget keys enabled on each role's dashboard.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct WidgetConfig {
    widgets: BTreeMap<Role, BTreeSet<String>>,
    ignored_role_keys: Vec<String>,
}

impl WidgetConfig {
    /// Creates a widget configuration from explicit role entries.
    #[must_use]
    pub fn new<I, K>(entries: impl IntoIterator<Item = (Role, I)>) -> Self
    where
        I: IntoIterator<Item = K>,
        K: Into<String>,
    {
        let widgets = entries
            .into_iter()
            .map(|(role, keys)| (role, normalize_keys(keys)))
            .collect();

        Self {
            widgets,
            ignored_role_keys: Vec::new(),
        }
    }

    /// Builds a widget configuration from the dashboard configuration document.
    ///
    /// Entries keyed by an unknown role are skipped and reported through
    /// [`WidgetConfig::ignored_role_keys`].
    #[must_use]
    pub fn from_document(document: WidgetConfigDocument) -> Self {
        let mut widgets = BTreeMap::new();
        let mut ignored_role_keys = Vec::new();

        for (role_key, entry) in document {
            match Role::from_str(role_key.trim()) {
                Ok(role) => {
                    widgets.insert(role, normalize_keys(entry.widgets));
                }
                Err(_) => ignored_role_keys.push(role_key),
            }
        }

        Self {
            widgets,
            ignored_role_keys,
        }
    }

    /// Returns whether the widget is enabled for the role.
    #[must_use]
    pub fn enables(&self, role: Role, widget_key: &str) -> bool {
        self.widgets
            .get(&role)
            .is_some_and(|keys| keys.contains(widget_key))
    }

    /// Returns the widget keys enabled for a role.
    #[must_use]
    pub fn widgets_for(&self, role: Role) -> Option<&BTreeSet<String>> {
        self.widgets.get(&role)
    }

    /// Returns document role keys that did not name a known role.
    #[must_use]
    pub fn ignored_role_keys(&self) -> &[String] {
        &self.ignored_role_keys
    }
}

fn normalize_keys<K: Into<String>>(keys: impl IntoIterator<Item = K>) -> BTreeSet<String> {
    keys.into_iter()
        .filter_map(|key| {
            let key = key.into();
            let trimmed = key.trim();
            (!trimmed.is_empty()).then(|| trimmed.to_owned())
        })
        .collect()
}

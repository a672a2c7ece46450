use serde::{Deserialize, Serialize};

/// Raw hierarchy response of the network endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct HierarchyPayload {
    /// Root leader of the network.
    #[serde(default)]
    pub lider_general: Option<HierarchyNodePayload>,
    /// Upstream total of people in the network.
    #[serde(default)]
    pub total_personas_red: Option<i64>,
    /// Upstream total of leaders in the network.
    #[serde(default)]
    pub total_lideres_red: Option<i64>,
    /// Upstream count of hierarchy levels.
    #[serde(default)]
    pub niveles_jerarquia: Option<i64>,
}

/// One leader inside a nested hierarchy payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HierarchyNodePayload {
    /// Node identifier, numeric or textual.
    pub id: NodeIdPayload,
    /// Display name.
    #[serde(default)]
    pub nombre: String,
    /// Role transport value.
    pub rol: String,
    /// People managed directly by this leader, when the upstream sends it.
    #[serde(default)]
    pub personas_directas: Option<i64>,
    /// Upstream pre-aggregated people total for the subtree.
    #[serde(default)]
    pub total_personas: Option<i64>,
    /// Upstream pre-aggregated subordinate total for the subtree.
    #[serde(default)]
    pub total_subordinados: Option<i64>,
    /// Direct subordinates in display order.
    #[serde(default)]
    pub subordinados: Vec<HierarchyNodePayload>,
}

/// One leader inside a flat roster with parent references.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlatHierarchyRecord {
    /// Node identifier, numeric or textual.
    pub id: NodeIdPayload,
    /// Display name.
    #[serde(default)]
    pub nombre: String,
    /// Role transport value.
    pub rol: String,
    /// People managed directly by this leader.
    #[serde(default)]
    pub personas_directas: i64,
    /// Parent identifier; `None` marks the root.
    #[serde(default)]
    pub parent_id: Option<NodeIdPayload>,
}

/// Node identifiers arrive either as JSON numbers or strings.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum NodeIdPayload {
    /// Numeric identifier.
    Number(i64),
    /// Textual identifier.
    Text(String),
}

impl NodeIdPayload {
    /// Returns the canonical string form used as node id.
    #[must_use]
    pub fn canonical(&self) -> String {
        match self {
            Self::Number(value) => value.to_string(),
            Self::Text(value) => value.trim().to_owned(),
        }
    }
}

impl From<&str> for NodeIdPayload {
    fn from(value: &str) -> Self {
        Self::Text(value.to_owned())
    }
}

impl From<i64> for NodeIdPayload {
    fn from(value: i64) -> Self {
        Self::Number(value)
    }
}

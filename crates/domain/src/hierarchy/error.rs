use terreno_core::AppError;
use thiserror::Error;

/// Malformed hierarchy input. Building never exposes a partial tree.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StructuralError {
    /// The payload carries no root node.
    #[error("hierarchy has no root node")]
    MissingRoot,

    /// A flat roster carries more than one record without parent.
    #[error("hierarchy has more than one root: '{first}' and '{second}'")]
    MultipleRoots {
        /// First root found.
        first: String,
        /// Second root found.
        second: String,
    },

    /// A node identifier is blank.
    #[error("hierarchy node identifier must not be empty")]
    EmptyIdentifier,

    /// Two unrelated nodes share an identifier.
    #[error("duplicate hierarchy node id '{id}'")]
    DuplicateId {
        /// Repeated identifier.
        id: String,
    },

    /// A node lists itself as its own subordinate or parent.
    #[error("hierarchy node '{id}' references itself")]
    SelfReference {
        /// Offending identifier.
        id: String,
    },

    /// A node points back to one of its ancestors.
    #[error("hierarchy node '{id}' closes a cycle")]
    Cycle {
        /// Identifier that closes the cycle.
        id: String,
    },

    /// A node carries a negative count.
    #[error("hierarchy node '{id}' has negative {field}: {value}")]
    NegativeCount {
        /// Offending identifier.
        id: String,
        /// Payload field name.
        field: &'static str,
        /// Received value.
        value: i64,
    },

    /// A network-level summary field is negative.
    #[error("hierarchy summary has negative {field}: {value}")]
    NegativeSummaryCount {
        /// Payload field name.
        field: &'static str,
        /// Received value.
        value: i64,
    },

    /// A flat record references a parent that is not in the roster.
    #[error("hierarchy node '{id}' references unknown parent '{parent_id}'")]
    UnknownParent {
        /// Offending identifier.
        id: String,
        /// Missing parent identifier.
        parent_id: String,
    },

    /// A node carries a role value outside the role catalogue.
    #[error("hierarchy node '{id}' has unknown role '{role}'")]
    UnknownRole {
        /// Offending identifier.
        id: String,
        /// Received role value.
        role: String,
    },
}

impl From<StructuralError> for AppError {
    fn from(value: StructuralError) -> Self {
        AppError::Unavailable(format!("hierarchy unavailable: {value}"))
    }
}

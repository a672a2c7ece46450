use serde::{Deserialize, Serialize};

/// Identity supplied by the external session provider for the current request.
///
/// Role keys are kept as raw transport strings here; the domain crate owns their
/// interpretation.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SessionIdentity {
    subject: Option<String>,
    role_key: Option<String>,
}

impl SessionIdentity {
    /// Creates a session identity from provider data.
    #[must_use]
    pub fn new(subject: Option<String>, role_key: Option<String>) -> Self {
        let normalize = |value: String| {
            let trimmed = value.trim().to_owned();
            (!trimmed.is_empty()).then_some(trimmed)
        };

        Self {
            subject: subject.and_then(normalize),
            role_key: role_key.and_then(normalize),
        }
    }

    /// Returns an identity without subject or role.
    #[must_use]
    pub fn anonymous() -> Self {
        Self::default()
    }

    /// Returns the stable subject claim, if the provider supplied one.
    #[must_use]
    pub fn subject(&self) -> Option<&str> {
        self.subject.as_deref()
    }

    /// Returns the raw role key of the session.
    #[must_use]
    pub fn role_key(&self) -> Option<&str> {
        self.role_key.as_deref()
    }
}

use serde::{Deserialize, Serialize};

/// Operator information attached to every console request.
///
/// Authentication itself lives outside this slice; the identity is resolved
/// by the API layer and carried through for audit attribution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserIdentity {
    subject: String,
    display_name: String,
    role: String,
}

impl UserIdentity {
    /// Creates a user identity from resolved console credentials.
    #[must_use]
    pub fn new(
        subject: impl Into<String>,
        display_name: impl Into<String>,
        role: impl Into<String>,
    ) -> Self {
        Self {
            subject: subject.into(),
            display_name: display_name.into(),
            role: role.into(),
        }
    }

    /// Returns the stable subject identifier for the operator.
    #[must_use]
    pub fn subject(&self) -> &str {
        self.subject.as_str()
    }

    /// Returns the display name for the current operator.
    #[must_use]
    pub fn display_name(&self) -> &str {
        self.display_name.as_str()
    }

    /// Returns the console role label for the operator.
    #[must_use]
    pub fn role(&self) -> &str {
        self.role.as_str()
    }
}

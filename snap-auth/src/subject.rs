use serde::{Deserialize, Serialize};

/// Opaque identifier for an authenticated principal.
///
/// A subject is created at login time by whatever authenticates the caller;
/// once embedded in a token it is never rewritten.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Subject(String);

impl Subject {
    pub fn new<S: Into<String>>(id: S) -> Self {
        Self(id.into())
    }

    /// Get the inner string
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for Subject {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for Subject {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl std::fmt::Display for Subject {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

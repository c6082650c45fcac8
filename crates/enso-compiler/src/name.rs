//! Qualified module names

use serde::{Deserialize, Serialize};
use std::fmt;

/// Dot-separated module path such as `Standard.Base.Data.Vector`
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct QualifiedName(String);

impl QualifiedName {
    /// Create a qualified name from its dotted representation
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// The dotted representation
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Last path segment (`Vector` for `Standard.Base.Data.Vector`)
    pub fn item(&self) -> &str {
        self.0.rsplit('.').next().unwrap_or(&self.0)
    }

    /// Name without its last segment, if any
    pub fn parent(&self) -> Option<QualifiedName> {
        self.0
            .rsplit_once('.')
            .map(|(parent, _)| QualifiedName(parent.to_string()))
    }
}

impl fmt::Display for QualifiedName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for QualifiedName {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

impl From<String> for QualifiedName {
    fn from(name: String) -> Self {
        Self(name)
    }
}

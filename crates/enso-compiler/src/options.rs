//! Resolution options

use serde::{Deserialize, Serialize};

/// Switches for the optional checks of export resolution
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ResolutionOptions {
    /// Report and suppress exports that violate module privacy
    pub enforce_privacy: bool,
    /// Report names that resolve to more than one entity
    pub report_ambiguity: bool,
}

impl Default for ResolutionOptions {
    fn default() -> Self {
        Self {
            enforce_privacy: true,
            report_ambiguity: true,
        }
    }
}

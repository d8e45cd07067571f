//! Deployment mode.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Where the process runs.
///
/// Local mode simulates the policy service and returns logout to the
/// loopback host. Production is the default so a missing setting never
/// enables the simulation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeploymentMode {
    /// Developer machine.
    Local,
    /// Any real deployment.
    #[default]
    Production,
}

impl DeploymentMode {
    /// Returns true for local development.
    #[must_use]
    pub fn is_local(&self) -> bool {
        matches!(self, Self::Local)
    }
}

impl fmt::Display for DeploymentMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Local => write!(f, "local"),
            Self::Production => write!(f, "production"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_to_production() {
        assert_eq!(DeploymentMode::default(), DeploymentMode::Production);
        assert!(!DeploymentMode::default().is_local());
    }

    #[test]
    fn deserializes_lowercase() {
        let mode: DeploymentMode = serde_json::from_str("\"local\"").expect("deserialize");
        assert!(mode.is_local());
        let mode: DeploymentMode = serde_json::from_str("\"production\"").expect("deserialize");
        assert_eq!(mode, DeploymentMode::Production);
    }
}

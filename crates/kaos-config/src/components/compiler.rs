//! Compiler component configuration

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// What the compiler does when a catalog document cannot be fetched
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FetchPolicy {
    /// Log the failure and embed an empty document
    #[default]
    BestEffort,
    /// Abort the compile with the fetch error
    Strict,
}

impl FromStr for FetchPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "best-effort" | "best_effort" | "besteffort" => Ok(Self::BestEffort),
            "strict" => Ok(Self::Strict),
            other => Err(format!("unknown fetch policy '{}'", other)),
        }
    }
}

impl fmt::Display for FetchPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::BestEffort => write!(f, "best-effort"),
            Self::Strict => write!(f, "strict"),
        }
    }
}

/// Settings that shape the generated workflow
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct CompilerConfig {
    /// Image running the install and revert shell steps
    pub install_image: String,
    /// Image that applies each chaos engine
    pub checker_image: String,
    /// Service account the workflow pods run as
    pub service_account: String,
    /// Non-root UID for every workflow pod
    pub run_as_user: i64,
    /// Failure handling for catalog fetches
    pub fetch_policy: FetchPolicy,
    /// Maximum catalog fetches in flight; 1 keeps them strictly serial
    pub fetch_concurrency: usize,
    /// Overall compile deadline, unset means no deadline
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deadline_secs: Option<u64>,
}

impl Default for CompilerConfig {
    fn default() -> Self {
        Self {
            install_image: "litmuschaos/k8s:latest".to_string(),
            checker_image: "litmuschaos/litmus-checker:latest".to_string(),
            service_account: "argo-chaos".to_string(),
            run_as_user: 1000,
            fetch_policy: FetchPolicy::BestEffort,
            fetch_concurrency: 1,
            deadline_secs: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case("strict", FetchPolicy::Strict)]
    #[test_case("best-effort", FetchPolicy::BestEffort)]
    #[test_case("Best_Effort", FetchPolicy::BestEffort)]
    #[test_case(" STRICT ", FetchPolicy::Strict)]
    fn test_fetch_policy_parses(input: &str, expected: FetchPolicy) {
        assert_eq!(input.parse::<FetchPolicy>().unwrap(), expected);
    }

    #[test]
    fn test_fetch_policy_rejects_unknown() {
        let err = "lenient".parse::<FetchPolicy>().unwrap_err();
        assert!(err.contains("lenient"));
    }

    #[test]
    fn test_fetch_policy_display_matches_serde_name() {
        assert_eq!(FetchPolicy::BestEffort.to_string(), "best-effort");
        assert_eq!(FetchPolicy::Strict.to_string(), "strict");
    }
}

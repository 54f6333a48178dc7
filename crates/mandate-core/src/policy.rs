//! Verification policy.
//!
//! A YAML file naming the parties and payload a verifier insists on:
//!
//! ```yaml
//! require_client: "0x5aAeb6053F3E94C9b9A09f33669435E7Ef1BeAed"
//! expect_kind: swap@1
//! server_domain:
//!   name: Mandates
//!   chainId: 1
//! ```
//!
//! An empty policy only checks signatures and the deadline.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::signing::Eip712Domain;
use crate::verify::VerifyOptions;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct VerifyPolicy {
    /// Required client address (case-insensitive).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub require_client: Option<String>,

    /// Required server address (case-insensitive).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub require_server: Option<String>,

    /// Expected `core.kind`; enables payload shape and rule checks.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expect_kind: Option<String>,

    /// Domain the client signed under, if it used eip712.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub client_domain: Option<Eip712Domain>,

    /// Domain the server signed under, if it used eip712.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub server_domain: Option<Eip712Domain>,
}

impl VerifyPolicy {
    /// Load policy from YAML file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("failed to read verify policy: {}", path.display()))?;
        Self::from_yaml(&content)
    }

    /// Parse policy from YAML string.
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        serde_yaml::from_str(yaml).context("failed to parse verify policy YAML")
    }

    pub fn to_options(&self) -> VerifyOptions {
        VerifyOptions {
            require_client: self.require_client.clone(),
            require_server: self.require_server.clone(),
            now: None,
            client_domain: self.client_domain.clone(),
            server_domain: self.server_domain.clone(),
            expect_kind: self.expect_kind.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_policy() {
        let policy = VerifyPolicy::from_yaml("{}").unwrap();
        assert_eq!(policy, VerifyPolicy::default());
        let options = policy.to_options();
        assert!(options.require_client.is_none());
        assert!(options.expect_kind.is_none());
    }

    #[test]
    fn test_parse_full_policy() {
        let yaml = r#"
require_client: "0x5aAeb6053F3E94C9b9A09f33669435E7Ef1BeAed"
require_server: "0x7E5F4552091A69125d5DfCb7b8C2659029395Bdf"
expect_kind: swap@1
server_domain:
  name: Mandates
  version: "1"
  chainId: 8453
"#;
        let policy = VerifyPolicy::from_yaml(yaml).unwrap();
        assert_eq!(policy.expect_kind.as_deref(), Some("swap@1"));
        let domain = policy.server_domain.as_ref().unwrap();
        assert_eq!(domain.chain_id, Some(8453));
        assert_eq!(domain.version.as_deref(), Some("1"));
        assert!(policy.client_domain.is_none());

        let options = policy.to_options();
        assert_eq!(options.server_domain, policy.server_domain);
    }

    #[test]
    fn test_unknown_key_rejected() {
        assert!(VerifyPolicy::from_yaml("require_clinet: 0x00").is_err());
    }

    #[test]
    fn test_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("policy.yaml");
        std::fs::write(&path, "expect_kind: transfer@1\n").unwrap();
        let policy = VerifyPolicy::from_file(&path).unwrap();
        assert_eq!(policy.expect_kind.as_deref(), Some("transfer@1"));

        let err = VerifyPolicy::from_file(&dir.path().join("missing.yaml")).unwrap_err();
        assert!(err.to_string().contains("failed to read verify policy"));
    }
}

//! # Registry Configuration
//!
//! Settings a [`crate::SchemaRegistry`] is built with. Deserializable so a
//! host application can keep them next to its own configuration:
//!
//! ```yaml
//! strictness: strict
//! ```

use serde::{Deserialize, Serialize};

/// How repeated requiredness declarations on one field are treated.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Strictness {
    /// The last requiredness fragment wins; undeclared fields are optional.
    #[default]
    Lenient,
    /// A second requiredness fragment is a configuration conflict.
    Strict,
}

/// Configuration of a schema registry.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case", deny_unknown_fields)]
pub struct RegistryConfig {
    pub strictness: Strictness,
}

impl RegistryConfig {
    pub fn strict() -> Self {
        Self {
            strictness: Strictness::Strict,
        }
    }

    /// Parse a configuration document.
    pub fn from_yaml_str(s: &str) -> Result<Self, serde_yaml::Error> {
        serde_yaml::from_str(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_lenient() {
        assert_eq!(RegistryConfig::default().strictness, Strictness::Lenient);
    }

    #[test]
    fn test_from_yaml() {
        let config = RegistryConfig::from_yaml_str("strictness: strict\n").unwrap();
        assert_eq!(config, RegistryConfig::strict());
    }

    #[test]
    fn test_empty_document_uses_defaults() {
        let config = RegistryConfig::from_yaml_str("{}").unwrap();
        assert_eq!(config, RegistryConfig::default());
    }

    #[test]
    fn test_unknown_keys_rejected() {
        assert!(RegistryConfig::from_yaml_str("strictnes: strict\n").is_err());
        assert!(RegistryConfig::from_yaml_str("strictness: paranoid\n").is_err());
    }
}

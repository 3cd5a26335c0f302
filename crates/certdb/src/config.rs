//! Loader configuration.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{CertError, CertResult};

/// Certificates every installable package chain depends on: the root CA,
/// the ticket signer and the TMD signer.
pub const DEFAULT_REQUIRED_CERTIFICATES: [&str; 3] = ["CA00000003", "XS0000000c", "CP0000000b"];

/// Settings for loading a certificate database.
///
/// ```yaml
/// required_certificates: [CA00000003, XS0000000c, CP0000000b]
/// max_file_bytes: 1048576
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LoaderConfig {
    /// Names that must be present for a load to succeed.
    pub required_certificates: Vec<String>,

    /// Upper bound on the size of the database file.
    pub max_file_bytes: u64,
}

fn default_max_file_bytes() -> u64 {
    1024 * 1024
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self {
            required_certificates: DEFAULT_REQUIRED_CERTIFICATES
                .iter()
                .map(|s| s.to_string())
                .collect(),
            max_file_bytes: default_max_file_bytes(),
        }
    }
}

impl LoaderConfig {
    /// Parse a YAML document; omitted keys keep their defaults.
    pub fn from_yaml_str(content: &str) -> CertResult<Self> {
        serde_yaml::from_str(content).map_err(|e| CertError::Config {
            message: format!("invalid loader config: {}", e),
        })
    }

    /// Read and parse a YAML config file.
    pub fn from_file(path: impl AsRef<Path>) -> CertResult<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| CertError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_yaml_str(&content)
    }

    /// Replace the required certificate list.
    pub fn with_required<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.required_certificates = names.into_iter().map(Into::into).collect();
        self
    }

    /// Set the file size limit.
    pub fn with_max_file_bytes(mut self, limit: u64) -> Self {
        self.max_file_bytes = limit;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_require_package_chain() {
        let config = LoaderConfig::default();
        assert_eq!(
            config.required_certificates,
            vec!["CA00000003", "XS0000000c", "CP0000000b"]
        );
        assert_eq!(config.max_file_bytes, 1024 * 1024);
    }

    #[test]
    fn yaml_overrides_only_given_keys() {
        let config = LoaderConfig::from_yaml_str("required_certificates: [CA00000003]\n").unwrap();
        assert_eq!(config.required_certificates, vec!["CA00000003"]);
        assert_eq!(config.max_file_bytes, default_max_file_bytes());
    }

    #[test]
    fn yaml_rejects_unknown_keys() {
        let err = LoaderConfig::from_yaml_str("max_bytes: 12\n").unwrap_err();
        assert!(matches!(err, CertError::Config { .. }));
    }

    #[test]
    fn from_file_reads_yaml() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("certdb.yaml");
        std::fs::write(&path, "required_certificates: []\nmax_file_bytes: 64\n").unwrap();

        let config = LoaderConfig::from_file(&path).unwrap();
        assert!(config.required_certificates.is_empty());
        assert_eq!(config.max_file_bytes, 64);
    }

    #[test]
    fn builders_replace_fields() {
        let config = LoaderConfig::default()
            .with_required(["XS0000000c"])
            .with_max_file_bytes(10);
        assert_eq!(config.required_certificates, vec!["XS0000000c"]);
        assert_eq!(config.max_file_bytes, 10);
    }
}

//! Core types and errors for the dependency confusion scanner.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur during scanning.
#[derive(Error, Debug)]
pub enum DepfusionError {
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("URL parse error: {0}")]
    UrlError(#[from] url::ParseError),

    #[error("JSON parse error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("{kind} not found: {}", .path.display())]
    PathNotFound { kind: &'static str, path: PathBuf },

    #[error("Failed to write {}: {source}", .path.display())]
    WriteError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

pub type Result<T> = std::result::Result<T, DepfusionError>;

/// Public package registry a dependency name is resolved against.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Registry {
    Npm,
    PyPi,
}

impl fmt::Display for Registry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Registry::Npm => f.write_str("NPM"),
            Registry::PyPi => f.write_str("PYPI"),
        }
    }
}

/// Classification of a single registry lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    /// Name is claimed publicly.
    Found,
    /// Name was never published (vulnerable).
    NotFound,
    /// Name was published and later removed (vulnerable).
    Unpublished,
    /// Registry answered with a status other than 200/404.
    Unknown { status: u16 },
    /// Transport failure: timeout, DNS, connection reset.
    Error { error: String },
}

impl Verdict {
    /// Only names nobody holds publicly can be taken over.
    pub fn is_vulnerable(&self) -> bool {
        matches!(self, Verdict::NotFound | Verdict::Unpublished)
    }
}

/// A manifest found on disk and the dependency names declared in it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManifestFile {
    pub path: PathBuf,
    pub registry: Registry,
    pub dependencies: Vec<String>,
}

/// Aggregated results: manifest path -> vulnerable dependency names.
///
/// Serializes as a plain JSON object so the output file maps each path
/// string to an array of names.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(transparent)]
pub struct ScanResult {
    files: BTreeMap<String, Vec<String>>,
}

impl ScanResult {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the vulnerable names for a scanned file, replacing any earlier entry.
    pub fn insert(&mut self, path: impl Into<String>, vulnerable: Vec<String>) {
        self.files.insert(path.into(), vulnerable);
    }

    /// Union with another result; entries of `other` win on the same path.
    pub fn merge(&mut self, other: ScanResult) {
        self.files.extend(other.files);
    }

    pub fn get(&self, path: &str) -> Option<&[String]> {
        self.files.get(path).map(Vec::as_slice)
    }

    /// All scanned files, including those without findings.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.files.iter().map(|(p, v)| (p.as_str(), v.as_slice()))
    }

    /// Files with at least one vulnerable dependency.
    pub fn vulnerable(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.iter().filter(|(_, v)| !v.is_empty())
    }

    /// Copy of this result without the files that had no findings.
    pub fn vulnerable_only(&self) -> ScanResult {
        ScanResult {
            files: self
                .files
                .iter()
                .filter(|(_, v)| !v.is_empty())
                .map(|(p, v)| (p.clone(), v.clone()))
                .collect(),
        }
    }

    pub fn vulnerability_count(&self) -> usize {
        self.files.values().map(Vec::len).sum()
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}

/// Configuration for HTTP requests.
#[derive(Debug, Clone)]
pub struct HttpConfig {
    pub timeout_secs: u64,
    pub user_agent: String,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout_secs: 30,
            user_agent: concat!("depfusion/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

/// Base URLs of the public registries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegistryUrls {
    pub npm: String,
    pub pypi: String,
}

pub const DEFAULT_NPM_REGISTRY: &str = "https://registry.npmjs.org";
pub const DEFAULT_PYPI_REGISTRY: &str = "https://pypi.org/pypi";

impl Default for RegistryUrls {
    fn default() -> Self {
        Self {
            npm: DEFAULT_NPM_REGISTRY.to_string(),
            pypi: DEFAULT_PYPI_REGISTRY.to_string(),
        }
    }
}

impl RegistryUrls {
    /// Both bases must be absolute http(s) URLs. Trailing slashes are dropped.
    pub fn validated(npm: &str, pypi: &str) -> Result<Self> {
        for base in [npm, pypi] {
            let parsed = url::Url::parse(base)?;
            if !matches!(parsed.scheme(), "http" | "https") {
                return Err(DepfusionError::ConfigError(format!(
                    "registry URL must be http or https: {}",
                    base
                )));
            }
        }

        Ok(Self {
            npm: npm.trim_end_matches('/').to_string(),
            pypi: pypi.trim_end_matches('/').to_string(),
        })
    }

    pub fn base(&self, registry: Registry) -> &str {
        match registry {
            Registry::Npm => &self.npm,
            Registry::PyPi => &self.pypi,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_verdict_vulnerability() {
        assert!(Verdict::NotFound.is_vulnerable());
        assert!(Verdict::Unpublished.is_vulnerable());
        assert!(!Verdict::Found.is_vulnerable());
        assert!(!Verdict::Unknown { status: 500 }.is_vulnerable());
        assert!(!Verdict::Error { error: "timeout".to_string() }.is_vulnerable());
    }

    #[test]
    fn test_scan_result_serializes_as_map() {
        let mut result = ScanResult::new();
        result.insert("app/package.json", vec!["internal-lib".to_string()]);
        result.insert("app/requirements.txt", vec![]);

        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "app/package.json": ["internal-lib"],
                "app/requirements.txt": []
            })
        );
        assert_eq!(result.vulnerable().count(), 1);
        assert_eq!(result.vulnerable_only().len(), 1);
        assert_eq!(result.vulnerability_count(), 1);
    }

    #[test]
    fn test_scan_result_merge_overrides_same_path() {
        let mut first = ScanResult::new();
        first.insert("a/package.json", vec!["old".to_string()]);
        first.insert("b/yarn.lock", vec![]);

        let mut second = ScanResult::new();
        second.insert("a/package.json", vec!["new".to_string()]);

        first.merge(second);
        assert_eq!(first.len(), 2);
        assert_eq!(first.get("a/package.json"), Some(&["new".to_string()][..]));
    }

    #[test]
    fn test_registry_urls_validation() {
        let urls = RegistryUrls::validated("http://localhost:4873/", "https://pypi.org/pypi").unwrap();
        assert_eq!(urls.npm, "http://localhost:4873");
        assert_eq!(urls.base(Registry::PyPi), "https://pypi.org/pypi");

        assert!(RegistryUrls::validated("not a url", DEFAULT_PYPI_REGISTRY).is_err());
        assert!(matches!(
            RegistryUrls::validated("ftp://mirror.local", DEFAULT_PYPI_REGISTRY),
            Err(DepfusionError::ConfigError(_))
        ));
    }
}

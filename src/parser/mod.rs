//! Manifest parsers.
//!
//! This module handles extracting dependency names from:
//! - npm manifests (`package.json`, `package-lock.json`)
//! - pip requirement lists (`requirements.txt`)
//! - Pipenv files (`Pipfile`, `Pipfile.lock`)
//! - Yarn lockfiles (`yarn.lock`)

pub mod package_json;
pub mod requirements;
pub mod yarn_lock;

pub use package_json::PackageJsonParser;
pub use requirements::{PipfileParser, RequirementsParser};
pub use yarn_lock::YarnLockParser;

use crate::types::{ManifestFile, Registry, Result};
use std::fs;
use std::path::Path;
use tracing::{debug, warn};

/// File name suffixes recognized as manifests.
pub const MANIFEST_SUFFIXES: &[&str] = &[
    "package.json",
    "package-lock.json",
    "yarn.lock",
    "requirements.txt",
    "Pipfile",
    "Pipfile.lock",
];

/// Extracts dependency names from the raw contents of one manifest format.
pub trait ManifestParser {
    fn extract(&self, content: &str) -> Result<Vec<String>>;
}

/// Recognized manifest formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ManifestKind {
    NpmManifest,
    PyPiRequirements,
    PyPiPipfile,
    YarnLock,
}

impl ManifestKind {
    /// Pick the format from a file name. Matching is by suffix, so
    /// `dev-requirements.txt` counts as a requirements list.
    pub fn from_file_name(file_name: &str) -> Option<Self> {
        if file_name.ends_with("package.json") || file_name.ends_with("package-lock.json") {
            Some(ManifestKind::NpmManifest)
        } else if file_name.ends_with("requirements.txt") {
            Some(ManifestKind::PyPiRequirements)
        } else if file_name.ends_with("Pipfile") || file_name.ends_with("Pipfile.lock") {
            Some(ManifestKind::PyPiPipfile)
        } else if file_name.ends_with("yarn.lock") {
            Some(ManifestKind::YarnLock)
        } else {
            None
        }
    }

    pub fn from_path(path: &Path) -> Option<Self> {
        let file_name = path.file_name()?.to_str()?;
        Self::from_file_name(file_name)
    }

    pub fn registry(self) -> Registry {
        match self {
            ManifestKind::NpmManifest | ManifestKind::YarnLock => Registry::Npm,
            ManifestKind::PyPiRequirements | ManifestKind::PyPiPipfile => Registry::PyPi,
        }
    }

    pub fn parser(self) -> &'static dyn ManifestParser {
        match self {
            ManifestKind::NpmManifest => &PackageJsonParser,
            ManifestKind::PyPiRequirements => &RequirementsParser,
            ManifestKind::PyPiPipfile => &PipfileParser,
            ManifestKind::YarnLock => &YarnLockParser,
        }
    }
}

/// Check whether a file name looks like a manifest we can scan.
pub fn is_manifest(file_name: &str) -> bool {
    ManifestKind::from_file_name(file_name).is_some()
}

/// Read and parse a manifest, propagating I/O and format errors.
///
/// Returns `Ok(None)` when the file name is not a recognized manifest.
pub fn try_parse(path: &Path) -> Result<Option<ManifestFile>> {
    let Some(kind) = ManifestKind::from_path(path) else {
        return Ok(None);
    };

    let content = fs::read_to_string(path)?;
    let dependencies = kind.parser().extract(&content)?;
    debug!("Extracted {} dependencies from {}", dependencies.len(), path.display());

    Ok(Some(ManifestFile {
        path: path.to_path_buf(),
        registry: kind.registry(),
        dependencies,
    }))
}

/// Parse a manifest without ever failing.
///
/// Unreadable or malformed manifests are logged and yield an empty
/// dependency list. Unrecognized files yield `None`.
pub fn parse(path: &Path) -> Option<ManifestFile> {
    let kind = ManifestKind::from_path(path)?;

    match try_parse(path) {
        Ok(manifest) => manifest,
        Err(e) => {
            warn!("Error parsing {}: {}", path.display(), e);
            Some(ManifestFile {
                path: path.to_path_buf(),
                registry: kind.registry(),
                dependencies: Vec::new(),
            })
        }
    }
}

//! `package.json` / `package-lock.json` extraction.

use super::ManifestParser;
use crate::types::Result;
use serde::Deserialize;
use serde_json::{Map, Value};

/// Only the top-level `dependencies` table is read.
#[derive(Debug, Deserialize)]
struct PackageManifest {
    #[serde(default)]
    dependencies: Option<Map<String, Value>>,
}

/// Parser for npm package manifests and lockfiles.
#[derive(Debug, Clone, Copy, Default)]
pub struct PackageJsonParser;

impl ManifestParser for PackageJsonParser {
    fn extract(&self, content: &str) -> Result<Vec<String>> {
        let manifest: PackageManifest = serde_json::from_str(content)?;

        Ok(manifest
            .dependencies
            .map(|deps| deps.into_iter().map(|(name, _)| name).collect())
            .unwrap_or_default())
    }
}

//! Line-based extraction for pip requirement lists and Pipenv files.
//!
//! Names are cut at the first `==` only. Other specifiers (`>=`, `~=`,
//! extras) stay part of the name, and Pipfile TOML lines are read the
//! same way as requirement lines.

use super::ManifestParser;
use crate::types::Result;

/// Parser for `requirements.txt`.
#[derive(Debug, Clone, Copy, Default)]
pub struct RequirementsParser;

/// Parser for `Pipfile` and `Pipfile.lock`.
#[derive(Debug, Clone, Copy, Default)]
pub struct PipfileParser;

impl ManifestParser for RequirementsParser {
    fn extract(&self, content: &str) -> Result<Vec<String>> {
        Ok(extract_pinned_names(content))
    }
}

impl ManifestParser for PipfileParser {
    fn extract(&self, content: &str) -> Result<Vec<String>> {
        Ok(extract_pinned_names(content))
    }
}

/// Take the part before `==` of every non-blank, non-comment line.
fn extract_pinned_names(content: &str) -> Vec<String> {
    content
        .lines()
        .filter(|line| !line.trim().is_empty() && !line.starts_with('#'))
        .map(|line| {
            let trimmed = line.trim();
            let name = trimmed.split_once("==").map_or(trimmed, |(name, _)| name);
            name.trim().to_string()
        })
        .filter(|name| !name.is_empty())
        .collect()
}

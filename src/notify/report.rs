//! Final report rendering and JSON persistence.

use crate::types::{DepfusionError, Result, ScanResult};
use colored::Colorize;
use std::fmt::Write as _;
use std::fs;
use std::path::Path;
use tracing::info;

/// Renders aggregated results and writes them to disk.
#[derive(Debug, Clone, Copy, Default)]
pub struct ReportWriter {
    color: bool,
    vulnerable_only: bool,
}

impl ReportWriter {
    pub fn new(color: bool, vulnerable_only: bool) -> Self {
        Self {
            color,
            vulnerable_only,
        }
    }

    /// Human-readable listing of every file with at least one vulnerable
    /// dependency, each name indented under its file.
    pub fn render(&self, result: &ScanResult) -> String {
        let mut out = String::new();

        for (path, names) in result.vulnerable() {
            if self.color {
                let _ = writeln!(out, "{} {}", "[VULNERABLE]".red(), path);
            } else {
                let _ = writeln!(out, "[VULNERABLE] {}", path);
            }

            for name in names {
                if self.color {
                    let _ = writeln!(out, "  - {}", name.yellow());
                } else {
                    let _ = writeln!(out, "  - {}", name);
                }
            }
        }

        out
    }

    /// The JSON document written by [`ReportWriter::persist`].
    pub fn to_json(&self, result: &ScanResult) -> Result<String> {
        let json = if self.vulnerable_only {
            serde_json::to_string_pretty(&result.vulnerable_only())?
        } else {
            serde_json::to_string_pretty(result)?
        };
        Ok(json)
    }

    /// Write the results as JSON to `path`.
    pub fn persist(&self, result: &ScanResult, path: &Path) -> Result<()> {
        let json = self.to_json(result)?;

        fs::write(path, json).map_err(|source| DepfusionError::WriteError {
            path: path.to_path_buf(),
            source,
        })?;

        info!("Results written to: {}", path.display());
        Ok(())
    }
}

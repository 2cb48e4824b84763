//! Configuration handling for the scanner.

use crate::types::{HttpConfig, RegistryUrls, Result, DEFAULT_NPM_REGISTRY, DEFAULT_PYPI_REGISTRY};
use clap::{ArgGroup, Args, Parser};
use std::path::PathBuf;

/// Dependency confusion scanner for package manifests.
#[derive(Parser, Debug, Clone)]
#[command(name = "depfusion")]
#[command(author, version, about, long_about = None)]
#[command(group(
    ArgGroup::new("mode")
        .required(true)
        .multiple(true)
        .args(["file", "directory", "repository"])
))]
pub struct Config {
    /// Path to a single manifest file to analyze
    #[arg(short, long)]
    pub file: Option<PathBuf>,

    /// Path to a directory to analyze (immediate entries only)
    #[arg(short, long)]
    pub directory: Option<PathBuf>,

    /// Path to a repository to analyze recursively
    #[arg(short = 'R', long)]
    pub repository: Option<PathBuf>,

    /// Output file to save the results as JSON
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Leave files without vulnerable dependencies out of the JSON output
    #[arg(long)]
    pub vulnerable_only: bool,

    /// Exit with status 1 when vulnerable dependencies are found
    #[arg(long)]
    pub fail_on_findings: bool,

    #[command(flatten)]
    pub scan: ScanConfig,
}

/// Configuration for the scanner itself.
#[derive(Args, Debug, Clone)]
pub struct ScanConfig {
    /// Enable verbose output
    #[arg(short, long)]
    pub verbose: bool,

    /// Quiet mode: only show vulnerable dependencies and the report
    #[arg(short = 'q', long, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Merge repository results with file/directory results instead of replacing them
    #[arg(long)]
    pub merge: bool,

    /// Request timeout in seconds
    #[arg(long, default_value = "30", value_parser = clap::value_parser!(u64).range(1..))]
    pub timeout: u64,

    /// Rate limit (requests per second)
    #[arg(long, default_value = "10", value_parser = clap::value_parser!(u32).range(1..))]
    pub rate_limit: u32,

    /// Number of registry lookups in flight per manifest
    #[arg(long, default_value = "1")]
    pub concurrency: usize,

    /// Base URL of the npm registry
    #[arg(long, env = "DEPFUSION_NPM_REGISTRY", default_value = DEFAULT_NPM_REGISTRY)]
    pub npm_registry: String,

    /// Base URL of the PyPI JSON API
    #[arg(long, env = "DEPFUSION_PYPI_REGISTRY", default_value = DEFAULT_PYPI_REGISTRY)]
    pub pypi_registry: String,

    /// Custom User-Agent string
    #[arg(long)]
    pub user_agent: Option<String>,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            verbose: false,
            quiet: false,
            merge: false,
            timeout: 30,
            rate_limit: 10,
            concurrency: 1,
            npm_registry: DEFAULT_NPM_REGISTRY.to_string(),
            pypi_registry: DEFAULT_PYPI_REGISTRY.to_string(),
            user_agent: None,
        }
    }
}

/// How repository results combine with file/directory results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Aggregation {
    /// A successful repository scan supersedes earlier results.
    #[default]
    Replace,
    /// Repository results are added to earlier results.
    Merge,
}

/// Paths to scan in one run. Any combination may be set.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Targets {
    pub file: Option<PathBuf>,
    pub directory: Option<PathBuf>,
    pub repository: Option<PathBuf>,
}

impl Config {
    /// Scan targets selected on the command line.
    pub fn targets(&self) -> Targets {
        Targets {
            file: self.file.clone(),
            directory: self.directory.clone(),
            repository: self.repository.clone(),
        }
    }
}

impl ScanConfig {
    /// Get HTTP configuration from scan config.
    pub fn http_config(&self) -> HttpConfig {
        let defaults = HttpConfig::default();
        HttpConfig {
            timeout_secs: self.timeout,
            user_agent: self.user_agent.clone().unwrap_or(defaults.user_agent),
        }
    }

    /// Validated registry base URLs.
    pub fn registry_urls(&self) -> Result<RegistryUrls> {
        RegistryUrls::validated(&self.npm_registry, &self.pypi_registry)
    }

    pub fn aggregation(&self) -> Aggregation {
        if self.merge {
            Aggregation::Merge
        } else {
            Aggregation::Replace
        }
    }
}

//! depfusion - Dependency confusion scanner for package manifests.
//!
//! This library provides tools for detecting dependency confusion vulnerabilities by:
//! - Finding npm and PyPI manifests in a file, a directory or a whole tree
//! - Extracting the declared dependency names from each manifest
//! - Checking if each name still resolves on the public registry
//! - Reporting names that are unclaimed or unpublished
//!
//! # Example
//!
//! ```no_run
//! use depfusion::config::{ScanConfig, Targets};
//! use depfusion::Scanner;
//!
//! #[tokio::main]
//! async fn main() {
//!     let scanner = Scanner::new(&ScanConfig::default()).unwrap();
//!     let targets = Targets {
//!         repository: Some(".".into()),
//!         ..Default::default()
//!     };
//!     let result = scanner.run(&targets).await;
//!     println!("Found {} potentially vulnerable dependencies", result.vulnerability_count());
//! }
//! ```

pub mod checker;
pub mod config;
pub mod notify;
pub mod parser;
pub mod registry;
pub mod scanner;
pub mod types;

pub use checker::VulnerabilityChecker;
pub use config::{Aggregation, Config, ScanConfig, Targets};
pub use registry::RegistryClient;
pub use scanner::Scanner;
pub use types::{
    DepfusionError, HttpConfig, ManifestFile, Registry, RegistryUrls, Result, ScanResult, Verdict,
};

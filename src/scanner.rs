//! Main scanner orchestrating manifest discovery, parsing and registry checks.

use crate::checker::{vulnerable_names, VulnerabilityChecker};
use crate::config::{Aggregation, ScanConfig, Targets};
use crate::notify::ConsoleOutput;
use crate::parser::{self, is_manifest};
use crate::registry::RegistryClient;
use crate::types::{DepfusionError, ManifestFile, Result, ScanResult};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::warn;
use walkdir::WalkDir;

/// Main scanner that walks targets and checks every manifest found.
pub struct Scanner {
    checker: VulnerabilityChecker,
    console: ConsoleOutput,
    aggregation: Aggregation,
}

impl Scanner {
    /// Create a new scanner with the given configuration.
    pub fn new(config: &ScanConfig) -> Result<Self> {
        let client = RegistryClient::new(
            &config.http_config(),
            config.registry_urls()?,
            config.rate_limit,
        )?;

        Ok(Self::with_checker(
            VulnerabilityChecker::new(Arc::new(client), config.concurrency),
            ConsoleOutput::new(config.verbose, config.quiet),
            config.aggregation(),
        ))
    }

    /// Build a scanner around an existing checker.
    pub fn with_checker(
        checker: VulnerabilityChecker,
        console: ConsoleOutput,
        aggregation: Aggregation,
    ) -> Self {
        Self {
            checker,
            console,
            aggregation,
        }
    }

    /// Run every selected mode and aggregate the results.
    ///
    /// A missing target is reported and its mode skipped. A successful
    /// repository scan replaces or merges with the earlier results
    /// depending on the configured [`Aggregation`].
    pub async fn run(&self, targets: &Targets) -> ScanResult {
        let mut results = ScanResult::new();

        if let Some(ref file) = targets.file {
            match self.scan_single_file(file).await {
                Ok(result) => results.merge(result),
                Err(e) => self.report_skipped("file", file, e),
            }
        }

        if let Some(ref directory) = targets.directory {
            match self.scan_directory(directory).await {
                Ok(result) => results.merge(result),
                Err(e) => self.report_skipped("directory", directory, e),
            }
        }

        if let Some(ref repository) = targets.repository {
            match self.scan_repository(repository).await {
                Ok(result) => match self.aggregation {
                    Aggregation::Replace => results = result,
                    Aggregation::Merge => results.merge(result),
                },
                Err(e) => self.report_skipped("repository", repository, e),
            }
        }

        results
    }

    /// Scan one manifest file.
    pub async fn scan_single_file(&self, path: &Path) -> Result<ScanResult> {
        if !path.is_file() {
            return Err(DepfusionError::PathNotFound {
                kind: "file",
                path: path.to_path_buf(),
            });
        }

        self.console.print_analyzing("file", path);

        let mut result = ScanResult::new();
        match self.scan_file(path).await {
            Some(vulnerable) => result.insert(path_key(path), vulnerable),
            None => {
                warn!("Not a recognized manifest: {}", path.display());
                result.insert(path_key(path), Vec::new());
            }
        }
        Ok(result)
    }

    /// Scan the manifests directly inside a directory, without descending.
    pub async fn scan_directory(&self, dir: &Path) -> Result<ScanResult> {
        if !dir.is_dir() {
            return Err(DepfusionError::PathNotFound {
                kind: "directory",
                path: dir.to_path_buf(),
            });
        }

        self.console.print_analyzing("directory", dir);

        let mut result = ScanResult::new();
        for path in list_manifests(dir)? {
            if let Some(vulnerable) = self.scan_file(&path).await {
                result.insert(path_key(&path), vulnerable);
            }
        }
        Ok(result)
    }

    /// Scan every manifest anywhere below a directory.
    pub async fn scan_repository(&self, root: &Path) -> Result<ScanResult> {
        if !root.is_dir() {
            return Err(DepfusionError::PathNotFound {
                kind: "repository",
                path: root.to_path_buf(),
            });
        }

        self.console.print_analyzing("repository", root);

        let mut result = ScanResult::new();
        for entry in WalkDir::new(root).sort_by_file_name() {
            let entry = match entry {
                Ok(e) => e,
                Err(e) => {
                    warn!("Skipping unreadable entry: {}", e);
                    continue;
                }
            };

            if entry.file_type().is_dir() {
                self.console.print_searching(entry.path());
                continue;
            }

            // Symlinked files are scanned, symlinked directories are not descended.
            let is_file = entry.file_type().is_file()
                || (entry.path_is_symlink() && entry.path().is_file());
            let is_candidate = is_file && entry.file_name().to_str().is_some_and(is_manifest);
            if !is_candidate {
                continue;
            }

            self.console.print_manifest_found(entry.path());
            if let Some(vulnerable) = self.scan_file(entry.path()).await {
                result.insert(path_key(entry.path()), vulnerable);
            }
        }
        Ok(result)
    }

    /// Parse a manifest and check its dependencies.
    ///
    /// Returns `None` for files that are not recognized manifests.
    pub async fn scan_file(&self, path: &Path) -> Option<Vec<String>> {
        let manifest = parser::parse(path)?;
        Some(self.check_manifest(&manifest).await)
    }

    /// Check the names of a parsed manifest against its own registry.
    async fn check_manifest(&self, manifest: &ManifestFile) -> Vec<String> {
        let registry = manifest.registry;
        let pb = self.console.create_progress_bar(
            manifest.dependencies.len() as u64,
            &format!("Checking {}", registry),
        );

        let verdicts = self
            .checker
            .check_each(&manifest.dependencies, registry, |name, verdict| {
                let print = || {
                    self.console.print_progress(&format!("Checking dependency: {}", name));
                    self.console.print_verdict(name, registry, verdict);
                };
                match &pb {
                    Some(pb) => {
                        pb.suspend(print);
                        pb.inc(1);
                    }
                    None => print(),
                }
            })
            .await;

        if let Some(pb) = pb {
            pb.finish_and_clear();
        }

        let vulnerable = vulnerable_names(verdicts);
        for name in &vulnerable {
            self.console
                .print_progress(&format!("{} is potentially vulnerable!", name));
        }
        vulnerable
    }

    fn report_skipped(&self, kind: &str, path: &Path, error: DepfusionError) {
        match error {
            DepfusionError::PathNotFound { .. } => self.console.print_not_found(kind, path),
            other => warn!("Skipping {} {}: {}", kind, path.display(), other),
        }
    }
}

/// Manifests directly inside `dir`, sorted by path.
fn list_manifests(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut manifests = Vec::new();

    for entry in fs::read_dir(dir)? {
        let entry = match entry {
            Ok(e) => e,
            Err(e) => {
                warn!("Skipping unreadable entry in {}: {}", dir.display(), e);
                continue;
            }
        };

        let path = entry.path();
        if path.is_file() && entry.file_name().to_str().is_some_and(is_manifest) {
            manifests.push(path);
        }
    }

    manifests.sort();
    Ok(manifests)
}

/// Key under which a scanned file is recorded.
fn path_key(path: &Path) -> String {
    path.display().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{HttpConfig, RegistryUrls};
    use httpmock::MockServer;
    use std::collections::BTreeSet;
    use tempfile::TempDir;

    /// Mock registry where the `*-internal*` names are missing on npm and PyPI.
    fn mock_registry() -> MockServer {
        let server = MockServer::start();
        for (path, status) in [
            ("/acme-internal", 404),
            ("/react", 200),
            ("/yarn-internal", 404),
            ("/requests/json", 200),
            ("/py-internal-lib/json", 404),
            ("/solo-internal/json", 404),
            ("/shared-internal", 404),
        ] {
            server.mock(|when, then| {
                when.method("GET").path(path);
                then.status(status).json_body(serde_json::json!({"time": {}}));
            });
        }
        server
    }

    fn scanner_for(server: &MockServer, aggregation: Aggregation) -> Scanner {
        let urls = RegistryUrls {
            npm: server.base_url(),
            pypi: server.base_url(),
        };
        let client = RegistryClient::new(&HttpConfig::default(), urls, 1000).unwrap();
        Scanner::with_checker(
            VulnerabilityChecker::new(Arc::new(client), 2),
            ConsoleOutput::new(false, true),
            aggregation,
        )
    }

    /// root/
    ///   package.json           (acme-internal)
    ///   notes.txt
    ///   svc/requirements.txt   (py-internal-lib)
    ///   svc/deep/yarn.lock     (yarn-internal)
    fn sample_tree() -> TempDir {
        let dir = TempDir::new().unwrap();
        let root = dir.path();
        fs::write(
            root.join("package.json"),
            r#"{"dependencies": {"acme-internal": "1.0.0", "react": "18.0.0"}}"#,
        )
        .unwrap();
        fs::write(root.join("notes.txt"), "nothing here").unwrap();
        fs::create_dir_all(root.join("svc/deep")).unwrap();
        fs::write(root.join("svc/requirements.txt"), "requests==2.31.0\npy-internal-lib==0.1\n").unwrap();
        fs::write(root.join("svc/deep/yarn.lock"), "yarn-internal@^1.0.0:\n  version \"1.0.0\"\n").unwrap();
        dir
    }

    fn keys(result: &ScanResult) -> BTreeSet<String> {
        result.iter().map(|(p, _)| p.to_string()).collect()
    }

    #[tokio::test]
    async fn test_single_file() {
        let server = mock_registry();
        let tree = sample_tree();
        let path = tree.path().join("package.json");

        let result = scanner_for(&server, Aggregation::Replace)
            .scan_single_file(&path)
            .await
            .unwrap();

        assert_eq!(result.get(&path_key(&path)), Some(&["acme-internal".to_string()][..]));
    }

    #[tokio::test]
    async fn test_missing_targets_are_not_found() {
        let server = mock_registry();
        let tree = sample_tree();
        let scanner = scanner_for(&server, Aggregation::Replace);

        let missing = tree.path().join("nope");
        assert!(matches!(
            scanner.scan_single_file(&missing).await,
            Err(DepfusionError::PathNotFound { kind: "file", .. })
        ));
        assert!(matches!(
            scanner.scan_directory(&tree.path().join("package.json")).await,
            Err(DepfusionError::PathNotFound { kind: "directory", .. })
        ));
        assert!(matches!(
            scanner.scan_repository(&missing).await,
            Err(DepfusionError::PathNotFound { kind: "repository", .. })
        ));
    }

    #[tokio::test]
    async fn test_directory_is_not_recursive() {
        let server = mock_registry();
        let tree = sample_tree();

        let result = scanner_for(&server, Aggregation::Replace)
            .scan_directory(tree.path())
            .await
            .unwrap();

        assert_eq!(keys(&result), BTreeSet::from([path_key(&tree.path().join("package.json"))]));
    }

    #[tokio::test]
    async fn test_repository_covers_every_subdirectory() {
        let server = mock_registry();
        let tree = sample_tree();
        let scanner = scanner_for(&server, Aggregation::Replace);

        let recursive = scanner.scan_repository(tree.path()).await.unwrap();

        let mut per_directory = BTreeSet::new();
        for dir in [tree.path().to_path_buf(), tree.path().join("svc"), tree.path().join("svc/deep")] {
            per_directory.extend(keys(&scanner.scan_directory(&dir).await.unwrap()));
        }

        assert_eq!(recursive.len(), 3);
        assert!(keys(&recursive).is_superset(&per_directory));
        assert_eq!(
            recursive.get(&path_key(&tree.path().join("svc/requirements.txt"))),
            Some(&["py-internal-lib".to_string()][..])
        );
        assert_eq!(
            recursive.get(&path_key(&tree.path().join("svc/deep/yarn.lock"))),
            Some(&["yarn-internal".to_string()][..])
        );
    }

    #[tokio::test]
    async fn test_rescan_is_idempotent() {
        let server = mock_registry();
        let tree = sample_tree();
        let scanner = scanner_for(&server, Aggregation::Replace);

        let first = scanner.scan_repository(tree.path()).await.unwrap();
        let second = scanner.scan_repository(tree.path()).await.unwrap();
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn test_repository_replaces_earlier_results() {
        let server = mock_registry();
        let tree = sample_tree();
        let other = TempDir::new().unwrap();
        let outside = other.path().join("requirements.txt");
        fs::write(&outside, "solo-internal==1.0\n").unwrap();

        let targets = Targets {
            file: Some(outside.clone()),
            directory: None,
            repository: Some(tree.path().to_path_buf()),
        };

        let replaced = scanner_for(&server, Aggregation::Replace).run(&targets).await;
        assert!(replaced.get(&path_key(&outside)).is_none());
        assert_eq!(replaced.len(), 3);

        let merged = scanner_for(&server, Aggregation::Merge).run(&targets).await;
        assert_eq!(merged.get(&path_key(&outside)), Some(&["solo-internal".to_string()][..]));
        assert_eq!(merged.len(), 4);
    }

    #[tokio::test]
    async fn test_missing_repository_keeps_earlier_results() {
        let server = mock_registry();
        let tree = sample_tree();

        let targets = Targets {
            file: Some(tree.path().join("package.json")),
            directory: None,
            repository: Some(tree.path().join("missing")),
        };

        let result = scanner_for(&server, Aggregation::Replace).run(&targets).await;
        assert_eq!(result.len(), 1);
    }

    #[tokio::test]
    async fn test_malformed_manifest_does_not_abort() {
        let server = mock_registry();
        let tree = sample_tree();
        fs::write(tree.path().join("svc/package-lock.json"), "{ broken").unwrap();

        let result = scanner_for(&server, Aggregation::Replace)
            .scan_repository(tree.path())
            .await
            .unwrap();

        assert_eq!(result.len(), 4);
        assert_eq!(result.get(&path_key(&tree.path().join("svc/package-lock.json"))), Some(&[] as &[String]));
        assert_eq!(result.vulnerability_count(), 3);
    }

    #[tokio::test]
    async fn test_unrecognized_single_file_is_recorded_empty() {
        let server = mock_registry();
        let tree = sample_tree();
        let path = tree.path().join("notes.txt");

        let result = scanner_for(&server, Aggregation::Replace)
            .scan_single_file(&path)
            .await
            .unwrap();

        assert_eq!(result.len(), 1);
        assert_eq!(result.get(&path_key(&path)), Some(&[] as &[String]));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_symlinked_manifests_are_scanned() {
        let server = mock_registry();
        let shared = TempDir::new().unwrap();
        let target = shared.path().join("package.json");
        fs::write(&target, r#"{"dependencies": {"shared-internal": "1.0.0"}}"#).unwrap();

        let repo = TempDir::new().unwrap();
        fs::create_dir(repo.path().join("app")).unwrap();
        let link = repo.path().join("app/package.json");
        std::os::unix::fs::symlink(&target, &link).unwrap();

        let scanner = scanner_for(&server, Aggregation::Replace);
        let expected = Some(&["shared-internal".to_string()][..]);

        let single = scanner.scan_single_file(&link).await.unwrap();
        assert_eq!(single.get(&path_key(&link)), expected);

        let directory = scanner.scan_directory(&repo.path().join("app")).await.unwrap();
        assert_eq!(directory.get(&path_key(&link)), expected);

        let recursive = scanner.scan_repository(repo.path()).await.unwrap();
        assert_eq!(recursive.len(), 1);
        assert_eq!(recursive.get(&path_key(&link)), expected);
    }
}

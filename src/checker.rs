//! Per-manifest vulnerability checks.

use crate::registry::RegistryClient;
use crate::types::{Registry, Verdict};
use futures::stream::{self, StreamExt};
use std::sync::Arc;

/// Runs registry lookups for the names of one manifest.
#[derive(Clone)]
pub struct VulnerabilityChecker {
    client: Arc<RegistryClient>,
    concurrency: usize,
}

impl VulnerabilityChecker {
    /// Create a checker running at most `concurrency` lookups at a time.
    pub fn new(client: Arc<RegistryClient>, concurrency: usize) -> Self {
        Self {
            client,
            concurrency: concurrency.max(1),
        }
    }

    /// Classify every name, returning verdicts in input order.
    ///
    /// `on_verdict` is called as each verdict arrives, which is also input
    /// order since the lookups are buffered in order.
    pub async fn check_each<F>(
        &self,
        names: &[String],
        registry: Registry,
        mut on_verdict: F,
    ) -> Vec<(String, Verdict)>
    where
        F: FnMut(&str, &Verdict),
    {
        let client = &self.client;

        stream::iter(names)
            .map(|name| async move { (name.clone(), client.check(name, registry).await) })
            .buffered(self.concurrency)
            .inspect(|(name, verdict)| on_verdict(name.as_str(), verdict))
            .collect()
            .await
    }

    /// Names classified as vulnerable, in input order with duplicates kept.
    pub async fn check_all(&self, names: &[String], registry: Registry) -> Vec<String> {
        vulnerable_names(self.check_each(names, registry, |_, _| {}).await)
    }
}

/// Keep the names whose verdict makes them claimable.
pub fn vulnerable_names(verdicts: Vec<(String, Verdict)>) -> Vec<String> {
    verdicts
        .into_iter()
        .filter(|(_, verdict)| verdict.is_vulnerable())
        .map(|(name, _)| name)
        .collect()
}

//! Registry client classifying package names against npm and PyPI.

use crate::types::{HttpConfig, Registry, RegistryUrls, Result, Verdict};
use governor::{Quota, RateLimiter};
use reqwest::{Client, Response, StatusCode};
use serde::Deserialize;
use serde_json::Value;
use std::num::NonZeroU32;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, trace, warn};

/// npm registry API response for package info.
#[derive(Debug, Deserialize)]
struct NpmPackageInfo {
    /// Publication times; carries an `unpublished` record once removed.
    #[serde(default)]
    time: Option<Value>,
}

/// Client for single best-effort lookups against the public registries.
pub struct RegistryClient {
    client: Client,
    rate_limiter: Arc<RateLimiter<governor::state::NotKeyed, governor::state::InMemoryState, governor::clock::DefaultClock>>,
    urls: RegistryUrls,
}

impl RegistryClient {
    /// Create a new registry client.
    pub fn new(http: &HttpConfig, urls: RegistryUrls, rate_limit: u32) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(http.timeout_secs))
            .user_agent(http.user_agent.as_str())
            .pool_max_idle_per_host(10)
            .pool_idle_timeout(Duration::from_secs(30))
            .build()?;

        let quota = Quota::per_second(NonZeroU32::new(rate_limit).unwrap_or(NonZeroU32::MIN));
        let rate_limiter = Arc::new(RateLimiter::direct(quota));

        Ok(Self {
            client,
            rate_limiter,
            urls,
        })
    }

    /// URL queried for a name on the given registry.
    pub fn lookup_url(&self, name: &str, registry: Registry) -> String {
        let base = self.urls.base(registry);
        let encoded = urlencoding::encode(name);
        match registry {
            Registry::Npm => format!("{}/{}", base, encoded),
            Registry::PyPi => format!("{}/{}/json", base, encoded),
        }
    }

    /// Classify a dependency name. Never fails: transport problems become
    /// [`Verdict::Error`].
    pub async fn check(&self, name: &str, registry: Registry) -> Verdict {
        self.rate_limiter.until_ready().await;

        let url = self.lookup_url(name, registry);
        trace!("Checking {}: {}", registry, url);

        let response = match self.client.get(&url).send().await {
            Ok(response) => response,
            Err(e) => {
                warn!("Error checking {}: {}", name, e);
                return Verdict::Error {
                    error: e.to_string(),
                };
            }
        };

        match response.status() {
            StatusCode::NOT_FOUND => {
                debug!("Package NOT FOUND on {}: {}", registry, name);
                Verdict::NotFound
            }
            StatusCode::OK => match registry {
                Registry::Npm => self.inspect_npm_metadata(name, response).await,
                // PyPI has no unpublish marker.
                Registry::PyPi => {
                    debug!("Package exists on {}: {}", registry, name);
                    Verdict::Found
                }
            },
            status => {
                debug!("Unexpected status {} for {}", status, name);
                Verdict::Unknown {
                    status: status.as_u16(),
                }
            }
        }
    }

    /// Look for the `time.unpublished` marker in an npm packument.
    async fn inspect_npm_metadata(&self, name: &str, response: Response) -> Verdict {
        match response.json::<NpmPackageInfo>().await {
            Ok(info) => {
                let unpublished = info
                    .time
                    .as_ref()
                    .and_then(|time| time.get("unpublished"))
                    .is_some();

                if unpublished {
                    debug!("Package UNPUBLISHED from npm: {}", name);
                    Verdict::Unpublished
                } else {
                    debug!("Package exists on npm: {}", name);
                    Verdict::Found
                }
            }
            Err(e) if e.is_decode() => {
                // A 200 means the name is held, whatever the body looks like.
                warn!("Failed to parse npm response for {}: {}", name, e);
                Verdict::Found
            }
            Err(e) => {
                warn!("Error reading npm response for {}: {}", name, e);
                Verdict::Error {
                    error: e.to_string(),
                }
            }
        }
    }
}

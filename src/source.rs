/*============================================================
  Synavera Project: Syn-Meta
  Module: synmeta_core::source
  Etiquette: Synavera Script Etiquette — Rust Profile v1.1.1
  ------------------------------------------------------------
  Purpose:
    Deliver complete metadata documents (index, package and
    version files) from a local mirror or a remote HTTPS
    metadata server.

  Security / Safety Notes:
    Performs read-only HTTPS GET requests; no credentials are
    transmitted. Relative paths are percent-encoded per
    segment before they reach the network, and directory
    reads refuse dot segments and separators inside a segment.

  Dependencies:
    reqwest for HTTP, tokio for files and concurrency,
    urlencoding for path segments.

  Operational Scope:
    Reference fetch collaborator: documents are only handed
    to the parsers once fully received.

  Revision History:
    2025-11-12 COD  Adapted AUR client into metadata source.
    2025-11-19 COD  Confine directory reads to the mirror root.
  ------------------------------------------------------------
  SSE Principles Observed:
    - Defensive retry logic with exponential backoff
    - Configurable timeouts, parallelism and throttling
    - Fetching never mutates registry state
============================================================*/

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use reqwest::StatusCode;
use serde_json::Value;
use tokio::sync::Semaphore;
use tokio::time::sleep;
use urlencoding::encode;

use crate::config::SourceConfig;
use crate::error::{MetaError, Result};
use crate::json::is_valid_identifier;

/// Origin of metadata documents, addressed by relative path such as
/// `index.json` or `net.minecraft/1.20.1.json`.
#[derive(Clone, Debug)]
pub enum DocumentSource {
    Directory(PathBuf),
    Remote(RemoteSource),
}

/// HTTPS metadata server client.
#[derive(Clone, Debug)]
pub struct RemoteSource {
    client: reqwest::Client,
    base_url: String,
    max_retries: usize,
    max_kib_per_sec: u64,
}

impl DocumentSource {
    /// Build the source described by `config`; a local directory wins.
    pub fn from_config(config: &SourceConfig) -> Result<Self> {
        match &config.directory {
            Some(dir) => Ok(DocumentSource::Directory(dir.clone())),
            None => Ok(DocumentSource::Remote(RemoteSource::new(config)?)),
        }
    }

    /// Human-readable origin for logs.
    pub fn describe(&self) -> String {
        match self {
            DocumentSource::Directory(dir) => dir.display().to_string(),
            DocumentSource::Remote(remote) => remote.base_url.clone(),
        }
    }

    /// Fetch and decode one document.
    pub async fn fetch(&self, path: &str) -> Result<Value> {
        match self {
            DocumentSource::Directory(dir) => {
                let file = dir.join(confined_path(path)?);
                let bytes = tokio::fs::read(&file).await.map_err(|err| {
                    MetaError::Filesystem(format!("Failed to read {}: {err}", file.display()))
                })?;
                serde_json::from_slice(&bytes).map_err(|err| {
                    MetaError::Serialization(format!("{} is not valid JSON: {err}", file.display()))
                })
            }
            DocumentSource::Remote(remote) => remote.fetch(path).await,
        }
    }

    /// Fetch several documents with at most `parallel` in flight. Results
    /// are returned in request order; individual failures do not abort
    /// the batch.
    pub async fn fetch_many(
        &self,
        paths: Vec<String>,
        parallel: usize,
    ) -> Result<Vec<(String, Result<Value>)>> {
        let semaphore = Arc::new(Semaphore::new(parallel.max(1)));
        let mut tasks = Vec::with_capacity(paths.len());

        for path in paths {
            let source = self.clone();
            let semaphore = semaphore.clone();
            tasks.push(tokio::spawn(async move {
                let result = match semaphore.acquire_owned().await {
                    Ok(_permit) => source.fetch(&path).await,
                    Err(_) => Err(MetaError::Runtime("Fetch semaphore closed".into())),
                };
                (path, result)
            }));
        }

        let mut results = Vec::with_capacity(tasks.len());
        for task in tasks {
            let outcome = task
                .await
                .map_err(|err| MetaError::Runtime(format!("Fetch task failed: {err}")))?;
            results.push(outcome);
        }
        Ok(results)
    }
}

impl RemoteSource {
    pub fn new(config: &SourceConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout))
            .user_agent(concat!("Syn-Meta/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|err| MetaError::Network(format!("Failed to build HTTP client: {err}")))?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            max_retries: config.max_retries.max(1),
            max_kib_per_sec: config.max_kib_per_sec,
        })
    }

    fn compose_url(&self, path: &str) -> String {
        let mut url = self.base_url.clone();
        for segment in path.split('/').filter(|s| !s.is_empty()) {
            url.push('/');
            url.push_str(&encode(segment));
        }
        url
    }

    async fn fetch(&self, path: &str) -> Result<Value> {
        let url = self.compose_url(path);
        let mut attempt = 0;
        loop {
            let response = self.client.get(&url).send().await.map_err(|err| {
                MetaError::Network(format!("Request to {url} failed: {err}"))
            })?;
            let status = response.status();

            if status == StatusCode::OK {
                let content_len = response.content_length();
                let bytes = response.bytes().await.map_err(|err| {
                    MetaError::Network(format!("Failed to read body of {url}: {err}"))
                })?;
                self.enforce_rate_limit(content_len.or(Some(bytes.len() as u64)))
                    .await;
                return serde_json::from_slice(&bytes).map_err(|err| {
                    MetaError::Serialization(format!("{url} is not valid JSON: {err}"))
                });
            }

            attempt += 1;
            if !is_retryable(status) || attempt >= self.max_retries {
                return Err(MetaError::Network(format!(
                    "Request {url} failed with status {status} after {attempt} attempt(s)"
                )));
            }
            let exponent = (attempt as u32).min(8);
            let backoff = Duration::from_millis(200_u64.saturating_mul(1_u64 << exponent));
            sleep(backoff).await;
        }
    }

    async fn enforce_rate_limit(&self, content_length: Option<u64>) {
        if let Some(delay) = content_length.and_then(|bytes| throttle_delay(bytes, self.max_kib_per_sec))
        {
            sleep(delay).await;
        }
    }
}

/// `path` as a relative path of plain segments below the mirror root.
fn confined_path(path: &str) -> Result<PathBuf> {
    if path.split('/').all(is_valid_identifier) {
        Ok(path.split('/').collect())
    } else {
        Err(MetaError::Filesystem(format!(
            "Refusing to read `{path}` outside the mirror root"
        )))
    }
}

fn is_retryable(status: StatusCode) -> bool {
    status.is_server_error()
        || status == StatusCode::TOO_MANY_REQUESTS
        || status == StatusCode::REQUEST_TIMEOUT
}

fn throttle_delay(bytes: u64, kib_per_sec: u64) -> Option<Duration> {
    let denominator = kib_per_sec.checked_mul(1024).filter(|d| *d > 0)?;
    // Ceil division so the configured rate is never exceeded.
    let millis = bytes.saturating_mul(1000).saturating_add(denominator - 1) / denominator;
    (millis > 0).then(|| Duration::from_millis(millis))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn url_segments_are_encoded() {
        let remote = RemoteSource::new(&SourceConfig {
            base_url: "https://meta.example.org/v1/".into(),
            ..SourceConfig::default()
        })
        .unwrap();
        assert_eq!(
            remote.compose_url("net.minecraft/1.20.1.json"),
            "https://meta.example.org/v1/net.minecraft/1.20.1.json"
        );
        assert_eq!(
            remote.compose_url("org.quiltmc/0.20 beta.json"),
            "https://meta.example.org/v1/org.quiltmc/0.20%20beta.json"
        );
    }

    #[test]
    fn throttle_rounds_up() {
        assert_eq!(throttle_delay(1024, 0), None);
        assert_eq!(throttle_delay(0, 1), None);
        assert_eq!(throttle_delay(1024, 1), Some(Duration::from_millis(1000)));
        assert_eq!(throttle_delay(1, 1), Some(Duration::from_millis(1)));
    }

    #[test]
    fn only_transient_statuses_retry() {
        assert!(is_retryable(StatusCode::BAD_GATEWAY));
        assert!(is_retryable(StatusCode::TOO_MANY_REQUESTS));
        assert!(!is_retryable(StatusCode::NOT_FOUND));
    }

    #[test]
    fn directory_paths_stay_below_root() {
        assert_eq!(
            confined_path("net.minecraft/1.20.1.json").unwrap(),
            PathBuf::from("net.minecraft").join("1.20.1.json")
        );
        let hostile = ["../escape/index.json", "/etc/passwd", "a//b.json", "net\\..\\x.json", ""];
        for path in hostile {
            assert!(matches!(confined_path(path), Err(MetaError::Filesystem(_))));
        }
    }

    #[tokio::test]
    async fn directory_fetch_refuses_escaping_paths() {
        let root = tempfile::TempDir::new().unwrap();
        let mirror = root.path().join("mirror");
        std::fs::create_dir_all(&mirror).unwrap();
        std::fs::write(root.path().join("secret.json"), b"{}").unwrap();

        let source = DocumentSource::Directory(mirror);
        let err = source.fetch("../secret.json").await.unwrap_err();
        assert!(matches!(err, MetaError::Filesystem(_)));
        assert!(err.to_string().contains("outside the mirror root"));
    }

    #[test]
    fn directory_wins_over_remote() {
        let config = SourceConfig {
            directory: Some(PathBuf::from("/srv/meta")),
            ..SourceConfig::default()
        };
        let source = DocumentSource::from_config(&config).unwrap();
        assert_eq!(source.describe(), "/srv/meta");
    }
}

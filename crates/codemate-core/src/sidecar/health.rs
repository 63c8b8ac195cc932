//! Sidecar health probe

use crate::config::SidecarConfig;
use async_trait::async_trait;
use reqwest::StatusCode;
use serde_json::json;
use std::path::PathBuf;
use tracing::trace;

/// Answers whether the sidecar is up
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait HealthProbe: Send + Sync {
    async fn is_healthy(&self) -> bool;
}

/// Probes `POST <base>/smoke_test` with a short timeout.
///
/// Any 2xx counts as alive, and so does 400: the service is up but rejected
/// the repository path.
pub struct HttpHealthProbe {
    http: reqwest::Client,
    url: String,
    repo_path: PathBuf,
}

impl HttpHealthProbe {
    pub fn new(config: &SidecarConfig) -> Self {
        let http = reqwest::Client::builder()
            .timeout(config.probe_timeout)
            .build()
            .unwrap_or_default();
        Self {
            http,
            url: config.endpoint("smoke_test"),
            repo_path: config.repo_path.clone(),
        }
    }
}

#[async_trait]
impl HealthProbe for HttpHealthProbe {
    async fn is_healthy(&self) -> bool {
        let body = json!({ "repo_path": self.repo_path.display().to_string() });
        match self.http.post(&self.url).json(&body).send().await {
            Ok(resp) => {
                let status = resp.status();
                trace!(url = %self.url, %status, "health probe answered");
                status.is_success() || status == StatusCode::BAD_REQUEST
            }
            Err(e) => {
                trace!(url = %self.url, error = %e, "health probe failed");
                false
            }
        }
    }
}

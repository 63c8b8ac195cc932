//! Running agent tasks on the sidecar

use crate::config::SidecarConfig;
use crate::error::{CodemateError, CodemateResult};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::{debug, instrument};

/// Result of an agent task as reported by the sidecar
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentResult {
    pub agent: String,
    pub task: String,
    /// `success` or `failed`
    pub status: String,
    #[serde(default)]
    pub details: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub artifacts: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl AgentResult {
    pub fn is_success(&self) -> bool {
        self.status == "success"
    }
}

/// Something that can run an agent task
#[async_trait]
pub trait AgentRunner: Send + Sync {
    async fn run(&self, agent: &str, task: &str, payload: Value) -> CodemateResult<AgentResult>;
}

/// HTTP client for `POST <base>/run`
pub struct AgentClient {
    http: reqwest::Client,
    url: String,
}

impl AgentClient {
    pub fn new(config: &SidecarConfig) -> Self {
        let http = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()
            .unwrap_or_default();
        Self {
            http,
            url: config.endpoint("run"),
        }
    }
}

/// Request body: the payload's fields with `agent` and `task` on top
pub(crate) fn run_body(agent: &str, task: &str, payload: Value) -> Value {
    let mut body = match payload {
        Value::Object(map) => map,
        Value::Null => Map::new(),
        other => {
            let mut map = Map::new();
            map.insert("payload".to_string(), other);
            map
        }
    };
    body.insert("agent".to_string(), Value::String(agent.to_string()));
    body.insert("task".to_string(), Value::String(task.to_string()));
    Value::Object(body)
}

#[async_trait]
impl AgentRunner for AgentClient {
    #[instrument(skip(self, payload), fields(url = %self.url))]
    async fn run(&self, agent: &str, task: &str, payload: Value) -> CodemateResult<AgentResult> {
        let resp = self
            .http
            .post(&self.url)
            .json(&run_body(agent, task, payload))
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(CodemateError::Http {
                message: format!("Agent request failed: {}", body),
                url: Some(self.url.clone()),
                status_code: Some(status.as_u16()),
            });
        }

        let result: AgentResult = resp.json().await?;
        debug!(status = %result.status, "agent task finished");
        Ok(result)
    }
}

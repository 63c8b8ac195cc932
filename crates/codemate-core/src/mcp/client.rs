//! One-shot stdio client for MCP tool servers

use super::error::McpError;
use super::protocol::{handshake, is_call_response, unwrap_payload};
use crate::config::ToolServerConfig;
use async_trait::async_trait;
use serde_json::Value;
use std::process::Stdio;
use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncWriteExt, BufReader};
use tokio::process::{Child, ChildStderr, Command};
use tracing::{debug, info, trace, warn};

/// Something that can run a named tool
#[async_trait]
pub trait ToolInvoker: Send + Sync {
    async fn call_tool(&self, name: &str, arguments: Value) -> Result<Value, McpError>;
}

/// Spawns the configured tool server for every call
#[derive(Debug, Clone)]
pub struct ToolProcessClient {
    config: ToolServerConfig,
}

impl ToolProcessClient {
    pub fn new(config: ToolServerConfig) -> Self {
        Self { config }
    }

    /// Run one tool call against a fresh server process.
    ///
    /// Resolves with the nested payload of the response to the invoke
    /// request, or with the raw envelope when there is none. No retries.
    pub async fn call(&self, tool: &str, arguments: Value) -> Result<Value, McpError> {
        let mut server = self.spawn()?;
        let result = match server.child.as_mut() {
            Some(child) => self.exchange(child, tool, arguments).await,
            None => Err(McpError::connection("Tool server is not running")),
        };
        server.terminate().await;

        match &result {
            Ok(_) => info!(tool, "tool call completed"),
            Err(e) => warn!(tool, error = %e, "tool call failed"),
        }
        result.map(unwrap_payload)
    }

    fn spawn(&self) -> Result<ServerProcess, McpError> {
        let mut cmd = Command::new(&self.config.program);
        cmd.args(&self.config.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        if let Some(cwd) = &self.config.cwd {
            cmd.current_dir(cwd);
        }
        cmd.envs(&self.config.env);

        let mut child = cmd.spawn().map_err(|e| {
            McpError::connection(format!(
                "Failed to spawn tool server '{}': {}",
                self.config.program, e
            ))
        })?;

        if let Some(stderr) = child.stderr.take() {
            tokio::spawn(drain_stderr(stderr));
        }
        debug!(program = %self.config.program, pid = ?child.id(), "spawned tool server");
        Ok(ServerProcess { child: Some(child) })
    }

    async fn exchange(
        &self,
        child: &mut Child,
        tool: &str,
        arguments: Value,
    ) -> Result<Value, McpError> {
        let mut stdin = child
            .stdin
            .take()
            .ok_or_else(|| McpError::connection("Failed to get stdin handle"))?;
        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| McpError::connection("Failed to get stdout handle"))?;

        for request in handshake(tool, arguments) {
            let mut line = serde_json::to_string(&request)?;
            line.push('\n');
            stdin.write_all(line.as_bytes()).await.map_err(|e| {
                McpError::transport(format!("Failed to write request: {}", e))
                    .with_context(tool.to_string())
            })?;
        }
        stdin.flush().await?;

        let response = read_call_response(stdout).await;
        drop(stdin);
        response.map_err(|e| e.with_context(tool.to_string()))
    }
}

#[async_trait]
impl ToolInvoker for ToolProcessClient {
    async fn call_tool(&self, name: &str, arguments: Value) -> Result<Value, McpError> {
        self.call(name, arguments).await
    }
}

/// Read newline-delimited envelopes until the invoke response shows up.
///
/// Lines that are not JSON are dropped; other envelopes are collected and
/// ignored.
async fn read_call_response<R>(stdout: R) -> Result<Value, McpError>
where
    R: AsyncRead + Unpin,
{
    let mut reader = BufReader::new(stdout);
    let mut line = Vec::new();
    let mut seen: Vec<Value> = Vec::new();

    loop {
        line.clear();
        let n = reader
            .read_until(b'\n', &mut line)
            .await
            .map_err(|e| McpError::transport(format!("Failed to read from tool server: {}", e)))?;
        if n == 0 || line.last() != Some(&b'\n') {
            return Err(McpError::transport(format!(
                "Tool server exited before responding ({} other messages received)",
                seen.len()
            )));
        }

        let envelope = match serde_json::from_slice::<Value>(&line) {
            Ok(v) => v,
            Err(e) => {
                trace!(error = %e, "dropping unparsable line from tool server");
                continue;
            }
        };
        if is_call_response(&envelope) {
            return Ok(envelope);
        }
        seen.push(envelope);
    }
}

/// A spawned tool server, killed and reaped at most once
struct ServerProcess {
    child: Option<Child>,
}

impl ServerProcess {
    /// Kill and reap the server. Returns false when it was already terminated.
    async fn terminate(&mut self) -> bool {
        let Some(mut child) = self.child.take() else {
            return false;
        };
        if let Err(e) = child.start_kill() {
            trace!(error = %e, "tool server already gone");
        }
        match child.wait().await {
            Ok(status) => debug!(%status, "tool server terminated"),
            Err(e) => debug!(error = %e, "failed to reap tool server"),
        }
        true
    }
}

async fn drain_stderr(stderr: ChildStderr) {
    let mut lines = BufReader::new(stderr).lines();
    while let Ok(Some(line)) = lines.next_line().await {
        debug!(target: "codemate::tool_server", "{}", line);
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use serde_json::json;
    use std::collections::HashMap;

    fn shell(script: &str) -> ToolProcessClient {
        ToolProcessClient::new(ToolServerConfig {
            program: "sh".into(),
            args: vec!["-c".into(), script.into()],
            cwd: None,
            env: HashMap::new(),
        })
    }

    #[tokio::test]
    async fn test_call_returns_nested_payload() {
        let client = shell(
            r#"read a; read b; read c
echo '{"jsonrpc":"2.0","id":1,"result":{}}'
echo '{"jsonrpc":"2.0","id":2,"result":{"tools":[]}}'
printf '%s\n' '{"jsonrpc":"2.0","id":3,"result":{"content":[{"type":"text","text":"{\"ok\":true,\"message\":\"clean\"}"}]}}'
exec sleep 30"#,
        );
        let value = client.call("git_status", json!({"repo_path": "."})).await.unwrap();
        assert_eq!(value, json!({"ok": true, "message": "clean"}));
    }

    #[tokio::test]
    async fn test_garbage_and_out_of_order_lines() {
        let client = shell(
            r#"echo 'not json at all'
echo '{"id":3,"result":{"value":42}}'
echo '{"id":1,"result":{}}'
exec sleep 30"#,
        );
        let value = client.call("anything", json!({})).await.unwrap();
        assert_eq!(value["result"]["value"], 42);
    }

    #[tokio::test]
    async fn test_exit_before_response_is_transport_error() {
        let client = shell(r#"read a; echo '{"id":1,"result":{}}'; exit 0"#);
        let err = client.call("git_status", json!({})).await.unwrap_err();
        assert_eq!(err.error_code(), "MCP_TRANSPORT");
        assert_eq!(err.context(), Some("git_status"));
    }

    #[tokio::test]
    async fn test_spawn_failure_is_connection_error() {
        let client = ToolProcessClient::new(ToolServerConfig {
            program: "/nonexistent/tool-server".into(),
            args: vec![],
            cwd: None,
            env: HashMap::new(),
        });
        let err = client.call("git_status", json!({})).await.unwrap_err();
        assert_eq!(err.error_code(), "MCP_CONNECTION");
    }

    #[tokio::test]
    async fn test_server_is_terminated_once() {
        let client = shell("exec sleep 30");
        let mut server = client.spawn().unwrap();
        let pid = server.child.as_ref().and_then(Child::id).unwrap();

        assert!(server.terminate().await);
        assert!(server.child.is_none());
        assert!(!server.terminate().await);

        let alive = std::process::Command::new("kill")
            .args(["-0", &pid.to_string()])
            .stderr(Stdio::null())
            .status()
            .unwrap();
        assert!(!alive.success());
    }

    #[tokio::test]
    async fn test_server_that_exits_first_is_still_reaped() {
        let client = shell(r#"read a; read b; read c; echo '{"id":3,"result":{"done":true}}'"#);
        let value = client.call("git_status", json!({})).await.unwrap();
        assert_eq!(value["result"]["done"], true);
    }

    #[tokio::test]
    async fn test_reader_ignores_partial_trailing_line() {
        let input: &[u8] = b"{\"id\":2}\n{\"id\":3";
        let err = read_call_response(input).await.unwrap_err();
        assert_eq!(err.error_code(), "MCP_TRANSPORT");
    }

    #[tokio::test]
    async fn test_env_is_passed() {
        let mut env = HashMap::new();
        env.insert("CODEMATE_TEST_VALUE".to_string(), "42".to_string());
        let client = ToolProcessClient::new(ToolServerConfig {
            program: "sh".into(),
            args: vec![
                "-c".into(),
                r#"printf '{"id":3,"result":{"content":[{"type":"text","text":"%s"}]}}\n' "$CODEMATE_TEST_VALUE""#.into(),
            ],
            cwd: None,
            env,
        });
        let value = client.call("echo", json!({})).await.unwrap();
        assert_eq!(value, json!(42));
    }
}

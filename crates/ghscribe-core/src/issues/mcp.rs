// SPDX-License-Identifier: Apache-2.0

//! Issue source backed by a GitHub MCP server running as a subprocess.
//!
//! The server is started over stdio with the configured command (by default
//! `npx -y @modelcontextprotocol/server-github`) and queried through its
//! `list_issues` tool. The child process is killed when the source is
//! dropped, so an interrupted run does not leave it behind.

use anyhow::{Context, Result};
use async_trait::async_trait;
use rmcp::model::CallToolRequestParams;
use rmcp::service::RunningService;
use rmcp::transport::TokioChildProcess;
use rmcp::{RoleClient, ServiceExt};
use secrecy::{ExposeSecret, SecretString};
use serde_json::{Value, json};
use tokio::process::Command;
use tracing::{debug, info, instrument};

use super::source::{IssueSource, ListQuery, records_from_json};
use crate::config::IssuesConfig;
use crate::error::ScribeError;

/// Environment variable the GitHub MCP server reads its token from.
pub const MCP_TOKEN_ENV: &str = "GITHUB_PERSONAL_ACCESS_TOKEN";

/// A live MCP client session with the issue tracker tool.
pub struct McpIssueSource {
    service: RunningService<RoleClient, ()>,
    tool: String,
}

fn source_error(message: impl Into<String>) -> ScribeError {
    ScribeError::IssueSource {
        source_name: "mcp".to_string(),
        message: message.into(),
    }
}

impl McpIssueSource {
    /// Starts the MCP server and completes the protocol handshake.
    ///
    /// # Errors
    ///
    /// Returns `ScribeError::IssueSource` if the process cannot be spawned or
    /// the handshake fails.
    #[instrument(skip(config, token), fields(command = %config.mcp_command))]
    pub async fn spawn(config: &IssuesConfig, token: &SecretString) -> Result<Self> {
        let mut command = Command::new(&config.mcp_command);
        command
            .args(&config.mcp_args)
            .env(MCP_TOKEN_ENV, token.expose_secret())
            .kill_on_drop(true);

        let transport = TokioChildProcess::new(command).map_err(|e| {
            source_error(format!("failed to start '{}': {e}", config.mcp_command))
        })?;

        let service = ()
            .serve(transport)
            .await
            .map_err(|e| source_error(format!("MCP handshake failed: {e}")))?;

        info!("Connected to GitHub MCP server");

        Ok(Self {
            service,
            tool: config.mcp_tool.clone(),
        })
    }
}

/// Extracts issue records from a `CallToolResult` in JSON form.
///
/// Structured content is preferred; otherwise the first text block that
/// parses as a record list is used.
fn records_from_tool_result(result: &Value) -> Result<Vec<Value>, ScribeError> {
    let texts = || {
        result
            .get("content")
            .and_then(Value::as_array)
            .into_iter()
            .flatten()
            .filter_map(|c| c.get("text").and_then(Value::as_str))
    };

    if result.get("isError").and_then(Value::as_bool) == Some(true) {
        let message = texts().collect::<Vec<_>>().join(" ");
        return Err(source_error(format!("tool reported an error: {message}")));
    }

    if let Some(records) = result
        .get("structuredContent")
        .cloned()
        .and_then(records_from_json)
    {
        return Ok(records);
    }

    texts()
        .filter_map(|text| serde_json::from_str::<Value>(text).ok())
        .find_map(records_from_json)
        .ok_or_else(|| source_error("tool result did not contain an issue list"))
}

#[async_trait]
impl IssueSource for McpIssueSource {
    fn name(&self) -> &str {
        "mcp"
    }

    #[instrument(skip(self), fields(tool = %self.tool, page = query.page))]
    async fn list_page(&self, query: &ListQuery) -> Result<Vec<Value>> {
        let params: CallToolRequestParams = serde_json::from_value(json!({
            "name": self.tool,
            "arguments": query.to_arguments(),
        }))
        .context("Failed to build MCP tool call")?;

        let result = self
            .service
            .call_tool(params)
            .await
            .map_err(|e| source_error(format!("call to '{}' failed: {e}", self.tool)))?;

        let result = serde_json::to_value(&result).context("Failed to read MCP tool result")?;
        let records = records_from_tool_result(&result)?;

        debug!(count = records.len(), "Fetched MCP issue page");
        Ok(records)
    }

    async fn shutdown(self: Box<Self>) -> Result<()> {
        let reason = self
            .service
            .cancel()
            .await
            .map_err(|e| source_error(format!("failed to stop MCP session: {e}")))?;
        debug!(?reason, "MCP session closed");
        Ok(())
    }
}

//! Removal of MCP server registrations from AI tool configuration files.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde_json::Value;
use thiserror::Error;
use tracing::debug;

/// AI tools an installer can register an MCP server with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AiTool {
    ClaudeDesktop,
    ClaudeCode,
    CodexCli,
    VsCodeCopilot,
    Cursor,
    Windsurf,
    GeminiCli,
    OpenCode,
    Warp,
    JetBrains,
}

/// How a tool stores its MCP servers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum McpConfigFormat {
    /// A JSON object holding one entry per server under `servers_key`.
    Json { servers_key: &'static str },
    /// TOML tables named `[mcp_servers.<key>]`.
    Toml,
    /// Configured through the tool's UI; nothing on disk to edit.
    Manual,
}

impl AiTool {
    /// Parse the tool name recorded in a manifest, e.g. `CLAUDE_DESKTOP`.
    pub fn from_name(name: &str) -> Option<Self> {
        Some(match name {
            "CLAUDE_DESKTOP" => AiTool::ClaudeDesktop,
            "CLAUDE_CODE" => AiTool::ClaudeCode,
            "CODEX_CLI" => AiTool::CodexCli,
            "VSCODE_COPILOT" => AiTool::VsCodeCopilot,
            "CURSOR" => AiTool::Cursor,
            "WINDSURF" => AiTool::Windsurf,
            "GEMINI_CLI" => AiTool::GeminiCli,
            "OPENCODE" => AiTool::OpenCode,
            "WARP" => AiTool::Warp,
            "JETBRAINS" => AiTool::JetBrains,
            _ => return None,
        })
    }

    pub fn config_format(&self) -> McpConfigFormat {
        match self {
            AiTool::CodexCli => McpConfigFormat::Toml,
            AiTool::VsCodeCopilot => McpConfigFormat::Json {
                servers_key: "servers",
            },
            AiTool::Warp | AiTool::JetBrains => McpConfigFormat::Manual,
            _ => McpConfigFormat::Json {
                servers_key: "mcpServers",
            },
        }
    }
}

#[derive(Debug, Error)]
pub enum McpRemovalError {
    #[error("Unknown tool type: {0}")]
    UnknownTool(String),

    #[error("failed to read {}: {source}", path.display())]
    ReadFailed { path: PathBuf, source: io::Error },

    #[error("failed to write {}: {source}", path.display())]
    WriteFailed { path: PathBuf, source: io::Error },

    #[error("invalid JSON in {}: {source}", path.display())]
    InvalidJson {
        path: PathBuf,
        source: serde_json::Error,
    },
}

/// Remove one server entry. Returns whether the file changed.
///
/// A missing config file or missing entry is `Ok(false)`.
pub fn remove_mcp_server(
    config_file: &Path,
    entry_key: &str,
    tool_name: &str,
) -> Result<bool, McpRemovalError> {
    let tool =
        AiTool::from_name(tool_name).ok_or_else(|| McpRemovalError::UnknownTool(tool_name.to_string()))?;

    let content = match fs::read_to_string(config_file) {
        Ok(content) => content,
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            debug!(path = %config_file.display(), "MCP config file does not exist");
            return Ok(false);
        }
        Err(e) => {
            return Err(McpRemovalError::ReadFailed {
                path: config_file.to_path_buf(),
                source: e,
            })
        }
    };

    let updated = match tool.config_format() {
        McpConfigFormat::Manual => None,
        McpConfigFormat::Json { servers_key } => {
            remove_json_entry(&content, servers_key, entry_key).map_err(|e| {
                McpRemovalError::InvalidJson {
                    path: config_file.to_path_buf(),
                    source: e,
                }
            })?
        }
        McpConfigFormat::Toml => remove_toml_table(&content, entry_key),
    };

    match updated {
        Some(text) => {
            fs::write(config_file, text).map_err(|e| McpRemovalError::WriteFailed {
                path: config_file.to_path_buf(),
                source: e,
            })?;
            Ok(true)
        }
        None => Ok(false),
    }
}

/// New document text, or `None` when the entry was not present.
fn remove_json_entry(
    content: &str,
    servers_key: &str,
    entry_key: &str,
) -> Result<Option<String>, serde_json::Error> {
    if content.trim().is_empty() {
        return Ok(None);
    }
    let mut config: Value = serde_json::from_str(content)?;
    let removed = config
        .get_mut(servers_key)
        .and_then(Value::as_object_mut)
        .and_then(|servers| servers.shift_remove(entry_key))
        .is_some();
    if !removed {
        return Ok(None);
    }
    let mut text = serde_json::to_string_pretty(&config)?;
    text.push('\n');
    Ok(Some(text))
}

/// Drop `[mcp_servers.<key>]` and its sub-tables. Returns `None` when
/// no such table exists.
fn remove_toml_table(content: &str, entry_key: &str) -> Option<String> {
    let names = [
        format!("mcp_servers.\"{}\"", entry_key),
        format!("mcp_servers.'{}'", entry_key),
        format!("mcp_servers.{}", entry_key),
    ];
    let is_target = |header: &str| {
        names
            .iter()
            .any(|n| header == n || header.starts_with(&format!("{}.", n)))
    };

    let mut out = String::with_capacity(content.len());
    let mut skipping = false;
    let mut removed = false;
    for chunk in content.split_inclusive('\n') {
        if let Some(header) = table_header(chunk) {
            skipping = is_target(header);
            removed |= skipping;
        }
        if !skipping {
            out.push_str(chunk);
        }
    }
    removed.then_some(out)
}

/// Table name of a `[name]` or `[[name]]` header line.
fn table_header(line: &str) -> Option<&str> {
    let line = line.trim();
    let inner = line.strip_prefix('[')?;
    let inner = inner.strip_prefix('[').unwrap_or(inner);
    let end = inner.find(']')?;
    Some(inner[..end].trim())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_tool_formats() {
        assert_eq!(
            AiTool::from_name("VSCODE_COPILOT").unwrap().config_format(),
            McpConfigFormat::Json { servers_key: "servers" }
        );
        assert_eq!(
            AiTool::from_name("CODEX_CLI").unwrap().config_format(),
            McpConfigFormat::Toml
        );
        assert_eq!(
            AiTool::from_name("CLAUDE_DESKTOP").unwrap().config_format(),
            McpConfigFormat::Json { servers_key: "mcpServers" }
        );
        assert!(AiTool::from_name("claude_desktop").is_none());
    }

    #[test]
    fn test_remove_json_entry_keeps_other_keys_in_order() {
        let temp = TempDir::new().unwrap();
        let file = temp.path().join("claude_desktop_config.json");
        fs::write(
            &file,
            r#"{"zeta": 1, "mcpServers": {"abc.my-app": {"command": "x"}, "other": {"command": "y"}}, "alpha": true}"#,
        )
        .unwrap();

        assert!(remove_mcp_server(&file, "abc.my-app", "CLAUDE_DESKTOP").unwrap());

        let value: Value = serde_json::from_str(&fs::read_to_string(&file).unwrap()).unwrap();
        assert!(value["mcpServers"].get("abc.my-app").is_none());
        assert!(value["mcpServers"].get("other").is_some());
        let keys: Vec<&String> = value.as_object().unwrap().keys().collect();
        assert_eq!(keys, ["zeta", "mcpServers", "alpha"]);
    }

    #[test]
    fn test_remaining_servers_keep_their_order() {
        let text = remove_json_entry(
            r#"{"mcpServers": {"a": {}, "b": {}, "c": {}, "d": {}}}"#,
            "mcpServers",
            "a",
        )
        .unwrap()
        .unwrap();

        let value: Value = serde_json::from_str(&text).unwrap();
        let keys: Vec<&String> = value["mcpServers"].as_object().unwrap().keys().collect();
        assert_eq!(keys, ["b", "c", "d"]);
    }

    #[test]
    fn test_missing_json_entry_leaves_file_alone() {
        let temp = TempDir::new().unwrap();
        let file = temp.path().join("mcp.json");
        let original = "{ \"servers\": {} }";
        fs::write(&file, original).unwrap();

        assert!(!remove_mcp_server(&file, "abc.my-app", "VSCODE_COPILOT").unwrap());
        assert_eq!(fs::read_to_string(&file).unwrap(), original);
    }

    #[test]
    fn test_missing_config_file() {
        let temp = TempDir::new().unwrap();
        assert!(!remove_mcp_server(&temp.path().join("none.json"), "k", "CURSOR").unwrap());
    }

    #[test]
    fn test_invalid_json_is_an_error() {
        let temp = TempDir::new().unwrap();
        let file = temp.path().join("broken.json");
        fs::write(&file, "{ not json").unwrap();
        assert!(matches!(
            remove_mcp_server(&file, "k", "CURSOR").unwrap_err(),
            McpRemovalError::InvalidJson { .. }
        ));
    }

    #[test]
    fn test_unknown_tool() {
        let temp = TempDir::new().unwrap();
        assert!(matches!(
            remove_mcp_server(temp.path(), "k", "NOTEPAD").unwrap_err(),
            McpRemovalError::UnknownTool(_)
        ));
    }

    #[test]
    fn test_remove_toml_table() {
        let content = "model = \"o3\"\n\n[mcp_servers.\"abc.my-app\"]\ncommand = \"/bin/app\"\nargs = [\"--mcp\"]\n\n[mcp_servers.\"abc.my-app\".env]\nA = \"1\"\n\n[mcp_servers.other]\ncommand = \"y\"\n";
        let updated = remove_toml_table(content, "abc.my-app").unwrap();
        assert_eq!(
            updated,
            "model = \"o3\"\n\n[mcp_servers.other]\ncommand = \"y\"\n"
        );
        assert!(remove_toml_table(&updated, "abc.my-app").is_none());
    }

    #[test]
    fn test_table_header() {
        assert_eq!(table_header("[mcp_servers.x]\n"), Some("mcp_servers.x"));
        assert_eq!(table_header("[[bin]]"), Some("bin"));
        assert_eq!(table_header("args = [\"a\"]"), None);
    }
}

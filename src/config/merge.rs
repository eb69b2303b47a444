use std::collections::BTreeMap;
use std::fs;
use std::io::Write;
use std::path::Path;
use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use tracing::debug;

use crate::auth::Credential;
use crate::error::{Result, SetupError};

/// Top-level key Claude Desktop reads server definitions from.
pub const MCP_SERVERS_KEY: &str = "mcpServers";
/// Our entry under `mcpServers`.
pub const SERVER_KEY: &str = "plantos";
/// Environment variable the MCP server reads the credential from.
pub const API_KEY_VAR: &str = "PLANTOS_API_KEY";
/// Environment variable the MCP server reads the endpoint from.
pub const API_URL_VAR: &str = "PLANTOS_API_URL";
/// Launcher used when the caller does not override it.
pub const DEFAULT_COMMAND: &str = "plantos-mcp";

/// The `mcpServers.plantos` entry written into Claude Desktop's config.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerEntry {
    pub command: String,
    pub args: Vec<String>,
    pub env: BTreeMap<String, String>,
}

impl ServerEntry {
    /// Entry launching the default `plantos-mcp` binary.
    pub fn new(credential: &Credential, base_url: &str) -> Self {
        Self::with_command(DEFAULT_COMMAND, Vec::new(), credential, base_url)
    }

    /// Entry launching a custom command (e.g. an absolute path or a wrapper).
    pub fn with_command(
        command: impl Into<String>,
        args: Vec<String>,
        credential: &Credential,
        base_url: &str,
    ) -> Self {
        let mut env = BTreeMap::new();
        env.insert(API_KEY_VAR.to_string(), credential.api_key.clone());
        env.insert(API_URL_VAR.to_string(), base_url.to_string());
        Self {
            command: command.into(),
            args,
            env,
        }
    }
}

/// Read and parse the config file at `path`.
///
/// A missing file yields an empty object. An existing file that is not
/// valid JSON fails with [`SetupError::ConfigParse`] — it is never replaced
/// with a fallback, since the document belongs to Claude Desktop and may
/// hold configuration this tool knows nothing about.
pub fn load(path: &Path) -> Result<Value> {
    let raw = match fs::read_to_string(path) {
        Ok(data) => data,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(json!({})),
        Err(err) => {
            return Err(SetupError::ConfigRead {
                path: path.to_path_buf(),
                source: err,
            })
        }
    };
    serde_json::from_str(&raw).map_err(|err| SetupError::ConfigParse {
        path: path.to_path_buf(),
        source: err,
    })
}

/// Insert or overwrite the `mcpServers.plantos` entry.
///
/// Pure and idempotent: applying the same entry twice produces the same
/// document, and every other top-level key and sibling server entry is left
/// untouched.
pub fn apply(mut doc: Value, entry: &ServerEntry) -> Value {
    if !doc.is_object() {
        doc = json!({});
    }
    let root = doc.as_object_mut().expect("root coerced to object");

    let servers = root
        .entry(MCP_SERVERS_KEY.to_string())
        .or_insert_with(|| Value::Object(Map::new()));
    if !servers.is_object() {
        *servers = Value::Object(Map::new());
    }
    let servers = servers.as_object_mut().expect("mcpServers coerced to object");
    servers.insert(
        SERVER_KEY.to_string(),
        json!({
            "command": entry.command,
            "args": entry.args,
            "env": entry.env,
        }),
    );
    doc
}

/// Remove the `mcpServers.plantos` entry, dropping `mcpServers` entirely if
/// that leaves it empty. Pure; a document without the entry passes through
/// unchanged.
pub fn remove(mut doc: Value) -> Value {
    let Some(root) = doc.as_object_mut() else {
        return doc;
    };
    if let Some(servers) = root.get_mut(MCP_SERVERS_KEY).and_then(Value::as_object_mut) {
        servers.remove(SERVER_KEY);
        if servers.is_empty() {
            root.remove(MCP_SERVERS_KEY);
        }
    }
    doc
}

/// Whether the document holds a `plantos` entry with a non-empty API key.
pub fn is_configured(doc: &Value) -> bool {
    doc.get(MCP_SERVERS_KEY)
        .and_then(|servers| servers.get(SERVER_KEY))
        .and_then(|entry| entry.get("env"))
        .and_then(|env| env.get(API_KEY_VAR))
        .and_then(Value::as_str)
        .is_some_and(|key| !key.is_empty())
}

/// Serialize `doc` with stable formatting and write it atomically.
///
/// Writes to a temp file in the same directory and renames it into place,
/// creating missing parent directories first. Claude Desktop also reads and
/// writes this file, so a partially written document must never be visible.
pub fn save(doc: &Value, path: &Path) -> Result<()> {
    let mut data = serde_json::to_vec_pretty(doc).map_err(|err| SetupError::ConfigWrite {
        path: path.to_path_buf(),
        source: std::io::Error::new(std::io::ErrorKind::InvalidData, err),
    })?;
    data.push(b'\n');
    atomic_write(path, &data).map_err(|err| SetupError::ConfigWrite {
        path: path.to_path_buf(),
        source: err,
    })?;
    debug!(path = %path.display(), "config written");
    Ok(())
}

fn atomic_write(path: &Path, data: &[u8]) -> std::io::Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }

    let file_name = path.file_name().ok_or_else(|| {
        std::io::Error::new(std::io::ErrorKind::InvalidInput, "path has no file name")
    })?;
    let nonce = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_nanos();
    let temp_name = format!(
        ".{}.tmp-{}-{nonce}",
        file_name.to_string_lossy(),
        std::process::id()
    );
    let temp_path = path.with_file_name(temp_name);

    let write_result = (|| -> std::io::Result<()> {
        let mut temp_file = fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&temp_path)?;
        temp_file.write_all(data)?;
        temp_file.sync_all()?;
        Ok(())
    })();

    if let Err(err) = write_result {
        let _ = fs::remove_file(&temp_path);
        return Err(err);
    }

    if let Err(err) = fs::rename(&temp_path, path) {
        let _ = fs::remove_file(&temp_path);
        return Err(err);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn credential() -> Credential {
        Credential {
            api_key: "plantos_test_key".to_string(),
        }
    }

    fn entry() -> ServerEntry {
        ServerEntry::new(&credential(), "https://api.plantos.co")
    }

    #[test]
    fn apply_on_empty_document_creates_entry() {
        let doc = apply(json!({}), &entry());
        assert_eq!(
            doc["mcpServers"]["plantos"]["env"][API_KEY_VAR],
            "plantos_test_key"
        );
        assert_eq!(doc["mcpServers"]["plantos"]["command"], DEFAULT_COMMAND);
    }

    #[test]
    fn apply_is_idempotent() {
        let once = apply(json!({"unrelated": 1}), &entry());
        let twice = apply(once.clone(), &entry());
        assert_eq!(once, twice);
    }

    #[test]
    fn apply_preserves_sibling_servers_and_unrelated_keys() {
        let doc = json!({
            "mcpServers": { "other": { "command": "other-mcp" } },
            "unrelated": 1
        });
        let merged = apply(doc, &entry());
        assert_eq!(merged["mcpServers"]["other"]["command"], "other-mcp");
        assert_eq!(merged["unrelated"], 1);
        assert!(merged["mcpServers"]["plantos"].is_object());
    }

    #[test]
    fn apply_coerces_non_object_mcp_servers() {
        let merged = apply(json!({"mcpServers": "oops"}), &entry());
        assert!(merged["mcpServers"]["plantos"].is_object());
    }

    #[test]
    fn apply_overwrites_stale_entry() {
        let stale = apply(json!({}), &entry());
        let fresh_entry = ServerEntry::new(
            &Credential {
                api_key: "plantos_rotated".to_string(),
            },
            "https://api.plantos.co",
        );
        let merged = apply(stale, &fresh_entry);
        assert_eq!(
            merged["mcpServers"]["plantos"]["env"][API_KEY_VAR],
            "plantos_rotated"
        );
    }

    #[test]
    fn remove_deletes_entry_and_drops_empty_map() {
        let doc = apply(json!({}), &entry());
        let cleaned = remove(doc);
        assert_eq!(cleaned, json!({}));
    }

    #[test]
    fn remove_keeps_sibling_servers() {
        let doc = apply(
            json!({"mcpServers": {"other": {"command": "other-mcp"}}}),
            &entry(),
        );
        let cleaned = remove(doc);
        assert_eq!(cleaned["mcpServers"]["other"]["command"], "other-mcp");
        assert!(cleaned["mcpServers"].get("plantos").is_none());
    }

    #[test]
    fn remove_is_a_no_op_without_entry() {
        let doc = json!({"unrelated": true});
        assert_eq!(remove(doc.clone()), doc);
    }

    #[test]
    fn is_configured_requires_non_empty_key() {
        assert!(is_configured(&apply(json!({}), &entry())));
        assert!(!is_configured(&json!({})));
        let empty_key = ServerEntry::new(
            &Credential {
                api_key: String::new(),
            },
            "https://api.plantos.co",
        );
        assert!(!is_configured(&apply(json!({}), &empty_key)));
    }
}

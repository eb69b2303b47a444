use std::fs;

use plantos_setup::auth::Credential;
use plantos_setup::config::{self, ServerEntry};
use plantos_setup::error::SetupError;
use pretty_assertions::assert_eq;
use serde_json::json;
use tempfile::TempDir;

fn credential() -> Credential {
    Credential {
        api_key: "plantos_abc123".to_string(),
    }
}

fn entry() -> ServerEntry {
    ServerEntry::new(&credential(), "https://api.plantos.co")
}

#[test]
fn load_on_missing_path_yields_empty_document() {
    let dir = TempDir::new().unwrap();
    let doc = config::load(&dir.path().join("claude_desktop_config.json")).unwrap();
    assert_eq!(doc, json!({}));
}

#[test]
fn load_on_invalid_json_fails_without_fallback() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("claude_desktop_config.json");
    fs::write(&path, "not json").unwrap();

    let err = config::load(&path).unwrap_err();
    match err {
        SetupError::ConfigParse { path: reported, .. } => assert_eq!(reported, path),
        other => panic!("expected ConfigParse, got {other:?}"),
    }
    // The corrupt file is left exactly as it was.
    assert_eq!(fs::read_to_string(&path).unwrap(), "not json");
}

#[test]
fn save_creates_missing_parent_directories() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("Claude").join("claude_desktop_config.json");
    let doc = config::apply(json!({}), &entry());

    config::save(&doc, &path).unwrap();

    let reloaded = config::load(&path).unwrap();
    assert_eq!(reloaded, doc);
}

#[test]
fn save_leaves_no_temp_files_behind() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("claude_desktop_config.json");
    config::save(&config::apply(json!({}), &entry()), &path).unwrap();

    let names: Vec<String> = fs::read_dir(dir.path())
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    assert_eq!(names, vec!["claude_desktop_config.json".to_string()]);
}

#[test]
fn reapplying_the_same_credential_produces_no_diff() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("claude_desktop_config.json");

    let first = config::apply(config::load(&path).unwrap(), &entry());
    config::save(&first, &path).unwrap();
    let first_bytes = fs::read(&path).unwrap();

    let second = config::apply(config::load(&path).unwrap(), &entry());
    config::save(&second, &path).unwrap();
    let second_bytes = fs::read(&path).unwrap();

    assert_eq!(first_bytes, second_bytes);
}

#[test]
fn merge_preserves_existing_document_on_disk() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("claude_desktop_config.json");
    fs::write(
        &path,
        r#"{"mcpServers":{"other":{"command":"other-mcp"}},"theme":"dark"}"#,
    )
    .unwrap();

    let doc = config::apply(config::load(&path).unwrap(), &entry());
    config::save(&doc, &path).unwrap();

    let reloaded = config::load(&path).unwrap();
    assert_eq!(reloaded["theme"], "dark");
    assert_eq!(reloaded["mcpServers"]["other"]["command"], "other-mcp");
    assert_eq!(
        reloaded["mcpServers"]["plantos"]["env"]["PLANTOS_API_KEY"],
        "plantos_abc123"
    );
}

#[test]
fn end_to_end_credential_lands_under_fixed_env_var() {
    let doc = config::apply(json!({}), &entry());
    assert_eq!(
        doc["mcpServers"]["plantos"]["env"]["PLANTOS_API_KEY"],
        "plantos_abc123"
    );
    assert_eq!(
        doc["mcpServers"]["plantos"]["env"]["PLANTOS_API_URL"],
        "https://api.plantos.co"
    );
    assert_eq!(doc["mcpServers"]["plantos"]["command"], "plantos-mcp");
    assert!(config::is_configured(&doc));
}

#[test]
fn saved_file_is_pretty_printed_with_trailing_newline() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("claude_desktop_config.json");
    config::save(&config::apply(json!({}), &entry()), &path).unwrap();

    let text = fs::read_to_string(&path).unwrap();
    assert!(text.ends_with('\n'));
    assert!(text.contains("  \"mcpServers\""));
}

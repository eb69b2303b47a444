//! CLI command handlers for install, uninstall, and status.

use std::path::PathBuf;

use crate::auth::{DeviceAuthClient, FlowEvent};
use crate::config;
use crate::config::ServerEntry;
use crate::error::Result;

use super::{ConfigArgs, InstallArgs};

/// Handle `plantos-setup install` (and the bare invocation).
///
/// Runs the device flow to a terminal outcome, then merges the credential
/// into the Claude Desktop config. Ctrl-C aborts the poll loop immediately
/// and writes nothing.
pub async fn handle_install(args: InstallArgs) -> Result<()> {
    let client = DeviceAuthClient::new();

    println!("Requesting authorization code...");
    let credential = tokio::select! {
        result = client.authorize(display_progress) => result?,
        _ = tokio::signal::ctrl_c() => {
            eprintln!("\nInterrupted — nothing was written.");
            std::process::exit(130);
        }
    };
    println!("\n✓ Authorization successful!");

    let path = config_path(args.config)?;
    let doc = config::load(&path)?;
    let entry = ServerEntry::with_command(args.command, args.args, &credential, client.base_url());
    let doc = config::apply(doc, &entry);
    config::save(&doc, &path)?;

    println!("✓ Wrote {}", path.display());
    println!("Restart Claude Desktop to pick up the Plantos MCP server.");
    Ok(())
}

fn display_progress(event: FlowEvent<'_>) {
    match event {
        FlowEvent::CodeIssued(code) => {
            println!("Authorization code: {}", code.code);
            println!("Opening browser to: {}", code.verification_url);
            if webbrowser::open(&code.verification_url).is_err() {
                println!("Could not open a browser — please visit the URL above manually.");
            }
            println!(
                "\nWaiting for authorization (code expires in {} minutes)...",
                code.expires_in / 60
            );
            println!("Please complete the authorization in your browser.");
        }
        FlowEvent::StillWaiting { elapsed } => {
            println!("Still waiting ({}s elapsed)...", elapsed.as_secs());
        }
    }
}

/// Handle `plantos-setup uninstall`.
pub fn handle_uninstall(args: ConfigArgs) -> Result<()> {
    let path = config_path(args.config)?;
    if !path.exists() {
        println!("No config file at {} — nothing to remove.", path.display());
        return Ok(());
    }
    let doc = config::load(&path)?;
    let doc = config::remove(doc);
    config::save(&doc, &path)?;
    println!("✓ Removed the Plantos entry from {}", path.display());
    Ok(())
}

/// Handle `plantos-setup status`.
pub fn handle_status(args: ConfigArgs) -> Result<()> {
    let path = config_path(args.config)?;
    let doc = config::load(&path)?;
    if config::is_configured(&doc) {
        println!("✓ Plantos is configured in {}", path.display());
    } else {
        println!(
            "Plantos is not configured in {} — run `plantos-setup` to set it up.",
            path.display()
        );
    }
    Ok(())
}

fn config_path(override_path: Option<PathBuf>) -> Result<PathBuf> {
    match override_path {
        Some(path) => Ok(path),
        None => config::claude_config_path(),
    }
}

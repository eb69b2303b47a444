//! plantos-setup — authorize a machine with Plantos and wire the MCP server
//! into Claude Desktop.
//!
//! Two pieces, consumed in order: [`auth::DeviceAuthClient`] drives the
//! OAuth device authorization flow against the Plantos API and returns a
//! [`auth::Credential`]; [`config`] merges that credential into Claude
//! Desktop's `claude_desktop_config.json` without disturbing anything else
//! in the file.
//!
//! # Quick Start
//!
//! ```no_run
//! use plantos_setup::auth::{DeviceAuthClient, FlowEvent};
//! use plantos_setup::config::{self, ServerEntry};
//!
//! # async fn example() -> plantos_setup::error::Result<()> {
//! let client = DeviceAuthClient::new();
//! let credential = client
//!     .authorize(|event| {
//!         if let FlowEvent::CodeIssued(code) = event {
//!             println!("Visit {} and enter {}", code.verification_url, code.code);
//!         }
//!     })
//!     .await?;
//!
//! let path = config::claude_config_path()?;
//! let doc = config::load(&path)?;
//! let entry = ServerEntry::new(&credential, client.base_url());
//! config::save(&config::apply(doc, &entry), &path)?;
//! # Ok(())
//! # }
//! ```

pub mod auth;
pub mod cli;
pub mod config;
pub mod error;

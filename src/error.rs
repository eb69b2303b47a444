//! Error types for the Plantos setup flow.

use std::path::PathBuf;

use thiserror::Error;

/// Convenience alias used across the crate.
pub type Result<T> = std::result::Result<T, SetupError>;

/// Normalized errors for the authorization flow and config merge.
///
/// Every variant carries text a user can act on; the binary prints the
/// Display form and exits non-zero.
#[derive(Debug, Error)]
pub enum SetupError {
    /// The authorization endpoint could not be reached at all.
    #[error("Network error: {0} — check your connection and try again")]
    Network(String),

    /// The endpoint answered, but the response was unusable.
    #[error("Unexpected response from Plantos: {0} — try again in a moment")]
    Protocol(String),

    /// The server declared the device code dead before the user approved it.
    #[error("The authorization code expired — run `plantos-setup` again to request a new one")]
    AuthorizationExpired,

    /// The client-side attempt budget ran out with no terminal answer.
    #[error("Timed out waiting for authorization — run `plantos-setup` again and approve the code in your browser")]
    AuthorizationTimedOut,

    /// An existing config file could not be read.
    #[error("Could not read config file {}: {source}", path.display())]
    ConfigRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// An existing config file is not valid JSON. Never repaired or
    /// overwritten; surfacing this protects the user's own configuration.
    #[error("Config file {} is not valid JSON ({source}) — fix or move it, then run again", path.display())]
    ConfigParse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// Writing the merged config back failed.
    #[error("Could not write config file {}: {source}", path.display())]
    ConfigWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// No home/config directory could be resolved for this platform.
    #[error("Could not locate the configuration directory for this platform: {0}")]
    NoConfigDir(String),
}

impl From<reqwest::Error> for SetupError {
    fn from(error: reqwest::Error) -> Self {
        if error.is_connect() || error.is_timeout() {
            Self::Network(error.to_string())
        } else {
            Self::Protocol(error.to_string())
        }
    }
}

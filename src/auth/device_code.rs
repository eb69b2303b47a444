use std::time::Duration;

use chrono::{DateTime, Utc};

/// A device code issued by the Plantos API for one authorization attempt.
///
/// Discarded once polling reaches a terminal outcome; nothing about it is
/// persisted locally.
#[derive(Debug, Clone)]
pub struct DeviceCode {
    /// User-displayable code, unique per request.
    pub code: String,
    /// Absolute URL the user visits to approve the code.
    pub verification_url: String,
    /// Server-declared TTL in seconds, as received on the wire.
    pub expires_in: u64,
    /// Deadline computed at issuance from `expires_in`.
    pub expires_at: DateTime<Utc>,
}

/// Outcome of a single poll attempt.
///
/// `Authorized` and `Expired` are terminal; `Pending` continues the loop.
/// Transport failures and malformed responses are absorbed into `Pending`
/// so a single bad poll never aborts the flow.
#[derive(Debug, Clone)]
pub enum PollOutcome {
    Pending,
    Authorized(Credential),
    Expired,
}

/// The API key issued after a successful authorization.
///
/// Owned by the caller once returned; the auth client neither logs nor
/// stores it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credential {
    pub api_key: String,
}

/// Progress events emitted while [`authorize`] runs.
///
/// The client never prints; the caller decides how to present these
/// (display the code, open a browser, show elapsed time).
///
/// [`authorize`]: crate::auth::DeviceAuthClient::authorize
#[derive(Debug)]
pub enum FlowEvent<'a> {
    /// A code was issued; show it and point the user at the URL.
    CodeIssued(&'a DeviceCode),
    /// Still polling; emitted at a coarse cadence for user feedback only.
    StillWaiting { elapsed: Duration },
}

use std::time::Duration;

use chrono::Utc;
use serde::Deserialize;
use tracing::debug;

use super::device_code::{Credential, DeviceCode, FlowEvent, PollOutcome};
use crate::error::{Result, SetupError};

/// Production API endpoint.
pub const DEFAULT_BASE_URL: &str = "https://api.plantos.co";
/// Environment variable that overrides the API endpoint.
pub const BASE_URL_ENV: &str = "PLANTOS_API_URL";

/// Per-request timeout, separate from the overall polling budget. A hung
/// connection surfaces as a failed attempt instead of eating the whole
/// five-minute allowance.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);
const POLL_INTERVAL: Duration = Duration::from_secs(5);
const MAX_POLL_ATTEMPTS: u32 = 60;
/// Emit a `StillWaiting` event every Nth pending attempt (~30s apart).
const PROGRESS_EVERY: u32 = 6;

/// Client for the Plantos device authorization flow.
///
/// Drives `request-code` / `check-code` against the API and owns the polling
/// state machine. It performs no output of its own; progress is surfaced
/// through [`FlowEvent`] callbacks and the credential is returned to the
/// caller, never stored.
///
/// # Example
/// ```no_run
/// use plantos_setup::auth::{DeviceAuthClient, FlowEvent};
///
/// # async fn example() -> plantos_setup::error::Result<()> {
/// let client = DeviceAuthClient::new();
/// let credential = client
///     .authorize(|event| {
///         if let FlowEvent::CodeIssued(code) = event {
///             println!("Visit {} and enter {}", code.verification_url, code.code);
///         }
///     })
///     .await?;
/// # Ok(())
/// # }
/// ```
pub struct DeviceAuthClient {
    client: reqwest::Client,
    base_url: String,
    request_timeout: Duration,
    poll_interval: Duration,
    max_poll_attempts: u32,
}

impl Default for DeviceAuthClient {
    fn default() -> Self {
        Self::new()
    }
}

impl DeviceAuthClient {
    /// Create a client against the production endpoint, honoring the
    /// `PLANTOS_API_URL` override.
    pub fn new() -> Self {
        let base_url = std::env::var(BASE_URL_ENV)
            .ok()
            .filter(|v| !v.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
        Self {
            client: reqwest::Client::new(),
            base_url: normalize_base_url(&base_url),
            request_timeout: REQUEST_TIMEOUT,
            poll_interval: POLL_INTERVAL,
            max_poll_attempts: MAX_POLL_ATTEMPTS,
        }
    }

    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = normalize_base_url(&url.into());
        self
    }

    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    pub fn with_max_attempts(mut self, attempts: u32) -> Self {
        self.max_poll_attempts = attempts;
        self
    }

    /// Endpoint this client talks to, after any env override.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Request a fresh device code from the API.
    ///
    /// Fails with [`SetupError::Network`] when the endpoint is unreachable
    /// and [`SetupError::Protocol`] when the response is malformed or
    /// missing required fields. Both are fatal; there is nothing to poll.
    pub async fn request_code(&self) -> Result<DeviceCode> {
        let url = format!("{}/api/v1/mcp/request-code", self.base_url);
        let resp = self
            .client
            .post(&url)
            .timeout(self.request_timeout)
            .send()
            .await?;
        if !resp.status().is_success() {
            return Err(SetupError::Protocol(format!(
                "request-code returned status {}",
                resp.status()
            )));
        }
        let payload: RequestCodeResponse = resp
            .json()
            .await
            .map_err(|e| SetupError::Protocol(format!("request-code body unreadable: {e}")))?;

        let code = payload
            .code
            .filter(|c| !c.is_empty())
            .ok_or_else(|| SetupError::Protocol("request-code response missing `code`".into()))?;
        let verification_url = payload.verification_url.filter(|u| !u.is_empty()).ok_or_else(|| {
            SetupError::Protocol("request-code response missing `verification_url`".into())
        })?;

        let expires_at = Utc::now() + chrono::Duration::seconds(payload.expires_in as i64);
        Ok(DeviceCode {
            code,
            verification_url,
            expires_in: payload.expires_in,
            expires_at,
        })
    }

    /// Check the authorization status of a code once.
    ///
    /// Infallible by design: transport errors, non-2xx statuses, and
    /// malformed bodies all map to [`PollOutcome::Pending`] so a single bad
    /// attempt never aborts the loop. An `"authorized"` status only counts
    /// when it carries a non-empty `api_key`.
    pub async fn poll(&self, session: &DeviceCode) -> PollOutcome {
        let url = format!("{}/api/v1/mcp/check-code", self.base_url);
        let resp = match self
            .client
            .get(&url)
            .query(&[("code", session.code.as_str())])
            .timeout(self.request_timeout)
            .send()
            .await
        {
            Ok(resp) => resp,
            Err(e) => {
                debug!(error = %e, "check-code request failed, will retry");
                return PollOutcome::Pending;
            }
        };
        if !resp.status().is_success() {
            debug!(status = %resp.status(), "check-code returned non-success, will retry");
            return PollOutcome::Pending;
        }
        let payload: CheckCodeResponse = match resp.json().await {
            Ok(payload) => payload,
            Err(e) => {
                debug!(error = %e, "check-code body unreadable, will retry");
                return PollOutcome::Pending;
            }
        };
        match payload.status.as_deref() {
            Some("authorized") => match payload.api_key.filter(|k| !k.is_empty()) {
                Some(api_key) => PollOutcome::Authorized(Credential { api_key }),
                None => {
                    debug!("authorized status without api_key, treating as pending");
                    PollOutcome::Pending
                }
            },
            Some("expired") => PollOutcome::Expired,
            _ => PollOutcome::Pending,
        }
    }

    /// Run the full flow: request a code, surface it, poll to a terminal
    /// outcome.
    ///
    /// Polls at a fixed interval with a hard attempt cap (~5 minutes) on top
    /// of the server-declared TTL; whichever bound fires first decides the
    /// outcome. A server-declared expiry wins over the local cap and
    /// surfaces as [`SetupError::AuthorizationExpired`]; an exhausted cap
    /// surfaces as [`SetupError::AuthorizationTimedOut`].
    pub async fn authorize(&self, mut on_event: impl FnMut(FlowEvent<'_>)) -> Result<Credential> {
        let session = self.request_code().await?;
        on_event(FlowEvent::CodeIssued(&session));

        for attempt in 1..=self.max_poll_attempts {
            match self.poll(&session).await {
                PollOutcome::Authorized(credential) => return Ok(credential),
                PollOutcome::Expired => return Err(SetupError::AuthorizationExpired),
                PollOutcome::Pending => {}
            }
            // Server-declared TTL elapsed locally; the server owns expiry.
            if Utc::now() >= session.expires_at {
                return Err(SetupError::AuthorizationExpired);
            }
            // No delay (or progress report) after the final attempt.
            if attempt < self.max_poll_attempts {
                if attempt % PROGRESS_EVERY == 0 {
                    on_event(FlowEvent::StillWaiting {
                        elapsed: self.poll_interval * attempt,
                    });
                }
                tokio::time::sleep(self.poll_interval).await;
            }
        }
        Err(SetupError::AuthorizationTimedOut)
    }
}

fn normalize_base_url(url: &str) -> String {
    url.trim().trim_end_matches('/').to_string()
}

#[derive(Debug, Deserialize)]
struct RequestCodeResponse {
    code: Option<String>,
    verification_url: Option<String>,
    #[serde(default = "default_expires_in")]
    expires_in: u64,
}

/// TTL the API has always used; applied when the field is omitted.
fn default_expires_in() -> u64 {
    300
}

#[derive(Debug, Deserialize)]
struct CheckCodeResponse {
    status: Option<String>,
    api_key: Option<String>,
}

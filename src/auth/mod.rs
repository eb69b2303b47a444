//! Device authorization flow against the Plantos API.

pub mod client;
pub mod device_code;

pub use client::{DeviceAuthClient, BASE_URL_ENV, DEFAULT_BASE_URL};
pub use device_code::{Credential, DeviceCode, FlowEvent, PollOutcome};

//! Per-connection credentials.
//!
//! Every open builds a fresh [`SignedCredentials`] snapshot: the device ID,
//! the session token and a signature over `"<deviceId>|<unixMillis>"`. The
//! signature itself is computed by the [`CredentialProvider`]; this crate only
//! decides what gets signed and where the result goes.

use std::fmt;
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use ndc_transport::ConnectRequest;

use crate::config::ClientConfig;

/// Device ID header.
pub const DEVICE_ID_HEADER: &str = "NDCDEVICEID";
/// Session token header.
pub const SESSION_HEADER: &str = "NDCAUTH";
/// Signature header.
pub const SIGNATURE_HEADER: &str = "NDC-MSG-SIG";

/// Source of the identity used to open connections.
pub trait CredentialProvider: Send + Sync {
    /// Returns the device identifier.
    fn device_id(&self) -> String;

    /// Returns the current session token.
    fn session_token(&self) -> String;

    /// Signs `data`. An empty signature omits the signature header.
    fn sign(&self, data: &str) -> String;
}

/// A signing function.
pub type Signer = Arc<dyn Fn(&str) -> String + Send + Sync>;

/// Fixed device ID and session token with an optional signer.
#[derive(Clone)]
pub struct StaticCredentials {
    device_id: String,
    session_token: String,
    signer: Option<Signer>,
}

impl StaticCredentials {
    pub fn new(device_id: impl Into<String>, session_token: impl Into<String>) -> Self {
        Self {
            device_id: device_id.into(),
            session_token: session_token.into(),
            signer: None,
        }
    }

    /// Sets the function used to sign the `signbody`.
    pub fn with_signer<F>(mut self, signer: F) -> Self
    where
        F: Fn(&str) -> String + Send + Sync + 'static,
    {
        self.signer = Some(Arc::new(signer));
        self
    }
}

impl fmt::Debug for StaticCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StaticCredentials")
            .field("device_id", &self.device_id)
            .field("session_token", &"<redacted>")
            .field("signer", &self.signer.is_some())
            .finish()
    }
}

impl CredentialProvider for StaticCredentials {
    fn device_id(&self) -> String {
        self.device_id.clone()
    }

    fn session_token(&self) -> String {
        self.session_token.clone()
    }

    fn sign(&self, data: &str) -> String {
        self.signer
            .as_ref()
            .map(|signer| signer(data))
            .unwrap_or_default()
    }
}

/// Credentials for one connection attempt.
#[derive(Clone, PartialEq, Eq)]
pub struct SignedCredentials {
    pub device_id: String,
    pub session_token: String,
    /// `"<deviceId>|<unixMillis>"`.
    pub signbody: String,
    pub signature: String,
}

impl SignedCredentials {
    /// Builds credentials signed at `timestamp_millis`.
    pub fn generate(provider: &dyn CredentialProvider, timestamp_millis: u64) -> Self {
        let device_id = provider.device_id();
        let signbody = format!("{device_id}|{timestamp_millis}");
        let signature = provider.sign(&signbody);
        Self {
            device_id,
            session_token: provider.session_token(),
            signbody,
            signature,
        }
    }

    /// Builds credentials signed now.
    pub fn now(provider: &dyn CredentialProvider) -> Self {
        Self::generate(provider, unix_millis())
    }

    /// Returns the socket URL carrying the encoded `signbody`.
    pub fn url(&self, base: &str) -> String {
        format!(
            "{}/?signbody={}",
            base.trim_end_matches('/'),
            self.signbody.replace('|', "%7C")
        )
    }

    /// Builds the connect request for this attempt.
    pub fn connect_request(&self, config: &ClientConfig) -> ConnectRequest {
        let mut request = ConnectRequest::new(self.url(&config.url))
            .with_header(DEVICE_ID_HEADER, &self.device_id)
            .with_header(SESSION_HEADER, &self.session_token);
        if !self.signature.is_empty() {
            request = request.with_header(SIGNATURE_HEADER, &self.signature);
        }
        if let Some(interval) = config.ping_interval() {
            request = request.with_ping_interval(interval);
        }
        request
    }
}

impl fmt::Debug for SignedCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SignedCredentials")
            .field("device_id", &self.device_id)
            .field("signbody", &self.signbody)
            .finish_non_exhaustive()
    }
}

fn unix_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or_default()
}

//! ACME DNS-01 challenge request types
//!
//! A [`ChallengeRequest`] is the immutable input of one reconcile call. The
//! wire shape follows the host's JSON encoding (camelCase, `resolvedFQDN`).

use serde::{Deserialize, Serialize};
use std::fmt;

/// Record type used for every DNS-01 challenge
pub const TXT: &str = "TXT";

/// Lifecycle phase requested by the host
///
/// Unknown values are kept verbatim so the engine can reject them with an
/// "unsupported action" error instead of failing at decode time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ChallengeAction {
    /// Establish the proof record
    Present,
    /// Remove the proof record after validation
    CleanUp,
    /// Anything else the host sent
    Other(String),
}

impl From<String> for ChallengeAction {
    fn from(value: String) -> Self {
        match value.as_str() {
            "Present" => ChallengeAction::Present,
            "CleanUp" => ChallengeAction::CleanUp,
            _ => ChallengeAction::Other(value),
        }
    }
}

impl From<ChallengeAction> for String {
    fn from(action: ChallengeAction) -> Self {
        action.to_string()
    }
}

impl fmt::Display for ChallengeAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChallengeAction::Present => write!(f, "Present"),
            ChallengeAction::CleanUp => write!(f, "CleanUp"),
            ChallengeAction::Other(other) => write!(f, "{}", other),
        }
    }
}

/// A challenge request as handed over by the host framework
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChallengeRequest {
    /// Host-assigned request identifier
    #[serde(default)]
    pub uid: String,

    /// Requested lifecycle phase
    pub action: ChallengeAction,

    /// Challenge type, always `dns-01` for this solver
    #[serde(rename = "type", default)]
    pub challenge_type: String,

    /// Name being validated (e.g. `example.com` or `*.example.com`)
    #[serde(default)]
    pub dns_name: String,

    /// Desired TXT record value
    pub key: String,

    /// Namespace the secret reference is resolved in
    #[serde(default)]
    pub resource_namespace: String,

    /// Fully-qualified record name, e.g. `_acme-challenge.example.com.`
    #[serde(rename = "resolvedFQDN")]
    pub resolved_fqdn: String,

    /// Authoritative zone, e.g. `example.com.`
    pub resolved_zone: String,

    /// Whether ambient credentials may be used
    #[serde(default)]
    pub allow_ambient_credentials: bool,

    /// Opaque solver configuration
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub config: Option<serde_json::Value>,
}

impl ChallengeRequest {
    /// Record name relative to the zone (the "RR")
    pub fn relative_name(&self) -> &str {
        relative_name(&self.resolved_fqdn, &self.resolved_zone)
    }

    /// Zone name without the trailing root dot
    pub fn domain(&self) -> &str {
        un_fqdn(&self.resolved_zone)
    }
}

/// Strip `"." + zone` from the end of `fqdn`
///
/// Returns `fqdn` unchanged when it does not end with the zone suffix.
pub fn relative_name<'a>(fqdn: &'a str, zone: &str) -> &'a str {
    fqdn.strip_suffix(zone)
        .and_then(|rest| rest.strip_suffix('.'))
        .unwrap_or(fqdn)
}

/// Remove a single trailing root-zone dot
pub fn un_fqdn(name: &str) -> &str {
    name.strip_suffix('.').unwrap_or(name)
}

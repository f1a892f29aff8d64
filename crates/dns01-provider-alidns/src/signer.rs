//! ACS3-HMAC-SHA256 request signing
//!
//! Alibaba Cloud RPC requests carry their parameters in the query string and
//! are authenticated by an `Authorization` header computed over a canonical
//! form of the request:
//!
//! ```text
//! CanonicalRequest = Method \n "/" \n CanonicalQuery \n CanonicalHeaders \n SignedHeaders \n hex(sha256(body))
//! StringToSign     = "ACS3-HMAC-SHA256" \n hex(sha256(CanonicalRequest))
//! Signature        = hex(hmac_sha256(AccessKeySecret, StringToSign))
//! ```

use dns01_core::{Credentials, Error, Result};
use hmac::{Hmac, Mac};
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;

/// Signature algorithm name
pub const ALGORITHM: &str = "ACS3-HMAC-SHA256";

type HmacSha256 = Hmac<Sha256>;

/// Inputs of one RPC call
#[derive(Debug, Clone)]
pub struct RpcRequest<'a> {
    /// HTTP method
    pub method: &'a str,
    /// `Host` header value (host with optional port)
    pub host: &'a str,
    /// API action, e.g. `DescribeDomainRecords`
    pub action: &'a str,
    /// API version, e.g. `2015-01-09`
    pub version: &'a str,
    /// Query parameters
    pub params: &'a BTreeMap<String, String>,
    /// UTC timestamp, `%Y-%m-%dT%H:%M:%SZ`
    pub date: &'a str,
    /// Unique per-request nonce
    pub nonce: &'a str,
}

/// A request ready to send
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedRequest {
    /// Encoded query string, without the leading `?`
    pub query: String,
    /// Headers to send, including `Authorization`
    pub headers: Vec<(String, String)>,
}

/// Percent-encode per RFC 3986, leaving only unreserved characters as-is
pub fn percent_encode(value: &str) -> String {
    urlencoding::encode(value).into_owned()
}

/// Encode and sort `params` into the canonical query string
pub fn canonical_query(params: &BTreeMap<String, String>) -> String {
    let mut pairs: Vec<(String, String)> = params
        .iter()
        .map(|(k, v)| (percent_encode(k), percent_encode(v)))
        .collect();
    pairs.sort();

    pairs
        .iter()
        .map(|(k, v)| format!("{}={}", k, v))
        .collect::<Vec<_>>()
        .join("&")
}

fn sha256_hex(data: &[u8]) -> String {
    hex::encode(Sha256::digest(data))
}

/// Sign `request` with `credentials`; the request body is always empty
pub fn sign(request: &RpcRequest<'_>, credentials: &Credentials) -> Result<SignedRequest> {
    let query = canonical_query(request.params);
    let payload_hash = sha256_hex(b"");

    // BTreeMap keeps the lowercase header names sorted
    let mut headers = BTreeMap::new();
    headers.insert("host", request.host.trim().to_string());
    headers.insert("x-acs-action", request.action.trim().to_string());
    headers.insert("x-acs-content-sha256", payload_hash.clone());
    headers.insert("x-acs-date", request.date.trim().to_string());
    headers.insert("x-acs-signature-nonce", request.nonce.trim().to_string());
    headers.insert("x-acs-version", request.version.trim().to_string());

    let canonical_headers: String = headers
        .iter()
        .map(|(name, value)| format!("{}:{}\n", name, value))
        .collect();
    let signed_headers = headers.keys().copied().collect::<Vec<_>>().join(";");

    let canonical_request = format!(
        "{}\n/\n{}\n{}\n{}\n{}",
        request.method, query, canonical_headers, signed_headers, payload_hash
    );
    let string_to_sign = format!(
        "{}\n{}",
        ALGORITHM,
        sha256_hex(canonical_request.as_bytes())
    );

    let mut mac = HmacSha256::new_from_slice(credentials.access_key_secret.as_bytes())
        .map_err(|e| Error::config(format!("HMAC error: {}", e)))?;
    mac.update(string_to_sign.as_bytes());
    let signature = hex::encode(mac.finalize().into_bytes());

    let authorization = format!(
        "{} Credential={},SignedHeaders={},Signature={}",
        ALGORITHM, credentials.access_key_id, signed_headers, signature
    );

    let mut out: Vec<(String, String)> = headers
        .into_iter()
        .map(|(name, value)| (name.to_string(), value))
        .collect();
    out.push(("authorization".to_string(), authorization));

    Ok(SignedRequest { query, headers: out })
}

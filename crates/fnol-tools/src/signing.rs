//! Request signing for the customer and claims APIs.
//!
//! Both collaborators sit behind IAM-protected API gateways, so every call
//! carries AWS Signature Version 4 headers derived from ambient credentials.
//! [`UnsignedSigner`] exists for local stacks that do no authentication.

use std::env;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use hmac::{Hmac, Mac};
use sha2::{Digest, Sha256};
use thiserror::Error;
use tracing::debug;
use url::Url;

type HmacSha256 = Hmac<Sha256>;

const ALGORITHM: &str = "AWS4-HMAC-SHA256";

/// Service name API Gateway expects in the credential scope.
pub const EXECUTE_API_SERVICE: &str = "execute-api";

/// Errors produced while building authentication headers.
#[derive(Debug, Error)]
pub enum SigningError {
    #[error("Unable to get AWS credentials for SigV4 signing")]
    MissingCredentials,

    #[error("Invalid request URL '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("Invalid signing key: {0}")]
    InvalidKey(String),
}

/// What gets signed: method, URL, body and content type.
#[derive(Debug, Clone)]
pub struct SigningRequest {
    pub method: String,
    pub url: String,
    pub body: String,
    pub content_type: String,
}

impl SigningRequest {
    /// A JSON request.
    pub fn json(method: &str, url: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            method: method.to_string(),
            url: url.into(),
            body: body.into(),
            content_type: "application/json".to_string(),
        }
    }
}

/// Produces transport-level authentication headers for an outbound request.
#[async_trait]
pub trait RequestSigner: Send + Sync {
    /// Headers to attach to the request. `Host` is left to the HTTP client.
    async fn sign(&self, request: &SigningRequest) -> Result<Vec<(String, String)>, SigningError>;
}

/// Long-lived or session credentials.
#[derive(Clone)]
pub struct AwsCredentials {
    pub access_key_id: String,
    pub secret_access_key: String,
    pub session_token: Option<String>,
}

impl std::fmt::Debug for AwsCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AwsCredentials")
            .field("access_key_id", &self.access_key_id)
            .field("secret_access_key", &"<redacted>")
            .field("session_token", &self.session_token.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

impl AwsCredentials {
    /// Read `AWS_ACCESS_KEY_ID`, `AWS_SECRET_ACCESS_KEY` and the optional
    /// `AWS_SESSION_TOKEN`.
    pub fn from_env() -> Option<Self> {
        let access_key_id = env::var("AWS_ACCESS_KEY_ID").ok().filter(|v| !v.is_empty())?;
        let secret_access_key = env::var("AWS_SECRET_ACCESS_KEY")
            .ok()
            .filter(|v| !v.is_empty())?;
        let session_token = env::var("AWS_SESSION_TOKEN").ok().filter(|v| !v.is_empty());
        Some(Self {
            access_key_id,
            secret_access_key,
            session_token,
        })
    }
}

/// AWS Signature Version 4 signer.
///
/// Signs `content-type`, `host`, `x-amz-date` and, for session credentials,
/// `x-amz-security-token`. Without credentials every `sign` call fails with
/// [`SigningError::MissingCredentials`].
#[derive(Debug, Clone)]
pub struct SigV4Signer {
    credentials: Option<AwsCredentials>,
    region: String,
    service: String,
}

impl SigV4Signer {
    pub fn new(credentials: Option<AwsCredentials>, region: impl Into<String>) -> Self {
        Self {
            credentials,
            region: region.into(),
            service: EXECUTE_API_SERVICE.to_string(),
        }
    }

    /// Signer using credentials from the environment.
    pub fn from_env(region: impl Into<String>) -> Self {
        Self::new(AwsCredentials::from_env(), region)
    }

    pub fn with_service(mut self, service: impl Into<String>) -> Self {
        self.service = service.into();
        self
    }

    /// Sign `request` as of `now`.
    pub fn sign_at(
        &self,
        request: &SigningRequest,
        now: DateTime<Utc>,
    ) -> Result<Vec<(String, String)>, SigningError> {
        let credentials = self
            .credentials
            .as_ref()
            .ok_or(SigningError::MissingCredentials)?;

        let url = Url::parse(&request.url).map_err(|e| SigningError::InvalidUrl {
            url: request.url.clone(),
            reason: e.to_string(),
        })?;
        let host = canonical_host(&url).ok_or_else(|| SigningError::InvalidUrl {
            url: request.url.clone(),
            reason: "missing host".to_string(),
        })?;

        let amz_date = now.format("%Y%m%dT%H%M%SZ").to_string();
        let date = now.format("%Y%m%d").to_string();

        let mut headers = vec![
            ("content-type", request.content_type.trim().to_string()),
            ("host", host),
            ("x-amz-date", amz_date.clone()),
        ];
        if let Some(token) = credentials.session_token.as_ref() {
            headers.push(("x-amz-security-token", token.clone()));
        }
        headers.sort_by_key(|(name, _)| *name);

        let canonical_headers: String = headers
            .iter()
            .map(|(name, value)| format!("{}:{}\n", name, value))
            .collect();
        let signed_headers = headers
            .iter()
            .map(|(name, _)| *name)
            .collect::<Vec<_>>()
            .join(";");

        let canonical_request = format!(
            "{}\n{}\n{}\n{}\n{}\n{}",
            request.method.to_uppercase(),
            canonical_uri(&url),
            canonical_query(&url),
            canonical_headers,
            signed_headers,
            hex::encode(Sha256::digest(request.body.as_bytes()))
        );

        let scope = format!("{}/{}/{}/aws4_request", date, self.region, self.service);
        let string_to_sign = format!(
            "{}\n{}\n{}\n{}",
            ALGORITHM,
            amz_date,
            scope,
            hex::encode(Sha256::digest(canonical_request.as_bytes()))
        );

        let key = signing_key(
            &credentials.secret_access_key,
            &date,
            &self.region,
            &self.service,
        )?;
        let signature = hex::encode(hmac(&key, string_to_sign.as_bytes())?);

        debug!(
            "Signed {} {} for {}/{}",
            request.method, url, self.region, self.service
        );

        let mut out = vec![
            (
                "Authorization".to_string(),
                format!(
                    "{} Credential={}/{}, SignedHeaders={}, Signature={}",
                    ALGORITHM, credentials.access_key_id, scope, signed_headers, signature
                ),
            ),
            ("X-Amz-Date".to_string(), amz_date),
            ("Content-Type".to_string(), request.content_type.clone()),
        ];
        if let Some(token) = credentials.session_token.as_ref() {
            out.push(("X-Amz-Security-Token".to_string(), token.clone()));
        }
        Ok(out)
    }
}

#[async_trait]
impl RequestSigner for SigV4Signer {
    async fn sign(&self, request: &SigningRequest) -> Result<Vec<(String, String)>, SigningError> {
        self.sign_at(request, Utc::now())
    }
}

/// Signer that adds nothing but the content type.
#[derive(Debug, Clone, Copy, Default)]
pub struct UnsignedSigner;

#[async_trait]
impl RequestSigner for UnsignedSigner {
    async fn sign(&self, request: &SigningRequest) -> Result<Vec<(String, String)>, SigningError> {
        Ok(vec![("Content-Type".to_string(), request.content_type.clone())])
    }
}

/// Derive the per-day signing key.
pub fn signing_key(
    secret: &str,
    date: &str,
    region: &str,
    service: &str,
) -> Result<Vec<u8>, SigningError> {
    let k_date = hmac(format!("AWS4{}", secret).as_bytes(), date.as_bytes())?;
    let k_region = hmac(&k_date, region.as_bytes())?;
    let k_service = hmac(&k_region, service.as_bytes())?;
    hmac(&k_service, b"aws4_request")
}

fn hmac(key: &[u8], data: &[u8]) -> Result<Vec<u8>, SigningError> {
    let mut mac =
        HmacSha256::new_from_slice(key).map_err(|e| SigningError::InvalidKey(e.to_string()))?;
    mac.update(data);
    Ok(mac.finalize().into_bytes().to_vec())
}

fn canonical_host(url: &Url) -> Option<String> {
    let host = url.host_str()?;
    Some(match url.port() {
        Some(port) => format!("{}:{}", host, port),
        None => host.to_string(),
    })
}

fn canonical_uri(url: &Url) -> String {
    let path = url.path();
    if path.is_empty() {
        "/".to_string()
    } else {
        path.to_string()
    }
}

fn canonical_query(url: &Url) -> String {
    let mut pairs: Vec<(String, String)> = url
        .query_pairs()
        .map(|(k, v)| (uri_encode(&k), uri_encode(&v)))
        .collect();
    pairs.sort();
    pairs
        .into_iter()
        .map(|(k, v)| format!("{}={}", k, v))
        .collect::<Vec<_>>()
        .join("&")
}

/// Percent-encode everything outside the RFC 3986 unreserved set.
fn uri_encode(value: &str) -> String {
    let mut encoded = String::with_capacity(value.len());
    for byte in value.bytes() {
        match byte {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' => {
                encoded.push(byte as char)
            }
            _ => encoded.push_str(&format!("%{:02X}", byte)),
        }
    }
    encoded
}

use std::fmt;

use base64::{Engine as _, engine::general_purpose};
use serde::Deserialize;

use crate::presentation::config::CloudSpeechSettings;

/// Credential for the cloud speech API, resolved once at startup.
#[derive(Clone, PartialEq, Eq)]
pub enum CloudCredential {
    ApiKey(String),
    AccessToken(String),
}

impl fmt::Debug for CloudCredential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CloudCredential::ApiKey(_) => f.write_str("ApiKey([REDACTED])"),
            CloudCredential::AccessToken(_) => f.write_str("AccessToken([REDACTED])"),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum CredentialError {
    #[error("no cloud speech credential configured (access_token, api_key or encoded_key)")]
    Missing,
    #[error("encoded key is not valid base64: {0}")]
    InvalidEncoding(String),
    #[error("encoded key is not valid utf-8")]
    NotUtf8,
    #[error("decoded key is empty")]
    Empty,
    #[error(
        "encoded key is a service-account file for {client_email}; \
         set access_token to an OAuth token minted from it, or set api_key"
    )]
    ServiceAccountKey { client_email: String },
    #[error("encoded key is a JSON document, not an API key: {0}")]
    UnsupportedKeyFile(String),
}

/// The fields that identify a JSON credential file. Secrets are never read.
#[derive(Deserialize)]
struct KeyFileHeader {
    #[serde(rename = "type")]
    kind: Option<String>,
    client_email: Option<String>,
}

/// Picks the first configured credential: access token, plain API key, then
/// the base64-encoded key. The encoded key must hold an API key; a JSON
/// service-account file is refused.
pub fn bootstrap_cloud_credential(
    settings: &CloudSpeechSettings,
) -> Result<CloudCredential, CredentialError> {
    if let Some(token) = non_blank(settings.access_token.as_deref()) {
        tracing::info!("Using cloud speech access token");
        return Ok(CloudCredential::AccessToken(token.to_string()));
    }

    if let Some(key) = non_blank(settings.api_key.as_deref()) {
        tracing::info!("Using cloud speech API key");
        return Ok(CloudCredential::ApiKey(key.to_string()));
    }

    let encoded = non_blank(settings.encoded_key.as_deref()).ok_or(CredentialError::Missing)?;
    let key = decode_key(encoded)?;
    tracing::info!("Using cloud speech API key decoded from encoded_key");
    Ok(CloudCredential::ApiKey(key))
}

fn decode_key(encoded: &str) -> Result<String, CredentialError> {
    let bytes = general_purpose::STANDARD
        .decode(encoded)
        .map_err(|e| CredentialError::InvalidEncoding(e.to_string()))?;
    let key = String::from_utf8(bytes).map_err(|_| CredentialError::NotUtf8)?;
    let key = key.trim();
    if key.is_empty() {
        return Err(CredentialError::Empty);
    }
    if key.starts_with('{') {
        return Err(reject_key_file(key));
    }
    Ok(key.to_string())
}

fn reject_key_file(json: &str) -> CredentialError {
    match serde_json::from_str::<KeyFileHeader>(json) {
        Ok(KeyFileHeader {
            kind: Some(kind),
            client_email,
        }) if kind == "service_account" => CredentialError::ServiceAccountKey {
            client_email: client_email.unwrap_or_else(|| "unknown account".to_string()),
        },
        Ok(KeyFileHeader { kind, .. }) => CredentialError::UnsupportedKeyFile(format!(
            "type {}",
            kind.as_deref().unwrap_or("missing")
        )),
        Err(e) => CredentialError::UnsupportedKeyFile(format!("unparseable: {}", e)),
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

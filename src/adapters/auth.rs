//! Master-key request signing for the Cosmos DB REST API.

use crate::utils::error::{CounterError, Result};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use chrono::{DateTime, Utc};
use hmac::{Hmac, Mac};
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

#[derive(Clone)]
pub struct MasterKey {
    mac: HmacSha256,
}

impl std::fmt::Debug for MasterKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("MasterKey(<redacted>)")
    }
}

impl MasterKey {
    pub fn from_base64(account_key: &str) -> Result<Self> {
        let key = STANDARD
            .decode(account_key.trim())
            .map_err(|e| CounterError::InvalidConfigValueError {
                field: "AccountKey".to_string(),
                value: "<redacted>".to_string(),
                reason: format!("Account key is not valid base64: {}", e),
            })?;

        let mac = HmacSha256::new_from_slice(&key).map_err(|e| CounterError::ConfigError {
            message: format!("Unable to use account key for signing: {}", e),
        })?;

        Ok(Self { mac })
    }

    /// Builds the URL-encoded `authorization` header value.
    ///
    /// `resource_link` is the document path for item operations and the
    /// collection path for feed operations such as create/upsert.
    pub fn authorization_token(
        &self,
        verb: &str,
        resource_type: &str,
        resource_link: &str,
        date: &str,
    ) -> String {
        let payload = format!(
            "{}\n{}\n{}\n{}\n\n",
            verb.to_lowercase(),
            resource_type.to_lowercase(),
            resource_link,
            date.to_lowercase()
        );

        let mut mac = self.mac.clone();
        mac.update(payload.as_bytes());
        let signature = STANDARD.encode(mac.finalize().into_bytes());

        let token = format!("type=master&ver=1.0&sig={}", signature);
        url::form_urlencoded::byte_serialize(token.as_bytes()).collect()
    }
}

/// `x-ms-date` header value (RFC 1123, always GMT).
pub fn rfc1123_date(now: DateTime<Utc>) -> String {
    now.format("%a, %d %b %Y %H:%M:%S GMT").to_string()
}

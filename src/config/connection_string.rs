use crate::utils::error::{CounterError, Result};
use crate::utils::validation::{validate_base64, validate_required_field, validate_url, Validate};

/// `AccountEndpoint=<url>;AccountKey=<base64>;` as issued by the Azure portal.
#[derive(Clone)]
pub struct ConnectionString {
    pub account_endpoint: String,
    pub account_key: String,
}

impl std::fmt::Debug for ConnectionString {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConnectionString")
            .field("account_endpoint", &self.account_endpoint)
            .field("account_key", &"<redacted>")
            .finish()
    }
}

impl ConnectionString {
    pub fn parse(raw: &str) -> Result<Self> {
        let mut endpoint = None;
        let mut key = None;

        for segment in raw.split(';').map(str::trim).filter(|s| !s.is_empty()) {
            // Keys end in '=' padding, so only the first '=' separates name from value.
            let (name, value) = segment
                .split_once('=')
                .ok_or_else(|| CounterError::ConfigError {
                    message: "Malformed connection string segment, expected name=value".to_string(),
                })?;

            match name.trim() {
                n if n.eq_ignore_ascii_case("AccountEndpoint") => {
                    endpoint = Some(value.trim().to_string())
                }
                n if n.eq_ignore_ascii_case("AccountKey") => key = Some(value.trim().to_string()),
                other => tracing::debug!("Ignoring connection string segment '{}'", other),
            }
        }

        let connection = Self {
            account_endpoint: validate_required_field("AccountEndpoint", &endpoint)?.clone(),
            account_key: validate_required_field("AccountKey", &key)?.clone(),
        };
        connection.validate()?;

        Ok(connection)
    }
}

impl Validate for ConnectionString {
    fn validate(&self) -> Result<()> {
        validate_url("AccountEndpoint", &self.account_endpoint)?;
        validate_base64("AccountKey", &self.account_key)?;
        Ok(())
    }
}

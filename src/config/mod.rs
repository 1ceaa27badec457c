#[cfg(feature = "cli")]
pub mod cli;
pub mod connection_string;

pub use connection_string::ConnectionString;

use crate::domain::model::{CONTAINER_NAME, DATABASE_NAME};
use crate::utils::error::{CounterError, Result};
use crate::utils::validation::{validate_non_empty_string, Validate};
use std::env;

pub const CONNECTION_STRING_VAR: &str = "AzureResumeConnectionString";
pub const PORT_VAR: &str = "FUNCTIONS_CUSTOMHANDLER_PORT";
pub const DEFAULT_PORT: u16 = 7071;

/// Database settings for the counter function. Only the connection string
/// comes from the environment; database and container names are fixed.
#[derive(Debug, Clone)]
pub struct FunctionConfig {
    pub connection: ConnectionString,
    pub database_name: String,
    pub container_name: String,
}

impl FunctionConfig {
    pub fn from_env() -> Result<Self> {
        let raw = env::var(CONNECTION_STRING_VAR).map_err(|_| CounterError::MissingConfigError {
            field: CONNECTION_STRING_VAR.to_string(),
        })?;
        Self::from_connection_string(&raw)
    }

    pub fn from_connection_string(raw: &str) -> Result<Self> {
        Ok(Self {
            connection: ConnectionString::parse(raw)?,
            database_name: DATABASE_NAME.to_string(),
            container_name: CONTAINER_NAME.to_string(),
        })
    }
}

impl Validate for FunctionConfig {
    fn validate(&self) -> Result<()> {
        self.connection.validate()?;
        validate_non_empty_string("database_name", &self.database_name)?;
        validate_non_empty_string("container_name", &self.container_name)?;

        tracing::debug!("Function configuration validation passed");
        Ok(())
    }
}

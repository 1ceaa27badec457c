use crate::config::{DEFAULT_PORT, PORT_VAR};
use clap::Parser;

#[derive(Debug, Clone, Parser)]
#[command(name = "visit-counter")]
#[command(about = "Visit counter HTTP function backed by Cosmos DB")]
pub struct ServeArgs {
    #[arg(long, default_value = "127.0.0.1")]
    pub host: String,

    #[arg(long, env = PORT_VAR, default_value_t = DEFAULT_PORT)]
    pub port: u16,

    #[arg(long, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, help = "Emit JSON log lines (implied when running under the Functions host)")]
    pub json: bool,
}

impl ServeArgs {
    pub fn under_functions_host(&self) -> bool {
        std::env::var_os(PORT_VAR).is_some()
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

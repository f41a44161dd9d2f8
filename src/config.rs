use std::net::SocketAddr;
use thiserror::Error;

pub const DEFAULT_AIRTABLE_API_URL: &str = "https://api.airtable.com/v0";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("invalid bind address {0:?}")]
    BindAddr(String),
}

#[derive(Clone)]
pub struct Config {
    pub airtable_pat: String,
    pub airtable_base_id: String,
    pub airtable_api_url: String,
    pub bind_addr: SocketAddr,
}

impl Config {
    /// Reads settings from the process environment.
    ///
    /// Missing store credentials are left empty on purpose: the store answers
    /// with an authentication error, which the gateway reports as upstream.
    pub fn from_env() -> Result<Self, ConfigError> {
        let airtable_pat = std::env::var("AIRTABLE_PAT").unwrap_or_default();
        let airtable_base_id = std::env::var("AIRTABLE_BASE_ID").unwrap_or_default();
        let airtable_api_url = std::env::var("AIRTABLE_API_URL")
            .unwrap_or_else(|_| DEFAULT_AIRTABLE_API_URL.to_string());

        let addr = std::env::var("BIND_ADDR").unwrap_or_else(|_| {
            let port = std::env::var("PORT").unwrap_or_else(|_| "3000".to_string());
            format!("0.0.0.0:{}", port)
        });
        let bind_addr = addr.parse().map_err(|_| ConfigError::BindAddr(addr))?;

        Ok(Self {
            airtable_pat,
            airtable_base_id,
            airtable_api_url,
            bind_addr,
        })
    }
}

// Never print the token itself.
impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("airtable_pat_set", &!self.airtable_pat.is_empty())
            .field("airtable_base_id_set", &!self.airtable_base_id.is_empty())
            .field("airtable_api_url", &self.airtable_api_url)
            .field("bind_addr", &self.bind_addr)
            .finish()
    }
}

use dotenvy::dotenv;
use std::env;

use crate::error::Error;

/// Production endpoint of the Pagar.me v1 API.
pub const DEFAULT_BASE_URL: &str = "https://api.pagar.me/1";

#[derive(Debug, Clone)]
pub struct Config {
    pub api_key: String,
    pub base_url: String,
}

impl Config {
    pub fn from_env() -> Result<Self, Error> {
        dotenv().ok(); // Load .env file if present

        let api_key = env::var("PAGARME_API_KEY")
            .map_err(|_| Error::Configuration("PAGARME_API_KEY must be set".to_string()))?;
        let base_url =
            env::var("PAGARME_BASE_URL").unwrap_or_else(|_| DEFAULT_BASE_URL.to_string());

        Ok(Config { api_key, base_url })
    }
}

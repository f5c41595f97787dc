use crate::error::{Error, Result};
use dotenvy::dotenv;
use std::env;
use std::sync::OnceLock;

#[derive(Debug, Clone)]
pub struct Config {
    pub server_address: String,
    pub database_url: String,
    pub line_channel_access_token: String,
    pub line_channel_secret: String,
    pub n8n_webhook_url: String,
    pub admin_token: String,
    pub line_api_base: String,
    pub webhook_path_prefix: String,
}

pub static CONFIG: OnceLock<Config> = OnceLock::new();

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenv().ok();

        Ok(Self {
            server_address: get_env("SERVER_ADDRESS")?,
            database_url: get_env("DATABASE_URL")?,
            line_channel_access_token: get_env("LINE_CHANNEL_ACCESS_TOKEN")?,
            line_channel_secret: get_env("LINE_CHANNEL_SECRET")?,
            n8n_webhook_url: get_env("N8N_WEBHOOK_URL")?,
            admin_token: get_env("ADMIN_TOKEN")?,
            line_api_base: env::var("LINE_API_BASE")
                .unwrap_or_else(|_| "https://api.line.me".to_string()),
            webhook_path_prefix: env::var("WEBHOOK_PATH_PREFIX")
                .unwrap_or_else(|_| "/linebot".to_string()),
        })
    }
}

fn get_env(name: &str) -> Result<String> {
    env::var(name).map_err(|_| Error::Config(format!("Missing environment variable: {}", name)))
}

pub fn init_config() -> Result<()> {
    let config = Config::from_env()?;
    CONFIG
        .set(config)
        .map_err(|_| Error::Config("Configuration has already been initialized".to_string()))?;
    Ok(())
}

pub fn get_config() -> &'static Config {
    CONFIG
        .get()
        .expect("Configuration has not been initialized")
}

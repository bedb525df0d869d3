use crate::error::{Error, Result};
use dotenvy::dotenv;
use std::env;
use std::sync::OnceLock;

#[derive(Debug, Clone)]
pub struct Config {
    pub server_address: String,
    pub database_url: String,
    pub groq_api_key: String,
    pub groq_model: String,
    pub session_ttl_minutes: u64,
    pub daily_quota: u32,
    pub hourly_quota: u32,
    pub chat_per_minute: u32,
    pub max_question_retries: usize,
}

pub static CONFIG: OnceLock<Config> = OnceLock::new();

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenv().ok();

        Ok(Self {
            server_address: get_env("SERVER_ADDRESS")?,
            database_url: get_env("DATABASE_URL")?,
            groq_api_key: get_env("GROQ_API_KEY")?,
            groq_model: get_env_or("GROQ_MODEL", "llama3-8b-8192"),
            session_ttl_minutes: get_env_parse_or("SESSION_TTL_MINUTES", 30)?,
            daily_quota: get_env_parse_or("DAILY_QUOTA", 200)?,
            hourly_quota: get_env_parse_or("HOURLY_QUOTA", 50)?,
            chat_per_minute: get_env_parse_or("CHAT_PER_MINUTE", 10)?,
            max_question_retries: get_env_parse_or("MAX_QUESTION_RETRIES", 5)?,
        })
    }
}

fn get_env(name: &str) -> Result<String> {
    env::var(name).map_err(|_| Error::Config(format!("Missing environment variable: {}", name)))
}

fn get_env_or(name: &str, default: &str) -> String {
    env::var(name).unwrap_or_else(|_| default.to_string())
}

fn get_env_parse_or<T>(name: &str, default: T) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match env::var(name) {
        Err(_) => Ok(default),
        Ok(raw) => raw
            .parse()
            .map_err(|e| Error::Config(format!("Invalid value for {}: {}", name, e))),
    }
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

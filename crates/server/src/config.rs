use config::ConfigError;
use domain::ReadingSpeed;
use serde::Deserialize;
use std::collections::HashMap;

const ENV_PREFIX: &str = "BLOG_";

#[derive(Deserialize, Clone)]
pub struct Settings {
    pub server: ServerSettings,
    pub database: DatabaseSettings,
    pub security: SecuritySettings,
    pub blog: BlogSettings,
}

#[derive(Deserialize, Clone)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
    pub cors_origins: String,
}

#[derive(Deserialize, Clone)]
pub struct DatabaseSettings {
    pub url: String,
}

#[derive(Deserialize, Clone)]
pub struct SecuritySettings {
    pub admin_token: String,
}

#[derive(Deserialize, Clone)]
pub struct BlogSettings {
    // average reading speed behind read-time estimates
    pub words_per_minute: ReadingSpeed,
    pub page_size: u32,
}

impl Settings {
    pub fn new() -> Result<Self, ConfigError> {
        let run_mode = std::env::var("RUN_MODE").unwrap_or_else(|_| "development".to_string());
        build(collect_env_vars(), &run_mode)
    }
}

fn build(env_map: HashMap<String, String>, run_mode: &str) -> Result<Settings, ConfigError> {
    let s = config::Config::builder()
        .set_default("server.host", "0.0.0.0")?
        .set_default("server.port", 3000)?
        .set_default("server.cors_origins", "*")?
        .set_default("database.url", "sqlite://data/blog.db")?
        .set_default("security.admin_token", "admin_secret_change_me")?
        .set_default(
            "blog.words_per_minute",
            i64::from(domain::content::DEFAULT_WORDS_PER_MINUTE),
        )?
        .set_default("blog.page_size", i64::from(service::DEFAULT_PAGE_SIZE))?
        .add_source(config::File::with_name("config").required(false))
        .add_source(config::File::with_name(&format!("config.{}", run_mode)).required(false))
        .add_source(config::File::from_str(
            &serde_json::to_string(&env_map)
                .map_err(|e| ConfigError::Message(e.to_string()))?,
            config::FileFormat::Json,
        ))
        .build()?;

    s.try_deserialize()
}

/// `BLOG_DATABASE__URL=...` becomes `database.url`.
fn collect_env_vars() -> HashMap<String, String> {
    env_overrides(std::env::vars())
}

fn env_overrides(vars: impl Iterator<Item = (String, String)>) -> HashMap<String, String> {
    vars.filter_map(|(k, v)| {
        let new_key = k.strip_prefix(ENV_PREFIX)?.replace("__", ".").to_lowercase();
        Some((new_key, v))
    })
    .collect()
}

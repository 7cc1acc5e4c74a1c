//! Handles settings for the application. Configuration is read from
//! `config/kasbot.toml` and `KASBOT__*` environment variables.
//!
//! See `config/kasbot.example.toml` for every key.
use chrono_tz::Tz;
use clap::Parser;
use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

const DEFAULT_CONFIG_PATH: &str = "config/kasbot.toml";

#[derive(Debug, Parser)]
#[command(name = "kasbot", about = "Finance ledger bot")]
pub struct Args {
    /// Config file path (TOML).
    #[arg(long, default_value = DEFAULT_CONFIG_PATH)]
    pub config: String,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct App {
    pub level: String,
}

impl Default for App {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Ledger {
    pub path: String,
    pub page_size: usize,
    pub timezone: String,
}

impl Default for Ledger {
    fn default() -> Self {
        Self {
            path: "data.json".to_string(),
            page_size: engine::DEFAULT_PAGE_SIZE,
            timezone: "Asia/Jakarta".to_string(),
        }
    }
}

impl Ledger {
    pub fn timezone(&self) -> Result<Tz, ConfigError> {
        self.timezone.parse().map_err(|err| {
            ConfigError::Message(format!("invalid timezone {}: {err}", self.timezone))
        })
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Commands {
    pub prefix: String,
    pub aliases: bool,
    pub help: bool,
    pub pagination: bool,
}

impl Default for Commands {
    fn default() -> Self {
        let options = engine::CommandOptions::default();
        Self {
            prefix: engine::DEFAULT_PREFIX.to_string(),
            aliases: options.aliases,
            help: options.help,
            pagination: options.pagination,
        }
    }
}

impl Commands {
    pub fn options(&self) -> engine::CommandOptions {
        engine::CommandOptions {
            aliases: self.aliases,
            help: self.help,
            pagination: self.pagination,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct Telegram {
    pub token: String,
    #[serde(default)]
    pub allowed_users: Vec<u64>,
    #[serde(default)]
    pub allowed_chats: Vec<i64>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub app: App,
    pub ledger: Ledger,
    pub commands: Commands,
    pub telegram: Option<Telegram>,
}

impl Settings {
    pub fn new(path: &str) -> Result<Self, ConfigError> {
        let settings = Config::builder()
            .add_source(File::with_name(path).required(false))
            .add_source(Environment::with_prefix("KASBOT").separator("__"))
            .build()?;

        Self::from_config(settings)
    }

    fn from_config(config: Config) -> Result<Self, ConfigError> {
        let settings: Settings = config.try_deserialize()?;
        if settings.ledger.page_size == 0 {
            return Err(ConfigError::Message(
                "ledger.page_size must be at least 1".to_string(),
            ));
        }
        if settings.commands.prefix.trim().is_empty() {
            return Err(ConfigError::Message("commands.prefix must not be empty".to_string()));
        }
        settings.ledger.timezone()?;
        Ok(settings)
    }
}

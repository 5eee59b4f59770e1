use std::path::{Path, PathBuf};

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use serde_aux::field_attributes::deserialize_number_from_string;

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub application: ApplicationSettings,
    pub database: DatabaseSettings,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApplicationSettings {
    pub host: String,
    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub port: u16,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseSettings {
    pub path: PathBuf,
}

impl ApplicationSettings {
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Reads `configuration/base.*` if present, overridden by `APP__SECTION__KEY`
/// environment variables (after loading `.env`).
pub fn get_configuration() -> Result<Settings, ConfigError> {
    dotenv::dotenv().ok();
    load(Path::new("configuration"), environment())
}

fn environment() -> Environment {
    Environment::with_prefix("APP")
        .prefix_separator("__")
        .separator("__")
}

fn load(dir: &Path, env: Environment) -> Result<Settings, ConfigError> {
    Config::builder()
        .set_default("application.host", "0.0.0.0")?
        .set_default("application.port", 5000)?
        .set_default("database.path", "trivia.db")?
        .add_source(File::from(dir.join("base")).required(false))
        .add_source(env)
        .build()?
        .try_deserialize()
}

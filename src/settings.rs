use std::path::Path;

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

pub const DEFAULT_CONFIG_FILE: &str = "trivia.toml";
const ENV_PREFIX: &str = "TRIVIA";

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub server: ServerSettings,
    pub database: DatabaseSettings,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
}

impl ServerSettings {
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseSettings {
    pub url: String,
    pub max_connections: u32,
    pub run_migrations: bool,
}

impl Settings {
    /// Defaults, then the TOML file (optional unless given explicitly), then
    /// `TRIVIA__SECTION__KEY` environment variables. `.env` is honoured.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        dotenv::dotenv().ok();
        let env = Environment::with_prefix(ENV_PREFIX)
            .prefix_separator("__")
            .separator("__")
            .try_parsing(true);
        Self::from_sources(path, env)
    }

    fn from_sources(path: Option<&Path>, env: Environment) -> Result<Self, ConfigError> {
        let file = match path {
            Some(path) => File::from(path).required(true),
            None => File::with_name(DEFAULT_CONFIG_FILE).required(false),
        };
        Config::builder()
            .set_default("server.host", "0.0.0.0")?
            .set_default("server.port", 8080)?
            .set_default("database.url", "sqlite:trivia.db")?
            .set_default("database.max_connections", 5)?
            .set_default("database.run_migrations", true)?
            .add_source(file)
            .add_source(env)
            .build()?
            .try_deserialize()
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::io::Write;

    use super::*;

    fn env_from(vars: &[(&str, &str)]) -> Environment {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Environment::with_prefix(ENV_PREFIX)
            .prefix_separator("__")
            .separator("__")
            .try_parsing(true)
            .source(Some(vars))
    }

    #[test]
    fn defaults_apply_without_file_or_env() {
        let settings = Settings::from_sources(None, env_from(&[])).unwrap();
        assert_eq!(settings.server.address(), "0.0.0.0:8080");
        assert_eq!(settings.database.url, "sqlite:trivia.db");
        assert_eq!(settings.database.max_connections, 5);
        assert!(settings.database.run_migrations);
    }

    #[test]
    fn file_then_env_override_defaults() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(
            file,
            "[server]\nport = 3000\n\n[database]\nurl = \"sqlite:quiz.db\"\nrun_migrations = false"
        )
        .unwrap();

        let settings = Settings::from_sources(
            Some(file.path()),
            env_from(&[("TRIVIA__SERVER__HOST", "127.0.0.1")]),
        )
        .unwrap();

        assert_eq!(settings.server.address(), "127.0.0.1:3000");
        assert_eq!(settings.database.url, "sqlite:quiz.db");
        assert!(!settings.database.run_migrations);
    }

    #[test]
    fn explicit_missing_file_is_an_error() {
        let result = Settings::from_sources(Some(Path::new("/nonexistent/trivia.toml")), env_from(&[]));
        assert!(result.is_err());
    }
}

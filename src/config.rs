use dotenv::dotenv;
use std::env;

use crate::error::{HafError, Result};

pub const DEFAULT_BIND: &str = "127.0.0.1:8088";
pub const DEFAULT_RACE: &str = "eged";

/// Settings for the stores and the daemon. The library never reads the
/// environment itself; binaries build this and hand it down.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub database_url: String,
    pub bind_address: String,
    pub race: String,
}

impl Config {
    pub fn new(database_url: &str) -> Config {
        Config {
            database_url: database_url.to_string(),
            bind_address: DEFAULT_BIND.to_string(),
            race: DEFAULT_RACE.to_string(),
        }
    }

    /// `DATABASE_URL` is required, `HAFR_BIND` and `HAFR_RACE` are optional.
    /// A `.env` file in the working directory is honored.
    pub fn from_env() -> Result<Config> {
        dotenv().ok();

        let database_url = env::var("DATABASE_URL")
            .map_err(|_| HafError::Config("DATABASE_URL must be set".to_string()))?;
        let mut config = Config::new(&database_url);
        if let Ok(bind) = env::var("HAFR_BIND") {
            config.bind_address = bind;
        }
        if let Ok(race) = env::var("HAFR_RACE") {
            config.race = race;
        }
        Ok(config)
    }

    pub fn with_race(mut self, race: Option<String>) -> Config {
        if let Some(race) = race {
            self.race = race;
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = Config::new("postgres://localhost/hafr");
        assert_eq!(config.bind_address, "127.0.0.1:8088");
        assert_eq!(config.race, "eged");
        assert_eq!(config.clone().with_race(None), config);
        assert_eq!(config.with_race(Some("naszaly".into())).race, "naszaly");
    }
}

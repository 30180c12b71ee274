use std::{env, time::Duration};

use anyhow::{bail, Context, Result};

use crate::{game::GeneratorOptions, utils::letters::FillerDistribution};

/// Upper bound accepted for `GRID_SIZE`
pub const MAX_GRID_SIZE: usize = 26;

#[derive(Debug, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub game: GameConfig,
    pub session: SessionConfig,
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub frontend_dir: String,
}

#[derive(Debug, Clone)]
pub struct GameConfig {
    pub categories_path: String,
    pub default_category: String,
    pub grid_size: usize,
    pub placement_attempts: usize,
    pub filler: FillerDistribution,
}

#[derive(Debug, Clone)]
pub struct SessionConfig {
    pub idle_timeout: Duration,
    pub sweep_interval: Duration,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build the config from any key lookup; `from_env` passes the process environment
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_string());

        let server = ServerConfig {
            host: var("HOST", "0.0.0.0"),
            port: var("PORT", "3000")
                .parse()
                .context("PORT must be a number")?,
            frontend_dir: var("FRONTEND_DIR", "../frontend"),
        };

        let grid_size: usize = var("GRID_SIZE", "12")
            .parse()
            .context("GRID_SIZE must be a number")?;
        if grid_size == 0 || grid_size > MAX_GRID_SIZE {
            bail!("GRID_SIZE must be between 1 and {}", MAX_GRID_SIZE);
        }

        let placement_attempts: usize = var("PLACEMENT_ATTEMPTS", "100")
            .parse()
            .context("PLACEMENT_ATTEMPTS must be a number")?;
        if placement_attempts == 0 {
            bail!("PLACEMENT_ATTEMPTS must be at least 1");
        }

        let game = GameConfig {
            categories_path: var("CATEGORIES_PATH", "./categories.json"),
            default_category: var("DEFAULT_CATEGORY", "premierLeague"),
            grid_size,
            placement_attempts,
            filler: var("FILLER_DISTRIBUTION", "uniform")
                .parse::<FillerDistribution>()
                .map_err(anyhow::Error::msg)
                .context("FILLER_DISTRIBUTION is invalid")?,
        };

        let session = SessionConfig {
            idle_timeout: Duration::from_secs(
                var("SESSION_IDLE_TIMEOUT_SECS", "1800")
                    .parse::<u64>()
                    .context("SESSION_IDLE_TIMEOUT_SECS must be a number")?,
            ),
            sweep_interval: Duration::from_secs(
                var("SESSION_SWEEP_INTERVAL_SECS", "60")
                    .parse::<u64>()
                    .context("SESSION_SWEEP_INTERVAL_SECS must be a number")?
                    .max(1),
            ),
        };

        Ok(Config {
            server,
            game,
            session,
        })
    }

    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }

    pub fn generator_options(&self) -> GeneratorOptions {
        GeneratorOptions {
            size: self.game.grid_size,
            max_attempts: self.game.placement_attempts,
            filler: self.game.filler,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(pairs: &[(&str, &str)]) -> Result<Config> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = config_from(&[]).unwrap();
        assert_eq!(config.server_addr(), "0.0.0.0:3000");
        assert_eq!(config.game.grid_size, 12);
        assert_eq!(config.game.placement_attempts, 100);
        assert_eq!(config.game.filler, FillerDistribution::Uniform);
        assert_eq!(config.game.default_category, "premierLeague");
        assert_eq!(config.session.idle_timeout, Duration::from_secs(1800));
    }

    #[test]
    fn test_overrides() {
        let config = config_from(&[
            ("PORT", "8080"),
            ("GRID_SIZE", "15"),
            ("FILLER_DISTRIBUTION", "english"),
            ("SESSION_SWEEP_INTERVAL_SECS", "0"),
        ])
        .unwrap();

        assert_eq!(config.server.port, 8080);
        let options = config.generator_options();
        assert_eq!(options.size, 15);
        assert_eq!(options.filler, FillerDistribution::English);
        assert_eq!(config.session.sweep_interval, Duration::from_secs(1));
    }

    #[test]
    fn test_rejects_bad_values() {
        assert!(config_from(&[("PORT", "http")]).is_err());
        assert!(config_from(&[("GRID_SIZE", "0")]).is_err());
        assert!(config_from(&[("GRID_SIZE", "40")]).is_err());
        assert!(config_from(&[("PLACEMENT_ATTEMPTS", "0")]).is_err());
        assert!(config_from(&[("FILLER_DISTRIBUTION", "zipf")]).is_err());
        assert!(config_from(&[("SESSION_SWEEP_INTERVAL_SECS", "soon")]).is_err());
        assert!(config_from(&[("SESSION_IDLE_TIMEOUT_SECS", "-5")]).is_err());
    }
}

use std::env;
use dotenv::dotenv;
use serde::Deserialize;
use log::{info, warn};
use shared::timezone::{parse_timezone, BUSINESS_TIMEZONE_NAME};

const DEFAULT_ALLOWED_ORIGINS: &str = "http://localhost:50003,http://127.0.0.1:50003";

#[derive(Debug, Clone, Deserialize, PartialEq, Default)]
pub enum Environment {
    #[default]
    Development,
    Test,
    Production,
}

impl std::str::FromStr for Environment {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "dev" | "development" => Ok(Environment::Development),
            "test" => Ok(Environment::Test),
            "prod" | "production" => Ok(Environment::Production),
            _ => Err(format!("Unknown environment: {}", s)),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub environment: Environment,
    pub server: ServerConfig,
    pub settlement: SettlementConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub workers: usize,
    pub allowed_origins: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SettlementConfig {
    /// IANA timezone the league settles in.
    pub timezone: String,
    /// Optional JSON rule table replacing the bundled one.
    pub rules_path: Option<String>,
}

impl Config {
    pub fn load() -> Result<Self, Box<dyn std::error::Error>> {
        // ENV_FILE_PATH replaces the .env lookup entirely
        match env::var("ENV_FILE_PATH") {
            Ok(env_file_path) if !env_file_path.is_empty() => {
                info!("Loading environment from ENV_FILE_PATH: {}", env_file_path);
                dotenv::from_filename(&env_file_path).ok();
            }
            _ => {
                dotenv().ok();
                // .env.<environment> overrides the base file outside development
                let environment_hint = Self::environment_from_env();
                let env_file = format!(".env.{:?}", environment_hint).to_lowercase();
                if env_file != ".env.development" {
                    let _ = dotenv::from_filename(&env_file);
                }
            }
        }

        let environment = Self::environment_from_env();
        info!("Loading configuration for environment: {:?}", environment);

        let config = Config {
            environment: environment.clone(),
            server: Self::load_server_config(&environment),
            settlement: Self::load_settlement_config(),
        };

        config.validate()?;
        config.log_configuration();

        Ok(config)
    }

    fn environment_from_env() -> Environment {
        env::var("RUST_ENV")
            .unwrap_or_else(|_| "development".to_string())
            .parse()
            .unwrap_or(Environment::Development)
    }

    fn load_server_config(env: &Environment) -> ServerConfig {
        let default_workers = match env {
            Environment::Production => 8,
            Environment::Development | Environment::Test => 1,
        };

        ServerConfig {
            host: env::var("SERVER_HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port: env::var("SERVER_PORT")
                .ok()
                .and_then(|port| port.parse().ok())
                .unwrap_or(50002),
            workers: env::var("BACKEND_WORKERS")
                .ok()
                .and_then(|workers| workers.parse().ok())
                .unwrap_or(default_workers),
            allowed_origins: Self::parse_origins(
                &env::var("CORS_ALLOWED_ORIGINS")
                    .unwrap_or_else(|_| DEFAULT_ALLOWED_ORIGINS.to_string()),
            ),
        }
    }

    fn load_settlement_config() -> SettlementConfig {
        SettlementConfig {
            timezone: env::var("SETTLEMENT_TIMEZONE")
                .unwrap_or_else(|_| BUSINESS_TIMEZONE_NAME.to_string()),
            rules_path: env::var("SETTLEMENT_RULES_PATH")
                .ok()
                .filter(|path| !path.trim().is_empty()),
        }
    }

    fn parse_origins(list: &str) -> Vec<String> {
        list.split(',')
            .map(|origin| origin.trim().to_string())
            .filter(|origin| !origin.is_empty())
            .collect()
    }

    fn validate(&self) -> Result<(), Box<dyn std::error::Error>> {
        if self.server.port == 0 {
            return Err("Server port cannot be 0".into());
        }
        if self.server.workers == 0 {
            return Err("Backend workers cannot be 0".into());
        }
        if parse_timezone(&self.settlement.timezone).is_none() {
            return Err(format!("Unknown settlement timezone: {}", self.settlement.timezone).into());
        }
        Ok(())
    }

    fn log_configuration(&self) {
        info!("Configuration loaded successfully");
        info!("Environment: {:?}", self.environment);
        info!("Server: {}:{} (workers: {})", self.server.host, self.server.port, self.server.workers);
        info!("Settlement timezone: {}", self.settlement.timezone);
        match &self.settlement.rules_path {
            Some(path) => info!("Settlement rules: {}", path),
            None => info!("Settlement rules: bundled table"),
        }

        if self.settlement.timezone != BUSINESS_TIMEZONE_NAME {
            warn!(
                "Settlement timezone {} differs from the league's {}",
                self.settlement.timezone, BUSINESS_TIMEZONE_NAME
            );
        }
    }

    #[allow(dead_code)]
    pub fn is_development(&self) -> bool {
        self.environment == Environment::Development
    }

    #[allow(dead_code)]
    pub fn is_production(&self) -> bool {
        self.environment == Environment::Production
    }
}

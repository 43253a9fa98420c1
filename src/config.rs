use std::env;
use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("environment variable {0} must be set")]
    Missing(&'static str),

    #[error("environment variable {name} has an invalid value: {value}")]
    Invalid { name: &'static str, value: String },
}

/// Where uploaded evidence photos are kept.
#[derive(Clone, Debug, PartialEq)]
pub enum BlobConfig {
    Local {
        root: PathBuf,
    },
    Gcs {
        bucket: String,
    },
    R2 {
        bucket: String,
        account_id: String,
        access_key: String,
        secret_key: String,
    },
}

#[derive(Clone, Debug)]
pub struct Config {
    /// Absent means the in-memory store is used.
    pub database_url: Option<String>,
    pub db_max_connections: u32,
    pub server_host: String,
    pub server_port: u16,
    pub jwt_secret: String,
    pub blob: BlobConfig,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.is_empty());
        let require = |key: &'static str| get(key).ok_or(ConfigError::Missing(key));

        let server_port = match get("SERVER_PORT") {
            Some(v) => v.parse().map_err(|_| ConfigError::Invalid {
                name: "SERVER_PORT",
                value: v,
            })?,
            None => 50051,
        };
        let db_max_connections = match get("DB_MAX_CONNECTIONS") {
            Some(v) => v.parse().map_err(|_| ConfigError::Invalid {
                name: "DB_MAX_CONNECTIONS",
                value: v,
            })?,
            None => 10,
        };

        let blob = match get("BLOB_BACKEND").as_deref().unwrap_or("local") {
            "local" => BlobConfig::Local {
                root: get("BLOB_LOCAL_DIR")
                    .map(PathBuf::from)
                    .unwrap_or_else(|| PathBuf::from("./data/blobs")),
            },
            "gcs" => BlobConfig::Gcs {
                bucket: require("GCS_BUCKET")?,
            },
            "r2" => BlobConfig::R2 {
                bucket: require("R2_BUCKET")?,
                account_id: require("R2_ACCOUNT_ID")?,
                access_key: require("R2_ACCESS_KEY")?,
                secret_key: require("R2_SECRET_KEY")?,
            },
            other => {
                return Err(ConfigError::Invalid {
                    name: "BLOB_BACKEND",
                    value: other.to_string(),
                })
            }
        };

        Ok(Config {
            database_url: get("DATABASE_URL"),
            db_max_connections,
            server_host: get("SERVER_HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
            server_port,
            jwt_secret: require("JWT_SECRET")?,
            blob,
        })
    }

    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.server_host, self.server_port)
    }
}

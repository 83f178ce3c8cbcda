use thiserror::Error;

const DEFAULT_HOST: &str = "0.0.0.0";
const DEFAULT_PORT: u16 = 4000;
const DEFAULT_DATABASE: &str = "todos";
const DEFAULT_COLLECTION: &str = "todos";

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("MONGODB_URI is not set; add your MongoDB connection string to the environment or .env")]
    MissingMongoDbUri,
    #[error("PORT must be a number between 0 and 65535, got {0:?}")]
    InvalidPort(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub mongodb_uri: String,
    pub database: String,
    pub collection: String,
}

impl Config {
    /// Reads the process environment, after loading `.env` if one exists.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| dotenvy::var(key).ok())
    }

    /// Builds the config from any key lookup. Empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).filter(|value| !value.is_empty());

        let mongodb_uri = var("MONGODB_URI").ok_or(ConfigError::MissingMongoDbUri)?;
        let port = match var("PORT") {
            Some(port) => port.parse().map_err(|_| ConfigError::InvalidPort(port))?,
            None => DEFAULT_PORT,
        };

        let mut config = Self::new_mongodb_uri(mongodb_uri);
        config.port = port;
        if let Some(host) = var("HOST") {
            config.host = host;
        }
        if let Some(database) = var("MONGODB_DATABASE") {
            config.database = database;
        }
        if let Some(collection) = var("MONGODB_COLLECTION") {
            config.collection = collection;
        }
        Ok(config)
    }

    pub fn new_mongodb_uri(mongodb_uri: String) -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            mongodb_uri,
            database: DEFAULT_DATABASE.to_string(),
            collection: DEFAULT_COLLECTION.to_string(),
        }
    }
}

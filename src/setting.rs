use std::{
    fs,
    io::{ErrorKind, Write},
    path::PathBuf,
};

use crate::{error::Error, model::MATCH_THRESHOLD, result::Result};

#[derive(serde::Deserialize, serde::Serialize, Clone, Debug)]
pub struct Config {
    pub model: ModelConfig,
    pub store: StoreConfig,
    pub engine: EngineConfig,
}

#[derive(serde::Deserialize, serde::Serialize, Clone, Debug)]
pub struct ModelConfig {
    pub cuda: bool,
    pub embedding_model: String,
}

#[derive(serde::Deserialize, serde::Serialize, Clone, Debug)]
pub struct StoreConfig {
    pub path: String,
}

#[derive(serde::Deserialize, serde::Serialize, Clone, Debug)]
pub struct EngineConfig {
    pub match_threshold: f32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            model: ModelConfig {
                cuda: false,
                embedding_model: "w600k_r50.onnx".to_string(),
            },
            store: StoreConfig {
                path: "registered_user.json".to_string(),
            },
            engine: EngineConfig {
                match_threshold: MATCH_THRESHOLD,
            },
        }
    }
}

impl Config {
    pub fn get() -> Result<Config> {
        let config_dir = Self::get_config_dir()?;

        let config_str = match fs::read_to_string(config_dir.clone()) {
            Ok(config) => config,
            Err(err) => {
                if err.kind() == ErrorKind::NotFound {
                    return Self::upsert_new(config_dir);
                }
                return Ok(Self::default());
            }
        };

        match config::Config::builder()
            .add_source(config::File::from_str(
                &config_str,
                config::FileFormat::Json,
            ))
            .build()
            .map_err(Error::ConfigError)?
            .try_deserialize::<Config>()
        {
            Ok(cfg) => Ok(cfg),
            Err(_) => Self::upsert_new(config_dir),
        }
    }

    /// Full path of the configured embedding model under `models/`.
    pub fn embedding_model_path(&self) -> Result<PathBuf> {
        Ok(std::env::current_dir()
            .map_err(Error::as_unknown_error)?
            .join("models")
            .join(&self.model.embedding_model))
    }

    pub fn store_path(&self) -> PathBuf {
        PathBuf::from(&self.store.path)
    }

    fn get_config_dir() -> Result<PathBuf> {
        Ok(std::env::current_dir()
            .map_err(|_| Error::UnknownError("failed to get current directory".into()))?
            .join("config.json"))
    }

    fn upsert_new(config_dir: PathBuf) -> Result<Config> {
        let config = Self::default();
        Self::upsert_config_file(config_dir, &config)?;
        Ok(config)
    }

    fn upsert_config_file(config_dir: PathBuf, config: &Config) -> Result<()> {
        fs::File::create(config_dir)
            .map_err(|err| Error::UnknownError(Box::new(err)))?
            .write_all(
                serde_json::to_string(config)
                    .map_err(|err| Error::UnknownError(Box::new(err)))?
                    .as_bytes(),
            )
            .map_err(|err| Error::UnknownError(Box::new(err)))
    }
}

#[cfg(test)]
mod test {
    use super::Config;

    #[test]
    fn defaults_round_trip_through_json() {
        let config = Config::default();
        let json = serde_json::to_string(&config).expect("Failed to serialize config");
        let back: Config = serde_json::from_str(&json).expect("Failed to deserialize config");
        assert_eq!(back.store.path, config.store.path);
        assert_eq!(back.engine.match_threshold, config.engine.match_threshold);
        assert!(!back.model.cuda);
    }
}

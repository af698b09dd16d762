use std::error::Error as StdError;

#[derive(Debug)]
pub enum Error {
    StoreLoadError(std::io::Error),
    StoreCorruptError(serde_json::Error),
    PersistenceError(Box<dyn StdError + Send + Sync>),
    ModelError(ort::Error),
    ImageError(image::ImageError),
    ConfigError(config::ConfigError),
    GuardError(String),
    SyncError(Box<dyn StdError + Send + Sync>),
    UnknownError(Box<dyn StdError + Send + Sync>),
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Error::StoreLoadError(err) => write!(f, "identity store load error: {}", err),
            Error::StoreCorruptError(err) => write!(f, "identity store corrupt: {}", err),
            Error::PersistenceError(err) => write!(f, "identity store write error: {}", err),
            Error::ModelError(err) => write!(f, "model error: {}", err),
            Error::ImageError(err) => write!(f, "image error: {}", err),
            Error::ConfigError(err) => write!(f, "configuration error: {}", err),
            Error::GuardError(err) => write!(f, "guard error: {}", err),
            Error::SyncError(err) => write!(f, "sync error: {}", err),
            Error::UnknownError(err) => write!(f, "unknown error: {}", err),
        }
    }
}

impl StdError for Error {}

impl Error {
    pub fn as_unknown_error<E: StdError + Send + Sync + 'static>(err: E) -> Self {
        Error::UnknownError(Box::new(err))
    }

    pub fn as_guard_error<E: std::fmt::Display>(err: E) -> Self {
        Error::GuardError(err.to_string())
    }

    pub fn as_sync_error<E: StdError + Send + Sync + 'static>(err: E) -> Self {
        Error::SyncError(Box::new(err))
    }

    pub fn as_persistence_error<E: StdError + Send + Sync + 'static>(err: E) -> Self {
        Error::PersistenceError(Box::new(err))
    }
}

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Config parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Config serialization error: {0}")]
    Serialization(#[from] toml::ser::Error),

    #[error("Invalid key binding for {action}: {binding:?}")]
    InvalidBinding { action: String, binding: String },
}

pub type Result<T> = std::result::Result<T, Error>;

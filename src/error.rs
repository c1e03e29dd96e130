//! Error types for the component loader.

use thiserror::Error;

/// Crate-level error type.
#[derive(Error, Debug)]
pub enum Error {
    /// Configuration error
    #[error("Config error: {0}")]
    Config(#[from] crate::config::ConfigError),

    /// Component declaration error
    #[error("Registry error: {0}")]
    Registry(#[from] crate::registry::RegistryError),

    /// Single candidate fetch error
    #[error("Fetch error: {0}")]
    Fetch(#[from] crate::loader::FetchError),

    /// Component load error
    #[error("Load error: {0}")]
    Load(#[from] crate::loader::LoadError),

    /// Document error
    #[error("Document error: {0}")]
    Dom(#[from] crate::dom::DomError),

    /// Scroll effect error
    #[error("Effect error: {0}")]
    Effect(#[from] crate::effects::EffectError),

    /// Bootstrap error
    #[error("Bootstrap error: {0}")]
    Bootstrap(#[from] crate::bootstrap::BootstrapError),
}

/// Result type alias for component loader operations.
pub type Result<T> = std::result::Result<T, Error>;

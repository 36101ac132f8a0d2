//! Scroll runtime error types

use thiserror::Error;

/// Errors surfaced by scroll panes and virtual lists
#[derive(Error, Debug)]
pub enum ScrollError {
    /// The viewport is missing a required collaborator or option
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// An item index outside `[0, len)`
    #[error("Index {index} out of range for {len} items")]
    IndexOutOfRange { index: usize, len: usize },

    /// Two options that cannot be active together
    #[error("Unsupported combination: {0}")]
    UnsupportedCombination(String),

    /// The refresh pass kept changing content size
    #[error("Refresh did not converge after {attempts} attempts")]
    RefreshDiverged { attempts: u32 },

    /// Failed to parse a TOML configuration
    #[error("Failed to parse scroll config: {0}")]
    ConfigParse(#[from] toml::de::Error),

    /// Failed to serialize a configuration to TOML
    #[error("Failed to serialize scroll config: {0}")]
    ConfigSerialize(#[from] toml::ser::Error),
}

/// Result type for scroll operations
pub type Result<T> = std::result::Result<T, ScrollError>;

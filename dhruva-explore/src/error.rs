//! Error types for DhruvaExplore

use thiserror::Error;

/// DhruvaExplore error type
///
/// None of these are process-level faults. `NoPath` and `NoFrontiers` are the
/// expected "no plan this cycle" outcomes of an exploration loop.
#[derive(Error, Debug)]
pub enum ExploreError {
    /// The exploration transform never reached the start cell, or descent
    /// got stuck in a local minimum.
    #[error("No path: {0}")]
    NoPath(String),

    /// Frontier detection found no cluster above the size threshold.
    #[error("No frontiers left to explore")]
    NoFrontiers,

    /// Start or goal lies outside the grid, or the grid buffer is malformed.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Zero-size or entirely blocked grid.
    #[error("Degenerate grid: {0}")]
    DegenerateGrid(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl ExploreError {
    /// Get a short error code for logging.
    pub fn code(&self) -> &'static str {
        match self {
            Self::NoPath(_) => "NO_PATH",
            Self::NoFrontiers => "NO_FRONTIERS",
            Self::InvalidInput(_) => "INVALID_INPUT",
            Self::DegenerateGrid(_) => "DEGENERATE_GRID",
            Self::Config(_) => "CONFIG",
            Self::Io(_) => "IO",
        }
    }

    /// Whether the caller may retry next cycle (possibly with relaxed settings).
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::NoPath(_) | Self::NoFrontiers)
    }
}

impl From<toml::de::Error> for ExploreError {
    fn from(e: toml::de::Error) -> Self {
        ExploreError::Config(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, ExploreError>;

// src/error.rs

use thiserror::Error;

pub type Result<T> = std::result::Result<T, PlotError>;

#[derive(Error, Debug)]
pub enum PlotError {
    #[error("A plot named '{0}' is already registered")]
    DuplicateName(String),

    #[error("No plot registered under {0}")]
    NotFound(String),

    #[error("Plot {0} is not a data series")]
    NotASeries(String),

    #[error("Invalid bivariate function: {0}")]
    InvalidFunction(String),

    #[error("Invalid contour levels: {0}")]
    InvalidLevels(String),

    #[error("Length mismatch: {0}")]
    LengthMismatch(String),

    #[error("Invalid subplot layout: {0}")]
    InvalidLayout(String),

    #[error("Invalid color specification '{0}'")]
    InvalidColor(String),

    #[error("No data supplied: {0}")]
    EmptyData(String),

    #[error("Rendering failed: {0}")]
    Render(String),

    #[error("Failed to write '{0}': {1}")]
    Io(String, #[source] std::io::Error),
}

impl PlotError {
    /// Wraps any plotters drawing error; their backends each carry a distinct error type.
    pub(crate) fn render<E: std::fmt::Display>(err: E) -> Self {
        PlotError::Render(err.to_string())
    }
}

// src/error.rs

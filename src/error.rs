use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum SplashError {
    /// Reading a config or font file from disk failed.
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("config parse error: {0}")]
    Parse(String),
    #[error("config validation error: {0}")]
    Validation(String),
    #[error("invalid font data: {0}")]
    Font(#[from] ab_glyph::InvalidFont),
    /// egui's default font set had no proportional face to borrow.
    #[error("no default font available")]
    NoDefaultFont,
}

pub type SplashResult<T> = Result<T, SplashError>;

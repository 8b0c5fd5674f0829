// error.rs - Error types for the scan engine

use std::path::PathBuf;
use thiserror::Error;

/// Errors surfaced by the recombination scan
#[derive(Error, Debug)]
pub enum ScanError {
    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Marker '{marker}' ({role}) matches no sequence in the alignment")]
    EmptyGroup { marker: String, role: &'static str },

    #[error("Invalid alignment: {message}")]
    InvalidAlignment { message: String },

    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Parsing error in {file}: {message}")]
    Parse { file: String, message: String },
}

impl ScanError {
    pub fn config<S: Into<String>>(message: S) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    pub fn invalid_alignment<S: Into<String>>(message: S) -> Self {
        Self::InvalidAlignment {
            message: message.into(),
        }
    }

    pub fn io<P: Into<PathBuf>>(path: P, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    pub fn parse<S: Into<String>, M: Into<String>>(file: S, message: M) -> Self {
        Self::Parse {
            file: file.into(),
            message: message.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, ScanError>;

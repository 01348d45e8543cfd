//! Error types for the fixture pipeline

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum FixtureError {
    #[error("Fixture file not found: {}", .0.display())]
    FileNotFound(PathBuf),

    #[error("Fixture schema error: {0}")]
    Schema(String),

    #[error("Fixture file locked or not writable: {0}")]
    Locked(String),

    #[error("Workbook error: {0}")]
    Workbook(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type FixtureResult<T> = Result<T, FixtureError>;

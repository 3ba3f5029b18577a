//! Crate-level errors

use thiserror::Error;

use crate::engine::ExecutionError;
use crate::program::LoadError;
use crate::validate::ValidationError;

pub type Result<T> = std::result::Result<T, Error>;

/// Any failure along load, validate, execute.
#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Load(#[from] LoadError),

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Execution(#[from] ExecutionError),
}

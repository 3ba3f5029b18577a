pub mod instruction;
pub mod program;
pub mod validate;
pub mod io;
pub mod tape;
pub mod engine;
pub mod metrics;
pub mod batch;
pub mod error;

use std::io::{Read, Write};

use crate::engine::{EngineConfig, Machine};
use crate::metrics::RunStats;
use crate::program::Loader;

pub use crate::error::{Error, Result};

/// Load a program from `source`, check it with `config.validation`, and run
/// it against `input` and `output`.
pub fn interpret<S, R, W>(
    source: S,
    input: &mut R,
    output: &mut W,
    config: &EngineConfig,
) -> Result<RunStats>
where
    S: Read,
    R: Read + ?Sized,
    W: Write + ?Sized,
{
    let mut loader = Loader::new(source);
    let program = loader.load()?;
    validate::validate_with(program, config.validation)?;
    let stats = Machine::new(program, config).run(input, output)?;
    Ok(stats)
}

use std::io::{Read, Write};

use thiserror::Error;
use tracing::{debug, trace};

use crate::instruction::{Instruction, LBRACKET, RBRACKET};
use crate::io::{IoError, read_byte, write_byte};
use crate::metrics::RunStats;
use crate::program::Program;
use crate::tape::{OutOfBounds, TAPE_LENGTH, Tape};
use crate::validate::ValidationMode;

/// Configuration for an execution.
#[derive(Clone, Debug)]
pub struct EngineConfig {
    /// Number of tape cells. Zero is treated as one; errors report the
    /// length of the tape actually built.
    pub tape_length: usize,
    /// Maximum instructions [`Machine::run`] may execute (`None` for no limit).
    pub step_limit: Option<u64>,
    /// Delimiter check applied before running a program from source.
    pub validation: ValidationMode,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            tape_length: TAPE_LENGTH,
            step_limit: None,
            validation: ValidationMode::Strict,
        }
    }
}

#[derive(Debug, Error)]
pub enum ExecutionError {
    #[error("instruction at position {position}: {source}")]
    Io {
        position: usize,
        #[source]
        source: IoError,
    },
    /// The data pointer would leave `[0, tape_length)`.
    #[error(
        "instruction at position {position} moved the data pointer to {attempted}, outside a tape of {tape_length} cells"
    )]
    OutOfRange {
        position: usize,
        attempted: isize,
        tape_length: usize,
    },
    /// A jump scan ran off the end of the program. Only possible when the
    /// program was not validated.
    #[error("no matching delimiter for the loop boundary at position {position}")]
    UnmatchedDelimiter { position: usize },
    #[error("step limit of {limit} reached before the program halted")]
    StepLimitExceeded { limit: u64 },
}

/// Outcome of a single [`Machine::step`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Step {
    /// One instruction was executed.
    Continue,
    /// The instruction pointer is at the end of the program; nothing ran.
    Halted,
}

/// Execution state for one run of one program.
///
/// Borrows the program and owns the tape, data pointer and instruction
/// pointer. Jumps are resolved by scanning the program at the moment a loop
/// boundary is taken, so no preprocessing is needed.
pub struct Machine<'p> {
    code: &'p [u8],
    tape: Tape,
    ip: usize,
    stats: RunStats,
    step_limit: Option<u64>,
}

impl<'p> Machine<'p> {
    pub fn new(program: &'p Program, config: &EngineConfig) -> Self {
        Self {
            code: program.as_bytes(),
            tape: Tape::new(config.tape_length),
            ip: 0,
            stats: RunStats::default(),
            step_limit: config.step_limit,
        }
    }

    pub fn instruction_pointer(&self) -> usize {
        self.ip
    }

    pub fn data_pointer(&self) -> usize {
        self.tape.pointer()
    }

    pub fn tape(&self) -> &Tape {
        &self.tape
    }

    pub fn steps(&self) -> u64 {
        self.stats.steps
    }

    pub fn stats(&self) -> RunStats {
        self.stats
    }

    pub fn is_halted(&self) -> bool {
        self.ip >= self.code.len()
    }

    /// Execute exactly one instruction.
    ///
    /// The step limit is not consulted here; hosts driving the machine one
    /// step at a time budget it themselves. On error the machine is left at
    /// the failing instruction.
    pub fn step<R, W>(&mut self, input: &mut R, output: &mut W) -> Result<Step, ExecutionError>
    where
        R: Read + ?Sized,
        W: Write + ?Sized,
    {
        let Some(&byte) = self.code.get(self.ip) else {
            return Ok(Step::Halted);
        };

        match Instruction::decode(byte) {
            Some(Instruction::Increment) => self.tape.increment(),
            Some(Instruction::Decrement) => self.tape.decrement(),
            Some(Instruction::MoveRight) => {
                self.tape.move_right().map_err(|e| self.out_of_range(e))?;
            }
            Some(Instruction::MoveLeft) => {
                self.tape.move_left().map_err(|e| self.out_of_range(e))?;
            }
            Some(Instruction::Output) => {
                write_byte(output, self.tape.current()).map_err(|source| {
                    ExecutionError::Io {
                        position: self.ip,
                        source,
                    }
                })?;
                self.stats.bytes_written += 1;
            }
            Some(Instruction::Input) => {
                let value = read_byte(input).map_err(|source| ExecutionError::Io {
                    position: self.ip,
                    source,
                })?;
                self.tape.set_current(value);
                self.stats.bytes_read += 1;
            }
            Some(Instruction::LoopStart) => {
                if self.tape.current() == 0 {
                    let target = self.matching_close(self.ip)?;
                    trace!(from = self.ip, to = target, "skip loop");
                    self.ip = target;
                    self.stats.jumps += 1;
                }
            }
            Some(Instruction::LoopEnd) => {
                if self.tape.current() != 0 {
                    let target = self.matching_open(self.ip)?;
                    trace!(from = self.ip, to = target, "repeat loop");
                    self.ip = target;
                    self.stats.jumps += 1;
                }
            }
            None => {}
        }

        // Jumps land on the matching delimiter, so this always moves past it.
        self.ip += 1;
        self.stats.steps += 1;
        Ok(Step::Continue)
    }

    /// Step until the program halts, an error occurs, or the step limit is
    /// reached.
    pub fn run<R, W>(&mut self, input: &mut R, output: &mut W) -> Result<RunStats, ExecutionError>
    where
        R: Read + ?Sized,
        W: Write + ?Sized,
    {
        while !self.is_halted() {
            if let Some(limit) = self.step_limit
                && self.stats.steps >= limit
            {
                debug!(limit, ip = self.ip, "step limit reached");
                return Err(ExecutionError::StepLimitExceeded { limit });
            }
            self.step(input, output)?;
        }

        debug!(
            steps = self.stats.steps,
            jumps = self.stats.jumps,
            bytes_read = self.stats.bytes_read,
            bytes_written = self.stats.bytes_written,
            "program halted"
        );
        Ok(self.stats)
    }

    /// Position of the `]` matching the `[` at `start`.
    fn matching_close(&self, start: usize) -> Result<usize, ExecutionError> {
        let mut depth = 1usize;
        let mut pos = start;
        while depth != 0 {
            pos += 1;
            match self.code.get(pos) {
                Some(&LBRACKET) => depth += 1,
                Some(&RBRACKET) => depth -= 1,
                Some(_) => {}
                None => return Err(ExecutionError::UnmatchedDelimiter { position: start }),
            }
        }
        Ok(pos)
    }

    /// Position of the `[` matching the `]` at `start`.
    fn matching_open(&self, start: usize) -> Result<usize, ExecutionError> {
        let mut depth = 1usize;
        let mut pos = start;
        while depth != 0 {
            if pos == 0 {
                return Err(ExecutionError::UnmatchedDelimiter { position: start });
            }
            pos -= 1;
            match self.code[pos] {
                RBRACKET => depth += 1,
                LBRACKET => depth -= 1,
                _ => {}
            }
        }
        Ok(pos)
    }

    fn out_of_range(&self, e: OutOfBounds) -> ExecutionError {
        ExecutionError::OutOfRange {
            position: self.ip,
            attempted: e.attempted,
            tape_length: self.tape.len(),
        }
    }
}

/// Run `program` to completion on a fresh default-sized tape.
pub fn execute<R, W>(program: &Program, input: &mut R, output: &mut W) -> Result<RunStats, ExecutionError>
where
    R: Read + ?Sized,
    W: Write + ?Sized,
{
    Machine::new(program, &EngineConfig::default()).run(input, output)
}

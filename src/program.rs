use std::io::Read;

use thiserror::Error;
use tracing::debug;

use crate::instruction::is_instruction;

/// An immutable instruction sequence.
///
/// Holds the source bytes exactly as read, commentary included. Both the
/// validator and the engine borrow it; nothing mutates it after loading.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct Program {
    code: Box<[u8]>,
}

impl Program {
    pub fn new(code: impl Into<Vec<u8>>) -> Self {
        Self {
            code: code.into().into_boxed_slice(),
        }
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.code
    }

    /// Total length in bytes, commentary included. Execution halts when the
    /// instruction pointer reaches this value.
    pub fn len(&self) -> usize {
        self.code.len()
    }

    pub fn is_empty(&self) -> bool {
        self.code.is_empty()
    }

    /// Number of bytes that are real instructions.
    pub fn instruction_count(&self) -> usize {
        self.code.iter().filter(|&&b| is_instruction(b)).count()
    }

    /// A copy of this program with every commentary byte removed.
    pub fn strip_comments(&self) -> Program {
        Program::new(
            self.code
                .iter()
                .copied()
                .filter(|&b| is_instruction(b))
                .collect::<Vec<u8>>(),
        )
    }
}

impl From<&str> for Program {
    fn from(source: &str) -> Self {
        Program::new(source.as_bytes())
    }
}

impl From<&[u8]> for Program {
    fn from(source: &[u8]) -> Self {
        Program::new(source)
    }
}

/// A read failure other than end-of-stream while loading a program.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to read program source after {bytes_read} bytes")]
    Read {
        bytes_read: usize,
        #[source]
        source: std::io::Error,
    },
}

/// Reads a program from a byte stream once and caches it.
///
/// The first successful [`Loader::load`] drains the source; later calls
/// return the cached program without touching the stream again.
pub struct Loader<R> {
    source: R,
    program: Option<Program>,
}

impl<R: Read> Loader<R> {
    pub fn new(source: R) -> Self {
        Self {
            source,
            program: None,
        }
    }

    pub fn load(&mut self) -> Result<&Program, LoadError> {
        // Re-reading a source that produced nothing is harmless: it is
        // already at end-of-stream.
        if !self.program.as_ref().is_some_and(|p| !p.is_empty()) {
            let program = self.read_all()?;
            debug!(
                bytes = program.len(),
                instructions = program.instruction_count(),
                "program loaded"
            );
            self.program = Some(program);
        }
        Ok(&*self.program.get_or_insert_with(Program::default))
    }

    fn read_all(&mut self) -> Result<Program, LoadError> {
        let mut code = Vec::new();
        for byte in (&mut self.source).bytes() {
            match byte {
                Ok(b) => code.push(b),
                Err(source) => {
                    return Err(LoadError::Read {
                        bytes_read: code.len(),
                        source,
                    });
                }
            }
        }
        Ok(Program::new(code))
    }

    /// The cached program, if [`Loader::load`] has succeeded.
    pub fn program(&self) -> Option<&Program> {
        self.program.as_ref()
    }

    pub fn into_program(self) -> Option<Program> {
        self.program
    }
}

/// Load a whole program from `source` in one call.
pub fn load<R: Read>(source: R) -> Result<Program, LoadError> {
    let mut loader = Loader::new(source);
    loader.load()?;
    Ok(loader.into_program().unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;

    /// Yields its bytes, then fails instead of reporting end-of-stream.
    struct FailingReader {
        data: Vec<u8>,
        pos: usize,
    }

    impl Read for FailingReader {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            if self.pos < self.data.len() {
                buf[0] = self.data[self.pos];
                self.pos += 1;
                Ok(1)
            } else {
                Err(io::Error::new(io::ErrorKind::BrokenPipe, "source went away"))
            }
        }
    }

    /// Counts how many times it is asked for data.
    struct CountingReader<'a> {
        inner: &'a [u8],
        calls: usize,
    }

    impl Read for CountingReader<'_> {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            self.calls += 1;
            self.inner.read(buf)
        }
    }

    #[test]
    fn test_load_reads_everything() {
        let program = load("+[-]. some words".as_bytes()).unwrap();
        assert_eq!(program.as_bytes(), b"+[-]. some words");
        assert_eq!(program.len(), 16);
        assert_eq!(program.instruction_count(), 5);
    }

    #[test]
    fn test_load_empty_source() {
        let program = load(io::empty()).unwrap();
        assert!(program.is_empty());
    }

    #[test]
    fn test_load_is_idempotent() {
        let mut reader = CountingReader {
            inner: b"++>-",
            calls: 0,
        };
        let mut loader = Loader::new(&mut reader);
        let first = loader.load().unwrap().clone();
        let second = loader.load().unwrap().clone();
        assert_eq!(first, second);
        drop(loader);
        // Four data bytes plus one end-of-stream read, and nothing after.
        assert_eq!(reader.calls, 5);
    }

    #[test]
    fn test_load_surfaces_read_failure() {
        let reader = FailingReader {
            data: b"+++".to_vec(),
            pos: 0,
        };
        match load(reader) {
            Err(LoadError::Read { bytes_read, source }) => {
                assert_eq!(bytes_read, 3);
                assert_eq!(source.kind(), io::ErrorKind::BrokenPipe);
            }
            other => panic!("expected read failure, got {other:?}"),
        }
    }

    #[test]
    fn test_failed_load_caches_nothing() {
        let reader = FailingReader {
            data: b"+".to_vec(),
            pos: 0,
        };
        let mut loader = Loader::new(reader);
        assert!(loader.load().is_err());
        assert!(loader.program().is_none());
    }

    #[test]
    fn test_strip_comments() {
        let program = Program::from("add one + then print . done");
        assert_eq!(program.strip_comments().as_bytes(), b"+.");
    }
}

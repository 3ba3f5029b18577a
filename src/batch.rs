use rayon::prelude::*;
use tracing::debug;

use crate::engine::{EngineConfig, Machine};
use crate::error::Result;
use crate::program::Program;
use crate::validate::validate_with;

/// One program and the bytes it will read.
#[derive(Clone, Debug, Default)]
pub struct Job {
    pub program: Program,
    pub input: Vec<u8>,
}

impl Job {
    pub fn new(program: Program, input: impl Into<Vec<u8>>) -> Self {
        Self {
            program,
            input: input.into(),
        }
    }
}

/// Validate and run every job on its own machine, in parallel.
///
/// Machines share nothing; each gets a fresh tape and writes into its own
/// buffer. Results come back in job order.
pub fn run_batch(jobs: &[Job], config: &EngineConfig) -> Vec<Result<Vec<u8>>> {
    debug!(jobs = jobs.len(), "running batch");
    jobs.par_iter().map(|job| run_job(job, config)).collect()
}

fn run_job(job: &Job, config: &EngineConfig) -> Result<Vec<u8>> {
    validate_with(&job.program, config.validation)?;
    let mut input = &job.input[..];
    let mut output = Vec::new();
    Machine::new(&job.program, config).run(&mut input, &mut output)?;
    Ok(output)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::validate::ValidationError;

    #[test]
    fn test_batch_preserves_order() {
        let jobs = vec![
            Job::new(
                Program::from("--------[-->+++<]>.+++[->+++<]>.[--->+<]>----.+."),
                Vec::new(),
            ),
            Job::new(Program::from(",[.,]"), b"echo\0".to_vec()),
            Job::new(
                Program::from("------[-->+++<]>.--------.+++.------.--------."),
                Vec::new(),
            ),
        ];
        let results = run_batch(&jobs, &EngineConfig::default());
        let outputs: Vec<Vec<u8>> = results.into_iter().map(|r| r.unwrap()).collect();
        assert_eq!(outputs, vec![b"test".to_vec(), b"echo".to_vec(), b"world".to_vec()]);
    }

    #[test]
    fn test_batch_failures_are_isolated() {
        let jobs = vec![
            Job::new(Program::from("]"), Vec::new()),
            Job::new(Program::from("+++."), Vec::new()),
            Job::new(Program::from(","), Vec::new()),
        ];
        let results = run_batch(&jobs, &EngineConfig::default());
        assert!(matches!(
            results[0],
            Err(Error::Validation(ValidationError::UnclosedBeforeOpen { position: 0 }))
        ));
        assert_eq!(results[1].as_ref().unwrap(), &vec![3u8]);
        assert!(matches!(results[2], Err(Error::Execution(_))));
    }

    #[test]
    fn test_empty_batch() {
        assert!(run_batch(&[], &EngineConfig::default()).is_empty());
    }

    #[test]
    fn test_same_program_many_times() {
        let program = Program::from("+[----->+++<]>+.---.+++++++..+++.++++++++.--------.+++.------.--------.");
        let jobs: Vec<Job> = (0..64).map(|_| Job::new(program.clone(), Vec::new())).collect();
        for result in run_batch(&jobs, &EngineConfig::default()) {
            assert_eq!(result.unwrap(), b"helloworld");
        }
    }
}

use std::fs::File;
use std::io::{self, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use bfrun::batch::{Job, run_batch};
use bfrun::engine::{EngineConfig, Machine};
use bfrun::instruction::{Instruction, disassemble};
use bfrun::metrics::{RunStats, comment_bytes, instruction_histogram, max_loop_depth};
use bfrun::program::{Program, load};
use bfrun::tape::TAPE_LENGTH;
use bfrun::validate::{ValidationMode, validate_with};
use clap::{Args, Parser, Subcommand};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "bfrun", about = "Run programs for the eight-instruction tape language")]
struct Cli {
    /// Log at debug level unless RUST_LOG says otherwise.
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Validate and execute a program against stdin and stdout.
    Run {
        /// Program source file.
        file: PathBuf,

        /// Read program input from this file instead of stdin.
        #[arg(long)]
        input: Option<PathBuf>,

        #[command(flatten)]
        engine: EngineArgs,

        /// Print run statistics to stderr after the run, including failed runs.
        #[arg(long)]
        stats: bool,
    },
    /// Validate a program without running it.
    Check {
        file: PathBuf,

        /// Accept programs that end with unclosed loops.
        #[arg(long)]
        lenient: bool,

        /// Print instruction counts.
        #[arg(long)]
        stats: bool,
    },
    /// Print a program with commentary removed.
    Strip {
        file: PathBuf,

        /// One instruction per line with positions, instead of compact code.
        #[arg(long)]
        listing: bool,
    },
    /// Run several programs in parallel with empty input.
    Batch {
        #[arg(required = true)]
        files: Vec<PathBuf>,

        #[command(flatten)]
        engine: EngineArgs,
    },
}

#[derive(Args)]
struct EngineArgs {
    /// Number of tape cells.
    #[arg(long, default_value_t = TAPE_LENGTH)]
    tape_length: usize,

    /// Stop with an error after this many instructions.
    #[arg(long)]
    step_limit: Option<u64>,

    /// Accept programs that end with unclosed loops.
    #[arg(long)]
    lenient: bool,
}

impl EngineArgs {
    fn config(&self) -> Result<EngineConfig> {
        if self.tape_length == 0 {
            bail!("--tape-length must be at least 1");
        }
        Ok(EngineConfig {
            tape_length: self.tape_length,
            step_limit: self.step_limit,
            validation: mode(self.lenient),
        })
    }
}

fn mode(lenient: bool) -> ValidationMode {
    if lenient {
        ValidationMode::Lenient
    } else {
        ValidationMode::Strict
    }
}

fn init_logging(verbose: bool) {
    let default = if verbose { "bfrun=debug" } else { "bfrun=warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(io::stderr)
        .init();
}

fn read_program(path: &Path) -> Result<Program> {
    let file = File::open(path).with_context(|| format!("opening {}", path.display()))?;
    load(BufReader::new(file)).with_context(|| format!("loading {}", path.display()))
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Command::Run {
            file,
            input,
            engine,
            stats,
        } => run(&file, input.as_deref(), &engine, stats),
        Command::Check {
            file,
            lenient,
            stats,
        } => check(&file, lenient, stats),
        Command::Strip { file, listing } => strip(&file, listing),
        Command::Batch { files, engine } => batch(&files, &engine),
    }
}

fn run(file: &Path, input: Option<&Path>, engine: &EngineArgs, stats: bool) -> Result<()> {
    let config = engine.config()?;
    let program = read_program(file)?;
    validate_with(&program, config.validation)
        .with_context(|| format!("validating {}", file.display()))?;

    let stdout = io::stdout();
    let mut output = stdout.lock();
    let mut machine = Machine::new(&program, &config);
    let result = match input {
        Some(path) => {
            let f = File::open(path).with_context(|| format!("opening {}", path.display()))?;
            machine.run(&mut BufReader::new(f), &mut output)
        }
        None => machine.run(&mut io::stdin().lock(), &mut output),
    };
    output.flush().context("flushing output")?;

    if stats {
        print_stats(&machine.stats());
    }
    let run_stats = result.with_context(|| {
        format!(
            "executing {} (ip {}, data pointer {})",
            file.display(),
            machine.instruction_pointer(),
            machine.data_pointer()
        )
    })?;
    info!(steps = run_stats.steps, "done");
    Ok(())
}

fn print_stats(stats: &RunStats) {
    eprintln!("Run statistics:");
    eprintln!("  Steps:          {}", stats.steps);
    eprintln!("  Jumps:          {}", stats.jumps);
    eprintln!("  Bytes read:     {}", stats.bytes_read);
    eprintln!("  Bytes written:  {}", stats.bytes_written);
}

fn check(file: &Path, lenient: bool, stats: bool) -> Result<()> {
    let program = read_program(file)?;
    validate_with(&program, mode(lenient))
        .with_context(|| format!("validating {}", file.display()))?;
    println!("{}: ok", file.display());

    if stats {
        let hist = instruction_histogram(&program);
        println!("  Bytes:          {}", program.len());
        println!("  Commentary:     {}", comment_bytes(&program));
        println!("  Max loop depth: {}", max_loop_depth(&program));
        for instr in Instruction::ALL {
            println!("  {}  {:>8}", instr.byte() as char, hist[instr.index()]);
        }
    }
    Ok(())
}

fn strip(file: &Path, listing: bool) -> Result<()> {
    let program = read_program(file)?;
    let mut out = BufWriter::new(io::stdout().lock());
    if listing {
        out.write_all(disassemble(program.as_bytes()).as_bytes())?;
    } else {
        out.write_all(program.strip_comments().as_bytes())?;
        out.write_all(b"\n")?;
    }
    out.flush()?;
    Ok(())
}

fn batch(files: &[PathBuf], engine: &EngineArgs) -> Result<()> {
    let config = engine.config()?;
    let jobs = files
        .iter()
        .map(|path| Ok(Job::new(read_program(path)?, Vec::new())))
        .collect::<Result<Vec<Job>>>()?;
    debug!(programs = jobs.len(), "loaded batch");

    let results = run_batch(&jobs, &config);

    let mut out = io::stdout().lock();
    let mut failures = 0usize;
    for (path, result) in files.iter().zip(results) {
        match result {
            Ok(bytes) => {
                writeln!(out, "== {}", path.display())?;
                out.write_all(&bytes)?;
                writeln!(out)?;
            }
            Err(e) => {
                failures += 1;
                eprintln!("{}: {e}", path.display());
            }
        }
    }
    out.flush()?;

    if failures > 0 {
        bail!("{failures} of {} programs failed", files.len());
    }
    Ok(())
}

use crate::instruction::{Instruction, is_instruction};
use crate::program::Program;

/// Counters gathered while a machine runs.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RunStats {
    /// Instructions executed, commentary bytes included.
    pub steps: u64,
    /// Loop boundaries where the instruction pointer was redirected.
    pub jumps: u64,
    pub bytes_read: u64,
    pub bytes_written: u64,
}

/// Count each instruction kind in the program.
/// Indexed by [`Instruction::index`].
pub fn instruction_histogram(program: &Program) -> [usize; 8] {
    let mut hist = [0usize; 8];
    for &b in program.as_bytes() {
        if let Some(instr) = Instruction::decode(b) {
            hist[instr.index()] += 1;
        }
    }
    hist
}

/// Number of bytes that are commentary rather than instructions.
pub fn comment_bytes(program: &Program) -> usize {
    program
        .as_bytes()
        .iter()
        .filter(|&&b| !is_instruction(b))
        .count()
}

/// Deepest loop nesting reached anywhere in the program. Stray `]` are
/// ignored rather than driving the depth negative.
pub fn max_loop_depth(program: &Program) -> usize {
    let mut depth = 0usize;
    let mut max = 0usize;
    for &b in program.as_bytes() {
        match Instruction::decode(b) {
            Some(Instruction::LoopStart) => {
                depth += 1;
                max = max.max(depth);
            }
            Some(Instruction::LoopEnd) => depth = depth.saturating_sub(1),
            _ => {}
        }
    }
    max
}

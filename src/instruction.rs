//! The eight-instruction tape language.
//!
//! Programs are plain byte sequences. Only the eight bytes below carry
//! meaning; every other byte is a no-op, which lets commentary live
//! alongside the code.

pub const PLUS: u8 = b'+';
pub const MINUS: u8 = b'-';
pub const GREATER: u8 = b'>';
pub const LESS: u8 = b'<';
pub const DOT: u8 = b'.';
pub const COMMA: u8 = b',';
pub const LBRACKET: u8 = b'[';
pub const RBRACKET: u8 = b']';

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Instruction {
    /// Add one to the current cell, wrapping 255 to 0.
    Increment,
    /// Subtract one from the current cell, wrapping 0 to 255.
    Decrement,
    MoveRight,
    MoveLeft,
    /// Write the current cell to the output stream.
    Output,
    /// Read one byte from the input stream into the current cell.
    Input,
    /// Skip past the matching `]` when the current cell is zero.
    LoopStart,
    /// Return to just after the matching `[` when the current cell is nonzero.
    LoopEnd,
}

impl Instruction {
    /// Every instruction, in histogram order.
    pub const ALL: [Instruction; 8] = [
        Instruction::Increment,
        Instruction::Decrement,
        Instruction::MoveRight,
        Instruction::MoveLeft,
        Instruction::Output,
        Instruction::Input,
        Instruction::LoopStart,
        Instruction::LoopEnd,
    ];

    #[inline(always)]
    pub fn decode(byte: u8) -> Option<Instruction> {
        match byte {
            PLUS => Some(Instruction::Increment),
            MINUS => Some(Instruction::Decrement),
            GREATER => Some(Instruction::MoveRight),
            LESS => Some(Instruction::MoveLeft),
            DOT => Some(Instruction::Output),
            COMMA => Some(Instruction::Input),
            LBRACKET => Some(Instruction::LoopStart),
            RBRACKET => Some(Instruction::LoopEnd),
            _ => None,
        }
    }

    pub fn byte(self) -> u8 {
        match self {
            Instruction::Increment => PLUS,
            Instruction::Decrement => MINUS,
            Instruction::MoveRight => GREATER,
            Instruction::MoveLeft => LESS,
            Instruction::Output => DOT,
            Instruction::Input => COMMA,
            Instruction::LoopStart => LBRACKET,
            Instruction::LoopEnd => RBRACKET,
        }
    }

    /// Position of this instruction in [`Instruction::ALL`].
    pub fn index(self) -> usize {
        self as usize
    }
}

/// Returns true if the byte is one of the eight instructions (as opposed to
/// commentary).
pub fn is_instruction(byte: u8) -> bool {
    Instruction::decode(byte).is_some()
}

/// Render a program one instruction per line, with its position and a
/// mnemonic. Commentary bytes are omitted.
pub fn disassemble(code: &[u8]) -> String {
    let mut out = String::new();
    for (pos, &byte) in code.iter().enumerate() {
        let Some(instr) = Instruction::decode(byte) else {
            continue;
        };
        let mnemonic = match instr {
            Instruction::Increment => "INC",
            Instruction::Decrement => "DEC",
            Instruction::MoveRight => "RIGHT",
            Instruction::MoveLeft => "LEFT",
            Instruction::Output => "OUT",
            Instruction::Input => "IN",
            Instruction::LoopStart => "LOOP",
            Instruction::LoopEnd => "END",
        };
        out.push_str(&format!("{pos:5}  {}  {mnemonic}\n", byte as char));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_constants_match_characters() {
        assert_eq!(PLUS as char, '+');
        assert_eq!(MINUS as char, '-');
        assert_eq!(GREATER as char, '>');
        assert_eq!(LESS as char, '<');
        assert_eq!(DOT as char, '.');
        assert_eq!(COMMA as char, ',');
        assert_eq!(LBRACKET as char, '[');
        assert_eq!(RBRACKET as char, ']');
    }

    #[test]
    fn test_decode_byte_inverse() {
        for instr in Instruction::ALL {
            assert_eq!(Instruction::decode(instr.byte()), Some(instr));
        }
    }

    #[test]
    fn test_index_matches_all_order() {
        for (i, instr) in Instruction::ALL.iter().enumerate() {
            assert_eq!(instr.index(), i);
        }
    }

    #[test]
    fn test_commentary_is_not_instruction() {
        for byte in [b'a', b' ', b'\n', b'#', 0u8, 0xFF] {
            assert!(!is_instruction(byte), "byte {byte:#04x} should be a no-op");
        }
        assert!(is_instruction(b'['));
    }

    #[test]
    fn test_disassemble_skips_commentary() {
        let text = disassemble(b"+ hi [-]");
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 4);
        assert!(lines[0].contains("INC"));
        assert!(lines[1].trim_start().starts_with('5'));
        assert!(lines[1].contains("LOOP"));
        assert!(lines[3].contains("END"));
    }

    #[test]
    fn test_disassemble_empty() {
        assert_eq!(disassemble(b""), "");
        assert_eq!(disassemble(b"just words"), "");
    }
}

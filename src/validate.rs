use thiserror::Error;
use tracing::debug;

use crate::instruction::{LBRACKET, RBRACKET};
use crate::program::Program;

/// How strictly delimiter balance is checked.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ValidationMode {
    /// Every `]` needs an earlier `[` and every `[` needs a later `]`.
    #[default]
    Strict,
    /// Only a `]` with no pending `[` is rejected. Programs that end with
    /// unclosed `[` are accepted, as older interpreters of this language did.
    Lenient,
}

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    /// A `]` appeared with no `[` pending.
    #[error("invalid code: ] is before [ (position {position})")]
    UnclosedBeforeOpen { position: usize },
    /// The program ended with `unclosed` opening delimiters still pending.
    #[error("invalid code: mismatched [] ({unclosed} unclosed)")]
    UnbalancedDelimiters { unclosed: usize },
}

/// Check delimiter balance with [`ValidationMode::Strict`].
pub fn validate(program: &Program) -> Result<(), ValidationError> {
    validate_with(program, ValidationMode::Strict)
}

/// Scan left to right keeping an open-delimiter depth. Fails at the first
/// `]` that would take the depth below zero; in strict mode also fails if
/// the depth is not zero at the end.
pub fn validate_with(program: &Program, mode: ValidationMode) -> Result<(), ValidationError> {
    let result = check_balance(program.as_bytes(), mode);
    match &result {
        Ok(()) => debug!(?mode, "program validated"),
        Err(e) => debug!(?mode, error = %e, "program rejected"),
    }
    result
}

fn check_balance(code: &[u8], mode: ValidationMode) -> Result<(), ValidationError> {
    let mut depth: usize = 0;
    for (position, &byte) in code.iter().enumerate() {
        match byte {
            LBRACKET => depth += 1,
            RBRACKET => {
                if depth == 0 {
                    return Err(ValidationError::UnclosedBeforeOpen { position });
                }
                depth -= 1;
            }
            _ => {}
        }
    }

    if depth > 0 && mode == ValidationMode::Strict {
        return Err(ValidationError::UnbalancedDelimiters { unclosed: depth });
    }
    Ok(())
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    fn bracket_soup() -> impl Strategy<Value = Vec<u8>> {
        prop::collection::vec(prop::sample::select(vec![b'[', b']', b'+', b'x']), 0..64)
    }

    proptest! {
        #[test]
        fn strict_accepts_iff_prefix_nonnegative_and_total_zero(code in bracket_soup()) {
            let mut depth: i64 = 0;
            let mut ok = true;
            for &b in &code {
                match b {
                    b'[' => depth += 1,
                    b']' => depth -= 1,
                    _ => {}
                }
                if depth < 0 {
                    ok = false;
                    break;
                }
            }
            ok = ok && depth == 0;
            prop_assert_eq!(validate(&Program::new(code)).is_ok(), ok);
        }

        #[test]
        fn unequal_counts_always_rejected(code in bracket_soup()) {
            let opens = code.iter().filter(|&&b| b == b'[').count();
            let closes = code.iter().filter(|&&b| b == b']').count();
            prop_assume!(opens != closes);
            prop_assert!(validate(&Program::new(code)).is_err());
        }

        #[test]
        fn strict_implies_lenient(code in bracket_soup()) {
            let program = Program::new(code);
            if validate(&program).is_ok() {
                prop_assert!(validate_with(&program, ValidationMode::Lenient).is_ok());
            }
        }
    }
}

/// Default number of cells.
pub const TAPE_LENGTH: usize = 30_000;

/// A fixed-length row of byte cells with a data pointer.
///
/// Cell arithmetic wraps modulo 256. The pointer never leaves
/// `[0, len)`: a move that would do so is refused and the pointer stays put.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Tape {
    cells: Box<[u8]>,
    pointer: usize,
}

/// A pointer move that would leave the tape. Carries the index the move
/// would have produced, which is `-1` for a step left of cell 0.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct OutOfBounds {
    pub attempted: isize,
}

impl Tape {
    /// A zeroed tape of `len` cells. `len` is clamped to at least one cell.
    pub fn new(len: usize) -> Self {
        Self {
            cells: vec![0u8; len.max(1)].into_boxed_slice(),
            pointer: 0,
        }
    }

    #[inline(always)]
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    #[inline(always)]
    pub fn pointer(&self) -> usize {
        self.pointer
    }

    pub fn cells(&self) -> &[u8] {
        &self.cells
    }

    #[inline(always)]
    pub fn current(&self) -> u8 {
        self.cells[self.pointer]
    }

    #[inline(always)]
    pub fn set_current(&mut self, value: u8) {
        self.cells[self.pointer] = value;
    }

    #[inline(always)]
    pub fn increment(&mut self) {
        let cell = &mut self.cells[self.pointer];
        *cell = cell.wrapping_add(1);
    }

    #[inline(always)]
    pub fn decrement(&mut self) {
        let cell = &mut self.cells[self.pointer];
        *cell = cell.wrapping_sub(1);
    }

    pub fn move_right(&mut self) -> Result<(), OutOfBounds> {
        if self.pointer + 1 >= self.cells.len() {
            return Err(OutOfBounds {
                attempted: self.pointer as isize + 1,
            });
        }
        self.pointer += 1;
        Ok(())
    }

    pub fn move_left(&mut self) -> Result<(), OutOfBounds> {
        if self.pointer == 0 {
            return Err(OutOfBounds { attempted: -1 });
        }
        self.pointer -= 1;
        Ok(())
    }
}

impl Default for Tape {
    fn default() -> Self {
        Self::new(TAPE_LENGTH)
    }
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn increments_wrap_modulo_256(start in any::<u8>(), n in 0usize..1024) {
            let mut tape = Tape::new(1);
            tape.set_current(start);
            for _ in 0..n {
                tape.increment();
            }
            prop_assert_eq!(tape.current() as usize, (start as usize + n) % 256);
        }

        #[test]
        fn decrements_wrap_modulo_256(start in any::<u8>(), n in 0usize..1024) {
            let mut tape = Tape::new(1);
            tape.set_current(start);
            for _ in 0..n {
                tape.decrement();
            }
            let expected = (start as i64 - n as i64).rem_euclid(256);
            prop_assert_eq!(tape.current() as i64, expected);
        }
    }
}

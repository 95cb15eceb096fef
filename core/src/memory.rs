//! Runtime memory: a sparse tape of integer cells, the pointer register,
//! and the named cells used by [`AddressingMode::Named`].

use core::fmt;

use hashbrown::HashMap;

/// How bare identifiers in operation arguments are interpreted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum AddressingMode {
    /// Only the tape is addressable (`{}` and `{N}` references).
    /// Identifiers are rejected.
    #[default]
    Tape,
    /// Identifiers name cells of a separate, string-keyed store.
    /// The tape and pointer remain available.
    Named,
}

/// Memory of a single run.
///
/// Reading a cell that was never written yields 0.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Memory {
    cells: HashMap<i64, i64>,
    named: HashMap<String, i64>,
    pointer: i64,
}

impl Memory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn pointer(&self) -> i64 {
        self.pointer
    }

    /// Moves the pointer by `delta` cells (negative moves left).
    pub fn shift(&mut self, delta: i64) {
        self.pointer = self.pointer.wrapping_add(delta);
    }

    /// Address of the cell `offset` cells away from the pointer.
    pub fn relative(&self, offset: i64) -> i64 {
        self.pointer.wrapping_add(offset)
    }

    pub fn get(&self, address: i64) -> i64 {
        self.cells.get(&address).copied().unwrap_or(0)
    }

    pub fn set(&mut self, address: i64, value: i64) {
        self.cells.insert(address, value);
    }

    pub fn current(&self) -> i64 {
        self.get(self.pointer)
    }

    pub fn named(&self, name: &str) -> i64 {
        self.named.get(name).copied().unwrap_or(0)
    }

    pub fn set_named(&mut self, name: &str, value: i64) {
        match self.named.get_mut(name) {
            Some(cell) => *cell = value,
            None => {
                self.named.insert(name.to_string(), value);
            }
        }
    }

    /// Written tape cells, sorted by address.
    pub fn cells(&self) -> Vec<(i64, i64)> {
        let mut cells: Vec<_> = self.cells.iter().map(|(a, v)| (*a, *v)).collect();
        cells.sort_unstable();
        cells
    }

    /// Written named cells, sorted by name.
    pub fn named_cells(&self) -> Vec<(&str, i64)> {
        let mut cells: Vec<_> = self.named.iter().map(|(n, v)| (n.as_str(), *v)).collect();
        cells.sort_unstable();
        cells
    }
}

/// Compact snapshot used by debug traces: `ptr=1 [0]=3 [1]=-2 x=7`.
impl fmt::Display for Memory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ptr={}", self.pointer)?;
        for (address, value) in self.cells() {
            write!(f, " [{}]={}", address, value)?;
        }
        for (name, value) in self.named_cells() {
            write!(f, " {}={}", name, value)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn unwritten_cells_read_as_zero() {
        let memory = Memory::new();
        assert_eq!(memory.get(0), 0);
        assert_eq!(memory.get(-17), 0);
        assert_eq!(memory.get(i64::MAX), 0);
        assert_eq!(memory.named("anything"), 0);
    }

    #[test]
    fn pointer_starts_at_zero_and_shifts() {
        let mut memory = Memory::new();
        assert_eq!(memory.pointer(), 0);

        memory.shift(3);
        assert_eq!(memory.pointer(), 3);

        memory.shift(-5);
        assert_eq!(memory.pointer(), -2);
        assert_eq!(memory.relative(4), 2);
    }

    #[test]
    fn current_cell_follows_pointer() {
        let mut memory = Memory::new();
        memory.set(0, 10);
        memory.set(1, 20);
        assert_eq!(memory.current(), 10);

        memory.shift(1);
        assert_eq!(memory.current(), 20);
    }

    #[test]
    fn named_cells_are_separate_from_the_tape() {
        let mut memory = Memory::new();
        memory.set_named("x", 5);
        memory.set_named("x", 6);
        assert_eq!(memory.named("x"), 6);
        assert_eq!(memory.current(), 0);
        assert_eq!(memory.named_cells(), vec![("x", 6)]);
    }

    #[test]
    fn display_is_sorted() {
        let mut memory = Memory::new();
        memory.set(2, 1);
        memory.set(-1, 4);
        memory.set_named("b", 2);
        memory.set_named("a", 3);
        memory.shift(2);
        assert_eq!(memory.to_string(), "ptr=2 [-1]=4 [2]=1 a=3 b=2");
    }
}

//! A right-infinite tape stored as a growable vector of symbol ids plus a head index.

use crate::types::{Direction, SymbolId};

/// One tape of a k-tape machine.
///
/// Cells beyond `len()` are logically blank. The head never goes below 0 and never more
/// than one cell past the written region, so a write either overwrites a cell or appends
/// exactly one.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Tape {
    cells: Vec<SymbolId>,
    head: usize,
}

impl Tape {
    /// Creates a tape holding `cells` with the head on the first cell.
    pub fn new(cells: Vec<SymbolId>) -> Self {
        Self { cells, head: 0 }
    }

    pub fn head(&self) -> usize {
        self.head
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn cells(&self) -> &[SymbolId] {
        &self.cells
    }

    /// Returns the symbol under the head, or `blank` if the head is past the written region.
    pub fn read(&self, blank: SymbolId) -> SymbolId {
        self.cells.get(self.head).copied().unwrap_or(blank)
    }

    /// Writes `symbol` under the head, appending a cell when the head sits at `len()`.
    pub fn write(&mut self, symbol: SymbolId) {
        if self.head < self.cells.len() {
            self.cells[self.head] = symbol;
        } else {
            debug_assert_eq!(self.head, self.cells.len());
            self.cells.push(symbol);
        }
    }

    /// Moves the head; a left move at cell 0 leaves the head where it is.
    pub fn shift(&mut self, direction: Direction) {
        match direction {
            Direction::Left => self.head = self.head.saturating_sub(1),
            Direction::Right => self.head += 1,
            Direction::Stay => {}
        }
    }

    /// Renders the tape through `symbol`, bracketing the cell under the head.
    ///
    /// | a | b | c |     head 1  -> "a[b]c"
    /// | a | b | c |     head 3  -> "abc[_]"
    pub fn render(&self, blank: char, symbol: impl Fn(SymbolId) -> char) -> String {
        let mut out = String::with_capacity(self.cells.len() + 3);
        for (i, &cell) in self.cells.iter().enumerate() {
            if i == self.head {
                out.push('[');
                out.push(symbol(cell));
                out.push(']');
            } else {
                out.push(symbol(cell));
            }
        }
        if self.head >= self.cells.len() {
            out.push('[');
            out.push(blank);
            out.push(']');
        }
        out
    }

    /// Returns the written cells as a plain string.
    pub fn contents(&self, symbol: impl Fn(SymbolId) -> char) -> String {
        self.cells.iter().map(|&cell| symbol(cell)).collect()
    }
}

//! # NFA
//!
//! Nondeterministic finite automata as index arenas.
//!
//! ## Overview
//!
//! An [`Nfa`] is an arena of cells addressed by integer id. Each cell carries
//! a [`CharClass`] and a list of out-edges; a cell with an *empty* class is a
//! **dummy** and forwards unconditionally, which is how ε-moves are
//! represented — there is no separate epsilon table. The accepting state is
//! the sentinel id [`FINAL_CELL`] (`-1`), never stored in the arena, so
//! concatenating arenas is a plain offset shift that preserves the sentinel.
//!
//! [`NfaBuilder`] layers the regular operations (concatenation, alternation,
//! closures, bounded repetition) on top of the arena while maintaining the
//! `begin … end → final` chain shape that those operations rely on.
//!
//! ## Usage
//!
//! ```rust
//! use lexis::nfa::NfaBuilder;
//!
//! let mut ab = NfaBuilder::new();
//! ab.append_literal("ab");
//! ab.one_or_more();
//! let nfa = ab.finish();
//! assert!(nfa.matches("abab"));
//! assert!(!nfa.matches("aba"));
//! ```

mod builder;

pub use builder::NfaBuilder;

use smallvec::SmallVec;

use crate::chars::CharClass;
use crate::mark::Mark;

/// The sentinel cell id of the accepting state.
pub const FINAL_CELL: i32 = -1;

/// An NFA cell arena.
///
/// Parallel columns indexed by cell id: character class, out-edges, and an
/// optional per-cell [`Mark`]. Out-edges point at other cells or at
/// [`FINAL_CELL`]. The automaton is mutable while it is being assembled and
/// is conceptually frozen once handed to [`determinize`](crate::dfa::determinize).
#[derive(Debug, Clone)]
pub struct Nfa {
    classes: Vec<CharClass>,
    outs: Vec<SmallVec<[i32; 2]>>,
    marks: Vec<Option<Mark>>,
    begin: i32,
}

impl Default for Nfa {
    fn default() -> Self {
        Self::new()
    }
}

impl Nfa {
    /// An arena with no cells. Its language is the empty string.
    #[must_use]
    pub fn new() -> Self {
        Self {
            classes: Vec::new(),
            outs: Vec::new(),
            marks: Vec::new(),
            begin: FINAL_CELL,
        }
    }

    #[must_use]
    pub fn cell_count(&self) -> usize {
        self.classes.len()
    }

    /// The entry cell, or [`FINAL_CELL`] when the automaton is empty.
    #[must_use]
    pub const fn begin(&self) -> i32 {
        self.begin
    }

    pub fn set_begin(&mut self, cell: i32) {
        self.begin = cell;
    }

    #[must_use]
    pub fn class(&self, cell: u32) -> &CharClass {
        &self.classes[cell as usize]
    }

    #[must_use]
    pub fn outs(&self, cell: u32) -> &[i32] {
        &self.outs[cell as usize]
    }

    #[must_use]
    pub fn mark(&self, cell: u32) -> Option<Mark> {
        self.marks[cell as usize]
    }

    /// Whether `cell` forwards unconditionally (its class is empty).
    #[must_use]
    pub fn is_dummy(&self, cell: u32) -> bool {
        self.classes[cell as usize].is_empty()
    }

    /// Append a consuming cell and return its id.
    pub fn append_cell(&mut self, class: CharClass, outs: impl IntoIterator<Item = i32>) -> i32 {
        let id = self.classes.len() as i32;
        self.classes.push(class);
        self.outs.push(outs.into_iter().collect());
        self.marks.push(None);
        id
    }

    /// Append a dummy cell (empty class) and return its id.
    pub fn append_dummy(&mut self, outs: impl IntoIterator<Item = i32>) -> i32 {
        self.append_cell(CharClass::empty(), outs)
    }

    pub fn set_mark(&mut self, cell: u32, mark: Mark) {
        self.marks[cell as usize] = Some(mark);
    }

    /// Replace the out-edges of `from` with the single edge `to`.
    pub fn link(&mut self, from: i32, to: i32) {
        let outs = &mut self.outs[from as usize];
        outs.clear();
        outs.push(to);
    }

    pub(crate) fn set_outs(&mut self, cell: i32, outs: impl IntoIterator<Item = i32>) {
        self.outs[cell as usize] = outs.into_iter().collect();
    }

    /// Copy every cell of `other` into this arena, shifting out-edges by this
    /// arena's previous size while preserving the final sentinel. Returns the
    /// shift to apply to `other`'s cell ids.
    pub fn extend_from(&mut self, other: &Self) -> i32 {
        let offset = self.classes.len() as i32;
        self.classes.extend(other.classes.iter().cloned());
        self.marks.extend(other.marks.iter().copied());
        for outs in &other.outs {
            self.outs.push(
                outs.iter()
                    .map(|&out| if out == FINAL_CELL { out } else { out + offset })
                    .collect(),
            );
        }
        offset
    }

    /// Remove every cell unreachable from the begin cell and compact the
    /// remaining ids. Returns the number of removed cells.
    pub fn reduce(&mut self) -> usize {
        self.reduce_mapped().0
    }

    /// Like [`Nfa::reduce`], also returning the old-id → new-id mapping.
    pub(crate) fn reduce_mapped(&mut self) -> (usize, Vec<Option<u32>>) {
        let old_count = self.cell_count();
        let mut reachable = vec![false; old_count];
        let mut stack: Vec<u32> = Vec::new();
        if self.begin >= 0 {
            reachable[self.begin as usize] = true;
            stack.push(self.begin as u32);
        }
        while let Some(cell) = stack.pop() {
            for &out in self.outs(cell) {
                if out >= 0 && !reachable[out as usize] {
                    reachable[out as usize] = true;
                    stack.push(out as u32);
                }
            }
        }

        let mut remap: Vec<Option<u32>> = vec![None; old_count];
        let mut kept = 0u32;
        for (old, keep) in reachable.iter().enumerate() {
            if *keep {
                remap[old] = Some(kept);
                kept += 1;
            }
        }
        if kept as usize == old_count {
            return (0, remap);
        }

        let mut old_idx = 0usize;
        self.classes.retain(|_| {
            let keep = reachable[old_idx];
            old_idx += 1;
            keep
        });
        old_idx = 0;
        self.marks.retain(|_| {
            let keep = reachable[old_idx];
            old_idx += 1;
            keep
        });
        old_idx = 0;
        self.outs.retain(|_| {
            let keep = reachable[old_idx];
            old_idx += 1;
            keep
        });
        for outs in &mut self.outs {
            for out in outs.iter_mut() {
                if *out >= 0 {
                    *out = remap[*out as usize]
                        .map(|new| new as i32)
                        .expect("out-edge of a reachable cell targets a reachable cell");
                }
            }
        }
        if self.begin >= 0 {
            self.begin = remap[self.begin as usize]
                .map(|new| new as i32)
                .expect("begin cell is reachable from itself");
        }
        (old_count - kept as usize, remap)
    }

    /// Whether the automaton accepts `input` exactly.
    #[must_use]
    pub fn matches(&self, input: &str) -> bool {
        let units: Vec<u16> = input.encode_utf16().collect();
        self.matches_units(&units, true)
    }

    /// Whether some prefix of `input` (possibly empty) is accepted.
    #[must_use]
    pub fn matches_prefix(&self, input: &str) -> bool {
        let units: Vec<u16> = input.encode_utf16().collect();
        self.matches_units(&units, false)
    }

    /// Set-simulation over raw code units. With `exact`, the whole input must
    /// be accepted; otherwise any accepted prefix counts.
    #[must_use]
    pub fn matches_units(&self, units: &[u16], exact: bool) -> bool {
        let (mut current, mut has_final) = self.closure([self.begin]);
        if !exact && has_final {
            return true;
        }
        for &unit in units {
            let mut seeds: Vec<i32> = Vec::new();
            for &cell in &current {
                if self.class(cell).contains(unit) {
                    seeds.extend_from_slice(self.outs(cell));
                }
            }
            let step = self.closure(seeds);
            current = step.0;
            has_final = step.1;
            if !exact && has_final {
                return true;
            }
            if current.is_empty() && !has_final {
                return false;
            }
        }
        exact && has_final
    }

    /// Expand a seed edge list through dummy cells into the set of consuming
    /// cells it reaches, plus whether the final sentinel was reached.
    fn closure(&self, seeds: impl IntoIterator<Item = i32>) -> (Vec<u32>, bool) {
        let mut visited = vec![false; self.cell_count()];
        let mut stack: Vec<i32> = seeds.into_iter().collect();
        let mut cells = Vec::new();
        let mut has_final = false;
        while let Some(id) = stack.pop() {
            if id == FINAL_CELL {
                has_final = true;
                continue;
            }
            let cell = id as usize;
            if visited[cell] {
                continue;
            }
            visited[cell] = true;
            if self.is_dummy(id as u32) {
                stack.extend_from_slice(&self.outs[cell]);
            } else {
                cells.push(id as u32);
            }
        }
        cells.sort_unstable();
        (cells, has_final)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chars::CharClass;

    #[test]
    fn empty_nfa_matches_empty_string() {
        let nfa = Nfa::new();
        assert!(nfa.matches(""));
        assert!(!nfa.matches("a"));
        assert!(nfa.matches_prefix("a"));
    }

    #[test]
    fn single_cell_matches_one_unit() {
        let mut nfa = Nfa::new();
        let cell = nfa.append_cell(CharClass::single(b'a'.into()), [FINAL_CELL]);
        nfa.set_begin(cell);
        assert!(nfa.matches("a"));
        assert!(!nfa.matches(""));
        assert!(!nfa.matches("aa"));
        assert!(nfa.matches_prefix("ab"));
    }

    #[test]
    fn dummy_forwards_unconditionally() {
        let mut nfa = Nfa::new();
        let consuming = nfa.append_cell(CharClass::digit(), [FINAL_CELL]);
        let dummy = nfa.append_dummy([consuming]);
        nfa.set_begin(dummy);
        assert!(nfa.matches("7"));
        assert!(!nfa.matches("x"));
    }

    #[test]
    fn reduce_drops_unreachable_cells() {
        let mut nfa = Nfa::new();
        let live = nfa.append_cell(CharClass::single(b'a'.into()), [FINAL_CELL]);
        let _dead = nfa.append_cell(CharClass::single(b'b'.into()), [FINAL_CELL]);
        nfa.set_begin(live);
        let removed = nfa.reduce();
        assert_eq!(removed, 1);
        assert_eq!(nfa.cell_count(), 1);
        assert!(nfa.matches("a"));
    }

    #[test]
    fn reduce_remaps_out_edges() {
        let mut nfa = Nfa::new();
        let _dead = nfa.append_cell(CharClass::single(b'x'.into()), [FINAL_CELL]);
        let second = nfa.append_cell(CharClass::single(b'b'.into()), [FINAL_CELL]);
        let first = nfa.append_cell(CharClass::single(b'a'.into()), [second]);
        nfa.set_begin(first);
        assert_eq!(nfa.reduce(), 1);
        assert!(nfa.matches("ab"));
        assert!(!nfa.matches("x"));
    }
}

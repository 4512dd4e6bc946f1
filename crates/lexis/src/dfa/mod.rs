//! # DFA
//!
//! Deterministic automata: construction, minimization, and table compression.
//!
//! ## Overview
//!
//! - [`Dfa`]: the general form — per-cell sorted range tables resolved by
//!   binary search. Produced from an [`Nfa`](crate::nfa::Nfa) by
//!   [`determinize`], which also propagates per-rule marks onto transitions
//!   and reports rule conflicts with a witness input path.
//! - [`minimize`]: partition refinement over a marked DFA; equivalent cells
//!   collapse, marks and final flags survive.
//! - [`CompressedDfa`]: the table-compressed form — a two-level character
//!   class lookup plus deduplicated transition-index rows, giving
//!   constant-time transitions with shared storage.
//!
//! Both forms expose the same [`Automaton`] interface, so the scanning
//! driver and the match helpers work with either.
//!
//! ## Usage
//!
//! ```rust
//! use lexis::dfa::{compress, determinize, minimize, Automaton};
//! use lexis::regexp::parse_pattern;
//!
//! let nfa = parse_pattern("(ab|cd)+")?.finish();
//! let built = determinize(&nfa).expect("no marks involved");
//! let minimized = minimize(&built).expect("no marks to collide");
//! let compressed = compress(&minimized.dfa);
//! assert!(compressed.matches("abcdab"));
//! assert!(!compressed.matches("abc"));
//! # Ok::<(), lexis::PatternError>(())
//! ```

mod compress;
mod minimize;
mod subset;

pub use compress::{compress, CompressedDfa};
pub use minimize::minimize;
pub use subset::determinize;

#[cfg(feature = "serialize")]
use serde::{Deserialize, Serialize};

use crate::chars::CharRange;
use crate::mark::Mark;

/// Transition-table interface shared by [`Dfa`] and [`CompressedDfa`].
///
/// Cell `0` is the entry cell. `transition_index` resolves a code unit to a
/// slot within the cell's transition row; `target` resolves the slot to the
/// successor cell. Keeping the two steps separate lets the scanning driver
/// re-derive the slot of a recorded accepting transition from its
/// predecessor cell.
pub trait Automaton {
    fn cell_count(&self) -> usize;

    /// Slot of the transition taken from `cell` on `unit`, or `None`.
    fn transition_index(&self, cell: u32, unit: u16) -> Option<usize>;

    /// Successor cell of the given transition slot.
    fn target(&self, cell: u32, slot: usize) -> u32;

    fn is_final(&self, cell: u32) -> bool;

    /// Successor cell of `cell` on `unit`, or `None`.
    fn transit(&self, cell: u32, unit: u16) -> Option<u32> {
        self.transition_index(cell, unit)
            .map(|slot| self.target(cell, slot))
    }

    /// Whether the automaton accepts `input` exactly.
    fn matches(&self, input: &str) -> bool {
        let units: Vec<u16> = input.encode_utf16().collect();
        self.matches_units(&units, true)
    }

    /// Whether some prefix of `input` (possibly empty) is accepted.
    fn matches_prefix(&self, input: &str) -> bool {
        let units: Vec<u16> = input.encode_utf16().collect();
        self.matches_units(&units, false)
    }

    /// Run over raw code units. With `exact`, the whole input must be
    /// accepted; otherwise any accepted prefix counts.
    fn matches_units(&self, units: &[u16], exact: bool) -> bool {
        let mut cell = 0u32;
        if !exact && self.is_final(cell) {
            return true;
        }
        for &unit in units {
            let Some(next) = self.transit(cell, unit) else {
                return false;
            };
            if !exact && self.is_final(next) {
                return true;
            }
            cell = next;
        }
        exact && self.is_final(cell)
    }
}

/// A deterministic automaton in general form.
///
/// Cell `i` owns a sorted row of disjoint [`CharRange`]s and a parallel row
/// of successor ids. Adjacent ranges may touch when they lead to different
/// successors (or carry different marks); they are never fused here, so the
/// rows stay aligned with any per-transition side tables.
#[derive(Debug, Clone, Default)]
#[cfg_attr(feature = "serialize", derive(Serialize, Deserialize))]
pub struct Dfa {
    pub(crate) ranges: Vec<Vec<CharRange>>,
    pub(crate) outs: Vec<Vec<u32>>,
    pub(crate) finals: Vec<bool>,
}

impl Dfa {
    /// Transition ranges of `cell`, sorted and disjoint.
    #[must_use]
    pub fn ranges(&self, cell: u32) -> &[CharRange] {
        &self.ranges[cell as usize]
    }

    /// Successor ids parallel to [`Dfa::ranges`].
    #[must_use]
    pub fn targets(&self, cell: u32) -> &[u32] {
        &self.outs[cell as usize]
    }
}

impl Automaton for Dfa {
    fn cell_count(&self) -> usize {
        self.finals.len()
    }

    fn transition_index(&self, cell: u32, unit: u16) -> Option<usize> {
        let row = &self.ranges[cell as usize];
        let idx = row.partition_point(|r| r.end() < unit);
        (idx < row.len() && row[idx].contains(unit)).then_some(idx)
    }

    fn target(&self, cell: u32, slot: usize) -> u32 {
        self.outs[cell as usize][slot]
    }

    fn is_final(&self, cell: u32) -> bool {
        self.finals[cell as usize]
    }
}

/// A DFA with its per-transition mark table, aligned with the transition
/// rows: `marks[i][k]` belongs to the `k`-th transition of cell `i`.
#[derive(Debug, Clone, Default)]
pub struct MarkedDfa {
    pub dfa: Dfa,
    pub marks: Vec<Vec<Option<Mark>>>,
}

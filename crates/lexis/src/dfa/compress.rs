//! DFA table compression.
//!
//! The general DFA resolves a transition by binary search over per-cell
//! range rows. The compressed form trades that for constant-time lookups
//! with shared storage:
//!
//! 1. union all range boundaries into one partition of the code-unit space —
//!    the global character-class alphabet (partitions no cell uses are dead)
//! 2. materialize the 65 536-entry unit → class table, then deduplicate its
//!    256-entry rows behind a 256-byte top level
//! 3. per cell, build the dense class → slot row and deduplicate equal rows
//! 4. concatenate all target rows, remembering each cell's offset

use hashbrown::HashMap;

#[cfg(feature = "serialize")]
use serde::{Deserialize, Serialize};

use crate::chars::{RangeMap, RangePayload};
use crate::mark::MarkConflict;

use super::{Automaton, Dfa};

/// Marker payload for alphabet discovery.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Covered;

impl RangePayload for Covered {
    fn merge_from(&mut self, _other: &Self) -> Result<(), MarkConflict> {
        Ok(())
    }
}

/// A table-compressed DFA.
///
/// `class_of` resolves a code unit through the two-level class table;
/// `transition_indices` maps `(cell, class)` to a slot within the cell's
/// transition row; `transitions` holds the concatenated target rows. `-1`
/// entries mean "dead" at either level.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serialize", derive(Serialize, Deserialize))]
pub struct CompressedDfa {
    top_level: Vec<u8>,
    class_table: Vec<i16>,
    class_count: usize,
    transition_indices: Vec<i16>,
    transition_index_begin: Vec<u32>,
    transitions: Vec<u32>,
    transition_begin: Vec<u32>,
    finals: Vec<bool>,
}

/// Compress a DFA. The result resolves every transition exactly as the
/// input does, including the absence of transitions.
#[must_use]
pub fn compress(dfa: &Dfa) -> CompressedDfa {
    let cells = dfa.cell_count();

    // Alphabet discovery. The partition is deliberately left unoptimized:
    // every boundary some cell introduced must survive as a class boundary.
    let mut alphabet: RangeMap<Covered> = RangeMap::new();
    for cell in 0..cells {
        for &range in dfa.ranges(cell as u32) {
            alphabet
                .add(range, &Covered)
                .expect("marker payloads merge unconditionally");
        }
    }

    // One scratch entry per code unit; freed when this function returns.
    let mut scratch: Vec<i16> = vec![-1; 0x1_0000];
    let mut reps: Vec<u16> = Vec::new();
    for (range, payload) in alphabet.iter_all() {
        if payload.is_none() {
            continue;
        }
        let id = i16::try_from(reps.len()).expect("class alphabet fits the 16-bit table");
        reps.push(range.start());
        for unit in u32::from(range.start())..=u32::from(range.end()) {
            scratch[unit as usize] = id;
        }
    }

    let mut top_level = vec![0u8; 256];
    let mut class_table: Vec<i16> = Vec::new();
    let mut row_ids: HashMap<Vec<i16>, u8, ahash::RandomState> =
        HashMap::with_hasher(ahash::RandomState::new());
    for (high, entry) in top_level.iter_mut().enumerate() {
        let row = &scratch[high << 8..(high << 8) + 256];
        *entry = match row_ids.get(row) {
            Some(&id) => id,
            None => {
                let id = u8::try_from(row_ids.len()).expect("at most 256 distinct rows");
                class_table.extend_from_slice(row);
                row_ids.insert(row.to_vec(), id);
                id
            }
        };
    }

    let mut transition_indices: Vec<i16> = Vec::new();
    let mut transition_index_begin: Vec<u32> = Vec::with_capacity(cells);
    let mut index_row_offsets: HashMap<Vec<i16>, u32, ahash::RandomState> =
        HashMap::with_hasher(ahash::RandomState::new());
    for cell in 0..cells {
        let mut row: Vec<i16> = vec![-1; reps.len()];
        for (class, &rep) in reps.iter().enumerate() {
            if let Some(slot) = dfa.transition_index(cell as u32, rep) {
                row[class] = i16::try_from(slot).expect("transition rows fit the 16-bit index");
            }
        }
        let offset = match index_row_offsets.get(row.as_slice()) {
            Some(&offset) => offset,
            None => {
                let offset = transition_indices.len() as u32;
                transition_indices.extend_from_slice(&row);
                index_row_offsets.insert(row, offset);
                offset
            }
        };
        transition_index_begin.push(offset);
    }

    let mut transitions: Vec<u32> = Vec::new();
    let mut transition_begin: Vec<u32> = Vec::with_capacity(cells);
    for cell in 0..cells {
        transition_begin.push(transitions.len() as u32);
        transitions.extend_from_slice(dfa.targets(cell as u32));
    }

    CompressedDfa {
        top_level,
        class_table,
        class_count: reps.len(),
        transition_indices,
        transition_index_begin,
        transitions,
        transition_begin,
        finals: dfa.finals.clone(),
    }
}

impl CompressedDfa {
    /// Number of character classes in the global alphabet.
    #[must_use]
    pub const fn class_count(&self) -> usize {
        self.class_count
    }

    /// Global character-class index of `unit`, or `None` when no cell
    /// transitions on it.
    #[must_use]
    pub fn class_of(&self, unit: u16) -> Option<usize> {
        let row = usize::from(self.top_level[usize::from(unit >> 8)]);
        let id = self.class_table[(row << 8) | usize::from(unit & 0xFF)];
        usize::try_from(id).ok()
    }
}

impl Automaton for CompressedDfa {
    fn cell_count(&self) -> usize {
        self.finals.len()
    }

    fn transition_index(&self, cell: u32, unit: u16) -> Option<usize> {
        let class = self.class_of(unit)?;
        let base = self.transition_index_begin[cell as usize] as usize;
        let slot = self.transition_indices[base + class];
        usize::try_from(slot).ok()
    }

    fn target(&self, cell: u32, slot: usize) -> u32 {
        self.transitions[self.transition_begin[cell as usize] as usize + slot]
    }

    fn is_final(&self, cell: u32) -> bool {
        self.finals[cell as usize]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dfa::determinize;
    use crate::regexp::parse_pattern;

    fn compressed(pattern: &str) -> (Dfa, CompressedDfa) {
        let dfa = determinize(&parse_pattern(pattern).expect("pattern parses").finish())
            .expect("no conflicts")
            .dfa;
        let compressed = compress(&dfa);
        (dfa, compressed)
    }

    #[test]
    fn transit_agrees_everywhere() {
        for pattern in ["(a|b)*abb", r"[a-f]+\d{2}", r"\w+|\s+"] {
            let (dfa, zipped) = compressed(pattern);
            for cell in 0..dfa.cell_count() as u32 {
                for unit in 0..=u16::MAX {
                    assert_eq!(
                        dfa.transit(cell, unit),
                        zipped.transit(cell, unit),
                        "{pattern}: cell {cell}, unit {unit:#06x}"
                    );
                }
            }
        }
    }

    #[test]
    fn matching_is_preserved() {
        let (dfa, zipped) = compressed(r"(0|[1-9]\d*)(\.\d+)?");
        for input in ["0", "42", "3.14", "10.0", "", "01", ".5", "3."] {
            assert_eq!(
                dfa.matches(input),
                zipped.matches(input),
                "disagrees on {input:?}"
            );
        }
    }

    #[test]
    fn class_table_is_row_deduplicated() {
        let (_, zipped) = compressed("[a-z]+");
        assert_eq!(zipped.top_level.len(), 256);
        assert_eq!(zipped.class_table.len() % 256, 0);
        // Almost every high byte shares the all-dead row.
        assert!(zipped.class_table.len() <= 2 * 256);
    }

    #[test]
    fn dead_units_have_no_class() {
        let (_, zipped) = compressed("[a-c]");
        assert!(zipped.class_of(b'a'.into()).is_some());
        assert_eq!(zipped.class_of(b'z'.into()), None);
        assert_eq!(zipped.class_of(0x4E00), None);
    }

    #[test]
    fn shared_rows_across_equivalent_cells() {
        // Both `a…` chains transition on the same classes, so their
        // transition-index rows deduplicate.
        let (dfa, zipped) = compressed("aaaa");
        assert!(zipped.transition_indices.len() < dfa.cell_count() * zipped.class_count());
    }
}

//! DFA minimization by partition refinement.
//!
//! Cells start partitioned into final and non-final classes. Each round
//! re-keys every cell by its current class, the class labels reachable
//! through its transitions (as a canonical [`RangeMap`], so differently
//! split but equivalent range rows compare equal), and its per-transition
//! mark row. Classes whose members disagree split; a fixed point is the
//! coarsest mark-respecting equivalence.

use hashbrown::HashMap;

use crate::chars::{RangeMap, RangePayload};
use crate::error::{ConflictPath, RuleConflictError};
use crate::mark::{merge_marks, Mark, MarkConflict};

use super::{Automaton, Dfa, MarkedDfa};

/// A partition-class label used as a [`RangeMap`] payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
struct Group(u32);

impl RangePayload for Group {
    fn merge_from(&mut self, other: &Self) -> Result<(), MarkConflict> {
        // A cell's ranges are disjoint, so one refinement map never sees two
        // labels on the same sub-range.
        debug_assert_eq!(self.0, other.0);
        Ok(())
    }
}

type RefinementKey = (u32, RangeMap<Group>, Vec<Option<Mark>>);

/// Minimize a marked DFA.
///
/// The begin cell's class is renumbered to cell `0`. A class is final iff
/// its members are (the initial partition guarantees they agree). When no
/// two cells are equivalent the input is returned unchanged.
///
/// # Errors
///
/// Returns [`RuleConflictError`] if merging the mark rows of an equivalence
/// class fails; the refinement key includes mark rows, so this indicates
/// marks that cannot coexist at all.
pub fn minimize(input: &MarkedDfa) -> Result<MarkedDfa, RuleConflictError> {
    let dfa = &input.dfa;
    let n = dfa.cell_count();

    let has_final = dfa.finals.iter().any(|&f| f);
    let has_nonfinal = dfa.finals.iter().any(|&f| !f);
    let mut count = u32::from(has_final) + u32::from(has_nonfinal);
    let mut group: Vec<u32> = (0..n)
        .map(|cell| u32::from(dfa.finals[cell] && has_nonfinal))
        .collect();

    loop {
        let mut table: HashMap<RefinementKey, u32, ahash::RandomState> =
            HashMap::with_hasher(ahash::RandomState::new());
        let mut next = vec![0u32; n];
        let mut next_count = 0u32;
        for cell in 0..n {
            let mut induced: RangeMap<Group> = RangeMap::new();
            for (slot, &range) in dfa.ranges(cell as u32).iter().enumerate() {
                let label = Group(group[dfa.target(cell as u32, slot) as usize]);
                induced
                    .add(range, &label)
                    .expect("group labels merge unconditionally");
            }
            induced.optimize();
            let key = (group[cell], induced, input.marks[cell].clone());
            let id = *table.entry(key).or_insert_with(|| {
                let id = next_count;
                next_count += 1;
                id
            });
            next[cell] = id;
        }
        if next_count == count {
            break;
        }
        count = next_count;
        group = next;
    }

    if count as usize == n {
        return Ok(input.clone());
    }

    // Deterministic relabel in first-occurrence order; cell 0 lands in class 0.
    let mut relabel: Vec<Option<u32>> = vec![None; count as usize];
    let mut members: Vec<Vec<u32>> = Vec::with_capacity(count as usize);
    for cell in 0..n {
        let old = group[cell] as usize;
        let new = match relabel[old] {
            Some(new) => new,
            None => {
                let new = members.len() as u32;
                relabel[old] = Some(new);
                members.push(Vec::new());
                new
            }
        };
        members[new as usize].push(cell as u32);
    }
    let new_label = |cell: u32| -> u32 {
        relabel[group[cell as usize] as usize].expect("every class was relabelled")
    };

    let mut out = Dfa::default();
    let mut out_marks: Vec<Vec<Option<Mark>>> = Vec::with_capacity(members.len());
    for class in &members {
        let rep = class[0];
        out.ranges.push(dfa.ranges(rep).to_vec());
        out.outs
            .push(dfa.targets(rep).iter().map(|&t| new_label(t)).collect());
        out.finals.push(dfa.finals[rep as usize]);

        let mut row = input.marks[rep as usize].clone();
        for &member in &class[1..] {
            for (slot, &mark) in input.marks[member as usize].iter().enumerate() {
                row[slot] = merge_marks(row[slot], mark).map_err(|conflict| RuleConflictError {
                    first: conflict.first,
                    second: conflict.second,
                    path: ConflictPath(Vec::new()),
                })?;
            }
        }
        out_marks.push(row);
    }

    Ok(MarkedDfa {
        dfa: out,
        marks: out_marks,
    })
}

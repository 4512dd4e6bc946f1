//! Subset construction: NFA cell sets become DFA cells.
//!
//! A DFA cell corresponds to a set of consuming NFA cells closed under dummy
//! traversal, memoised by its sorted member list plus a has-final flag.
//! Marks met on the dummy paths are merged into the transition being built;
//! a failed merge aborts construction with the range path that leads to it.

use std::collections::VecDeque;

use hashbrown::HashMap;
use smallvec::SmallVec;

use crate::chars::{CharRange, RangeMap, RangePayload};
use crate::error::{ConflictPath, RuleConflictError};
use crate::mark::{merge_marks, Mark, MarkConflict};
use crate::nfa::{Nfa, FINAL_CELL};

use super::{Dfa, MarkedDfa};

/// A set of consuming NFA cells closed under dummy traversal.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct CellSet {
    /// Sorted, deduplicated member ids, so equality and hashing are
    /// independent of discovery order.
    members: SmallVec<[u32; 8]>,
    has_final: bool,
}

impl CellSet {
    fn union_with(&mut self, other: &Self) {
        self.has_final |= other.has_final;
        if other.members.is_empty() {
            return;
        }
        let mut merged = SmallVec::with_capacity(self.members.len() + other.members.len());
        let (mut i, mut j) = (0, 0);
        while i < self.members.len() && j < other.members.len() {
            match self.members[i].cmp(&other.members[j]) {
                std::cmp::Ordering::Less => {
                    merged.push(self.members[i]);
                    i += 1;
                }
                std::cmp::Ordering::Greater => {
                    merged.push(other.members[j]);
                    j += 1;
                }
                std::cmp::Ordering::Equal => {
                    merged.push(self.members[i]);
                    i += 1;
                    j += 1;
                }
            }
        }
        merged.extend_from_slice(&self.members[i..]);
        merged.extend_from_slice(&other.members[j..]);
        self.members = merged;
    }
}

/// The payload gathered per character range while expanding one DFA cell:
/// the successor cell set and the mark merged along the dummy paths.
#[derive(Debug, Clone, PartialEq)]
struct EdgePayload {
    targets: CellSet,
    mark: Option<Mark>,
}

impl RangePayload for EdgePayload {
    fn merge_from(&mut self, other: &Self) -> Result<(), MarkConflict> {
        self.mark = merge_marks(self.mark, other.mark)?;
        self.targets.union_with(&other.targets);
        Ok(())
    }
}

/// Expand seed edges through dummy cells with an explicit work stack,
/// collecting the consuming cells reached and merging the marks of every
/// traversed dummy.
fn close(nfa: &Nfa, seeds: &[i32]) -> Result<(CellSet, Option<Mark>), MarkConflict> {
    let mut visited = vec![false; nfa.cell_count()];
    let mut stack: SmallVec<[i32; 16]> = SmallVec::from_slice(seeds);
    let mut members: SmallVec<[u32; 8]> = SmallVec::new();
    let mut has_final = false;
    let mut mark = None;
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
        if nfa.is_dummy(id as u32) {
            mark = merge_marks(mark, nfa.mark(id as u32))?;
            stack.extend_from_slice(nfa.outs(id as u32));
        } else {
            members.push(id as u32);
        }
    }
    members.sort_unstable();
    Ok((CellSet { members, has_final }, mark))
}

/// Convert an NFA to a DFA with per-transition marks.
///
/// # Errors
///
/// Returns [`RuleConflictError`] when two incompatible marks meet on the same
/// transition; the error carries the character-range path from the entry
/// cell to the collision.
pub fn determinize(nfa: &Nfa) -> Result<MarkedDfa, RuleConflictError> {
    let (seed, _) = close(nfa, &[nfa.begin()])
        .map_err(|conflict| witness(&[], 0, None, conflict))?;

    let mut builder = Builder::default();
    builder.ids.insert(seed.clone(), 0);
    builder.alloc(seed, None);

    while let Some(id) = builder.queue.pop_front() {
        let members = builder.sets[id as usize].members.clone();
        let mut edges: RangeMap<EdgePayload> = RangeMap::new();
        for &cell in &members {
            let (targets, mark) = close(nfa, nfa.outs(cell)).map_err(|conflict| {
                let blame = nfa.class(cell).ranges().first().copied();
                witness(&builder.intro, id, blame, conflict)
            })?;
            let payload = EdgePayload { targets, mark };
            for &range in nfa.class(cell).ranges() {
                edges
                    .add(range, &payload)
                    .map_err(|e| witness(&builder.intro, id, Some(e.segment), e.conflict))?;
            }
        }
        edges.optimize();

        for (range, payload) in edges.iter() {
            let target = match builder.ids.get(&payload.targets) {
                Some(&target) => target,
                None => {
                    let target = builder.alloc(payload.targets.clone(), Some((id, range)));
                    builder.ids.insert(payload.targets.clone(), target);
                    target
                }
            };
            builder.dfa.ranges[id as usize].push(range);
            builder.dfa.outs[id as usize].push(target);
            builder.marks[id as usize].push(payload.mark);
        }
    }

    Ok(MarkedDfa {
        dfa: builder.dfa,
        marks: builder.marks,
    })
}

/// Work-in-progress state of one determinization run.
struct Builder {
    ids: HashMap<CellSet, u32, ahash::RandomState>,
    sets: Vec<CellSet>,
    /// For every allocated cell, the (predecessor, range) pair that first
    /// introduced it; walking these backwards yields a conflict witness.
    intro: Vec<Option<(u32, CharRange)>>,
    dfa: Dfa,
    marks: Vec<Vec<Option<Mark>>>,
    queue: VecDeque<u32>,
}

impl Default for Builder {
    fn default() -> Self {
        Self {
            ids: HashMap::with_hasher(ahash::RandomState::new()),
            sets: Vec::new(),
            intro: Vec::new(),
            dfa: Dfa::default(),
            marks: Vec::new(),
            queue: VecDeque::new(),
        }
    }
}

impl Builder {
    fn alloc(&mut self, set: CellSet, from: Option<(u32, CharRange)>) -> u32 {
        let id = self.sets.len() as u32;
        self.dfa.finals.push(set.has_final);
        self.dfa.ranges.push(Vec::new());
        self.dfa.outs.push(Vec::new());
        self.marks.push(Vec::new());
        self.sets.push(set);
        self.intro.push(from);
        self.queue.push_back(id);
        id
    }
}

/// Reconstruct the range path from the entry cell to `cell`, ending with the
/// range the conflict surfaced on.
fn witness(
    intro: &[Option<(u32, CharRange)>],
    cell: u32,
    last: Option<CharRange>,
    conflict: MarkConflict,
) -> RuleConflictError {
    let mut path: Vec<CharRange> = last.into_iter().collect();
    let mut cur = cell as usize;
    while let Some(Some((pred, range))) = intro.get(cur) {
        path.push(*range);
        cur = *pred as usize;
    }
    path.reverse();
    RuleConflictError {
        first: conflict.first,
        second: conflict.second,
        path: ConflictPath(path),
    }
}

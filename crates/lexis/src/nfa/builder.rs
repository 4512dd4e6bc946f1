use crate::chars::CharClass;
use crate::mark::Mark;

use super::{Nfa, FINAL_CELL};

/// Incremental NFA assembly maintaining the chain shape
///
/// ```text
/// (begin) --…--> (end) --> final
/// ```
///
/// where `end` is the unique cell whose single out-edge is the final
/// sentinel. The empty fragment (`end == FINAL_CELL`) matches the empty
/// string. All structural operations re-establish this shape, so fragments
/// compose freely: concatenation extends `end`, alternation and the closure
/// operators wrap the current fragment in dummy cells.
#[derive(Debug, Clone)]
pub struct NfaBuilder {
    nfa: Nfa,
    end: i32,
}

impl Default for NfaBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl NfaBuilder {
    /// The empty fragment.
    #[must_use]
    pub fn new() -> Self {
        Self {
            nfa: Nfa::new(),
            end: FINAL_CELL,
        }
    }

    /// Whether no cell has been appended yet (the fragment matches ε).
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.end == FINAL_CELL
    }

    #[must_use]
    pub const fn as_nfa(&self) -> &Nfa {
        &self.nfa
    }

    /// Append a consuming cell for one code unit.
    pub fn append_unit(&mut self, unit: u16) {
        self.append_class(CharClass::single(unit));
    }

    /// Append a consuming cell for a character class.
    pub fn append_class(&mut self, class: CharClass) {
        let cell = self.nfa.append_cell(class, [FINAL_CELL]);
        self.attach(cell, cell);
    }

    /// Append one consuming cell per UTF-16 code unit of `text`.
    pub fn append_literal(&mut self, text: &str) {
        for unit in text.encode_utf16() {
            self.append_unit(unit);
        }
    }

    /// Concatenate another fragment after the current one.
    pub fn append(&mut self, other: Self) {
        if other.is_empty() {
            return;
        }
        let offset = self.nfa.extend_from(&other.nfa);
        self.attach(other.nfa.begin() + offset, other.end + offset);
    }

    /// Append an n-ary alternation of `branches`.
    ///
    /// A single branch degenerates to plain concatenation. Otherwise a new
    /// dummy fans out to every branch begin and every branch end is relinked
    /// to a shared closing dummy. An empty branch contributes a direct bypass
    /// edge, making the whole group optional.
    pub fn append_branch(&mut self, branches: Vec<Self>) {
        if branches.is_empty() {
            return;
        }
        if branches.len() == 1 {
            let branch = branches
                .into_iter()
                .next()
                .expect("exactly one branch is present");
            self.append(branch);
            return;
        }

        let fork = self.nfa.append_dummy([]);
        let mut begins: Vec<Option<i32>> = Vec::with_capacity(branches.len());
        let mut ends: Vec<i32> = Vec::new();
        for branch in branches {
            if branch.is_empty() {
                begins.push(None);
                continue;
            }
            let offset = self.nfa.extend_from(&branch.nfa);
            begins.push(Some(branch.nfa.begin() + offset));
            ends.push(branch.end + offset);
        }
        let join = self.nfa.append_dummy([FINAL_CELL]);
        self.nfa
            .set_outs(fork, begins.into_iter().map(|b| b.unwrap_or(join)));
        for end in ends {
            self.nfa.link(end, join);
        }
        self.attach(fork, join);
    }

    /// Kleene plus: at least one repetition of the current fragment.
    pub fn one_or_more(&mut self) {
        if self.is_empty() {
            return;
        }
        let begin = self.nfa.begin();
        let back = self.nfa.append_dummy([]);
        let exit = self.nfa.append_dummy([FINAL_CELL]);
        self.nfa.set_outs(back, [begin, exit]);
        self.nfa.link(self.end, back);
        self.end = exit;
    }

    /// Zero or one repetition of the current fragment.
    pub fn optional(&mut self) {
        if self.is_empty() {
            return;
        }
        let begin = self.nfa.begin();
        let entry = self.nfa.append_dummy([]);
        let exit = self.nfa.append_dummy([FINAL_CELL]);
        self.nfa.set_outs(entry, [begin, exit]);
        self.nfa.link(self.end, exit);
        self.nfa.set_begin(entry);
        self.end = exit;
    }

    /// Kleene star: any number of repetitions, including none.
    pub fn zero_or_more(&mut self) {
        if self.is_empty() {
            return;
        }
        let begin = self.nfa.begin();
        let entry = self.nfa.append_dummy([]);
        let exit = self.nfa.append_dummy([FINAL_CELL]);
        self.nfa.set_outs(entry, [begin, exit]);
        self.nfa.link(self.end, entry);
        self.nfa.set_begin(entry);
        self.end = exit;
    }

    /// Bounded repetition: between `lo` and `hi` copies of the current
    /// fragment. `repeat(0, 0)` resets the fragment to ε.
    ///
    /// # Panics
    ///
    /// Panics when `lo > hi`.
    pub fn repeat(&mut self, lo: u32, hi: u32) {
        assert!(lo <= hi, "repetition bounds are inverted: {lo} > {hi}");
        if self.is_empty() {
            return;
        }
        match (lo, hi) {
            (0, 0) => *self = Self::new(),
            (1, 1) => {}
            (0, 1) => self.optional(),
            _ => {
                let fragment = std::mem::take(self);
                for _ in 0..lo {
                    self.append(fragment.clone());
                }
                for _ in lo..hi {
                    let mut copy = fragment.clone();
                    copy.optional();
                    self.append(copy);
                }
            }
        }
    }

    /// Unbounded repetition with a lower bound: `lo` or more copies.
    pub fn repeat_at_least(&mut self, lo: u32) {
        if self.is_empty() {
            return;
        }
        match lo {
            0 => self.zero_or_more(),
            1 => self.one_or_more(),
            _ => {
                let fragment = std::mem::take(self);
                for _ in 0..lo {
                    self.append(fragment.clone());
                }
                let mut tail = fragment;
                tail.zero_or_more();
                self.append(tail);
            }
        }
    }

    /// Remove cells unreachable from the begin cell. Returns how many were
    /// removed.
    pub fn reduce(&mut self) -> usize {
        let (removed, remap) = self.nfa.reduce_mapped();
        if self.end >= 0 {
            self.end = remap[self.end as usize]
                .map(|new| new as i32)
                .expect("the end cell stays reachable");
        }
        removed
    }

    /// Freeze the fragment into an [`Nfa`].
    #[must_use]
    pub fn finish(self) -> Nfa {
        self.nfa
    }

    /// Freeze the fragment as a lexer rule: a marked dummy is inserted
    /// between the end cell and the final sentinel, so subset construction
    /// picks the mark up on every transition that completes a match.
    #[must_use]
    pub fn finish_marked(mut self, mark: Mark) -> Nfa {
        let tag = self.nfa.append_dummy([FINAL_CELL]);
        self.nfa.set_mark(tag as u32, mark);
        if self.end == FINAL_CELL {
            self.nfa.set_begin(tag);
        } else {
            self.nfa.link(self.end, tag);
        }
        self.nfa
    }

    /// Wire a newly appended sub-fragment `(begin, end)` into the chain.
    fn attach(&mut self, begin: i32, end: i32) {
        if self.end == FINAL_CELL {
            self.nfa.set_begin(begin);
        } else {
            self.nfa.link(self.end, begin);
        }
        self.end = end;
    }
}

use smallvec::SmallVec;

use crate::dfa::{Automaton, CompressedDfa, Dfa};

use super::scanner::Scanner;

/// The transition table of one lexing state, in whichever form the build
/// options selected.
#[derive(Debug, Clone)]
pub enum DfaTable {
    General(Dfa),
    Compressed(CompressedDfa),
}

impl Automaton for DfaTable {
    fn cell_count(&self) -> usize {
        match self {
            Self::General(dfa) => dfa.cell_count(),
            Self::Compressed(dfa) => dfa.cell_count(),
        }
    }

    fn transition_index(&self, cell: u32, unit: u16) -> Option<usize> {
        match self {
            Self::General(dfa) => dfa.transition_index(cell, unit),
            Self::Compressed(dfa) => dfa.transition_index(cell, unit),
        }
    }

    fn target(&self, cell: u32, slot: usize) -> u32 {
        match self {
            Self::General(dfa) => dfa.target(cell, slot),
            Self::Compressed(dfa) => dfa.target(cell, slot),
        }
    }

    fn is_final(&self, cell: u32) -> bool {
        match self {
            Self::General(dfa) => dfa.is_final(cell),
            Self::Compressed(dfa) => dfa.is_final(cell),
        }
    }
}

/// The compiled automaton of one lexing state: a transition table plus the
/// per-transition action ids (`0` = no action).
#[derive(Debug, Clone)]
pub struct CompiledState {
    table: DfaTable,
    actions: Vec<SmallVec<[u32; 4]>>,
}

impl CompiledState {
    pub(crate) fn new(table: DfaTable, actions: Vec<SmallVec<[u32; 4]>>) -> Self {
        Self { table, actions }
    }

    #[must_use]
    pub const fn table(&self) -> &DfaTable {
        &self.table
    }

    /// Action id of the given transition; `0` means none.
    #[must_use]
    pub fn action(&self, cell: u32, slot: usize) -> u32 {
        self.actions[cell as usize][slot]
    }
}

/// An immutable compiled lexer: one automaton per lexing state.
///
/// State `0` is the initial state and always present. Compiled lexers are
/// freely shareable; every scan runs in its own [`Scanner`] session.
#[derive(Debug, Clone)]
pub struct CompiledLexer {
    states: Vec<Option<CompiledState>>,
}

impl CompiledLexer {
    pub(crate) fn new(states: Vec<Option<CompiledState>>) -> Self {
        Self { states }
    }

    /// Number of lexing-state slots (some may be empty).
    #[must_use]
    pub fn state_count(&self) -> usize {
        self.states.len()
    }

    /// The automaton of lexing state `id`, if that state has rules.
    #[must_use]
    pub fn state(&self, id: usize) -> Option<&CompiledState> {
        self.states.get(id).and_then(Option::as_ref)
    }

    /// Start a scan over `input`, dispatching matched rules to `callback`.
    pub fn scanner<T, F>(&self, input: &str, callback: F) -> Scanner<'_, T, F>
    where
        F: FnMut(u32, &mut super::ScanCtx<'_, T>),
    {
        self.scanner_units(input.encode_utf16().collect(), callback)
    }

    /// Start a scan over raw code units.
    pub fn scanner_units<T, F>(&self, units: Vec<u16>, callback: F) -> Scanner<'_, T, F>
    where
        F: FnMut(u32, &mut super::ScanCtx<'_, T>),
    {
        Scanner::new(self, units, callback)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dfa::{compress, determinize};
    use crate::regexp::parse_pattern;

    #[test]
    fn table_forms_delegate_identically() {
        let dfa = determinize(&parse_pattern("[a-c]+d?").expect("pattern parses").finish())
            .expect("no conflicts")
            .dfa;
        let general = DfaTable::General(dfa.clone());
        let compressed = DfaTable::Compressed(compress(&dfa));
        assert_eq!(general.cell_count(), compressed.cell_count());
        for cell in 0..general.cell_count() as u32 {
            assert_eq!(general.is_final(cell), compressed.is_final(cell));
            for unit in [b'a'.into(), b'c'.into(), b'd'.into(), b'z'.into(), 0u16, u16::MAX] {
                assert_eq!(
                    general.transition_index(cell, unit),
                    compressed.transition_index(cell, unit),
                    "cell {cell}, unit {unit}"
                );
                assert_eq!(general.transit(cell, unit), compressed.transit(cell, unit));
            }
        }
    }

    #[test]
    fn missing_states_are_none() {
        let lexer = crate::lexer::LexerBuilder::new()
            .rule("a", Some(1))
            .rule_in(2, "b", Some(2))
            .build()
            .expect("sparse states build");
        assert_eq!(lexer.state_count(), 3);
        assert!(lexer.state(0).is_some());
        assert!(lexer.state(1).is_none());
        assert!(lexer.state(2).is_some());
        assert!(lexer.state(9).is_none());
    }
}

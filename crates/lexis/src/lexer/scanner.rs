use std::marker::PhantomData;
use std::ops::Range;

use compact_str::CompactString;

use crate::dfa::Automaton;
use crate::error::ScanError;

use super::compiled::{CompiledLexer, CompiledState};

/// The session handle passed to the action callback.
///
/// An action may read the matched text, switch the lexing state for the
/// following tokens, and emit at most one value; emitting ends the current
/// [`Scanner::lex`] call with that value.
pub struct ScanCtx<'s, T> {
    units: &'s [u16],
    start: usize,
    end: usize,
    switch_to: &'s mut usize,
    emitted: &'s mut Option<T>,
}

impl<T> ScanCtx<'_, T> {
    /// Code units of the current match.
    #[must_use]
    pub fn matched_units(&self) -> &[u16] {
        &self.units[self.start..self.end]
    }

    /// Text of the current match. Unpaired surrogates are replaced.
    #[must_use]
    pub fn matched_text(&self) -> CompactString {
        CompactString::from(String::from_utf16_lossy(self.matched_units()))
    }

    /// Half-open input range of the current match.
    #[must_use]
    pub fn range(&self) -> Range<usize> {
        self.start..self.end
    }

    /// Switch the lexing state, effective immediately after this action.
    pub fn switch_state(&mut self, state: usize) {
        *self.switch_to = state;
    }

    /// Emit a value; the surrounding [`Scanner::lex`] call returns it.
    pub fn emit(&mut self, value: T) {
        *self.emitted = Some(value);
    }
}

/// One longest-match scan over one input.
///
/// The scanner sweeps the current state's automaton greedily, recording the
/// most recent accepting position; when the automaton gets stuck it
/// backtracks there, dispatches the transition's action, and restarts at the
/// entry cell. Sessions are cheap and single-use; the compiled lexer they
/// borrow is shareable.
pub struct Scanner<'l, T, F> {
    lexer: &'l CompiledLexer,
    units: Vec<u16>,
    callback: F,
    pos: usize,
    last_match: usize,
    state: usize,
    _values: PhantomData<fn() -> T>,
}

impl<'l, T, F> Scanner<'l, T, F>
where
    F: FnMut(u32, &mut ScanCtx<'_, T>),
{
    pub(crate) fn new(lexer: &'l CompiledLexer, units: Vec<u16>, callback: F) -> Self {
        Self {
            lexer,
            units,
            callback,
            pos: 0,
            last_match: 0,
            state: 0,
            _values: PhantomData,
        }
    }

    /// Current position, in code units.
    #[must_use]
    pub const fn position(&self) -> usize {
        self.pos
    }

    /// Current lexing state id.
    #[must_use]
    pub const fn state(&self) -> usize {
        self.state
    }

    /// Code units not yet consumed by a completed token.
    #[must_use]
    pub fn remaining(&self) -> &[u16] {
        &self.units[self.last_match..]
    }

    /// Produce the next emitted value, or `None` at the end of the input.
    ///
    /// Rules whose actions emit nothing (or rules without an action) consume
    /// their matches silently; the scan continues until some action emits or
    /// the input ends.
    ///
    /// # Errors
    ///
    /// [`ScanError::Mismatch`] when no rule of the current state accepts any
    /// prefix at the current position; [`ScanError::UnknownState`] when an
    /// action switched to a state without rules.
    pub fn lex(&mut self) -> Result<Option<T>, ScanError> {
        let end = self.units.len();
        let mut program = self.current()?;
        let mut cell: u32 = 0;
        let mut last_accept: Option<(usize, u32)> = None;

        if self.pos >= end {
            return Ok(None);
        }
        loop {
            let slot = if self.pos == end {
                None
            } else {
                program.table().transition_index(cell, self.units[self.pos])
            };
            let Some(slot) = slot else {
                // Stuck: backtrack to the last accepting position. The
                // accepting transition was recorded at its predecessor cell
                // so the slot (and with it the action) is recomputable.
                let Some((accept_pos, accept_cell)) = last_accept.take() else {
                    return Err(ScanError::Mismatch {
                        start: self.last_match,
                        end: self.pos,
                    });
                };
                self.pos = accept_pos;
                cell = accept_cell;
                let slot = program
                    .table()
                    .transition_index(cell, self.units[self.pos])
                    .expect("a recorded accepting transition stays valid");
                self.pos += 1;
                let action = program.action(cell, slot);
                cell = 0;
                let token_start = self.last_match;
                self.last_match = self.pos;
                if action != 0 {
                    let mut emitted: Option<T> = None;
                    let mut switch_to = self.state;
                    let mut ctx = ScanCtx {
                        units: &self.units,
                        start: token_start,
                        end: self.pos,
                        switch_to: &mut switch_to,
                        emitted: &mut emitted,
                    };
                    (self.callback)(action, &mut ctx);
                    self.state = switch_to;
                    if let Some(value) = emitted {
                        return Ok(Some(value));
                    }
                }
                if self.pos == end {
                    return Ok(None);
                }
                program = self.current()?;
                continue;
            };
            let target = program.table().target(cell, slot);
            if program.table().is_final(target) {
                last_accept = Some((self.pos, cell));
            }
            cell = target;
            self.pos += 1;
        }
    }

    /// Collect every emitted value until the end of the input.
    ///
    /// # Errors
    ///
    /// Propagates the first [`ScanError`] from [`Scanner::lex`].
    pub fn lex_all(&mut self) -> Result<Vec<T>, ScanError> {
        let mut values = Vec::new();
        while let Some(value) = self.lex()? {
            values.push(value);
        }
        Ok(values)
    }

    fn current(&self) -> Result<&'l CompiledState, ScanError> {
        self.lexer
            .state(self.state)
            .ok_or(ScanError::UnknownState { state: self.state })
    }
}

//! # Error Types
//!
//! Errors surfaced by pattern parsing, lexer compilation, and scanning.
//!
//! ## Overview
//!
//! - [`PatternError`]: malformed regular-expression input
//! - [`RuleConflictError`]: two rules accept the same input and their marks
//!   refuse to merge; carries both marks and a witness path of character
//!   ranges leading to the conflict
//! - [`BuildError`]: everything that can go wrong while compiling a rule set
//! - [`ScanError`]: runtime failures of the scanning driver
//!
//! When the `diagnostics` feature is enabled, every error derives
//! [`miette::Diagnostic`] for rich reporting.

use std::fmt;

use thiserror::Error;

#[cfg(feature = "diagnostics")]
use miette::Diagnostic;

use crate::chars::CharRange;
use crate::mark::Mark;

/// A malformed regular expression.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[cfg_attr(feature = "diagnostics", derive(Diagnostic))]
pub enum PatternError {
    #[error("illegal escape sequence '\\{escape}'")]
    #[cfg_attr(feature = "diagnostics", diagnostic(code(pattern::illegal_escape)))]
    IllegalEscape { escape: char },

    #[error("unexpected character '{ch}'")]
    #[cfg_attr(feature = "diagnostics", diagnostic(code(pattern::unexpected_char)))]
    UnexpectedChar { ch: char },

    #[error("unexpected end of pattern")]
    #[cfg_attr(feature = "diagnostics", diagnostic(code(pattern::unexpected_end)))]
    UnexpectedEnd,

    #[error("a pre-built fragment cannot appear inside class or repetition syntax")]
    #[cfg_attr(feature = "diagnostics", diagnostic(code(pattern::unexpected_fragment)))]
    UnexpectedFragment,

    #[error("empty alternation arm")]
    #[cfg_attr(feature = "diagnostics", diagnostic(code(pattern::empty_alternative)))]
    EmptyAlternative,

    #[error("illegal repetition bounds {{{lo},{hi}}}")]
    #[cfg_attr(feature = "diagnostics", diagnostic(code(pattern::illegal_repetition)))]
    IllegalRepetition { lo: u32, hi: u32 },

    #[error("malformed repetition count")]
    #[cfg_attr(feature = "diagnostics", diagnostic(code(pattern::malformed_repetition)))]
    MalformedRepetition,

    #[error("illegal character range {0}")]
    #[cfg_attr(feature = "diagnostics", diagnostic(code(pattern::illegal_char_range)))]
    IllegalCharRange(CharRange),
}

impl PatternError {
    pub(crate) fn unexpected(unit: u16) -> Self {
        Self::UnexpectedChar {
            ch: char::from_u32(u32::from(unit)).unwrap_or(char::REPLACEMENT_CHARACTER),
        }
    }
}

/// The sequence of character ranges that leads from the scanner entry point
/// to the first input on which two rules collide.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConflictPath(pub Vec<CharRange>);

impl ConflictPath {
    #[must_use]
    pub fn ranges(&self) -> &[CharRange] {
        &self.0
    }
}

impl fmt::Display for ConflictPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            return write!(f, "the empty input");
        }
        for (i, range) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, " ")?;
            }
            write!(f, "{range}")?;
        }
        Ok(())
    }
}

/// Two rules accept the same input and their marks refuse to merge.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[cfg_attr(feature = "diagnostics", derive(Diagnostic))]
#[cfg_attr(feature = "diagnostics", diagnostic(code(lexer::rule_conflict)))]
#[error("{first} and {second} both accept the input {path}")]
pub struct RuleConflictError {
    pub first: Mark,
    pub second: Mark,
    pub path: ConflictPath,
}

/// A rule set that cannot be compiled.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[cfg_attr(feature = "diagnostics", derive(Diagnostic))]
pub enum BuildError {
    #[error("the lexer has no rules")]
    #[cfg_attr(feature = "diagnostics", diagnostic(code(lexer::no_rules)))]
    Empty,

    #[error("the initial state has no rules")]
    #[cfg_attr(feature = "diagnostics", diagnostic(code(lexer::missing_initial_state)))]
    MissingInitialState,

    #[error("invalid pattern for rule {index} of state {state}: {source}")]
    #[cfg_attr(feature = "diagnostics", diagnostic(code(lexer::invalid_pattern)))]
    Pattern {
        state: usize,
        index: usize,
        #[source]
        source: PatternError,
    },

    #[error("action id 0 is reserved (rule {index} of state {state})")]
    #[cfg_attr(feature = "diagnostics", diagnostic(code(lexer::reserved_action)))]
    ReservedActionId { state: usize, index: usize },

    #[error("the rules of state {state} accept the empty string")]
    #[cfg_attr(feature = "diagnostics", diagnostic(code(lexer::empty_match)))]
    EmptyMatch { state: usize },

    #[error("conflicting rules in state {state}: {source}")]
    #[cfg_attr(feature = "diagnostics", diagnostic(code(lexer::rule_conflict)))]
    Conflict {
        state: usize,
        #[source]
        source: RuleConflictError,
    },
}

/// A runtime scanning failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[cfg_attr(feature = "diagnostics", derive(Diagnostic))]
pub enum ScanError {
    /// No rule of the current state matches the input. `start..end` is the
    /// half-open region between the last completed token and the stuck
    /// position.
    #[error("no rule matches the input in {start}..{end}")]
    #[cfg_attr(feature = "diagnostics", diagnostic(code(scanner::mismatch)))]
    Mismatch { start: usize, end: usize },

    /// An action switched to a lexing state that has no rules.
    #[error("lexing state {state} has no rules")]
    #[cfg_attr(feature = "diagnostics", diagnostic(code(scanner::unknown_state)))]
    UnknownState { state: usize },
}

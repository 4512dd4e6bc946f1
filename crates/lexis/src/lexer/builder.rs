use compact_str::CompactString;
use smallvec::SmallVec;

use crate::dfa::{compress, determinize, minimize, Automaton, MarkedDfa};
use crate::error::BuildError;
use crate::mark::Mark;
use crate::nfa::{Nfa, NfaBuilder};
use crate::regexp::{parse_pattern, PatternBuilder};

use super::compiled::{CompiledLexer, CompiledState, DfaTable};

/// The pattern of one lexer rule.
pub enum RulePattern {
    /// Regular-expression text, parsed at build time.
    Regex(CompactString),
    /// A pre-built NFA fragment.
    Fragment(NfaBuilder),
    /// A composite of literal text and fragments.
    Composite(PatternBuilder),
}

impl From<&str> for RulePattern {
    fn from(pattern: &str) -> Self {
        Self::Regex(CompactString::new(pattern))
    }
}

impl From<NfaBuilder> for RulePattern {
    fn from(fragment: NfaBuilder) -> Self {
        Self::Fragment(fragment)
    }
}

impl From<PatternBuilder> for RulePattern {
    fn from(builder: PatternBuilder) -> Self {
        Self::Composite(builder)
    }
}

struct LexerRule {
    pattern: RulePattern,
    /// Non-zero action id, or `None` for a silently consumed match.
    action: Option<u32>,
}

/// Builds a [`CompiledLexer`] from per-state ordered rule lists.
///
/// Rules are tried simultaneously; the scanner takes the longest match. With
/// `strict` (the default) two rules accepting the same input are a build
/// error; without it the earlier-declared rule wins.
///
/// # Example
///
/// ```rust
/// use lexis::lexer::LexerBuilder;
///
/// let lexer = LexerBuilder::new()
///     .rule("[a-zA-Z]+", Some(1))
///     .rule("[0-9]+", Some(2))
///     .rule(" +", None)
///     .build()?;
///
/// let mut scanner = lexer.scanner("fn 42", |action, ctx| ctx.emit(action));
/// assert_eq!(scanner.lex_all()?, [1, 2]);
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
pub struct LexerBuilder {
    states: Vec<Vec<LexerRule>>,
    minimize: bool,
    strict: bool,
    compress: bool,
}

impl Default for LexerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl LexerBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self {
            states: Vec::new(),
            minimize: false,
            strict: true,
            compress: true,
        }
    }

    /// Append a rule to the initial state.
    #[must_use]
    pub fn rule(self, pattern: impl Into<RulePattern>, action: Option<u32>) -> Self {
        self.rule_in(0, pattern, action)
    }

    /// Append a rule to the given lexing state.
    #[must_use]
    pub fn rule_in(
        mut self,
        state: usize,
        pattern: impl Into<RulePattern>,
        action: Option<u32>,
    ) -> Self {
        if self.states.len() <= state {
            self.states.resize_with(state + 1, Vec::new);
        }
        self.states[state].push(LexerRule {
            pattern: pattern.into(),
            action,
        });
        self
    }

    /// Run DFA minimization after subset construction (default `false`).
    #[must_use]
    pub fn minimize(mut self, minimize: bool) -> Self {
        self.minimize = minimize;
        self
    }

    /// Treat overlapping rules as an error (default `true`). When disabled,
    /// the earlier-declared rule wins among equal-length matches.
    #[must_use]
    pub fn strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    /// Compress the transition tables (default `true`).
    #[must_use]
    pub fn compress(mut self, compress: bool) -> Self {
        self.compress = compress;
        self
    }

    /// Compile every state's rules into automata.
    ///
    /// # Errors
    ///
    /// See [`BuildError`]: empty rule sets, a missing initial state, reserved
    /// action ids, patterns that fail to parse, rule sets accepting the empty
    /// string, and rule conflicts in strict mode.
    pub fn build(self) -> Result<CompiledLexer, BuildError> {
        if self.states.iter().all(Vec::is_empty) {
            return Err(BuildError::Empty);
        }
        if self.states[0].is_empty() {
            return Err(BuildError::MissingInitialState);
        }

        let mut compiled: Vec<Option<CompiledState>> = Vec::with_capacity(self.states.len());
        for (state, rules) in self.states.into_iter().enumerate() {
            if rules.is_empty() {
                compiled.push(None);
                continue;
            }
            let combined = combine_rules(state, rules, self.strict)?;
            let built = determinize(&combined)
                .map_err(|source| BuildError::Conflict { state, source })?;
            if built.dfa.is_final(0) {
                return Err(BuildError::EmptyMatch { state });
            }
            let built = if self.minimize {
                minimize(&built).map_err(|source| BuildError::Conflict { state, source })?
            } else {
                built
            };
            compiled.push(Some(compile_state(built, self.compress)));
        }
        Ok(CompiledLexer::new(compiled))
    }
}

/// Parse every rule of one state, seal each fragment with its mark, and fan
/// them out behind a shared entry dummy.
fn combine_rules(
    state: usize,
    rules: Vec<LexerRule>,
    strict: bool,
) -> Result<Nfa, BuildError> {
    let mut combined = Nfa::new();
    let mut begins = Vec::with_capacity(rules.len());
    for (index, rule) in rules.into_iter().enumerate() {
        let action = match rule.action {
            Some(0) => return Err(BuildError::ReservedActionId { state, index }),
            Some(action) => action,
            None => 0,
        };
        let fragment = match rule.pattern {
            RulePattern::Regex(pattern) => parse_pattern(&pattern)
                .map_err(|source| BuildError::Pattern {
                    state,
                    index,
                    source,
                })?,
            RulePattern::Fragment(fragment) => fragment,
            RulePattern::Composite(builder) => {
                builder.parse().map_err(|source| BuildError::Pattern {
                    state,
                    index,
                    source,
                })?
            }
        };
        let mark = if strict {
            Mark::Action(action)
        } else {
            Mark::Priority {
                priority: index as u32,
                action,
            }
        };
        let rule_nfa = fragment.finish_marked(mark);
        let offset = combined.extend_from(&rule_nfa);
        begins.push(rule_nfa.begin() + offset);
    }
    let fork = combined.append_dummy(begins);
    combined.set_begin(fork);
    combined.reduce();
    Ok(combined)
}

/// Strip marks down to action ids and pick the table representation.
fn compile_state(built: MarkedDfa, compress_tables: bool) -> CompiledState {
    let actions: Vec<SmallVec<[u32; 4]>> = built
        .marks
        .iter()
        .map(|row| {
            row.iter()
                .map(|mark| mark.map_or(0, Mark::action))
                .collect()
        })
        .collect();
    let table = if compress_tables {
        DfaTable::Compressed(compress(&built.dfa))
    } else {
        DfaTable::General(built.dfa)
    };
    CompiledState::new(table, actions)
}

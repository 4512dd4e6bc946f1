//! # Lexis
//!
//! A lexer-generator core: regular expressions compile through an NFA into a
//! minimized, table-compressed DFA driven by a longest-match scanner.
//!
//! ## Overview
//!
//! The pipeline, stage by stage:
//!
//! - **Character classes** ([`chars`]): sets of 16-bit code units as sorted
//!   disjoint ranges, plus the range-partition map the automata passes build
//!   on
//! - **NFA** ([`nfa`]): an index-arena automaton with dummy cells standing in
//!   for ε-moves, assembled by a shape-preserving builder
//! - **Patterns** ([`regexp`]): regex syntax (and composable literal/fragment
//!   mixes) compiled to NFA fragments
//! - **DFA** ([`dfa`]): subset construction with per-rule mark propagation
//!   and conflict witnesses, Hopcroft-style minimization, and two-level table
//!   compression
//! - **Lexer** ([`lexer`]): per-state rule sets compiled into immutable
//!   automata, scanned with longest-match semantics, backtracking, and
//!   action-driven state switching
//!
//! ## Quick Start
//!
//! ```rust
//! use lexis::lexer::LexerBuilder;
//!
//! #[derive(Debug, PartialEq)]
//! enum Token {
//!     Word(String),
//!     Number(i64),
//! }
//!
//! let lexer = LexerBuilder::new()
//!     .rule("[a-zA-Z]+", Some(1))
//!     .rule(r"\d+", Some(2))
//!     .rule(r"\s+", None)
//!     .minimize(true)
//!     .build()?;
//!
//! let mut scanner = lexer.scanner("over 9000", |action, ctx| {
//!     let text = ctx.matched_text();
//!     match action {
//!         1 => ctx.emit(Token::Word(text.to_string())),
//!         2 => ctx.emit(Token::Number(text.parse().unwrap())),
//!         _ => unreachable!(),
//!     }
//! });
//! assert_eq!(
//!     scanner.lex_all()?,
//!     [Token::Word("over".into()), Token::Number(9000)],
//! );
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! ## Matching without a lexer
//!
//! Every automaton form answers plain match queries, which is also how the
//! pipeline is cross-checked in this crate's tests:
//!
//! ```rust
//! use lexis::dfa::{compress, determinize, minimize, Automaton};
//! use lexis::regexp::parse_pattern;
//!
//! let nfa = parse_pattern(r"[a-c]+(12)?")?.finish();
//! let built = determinize(&nfa).expect("no marks involved");
//! let compressed = compress(&minimize(&built).expect("no marks involved").dfa);
//! assert!(nfa.matches("abc12") && compressed.matches("abc12"));
//! assert!(!nfa.matches("abc1") && !compressed.matches("abc1"));
//! # Ok::<(), lexis::PatternError>(())
//! ```
//!
//! ## Cargo features
//!
//! - `diagnostics`: derive [`miette::Diagnostic`] on every error type
//! - `serialize`: serde derives for the immutable table types

pub mod chars;
pub mod dfa;
pub mod error;
pub mod lexer;
pub mod mark;
pub mod nfa;
pub mod regexp;

pub use chars::{CharClass, CharRange};
pub use dfa::{Automaton, CompressedDfa, Dfa};
pub use error::{BuildError, PatternError, RuleConflictError, ScanError};
pub use lexer::{CompiledLexer, LexerBuilder, ScanCtx, Scanner};
pub use mark::Mark;
pub use nfa::{Nfa, NfaBuilder};
pub use regexp::{parse_pattern, PatternBuilder};

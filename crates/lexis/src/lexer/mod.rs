//! # Lexer
//!
//! Rule sets, compiled lexers, and the longest-match scanning driver.
//!
//! ## Overview
//!
//! A lexer is declared as ordered lists of `(pattern, action)` rules, one
//! list per lexing state. [`LexerBuilder`] compiles every state's rules into
//! an automaton: the rule NFAs are fanned out behind a shared entry, subset
//! construction tags each match-completing transition with its rule's action,
//! and the resulting table is optionally minimized and compressed.
//!
//! [`Scanner`] drives a scan: it consumes greedily, backtracks to the last
//! accepting position when stuck (longest match), and dispatches the matched
//! rule's action. Actions can read the matched text, emit a value, and
//! switch the lexing state via [`ScanCtx`].
//!
//! ## Usage
//!
//! ```rust
//! use lexis::lexer::LexerBuilder;
//!
//! const WORD: u32 = 1;
//! const NUMBER: u32 = 2;
//!
//! let lexer = LexerBuilder::new()
//!     .rule("[a-zA-Z]+", Some(WORD))
//!     .rule(r"\d+", Some(NUMBER))
//!     .rule(r"\s+", None)
//!     .build()?;
//!
//! let mut scanner = lexer.scanner("year 2024", |action, ctx| {
//!     ctx.emit((action, ctx.matched_text()));
//! });
//! let tokens = scanner.lex_all()?;
//! assert_eq!(tokens[0], (WORD, "year".into()));
//! assert_eq!(tokens[1], (NUMBER, "2024".into()));
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

mod builder;
mod compiled;
mod scanner;

pub use builder::{LexerBuilder, RulePattern};
pub use compiled::{CompiledLexer, CompiledState, DfaTable};
pub use scanner::{ScanCtx, Scanner};

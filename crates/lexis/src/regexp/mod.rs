//! # Pattern Parsing
//!
//! Regular-expression surface syntax compiled to NFA fragments.
//!
//! ## Overview
//!
//! The supported syntax over 16-bit code units:
//!
//! - literal characters; `\` escapes the metacharacters `- ( ) * + . [ ] ? \
//!   ^ { } |` (any other escape besides the class escapes is an error)
//! - predefined classes `\d`, `\w`, `\s` and their complements `\D`, `\W`,
//!   `\S`; `.` matches any code unit
//! - bracket classes `[…]` with an optional leading `^`, single characters,
//!   ranges `a-b`, and embedded predefined classes
//! - grouping `(…)`, n-ary alternation `a|b|c`, postfix `*` `+` `?`, and
//!   counted repetition `{m}`, `{m,}`, `{m,n}`
//!
//! ## Composable patterns
//!
//! [`PatternBuilder`] interleaves literal pattern text with pre-built NFA
//! fragments. A fragment behaves like a parenthesised atom: a postfix
//! operator after it binds to the whole fragment.
//!
//! ```rust
//! use lexis::regexp::{parse_pattern, PatternBuilder};
//!
//! let digits = parse_pattern(r"\d+")?;
//! let version = PatternBuilder::new()
//!     .literal("v")
//!     .fragment(digits.clone())
//!     .literal(r"(\.")
//!     .fragment(digits)
//!     .literal(")*")
//!     .parse()?;
//! let nfa = version.finish();
//! assert!(nfa.matches("v1.20.3"));
//! assert!(!nfa.matches("v1."));
//! # Ok::<(), lexis::PatternError>(())
//! ```

mod parser;
mod pattern;

pub use pattern::{parse_pattern, PatternBuilder};

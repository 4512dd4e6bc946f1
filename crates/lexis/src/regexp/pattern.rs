use compact_str::CompactString;

use crate::error::PatternError;
use crate::nfa::NfaBuilder;

use super::parser::{Parser, Tok};

/// Parse a regular expression into an NFA fragment.
///
/// # Errors
///
/// Returns [`PatternError`] for malformed input.
pub fn parse_pattern(pattern: &str) -> Result<NfaBuilder, PatternError> {
    PatternBuilder::new().literal(pattern).parse()
}

/// A pattern assembled from literal regex text interleaved with pre-built
/// NFA fragments.
///
/// The parts are concatenated in order and parsed as one expression wrapped
/// in an outer group. A fragment binds like a parenthesised atom: a postfix
/// operator directly after it applies to the whole fragment.
#[derive(Default)]
pub struct PatternBuilder {
    parts: Vec<Part>,
}

enum Part {
    Literal(CompactString),
    Fragment(NfaBuilder),
}

impl PatternBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append literal pattern text (parsed as regex syntax).
    #[must_use]
    pub fn literal(mut self, text: &str) -> Self {
        self.parts.push(Part::Literal(CompactString::new(text)));
        self
    }

    /// Append a pre-built fragment as a single atom.
    #[must_use]
    pub fn fragment(mut self, fragment: NfaBuilder) -> Self {
        self.parts.push(Part::Fragment(fragment));
        self
    }

    /// Parse the collected parts into one NFA fragment.
    ///
    /// # Errors
    ///
    /// Returns [`PatternError`] for malformed input.
    pub fn parse(self) -> Result<NfaBuilder, PatternError> {
        let mut toks = Vec::new();
        for part in self.parts {
            match part {
                Part::Literal(text) => toks.extend(text.encode_utf16().map(Tok::Unit)),
                Part::Fragment(fragment) => toks.push(Tok::Fragment(fragment)),
            }
        }
        Parser::new(toks).parse()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chars::CharRange;

    fn accepts(pattern: &str, input: &str) -> bool {
        parse_pattern(pattern)
            .expect("pattern parses")
            .finish()
            .matches(input)
    }

    #[test]
    fn literal_concatenation() {
        assert!(accepts("abc", "abc"));
        assert!(!accepts("abc", "abd"));
    }

    #[test]
    fn alternation_is_flat() {
        for word in ["a", "bc", "d", "ef"] {
            assert!(accepts("a|bc|d|ef", word), "{word} should match");
        }
        assert!(!accepts("a|bc|d|ef", "b"));
    }

    #[test]
    fn postfix_binds_to_last_atom() {
        assert!(accepts("ab*", "a"));
        assert!(accepts("ab*", "abbb"));
        assert!(!accepts("ab*", "abab"));
        assert!(accepts("ab+", "abb"));
        assert!(!accepts("ab+", "a"));
        assert!(accepts("ab?", "a"));
        assert!(accepts("ab?", "ab"));
    }

    #[test]
    fn groups_rebind_postfix() {
        assert!(accepts("(ab)*", ""));
        assert!(accepts("(ab)*", "abab"));
        assert!(!accepts("(ab)*", "aba"));
    }

    #[test]
    fn predefined_classes() {
        assert!(accepts(r"\d+", "123"));
        assert!(!accepts(r"\d+", "12a"));
        assert!(accepts(r"\w+", "az_09"));
        assert!(accepts(r"\s", " "));
        assert!(accepts(r"\S", "x"));
        assert!(!accepts(r"\S", " "));
        assert!(accepts(r"\D", "x"));
        assert!(!accepts(r"\D", "5"));
    }

    #[test]
    fn dot_matches_any_unit() {
        assert!(accepts(".", "a"));
        assert!(accepts(".", "\u{0000}"));
        assert!(!accepts(".", "ab"));
    }

    #[test]
    fn bracket_classes() {
        assert!(accepts("[abc]+", "cab"));
        assert!(!accepts("[abc]", "d"));
        assert!(accepts("[a-f0-9]+", "be7f"));
        assert!(!accepts("[a-f0-9]", "g"));
        assert!(accepts(r"[\d]+", "42"));
        assert!(accepts("[-a]", "-"));
        assert!(accepts("[a-]", "-"));
    }

    #[test]
    fn negated_bracket_class() {
        assert!(accepts("[^abc]", "d"));
        assert!(!accepts("[^abc]", "b"));
        assert!(accepts("[^a-z]", "A"));
    }

    #[test]
    fn escaped_metacharacters() {
        assert!(accepts(r"\(\)\*\+\.\[\]\?\\\^\{\}\|", "()*+.[]?\\^{}|"));
        assert!(accepts(r"a\-b", "a-b"));
    }

    #[test]
    fn counted_repetition() {
        assert!(accepts(r"\d{1,4}", "1234"));
        assert!(accepts(r"\d{1,4}", "1926"));
        assert!(!accepts(r"\d{1,4}", ""));
        assert!(!accepts(r"\d{1,4}", "12345"));
        assert!(accepts(r"\w{3,}", "cat"));
        assert!(accepts(r"\w{3,}", "kotlin"));
        assert!(!accepts(r"\w{3,}", "do"));
        assert!(!accepts(r"\w{3,}", "a"));
        assert!(accepts("a{3}", "aaa"));
        assert!(!accepts("a{3}", "aa"));
        assert!(!accepts("a{3}", "aaaa"));
    }

    #[test]
    fn counted_repetition_binds_to_group() {
        assert!(accepts("(ab){2}", "abab"));
        assert!(!accepts("(ab){2}", "ab"));
    }

    #[test]
    fn error_illegal_escape() {
        assert_eq!(
            parse_pattern(r"\q").unwrap_err(),
            PatternError::IllegalEscape { escape: 'q' }
        );
    }

    #[test]
    fn error_unexpected_characters() {
        assert!(matches!(
            parse_pattern(")a").unwrap_err(),
            PatternError::UnexpectedChar { ch: ')' }
        ));
        assert!(matches!(
            parse_pattern("*a").unwrap_err(),
            PatternError::UnexpectedChar { ch: '*' }
        ));
        assert!(matches!(
            parse_pattern("{2}a").unwrap_err(),
            PatternError::UnexpectedChar { ch: '{' }
        ));
    }

    #[test]
    fn error_premature_end() {
        assert_eq!(parse_pattern("(ab").unwrap_err(), PatternError::UnexpectedEnd);
        assert_eq!(parse_pattern("[ab").unwrap_err(), PatternError::UnexpectedEnd);
        assert_eq!(parse_pattern(r"ab\").unwrap_err(), PatternError::UnexpectedEnd);
    }

    #[test]
    fn error_empty_alternative() {
        assert_eq!(parse_pattern("a|").unwrap_err(), PatternError::EmptyAlternative);
        assert_eq!(parse_pattern("|a").unwrap_err(), PatternError::EmptyAlternative);
        assert_eq!(
            parse_pattern("(a||b)").unwrap_err(),
            PatternError::EmptyAlternative
        );
    }

    #[test]
    fn error_illegal_repetition() {
        assert_eq!(
            parse_pattern("a{4,2}").unwrap_err(),
            PatternError::IllegalRepetition { lo: 4, hi: 2 }
        );
        assert_eq!(
            parse_pattern("a{,3}").unwrap_err(),
            PatternError::MalformedRepetition
        );
        assert_eq!(
            parse_pattern("a{x}").unwrap_err(),
            PatternError::MalformedRepetition
        );
    }

    #[test]
    fn error_illegal_char_range() {
        assert_eq!(
            parse_pattern("[z-a]").unwrap_err(),
            PatternError::IllegalCharRange(CharRange::new(b'z'.into(), b'a'.into()))
        );
    }

    #[test]
    fn fragment_is_one_atom() {
        let digits = parse_pattern(r"\d").expect("pattern parses");
        let nfa = PatternBuilder::new()
            .literal("a")
            .fragment(digits)
            .literal("+b")
            .parse()
            .expect("composite parses")
            .finish();
        assert!(nfa.matches("a1b"));
        assert!(nfa.matches("a123b"));
        assert!(!nfa.matches("ab"));
    }

    #[test]
    fn fragment_of_group_repeats_as_a_whole() {
        let word = parse_pattern("ab").expect("pattern parses");
        let nfa = PatternBuilder::new()
            .fragment(word)
            .literal("{2,3}")
            .parse()
            .expect("composite parses")
            .finish();
        assert!(nfa.matches("abab"));
        assert!(nfa.matches("ababab"));
        assert!(!nfa.matches("ab"));
        assert!(!nfa.matches("abababab"));
    }

    #[test]
    fn empty_pattern_matches_empty_string() {
        let nfa = parse_pattern("").expect("pattern parses").finish();
        assert!(nfa.matches(""));
        assert!(!nfa.matches("a"));
    }
}

//! Pattern-to-automaton pipeline tests over concrete languages.

use lexis::dfa::{compress, determinize, minimize, Automaton, CompressedDfa, Dfa};
use lexis::nfa::Nfa;
use lexis::regexp::parse_pattern;

fn pipeline(pattern: &str) -> (Nfa, Dfa, Dfa, CompressedDfa) {
    let nfa = parse_pattern(pattern).expect("pattern parses").finish();
    let built = determinize(&nfa).expect("patterns carry no marks");
    let minimized = minimize(&built).expect("patterns carry no marks").dfa;
    let compressed = compress(&minimized);
    (nfa, built.dfa, minimized, compressed)
}

fn assert_all_agree(pattern: &str, input: &str, expected: bool) {
    let (nfa, dfa, minimized, compressed) = pipeline(pattern);
    assert_eq!(nfa.matches(input), expected, "NFA on {input:?}");
    assert_eq!(dfa.matches(input), expected, "DFA on {input:?}");
    assert_eq!(minimized.matches(input), expected, "minimized on {input:?}");
    assert_eq!(compressed.matches(input), expected, "compressed on {input:?}");
}

const MULTIPLES_OF_THREE: &str = "[0369]*(([147][0369]*|[258][0369]*[258][0369]*)([147][0369]*[258][0369]*)*([258][0369]*|[147][0369]*[147][0369]*)|[258][0369]*[147][0369]*)*";

#[test]
fn decimal_multiples_of_three() {
    let (_, dfa, minimized, compressed) = pipeline(MULTIPLES_OF_THREE);
    for n in 0..=6000u32 {
        let text = n.to_string();
        let expected = n % 3 == 0;
        assert_eq!(dfa.matches(&text), expected, "DFA on {n}");
        assert_eq!(minimized.matches(&text), expected, "minimized on {n}");
        assert_eq!(compressed.matches(&text), expected, "compressed on {n}");
    }
}

#[test]
fn multiples_of_three_nfa_spot_checks() {
    let nfa = parse_pattern(MULTIPLES_OF_THREE)
        .expect("pattern parses")
        .finish();
    for (text, expected) in [
        ("0", true),
        ("27", true),
        ("1", false),
        ("1001", false),
        ("4524", true),
    ] {
        assert_eq!(nfa.matches(text), expected, "NFA on {text}");
    }
}

#[test]
fn bounded_repetitions_through_the_pipeline() {
    for input in ["1234", "1926"] {
        assert_all_agree(r"\d{1,4}", input, true);
    }
    for input in ["", "12345"] {
        assert_all_agree(r"\d{1,4}", input, false);
    }
    for (input, expected) in [("cat", true), ("kotlin", true), ("do", false), ("a", false)] {
        assert_all_agree(r"\w{3,}", input, expected);
    }
}

#[test]
fn assorted_patterns_agree_across_all_forms() {
    let cases: &[(&str, &[(&str, bool)])] = &[
        (
            "(a|b)*abb",
            &[("abb", true), ("aabb", true), ("abab", false), ("", false)],
        ),
        (
            r"[A-Za-z_]\w*",
            &[("_x9", true), ("x", true), ("9x", false), ("", false)],
        ),
        (
            r"(0|[1-9]\d*)(\.\d+)?",
            &[("0", true), ("10.25", true), ("01", false), ("5.", false)],
        ),
        (
            "a?b?c?",
            &[("", true), ("ac", true), ("abc", true), ("ca", false)],
        ),
        (
            "(ab|a)b",
            &[("ab", true), ("abb", true), ("a", false), ("b", false)],
        ),
    ];
    for (pattern, inputs) in cases {
        for &(input, expected) in *inputs {
            assert_all_agree(pattern, input, expected);
        }
    }
}

#[test]
fn prefix_matching_agrees_across_all_forms() {
    let (nfa, dfa, minimized, compressed) = pipeline("ab(c|d)");
    for (input, expected) in [("abc!!!", true), ("abd", true), ("ab", false), ("x", false)] {
        assert_eq!(nfa.matches_prefix(input), expected, "NFA on {input:?}");
        assert_eq!(dfa.matches_prefix(input), expected, "DFA on {input:?}");
        assert_eq!(
            minimized.matches_prefix(input),
            expected,
            "minimized on {input:?}"
        );
        assert_eq!(
            compressed.matches_prefix(input),
            expected,
            "compressed on {input:?}"
        );
    }
}

#[test]
fn non_ascii_code_units() {
    assert_all_agree("[α-ω]+", "λαμδα", true);
    assert_all_agree("[α-ω]+", "ΛΑΜΔΑ", false);
    assert_all_agree("日本?", "日本", true);
    assert_all_agree("日本?", "日", true);
    assert_all_agree("日本?", "本", false);
}

#[test]
fn compressed_transit_equals_general_transit() {
    let (_, dfa, _, _) = pipeline(r"\w+([.-]\w+)*@\w+");
    let compressed = compress(&dfa);
    for cell in 0..dfa.cell_count() as u32 {
        assert_eq!(dfa.is_final(cell), compressed.is_final(cell));
        for unit in 0..=u16::MAX {
            assert_eq!(
                dfa.transit(cell, unit),
                compressed.transit(cell, unit),
                "cell {cell}, unit {unit:#06x}"
            );
        }
    }
}

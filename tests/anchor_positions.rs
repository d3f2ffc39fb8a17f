//! End-to-end checks of anchor classification on parsed patterns.

use anchor_lint::parser::Parser;
use anchor_lint::{
    HostFragments, HostPiece, NoHost, RegexFlags, UnexpectedAnchor, Verdict, inspect, inspect_with,
};
use pretty_assertions::assert_eq;

fn flagged(pattern: &str) -> Vec<(usize, String)> {
    inspect(pattern, RegexFlags::default())
        .unwrap()
        .into_iter()
        .map(|p| (p.start, p.anchor))
        .collect()
}

fn anchors(list: &[(usize, &str)]) -> Vec<(usize, String)> {
    list.iter().map(|&(at, a)| (at, a.to_string())).collect()
}

#[test]
fn edge_anchors_are_legitimate() {
    assert_eq!(flagged("^abc"), vec![]);
    assert_eq!(flagged(r"\Aabc"), vec![]);
    assert_eq!(flagged(r"abc\z"), vec![]);
}

#[test]
fn input_anchor_with_real_neighbor() {
    assert_eq!(flagged(r"a\Ab"), anchors(&[(1, r"\A")]));
}

#[test]
fn line_terminator_before_line_start() {
    assert_eq!(flagged(r"\n^abc"), vec![]);
}

#[test]
fn literal_before_line_start() {
    assert_eq!(flagged("a^bc"), anchors(&[(1, "^")]));
}

#[test]
fn class_whitelist() {
    assert_eq!(flagged(".^abc"), vec![]);
    assert_eq!(flagged(r"\d^abc"), anchors(&[(2, "^")]));
}

#[test]
fn alternation_any_match() {
    assert_eq!(flagged(r"$(a|\n)"), anchors(&[(0, "$")]));
    // `$` only looks forward, so a group before it is never consulted.
    assert_eq!(flagged(r"(a|\n)$"), vec![]);
}

#[test]
fn quantifier_transparency() {
    assert_eq!(flagged("a*^bc"), anchors(&[(2, "^")]));
    assert_eq!(flagged("a*^bc").len(), flagged("a^bc").len());
}

#[test]
fn multiline_pattern_in_extended_mode() {
    let pattern = "(?x)\n  ^ [a-z]+ $  # a word\n  | \\d+ $ \\n ^ \\d+";
    assert_eq!(flagged(pattern), vec![]);

    let pattern = "(?x) foo ^ bar";
    assert_eq!(flagged(pattern), anchors(&[(9, "^")]));
}

#[test]
fn extended_mode_from_options() {
    let flags: RegexFlags = "x".parse().unwrap();
    let problems = inspect(r" \n  ^a", flags).unwrap();
    assert!(problems.is_empty());
}

#[test]
fn classify_is_repeatable() {
    let text = r"a^b|\n^c";
    let tree = Parser::new(text).parse().unwrap();
    let rule = UnexpectedAnchor::new(NoHost);
    for branch in &tree.branches {
        for index in 0..branch.nodes.len() {
            assert_eq!(
                rule.classify(text, branch, index),
                rule.classify(text, branch, index)
            );
        }
    }
    assert_eq!(rule.classify(text, &tree.branches[0], 1), Verdict::Flag);
    assert_eq!(rule.classify(text, &tree.branches[1], 1), Verdict::NoFlag);
}

fn literal(text: &str) -> HostPiece {
    HostPiece::Literal(text.to_string())
}

fn code(text: &str) -> HostPiece {
    HostPiece::Code(text.to_string())
}

#[test]
fn line_break_between_conditional_fragments() {
    let host = HostFragments::new(
        "java",
        &[
            code("multiline ? "),
            literal("a"),
            code(" +\n        "),
            literal("^b"),
            code(" : "),
            literal("c"),
        ],
    );
    assert_eq!(host.text(), " a ^b c");
    let problems = inspect_with(&host, host.text(), RegexFlags::default()).unwrap();
    assert_eq!(problems, vec![]);
}

#[test]
fn line_break_after_line_end() {
    let host = HostFragments::new("java", &[literal("a$"), code("\n + "), literal("b")])
        .in_conditional(true);
    let problems = inspect_with(&host, host.text(), RegexFlags::default()).unwrap();
    assert_eq!(problems, vec![]);
}

#[test]
fn seam_outside_conditional_stays_a_space() {
    let host = HostFragments::new("java", &[literal("a"), code(" +\n"), literal("^b")]);
    let problems = inspect_with(&host, host.text(), RegexFlags::default()).unwrap();
    assert_eq!(problems.len(), 1);
    assert_eq!(problems[0].anchor, "^");
}

#[test]
fn seam_on_one_line_is_a_space() {
    let host = HostFragments::new("java", &[literal("a"), code(" + "), literal("^b")])
        .in_conditional(true);
    let problems = inspect_with(&host, host.text(), RegexFlags::default()).unwrap();
    assert_eq!(problems.len(), 1);
}

#[test]
fn host_info_ignored_for_other_text() {
    let host = HostFragments::new("java", &[literal("a"), code("\n"), literal("^b")])
        .in_conditional(true);
    let problems = inspect_with(&host, "a ^b ", RegexFlags::default()).unwrap();
    assert_eq!(problems.len(), 1);
}

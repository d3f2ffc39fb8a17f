//! Anchors in positions where they can never match.
//!
//! `\A` and `\z`/`\Z` only make sense at the very edge of a pattern; `^` and
//! `$` may also sit next to something that can match a line terminator.
//! Anything else beside an anchor means the anchor can never be satisfied.

use crate::ast::*;
use crate::error::ParseError;
use crate::parser;
use crate::report::{Problem, ProblemSink};
use crate::shred::{NoHost, Reconciler};

/// Outcome of classifying a single anchor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Flag,
    NoFlag,
}

/// Anything that can sit next to an anchor.
#[derive(Debug, Clone, Copy)]
pub enum Element<'a> {
    Pattern(&'a Pattern),
    Branch(&'a Branch),
    Node(&'a Node),
}

pub fn message(anchor: &str) -> String {
    format!("Anchor {} in unexpected position", anchor)
}

pub struct UnexpectedAnchor<R> {
    reconciler: R,
}

impl Default for UnexpectedAnchor<NoHost> {
    fn default() -> Self {
        UnexpectedAnchor::new(NoHost)
    }
}

impl<R: Reconciler> UnexpectedAnchor<R> {
    pub fn new(reconciler: R) -> Self {
        UnexpectedAnchor { reconciler }
    }

    /// Report every misplaced anchor in `pattern` to `sink`. `text` is the
    /// pattern source the tree was parsed from. Returns the number of
    /// problems reported.
    pub fn check<S: ProblemSink>(&self, text: &str, pattern: &Pattern, sink: &mut S) -> usize {
        let mut found = 0;
        self.visit_pattern(text, pattern, sink, &mut found);
        found
    }

    fn visit_pattern<S: ProblemSink>(
        &self,
        text: &str,
        pattern: &Pattern,
        sink: &mut S,
        found: &mut usize,
    ) {
        for branch in &pattern.branches {
            for (index, node) in branch.nodes.iter().enumerate() {
                if self.classify(text, branch, index) == Verdict::Flag {
                    self.flag(text, node, sink, found);
                }
                self.visit_node(text, node, sink, found);
            }
        }
    }

    fn visit_node<S: ProblemSink>(&self, text: &str, node: &Node, sink: &mut S, found: &mut usize) {
        match &node.kind {
            NodeKind::Group { pattern, .. } => self.visit_pattern(text, pattern, sink, found),
            NodeKind::Closure { inner, .. } => {
                if let Some(kind) = inner.as_boundary()
                    && classify_quantified(kind) == Verdict::Flag
                {
                    self.flag(text, inner, sink, found);
                }
                self.visit_node(text, inner, sink, found);
            }
            _ => {}
        }
    }

    fn flag<S: ProblemSink>(&self, text: &str, anchor: &Node, sink: &mut S, found: &mut usize) {
        let anchor_text = anchor.span.text(text);
        log::debug!(
            "anchor {} at {}..{} is misplaced",
            anchor_text,
            anchor.span.start,
            anchor.span.end
        );
        sink.report(anchor, text, &message(anchor_text));
        *found += 1;
    }

    /// Classify the node at `index` in `branch`. Nodes that are not anchors,
    /// and anchors valid anywhere (`\b`, `\B`, `\G`), are never flagged.
    pub fn classify(&self, text: &str, branch: &Branch, index: usize) -> Verdict {
        let Some(anchor) = branch.nodes.get(index) else {
            return Verdict::NoFlag;
        };
        let Some((direction, line)) = anchor.as_boundary().and_then(BoundaryKind::scan) else {
            return Verdict::NoFlag;
        };
        let Some(sibling) = branch.significant_sibling(index, direction) else {
            return Verdict::NoFlag;
        };
        if !line || self.is_unexpected(text, anchor, direction, Element::Node(sibling)) {
            Verdict::Flag
        } else {
            Verdict::NoFlag
        }
    }

    /// Whether `element`, found next to `anchor` when looking in `direction`,
    /// keeps a line anchor from ever matching.
    ///
    /// Alternatives and sequences are unexpected as soon as any part of them
    /// is, not only the part touching the anchor.
    pub fn is_unexpected(
        &self,
        text: &str,
        anchor: &Node,
        direction: Direction,
        element: Element<'_>,
    ) -> bool {
        match element {
            Element::Pattern(pattern) => pattern
                .branches
                .iter()
                .any(|branch| self.is_unexpected(text, anchor, direction, Element::Branch(branch))),
            Element::Branch(branch) => branch
                .nodes
                .iter()
                .any(|node| self.is_unexpected(text, anchor, direction, Element::Node(node))),
            Element::Node(node) => {
                let unexpected = match &node.kind {
                    NodeKind::Char(ch) => self.is_unexpected_char(text, anchor, direction, *ch),
                    NodeKind::Class(kind) => !kind.may_match_line_terminator(),
                    NodeKind::Closure { inner, .. } => {
                        self.is_unexpected(text, anchor, direction, Element::Node(inner))
                    }
                    NodeKind::Group { pattern, .. } => {
                        self.is_unexpected(text, anchor, direction, Element::Pattern(pattern))
                    }
                    // Another anchor counts as unexpected; backreferences, bracket
                    // classes and properties do not.
                    NodeKind::Boundary(_) => true,
                    NodeKind::Other(_)
                    | NodeKind::Comment
                    | NodeKind::Whitespace
                    | NodeKind::SetOptions(_) => false,
                };
                log::trace!(
                    "{:?} next to anchor at {}: unexpected = {}",
                    node.kind,
                    anchor.span.start,
                    unexpected
                );
                unexpected
            }
        }
    }

    /// A space may be the placeholder for a line break between host
    /// fragments; ask the reconciler before treating it as a literal. Inside
    /// a conditional host expression, a line-break seam on the scanned side
    /// makes the space an expected neighbor.
    fn is_unexpected_char(&self, text: &str, anchor: &Node, direction: Direction, ch: char) -> bool {
        if ch == ' ' {
            match self.reconciler.shred_info(text, anchor) {
                Some(info) if info.has_host() => {
                    if info.is_conditional() {
                        return !info.contains_close_real_whitespace(direction);
                    }
                }
                _ => return true,
            }
        }
        ch != '\n' && ch != '\r'
    }
}

/// An anchor under a quantifier (`\z*`) has the quantifier as its only
/// sibling, and the quantifier follows it.
fn classify_quantified(kind: BoundaryKind) -> Verdict {
    match kind.scan() {
        Some((Direction::Forward, false)) => Verdict::Flag,
        _ => Verdict::NoFlag,
    }
}

/// Parse `pattern` and report its misplaced anchors.
pub fn inspect(pattern: &str, flags: RegexFlags) -> Result<Vec<Problem>, ParseError> {
    inspect_with(NoHost, pattern, flags)
}

/// Like [`inspect`], consulting `reconciler` about host fragments.
pub fn inspect_with<R: Reconciler>(
    reconciler: R,
    pattern: &str,
    flags: RegexFlags,
) -> Result<Vec<Problem>, ParseError> {
    let tree = parser::parse(pattern, flags)?;
    let mut problems = Vec::new();
    UnexpectedAnchor::new(reconciler).check(pattern, &tree, &mut problems);
    Ok(problems)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shred::ShredInfo;

    fn flagged(pattern: &str) -> Vec<String> {
        inspect(pattern, RegexFlags::default())
            .unwrap()
            .into_iter()
            .map(|p| p.anchor)
            .collect()
    }

    fn is_flagged(pattern: &str) -> bool {
        !flagged(pattern).is_empty()
    }

    #[test]
    fn anchors_at_the_edge_are_fine() {
        for pattern in ["^abc", "abc$", r"\Aabc", r"abc\z", r"abc\Z", r"\Aabc\z", "^$"] {
            assert!(!is_flagged(pattern), "{}", pattern);
        }
    }

    #[test]
    fn input_anchors_reject_any_neighbor() {
        assert_eq!(flagged(r"a\Ab"), vec![r"\A"]);
        assert_eq!(flagged(r"a\zb"), vec![r"\z"]);
        assert_eq!(flagged(r"a\Zb"), vec![r"\Z"]);
        assert_eq!(flagged(r"\n\Ab"), vec![r"\A"]);
        assert_eq!(flagged(r".\z\n"), vec![r"\z"]);
    }

    #[test]
    fn input_anchors_ignore_the_other_side() {
        assert!(!is_flagged(r"\Aa"));
        assert!(!is_flagged(r"a\z"));
    }

    #[test]
    fn line_terminators_are_expected() {
        assert!(!is_flagged(r"\n^abc"));
        assert!(!is_flagged(r"\r^abc"));
        assert!(!is_flagged(r"abc$\n"));
        assert!(!is_flagged(r"abc$\r\n"));
    }

    #[test]
    fn literal_neighbor_is_unexpected() {
        assert_eq!(flagged("a^bc"), vec!["^"]);
        assert_eq!(flagged("ab$c"), vec!["$"]);
        assert_eq!(flagged("a ^b"), vec!["^"]);
    }

    #[test]
    fn predefined_class_whitelist() {
        for pattern in [
            ".^abc", r"\D^a", r"\W^a", r"\s^a", r"\H^a", r"\V^a", r"\I^a", r"\C^a", r"\R^a",
        ] {
            assert!(!is_flagged(pattern), "{}", pattern);
        }
        for pattern in [
            r"\d^a", r"\w^a", r"\S^a", r"\h^a", r"\v^a", r"\i^a", r"\c^a",
        ] {
            assert!(is_flagged(pattern), "{}", pattern);
        }
    }

    #[test]
    fn alternation_is_unexpected_if_any_branch_is() {
        assert_eq!(flagged(r"$(a|\n)"), vec!["$"]);
        assert!(!is_flagged(r"$(\r|\n)"));
        assert!(!is_flagged(r"(a|\n)$"));
        assert_eq!(flagged(r"(\n|a)^b"), vec!["^"]);
    }

    #[test]
    fn escaped_line_terminators_in_other_notations() {
        assert!(!is_flagged(r"\012^abc"));
        assert!(!is_flagged(r"\x{A}^abc"));
        assert!(!is_flagged(r"abc$\x{D}"));
        assert_eq!(flagged(r"\x{41}^abc"), vec!["^"]);
    }

    #[test]
    fn quoted_text_is_literal() {
        assert_eq!(flagged(r"\Qa.b\E^c"), vec!["^"]);
        assert!(!is_flagged(r"\Q^$\E"));
    }

    #[test]
    fn named_backreference_is_not_unexpected() {
        assert!(!is_flagged(r"(?<n>x)\k<n>^c"));
    }

    #[test]
    fn every_atom_of_a_sequence_counts() {
        assert_eq!(flagged(r"(a\n)^b"), vec!["^"]);
        assert!(!is_flagged(r"(\r\n)^b"));
    }

    #[test]
    fn quantifiers_are_transparent() {
        assert_eq!(flagged("a*^bc"), vec!["^"]);
        assert_eq!(flagged("a{2}^bc"), vec!["^"]);
        assert!(!is_flagged(r"\n+^bc"));
        assert!(!is_flagged(r"(?:\r?\n)*^bc"));
    }

    #[test]
    fn adjacent_anchor_is_unexpected_but_other_atoms_are_not() {
        assert_eq!(flagged(r"\b^a"), vec!["^"]);
        assert!(!is_flagged(r"[\n]^a"));
        assert!(!is_flagged(r"(x)\1^a"));
        assert!(!is_flagged(r"\p{Zl}^a"));
    }

    #[test]
    fn both_line_anchors_in_a_row() {
        // `$` sees `^` and `^` sees `$`.
        assert_eq!(flagged("a$^b"), vec!["$", "^"]);
    }

    #[test]
    fn pseudo_nodes_are_skipped() {
        assert!(!is_flagged("(?i)^abc"));
        assert!(!is_flagged("(?#start)^abc"));
        assert!(!is_flagged("(?x) ^ abc"));
        assert!(!is_flagged(r"(?x) \n # newline
            ^ abc"));
        assert_eq!(flagged("(?x) a # comment\n ^ b"), vec!["^"]);
    }

    #[test]
    fn anchors_inside_groups_are_checked() {
        assert_eq!(flagged("(a^b)"), vec!["^"]);
        assert!(!is_flagged("(^a|b$)"));
        assert_eq!(flagged(r"x(?:a|b\Ac)"), vec![r"\A"]);
    }

    #[test]
    fn word_boundaries_are_never_flagged() {
        assert!(!is_flagged(r"a\bb"));
        assert!(!is_flagged(r"a\Bb"));
        assert!(!is_flagged(r"a\Gb"));
    }

    #[test]
    fn quantified_anchors() {
        assert_eq!(flagged(r"a\z*"), vec![r"\z"]);
        assert!(!is_flagged("a^*"));
        assert!(!is_flagged(r"\A+a"));
    }

    #[test]
    fn problems_carry_spans_and_messages() {
        let problems = inspect("ab^c", RegexFlags::default()).unwrap();
        assert_eq!(problems.len(), 1);
        assert_eq!(problems[0].start, 2);
        assert_eq!(problems[0].end, 3);
        assert_eq!(problems[0].message, "Anchor ^ in unexpected position");
    }

    #[test]
    fn classify_non_anchor_is_no_flag() {
        let tree = parser::parse("ab", RegexFlags::default()).unwrap();
        let rule = UnexpectedAnchor::new(NoHost);
        assert_eq!(rule.classify("ab", &tree.branches[0], 0), Verdict::NoFlag);
        assert_eq!(rule.classify("ab", &tree.branches[0], 9), Verdict::NoFlag);
    }

    struct Stub(Option<ShredInfo>);

    impl Reconciler for Stub {
        fn shred_info(&self, _text: &str, _anchor: &Node) -> Option<ShredInfo> {
            self.0.clone()
        }
    }

    fn shred(host: bool, conditional: bool, whitespace: bool) -> Stub {
        Stub(Some(ShredInfo {
            host: host.then(|| "java".to_string()),
            conditional,
            whitespace_before: whitespace,
            whitespace_after: whitespace,
        }))
    }

    fn flagged_with(stub: Stub, pattern: &str) -> bool {
        !inspect_with(stub, pattern, RegexFlags::default())
            .unwrap()
            .is_empty()
    }

    #[test]
    fn host_fragment_whitespace_overrides_space() {
        assert!(!flagged_with(shred(true, true, true), "a ^b"));
        assert!(!flagged_with(shred(true, true, true), "a$ b"));
    }

    #[test]
    fn host_fragment_without_whitespace_flags_space() {
        assert!(flagged_with(shred(true, true, false), "a ^b"));
    }

    fn shred_sided(before: bool, after: bool) -> Stub {
        Stub(Some(ShredInfo {
            host: Some("java".to_string()),
            conditional: true,
            whitespace_before: before,
            whitespace_after: after,
        }))
    }

    #[test]
    fn host_fragment_whitespace_is_read_on_the_scanned_side() {
        // `^` looks backward, `$` looks forward.
        assert!(!flagged_with(shred_sided(true, false), "a ^b"));
        assert!(flagged_with(shred_sided(false, true), "a ^b"));
        assert!(!flagged_with(shred_sided(false, true), "a$ b"));
        assert!(flagged_with(shred_sided(true, false), "a$ b"));
    }

    #[test]
    fn space_falls_back_to_literal_rule() {
        assert!(flagged_with(Stub(None), "a ^b"));
        assert!(flagged_with(shred(false, true, true), "a ^b"));
        assert!(flagged_with(shred(true, false, true), "a ^b"));
    }

    #[test]
    fn reconciler_only_consulted_for_spaces() {
        assert!(flagged_with(shred(true, true, true), "a^b"));
        assert!(!flagged_with(shred(true, true, false), r"\n^b"));
    }
}

//! Host fragments ("shreds") of a pattern.
//!
//! A pattern embedded in host source code may be written as several string
//! literals glued together by host code: `"^a" +\n "b$"`. The assembled
//! pattern text carries a single space where the host code sat. A space next
//! to an anchor may therefore stand for a line break in the host source, and
//! the anchor inspection asks a [`Reconciler`] before treating it as a
//! literal.

use crate::ast::{Direction, Node};

/// What is known about the fragment an anchor sits in.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ShredInfo {
    /// Host element the fragment belongs to, if one can be identified.
    pub host: Option<String>,
    /// Whether the host element is part of a conditional expression.
    pub conditional: bool,
    pub whitespace_before: bool,
    pub whitespace_after: bool,
}

impl ShredInfo {
    pub fn has_host(&self) -> bool {
        self.host.is_some()
    }

    pub fn is_conditional(&self) -> bool {
        self.conditional
    }

    /// Whether a fragment seam holding a real line break adjoins the anchor
    /// in `direction`.
    pub fn contains_close_real_whitespace(&self, direction: Direction) -> bool {
        match direction {
            Direction::Forward => self.whitespace_after,
            Direction::Backward => self.whitespace_before,
        }
    }
}

pub trait Reconciler {
    /// Fragment information for `anchor` inside the pattern `text`, or `None`
    /// when `text` did not come from host fragments.
    fn shred_info(&self, text: &str, anchor: &Node) -> Option<ShredInfo>;
}

impl<R: Reconciler + ?Sized> Reconciler for &R {
    fn shred_info(&self, text: &str, anchor: &Node) -> Option<ShredInfo> {
        (**self).shred_info(text, anchor)
    }
}

/// Reconciler for patterns that were written as a single literal.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoHost;

impl Reconciler for NoHost {
    fn shred_info(&self, _text: &str, _anchor: &Node) -> Option<ShredInfo> {
        None
    }
}

/// A piece of host source making up a pattern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HostPiece {
    /// Contents of a string literal; contributes its text verbatim.
    Literal(String),
    /// Host code between literals; contributes a single space.
    Code(String),
}

/// A pattern assembled from host source pieces.
#[derive(Debug, Clone)]
pub struct HostFragments {
    host: String,
    conditional: bool,
    text: String,
    /// Byte offset of each placeholder space in `text`, with the host code it replaces.
    seams: Vec<(usize, String)>,
}

impl HostFragments {
    pub fn new(host: impl Into<String>, pieces: &[HostPiece]) -> Self {
        let mut text = String::new();
        let mut seams = Vec::new();
        let mut code_text = String::new();
        for piece in pieces {
            match piece {
                HostPiece::Literal(literal) => text.push_str(literal),
                HostPiece::Code(code) => {
                    code_text.push_str(code);
                    seams.push((text.len(), code.clone()));
                    text.push(' ');
                }
            }
        }
        log::trace!("assembled {} host pieces into {:?}", pieces.len(), text);
        HostFragments {
            host: host.into(),
            conditional: is_conditional_code(&code_text),
            text,
            seams,
        }
    }

    /// Force the conditional-expression marker, for hosts that know better
    /// than the seam heuristic.
    pub fn in_conditional(mut self, conditional: bool) -> Self {
        self.conditional = conditional;
        self
    }

    /// The pattern text the host pieces assemble into.
    pub fn text(&self) -> &str {
        &self.text
    }

    fn seam_at(&self, offset: usize) -> Option<&str> {
        self.seams
            .iter()
            .find(|(at, _)| *at == offset)
            .map(|(_, code)| code.as_str())
    }

    /// Walk the run of spaces starting at the anchor edge and report whether
    /// one of them replaced host code containing a line break.
    fn line_break_seam(&self, anchor: &Node, direction: Direction) -> bool {
        let bytes = self.text.as_bytes();
        let mut offset = match direction {
            Direction::Forward => Some(anchor.span.end),
            Direction::Backward => anchor.span.start.checked_sub(1),
        };
        while let Some(at) = offset {
            if bytes.get(at) != Some(&b' ') {
                break;
            }
            if self
                .seam_at(at)
                .is_some_and(|code| code.contains(['\n', '\r']))
            {
                return true;
            }
            offset = match direction {
                Direction::Forward => Some(at + 1),
                Direction::Backward => at.checked_sub(1),
            };
        }
        false
    }
}

impl Reconciler for HostFragments {
    fn shred_info(&self, text: &str, anchor: &Node) -> Option<ShredInfo> {
        if text != self.text {
            return None;
        }
        Some(ShredInfo {
            host: Some(self.host.clone()),
            conditional: self.conditional,
            whitespace_before: self.line_break_seam(anchor, Direction::Backward),
            whitespace_after: self.line_break_seam(anchor, Direction::Forward),
        })
    }
}

/// Host code of the form `cond ? ... : ...`, possibly split across seams.
fn is_conditional_code(code: &str) -> bool {
    code.find('?')
        .is_some_and(|question| code[question..].contains(':'))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{BoundaryKind, NodeKind, Span};

    fn anchor_at(start: usize) -> Node {
        Node::new(
            NodeKind::Boundary(BoundaryKind::StartOfLine),
            Span::new(start, start + 1),
        )
    }

    fn pieces() -> Vec<HostPiece> {
        vec![
            HostPiece::Literal("a".to_string()),
            HostPiece::Code(" +\n    ".to_string()),
            HostPiece::Literal("^b".to_string()),
        ]
    }

    #[test]
    fn assembles_text_with_placeholder_spaces() {
        let host = HostFragments::new("java", &pieces());
        assert_eq!(host.text(), "a ^b");
        assert_eq!(host.seams, vec![(1, " +\n    ".to_string())]);
    }

    #[test]
    fn reports_line_break_seam_before_anchor() {
        let host = HostFragments::new("java", &pieces());
        let info = host.shred_info("a ^b", &anchor_at(2)).unwrap();
        assert!(info.has_host());
        assert!(info.contains_close_real_whitespace(Direction::Backward));
        assert!(!info.contains_close_real_whitespace(Direction::Forward));
    }

    #[test]
    fn seam_without_line_break_is_not_whitespace() {
        let host = HostFragments::new(
            "java",
            &[
                HostPiece::Literal("a".to_string()),
                HostPiece::Code(" + ".to_string()),
                HostPiece::Literal("^b".to_string()),
            ],
        );
        let info = host.shred_info("a ^b", &anchor_at(2)).unwrap();
        assert!(!info.contains_close_real_whitespace(Direction::Backward));
    }

    #[test]
    fn literal_space_run_reaches_seam() {
        let host = HostFragments::new(
            "java",
            &[
                HostPiece::Literal("a".to_string()),
                HostPiece::Code("\n".to_string()),
                HostPiece::Literal(" ^b".to_string()),
            ],
        );
        assert_eq!(host.text(), "a  ^b");
        let info = host.shred_info("a  ^b", &anchor_at(3)).unwrap();
        assert!(info.contains_close_real_whitespace(Direction::Backward));
    }

    #[test]
    fn other_text_has_no_info() {
        let host = HostFragments::new("java", &pieces());
        assert!(host.shred_info("a^b", &anchor_at(1)).is_none());
        assert!(NoHost.shred_info("a ^b", &anchor_at(2)).is_none());
    }

    #[test]
    fn detects_conditional_seams() {
        let host = HostFragments::new(
            "java",
            &[
                HostPiece::Code("flag ? ".to_string()),
                HostPiece::Literal("^a".to_string()),
                HostPiece::Code(" : ".to_string()),
                HostPiece::Literal("b".to_string()),
            ],
        );
        assert!(host.shred_info(host.text(), &anchor_at(1)).unwrap().is_conditional());
        assert!(!HostFragments::new("java", &pieces()).conditional);
        assert!(
            HostFragments::new("java", &pieces())
                .in_conditional(true)
                .shred_info("a ^b", &anchor_at(2))
                .unwrap()
                .is_conditional()
        );
    }
}

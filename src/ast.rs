//! Syntax tree for regex patterns.

/// Byte range of a node inside the pattern text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    pub fn new(start: usize, end: usize) -> Self {
        Span { start, end }
    }

    /// The slice of `text` this span covers.
    pub fn text<'t>(&self, text: &'t str) -> &'t str {
        text.get(self.start..self.end).unwrap_or("")
    }
}

/// Direction in which siblings are scanned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// Towards the end of the pattern.
    Forward,
    /// Towards the start of the pattern.
    Backward,
}

/// An alternation: `a|b|c`. The root of every parsed pattern and the
/// contents of every group.
#[derive(Debug, Clone)]
pub struct Pattern {
    pub span: Span,
    pub branches: Vec<Branch>,
}

/// One arm of an alternation: a concatenation of nodes.
#[derive(Debug, Clone)]
pub struct Branch {
    pub span: Span,
    pub nodes: Vec<Node>,
}

impl Branch {
    /// Nearest node next to `index` in `direction` that is not a comment,
    /// whitespace or an inline option setting.
    pub fn significant_sibling(&self, index: usize, direction: Direction) -> Option<&Node> {
        match direction {
            Direction::Forward => self
                .nodes
                .iter()
                .skip(index + 1)
                .find(|node| !node.is_skippable()),
            Direction::Backward => self.nodes[..index.min(self.nodes.len())]
                .iter()
                .rev()
                .find(|node| !node.is_skippable()),
        }
    }
}

/// A single node in a branch.
#[derive(Debug, Clone)]
pub struct Node {
    pub span: Span,
    pub kind: NodeKind,
}

impl Node {
    pub fn new(kind: NodeKind, span: Span) -> Self {
        Node { span, kind }
    }

    /// Comments, extended-mode whitespace and `(?x)`-style option settings
    /// never count as neighbors.
    pub fn is_skippable(&self) -> bool {
        matches!(
            self.kind,
            NodeKind::Comment | NodeKind::Whitespace | NodeKind::SetOptions(_)
        )
    }

    pub fn as_boundary(&self) -> Option<BoundaryKind> {
        match self.kind {
            NodeKind::Boundary(kind) => Some(kind),
            _ => None,
        }
    }
}

#[derive(Debug, Clone)]
pub enum NodeKind {
    /// A literal character, escaped or not.
    Char(char),
    /// Shorthand class: `.`, `\d`, `\w`, `\s`, `\R` and friends.
    Class(ClassKind),
    /// Quantifier applied to a single node.
    Closure {
        inner: Box<Node>,
        quantifier: Quantifier,
    },
    /// Any parenthesized group, lookaround included.
    Group { kind: GroupKind, pattern: Pattern },
    /// Zero-width anchor.
    Boundary(BoundaryKind),
    /// Atoms the anchor analysis does not look into.
    Other(OtherKind),
    /// `(?#...)`, or `#...` in extended mode.
    Comment,
    /// Unescaped whitespace in extended mode.
    Whitespace,
    /// Inline option setting `(?i)`, `(?x-s)`.
    SetOptions(RegexFlags),
}

/// Repetition operator. The anchor check looks through every quantifier
/// alike, whatever its bounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Quantifier {
    /// `*`
    Star,
    /// `+`
    Plus,
    /// `?`
    Question,
    /// `{n}`
    Exact(usize),
    /// `{n,}`
    AtLeast(usize),
    /// `{n,m}`
    Range(usize, usize),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GroupKind {
    /// `(...)` with its 1-based index.
    Capturing(usize),
    /// `(?:...)`
    NonCapturing,
    /// `(?i:...)`
    Flagged(RegexFlags),
    /// `(?=...)` or `(?!...)`
    Lookahead { positive: bool },
    /// `(?<=...)` or `(?<!...)`
    Lookbehind { positive: bool },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OtherKind {
    /// Bracket expression `[a-z]`, `[^\n]`.
    Set,
    /// `\1` through `\9`, or `\k<name>` resolved to its group index.
    Backreference(usize),
    /// `\p{...}` or `\P{...}`.
    Property,
}

/// Shorthand character class kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ClassKind {
    /// `.`
    Any,
    /// `\d`
    Digit,
    /// `\D`
    NonDigit,
    /// `\w`
    Word,
    /// `\W`
    NonWord,
    /// `\s`
    Space,
    /// `\S`
    NonSpace,
    /// `\h`
    HorizontalSpace,
    /// `\H`
    NonHorizontalSpace,
    /// `\v`
    VerticalSpace,
    /// `\V`
    NonVerticalSpace,
    /// `\i`
    XmlNameStart,
    /// `\I`
    NonXmlNameStart,
    /// `\c`
    XmlNamePart,
    /// `\C`
    NonXmlNamePart,
    /// `\R`
    UnicodeLinebreak,
}

impl ClassKind {
    /// Whether the class is treated as able to stand in for a line terminator.
    /// `\v` is not in the set even though it contains `\n`.
    pub fn may_match_line_terminator(self) -> bool {
        matches!(
            self,
            ClassKind::Any
                | ClassKind::NonDigit
                | ClassKind::NonWord
                | ClassKind::Space
                | ClassKind::NonHorizontalSpace
                | ClassKind::NonVerticalSpace
                | ClassKind::NonXmlNameStart
                | ClassKind::NonXmlNamePart
                | ClassKind::UnicodeLinebreak
        )
    }
}

/// Anchor kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BoundaryKind {
    /// `\A`
    StartOfInput,
    /// `^`
    StartOfLine,
    /// `\z`
    EndOfInput,
    /// `\Z`
    EndOfInputNoLineTerm,
    /// `$`
    EndOfLine,
    /// `\b`
    WordBoundary,
    /// `\B`
    NonWordBoundary,
    /// `\G`
    PreviousMatch,
}

impl BoundaryKind {
    /// Where to look for a neighbor and whether the anchor is line sensitive.
    /// `None` for anchors that are valid anywhere.
    pub fn scan(self) -> Option<(Direction, bool)> {
        match self {
            BoundaryKind::StartOfInput => Some((Direction::Backward, false)),
            BoundaryKind::StartOfLine => Some((Direction::Backward, true)),
            BoundaryKind::EndOfInput | BoundaryKind::EndOfInputNoLineTerm => {
                Some((Direction::Forward, false))
            }
            BoundaryKind::EndOfLine => Some((Direction::Forward, true)),
            BoundaryKind::WordBoundary
            | BoundaryKind::NonWordBoundary
            | BoundaryKind::PreviousMatch => None,
        }
    }
}

/// Inline regex flags (i, s, m, x).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RegexFlags {
    /// Case-insensitive matching.
    pub case_insensitive: bool,
    /// Dotall mode: `.` matches newline.
    pub dotall: bool,
    /// Multiline mode: `^` and `$` match at line boundaries.
    pub multiline: bool,
    /// Extended mode: whitespace and `#` comments are ignored.
    pub extended: bool,
}

impl RegexFlags {
    /// Set or clear the flag named by `ch`. Returns false for unknown letters.
    pub fn apply(&mut self, ch: char, on: bool) -> bool {
        match ch {
            'i' => self.case_insensitive = on,
            's' => self.dotall = on,
            'm' => self.multiline = on,
            'x' => self.extended = on,
            _ => return false,
        }
        true
    }
}

impl std::str::FromStr for RegexFlags {
    type Err = char;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut flags = RegexFlags::default();
        for ch in s.chars() {
            if !flags.apply(ch, true) {
                return Err(ch);
            }
        }
        Ok(flags)
    }
}

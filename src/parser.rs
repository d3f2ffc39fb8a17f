//! Regex parser: converts a pattern string into a syntax tree.

use crate::ast::*;
use crate::error::{ParseError, ParseErrorKind};

pub struct Parser<'p> {
    pattern: &'p str,
    /// Characters with their byte offsets.
    chars: Vec<(usize, char)>,
    pos: usize,
    group_count: usize,
    /// Named groups seen so far, with their group index.
    group_names: Vec<(String, usize)>,
    flags: RegexFlags,
}

impl<'p> Parser<'p> {
    pub fn new(pattern: &'p str) -> Self {
        Self::with_flags(pattern, RegexFlags::default())
    }

    /// Parser whose initial flags come from outside the pattern.
    pub fn with_flags(pattern: &'p str, flags: RegexFlags) -> Self {
        Parser {
            pattern,
            chars: pattern.char_indices().collect(),
            pos: 0,
            group_count: 0,
            group_names: Vec::new(),
            flags,
        }
    }

    /// Parse the full pattern.
    pub fn parse(&mut self) -> Result<Pattern, ParseError> {
        let pattern = self.parse_alternation()?;
        if let Some(ch) = self.peek() {
            let kind = if ch == ')' {
                ParseErrorKind::UnbalancedParen
            } else {
                ParseErrorKind::UnexpectedChar(ch)
            };
            return Err(self.error(kind));
        }
        Ok(pattern)
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).map(|&(_, ch)| ch)
    }

    fn peek_next(&self) -> Option<char> {
        self.chars.get(self.pos + 1).map(|&(_, ch)| ch)
    }

    fn advance(&mut self) -> Option<char> {
        let ch = self.peek();
        if ch.is_some() {
            self.pos += 1;
        }
        ch
    }

    /// Byte offset of the current position.
    fn offset(&self) -> usize {
        self.chars
            .get(self.pos)
            .map(|&(offset, _)| offset)
            .unwrap_or(self.pattern.len())
    }

    fn span_from(&self, start: usize) -> Span {
        Span::new(start, self.offset())
    }

    fn error(&self, kind: ParseErrorKind) -> ParseError {
        ParseError::new(kind, self.offset())
    }

    fn expect_close(&mut self) -> Result<(), ParseError> {
        match self.advance() {
            Some(')') => Ok(()),
            Some(_) => {
                self.pos -= 1;
                Err(self.error(ParseErrorKind::UnbalancedParen))
            }
            None => Err(self.error(ParseErrorKind::UnbalancedParen)),
        }
    }

    /// Parse alternation: `a|b|c`
    fn parse_alternation(&mut self) -> Result<Pattern, ParseError> {
        let start = self.offset();
        let mut branches = vec![self.parse_branch()?];
        while self.peek() == Some('|') {
            self.advance(); // consume '|'
            branches.push(self.parse_branch()?);
        }
        Ok(Pattern {
            span: self.span_from(start),
            branches,
        })
    }

    /// Parse concatenation: `abc`
    fn parse_branch(&mut self) -> Result<Branch, ParseError> {
        let start = self.offset();
        let mut nodes = Vec::new();
        while let Some(ch) = self.peek() {
            if ch == ')' || ch == '|' {
                break;
            }
            if self.flags.extended {
                if ch.is_ascii_whitespace() {
                    nodes.push(self.parse_whitespace());
                    continue;
                }
                if ch == '#' {
                    nodes.push(self.parse_line_comment());
                    continue;
                }
            }
            if ch == '\\' && self.peek_next() == Some('Q') {
                // A trailing quantifier applies to the last quoted char only.
                let mut quoted = self.parse_quoted();
                if let Some(last) = quoted.pop() {
                    nodes.extend(quoted);
                    let start = last.span.start;
                    nodes.push(self.parse_quantifier(last, start)?);
                }
                continue;
            }
            nodes.push(self.parse_quantified()?);
        }
        Ok(Branch {
            span: self.span_from(start),
            nodes,
        })
    }

    fn parse_whitespace(&mut self) -> Node {
        let start = self.offset();
        while self.peek().is_some_and(|ch| ch.is_ascii_whitespace()) {
            self.advance();
        }
        Node::new(NodeKind::Whitespace, self.span_from(start))
    }

    /// `# ...` up to, not including, the line break.
    fn parse_line_comment(&mut self) -> Node {
        let start = self.offset();
        while self.peek().is_some_and(|ch| ch != '\n') {
            self.advance();
        }
        Node::new(NodeKind::Comment, self.span_from(start))
    }

    /// `\Q...\E`: every char up to `\E`, or the end of the pattern, is a
    /// literal.
    fn parse_quoted(&mut self) -> Vec<Node> {
        self.pos += 2; // consume '\Q'
        let mut nodes = Vec::new();
        while let Some(ch) = self.peek() {
            if ch == '\\' && self.peek_next() == Some('E') {
                self.pos += 2;
                break;
            }
            let start = self.offset();
            self.advance();
            nodes.push(Node::new(NodeKind::Char(ch), self.span_from(start)));
        }
        nodes
    }

    /// Parse an atom possibly followed by a quantifier.
    fn parse_quantified(&mut self) -> Result<Node, ParseError> {
        let start = self.offset();
        let node = self.parse_atom()?;
        self.parse_quantifier(node, start)
    }

    /// Wrap `node` in a closure if a quantifier follows it.
    fn parse_quantifier(&mut self, node: Node, start: usize) -> Result<Node, ParseError> {
        let quantifier = match self.peek() {
            Some(ch @ ('*' | '+' | '?')) => {
                self.advance();
                match ch {
                    '*' => Quantifier::Star,
                    '+' => Quantifier::Plus,
                    _ => Quantifier::Question,
                }
            }
            Some('{') => match self.parse_brace_quantifier() {
                Some(quantifier) => quantifier,
                None => return Ok(node),
            },
            _ => return Ok(node),
        };
        if node.is_skippable() {
            return Err(ParseError::new(ParseErrorKind::NothingToRepeat, node.span.end));
        }
        // lazy or possessive suffix
        if matches!(self.peek(), Some('?' | '+')) {
            self.advance();
        }
        Ok(Node::new(
            NodeKind::Closure {
                inner: Box::new(node),
                quantifier,
            },
            self.span_from(start),
        ))
    }

    /// Parse `{n}`, `{n,}`, `{n,m}`. Leaves the position untouched when the
    /// braces do not form a quantifier, so `{` is read as a literal.
    fn parse_brace_quantifier(&mut self) -> Option<Quantifier> {
        let save_pos = self.pos;
        self.advance(); // consume '{'
        let quantifier = self.try_parse_brace_contents();
        if quantifier.is_none() {
            self.pos = save_pos;
        }
        quantifier
    }

    fn try_parse_brace_contents(&mut self) -> Option<Quantifier> {
        let n = self.parse_number()?;
        let quantifier = if self.peek() == Some(',') {
            self.advance(); // consume ','
            if self.peek() == Some('}') {
                Quantifier::AtLeast(n)
            } else {
                Quantifier::Range(n, self.parse_number()?)
            }
        } else {
            Quantifier::Exact(n)
        };
        (self.advance() == Some('}')).then_some(quantifier)
    }

    fn parse_number(&mut self) -> Option<usize> {
        let start = self.offset();
        while self.peek().is_some_and(|ch| ch.is_ascii_digit()) {
            self.advance();
        }
        self.pattern[start..self.offset()].parse().ok()
    }

    /// Parse a single atom (literal, class, group, anchor, etc.)
    fn parse_atom(&mut self) -> Result<Node, ParseError> {
        let start = self.offset();
        let kind = match self.peek() {
            None => return Err(self.error(ParseErrorKind::UnexpectedEnd)),
            Some('(') => return self.parse_group(),
            Some('[') => return self.parse_set(),
            Some('\\') => return self.parse_escape(),
            Some('*' | '+' | '?') => return Err(self.error(ParseErrorKind::NothingToRepeat)),
            Some('.') => NodeKind::Class(ClassKind::Any),
            Some('^') => NodeKind::Boundary(BoundaryKind::StartOfLine),
            Some('$') => NodeKind::Boundary(BoundaryKind::EndOfLine),
            Some(ch) => NodeKind::Char(ch),
        };
        self.advance();
        Ok(Node::new(kind, self.span_from(start)))
    }

    /// Parse an escape sequence.
    fn parse_escape(&mut self) -> Result<Node, ParseError> {
        let start = self.offset();
        self.advance(); // consume '\\'
        let kind = match self.advance() {
            None => return Err(self.error(ParseErrorKind::UnexpectedEnd)),
            Some('d') => NodeKind::Class(ClassKind::Digit),
            Some('D') => NodeKind::Class(ClassKind::NonDigit),
            Some('w') => NodeKind::Class(ClassKind::Word),
            Some('W') => NodeKind::Class(ClassKind::NonWord),
            Some('s') => NodeKind::Class(ClassKind::Space),
            Some('S') => NodeKind::Class(ClassKind::NonSpace),
            Some('h') => NodeKind::Class(ClassKind::HorizontalSpace),
            Some('H') => NodeKind::Class(ClassKind::NonHorizontalSpace),
            Some('v') => NodeKind::Class(ClassKind::VerticalSpace),
            Some('V') => NodeKind::Class(ClassKind::NonVerticalSpace),
            Some('i') => NodeKind::Class(ClassKind::XmlNameStart),
            Some('I') => NodeKind::Class(ClassKind::NonXmlNameStart),
            Some('c') => NodeKind::Class(ClassKind::XmlNamePart),
            Some('C') => NodeKind::Class(ClassKind::NonXmlNamePart),
            Some('R') => NodeKind::Class(ClassKind::UnicodeLinebreak),
            Some('A') => NodeKind::Boundary(BoundaryKind::StartOfInput),
            Some('z') => NodeKind::Boundary(BoundaryKind::EndOfInput),
            Some('Z') => NodeKind::Boundary(BoundaryKind::EndOfInputNoLineTerm),
            Some('b') => NodeKind::Boundary(BoundaryKind::WordBoundary),
            Some('B') => NodeKind::Boundary(BoundaryKind::NonWordBoundary),
            Some('G') => NodeKind::Boundary(BoundaryKind::PreviousMatch),
            Some(ch @ '1'..='9') => {
                NodeKind::Other(OtherKind::Backreference((ch as u8 - b'0') as usize))
            }
            Some('k') => {
                if self.advance() != Some('<') {
                    return Err(ParseError::new(ParseErrorKind::InvalidEscape('k'), start));
                }
                let name_start = self.offset();
                let name = self.parse_group_name()?;
                let index = self
                    .group_names
                    .iter()
                    .find(|(known, _)| *known == name)
                    .map(|&(_, index)| index)
                    .ok_or_else(|| {
                        ParseError::new(ParseErrorKind::UnknownGroupName(name), name_start)
                    })?;
                NodeKind::Other(OtherKind::Backreference(index))
            }
            Some('p' | 'P') => {
                self.parse_property_name()?;
                NodeKind::Other(OtherKind::Property)
            }
            Some('n') => NodeKind::Char('\n'),
            Some('r') => NodeKind::Char('\r'),
            Some('t') => NodeKind::Char('\t'),
            Some('f') => NodeKind::Char('\x0C'),
            Some('e') => NodeKind::Char('\x1B'),
            Some('0') => NodeKind::Char(self.parse_octal()?),
            Some('x') if self.peek() == Some('{') => NodeKind::Char(self.parse_hex_braced()?),
            Some('x') => NodeKind::Char(self.parse_hex(2)?),
            Some('u') => NodeKind::Char(self.parse_hex(4)?),
            Some(ch) if ch.is_ascii_alphabetic() => {
                return Err(ParseError::new(ParseErrorKind::InvalidEscape(ch), start));
            }
            // Escaped literal: \., \*, \\, \ , etc.
            Some(ch) => NodeKind::Char(ch),
        };
        Ok(Node::new(kind, self.span_from(start)))
    }

    /// `{Name}` or a single letter after `\p`.
    fn parse_property_name(&mut self) -> Result<(), ParseError> {
        match self.advance() {
            Some('{') => loop {
                match self.advance() {
                    Some('}') => return Ok(()),
                    Some(_) => {}
                    None => return Err(self.error(ParseErrorKind::UnexpectedEnd)),
                }
            },
            Some(ch) if ch.is_ascii_alphabetic() => Ok(()),
            Some(ch) => Err(self.error(ParseErrorKind::UnexpectedChar(ch))),
            None => Err(self.error(ParseErrorKind::UnexpectedEnd)),
        }
    }

    fn parse_hex(&mut self, digits: usize) -> Result<char, ParseError> {
        let mut value = 0u32;
        for _ in 0..digits {
            let digit = match self.peek() {
                Some(ch) => ch
                    .to_digit(16)
                    .ok_or_else(|| self.error(ParseErrorKind::UnexpectedChar(ch)))?,
                None => return Err(self.error(ParseErrorKind::UnexpectedEnd)),
            };
            self.advance();
            value = value * 16 + digit;
        }
        char::from_u32(value).ok_or_else(|| self.error(ParseErrorKind::InvalidEscape('u')))
    }

    /// Digits of `\0n`, `\0nn` or `\0mnn` (m at most 3).
    fn parse_octal(&mut self) -> Result<char, ParseError> {
        let mut value = 0u32;
        let mut digits = 0;
        while let Some(digit) = self.peek().and_then(|ch| ch.to_digit(8)) {
            if digits == 2 && value > 0o37 {
                break;
            }
            value = value * 8 + digit;
            digits += 1;
            self.advance();
            if digits == 3 {
                break;
            }
        }
        if digits == 0 {
            return Err(self.error(ParseErrorKind::InvalidEscape('0')));
        }
        char::from_u32(value).ok_or_else(|| self.error(ParseErrorKind::InvalidEscape('0')))
    }

    /// `{h...}` after `\x`.
    fn parse_hex_braced(&mut self) -> Result<char, ParseError> {
        self.advance(); // consume '{'
        let mut value = 0u32;
        let mut digits = 0;
        loop {
            match self.peek() {
                Some('}') if digits > 0 => break,
                Some(ch) => {
                    let digit = ch
                        .to_digit(16)
                        .ok_or_else(|| self.error(ParseErrorKind::UnexpectedChar(ch)))?;
                    value = value.saturating_mul(16).saturating_add(digit);
                    digits += 1;
                }
                None => return Err(self.error(ParseErrorKind::UnexpectedEnd)),
            }
            self.advance();
        }
        self.advance(); // consume '}'
        char::from_u32(value).ok_or_else(|| self.error(ParseErrorKind::InvalidEscape('x')))
    }

    /// Parse everything starting with `(`: groups, lookaround, inline
    /// comments and inline option settings.
    fn parse_group(&mut self) -> Result<Node, ParseError> {
        let start = self.offset();
        self.advance(); // consume '('

        let kind = if self.peek() == Some('?') {
            self.advance(); // consume '?'
            match self.peek() {
                Some(':') => {
                    self.advance();
                    GroupKind::NonCapturing
                }
                Some('=' | '!') => {
                    let positive = self.advance() == Some('=');
                    GroupKind::Lookahead { positive }
                }
                Some('<') => {
                    self.advance(); // consume '<'
                    match self.peek() {
                        Some('=' | '!') => {
                            let positive = self.advance() == Some('=');
                            GroupKind::Lookbehind { positive }
                        }
                        Some(ch) if ch.is_ascii_alphabetic() => {
                            let name = self.parse_group_name()?;
                            self.group_count += 1;
                            self.group_names.push((name, self.group_count));
                            GroupKind::Capturing(self.group_count)
                        }
                        _ => return Err(self.error(ParseErrorKind::InvalidGroup)),
                    }
                }
                Some('#') => return self.parse_inline_comment(start),
                Some(ch) if ch == '-' || ch.is_ascii_alphabetic() => {
                    let flags = self.parse_flags()?;
                    if self.peek() == Some(')') {
                        self.advance();
                        // Option settings stay active to the end of the enclosing group.
                        self.flags = flags;
                        return Ok(Node::new(NodeKind::SetOptions(flags), self.span_from(start)));
                    }
                    if self.peek() != Some(':') {
                        return Err(self.error(ParseErrorKind::InvalidGroup));
                    }
                    self.advance(); // consume ':'
                    return self.parse_group_body(start, GroupKind::Flagged(flags), flags);
                }
                _ => return Err(self.error(ParseErrorKind::InvalidGroup)),
            }
        } else {
            // Capturing group
            self.group_count += 1;
            GroupKind::Capturing(self.group_count)
        };
        self.parse_group_body(start, kind, self.flags)
    }

    fn parse_group_body(
        &mut self,
        start: usize,
        kind: GroupKind,
        flags: RegexFlags,
    ) -> Result<Node, ParseError> {
        let outer = std::mem::replace(&mut self.flags, flags);
        let pattern = self.parse_alternation();
        self.flags = outer;
        let pattern = pattern?;
        self.expect_close()?;
        Ok(Node::new(
            NodeKind::Group { kind, pattern },
            self.span_from(start),
        ))
    }

    /// Name of `(?<name>...)` or `\k<name>`, consumed along with the
    /// closing `>`.
    fn parse_group_name(&mut self) -> Result<String, ParseError> {
        let mut name = String::new();
        while let Some(ch) = self.advance() {
            if ch == '>' {
                return Ok(name);
            }
            if !ch.is_ascii_alphanumeric() {
                self.pos -= 1;
                return Err(self.error(ParseErrorKind::InvalidGroup));
            }
            name.push(ch);
        }
        Err(self.error(ParseErrorKind::UnexpectedEnd))
    }

    /// `(?#...)`; the current position is on `#`.
    fn parse_inline_comment(&mut self, start: usize) -> Result<Node, ParseError> {
        while let Some(ch) = self.advance() {
            if ch == ')' {
                return Ok(Node::new(NodeKind::Comment, self.span_from(start)));
            }
        }
        Err(ParseError::new(ParseErrorKind::UnbalancedParen, start))
    }

    /// `imsx-imsx` applied on top of the current flags.
    fn parse_flags(&mut self) -> Result<RegexFlags, ParseError> {
        let mut flags = self.flags;
        let mut on = true;
        while let Some(ch) = self.peek() {
            if ch == ')' || ch == ':' {
                break;
            }
            if ch == '-' && on {
                on = false;
            } else if !flags.apply(ch, on) {
                return Err(self.error(ParseErrorKind::UnknownFlag(ch)));
            }
            self.advance();
        }
        Ok(flags)
    }

    /// Parse a bracket expression: `[abc]`, `[a-z]`, `[^\n]`, `[a-z&&[^b]]`.
    /// Its contents are irrelevant to the analysis and are only skipped.
    fn parse_set(&mut self) -> Result<Node, ParseError> {
        let start = self.offset();
        self.advance(); // consume '['
        if self.peek() == Some('^') {
            self.advance();
        }
        // Allow ']' as first character in class
        if self.peek() == Some(']') {
            self.advance();
        }

        let mut depth = 1;
        while depth > 0 {
            match self.advance() {
                None => {
                    return Err(ParseError::new(ParseErrorKind::UnterminatedClass, start));
                }
                Some('\\') => {
                    if self.advance().is_none() {
                        return Err(ParseError::new(ParseErrorKind::UnterminatedClass, start));
                    }
                }
                Some('[') => depth += 1,
                Some(']') => depth -= 1,
                Some(_) => {}
            }
        }
        Ok(Node::new(NodeKind::Other(OtherKind::Set), self.span_from(start)))
    }
}

/// Parse `pattern` with the given starting flags.
pub fn parse(pattern: &str, flags: RegexFlags) -> Result<Pattern, ParseError> {
    Parser::with_flags(pattern, flags).parse()
}

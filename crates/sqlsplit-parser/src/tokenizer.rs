//! Pull-based script tokenizer.
//!
//! [ScriptTokenizer] walks a script one lexical token at a time, driven by a
//! [DialectDescriptor](crate::dialect::DialectDescriptor). It never fails:
//! malformed input (unterminated strings, comments, tagged blocks) produces
//! tokens running to end of input, with the open construct recorded in the
//! [ScanContext] so a caller holding a partial buffer can resume later.

use sqlsplit_common::CodeLocation;

use crate::dialect::{DialectDescriptor, EscapeStyle, QuoteKind};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    Whitespace,
    LineComment,
    BlockComment,
    StringLiteral,
    QuotedIdentifier,
    /// Opening `$tag$` of a tagged block.
    TaggedBlockOpen,
    /// Raw contents between a tagged-block open and close.
    TaggedBlockBody,
    /// Closing `$tag$` of a tagged block.
    TaggedBlockClose,
    /// An identifier-shaped run; the only kind matched against keywords.
    Word,
    /// The statement delimiter.
    Delimiter,
    /// Any single character not covered above.
    Other,
}

/// A token as a byte range over the source; no text is copied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub start: usize,
    pub end: usize,
}

impl Token {
    pub fn text<'a>(&self, source: &'a str) -> &'a str {
        &source[self.start..self.end]
    }
}

/// What lexical construct the scanner is inside of, if any.
///
/// Only relevant at a stopping point: mid-script the tokenizer consumes
/// complete constructs in one token, so the context is `Code` between any
/// two tokens unless input ended inside an unterminated construct.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ScanContext {
    #[default]
    Code,
    LineComment,
    BlockComment {
        end: String,
    },
    StringLiteral {
        close: char,
        escape: EscapeStyle,
    },
    QuotedIdentifier {
        close: char,
        escape: EscapeStyle,
    },
    TaggedBlock {
        tag: String,
    },
}

/// A resumable scanner position: where, plus what construct is open there.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanPosition {
    pub location: CodeLocation,
    pub context: ScanContext,
}

impl ScanPosition {
    pub fn start_of_file() -> Self {
        ScanPosition {
            location: CodeLocation::start_of_file(),
            context: ScanContext::Code,
        }
    }
}

pub struct ScriptTokenizer<'a, 'd> {
    source: &'a str,
    descriptor: &'d DialectDescriptor,
    pos: ScanPosition,
}

impl<'a, 'd> ScriptTokenizer<'a, 'd> {
    pub fn new(source: &'a str, descriptor: &'d DialectDescriptor) -> Self {
        Self::resume(source, descriptor, ScanPosition::start_of_file())
    }

    /// Starts scanning from a previously captured position, e.g. after more
    /// input was appended to a partial buffer.
    pub fn resume(source: &'a str, descriptor: &'d DialectDescriptor, pos: ScanPosition) -> Self {
        debug_assert!(
            source.is_char_boundary(pos.location.index),
            "resume offset must lie on a character boundary"
        );
        ScriptTokenizer {
            source,
            descriptor,
            pos,
        }
    }

    pub fn position(&self) -> &ScanPosition {
        &self.pos
    }

    pub fn offset(&self) -> usize {
        self.pos.location.index
    }

    fn rest(&self) -> &'a str {
        &self.source[self.offset()..]
    }

    fn peek(&self) -> Option<char> {
        self.rest().chars().next()
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos.location = self.pos.location.advance(c);
        Some(c)
    }

    /// Advances past `text`, which must be the next bytes of the source.
    fn advance_over(&mut self, text: &str) {
        debug_assert!(self.rest().starts_with(text));
        self.pos.location = self.pos.location.advance_by_text(text);
    }

    fn token_from(&self, kind: TokenKind, start: usize) -> Token {
        Token {
            kind,
            start,
            end: self.offset(),
        }
    }

    /// Consumes to the end of the current line, returning the byte offset of
    /// the line end (before the newline). The newline itself is consumed.
    pub fn skip_to_line_end(&mut self) -> usize {
        while let Some(c) = self.peek() {
            if c == '\n' {
                let end = self.offset();
                self.bump();
                return end;
            }
            self.bump();
        }
        self.offset()
    }

    /// The next token, or `None` at end of input.
    pub fn next_token(&mut self) -> Option<Token> {
        let start = self.offset();
        match self.pos.context.clone() {
            ScanContext::Code => {
                if start >= self.source.len() {
                    return None;
                }
                Some(self.scan_code(start))
            }
            ScanContext::LineComment => {
                if start >= self.source.len() {
                    self.pos.context = ScanContext::Code;
                    return None;
                }
                self.scan_line_comment_tail();
                Some(self.token_from(TokenKind::LineComment, start))
            }
            ScanContext::BlockComment { end } => {
                if start >= self.source.len() {
                    return None;
                }
                self.scan_block_comment_tail(&end);
                Some(self.token_from(TokenKind::BlockComment, start))
            }
            ScanContext::StringLiteral { close, escape } => {
                if start >= self.source.len() {
                    return None;
                }
                self.scan_quoted_tail(close, escape);
                Some(self.token_from(TokenKind::StringLiteral, start))
            }
            ScanContext::QuotedIdentifier { close, escape } => {
                if start >= self.source.len() {
                    return None;
                }
                self.scan_quoted_tail(close, escape);
                Some(self.token_from(TokenKind::QuotedIdentifier, start))
            }
            ScanContext::TaggedBlock { tag } => {
                if start >= self.source.len() {
                    return None;
                }
                Some(self.scan_tagged_block(start, &tag))
            }
        }
    }

    fn scan_code(&mut self, start: usize) -> Token {
        let c = self.peek().unwrap_or_default();

        if c.is_whitespace() {
            while self.peek().is_some_and(char::is_whitespace) {
                self.bump();
            }
            return self.token_from(TokenKind::Whitespace, start);
        }

        if let Some(marker_len) = self.descriptor.match_line_comment(self.rest()) {
            let marker = &self.source[start..start + marker_len];
            self.advance_over(marker);
            self.pos.context = ScanContext::LineComment;
            self.scan_line_comment_tail();
            return self.token_from(TokenKind::LineComment, start);
        }

        if let Some((marker_len, end)) = self.descriptor.match_block_comment(self.rest()) {
            let end = end.to_string();
            let marker = &self.source[start..start + marker_len];
            self.advance_over(marker);
            self.pos.context = ScanContext::BlockComment { end: end.clone() };
            self.scan_block_comment_tail(&end);
            return self.token_from(TokenKind::BlockComment, start);
        }

        if let Some(pair) = self.descriptor.quote_pair_for(c) {
            let (close, escape, kind) = (pair.close, pair.escape, pair.kind);
            self.bump();
            self.pos.context = match kind {
                QuoteKind::String => ScanContext::StringLiteral { close, escape },
                QuoteKind::Identifier => ScanContext::QuotedIdentifier { close, escape },
            };
            self.scan_quoted_tail(close, escape);
            let token_kind = match kind {
                QuoteKind::String => TokenKind::StringLiteral,
                QuoteKind::Identifier => TokenKind::QuotedIdentifier,
            };
            return self.token_from(token_kind, start);
        }

        if Some(c) == self.descriptor.tagged_block_marker() {
            if let Some(tag) = parse_tag(self.rest(), c) {
                self.advance_over(&format!("{c}{tag}{c}"));
                self.pos.context = ScanContext::TaggedBlock { tag };
                return self.token_from(TokenKind::TaggedBlockOpen, start);
            }
        }

        if c == self.descriptor.delimiter() {
            self.bump();
            return self.token_from(TokenKind::Delimiter, start);
        }

        if is_word_start(c) {
            while self
                .peek()
                .is_some_and(|c| is_word_start(c) || self.descriptor.is_extra_word_char(c))
            {
                self.bump();
            }
            return self.token_from(TokenKind::Word, start);
        }

        self.bump();
        self.token_from(TokenKind::Other, start)
    }

    fn scan_line_comment_tail(&mut self) {
        while let Some(c) = self.peek() {
            if c == '\n' {
                break;
            }
            self.bump();
        }
        self.pos.context = ScanContext::Code;
    }

    fn scan_block_comment_tail(&mut self, end: &str) {
        match self.rest().find(end) {
            Some(idx) => {
                let through = &self.rest()[..idx + end.len()];
                self.advance_over(through);
                self.pos.context = ScanContext::Code;
            }
            None => {
                // Unterminated: consume to end of input, context stays open.
                self.advance_over(self.rest());
            }
        }
    }

    fn scan_quoted_tail(&mut self, close: char, escape: EscapeStyle) {
        while let Some(c) = self.bump() {
            if c == close {
                if escape == EscapeStyle::Doubling && self.peek() == Some(close) {
                    self.bump();
                    continue;
                }
                self.pos.context = ScanContext::Code;
                return;
            }
            if escape == EscapeStyle::Backslash && c == '\\' {
                self.bump();
            }
        }
        // Unterminated: context stays open.
    }

    fn scan_tagged_block(&mut self, start: usize, tag: &str) -> Token {
        let marker = self
            .descriptor
            .tagged_block_marker()
            .unwrap_or_default();
        let close = format!("{marker}{tag}{marker}");
        if self.rest().starts_with(&close) {
            self.advance_over(&close);
            self.pos.context = ScanContext::Code;
            return self.token_from(TokenKind::TaggedBlockClose, start);
        }
        match self.rest().find(&close) {
            Some(idx) => {
                let body = &self.rest()[..idx];
                self.advance_over(body);
            }
            None => {
                // Unterminated: body runs to end of input, context stays open.
                self.advance_over(self.rest());
            }
        }
        self.token_from(TokenKind::TaggedBlockBody, start)
    }
}

fn is_word_start(c: char) -> bool {
    c.is_alphanumeric() || c == '_' || c >= '\u{80}'
}

/// Parses `rest` (which starts with the marker) as a tagged-block open
/// marker, returning the tag between the two marker characters. Tags are
/// identifier-shaped or empty (`$$`, `$body$`); anything else is not a
/// tagged block.
fn parse_tag(rest: &str, marker: char) -> Option<String> {
    let inner = &rest[marker.len_utf8()..];
    for (i, c) in inner.char_indices() {
        if c == marker {
            return Some(inner[..i].to_string());
        }
        if !(c.is_alphanumeric() || c == '_') || (i == 0 && c.is_ascii_digit()) {
            return None;
        }
    }
    None
}

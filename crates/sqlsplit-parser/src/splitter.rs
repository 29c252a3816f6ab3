//! Statement splitting.
//!
//! [ScriptSplitter] drives the tokenizer and the balance tracker over a
//! document and cuts it into [ScriptElement]s. Delimiters end a statement
//! only at zero block depth; control commands are recognized at statement
//! start and emitted as their own elements; everything else is content.

use std::ops::ControlFlow;

use sqlsplit_common::Span;

use crate::balance::BlockBalance;
use crate::dialect::{ControlCommandRule, DialectDescriptor};
use crate::document::ScriptDocument;
use crate::model::{ElementKind, ScriptElement};
use crate::tokenizer::{ScriptTokenizer, Token, TokenKind};

pub struct ScriptSplitter<'d> {
    descriptor: &'d DialectDescriptor,
}

impl<'d> ScriptSplitter<'d> {
    pub fn new(descriptor: &'d DialectDescriptor) -> Self {
        ScriptSplitter { descriptor }
    }

    /// Splits `document` into statements and control commands, in source
    /// order.
    pub fn split(&self, document: &impl ScriptDocument) -> Vec<ScriptElement> {
        let mut elements = Vec::new();
        self.split_with(document, |element| {
            elements.push(element);
            ControlFlow::Continue(())
        });
        elements
    }

    /// Streaming variant of [ScriptSplitter::split]: `on_element` receives
    /// each element as soon as its end is known and may stop the scan early
    /// by returning [ControlFlow::Break].
    pub fn split_with(
        &self,
        document: &impl ScriptDocument,
        mut on_element: impl FnMut(ScriptElement) -> ControlFlow<()>,
    ) {
        let source = document.text();
        let mut tokenizer = ScriptTokenizer::new(source, self.descriptor);
        let mut balance = BlockBalance::new(self.descriptor);

        // Start offset of the statement being accumulated, and whether
        // anything meaningful (not layout, not a comment) was seen in it.
        let mut statement_start = 0usize;
        let mut statement_blank = true;
        // A tagged block closed at top level; a following blank line ends
        // the statement even without a delimiter.
        let mut tagged_close_pending = false;
        // Control commands are only recognized as the first meaningful
        // token on a line.
        let mut at_line_start = true;

        while let Some(token) = tokenizer.next_token() {
            match token.kind {
                TokenKind::Whitespace => {
                    if statement_blank {
                        statement_start = token.end;
                    }
                    if token.text(source).contains('\n') {
                        at_line_start = true;
                        if tagged_close_pending && count_newlines(token.text(source)) >= 2 {
                            tagged_close_pending = false;
                            let emitted = emit(
                                document,
                                statement_start,
                                token.start,
                                statement_blank,
                                ElementKind::Statement,
                                &mut on_element,
                            );
                            statement_start = token.end;
                            statement_blank = true;
                            if emitted.is_break() {
                                return;
                            }
                        }
                    }
                }
                TokenKind::LineComment | TokenKind::BlockComment => {
                    // Comments are layout for splitting purposes; they keep
                    // the blank flag, a pending tagged close and the
                    // line-start state alive. Before a statement has any
                    // content they are skipped entirely, so comment-only
                    // segments produce no element.
                    if statement_blank {
                        statement_start = token.end;
                    }
                }
                _ => {
                    let control_candidate =
                        at_line_start && self.matches_control_command(&token, source);
                    if control_candidate {
                        // A closer held for two-word lookahead (END before a
                        // possible IF) cannot be extended by a command word.
                        balance.finish();
                    }
                    if control_candidate && !balance.is_inside_compound_construct() {
                        // A separator like GO or / also ends a statement
                        // that was never delimiter-terminated.
                        let line_end = tokenizer.skip_to_line_end();
                        let flushed = emit(
                            document,
                            statement_start,
                            token.start,
                            statement_blank,
                            ElementKind::Statement,
                            &mut on_element,
                        );
                        if flushed.is_break() {
                            return;
                        }
                        let emitted = emit(
                            document,
                            token.start,
                            line_end,
                            false,
                            ElementKind::ControlCommand,
                            &mut on_element,
                        );
                        statement_start = tokenizer.offset();
                        statement_blank = true;
                        tagged_close_pending = false;
                        if emitted.is_break() {
                            return;
                        }
                        continue;
                    }

                    at_line_start = false;
                    tagged_close_pending = false;
                    balance.observe(&token, source);

                    match token.kind {
                        TokenKind::Delimiter if !balance.is_inside_compound_construct() => {
                            let emitted = emit(
                                document,
                                statement_start,
                                token.start,
                                statement_blank,
                                ElementKind::Statement,
                                &mut on_element,
                            );
                            statement_start = token.end;
                            statement_blank = true;
                            if emitted.is_break() {
                                return;
                            }
                        }
                        TokenKind::TaggedBlockClose
                            if !balance.is_inside_compound_construct() =>
                        {
                            tagged_close_pending = true;
                            statement_blank = false;
                        }
                        TokenKind::Delimiter => {}
                        _ => statement_blank = false,
                    }
                }
            }
        }

        // Whatever is open at end of input is the last statement, even when
        // unterminated.
        emit(
            document,
            statement_start,
            source.len(),
            statement_blank,
            ElementKind::Statement,
            &mut on_element,
        );
    }

    fn matches_control_command(&self, token: &Token, source: &str) -> bool {
        let text = token.text(source);
        self.descriptor.control_commands().iter().any(|rule| {
            match (rule, token.kind) {
                (ControlCommandRule::Prefix(prefix), TokenKind::Other) => {
                    text.starts_with(*prefix)
                }
                (ControlCommandRule::Line(word), TokenKind::Word | TokenKind::Other) => {
                    text.eq_ignore_ascii_case(word)
                }
                (ControlCommandRule::Bare(word), TokenKind::Word | TokenKind::Other) => {
                    text.eq_ignore_ascii_case(word) && rest_of_line_is_blank(source, token.end)
                }
                _ => false,
            }
        })
    }
}

/// Emits the trimmed text between `start` and `end` as one element, unless
/// the range is blank or held nothing meaningful.
fn emit(
    document: &impl ScriptDocument,
    start: usize,
    end: usize,
    blank: bool,
    kind: ElementKind,
    on_element: &mut impl FnMut(ScriptElement) -> ControlFlow<()>,
) -> ControlFlow<()> {
    if blank {
        return ControlFlow::Continue(());
    }
    let raw = &document.text()[start..end];
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return ControlFlow::Continue(());
    }
    let text_start = start + (raw.len() - raw.trim_start().len());
    let text_end = text_start + trimmed.len();
    let span = Span::new(document.location_of(text_start), document.location_of(text_end));
    on_element(ScriptElement::new(span, trimmed.to_string(), kind))
}

fn count_newlines(text: &str) -> usize {
    text.bytes().filter(|b| *b == b'\n').count()
}

fn rest_of_line_is_blank(source: &str, offset: usize) -> bool {
    source[offset..]
        .split('\n')
        .next()
        .unwrap_or("")
        .trim()
        .is_empty()
}

#[cfg(test)]
mod tests {
    use std::ops::ControlFlow;

    use pretty_assertions::assert_eq;

    use super::*;
    use crate::dialect::Dialect;
    use crate::document::TextDocument;

    fn texts(dialect: Dialect, source: &str) -> Vec<String> {
        let descriptor = dialect.descriptor();
        let splitter = ScriptSplitter::new(&descriptor);
        splitter
            .split(&TextDocument::new(source))
            .into_iter()
            .map(|e| e.text().to_string())
            .collect()
    }

    #[test]
    fn test_two_plain_statements() {
        assert_eq!(
            texts(Dialect::Generic, "SELECT 1; SELECT 2"),
            vec!["SELECT 1", "SELECT 2"]
        );
    }

    #[test]
    fn test_empty_statements_suppressed() {
        assert_eq!(texts(Dialect::Generic, ";;;SELECT 1;"), vec!["SELECT 1"]);
        assert_eq!(texts(Dialect::Generic, "  ;  ; "), Vec::<String>::new());
    }

    #[test]
    fn test_delimiter_in_string_does_not_split() {
        assert_eq!(
            texts(Dialect::Generic, "SELECT 'it''s; a test'; SELECT 2"),
            vec!["SELECT 'it''s; a test'", "SELECT 2"]
        );
    }

    #[test]
    fn test_comment_only_segments_dropped() {
        assert_eq!(
            texts(Dialect::Generic, "-- lead\n;SELECT 1; /* tail */"),
            vec!["SELECT 1"]
        );
    }

    #[test]
    fn test_spans_are_trimmed_offsets() {
        let descriptor = Dialect::Generic.descriptor();
        let splitter = ScriptSplitter::new(&descriptor);
        let source = "  SELECT 1 ;  SELECT 2  ";
        let elements = splitter.split(&TextDocument::new(source));
        assert_eq!(elements[0].start_offset(), 2);
        assert_eq!(elements[0].end_offset(), 10);
        assert_eq!(&source[elements[1].start_offset()..elements[1].end_offset()], "SELECT 2");
    }

    #[test]
    fn test_split_with_break_stops_early() {
        let descriptor = Dialect::Generic.descriptor();
        let splitter = ScriptSplitter::new(&descriptor);
        let mut seen = Vec::new();
        splitter.split_with(&TextDocument::new("SELECT 1; SELECT 2; SELECT 3"), |e| {
            seen.push(e.text().to_string());
            if seen.len() == 2 {
                ControlFlow::Break(())
            } else {
                ControlFlow::Continue(())
            }
        });
        assert_eq!(seen, vec!["SELECT 1", "SELECT 2"]);
    }
}

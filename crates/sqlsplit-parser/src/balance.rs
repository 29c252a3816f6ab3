//! Compound-construct balance tracking.
//!
//! [BlockBalance] watches the token stream and maintains two stacks: open
//! block keywords (BEGIN/CASE/IF/LOOP and friends) and open tagged blocks.
//! The splitter consults [BlockBalance::is_inside_compound_construct] to
//! decide whether a delimiter ends a statement or is internal to a routine
//! body.
//!
//! The tracker is deliberately forgiving: an unbalanced closer is logged
//! and ignored rather than driving the depth negative, so a malformed
//! script degrades to coarser splitting instead of an error.

use tracing::debug;

use crate::dialect::{BlockKind, DialectDescriptor};
use crate::tokenizer::{Token, TokenKind};

#[derive(Debug, Clone)]
struct OpenBlock {
    /// Canonical uppercase opener spelling.
    opener: String,
    /// A `Header` block that has not yet seen its `Body` opener.
    awaiting_body: bool,
}

#[derive(Debug)]
pub struct BlockBalance<'d> {
    descriptor: &'d DialectDescriptor,
    keyword_stack: Vec<OpenBlock>,
    tag_stack: Vec<String>,
    /// A closer first word (END) seen and waiting for a possible second
    /// word (IF, CASE, LOOP) before it resolves.
    pending_closer: Option<String>,
    /// The last meaningful token was a block opener; used to cancel
    /// non-block uses such as `BEGIN TRANSACTION` or `BEGIN;`.
    just_pushed: bool,
}

impl<'d> BlockBalance<'d> {
    pub fn new(descriptor: &'d DialectDescriptor) -> Self {
        BlockBalance {
            descriptor,
            keyword_stack: Vec::new(),
            tag_stack: Vec::new(),
            pending_closer: None,
            just_pushed: false,
        }
    }

    /// True if the scanner currently sits inside an open compound
    /// construct (keyword block or tagged block), where delimiters do not
    /// end the statement.
    pub fn is_inside_compound_construct(&self) -> bool {
        !self.keyword_stack.is_empty() || !self.tag_stack.is_empty()
    }

    pub fn keyword_depth(&self) -> usize {
        self.keyword_stack.len()
    }

    /// Feeds one token through the tracker. Tokens must arrive in source
    /// order from a single tokenizer pass.
    pub fn observe(&mut self, token: &Token, source: &str) {
        match token.kind {
            // Layout and comments decide nothing; a pending closer stays
            // pending across them.
            TokenKind::Whitespace | TokenKind::LineComment | TokenKind::BlockComment => {}
            TokenKind::Word => self.observe_word(token.text(source)),
            TokenKind::Delimiter => {
                self.resolve_pending();
                // An opener directly followed by the delimiter did not open
                // a block (`BEGIN;` starting a transaction).
                if self.just_pushed {
                    self.keyword_stack.pop();
                }
                self.just_pushed = false;
            }
            TokenKind::TaggedBlockOpen => {
                self.resolve_pending();
                self.just_pushed = false;
                let text = token.text(source);
                self.tag_stack.push(text.to_string());
            }
            TokenKind::TaggedBlockClose => {
                // The tokenizer only emits a close matching the innermost
                // open tag, so a bare pop is safe.
                self.tag_stack.pop();
            }
            TokenKind::TaggedBlockBody => {}
            TokenKind::StringLiteral | TokenKind::QuotedIdentifier | TokenKind::Other => {
                self.resolve_pending();
                self.just_pushed = false;
            }
        }
    }

    fn observe_word(&mut self, word: &str) {
        if let Some(first) = self.pending_closer.take() {
            let compound = format!("{first} {}", word.to_ascii_uppercase());
            if self.top_accepts(&compound) || self.descriptor.is_closer_spelling(&compound) {
                self.close(&compound);
                self.just_pushed = false;
                return;
            }
            // The second word did not extend the closer; the first word
            // closes on its own and `word` is classified fresh below.
            self.close(&first);
        }

        if self.just_pushed {
            self.just_pushed = false;
            if let Some(top) = self.keyword_stack.last() {
                if let Some(pair) = self.descriptor.opener_pair(&top.opener) {
                    if pair.is_non_block_follower(word) {
                        self.keyword_stack.pop();
                        return;
                    }
                }
            }
        }

        if let Some(pair) = self.descriptor.opener_pair(word) {
            if pair.kind() == BlockKind::Body
                && self
                    .keyword_stack
                    .last()
                    .is_some_and(|top| top.awaiting_body)
            {
                // DECLARE ... BEGIN: the body belongs to the open header
                // block, it does not nest.
                if let Some(top) = self.keyword_stack.last_mut() {
                    top.awaiting_body = false;
                }
            } else {
                self.keyword_stack.push(OpenBlock {
                    opener: pair.opener().to_string(),
                    awaiting_body: pair.kind() == BlockKind::Header,
                });
                self.just_pushed = true;
            }
            return;
        }

        if self.descriptor.is_closer_first_word(word) {
            if self.descriptor.has_two_word_closer_starting(word) {
                self.pending_closer = Some(word.to_ascii_uppercase());
            } else {
                self.close(&word.to_ascii_uppercase());
            }
        }
    }

    /// Flushes a closer held for two-word lookahead; call once input ends.
    pub fn finish(&mut self) {
        self.resolve_pending();
        self.just_pushed = false;
    }

    /// Resolves a held closer first word as a single-word closer.
    fn resolve_pending(&mut self) {
        if let Some(first) = self.pending_closer.take() {
            self.close(&first);
        }
    }

    /// True if `spelling` closes the innermost open block.
    fn top_accepts(&self, spelling: &str) -> bool {
        self.keyword_stack
            .last()
            .is_some_and(|top| self.descriptor.closes(&top.opener, spelling))
    }

    fn close(&mut self, spelling: &str) {
        if self.top_accepts(spelling) {
            self.keyword_stack.pop();
        } else if self.descriptor.is_closer_spelling(spelling) {
            match self.keyword_stack.last() {
                Some(top) => debug!(
                    closer = spelling,
                    open = top.opener.as_str(),
                    "block closer does not match the innermost open block"
                ),
                None => debug!(closer = spelling, "block closer without an open block"),
            }
            // `END` closes whatever is open even when the pairing table
            // expected a more specific spelling; only a genuinely empty
            // stack leaves the depth untouched.
            if spelling == "END" {
                self.keyword_stack.pop();
            }
        }
    }
}

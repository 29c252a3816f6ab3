//! Dialect descriptors.
//!
//! All dialect-specific behavior of the splitter is data carried by
//! [DialectDescriptor]: the statement delimiter, quote pairs, comment
//! markers, compound-block keyword pairs, and the optional tagged-block
//! (dollar-quote) marker. The tokenizer, balance tracker and splitter
//! contain no per-dialect branching; adding a dialect means writing a new
//! descriptor, not touching the scanning code.

use std::collections::BTreeSet;
use std::fmt::Display;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use sqlsplit_common::{SplitError, SplitResult};

use crate::keywords::{contains_ignore_ascii_case, lookup_ignore_ascii_case};

/// A named SQL dialect with a preset descriptor.
#[derive(
    Copy,
    Clone,
    Default,
    Debug,
    Serialize,
    Deserialize,
    Eq,
    PartialEq,
    Ord,
    PartialOrd,
    Hash,
    strum_macros::EnumIter,
)]
pub enum Dialect {
    #[default]
    Generic,
    #[serde(alias = "Postgresql")]
    Postgres,
    Oracle,
    MySql,
    #[serde(alias = "Tsql")]
    SqlServer,
}

impl Display for Dialect {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Dialect::Generic => write!(f, "generic"),
            Dialect::Postgres => write!(f, "postgres"),
            Dialect::Oracle => write!(f, "oracle"),
            Dialect::MySql => write!(f, "mysql"),
            Dialect::SqlServer => write!(f, "sqlserver"),
        }
    }
}

impl FromStr for Dialect {
    type Err = SplitError;

    fn from_str(input: &str) -> Result<Dialect, Self::Err> {
        match input.to_ascii_lowercase().as_str() {
            "generic" => Ok(Dialect::Generic),
            "postgres" | "postgresql" => Ok(Dialect::Postgres),
            "oracle" => Ok(Dialect::Oracle),
            "mysql" | "mariadb" => Ok(Dialect::MySql),
            "sqlserver" | "mssql" | "tsql" => Ok(Dialect::SqlServer),
            _ => Err(SplitError::config(format!(
                "Invalid dialect value: '{input}'"
            ))),
        }
    }
}

impl Dialect {
    /// The preset descriptor for this dialect.
    ///
    /// Descriptors are plain values; callers that need non-standard rules
    /// (e.g. a custom delimiter) should build their own via
    /// [DialectDescriptor::builder].
    pub fn descriptor(&self) -> DialectDescriptor {
        let builder = match self {
            Dialect::Generic => DialectDescriptor::builder()
                .quote(QuotePair::string('\'', '\'', EscapeStyle::Doubling))
                .quote(QuotePair::identifier('"', '"', EscapeStyle::Doubling))
                .line_comment("--")
                .block_comment("/*", "*/")
                .extra_word_chars("$#")
                .block_pair(BlockKeywordPair::body("BEGIN", &["END"])),
            // Top-level Postgres SQL is scoped tightly: procedural bodies
            // arrive dollar-quoted and are opaque to the tracker, so the
            // PL/pgSQL keywords (IF, LOOP, DECLARE) must not be in this
            // table — they would capture `DROP ... IF EXISTS` or
            // `DECLARE c CURSOR`. BEGIN stays for `BEGIN ATOMIC` function
            // bodies, with the transaction forms cancelled.
            Dialect::Postgres => DialectDescriptor::builder()
                .quote(QuotePair::string('\'', '\'', EscapeStyle::Doubling))
                .quote(QuotePair::identifier('"', '"', EscapeStyle::Doubling))
                .line_comment("--")
                .block_comment("/*", "*/")
                .tagged_block_marker('$')
                .extra_word_chars("$")
                .block_pair(
                    BlockKeywordPair::body("BEGIN", &["END"]).non_block_followers(&[
                        "TRANSACTION",
                        "WORK",
                        "ISOLATION",
                        "READ",
                        "NOT",
                        "DEFERRABLE",
                    ]),
                )
                .block_pair(BlockKeywordPair::plain("CASE", &["END CASE", "END"]))
                .control_command(ControlCommandRule::Prefix('\\')),
            Dialect::Oracle => DialectDescriptor::builder()
                .quote(QuotePair::string('\'', '\'', EscapeStyle::Doubling))
                .quote(QuotePair::identifier('"', '"', EscapeStyle::None))
                .line_comment("--")
                .block_comment("/*", "*/")
                .extra_word_chars("$#")
                .block_pair(BlockKeywordPair::body("BEGIN", &["END"]))
                .block_pair(BlockKeywordPair::header("DECLARE", &["END"]))
                .block_pair(BlockKeywordPair::plain("CASE", &["END CASE", "END"]))
                .block_pair(BlockKeywordPair::plain("IF", &["END IF"]))
                .block_pair(BlockKeywordPair::plain("LOOP", &["END LOOP"]))
                .control_command(ControlCommandRule::Bare("/".to_string())),
            // `#` is a comment marker here, so it must not be a word
            // character; `$` is legal in unquoted MySQL identifiers.
            Dialect::MySql => DialectDescriptor::builder()
                .quote(QuotePair::string('\'', '\'', EscapeStyle::Backslash))
                .quote(QuotePair::string('"', '"', EscapeStyle::Backslash))
                .quote(QuotePair::identifier('`', '`', EscapeStyle::Doubling))
                .line_comment("--")
                .line_comment("#")
                .block_comment("/*", "*/")
                .extra_word_chars("$")
                .block_pair(BlockKeywordPair::body("BEGIN", &["END"])),
            Dialect::SqlServer => DialectDescriptor::builder()
                .quote(QuotePair::string('\'', '\'', EscapeStyle::Doubling))
                .quote(QuotePair::identifier('"', '"', EscapeStyle::Doubling))
                .quote(QuotePair::identifier('[', ']', EscapeStyle::Doubling))
                .line_comment("--")
                .block_comment("/*", "*/")
                .extra_word_chars("$#@")
                .block_pair(
                    BlockKeywordPair::body("BEGIN", &["END"]).non_block_followers(&[
                        "TRANSACTION",
                        "TRAN",
                        "DISTRIBUTED",
                        "DIALOG",
                        "CONVERSATION",
                    ]),
                )
                .block_pair(BlockKeywordPair::plain("CASE", &["END"]))
                .control_command(ControlCommandRule::Line("GO".to_string())),
        };
        builder
            .build()
            .expect("preset dialect descriptors are valid")
    }
}

/// How a closing quote character is escaped inside the quoted run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EscapeStyle {
    /// The closer escapes itself by doubling (`''`, `""`, `]]`).
    Doubling,
    /// A backslash escapes the following character.
    Backslash,
    /// No escaping; the first closer terminates the run.
    None,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum QuoteKind {
    String,
    Identifier,
}

/// An open/close quote character pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuotePair {
    pub open: char,
    pub close: char,
    pub escape: EscapeStyle,
    pub kind: QuoteKind,
}

impl QuotePair {
    pub fn string(open: char, close: char, escape: EscapeStyle) -> Self {
        QuotePair {
            open,
            close,
            escape,
            kind: QuoteKind::String,
        }
    }

    pub fn identifier(open: char, close: char, escape: EscapeStyle) -> Self {
        QuotePair {
            open,
            close,
            escape,
            kind: QuoteKind::Identifier,
        }
    }
}

/// A comment marker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum CommentMarker {
    /// Comment from the marker to end of line.
    Line(String),
    /// Comment between a start and an end marker.
    Block(String, String),
}

/// How a compound-block opener nests.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum BlockKind {
    /// Ordinary nesting block (CASE, IF, LOOP).
    #[default]
    Plain,
    /// Opens a block whose body is introduced by a separate [BlockKind::Body]
    /// opener without additional nesting: `DECLARE ... BEGIN ... END`.
    Header,
    /// Block body opener; fuses with an immediately enclosing, unconsumed
    /// `Header` instead of nesting (BEGIN after DECLARE).
    Body,
}

/// One compound-block keyword pairing: an opener and its valid closing
/// spellings. Closers may be one or two words (`END`, `END IF`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockKeywordPair {
    opener: String,
    closers: Vec<String>,
    kind: BlockKind,
    /// Words that, immediately after the opener, mean it does not open a
    /// block at all (`BEGIN TRANSACTION` in T-SQL).
    non_block_followers: Vec<String>,
}

impl BlockKeywordPair {
    pub fn new(opener: &str, closers: &[&str], kind: BlockKind) -> Self {
        BlockKeywordPair {
            opener: opener.to_ascii_uppercase(),
            closers: closers.iter().map(|c| c.to_ascii_uppercase()).collect(),
            kind,
            non_block_followers: Vec::new(),
        }
    }

    pub fn plain(opener: &str, closers: &[&str]) -> Self {
        Self::new(opener, closers, BlockKind::Plain)
    }

    pub fn header(opener: &str, closers: &[&str]) -> Self {
        Self::new(opener, closers, BlockKind::Header)
    }

    pub fn body(opener: &str, closers: &[&str]) -> Self {
        Self::new(opener, closers, BlockKind::Body)
    }

    pub fn non_block_followers(mut self, words: &[&str]) -> Self {
        self.non_block_followers = words.iter().map(|w| w.to_ascii_uppercase()).collect();
        self
    }

    pub fn opener(&self) -> &str {
        &self.opener
    }

    pub fn closers(&self) -> &[String] {
        &self.closers
    }

    pub fn kind(&self) -> BlockKind {
        self.kind
    }

    pub fn is_non_block_follower(&self, word: &str) -> bool {
        self.non_block_followers
            .iter()
            .any(|w| w.eq_ignore_ascii_case(word))
    }
}

/// A dialect-specific non-SQL directive recognized at statement start and
/// passed through opaquely.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ControlCommandRule {
    /// A leading character introduces a one-line command (`\connect`).
    Prefix(char),
    /// A word starting a line introduces a one-line command that may take
    /// arguments (`GO`, `GO 5`).
    Line(String),
    /// A word (or single symbol) that is a command only when the rest of
    /// its line is blank (`/`). Keeps `/ 2` on a continuation line as SQL.
    Bare(String),
}

/// Immutable, per-dialect table of lexical rules.
///
/// Shared read-only across parses and threads; construction validates the
/// table once, parsing never raises configuration errors.
#[derive(Debug, Clone, PartialEq)]
pub struct DialectDescriptor {
    delimiter: char,
    quote_pairs: Vec<QuotePair>,
    comment_markers: Vec<CommentMarker>,
    block_keyword_pairs: Vec<BlockKeywordPair>,
    tagged_block_marker: Option<char>,
    control_commands: Vec<ControlCommandRule>,
    extra_word_chars: Vec<char>,

    // Derived lookup tables, sorted uppercase.
    openers: Vec<String>,
    closer_first_words: Vec<String>,
    two_word_closer_firsts: Vec<String>,
    closer_spellings: Vec<String>,
}

impl DialectDescriptor {
    pub fn builder() -> DialectDescriptorBuilder {
        DialectDescriptorBuilder::new()
    }

    pub fn delimiter(&self) -> char {
        self.delimiter
    }

    pub fn quote_pairs(&self) -> &[QuotePair] {
        &self.quote_pairs
    }

    pub fn comment_markers(&self) -> &[CommentMarker] {
        &self.comment_markers
    }

    pub fn block_keyword_pairs(&self) -> &[BlockKeywordPair] {
        &self.block_keyword_pairs
    }

    pub fn tagged_block_marker(&self) -> Option<char> {
        self.tagged_block_marker
    }

    pub fn control_commands(&self) -> &[ControlCommandRule] {
        &self.control_commands
    }

    /// True if `c` continues a word in this dialect beyond the universal
    /// identifier characters (`$` in Postgres and MySQL, `#`/`@` where no
    /// comment marker claims them).
    pub fn is_extra_word_char(&self, c: char) -> bool {
        self.extra_word_chars.contains(&c)
    }

    /// The quote pair opened by `c`, if any.
    pub fn quote_pair_for(&self, c: char) -> Option<&QuotePair> {
        self.quote_pairs.iter().find(|p| p.open == c)
    }

    /// If `rest` starts with a line-comment marker, its byte length.
    pub fn match_line_comment(&self, rest: &str) -> Option<usize> {
        self.comment_markers.iter().find_map(|m| match m {
            CommentMarker::Line(start) if rest.starts_with(start.as_str()) => Some(start.len()),
            _ => None,
        })
    }

    /// If `rest` starts with a block-comment start marker, the marker's
    /// byte length and the matching end marker.
    pub fn match_block_comment(&self, rest: &str) -> Option<(usize, &str)> {
        self.comment_markers.iter().find_map(|m| match m {
            CommentMarker::Block(start, end) if rest.starts_with(start.as_str()) => {
                Some((start.len(), end.as_str()))
            }
            _ => None,
        })
    }

    /// True if `word` is a block opener or the first word of a closer;
    /// word-boundary matching only, by construction of the tokenizer.
    pub fn is_keyword_candidate(&self, word: &str) -> bool {
        contains_ignore_ascii_case(&self.openers, word)
            || contains_ignore_ascii_case(&self.closer_first_words, word)
    }

    /// The pairing entry opened by `word`, if any.
    pub fn opener_pair(&self, word: &str) -> Option<&BlockKeywordPair> {
        let canonical = lookup_ignore_ascii_case(&self.openers, word)?;
        self.block_keyword_pairs
            .iter()
            .find(|p| p.opener == canonical)
    }

    pub fn is_closer_first_word(&self, word: &str) -> bool {
        contains_ignore_ascii_case(&self.closer_first_words, word)
    }

    /// True if some closer in the table is spelled as two words starting
    /// with `word` (`END IF`, `END CASE`).
    pub fn has_two_word_closer_starting(&self, word: &str) -> bool {
        contains_ignore_ascii_case(&self.two_word_closer_firsts, word)
    }

    /// True if `spelling` (uppercase, single- or two-word) closes a block
    /// opened by `opener` (canonical uppercase), per the pairing table.
    pub fn closes(&self, opener: &str, spelling: &str) -> bool {
        self.block_keyword_pairs
            .iter()
            .filter(|p| p.opener == opener)
            .any(|p| p.closers.iter().any(|c| c == spelling))
    }

    /// True if `spelling` is a valid closer for *some* opener. Used to
    /// distinguish an unbalanced closer (logged anomaly) from plain text.
    pub fn is_closer_spelling(&self, spelling: &str) -> bool {
        contains_ignore_ascii_case(&self.closer_spellings, spelling)
    }
}

/// Builder for [DialectDescriptor]; [DialectDescriptorBuilder::build]
/// validates the table and is the only fallible step.
#[derive(Debug, Clone, Default)]
pub struct DialectDescriptorBuilder {
    delimiter: char,
    quote_pairs: Vec<QuotePair>,
    comment_markers: Vec<CommentMarker>,
    block_keyword_pairs: Vec<BlockKeywordPair>,
    tagged_block_marker: Option<char>,
    control_commands: Vec<ControlCommandRule>,
    extra_word_chars: Vec<char>,
}

impl DialectDescriptorBuilder {
    fn new() -> Self {
        DialectDescriptorBuilder {
            delimiter: ';',
            ..Default::default()
        }
    }

    pub fn delimiter(mut self, delimiter: char) -> Self {
        self.delimiter = delimiter;
        self
    }

    pub fn quote(mut self, pair: QuotePair) -> Self {
        self.quote_pairs.push(pair);
        self
    }

    pub fn line_comment(mut self, marker: &str) -> Self {
        self.comment_markers
            .push(CommentMarker::Line(marker.to_string()));
        self
    }

    pub fn block_comment(mut self, start: &str, end: &str) -> Self {
        self.comment_markers
            .push(CommentMarker::Block(start.to_string(), end.to_string()));
        self
    }

    pub fn block_pair(mut self, pair: BlockKeywordPair) -> Self {
        self.block_keyword_pairs.push(pair);
        self
    }

    pub fn tagged_block_marker(mut self, marker: char) -> Self {
        self.tagged_block_marker = Some(marker);
        self
    }

    pub fn control_command(mut self, rule: ControlCommandRule) -> Self {
        self.control_commands.push(rule);
        self
    }

    pub fn extra_word_chars(mut self, chars: &str) -> Self {
        self.extra_word_chars = chars.chars().collect();
        self
    }

    pub fn build(self) -> SplitResult<DialectDescriptor> {
        self.validate()?;

        let mut openers = BTreeSet::new();
        let mut closer_first_words = BTreeSet::new();
        let mut two_word_closer_firsts = BTreeSet::new();
        let mut closer_spellings = BTreeSet::new();
        for pair in &self.block_keyword_pairs {
            openers.insert(pair.opener.clone());
            for closer in &pair.closers {
                closer_spellings.insert(closer.clone());
                let first = closer.split_whitespace().next().unwrap_or_default();
                closer_first_words.insert(first.to_string());
                if closer.split_whitespace().nth(1).is_some() {
                    two_word_closer_firsts.insert(first.to_string());
                }
            }
        }

        Ok(DialectDescriptor {
            delimiter: self.delimiter,
            quote_pairs: self.quote_pairs,
            comment_markers: self.comment_markers,
            block_keyword_pairs: self.block_keyword_pairs,
            tagged_block_marker: self.tagged_block_marker,
            control_commands: self.control_commands,
            extra_word_chars: self.extra_word_chars,
            openers: openers.into_iter().collect(),
            closer_first_words: closer_first_words.into_iter().collect(),
            two_word_closer_firsts: two_word_closer_firsts.into_iter().collect(),
            closer_spellings: closer_spellings.into_iter().collect(),
        })
    }

    fn validate(&self) -> SplitResult<()> {
        let mut quote_opens = BTreeSet::new();
        for pair in &self.quote_pairs {
            if !quote_opens.insert(pair.open) {
                return Err(SplitError::config(format!(
                    "duplicate quote opener '{}'",
                    pair.open
                )));
            }
            if pair.open == self.delimiter || pair.close == self.delimiter {
                return Err(SplitError::config(format!(
                    "quote pair '{}{}' collides with the statement delimiter",
                    pair.open, pair.close
                )));
            }
        }

        if let Some(marker) = self.tagged_block_marker {
            if marker == self.delimiter {
                return Err(SplitError::config(
                    "tagged-block marker collides with the statement delimiter",
                ));
            }
            if quote_opens.contains(&marker) {
                return Err(SplitError::config(
                    "tagged-block marker collides with a quote opener",
                ));
            }
        }

        for marker in &self.comment_markers {
            let start = match marker {
                CommentMarker::Line(start) => start,
                CommentMarker::Block(start, end) => {
                    if end.is_empty() {
                        return Err(SplitError::config("empty block-comment end marker"));
                    }
                    start
                }
            };
            if start.is_empty() {
                return Err(SplitError::config("empty comment marker"));
            }
            if start.starts_with(self.delimiter) {
                return Err(SplitError::config(format!(
                    "comment marker '{start}' collides with the statement delimiter"
                )));
            }
        }

        for c in &self.extra_word_chars {
            if *c == self.delimiter {
                return Err(SplitError::config(format!(
                    "extra word character '{c}' collides with the statement delimiter"
                )));
            }
            if quote_opens.contains(c) {
                return Err(SplitError::config(format!(
                    "extra word character '{c}' collides with a quote opener"
                )));
            }
            let claimed_by_comment = self.comment_markers.iter().any(|m| {
                let start = match m {
                    CommentMarker::Line(start) => start,
                    CommentMarker::Block(start, _) => start,
                };
                start.starts_with(*c)
            });
            if claimed_by_comment {
                return Err(SplitError::config(format!(
                    "extra word character '{c}' collides with a comment marker"
                )));
            }
        }

        let mut seen_openers = BTreeSet::new();
        for pair in &self.block_keyword_pairs {
            if pair.opener.is_empty() || pair.opener.split_whitespace().nth(1).is_some() {
                return Err(SplitError::config(format!(
                    "block opener '{}' must be a single word",
                    pair.opener
                )));
            }
            if !seen_openers.insert(&pair.opener) {
                return Err(SplitError::config(format!(
                    "duplicate block opener '{}'",
                    pair.opener
                )));
            }
            if pair.closers.is_empty() {
                return Err(SplitError::config(format!(
                    "block opener '{}' has no closers",
                    pair.opener
                )));
            }
            for closer in &pair.closers {
                let words = closer.split_whitespace().count();
                if words == 0 || words > 2 {
                    return Err(SplitError::config(format!(
                        "block closer '{closer}' must be one or two words"
                    )));
                }
            }
        }
        // A closer spelled like an opener would make the balance ambiguous.
        for pair in &self.block_keyword_pairs {
            for closer in &pair.closers {
                if seen_openers.contains(closer) {
                    return Err(SplitError::config(format!(
                        "'{closer}' is both a block opener and a closer"
                    )));
                }
            }
        }

        Ok(())
    }
}

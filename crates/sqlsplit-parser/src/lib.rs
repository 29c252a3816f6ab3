//! Dialect-aware SQL script splitting.
//!
//! Cuts a script into individually executable statements without parsing
//! the SQL itself: a pull-based tokenizer skips over strings, comments and
//! tagged (dollar-quoted) blocks, a balance tracker keeps delimiter cuts
//! out of compound BEGIN/END constructs, and all dialect specifics live in
//! a data-driven [DialectDescriptor].
//!
//! ```
//! use sqlsplit_parser::{split_script, Dialect};
//!
//! let elements = split_script("SELECT 1; SELECT 'a;b';", Dialect::Postgres);
//! assert_eq!(elements.len(), 2);
//! assert_eq!(elements[1].text(), "SELECT 'a;b'");
//! ```

pub mod balance;
pub mod dialect;
pub mod document;
mod keywords;
pub mod model;
pub mod splitter;
pub mod stmt_splitter;
pub mod tokenizer;

pub use dialect::{Dialect, DialectDescriptor, DialectDescriptorBuilder};
pub use document::{ScriptDocument, TextDocument};
pub use model::{ElementKind, ScriptElement};
pub use splitter::ScriptSplitter;
pub use stmt_splitter::{split_script, ScriptStmtSplitter, StmtSplitter};
pub use tokenizer::{ScanContext, ScanPosition, ScriptTokenizer};

pub use sqlsplit_common::{CodeLocation, Span, SplitError, SplitErrorKind, SplitResult};

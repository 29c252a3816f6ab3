//! Trait-level entry point for hosts that inject a splitter behind a
//! dynamic interface.

use std::fmt::Debug;

use crate::dialect::Dialect;
use crate::document::TextDocument;
use crate::model::ScriptElement;
use crate::splitter::ScriptSplitter;

/// Splits a SQL script into elements.
pub trait StmtSplitter: Send + Sync + Debug {
    fn split(&self, sql: &str, dialect: Dialect) -> Vec<ScriptElement>;

    /// True if `sql` holds more than one element.
    fn is_multi_statement(&self, sql: &str, dialect: Dialect) -> bool {
        self.split(sql, dialect).len() > 1
    }
}

/// The default [StmtSplitter], backed by [ScriptSplitter] with the
/// dialect's preset descriptor.
#[derive(Debug, Default, Clone, Copy)]
pub struct ScriptStmtSplitter;

impl StmtSplitter for ScriptStmtSplitter {
    fn split(&self, sql: &str, dialect: Dialect) -> Vec<ScriptElement> {
        split_script(sql, dialect)
    }
}

/// Splits `sql` with the preset descriptor of `dialect`.
pub fn split_script(sql: &str, dialect: Dialect) -> Vec<ScriptElement> {
    let descriptor = dialect.descriptor();
    ScriptSplitter::new(&descriptor).split(&TextDocument::new(sql))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trait_object() {
        let splitter: Box<dyn StmtSplitter> = Box::new(ScriptStmtSplitter);
        let elements = splitter.split("SELECT 1; SELECT 2", Dialect::Generic);
        assert_eq!(elements.len(), 2);
        assert!(splitter.is_multi_statement("SELECT 1; SELECT 2", Dialect::Generic));
        assert!(!splitter.is_multi_statement("SELECT 1;", Dialect::Generic));
    }
}

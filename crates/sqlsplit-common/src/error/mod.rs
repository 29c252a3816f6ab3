//! Error handling.
//!
//! There is exactly one fallible surface in this workspace: dialect
//! descriptor construction. Parsing itself never fails for input-shape
//! reasons (partial scripts are expected input), and out-of-range document
//! access is a caller bug that asserts instead of returning an error.

mod code_location;

use std::fmt;

pub use code_location::CodeLocation;

pub type SplitResult<T> = Result<T, SplitError>;

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum SplitErrorKind {
    /// A dialect descriptor with self-contradictory rules.
    Configuration,
    /// Invariant violation inside the splitter itself.
    Internal,
}

impl SplitErrorKind {
    fn description(&self) -> &'static str {
        match self {
            Self::Configuration => "Configuration error",
            Self::Internal => "Internal error",
        }
    }
}

impl fmt::Display for SplitErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.description())
    }
}

/// Error raised while assembling a dialect descriptor.
#[derive(Debug, Clone)]
pub struct SplitError {
    kind: SplitErrorKind,
    message: String,
}

impl SplitError {
    pub fn new(kind: SplitErrorKind, msg: impl Into<String>) -> Self {
        Self {
            kind,
            message: msg.into(),
        }
    }

    pub fn config(msg: impl Into<String>) -> Self {
        Self::new(SplitErrorKind::Configuration, msg)
    }

    pub fn kind(&self) -> SplitErrorKind {
        self.kind
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for SplitError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.kind, self.message)
    }
}

impl std::error::Error for SplitError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        let err = SplitError::config("closer 'END LOOP' has no opener");
        assert_eq!(err.kind(), SplitErrorKind::Configuration);
        assert_eq!(
            err.to_string(),
            "Configuration error: closer 'END LOOP' has no opener"
        );
    }
}

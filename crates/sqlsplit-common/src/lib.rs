pub mod error;
pub mod span;

pub use error::CodeLocation;
pub use error::SplitError;
pub use error::SplitErrorKind;
pub use error::SplitResult;
pub use span::Span;

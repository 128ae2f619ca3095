/// Error raised when schema text cannot be parsed.
///
/// Carries the logical file name plus the 1-based line and column where the
/// parser stopped. Parsing is fail-fast: the first error aborts the whole
/// parse and no partial `ProtoFile` is produced.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("syntax error in {file} at {line}:{column}: {message}")]
pub struct ParseError {
    /// Logical name of the file being parsed.
    pub file: String,
    /// 1-based line number of the fault.
    pub line: usize,
    /// 1-based column number of the fault.
    pub column: usize,
    /// Human-readable description of what went wrong.
    pub message: String,
}

mod grammar;
mod scanner;

use crate::error::ParseError;
use crate::types::ProtoFile;

/// Parse proto2 schema text into a [`ProtoFile`].
///
/// `file_name` is the logical name recorded on the result and used in
/// diagnostics; no I/O happens here. The whole parse either succeeds or
/// fails with a single [`ParseError`].
pub fn parse(file_name: &str, source: &str) -> Result<ProtoFile, ParseError> {
    grammar::Parser::new(file_name, source).parse()
}

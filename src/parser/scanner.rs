use crate::error::ParseError;

/// Lexical cursor over proto schema text.
///
/// There is no token stream: the grammar asks for the shape it needs next
/// (a word, an integer, a quoted string, a single character) and the
/// scanner consumes exactly that. Comments encountered while skipping
/// whitespace are either captured into the pending-documentation buffer
/// (at declaration boundaries) or discarded (everywhere else).
pub struct Scanner<'a> {
    file: &'a str,
    src: &'a str,
    /// Byte offset of the cursor.
    pos: usize,
    /// Newlines seen so far.
    line: usize,
    /// Byte offset just past the most recent newline.
    line_start: usize,
    /// Comment text waiting to be attached to the next declaration.
    pending_doc: Option<String>,
}

impl<'a> Scanner<'a> {
    pub fn new(file: &'a str, src: &'a str) -> Self {
        Scanner {
            file,
            src,
            pos: 0,
            line: 0,
            line_start: 0,
            pending_doc: None,
        }
    }

    /// Build a diagnostic at the cursor's current location.
    pub fn err(&self, message: impl Into<String>) -> ParseError {
        ParseError {
            file: self.file.to_string(),
            line: self.line + 1,
            column: self.pos - self.line_start + 1,
            message: message.into(),
        }
    }

    pub fn is_at_end(&self) -> bool {
        self.pos >= self.src.len()
    }

    fn rest(&self) -> &str {
        &self.src[self.pos..]
    }

    fn peek(&self) -> Option<char> {
        self.rest().chars().next()
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += c.len_utf8();
        if c == '\n' {
            self.line += 1;
            self.line_start = self.pos;
        }
        Some(c)
    }

    /// Skip whitespace and comments. Comment bodies go to the pending
    /// documentation buffer only when `capture_docs` is set; the grammar
    /// sets it at declaration boundaries so that comments in the middle of
    /// a declaration never leak onto the following one.
    fn skip_whitespace(&mut self, capture_docs: bool) -> Result<(), ParseError> {
        loop {
            match self.peek() {
                Some(' ') | Some('\t') | Some('\r') | Some('\n') => {
                    self.bump();
                }
                Some('/') if self.rest().starts_with("//") || self.rest().starts_with("/*") => {
                    self.skip_comment(capture_docs)?;
                }
                _ => return Ok(()),
            }
        }
    }

    fn skip_comment(&mut self, capture_docs: bool) -> Result<(), ParseError> {
        self.bump();
        if self.peek() == Some('/') {
            self.bump();
            let body = self.line_comment_body();
            if capture_docs {
                self.push_doc(&body);
            }
            return Ok(());
        }
        // Block comment.
        self.bump();
        let close = match self.rest().find("*/") {
            Some(close) => close,
            None => return Err(self.err("unterminated comment")),
        };
        let interior = self.rest()[..close].to_string();
        for _ in interior.chars() {
            self.bump();
        }
        self.bump();
        self.bump();
        // Only `/**` blocks are documentation; plain `/*` is discarded.
        if capture_docs {
            if let Some(doc) = interior.strip_prefix('*') {
                let body = clean_block_comment(doc);
                self.push_doc(&body);
            }
        }
        Ok(())
    }

    /// Body of a line comment: everything after `//` and one optional
    /// leading space, up to but not including the newline.
    fn line_comment_body(&mut self) -> String {
        if self.peek() == Some(' ') {
            self.bump();
        }
        let start = self.pos;
        while let Some(c) = self.peek() {
            if c == '\n' {
                break;
            }
            self.bump();
        }
        self.src[start..self.pos].trim_end().to_string()
    }

    fn push_doc(&mut self, body: &str) {
        match &mut self.pending_doc {
            Some(doc) => {
                doc.push('\n');
                doc.push_str(body);
            }
            None => self.pending_doc = Some(body.to_string()),
        }
    }

    /// Skip to the next significant character, capturing any comments seen
    /// on the way, and return the documentation accumulated so far. The
    /// buffer is cleared: each declaration either takes its documentation
    /// or drops it, so text never crosses a declaration boundary.
    pub fn collect_documentation(&mut self) -> Result<String, ParseError> {
        self.skip_whitespace(true)?;
        Ok(self.pending_doc.take().unwrap_or_default())
    }

    /// Capture a `//` comment sitting on the same line as just-parsed
    /// input. The probe never crosses a newline and consumes nothing
    /// unless a comment is actually present.
    pub fn trailing_comment(&mut self) -> Option<String> {
        let bytes = self.src.as_bytes();
        let mut look = self.pos;
        while look < bytes.len() && (bytes[look] == b' ' || bytes[look] == b'\t') {
            look += 1;
        }
        if !self.src[look..].starts_with("//") {
            return None;
        }
        while self.pos < look {
            self.bump();
        }
        self.bump();
        self.bump();
        let body = self.line_comment_body();
        if body.is_empty() {
            None
        } else {
            Some(body)
        }
    }

    /// Next significant character, without consuming it.
    pub fn peek_char(&mut self) -> Result<char, ParseError> {
        self.skip_whitespace(false)?;
        self.peek().ok_or_else(|| self.err("unexpected end of file"))
    }

    /// Consume `expected` or fail.
    pub fn expect_char(&mut self, expected: char) -> Result<(), ParseError> {
        if self.peek_char()? != expected {
            return Err(self.err(format!("expected '{}'", expected)));
        }
        self.bump();
        Ok(())
    }

    /// Consume `c` if it is the next significant character.
    pub fn eat_char(&mut self, c: char) -> Result<bool, ParseError> {
        self.skip_whitespace(false)?;
        if self.peek() == Some(c) {
            self.bump();
            Ok(true)
        } else {
            Ok(false)
        }
    }

    /// Read an identifier-like token: ASCII letters, digits, `_`, `-`, and
    /// `.` (type names and option names may be dotted, numbers may be
    /// negative).
    pub fn read_word(&mut self) -> Result<String, ParseError> {
        self.skip_whitespace(false)?;
        let start = self.pos;
        while let Some(c) = self.peek() {
            match c {
                'a'..='z' | 'A'..='Z' | '0'..='9' | '_' | '-' | '.' => {
                    self.bump();
                }
                _ => break,
            }
        }
        if start == self.pos {
            return Err(self.err("expected a word"));
        }
        Ok(self.src[start..self.pos].to_string())
    }

    /// Read an integer in decimal, hexadecimal (`0x`/`0X`), or octal
    /// (leading `0`) form.
    pub fn read_int(&mut self) -> Result<i32, ParseError> {
        let word = self.read_word()?;
        self.int_value(&word)
    }

    /// Integer value of an already-read word, with the same base rules as
    /// [`read_int`](Self::read_int).
    pub fn int_value(&self, word: &str) -> Result<i32, ParseError> {
        let (digits, radix) = if let Some(hex) = word
            .strip_prefix("0x")
            .or_else(|| word.strip_prefix("0X"))
        {
            (hex, 16)
        } else if word.len() > 1 && word.starts_with('0') {
            (&word[1..], 8)
        } else {
            (word, 10)
        };
        i32::from_str_radix(digits, radix)
            .map_err(|_| self.err(format!("expected an integer but was {}", word)))
    }

    /// Read a double-quoted string literal, decoding escape sequences.
    /// Adjacent literals separated only by whitespace concatenate into one
    /// string.
    pub fn read_quoted_string(&mut self) -> Result<String, ParseError> {
        self.skip_whitespace(false)?;
        if self.peek() != Some('"') {
            return Err(self.err("expected '\"'"));
        }
        self.bump();
        let mut result = String::new();
        loop {
            let c = match self.bump() {
                Some(c) => c,
                None => return Err(self.err("unterminated string")),
            };
            match c {
                '"' => {
                    if !self.concatenate_adjacent_literal() {
                        return Ok(result);
                    }
                }
                '\\' => {
                    let escape = self
                        .bump()
                        .ok_or_else(|| self.err("unexpected end of file"))?;
                    match escape {
                        'a' => result.push('\u{7}'),
                        'b' => result.push('\u{8}'),
                        'f' => result.push('\u{c}'),
                        'n' => result.push('\n'),
                        'r' => result.push('\r'),
                        't' => result.push('\t'),
                        'v' => result.push('\u{b}'),
                        'x' | 'X' => result.push(self.read_hex_escape()?),
                        '0'..='7' => result.push(self.read_octal_escape(escape)),
                        // \\, \', \" and any unknown escape: the character itself.
                        other => result.push(other),
                    }
                }
                _ => result.push(c),
            }
        }
    }

    /// After a closing quote, look ahead for another literal separated only
    /// by whitespace. Consumes through the opening quote when found.
    fn concatenate_adjacent_literal(&mut self) -> bool {
        let bytes = self.src.as_bytes();
        let mut look = self.pos;
        while look < bytes.len() && bytes[look].is_ascii_whitespace() {
            look += 1;
        }
        if look < bytes.len() && bytes[look] == b'"' {
            while self.pos <= look {
                self.bump();
            }
            true
        } else {
            false
        }
    }

    /// One or two hex digits after `\x` or `\X`.
    fn read_hex_escape(&mut self) -> Result<char, ParseError> {
        let mut value: Option<u32> = None;
        for _ in 0..2 {
            match self.peek().and_then(|c| c.to_digit(16)) {
                Some(digit) => {
                    self.bump();
                    value = Some(value.unwrap_or(0) * 16 + digit);
                }
                None => break,
            }
        }
        match value {
            Some(value) => Ok((value as u8) as char),
            None => Err(self.err("expected a digit after \\x or \\X")),
        }
    }

    /// Up to three octal digits, the first already consumed.
    fn read_octal_escape(&mut self, first: char) -> char {
        let mut value = first.to_digit(8).unwrap_or(0);
        for _ in 0..2 {
            match self.peek().and_then(|c| c.to_digit(8)) {
                Some(digit) => {
                    self.bump();
                    value = value * 8 + digit;
                }
                None => break,
            }
        }
        // Three octal digits max out at 0o777 = 511, but proto escapes are
        // byte-valued; 0o377 is the largest reachable from valid input.
        (value as u8) as char
    }
}

/// Clean the interior of a `/** ... */` block (leading `/**` and trailing
/// `*/` already stripped). When every non-blank line leads with `*`, the
/// `* ` prefix is stripped and the remaining indentation kept; otherwise
/// each line is trimmed wholesale. Leading and trailing blank lines drop.
fn clean_block_comment(raw: &str) -> String {
    let lines: Vec<&str> = raw.split('\n').collect();
    let starred = lines.iter().all(|line| {
        let trimmed = line.trim_start();
        trimmed.is_empty() || trimmed.starts_with('*')
    });
    let mut cleaned: Vec<&str> = lines
        .iter()
        .map(|line| {
            if starred {
                let stripped = line.trim_start();
                let stripped = stripped.strip_prefix('*').unwrap_or(stripped);
                let stripped = stripped.strip_prefix(' ').unwrap_or(stripped);
                stripped.trim_end()
            } else {
                line.trim()
            }
        })
        .collect();
    while cleaned.first().map_or(false, |line| line.is_empty()) {
        cleaned.remove(0);
    }
    while cleaned.last().map_or(false, |line| line.is_empty()) {
        cleaned.pop();
    }
    cleaned.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scanner(src: &str) -> Scanner<'_> {
        Scanner::new("test.proto", src)
    }

    #[test]
    fn test_read_word() {
        let mut s = scanner("  google.protobuf.FieldOptions ;");
        assert_eq!(s.read_word().unwrap(), "google.protobuf.FieldOptions");
        assert_eq!(s.peek_char().unwrap(), ';');
    }

    #[test]
    fn test_read_word_rejects_punctuation() {
        let mut s = scanner("{");
        assert!(s.read_word().is_err());
    }

    #[test]
    fn test_read_int_bases() {
        assert_eq!(scanner("123").read_int().unwrap(), 123);
        assert_eq!(scanner("0x10").read_int().unwrap(), 16);
        assert_eq!(scanner("0X1f").read_int().unwrap(), 31);
        assert_eq!(scanner("0755").read_int().unwrap(), 493);
        assert_eq!(scanner("0").read_int().unwrap(), 0);
        assert_eq!(scanner("-5").read_int().unwrap(), -5);
        assert!(scanner("pancakes").read_int().is_err());
    }

    #[test]
    fn test_read_quoted_string() {
        let mut s = scanner(r#""hello world""#);
        assert_eq!(s.read_quoted_string().unwrap(), "hello world");
    }

    #[test]
    fn test_control_escapes_decode_to_bytes() {
        let mut s = scanner(r#""\a\b\f\n\r\t\v""#);
        let decoded = s.read_quoted_string().unwrap();
        let bytes: Vec<u8> = decoded.chars().map(|c| c as u8).collect();
        assert_eq!(bytes, vec![0x07, 0x08, 0x0c, 0x0a, 0x0d, 0x09, 0x0b]);
    }

    #[test]
    fn test_octal_and_hex_escapes() {
        let mut s = scanner(r#""\1f\01\001\11\011\111\xe\Xe\xE\x41\X41""#);
        assert_eq!(
            s.read_quoted_string().unwrap(),
            "\u{1}f\u{1}\u{1}\t\tI\u{e}\u{e}\u{e}AA"
        );
    }

    #[test]
    fn test_quote_and_backslash_escapes() {
        let mut s = scanner(r#""a\"b\\c\'d""#);
        assert_eq!(s.read_quoted_string().unwrap(), "a\"b\\c'd");
    }

    #[test]
    fn test_bad_hex_escape() {
        let mut s = scanner(r#""\xW""#);
        let err = s.read_quoted_string().unwrap_err();
        assert!(err.message.contains("expected a digit after \\x or \\X"));
    }

    #[test]
    fn test_unterminated_string() {
        let mut s = scanner(r#""no closing quote"#);
        assert!(s.read_quoted_string().is_err());
    }

    #[test]
    fn test_adjacent_literals_concatenate() {
        let mut s = scanner("\"foo\"  \"bar\"\n\"baz\";");
        assert_eq!(s.read_quoted_string().unwrap(), "foobarbaz");
        assert_eq!(s.peek_char().unwrap(), ';');
    }

    #[test]
    fn test_collect_documentation_joins_line_comments() {
        let mut s = scanner("// Test all\n// the things!\nmessage");
        assert_eq!(s.collect_documentation().unwrap(), "Test all\nthe things!");
        assert_eq!(s.read_word().unwrap(), "message");
        // Taken once; gone afterwards.
        assert_eq!(s.collect_documentation().unwrap(), "");
    }

    #[test]
    fn test_line_comment_keeps_indentation_after_first_space() {
        let mut s = scanner("// Test\n//   All\nx");
        assert_eq!(s.collect_documentation().unwrap(), "Test\n  All");
    }

    #[test]
    fn test_doc_block_single_line() {
        let mut s = scanner("/** Test */\nx");
        assert_eq!(s.collect_documentation().unwrap(), "Test");
    }

    #[test]
    fn test_doc_block_with_asterisks() {
        let mut s = scanner("/**\n * Test\n *\n * Foo\n */\nx");
        assert_eq!(s.collect_documentation().unwrap(), "Test\n\nFoo");
    }

    #[test]
    fn test_doc_block_asterisks_keep_indentation() {
        let mut s = scanner("/**\n * Test\n *   All\n *     The\n *       Things!\n */\nx");
        assert_eq!(
            s.collect_documentation().unwrap(),
            "Test\n  All\n    The\n      Things!"
        );
    }

    #[test]
    fn test_doc_block_without_asterisks_trims_wholesale() {
        let mut s = scanner("/**\n Test\n   All\n     The\n       Things!\n */\nx");
        assert_eq!(
            s.collect_documentation().unwrap(),
            "Test\nAll\nThe\nThings!"
        );
    }

    #[test]
    fn test_plain_block_comment_is_discarded() {
        let mut s = scanner("/* not documentation */\nx");
        assert_eq!(s.collect_documentation().unwrap(), "");
        assert_eq!(s.read_word().unwrap(), "x");
    }

    #[test]
    fn test_unterminated_block_comment() {
        let mut s = scanner("/* forever");
        assert!(s.collect_documentation().is_err());
    }

    #[test]
    fn test_trailing_comment_same_line() {
        let mut s = scanner("; // trailing\nnext");
        s.expect_char(';').unwrap();
        assert_eq!(s.trailing_comment().as_deref(), Some("trailing"));
        assert_eq!(s.collect_documentation().unwrap(), "");
        assert_eq!(s.read_word().unwrap(), "next");
    }

    #[test]
    fn test_trailing_comment_does_not_cross_newline() {
        let mut s = scanner(";\n// belongs to the next declaration\nnext");
        s.expect_char(';').unwrap();
        assert_eq!(s.trailing_comment(), None);
        assert_eq!(
            s.collect_documentation().unwrap(),
            "belongs to the next declaration"
        );
    }

    #[test]
    fn test_mid_declaration_comments_are_discarded() {
        let mut s = scanner("foo /* noise */ bar // more noise\nbaz");
        assert_eq!(s.read_word().unwrap(), "foo");
        assert_eq!(s.read_word().unwrap(), "bar");
        assert_eq!(s.read_word().unwrap(), "baz");
        assert_eq!(s.collect_documentation().unwrap(), "");
    }

    #[test]
    fn test_err_location() {
        let mut s = scanner("a\nbb\n   !");
        s.read_word().unwrap();
        s.read_word().unwrap();
        s.skip_whitespace(false).unwrap();
        let err = s.err("boom");
        assert_eq!(err.line, 3);
        assert_eq!(err.column, 4);
        assert_eq!(err.file, "test.proto");
    }

    #[test]
    fn test_crlf_is_whitespace() {
        let mut s = scanner("a\r\nb");
        assert_eq!(s.read_word().unwrap(), "a");
        assert_eq!(s.read_word().unwrap(), "b");
    }
}

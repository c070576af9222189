//! This scanner tokenizes krisp source.
//!
//! Tokens are produced lazily, one per call to `next_token`, and never own
//! their text: each carries a span into the source buffer instead.
//! Bytes that do not start a token (whitespace included) are skipped.

/// Every kind of token the scanner may produce.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum TokenKind {
    OpenGroup,
    CloseGroup,
    NumericLiteral,
    Plus,
    Minus,
    Identifier,
    EndOfInput,
}

/// Half-open byte range `start..end` into the source buffer.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    pub fn new(start: usize, end: usize) -> Self {
        Span { start, end }
    }

    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }
}

#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub struct Token {
    pub kind: TokenKind,
    pub span: Span,
}

impl Token {
    fn new(kind: TokenKind, start: usize, end: usize) -> Self {
        Token { kind, span: Span::new(start, end) }
    }

    /// Returns the slice of `source` this token was scanned from.
    /// Every token the scanner produces is ASCII, so this never fails
    /// for tokens taken from the same source.
    pub fn text<'a>(&self, source: &'a [u8]) -> &'a str {
        std::str::from_utf8(&source[self.span.start..self.span.end]).unwrap_or("")
    }
}

pub struct Scanner<'a> {
    source: &'a [u8],
    cursor: usize,
}

impl<'a> Scanner<'a> {
    pub fn new(source: &'a [u8]) -> Self {
        Scanner { source, cursor: 0 }
    }

    /// Current byte offset. Never decreases.
    pub fn position(&self) -> usize {
        self.cursor
    }

    /// Scans and returns the next token.
    /// Once the source is exhausted every call returns the same
    /// `EndOfInput` token without moving the cursor.
    pub fn next_token(&mut self) -> Token {
        while let Some(&c) = self.source.get(self.cursor) {
            let start = self.cursor;
            let single = match c {
                b'(' => Some(TokenKind::OpenGroup),
                b')' => Some(TokenKind::CloseGroup),
                b'+' => Some(TokenKind::Plus),
                b'-' => Some(TokenKind::Minus),
                _ => None,
            };

            if let Some(kind) = single {
                self.cursor += 1;
                return Token::new(kind, start, self.cursor);
            }

            if c == b'_' || c.is_ascii_alphabetic() {
                return self.identifier();
            }

            if c.is_ascii_digit() {
                return self.number();
            }

            self.cursor += 1;
        }

        Token::new(TokenKind::EndOfInput, self.source.len(), self.source.len())
    }

    /// Consumes `[A-Za-z_][A-Za-z0-9_]*`.
    fn identifier(&mut self) -> Token {
        let start = self.cursor;
        self.cursor += 1;
        self.skip_while(|b| b == b'_' || b.is_ascii_alphanumeric());
        Token::new(TokenKind::Identifier, start, self.cursor)
    }

    fn number(&mut self) -> Token {
        let start = self.cursor;
        self.skip_while(|b| b.is_ascii_digit());
        assert!(self.cursor > start, "numeric scan at offset {} consumed no digits", start);
        Token::new(TokenKind::NumericLiteral, start, self.cursor)
    }

    fn skip_while<F: Fn(u8) -> bool>(&mut self, pred: F) {
        while let Some(&b) = self.source.get(self.cursor) {
            if !pred(b) {
                break;
            }
            self.cursor += 1;
        }
    }
}

/// Yields every token up to, but not including, `EndOfInput`.
impl<'a> Iterator for Scanner<'a> {
    type Item = Token;

    fn next(&mut self) -> Option<Token> {
        match self.next_token() {
            Token { kind: TokenKind::EndOfInput, .. } => None,
            tok => Some(tok),
        }
    }
}

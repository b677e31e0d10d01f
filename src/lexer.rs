use crate::token::{lookup_keyword, Token, TokenKind};

/// Formats the normalized literal payload of a number token: shortest
/// round-trip decimal, with `.0` appended when integral. `123` scans to
/// `"123.0"`, `10.400` to `"10.4"`.
pub fn number_literal(value: f64) -> String {
    let repr = value.to_string();
    if repr.contains('.') {
        repr
    } else {
        repr + ".0"
    }
}

/// Byte scanner turning source text into tokens. Never fails: stray
/// bytes become `Illegal` tokens and a string left open at end of input
/// becomes `UnterminatedString`.
pub struct Lexer<'a> {
    input: &'a [u8],
    pos: usize,
    line: usize,
}

impl<'a> Lexer<'a> {
    pub fn new(source: &'a str) -> Self {
        Self {
            input: source.as_bytes(),
            pos: 0,
            line: 1,
        }
    }

    fn peek(&self) -> Option<u8> {
        self.input.get(self.pos).copied()
    }

    fn peek_next(&self) -> Option<u8> {
        self.input.get(self.pos + 1).copied()
    }

    fn advance(&mut self) -> Option<u8> {
        let ch = self.peek()?;
        self.pos += 1;
        Some(ch)
    }

    fn skip_whitespace_and_comments(&mut self) {
        while let Some(ch) = self.peek() {
            match ch {
                b' ' | b'\t' | b'\r' => {
                    self.pos += 1;
                }
                b'\n' => {
                    self.line += 1;
                    self.pos += 1;
                }
                b'/' if self.peek_next() == Some(b'/') => {
                    while let Some(ch) = self.peek() {
                        if ch == b'\n' {
                            break;
                        }
                        self.pos += 1;
                    }
                }
                _ => break,
            }
        }
    }

    /// Scans the next token. After the end of input this keeps
    /// returning `Eof` tokens.
    pub fn next_token(&mut self) -> Token {
        self.skip_whitespace_and_comments();

        let Some(ch) = self.advance() else {
            return Token::bare(TokenKind::Eof, "", self.line);
        };

        match ch {
            b'(' => Token::bare(TokenKind::LeftParen, "(", self.line),
            b')' => Token::bare(TokenKind::RightParen, ")", self.line),
            b'{' => Token::bare(TokenKind::LeftBrace, "{", self.line),
            b'}' => Token::bare(TokenKind::RightBrace, "}", self.line),
            b',' => Token::bare(TokenKind::Comma, ",", self.line),
            b'.' => Token::bare(TokenKind::Dot, ".", self.line),
            b';' => Token::bare(TokenKind::Semicolon, ";", self.line),
            b'+' => Token::bare(TokenKind::Plus, "+", self.line),
            b'-' => Token::bare(TokenKind::Minus, "-", self.line),
            b'*' => Token::bare(TokenKind::Star, "*", self.line),
            b'/' => Token::bare(TokenKind::Slash, "/", self.line),
            b'=' => self.one_or_two(TokenKind::Equal, "=", TokenKind::EqualEqual, "=="),
            b'!' => self.one_or_two(TokenKind::Bang, "!", TokenKind::BangEqual, "!="),
            b'<' => self.one_or_two(TokenKind::Less, "<", TokenKind::LessEqual, "<="),
            b'>' => self.one_or_two(TokenKind::Greater, ">", TokenKind::GreaterEqual, ">="),
            b'"' => self.scan_string(),
            b'0'..=b'9' => self.scan_number(),
            b'a'..=b'z' | b'A'..=b'Z' | b'_' => self.scan_identifier(),
            other => Token::bare(TokenKind::Illegal, (other as char).to_string(), self.line),
        }
    }

    fn one_or_two(
        &mut self,
        single: TokenKind,
        single_lexeme: &str,
        double: TokenKind,
        double_lexeme: &str,
    ) -> Token {
        if self.peek() == Some(b'=') {
            self.pos += 1;
            Token::bare(double, double_lexeme, self.line)
        } else {
            Token::bare(single, single_lexeme, self.line)
        }
    }

    // The opening quote has already been consumed. Strings may span
    // newlines; the token reports the opening line.
    fn scan_string(&mut self) -> Token {
        let start_line = self.line;
        let start = self.pos;
        loop {
            match self.advance() {
                None => return Token::new(TokenKind::UnterminatedString, "", "", start_line),
                Some(b'"') => break,
                Some(b'\n') => self.line += 1,
                Some(_) => {}
            }
        }
        let contents = String::from_utf8_lossy(&self.input[start..self.pos - 1]).into_owned();
        Token::new(
            TokenKind::String,
            format!("\"{}\"", contents),
            contents.clone(),
            start_line,
        )
    }

    // The first digit has already been consumed. A trailing `.` with no
    // digit after it is not part of the number.
    fn scan_number(&mut self) -> Token {
        let start = self.pos - 1;
        while matches!(self.peek(), Some(b'0'..=b'9')) {
            self.pos += 1;
        }
        if self.peek() == Some(b'.') && matches!(self.peek_next(), Some(b'0'..=b'9')) {
            self.pos += 1;
            while matches!(self.peek(), Some(b'0'..=b'9')) {
                self.pos += 1;
            }
        }
        let lexeme = String::from_utf8_lossy(&self.input[start..self.pos]).into_owned();
        match lexeme.parse::<f64>() {
            Ok(value) => Token::new(TokenKind::Number, lexeme, number_literal(value), self.line),
            Err(_) => Token::bare(TokenKind::Illegal, lexeme, self.line),
        }
    }

    fn scan_identifier(&mut self) -> Token {
        let start = self.pos - 1;
        while matches!(self.peek(), Some(b'a'..=b'z' | b'A'..=b'Z' | b'0'..=b'9' | b'_')) {
            self.pos += 1;
        }
        let lexeme = String::from_utf8_lossy(&self.input[start..self.pos]).into_owned();
        let kind = lookup_keyword(&lexeme).unwrap_or(TokenKind::Identifier);
        Token::bare(kind, lexeme, self.line)
    }
}

/// Scans a whole source into a token vector ending with a single `Eof`.
pub fn tokens(source: &str) -> Vec<Token> {
    let mut lexer = Lexer::new(source);
    let mut out = Vec::new();
    loop {
        let token = lexer.next_token();
        let done = token.is(TokenKind::Eof);
        out.push(token);
        if done {
            return out;
        }
    }
}

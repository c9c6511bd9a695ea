//! Scoring-script lexer — converts source text to a token stream.
//!
//! Features:
//! - All scoring-script tokens (9 reserved words, operators, punctuation,
//!   literals)
//! - Single-line comments stripped (`//`)
//! - Newline- or `;`-separated statements, both emitted as
//!   [`TokenKind::Newline`]
//! - Fail-fast: stops at the first malformed lexeme, which becomes the
//!   author-facing message

use crate::error::ParseError;
use crate::token::{keyword_kind, Pos, Token, TokenKind};

/// The scoring-script lexer.
struct Lexer<'src> {
    /// The full source text as bytes.
    source: &'src [u8],
    /// Current byte offset into `source`.
    pos: usize,
    /// Current line number (1-based).
    line: u32,
    /// Current column number (1-based).
    col: u32,
}

/// Lex the entire source into a token stream ending with [`TokenKind::Eof`].
pub fn lex(source: &str) -> Result<Vec<Token>, ParseError> {
    let mut lexer = Lexer {
        source: source.as_bytes(),
        pos: 0,
        line: 1,
        col: 1,
    };
    let mut tokens = Vec::new();
    loop {
        let token = lexer.next_token()?;
        let is_eof = token.kind == TokenKind::Eof;
        tokens.push(token);
        if is_eof {
            break;
        }
    }
    Ok(tokens)
}

impl<'src> Lexer<'src> {
    // ── Character-level helpers ───────────────────────────────────

    fn peek(&self) -> Option<u8> {
        self.source.get(self.pos).copied()
    }

    fn peek_at(&self, offset: usize) -> Option<u8> {
        self.source.get(self.pos + offset).copied()
    }

    fn advance(&mut self) -> Option<u8> {
        let ch = self.source.get(self.pos).copied()?;
        self.pos += 1;
        if ch == b'\n' {
            self.line += 1;
            self.col = 1;
        } else {
            self.col += 1;
        }
        Some(ch)
    }

    fn here(&self) -> Pos {
        Pos::new(self.line, self.col)
    }

    fn error(&self, message: impl Into<String>, pos: Pos) -> ParseError {
        ParseError::new(message, pos.line, pos.col)
    }

    // ── Scanning ──────────────────────────────────────────────────

    /// Skip spaces, tabs, carriage returns, and `//` comments.
    /// Newlines are significant and left for `next_token`.
    fn skip_trivia(&mut self) {
        loop {
            match self.peek() {
                Some(b' ') | Some(b'\t') | Some(b'\r') => {
                    self.advance();
                }
                Some(b'/') if self.peek_at(1) == Some(b'/') => {
                    while let Some(ch) = self.peek() {
                        if ch == b'\n' {
                            break;
                        }
                        self.advance();
                    }
                }
                _ => break,
            }
        }
    }

    fn next_token(&mut self) -> Result<Token, ParseError> {
        self.skip_trivia();
        let pos = self.here();

        let Some(ch) = self.peek() else {
            return Ok(Token::new(TokenKind::Eof, pos));
        };

        // Collapse runs of separators into a single Newline token.
        if ch == b'\n' || ch == b';' {
            while matches!(self.peek(), Some(b'\n') | Some(b';')) {
                self.advance();
                self.skip_trivia();
            }
            return Ok(Token::new(TokenKind::Newline, pos));
        }

        if ch.is_ascii_digit() {
            return self.scan_number(pos);
        }
        if ch == b'"' {
            return self.scan_string(pos);
        }
        if ch.is_ascii_alphabetic() || ch == b'_' {
            return Ok(self.scan_identifier(pos));
        }

        self.scan_operator(pos)
    }

    fn scan_number(&mut self, pos: Pos) -> Result<Token, ParseError> {
        let start = self.pos;
        while self.peek().is_some_and(|c| c.is_ascii_digit()) {
            self.advance();
        }
        if self.peek() == Some(b'.') && self.peek_at(1).is_some_and(|c| c.is_ascii_digit()) {
            self.advance();
            while self.peek().is_some_and(|c| c.is_ascii_digit()) {
                self.advance();
            }
        }
        let text = std::str::from_utf8(&self.source[start..self.pos])
            .map_err(|_| self.error("invalid number literal", pos))?;
        let value: f64 = text
            .parse()
            .map_err(|_| self.error(format!("invalid number literal '{text}'"), pos))?;
        Ok(Token::new(TokenKind::NumberLit(value), pos))
    }

    fn scan_string(&mut self, pos: Pos) -> Result<Token, ParseError> {
        self.advance(); // opening quote
        // Collected as bytes so multi-byte UTF-8 passes through intact.
        let mut raw: Vec<u8> = Vec::new();
        loop {
            match self.advance() {
                None | Some(b'\n') => {
                    return Err(self.error("unterminated string literal", pos));
                }
                Some(b'"') => break,
                Some(b'\\') => match self.advance() {
                    Some(b'"') => raw.push(b'"'),
                    Some(b'\\') => raw.push(b'\\'),
                    Some(b'n') => raw.push(b'\n'),
                    Some(b't') => raw.push(b'\t'),
                    other => {
                        let shown = other.map(|c| c as char).unwrap_or(' ');
                        return Err(
                            self.error(format!("unknown escape sequence '\\{shown}'"), pos)
                        );
                    }
                },
                Some(ch) => raw.push(ch),
            }
        }
        let value = String::from_utf8_lossy(&raw).into_owned();
        Ok(Token::new(TokenKind::StringLit(value), pos))
    }

    fn scan_identifier(&mut self, pos: Pos) -> Token {
        let start = self.pos;
        while self
            .peek()
            .is_some_and(|c| c.is_ascii_alphanumeric() || c == b'_')
        {
            self.advance();
        }
        let lexeme = std::str::from_utf8(&self.source[start..self.pos])
            .unwrap_or_default()
            .to_string();
        let kind = keyword_kind(&lexeme).unwrap_or(TokenKind::Identifier(lexeme));
        Token::new(kind, pos)
    }

    fn scan_operator(&mut self, pos: Pos) -> Result<Token, ParseError> {
        let ch = self.advance().unwrap_or(b' ');
        let kind = match ch {
            b'=' if self.peek() == Some(b'=') => {
                self.advance();
                TokenKind::EqEq
            }
            b'=' => TokenKind::Assign,
            b'!' if self.peek() == Some(b'=') => {
                self.advance();
                TokenKind::NotEq
            }
            b'<' if self.peek() == Some(b'=') => {
                self.advance();
                TokenKind::LessEq
            }
            b'<' => TokenKind::Less,
            b'>' if self.peek() == Some(b'=') => {
                self.advance();
                TokenKind::GreaterEq
            }
            b'>' => TokenKind::Greater,
            b'+' => TokenKind::Plus,
            b'-' => TokenKind::Minus,
            b'*' => TokenKind::Star,
            b'/' => TokenKind::Slash,
            b'%' => TokenKind::Percent,
            b'(' => TokenKind::LParen,
            b')' => TokenKind::RParen,
            b'{' => TokenKind::LBrace,
            b'}' => TokenKind::RBrace,
            b'.' => TokenKind::Dot,
            b',' => TokenKind::Comma,
            other => {
                return Err(self.error(
                    format!("unexpected character '{}'", other as char),
                    pos,
                ));
            }
        };
        Ok(Token::new(kind, pos))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(source: &str) -> Vec<TokenKind> {
        lex(source).unwrap().into_iter().map(|t| t.kind).collect()
    }

    #[test]
    fn lexes_assignment() {
        assert_eq!(
            kinds("answer = true"),
            vec![
                TokenKind::Identifier("answer".into()),
                TokenKind::Assign,
                TokenKind::True,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn lexes_field_access_chain() {
        assert_eq!(
            kinds("input.x.value"),
            vec![
                TokenKind::Identifier("input".into()),
                TokenKind::Dot,
                TokenKind::Identifier("x".into()),
                TokenKind::Dot,
                TokenKind::Identifier("value".into()),
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn collapses_separator_runs() {
        assert_eq!(
            kinds("1\n\n;\n2"),
            vec![
                TokenKind::NumberLit(1.0),
                TokenKind::Newline,
                TokenKind::NumberLit(2.0),
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn strips_comments() {
        assert_eq!(
            kinds("// grading\nanswer"),
            vec![
                TokenKind::Newline,
                TokenKind::Identifier("answer".into()),
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn string_escapes() {
        assert_eq!(
            kinds(r#""a\"b\n""#),
            vec![TokenKind::StringLit("a\"b\n".into()), TokenKind::Eof]
        );
    }

    #[test]
    fn decimal_and_method_dot_disambiguate() {
        assert_eq!(
            kinds("3.14"),
            vec![TokenKind::NumberLit(3.14), TokenKind::Eof]
        );
        // A dot not followed by a digit stays a field-access dot.
        assert_eq!(
            kinds("4.x"),
            vec![
                TokenKind::NumberLit(4.0),
                TokenKind::Dot,
                TokenKind::Identifier("x".into()),
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn multibyte_text_survives() {
        assert_eq!(
            kinds("\"héllo ≥ 4\""),
            vec![TokenKind::StringLit("héllo ≥ 4".into()), TokenKind::Eof]
        );
    }

    #[test]
    fn unterminated_string_reports_position() {
        let err = lex("x = \"oops").unwrap_err();
        assert!(err.message.contains("unterminated string"));
        assert_eq!(err.line, 1);
        assert_eq!(err.col, 5);
    }

    #[test]
    fn unexpected_character_fails() {
        let err = lex("answer = @").unwrap_err();
        assert!(err.message.contains("unexpected character '@'"));
    }
}

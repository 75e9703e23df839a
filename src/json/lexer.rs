//! JSON tokenizer.
//!
//! Converts schema text into spanned tokens. Strings are unescaped here, so
//! `"\u00f8"` and a raw `ø` produce the same token. Raw control characters
//! inside string literals are accepted; hand-written schema files contain
//! them and they are re-escaped on output.

use super::error::{ParseError, ParseResult};
use super::value::Span;

/// Token types produced by the lexer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    LeftBrace,
    RightBrace,
    LeftBracket,
    RightBracket,
    Colon,
    Comma,
    Null,
    True,
    False,
    /// String value (unescaped)
    String(String),
    /// Number lexeme
    Number(String),
    Eof,
}

impl Token {
    pub fn describe(&self) -> &'static str {
        match self {
            Token::LeftBrace => "'{'",
            Token::RightBrace => "'}'",
            Token::LeftBracket => "'['",
            Token::RightBracket => "']'",
            Token::Colon => "':'",
            Token::Comma => "','",
            Token::Null | Token::True | Token::False => "literal",
            Token::String(_) => "string",
            Token::Number(_) => "number",
            Token::Eof => "end of input",
        }
    }
}

/// A token with the span it covers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Spanned {
    pub token: Token,
    pub span: Span,
}

/// JSON lexer over a UTF-8 source string.
pub struct Lexer<'a> {
    source: &'a str,
    input: &'a [u8],
    pos: usize,
}

impl<'a> Lexer<'a> {
    pub fn new(source: &'a str) -> Self {
        Self {
            source,
            input: source.as_bytes(),
            pos: 0,
        }
    }

    fn peek(&self) -> Option<u8> {
        self.input.get(self.pos).copied()
    }

    fn advance(&mut self) -> Option<u8> {
        let b = self.peek();
        if b.is_some() {
            self.pos += 1;
        }
        b
    }

    fn skip_whitespace(&mut self) {
        while let Some(b' ' | b'\t' | b'\n' | b'\r') = self.peek() {
            self.pos += 1;
        }
    }

    /// Read the next token from the input.
    pub fn next_token(&mut self) -> ParseResult<Spanned> {
        self.skip_whitespace();
        let start = self.pos;

        let token = match self.peek() {
            None => Token::Eof,
            Some(b'{') => self.single(Token::LeftBrace),
            Some(b'}') => self.single(Token::RightBrace),
            Some(b'[') => self.single(Token::LeftBracket),
            Some(b']') => self.single(Token::RightBracket),
            Some(b':') => self.single(Token::Colon),
            Some(b',') => self.single(Token::Comma),
            Some(b'"') => self.read_string()?,
            Some(b'-' | b'0'..=b'9') => self.read_number()?,
            Some(b't') => self.read_keyword("true", Token::True)?,
            Some(b'f') => self.read_keyword("false", Token::False)?,
            Some(b'n') => self.read_keyword("null", Token::Null)?,
            Some(_) => {
                let ch = self.source[start..].chars().next().unwrap_or('?');
                return Err(ParseError::UnexpectedChar { ch, offset: start });
            }
        };

        Ok(Spanned {
            token,
            span: Span::new(start, self.pos),
        })
    }

    fn single(&mut self, token: Token) -> Token {
        self.pos += 1;
        token
    }

    fn read_string(&mut self) -> ParseResult<Token> {
        let start = self.pos;
        self.advance();

        let mut result = String::new();
        loop {
            let Some(b) = self.peek() else {
                return Err(ParseError::UnterminatedString { offset: start });
            };
            match b {
                b'"' => {
                    self.pos += 1;
                    break;
                }
                b'\\' => {
                    self.pos += 1;
                    let ch = self.read_escape()?;
                    result.push(ch);
                }
                _ => {
                    // Input is a &str, so pos always sits on a char boundary here.
                    let ch = self.source[self.pos..].chars().next().unwrap_or('\u{fffd}');
                    self.pos += ch.len_utf8();
                    result.push(ch);
                }
            }
        }

        Ok(Token::String(result))
    }

    fn read_escape(&mut self) -> ParseResult<char> {
        let offset = self.pos - 1;
        match self.advance() {
            Some(b'"') => Ok('"'),
            Some(b'\\') => Ok('\\'),
            Some(b'/') => Ok('/'),
            Some(b'b') => Ok('\x08'),
            Some(b'f') => Ok('\x0C'),
            Some(b'n') => Ok('\n'),
            Some(b'r') => Ok('\r'),
            Some(b't') => Ok('\t'),
            Some(b'u') => self.read_unicode_escape(offset),
            _ => Err(ParseError::InvalidEscape { offset }),
        }
    }

    fn read_unicode_escape(&mut self, offset: usize) -> ParseResult<char> {
        let unit = self.read_hex4(offset)?;

        if (0xD800..=0xDBFF).contains(&unit) {
            if self.advance() != Some(b'\\') || self.advance() != Some(b'u') {
                return Err(ParseError::UnpairedSurrogate { offset });
            }
            let low = self.read_hex4(offset)?;
            if !(0xDC00..=0xDFFF).contains(&low) {
                return Err(ParseError::UnpairedSurrogate { offset });
            }
            let combined = 0x10000 + ((unit - 0xD800) << 10) + (low - 0xDC00);
            return char::from_u32(combined).ok_or(ParseError::UnpairedSurrogate { offset });
        }

        if (0xDC00..=0xDFFF).contains(&unit) {
            return Err(ParseError::UnpairedSurrogate { offset });
        }

        char::from_u32(unit).ok_or(ParseError::InvalidEscape { offset })
    }

    fn read_hex4(&mut self, offset: usize) -> ParseResult<u32> {
        let mut value = 0u32;
        for _ in 0..4 {
            let digit = match self.advance() {
                Some(b @ b'0'..=b'9') => b - b'0',
                Some(b @ b'a'..=b'f') => b - b'a' + 10,
                Some(b @ b'A'..=b'F') => b - b'A' + 10,
                _ => return Err(ParseError::InvalidEscape { offset }),
            };
            value = (value << 4) | digit as u32;
        }
        Ok(value)
    }

    fn read_number(&mut self) -> ParseResult<Token> {
        let start = self.pos;

        if self.peek() == Some(b'-') {
            self.pos += 1;
        }

        match self.peek() {
            Some(b'0') => {
                self.pos += 1;
                if let Some(b'0'..=b'9') = self.peek() {
                    return Err(ParseError::InvalidNumber { offset: start });
                }
            }
            Some(b'1'..=b'9') => self.skip_digits(),
            _ => return Err(ParseError::InvalidNumber { offset: start }),
        }

        if self.peek() == Some(b'.') {
            self.pos += 1;
            if !matches!(self.peek(), Some(b'0'..=b'9')) {
                return Err(ParseError::InvalidNumber { offset: start });
            }
            self.skip_digits();
        }

        if let Some(b'e' | b'E') = self.peek() {
            self.pos += 1;
            if let Some(b'+' | b'-') = self.peek() {
                self.pos += 1;
            }
            if !matches!(self.peek(), Some(b'0'..=b'9')) {
                return Err(ParseError::InvalidNumber { offset: start });
            }
            self.skip_digits();
        }

        Ok(Token::Number(self.source[start..self.pos].to_string()))
    }

    fn skip_digits(&mut self) {
        while let Some(b'0'..=b'9') = self.peek() {
            self.pos += 1;
        }
    }

    fn read_keyword(&mut self, word: &str, token: Token) -> ParseResult<Token> {
        let start = self.pos;
        if self.input[start..].starts_with(word.as_bytes()) {
            self.pos += word.len();
            Ok(token)
        } else {
            Err(ParseError::InvalidLiteral { offset: start })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lex(input: &str) -> ParseResult<Vec<Token>> {
        let mut lexer = Lexer::new(input);
        let mut tokens = Vec::new();
        loop {
            let spanned = lexer.next_token()?;
            if spanned.token == Token::Eof {
                break;
            }
            tokens.push(spanned.token);
        }
        Ok(tokens)
    }

    #[test]
    fn test_structural_tokens() {
        let tokens = lex("{}[],:").unwrap();
        assert_eq!(
            tokens,
            vec![
                Token::LeftBrace,
                Token::RightBrace,
                Token::LeftBracket,
                Token::RightBracket,
                Token::Comma,
                Token::Colon,
            ]
        );
    }

    #[test]
    fn test_literals() {
        let tokens = lex("null true false").unwrap();
        assert_eq!(tokens, vec![Token::Null, Token::True, Token::False]);
    }

    #[test]
    fn test_string_escapes() {
        let tokens = lex(r#""a\nb\tc\\d\"e\/""#).unwrap();
        assert_eq!(tokens, vec![Token::String("a\nb\tc\\d\"e/".to_string())]);
    }

    #[test]
    fn test_unicode_escape_matches_raw_char() {
        let escaped = lex(r#""\u00f8""#).unwrap();
        let raw = lex("\"ø\"").unwrap();
        assert_eq!(escaped, raw);
    }

    #[test]
    fn test_surrogate_pair() {
        let tokens = lex(r#""\ud83d\ude00""#).unwrap();
        assert_eq!(tokens, vec![Token::String("\u{1F600}".to_string())]);
        assert!(matches!(
            lex(r#""\ud83d""#),
            Err(ParseError::UnpairedSurrogate { .. })
        ));
    }

    #[test]
    fn test_raw_control_characters_accepted() {
        let tokens = lex("\"a\x1f\n\tb\"").unwrap();
        assert_eq!(tokens, vec![Token::String("a\x1f\n\tb".to_string())]);
    }

    #[test]
    fn test_numbers() {
        let tokens = lex("42 -123 0 1.25 6e10 -0.5E-3").unwrap();
        assert_eq!(
            tokens,
            vec![
                Token::Number("42".to_string()),
                Token::Number("-123".to_string()),
                Token::Number("0".to_string()),
                Token::Number("1.25".to_string()),
                Token::Number("6e10".to_string()),
                Token::Number("-0.5E-3".to_string()),
            ]
        );
    }

    #[test]
    fn test_invalid_numbers() {
        assert!(lex("01").is_err());
        assert!(lex("1.").is_err());
        assert!(lex("-").is_err());
        assert!(lex("2e").is_err());
    }

    #[test]
    fn test_spans() {
        let mut lexer = Lexer::new("  \"ab\" ");
        let spanned = lexer.next_token().unwrap();
        assert_eq!(spanned.span, Span::new(2, 6));
        assert_eq!(lexer.next_token().unwrap().token, Token::Eof);
    }

    #[test]
    fn test_unterminated_string() {
        assert!(matches!(
            lex("\"abc"),
            Err(ParseError::UnterminatedString { offset: 0 })
        ));
    }
}

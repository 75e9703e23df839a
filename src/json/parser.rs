//! Recursive descent JSON parser.
//!
//! Builds a [`JsonNode`] tree with spans and ordered object members.
//! Duplicate keys are rejected since a schema object with two `type` keys
//! has no single meaning.

use super::error::{ParseError, ParseResult};
use super::lexer::{Lexer, Spanned, Token};
use super::value::{JsonNode, JsonObject, JsonValue, Number, Span};

/// Default nesting limit for arrays and objects.
pub const DEFAULT_MAX_DEPTH: usize = 256;

/// JSON parser.
pub struct Parser<'a> {
    lexer: Lexer<'a>,
    current: Spanned,
    max_depth: usize,
    depth: usize,
}

impl<'a> Parser<'a> {
    pub fn new(source: &'a str, max_depth: usize) -> ParseResult<Self> {
        let mut lexer = Lexer::new(source);
        let current = lexer.next_token()?;
        Ok(Self {
            lexer,
            current,
            max_depth,
            depth: 0,
        })
    }

    /// Parse the whole input as one JSON document.
    pub fn parse(&mut self) -> ParseResult<JsonNode> {
        let value = self.parse_value()?;

        if self.current.token != Token::Eof {
            return Err(ParseError::TrailingContent {
                offset: self.current.span.start,
            });
        }

        Ok(value)
    }

    fn advance(&mut self) -> ParseResult<Spanned> {
        let next = self.lexer.next_token()?;
        Ok(std::mem::replace(&mut self.current, next))
    }

    fn unexpected(&self, expected: &'static str) -> ParseError {
        ParseError::UnexpectedToken {
            found: self.current.token.describe(),
            expected,
            offset: self.current.span.start,
        }
    }

    fn parse_value(&mut self) -> ParseResult<JsonNode> {
        match &self.current.token {
            Token::LeftBrace => return self.parse_object(),
            Token::LeftBracket => return self.parse_array(),
            Token::Null
            | Token::True
            | Token::False
            | Token::String(_)
            | Token::Number(_) => {}
            _ => return Err(self.unexpected("a value")),
        }

        let Spanned { token, span } = self.advance()?;
        let value = match token {
            Token::Null => JsonValue::Null,
            Token::True => JsonValue::Bool(true),
            Token::False => JsonValue::Bool(false),
            Token::String(s) => JsonValue::String(s),
            Token::Number(n) => JsonValue::Number(Number::from_lexeme(n)),
            _ => unreachable!("scalar tokens matched above"),
        };
        Ok(JsonNode::new(value, span))
    }

    fn enter(&mut self) -> ParseResult<()> {
        self.depth += 1;
        if self.depth > self.max_depth {
            return Err(ParseError::TooDeep {
                limit: self.max_depth,
                offset: self.current.span.start,
            });
        }
        Ok(())
    }

    fn parse_object(&mut self) -> ParseResult<JsonNode> {
        self.enter()?;
        let start = self.advance()?.span.start;
        let mut object = JsonObject::new();

        if self.current.token == Token::RightBrace {
            let end = self.advance()?.span.end;
            self.depth -= 1;
            return Ok(JsonNode::new(JsonValue::Object(object), Span::new(start, end)));
        }

        let end = loop {
            let key_offset = self.current.span.start;
            let key = match &self.current.token {
                Token::String(s) => s.clone(),
                _ => return Err(self.unexpected("an object key")),
            };
            self.advance()?;

            if object.contains_key(&key) {
                return Err(ParseError::DuplicateKey {
                    key,
                    offset: key_offset,
                });
            }

            if self.current.token != Token::Colon {
                return Err(self.unexpected("':'"));
            }
            self.advance()?;

            let value = self.parse_value()?;
            object.insert(key, value);

            match self.current.token {
                Token::Comma => {
                    self.advance()?;
                }
                Token::RightBrace => break self.advance()?.span.end,
                _ => return Err(self.unexpected("',' or '}'")),
            }
        };

        self.depth -= 1;
        Ok(JsonNode::new(JsonValue::Object(object), Span::new(start, end)))
    }

    fn parse_array(&mut self) -> ParseResult<JsonNode> {
        self.enter()?;
        let start = self.advance()?.span.start;
        let mut items = Vec::new();

        if self.current.token == Token::RightBracket {
            let end = self.advance()?.span.end;
            self.depth -= 1;
            return Ok(JsonNode::new(JsonValue::Array(items), Span::new(start, end)));
        }

        let end = loop {
            items.push(self.parse_value()?);

            match self.current.token {
                Token::Comma => {
                    self.advance()?;
                }
                Token::RightBracket => break self.advance()?.span.end,
                _ => return Err(self.unexpected("',' or ']'")),
            }
        };

        self.depth -= 1;
        Ok(JsonNode::new(JsonValue::Array(items), Span::new(start, end)))
    }
}

/// Parse a JSON document with the default depth limit.
pub fn parse(source: &str) -> ParseResult<JsonNode> {
    parse_with_depth(source, DEFAULT_MAX_DEPTH)
}

/// Parse a JSON document with an explicit depth limit.
pub fn parse_with_depth(source: &str, max_depth: usize) -> ParseResult<JsonNode> {
    Parser::new(source, max_depth)?.parse()
}

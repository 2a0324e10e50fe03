use std::{error::Error, fmt};

use compact_str::{format_compact, CompactString};

use crate::parser::{Lexer, LexerError, Spanning, Token};

/// Error while parsing a GraphQL query
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum ParseError {
    /// A token the grammar does not allow at this point.
    UnexpectedToken(CompactString),

    /// The source ended in the middle of a construct.
    UnexpectedEndOfFile,

    /// Tokenization failed before parsing could proceed.
    LexerError(LexerError),
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnexpectedToken(token) => write!(f, "Unexpected \"{token}\""),
            Self::UnexpectedEndOfFile => write!(f, "Unexpected end of input"),
            Self::LexerError(e) => e.fmt(f),
        }
    }
}

impl Error for ParseError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::LexerError(e) => Some(e),
            Self::UnexpectedToken(_) | Self::UnexpectedEndOfFile => None,
        }
    }
}

impl ParseError {
    /// Wraps the offending [`Token`] into a [`ParseError::UnexpectedToken`].
    #[must_use]
    pub fn unexpected_token(token: Token<'_>) -> Self {
        Self::UnexpectedToken(format_compact!("{token}"))
    }
}

#[doc(hidden)]
pub type ParseResult<T> = Result<Spanning<T>, Spanning<ParseError>>;

#[doc(hidden)]
pub type UnlocatedParseResult<T> = Result<T, Spanning<ParseError>>;

#[doc(hidden)]
pub type OptionParseResult<T> = Result<Option<Spanning<T>>, Spanning<ParseError>>;

/// Token cursor the grammar productions pull from.
///
/// Tokens are stored in reverse so consuming one is a `pop`. The trailing
/// `EndOfFile` token is never consumed, which keeps `peek` total.
#[doc(hidden)]
#[derive(Debug)]
pub struct Parser<'a> {
    tokens: Vec<Spanning<Token<'a>>>,
}

impl<'a> Parser<'a> {
    #[doc(hidden)]
    pub fn new(lexer: &mut Lexer<'a>) -> Result<Parser<'a>, Spanning<LexerError>> {
        let mut tokens = Vec::new();
        for token in lexer {
            tokens.push(token?);
        }
        tokens.reverse();

        Ok(Parser { tokens })
    }

    #[doc(hidden)]
    pub fn peek(&self) -> &Spanning<Token<'a>> {
        &self.tokens[self.tokens.len() - 1]
    }

    #[doc(hidden)]
    pub fn next_token(&mut self) -> ParseResult<Token<'a>> {
        if self.tokens.len() > 1 {
            if let Some(token) = self.tokens.pop() {
                return Ok(token);
            }
        }
        Err(Spanning::new(
            self.peek().span,
            ParseError::UnexpectedEndOfFile,
        ))
    }

    #[doc(hidden)]
    pub fn expect(&mut self, expected: &Token) -> ParseResult<Token<'a>> {
        if self.peek().item == *expected {
            self.next_token()
        } else {
            Err(self.next_token()?.map(ParseError::unexpected_token))
        }
    }

    #[doc(hidden)]
    pub fn skip(
        &mut self,
        expected: &Token,
    ) -> Result<Option<Spanning<Token<'a>>>, Spanning<ParseError>> {
        if self.peek().item == *expected {
            self.next_token().map(Some)
        } else if self.peek().item == Token::EndOfFile {
            Err(Spanning::zero_width(
                &self.peek().span.start,
                ParseError::UnexpectedEndOfFile,
            ))
        } else {
            Ok(None)
        }
    }

    #[doc(hidden)]
    pub fn delimited_list<T, F>(
        &mut self,
        opening: &Token,
        parser: F,
        closing: &Token,
    ) -> ParseResult<Vec<Spanning<T>>>
    where
        T: fmt::Debug,
        F: Fn(&mut Parser<'a>) -> ParseResult<T>,
    {
        let Spanning { span, .. } = self.expect(opening)?;

        let mut items = Vec::new();
        let end = loop {
            if let Some(close) = self.skip(closing)? {
                break close.span.end;
            }
            items.push(parser(self)?);
        };

        Ok(Spanning::start_end(&span.start, &end, items))
    }

    #[doc(hidden)]
    pub fn delimited_nonempty_list<T, F>(
        &mut self,
        opening: &Token,
        parser: F,
        closing: &Token,
    ) -> ParseResult<Vec<Spanning<T>>>
    where
        T: fmt::Debug,
        F: Fn(&mut Parser<'a>) -> ParseResult<T>,
    {
        let Spanning { span, .. } = self.expect(opening)?;

        let mut items = vec![parser(self)?];
        let end = loop {
            if let Some(close) = self.skip(closing)? {
                break close.span.end;
            }
            items.push(parser(self)?);
        };

        Ok(Spanning::start_end(&span.start, &end, items))
    }

    #[doc(hidden)]
    pub fn unlocated_delimited_nonempty_list<T, F>(
        &mut self,
        opening: &Token,
        parser: F,
        closing: &Token,
    ) -> ParseResult<Vec<T>>
    where
        T: fmt::Debug,
        F: Fn(&mut Parser<'a>) -> UnlocatedParseResult<T>,
    {
        let Spanning { span, .. } = self.expect(opening)?;

        let mut items = vec![parser(self)?];
        let end = loop {
            if let Some(close) = self.skip(closing)? {
                break close.span.end;
            }
            items.push(parser(self)?);
        };

        Ok(Spanning::start_end(&span.start, &end, items))
    }

    #[doc(hidden)]
    pub fn expect_name(&mut self) -> ParseResult<&'a str> {
        match self.peek().item {
            Token::Name(_) => Ok(self.next_token()?.map(|token| match token {
                Token::Name(name) => name,
                _ => unreachable!("a name was peeked before consuming"),
            })),
            Token::EndOfFile => Err(Spanning::new(
                self.peek().span,
                ParseError::UnexpectedEndOfFile,
            )),
            _ => Err(self.next_token()?.map(ParseError::unexpected_token)),
        }
    }
}

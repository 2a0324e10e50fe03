use std::{char, iter::Peekable, str::CharIndices};

use derive_more::with_trait::{Display, Error};

use crate::parser::{SourcePosition, Spanning};

#[doc(hidden)]
#[derive(Debug)]
pub struct Lexer<'a> {
    iterator: Peekable<CharIndices<'a>>,
    source: &'a str,
    length: usize,
    position: SourcePosition,
    has_reached_eof: bool,
}

/// Representation of a raw unparsed scalar value literal.
///
/// This is only used for tagging how the lexer has interpreted a value literal.
/// String literals keep their surrounding quotes; [`unescape_string`] turns
/// them into the value they denote.
#[expect(missing_docs, reason = "self-explanatory")]
#[derive(Clone, Copy, Debug, Display, Eq, PartialEq)]
pub enum ScalarToken<'a> {
    String(&'a str),
    Float(&'a str),
    Int(&'a str),
}

/// A single token in the input source
#[expect(missing_docs, reason = "self-explanatory")]
#[derive(Clone, Copy, Debug, Display, Eq, PartialEq)]
pub enum Token<'a> {
    Name(&'a str),
    Scalar(ScalarToken<'a>),
    #[display("!")]
    ExclamationMark,
    #[display("$")]
    Dollar,
    #[display("(")]
    ParenOpen,
    #[display(")")]
    ParenClose,
    #[display("[")]
    BracketOpen,
    #[display("]")]
    BracketClose,
    #[display("{{")]
    CurlyOpen,
    #[display("}}")]
    CurlyClose,
    #[display("...")]
    Ellipsis,
    #[display(":")]
    Colon,
    #[display("=")]
    Equals,
    #[display("@")]
    At,
    #[display("|")]
    Pipe,
    #[display("End of file")]
    EndOfFile,
}

/// Error when tokenizing the input source
#[derive(Clone, Debug, Display, Eq, Error, PartialEq)]
pub enum LexerError {
    /// An unknown character was found
    ///
    /// Unknown characters are characters that do not occur anywhere in the
    /// GraphQL language, such as `?` or `%`.
    #[display("Unknown character \"{_0}\"")]
    UnknownCharacter(#[error(not(source))] char),

    /// An unexpected character was found
    ///
    /// Unexpected characters are characters that _do_ exist in the GraphQL
    /// language, but is not expected at the current position in the document.
    #[display("Unexpected character \"{_0}\"")]
    UnexpectedCharacter(#[error(not(source))] char),

    /// An unterminated string literal was found
    ///
    /// Apart from forgetting the ending `"`, terminating a string within an
    /// escape sequence or having a line break in the string also causes this
    /// error.
    #[display("Unterminated string literal")]
    UnterminatedString,

    /// An unknown character in a string literal was found
    #[display("Unknown character \"{_0}\" in string literal")]
    UnknownCharacterInString(#[error(not(source))] char),

    /// An unknown escape sequence in a string literal was found
    ///
    /// Only a limited set of escape sequences are supported, this is emitted
    /// when e.g. `"\l"` is parsed.
    #[display("Unknown escape sequence \"{_0}\" in string")]
    UnknownEscapeSequence(#[error(not(source))] String),

    /// The input source was unexpectedly terminated
    ///
    /// Emitted when the current token requires a succeeding character, but
    /// the source has reached EOF. Emitted when scanning e.g. `"1.`".
    #[display("Unexpected end of input")]
    UnexpectedEndOfFile,

    /// An invalid number literal was found
    #[display("Invalid number literal")]
    InvalidNumber,
}

pub type LexerResult<'a> = Result<Spanning<Token<'a>>, Spanning<LexerError>>;

impl<'a> Lexer<'a> {
    #[doc(hidden)]
    pub fn new(source: &'a str) -> Lexer<'a> {
        Lexer {
            iterator: source.char_indices().peekable(),
            source,
            length: source.len(),
            position: SourcePosition::new_origin(),
            has_reached_eof: false,
        }
    }

    fn peek_char(&mut self) -> Option<(usize, char)> {
        assert!(self.position.index() <= self.length);
        assert!(!self.has_reached_eof);

        self.iterator.peek().copied()
    }

    fn next_char(&mut self) -> Option<(usize, char)> {
        assert!(self.position.index() <= self.length);
        assert!(!self.has_reached_eof);

        let next = self.iterator.next();

        if let Some((_, ch)) = next {
            if ch == '\n' {
                self.position.advance_line();
            } else {
                self.position.advance_col();
            }
        }

        next
    }

    fn single_char_token(&mut self, t: Token<'a>) -> Spanning<Token<'a>> {
        let start = self.position;

        // A character was peeked before this is called, so EOF is impossible.
        let had_char = self.next_char().is_some();
        debug_assert!(had_char);

        Spanning::single_width(&start, t)
    }

    /// Consumes ignored tokens: whitespace, commas and comments.
    fn skip_ignored(&mut self) {
        while let Some((_, ch)) = self.peek_char() {
            match ch {
                '\t' | ' ' | '\n' | '\r' | ',' => {
                    self.next_char();
                }
                '#' => {
                    self.next_char();
                    while let Some((_, ch)) = self.peek_char() {
                        if !is_source_char(ch) {
                            break;
                        }
                        self.next_char();
                        if ch == '\n' || ch == '\r' {
                            break;
                        }
                    }
                }
                _ => break,
            }
        }
    }

    fn scan_ellipsis(&mut self) -> LexerResult<'a> {
        let start = self.position;

        for _ in 0..3 {
            let (_, ch) = self.next_char().ok_or_else(|| {
                Spanning::zero_width(&self.position, LexerError::UnexpectedEndOfFile)
            })?;
            if ch != '.' {
                return Err(Spanning::zero_width(
                    &start,
                    LexerError::UnexpectedCharacter('.'),
                ));
            }
        }

        Ok(Spanning::start_end(&start, &self.position, Token::Ellipsis))
    }

    fn scan_name(&mut self) -> LexerResult<'a> {
        let start = self.position;
        let (start_idx, first) = self
            .next_char()
            .ok_or_else(|| Spanning::zero_width(&self.position, LexerError::UnexpectedEndOfFile))?;
        debug_assert!(is_name_start(first));

        let mut end_idx = start_idx;

        while let Some((idx, ch)) = self.peek_char() {
            if !is_name_cont(ch) {
                break;
            }
            self.next_char();
            end_idx = idx;
        }

        Ok(Spanning::start_end(
            &start,
            &self.position,
            Token::Name(&self.source[start_idx..=end_idx]),
        ))
    }

    fn scan_string(&mut self) -> LexerResult<'a> {
        let start = self.position;
        let (start_idx, quote) = self
            .next_char()
            .ok_or_else(|| Spanning::zero_width(&self.position, LexerError::UnexpectedEndOfFile))?;
        if quote != '"' {
            return Err(Spanning::zero_width(
                &self.position,
                LexerError::UnterminatedString,
            ));
        }

        let mut in_escape = false;
        let mut prev_pos = self.position;
        while let Some((idx, ch)) = self.next_char() {
            match ch {
                'b' | 'f' | 'n' | 'r' | 't' | '\\' | '/' | '"' if in_escape => {
                    in_escape = false;
                }
                'u' if in_escape => {
                    self.scan_escaped_unicode(&prev_pos)?;
                    in_escape = false;
                }
                c if in_escape => {
                    return Err(Spanning::zero_width(
                        &prev_pos,
                        LexerError::UnknownEscapeSequence(format!("\\{c}")),
                    ));
                }
                '\\' => in_escape = true,
                '"' => {
                    // The raw literal keeps its quotes.
                    return Ok(Spanning::start_end(
                        &start,
                        &self.position,
                        Token::Scalar(ScalarToken::String(&self.source[start_idx..=idx])),
                    ));
                }
                '\n' | '\r' => {
                    return Err(Spanning::zero_width(
                        &prev_pos,
                        LexerError::UnterminatedString,
                    ));
                }
                c if !is_source_char(c) => {
                    return Err(Spanning::zero_width(
                        &prev_pos,
                        LexerError::UnknownCharacterInString(ch),
                    ));
                }
                _ => {}
            }
            prev_pos = self.position;
        }

        Err(Spanning::zero_width(
            &self.position,
            LexerError::UnterminatedString,
        ))
    }

    fn scan_escaped_unicode(
        &mut self,
        escape_pos: &SourcePosition,
    ) -> Result<(), Spanning<LexerError>> {
        let (start_idx, _) = self
            .peek_char()
            .ok_or_else(|| Spanning::zero_width(&self.position, LexerError::UnterminatedString))?;
        let mut end_idx = start_idx;
        let mut len = 0;

        for _ in 0..4 {
            let (idx, ch) = self.next_char().ok_or_else(|| {
                Spanning::zero_width(&self.position, LexerError::UnterminatedString)
            })?;

            if !ch.is_alphanumeric() {
                break;
            }

            end_idx = idx;
            len += 1;
        }

        // Make sure we are on a valid char boundary.
        let escape = self
            .source
            .get(start_idx..=end_idx)
            .ok_or_else(|| Spanning::zero_width(&self.position, LexerError::UnterminatedString))?;

        if len != 4 {
            return Err(Spanning::zero_width(
                escape_pos,
                LexerError::UnknownEscapeSequence(format!("\\u{escape}")),
            ));
        }

        let code_point = u32::from_str_radix(escape, 16).map_err(|_| {
            Spanning::zero_width(
                escape_pos,
                LexerError::UnknownEscapeSequence(format!("\\u{escape}")),
            )
        })?;

        char::from_u32(code_point)
            .ok_or_else(|| {
                Spanning::zero_width(
                    escape_pos,
                    LexerError::UnknownEscapeSequence(format!("\\u{escape}")),
                )
            })
            .map(|_| ())
    }

    /// Consumes a run of digits following a marker character (the decimal
    /// point or exponent letter) at `marker_idx`. At least one character
    /// must follow the marker. Returns the index one past the run.
    fn scan_digit_run(
        &mut self,
        marker_idx: usize,
        allow_sign: bool,
    ) -> Result<usize, Spanning<LexerError>> {
        let mut last_idx = marker_idx;
        loop {
            match self.peek_char() {
                Some((idx, ch)) => {
                    let sign = allow_sign && last_idx == marker_idx && (ch == '-' || ch == '+');
                    if ch.is_ascii_digit() || sign {
                        self.next_char();
                    } else if last_idx == marker_idx {
                        return Err(Spanning::zero_width(
                            &self.position,
                            LexerError::UnexpectedCharacter(ch),
                        ));
                    } else {
                        return Ok(idx);
                    }
                    last_idx = idx;
                }
                None if last_idx == marker_idx => {
                    return Err(Spanning::zero_width(
                        &self.position,
                        LexerError::UnexpectedEndOfFile,
                    ));
                }
                None => return Ok(last_idx + 1),
            }
        }
    }

    fn scan_number(&mut self) -> LexerResult<'a> {
        let start = self.position;
        let (start_idx, _) = self
            .peek_char()
            .ok_or_else(|| Spanning::zero_width(&self.position, LexerError::UnexpectedEndOfFile))?;

        let mut last_idx = start_idx;
        let mut prev = '1';
        let mut is_float = false;

        // Integer part: an optional leading minus, then digits without a
        // redundant leading zero.
        let mut end_idx = loop {
            match self.peek_char() {
                Some((idx, ch)) => {
                    if ch.is_ascii_digit() || (ch == '-' && last_idx == start_idx) {
                        if ch == '0' && prev == '0' && last_idx == start_idx {
                            return Err(Spanning::zero_width(
                                &self.position,
                                LexerError::UnexpectedCharacter('0'),
                            ));
                        }
                        self.next_char();
                        prev = ch;
                    } else if prev == '-' {
                        return Err(Spanning::zero_width(
                            &self.position,
                            LexerError::UnexpectedCharacter(ch),
                        ));
                    } else {
                        break idx;
                    }
                    last_idx = idx;
                }
                None => break last_idx + 1,
            }
        };

        if let Some((dot_idx, '.')) = self.peek_char() {
            is_float = true;
            self.next_char();
            end_idx = self.scan_digit_run(dot_idx, false)?;
        }
        if let Some((e_idx, 'e' | 'E')) = self.peek_char() {
            is_float = true;
            self.next_char();
            end_idx = self.scan_digit_run(e_idx, true)?;
        }

        let number = &self.source[start_idx..end_idx];
        let scalar = if is_float {
            ScalarToken::Float(number)
        } else {
            ScalarToken::Int(number)
        };

        Ok(Spanning::start_end(
            &start,
            &self.position,
            Token::Scalar(scalar),
        ))
    }
}

fn punctuation(c: char) -> Option<Token<'static>> {
    Some(match c {
        '!' => Token::ExclamationMark,
        '$' => Token::Dollar,
        '(' => Token::ParenOpen,
        ')' => Token::ParenClose,
        '[' => Token::BracketOpen,
        ']' => Token::BracketClose,
        '{' => Token::CurlyOpen,
        '}' => Token::CurlyClose,
        ':' => Token::Colon,
        '=' => Token::Equals,
        '@' => Token::At,
        '|' => Token::Pipe,
        _ => return None,
    })
}

impl<'a> Iterator for Lexer<'a> {
    type Item = LexerResult<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.has_reached_eof {
            return None;
        }

        self.skip_ignored();

        let ch = self.iterator.peek().map(|&(_, ch)| ch);

        Some(match ch {
            None => {
                self.has_reached_eof = true;
                Ok(Spanning::zero_width(&self.position, Token::EndOfFile))
            }
            Some('.') => self.scan_ellipsis(),
            Some('"') => self.scan_string(),
            Some(ch) => match punctuation(ch) {
                Some(t) => Ok(self.single_char_token(t)),
                None if is_number_start(ch) => self.scan_number(),
                None if is_name_start(ch) => self.scan_name(),
                None => Err(Spanning::zero_width(
                    &self.position,
                    LexerError::UnknownCharacter(ch),
                )),
            },
        })
    }
}

/// Turns a raw quoted string literal (quotes included) into the string value
/// it denotes.
///
/// The lexer has already rejected malformed escape sequences, so the only
/// failures left here are internal inconsistencies.
pub(crate) fn unescape_string(raw: &str) -> Result<String, LexerError> {
    let inner = raw
        .strip_prefix('"')
        .and_then(|s| s.strip_suffix('"'))
        .ok_or(LexerError::UnterminatedString)?;

    let mut out = String::with_capacity(inner.len());
    let mut chars = inner.chars();

    while let Some(ch) = chars.next() {
        if ch != '\\' {
            out.push(ch);
            continue;
        }
        match chars.next() {
            Some('b') => out.push('\u{0008}'),
            Some('f') => out.push('\u{000c}'),
            Some('n') => out.push('\n'),
            Some('r') => out.push('\r'),
            Some('t') => out.push('\t'),
            Some('\\') => out.push('\\'),
            Some('/') => out.push('/'),
            Some('"') => out.push('"'),
            Some('u') => {
                let hex: String = chars.by_ref().take(4).collect();
                let code_point = u32::from_str_radix(&hex, 16)
                    .map_err(|_| LexerError::UnknownEscapeSequence(format!("\\u{hex}")))?;
                let ch = char::from_u32(code_point)
                    .ok_or_else(|| LexerError::UnknownEscapeSequence(format!("\\u{hex}")))?;
                out.push(ch);
            }
            Some(c) => return Err(LexerError::UnknownEscapeSequence(format!("\\{c}"))),
            None => return Err(LexerError::UnterminatedString),
        }
    }

    Ok(out)
}

fn is_source_char(c: char) -> bool {
    c == '\t' || c == '\n' || c == '\r' || c >= ' '
}

fn is_name_start(c: char) -> bool {
    c == '_' || c.is_ascii_alphabetic()
}

fn is_name_cont(c: char) -> bool {
    is_name_start(c) || c.is_ascii_digit()
}

fn is_number_start(c: char) -> bool {
    c == '-' || c.is_ascii_digit()
}

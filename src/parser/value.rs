use crate::{
    ast::InputValue,
    parser::{
        lexer::unescape_string, LexerError, ParseError, ParseResult, Parser, ScalarToken,
        SourcePosition, Spanning, Token,
    },
};

pub fn parse_value_literal<'a>(
    parser: &mut Parser<'a>,
    is_const: bool,
) -> ParseResult<InputValue> {
    match parser.peek() {
        &Spanning {
            item: Token::BracketOpen,
            ..
        } => parse_list_literal(parser, is_const),
        &Spanning {
            item: Token::CurlyOpen,
            ..
        } => parse_object_literal(parser, is_const),
        &Spanning {
            item: Token::Dollar,
            ..
        } if !is_const => parse_variable_literal(parser),
        &Spanning {
            item: Token::Scalar(_),
            ..
        } => {
            if let Spanning {
                item: Token::Scalar(scalar),
                span,
            } = parser.next_token()?
            {
                parse_scalar_literal(scalar, &span.start, &span.end)
            } else {
                unreachable!()
            }
        }
        &Spanning {
            item: Token::Name("true"),
            ..
        } => Ok(parser.next_token()?.map(|_| InputValue::Boolean(true))),
        &Spanning {
            item: Token::Name("false"),
            ..
        } => Ok(parser.next_token()?.map(|_| InputValue::Boolean(false))),
        &Spanning {
            item: Token::Name("null"),
            ..
        } => Ok(parser.next_token()?.map(|_| InputValue::Null)),
        &Spanning {
            item: Token::Name(name),
            ..
        } => {
            let name = name.to_owned();
            Ok(parser.next_token()?.map(|_| InputValue::Enum(name)))
        }
        _ => Err(parser.next_token()?.map(ParseError::unexpected_token)),
    }
}

fn parse_list_literal<'a>(
    parser: &mut Parser<'a>,
    is_const: bool,
) -> ParseResult<InputValue> {
    Ok(parser
        .delimited_list(
            &Token::BracketOpen,
            |p| parse_value_literal(p, is_const),
            &Token::BracketClose,
        )?
        .map(InputValue::List))
}

fn parse_object_literal<'a>(
    parser: &mut Parser<'a>,
    is_const: bool,
) -> ParseResult<InputValue> {
    Ok(parser
        .delimited_list(
            &Token::CurlyOpen,
            |p| parse_object_field(p, is_const),
            &Token::CurlyClose,
        )?
        .map(|items| InputValue::Object(items.into_iter().map(|s| s.item).collect())))
}

fn parse_object_field<'a>(
    parser: &mut Parser<'a>,
    is_const: bool,
) -> ParseResult<(Spanning<String>, Spanning<InputValue>)> {
    let key = parser.expect_name()?;

    parser.expect(&Token::Colon)?;

    let value = parse_value_literal(parser, is_const)?;

    Ok(Spanning::start_end(
        &key.span.start,
        &value.span.end.clone(),
        (key.map(|s| s.to_owned()), value),
    ))
}

fn parse_variable_literal(parser: &mut Parser<'_>) -> ParseResult<InputValue> {
    let start_pos = parser.expect(&Token::Dollar)?.span.start;
    let name = parser.expect_name()?;

    Ok(Spanning::start_end(
        &start_pos,
        &name.span.end.clone(),
        InputValue::variable(name.item),
    ))
}

fn parse_scalar_literal(
    token: ScalarToken<'_>,
    start: &SourcePosition,
    end: &SourcePosition,
) -> ParseResult<InputValue> {
    let result = match token {
        ScalarToken::String(raw) => unescape_string(raw)
            .map(InputValue::String)
            .map_err(ParseError::LexerError),
        ScalarToken::Int(v) => v
            .parse()
            .map(InputValue::Int)
            .map_err(|_| ParseError::LexerError(LexerError::InvalidNumber)),
        ScalarToken::Float(v) => v
            .parse()
            .map(InputValue::Float)
            .map_err(|_| ParseError::LexerError(LexerError::InvalidNumber)),
    };
    result
        .map(|v| Spanning::start_end(start, end, v))
        .map_err(|e| Spanning::start_end(start, end, e))
}

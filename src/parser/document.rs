use std::borrow::Cow;

use crate::{
    ast::{
        Arguments, Definition, Directive, Field, Fragment, FragmentSpread, InlineFragment,
        InputValue, Operation, OperationType, OwnedDocument, Selection, Type, VariableDefinition,
        VariableDefinitions,
    },
    parser::{
        value::parse_value_literal, Lexer, OptionParseResult, ParseError, ParseResult, Parser,
        Spanning, Token, UnlocatedParseResult,
    },
};

#[doc(hidden)]
pub fn parse_document_source(s: &str) -> UnlocatedParseResult<OwnedDocument<'_>> {
    let mut lexer = Lexer::new(s);
    let mut p = Parser::new(&mut lexer).map_err(|s| s.map(ParseError::LexerError))?;
    parse_document(&mut p)
}

fn parse_document<'a>(p: &mut Parser<'a>) -> UnlocatedParseResult<OwnedDocument<'a>> {
    let mut defs = Vec::new();

    loop {
        defs.push(parse_definition(p)?);

        if p.peek().item == Token::EndOfFile {
            return Ok(defs);
        }
    }
}

fn parse_definition<'a>(p: &mut Parser<'a>) -> UnlocatedParseResult<Definition<'a>> {
    match p.peek().item {
        Token::CurlyOpen
        | Token::Name("query" | "mutation" | "subscription") => {
            Ok(Definition::Operation(parse_operation_definition(p)?))
        }
        Token::Name("fragment") => Ok(Definition::Fragment(parse_fragment_definition(p)?)),
        _ => Err(p.next_token()?.map(ParseError::unexpected_token)),
    }
}

fn parse_operation_definition<'a>(p: &mut Parser<'a>) -> ParseResult<Operation<'a>> {
    // Query shorthand: a bare selection set.
    if p.peek().item == Token::CurlyOpen {
        let selection_set = parse_selection_set(p)?;

        return Ok(Spanning::new(
            selection_set.span,
            Operation {
                operation_type: OperationType::Query,
                name: None,
                variable_definitions: None,
                directives: None,
                selection_set: selection_set.item,
            },
        ));
    }

    let start = p.peek().span.start;
    let operation_type = parse_operation_type(p)?;

    let name = match p.peek().item {
        Token::Name(_) => Some(p.expect_name()?),
        _ => None,
    };
    let variable_definitions = parse_variable_definitions(p)?;
    let directives = parse_directives(p)?;
    let selection_set = parse_selection_set(p)?;

    Ok(Spanning::start_end(
        &start,
        &selection_set.span.end,
        Operation {
            operation_type: operation_type.item,
            name,
            variable_definitions,
            directives: directives.map(|s| s.item),
            selection_set: selection_set.item,
        },
    ))
}

fn parse_fragment_definition<'a>(p: &mut Parser<'a>) -> ParseResult<Fragment<'a>> {
    let start = p.expect(&Token::Name("fragment"))?.span.start;

    let name = p.expect_name()?;
    if name.item == "on" {
        return Err(name.map(|_| ParseError::UnexpectedToken("on".into())));
    }

    p.expect(&Token::Name("on"))?;
    let type_condition = p.expect_name()?;

    let directives = parse_directives(p)?;
    let selection_set = parse_selection_set(p)?;

    Ok(Spanning::start_end(
        &start,
        &selection_set.span.end,
        Fragment {
            name,
            type_condition,
            directives: directives.map(|s| s.item),
            selection_set: selection_set.item,
        },
    ))
}

fn parse_optional_selection_set<'a>(p: &mut Parser<'a>) -> OptionParseResult<Vec<Selection<'a>>> {
    if p.peek().item == Token::CurlyOpen {
        Ok(Some(parse_selection_set(p)?))
    } else {
        Ok(None)
    }
}

fn parse_selection_set<'a>(p: &mut Parser<'a>) -> ParseResult<Vec<Selection<'a>>> {
    p.unlocated_delimited_nonempty_list(&Token::CurlyOpen, parse_selection, &Token::CurlyClose)
}

fn parse_selection<'a>(p: &mut Parser<'a>) -> UnlocatedParseResult<Selection<'a>> {
    match p.peek().item {
        Token::Ellipsis => parse_fragment(p),
        _ => parse_field(p).map(Selection::Field),
    }
}

fn parse_fragment<'a>(p: &mut Parser<'a>) -> UnlocatedParseResult<Selection<'a>> {
    let start = p.expect(&Token::Ellipsis)?.span.start;

    match p.peek().item {
        // `... on Type { ... }`
        Token::Name("on") => {
            p.next_token()?;
            let type_condition = p.expect_name()?;

            let directives = parse_directives(p)?;
            let selection_set = parse_selection_set(p)?;

            Ok(Selection::InlineFragment(Spanning::start_end(
                &start,
                &selection_set.span.end,
                InlineFragment {
                    type_condition: Some(type_condition),
                    directives: directives.map(|s| s.item),
                    selection_set: selection_set.item,
                },
            )))
        }
        // `...FragmentName`
        Token::Name(_) => {
            let name = p.expect_name()?;
            let directives = parse_directives(p)?;
            let end = directives.as_ref().map_or(name.span.end, |s| s.span.end);

            Ok(Selection::FragmentSpread(Spanning::start_end(
                &start,
                &end,
                FragmentSpread {
                    name,
                    directives: directives.map(|s| s.item),
                },
            )))
        }
        // An inline fragment without a type condition, optionally directed.
        Token::CurlyOpen | Token::At => {
            let directives = if p.peek().item == Token::At {
                parse_directives(p)?.map(|s| s.item)
            } else {
                None
            };
            let selection_set = parse_selection_set(p)?;

            Ok(Selection::InlineFragment(Spanning::start_end(
                &start,
                &selection_set.span.end,
                InlineFragment {
                    type_condition: None,
                    directives,
                    selection_set: selection_set.item,
                },
            )))
        }
        _ => Err(p.next_token()?.map(ParseError::unexpected_token)),
    }
}

fn parse_field<'a>(p: &mut Parser<'a>) -> ParseResult<Field<'a>> {
    let mut alias = Some(p.expect_name()?);

    let name = if p.skip(&Token::Colon)?.is_some() {
        p.expect_name()?
    } else {
        alias.take().ok_or_else(|| {
            Spanning::zero_width(&p.peek().span.start, ParseError::UnexpectedEndOfFile)
        })?
    };

    let arguments = parse_arguments(p)?;
    let directives = parse_directives(p)?;
    let selection_set = parse_optional_selection_set(p)?;

    let start = alias.as_ref().unwrap_or(&name).span.start;
    let end = selection_set
        .as_ref()
        .map(|s| s.span.end)
        .or_else(|| directives.as_ref().map(|s| s.span.end))
        .or_else(|| arguments.as_ref().map(|s| s.span.end))
        .unwrap_or(name.span.end);

    Ok(Spanning::start_end(
        &start,
        &end,
        Field {
            alias,
            name,
            arguments,
            directives: directives.map(|s| s.item),
            selection_set: selection_set.map(|s| s.item),
        },
    ))
}

fn parse_arguments<'a>(p: &mut Parser<'a>) -> OptionParseResult<Arguments<'a>> {
    if p.peek().item != Token::ParenOpen {
        return Ok(None);
    }

    let args = p
        .delimited_nonempty_list(&Token::ParenOpen, parse_argument, &Token::ParenClose)?
        .map(|args| Arguments {
            items: args.into_iter().map(|s| s.item).collect(),
        });
    Ok(Some(args))
}

fn parse_argument<'a>(p: &mut Parser<'a>) -> ParseResult<(Spanning<&'a str>, Spanning<InputValue>)> {
    let name = p.expect_name()?;

    p.expect(&Token::Colon)?;
    let value = parse_value_literal(p, false)?;

    let end = value.span.end;
    Ok(Spanning::start_end(&name.span.start, &end, (name, value)))
}

fn parse_operation_type(p: &mut Parser<'_>) -> ParseResult<OperationType> {
    match p.peek().item {
        Token::Name("query") => Ok(p.next_token()?.map(|_| OperationType::Query)),
        Token::Name("mutation") => Ok(p.next_token()?.map(|_| OperationType::Mutation)),
        Token::Name("subscription") => Ok(p.next_token()?.map(|_| OperationType::Subscription)),
        _ => Err(p.next_token()?.map(ParseError::unexpected_token)),
    }
}

fn parse_variable_definitions<'a>(
    p: &mut Parser<'a>,
) -> OptionParseResult<VariableDefinitions<'a>> {
    if p.peek().item != Token::ParenOpen {
        return Ok(None);
    }

    let defs = p
        .delimited_nonempty_list(
            &Token::ParenOpen,
            parse_variable_definition,
            &Token::ParenClose,
        )?
        .map(|defs| VariableDefinitions {
            items: defs.into_iter().map(|s| s.item).collect(),
        });
    Ok(Some(defs))
}

fn parse_variable_definition<'a>(
    p: &mut Parser<'a>,
) -> ParseResult<(Spanning<&'a str>, VariableDefinition<'a>)> {
    let start = p.expect(&Token::Dollar)?.span.start;
    let var_name = p.expect_name()?;
    p.expect(&Token::Colon)?;
    let var_type = parse_type(p)?;

    let default_value = if p.skip(&Token::Equals)?.is_some() {
        Some(parse_value_literal(p, true)?)
    } else {
        None
    };

    let end = default_value
        .as_ref()
        .map_or(var_type.span.end, |s| s.span.end);

    Ok(Spanning::start_end(
        &start,
        &end,
        (
            // The variable name's span includes the leading `$`.
            Spanning::start_end(&start, &var_name.span.end, var_name.item),
            VariableDefinition {
                var_type,
                default_value,
            },
        ),
    ))
}

fn parse_directives<'a>(p: &mut Parser<'a>) -> OptionParseResult<Vec<Spanning<Directive<'a>>>> {
    let mut items = Vec::new();
    while p.peek().item == Token::At {
        items.push(parse_directive(p)?);
    }

    Ok(Spanning::spanning(items))
}

fn parse_directive<'a>(p: &mut Parser<'a>) -> ParseResult<Directive<'a>> {
    let start = p.expect(&Token::At)?.span.start;
    let name = p.expect_name()?;

    let arguments = parse_arguments(p)?;

    let end = arguments.as_ref().map_or(name.span.end, |s| s.span.end);
    Ok(Spanning::start_end(
        &start,
        &end,
        Directive { name, arguments },
    ))
}

pub fn parse_type<'a>(p: &mut Parser<'a>) -> ParseResult<Type<'a>> {
    let parsed = if let Some(open) = p.skip(&Token::BracketOpen)? {
        let inner = parse_type(p)?;
        let end = p.expect(&Token::BracketClose)?.span.end;
        Spanning::start_end(&open.span.start, &end, Type::List(Box::new(inner.item)))
    } else {
        p.expect_name()?.map(|s| Type::Named(Cow::Borrowed(s)))
    };

    if p.peek().item == Token::ExclamationMark {
        wrap_non_null(p, parsed)
    } else {
        Ok(parsed)
    }
}

fn wrap_non_null<'a>(p: &mut Parser<'a>, inner: Spanning<Type<'a>>) -> ParseResult<Type<'a>> {
    let end = p.expect(&Token::ExclamationMark)?.span.end;

    let wrapped = match inner.item {
        Type::Named(name) => Type::NonNullNamed(name),
        Type::List(l) => Type::NonNullList(l),
        t => t,
    };

    Ok(Spanning::start_end(&inner.span.start, &end, wrapped))
}

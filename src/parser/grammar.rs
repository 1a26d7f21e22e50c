//! Parser implementation using chumsky

use chumsky::input::{Stream, ValueInput};
use chumsky::prelude::*;

use crate::layout::types::{Priority, Relation};
use crate::parser::ast::*;
use crate::parser::lexer::Token;

/// Parse layout statements into an AST
pub fn parse(input: &str) -> Result<Document, Vec<crate::ParseError>> {
    let len = input.len();

    // Create a logos lexer and convert to token stream
    let token_iter = crate::parser::lexer::lex(input).map(|(tok, span)| (tok, span.into()));

    // Turn the token iterator into a stream that chumsky can use
    let token_stream = Stream::from_iter(token_iter)
        // Split (Token, SimpleSpan) into token and span parts
        .map((len..len).into(), |(t, s): (_, _)| (t, s));

    document_parser()
        .parse(token_stream)
        .into_result()
        .map_err(|errs| errs.into_iter().map(|e| e.into()).collect())
}

/// Helper to extract span range from chumsky's MapExtra
fn span_range(e: &impl chumsky::span::Span<Offset = usize>) -> std::ops::Range<usize> {
    e.start()..e.end()
}

/// Priority names accepted after `@`
fn named_priority(name: &str) -> Option<Priority> {
    match name {
        "required" => Some(Priority::REQUIRED),
        "high" => Some(Priority::HIGH),
        "low" => Some(Priority::LOW),
        "fitting" => Some(Priority::FITTING),
        _ => None,
    }
}

fn document_parser<'a, I>() -> impl Parser<'a, I, Document, extra::Err<Rich<'a, Token>>> + Clone
where
    I: ValueInput<'a, Token = Token, Span = SimpleSpan>,
{
    // Basic token parsers
    let identifier = select! {
        Token::Ident(s) => Identifier::new(s),
    }
    .map_with(|id, e| Spanned::new(id, span_range(&e.span())));

    let number = select! {
        Token::Number(n) => n,
    };

    let signed_number = just(Token::Minus)
        .or_not()
        .then(number.clone())
        .map(|(neg, n)| if neg.is_some() { -n } else { n });

    // View path: name followed by any number of `.superview` hops
    let view_path = identifier
        .clone()
        .then(
            just(Token::Dot)
                .then(just(Token::Superview))
                .repeated()
                .collect::<Vec<_>>()
                .map(|hops| hops.len()),
        )
        .map_with(|(view, superviews), e| {
            Spanned::new(ViewPath { view, superviews }, span_range(&e.span()))
        });

    let property = select! {
        Token::Ident(s) => s,
    }
    .try_map(|name, span: SimpleSpan| match Property::from_name(&name) {
        Some(property) => Ok(Spanned::new(property, span_range(&span))),
        None => Err(Rich::custom(
            span,
            format!("'{}' is not a layout property", name),
        )),
    });

    // Property reference: path.property
    let property_ref = view_path
        .then_ignore(just(Token::Dot))
        .then(property)
        .map(|(path, property)| PropertyRef { path, property });

    let relation = choice((
        just(Token::Equals).to(Relation::Equal),
        just(Token::GreaterOrEqual).to(Relation::GreaterOrEqual),
        just(Token::LessOrEqual).to(Relation::LessOrEqual),
    ))
    .map_with(|r, e| Spanned::new(r, span_range(&e.span())));

    // Scale: * number or / number
    let multiplier = choice((
        just(Token::Star).ignore_then(number.clone()),
        just(Token::Slash)
            .ignore_then(number.clone())
            .try_map(|divisor, span: SimpleSpan| {
                if divisor == 0.0 {
                    Err(Rich::custom(span, "division by zero"))
                } else {
                    Ok(1.0 / divisor)
                }
            }),
    ));

    // Parse offset: + number or - number
    let offset = choice((
        just(Token::Plus).ignore_then(number.clone()),
        just(Token::Minus).ignore_then(number.clone()).map(|n| -n),
    ));

    // Right-hand side (order matters - try more specific first)
    let inset_expr = property_ref
        .clone()
        .then_ignore(just(Token::Inset))
        .then(signed_number.clone())
        .map(|(target, inset)| Expression::Inset { target, inset });

    let property_expr = property_ref
        .clone()
        .then(multiplier.or_not())
        .then(offset.or_not())
        .map(|((target, multiplier), constant)| Expression::Property {
            target,
            multiplier: multiplier.unwrap_or(1.0),
            constant: constant.unwrap_or(0.0),
        });

    let constant_expr = signed_number.map(Expression::Constant);

    let expression = choice((inset_expr, property_expr, constant_expr))
        .map_with(|x, e| Spanned::new(x, span_range(&e.span())));

    // Priority: @ 750 or @ high
    let priority_value = choice((
        number.try_map(|value, span: SimpleSpan| {
            if (1.0..=1000.0).contains(&value) {
                Ok(value)
            } else {
                Err(Rich::custom(
                    span,
                    format!("priority {} is outside 1..=1000", value),
                ))
            }
        }),
        select! {
            Token::Ident(s) => s,
        }
        .try_map(|name, span: SimpleSpan| match named_priority(&name) {
            Some(priority) => Ok(priority.value() as f64),
            None => Err(Rich::custom(
                span,
                format!(
                    "unknown priority '{}'. Expected a number or one of: required, high, low, fitting",
                    name
                ),
            )),
        }),
    ))
    .map_with(|value, e| Spanned::new(value, span_range(&e.span())));

    let priority = just(Token::At).ignore_then(priority_value);

    let statement = property_ref
        .then(relation)
        .then(expression)
        .then(priority.or_not())
        .then_ignore(just(Token::Semicolon).or_not())
        .map_with(|(((left, relation), right), priority), e| {
            Spanned::new(
                Statement {
                    left,
                    relation,
                    right,
                    priority,
                },
                span_range(&e.span()),
            )
        });

    // Document is a list of statements
    statement
        .repeated()
        .collect()
        .then_ignore(end())
        .map(|statements| Document { statements })
}

//! Error types for parsing layout statements

use ariadne::{Color, Label, Report, ReportKind, Source};
use thiserror::Error;

use crate::parser::ast::Span;
use crate::parser::lexer::Token;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ParseError {
    #[error("Parse error at {span:?}: {message}")]
    Syntax {
        span: Span,
        message: String,
        expected: Vec<String>,
    },
}

impl ParseError {
    pub fn span(&self) -> &Span {
        match self {
            ParseError::Syntax { span, .. } => span,
        }
    }

    /// Format the error with source context using ariadne
    pub fn format(&self, source: &str, filename: &str) -> String {
        let mut buf = Vec::new();
        match self {
            ParseError::Syntax {
                span,
                message,
                expected,
            } => {
                let expected_str = if expected.is_empty() {
                    String::new()
                } else {
                    format!("\nExpected: {}", expected.join(", "))
                };

                // end-of-input errors can carry a reversed or overlong span
                let end = span.start.max(span.end).min(source.len());
                let span = span.start.min(span.end).min(end)..end;
                let written = Report::build(ReportKind::Error, filename, span.start)
                    .with_message(message)
                    .with_label(
                        Label::new((filename, span))
                            .with_message(format!("{}{}", message, expected_str))
                            .with_color(Color::Red),
                    )
                    .finish()
                    .write((filename, Source::from(source)), &mut buf);
                if written.is_err() {
                    return self.to_string();
                }
            }
        }
        String::from_utf8_lossy(&buf).into_owned()
    }
}

impl<'a> From<chumsky::error::Rich<'a, Token>> for ParseError {
    fn from(err: chumsky::error::Rich<'a, Token>) -> Self {
        use chumsky::error::RichReason;

        // `superview` is a path keyword, never a property
        let found_keyword = matches!(err.found(), Some(Token::Superview) | Some(Token::Inset));

        let message = match err.reason() {
            RichReason::ExpectedFound { found, .. } => {
                if found_keyword {
                    format!(
                        "Unexpected {}: it is a reserved keyword in layout statements",
                        found.as_deref().map(format_token).unwrap_or_default()
                    )
                } else {
                    let found_str = match found {
                        Some(tok) => format_token(tok),
                        None => "end of input".to_string(),
                    };
                    format!("Unexpected {}", found_str)
                }
            }
            RichReason::Custom(msg) => msg.to_string(),
        };

        // Format expected tokens nicely
        let expected: Vec<String> = err
            .expected()
            .filter_map(|e| match e {
                chumsky::error::RichPattern::Token(tok) => Some(format_token(tok)),
                chumsky::error::RichPattern::Label(label) => Some(label.to_string()),
                chumsky::error::RichPattern::EndOfInput => Some("end of input".to_string()),
                chumsky::error::RichPattern::Identifier(s) => Some(format!("identifier '{}'", s)),
                chumsky::error::RichPattern::Any => Some("any token".to_string()),
                chumsky::error::RichPattern::SomethingElse => None,
            })
            .collect();

        ParseError::Syntax {
            span: err.span().into_range(),
            message,
            expected,
        }
    }
}

/// Format a token for human-readable error messages
fn format_token(tok: &Token) -> String {
    match tok {
        Token::Ident(s) => format!("identifier '{}'", s),
        Token::Number(n) => format!("number {}", n),
        Token::Superview => "keyword 'superview'".to_string(),
        Token::Inset => "keyword 'inset'".to_string(),
        Token::GreaterOrEqual => "'>='".to_string(),
        Token::LessOrEqual => "'<='".to_string(),
        Token::Equals => "'='".to_string(),
        Token::Plus => "'+'".to_string(),
        Token::Minus => "'-'".to_string(),
        Token::Star => "'*'".to_string(),
        Token::Slash => "'/'".to_string(),
        Token::Dot => "'.'".to_string(),
        Token::At => "'@'".to_string(),
        Token::Semicolon => "';'".to_string(),
        Token::LineComment | Token::BlockComment => "comment".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use crate::parser::parse;

    #[test]
    fn test_format_points_at_source() {
        let source = "card.width = ";
        let errors = parse(source).unwrap_err();
        let report = errors[0].format(source, "layout.txt");
        assert!(report.contains("layout.txt"));
        assert!(report.contains("Unexpected end of input"));
    }

    #[test]
    fn test_format_tolerates_reversed_span() {
        use super::ParseError;

        let source = "card.width = ";
        for span in [source.len()..source.len() - 1, 4..2, 10..99] {
            let error = ParseError::Syntax {
                span,
                message: "Unexpected end of input".to_string(),
                expected: vec!["number".to_string()],
            };
            let report = error.format(source, "layout.txt");
            assert!(report.contains("Unexpected end of input"), "{}", report);
        }
    }

    #[test]
    fn test_keyword_as_property() {
        let errors = parse("card.inset = 4").unwrap_err();
        assert!(errors[0].to_string().contains("keyword 'inset'"));
    }
}

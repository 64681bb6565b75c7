// Rill Parser Error Handling
// Error reporting with miette integration

use miette::{Diagnostic, SourceSpan};
use thiserror::Error;

/// Main parse error type with miette integration
#[derive(Error, Diagnostic, Debug)]
pub enum ParseError {
    #[error("Lexical error")]
    #[diagnostic(
        code(rill::parse::lexical_error),
        help("Check the syntax near the highlighted location")
    )]
    Lexical {
        #[source_code]
        src: String,
        #[label("cannot tokenize this")]
        span: SourceSpan,
        message: String,
    },

    #[error("Unknown operator: {found}")]
    #[diagnostic(
        code(rill::parse::unknown_operator),
        help("Operators must be registered in the grammar table before use")
    )]
    UnknownOperator {
        #[source_code]
        src: String,
        #[label("no registered operator matches")]
        span: SourceSpan,
        found: String,
    },

    #[error("Invalid integer literal")]
    #[diagnostic(
        code(rill::parse::invalid_integer),
        help("Integer literals must fit in a 64-bit signed integer")
    )]
    InvalidInteger {
        #[source_code]
        src: String,
        #[label("invalid integer")]
        span: SourceSpan,
        found: String,
    },

    #[error("Inconsistent indentation: width {width} matches no open block level")]
    #[diagnostic(
        code(rill::parse::inconsistent_indent),
        help("Indent to the enclosing block's width ({level}) or deeper than it")
    )]
    InconsistentIndent { width: usize, level: usize },

    #[error("Unexpected token: {found}")]
    #[diagnostic(
        code(rill::parse::unexpected_token),
        help("This symbol cannot appear at the start of an expression")
    )]
    UnexpectedToken { found: String },

    #[error("Expression ended unexpectedly")]
    #[diagnostic(
        code(rill::parse::unexpected_end),
        help("An operand is missing at the end of the expression")
    )]
    UnexpectedEnd,

    #[error("Missing closing '{expected}'")]
    #[diagnostic(
        code(rill::parse::missing_close),
        help("Bracketed expressions must be closed on the same statement")
    )]
    MissingClose { expected: String, found: String },

    #[error("Trailing tokens after expression: {found}")]
    #[diagnostic(
        code(rill::parse::trailing_tokens),
        help("Either an operator is missing here or its declaration is missing from the grammar")
    )]
    TrailingTokens { found: String },

    #[error("Malformed parameter list: {found}")]
    #[diagnostic(
        code(rill::parse::malformed_params),
        help("Lambda parameters must be a single name or a comma-separated list of names")
    )]
    MalformedParams { found: String },
}

impl ParseError {
    /// Create a lexical error from a Pest error on one source line.
    ///
    /// `line_offset` is the byte offset of the line within the full
    /// source, so the reported span points into `src` as a whole.
    pub fn from_pest_error<R: pest::RuleType>(
        error: pest::error::Error<R>,
        src: String,
        line_offset: usize,
    ) -> Self {
        let span = match error.location {
            pest::error::InputLocation::Pos(pos) => SourceSpan::new((line_offset + pos).into(), 1),
            pest::error::InputLocation::Span((start, end)) => {
                SourceSpan::new((line_offset + start).into(), end - start)
            }
        };
        let message = match &error.variant {
            pest::error::ErrorVariant::ParsingError { positives, .. } => {
                format!("expected one of: {positives:?}")
            }
            other => format!("{other}"),
        };
        ParseError::Lexical { src, span, message }
    }

    /// Create an unknown operator error
    pub fn unknown_operator(src: String, span: SourceSpan, found: String) -> Self {
        ParseError::UnknownOperator { src, span, found }
    }

    /// Create an invalid integer error
    pub fn invalid_integer(src: String, span: SourceSpan, found: String) -> Self {
        ParseError::InvalidInteger { src, span, found }
    }

    /// Create an inconsistent indentation error
    pub fn inconsistent_indent(width: usize, level: usize) -> Self {
        ParseError::InconsistentIndent { width, level }
    }

    /// Create an unexpected token error
    pub fn unexpected_token(found: impl Into<String>) -> Self {
        ParseError::UnexpectedToken {
            found: found.into(),
        }
    }

    /// Create a missing close symbol error
    pub fn missing_close(expected: impl Into<String>, found: impl Into<String>) -> Self {
        ParseError::MissingClose {
            expected: expected.into(),
            found: found.into(),
        }
    }

    /// Create a trailing tokens error
    pub fn trailing_tokens(found: impl Into<String>) -> Self {
        ParseError::TrailingTokens {
            found: found.into(),
        }
    }

    /// Create a malformed parameter list error
    pub fn malformed_params(found: impl Into<String>) -> Self {
        ParseError::MalformedParams {
            found: found.into(),
        }
    }
}

/// Result type for parsing operations
pub type ParseResult<T> = Result<T, ParseError>;

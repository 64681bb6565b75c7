// Rill Tokenizer
// Pest-based line lexer. Emits one indentation marker per source line
// followed by the line's tokens; operator-character runs are split
// longest-first against the grammar table and identifier-shaped
// keywords are promoted to their registered symbols.

use crate::error::{ParseError, ParseResult};
use crate::grammar::{Grammar, GRAMMAR};
use log::trace;
use miette::SourceSpan;
use pest::Parser;
use pest_derive::Parser;

#[derive(Parser)]
#[grammar = "grammar.pest"]
struct LineLexer;

/// One lexical token. `Dent` carries the leading-whitespace width of
/// the line it precedes; every other variant carries its literal
/// value with delimiters stripped.
#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    Dent(usize),
    Int(i64),
    Str(String),
    ShellCmd(String),
    Regex(String),
    Id(String),
    Comment(String),
    Sym(&'static str),
}

/// Tokenize a whole source text against the process-wide grammar.
pub fn tokenize(source: &str) -> ParseResult<Vec<Token>> {
    tokenize_with(source, &GRAMMAR)
}

/// Tokenize against an explicit grammar table.
pub fn tokenize_with(source: &str, grammar: &Grammar) -> ParseResult<Vec<Token>> {
    let mut tokens = Vec::new();
    let mut offset = 0;
    for raw in source.split_inclusive('\n') {
        let line = raw.strip_suffix('\n').unwrap_or(raw);
        let line = line.strip_suffix('\r').unwrap_or(line);
        tokens.push(Token::Dent(indent_width(line)));
        tokenize_line(line, offset, source, grammar, &mut tokens)?;
        offset += raw.len();
    }
    trace!("tokenized {} tokens", tokens.len());
    Ok(tokens)
}

/// Leading-whitespace width of a line, counting each whitespace
/// character as one.
fn indent_width(line: &str) -> usize {
    line.chars().take_while(|c| c.is_whitespace()).count()
}

fn tokenize_line(
    line: &str,
    line_offset: usize,
    source: &str,
    grammar: &Grammar,
    tokens: &mut Vec<Token>,
) -> ParseResult<()> {
    let mut pairs = LineLexer::parse(Rule::line, line)
        .map_err(|e| ParseError::from_pest_error(e, source.to_string(), line_offset))?;
    let line_pair = pairs.next().unwrap();

    for token_pair in line_pair.into_inner() {
        if token_pair.as_rule() == Rule::EOI {
            continue;
        }
        let inner = token_pair.into_inner().next().unwrap();
        let start = line_offset + inner.as_span().start();
        match inner.as_rule() {
            Rule::comment => tokens.push(Token::Comment(inner.as_str().to_string())),
            Rule::integer => {
                let text = inner.as_str();
                let value = text.parse::<i64>().map_err(|_| {
                    ParseError::invalid_integer(
                        source.to_string(),
                        SourceSpan::new(start.into(), text.len()),
                        text.to_string(),
                    )
                })?;
                tokens.push(Token::Int(value));
            }
            Rule::string => tokens.push(Token::Str(body_of(inner))),
            Rule::shell_cmd => tokens.push(Token::ShellCmd(body_of(inner))),
            Rule::regex => tokens.push(Token::Regex(body_of(inner))),
            Rule::ident => match grammar.word_symbol(inner.as_str()) {
                Some(text) => tokens.push(Token::Sym(text)),
                None => tokens.push(Token::Id(inner.as_str().to_string())),
            },
            Rule::opchars => split_operators(inner.as_str(), start, source, grammar, tokens)?,
            rule => unreachable!("unexpected lexical rule {rule:?}"),
        }
    }
    Ok(())
}

/// Delimiter-stripped body of a string, shell-command or regex pair.
fn body_of(pair: pest::iterators::Pair<Rule>) -> String {
    pair.into_inner().next().unwrap().as_str().to_string()
}

/// Split a run of operator characters into registered symbols,
/// longest match first.
fn split_operators(
    run: &str,
    run_offset: usize,
    source: &str,
    grammar: &Grammar,
    tokens: &mut Vec<Token>,
) -> ParseResult<()> {
    let mut rest = run;
    let mut consumed = 0;
    while !rest.is_empty() {
        let Some(text) = grammar.match_longest(rest) else {
            return Err(ParseError::unknown_operator(
                source.to_string(),
                SourceSpan::new((run_offset + consumed).into(), rest.len()),
                rest.to_string(),
            ));
        };
        tokens.push(Token::Sym(text));
        consumed += text.len();
        rest = &rest[text.len()..];
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn toks(source: &str) -> Vec<Token> {
        tokenize(source).unwrap()
    }

    #[test]
    fn test_simple_assignment() {
        assert_eq!(
            toks("x = 1"),
            vec![
                Token::Dent(0),
                Token::Id("x".to_string()),
                Token::Sym("="),
                Token::Int(1),
            ]
        );
    }

    #[test]
    fn test_dent_widths() {
        let tokens = toks("a\n  b\n    c");
        let dents: Vec<_> = tokens
            .iter()
            .filter_map(|t| match t {
                Token::Dent(w) => Some(*w),
                _ => None,
            })
            .collect();
        assert_eq!(dents, vec![0, 2, 4]);
    }

    #[test]
    fn test_minus_glues_to_digits() {
        assert_eq!(
            toks("x = -1"),
            vec![
                Token::Dent(0),
                Token::Id("x".to_string()),
                Token::Sym("="),
                Token::Int(-1),
            ]
        );
        // Spaced out, the minus is an operator.
        assert_eq!(
            toks("1 - 2"),
            vec![
                Token::Dent(0),
                Token::Int(1),
                Token::Sym("-"),
                Token::Int(2),
            ]
        );
    }

    #[test]
    fn test_two_char_operators_win() {
        assert_eq!(
            toks("a == b"),
            vec![
                Token::Dent(0),
                Token::Id("a".to_string()),
                Token::Sym("=="),
                Token::Id("b".to_string()),
            ]
        );
        assert_eq!(
            toks("x=-1")[1..],
            [Token::Id("x".to_string()), Token::Sym("="), Token::Sym("-"), Token::Int(1)]
        );
    }

    #[test]
    fn test_keywords_become_symbols() {
        assert_eq!(
            toks("match _"),
            vec![Token::Dent(0), Token::Sym("match"), Token::Sym("_")]
        );
        // A longer identifier sharing the prefix stays an identifier.
        assert_eq!(
            toks("matches"),
            vec![Token::Dent(0), Token::Id("matches".to_string())]
        );
    }

    #[test]
    fn test_two_strings_on_one_line() {
        assert_eq!(
            toks("\"a\" , \"b\"")[1..],
            [
                Token::Str("a".to_string()),
                Token::Sym(","),
                Token::Str("b".to_string()),
            ]
        );
    }

    #[test]
    fn test_comment_forms() {
        assert_eq!(
            toks("x # note"),
            vec![
                Token::Dent(0),
                Token::Id("x".to_string()),
                Token::Comment("# note".to_string()),
            ]
        );
        assert_eq!(
            toks("// not an empty regex"),
            vec![
                Token::Dent(0),
                Token::Comment("// not an empty regex".to_string()),
            ]
        );
        assert_eq!(
            toks("x /* mid */ y")[1..],
            [
                Token::Id("x".to_string()),
                Token::Comment("/* mid */".to_string()),
                Token::Id("y".to_string()),
            ]
        );
    }

    #[test]
    fn test_regex_and_shell_literals() {
        assert_eq!(
            toks("a =~ /h(?P<x>i)/")[1..],
            [
                Token::Id("a".to_string()),
                Token::Sym("=~"),
                Token::Regex("h(?P<x>i)".to_string()),
            ]
        );
        assert_eq!(
            toks("`echo hi`")[1..],
            [Token::ShellCmd("echo hi".to_string())]
        );
    }

    #[test]
    fn test_unknown_operator_errors() {
        let err = tokenize("a ; b").unwrap_err();
        assert!(matches!(err, ParseError::UnknownOperator { .. }));
    }

    #[test]
    fn test_integer_overflow_errors() {
        let err = tokenize("99999999999999999999").unwrap_err();
        assert!(matches!(err, ParseError::InvalidInteger { .. }));
    }

    #[test]
    fn test_blank_lines_emit_dents() {
        assert_eq!(
            toks("a\n\nb"),
            vec![
                Token::Dent(0),
                Token::Id("a".to_string()),
                Token::Dent(0),
                Token::Dent(0),
                Token::Id("b".to_string()),
            ]
        );
    }
}

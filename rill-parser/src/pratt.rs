// Rill Pratt Expression Parser
// Top-down operator precedence resolution for one flat expression.
// A null denotation produces the leftmost operand, then any symbol
// whose left binding power exceeds the current right binding power
// extends it. The grammar table supplies both denotations as data,
// so the walk itself knows nothing about individual operators.

use crate::ast::Node;
use crate::error::{ParseError, ParseResult};
use crate::grammar::{Grammar, Led, Nud};
use log::trace;

pub struct ExprParser<'g> {
    grammar: &'g Grammar,
    items: std::vec::IntoIter<Node>,
    next: Option<Node>,
}

impl<'g> ExprParser<'g> {
    pub fn new(items: Vec<Node>, grammar: &'g Grammar) -> Self {
        let mut items = items.into_iter();
        let next = items.next();
        ExprParser {
            grammar,
            items,
            next,
        }
    }

    /// Parse the whole item list as one expression. Items left over
    /// after the top-level expression ends are a structural error.
    pub fn parse(mut self) -> ParseResult<Node> {
        let node = self.expr(0)?;
        trace!("resolved expression: {node}");
        match self.next {
            None => Ok(node),
            Some(extra) => Err(ParseError::trailing_tokens(extra.to_string())),
        }
    }

    fn shift(&mut self) -> Option<Node> {
        let current = self.next.take();
        self.next = self.items.next();
        current
    }

    /// Binding power of the upcoming item. Operands bind at zero, so
    /// two adjacent operands never join without an operator between.
    fn peek_lbp(&self) -> u32 {
        match &self.next {
            Some(Node::Sym(text)) => self.grammar.lbp(text),
            _ => 0,
        }
    }

    fn expr(&mut self, rbp: u32) -> ParseResult<Node> {
        let mut left = self.nud()?;
        while rbp < self.peek_lbp() {
            let Some(Node::Sym(text)) = self.shift() else {
                unreachable!("positive binding power on a non-symbol");
            };
            left = self.led(text, left)?;
        }
        Ok(left)
    }

    fn nud(&mut self) -> ParseResult<Node> {
        let node = self.shift().ok_or(ParseError::UnexpectedEnd)?;
        let Node::Sym(text) = node else {
            // Every non-symbol item is its own null denotation.
            return Ok(node);
        };
        match self.grammar.get(text).and_then(|s| s.nud) {
            Some(Nud::Prefix { rbp, build }) => Ok(build(self.expr(rbp)?)),
            Some(Nud::Action { build }) => Ok(build()),
            Some(Nud::Brackets { close, build }) => {
                let inner = self.expr(0)?;
                self.expect_close(close)?;
                Ok(build(inner))
            }
            None => Err(ParseError::unexpected_token(text)),
        }
    }

    fn led(&mut self, text: &'static str, left: Node) -> ParseResult<Node> {
        match self.grammar.get(text).and_then(|s| s.led) {
            Some(Led::Infix { rbp, build }) => Ok(build(left, self.expr(rbp)?)),
            Some(Led::Postfix { build }) => Ok(build(left)),
            Some(Led::Subscript { close, build }) => {
                let index = self.expr(0)?;
                self.expect_close(close)?;
                Ok(build(left, index))
            }
            None => Err(ParseError::unexpected_token(text)),
        }
    }

    fn expect_close(&mut self, close: &'static str) -> ParseResult<()> {
        match self.shift() {
            Some(Node::Sym(text)) if text == close => Ok(()),
            Some(other) => Err(ParseError::missing_close(close, other.to_string())),
            None => Err(ParseError::missing_close(close, "end of expression")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grammar::GRAMMAR;

    fn resolve(items: Vec<Node>) -> ParseResult<Node> {
        ExprParser::new(items, &GRAMMAR).parse()
    }

    fn id(name: &str) -> Node {
        Node::Id(name.to_string())
    }

    #[test]
    fn test_mul_binds_tighter_than_add() {
        let items = vec![
            Node::Int(1),
            Node::Sym("+"),
            Node::Int(2),
            Node::Sym("*"),
            Node::Int(3),
        ];
        assert_eq!(resolve(items).unwrap().to_string(), "(+ 1 (* 2 3))");
    }

    #[test]
    fn test_pow_is_right_associative() {
        let items = vec![
            Node::Int(2),
            Node::Sym("^"),
            Node::Int(3),
            Node::Sym("^"),
            Node::Int(2),
        ];
        assert_eq!(resolve(items).unwrap().to_string(), "(^ 2 (^ 3 2))");
    }

    #[test]
    fn test_assign_chains_right() {
        let items = vec![id("a"), Node::Sym("="), id("b"), Node::Sym("="), Node::Int(1)];
        assert_eq!(resolve(items).unwrap().to_string(), "(= a (= b 1))");
    }

    #[test]
    fn test_comma_flattens_into_one_list() {
        let items = vec![
            Node::Int(1),
            Node::Sym(","),
            Node::Int(2),
            Node::Sym(","),
            Node::Int(3),
        ];
        assert_eq!(resolve(items).unwrap().to_string(), "(comma 1 2 3)");
    }

    #[test]
    fn test_prefix_neg_binds_tighter_than_add() {
        let items = vec![Node::Sym("-"), Node::Int(1), Node::Sym("+"), Node::Int(2)];
        assert_eq!(resolve(items).unwrap().to_string(), "(+ (neg 1) 2)");
    }

    #[test]
    fn test_brackets_then_subscript() {
        let items = vec![
            Node::Sym("["),
            Node::Int(1),
            Node::Sym(","),
            Node::Int(2),
            Node::Sym("]"),
            Node::Sym("["),
            Node::Int(0),
            Node::Sym("]"),
        ];
        assert_eq!(
            resolve(items).unwrap().to_string(),
            "(index (brackets (comma 1 2)) 0)"
        );
    }

    #[test]
    fn test_postfix_call_marker() {
        let items = vec![id("f"), Node::Sym("!")];
        assert_eq!(resolve(items).unwrap().to_string(), "(call0 f)");
    }

    #[test]
    fn test_application_chains_right() {
        let items = vec![id("f"), Node::Sym("@"), id("g"), Node::Sym("@"), id("x")];
        assert_eq!(
            resolve(items).unwrap().to_string(),
            "(call f (call g x))"
        );
    }

    #[test]
    fn test_missing_close_reports_expected_symbol() {
        let items = vec![Node::Sym("("), Node::Int(1)];
        let err = resolve(items).unwrap_err();
        assert!(matches!(
            err,
            ParseError::MissingClose { ref expected, .. } if expected == ")"
        ));
    }

    #[test]
    fn test_adjacent_operands_are_trailing() {
        let items = vec![Node::Int(1), Node::Int(2)];
        let err = resolve(items).unwrap_err();
        assert!(matches!(err, ParseError::TrailingTokens { .. }));
    }

    #[test]
    fn test_symbol_without_null_denotation() {
        let items = vec![Node::Sym("*"), Node::Int(1)];
        let err = resolve(items).unwrap_err();
        assert!(matches!(err, ParseError::UnexpectedToken { ref found } if found == "*"));
    }

    #[test]
    fn test_empty_expression_is_unexpected_end() {
        let err = resolve(Vec::new()).unwrap_err();
        assert!(matches!(err, ParseError::UnexpectedEnd));
    }
}

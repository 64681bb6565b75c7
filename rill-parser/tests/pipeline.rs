// Full pipeline parsing tests
// Source text through the tokenizer, block reconstruction, and every
// rewrite pass, checked against expected tree shapes.

use rill_parser::{parse_program, ParseError};

fn shape(source: &str) -> String {
    parse_program(source).unwrap().to_string()
}

fn parse_error(source: &str) -> ParseError {
    parse_program(source).unwrap_err()
}

#[test]
fn test_parse_arithmetic_precedence() {
    assert_eq!(shape("1 + 2 * 3"), "(block (+ 1 (* 2 3)))");
}

#[test]
fn test_parse_pow_right_associative() {
    assert_eq!(shape("2 ^ 3 ^ 2"), "(block (^ 2 (^ 3 2)))");
}

#[test]
fn test_parse_assignment_chain() {
    assert_eq!(shape("a = b = 1"), "(block (= a (= b 1)))");
}

#[test]
fn test_parse_comparison_binds_looser_than_arithmetic() {
    assert_eq!(shape("a == b + 1"), "(block (== a (+ b 1)))");
}

#[test]
fn test_parse_comma_flattens() {
    assert_eq!(shape("1, 2, 3"), "(block (comma 1 2 3))");
}

#[test]
fn test_parse_implicit_call_matches_explicit() {
    assert_eq!(shape("f x"), "(block (call f x))");
    assert_eq!(shape("f x"), shape("f @ x"));
}

#[test]
fn test_parse_inline_lambda_matches_indented() {
    let inline = parse_program("f = -> x + 1").unwrap();
    let indented = parse_program("f = ->\n  x + 1").unwrap();
    assert_eq!(inline, indented);
}

#[test]
fn test_parse_lambda_param_list() {
    assert_eq!(
        shape("f = (a, b) -> a + b"),
        "(block (= f (-> (params a b) (block (+ a b)))))"
    );
}

#[test]
fn test_parse_match_block() {
    assert_eq!(
        shape("match\n  a => 1\n  _ => 2"),
        "(block (match (block (=> a 1) (=> _ 2))))"
    );
}

#[test]
fn test_parse_brackets_and_subscript() {
    assert_eq!(shape("[1, 2][0]"), "(block (index (brackets (comma 1 2)) 0))");
}

#[test]
fn test_parse_prefix_forms_take_the_rest() {
    assert_eq!(shape("p 1 + 2"), "(block (p (+ 1 2)))");
    assert_eq!(shape("assert x == 1"), "(block (assert (== x 1)))");
}

#[test]
fn test_parse_guard_clause() {
    assert_eq!(shape("x == 1 => p x"), "(block (=> (== x 1) (p x)))");
}

#[test]
fn test_parse_nested_blocks_unwind_to_top() {
    assert_eq!(
        shape("a = ->\n  b = ->\n    1\nc = 2"),
        "(block (= a (lambda0 (block (= b (lambda0 (block 1)))))) (= c 2))"
    );
}

#[test]
fn test_parse_comment_does_not_change_shape() {
    assert_eq!(shape("x = 1 # note"), shape("x = 1"));
    assert_eq!(shape("x = 1\n# whole line\ny = 2"), shape("x = 1\ny = 2"));
}

#[test]
fn test_parse_shell_and_regex_literals() {
    assert_eq!(shape("`echo hi`"), "(block `echo hi`)");
    assert_eq!(shape("x =~ /ab/"), "(block (=~ x /ab/))");
}

#[test]
fn test_unknown_operator_is_reported() {
    assert!(matches!(
        parse_error("a ; b"),
        ParseError::UnknownOperator { .. }
    ));
}

#[test]
fn test_inconsistent_indent_is_reported() {
    assert!(matches!(
        parse_error("f = ->\n    a\n  b"),
        ParseError::InconsistentIndent { .. }
    ));
}

#[test]
fn test_unclosed_parens_are_reported() {
    assert!(matches!(
        parse_error("(1 + 2"),
        ParseError::MissingClose { .. }
    ));
}

#[test]
fn test_adjacent_literals_are_reported() {
    assert!(matches!(
        parse_error("1 2"),
        ParseError::TrailingTokens { .. }
    ));
}

#[test]
fn test_empty_parens_are_reported() {
    assert!(matches!(
        parse_error("f@()"),
        ParseError::UnexpectedToken { .. }
    ));
}

// Rill Syntax Tree
// Node shapes produced by block reconstruction, precedence resolution
// and the rewrite passes. Evaluation semantics live in rill-interpreter.

use crate::error::ParseResult;
use std::fmt;

/// A syntax tree node.
///
/// Right after block reconstruction the tree is shallow: a `Block` of
/// `Expr` sequences whose items are literal leaves and raw `Sym`
/// operators. The rewrite pipeline then replaces every `Expr` with a
/// properly nested operator tree and desugars `Lambda` parameters and
/// `Call` arguments.
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    // Leaves
    Int(i64),
    Str(String),
    ShellCmd(String),
    Regex(String),
    Id(String),
    /// A registered operator symbol, not yet given tree structure.
    Sym(&'static str),
    /// The `_` guard, truthy in any position.
    AlwaysTrue,

    // Sequences
    /// A flat run of items awaiting precedence resolution.
    Expr(Vec<Node>),
    /// One indentation level: a sequence of statements.
    Block(Vec<Node>),
    /// A flattened comma list: `a, b, c` is one node with three children.
    Comma(Vec<Node>),
    /// Desugared lambda parameter names.
    Params(Vec<String>),
    /// Desugared call arguments.
    Args(Vec<Node>),

    // Unary operators
    Print(Box<Node>),
    Assert(Box<Node>),
    Neg(Box<Node>),
    Pos(Box<Node>),
    Match(Box<Node>),
    Lambda0(Box<Node>),
    Call0(Box<Node>),
    Parens(Box<Node>),
    Brackets(Box<Node>),

    // Binary operators
    Add(Box<Node>, Box<Node>),
    Sub(Box<Node>, Box<Node>),
    Mul(Box<Node>, Box<Node>),
    Pow(Box<Node>, Box<Node>),
    Assign(Box<Node>, Box<Node>),
    Eq(Box<Node>, Box<Node>),
    Less(Box<Node>, Box<Node>),
    More(Box<Node>, Box<Node>),
    IfThen { cond: Box<Node>, then: Box<Node> },
    RegMatch(Box<Node>, Box<Node>),
    Lambda { params: Box<Node>, body: Box<Node> },
    Compose(Box<Node>, Box<Node>),
    ComposeR(Box<Node>, Box<Node>),
    Index(Box<Node>, Box<Node>),
    Call { func: Box<Node>, args: Box<Node> },
}

impl Node {
    /// Rebuild this node with `f` applied to each direct child.
    ///
    /// Leaves are returned unchanged. This is the single traversal
    /// primitive the rewrite engine is built on.
    pub fn map_children<F>(self, f: &mut F) -> ParseResult<Node>
    where
        F: FnMut(Node) -> ParseResult<Node>,
    {
        fn one<F>(node: Box<Node>, f: &mut F) -> ParseResult<Box<Node>>
        where
            F: FnMut(Node) -> ParseResult<Node>,
        {
            Ok(Box::new(f(*node)?))
        }
        fn each<F>(nodes: Vec<Node>, f: &mut F) -> ParseResult<Vec<Node>>
        where
            F: FnMut(Node) -> ParseResult<Node>,
        {
            nodes.into_iter().map(f).collect()
        }

        Ok(match self {
            leaf @ (Node::Int(_)
            | Node::Str(_)
            | Node::ShellCmd(_)
            | Node::Regex(_)
            | Node::Id(_)
            | Node::Sym(_)
            | Node::AlwaysTrue
            | Node::Params(_)) => leaf,

            Node::Expr(items) => Node::Expr(each(items, f)?),
            Node::Block(stmts) => Node::Block(each(stmts, f)?),
            Node::Comma(items) => Node::Comma(each(items, f)?),
            Node::Args(items) => Node::Args(each(items, f)?),

            Node::Print(a) => Node::Print(one(a, f)?),
            Node::Assert(a) => Node::Assert(one(a, f)?),
            Node::Neg(a) => Node::Neg(one(a, f)?),
            Node::Pos(a) => Node::Pos(one(a, f)?),
            Node::Match(a) => Node::Match(one(a, f)?),
            Node::Lambda0(a) => Node::Lambda0(one(a, f)?),
            Node::Call0(a) => Node::Call0(one(a, f)?),
            Node::Parens(a) => Node::Parens(one(a, f)?),
            Node::Brackets(a) => Node::Brackets(one(a, f)?),

            Node::Add(l, r) => Node::Add(one(l, f)?, one(r, f)?),
            Node::Sub(l, r) => Node::Sub(one(l, f)?, one(r, f)?),
            Node::Mul(l, r) => Node::Mul(one(l, f)?, one(r, f)?),
            Node::Pow(l, r) => Node::Pow(one(l, f)?, one(r, f)?),
            Node::Assign(l, r) => Node::Assign(one(l, f)?, one(r, f)?),
            Node::Eq(l, r) => Node::Eq(one(l, f)?, one(r, f)?),
            Node::Less(l, r) => Node::Less(one(l, f)?, one(r, f)?),
            Node::More(l, r) => Node::More(one(l, f)?, one(r, f)?),
            Node::IfThen { cond, then } => Node::IfThen {
                cond: one(cond, f)?,
                then: one(then, f)?,
            },
            Node::RegMatch(l, r) => Node::RegMatch(one(l, f)?, one(r, f)?),
            Node::Lambda { params, body } => Node::Lambda {
                params: one(params, f)?,
                body: one(body, f)?,
            },
            Node::Compose(l, r) => Node::Compose(one(l, f)?, one(r, f)?),
            Node::ComposeR(l, r) => Node::ComposeR(one(l, f)?, one(r, f)?),
            Node::Index(l, r) => Node::Index(one(l, f)?, one(r, f)?),
            Node::Call { func, args } => Node::Call {
                func: one(func, f)?,
                args: one(args, f)?,
            },
        })
    }
}

/// Renders the tree in s-expression form, the shape dumped by the
/// command-line `--ast` flag and used in diagnostics.
impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fn seq(f: &mut fmt::Formatter<'_>, tag: &str, items: &[Node]) -> fmt::Result {
            write!(f, "({tag}")?;
            for item in items {
                write!(f, " {item}")?;
            }
            write!(f, ")")
        }

        match self {
            Node::Int(v) => write!(f, "{v}"),
            Node::Str(s) => write!(f, "\"{s}\""),
            Node::ShellCmd(s) => write!(f, "`{s}`"),
            Node::Regex(s) => write!(f, "/{s}/"),
            Node::Id(name) => write!(f, "{name}"),
            Node::Sym(s) => write!(f, "{s}"),
            Node::AlwaysTrue => write!(f, "_"),

            Node::Expr(items) => seq(f, "expr", items),
            Node::Block(stmts) => seq(f, "block", stmts),
            Node::Comma(items) => seq(f, "comma", items),
            Node::Params(names) => {
                write!(f, "(params")?;
                for name in names {
                    write!(f, " {name}")?;
                }
                write!(f, ")")
            }
            Node::Args(items) => seq(f, "args", items),

            Node::Print(a) => write!(f, "(p {a})"),
            Node::Assert(a) => write!(f, "(assert {a})"),
            Node::Neg(a) => write!(f, "(neg {a})"),
            Node::Pos(a) => write!(f, "(pos {a})"),
            Node::Match(a) => write!(f, "(match {a})"),
            Node::Lambda0(a) => write!(f, "(lambda0 {a})"),
            Node::Call0(a) => write!(f, "(call0 {a})"),
            Node::Parens(a) => write!(f, "(parens {a})"),
            Node::Brackets(a) => write!(f, "(brackets {a})"),

            Node::Add(l, r) => write!(f, "(+ {l} {r})"),
            Node::Sub(l, r) => write!(f, "(- {l} {r})"),
            Node::Mul(l, r) => write!(f, "(* {l} {r})"),
            Node::Pow(l, r) => write!(f, "(^ {l} {r})"),
            Node::Assign(l, r) => write!(f, "(= {l} {r})"),
            Node::Eq(l, r) => write!(f, "(== {l} {r})"),
            Node::Less(l, r) => write!(f, "(< {l} {r})"),
            Node::More(l, r) => write!(f, "(> {l} {r})"),
            Node::IfThen { cond, then } => write!(f, "(=> {cond} {then})"),
            Node::RegMatch(l, r) => write!(f, "(=~ {l} {r})"),
            Node::Lambda { params, body } => write!(f, "(-> {params} {body})"),
            Node::Compose(l, r) => write!(f, "($ {l} {r})"),
            Node::ComposeR(l, r) => write!(f, "(. {l} {r})"),
            Node::Index(l, r) => write!(f, "(index {l} {r})"),
            Node::Call { func, args } => write!(f, "(call {func} {args})"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_map_children_rebuilds_sequences() {
        let expr = Node::Expr(vec![Node::Int(1), Node::Int(2)]);
        let doubled = expr
            .map_children(&mut |n| {
                Ok(match n {
                    Node::Int(v) => Node::Int(v * 2),
                    other => other,
                })
            })
            .unwrap();
        assert_eq!(doubled, Node::Expr(vec![Node::Int(2), Node::Int(4)]));
    }

    #[test]
    fn test_map_children_leaves_untouched() {
        let id = Node::Id("x".to_string());
        let same = id
            .clone()
            .map_children(&mut |_| panic!("leaves have no children"))
            .unwrap();
        assert_eq!(same, id);
    }

    #[test]
    fn test_display_sexpr() {
        let tree = Node::Assign(
            Box::new(Node::Id("x".to_string())),
            Box::new(Node::Add(Box::new(Node::Int(1)), Box::new(Node::Int(2)))),
        );
        assert_eq!(tree.to_string(), "(= x (+ 1 2))");
    }
}

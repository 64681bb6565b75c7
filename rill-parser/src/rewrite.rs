// Rill Rewrite Pipeline
// Bottom-up passes that take the block tree from raw token shape to
// a fully structured syntax tree. Each pass is a plain function over
// one node; the engine applies it post-order so a pass always sees
// already-rewritten children.

use crate::ast::Node;
use crate::error::{ParseError, ParseResult};
use crate::grammar::GRAMMAR;
use crate::pratt::ExprParser;
use log::debug;

type Pass = fn(Node, usize) -> ParseResult<Node>;

const PASSES: [(&str, Pass); 4] = [
    ("insert_calls", insert_calls),
    ("resolve_precedence", resolve_precedence),
    ("lambda_params", lambda_params),
    ("flatten_call_args", flatten_call_args),
];

/// Run every rewrite pass over the block tree, in order, each as a
/// full post-order traversal.
pub fn finalize(tree: Node) -> ParseResult<Node> {
    let mut tree = tree;
    for (name, mut pass) in PASSES {
        tree = rewrite(tree, 0, &mut pass)?;
        debug!("after {name}: {tree}");
    }
    Ok(tree)
}

/// Apply `pass` to every node of the tree, children before parents.
pub fn rewrite<F>(node: Node, depth: usize, pass: &mut F) -> ParseResult<Node>
where
    F: FnMut(Node, usize) -> ParseResult<Node>,
{
    let node = node.map_children(&mut |child| rewrite(child, depth + 1, pass))?;
    pass(node, depth)
}

/// Insert an explicit application symbol between a name and a plain
/// juxtaposed argument, so `f x` reads as `f @ x` before precedence
/// resolution.
pub fn insert_calls(node: Node, _depth: usize) -> ParseResult<Node> {
    let Node::Expr(items) = node else {
        return Ok(node);
    };
    let mut out: Vec<Node> = Vec::with_capacity(items.len());
    for item in items {
        let callable = matches!(out.last(), Some(Node::Id(_)));
        let argument = matches!(item, Node::Id(_) | Node::Int(_) | Node::Sym("("));
        if callable && argument {
            out.push(Node::Sym("@"));
        }
        out.push(item);
    }
    Ok(Node::Expr(out))
}

/// Collapse each flat expression into its operator tree.
pub fn resolve_precedence(node: Node, _depth: usize) -> ParseResult<Node> {
    match node {
        Node::Expr(items) => ExprParser::new(items, &GRAMMAR).parse(),
        other => Ok(other),
    }
}

/// Normalize the left side of a function literal into a parameter
/// name list. Accepts a single name, a comma list of names, and
/// either form wrapped in parentheses.
pub fn lambda_params(node: Node, _depth: usize) -> ParseResult<Node> {
    let Node::Lambda { params, body } = node else {
        return Ok(node);
    };
    let unwrapped = match *params {
        Node::Parens(inner) => *inner,
        other => other,
    };
    let names = match unwrapped {
        Node::Id(name) => vec![name],
        Node::Comma(items) => items
            .into_iter()
            .map(|item| match item {
                Node::Id(name) => Ok(name),
                other => Err(ParseError::malformed_params(other.to_string())),
            })
            .collect::<ParseResult<Vec<_>>>()?,
        Node::Params(names) => names,
        other => return Err(ParseError::malformed_params(other.to_string())),
    };
    Ok(Node::Lambda {
        params: Box::new(Node::Params(names)),
        body,
    })
}

/// Normalize call arguments into a single argument list, unwrapping
/// parentheses and splicing comma lists.
pub fn flatten_call_args(node: Node, _depth: usize) -> ParseResult<Node> {
    let Node::Call { func, args } = node else {
        return Ok(node);
    };
    let args = match *args {
        Node::Parens(inner) => match *inner {
            Node::Comma(items) => Node::Args(items),
            single => single,
        },
        Node::Comma(items) => Node::Args(items),
        other => other,
    };
    Ok(Node::Call {
        func,
        args: Box::new(args),
    })
}

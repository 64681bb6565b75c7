// Rill Indentation Reconstructor
// Turns the flat token stream, one indentation marker per line, into
// a tree of nested statement blocks. Three passes: synthesize markers
// for inline lambda bodies, merge consecutive markers, then build the
// block tree recursively.

use crate::ast::Node;
use crate::error::{ParseError, ParseResult};
use crate::grammar::LAMBDA;
use crate::tokenizer::Token;
use log::debug;

/// Insert a synthetic indentation marker after a lambda introducer
/// whose body is written inline, so `f = -> x + 1` reconstructs to
/// the same one-statement block as the body on its own deeper line.
/// When a strictly deeper line already follows, nothing is inserted.
pub fn implicit_dents(tokens: Vec<Token>) -> Vec<Token> {
    let mut out = Vec::with_capacity(tokens.len());
    let mut current = 0;
    for (i, token) in tokens.iter().enumerate() {
        match token {
            Token::Dent(width) => current = *width,
            Token::Sym(s) if *s == LAMBDA => {
                let deeper_follows = tokens[i + 1..]
                    .iter()
                    .find_map(|t| match t {
                        Token::Dent(w) => Some(*w > current),
                        _ => None,
                    })
                    .unwrap_or(false);
                if !deeper_follows {
                    // Tracking the synthetic width lets chained inline
                    // lambdas nest rather than collide at one level.
                    current += 1;
                    out.push(token.clone());
                    out.push(Token::Dent(current));
                    continue;
                }
            }
            _ => {}
        }
        out.push(token.clone());
    }
    out
}

/// Collapse each run of consecutive indentation markers to its last
/// element. Blank and comment-only lines inside a block reduce to the
/// following line's marker and no longer close the block.
pub fn merge_dents(tokens: Vec<Token>) -> Vec<Token> {
    let mut out: Vec<Token> = Vec::with_capacity(tokens.len());
    for token in tokens {
        match token {
            Token::Dent(width) => {
                if let Some(Token::Dent(prev)) = out.last_mut() {
                    *prev = width;
                } else {
                    out.push(Token::Dent(width));
                }
            }
            other => out.push(other),
        }
    }
    out
}

/// Build the nested block tree from a merged token stream.
pub fn blocks(tokens: Vec<Token>) -> ParseResult<Node> {
    let tokens = implicit_dents(tokens);
    debug!("after implicit dents: {tokens:?}");
    let tokens = merge_dents(tokens);
    debug!("after merging dents: {tokens:?}");
    let mut it = tokens.into_iter();
    let (block, _) = blocks_at(&mut it, 0)?;
    debug!("block tree: {block}");
    Ok(block)
}

/// Recursive worker. Returns the block built at `lvl` plus the
/// narrower width that terminated it, or `None` when the stream ran
/// out. A width strictly between two open levels matches neither and
/// is a structural error.
fn blocks_at(
    it: &mut impl Iterator<Item = Token>,
    lvl: usize,
) -> ParseResult<(Node, Option<usize>)> {
    let mut stmts: Vec<Node> = Vec::new();
    let mut expr: Vec<Node> = Vec::new();

    fn close(stmts: &mut Vec<Node>, expr: &mut Vec<Node>) {
        if !expr.is_empty() {
            stmts.push(Node::Expr(std::mem::take(expr)));
        }
    }

    while let Some(token) = it.next() {
        match token {
            Token::Dent(width) => {
                if width == lvl {
                    close(&mut stmts, &mut expr);
                } else if width > lvl {
                    // A deeper line continues the current statement as
                    // a nested block.
                    let (nested, unwound) = blocks_at(it, width)?;
                    expr.push(nested);
                    match unwound {
                        None => {}
                        Some(w) if w == lvl => close(&mut stmts, &mut expr),
                        Some(w) if w < lvl => {
                            close(&mut stmts, &mut expr);
                            return Ok((Node::Block(stmts), Some(w)));
                        }
                        Some(w) => return Err(ParseError::inconsistent_indent(w, lvl)),
                    }
                } else {
                    close(&mut stmts, &mut expr);
                    return Ok((Node::Block(stmts), Some(width)));
                }
            }
            Token::Comment(_) => {}
            other => expr.push(leaf(other)),
        }
    }
    close(&mut stmts, &mut expr);
    Ok((Node::Block(stmts), None))
}

fn leaf(token: Token) -> Node {
    match token {
        Token::Int(v) => Node::Int(v),
        Token::Str(s) => Node::Str(s),
        Token::ShellCmd(s) => Node::ShellCmd(s),
        Token::Regex(s) => Node::Regex(s),
        Token::Id(name) => Node::Id(name),
        Token::Sym(s) => Node::Sym(s),
        Token::Dent(_) | Token::Comment(_) => unreachable!("handled by blocks_at"),
    }
}

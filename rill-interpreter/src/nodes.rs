//! Semantic program tree: lowering from syntax, then evaluation.
//!
//! Lowering substitutes each syntax node with its semantic
//! counterpart, innermost first, so every special shape is claimed
//! before the generic rules see it. Syntax that survives with no
//! semantic counterpart is a lowering error, not a panic.

use std::fmt;
use std::process::Command;
use std::rc::Rc;

use log::debug;
use rill_parser::ast::Node as Syntax;

use crate::error::{Result, RuntimeError};
use crate::frame::Frame;
use crate::value::{binary, BinOp, Value};

/// One node of the executable program tree.
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    Literal(Value),
    ShellCmd(String),
    Var(String),
    Array(Vec<Node>),
    Block(Vec<Node>),
    Print(Box<Node>),
    Assert(Box<Node>),
    Neg(Box<Node>),
    Pos(Box<Node>),
    Assign {
        name: String,
        value: Box<Node>,
    },
    Binary {
        op: BinOp,
        left: Box<Node>,
        right: Box<Node>,
    },
    IfThen {
        cond: Box<Node>,
        then: Box<Node>,
    },
    Match {
        clauses: Vec<(Node, Node)>,
    },
    Lambda {
        params: Rc<Vec<String>>,
        body: Rc<Node>,
    },
    Lambda0 {
        body: Rc<Node>,
    },
    Call {
        func: Box<Node>,
        args: Vec<Node>,
    },
    Call0 {
        func: Box<Node>,
    },
    Compose {
        left: Box<Node>,
        right: Box<Node>,
    },
    ComposeR {
        left: Box<Node>,
        right: Box<Node>,
    },
}

/// Lower a parsed syntax tree into the semantic tree.
pub fn lower(node: Syntax) -> Result<Node> {
    match node {
        Syntax::Int(v) => Ok(Node::Literal(Value::Int(v))),
        Syntax::Str(text) => Ok(Node::Literal(Value::Str(text))),
        Syntax::Regex(pattern) => Ok(Node::Literal(Value::Regex(pattern))),
        Syntax::AlwaysTrue => Ok(Node::Literal(Value::Bool(true))),
        Syntax::ShellCmd(text) => Ok(Node::ShellCmd(text)),
        Syntax::Id(name) => Ok(Node::Var(name)),

        Syntax::Block(stmts) => {
            let stmts: Result<Vec<Node>> = stmts.into_iter().map(lower).collect();
            Ok(Node::Block(stmts?))
        }
        // Grouping has no runtime meaning once precedence is resolved.
        Syntax::Parens(inner) => lower(*inner),
        Syntax::Brackets(inner) => {
            let items = match *inner {
                Syntax::Comma(items) => items,
                single => vec![single],
            };
            let items: Result<Vec<Node>> = items.into_iter().map(lower).collect();
            Ok(Node::Array(items?))
        }

        Syntax::Print(a) => Ok(Node::Print(Box::new(lower(*a)?))),
        Syntax::Assert(a) => Ok(Node::Assert(Box::new(lower(*a)?))),
        Syntax::Neg(a) => Ok(Node::Neg(Box::new(lower(*a)?))),
        Syntax::Pos(a) => Ok(Node::Pos(Box::new(lower(*a)?))),

        Syntax::Assign(target, value) => match *target {
            Syntax::Id(name) => Ok(Node::Assign {
                name,
                value: Box::new(lower(*value)?),
            }),
            other => Err(RuntimeError::assign_target(other.to_string())),
        },

        Syntax::Add(l, r) => lower_binary(BinOp::Add, *l, *r),
        Syntax::Sub(l, r) => lower_binary(BinOp::Sub, *l, *r),
        Syntax::Mul(l, r) => lower_binary(BinOp::Mul, *l, *r),
        Syntax::Pow(l, r) => lower_binary(BinOp::Pow, *l, *r),
        Syntax::Eq(l, r) => lower_binary(BinOp::Eq, *l, *r),
        Syntax::Less(l, r) => lower_binary(BinOp::Less, *l, *r),
        Syntax::More(l, r) => lower_binary(BinOp::More, *l, *r),
        Syntax::Index(l, r) => lower_binary(BinOp::Index, *l, *r),
        Syntax::RegMatch(l, r) => lower_binary(BinOp::RegMatch, *l, *r),

        Syntax::IfThen { cond, then } => Ok(Node::IfThen {
            cond: Box::new(lower(*cond)?),
            then: Box::new(lower(*then)?),
        }),
        Syntax::Match(child) => match *child {
            Syntax::Block(stmts) => {
                let mut clauses = Vec::with_capacity(stmts.len());
                for stmt in stmts {
                    match stmt {
                        Syntax::IfThen { cond, then } => {
                            clauses.push((lower(*cond)?, lower(*then)?));
                        }
                        other => return Err(RuntimeError::match_arm(other.to_string())),
                    }
                }
                Ok(Node::Match { clauses })
            }
            other => Err(RuntimeError::match_arm(other.to_string())),
        },

        Syntax::Lambda { params, body } => match *params {
            Syntax::Params(names) => Ok(Node::Lambda {
                params: Rc::new(names),
                body: Rc::new(lower(*body)?),
            }),
            other => Err(RuntimeError::stray_node(other.to_string())),
        },
        Syntax::Lambda0(body) => Ok(Node::Lambda0 {
            body: Rc::new(lower(*body)?),
        }),

        Syntax::Call { func, args } => {
            let args = match *args {
                Syntax::Args(items) => items,
                single => vec![single],
            };
            let args: Result<Vec<Node>> = args.into_iter().map(lower).collect();
            Ok(Node::Call {
                func: Box::new(lower(*func)?),
                args: args?,
            })
        }
        Syntax::Call0(func) => Ok(Node::Call0 {
            func: Box::new(lower(*func)?),
        }),
        Syntax::Compose(l, r) => Ok(Node::Compose {
            left: Box::new(lower(*l)?),
            right: Box::new(lower(*r)?),
        }),
        Syntax::ComposeR(l, r) => Ok(Node::ComposeR {
            left: Box::new(lower(*l)?),
            right: Box::new(lower(*r)?),
        }),

        other @ (Syntax::Expr(_)
        | Syntax::Sym(_)
        | Syntax::Comma(_)
        | Syntax::Args(_)
        | Syntax::Params(_)) => Err(RuntimeError::stray_node(other.to_string())),
    }
}

fn lower_binary(op: BinOp, left: Syntax, right: Syntax) -> Result<Node> {
    Ok(Node::Binary {
        op,
        left: Box::new(lower(left)?),
        right: Box::new(lower(right)?),
    })
}

impl Node {
    /// Evaluate against a frame chain.
    pub fn eval(&self, frame: &mut Frame<'_>) -> Result<Value> {
        match self {
            Node::Literal(value) => Ok(value.clone()),
            Node::Var(name) => frame
                .get(name)
                .ok_or_else(|| RuntimeError::unknown_variable(name)),
            Node::ShellCmd(text) => shell(text, frame),
            Node::Array(items) => {
                let values: Result<Vec<Value>> =
                    items.iter().map(|item| item.eval(frame)).collect();
                Ok(Value::Array(values?))
            }
            Node::Block(stmts) => {
                let mut last = Value::Unit;
                for stmt in stmts {
                    last = stmt.eval(frame)?;
                }
                Ok(last)
            }

            Node::Print(a) => {
                let value = a.eval(frame)?;
                println!("{}", value.render(frame)?);
                Ok(value)
            }
            Node::Assert(a) => {
                let value = a.eval(frame)?;
                if value.truthy() {
                    Ok(value)
                } else {
                    Err(RuntimeError::assertion_failed(a.to_string()))
                }
            }
            Node::Neg(a) => match a.eval(frame)? {
                Value::Int(v) => v
                    .checked_neg()
                    .map(Value::Int)
                    .ok_or_else(|| RuntimeError::overflow("-")),
                other => Err(RuntimeError::invalid_operation("-", other.type_name())),
            },
            Node::Pos(a) => match a.eval(frame)? {
                value @ Value::Int(_) => Ok(value),
                other => Err(RuntimeError::invalid_operation("+", other.type_name())),
            },

            Node::Assign { name, value } => {
                let value = value.eval(frame)?;
                frame.set(name.clone(), value.clone());
                Ok(value)
            }
            Node::Binary { op, left, right } => {
                let left = left.eval(frame)?;
                let right = right.eval(frame)?;
                binary(*op, left, right, frame)
            }

            Node::IfThen { cond, then } => {
                if cond.eval(frame)?.truthy() {
                    then.eval(frame)
                } else {
                    Ok(Value::Bool(false))
                }
            }
            Node::Match { clauses } => {
                for (guard, result) in clauses {
                    if guard.eval(frame)?.truthy() {
                        return result.eval(frame);
                    }
                }
                Ok(Value::Unit)
            }

            Node::Lambda { params, body } => Ok(Value::Func {
                params: Rc::clone(params),
                body: Rc::clone(body),
            }),
            Node::Lambda0 { body } => Ok(Value::Func0 {
                body: Rc::clone(body),
            }),

            Node::Call { func, args } => {
                let callee = func.eval(frame)?;
                let mut values = Vec::with_capacity(args.len());
                for arg in args {
                    values.push(arg.eval(frame)?);
                }
                apply(callee, values, frame)
            }
            Node::Call0 { func } => {
                let callee = func.eval(frame)?;
                apply0(callee, frame)
            }
            Node::Compose { left, right } => {
                let callee = left.eval(frame)?;
                let arg = right.eval(frame)?;
                apply(callee, vec![arg], frame)
            }
            Node::ComposeR { left, right } => {
                let arg = right.eval(frame)?;
                let callee = left.eval(frame)?;
                apply(callee, vec![arg], frame)
            }
        }
    }
}

/// Apply a function value to already-evaluated arguments. The body
/// runs in a child of the calling frame, so the parameter bindings
/// shadow the caller's names and vanish on return.
fn apply(callee: Value, args: Vec<Value>, frame: &mut Frame<'_>) -> Result<Value> {
    match callee {
        Value::Func { params, body } => {
            if params.len() != args.len() {
                return Err(RuntimeError::wrong_arity(params.len(), args.len()));
            }
            let mut inner = frame.child();
            for (param, arg) in params.iter().zip(args) {
                inner.set(param.clone(), arg);
            }
            body.eval(&mut inner)
        }
        Value::Func0 { .. } => Err(RuntimeError::wrong_arity(0, args.len())),
        other => Err(RuntimeError::not_callable(other.type_name())),
    }
}

fn apply0(callee: Value, frame: &mut Frame<'_>) -> Result<Value> {
    match callee {
        Value::Func0 { body } => {
            let mut inner = frame.child();
            body.eval(&mut inner)
        }
        Value::Func { params, .. } => Err(RuntimeError::wrong_arity(params.len(), 0)),
        other => Err(RuntimeError::not_callable(other.type_name())),
    }
}

/// Render a backquoted command, split it on whitespace, and run it.
/// The result is the command's stdout with the trailing newline
/// removed. A command that cannot be spawned or exits non-zero is an
/// evaluation error.
fn shell(text: &str, frame: &mut Frame<'_>) -> Result<Value> {
    let command = Value::Str(text.to_string()).render(frame)?;
    debug!("shell: {command}");
    let mut parts = command.split_whitespace();
    let Some(program) = parts.next() else {
        return Err(RuntimeError::ShellCommandFailed {
            command,
            message: "empty command".to_string(),
        });
    };
    let output = Command::new(program)
        .args(parts)
        .output()
        .map_err(|error| RuntimeError::shell_command_failed(&command, &error))?;
    if !output.status.success() {
        return Err(RuntimeError::ShellCommandFailed {
            command,
            message: output.status.to_string(),
        });
    }
    let stdout = String::from_utf8_lossy(&output.stdout);
    Ok(Value::Str(stdout.trim_end_matches('\n').to_string()))
}

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
            Node::Literal(value) => write!(f, "{value}"),
            Node::ShellCmd(text) => write!(f, "`{text}`"),
            Node::Var(name) => write!(f, "{name}"),
            Node::Array(items) => seq(f, "array", items),
            Node::Block(stmts) => seq(f, "block", stmts),
            Node::Print(a) => write!(f, "(p {a})"),
            Node::Assert(a) => write!(f, "(assert {a})"),
            Node::Neg(a) => write!(f, "(neg {a})"),
            Node::Pos(a) => write!(f, "(pos {a})"),
            Node::Assign { name, value } => write!(f, "(= {name} {value})"),
            Node::Binary { op, left, right } => write!(f, "({op} {left} {right})"),
            Node::IfThen { cond, then } => write!(f, "(=> {cond} {then})"),
            Node::Match { clauses } => {
                write!(f, "(match")?;
                for (guard, result) in clauses {
                    write!(f, " (=> {guard} {result})")?;
                }
                write!(f, ")")
            }
            Node::Lambda { params, body } => {
                write!(f, "(-> ({}) {body})", params.join(", "))
            }
            Node::Lambda0 { body } => write!(f, "(lambda0 {body})"),
            Node::Call { func, args } => {
                write!(f, "(call {func}")?;
                for arg in args {
                    write!(f, " {arg}")?;
                }
                write!(f, ")")
            }
            Node::Call0 { func } => write!(f, "(call0 {func})"),
            Node::Compose { left, right } => write!(f, "($ {left} {right})"),
            Node::ComposeR { left, right } => write!(f, "(. {left} {right})"),
        }
    }
}

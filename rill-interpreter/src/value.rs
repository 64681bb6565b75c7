//! Runtime values for the rill interpreter.
//!
//! Values are small and cloned freely; function bodies are shared
//! behind `Rc` so cloning a function value never copies its tree.

use std::fmt;
use std::rc::Rc;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::{Result, RuntimeError};
use crate::frame::Frame;
use crate::nodes::Node;

/// A runtime value.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Int(i64),
    Str(String),
    Bool(bool),
    Regex(String),
    Array(Vec<Value>),
    Func {
        params: Rc<Vec<String>>,
        body: Rc<Node>,
    },
    Func0 {
        body: Rc<Node>,
    },
    Unit,
}

impl Value {
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Int(_) => "Int",
            Value::Str(_) => "Str",
            Value::Bool(_) => "Bool",
            Value::Regex(_) => "Regex",
            Value::Array(_) => "Array",
            Value::Func { .. } | Value::Func0 { .. } => "Func",
            Value::Unit => "Unit",
        }
    }

    /// Only `false` and unit are falsy.
    pub fn truthy(&self) -> bool {
        !matches!(self, Value::Bool(false) | Value::Unit)
    }

    /// Render for output. String interpolation is late-bound: `{name}`
    /// placeholders resolve against `frame` at the moment the string
    /// is rendered, not when it was assigned. Escape sequences are
    /// substituted after interpolation, over the whole result.
    pub fn render(&self, frame: &Frame) -> Result<String> {
        match self {
            Value::Int(v) => Ok(v.to_string()),
            Value::Str(text) => {
                let filled = interpolate(text, frame)?;
                Ok(filled.replace("\\n", "\n").replace("\\t", "\t"))
            }
            Value::Bool(true) => Ok("true".to_string()),
            Value::Bool(false) => Ok("false".to_string()),
            Value::Regex(pattern) => Ok(format!("/{pattern}/")),
            Value::Array(items) => {
                let rendered: Result<Vec<String>> =
                    items.iter().map(|item| item.render(frame)).collect();
                Ok(format!("[{}]", rendered?.join(", ")))
            }
            Value::Func { params, .. } => Ok(format!("({}) ->", params.join(", "))),
            Value::Func0 { .. } => Ok("->".to_string()),
            Value::Unit => Ok("unit".to_string()),
        }
    }
}

/// Source-form display: strings keep their raw text and delimiters,
/// with no interpolation. Output goes through [`Value::render`].
impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Int(v) => write!(f, "{v}"),
            Value::Str(text) => write!(f, "\"{text}\""),
            Value::Bool(v) => write!(f, "{v}"),
            Value::Regex(pattern) => write!(f, "/{pattern}/"),
            Value::Array(items) => {
                write!(f, "[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{item}")?;
                }
                write!(f, "]")
            }
            Value::Func { params, .. } => write!(f, "({}) ->", params.join(", ")),
            Value::Func0 { .. } => write!(f, "->"),
            Value::Unit => write!(f, "unit"),
        }
    }
}

static PLACEHOLDER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\{([A-Za-z_][A-Za-z0-9_]*)\}").unwrap());

/// Replace every `{name}` placeholder in `text` with the rendered
/// value bound to that name.
pub fn interpolate(text: &str, frame: &Frame) -> Result<String> {
    let mut out = String::with_capacity(text.len());
    let mut last = 0;
    for caps in PLACEHOLDER.captures_iter(text) {
        let whole = caps.get(0).unwrap();
        let name = &caps[1];
        let value = frame
            .get(name)
            .ok_or_else(|| RuntimeError::unknown_variable(name))?;
        out.push_str(&text[last..whole.start()]);
        out.push_str(&value.render(frame)?);
        last = whole.end();
    }
    out.push_str(&text[last..]);
    Ok(out)
}

/// Binary operators dispatched over value types.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinOp {
    Add,
    Sub,
    Mul,
    Pow,
    Eq,
    Less,
    More,
    Index,
    RegMatch,
}

impl fmt::Display for BinOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            BinOp::Add => "+",
            BinOp::Sub => "-",
            BinOp::Mul => "*",
            BinOp::Pow => "^",
            BinOp::Eq => "==",
            BinOp::Less => "<",
            BinOp::More => ">",
            BinOp::Index => "[]",
            BinOp::RegMatch => "=~",
        };
        f.write_str(text)
    }
}

/// Apply a binary operator. Indexing and regex matching pair
/// differently-typed operands; every other operator requires both
/// sides to share one type before dispatch.
pub fn binary(op: BinOp, left: Value, right: Value, frame: &mut Frame) -> Result<Value> {
    if !matches!(op, BinOp::Index | BinOp::RegMatch)
        && left.type_name() != right.type_name()
    {
        return Err(RuntimeError::type_mismatch(
            &op.to_string(),
            left.type_name(),
            right.type_name(),
        ));
    }
    match (op, left, right) {
        (BinOp::Add, Value::Int(a), Value::Int(b)) => checked(a.checked_add(b), "+"),
        (BinOp::Sub, Value::Int(a), Value::Int(b)) => checked(a.checked_sub(b), "-"),
        (BinOp::Mul, Value::Int(a), Value::Int(b)) => checked(a.checked_mul(b), "*"),
        (BinOp::Pow, Value::Int(a), Value::Int(b)) => {
            if b < 0 {
                return Err(RuntimeError::NegativeExponent { exponent: b });
            }
            let exp = u32::try_from(b).map_err(|_| RuntimeError::overflow("^"))?;
            checked(a.checked_pow(exp), "^")
        }
        (BinOp::Eq, Value::Int(a), Value::Int(b)) => Ok(Value::Bool(a == b)),
        (BinOp::Eq, Value::Str(a), Value::Str(b)) => Ok(Value::Bool(a == b)),
        (BinOp::Eq, Value::Bool(a), Value::Bool(b)) => Ok(Value::Bool(a == b)),
        (BinOp::Eq, Value::Regex(a), Value::Regex(b)) => Ok(Value::Bool(a == b)),
        (BinOp::Less, Value::Int(a), Value::Int(b)) => Ok(Value::Bool(a < b)),
        (BinOp::More, Value::Int(a), Value::Int(b)) => Ok(Value::Bool(a > b)),
        (BinOp::Index, Value::Array(items), Value::Int(index)) => {
            let length = items.len();
            usize::try_from(index)
                .ok()
                .and_then(|i| items.into_iter().nth(i))
                .ok_or_else(|| RuntimeError::index_out_of_bounds(index, length))
        }
        (BinOp::Index, left, right) => Err(RuntimeError::type_mismatch(
            "[]",
            left.type_name(),
            right.type_name(),
        )),
        (BinOp::RegMatch, left, right) => reg_match(left, right, frame),
        (op, left, _) => Err(RuntimeError::invalid_operation(
            &op.to_string(),
            left.type_name(),
        )),
    }
}

fn checked(result: Option<i64>, op: &str) -> Result<Value> {
    result
        .map(Value::Int)
        .ok_or_else(|| RuntimeError::overflow(op))
}

/// Directional regex match. Whichever operand is a regex is the
/// pattern; the other side renders to the subject text. The pattern
/// is anchored at the start of the subject. Named capture groups that
/// participate in the match are bound as strings in `frame`. A
/// non-empty match yields the matched text, an empty one yields true.
fn reg_match(left: Value, right: Value, frame: &mut Frame) -> Result<Value> {
    let (pattern, subject) = match (left, right) {
        (Value::Regex(pattern), other) => (pattern, other),
        (other, Value::Regex(pattern)) => (pattern, other),
        (left, right) => {
            return Err(RuntimeError::type_mismatch(
                "=~",
                left.type_name(),
                right.type_name(),
            ));
        }
    };
    let compiled = Regex::new(&format!(r"\A(?:{pattern})"))
        .map_err(|error| RuntimeError::invalid_regex(&pattern, &error))?;
    let subject = subject.render(frame)?;
    let Some(caps) = compiled.captures(&subject) else {
        return Ok(Value::Bool(false));
    };
    for name in compiled.capture_names().flatten() {
        if let Some(group) = caps.name(name) {
            frame.set(name, Value::Str(group.as_str().to_string()));
        }
    }
    let whole = caps.get(0).unwrap().as_str();
    if whole.is_empty() {
        Ok(Value::Bool(true))
    } else {
        Ok(Value::Str(whole.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn s(text: &str) -> Value {
        Value::Str(text.to_string())
    }

    #[test]
    fn test_only_false_and_unit_are_falsy() {
        assert!(!Value::Bool(false).truthy());
        assert!(!Value::Unit.truthy());
        assert!(Value::Int(0).truthy());
        assert!(s("").truthy());
        assert!(Value::Array(Vec::new()).truthy());
    }

    #[test]
    fn test_render_bools_and_unit() {
        let frame = Frame::new();
        assert_eq!(Value::Bool(true).render(&frame).unwrap(), "true");
        assert_eq!(Value::Bool(false).render(&frame).unwrap(), "false");
        assert_eq!(Value::Unit.render(&frame).unwrap(), "unit");
    }

    #[test]
    fn test_render_array_elements() {
        let frame = Frame::new();
        let array = Value::Array(vec![Value::Int(1), s("a"), Value::Bool(true)]);
        assert_eq!(array.render(&frame).unwrap(), "[1, a, true]");
    }

    #[test]
    fn test_interpolation_is_late_bound() {
        let mut frame = Frame::new();
        frame.set("x", Value::Int(1));
        let text = s("x is {x}");
        assert_eq!(text.render(&frame).unwrap(), "x is 1");
        frame.set("x", Value::Int(2));
        assert_eq!(text.render(&frame).unwrap(), "x is 2");
    }

    #[test]
    fn test_escapes_substituted_after_interpolation() {
        let mut frame = Frame::new();
        frame.set("sep", s("\\n"));
        assert_eq!(s("a{sep}b").render(&frame).unwrap(), "a\nb");
        assert_eq!(s("a\\tb").render(&frame).unwrap(), "a\tb");
    }

    #[test]
    fn test_interpolating_unknown_name_errors() {
        let frame = Frame::new();
        let err = s("{nope}").render(&frame).unwrap_err();
        assert!(matches!(err, RuntimeError::UnknownVariable { ref name } if name == "nope"));
    }

    #[test]
    fn test_equality_compares_raw_string_text() {
        let mut frame = Frame::new();
        let got = binary(BinOp::Eq, s("{x}"), s("{x}"), &mut frame).unwrap();
        assert_eq!(got, Value::Bool(true));
    }

    #[test]
    fn test_mixed_types_are_rejected() {
        let mut frame = Frame::new();
        let err = binary(BinOp::Add, Value::Int(1), s("1"), &mut frame).unwrap_err();
        assert!(matches!(err, RuntimeError::TypeMismatch { .. }));
    }

    #[test]
    fn test_arithmetic_is_checked() {
        let mut frame = Frame::new();
        let err = binary(BinOp::Add, Value::Int(i64::MAX), Value::Int(1), &mut frame).unwrap_err();
        assert!(matches!(err, RuntimeError::Overflow { .. }));
    }

    #[test]
    fn test_negative_exponent_is_rejected() {
        let mut frame = Frame::new();
        let err = binary(BinOp::Pow, Value::Int(2), Value::Int(-1), &mut frame).unwrap_err();
        assert!(matches!(err, RuntimeError::NegativeExponent { exponent: -1 }));
    }

    #[test]
    fn test_index_in_and_out_of_bounds() {
        let mut frame = Frame::new();
        let array = Value::Array(vec![Value::Int(10), Value::Int(20)]);
        let got = binary(BinOp::Index, array.clone(), Value::Int(1), &mut frame).unwrap();
        assert_eq!(got, Value::Int(20));
        let err = binary(BinOp::Index, array.clone(), Value::Int(2), &mut frame).unwrap_err();
        assert!(matches!(err, RuntimeError::IndexOutOfBounds { index: 2, length: 2 }));
        let err = binary(BinOp::Index, array, Value::Int(-1), &mut frame).unwrap_err();
        assert!(matches!(err, RuntimeError::IndexOutOfBounds { index: -1, .. }));
    }

    #[test]
    fn test_reg_match_yields_matched_text() {
        let mut frame = Frame::new();
        let got = binary(
            BinOp::RegMatch,
            s("hi there"),
            Value::Regex("hi".to_string()),
            &mut frame,
        )
        .unwrap();
        assert_eq!(got, s("hi"));
    }

    #[test]
    fn test_reg_match_is_anchored() {
        let mut frame = Frame::new();
        let got = binary(
            BinOp::RegMatch,
            s("ahi"),
            Value::Regex("hi".to_string()),
            &mut frame,
        )
        .unwrap();
        assert_eq!(got, Value::Bool(false));
    }

    #[test]
    fn test_reg_match_binds_named_groups() {
        let mut frame = Frame::new();
        binary(
            BinOp::RegMatch,
            s("hello world"),
            Value::Regex("h(?P<vowel>e)ll(?P<rest>o)".to_string()),
            &mut frame,
        )
        .unwrap();
        assert_eq!(frame.get("vowel"), Some(s("e")));
        assert_eq!(frame.get("rest"), Some(s("o")));
    }

    #[test]
    fn test_reg_match_empty_match_is_true() {
        let mut frame = Frame::new();
        let got = binary(
            BinOp::RegMatch,
            s("y"),
            Value::Regex("x?".to_string()),
            &mut frame,
        )
        .unwrap();
        assert_eq!(got, Value::Bool(true));
    }

    #[test]
    fn test_pattern_may_sit_on_either_side() {
        let mut frame = Frame::new();
        let got = binary(
            BinOp::RegMatch,
            Value::Regex("hi".to_string()),
            s("hi there"),
            &mut frame,
        )
        .unwrap();
        assert_eq!(got, s("hi"));
    }

    #[test]
    fn test_invalid_pattern_reports_error() {
        let mut frame = Frame::new();
        let err = binary(
            BinOp::RegMatch,
            s("x"),
            Value::Regex("(".to_string()),
            &mut frame,
        )
        .unwrap_err();
        assert!(matches!(err, RuntimeError::InvalidRegex { .. }));
    }
}

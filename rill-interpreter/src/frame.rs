//! Lexical variable frames.
//!
//! A frame owns the bindings created in one function body and borrows
//! its parent, so lookups walk outward through the call chain while
//! assignment always lands in the innermost frame.

use crate::value::Value;
use std::collections::HashMap;

#[derive(Debug, Default)]
pub struct Frame<'a> {
    vars: HashMap<String, Value>,
    parent: Option<&'a Frame<'a>>,
}

impl<'a> Frame<'a> {
    /// Create a root frame with no parent.
    pub fn new() -> Self {
        Frame::default()
    }

    /// Create a child frame for one function application.
    pub fn child(&self) -> Frame<'_> {
        Frame {
            vars: HashMap::new(),
            parent: Some(self),
        }
    }

    /// Look a name up through the frame chain, innermost first.
    pub fn get(&self, name: &str) -> Option<Value> {
        match self.vars.get(name) {
            Some(value) => Some(value.clone()),
            None => self.parent.and_then(|parent| parent.get(name)),
        }
    }

    /// Bind a name in this frame. An outer binding of the same name
    /// is shadowed for the rest of this frame's lifetime, not written.
    pub fn set(&mut self, name: impl Into<String>, value: Value) {
        self.vars.insert(name.into(), value);
    }
}

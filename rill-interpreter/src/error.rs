//! Runtime error types for the rill interpreter.
//!
//! Covers lowering failures, where parsed syntax has no semantic
//! counterpart, and evaluation failures, with diagnostics rendered
//! via miette integration.

use miette::Diagnostic;
use thiserror::Error;

/// Runtime errors that can occur during lowering or evaluation
#[derive(Error, Diagnostic, Debug, Clone, PartialEq)]
pub enum RuntimeError {
    #[error("Unknown variable: {name}")]
    #[diagnostic(
        code(rill::runtime::unknown_variable),
        help("Make sure the variable is assigned before use")
    )]
    UnknownVariable { name: String },

    #[error("Type mismatch: {op} is not defined between {left} and {right}")]
    #[diagnostic(
        code(rill::runtime::type_mismatch),
        help("Operands of a binary operator must share one type")
    )]
    TypeMismatch {
        op: String,
        left: String,
        right: String,
    },

    #[error("Invalid operation: {op} cannot be applied to {operand}")]
    #[diagnostic(
        code(rill::runtime::invalid_operation),
        help("Check that the operation is supported for this type")
    )]
    InvalidOperation { op: String, operand: String },

    #[error("Wrong arity: function expects {expected} arguments, got {found}")]
    #[diagnostic(
        code(rill::runtime::wrong_arity),
        help("Check the parameter list for the correct number of arguments")
    )]
    WrongArity { expected: usize, found: usize },

    #[error("Not callable: {found}")]
    #[diagnostic(
        code(rill::runtime::not_callable),
        help("Only function values can be applied to arguments")
    )]
    NotCallable { found: String },

    #[error("Assertion failed: {expr}")]
    #[diagnostic(code(rill::runtime::assertion_failed))]
    AssertionFailed { expr: String },

    #[error("Index out of bounds: index {index} is not valid for array of length {length}")]
    #[diagnostic(
        code(rill::runtime::index_out_of_bounds),
        help("Ensure the index is within the valid range [0, {length})")
    )]
    IndexOutOfBounds { index: i64, length: usize },

    #[error("Integer overflow evaluating {op}")]
    #[diagnostic(
        code(rill::runtime::overflow),
        help("Integer arithmetic is checked 64-bit")
    )]
    Overflow { op: String },

    #[error("Negative exponent: {exponent}")]
    #[diagnostic(
        code(rill::runtime::negative_exponent),
        help("Integer exponentiation requires a non-negative exponent")
    )]
    NegativeExponent { exponent: i64 },

    #[error("Invalid regular expression /{pattern}/: {message}")]
    #[diagnostic(code(rill::runtime::invalid_regex))]
    InvalidRegex { pattern: String, message: String },

    #[error("Shell command failed: {command}: {message}")]
    #[diagnostic(code(rill::runtime::shell_command_failed))]
    ShellCommandFailed { command: String, message: String },

    #[error("Assignment target must be a name, found {found}")]
    #[diagnostic(
        code(rill::runtime::assign_target),
        help("Only plain variables can appear left of '='")
    )]
    AssignTarget { found: String },

    #[error("Match arm is not a guard clause: {found}")]
    #[diagnostic(
        code(rill::runtime::match_arm),
        help("Every line of a match block must use 'guard => result'")
    )]
    MatchArm { found: String },

    #[error("Unstructured syntax reached evaluation: {found}")]
    #[diagnostic(code(rill::runtime::stray_node))]
    StrayNode { found: String },
}

impl RuntimeError {
    /// Create an unknown variable error
    pub fn unknown_variable(name: &str) -> Self {
        Self::UnknownVariable {
            name: name.to_string(),
        }
    }

    /// Create a type mismatch error
    pub fn type_mismatch(op: &str, left: &str, right: &str) -> Self {
        Self::TypeMismatch {
            op: op.to_string(),
            left: left.to_string(),
            right: right.to_string(),
        }
    }

    /// Create an invalid operation error
    pub fn invalid_operation(op: &str, operand: &str) -> Self {
        Self::InvalidOperation {
            op: op.to_string(),
            operand: operand.to_string(),
        }
    }

    /// Create a wrong arity error
    pub fn wrong_arity(expected: usize, found: usize) -> Self {
        Self::WrongArity { expected, found }
    }

    /// Create a not callable error
    pub fn not_callable(found: &str) -> Self {
        Self::NotCallable {
            found: found.to_string(),
        }
    }

    /// Create an assertion failure
    pub fn assertion_failed(expr: impl Into<String>) -> Self {
        Self::AssertionFailed { expr: expr.into() }
    }

    /// Create an index out of bounds error
    pub fn index_out_of_bounds(index: i64, length: usize) -> Self {
        Self::IndexOutOfBounds { index, length }
    }

    /// Create an overflow error
    pub fn overflow(op: &str) -> Self {
        Self::Overflow { op: op.to_string() }
    }

    /// Create an invalid regex error
    pub fn invalid_regex(pattern: &str, error: &regex::Error) -> Self {
        Self::InvalidRegex {
            pattern: pattern.to_string(),
            message: error.to_string(),
        }
    }

    /// Create a shell command failure
    pub fn shell_command_failed(command: &str, error: &std::io::Error) -> Self {
        Self::ShellCommandFailed {
            command: command.to_string(),
            message: error.to_string(),
        }
    }

    /// Create an assignment target error
    pub fn assign_target(found: impl Into<String>) -> Self {
        Self::AssignTarget {
            found: found.into(),
        }
    }

    /// Create a match arm error
    pub fn match_arm(found: impl Into<String>) -> Self {
        Self::MatchArm {
            found: found.into(),
        }
    }

    /// Create a stray node error
    pub fn stray_node(found: impl Into<String>) -> Self {
        Self::StrayNode {
            found: found.into(),
        }
    }
}

/// Result type for interpreter operations
pub type Result<T> = std::result::Result<T, RuntimeError>;

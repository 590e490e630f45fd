//! Error types for loading and executing instruction trees

use thiserror::Error;

/// A malformed node in the instruction tree handed over by the parser
#[derive(Debug, Error)]
pub enum TreeError {
    #[error("expected an instruction node, got {0}")]
    NotANode(String),

    #[error("unknown instruction '{0}'")]
    UnknownInstruction(String),

    #[error("malformed '{tag}' instruction with {arity} fields")]
    Malformed { tag: String, arity: usize },

    #[error("expected a name, got {0}")]
    ExpectedName(String),

    #[error("expected a block of instructions, got {0}")]
    ExpectedBlock(String),

    #[error("malformed if clause: {0}")]
    MalformedClause(String),

    #[error("unknown operator '{0}'")]
    UnknownOperator(String),

    #[error("unknown loop mode '{0}'")]
    UnknownLoopMode(String),

    #[error("invalid instruction tree JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// Fatal errors raised while executing a script
#[derive(Debug, Error)]
pub enum ExecError {
    #[error("variable '{0}' not defined")]
    UndefinedVariable(String),

    #[error("{0} function not defined")]
    FunctionNotDefined(String),

    #[error("error with function {name}: {source}")]
    Native {
        name: String,
        #[source]
        source: anyhow::Error,
    },

    #[error("unsupported operand kinds for '{op}': {lhs} and {rhs}")]
    TypeMismatch {
        op: &'static str,
        lhs: &'static str,
        rhs: &'static str,
    },

    #[error("division by zero")]
    DivisionByZero,

    #[error("integer overflow in '{0}'")]
    Overflow(&'static str),

    #[error("value of kind {0} is not iterable")]
    NotIterable(&'static str),

    #[error("range bounds must be integers, got {0}")]
    InvalidRange(&'static str),

    #[error("browser not instanced")]
    NoBrowser,

    #[error("proxy not running")]
    NoProxy,

    #[error("error with browser: {0}")]
    Session(#[source] anyhow::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Reasons execution stops before the end of the instruction list
///
/// `Exit` is a normal termination requested by the script; it unwinds
/// through every nested block the same way an error does.
#[derive(Debug, Error)]
pub enum Halt {
    #[error("script exited with status {0}")]
    Exit(i32),

    #[error(transparent)]
    Error(#[from] ExecError),
}

impl From<std::io::Error> for Halt {
    fn from(e: std::io::Error) -> Self {
        Halt::Error(ExecError::Io(e))
    }
}

pub type ExecResult<T> = Result<T, Halt>;

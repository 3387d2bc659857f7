use thiserror::Error;

use crate::validate::State;

/// Why the well-formedness automaton rejected an expression.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("expression is empty")]
    Empty,

    #[error("unexpected {found:?} at offset {offset} (state {state:?})")]
    UnexpectedChar { found: char, offset: usize, state: State },

    #[error("unbalanced parentheses: {open} opened, {close} closed")]
    Unbalanced { open: usize, close: usize },

    #[error("expression cannot end in state {0:?}")]
    Incomplete(State),
}

/// Structural failures detected while building the tree.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("unexpected character {found:?} at offset {offset}")]
    UnexpectedChar { found: char, offset: usize },

    #[error("invalid numeric literal {0:?}")]
    InvalidLiteral(String),

    #[error("{reason} at offset {offset} (token {token:?})")]
    Structural {
        offset: usize,
        token: String,
        reason: &'static str,
    },

    #[error("{0} parenthesis group(s) left open")]
    Unclosed(usize),

    #[error("no expression to parse")]
    Empty,
}

/// Evaluation failures. These point at an inconsistent tree or registry,
/// never at user input.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EvalError {
    #[error("can't find variable {0:?} in the registry")]
    UnresolvedVariable(String),

    #[error("variable id {0} is not registered")]
    UnknownVariable(usize),

    #[error("node {0} has neither a symbol nor a child")]
    EmptyNode(usize),

    #[error("operator node {0} is missing an operand")]
    MissingOperand(usize),
}

#[derive(Error, Debug)]
pub enum Error {
    #[error("expression is not well-formed: {0}")]
    Validation(#[from] ValidationError),

    #[error("parse error: {0}")]
    Parse(#[from] ParseError),

    #[error("evaluation error: {0}")]
    Eval(#[from] EvalError),

    #[error("unsupported bit width {0} (expected 1..=32)")]
    UnsupportedWidth(u32),

    #[error("too many combinations for max_bits={bits} with {variables} variables")]
    TooManyCombinations { bits: u32, variables: usize },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

pub mod ast;
pub mod batch;
pub mod classify;
pub mod clean;
pub mod config;
pub mod enumerate;
pub mod error;
pub mod eval;
pub mod expression;
pub mod operator;
pub mod parser;
pub mod registry;
pub mod token;
pub mod validate;

pub use ast::{Node, NodeId, Symbol, Tree};
pub use config::{BitWidth, Config, OutputTarget, Verbosity};
pub use enumerate::{enumerate, Fingerprint};
pub use error::{Error, EvalError, ParseError, Result, ValidationError};
pub use eval::{evaluate, Outcome};
pub use expression::Expression;
pub use operator::Operator;
pub use registry::{VarId, Variable, VariableRegistry};

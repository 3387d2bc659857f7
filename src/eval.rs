use std::fmt;

use crate::ast::{NodeId, Symbol, Tree};
use crate::config::BitWidth;
use crate::error::EvalError;
use crate::registry::VariableRegistry;

/// Result of one evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Outcome {
    Value(u64),
    /// A division or modulo by zero happened somewhere in the tree.
    Undefined,
}

impl Outcome {
    pub fn value(self) -> Option<u64> {
        match self {
            Outcome::Value(v) => Some(v),
            Outcome::Undefined => None,
        }
    }

    pub fn is_undefined(self) -> bool {
        self == Outcome::Undefined
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Outcome::Value(v) => write!(f, "{}", v),
            Outcome::Undefined => f.write_str("n"),
        }
    }
}

/// Evaluates the subtree at `id` with the values currently in `registry`.
///
/// Every node's value is reduced by the width mask before its unary flags
/// are applied (negation first, then not). A zero divisor sets `undefined`
/// and contributes 0; evaluation carries on.
pub fn eval_node(
    tree: &Tree,
    id: NodeId,
    registry: &VariableRegistry,
    width: BitWidth,
    undefined: &mut bool,
) -> Result<u64, EvalError> {
    let node = tree.node(id);

    let value = match &node.symbol {
        None => {
            let inner = node.left.ok_or(EvalError::EmptyNode(id.index()))?;
            eval_node(tree, inner, registry, width, undefined)?
        }
        Some(Symbol::Constant(value)) => *value,
        Some(Symbol::Variable(var)) => registry
            .value(*var)
            .ok_or(EvalError::UnknownVariable(var.index()))?,
        Some(Symbol::Term(name)) => {
            let var = registry
                .lookup(name)
                .ok_or_else(|| EvalError::UnresolvedVariable(name.clone()))?;
            registry.value(var).ok_or(EvalError::UnknownVariable(var.index()))?
        }
        Some(Symbol::Operator(op)) => {
            let (Some(left), Some(right)) = (node.left, node.right) else {
                return Err(EvalError::MissingOperand(id.index()));
            };
            let l = eval_node(tree, left, registry, width, undefined)?;
            let r = eval_node(tree, right, registry, width, undefined)?;
            op.apply(l, r, undefined)
        }
    };

    let mut value = width.apply(value);
    if node.unary_minus {
        value = width.apply(value.wrapping_neg());
    }
    if node.unary_not {
        value = width.apply(!value);
    }
    Ok(value)
}

/// Evaluates the whole tree once.
pub fn evaluate(tree: &Tree, registry: &VariableRegistry, width: BitWidth) -> Result<Outcome, EvalError> {
    let mut undefined = false;
    let value = eval_node(tree, tree.root(), registry, width, &mut undefined)?;
    if undefined {
        Ok(Outcome::Undefined)
    } else {
        Ok(Outcome::Value(value))
    }
}

use std::fmt;
use std::io::Write;
use std::str::FromStr;

use log::debug;

use crate::ast::Tree;
use crate::clean::{clean, normalize};
use crate::config::BitWidth;
use crate::enumerate::{enumerate, Fingerprint};
use crate::error::{Error, Result};
use crate::eval::{evaluate, Outcome};
use crate::parser::parse;
use crate::registry::{Variable, VariableRegistry};
use crate::validate::validate;

/// A parsed expression with its variables interned and renamed.
#[derive(Debug, Clone)]
pub struct Expression {
    raw: String,
    cleaned: String,
    tree: Tree,
    registry: VariableRegistry,
}

impl Expression {
    /// Runs the full front end: clean, validate, parse, consolidate.
    ///
    /// Validation runs twice, on the whitespace-preserving text and on the
    /// cleaned text. Both must accept.
    pub fn parse(raw: &str) -> Result<Self> {
        validate(&normalize(raw))?;
        let cleaned = clean(raw);
        validate(&cleaned)?;

        let mut tree = parse(&cleaned)?;
        let registry = VariableRegistry::consolidate(&mut tree);
        debug!(
            "expression {:?}: {} nodes, {} variables, {} slots",
            raw,
            tree.len(),
            registry.len(),
            registry.slots()
        );

        Ok(Expression {
            raw: raw.to_owned(),
            cleaned,
            tree,
            registry,
        })
    }

    pub fn raw(&self) -> &str {
        &self.raw
    }

    pub fn cleaned(&self) -> &str {
        &self.cleaned
    }

    pub fn tree(&self) -> &Tree {
        &self.tree
    }

    pub fn registry(&self) -> &VariableRegistry {
        &self.registry
    }

    pub fn registry_mut(&mut self) -> &mut VariableRegistry {
        &mut self.registry
    }

    /// Canonical text: canonical variable names, decimal constants.
    pub fn render(&self) -> String {
        self.tree.render(Some(&self.registry)).to_string()
    }

    pub fn variable_count(&self) -> usize {
        self.registry.len()
    }

    /// Total number of variable occurrences.
    pub fn slots(&self) -> usize {
        self.registry.slots()
    }

    pub fn variables(&self) -> impl Iterator<Item = &Variable> {
        self.registry.iter().map(|(_, var)| var)
    }

    pub fn is_constant(&self) -> bool {
        self.registry.is_empty()
    }

    /// Evaluates once with the variable values currently set.
    pub fn evaluate(&self, width: BitWidth) -> Result<Outcome> {
        Ok(evaluate(&self.tree, &self.registry, width)?)
    }

    /// Evaluates every assignment, writing the result line to `sink`.
    pub fn fingerprint<W: Write + ?Sized>(&mut self, width: BitWidth, sink: &mut W) -> Result<Fingerprint> {
        enumerate(&self.tree, &mut self.registry, width, sink)
    }
}

impl FromStr for Expression {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Expression::parse(s)
    }
}

impl fmt::Display for Expression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.tree.render(Some(&self.registry)))
    }
}

//! Variable discovery, interning and canonical renaming.
//!
//! Every distinct variable name gets one [`VarId`] and one value cell. After
//! [`VariableRegistry::consolidate`] each variable leaf of the tree carries
//! that id, so setting a value once is seen by every occurrence.

use hashbrown::HashMap;
use log::debug;

use crate::ast::{Symbol, Tree};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct VarId(usize);

impl VarId {
    pub fn index(self) -> usize {
        self.0
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Variable {
    /// Spelling in the source expression.
    pub original: String,
    /// Current name; the canonical short name once renamed.
    pub name: String,
    pub occurrences: usize,
    pub first_seen: usize,
}

#[derive(Debug, Clone, Default)]
pub struct VariableRegistry {
    by_name: HashMap<String, VarId>,
    vars: Vec<Variable>,
    values: Vec<u64>,
}

/// Canonical name for the variable discovered at position `order`
/// (0-based): `a`..`z`, then `aa`, `ab`, .., `zz`, `aaa`, ..
pub fn canonical_name(order: usize) -> String {
    let mut n = order + 1;
    let mut name = Vec::new();
    while n > 0 {
        n -= 1;
        name.push(b'a' + (n % 26) as u8);
        n /= 26;
    }
    name.iter().rev().map(|&b| b as char).collect()
}

impl VariableRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Interns every variable leaf of `tree`, rewrites those leaves to carry
    /// the interned id, then renames the variables canonically.
    pub fn consolidate(tree: &mut Tree) -> Self {
        let mut registry = Self::new();
        let leaves: Vec<_> = tree.leaves().collect();
        for leaf in leaves {
            let node = tree.node_mut(leaf);
            if let Some(Symbol::Term(name)) = &node.symbol {
                let id = registry.intern(name);
                node.symbol = Some(Symbol::Variable(id));
            }
        }
        registry.canonicalize();
        debug!(
            "consolidate: {} variables in {} slots",
            registry.len(),
            registry.slots()
        );
        registry
    }

    /// Returns the id for `name`, registering it on first sight.
    pub fn intern(&mut self, name: &str) -> VarId {
        if let Some(&id) = self.by_name.get(name) {
            self.vars[id.0].occurrences += 1;
            return id;
        }

        let id = VarId(self.vars.len());
        debug!("intern: new variable {:?} -> {}", name, id.0);
        self.vars.push(Variable {
            original: name.to_owned(),
            name: name.to_owned(),
            occurrences: 1,
            first_seen: id.0,
        });
        self.values.push(0);
        self.by_name.insert(name.to_owned(), id);
        id
    }

    /// Renames every variable to its canonical short name, in discovery order.
    pub fn canonicalize(&mut self) {
        self.by_name.clear();
        for (index, var) in self.vars.iter_mut().enumerate() {
            var.name = canonical_name(var.first_seen);
            self.by_name.insert(var.name.clone(), VarId(index));
        }
    }

    pub fn lookup(&self, name: &str) -> Option<VarId> {
        self.by_name.get(name).copied()
    }

    pub fn get(&self, id: VarId) -> Option<&Variable> {
        self.vars.get(id.0)
    }

    #[inline]
    pub fn value(&self, id: VarId) -> Option<u64> {
        self.values.get(id.0).copied()
    }

    pub fn set_value(&mut self, id: VarId, value: u64) {
        self.values[id.0] = value;
    }

    /// Value cells, indexed by [`VarId::index`], in discovery order.
    pub fn values(&self) -> &[u64] {
        &self.values
    }

    pub fn values_mut(&mut self) -> &mut [u64] {
        &mut self.values
    }

    pub fn reset(&mut self) {
        self.values.fill(0);
    }

    pub fn len(&self) -> usize {
        self.vars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vars.is_empty()
    }

    /// Total number of variable occurrences in the tree.
    pub fn slots(&self) -> usize {
        self.vars.iter().map(|v| v.occurrences).sum()
    }

    pub fn iter(&self) -> impl Iterator<Item = (VarId, &Variable)> {
        self.vars.iter().enumerate().map(|(i, v)| (VarId(i), v))
    }
}

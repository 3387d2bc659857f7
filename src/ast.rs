//! Arena-backed expression tree.
//!
//! Nodes live in one `Vec` and refer to each other by [`NodeId`]. A node is
//! one of three shapes:
//!
//! - **leaf**: a term, constant or variable symbol and no children;
//! - **binary**: an operator symbol with `left` and `right`;
//! - **group**: no symbol and a single child in `left` (parentheses, or a
//!   carrier for unary flags).
//!
//! Any node may carry unary minus and bitwise-not flags, applied after the
//! node's own value is computed.

use std::fmt::{self, Write as _};
use std::num::IntErrorKind;

use crate::classify::is_alpha;
use crate::error::ParseError;
use crate::operator::{operator_precedence, Operator};
use crate::registry::{VarId, VariableRegistry};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

impl NodeId {
    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Symbol {
    /// Variable name as written in the source, before interning.
    Term(String),
    Constant(u64),
    Variable(VarId),
    Operator(Operator),
}

impl Symbol {
    /// Builds the symbol for a term token.
    ///
    /// Text starting with a letter or `_` names a variable; anything else is
    /// a literal, hexadecimal with a `0x`/`0X` prefix and decimal otherwise.
    pub fn term(text: &str) -> Result<Symbol, ParseError> {
        match text.chars().next() {
            Some(c) if is_alpha(c) => Ok(Symbol::Term(text.to_owned())),
            Some(_) => parse_literal(text).map(Symbol::Constant),
            None => Err(ParseError::InvalidLiteral(String::new())),
        }
    }

    pub fn operator(&self) -> Option<Operator> {
        match self {
            Symbol::Operator(op) => Some(*op),
            _ => None,
        }
    }
}

/// Decodes a numeric literal. Values wider than 64 bits saturate to
/// `u64::MAX`; only the low bits survive the width mask anyway.
pub fn parse_literal(text: &str) -> Result<u64, ParseError> {
    let parsed = match text.strip_prefix("0x").or_else(|| text.strip_prefix("0X")) {
        Some(digits) => u64::from_str_radix(digits, 16),
        None => text.parse::<u64>(),
    };
    parsed.or_else(|e| match e.kind() {
        IntErrorKind::PosOverflow => Ok(u64::MAX),
        _ => Err(ParseError::InvalidLiteral(text.to_owned())),
    })
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Node {
    pub parent: Option<NodeId>,
    pub left: Option<NodeId>,
    pub right: Option<NodeId>,
    pub symbol: Option<Symbol>,
    pub unary_minus: bool,
    pub unary_not: bool,
}

impl Node {
    pub fn leaf(symbol: Symbol) -> Self {
        Node {
            symbol: Some(symbol),
            ..Node::default()
        }
    }

    pub fn binary(op: Operator) -> Self {
        Node::leaf(Symbol::Operator(op))
    }

    pub fn group() -> Self {
        Node::default()
    }

    pub fn is_leaf(&self) -> bool {
        self.left.is_none() && self.right.is_none() && self.symbol.as_ref().is_some_and(|s| s.operator().is_none())
    }

    pub fn is_group(&self) -> bool {
        self.symbol.is_none()
    }

    pub fn operator(&self) -> Option<Operator> {
        self.symbol.as_ref().and_then(Symbol::operator)
    }

    pub fn has_unary(&self) -> bool {
        self.unary_minus || self.unary_not
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tree {
    nodes: Vec<Node>,
    root: NodeId,
}

impl Default for Tree {
    fn default() -> Self {
        Self::new()
    }
}

impl Tree {
    /// A tree holding a single empty group node as its root.
    pub fn new() -> Self {
        Tree {
            nodes: vec![Node::group()],
            root: NodeId(0),
        }
    }

    pub fn alloc(&mut self, node: Node) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(node);
        id
    }

    #[inline]
    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.0]
    }

    #[inline]
    pub fn node_mut(&mut self, id: NodeId) -> &mut Node {
        &mut self.nodes[id.0]
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    /// Makes `id` the root and cuts its parent link.
    pub fn set_root(&mut self, id: NodeId) {
        self.node_mut(id).parent = None;
        self.root = id;
    }

    /// Number of allocated nodes, including any that are no longer reachable.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn set_left(&mut self, parent: NodeId, child: NodeId) {
        self.node_mut(parent).left = Some(child);
        self.node_mut(child).parent = Some(parent);
    }

    pub fn set_right(&mut self, parent: NodeId, child: NodeId) {
        self.node_mut(parent).right = Some(child);
        self.node_mut(child).parent = Some(parent);
    }

    /// Puts `new` in whichever child slot of `parent` holds `old`.
    ///
    /// Returns `false` if `old` is not a child of `parent`.
    pub fn replace_child(&mut self, parent: NodeId, old: NodeId, new: NodeId) -> bool {
        let node = self.node(parent);
        if node.left == Some(old) {
            self.set_left(parent, new);
        } else if node.right == Some(old) {
            self.set_right(parent, new);
        } else {
            return false;
        }
        true
    }

    /// Follows parent links from `from` up to a node without a parent.
    pub fn find_root(&self, from: NodeId) -> NodeId {
        let mut id = from;
        while let Some(parent) = self.node(id).parent {
            id = parent;
        }
        id
    }

    /// Reachable nodes in left-to-right depth-first (pre-)order.
    pub fn preorder(&self) -> Vec<NodeId> {
        let mut order = Vec::with_capacity(self.nodes.len());
        let mut stack = vec![self.root];
        while let Some(id) = stack.pop() {
            order.push(id);
            let node = self.node(id);
            if let Some(right) = node.right {
                stack.push(right);
            }
            if let Some(left) = node.left {
                stack.push(left);
            }
        }
        order
    }

    /// Leaves in source order.
    pub fn leaves(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.preorder().into_iter().filter(|&id| self.node(id).is_leaf())
    }

    /// Displays the tree as expression text. Variables print as `v<id>`
    /// unless a registry supplies their names.
    pub fn render<'a>(&'a self, names: Option<&'a VariableRegistry>) -> Render<'a> {
        Render {
            tree: self,
            names,
            node: self.root,
        }
    }
}

/// Text form of a tree, accepted back by the parser.
pub struct Render<'a> {
    tree: &'a Tree,
    names: Option<&'a VariableRegistry>,
    node: NodeId,
}

/// Check if `child` needs parentheses as an operand of `parent`.
fn needs_parens(child: Operator, parent: Operator, is_right: bool) -> bool {
    match operator_precedence(child, parent) {
        std::cmp::Ordering::Less => true,
        // Operators on one level associate to the left.
        std::cmp::Ordering::Equal => is_right,
        std::cmp::Ordering::Greater => false,
    }
}

impl Render<'_> {
    fn write_node(&self, f: &mut fmt::Formatter<'_>, id: NodeId, parent: Option<(Operator, bool)>) -> fmt::Result {
        let node = self.tree.node(id);
        match (node.unary_minus, node.unary_not) {
            (false, false) => self.write_core(f, id, parent),
            (true, false) => {
                f.write_char('`')?;
                self.write_operand(f, id)
            }
            (false, true) => {
                f.write_char('~')?;
                self.write_operand(f, id)
            }
            (true, true) => {
                f.write_str("~(`")?;
                self.write_operand(f, id)?;
                f.write_char(')')
            }
        }
    }

    /// Body of a node carrying unary flags; binary bodies get parentheses.
    fn write_operand(&self, f: &mut fmt::Formatter<'_>, id: NodeId) -> fmt::Result {
        if self.tree.node(id).operator().is_some() {
            f.write_char('(')?;
            self.write_core(f, id, None)?;
            f.write_char(')')
        } else {
            self.write_core(f, id, None)
        }
    }

    fn write_core(&self, f: &mut fmt::Formatter<'_>, id: NodeId, parent: Option<(Operator, bool)>) -> fmt::Result {
        let node = self.tree.node(id);
        match &node.symbol {
            None => {
                f.write_char('(')?;
                if let Some(inner) = node.left {
                    self.write_node(f, inner, None)?;
                }
                f.write_char(')')
            }
            Some(Symbol::Term(name)) => f.write_str(name),
            Some(Symbol::Constant(value)) => write!(f, "{}", value),
            Some(Symbol::Variable(var)) => match self.names.and_then(|r| r.get(*var)) {
                Some(entry) => f.write_str(&entry.name),
                None => write!(f, "v{}", var.index()),
            },
            Some(Symbol::Operator(op)) => {
                let wrap = parent.is_some_and(|(p, is_right)| needs_parens(*op, p, is_right));
                if wrap {
                    f.write_char('(')?;
                }
                if let Some(left) = node.left {
                    self.write_node(f, left, Some((*op, false)))?;
                }
                f.write_char(op.as_char())?;
                if let Some(right) = node.right {
                    self.write_node(f, right, Some((*op, true)))?;
                }
                if wrap {
                    f.write_char(')')?;
                }
                Ok(())
            }
        }
    }
}

impl fmt::Display for Render<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.write_node(f, self.node, None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Helper function to create a literal leaf
    fn lit(tree: &mut Tree, value: u64) -> NodeId {
        tree.alloc(Node::leaf(Symbol::Constant(value)))
    }

    // Helper function to create a variable leaf
    fn var(tree: &mut Tree, name: &str) -> NodeId {
        tree.alloc(Node::leaf(Symbol::Term(name.to_owned())))
    }

    // Helper function to create a binary node
    fn binary(tree: &mut Tree, left: NodeId, op: Operator, right: NodeId) -> NodeId {
        let id = tree.alloc(Node::binary(op));
        tree.set_left(id, left);
        tree.set_right(id, right);
        id
    }

    // ==================== Literal Tests ====================

    #[test]
    fn test_parse_literal() {
        assert_eq!(parse_literal("42"), Ok(42));
        assert_eq!(parse_literal("0x1F"), Ok(31));
        assert_eq!(parse_literal("0XfF"), Ok(255));
        assert_eq!(parse_literal("007"), Ok(7));
        assert_eq!(parse_literal("0x"), Err(ParseError::InvalidLiteral("0x".into())));
        assert_eq!(parse_literal("12ab"), Err(ParseError::InvalidLiteral("12ab".into())));
    }

    #[test]
    fn test_parse_literal_saturates() {
        assert_eq!(parse_literal("18446744073709551615"), Ok(u64::MAX));
        assert_eq!(parse_literal("99999999999999999999"), Ok(u64::MAX));
        assert_eq!(parse_literal("0x1ffffffffffffffff"), Ok(u64::MAX));
        assert_eq!(parse_literal("0x1g"), Err(ParseError::InvalidLiteral("0x1g".into())));
    }

    #[test]
    fn test_symbol_term() {
        assert_eq!(Symbol::term("foo"), Ok(Symbol::Term("foo".into())));
        assert_eq!(Symbol::term("_x1"), Ok(Symbol::Term("_x1".into())));
        assert_eq!(Symbol::term("0x10"), Ok(Symbol::Constant(16)));
        assert_eq!(Symbol::term("9"), Ok(Symbol::Constant(9)));
    }

    // ==================== Structure Tests ====================

    #[test]
    fn test_links_and_root() {
        let mut tree = Tree::new();
        let a = var(&mut tree, "a");
        let one = lit(&mut tree, 1);
        let sum = binary(&mut tree, a, Operator::Add, one);
        tree.set_left(tree.root(), sum);

        assert_eq!(tree.node(a).parent, Some(sum));
        assert_eq!(tree.find_root(a), tree.root());
        assert_eq!(tree.leaves().collect::<Vec<_>>(), vec![a, one]);

        tree.set_root(sum);
        assert_eq!(tree.find_root(one), sum);
        assert_eq!(tree.preorder(), vec![sum, a, one]);
    }

    #[test]
    fn test_replace_child() {
        let mut tree = Tree::new();
        let a = var(&mut tree, "a");
        let b = var(&mut tree, "b");
        let c = var(&mut tree, "c");
        let sum = binary(&mut tree, a, Operator::Add, b);

        assert!(tree.replace_child(sum, b, c));
        assert_eq!(tree.node(sum).right, Some(c));
        assert_eq!(tree.node(c).parent, Some(sum));
        assert!(!tree.replace_child(sum, b, c));
    }

    // ==================== Render Tests ====================

    #[test]
    fn test_render_minimal_parens() {
        let mut tree = Tree::new();
        let a = var(&mut tree, "a");
        let b = var(&mut tree, "b");
        let c = var(&mut tree, "c");
        let sum = binary(&mut tree, a, Operator::Add, b);
        let prod = binary(&mut tree, sum, Operator::Mul, c);
        tree.set_root(prod);

        assert_eq!(tree.render(None).to_string(), "(a+b)*c");
    }

    #[test]
    fn test_render_right_nested_same_level() {
        let mut tree = Tree::new();
        let a = lit(&mut tree, 8);
        let b = lit(&mut tree, 4);
        let c = lit(&mut tree, 2);
        let inner = binary(&mut tree, b, Operator::Sub, c);
        let outer = binary(&mut tree, a, Operator::Sub, inner);
        tree.set_root(outer);

        assert_eq!(tree.render(None).to_string(), "8-(4-2)");
    }

    #[test]
    fn test_render_unary_flags() {
        let mut tree = Tree::new();
        let a = var(&mut tree, "a");
        let b = var(&mut tree, "b");
        tree.node_mut(a).unary_minus = true;
        let sum = binary(&mut tree, a, Operator::Add, b);
        let group = tree.alloc(Node::group());
        tree.set_left(group, sum);
        tree.node_mut(group).unary_not = true;
        tree.set_root(group);

        assert_eq!(tree.render(None).to_string(), "~(`a+b)");
    }
}

//! Incremental precedence parser.
//!
//! Tokens are pushed one at a time and the tree is rebalanced as each binary
//! operator arrives, so there is no operator stack. The parser keeps a
//! cursor (`current`) that is always the innermost open group or an operator
//! node below it still waiting for operands.

use log::{debug, trace};

use crate::ast::{Node, NodeId, Symbol, Tree};
use crate::classify::is_open_paren;
use crate::error::ParseError;
use crate::operator::Operator;
use crate::token::{Token, TokenKind, Tokenizer};

pub struct Parser {
    tree: Tree,
    current: NodeId,
    /// Open parenthesis groups.
    depth: usize,
    pending_minus: bool,
    pending_not: bool,
    /// Byte offset just past the last token seen.
    end: usize,
}

impl Default for Parser {
    fn default() -> Self {
        Self::new()
    }
}

fn structural(token: &Token<'_>, reason: &'static str) -> ParseError {
    ParseError::Structural {
        offset: token.offset,
        token: token.text.to_owned(),
        reason,
    }
}

impl Parser {
    pub fn new() -> Self {
        let tree = Tree::new();
        let current = tree.root();
        Parser {
            tree,
            current,
            depth: 0,
            pending_minus: false,
            pending_not: false,
            end: 0,
        }
    }

    pub fn push(&mut self, token: Token<'_>) -> Result<(), ParseError> {
        trace!(
            "parse: {:?} {:?} at {} (current {}, depth {})",
            token.kind,
            token.text,
            token.offset,
            self.current,
            self.depth
        );
        self.end = token.offset + token.text.len();

        match token.kind {
            TokenKind::Term => self.term(&token),
            TokenKind::Operator => match Operator::from_char(token.first_char()) {
                Some(op) if op.is_unary() => self.unary(&token, op),
                Some(op) => self.binary(&token, op),
                None => Err(structural(&token, "unknown operator")),
            },
            TokenKind::Paren if is_open_paren(token.first_char()) => self.open(&token),
            TokenKind::Paren => self.close(&token),
            TokenKind::Whitespace => Ok(()),
        }
    }

    /// Hands pending unary flags over to `id`.
    fn take_pending(&mut self, id: NodeId) {
        let node = self.tree.node_mut(id);
        node.unary_minus = std::mem::take(&mut self.pending_minus);
        node.unary_not = std::mem::take(&mut self.pending_not);
    }

    /// Places an operand in the first free slot of `current`.
    fn attach_operand(&mut self, token: &Token<'_>, operand: NodeId) -> Result<(), ParseError> {
        let node = self.tree.node(self.current);
        if node.symbol.is_none() && node.left.is_none() {
            self.tree.set_left(self.current, operand);
        } else if node.operator().is_some() && node.right.is_none() {
            self.tree.set_right(self.current, operand);
        } else {
            return Err(structural(token, "no free operand slot"));
        }
        Ok(())
    }

    fn term(&mut self, token: &Token<'_>) -> Result<(), ParseError> {
        let leaf = self.tree.alloc(Node::leaf(Symbol::term(token.text)?));
        self.take_pending(leaf);
        self.attach_operand(token, leaf)
    }

    fn unary(&mut self, token: &Token<'_>, op: Operator) -> Result<(), ParseError> {
        if self.pending_minus || self.pending_not {
            return Err(structural(token, "stacked unary operators"));
        }
        match op {
            Operator::Neg => self.pending_minus = true,
            _ => self.pending_not = true,
        }
        Ok(())
    }

    fn binary(&mut self, token: &Token<'_>, op: Operator) -> Result<(), ParseError> {
        if self.pending_minus || self.pending_not {
            return Err(structural(token, "binary operator after unary operator"));
        }

        let node = self.tree.node(self.current);
        let Some(prev) = node.operator() else {
            // First operator inside a group: adopt its operand.
            let operand = node.left.ok_or_else(|| structural(token, "missing left operand"))?;
            let new = self.tree.alloc(Node::binary(op));
            self.tree.set_left(new, operand);
            self.tree.set_left(self.current, new);
            self.current = new;
            return Ok(());
        };
        let right = node.right.ok_or_else(|| structural(token, "missing right operand"))?;

        let new = self.tree.alloc(Node::binary(op));
        if prev.precedence() >= op.precedence() {
            // Left-associate: climb while the ancestors bind at least as
            // tightly, stopping at the enclosing group.
            let mut anchor = self.current;
            while let Some(parent) = self.tree.node(anchor).parent {
                match self.tree.node(parent).operator() {
                    Some(p) if p.precedence() >= op.precedence() => anchor = parent,
                    _ => break,
                }
            }
            let parent = self
                .tree
                .node(anchor)
                .parent
                .ok_or_else(|| structural(token, "operator outside any group"))?;
            self.tree.replace_child(parent, anchor, new);
            self.tree.set_left(new, anchor);
        } else {
            self.tree.set_left(new, right);
            self.tree.set_right(self.current, new);
        }
        self.current = new;
        Ok(())
    }

    fn open(&mut self, token: &Token<'_>) -> Result<(), ParseError> {
        let group = self.tree.alloc(Node::group());
        self.take_pending(group);
        self.attach_operand(token, group)?;
        self.current = group;
        self.depth += 1;
        Ok(())
    }

    fn close(&mut self, token: &Token<'_>) -> Result<(), ParseError> {
        if self.depth == 0 {
            return Err(structural(token, "close parenthesis without a matching open"));
        }

        let mut node = self.current;
        if self.tree.node(node).operator().is_some() && self.tree.node(node).right.is_none() {
            return Err(structural(token, "missing right operand"));
        }
        while self.tree.node(node).operator().is_some() {
            node = self
                .tree
                .node(node)
                .parent
                .ok_or_else(|| structural(token, "close parenthesis outside any group"))?;
        }

        let group = self.tree.node(node);
        if group.left.is_none() {
            return Err(structural(token, "empty group"));
        }
        self.current = group
            .parent
            .ok_or_else(|| structural(token, "close parenthesis without a matching open"))?;
        self.depth -= 1;
        Ok(())
    }

    /// Checks the finished tree and unwraps the root group.
    pub fn finish(mut self) -> Result<Tree, ParseError> {
        let at_end = |reason| ParseError::Structural {
            offset: self.end,
            token: String::new(),
            reason,
        };

        if self.depth != 0 {
            return Err(ParseError::Unclosed(self.depth));
        }
        if self.pending_minus || self.pending_not {
            return Err(at_end("unary operator without an operand"));
        }

        let root = self.tree.find_root(self.current);
        let top = self.tree.node(root).left.ok_or(ParseError::Empty)?;

        for id in self.tree.preorder() {
            let node = self.tree.node(id);
            match node.operator() {
                Some(op) if node.left.is_none() || node.right.is_none() => {
                    return Err(ParseError::Structural {
                        offset: self.end,
                        token: op.to_string(),
                        reason: "operator is missing an operand",
                    });
                }
                None if node.is_group() && node.left.is_none() => return Err(at_end("empty group")),
                _ => {}
            }
        }

        self.tree.set_root(top);
        debug!("parse: {} nodes", self.tree.len());
        Ok(self.tree)
    }
}

/// Parses a cleaned expression into a tree.
pub fn parse(input: &str) -> Result<Tree, ParseError> {
    let mut parser = Parser::new();
    for token in Tokenizer::new(input) {
        parser.push(token?)?;
    }
    parser.finish()
}

#[cfg(test)]
mod tests {
    use super::*;

    use pretty_assertions::assert_eq;
    use test_log::test;

    fn render(input: &str) -> String {
        parse(input).unwrap().render(None).to_string()
    }

    fn root_op(tree: &Tree) -> Option<Operator> {
        tree.node(tree.root()).operator()
    }

    fn child_op(tree: &Tree, id: Option<NodeId>) -> Option<Operator> {
        id.and_then(|id| tree.node(id).operator())
    }

    // ==================== Precedence Tests ====================

    #[test]
    fn test_higher_precedence_on_the_right() {
        let tree = parse("1+2*3").unwrap();
        let root = tree.node(tree.root());
        assert_eq!(root.operator(), Some(Operator::Add));
        assert_eq!(child_op(&tree, root.right), Some(Operator::Mul));
        assert_eq!(render("1+2*3"), "1+2*3");
    }

    #[test]
    fn test_same_level_associates_left() {
        let tree = parse("8-4-2").unwrap();
        let root = tree.node(tree.root());
        assert_eq!(root.operator(), Some(Operator::Sub));
        assert_eq!(child_op(&tree, root.left), Some(Operator::Sub));
        assert_eq!(tree.node(root.right.unwrap()).symbol, Some(Symbol::Constant(2)));
    }

    #[test]
    fn test_climb_past_several_levels() {
        // ((a*b)+(c*d))-e
        let tree = parse("a*b+c*d-e").unwrap();
        let root = tree.node(tree.root());
        assert_eq!(root.operator(), Some(Operator::Sub));
        let sum = tree.node(root.left.unwrap());
        assert_eq!(sum.operator(), Some(Operator::Add));
        assert_eq!(child_op(&tree, sum.left), Some(Operator::Mul));
        assert_eq!(child_op(&tree, sum.right), Some(Operator::Mul));
    }

    #[test]
    fn test_mixed_bitwise_chain() {
        // a|((b&c)^d)
        let tree = parse("a|b&c^d").unwrap();
        let root = tree.node(tree.root());
        assert_eq!(root.operator(), Some(Operator::BitOr));
        let xor = tree.node(root.right.unwrap());
        assert_eq!(xor.operator(), Some(Operator::BitXor));
        assert_eq!(child_op(&tree, xor.left), Some(Operator::BitAnd));
        assert_eq!(render("a|b&c^d"), "a|b&c^d");
    }

    #[test]
    fn test_shift_binds_looser_than_add() {
        let tree = parse("a<b+c").unwrap();
        assert_eq!(root_op(&tree), Some(Operator::BitShl));
        assert_eq!(child_op(&tree, tree.node(tree.root()).right), Some(Operator::Add));
    }

    // ==================== Group Tests ====================

    #[test]
    fn test_group_then_operators() {
        // ((a+b)*c)+d
        let tree = parse("(a+b)*c+d").unwrap();
        let root = tree.node(tree.root());
        assert_eq!(root.operator(), Some(Operator::Add));
        let prod = tree.node(root.left.unwrap());
        assert_eq!(prod.operator(), Some(Operator::Mul));
        assert!(tree.node(prod.left.unwrap()).is_group());
        assert_eq!(render("(a+b)*c+d"), "(a+b)*c+d");
    }

    #[test]
    fn test_climb_stops_at_group() {
        let tree = parse("a*(b-c-d)").unwrap();
        let root = tree.node(tree.root());
        assert_eq!(root.operator(), Some(Operator::Mul));
        let group = tree.node(root.right.unwrap());
        assert!(group.is_group());
        assert_eq!(child_op(&tree, group.left), Some(Operator::Sub));
        assert_eq!(render("a*(b-c-d)"), "a*(b-c-d)");
    }

    #[test]
    fn test_mixed_brackets_and_nesting() {
        assert_eq!(render("[a+{b}]*((c))"), "(a+(b))*((c))");
    }

    // ==================== Unary Tests ====================

    #[test]
    fn test_unary_on_terms() {
        let tree = parse("`a*~b").unwrap();
        let root = tree.node(tree.root());
        assert!(tree.node(root.left.unwrap()).unary_minus);
        assert!(tree.node(root.right.unwrap()).unary_not);
        assert_eq!(render("`a*~b"), "`a*~b");
    }

    #[test]
    fn test_unary_on_group() {
        let tree = parse("~(a+b)").unwrap();
        let root = tree.node(tree.root());
        assert!(root.is_group());
        assert!(root.unary_not);
        assert!(!tree.node(root.left.unwrap()).has_unary());
        assert_eq!(render("~(a+b)"), "~(a+b)");
    }

    #[test]
    fn test_constants_are_decoded() {
        assert_eq!(render("0x10+007"), "16+7");
        assert_eq!(parse("12ab"), Err(ParseError::InvalidLiteral("12ab".into())));
    }

    #[test]
    fn test_render_reparses_to_same_text() {
        for input in [
            "a+b*c",
            "(a+b)*c+d",
            "a-(b-c)",
            "a|b&c^d",
            "`(a%b)<c",
            "~a>`b/(c*d)",
            "((a))",
        ] {
            let once = render(input);
            assert_eq!(render(&once), once, "input {:?}", input);
        }
    }

    // ==================== Error Tests ====================

    #[test]
    fn test_close_without_open() {
        assert!(matches!(parse("a)"), Err(ParseError::Structural { offset: 1, .. })));
    }

    #[test]
    fn test_unclosed_group() {
        assert_eq!(parse("(a"), Err(ParseError::Unclosed(1)));
        assert_eq!(parse("((a)"), Err(ParseError::Unclosed(1)));
    }

    #[test]
    fn test_operand_without_operator() {
        assert!(matches!(
            parse("a(b)"),
            Err(ParseError::Structural { offset: 1, reason: "no free operand slot", .. })
        ));
        assert!(matches!(parse("a b"), Err(ParseError::Structural { offset: 2, .. })));
    }

    #[test]
    fn test_missing_operands() {
        assert!(matches!(
            parse("+a"),
            Err(ParseError::Structural { reason: "missing left operand", .. })
        ));
        assert!(matches!(
            parse("a+"),
            Err(ParseError::Structural { reason: "operator is missing an operand", .. })
        ));
        assert!(matches!(
            parse("(a*)"),
            Err(ParseError::Structural { reason: "missing right operand", .. })
        ));
    }

    #[test]
    fn test_empty_inputs() {
        assert_eq!(parse(""), Err(ParseError::Empty));
        assert!(matches!(parse("()"), Err(ParseError::Structural { reason: "empty group", .. })));
        assert!(matches!(parse("`"), Err(ParseError::Structural { .. })));
        assert!(matches!(parse("~~a"), Err(ParseError::Structural { reason: "stacked unary operators", .. })));
    }

    #[test]
    fn test_unknown_character() {
        assert_eq!(parse("a=b"), Err(ParseError::UnexpectedChar { found: '=', offset: 1 }));
    }
}

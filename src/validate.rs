//! Well-formedness automaton run before the parser.
//!
//! The machine is driven by the class of every character, whitespace
//! included: whitespace after a term moves to [`State::TokenTrailingSpace`]
//! so that two terms separated only by spaces are rejected instead of being
//! read as one.

use log::trace;

use crate::classify::CharClass;
use crate::error::ValidationError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum State {
    Initial,
    OpenParen,
    CloseParen,
    Operator,
    UnaryOp,
    Token,
    TokenTrailingSpace,
    Invalid,
}

impl State {
    pub fn next(self, class: CharClass) -> State {
        use CharClass as C;
        use State::*;

        match (self, class) {
            (Invalid, _) => Invalid,

            (Initial, C::OpenParen) => OpenParen,
            (Initial, C::Term) => Token,
            (Initial, C::Whitespace) => Initial,
            (Initial, C::UnaryOperator) => UnaryOp,
            (Initial, _) => Invalid,

            (OpenParen, C::OpenParen) => OpenParen,
            (OpenParen, C::Term) => Token,
            (OpenParen, C::Whitespace) => OpenParen,
            (OpenParen, C::UnaryOperator) => UnaryOp,
            // `()` is rejected. Older revisions of the table accepted it.
            (OpenParen, C::CloseParen) => Invalid,
            (OpenParen, _) => Invalid,

            (CloseParen, C::CloseParen) => CloseParen,
            (CloseParen, C::BinaryOperator) => Operator,
            (CloseParen, C::Whitespace) => CloseParen,
            (CloseParen, _) => Invalid,

            (Operator, C::OpenParen) => OpenParen,
            (Operator, C::Term) => Token,
            (Operator, C::Whitespace) => Operator,
            (Operator, C::UnaryOperator) => UnaryOp,
            (Operator, _) => Invalid,

            (UnaryOp, C::OpenParen) => OpenParen,
            (UnaryOp, C::Term) => Token,
            (UnaryOp, C::Whitespace) => UnaryOp,
            (UnaryOp, _) => Invalid,

            (Token, C::OpenParen) => OpenParen,
            (Token, C::CloseParen) => CloseParen,
            (Token, C::BinaryOperator) => Operator,
            (Token, C::Term) => Token,
            (Token, C::Whitespace) => TokenTrailingSpace,
            (Token, C::UnaryOperator) => Invalid,

            (TokenTrailingSpace, C::OpenParen) => OpenParen,
            (TokenTrailingSpace, C::CloseParen) => CloseParen,
            (TokenTrailingSpace, C::BinaryOperator) => Operator,
            (TokenTrailingSpace, C::Term) => Invalid,
            (TokenTrailingSpace, C::Whitespace) => TokenTrailingSpace,
            (TokenTrailingSpace, C::UnaryOperator) => UnaryOp,
        }
    }

    /// States the input may end in.
    pub fn is_accepting(self) -> bool {
        matches!(self, State::CloseParen | State::Token | State::TokenTrailingSpace)
    }
}

/// Runs the automaton over `expression`, stopping at the first rejection.
pub fn validate(expression: &str) -> Result<(), ValidationError> {
    if expression.is_empty() {
        return Err(ValidationError::Empty);
    }

    let mut state = State::Initial;
    let mut open = 0usize;
    let mut close = 0usize;

    for (offset, ch) in expression.char_indices() {
        let next = match CharClass::of(ch) {
            Some(class) => {
                match class {
                    CharClass::OpenParen => open += 1,
                    CharClass::CloseParen => close += 1,
                    _ => {}
                }
                state.next(class)
            }
            None => State::Invalid,
        };

        if next == State::Invalid {
            trace!("validate: {:?} at {} rejected in {:?}", ch, offset, state);
            return Err(ValidationError::UnexpectedChar {
                found: ch,
                offset,
                state,
            });
        }
        state = next;
    }

    if open != close {
        return Err(ValidationError::Unbalanced { open, close });
    }
    if !state.is_accepting() {
        return Err(ValidationError::Incomplete(state));
    }
    Ok(())
}

pub fn is_well_formed(expression: &str) -> bool {
    validate(expression).is_ok()
}

//! Character classes of the expression alphabet.

/// Class of a single input character.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CharClass {
    Term,
    BinaryOperator,
    UnaryOperator,
    OpenParen,
    CloseParen,
    Whitespace,
}

impl CharClass {
    /// Returns `None` for characters outside the alphabet.
    pub fn of(c: char) -> Option<CharClass> {
        if is_alphanumeric(c) {
            Some(CharClass::Term)
        } else if is_binary_operator(c) {
            Some(CharClass::BinaryOperator)
        } else if is_unary_operator(c) {
            Some(CharClass::UnaryOperator)
        } else if is_open_paren(c) {
            Some(CharClass::OpenParen)
        } else if is_close_paren(c) {
            Some(CharClass::CloseParen)
        } else if is_whitespace(c) {
            Some(CharClass::Whitespace)
        } else {
            None
        }
    }
}

/// `a-z`, `A-Z` or `_`.
pub fn is_alpha(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_'
}

pub fn is_numeric(c: char) -> bool {
    c.is_ascii_digit()
}

pub fn is_alphanumeric(c: char) -> bool {
    is_alpha(c) || is_numeric(c)
}

pub fn is_whitespace(c: char) -> bool {
    matches!(c, ' ' | '\t' | '\n' | '\r')
}

pub fn is_binary_operator(c: char) -> bool {
    matches!(c, '+' | '-' | '*' | '/' | '%' | '<' | '>' | '&' | '^' | '|')
}

/// `` ` `` (unary minus, after cleaning) and `~`.
pub fn is_unary_operator(c: char) -> bool {
    matches!(c, '`' | '~')
}

pub fn is_operator(c: char) -> bool {
    is_binary_operator(c) || is_unary_operator(c)
}

pub fn is_open_paren(c: char) -> bool {
    matches!(c, '(' | '{' | '[')
}

pub fn is_close_paren(c: char) -> bool {
    matches!(c, ')' | '}' | ']')
}

pub fn is_paren(c: char) -> bool {
    is_open_paren(c) || is_close_paren(c)
}

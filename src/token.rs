use crate::classify::CharClass;
use crate::error::ParseError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    Term,
    Operator,
    Paren,
    Whitespace,
}

impl From<CharClass> for TokenKind {
    fn from(class: CharClass) -> Self {
        match class {
            CharClass::Term => TokenKind::Term,
            CharClass::BinaryOperator | CharClass::UnaryOperator => TokenKind::Operator,
            CharClass::OpenParen | CharClass::CloseParen => TokenKind::Paren,
            CharClass::Whitespace => TokenKind::Whitespace,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Token<'a> {
    pub kind: TokenKind,
    pub text: &'a str,
    /// Byte offset of the first character.
    pub offset: usize,
}

impl Token<'_> {
    pub fn first_char(&self) -> char {
        self.text.chars().next().unwrap_or_default()
    }
}

/// Longest-match scanner over a cleaned expression.
///
/// Consecutive characters of the same kind form one token, except operators
/// and parentheses which are always a single character. Whitespace is
/// skipped.
pub struct Tokenizer<'a> {
    input: &'a str,
    pos: usize,
}

impl<'a> Tokenizer<'a> {
    pub fn new(input: &'a str) -> Self {
        Self { input, pos: 0 }
    }

    fn kind_at(&self, offset: usize) -> Result<Option<(char, TokenKind)>, ParseError> {
        let Some(ch) = self.input[offset..].chars().next() else {
            return Ok(None);
        };
        let class = CharClass::of(ch).ok_or(ParseError::UnexpectedChar { found: ch, offset })?;
        Ok(Some((ch, class.into())))
    }
}

impl<'a> Iterator for Tokenizer<'a> {
    type Item = Result<Token<'a>, ParseError>;

    fn next(&mut self) -> Option<Self::Item> {
        // Skip to the start of the next token and lock its kind.
        let (start, kind) = loop {
            match self.kind_at(self.pos) {
                Err(e) => {
                    self.pos = self.input.len();
                    return Some(Err(e));
                }
                Ok(None) => return None,
                Ok(Some((ch, TokenKind::Whitespace))) => self.pos += ch.len_utf8(),
                Ok(Some((_, kind))) => break (self.pos, kind),
            }
        };

        let mut end = start;
        while let Ok(Some((ch, k))) = self.kind_at(end) {
            if k != kind {
                break;
            }
            end += ch.len_utf8();
            if matches!(kind, TokenKind::Operator | TokenKind::Paren) {
                break;
            }
        }

        self.pos = end;
        Some(Ok(Token {
            kind,
            text: &self.input[start..end],
            offset: start,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tokens(input: &str) -> Vec<(TokenKind, &str)> {
        Tokenizer::new(input)
            .map(|t| t.map(|t| (t.kind, t.text)))
            .collect::<Result<_, _>>()
            .unwrap()
    }

    #[test]
    fn test_groups_term_characters() {
        use TokenKind::*;

        assert_eq!(tokens("foo+0x1F"), vec![(Term, "foo"), (Operator, "+"), (Term, "0x1F")]);
    }

    #[test]
    fn test_operators_and_parens_are_single_characters() {
        use TokenKind::*;

        assert_eq!(
            tokens("((a))*`~b"),
            vec![
                (Paren, "("),
                (Paren, "("),
                (Term, "a"),
                (Paren, ")"),
                (Paren, ")"),
                (Operator, "*"),
                (Operator, "`"),
                (Operator, "~"),
                (Term, "b"),
            ]
        );
    }

    #[test]
    fn test_whitespace_is_skipped() {
        use TokenKind::*;

        assert_eq!(tokens("  a \t+ b  "), vec![(Term, "a"), (Operator, "+"), (Term, "b")]);
        assert!(tokens("").is_empty());
        assert!(tokens("   ").is_empty());
    }

    #[test]
    fn test_offsets() {
        let offsets: Vec<usize> = Tokenizer::new("ab + cd").map(|t| t.unwrap().offset).collect();
        assert_eq!(offsets, vec![0, 3, 5]);
    }

    #[test]
    fn test_unknown_character() {
        let mut it = Tokenizer::new("a=b");
        assert!(matches!(it.next(), Some(Ok(Token { text: "a", .. }))));
        assert_eq!(it.next(), Some(Err(ParseError::UnexpectedChar { found: '=', offset: 1 })));
        assert_eq!(it.next(), None);
    }
}

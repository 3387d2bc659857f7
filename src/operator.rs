use std::cmp::Ordering;
use std::fmt;

/// Operator alphabet understood by the parser.
///
/// The high nibble of each code is the binding level, so comparing
/// `op as u8 >> 4` is enough to order two operators.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operator {
    // Binary operators
    BitOr = 0x40,
    BitXor = 0x50,
    BitAnd = 0x60,
    BitShl = 0x90,
    BitShr = 0x91,
    Add = 0xA0,
    Sub = 0xA1,
    Mul = 0xB0,
    Div = 0xB1,
    Mod = 0xB2,
    // Unary operators
    Neg = 0xC0,
    BitNot = 0xC1,
}

impl Operator {
    /// Maps a cleaned-expression character to its operator.
    ///
    /// Shifts are single characters here: the cleaner has already folded
    /// `<<` and `>>` down to `<` and `>`.
    pub fn from_char(c: char) -> Option<Operator> {
        match c {
            '|' => Some(Operator::BitOr),
            '^' => Some(Operator::BitXor),
            '&' => Some(Operator::BitAnd),
            '<' => Some(Operator::BitShl),
            '>' => Some(Operator::BitShr),
            '+' => Some(Operator::Add),
            '-' => Some(Operator::Sub),
            '*' => Some(Operator::Mul),
            '/' => Some(Operator::Div),
            '%' => Some(Operator::Mod),
            '`' => Some(Operator::Neg),
            '~' => Some(Operator::BitNot),
            _ => None,
        }
    }

    pub fn as_char(self) -> char {
        match self {
            Operator::BitOr => '|',
            Operator::BitXor => '^',
            Operator::BitAnd => '&',
            Operator::BitShl => '<',
            Operator::BitShr => '>',
            Operator::Add => '+',
            Operator::Sub => '-',
            Operator::Mul => '*',
            Operator::Div => '/',
            Operator::Mod => '%',
            Operator::Neg => '`',
            Operator::BitNot => '~',
        }
    }

    #[inline]
    pub fn precedence(self) -> u8 {
        (self as u8) >> 4
    }

    #[inline]
    pub fn is_unary(self) -> bool {
        self.precedence() >= 0xC
    }

    #[inline]
    pub fn is_binary(self) -> bool {
        !self.is_unary()
    }

    /// Applies a binary operator to two already-masked operands.
    ///
    /// Division and modulo by zero set `undefined` and yield 0. The caller
    /// masks the result.
    #[inline]
    pub fn apply(self, l: u64, r: u64, undefined: &mut bool) -> u64 {
        match self {
            Operator::BitOr => l | r,
            Operator::BitXor => l ^ r,
            Operator::BitAnd => l & r,
            Operator::BitShl => u32::try_from(r).ok().and_then(|s| l.checked_shl(s)).unwrap_or(0),
            Operator::BitShr => u32::try_from(r).ok().and_then(|s| l.checked_shr(s)).unwrap_or(0),
            Operator::Add => l.wrapping_add(r),
            Operator::Sub => l.wrapping_sub(r),
            Operator::Mul => l.wrapping_mul(r),
            Operator::Div => {
                if r == 0 {
                    *undefined = true;
                    0
                } else {
                    l / r
                }
            }
            Operator::Mod => {
                if r == 0 {
                    *undefined = true;
                    0
                } else {
                    l % r
                }
            }
            Operator::Neg => r.wrapping_neg(),
            Operator::BitNot => !r,
        }
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_char())
    }
}

/// Compares how tightly `left` binds relative to `right`.
///
/// `Greater` means `left` binds tighter. Operators on the same level
/// compare `Equal`, which the parser resolves left to right.
pub fn operator_precedence(left: Operator, right: Operator) -> Ordering {
    left.precedence().cmp(&right.precedence())
}

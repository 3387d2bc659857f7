//! Exhaustive enumeration of variable assignments.
//!
//! Values are assigned like an odometer: every variable starts at zero and
//! the most recently registered one is the fastest-moving digit. Each outcome
//! is written to the sink as `<value>,` (or `n,` when undefined) and fed to
//! an MD5 hasher, so two expressions with the same behaviour over the same
//! width share a digest. Constant expressions only print their value.

use std::fmt;
use std::io::Write;

use log::debug;
use md5::{Digest, Md5};

use crate::ast::Tree;
use crate::config::BitWidth;
use crate::error::{Error, Result};
use crate::eval::{evaluate, Outcome};
use crate::registry::VariableRegistry;

pub const SEPARATOR: &str = ",";
pub const UNDEFINED: &str = "n";

/// Number of assignments for `variables` variables, `max_val^variables`.
pub fn combinations(width: BitWidth, variables: usize) -> Result<u64> {
    u32::try_from(variables)
        .ok()
        .and_then(|n| width.max_val().checked_pow(n))
        .ok_or(Error::TooManyCombinations {
            bits: width.bits(),
            variables,
        })
}

/// Steps `digits` to the next assignment, last digit fastest.
///
/// Returns `false` once every combination has been visited; the digits are
/// then back to all zero.
pub fn advance(digits: &mut [u64], radix: u64) -> bool {
    for digit in digits.iter_mut().rev() {
        *digit += 1;
        if *digit < radix {
            return true;
        }
        *digit = 0;
    }
    false
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Fingerprint {
    digest: [u8; 16],
    combinations: u64,
    undefined: u64,
}

impl Fingerprint {
    pub fn digest(&self) -> &[u8; 16] {
        &self.digest
    }

    pub fn combinations(&self) -> u64 {
        self.combinations
    }

    /// How many of the combinations evaluated to undefined.
    pub fn undefined(&self) -> u64 {
        self.undefined
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for byte in &self.digest {
            write!(f, "{:02x}", byte)?;
        }
        Ok(())
    }
}

/// Accumulates outcomes into the result line and its digest.
pub struct Fingerprinter {
    hasher: Md5,
    combinations: u64,
    undefined: u64,
}

impl Default for Fingerprinter {
    fn default() -> Self {
        Self::new()
    }
}

impl Fingerprinter {
    pub fn new() -> Self {
        Fingerprinter {
            hasher: Md5::new(),
            combinations: 0,
            undefined: 0,
        }
    }

    fn item(&mut self, outcome: Outcome) -> String {
        self.combinations += 1;
        match outcome {
            Outcome::Value(v) => format!("{}{}", v, SEPARATOR),
            Outcome::Undefined => {
                self.undefined += 1;
                format!("{}{}", UNDEFINED, SEPARATOR)
            }
        }
    }

    pub fn record<W: Write + ?Sized>(&mut self, outcome: Outcome, sink: &mut W) -> std::io::Result<()> {
        let item = self.item(outcome);
        self.hasher.update(item.as_bytes());
        sink.write_all(item.as_bytes())
    }

    /// Writes `outcome` to the sink and counts it, leaving the digest alone.
    pub fn record_unhashed<W: Write + ?Sized>(&mut self, outcome: Outcome, sink: &mut W) -> std::io::Result<()> {
        let item = self.item(outcome);
        sink.write_all(item.as_bytes())
    }

    pub fn finish(self) -> Fingerprint {
        let mut digest = [0u8; 16];
        digest.copy_from_slice(&self.hasher.finalize());
        Fingerprint {
            digest,
            combinations: self.combinations,
            undefined: self.undefined,
        }
    }
}

/// Evaluates `tree` for every assignment of its variables and writes the
/// result line to `sink`.
///
/// The combination count is checked before anything is evaluated. A tree
/// without variables is evaluated exactly once and its result is not
/// hashed, so every constant expression carries the digest of empty input.
pub fn enumerate<W: Write + ?Sized>(
    tree: &Tree,
    registry: &mut VariableRegistry,
    width: BitWidth,
    sink: &mut W,
) -> Result<Fingerprint> {
    let total = combinations(width, registry.len())?;
    debug!(
        "enumerate: {} variables, max_bits={}, {} combinations",
        registry.len(),
        width,
        total
    );

    registry.reset();
    let mut fingerprinter = Fingerprinter::new();
    if registry.is_empty() {
        let outcome = evaluate(tree, registry, width)?;
        fingerprinter.record_unhashed(outcome, sink)?;
        sink.write_all(b"\n")?;
        debug!("enumerate: constant expression, digest left empty");
        return Ok(fingerprinter.finish());
    }
    loop {
        let outcome = evaluate(tree, registry, width)?;
        fingerprinter.record(outcome, sink)?;
        if !advance(registry.values_mut(), width.max_val()) {
            break;
        }
    }
    sink.write_all(b"\n")?;

    let fingerprint = fingerprinter.finish();
    debug!(
        "enumerate: digest {} ({} undefined)",
        fingerprint,
        fingerprint.undefined()
    );
    Ok(fingerprint)
}

#[cfg(test)]
mod tests {
    use super::*;

    use pretty_assertions::assert_eq;
    use test_log::test;

    use crate::clean::clean;
    use crate::parser::parse;

    // MD5 of empty input.
    const EMPTY_DIGEST: &str = "d41d8cd98f00b204e9800998ecf8427e";

    fn run(input: &str, bits: u32) -> (String, Fingerprint) {
        let mut tree = parse(&clean(input)).unwrap();
        let mut registry = VariableRegistry::consolidate(&mut tree);
        let mut sink = Vec::new();
        let fp = enumerate(&tree, &mut registry, BitWidth::new(bits).unwrap(), &mut sink).unwrap();
        (String::from_utf8(sink).unwrap(), fp)
    }

    // ==================== Odometer Tests ====================

    #[test]
    fn test_advance_last_digit_fastest() {
        let mut digits = [0, 0];
        let mut seen = vec![digits];
        while advance(&mut digits, 2) {
            seen.push(digits);
        }
        assert_eq!(seen, vec![[0, 0], [0, 1], [1, 0], [1, 1]]);
        assert_eq!(digits, [0, 0]);
    }

    #[test]
    fn test_advance_empty() {
        let mut digits: [u64; 0] = [];
        assert!(!advance(&mut digits, 2));
    }

    #[test]
    fn test_combinations() {
        let w1 = BitWidth::new(1).unwrap();
        assert_eq!(combinations(w1, 0).unwrap(), 1);
        assert_eq!(combinations(w1, 3).unwrap(), 8);

        let w32 = BitWidth::new(32).unwrap();
        assert_eq!(combinations(w32, 1).unwrap(), 1 << 32);
        assert!(matches!(
            combinations(w32, 2),
            Err(Error::TooManyCombinations { bits: 32, variables: 2 })
        ));
    }

    // ==================== Fingerprint Tests ====================

    #[test]
    fn test_xor_truth_table() {
        let (line, fp) = run("a+b", 1);
        assert_eq!(line, "0,1,1,0,\n");
        assert_eq!(fp.to_string(), "716903117810795beaf119aed6a40de0");
        assert_eq!(fp.combinations(), 4);
        assert_eq!(fp.undefined(), 0);
    }

    #[test]
    fn test_single_variable_sequence() {
        let (line, fp) = run("x", 2);
        assert_eq!(line, "0,1,2,3,\n");
        assert_eq!(fp.to_string(), "091d40d0494f52fd733ad43cc8c67469");
    }

    #[test]
    fn test_first_variable_is_slowest() {
        let (line, fp) = run("p&~q", 1);
        assert_eq!(line, "0,0,1,0,\n");
        assert_eq!(fp.combinations(), 4);

        let (line, fp) = run("x&y", 1);
        assert_eq!(line, "0,0,0,1,\n");
        assert_eq!(fp.to_string(), "e8b1e6109bdd6a20460f3c3daefebfa6");
    }

    #[test]
    fn test_constant_expression_evaluates_once() {
        let (line, fp) = run("1+2*3", 8);
        assert_eq!(line, "7,\n");
        assert_eq!(fp.combinations(), 1);
        assert_eq!(fp.to_string(), EMPTY_DIGEST);

        let (line, fp) = run("1+1", 3);
        assert_eq!(line, "2,\n");
        assert_eq!(fp.to_string(), EMPTY_DIGEST);
    }

    #[test]
    fn test_undefined_outcomes() {
        let (line, fp) = run("1/a", 1);
        assert_eq!(line, "n,1,\n");
        assert_eq!(fp.undefined(), 1);

        let (line, fp) = run("1/0", 1);
        assert_eq!(line, "n,\n");
        assert_eq!(fp.undefined(), 1);
        assert_eq!(fp.to_string(), EMPTY_DIGEST);
    }

    #[test]
    fn test_same_behaviour_same_digest() {
        let (_, xor) = run("a^b", 1);
        let (_, sum) = run("a+b", 1);
        let (_, renamed) = run("foo+bar", 1);
        assert_eq!(xor, sum);
        assert_eq!(sum, renamed);

        let (_, and) = run("a&b", 1);
        assert_ne!(and.digest(), sum.digest());
    }

    #[test]
    fn test_deterministic() {
        assert_eq!(run("a*b-c", 2), run("a*b-c", 2));
    }

    #[test]
    fn test_overflow_reported_before_evaluation() {
        let mut tree = parse("a+b").unwrap();
        let mut registry = VariableRegistry::consolidate(&mut tree);
        let mut sink = Vec::new();
        let result = enumerate(&tree, &mut registry, BitWidth::new(32).unwrap(), &mut sink);
        assert!(matches!(result, Err(Error::TooManyCombinations { .. })));
        assert!(sink.is_empty());
    }
}

//! Fingerprinting many expressions at once.
//!
//! Each expression is parsed and enumerated on its own, so the work spreads
//! over rayon workers without any sharing. Results keep the input order.

use std::io;

use hashbrown::HashMap;
use log::{debug, warn};
use rayon::prelude::*;

use crate::config::BitWidth;
use crate::enumerate::Fingerprint;
use crate::error::{Error, Result};
use crate::expression::Expression;

/// Per-expression result of a batch run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Summary {
    pub canonical: String,
    pub variables: usize,
    pub slots: usize,
    pub fingerprint: Fingerprint,
}

#[derive(Debug)]
pub struct BatchEntry {
    /// 1-based line number in the batch input.
    pub line: usize,
    pub raw: String,
    pub result: Result<Summary>,
}

/// Expressions sharing one digest, by index into the batch entries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Group {
    pub fingerprint: Fingerprint,
    pub members: Vec<usize>,
}

/// Splits batch input into numbered expressions. Blank lines and lines
/// starting with `#` are skipped.
pub fn read_expressions(input: &str) -> Vec<(usize, String)> {
    input
        .lines()
        .enumerate()
        .map(|(i, line)| (i + 1, line.trim()))
        .filter(|(_, line)| !line.is_empty() && !line.starts_with('#'))
        .map(|(n, line)| (n, line.to_owned()))
        .collect()
}

/// Parses and enumerates one expression, discarding the result line.
pub fn summarize(raw: &str, width: BitWidth) -> Result<Summary> {
    let mut expr = Expression::parse(raw)?;
    let fingerprint = expr.fingerprint(width, &mut io::sink())?;
    Ok(Summary {
        canonical: expr.render(),
        variables: expr.variable_count(),
        slots: expr.slots(),
        fingerprint,
    })
}

pub fn run(expressions: &[(usize, String)], width: BitWidth, parallel: bool) -> Vec<BatchEntry> {
    let process = |(line, raw): &(usize, String)| {
        let result = summarize(raw, width);
        if let Err(e) = &result {
            warn!("line {}: {:?}: {}", line, raw, e);
        }
        BatchEntry {
            line: *line,
            raw: raw.clone(),
            result,
        }
    };

    let entries: Vec<BatchEntry> = if parallel {
        expressions.par_iter().map(process).collect()
    } else {
        expressions.iter().map(process).collect()
    };

    debug!(
        "batch: {} expressions, {} failed",
        entries.len(),
        entries.iter().filter(|e| e.result.is_err()).count()
    );
    entries
}

/// Groups successful entries by digest, in order of first appearance.
pub fn group(entries: &[BatchEntry]) -> Vec<Group> {
    let mut index: HashMap<[u8; 16], usize> = HashMap::new();
    let mut groups: Vec<Group> = Vec::new();

    for (i, entry) in entries.iter().enumerate() {
        let Ok(summary) = &entry.result else {
            continue;
        };
        let digest = *summary.fingerprint.digest();
        match index.get(&digest) {
            Some(&g) => groups[g].members.push(i),
            None => {
                index.insert(digest, groups.len());
                groups.push(Group {
                    fingerprint: summary.fingerprint,
                    members: vec![i],
                });
            }
        }
    }
    groups
}

/// First failure of a batch, if any.
pub fn first_error(entries: &[BatchEntry]) -> Option<(usize, &Error)> {
    entries
        .iter()
        .find_map(|e| e.result.as_ref().err().map(|err| (e.line, err)))
}

//! Source text normalization ahead of validation and parsing.

use log::debug;

use crate::classify::{is_binary_operator, is_whitespace};

/// Rewrites operators while keeping whitespace in place.
///
/// - a `-` that opens the expression or follows a binary operator becomes
///   the unary minus marker `` ` ``;
/// - a run of adjacent `<` (or `>`) collapses to a single shift character.
///
/// Keeping whitespace lets the validator tell `a b` apart from `ab`.
pub fn normalize(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut last_ch: Option<char> = None;
    let mut last_emitted: Option<char> = None;

    for ch in raw.chars() {
        if is_whitespace(ch) {
            out.push(ch);
            last_ch = Some(ch);
            continue;
        }

        let ch = match (ch, last_emitted) {
            ('-', None) => '`',
            ('-', Some(prev)) if is_binary_operator(prev) => '`',
            _ => ch,
        };

        if matches!((last_ch, ch), (Some('<'), '<') | (Some('>'), '>')) {
            last_ch = Some(ch);
            continue;
        }

        out.push(ch);
        last_emitted = Some(ch);
        last_ch = Some(ch);
    }

    out
}

/// Normalizes `raw` and strips all whitespace.
pub fn clean(raw: &str) -> String {
    let cleaned: String = normalize(raw).chars().filter(|&c| !is_whitespace(c)).collect();
    debug!("clean({:?}) -> {:?}", raw, cleaned);
    cleaned
}

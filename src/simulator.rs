//! Simulation mode: a quick diagnostic pass over a source file.
//!
//! This does not use the compiler pipeline. It splits the text on
//! parentheses and spaces only and treats the last piece as the program's
//! return value, reading it the way C's `atoi` would. Newlines are not
//! delimiters, so a trailing newline is its own piece and reads as 0.
use regex::Regex;

#[derive(Clone, PartialEq, Eq, Debug)]
pub struct Simulation {
    pub text: String,
    pub len: usize,
    pub value: i64,
}

pub fn simulate(source: &[u8]) -> Simulation {
    let delimiters = Regex::new(r"[() ]+").expect("delimiter pattern is valid");
    let text = String::from_utf8_lossy(source).into_owned();

    let value = delimiters
        .split(&text)
        .filter(|piece| !piece.is_empty())
        .last()
        .map(atoi)
        .unwrap_or(0);

    debug!("simulated {} byte(s), result {}", source.len(), value);
    Simulation { text, len: source.len(), value }
}

/// The leading integer of `piece` after any whitespace, or 0 if there is
/// none or it overflows.
fn atoi(piece: &str) -> i64 {
    let leading = Regex::new(r"^\s*([+-]?[0-9]+)").expect("integer pattern is valid");
    leading
        .captures(piece)
        .and_then(|caps| caps.get(1))
        .and_then(|m| m.as_str().parse().ok())
        .unwrap_or(0)
}

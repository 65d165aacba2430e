//! Identifier casing

use regex::Regex;
use std::sync::OnceLock;

fn separators() -> &'static Regex {
    static SEPARATORS: OnceLock<Regex> = OnceLock::new();
    SEPARATORS.get_or_init(|| Regex::new(r"[^A-Za-z0-9]+").expect("separator pattern is valid"))
}

/// Convert a free-form title to camelCase.
///
/// Runs of non-alphanumeric characters separate words. The first word is
/// lower-cased; every following word gets an upper-case first letter and a
/// lower-cased remainder, so `"My Cool API"` becomes `"myCoolApi"`.
pub fn to_camel_case(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    for (i, word) in separators()
        .split(s)
        .filter(|w| !w.is_empty())
        .enumerate()
    {
        if i == 0 {
            result.push_str(&lower_first(word));
        } else {
            result.push_str(&capitalize(word));
        }
    }
    result
}

fn lower_first(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        None => String::new(),
        Some(first) => first.to_lowercase().chain(chars).collect(),
    }
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        None => String::new(),
        Some(first) => {
            let mut out = first.to_uppercase().to_string();
            out.push_str(&chars.as_str().to_lowercase());
            out
        }
    }
}

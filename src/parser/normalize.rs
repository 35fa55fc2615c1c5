//! Run-level text normalization.
//!
//! A trimmed-down relative of a full cleanup pipeline: only the steps that
//! are safe on a single run of text and that keep headings comparable
//! across producers.

use std::sync::OnceLock;

use regex::Regex;
use unicode_normalization::UnicodeNormalization;

const LIGATURES: [(char, &str); 7] = [
    ('\u{FB00}', "ff"),
    ('\u{FB01}', "fi"),
    ('\u{FB02}', "fl"),
    ('\u{FB03}', "ffi"),
    ('\u{FB04}', "ffl"),
    ('\u{FB05}', "st"),
    ('\u{FB06}', "st"),
];

fn whitespace_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"[\s\u{00A0}]+").expect("static regex"))
}

/// Normalize the text of one run.
///
/// NFC normalization, ligature expansion, removal of control and
/// replacement characters, and collapsing of whitespace runs into a single
/// space. Leading/trailing whitespace is kept as a single space so that
/// span joining can still see word boundaries.
pub fn normalize_run_text(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.nfc() {
        if let Some((_, expanded)) = LIGATURES.iter().find(|(lig, _)| *lig == c) {
            out.push_str(expanded);
        } else if c == '\u{FFFD}' || (c.is_control() && !c.is_whitespace()) {
            continue;
        } else {
            out.push(c);
        }
    }
    whitespace_regex().replace_all(&out, " ").into_owned()
}

/// Check if a character belongs to a script written without word spaces.
///
/// Chinese and Japanese don't use spaces between words, but Korean does.
pub fn is_spaceless_script_char(c: char) -> bool {
    let code = c as u32;

    // CJK Unified Ideographs and extensions
    (0x4E00..=0x9FFF).contains(&code)
    || (0x3400..=0x4DBF).contains(&code)
    || (0x20000..=0x2EBEF).contains(&code)
    // Hiragana, Katakana
    || (0x3040..=0x30FF).contains(&code)
    // CJK Symbols and Punctuation
    || (0x3000..=0x303F).contains(&code)
}

/// Join two pieces of text that belong to the same run, inserting a word
/// space only where one is missing.
pub fn join_with_space(left: &mut String, right: &str) {
    let left_ends_space = left.ends_with(char::is_whitespace);
    let right_starts_space = right.starts_with(char::is_whitespace);
    let spaceless = matches!(
        (left.chars().last(), right.chars().next()),
        (Some(a), Some(b)) if is_spaceless_script_char(a) && is_spaceless_script_char(b)
    );
    if !left.is_empty() && !left_ends_space && !right_starts_space && !spaceless {
        left.push(' ');
    }
    left.push_str(right);
}

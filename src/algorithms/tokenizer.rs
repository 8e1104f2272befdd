use std::collections::HashSet;
use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

pub const MIN_TOKEN_LEN: usize = 3;

pub type TokenSet = HashSet<String>;

/// Folds free text into a set of comparable tokens.
///
/// Text is lowercased, decomposed (NFD) with combining marks dropped, and
/// every character outside `[a-z0-9]` becomes a separator. Tokens shorter
/// than [`MIN_TOKEN_LEN`] are discarded.
pub fn tokenize(text: Option<&str>) -> TokenSet {
    let Some(text) = text else {
        return TokenSet::new();
    };

    let folded: String = text
        .to_lowercase()
        .nfd()
        .filter(|c| !is_combining_mark(*c))
        .map(|c| if c.is_ascii_lowercase() || c.is_ascii_digit() { c } else { ' ' })
        .collect();

    folded
        .split_whitespace()
        .filter(|token| token.len() >= MIN_TOKEN_LEN)
        .map(str::to_string)
        .collect()
}

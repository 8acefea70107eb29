use std::collections::BTreeSet;

/// Tokens shorter than this carry no signal ("de", "a", sizes like "xl").
pub const MIN_TOKEN_LEN: usize = 3;

/// ASCII case-fold, blank out everything but `[a-z0-9]` and whitespace, split and
/// keep tokens of at least [`MIN_TOKEN_LEN`] characters.
///
/// Only ASCII letters and digits survive: accented and non-Latin characters
/// act as separators.
pub fn tokenize(text: &str) -> BTreeSet<String> {
    let folded: String = text
        .to_ascii_lowercase()
        .chars()
        .map(|ch| {
            if ch.is_ascii_lowercase() || ch.is_ascii_digit() || ch.is_whitespace() {
                ch
            } else {
                ' '
            }
        })
        .collect();

    folded
        .split_whitespace()
        .filter(|token| token.chars().count() >= MIN_TOKEN_LEN)
        .map(str::to_string)
        .collect()
}

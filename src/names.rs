use unicode_normalization::UnicodeNormalization;

/// Canonical join key for a player name.
///
/// Accents are decomposed and dropped, then everything that is not an ASCII
/// letter or digit goes away and the rest is lowercased. Never fails: input
/// with nothing usable normalizes to an empty string.
pub fn normalize_name(input: &str) -> String {
    input
        .nfkd()
        .filter(|ch| ch.is_ascii_alphanumeric())
        .map(|ch| ch.to_ascii_lowercase())
        .collect()
}

/// Trimmed display form with inner whitespace collapsed.
pub fn display_name(input: &str) -> String {
    input.split_whitespace().collect::<Vec<_>>().join(" ")
}

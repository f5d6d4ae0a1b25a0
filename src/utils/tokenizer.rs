//! Word extraction shared by the index builder and phrase search.

/// Split `text` into normalized words: runs of word characters (ASCII
/// letters, digits, underscore), lowercased, with empty fragments dropped.
/// Position i of the returned vector is the token's position in the file.
pub fn tokenize(text: &str) -> Vec<String> {
    text.split(|c: char| !(c.is_ascii_alphanumeric() || c == '_'))
        .filter(|token| !token.is_empty())
        .map(|token| token.to_ascii_lowercase())
        .collect()
}

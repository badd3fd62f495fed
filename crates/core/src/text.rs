//! Text normalization applied at the ledger boundary.

/// Capitalize a display name: first character upper-cased, the rest lower-cased.
///
/// `"paracetamol 500MG"` becomes `"Paracetamol 500mg"`. Surrounding whitespace
/// is trimmed first.
pub fn capitalize(value: &str) -> String {
    let mut chars = value.trim().chars();
    match chars.next() {
        Some(first) => first
            .to_uppercase()
            .chain(chars.flat_map(char::to_lowercase))
            .collect(),
        None => String::new(),
    }
}

/// Case-insensitive substring match. An empty needle matches everything.
pub fn contains_ignore_case(haystack: &str, needle: &str) -> bool {
    if needle.is_empty() {
        return true;
    }
    haystack.to_lowercase().contains(&needle.to_lowercase())
}

//! Key folding for alias lookups
//!
//! Upstream responses spell the same point or aspect many ways: localized
//! names with accents, mixed case, spaces, hyphens or parentheses. All
//! lookup tables are keyed by the folded form produced here.

/// Fold a raw identifier into its lookup key: lowercase, accents stripped,
/// runs of separators collapsed to a single underscore, other punctuation
/// dropped.
///
/// `"Medio Cielo"` → `"medio_cielo"`, `"Lilith (media)"` → `"lilith_media"`.
pub fn fold_key(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut pending_sep = false;
    for c in raw.trim().chars() {
        let c = strip_accent(c.to_lowercase().next().unwrap_or(c));
        if c.is_alphanumeric() {
            if pending_sep && !out.is_empty() {
                out.push('_');
            }
            pending_sep = false;
            out.push(c);
        } else {
            // separators and punctuation both collapse into one underscore
            pending_sep = true;
        }
    }
    out
}

/// Map accented Latin letters onto their base letter. Covers the alphabets
/// seen in upstream localizations (Spanish, Portuguese, French).
fn strip_accent(c: char) -> char {
    match c {
        'á' | 'à' | 'ä' | 'â' | 'ã' | 'å' => 'a',
        'é' | 'è' | 'ë' | 'ê' => 'e',
        'í' | 'ì' | 'ï' | 'î' => 'i',
        'ó' | 'ò' | 'ö' | 'ô' | 'õ' => 'o',
        'ú' | 'ù' | 'ü' | 'û' => 'u',
        'ñ' => 'n',
        'ç' => 'c',
        other => other,
    }
}

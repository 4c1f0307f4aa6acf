//! Turkish-aware text normalization used for lookup and autocomplete keys.

/// Lowercase a single character using Turkish casing rules.
///
/// `I` maps to dotless `ı` and `İ` maps to `i`; everything else follows
/// Unicode lowercasing.
fn turkish_lower(ch: char) -> impl Iterator<Item = char> {
    let special = match ch {
        'I' => Some('ı'),
        'İ' => Some('i'),
        _ => None,
    };
    special
        .into_iter()
        .chain(special.is_none().then(|| ch.to_lowercase()).into_iter().flatten())
}

/// Collapse a lowercase Turkish letter onto its ASCII base letter.
fn fold_char(ch: char) -> char {
    match ch {
        'ı' => 'i',
        'ç' => 'c',
        'ş' => 's',
        'ğ' => 'g',
        'ü' => 'u',
        'ö' => 'o',
        'â' => 'a',
        'î' => 'i',
        'û' => 'u',
        other => other,
    }
}

/// Lowercase `input` with Turkish casing rules, keeping diacritics.
///
/// # Returns
/// The lowercased string, e.g. `"IŞIK"` → `"ışık"`.
pub fn turkish_lowercase(input: &str) -> String {
    input.chars().flat_map(turkish_lower).collect()
}

/// Produce the search key for `input`.
///
/// The key is Turkish-lowercased, trimmed, and has `ı/i ç/c ş/s ğ/g ü/u ö/o`
/// (plus circumflex vowels) collapsed so that queries typed without a Turkish
/// keyboard still match.
///
/// # Returns
/// The folded key, e.g. `"Çiğdem"` → `"cigdem"`.
pub fn fold_turkish(input: &str) -> String {
    input
        .trim()
        .chars()
        .flat_map(turkish_lower)
        .map(fold_char)
        .collect()
}

//! Tone-insensitive text helpers.
//!
//! Category URLs and free-text search both compare Vietnamese strings with
//! their diacritics removed, so "Tủ bếp" matches a search for "tu bep".

/// Base letters and every toned variant that folds onto them.
const TONE_TABLE: &[(char, &str)] = &[
    ('a', "àáạảãâầấậẩẫăằắặẳẵ"),
    ('e', "èéẹẻẽêềếệểễ"),
    ('i', "ìíịỉĩ"),
    ('o', "òóọỏõôồốộổỗơờớợởỡ"),
    ('u', "ùúụủũưừứựửữ"),
    ('y', "ỳýỵỷỹ"),
    ('d', "đ"),
    ('A', "ÀÁẠẢÃÂẦẤẬẨẪĂẰẮẶẲẴ"),
    ('E', "ÈÉẸẺẼÊỀẾỆỂỄ"),
    ('I', "ÌÍỊỈĨ"),
    ('O', "ÒÓỌỎÕÔỒỐỘỔỖƠỜỚỢỞỠ"),
    ('U', "ÙÚỤỦŨƯỪỨỰỬỮ"),
    ('Y', "ỲÝỴỶỸ"),
    ('D', "Đ"),
];

/// Combining marks left behind by decomposed input.
const COMBINING_MARKS: &[char] = &[
    '\u{0300}', '\u{0301}', '\u{0302}', '\u{0303}', '\u{0306}', '\u{0309}', '\u{031B}', '\u{0323}',
];

fn fold_char(ch: char) -> Option<char> {
    if ch.is_ascii() {
        return Some(ch);
    }
    if COMBINING_MARKS.contains(&ch) {
        return None;
    }
    TONE_TABLE
        .iter()
        .find(|(_, variants)| variants.contains(ch))
        .map_or(Some(ch), |(base, _)| Some(*base))
}

/// Remove Vietnamese diacritics, keeping letter case.
///
/// ```
/// use yotech_quote_core::strip_tones;
///
/// assert_eq!(strip_tones("Tủ bếp Đẹp"), "Tu bep Dep");
/// ```
#[must_use]
pub fn strip_tones(s: &str) -> String {
    s.chars().filter_map(fold_char).collect()
}

/// Category slug: tones stripped, whitespace runs replaced with `-`.
///
/// ```
/// use yotech_quote_core::slugify;
///
/// assert_eq!(slugify("Phòng  khách"), "Phong-khach");
/// ```
#[must_use]
pub fn slugify(s: &str) -> String {
    strip_tones(s.trim())
        .split_whitespace()
        .collect::<Vec<_>>()
        .join("-")
}

/// Lowercased, tone-stripped form used for search matching.
#[must_use]
pub fn search_key(s: &str) -> String {
    strip_tones(&s.to_lowercase())
}

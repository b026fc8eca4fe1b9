//! Text normalization for identity comparison.
//!
//! Comparison keys fold German umlauts to their digraph spellings, strip
//! remaining combining diacritics, lower-case, and collapse whitespace, so
//! that `"Förste"`, `"Foerste"`, and `" FOERSTE "` all produce the same key.
//! The key is only ever used for comparison; the original display string is
//! preserved on the stored agent.

use unicode_normalization::UnicodeNormalization;

/// Compute the identity comparison key for a display name.
///
/// Steps, in order: fold umlauts and sharp s to digraphs (`ö` → `oe`,
/// `ä` → `ae`, `ü` → `ue`, `ß` → `ss`, upper-case forms included), strip
/// any remaining combining marks, lower-case, trim, and collapse internal
/// runs of whitespace to single spaces.
///
/// Total function: never fails, empty input yields an empty key. Composed
/// (`U+00F6`) and decomposed (`o` + `U+0308`) spellings fold identically.
///
/// # Examples
///
/// ```
/// use metanorm::normalize::normalize_name;
///
/// assert_eq!(normalize_name("Förste, Christoph"), "foerste, christoph");
/// assert_eq!(normalize_name("FOERSTE,  Christoph "), "foerste, christoph");
/// assert_eq!(normalize_name("Weiß"), "weiss");
/// ```
#[must_use]
pub fn normalize_name(raw: &str) -> String {
    const COMBINING_DIAERESIS: char = '\u{0308}';

    let mut folded = String::with_capacity(raw.len());
    let mut chars = raw.nfd().peekable();

    while let Some(c) = chars.next() {
        match c {
            'o' | 'a' | 'u' | 'O' | 'A' | 'U' if chars.peek() == Some(&COMBINING_DIAERESIS) => {
                chars.next();
                folded.push(c);
                folded.push('e');
            },
            'ß' | 'ẞ' => folded.push_str("ss"),
            // Remaining combining marks carry no identity information
            c if is_combining_mark(c) => {},
            c => folded.push(c),
        }
    }

    collapse_whitespace(&folded.to_lowercase())
}

/// Trim surrounding whitespace and collapse internal runs to single spaces.
///
/// Used on its own for institution-name deduplication, where case folding
/// happens separately but spacing must not affect identity.
#[must_use]
pub fn collapse_whitespace(raw: &str) -> String {
    raw.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn is_combining_mark(c: char) -> bool {
    matches!(c, '\u{0300}'..='\u{036F}' | '\u{1AB0}'..='\u{1AFF}' | '\u{20D0}'..='\u{20FF}')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_umlaut_digraph_equivalence() {
        assert_eq!(normalize_name("Förste"), normalize_name("Foerste"));
        assert_eq!(normalize_name("Müller"), normalize_name("Mueller"));
        assert_eq!(normalize_name("Bär"), normalize_name("Baer"));
        assert_eq!(normalize_name("Böhm"), normalize_name("Boehm"));
    }

    #[test]
    fn test_uppercase_umlauts() {
        assert_eq!(normalize_name("Özil"), normalize_name("Oezil"));
        assert_eq!(normalize_name("Ärger"), normalize_name("Aerger"));
        assert_eq!(normalize_name("Übel"), normalize_name("Uebel"));
    }

    #[test]
    fn test_sharp_s() {
        assert_eq!(normalize_name("Weiß"), "weiss");
        assert_eq!(normalize_name("Weiss"), "weiss");
    }

    #[test]
    fn test_case_and_whitespace() {
        assert_eq!(normalize_name("  Förste,   Christoph  "), "foerste, christoph");
        assert_eq!(normalize_name("FOERSTE, CHRISTOPH"), "foerste, christoph");
    }

    #[test]
    fn test_decomposed_diaeresis() {
        // o followed by U+0308 combining diaeresis
        let decomposed = "Fo\u{0308}rste";
        assert_eq!(normalize_name(decomposed), normalize_name("Foerste"));
    }

    #[test]
    fn test_other_diacritics_stripped() {
        assert_eq!(normalize_name("Renée"), normalize_name("Renee"));
        assert_eq!(normalize_name("Ñuñez"), normalize_name("Nunez"));
    }

    #[test]
    fn test_empty_input() {
        assert_eq!(normalize_name(""), "");
        assert_eq!(normalize_name("   "), "");
    }

    #[test]
    fn test_collapse_whitespace() {
        assert_eq!(collapse_whitespace("GFZ  Potsdam"), "GFZ Potsdam");
        assert_eq!(collapse_whitespace("  GFZ Potsdam "), "GFZ Potsdam");
    }
}

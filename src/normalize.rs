//! Unicode text normalization.
//!
//! The single primitive behind the text-normalization transform: NFKC
//! normalization of a string. NFKC is a fixed point — normalizing
//! already-normalized text returns an equal string — and the transform
//! layer relies on that to stay quiet under its own mutation events, so
//! the property is pinned down by tests here rather than assumed.

use unicode_normalization::UnicodeNormalization;

/// Returns the NFKC-normalized form of `text`.
///
/// Pure and total: no side effects, no failure modes.
pub fn nfkc(text: &str) -> String {
    text.nfkc().collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nfkc_folds_compatibility_characters() {
        // Fullwidth forms and ligatures fold to their plain equivalents.
        assert_eq!(nfkc("Ｈｅｌｌｏ"), "Hello");
        assert_eq!(nfkc("ﬁle"), "file");
        assert_eq!(nfkc("№"), "No");
    }

    #[test]
    fn test_nfkc_is_idempotent() {
        let samples = ["Ｈｅｌｌｏ ｗｏｒｌｄ", "ﬁﬂ ligatures", "ℌ𝔢𝔩𝔩𝔬", "plain ascii", "½ + ¼"];
        for s in samples {
            let once = nfkc(s);
            assert_eq!(nfkc(&once), once, "nfkc must be a fixed point for {s:?}");
        }
    }

    #[test]
    fn test_nfkc_leaves_normalized_text_equal() {
        let already = "plain text, nothing to fold";
        assert_eq!(nfkc(already), already);
    }
}

//! Text normalization for OCR output

/// Strip everything except ASCII letters, digits and whitespace, then
/// collapse whitespace runs to single spaces and trim the ends.
///
/// `clean(&clean(t)) == clean(t)` for every input.
pub fn clean(text: &str) -> String {
    let kept: String = text
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || c.is_whitespace())
        .collect();
    kept.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strips_punctuation() {
        assert_eq!(clean("Lay's® Magic-Masala!!"), "Lays MagicMasala");
    }

    #[test]
    fn test_collapses_whitespace() {
        assert_eq!(clean("  Good \t Day\n\nCashew  "), "Good Day Cashew");
    }

    #[test]
    fn test_noise_only_is_empty() {
        assert_eq!(clean("|~ _ ,."), "");
        assert_eq!(clean(""), "");
    }

    #[test]
    fn test_idempotent() {
        let samples = [
            "Himalaya  Baby-Pants (XL) 54 pants",
            "  ##  ",
            "Miss & Chief",
            "Café  crème\u{00a0}100g",
            "\tTEDHE\nMEDHE\r\n",
        ];
        for sample in samples {
            let once = clean(sample);
            assert_eq!(clean(&once), once, "not idempotent for {:?}", sample);
        }
    }

    #[test]
    fn test_non_ascii_letters_removed() {
        assert_eq!(clean("Café"), "Caf");
    }
}

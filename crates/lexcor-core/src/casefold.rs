// Lowercasing and letter-overlap helpers.
//
// Every frequency lookup and edit-distance call in the pipeline happens on
// lowercased code-point sequences; the raw spelling only survives into the
// output records. Lowercasing is the full Unicode mapping (one code point
// may expand to several), matching how the frequency tables are keyed.

/// Lowercase a string into its code-point sequence.
pub fn lower_chars(s: &str) -> Vec<char> {
    s.chars().flat_map(char::to_lowercase).collect()
}

/// Lowercase a string into a new `String`.
pub fn lower(s: &str) -> String {
    s.to_lowercase()
}

/// First-letter overlap: both sequences start with the same code point.
pub fn first_letter_overlap(ls1: &[char], ls2: &[char]) -> bool {
    match (ls1.first(), ls2.first()) {
        (Some(a), Some(b)) => a == b,
        _ => false,
    }
}

/// Last-two-letter overlap: both sequences are at least two code points
/// long and agree on their final two code points.
pub fn last_two_overlap(ls1: &[char], ls2: &[char]) -> bool {
    ls1.len() > 1
        && ls2.len() > 1
        && ls1[ls1.len() - 1] == ls2[ls2.len() - 1]
        && ls1[ls1.len() - 2] == ls2[ls2.len() - 2]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lower_chars_folds_and_decomposes() {
        assert_eq!(lower_chars("Huis"), vec!['h', 'u', 'i', 's']);
        // The sharp s expands under full lowercasing of the uppercase form.
        assert_eq!(lower_chars("ẞ"), vec!['ß']);
    }

    #[test]
    fn first_letter_overlap_on_lowered_forms() {
        assert!(first_letter_overlap(&lower_chars("huis"), &lower_chars("huys")));
        assert!(!first_letter_overlap(&lower_chars("huis"), &lower_chars("thuis")));
        assert!(!first_letter_overlap(&[], &lower_chars("a")));
    }

    #[test]
    fn last_two_overlap_needs_two_code_points() {
        assert!(last_two_overlap(&lower_chars("straat"), &lower_chars("staat")));
        assert!(!last_two_overlap(&lower_chars("huis"), &lower_chars("huys")));
        assert!(!last_two_overlap(&lower_chars("a"), &lower_chars("ba")));
    }
}

// N-gram alignment analysis.
//
// Bucket entries may be `_`-joined n-grams. When two equally long n-grams
// differ in exactly one position, that differing part is the actual
// correction at work; if it is short and not already lexical it becomes a
// disambiguation hint in the ambiguity tables. The return value is the
// `ngramPoints` field of the emitted record.

use std::sync::Mutex;

use lexcor_core::casefold::lower;
use lexcor_core::NGRAM_SEPARATOR;

use super::AmbiguityTables;
use crate::tables::FreqTables;
use crate::{split_nonempty, Verbosity};

/// Differing parts shorter than this feed the ambiguity tables.
const SHORT_PART_LIMIT: usize = 6;

/// Compare two n-gram strings part-wise. Returns 1 when they are equally
/// long multi-grams differing in exactly one non-lexical part, 0 otherwise.
pub(crate) fn analyze_ngrams(
    ngram1: &str,
    ngram2: &str,
    freqs: &FreqTables,
    artifreq: u64,
    verbosity: Verbosity,
    ambiguity: &Mutex<AmbiguityTables>,
) -> u32 {
    let parts1 = split_nonempty(ngram1, NGRAM_SEPARATOR);
    let parts2 = split_nonempty(ngram2, NGRAM_SEPARATOR);
    if parts1.len() == 1 || parts1.len() != parts2.len() {
        return 0;
    }
    let mut diff: Option<(&str, &str)> = None;
    for (p1, p2) in parts1.iter().zip(parts2.iter()) {
        if p1 == p2 {
            continue;
        }
        if diff.is_some() {
            // More than one differing position.
            return 0;
        }
        diff = Some((p1, p2));
    }
    let Some((diff1, diff2)) = diff else {
        return 0;
    };
    if let Some(low) = freqs.low_freq_opt(&lower(diff1)) {
        if low >= artifreq {
            // Already a frequent word; translating won't help.
            return 0;
        }
    }
    if verbosity.at_least(2) {
        eprintln!("check candidate: {diff1} in n-grams pair: {ngram1} # {ngram2}");
    }
    if diff1.chars().count() < SHORT_PART_LIMIT {
        let pair = format!("{diff1}~{diff2}");
        let mut tables = ambiguity.lock().expect("lock poisoned");
        tables
            .pairs
            .entry(pair.clone())
            .or_default()
            .insert(format!("{ngram1}~{ngram2}"));
        *tables.counts.entry(pair).or_insert(0) += 1;
    }
    1
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tables::FreqTables;

    fn freqs(entries: &[(&str, u64)]) -> FreqTables {
        let mut t = FreqTables::empty();
        for (w, f) in entries {
            t.add_line(&format!("{w} {f}"), 100);
        }
        t
    }

    fn run(n1: &str, n2: &str, t: &FreqTables) -> (u32, AmbiguityTables) {
        let ambiguity = Mutex::new(AmbiguityTables::default());
        let point = analyze_ngrams(n1, n2, t, 100, Verbosity(0), &ambiguity);
        (point, ambiguity.into_inner().expect("lock"))
    }

    #[test]
    fn aligned_bigram_pair_scores_a_point() {
        let t = freqs(&[("het", 500), ("huys", 3), ("huis", 400)]);
        let (point, tables) = run("het_huys", "het_huis", &t);
        assert_eq!(point, 1);
        assert_eq!(tables.counts.get("huys~huis"), Some(&1));
        let origins = tables.pairs.get("huys~huis").expect("pair recorded");
        assert!(origins.contains("het_huys~het_huis"));
    }

    #[test]
    fn unigrams_and_length_mismatches_score_nothing() {
        let t = freqs(&[]);
        assert_eq!(run("huys", "huis", &t).0, 0);
        assert_eq!(run("het_huys", "huis", &t).0, 0);
        assert_eq!(run("een_heel_huys", "het_huis", &t).0, 0);
    }

    #[test]
    fn more_than_one_difference_scores_nothing() {
        let t = freqs(&[]);
        let (point, tables) = run("het_oude_huys", "een_oude_huis", &t);
        assert_eq!(point, 0);
        assert!(tables.counts.is_empty());
    }

    #[test]
    fn identical_ngrams_score_nothing() {
        let t = freqs(&[]);
        assert_eq!(run("het_huis", "het_huis", &t).0, 0);
    }

    #[test]
    fn lexical_differing_part_scores_nothing() {
        let t = freqs(&[("huis", 400)]);
        let (point, tables) = run("het_huis", "het_huys", &t);
        assert_eq!(point, 0);
        assert!(tables.counts.is_empty());
    }

    #[test]
    fn long_differing_part_scores_without_hint() {
        let t = freqs(&[]);
        let (point, tables) = run("de_langdurige", "de_langdurihe", &t);
        assert_eq!(point, 1);
        assert!(tables.counts.is_empty());
    }
}

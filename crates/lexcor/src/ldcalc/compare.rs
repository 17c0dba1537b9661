// Bucket pair scoring: set comparison and the transposition scan.
//
// Both paths share the same record shape and orientation rule; they differ
// in which pairs they draw, which frequency gates apply, and where the
// edit-distance gate sits. The transposition scan runs its ngram analysis
// before the distance gate, so ambiguity hints accumulate even for pairs
// the gate rejects. That asymmetry is part of the stage's contract.

use std::collections::BTreeSet;
use std::io::Write;
use std::sync::atomic::Ordering;

use lexcor_core::casefold::{first_letter_overlap, last_two_overlap, lower, lower_chars};
use lexcor_core::levenshtein;

use super::{ngram::analyze_ngrams, LdCalc};

/// One side of a candidate pair: the raw spelling with its exact and
/// lowercased frequencies, and the lowered code points.
struct Form<'a> {
    raw: &'a str,
    freq: u64,
    low_freq: u64,
    lowered: &'a [char],
}

/// A pair oriented so the higher-`low_freq` side is the candidate.
/// On a tie the second form wins, keeping the input order.
struct Oriented<'a> {
    variant: &'a Form<'a>,
    candidate: &'a Form<'a>,
    canon_freq: u64,
    swapped: bool,
}

fn orient<'a>(f1: &'a Form<'a>, f2: &'a Form<'a>) -> Oriented<'a> {
    if f1.low_freq > f2.low_freq {
        Oriented {
            variant: f2,
            candidate: f1,
            canon_freq: f1.low_freq,
            swapped: true,
        }
    } else {
        Oriented {
            variant: f1,
            candidate: f2,
            canon_freq: f2.low_freq,
            swapped: false,
        }
    }
}

/// Render the fourteen-field record. `confusion_field` is the confusion
/// key for set comparison and the `~0` transposition marker (empty slot
/// plus a literal class `0`) for the transposition path.
#[allow(clippy::too_many_arguments)]
fn format_record(
    pair: &Oriented,
    confusion_field: &str,
    ld: usize,
    cls: usize,
    canon: u8,
    fl: u8,
    ll: u8,
    khc: u8,
    ngram_point: u32,
) -> String {
    format!(
        "{}~{}~{}~{}~{}~{}~{confusion_field}~{ld}~{cls}~{canon}~{fl}~{ll}~{khc}~{ngram_point}",
        pair.variant.raw,
        pair.variant.freq,
        pair.variant.low_freq,
        pair.candidate.raw,
        pair.candidate.freq,
        pair.candidate.low_freq,
    )
}

impl<W: Write + Send> LdCalc<'_, W> {
    /// Score every ordered pair across two buckets one confusion apart.
    pub(crate) fn compare_sets(
        &self,
        confusion_key: &str,
        bucket1: &BTreeSet<String>,
        bucket2: &BTreeSet<String>,
        is_khc: bool,
        is_diac: bool,
    ) {
        let verbosity = self.cfg.verbosity;
        for str1 in bucket1 {
            let Some(freq1) = self.freqs.freq(str1) else {
                if verbosity.at_least(2) {
                    eprintln!("not found in frequency file: {str1}");
                }
                continue;
            };
            let ls1 = lower_chars(str1);
            let low1 = self.freqs.low_freq(&lower(str1));
            for str2 in bucket2 {
                let Some(freq2) = self.freqs.freq(str2) else {
                    if verbosity.at_least(2) {
                        eprintln!("not found in frequency file: {str2}");
                    }
                    continue;
                };
                self.comparisons.fetch_add(1, Ordering::Relaxed);
                let ls2 = lower_chars(str2);
                let ld = levenshtein::distance(&ls1, &ls2);
                if ld > self.cfg.ld_limit && !(is_khc && self.cfg.no_khc_ld) {
                    if verbosity.at_least(3) {
                        eprintln!("LD too high: {str1},{str2}");
                    }
                    continue;
                }
                let low2 = self.freqs.low_freq(&lower(str2));
                let f1 = Form {
                    raw: str1,
                    freq: freq1,
                    low_freq: low1,
                    lowered: &ls1,
                };
                let f2 = Form {
                    raw: str2,
                    freq: freq2,
                    low_freq: low2,
                    lowered: &ls2,
                };
                let pair = orient(&f1, &f2);
                if !self.alphabet.is_clean(pair.candidate.lowered) {
                    if verbosity.at_least(2) {
                        eprintln!("ignore dirty candidate {}", lower(pair.candidate.raw));
                    }
                    continue;
                }
                if pair.variant.low_freq >= self.cfg.artifreq && !is_diac {
                    // The variant side is already lexical.
                    if verbosity.at_least(3) {
                        eprintln!("lexical word {}", pair.variant.raw);
                    }
                    continue;
                }
                let ngram_point = if pair.swapped {
                    analyze_ngrams(str2, str1, self.freqs, self.cfg.artifreq, verbosity, &self.ambiguity)
                } else {
                    analyze_ngrams(str1, str2, self.freqs, self.cfg.artifreq, verbosity, &self.ambiguity)
                };
                let cls = ls1.len().max(ls2.len()) - ld;
                let canon = u8::from(pair.canon_freq >= self.cfg.artifreq);
                let fl = u8::from(first_letter_overlap(&ls1, &ls2));
                let ll = u8::from(last_two_overlap(&ls1, &ls2));
                let khc = u8::from(is_khc);
                let record = format_record(
                    &pair,
                    confusion_key,
                    ld,
                    cls,
                    canon,
                    fl,
                    ll,
                    khc,
                    ngram_point,
                );
                let mut out = self.out.lock().expect("lock poisoned");
                let _ = writeln!(out, "{record}");
            }
        }
    }

    /// Score every unordered pair within one bucket: same anagram key, so
    /// any distance-2 pair is a candidate transposition. At least the
    /// more frequent side must be lexical; two lexical sides only pass for
    /// diacritic confusions.
    pub(crate) fn handle_transpositions(
        &self,
        bucket: &BTreeSet<String>,
        is_khc: bool,
        is_diac: bool,
    ) {
        let verbosity = self.cfg.verbosity;
        let words: Vec<&String> = bucket.iter().collect();
        for (n, &str1) in words.iter().enumerate() {
            let Some(freq1) = self.freqs.freq(str1) else {
                if verbosity.at_least(2) {
                    eprintln!("not found in frequency file: {str1}");
                }
                continue;
            };
            let ls1 = lower_chars(str1);
            let low1 = self.freqs.low_freq(&lower(str1));
            for &str2 in &words[n + 1..] {
                let Some(freq2) = self.freqs.freq(str2) else {
                    if verbosity.at_least(2) {
                        eprintln!("not found in frequency file: {str2}");
                    }
                    continue;
                };
                let ls2 = lower_chars(str2);
                let low2 = self.freqs.low_freq(&lower(str2));
                if low1 >= self.cfg.artifreq && low2 >= self.cfg.artifreq && !is_diac {
                    continue;
                }
                // The more frequent side must reach the floor.
                if low1 >= low2 {
                    if low1 < self.cfg.artifreq {
                        continue;
                    }
                } else if low2 < self.cfg.artifreq {
                    continue;
                }
                let f1 = Form {
                    raw: str1,
                    freq: freq1,
                    low_freq: low1,
                    lowered: &ls1,
                };
                let f2 = Form {
                    raw: str2,
                    freq: freq2,
                    low_freq: low2,
                    lowered: &ls2,
                };
                let pair = orient(&f1, &f2);
                if !self.alphabet.is_clean(pair.candidate.lowered) {
                    if verbosity.at_least(2) {
                        eprintln!("ignore dirty candidate {}", lower(pair.candidate.raw));
                    }
                    continue;
                }
                let ngram_point = if pair.swapped {
                    analyze_ngrams(str2, str1, self.freqs, self.cfg.artifreq, verbosity, &self.ambiguity)
                } else {
                    analyze_ngrams(str1, str2, self.freqs, self.cfg.artifreq, verbosity, &self.ambiguity)
                };
                let ld = levenshtein::distance(&ls1, &ls2);
                if ld != 2 && !(is_khc && self.cfg.no_khc_ld) {
                    if verbosity.at_least(2) {
                        eprintln!("LD != 2: {str1},{str2}");
                    }
                    continue;
                }
                let cls = ls1.len().max(ls2.len()) - ld;
                let canon = u8::from(pair.canon_freq >= self.cfg.artifreq);
                let fl = u8::from(first_letter_overlap(&ls1, &ls2));
                let ll = u8::from(last_two_overlap(&ls1, &ls2));
                let khc = u8::from(is_khc);
                let record =
                    format_record(&pair, "~0", ld, cls, canon, fl, ll, khc, ngram_point);
                self.transpositions.fetch_add(1, Ordering::Relaxed);
                let mut out = self.out.lock().expect("lock poisoned");
                let _ = writeln!(out, "{record}");
                if verbosity.at_least(3) {
                    eprintln!("transposition result: {record}");
                }
            }
        }
    }
}

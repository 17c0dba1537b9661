// Corpus frequency tables.
//
// The clean file lists one `word frequency` pair per line. Two tables are
// built from it: exact spellings with their counts, and a lowercased table
// aggregated over all case variants of a form. The aggregation treats the
// artificial frequency floor specially so that the synthetic mass of a
// validated entry is only counted once per lowercase form.

use std::io::BufRead;
use std::path::Path;

use hashbrown::{HashMap, HashSet};

use crate::tables::{data_err, open_lines, read_err};
use crate::LexcorError;

/// Exact and lowercased word frequencies from a clean file.
pub struct FreqTables {
    freq: HashMap<String, u64>,
    low_freq: HashMap<String, u64>,
    /// Lines that did not split into exactly two fields, or whose
    /// frequency field did not parse.
    pub skipped: usize,
}

impl FreqTables {
    /// An empty table set, filled through [`FreqTables::add_line`].
    pub fn empty() -> Self {
        FreqTables {
            freq: HashMap::new(),
            low_freq: HashMap::new(),
            skipped: 0,
        }
    }

    /// Load a clean file.
    ///
    /// For every entry with `freq >= artifreq`, the first contribution to
    /// its lowercase form stores `freq` unchanged and each further one adds
    /// `freq - artifreq`; entries below the floor add in full.
    pub fn load(path: &Path, artifreq: u64) -> Result<Self, LexcorError> {
        let reader = open_lines(path)?;
        let mut tables = FreqTables {
            freq: HashMap::new(),
            low_freq: HashMap::new(),
            skipped: 0,
        };
        for line in reader.lines() {
            let line = line.map_err(|e| read_err(path, e))?;
            tables.add_line(&line, artifreq);
        }
        Ok(tables)
    }

    /// Record one `word frequency` line; malformed lines bump `skipped`.
    pub fn add_line(&mut self, line: &str, artifreq: u64) {
        let fields: Vec<&str> = line.split_whitespace().collect();
        if fields.len() != 2 {
            self.skipped += 1;
            return;
        }
        let Ok(freq) = fields[1].parse::<u64>() else {
            self.skipped += 1;
            return;
        };
        self.add(fields[0], freq, artifreq);
    }

    fn add(&mut self, word: &str, freq: u64, artifreq: u64) {
        self.freq.insert(word.to_string(), freq);
        let lowered = word.to_lowercase();
        if freq >= artifreq {
            let entry = self.low_freq.entry(lowered).or_insert(0);
            if *entry == 0 {
                *entry = freq;
            } else {
                *entry += freq - artifreq;
            }
        } else {
            *self.low_freq.entry(lowered).or_insert(0) += freq;
        }
    }

    /// Exact-spelling frequency, if the form occurs in the corpus.
    pub fn freq(&self, word: &str) -> Option<u64> {
        self.freq.get(word).copied()
    }

    /// Aggregated frequency of a lowercase form; 0 when absent.
    pub fn low_freq(&self, lowered: &str) -> u64 {
        self.low_freq.get(lowered).copied().unwrap_or(0)
    }

    /// Aggregated frequency of a lowercase form, `None` when the form
    /// never occurred. The ngram heuristic needs the distinction.
    pub fn low_freq_opt(&self, lowered: &str) -> Option<u64> {
        self.low_freq.get(lowered).copied()
    }

    /// Number of exact spellings read.
    pub fn len(&self) -> usize {
        self.freq.len()
    }

    pub fn is_empty(&self) -> bool {
        self.freq.is_empty()
    }
}

/// Load the validated part of a lexicon file: lowercased words whose
/// frequency reaches `artifreq`.
///
/// The lexicon is sorted descending by frequency, so reading stops at the
/// first entry below the floor. Comment lines (`#`) and empty lines are
/// skipped; a line without two fields or with an unparsable frequency is a
/// data error.
pub fn load_validated_lexicon(path: &Path, artifreq: u64) -> Result<HashSet<String>, LexcorError> {
    let reader = open_lines(path)?;
    let mut valid = HashSet::new();
    let mut line_nr = 0u64;
    for line in reader.lines() {
        let line = line.map_err(|e| read_err(path, e))?;
        line_nr += 1;
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let fields: Vec<&str> = line.split_whitespace().collect();
        if fields.len() < 2 {
            return Err(data_err(path, line_nr, format!("invalid line '{line}'")));
        }
        let freq: u64 = fields[1]
            .parse()
            .map_err(|_| data_err(path, line_nr, format!("invalid frequency in '{line}'")))?;
        if freq >= artifreq {
            valid.insert(fields[0].to_lowercase());
        } else {
            break;
        }
    }
    Ok(valid)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tables_from(lines: &[&str], artifreq: u64) -> FreqTables {
        let mut t = FreqTables {
            freq: HashMap::new(),
            low_freq: HashMap::new(),
            skipped: 0,
        };
        for line in lines {
            t.add_line(line, artifreq);
        }
        t
    }

    #[test]
    fn exact_and_lowered_tables() {
        let t = tables_from(&["Huis 10", "huis 3"], 0);
        assert_eq!(t.freq("Huis"), Some(10));
        assert_eq!(t.freq("huis"), Some(3));
        assert_eq!(t.freq("HUIS"), None);
        assert_eq!(t.low_freq("huis"), 13);
    }

    #[test]
    fn artificial_mass_counted_once() {
        // Both case variants carry the synthetic floor of 100; the second
        // contribution only adds its mass above the floor.
        let t = tables_from(&["huis 110", "Huis 105"], 100);
        assert_eq!(t.low_freq("huis"), 115);
    }

    #[test]
    fn below_floor_contributions_add_in_full() {
        let t = tables_from(&["huys 7", "Huys 5"], 100);
        assert_eq!(t.low_freq("huys"), 12);
    }

    #[test]
    fn floor_entry_after_small_entries() {
        // A validated form arriving after corpus observations adds its
        // mass above the floor on top of them.
        let t = tables_from(&["huis 7", "Huis 110"], 100);
        assert_eq!(t.low_freq("huis"), 17);
    }

    #[test]
    fn malformed_lines_are_counted() {
        let t = tables_from(&["huis 10", "alleen", "a b c", "huys x"], 0);
        assert_eq!(t.skipped, 3);
        assert_eq!(t.len(), 1);
    }

    #[test]
    fn low_freq_opt_distinguishes_absent() {
        let t = tables_from(&["huis 10"], 0);
        assert_eq!(t.low_freq_opt("huis"), Some(10));
        assert_eq!(t.low_freq_opt("huys"), None);
        assert_eq!(t.low_freq("huys"), 0);
    }
}

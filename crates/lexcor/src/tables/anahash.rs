// Anagram-hash file loading.
//
// The file lists one bucket per line as `key~w1#w2#...#wn`. Two views
// exist: the full key-to-words mapping used by the LD calculator, and the
// admissible key set used by the indexer, which only consults the first
// word of each bucket for the length band.

use std::collections::BTreeSet;
use std::io::BufRead;
use std::path::Path;

use hashbrown::HashMap;
use lexcor_core::AnagramKey;

use crate::tables::{data_err, open_lines, read_err};
use crate::{split_nonempty, LexcorError, Verbosity};

/// The anagram key → word-bucket mapping.
///
/// Buckets keep their words in code-point order; the comparison stages
/// iterate them and the resulting record stream depends on that order.
pub struct AnagramBuckets {
    map: HashMap<AnagramKey, BTreeSet<String>>,
}

impl AnagramBuckets {
    /// Load every bucket from an anagram-hash file.
    ///
    /// Lines that do not split into exactly `key~words` are skipped;
    /// an unparsable key or an empty word list is a data error. Duplicate
    /// keys merge their word sets.
    pub fn load(path: &Path) -> Result<Self, LexcorError> {
        let reader = open_lines(path)?;
        let mut map: HashMap<AnagramKey, BTreeSet<String>> = HashMap::new();
        let mut line_nr = 0u64;
        for line in reader.lines() {
            let line = line.map_err(|e| read_err(path, e))?;
            line_nr += 1;
            let parts = split_nonempty(&line, '~');
            if parts.len() != 2 {
                continue;
            }
            let words = split_nonempty(parts[1], '#');
            if words.is_empty() {
                return Err(data_err(path, line_nr, format!("strange line: {line}")));
            }
            let key: AnagramKey = parts[0]
                .parse()
                .map_err(|_| data_err(path, line_nr, format!("invalid anagram key '{}'", parts[0])))?;
            let bucket = map.entry(key).or_default();
            for w in words {
                bucket.insert(w.to_string());
            }
        }
        Ok(AnagramBuckets { map })
    }

    pub fn get(&self, key: AnagramKey) -> Option<&BTreeSet<String>> {
        self.map.get(&key)
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    /// Test constructor.
    #[doc(hidden)]
    pub fn from_entries(entries: Vec<(AnagramKey, Vec<&str>)>) -> Self {
        let mut map: HashMap<AnagramKey, BTreeSet<String>> = HashMap::new();
        for (key, words) in entries {
            let bucket = map.entry(key).or_default();
            for w in words {
                bucket.insert(w.to_string());
            }
        }
        AnagramBuckets { map }
    }
}

/// The sorted, deduplicated set of anagram keys admissible for indexing.
pub struct AdmissibleKeys {
    /// Ascending key values.
    pub keys: Vec<AnagramKey>,
    /// Buckets whose first word fell outside the length band.
    pub skipped: usize,
}

impl AdmissibleKeys {
    /// Load the admissible key set from an anagram-hash file.
    ///
    /// A key is admissible iff the first word of its bucket has a
    /// code-point length in `low..=high`. With verbosity 1 and up, every
    /// skipped first word is named on stderr.
    pub fn load(
        path: &Path,
        low: usize,
        high: usize,
        verbosity: Verbosity,
    ) -> Result<Self, LexcorError> {
        let reader = open_lines(path)?;
        let mut set: BTreeSet<AnagramKey> = BTreeSet::new();
        let mut skipped = 0usize;
        let mut line_nr = 0u64;
        for line in reader.lines() {
            let line = line.map_err(|e| read_err(path, e))?;
            line_nr += 1;
            let parts = split_nonempty(&line, '~');
            if parts.len() < 2 {
                continue;
            }
            let words = split_nonempty(parts[1], '#');
            let Some(first) = words.first() else {
                continue;
            };
            let key: AnagramKey = parts[0]
                .parse()
                .map_err(|_| data_err(path, line_nr, format!("invalid anagram key '{}'", parts[0])))?;
            let len = first.chars().count();
            if (low..=high).contains(&len) {
                set.insert(key);
            } else {
                if verbosity.at_least(1) {
                    eprintln!("skip {first}");
                }
                skipped += 1;
            }
        }
        Ok(AdmissibleKeys {
            keys: set.into_iter().collect(),
            skipped,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_temp(content: &str) -> tempfile::NamedTempFile {
        let mut f = tempfile::NamedTempFile::new().expect("temp file");
        f.write_all(content.as_bytes()).expect("write");
        f
    }

    #[test]
    fn buckets_load_and_merge() {
        let f = write_temp("123~huis#sihu\n125~huys\n123~uhis\n");
        let buckets = AnagramBuckets::load(f.path()).expect("load");
        assert_eq!(buckets.len(), 2);
        let b = buckets.get(123).expect("bucket 123");
        let words: Vec<&str> = b.iter().map(String::as_str).collect();
        assert_eq!(words, vec!["huis", "sihu", "uhis"]);
    }

    #[test]
    fn bucket_without_words_is_a_data_error() {
        let f = write_temp("123~##\n");
        assert!(AnagramBuckets::load(f.path()).is_err());
    }

    #[test]
    fn lines_without_tilde_are_skipped() {
        let f = write_temp("no separator here\n123~huis\n");
        let buckets = AnagramBuckets::load(f.path()).expect("load");
        assert_eq!(buckets.len(), 1);
    }

    #[test]
    fn admissible_applies_length_band_to_first_word() {
        // "lang" (4) is out of band, "linker" (6) admissible; the second
        // word of a bucket never matters.
        let f = write_temp("10~lang#ganl\n20~linker\n30~middel#xx\n");
        let adm = AdmissibleKeys::load(f.path(), 5, 35, Verbosity(0)).expect("load");
        assert_eq!(adm.keys, vec![20, 30]);
        assert_eq!(adm.skipped, 1);
    }

    #[test]
    fn admissible_keys_are_sorted_and_deduplicated() {
        let f = write_temp("30~middel\n10~linker\n30~dimdel\n");
        let adm = AdmissibleKeys::load(f.path(), 5, 35, Verbosity(0)).expect("load");
        assert_eq!(adm.keys, vec![10, 30]);
    }
}

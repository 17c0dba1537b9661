// Confusion-key set loading: the plain character-confusion list, the
// historical/diacritic tagged sets, and the foci filter.

use std::collections::BTreeSet;
use std::io::BufRead;
use std::path::Path;

use hashbrown::HashSet;
use lexcor_core::{AnagramKey, ConfusionKey};

use crate::tables::{data_err, open_lines, read_err};
use crate::{split_nonempty, LexcorError};

/// Load the character-confusion file for the indexer: one key per line in
/// the first `#`-field. Returns the keys sorted ascending, deduplicated.
/// A line without any field is a data error.
pub fn load_confusion_keys(path: &Path) -> Result<Vec<ConfusionKey>, LexcorError> {
    let reader = open_lines(path)?;
    let mut set: BTreeSet<ConfusionKey> = BTreeSet::new();
    let mut line_nr = 0u64;
    for line in reader.lines() {
        let line = line.map_err(|e| read_err(path, e))?;
        line_nr += 1;
        let parts = split_nonempty(&line, '#');
        let Some(first) = parts.first() else {
            return Err(data_err(path, line_nr, format!("problems with line {line}")));
        };
        let key: ConfusionKey = first
            .parse()
            .map_err(|_| data_err(path, line_nr, format!("invalid confusion key '{first}'")))?;
        set.insert(key);
    }
    Ok(set.into_iter().collect())
}

/// Load a historical or diacritical confusion set: lines of 2 or 3
/// `#`-fields whose first field is the key. Lines with any other arity are
/// skipped; whether an empty result is fatal is the caller's call.
pub fn load_tagged_confusions(path: &Path) -> Result<BTreeSet<ConfusionKey>, LexcorError> {
    let reader = open_lines(path)?;
    let mut set = BTreeSet::new();
    let mut line_nr = 0u64;
    for line in reader.lines() {
        let line = line.map_err(|e| read_err(path, e))?;
        line_nr += 1;
        let parts = split_nonempty(&line, '#');
        if parts.len() < 2 || parts.len() > 3 {
            continue;
        }
        let key: ConfusionKey = parts[0]
            .parse()
            .map_err(|_| data_err(path, line_nr, format!("invalid confusion key '{}'", parts[0])))?;
        set.insert(key);
    }
    Ok(set)
}

/// Load a foci file: one decimal anagram key per line. Malformed lines are
/// data errors.
pub fn load_foci(path: &Path) -> Result<HashSet<AnagramKey>, LexcorError> {
    let reader = open_lines(path)?;
    let mut set = HashSet::new();
    let mut line_nr = 0u64;
    for line in reader.lines() {
        let line = line.map_err(|e| read_err(path, e))?;
        line_nr += 1;
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }
        let key: AnagramKey = trimmed
            .parse()
            .map_err(|_| data_err(path, line_nr, format!("invalid focus value '{trimmed}'")))?;
        set.insert(key);
    }
    Ok(set)
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
    fn confusion_keys_sorted_ascending() {
        let f = write_temp("12#c~d\n4#a~b\n8#e~f\n4#z~y\n");
        let keys = load_confusion_keys(f.path()).expect("load");
        assert_eq!(keys, vec![4, 8, 12]);
    }

    #[test]
    fn empty_confusion_line_is_fatal() {
        let f = write_temp("4#a~b\n\n");
        assert!(load_confusion_keys(f.path()).is_err());
    }

    #[test]
    fn tagged_set_requires_two_or_three_fields() {
        let f = write_temp("10331739614#f~s\n99#a~b#extra\nonlyone\n7#a#b#c#d\n");
        let set = load_tagged_confusions(f.path()).expect("load");
        assert!(set.contains(&10331739614));
        assert!(set.contains(&99));
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn foci_are_plain_integers() {
        let f = write_temp("22\n-5\n");
        let foci = load_foci(f.path()).expect("load");
        assert!(foci.contains(&22));
        assert!(foci.contains(&-5));
        let bad = write_temp("x\n");
        assert!(load_foci(bad.path()).is_err());
    }
}

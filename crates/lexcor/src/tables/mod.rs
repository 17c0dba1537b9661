// Input-table loaders.
//
// One submodule per file format. Every loader opens its own file, returns
// a typed error with path and line context on hard failures, and exposes
// skip counters for the recoverable ones.

pub mod alphabet;
pub mod anahash;
pub mod confusion;
pub mod freqlist;

pub use alphabet::Alphabet;
pub use anahash::{AdmissibleKeys, AnagramBuckets};
pub use confusion::{load_confusion_keys, load_foci, load_tagged_confusions};
pub use freqlist::{load_validated_lexicon, FreqTables};

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use crate::LexcorError;

/// Open `path` for buffered line reading, mapping failure to
/// [`LexcorError::Open`].
pub(crate) fn open_lines(path: &Path) -> Result<BufReader<File>, LexcorError> {
    File::open(path)
        .map(BufReader::new)
        .map_err(|source| LexcorError::Open {
            path: path.to_path_buf(),
            source,
        })
}

/// Wrap a line-read failure with path context.
pub(crate) fn read_err(path: &Path, source: std::io::Error) -> LexcorError {
    LexcorError::Read {
        path: path.to_path_buf(),
        source,
    }
}

/// Build a data-format error for `path` at 1-based line `line`.
pub(crate) fn data_err(path: &Path, line: u64, msg: impl Into<String>) -> LexcorError {
    LexcorError::Data {
        path: path.to_path_buf(),
        line,
        msg: msg.into(),
    }
}

//! Post-OCR lexical correction engine.
//!
//! The pipeline runs in three batch stages, each reading the previous
//! stage's output from flat line-delimited text files:
//!
//! - [`indexer`] -- joins the corpus anagram-key set against the character
//!   confusion set: for every confusion `c`, every admissible key `a` with
//!   `a + c` also in the corpus.
//! - [`ldcalc`] -- dereferences joined key pairs back into word buckets,
//!   scores every cross-bucket word pair by code-point edit distance, and
//!   emits candidate correction records plus an ambiguity side table.
//! - [`chain`] / [`chainclean`] -- unions ranked candidates into
//!   equivalence classes under a canonical head, then prunes chains whose
//!   variants are explained by already-resolved unigram corrections.
//!
//! Input tables (anagram buckets, frequency lists, alphabet, confusion
//! sets, foci, validated lexicon) are loaded by [`tables`]. All loaders
//! return [`LexcorError`] instead of exiting; the binaries in `lexcor-cli`
//! decide how failures surface.

pub mod chain;
pub mod chainclean;
pub mod indexer;
pub mod ldcalc;
pub mod tables;

use std::path::PathBuf;

/// Error type covering every failure mode of the engine.
///
/// The stages distinguish hard data errors (malformed required input) from
/// recoverable skips; only the former surface here. Skip counts are
/// reported through the loader structs instead.
#[derive(Debug, thiserror::Error)]
pub enum LexcorError {
    /// A required input could not be opened.
    #[error("problem opening {path}: {source}")]
    Open {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Reading from an already-open input failed.
    #[error("problem reading {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    /// A line of a required input violates its format.
    #[error("{path}:{line}: {msg}")]
    Data {
        path: PathBuf,
        line: u64,
        msg: String,
    },

    /// More than ten malformed lines were seen in an index file.
    #[error("too many problems in index file {path}, terminated")]
    IndexErrors { path: PathBuf },

    /// The chain builder found its head/member tables out of sync.
    #[error("{0}")]
    Invariant(String),

    /// The worker pool could not be constructed.
    #[error("unable to build worker pool: {0}")]
    Pool(String),

    /// An output stream failed.
    #[error("output error: {0}")]
    Output(#[from] std::io::Error),
}

/// How chatty a stage is on stderr. `0` is silent apart from warnings;
/// each level adds the diagnostics described in the stage documentation.
/// Carried in the stage configs -- never a global.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord)]
pub struct Verbosity(pub u8);

impl Verbosity {
    /// True when the verbosity level is `level` or higher.
    pub fn at_least(self, level: u8) -> bool {
        self.0 >= level
    }
}

/// Split `s` at every occurrence of `sep`, dropping empty segments.
///
/// All the pipeline's file formats treat consecutive separators and
/// leading/trailing separators as if they enclosed nothing.
pub(crate) fn split_nonempty(s: &str, sep: char) -> Vec<&str> {
    s.split(sep).filter(|p| !p.is_empty()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn split_nonempty_drops_empty_segments() {
        assert_eq!(split_nonempty("a#b#c", '#'), vec!["a", "b", "c"]);
        assert_eq!(split_nonempty("a##b#", '#'), vec!["a", "b"]);
        assert_eq!(split_nonempty("###", '#'), Vec::<&str>::new());
        assert_eq!(split_nonempty("", '#'), Vec::<&str>::new());
    }

    #[test]
    fn verbosity_threshold() {
        assert!(Verbosity(2).at_least(2));
        assert!(Verbosity(3).at_least(2));
        assert!(!Verbosity(1).at_least(2));
    }
}

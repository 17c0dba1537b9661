//! Shared primitives for the lexcor correction toolchain.
//!
//! This crate holds the pieces every pipeline stage needs and nothing else:
//!
//! - [`levenshtein`] -- edit distance over Unicode code points
//! - [`casefold`] -- lowercasing and letter-overlap helpers
//!
//! together with the integer key aliases of the anagram-hash domain. It has
//! no I/O and no dependencies.

pub mod casefold;
pub mod levenshtein;

/// An anagram value: an integer hash computed from a word's code-point
/// multiset. Two words share a key exactly when they are character-anagrams.
pub type AnagramKey = i64;

/// A character-confusion value: the integer encoding of one character-level
/// edit pattern. Confusion keys compose additively with anagram keys:
/// applying the pattern to a word adds the confusion key to its anagram key.
pub type ConfusionKey = i64;

/// Separator joining the tokens of an n-gram entry in the corpus files.
pub const NGRAM_SEPARATOR: char = '_';

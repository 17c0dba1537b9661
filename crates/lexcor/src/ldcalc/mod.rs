// The LD calculator.
//
// Consumes an index file one line at a time (`mainKey#k1,k2,...`). Every
// child key names a word bucket; the bucket at `mainKey + k` holds the
// forms one confusion away. Cross-bucket pairs are scored by code-point
// edit distance and written as candidate correction records; buckets seen
// for the first time additionally get a transposition scan over their own
// pairs. Short differing parts of aligned n-gram pairs accumulate in an
// ambiguity side table that is flushed after the index is consumed.
//
// The children of one index line are processed by a worker pool with
// dynamic scheduling. Output interleaves across workers; each record is
// written atomically under the output lock. The remaining shared state
// (transposition dedup, ambiguity tables) sits behind its own mutex.

pub mod compare;
pub mod ngram;

use std::collections::{BTreeMap, BTreeSet};
use std::io::{BufRead, Write};
use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;

use hashbrown::HashSet;
use lexcor_core::casefold::{first_letter_overlap, last_two_overlap};
use lexcor_core::levenshtein;
use lexcor_core::{AnagramKey, ConfusionKey};
use rayon::prelude::*;

use crate::tables::{Alphabet, AnagramBuckets, FreqTables};
use crate::{split_nonempty, LexcorError, Verbosity};

/// Options for one LD-calculator run.
pub struct LdCalcConfig {
    /// Edit-distance bound for set comparison (1..=10).
    pub ld_limit: usize,
    /// The artificial frequency floor of validated lexicon entries.
    pub artifreq: u64,
    /// Disregard the edit-distance bound for historical confusions.
    pub no_khc_ld: bool,
    /// Worker count for the per-line child loop.
    pub threads: usize,
    pub verbosity: Verbosity,
}

impl Default for LdCalcConfig {
    fn default() -> Self {
        LdCalcConfig {
            ld_limit: 2,
            artifreq: 0,
            no_khc_ld: false,
            threads: 1,
            verbosity: Verbosity(0),
        }
    }
}

/// Disambiguation hints for short words: for each `variant~candidate`
/// pair of differing n-gram parts, the originating n-gram pairs and how
/// often the short pair was seen. Both tables flush in ascending key
/// order.
#[derive(Default)]
pub struct AmbiguityTables {
    pub(crate) pairs: BTreeMap<String, BTreeSet<String>>,
    pub(crate) counts: BTreeMap<String, u64>,
}

/// Counters reported after a run.
#[derive(Debug, Default, Clone, Copy)]
pub struct LdCalcStats {
    /// Well-formed index lines processed.
    pub index_lines: u64,
    /// Word pairs examined during set comparison.
    pub comparisons: u64,
    /// Records emitted through the transposition path.
    pub transpositions: u64,
}

/// One LD-calculator run over loaded tables.
pub struct LdCalc<'a, W: Write + Send> {
    pub(crate) cfg: &'a LdCalcConfig,
    pub(crate) buckets: &'a AnagramBuckets,
    pub(crate) freqs: &'a FreqTables,
    pub(crate) alphabet: &'a Alphabet,
    hist: &'a BTreeSet<ConfusionKey>,
    diac: &'a BTreeSet<ConfusionKey>,
    pub(crate) out: Mutex<W>,
    handled_trans: Mutex<HashSet<AnagramKey>>,
    pub(crate) ambiguity: Mutex<AmbiguityTables>,
    pub(crate) comparisons: AtomicU64,
    pub(crate) transpositions: AtomicU64,
    index_lines: AtomicU64,
    pool: rayon::ThreadPool,
}

impl<'a, W: Write + Send> LdCalc<'a, W> {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        cfg: &'a LdCalcConfig,
        buckets: &'a AnagramBuckets,
        freqs: &'a FreqTables,
        alphabet: &'a Alphabet,
        hist: &'a BTreeSet<ConfusionKey>,
        diac: &'a BTreeSet<ConfusionKey>,
        out: W,
    ) -> Result<Self, LexcorError> {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(cfg.threads.max(1))
            .build()
            .map_err(|e| LexcorError::Pool(e.to_string()))?;
        Ok(LdCalc {
            cfg,
            buckets,
            freqs,
            alphabet,
            hist,
            diac,
            out: Mutex::new(out),
            handled_trans: Mutex::new(HashSet::new()),
            ambiguity: Mutex::new(AmbiguityTables::default()),
            comparisons: AtomicU64::new(0),
            transpositions: AtomicU64::new(0),
            index_lines: AtomicU64::new(0),
            pool,
        })
    }

    /// Consume an index file. Malformed lines are counted; processing
    /// gives up once more than ten have accumulated. `path` only serves
    /// diagnostics.
    pub fn process_index<R: BufRead>(&self, reader: R, path: &Path) -> Result<(), LexcorError> {
        let mut err_cnt = 0u32;
        let mut line_nr = 0u64;
        let mut count = 0u64;
        for line in reader.lines() {
            if err_cnt > 9 {
                return Err(LexcorError::IndexErrors {
                    path: path.to_path_buf(),
                });
            }
            let line = line.map_err(|e| crate::tables::read_err(path, e))?;
            line_nr += 1;
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            let parts = split_nonempty(line, '#');
            if parts.len() != 2 {
                eprintln!("ERROR in line {line_nr} of index file: unable to split in 2 parts at #");
                err_cnt += 1;
                continue;
            }
            count += 1;
            if count % 1000 == 0 {
                print!(".");
                let _ = std::io::stdout().flush();
                if count % 50_000 == 0 {
                    println!("\n{count}");
                }
            }
            let main_key_str = parts[0];
            let Ok(main_key) = main_key_str.parse::<ConfusionKey>() else {
                eprintln!("ERROR in line {line_nr} of index file: invalid key '{main_key_str}'");
                err_cnt += 1;
                continue;
            };
            let children = split_nonempty(parts[1], ',');
            if children.is_empty() {
                eprintln!(
                    "ERROR in line {line_nr} of index file: unable to split in parts separated by ','"
                );
                err_cnt += 1;
                continue;
            }
            self.index_lines.fetch_add(1, Ordering::Relaxed);
            let is_khc = self.hist.contains(&main_key);
            let is_diac = self.diac.contains(&main_key);
            self.pool.install(|| {
                children.par_iter().for_each(|child| {
                    self.process_child(main_key, main_key_str, child, is_khc, is_diac);
                });
            });
        }
        Ok(())
    }

    /// Handle one child key of an index line: transposition scan on its
    /// bucket (first encounter only) and set comparison against the bucket
    /// shifted by the main key.
    fn process_child(
        &self,
        main_key: ConfusionKey,
        main_key_str: &str,
        child: &str,
        is_khc: bool,
        is_diac: bool,
    ) {
        let Ok(key) = child.parse::<AnagramKey>() else {
            eprintln!("WARNING: invalid key '{child}' in the input, skipped.");
            return;
        };
        if self.cfg.verbosity.at_least(2) {
            eprintln!("inspect key {key}");
        }
        let Some(bucket1) = self.buckets.get(key) else {
            eprintln!("WARNING: found a key '{key}' in the input that isn't present in the hashes.");
            return;
        };
        if !bucket1.is_empty() && self.cfg.ld_limit >= 2 {
            let do_trans = self.handled_trans.lock().expect("lock poisoned").insert(key);
            if do_trans {
                self.handle_transpositions(bucket1, is_khc, is_diac);
            }
        }
        let partner = main_key.wrapping_add(key);
        if self.cfg.verbosity.at_least(2) {
            eprintln!("inspect key {partner}");
        }
        let Some(bucket2) = self.buckets.get(partner) else {
            if self.cfg.verbosity.at_least(5) {
                eprintln!(
                    "WARNING: found a key '{key}' in the input that, when added to \
                     '{main_key}', isn't present in the hashes."
                );
            }
            return;
        };
        self.compare_sets(main_key_str, bucket1, bucket2, is_khc, is_diac);
    }

    /// Flush the ambiguity tables: synthetic records for the short-word
    /// pairs into the main output, the originating n-gram pairs into the
    /// ambi companion. Consumes the run, handing back the output stream
    /// and the counters.
    pub fn finish<A: Write>(self, ambi_out: &mut A) -> Result<(W, LdCalcStats), LexcorError> {
        let ambiguity = self.ambiguity.into_inner().expect("lock poisoned");
        let mut out = self.out.into_inner().expect("lock poisoned");

        for (pair, count) in &ambiguity.counts {
            let parts = split_nonempty(pair, '~');
            if parts.len() < 2 {
                continue;
            }
            let c1: Vec<char> = parts[0].chars().collect();
            let c2: Vec<char> = parts[1].chars().collect();
            let ld = levenshtein::distance(&c1, &c2);
            let cls = c1.len().max(c2.len()) - ld;
            let fl = u8::from(first_letter_overlap(&c1, &c2));
            let ll = u8::from(last_two_overlap(&c1, &c2));
            let freq1 = self.freqs.freq(parts[0]).unwrap_or(0);
            let freq2 = self.freqs.freq(parts[1]).unwrap_or(0);
            let low1 = self.freqs.low_freq(parts[0]);
            let low2 = self.freqs.low_freq(parts[1]);
            writeln!(
                out,
                "{}~{freq1}~{low1}~{}~{freq2}~{low2}~0~{ld}~{cls}~0~{fl}~{ll}~0~{count}",
                parts[0], parts[1]
            )?;
        }
        out.flush()?;

        for (pair, origins) in &ambiguity.pairs {
            write!(ambi_out, "{pair}#")?;
            for origin in origins {
                write!(ambi_out, "{origin}#")?;
            }
            writeln!(ambi_out)?;
        }
        ambi_out.flush()?;

        let stats = LdCalcStats {
            index_lines: self.index_lines.load(Ordering::Relaxed),
            comparisons: self.comparisons.load(Ordering::Relaxed),
            transpositions: self.transpositions.load(Ordering::Relaxed),
        };
        Ok((out, stats))
    }
}

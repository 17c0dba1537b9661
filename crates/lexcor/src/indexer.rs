// The anagram index join.
//
// For every confusion value `c`, every admissible anagram key `a` with
// `a + c` also admissible is reported as `c#a1,a2,...`. The per-confusion
// scan is the classic two-pointer merge over one sorted array: cursor one
// walks plain values, cursor two walks values shifted down by `c`, and
// equality means `a + c` is in the set.
//
// The confusion sweep is embarrassingly parallel, so the set is cut into
// one contiguous chunk per worker and the partial hit lists are merged in
// confusion order afterwards. Output is written single-threaded.

use std::io::Write;

use hashbrown::HashSet;
use lexcor_core::{AnagramKey, ConfusionKey};
use rayon::prelude::*;

use crate::LexcorError;

/// Hits for one confusion value: every admissible `a` with `a + c`
/// admissible (and, with a foci set, at least one side in focus).
pub fn join_one(
    admissible: &[AnagramKey],
    confusion: ConfusionKey,
    foci: Option<&HashSet<AnagramKey>>,
) -> Vec<AnagramKey> {
    let mut hits = Vec::new();
    let mut i = 0;
    let mut j = 0;
    while i < admissible.len() && j < admissible.len() {
        let v1 = admissible[i];
        let v2 = admissible[j].wrapping_sub(confusion);
        if v1 == v2 {
            let in_focus = match foci {
                Some(f) => f.contains(&v1) || f.contains(&admissible[j]),
                None => true,
            };
            if in_focus {
                hits.push(v1);
            }
            i += 1;
            j += 1;
        } else if v1 < v2 {
            i += 1;
        } else {
            j += 1;
        }
    }
    hits
}

/// Sweep every confusion value across the admissible key set and write the
/// non-empty hit lists as `c#a1,a2,...`, confusions in ascending order.
///
/// `threads` workers each take one contiguous chunk of the confusion set;
/// their partial results are concatenated in order, so the output is
/// independent of the worker count.
pub fn write_index<W: Write>(
    out: &mut W,
    admissible: &[AnagramKey],
    confusions: &[ConfusionKey],
    foci: Option<&HashSet<AnagramKey>>,
    threads: usize,
) -> Result<(), LexcorError> {
    let workers = threads.max(1);
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(workers)
        .build()
        .map_err(|e| LexcorError::Pool(e.to_string()))?;

    let chunk_len = confusions.len().div_ceil(workers).max(1);
    let partials: Vec<Vec<(ConfusionKey, Vec<AnagramKey>)>> = pool.install(|| {
        confusions
            .par_chunks(chunk_len)
            .map(|chunk| {
                chunk
                    .iter()
                    .map(|&c| (c, join_one(admissible, c, foci)))
                    .collect()
            })
            .collect()
    });

    for (confusion, hits) in partials.into_iter().flatten() {
        if hits.is_empty() {
            continue;
        }
        write!(out, "{confusion}#")?;
        for (n, hit) in hits.iter().enumerate() {
            if n > 0 {
                write!(out, ",")?;
            }
            write!(out, "{hit}")?;
        }
        writeln!(out)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn index_string(
        admissible: &[AnagramKey],
        confusions: &[ConfusionKey],
        foci: Option<&HashSet<AnagramKey>>,
        threads: usize,
    ) -> String {
        let mut out = Vec::new();
        write_index(&mut out, admissible, confusions, foci, threads).expect("write_index");
        String::from_utf8(out).expect("utf8")
    }

    #[test]
    fn join_matches_the_contract() {
        let a = [10, 14, 22, 30];
        assert_eq!(join_one(&a, 4, None), vec![10]);
        assert_eq!(join_one(&a, 8, None), vec![14, 22]);
        assert_eq!(join_one(&a, 12, None), vec![10]);
    }

    #[test]
    fn join_is_the_pure_intersection() {
        // Completeness: every admissible a with a+c admissible shows up.
        let a: Vec<AnagramKey> = vec![1, 3, 6, 10, 15, 21, 28, 36];
        for c in 1..40 {
            let expect: Vec<AnagramKey> = a
                .iter()
                .copied()
                .filter(|&v| a.binary_search(&(v + c)).is_ok())
                .collect();
            assert_eq!(join_one(&a, c, None), expect, "confusion {c}");
        }
    }

    #[test]
    fn foci_keep_pairs_touching_a_focus() {
        let a = [10, 14, 22, 30];
        let foci: HashSet<AnagramKey> = [22].into_iter().collect();
        // (10,14): neither side in focus.
        assert_eq!(join_one(&a, 4, Some(&foci)), Vec::<AnagramKey>::new());
        // (14,22) via right side, (22,30) via left side.
        assert_eq!(join_one(&a, 8, Some(&foci)), vec![14, 22]);
        // (10,22) via right side.
        assert_eq!(join_one(&a, 12, Some(&foci)), vec![10]);
    }

    #[test]
    fn index_output_omits_empty_lines() {
        let out = index_string(&[10, 14, 22, 30], &[4, 8, 12, 100], None, 1);
        assert_eq!(out, "4#10\n8#14,22\n12#10\n");
    }

    #[test]
    fn index_output_independent_of_worker_count() {
        let a: Vec<AnagramKey> = (0..200).map(|n| n * 3).collect();
        let c: Vec<ConfusionKey> = (1..50).collect();
        let serial = index_string(&a, &c, None, 1);
        for threads in [2, 3, 7] {
            assert_eq!(index_string(&a, &c, None, threads), serial);
        }
    }

    #[test]
    fn negative_confusions_join_downward() {
        let a = [10, 14, 22];
        assert_eq!(join_one(&a, -4, None), vec![14]);
    }
}

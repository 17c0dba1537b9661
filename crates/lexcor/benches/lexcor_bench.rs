// Criterion benchmarks for the two kernels the pipeline spends its time
// in: the code-point edit distance and the per-confusion two-pointer join.
//
// Run:
//   cargo bench -p lexcor

use criterion::{black_box, criterion_group, criterion_main, Criterion};

use lexcor::indexer::join_one;
use lexcor_core::levenshtein;

/// Word pairs of the typical 5-15 code-point shape the LD calculator sees.
const WORD_PAIRS: &[(&str, &str)] = &[
    ("huis", "huys"),
    ("straat", "staart"),
    ("gezelschap", "gezelschaq"),
    ("vaderlandsch", "vaderlantsch"),
    ("overeenkomst", "overeenkomften"),
    ("maatschappij", "maetschappy"),
];

fn bench_levenshtein(c: &mut Criterion) {
    let pairs: Vec<(Vec<char>, Vec<char>)> = WORD_PAIRS
        .iter()
        .map(|(a, b)| (a.chars().collect(), b.chars().collect()))
        .collect();
    c.bench_function("levenshtein word pairs", |b| {
        b.iter(|| {
            let mut total = 0usize;
            for (x, y) in &pairs {
                total += levenshtein::distance(black_box(x), black_box(y));
            }
            total
        })
    });
}

fn bench_join(c: &mut Criterion) {
    // 100k admissible keys with irregular gaps, swept by one confusion.
    let admissible: Vec<i64> = (0..100_000i64).map(|n| n * 7 + (n % 13)).collect();
    c.bench_function("index join single confusion", |b| {
        b.iter(|| join_one(black_box(&admissible), black_box(91), None))
    });
}

criterion_group!(benches, bench_levenshtein, bench_join);
criterion_main!(benches);

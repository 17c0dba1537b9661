// The chain cleaner.
//
// Chained records whose multi-token variant is explained by a shorter,
// already-resolved unigram correction are evidence of double counting and
// get deleted, as do multi-token variants whose joined length falls under
// the low floor. Resolution walks the unknown variant tokens from most to
// least frequent; per candidate token a fresh `uniq` set tracks which
// variants were just resolved as unigram corrections, vetoing multigram
// records that reuse them.
//
// All decisions are taken on lowercased code points; the raw spellings
// pass through to the output untouched.

use std::collections::BTreeMap;
use std::collections::BTreeSet;
use std::fmt;
use std::io::Write;

use hashbrown::{HashMap, HashSet};
use lexcor_core::casefold::lower;

use crate::{split_nonempty, Verbosity};

/// Options for one cleaning pass.
pub struct CleanConfig {
    /// Frequency floor above which a lexicon word counts as validated.
    pub artifreq: u64,
    /// Multi-token variants whose joined code-point length is at or under
    /// this floor are deleted outright.
    pub low_limit: usize,
    /// Words whose every decision is traced on stderr.
    pub follow: BTreeSet<String>,
    pub verbosity: Verbosity,
}

impl Default for CleanConfig {
    fn default() -> Self {
        CleanConfig {
            artifreq: 100_000_000,
            low_limit: 5,
            follow: BTreeSet::new(),
            verbosity: Verbosity(0),
        }
    }
}

/// One chained record with its token decompositions.
///
/// The numeric fields stay strings: the cleaner never interprets them, it
/// only carries them through.
pub struct ChainRecord {
    pub variant: String,
    pub v_freq: String,
    pub cc: String,
    pub cc_freq: String,
    pub ld: String,
    v_parts: Vec<String>,
    v_dh_parts: Vec<String>,
    cc_parts: Vec<String>,
    cc_dh_parts: Vec<String>,
    deleted: bool,
}

impl ChainRecord {
    /// Parse a six-field chained line; `None` when the arity is wrong.
    pub fn parse(line: &str) -> Option<Self> {
        let fields = split_nonempty(line, '#');
        if fields.len() != 6 {
            return None;
        }
        let variant = fields[0].to_string();
        let cc = fields[2].to_string();
        Some(ChainRecord {
            v_parts: underscore_parts(&variant),
            v_dh_parts: dash_underscore_parts(&variant),
            cc_parts: underscore_parts(&cc),
            cc_dh_parts: dash_underscore_parts(&cc),
            variant,
            v_freq: fields[1].to_string(),
            cc,
            cc_freq: fields[3].to_string(),
            ld: fields[4].to_string(),
            deleted: false,
        })
    }

    pub fn is_deleted(&self) -> bool {
        self.deleted
    }
}

impl fmt::Display for ChainRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}#{}#{}#{}#{}#{}",
            self.variant,
            self.v_freq,
            self.cc,
            self.cc_freq,
            self.ld,
            if self.deleted { "D" } else { "C" }
        )
    }
}

fn underscore_parts(s: &str) -> Vec<String> {
    split_nonempty(s, '_').into_iter().map(str::to_string).collect()
}

fn dash_underscore_parts(s: &str) -> Vec<String> {
    s.split(['_', '-'])
        .filter(|p| !p.is_empty())
        .map(str::to_string)
        .collect()
}

/// What the multigram walk decided for one record.
enum MultigramAction {
    /// Candidate or variant token did not match.
    NoMatch,
    /// A variant token was just resolved as a unigram correction.
    UniqVeto,
    /// The matching candidate token is already explained and this variant
    /// contains the explaining variant, or reuses a resolved unigram.
    Delete,
    /// First (or fresh) explanation: remember it under the candidate token.
    Resolve { cor_part: String, lvar: String },
}

/// Decide the fate of a multigram record for the pair (`unk_part`,
/// `cand_cor`). The first candidate token equal to `cand_cor` whose
/// variant also carries `unk_part` settles it.
fn multigram_action(
    rec: &ChainRecord,
    unk_part: &str,
    cand_cor: &str,
    done: &HashMap<String, String>,
    uniq: &HashSet<String>,
) -> MultigramAction {
    if rec.v_parts.iter().any(|vp| uniq.contains(vp.as_str())) {
        return MultigramAction::UniqVeto;
    }
    for cp in &rec.cc_parts {
        let cor_part = lower(cp);
        if cand_cor != cor_part {
            continue;
        }
        let variant_matches = rec.v_parts.iter().any(|p| lower(p) == unk_part);
        if !variant_matches {
            continue;
        }
        let lvar = lower(&rec.variant);
        return match done.get(&cor_part) {
            Some(resolved) => {
                if uniq.contains(unk_part) || lvar.contains(resolved.as_str()) {
                    MultigramAction::Delete
                } else {
                    MultigramAction::Resolve { cor_part, lvar }
                }
            }
            None => MultigramAction::Resolve { cor_part, lvar },
        };
    }
    MultigramAction::NoMatch
}

/// Run the cleaning pass over parsed records, in place.
pub fn clean_records(
    records: &mut [ChainRecord],
    valid_words: &HashSet<String>,
    cfg: &CleanConfig,
) {
    // Unknown-part frequencies over multi-token variants. Ordered map so
    // equal counts process in ascending token order.
    let mut parts_freq: BTreeMap<String, u32> = BTreeMap::new();
    for rec in records.iter() {
        if rec.v_parts.len() == 1 {
            continue;
        }
        for p in &rec.v_parts {
            let key = lower(p);
            if !valid_words.contains(key.as_str()) {
                *parts_freq.entry(key).or_insert(0) += 1;
            }
        }
    }
    if cfg.verbosity.at_least(1) {
        eprintln!("found {} unknown parts", parts_freq.len());
    }

    // Low-length floor on joined multi-token variants.
    for rec in records.iter_mut() {
        if rec.v_parts.len() > 1 {
            let joined: usize = rec.v_parts.iter().map(|p| p.chars().count()).sum();
            if joined <= cfg.low_limit {
                rec.deleted = true;
            }
        }
    }

    let mut unknown: Vec<(&String, u32)> = parts_freq.iter().map(|(k, &v)| (k, v)).collect();
    unknown.sort_by(|a, b| b.1.cmp(&a.1));

    let mut done: HashMap<String, String> = HashMap::new();
    let mut done_records: HashSet<usize> = HashSet::new();

    for (part, _) in unknown {
        let unk_part = lower(part);
        let show = cfg.verbosity.at_least(1) || cfg.follow.contains(&unk_part);
        if show {
            eprintln!("loop for part: {part}/{unk_part}");
        }

        // Candidate tokens co-occurring with the unknown part, counted
        // over every record, first-encounter order preserved.
        let mut cc_freqs: HashMap<String, u32> = HashMap::new();
        let mut cc_order: Vec<String> = Vec::new();
        for rec in records.iter() {
            if !rec.v_dh_parts.iter().any(|p| lower(p) == unk_part) {
                continue;
            }
            if show {
                eprintln!("found: {unk_part} in: {rec}");
            }
            for cp in &rec.cc_dh_parts {
                let c_part = lower(cp);
                if !cc_freqs.contains_key(c_part.as_str()) {
                    cc_order.push(c_part.clone());
                }
                *cc_freqs.entry(c_part).or_insert(0) += 1;
            }
        }

        // Group by count, descending; within one count keep encounter order.
        let mut by_count: BTreeMap<u32, Vec<&String>> = BTreeMap::new();
        for c in &cc_order {
            by_count.entry(cc_freqs[c.as_str()]).or_default().push(c);
        }
        if show {
            eprintln!("found {} correction tokens for: {unk_part}", cc_order.len());
        }

        for (_, candidates) in by_count.iter().rev() {
            for cand_cor in candidates {
                let mut uniq: HashSet<String> = HashSet::new();
                for idx in 0..records.len() {
                    if records[idx].deleted {
                        continue;
                    }
                    if done_records.contains(&idx) {
                        if show && records[idx].variant.contains(unk_part.as_str()) {
                            eprintln!("skip already done {}", records[idx]);
                        }
                        continue;
                    }
                    if records[idx].v_parts.len() == 1 {
                        let vari = lower(&records[idx].variant);
                        let corr = lower(&records[idx].cc);
                        if vari == unk_part && corr.contains(cand_cor.as_str()) {
                            if show {
                                eprintln!(
                                    "unigram: both {unk_part} and {cand_cor} matched in: {}",
                                    records[idx]
                                );
                            }
                            let unigram_cc = records[idx].cc_parts.len() == 1;
                            done.insert(corr, vari.clone());
                            done_records.insert(idx);
                            if unigram_cc {
                                uniq.insert(vari);
                            }
                        }
                        continue;
                    }
                    let local_show = cfg.verbosity.at_least(1)
                        || records[idx]
                            .v_parts
                            .iter()
                            .any(|p| cfg.follow.contains(p.as_str()));
                    match multigram_action(&records[idx], &unk_part, cand_cor.as_str(), &done, &uniq)
                    {
                        MultigramAction::NoMatch => {}
                        MultigramAction::UniqVeto => {
                            records[idx].deleted = true;
                            if local_show {
                                eprintln!("remove (resolved unigram part): {}", records[idx]);
                            }
                        }
                        MultigramAction::Delete => {
                            records[idx].deleted = true;
                            if local_show {
                                eprintln!("remove (already explained): {}", records[idx]);
                            }
                        }
                        MultigramAction::Resolve { cor_part, lvar } => {
                            if local_show {
                                eprintln!("keep: {}", records[idx]);
                            }
                            done.insert(cor_part, lvar);
                            done_records.insert(idx);
                        }
                    }
                }
            }
        }
    }
}

/// Write survivors and deletions to their streams; returns the counts.
pub fn write_results<W: Write, D: Write>(
    records: &[ChainRecord],
    out: &mut W,
    deleted_out: &mut D,
) -> std::io::Result<(usize, usize)> {
    let mut kept = 0;
    let mut dropped = 0;
    for rec in records {
        if rec.deleted {
            dropped += 1;
            writeln!(deleted_out, "{rec}")?;
        } else {
            kept += 1;
            writeln!(out, "{rec}")?;
        }
    }
    Ok((kept, dropped))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse_all(lines: &[&str]) -> Vec<ChainRecord> {
        lines
            .iter()
            .map(|l| ChainRecord::parse(l).expect("parse"))
            .collect()
    }

    fn valid(words: &[&str]) -> HashSet<String> {
        words.iter().map(|w| w.to_string()).collect()
    }

    fn survivors(records: &[ChainRecord]) -> Vec<String> {
        records
            .iter()
            .filter(|r| !r.is_deleted())
            .map(|r| r.to_string())
            .collect()
    }

    #[test]
    fn parse_decomposes_tokens() {
        let rec = ChainRecord::parse("foo_bar-baz#3#foo_baz#9#1#C").expect("parse");
        assert_eq!(rec.v_parts, vec!["foo", "bar-baz"]);
        assert_eq!(rec.v_dh_parts, vec!["foo", "bar", "baz"]);
        assert_eq!(rec.cc_parts, vec!["foo", "baz"]);
        assert_eq!(rec.to_string(), "foo_bar-baz#3#foo_baz#9#1#C");
    }

    #[test]
    fn parse_rejects_wrong_arity() {
        assert!(ChainRecord::parse("a#b#c").is_none());
        assert!(ChainRecord::parse("a#1#b#2#1#C#extra").is_none());
    }

    #[test]
    fn short_joined_variants_are_deleted() {
        let mut records = parse_all(&["ab_cd#2#abcd#9#1#C", "langer_woord#2#langerwoord#9#1#C"]);
        clean_records(&mut records, &valid(&[]), &CleanConfig::default());
        assert!(records[0].is_deleted());
        assert!(!records[1].is_deleted());
    }

    #[test]
    fn unigram_resolution_deletes_covering_multigram() {
        // "bar" resolves to unigram candidate "baz" first; the multigram
        // record reusing the resolved variant token is then discarded.
        let mut records = parse_all(&["bar#6#baz#9#1#C", "foo_bar#4#foo_baz#9#1#C"]);
        let cfg = CleanConfig {
            low_limit: 3,
            ..CleanConfig::default()
        };
        clean_records(&mut records, &valid(&["foo"]), &cfg);
        assert_eq!(survivors(&records), vec!["bar#6#baz#9#1#C".to_string()]);
        assert!(records[1].is_deleted());
    }

    #[test]
    fn unexplained_multigram_survives() {
        let mut records = parse_all(&["foo_bar#4#foo_baz#9#1#C"]);
        let cfg = CleanConfig {
            low_limit: 3,
            ..CleanConfig::default()
        };
        clean_records(&mut records, &valid(&["foo"]), &cfg);
        assert_eq!(survivors(&records).len(), 1);
    }

    #[test]
    fn validated_tokens_produce_no_unknown_parts() {
        // Every token validated: the resolution walk has nothing to do.
        let mut records = parse_all(&["foo_bar#4#foo_baz#9#1#C"]);
        let cfg = CleanConfig {
            low_limit: 3,
            ..CleanConfig::default()
        };
        clean_records(&mut records, &valid(&["foo", "bar"]), &cfg);
        assert!(!records[0].is_deleted());
    }

    #[test]
    fn second_variant_with_same_explanation_is_deleted() {
        // Once "straat" explains candidate token "straat", a longer variant
        // containing the explaining variant is redundant.
        let mut records = parse_all(&[
            "straet#5#straat#90#1#C",
            "de_straet#3#de_straat#90#1#C",
        ]);
        let cfg = CleanConfig {
            low_limit: 3,
            ..CleanConfig::default()
        };
        clean_records(&mut records, &valid(&["de"]), &cfg);
        assert_eq!(
            survivors(&records),
            vec!["straet#5#straat#90#1#C".to_string()]
        );
    }

    #[test]
    fn write_results_splits_streams() {
        let mut records = parse_all(&["ab_cd#2#abcd#9#1#C", "woord#2#woord2#9#1#C"]);
        clean_records(&mut records, &valid(&[]), &CleanConfig::default());
        let mut out = Vec::new();
        let mut deleted = Vec::new();
        let (kept, dropped) = write_results(&records, &mut out, &mut deleted).expect("write");
        assert_eq!((kept, dropped), (1, 1));
        assert_eq!(String::from_utf8(out).expect("utf8"), "woord#2#woord2#9#1#C\n");
        assert_eq!(
            String::from_utf8(deleted).expect("utf8"),
            "ab_cd#2#abcd#9#1#D\n"
        );
    }
}

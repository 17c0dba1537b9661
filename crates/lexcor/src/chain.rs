// The chain builder.
//
// Ranked correction records arrive as `variant#freqV#candidate#freqC#ld#tag`
// lines, best candidates first. Edges are unioned in input order into
// equivalence classes, each headed by the canonical form that entered
// first: a variant whose candidate already has a head joins that head's
// class instead of the candidate's own. Insertion order fixes the heads,
// so this is a union-find whose rank never changes after the first link.

use std::collections::{BTreeMap, BTreeSet};
use std::io::Write;

use hashbrown::HashMap;
use lexcor_core::levenshtein;

use crate::{split_nonempty, LexcorError, Verbosity};

pub struct ChainBuilder {
    /// variant → canonical head.
    heads: HashMap<String, String>,
    /// head → variants joined under it. Ordered: output generation walks
    /// heads and members in code-point order.
    members: BTreeMap<String, BTreeSet<String>>,
    /// Last seen frequency per word, variant and candidate alike.
    var_freq: HashMap<String, u64>,
    caseless: bool,
    verbosity: Verbosity,
}

impl ChainBuilder {
    pub fn new(caseless: bool, verbosity: Verbosity) -> Self {
        ChainBuilder {
            heads: HashMap::new(),
            members: BTreeMap::new(),
            var_freq: HashMap::new(),
            caseless,
            verbosity,
        }
    }

    /// Union one ranked record into the chains.
    ///
    /// Returns `Ok(false)` for a line that does not parse into six fields
    /// with numeric frequencies (the caller reports and continues). A
    /// variant that has a head but is missing from that head's member set
    /// means the tables are out of sync: that is an invariant violation
    /// and aborts the run.
    pub fn fill(&mut self, line: &str) -> Result<bool, LexcorError> {
        let parts = split_nonempty(line, '#');
        if parts.len() != 6 {
            return Ok(false);
        }
        let variant = parts[0];
        let Ok(freq1) = parts[1].parse::<u64>() else {
            return Ok(false);
        };
        let candidate = parts[2];
        let Ok(freq2) = parts[3].parse::<u64>() else {
            return Ok(false);
        };
        self.var_freq.insert(variant.to_string(), freq1);
        self.var_freq.insert(candidate.to_string(), freq2);
        if self.verbosity.at_least(4) {
            eprintln!("word={variant} CC={candidate}");
        }
        match self.heads.get(variant) {
            None => {
                // The variant has no head yet: it joins the candidate's
                // class, or starts one headed by the candidate.
                let head = match self.heads.get(candidate) {
                    None => candidate.to_string(),
                    Some(h) => h.clone(),
                };
                if self.verbosity.at_least(4) {
                    eprintln!("add ({variant},{head}) to heads");
                }
                self.heads.insert(variant.to_string(), head.clone());
                self.members
                    .entry(head)
                    .or_default()
                    .insert(variant.to_string());
            }
            Some(head) => match self.members.get(head) {
                Some(set) if set.contains(variant) => {}
                Some(_) => {
                    return Err(LexcorError::Invariant(format!(
                        "{variant} has a heads entry, but no member entry!"
                    )));
                }
                None => {
                    return Err(LexcorError::Invariant(format!(
                        "{variant} has no head entry!"
                    )));
                }
            },
        }
        Ok(true)
    }

    /// Write the chains: one line per member, classes sorted descending by
    /// head frequency. Heads with equal frequency keep the generation
    /// order, so the output is stable across runs.
    pub fn write_output<W: Write>(&self, out: &mut W) -> std::io::Result<()> {
        let mut rows: Vec<(u64, String)> = Vec::new();
        for (head, set) in &self.members {
            let head_freq = self.word_freq(head);
            for member in set {
                let ld = levenshtein::str_distance(head, member, self.caseless);
                rows.push((
                    head_freq,
                    format!(
                        "{member}#{}#{head}#{head_freq}#{ld}#C",
                        self.word_freq(member)
                    ),
                ));
            }
        }
        rows.sort_by(|a, b| b.0.cmp(&a.0));
        for (_, row) in rows {
            writeln!(out, "{row}")?;
        }
        Ok(())
    }

    /// Dump the member table for inspection: `headFreq head member,...`.
    pub fn write_debug<W: Write>(&self, out: &mut W) -> std::io::Result<()> {
        for (head, set) in &self.members {
            let members: Vec<&str> = set.iter().map(String::as_str).collect();
            writeln!(out, "{} {head} [{}]", self.word_freq(head), members.join(","))?;
        }
        Ok(())
    }

    fn word_freq(&self, word: &str) -> u64 {
        self.var_freq.get(word).copied().unwrap_or(0)
    }

    /// Head of a word, if it was chained under one.
    pub fn head_of(&self, word: &str) -> Option<&str> {
        self.heads.get(word).map(String::as_str)
    }

    /// Members chained under `head`.
    pub fn members_of(&self, head: &str) -> Option<&BTreeSet<String>> {
        self.members.get(head)
    }
}

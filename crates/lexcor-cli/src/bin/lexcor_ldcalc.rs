// lexcor-ldcalc: score joined anagram pairs into correction records.
//
// Walks an index file produced by lexcor-indexer, dereferences every key
// pair back into word buckets through the anagram-hash file, and emits a
// fourteen-field candidate record for every cross-bucket pair that passes
// the edit-distance and frequency gates. Disambiguation hints for short
// n-gram parts land in a companion .ambi file.

use std::collections::BTreeSet;
use std::io::Write;
use std::path::Path;

use lexcor::ldcalc::{LdCalc, LdCalcConfig};
use lexcor::tables::{load_tagged_confusions, Alphabet, AnagramBuckets, FreqTables};
use lexcor::Verbosity;
use lexcor_cli::{
    create_output, ensure_extension, fatal, has_extension, open_input, print_version,
    thread_count, Options,
};

fn usage(name: &str) {
    eprintln!("usage: {name}");
    eprintln!("\t--index <indexfile>\tas produced by lexcor-indexer.");
    eprintln!("\t--hash <anahash>\tthe anagram hash file.");
    eprintln!("\t--clean <cleanfile>\tthe validated word frequency list.");
    eprintln!("\t--diac <diacriticsfile>\ta list of 'diacritical' confusions.");
    eprintln!("\t--hist <historicalfile>\ta list of 'historical' confusions.");
    eprintln!("\t--alph <alphabet>\tan alphabet file.");
    eprintln!("\t--nohld\tignore --LD for 'historical' confusions.");
    eprintln!("\t-o <outputfile>");
    eprintln!("\t-t <threads> or --threads <threads>\tnumber of worker threads,");
    eprintln!("\t\tor \"max\" for all available cores minus two.");
    eprintln!("\t--LD <distance>\tthe edit distance to use (1-10, default 2).");
    eprintln!("\t--artifrq <artifreq>\tthe artificial frequency floor.");
    eprintln!("\t-h or --help\tthis message");
    eprintln!("\t-v\tbe verbose, repeat to be more verbose");
    eprintln!("\t-V or --version\tshow version");
}

fn main() {
    let mut opts = Options::from_env();
    let progname = "lexcor-ldcalc";
    if opts.is_empty() || opts.extract_flag(&["-h", "--help"]) {
        usage(progname);
        return;
    }
    if opts.extract_flag(&["-V", "--version"]) {
        print_version(progname);
        return;
    }
    let verbosity = Verbosity(opts.count_verbose());
    let no_khc_ld = opts.extract_flag(&["--nohld"]);

    let Some(index_file) = opts.extract_value(&["--index"]) else {
        fatal("missing --index option");
    };
    if !has_extension(&index_file, ".index") && !has_extension(&index_file, ".indexNT") {
        fatal("--index files must have extension: '.index' or '.indexNT'");
    }
    let Some(hash_file) = opts.extract_value(&["--hash"]) else {
        fatal("missing --hash option");
    };
    let Some(clean_file) = opts.extract_value(&["--clean"]) else {
        fatal("missing --clean option");
    };
    let alph_file = opts.extract_value(&["--alph"]);
    let hist_file = opts.extract_value(&["--hist"]);
    let diac_file = opts.extract_value(&["--diac"]);
    if let Some(ref f) = diac_file {
        if !has_extension(f, ".diac") {
            fatal(&format!("invalid extension for --diac file '{f}' (must be .diac)"));
        }
    }
    let out_file = match opts.extract_value(&["-o"]) {
        Some(name) => ensure_extension(name, ".ldcalc"),
        None => format!("{index_file}.ldcalc"),
    };
    let ambi_file = format!("{out_file}.ambi");
    let artifreq = match opts.extract_value(&["--artifrq"]) {
        Some(v) => v
            .parse::<u64>()
            .unwrap_or_else(|_| fatal(&format!("illegal value for --artifrq ({v})"))),
        None => 0,
    };
    let ld_limit = match opts.extract_value(&["--LD"]) {
        Some(v) => {
            let ld = v
                .parse::<usize>()
                .unwrap_or_else(|_| fatal(&format!("illegal value for --LD ({v})")));
            if !(1..=10).contains(&ld) {
                fatal(&format!("invalid LD value: {ld} (1-10 is OK)"));
            }
            ld
        }
        None => 2,
    };
    let threads = match opts.extract_value(&["-t", "--threads"]) {
        Some(v) => {
            let n = thread_count(&v).unwrap_or_else(|e| fatal(&e));
            println!("running on {n} threads.");
            n
        }
        None => 1,
    };
    if let Some(unsupported) = opts.unsupported() {
        eprintln!("unsupported option: {unsupported}");
        usage(progname);
        std::process::exit(1);
    }
    if !opts.positionals().is_empty() {
        fatal("no positional arguments expected");
    }

    let alphabet = match alph_file {
        Some(f) => {
            println!("{progname}: reading alphabet: {f}");
            Alphabet::load(Path::new(&f)).unwrap_or_else(|e| fatal(&e.to_string()))
        }
        None => Alphabet::default(),
    };
    println!("{progname}: read {} letters with frequencies", alphabet.len());

    println!("{progname}: reading clean file: {clean_file}");
    let freqs =
        FreqTables::load(Path::new(&clean_file), artifreq).unwrap_or_else(|e| fatal(&e.to_string()));
    println!("{progname}: read {} clean words with frequencies", freqs.len());
    println!("{progname}: skipped {} n-grams", freqs.skipped);

    let hist = match hist_file {
        Some(f) => {
            let set =
                load_tagged_confusions(Path::new(&f)).unwrap_or_else(|e| fatal(&e.to_string()));
            if set.is_empty() {
                eprintln!(
                    "{progname}: the historical confusions file {f} doesn't seem to be in the \
                     right format."
                );
                eprintln!(" should contain lines like: 10331739614#f~s");
            } else {
                println!("{progname}: read {} historical confusions.", set.len());
            }
            set
        }
        None => BTreeSet::new(),
    };

    let diac = match diac_file {
        Some(f) => {
            let set =
                load_tagged_confusions(Path::new(&f)).unwrap_or_else(|e| fatal(&e.to_string()));
            if set.is_empty() {
                fatal(&format!(
                    "the diacritical confusions file {f} doesn't seem to be in the right format. \
                     should contain lines like: 10331739614#e~é"
                ));
            }
            println!("{progname}: read {} diacritical confusions.", set.len());
            set
        }
        None => BTreeSet::new(),
    };

    let buckets =
        AnagramBuckets::load(Path::new(&hash_file)).unwrap_or_else(|e| fatal(&e.to_string()));
    println!("{progname}: read {} hash values", buckets.len());

    let cfg = LdCalcConfig {
        ld_limit,
        artifreq,
        no_khc_ld,
        threads,
        verbosity,
    };
    let out = create_output(&out_file);
    let calc = LdCalc::new(&cfg, &buckets, &freqs, &alphabet, &hist, &diac, out)
        .unwrap_or_else(|e| fatal(&e.to_string()));

    let index_reader = open_input(&index_file);
    calc.process_index(index_reader, Path::new(&index_file))
        .unwrap_or_else(|e| fatal(&e.to_string()));

    println!();
    println!("creating .ambi file: {ambi_file}");
    let mut ambi_out = create_output(&ambi_file);
    let (_out, stats) = calc
        .finish(&mut ambi_out)
        .unwrap_or_else(|e| fatal(&e.to_string()));
    ambi_out
        .flush()
        .unwrap_or_else(|e| fatal(&format!("problem writing {ambi_file}: {e}")));
    if verbosity.at_least(1) {
        println!(
            "{progname}: {} index lines, {} comparisons, {} transposition records",
            stats.index_lines, stats.comparisons, stats.transpositions
        );
    }
    println!("{progname}: Done");
}

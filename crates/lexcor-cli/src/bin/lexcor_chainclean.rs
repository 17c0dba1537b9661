// lexcor-chainclean: prune chained records explained by shorter
// corrections.
//
// Takes the output of lexcor-chain plus a validated lexicon. Multi-token
// variants whose unknown part was already resolved by a unigram
// correction are deleted, as are variants under the length floor.
// Survivors keep their input order; deletions land in a .deleted
// companion file.

use std::collections::BTreeSet;
use std::io::{BufRead, Write};
use std::path::Path;

use lexcor::chainclean::{clean_records, write_results, ChainRecord, CleanConfig};
use lexcor::tables::load_validated_lexicon;
use lexcor::Verbosity;
use lexcor_cli::{create_output, fatal, open_input, print_version, Options};

fn usage(name: &str) {
    eprintln!("usage: {name} [options] chainfile");
    eprintln!("\t\tthe chainfile is an output file from lexcor-chain.");
    eprintln!("\t--lexicon <file>\ta validated lexicon.");
    eprintln!("\t--artifrq <artifreq>\tthe artificial frequency floor.");
    eprintln!("\t\t(default 100000000)");
    eprintln!("\t--low=<low>\tdelete records with variants shorter than 'low'");
    eprintln!("\t\tcharacters. (default = 5)");
    eprintln!("\t--follow=<word,word,...>\ttrace these words on stderr.");
    eprintln!("\t\t(may be repeated)");
    eprintln!("\t-o <outputfile>\tname of the output file.");
    eprintln!("\t-h or --help\tthis message.");
    eprintln!("\t-v\tbe verbose, repeat to be more verbose.");
    eprintln!("\t-V or --version\tshow version.");
}

fn main() {
    let mut opts = Options::from_env();
    let progname = "lexcor-chainclean";
    if opts.is_empty() || opts.extract_flag(&["-h", "--help"]) {
        usage(progname);
        return;
    }
    if opts.extract_flag(&["-V", "--version"]) {
        print_version(progname);
        return;
    }
    let verbosity = Verbosity(opts.count_verbose());
    let artifreq = match opts.extract_value(&["--artifrq"]) {
        Some(v) => v
            .parse::<u64>()
            .unwrap_or_else(|_| fatal(&format!("illegal value for --artifrq ({v})"))),
        None => 100_000_000,
    };
    let low_limit = match opts.extract_value(&["--low"]) {
        Some(v) => v
            .parse::<usize>()
            .unwrap_or_else(|_| fatal(&format!("illegal value for --low ({v})"))),
        None => 5,
    };
    let Some(lexicon_file) = opts.extract_value(&["--lexicon"]) else {
        fatal("missing --lexicon option");
    };
    let mut follow = BTreeSet::new();
    for value in opts.extract_values("--follow") {
        for word in value.split(',').filter(|w| !w.is_empty()) {
            follow.insert(word.to_string());
        }
    }
    let out_opt = opts.extract_value(&["-o"]);
    if let Some(unsupported) = opts.unsupported() {
        eprintln!("unsupported option: {unsupported}");
        usage(progname);
        std::process::exit(1);
    }
    let files = opts.positionals();
    if files.is_empty() {
        fatal("missing an input file");
    }
    if files.len() > 1 {
        fatal("only one input file may be provided");
    }
    let in_file = &files[0];
    let out_file = out_opt.unwrap_or_else(|| format!("{in_file}.cleaned"));
    if &out_file == in_file {
        fatal("same filename for input and output!");
    }
    let deleted_file = format!("{out_file}.deleted");

    let valid_words = load_validated_lexicon(Path::new(&lexicon_file), artifreq)
        .unwrap_or_else(|e| fatal(&e.to_string()));
    println!("read {} validated words from {lexicon_file}", valid_words.len());

    println!("start reading chained results");
    let input = open_input(in_file);
    let mut records = Vec::new();
    for (line_nr, line) in input.lines().enumerate() {
        let line = line.unwrap_or_else(|e| fatal(&format!("problem reading {in_file}: {e}")));
        let Some(record) = ChainRecord::parse(&line) else {
            fatal(&format!(
                "{in_file}:{}: chained file should have 6 items per line: '{line}'",
                line_nr + 1
            ));
        };
        records.push(record);
    }
    println!("start processing {} chained results", records.len());

    let cfg = CleanConfig {
        artifreq,
        low_limit,
        follow,
        verbosity,
    };
    clean_records(&mut records, &valid_words, &cfg);

    let mut out = create_output(&out_file);
    let mut deleted_out = create_output(&deleted_file);
    let (kept, dropped) = write_results(&records, &mut out, &mut deleted_out)
        .and_then(|counts| {
            out.flush()?;
            deleted_out.flush()?;
            Ok(counts)
        })
        .unwrap_or_else(|e| fatal(&format!("problem writing results: {e}")));
    eprintln!("wrote {kept} records to {out_file}");
    eprintln!("wrote {dropped} DELETED records to {deleted_file}");
}

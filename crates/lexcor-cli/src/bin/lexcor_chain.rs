// lexcor-chain: union ranked correction records into chains.
//
// Reads a .ranked file (best candidates first) and links every variant to
// a canonical head, following candidates that were themselves corrected
// earlier. Output lists each member under its head, classes sorted by
// descending head frequency.

use std::io::BufRead;
use std::io::Write;

use lexcor::chain::ChainBuilder;
use lexcor::Verbosity;
use lexcor_cli::{create_output, ensure_extension, fatal, has_extension, open_input, print_version, Options};

fn usage(name: &str) {
    eprintln!("usage: {name} [options] rankedfile");
    eprintln!("\t--caseless\tcalculate the edit distance ignoring case.");
    eprintln!("\t-o <outputfile>\tname of the output file.");
    eprintln!("\t-h or --help\tthis message.");
    eprintln!("\t-v\tbe verbose, repeat to be more verbose.");
    eprintln!("\t-V or --version\tshow version.");
}

fn main() {
    let mut opts = Options::from_env();
    let progname = "lexcor-chain";
    if opts.is_empty() || opts.extract_flag(&["-h", "--help"]) {
        usage(progname);
        return;
    }
    if opts.extract_flag(&["-V", "--version"]) {
        print_version(progname);
        return;
    }
    let verbosity = Verbosity(opts.count_verbose());
    let caseless = opts.extract_flag(&["--caseless"]);
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
    if !has_extension(in_file, ".ranked") {
        fatal("input file must have extension .ranked");
    }
    let out_file = match out_opt {
        Some(name) => ensure_extension(name, ".chained"),
        None => format!("{in_file}.chained"),
    };
    if &out_file == in_file {
        fatal("same filename for input and output!");
    }

    let mut chains = ChainBuilder::new(caseless, verbosity);
    let input = open_input(in_file);
    for line in input.lines() {
        let line = line.unwrap_or_else(|e| fatal(&format!("problem reading {in_file}: {e}")));
        match chains.fill(&line) {
            Ok(true) => {}
            Ok(false) => eprintln!("invalid line: '{line}'"),
            Err(e) => fatal(&e.to_string()),
        }
    }

    if verbosity.at_least(1) {
        let debug_file = format!("{out_file}.debug");
        let mut db = create_output(&debug_file);
        chains
            .write_debug(&mut db)
            .and_then(|()| db.flush())
            .unwrap_or_else(|e| fatal(&format!("problem writing {debug_file}: {e}")));
        println!("debug info stored in {debug_file}");
    }

    let mut out = create_output(&out_file);
    chains
        .write_output(&mut out)
        .and_then(|()| out.flush())
        .unwrap_or_else(|e| fatal(&format!("problem writing {out_file}: {e}")));
    println!("results in {out_file}");
}

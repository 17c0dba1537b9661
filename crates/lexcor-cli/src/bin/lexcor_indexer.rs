// lexcor-indexer: join the corpus anagram keys against the confusion keys.
//
// Reads the anagram-hash file and the character-confusion file, and writes
// one line per confusion value listing every admissible anagram key whose
// confused counterpart is also in the corpus: `conf#a1,a2,...`. An
// optional foci file narrows the output to pairs touching a focus key.

use lexcor::tables::{load_confusion_keys, load_foci, AdmissibleKeys};
use lexcor::{indexer, Verbosity};
use lexcor_cli::{
    create_output, ensure_extension, fatal, has_extension, print_version, strip_last_extension,
    thread_count, Options,
};
use std::io::Write;
use std::path::Path;

fn usage(name: &str) {
    eprintln!("{name}");
    eprintln!("options:");
    eprintln!("\t--hash=<anahash>\tname of the anagram hash file.");
    eprintln!("\t--charconf=<charconf>\tname of the character confusion file.");
    eprintln!("\t--foci=<focifile>\tonly emit pairs involving the anagram values");
    eprintln!("\t\tlisted in this file.");
    eprintln!("\t-o <outputfile>\tname for the output file.");
    eprintln!("\t--low=<low>\tskip entries from the anagram file shorter than");
    eprintln!("\t\t'low' characters. (default = 5)");
    eprintln!("\t--high=<high>\tskip entries from the anagram file longer than");
    eprintln!("\t\t'high' characters. (default = 35)");
    eprintln!("\t-t <threads> or --threads <threads>\tnumber of worker threads,");
    eprintln!("\t\tor \"max\" for all available cores minus two.");
    eprintln!("\t-V or --version\tshow version");
    eprintln!("\t-v\tverbosity");
    eprintln!("\t-h or --help\tthis message");
}

fn main() {
    let mut opts = Options::from_env();
    let progname = "lexcor-indexer";
    if opts.is_empty() || opts.extract_flag(&["-h", "--help"]) {
        usage(progname);
        return;
    }
    if opts.extract_flag(&["-V", "--version"]) {
        print_version(progname);
        return;
    }
    let verbosity = Verbosity(opts.count_verbose());

    let Some(hash_file) = opts.extract_value(&["--hash"]) else {
        fatal("missing --hash option");
    };
    let Some(conf_file) = opts.extract_value(&["--charconf"]) else {
        fatal("missing --charconf option");
    };
    let foci_file = opts.extract_value(&["--foci"]);
    let low = match opts.extract_value(&["--low"]) {
        Some(v) => v
            .parse::<usize>()
            .unwrap_or_else(|_| fatal(&format!("illegal value for --low ({v})"))),
        None => 5,
    };
    let high = match opts.extract_value(&["--high"]) {
        Some(v) => v
            .parse::<usize>()
            .unwrap_or_else(|_| fatal(&format!("illegal value for --high ({v})"))),
        None => 35,
    };
    let threads = match opts.extract_value(&["-t", "--threads"]) {
        Some(v) => thread_count(&v).unwrap_or_else(|e| fatal(&e)),
        None => 1,
    };
    let out_file = match opts.extract_value(&["-o"]) {
        Some(name) => {
            if has_extension(&name, ".indexNT") {
                name
            } else {
                ensure_extension(name, ".index")
            }
        }
        None => format!("{}.index", strip_last_extension(&hash_file)),
    };
    if let Some(unsupported) = opts.unsupported() {
        eprintln!("unsupported option: {unsupported}");
        usage(progname);
        std::process::exit(1);
    }
    if !opts.positionals().is_empty() {
        fatal("no positional arguments expected");
    }

    println!("reading anagram hash values");
    let admissible = AdmissibleKeys::load(Path::new(&hash_file), low, high, verbosity)
        .unwrap_or_else(|e| fatal(&e.to_string()));
    println!("read {} anagram values", admissible.keys.len());
    println!("skipped {} out-of-band anagram values", admissible.skipped);

    println!("reading character confusion values");
    let confusions =
        load_confusion_keys(Path::new(&conf_file)).unwrap_or_else(|e| fatal(&e.to_string()));
    println!("read {} confusion values", confusions.len());

    let foci = foci_file.map(|f| {
        let set = load_foci(Path::new(&f)).unwrap_or_else(|e| fatal(&e.to_string()));
        println!("read {} foci values", set.len());
        set
    });

    let mut out = create_output(&out_file);
    if threads > 1 {
        println!("running on {threads} threads.");
    }
    println!("processing all confusion values");
    indexer::write_index(&mut out, &admissible.keys, &confusions, foci.as_ref(), threads)
        .unwrap_or_else(|e| fatal(&e.to_string()));
    out.flush()
        .unwrap_or_else(|e| fatal(&format!("problem writing {out_file}: {e}")));
    println!("results in {out_file}");
}

// lexcor-cli: shared utilities for the pipeline tools.
//
// All four binaries share the same small option surface (-h, -V,
// repeatable -v, -o, value options in --name=value or --name value form),
// so the scanning lives here rather than in each tool. Unrecognized
// options are rejected after extraction; whatever remains is positional.

use std::fs::File;
use std::io::BufWriter;
use std::process;
use std::thread;

/// Command-line arguments with destructive extraction.
pub struct Options {
    args: Vec<String>,
}

impl Options {
    pub fn from_env() -> Self {
        Options {
            args: std::env::args().skip(1).collect(),
        }
    }

    pub fn from_args(args: Vec<String>) -> Self {
        Options { args }
    }

    /// True when no arguments were given at all.
    pub fn is_empty(&self) -> bool {
        self.args.is_empty()
    }

    /// Remove the first occurrence of any of `names`; true if one was
    /// present.
    pub fn extract_flag(&mut self, names: &[&str]) -> bool {
        if let Some(pos) = self.args.iter().position(|a| names.contains(&a.as_str())) {
            self.args.remove(pos);
            true
        } else {
            false
        }
    }

    /// Count repeated `-v` style verbosity flags, combined (`-vv`) or
    /// separate, and remove them.
    pub fn count_verbose(&mut self) -> u8 {
        let mut count = 0u8;
        self.args.retain(|a| {
            let is_verbose =
                a.len() > 1 && a.starts_with('-') && a[1..].chars().all(|c| c == 'v');
            if is_verbose {
                count = count.saturating_add((a.len() - 1) as u8);
            }
            !is_verbose
        });
        count
    }

    /// Extract the first value option matching any of `names`, accepting
    /// both `--name=value` and `--name value` (or `-x value`) forms.
    /// A trailing name without a value is fatal.
    pub fn extract_value(&mut self, names: &[&str]) -> Option<String> {
        // Locate first, mutate after: (index, matched name, inline value).
        let mut found: Option<(usize, String, Option<String>)> = None;
        'scan: for (i, arg) in self.args.iter().enumerate() {
            for name in names {
                if name.starts_with("--") {
                    if let Some(v) = arg.strip_prefix(&format!("{name}=")) {
                        found = Some((i, name.to_string(), Some(v.to_string())));
                        break 'scan;
                    }
                }
                if arg == name {
                    found = Some((i, name.to_string(), None));
                    break 'scan;
                }
            }
        }
        match found {
            Some((i, _, Some(value))) => {
                self.args.remove(i);
                Some(value)
            }
            Some((i, name, None)) => {
                if i + 1 >= self.args.len() {
                    fatal(&format!("option {name} requires a value"));
                }
                let value = self.args[i + 1].clone();
                self.args.drain(i..=i + 1);
                Some(value)
            }
            None => None,
        }
    }

    /// Extract every occurrence of a repeatable value option.
    pub fn extract_values(&mut self, name: &str) -> Vec<String> {
        let mut values = Vec::new();
        while let Some(v) = self.extract_value(&[name]) {
            values.push(v);
        }
        values
    }

    /// First remaining argument still looking like an option, if any.
    pub fn unsupported(&self) -> Option<&str> {
        self.args
            .iter()
            .find(|a| a.starts_with('-') && a.len() > 1)
            .map(String::as_str)
    }

    /// Consume the parser, yielding the positional arguments.
    pub fn positionals(self) -> Vec<String> {
        self.args
    }
}

/// Print an error message and exit with code 1.
pub fn fatal(msg: &str) -> ! {
    eprintln!("error: {msg}");
    process::exit(1);
}

/// Print the tool name and workspace version, for `-V`.
pub fn print_version(tool: &str) {
    eprintln!("{tool}: lexcor {}", env!("CARGO_PKG_VERSION"));
}

/// Resolve a `-t`/`--threads` argument. The sentinel "max" means two less
/// than the available cores, with a floor of one.
pub fn thread_count(spec: &str) -> Result<usize, String> {
    if spec.eq_ignore_ascii_case("max") {
        let cores = thread::available_parallelism().map(usize::from).unwrap_or(1);
        return Ok(cores.saturating_sub(2).max(1));
    }
    match spec.parse::<usize>() {
        Ok(n) if n >= 1 => Ok(n),
        _ => Err(format!("illegal value for threads ({spec})")),
    }
}

/// True when `name` ends in `ext` (extension including the dot).
pub fn has_extension(name: &str, ext: &str) -> bool {
    name.ends_with(ext)
}

/// Append `ext` unless `name` already carries it.
pub fn ensure_extension(mut name: String, ext: &str) -> String {
    if !has_extension(&name, ext) {
        name.push_str(ext);
    }
    name
}

/// `name` without its last dot-extension (the whole name when it has
/// none).
pub fn strip_last_extension(name: &str) -> &str {
    match name.rfind('.') {
        Some(pos) => &name[..pos],
        None => name,
    }
}

/// Create an output file for buffered writing, or die trying.
pub fn create_output(path: &str) -> BufWriter<File> {
    match File::create(path) {
        Ok(f) => BufWriter::new(f),
        Err(e) => fatal(&format!("problem opening output file {path}: {e}")),
    }
}

/// Open an input file for buffered reading, or die trying.
pub fn open_input(path: &str) -> std::io::BufReader<File> {
    match File::open(path) {
        Ok(f) => std::io::BufReader::new(f),
        Err(e) => fatal(&format!("problem opening input file {path}: {e}")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn opts(args: &[&str]) -> Options {
        Options::from_args(args.iter().map(|s| s.to_string()).collect())
    }

    #[test]
    fn flags_are_extracted_once() {
        let mut o = opts(&["-h", "file"]);
        assert!(o.extract_flag(&["-h", "--help"]));
        assert!(!o.extract_flag(&["-h", "--help"]));
        assert_eq!(o.positionals(), vec!["file".to_string()]);
    }

    #[test]
    fn verbosity_counts_combined_and_separate() {
        let mut o = opts(&["-v", "-vv", "x"]);
        assert_eq!(o.count_verbose(), 3);
        assert_eq!(o.positionals(), vec!["x".to_string()]);
    }

    #[test]
    fn value_options_in_both_forms() {
        let mut o = opts(&["--hash=foo.tsv", "--low", "7", "-o", "out"]);
        assert_eq!(o.extract_value(&["--hash"]), Some("foo.tsv".to_string()));
        assert_eq!(o.extract_value(&["--low"]), Some("7".to_string()));
        assert_eq!(o.extract_value(&["-o"]), Some("out".to_string()));
        assert_eq!(o.extract_value(&["--missing"]), None);
        assert!(o.unsupported().is_none());
    }

    #[test]
    fn repeatable_values_collect_in_order() {
        let mut o = opts(&["--follow=a", "--follow", "b,c"]);
        assert_eq!(
            o.extract_values("--follow"),
            vec!["a".to_string(), "b,c".to_string()]
        );
    }

    #[test]
    fn unsupported_options_are_visible() {
        let mut o = opts(&["--what", "x", "pos"]);
        let _ = o.extract_value(&["--hash"]);
        assert_eq!(o.unsupported(), Some("--what"));
    }

    #[test]
    fn extension_helpers() {
        assert!(has_extension("a.index", ".index"));
        assert_eq!(ensure_extension("a".to_string(), ".index"), "a.index");
        assert_eq!(ensure_extension("a.index".to_string(), ".index"), "a.index");
        assert_eq!(strip_last_extension("corpus.tsv"), "corpus");
        assert_eq!(strip_last_extension("corpus"), "corpus");
    }

    #[test]
    fn thread_count_parses_numbers_and_max() {
        assert_eq!(thread_count("4"), Ok(4));
        assert!(thread_count("0").is_err());
        assert!(thread_count("veel").is_err());
        assert!(thread_count("max").expect("max resolves") >= 1);
    }
}

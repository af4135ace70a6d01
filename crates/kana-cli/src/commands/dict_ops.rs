use std::fs;
use std::path::{Path, PathBuf};
use std::process;

use kana_core::dict::{CompileOptions, CompileStats, KanaDictionary, KanaMatcher, SortedWordList};
use kana_core::prefix::prefix_candidates;
use kana_core::settings::settings;
use tracing::debug;

use crate::dict_source::SourceBuild;

macro_rules! die {
    ($result:expr, $($arg:tt)*) => {
        $result.unwrap_or_else(|e| {
            eprintln!($($arg)*, e);
            process::exit(1);
        })
    };
}

/// Inputs shared by `compile` and `check`.
pub struct BuildArgs<'a> {
    pub input: &'a str,
    pub output: &'a str,
    pub word_list: Option<&'a str>,
    pub label: Option<&'a str>,
    pub min_entries: Option<usize>,
}

impl BuildArgs<'_> {
    /// Word list path, defaulting to the matcher path with `.ekwl`.
    pub fn word_list_path(&self) -> PathBuf {
        match self.word_list {
            Some(path) => PathBuf::from(path),
            None => Path::new(self.output).with_extension("ekwl"),
        }
    }

    fn options(&self) -> CompileOptions {
        let label = self.label.unwrap_or_else(|| source_label(self.input));
        CompileOptions::from_settings(&settings().compile).with_label(label)
    }

    fn build(&self) -> SourceBuild {
        let min_entries = self
            .min_entries
            .unwrap_or(settings().source.min_entries);
        die!(
            SourceBuild::from_path(Path::new(self.input), &self.options(), min_entries),
            "Error building dictionary from {}: {}",
            self.input
        )
    }
}

/// File name of the source, so the artifact does not depend on the
/// directory it was built from.
fn source_label(input: &str) -> &str {
    Path::new(input)
        .file_name()
        .and_then(|name| name.to_str())
        .unwrap_or(input)
}

pub fn compile(args: &BuildArgs<'_>) {
    eprintln!("Source: {}", args.input);
    let build = args.build();

    let output = Path::new(args.output);
    die!(build.matcher.save(output), "Error writing {}: {}", args.output);
    let word_list = args.word_list_path();
    die!(
        build.words.save(&word_list),
        "Error writing {}: {}",
        word_list.display()
    );

    print_stats(&build.stats);
    for path in [output, word_list.as_path()] {
        let file_size = fs::metadata(path).map(|m| m.len()).unwrap_or(0);
        eprintln!("Wrote {} ({:.1} KB)", path.display(), file_size as f64 / 1024.0);
    }
}

fn print_stats(stats: &CompileStats) {
    eprintln!("  Entries:         {}", stats.entry_count);
    eprintln!("  Trie nodes:      {}", stats.trie_nodes);
    eprintln!("  Radix nodes:     {}", stats.radix_nodes);
    eprintln!("  Radix edges:     {}", stats.radix_edges);
    eprintln!("  Distinct values: {}", stats.distinct_values);
    eprintln!(
        "  Packed values:   {} bytes ({} bits)",
        stats.packed_bytes, stats.total_bits
    );
}

/// State of a committed artifact relative to a fresh build.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Staleness {
    Fresh,
    Missing,
    Outdated,
}

pub fn staleness(path: &Path, expected: &[u8]) -> Staleness {
    match fs::read(path) {
        Ok(actual) if actual == expected => Staleness::Fresh,
        Ok(_) => Staleness::Outdated,
        Err(e) => {
            debug!(path = %path.display(), "artifact unreadable: {e}");
            Staleness::Missing
        }
    }
}

pub fn check(args: &BuildArgs<'_>) {
    let build = args.build();
    let matcher_bytes = die!(build.matcher.to_bytes(), "Error encoding matcher: {}");
    let words_bytes = die!(build.words.to_bytes(), "Error encoding word list: {}");

    let word_list = args.word_list_path();
    let mut failed = false;
    for (path, bytes) in [
        (Path::new(args.output), &matcher_bytes),
        (word_list.as_path(), &words_bytes),
    ] {
        match staleness(path, bytes) {
            Staleness::Fresh => println!("OK: {}", path.display()),
            Staleness::Missing => {
                eprintln!("missing: {} (run `kanadict compile`)", path.display());
                failed = true;
            }
            Staleness::Outdated => {
                eprintln!("outdated: {} (run `kanadict compile`)", path.display());
                failed = true;
            }
        }
    }
    if failed {
        process::exit(1);
    }
}

pub fn info(file: &str) {
    let magic = fs::read(file)
        .ok()
        .and_then(|b| b.get(..4).map(|s| s.to_vec()));

    match magic.as_deref() {
        Some(b"EKMX") => info_matcher(file),
        Some(b"EKWL") => info_word_list(file),
        Some(other) => {
            eprintln!(
                "Unknown file format (magic: {:?})",
                String::from_utf8_lossy(other)
            );
            process::exit(1);
        }
        None => {
            eprintln!("Error reading file: {file}");
            process::exit(1);
        }
    }
}

fn info_matcher(file: &str) {
    let matcher = die!(
        KanaMatcher::open(Path::new(file)),
        "Error opening matcher: {}"
    );
    let file_size = fs::metadata(file).map(|m| m.len()).unwrap_or(0);
    let program = matcher.program();
    let packed = matcher.codec().packed();

    println!("Matcher:     {file}");
    println!("Source:      {}", matcher.source_label());
    println!("File size:   {:.1} KB", file_size as f64 / 1024.0);
    println!("Entries:     {}", matcher.entry_count());
    println!("Values:      {}", matcher.value_count());
    println!(
        "Program:     {} nodes, {} edges, {} label bytes",
        program.node_count(),
        program.edge_count(),
        program.label_bytes()
    );
    println!("Symbols:     {}", matcher.codec().table().len());
    println!(
        "Bitstream:   {} bits in {} bytes, {} checkpoints every {}",
        packed.total_bits(),
        packed.bytes().len(),
        packed.checkpoints().len(),
        packed.checkpoint_span()
    );

    println!();
    println!("Sample lookups:");
    for key in matcher.keys().iter().take(5) {
        let value = matcher.lookup(key).unwrap_or("(decode failed)");
        println!("  {key} → {value}");
    }
}

fn info_word_list(file: &str) {
    let words = die!(
        SortedWordList::open(Path::new(file)),
        "Error opening word list: {}"
    );
    let file_size = fs::metadata(file).map(|m| m.len()).unwrap_or(0);

    println!("Word list:   {file}");
    println!("Source:      {}", words.source_label());
    println!("File size:   {:.1} KB", file_size as f64 / 1024.0);
    println!("Words:       {}", words.len());
    if let (Some(first), Some(last)) = (words.words().first(), words.words().last()) {
        println!("Range:       {first} .. {last}");
    }
}

pub fn lookup(file: &str, word: &str) {
    let matcher = die!(
        KanaMatcher::open(Path::new(file)),
        "Error opening matcher: {}"
    );
    match matcher.lookup_raw(word) {
        Some(kana) => println!("{word} → {kana}"),
        None => println!("{word} → (not found)"),
    }
}

pub fn prefix(file: &str, word_list: &str, prefix: &str, limit: Option<usize>) {
    let matcher = die!(
        KanaMatcher::open(Path::new(file)),
        "Error opening matcher: {}"
    );
    let words = die!(
        SortedWordList::open(Path::new(word_list)),
        "Error opening word list: {}"
    );
    die!(
        words.check_consistency(&matcher),
        "Error: {word_list} does not match {file}: {}"
    );

    let candidates = prefix_candidates(&matcher, &words, prefix, limit, &settings().prefix);
    if candidates.is_empty() {
        println!("{prefix} → (no candidates)");
        return;
    }
    for (i, kana) in candidates.iter().enumerate() {
        println!("{:>3}. {kana}", i + 1);
    }
}

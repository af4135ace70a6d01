use std::fs;
use std::process;

use clap::{Parser, Subcommand};

use kana_cli::commands::dict_ops::BuildArgs;
use kana_cli::commands::{config_ops, dict_ops};
use kana_cli::trace_init::init_tracing;

#[derive(Parser)]
#[command(name = "kanadict", about = "English word to kana dictionary compiler")]
struct Cli {
    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    log_json: bool,
    /// Custom settings TOML (defaults are embedded)
    #[arg(long, global = true)]
    settings: Option<String>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Compile a JSON word → kana dictionary into a matcher and word list
    Compile {
        /// Input JSON object file
        input: String,
        /// Output matcher file (.ekmx)
        output: String,
        /// Output word list file (default: <output>.ekwl)
        #[arg(long)]
        word_list: Option<String>,
        /// Provenance label recorded in the artifacts (default: input file name)
        #[arg(long)]
        label: Option<String>,
        /// Minimum entry count after normalization
        #[arg(long)]
        min_entries: Option<usize>,
    },
    /// Verify committed artifacts are up to date with their source
    Check {
        /// Input JSON object file
        input: String,
        /// Committed matcher file (.ekmx)
        output: String,
        /// Committed word list file (default: <output>.ekwl)
        #[arg(long)]
        word_list: Option<String>,
        /// Provenance label used when compiling
        #[arg(long)]
        label: Option<String>,
        /// Minimum entry count after normalization
        #[arg(long)]
        min_entries: Option<usize>,
    },
    /// Show matcher or word list info (auto-detected by magic bytes)
    Info {
        /// Matcher (.ekmx) or word list (.ekwl) file
        file: String,
    },
    /// Look up a word (exact match)
    Lookup {
        /// Matcher file
        matcher_file: String,
        /// English word
        word: String,
    },
    /// Kana candidates for words starting with a prefix
    Prefix {
        /// Matcher file
        matcher_file: String,
        /// Word list file
        word_list_file: String,
        /// Word prefix
        prefix: String,
        /// Maximum number of candidates
        #[arg(short, long)]
        n: Option<usize>,
    },
    /// Export default settings as TOML
    SettingsExport,
    /// Validate a custom settings TOML file
    SettingsValidate {
        /// Path to the TOML file
        file: String,
    },
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.log_json);

    if let Some(path) = &cli.settings {
        let content = fs::read_to_string(path).unwrap_or_else(|e| {
            eprintln!("Error reading {path}: {e}");
            process::exit(1);
        });
        if let Err(e) = kana_core::settings::init_custom(content) {
            eprintln!("Error in {path}: {e}");
            process::exit(1);
        }
    }

    match cli.command {
        Command::Compile {
            input,
            output,
            word_list,
            label,
            min_entries,
        } => dict_ops::compile(&BuildArgs {
            input: &input,
            output: &output,
            word_list: word_list.as_deref(),
            label: label.as_deref(),
            min_entries,
        }),
        Command::Check {
            input,
            output,
            word_list,
            label,
            min_entries,
        } => dict_ops::check(&BuildArgs {
            input: &input,
            output: &output,
            word_list: word_list.as_deref(),
            label: label.as_deref(),
            min_entries,
        }),
        Command::Info { file } => dict_ops::info(&file),
        Command::Lookup { matcher_file, word } => dict_ops::lookup(&matcher_file, &word),
        Command::Prefix {
            matcher_file,
            word_list_file,
            prefix,
            n,
        } => dict_ops::prefix(&matcher_file, &word_list_file, &prefix, n),
        Command::SettingsExport => config_ops::settings_export(),
        Command::SettingsValidate { file } => config_ops::settings_validate(&file),
    }
}

use std::path::PathBuf;

use clap::{ArgAction, Parser, ValueEnum};
use lingvo_dsl::{ConvertOptions, Converter, LayoutChoice, OutputEncoding};

/// CLI wrapper for the source layout choice.
#[derive(Debug, Clone, Copy, ValueEnum)]
enum CliLayout {
    Auto,
    Tabular,
    Blocks,
}

impl From<CliLayout> for LayoutChoice {
    fn from(layout: CliLayout) -> Self {
        match layout {
            CliLayout::Auto => LayoutChoice::Auto,
            CliLayout::Tabular => LayoutChoice::Tabular,
            CliLayout::Blocks => LayoutChoice::Blocks,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum CliOutputEncoding {
    Utf16le,
    Utf8,
}

impl From<CliOutputEncoding> for OutputEncoding {
    fn from(encoding: CliOutputEncoding) -> Self {
        match encoding {
            CliOutputEncoding::Utf16le => OutputEncoding::Utf16Le,
            CliOutputEncoding::Utf8 => OutputEncoding::Utf8,
        }
    }
}

/// Convert a tab-separated or MTXT dictionary with HTML bodies into ABBYY Lingvo DSL.
#[derive(Parser, Debug)]
#[command(name = "lingvo-dsl", version, about)]
struct Cli {
    /// Source dictionary (.txt, .mtxt, ...)
    #[arg(value_name = "INPUT")]
    input: PathBuf,

    /// Output DSL file (default: <name>.dsl)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Dictionary name written to #NAME
    #[arg(short, long)]
    name: Option<String>,

    /// Index language, e.g. English
    #[arg(short, long)]
    source_lang: Option<String>,

    /// Contents language, e.g. Arabic
    #[arg(short, long)]
    target_lang: Option<String>,

    /// Source layout
    #[arg(short, long, value_enum, default_value = "auto")]
    layout: CliLayout,

    /// Input encoding label, e.g. utf-8, cp1251
    #[arg(short, long)]
    encoding: Option<String>,

    /// Output encoding
    #[arg(long, value_enum, default_value = "utf16le")]
    output_encoding: CliOutputEncoding,

    /// Do not package the resource folder
    #[arg(long)]
    no_resources: bool,

    /// Resource folder (default: <INPUT>_res)
    #[arg(long)]
    resources_dir: Option<PathBuf>,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,
}

fn main() {
    let cli = Cli::parse();

    let level = match cli.verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    let options = ConvertOptions {
        layout: cli.layout.into(),
        encoding: cli.encoding,
        output_encoding: cli.output_encoding.into(),
        output: cli.output,
        name: cli.name,
        index_language: cli.source_lang,
        contents_language: cli.target_lang,
        package_resources: !cli.no_resources,
        resources_dir: cli.resources_dir,
    };

    println!("Converting: {}", cli.input.display());
    println!("{}", "=".repeat(60));

    match Converter::new(options).convert_file(&cli.input) {
        Ok(report) => {
            println!("\n{}", "=".repeat(60));
            println!("Conversion completed.");
            println!("{}", "=".repeat(60));

            if let Some(output) = &report.output {
                println!("  Output: {}", output.display());
            }
            println!("\nStatistics:");
            println!("  Entries written: {}", report.entries_written);
            println!("  Headword lines: {}", report.headword_lines);
            println!("  Dropped blocks: {}", report.dropped_blocks);
            match report.archived_resources {
                Some(count) => println!("  Resources archived: {}", count),
                None => println!("  Resources archived: none"),
            }

            if !report.is_clean() {
                eprintln!("\n{} entries failed:", report.failed.len());
                for (headword, message) in &report.failed {
                    eprintln!("  {}: {}", headword, message);
                }
                std::process::exit(1);
            }
        }
        Err(e) => {
            eprintln!("\nERROR: {}", e);
            std::process::exit(1);
        }
    }
}

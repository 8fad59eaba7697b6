//! paperweave CLI - layout reconciliation and tagger-output consolidation

use std::fs;
use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;

use paperweave::labeling::{
    fix_double_begin_markers, relabel_table_figure_as_paragraph, repair_caption_boundary,
    revert_bad_spans, splice_discarded_tokens_back, DiscardedSpan,
};
use paperweave::layout::DEFAULT_FILE_SIZE_LIMIT;
use paperweave::{
    find_node_depth, load_document, load_json, load_tagged_sequence, parse_outline_file, to_json,
    AdaptiveThresholds, ConsolidationOptions, JsonFormat, LayoutStatistics, PageSelection,
    StructuralObject, Strictness, VectorGraphicsExtractor, VectorOptions,
};

#[derive(Parser)]
#[command(name = "paperweave")]
#[command(version)]
#[command(about = "Reconcile layout geometry and consolidate tagger output", long_about = None)]
struct Cli {
    /// Log level when RUST_LOG is not set
    #[arg(long, global = true, env = "PAPERWEAVE_LOG", default_value = "warn")]
    log_level: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Relabel every table and figure row as paragraph text
    Relabel {
        /// Tagged sequence file
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Output file (stdout if not specified)
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,
    },

    /// Demote repeated table and figure begin markers
    FixBegins {
        /// Tagged sequence file
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Output file (stdout if not specified)
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,
    },

    /// Revert the spans of rejected tables and figures to paragraph text
    Revert {
        /// Tagged sequence file
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// JSON array of rejected tables and figures
        #[arg(long, value_name = "FILE")]
        objects: PathBuf,

        /// Candidate search mode
        #[arg(long, value_enum, default_value = "auto")]
        strictness: StrictnessArg,

        /// Output file (stdout if not specified)
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,
    },

    /// Insert discarded rows back into a tagged sequence
    Splice {
        /// Tagged sequence file
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// JSON array of discarded spans
        #[arg(long, value_name = "FILE")]
        spans: PathBuf,

        /// Output file (stdout if not specified)
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,
    },

    /// Extract graphic regions from per-page SVG markup
    Vectors {
        /// Directory holding image-<page>.svg files
        #[arg(value_name = "DIR")]
        dir: PathBuf,

        /// Document JSON with page geometry
        #[arg(long, value_name = "FILE")]
        document: PathBuf,

        /// Page range (e.g., "1-10", "1,3,5")
        #[arg(long)]
        pages: Option<String>,

        /// Extract pages one after another
        #[arg(long)]
        no_parallel: bool,

        /// Skip markup files larger than this many bytes
        #[arg(long, value_name = "BYTES", default_value_t = DEFAULT_FILE_SIZE_LIMIT)]
        size_limit: u64,

        /// Keep touching regions separate
        #[arg(long)]
        no_merge: bool,

        /// Drop merged regions no larger than this area (3000 suits most papers)
        #[arg(long, value_name = "AREA", default_value_t = 0.0)]
        min_area: f64,

        /// Output file (stdout if not specified)
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,

        /// Output compact JSON
        #[arg(long)]
        compact: bool,
    },

    /// Parse outline XML into a tree
    Outline {
        /// Outline XML file
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Print the depth of this heading instead of the tree
        #[arg(long, value_name = "LABEL")]
        find: Option<String>,

        /// Output file (stdout if not specified)
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,
    },

    /// Compute spacing medians and adaptive thresholds
    Stats {
        /// Document JSON
        #[arg(value_name = "FILE")]
        document: PathBuf,

        /// Output file (stdout if not specified)
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,
    },

    /// Split the blocks after a figure caption into kept and excluded
    Caption {
        /// Figure JSON with its caption range
        #[arg(value_name = "FILE")]
        figure: PathBuf,

        /// Document JSON holding the blocks
        #[arg(long, value_name = "FILE")]
        document: PathBuf,

        /// Output file (stdout if not specified)
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,
    },

    /// Show version information
    Version,
}

#[derive(Copy, Clone, PartialEq, Eq, ValueEnum)]
enum StrictnessArg {
    /// Strict unless more objects are flagged than begin rows exist
    Auto,
    /// Prefer begin rows
    Strict,
    /// Accept begin and continuation rows alike
    Lenient,
}

impl From<StrictnessArg> for Strictness {
    fn from(arg: StrictnessArg) -> Self {
        match arg {
            StrictnessArg::Auto => Strictness::Auto,
            StrictnessArg::Strict => Strictness::Strict,
            StrictnessArg::Lenient => Strictness::Lenient,
        }
    }
}

type CliResult = Result<(), Box<dyn std::error::Error>>;

fn main() {
    let cli = Cli::parse();

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(&cli.log_level))
        .init();

    let result = match cli.command {
        Commands::Relabel { input, output } => cmd_relabel(&input, output.as_deref()),
        Commands::FixBegins { input, output } => cmd_fix_begins(&input, output.as_deref()),
        Commands::Revert {
            input,
            objects,
            strictness,
            output,
        } => cmd_revert(&input, &objects, strictness, output.as_deref()),
        Commands::Splice {
            input,
            spans,
            output,
        } => cmd_splice(&input, &spans, output.as_deref()),
        Commands::Vectors {
            dir,
            document,
            pages,
            no_parallel,
            size_limit,
            no_merge,
            min_area,
            output,
            compact,
        } => {
            let options = VectorOptions::new()
                .with_parallel(!no_parallel)
                .with_file_size_limit(size_limit)
                .with_merge_touching(!no_merge)
                .with_min_box_area(min_area);
            cmd_vectors(
                &dir,
                &document,
                pages.as_deref(),
                options,
                output.as_deref(),
                compact,
            )
        }
        Commands::Outline {
            input,
            find,
            output,
        } => cmd_outline(&input, find.as_deref(), output.as_deref()),
        Commands::Stats { document, output } => cmd_stats(&document, output.as_deref()),
        Commands::Caption {
            figure,
            document,
            output,
        } => cmd_caption(&figure, &document, output.as_deref()),
        Commands::Version => {
            cmd_version();
            Ok(())
        }
    };

    if let Err(e) = result {
        eprintln!("{}: {}", "Error".red().bold(), e);
        std::process::exit(1);
    }
}

fn emit(content: &str, output: Option<&Path>) -> CliResult {
    if let Some(path) = output {
        fs::write(path, content)?;
        eprintln!("{} {}", "Saved to".green(), path.display());
    } else {
        print!("{}", content);
        if !content.ends_with('\n') {
            println!();
        }
    }
    Ok(())
}

fn json_format(compact: bool) -> JsonFormat {
    if compact {
        JsonFormat::Compact
    } else {
        JsonFormat::Pretty
    }
}

fn cmd_relabel(input: &Path, output: Option<&Path>) -> CliResult {
    let sequence = load_tagged_sequence(input)?;
    let relabeled = relabel_table_figure_as_paragraph(&sequence);
    emit(&relabeled.to_string(), output)
}

fn cmd_fix_begins(input: &Path, output: Option<&Path>) -> CliResult {
    let sequence = load_tagged_sequence(input)?;
    let fixed = fix_double_begin_markers(&sequence);
    emit(&fixed.to_string(), output)
}

fn cmd_revert(
    input: &Path,
    objects: &Path,
    strictness: StrictnessArg,
    output: Option<&Path>,
) -> CliResult {
    let sequence = load_tagged_sequence(input)?;
    let objects: Vec<StructuralObject> = load_json(objects)?;
    let options = ConsolidationOptions::new().with_strictness(strictness.into());

    let reverted = revert_bad_spans(&objects, &sequence, &options);
    emit(&reverted.to_string(), output)
}

fn cmd_splice(input: &Path, spans: &Path, output: Option<&Path>) -> CliResult {
    let sequence = load_tagged_sequence(input)?;
    let spans: Vec<DiscardedSpan> = load_json(spans)?;

    let spliced = splice_discarded_tokens_back(&spans, &sequence)?;
    emit(&spliced.to_string(), output)
}

fn cmd_vectors(
    dir: &Path,
    document: &Path,
    pages: Option<&str>,
    options: VectorOptions,
    output: Option<&Path>,
    compact: bool,
) -> CliResult {
    let page_selection = if let Some(p) = pages {
        PageSelection::parse(p).map_err(|e| format!("Invalid page range: {}", e))?
    } else {
        PageSelection::All
    };

    let document = load_document(document)?;
    let extractor = VectorGraphicsExtractor::new(options.with_pages(page_selection));
    let graphics = extractor.extract_document(dir, &document);

    let total: usize = graphics.values().map(Vec::len).sum();
    log::info!("{} graphic regions on {} pages", total, graphics.len());

    emit(&to_json(&graphics, json_format(compact))?, output)
}

fn cmd_outline(input: &Path, find: Option<&str>, output: Option<&Path>) -> CliResult {
    let root = parse_outline_file(input)?;

    match find {
        Some(label) => {
            let depth = find_node_depth(&root, label, 0);
            if depth < 0 {
                eprintln!("{} '{}'", "Not found:".yellow(), label);
            }
            emit(&depth.to_string(), output)
        }
        None => emit(&to_json(&root, JsonFormat::Pretty)?, output),
    }
}

fn cmd_stats(document: &Path, output: Option<&Path>) -> CliResult {
    let document = load_document(document)?;
    let statistics = LayoutStatistics::compute(&document)?;
    let thresholds = AdaptiveThresholds::from_document(&document)?;

    let report = serde_json::json!({
        "statistics": statistics,
        "thresholds": thresholds,
    });
    emit(&to_json(&report, JsonFormat::Pretty)?, output)
}

fn cmd_caption(figure: &Path, document: &Path, output: Option<&Path>) -> CliResult {
    let figure: StructuralObject = load_json(figure)?;
    let document = load_document(document)?;
    let blocks: Vec<_> = document.blocks().cloned().collect();

    let repair = repair_caption_boundary(&figure, &blocks).ok_or("No caption block found")?;
    emit(&to_json(&repair, JsonFormat::Pretty)?, output)
}

fn cmd_version() {
    println!("{} {}", "paperweave".cyan().bold(), env!("CARGO_PKG_VERSION"));
    println!("Layout reconciliation and tagger-output consolidation");
    println!();
    println!("License: MIT");
}

//! Context Words - Main Entry Point
//!
//! Extracts context word windows around token occurrences in a parsed corpus.

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use anyhow::{anyhow, bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use contextwords::batch::BatchExtractor;
use contextwords::dependency::{PathFinder, SentenceGraph};
use contextwords::matcher::{LineMatcher, RegexLineMatcher};
use contextwords::output::{OutputFormat, SlotWriter};
use contextwords::processing::{FileFilter, FileProcessor};
use contextwords::types::{ExtractionConfig, OccurrenceId, SentenceBoundary};
use contextwords::window::{find_occurrences, WindowExtractor};

#[derive(Parser, Debug)]
#[command(name = "contextwords", version, about = "Context word extraction for parsed corpora")]
struct Cli {
    /// Emit logs as JSON
    #[arg(long, global = true, env = "CONTEXTWORDS_LOG_JSON")]
    log_json: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Options shared by the subcommands that read a corpus.
#[derive(Args, Debug)]
struct CorpusArgs {
    /// Corpus files or directories
    #[arg(required = true)]
    corpus: Vec<PathBuf>,

    /// Path to a config file (JSON, TOML or YAML)
    #[arg(long)]
    config: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Extract context word windows around occurrences of a type.
    Extract {
        #[command(flatten)]
        corpus: CorpusArgs,

        /// Target type, e.g. `eat/V`
        #[arg(long = "type")]
        target_type: String,

        /// Occurrence ids; when neither this nor --tokens is given, every
        /// occurrence of the type in the corpus is used
        #[arg(long = "token")]
        tokens: Vec<String>,

        /// File with one occurrence id per line
        #[arg(long = "tokens")]
        tokens_file: Option<PathBuf>,

        /// Lines to the left of the target
        #[arg(long)]
        left: Option<usize>,

        /// Lines to the right of the target
        #[arg(long)]
        right: Option<usize>,

        /// Compute dependency paths
        #[arg(long)]
        dependency: bool,

        /// Treat every line as part of the target's sentence
        #[arg(long)]
        no_boundaries: bool,

        /// Output format: tsv or jsonl
        #[arg(long, default_value = "tsv")]
        format: OutputFormat,

        /// Output file (stdout when absent)
        #[arg(long, short)]
        output: Option<PathBuf>,

        /// Files processed concurrently
        #[arg(long)]
        concurrency: Option<usize>,
    },

    /// List the occurrence ids of a type.
    Occurrences {
        #[command(flatten)]
        corpus: CorpusArgs,

        /// Type to look for, e.g. `eat/V`
        #[arg(long = "type")]
        target_type: String,
    },

    /// Print the dependency paths from one token to the rest of its sentence.
    Paths {
        /// Corpus file
        #[arg(long)]
        file: PathBuf,

        /// 1-based line of the target token
        #[arg(long)]
        line: usize,

        /// Path to a config file (JSON, TOML or YAML)
        #[arg(long)]
        config: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    // Initialize tracing
    let filter = tracing_subscriber::EnvFilter::new(
        std::env::var("RUST_LOG").unwrap_or_else(|_| "contextwords=info".into()),
    );
    tracing_subscriber::registry()
        .with(filter)
        .with(cli.log_json.then(|| tracing_subscriber::fmt::layer().json().with_writer(io::stderr)))
        .with((!cli.log_json).then(|| tracing_subscriber::fmt::layer().with_writer(io::stderr)))
        .init();

    info!("Starting contextwords v{}", env!("CARGO_PKG_VERSION"));

    match cli.command {
        Commands::Extract {
            corpus,
            target_type,
            tokens,
            tokens_file,
            left,
            right,
            dependency,
            no_boundaries,
            format,
            output,
            concurrency,
        } => {
            let mut config = ExtractionConfig::load(corpus.config.as_deref())?;
            if let Some(left) = left {
                config.left_span = left;
            }
            if let Some(right) = right {
                config.right_span = right;
            }
            if let Some(concurrency) = concurrency {
                config.concurrency = concurrency;
            }
            if dependency {
                config.dependency_mode = true;
            }
            if no_boundaries {
                config.sentence_boundary = SentenceBoundary::Disabled;
            }

            let files = FileFilter::default().collect(&corpus.corpus);
            let extractor = WindowExtractor::from_config(config)?;
            let occurrences =
                resolve_occurrences(&extractor, &target_type, tokens, tokens_file, &files)?;
            cmd_extract(extractor, &target_type, &occurrences, &files, format, output).await?;
        }
        Commands::Occurrences {
            corpus,
            target_type,
        } => {
            let config = ExtractionConfig::load(corpus.config.as_deref())?;
            let matcher = RegexLineMatcher::new(&config.format)?;
            let processor = FileProcessor::new(config.encoding);
            let files = FileFilter::default().collect(&corpus.corpus);

            let stdout = io::stdout();
            let mut out = stdout.lock();
            for occurrence in discover(&matcher, &processor, &target_type, &files) {
                writeln!(out, "{}", occurrence)?;
            }
        }
        Commands::Paths { file, line, config } => {
            let config = ExtractionConfig::load(config.as_deref())?;
            cmd_paths(&config, &file, line)?;
        }
    }

    Ok(())
}

async fn cmd_extract(
    extractor: WindowExtractor,
    target_type: &str,
    occurrences: &[OccurrenceId],
    files: &[PathBuf],
    format: OutputFormat,
    output: Option<PathBuf>,
) -> Result<()> {
    let columns = extractor.matcher().columns().to_vec();
    let batch = BatchExtractor::new(extractor);
    let (slots, report) = batch
        .extract_concurrent(target_type, occurrences, files)
        .await?;

    let sink: Box<dyn Write> = match &output {
        Some(path) => Box::new(BufWriter::new(
            File::create(path).with_context(|| format!("creating {}", path.display()))?,
        )),
        None => Box::new(BufWriter::new(io::stdout().lock())),
    };
    let mut writer = SlotWriter::new(sink, format, columns);
    let written = writer.write_all(&slots)?;
    writer.finish()?;

    for error in &report.errors {
        warn!(scope = %error.scope, error = %error.error, "Skipped");
    }
    info!(
        rows = written,
        processed = report.processed_occurrences,
        failed = report.failed_occurrences,
        unresolved = report.unresolved_occurrences,
        "Extraction finished"
    );

    Ok(())
}

fn cmd_paths(config: &ExtractionConfig, file: &Path, line: usize) -> Result<()> {
    let matcher = RegexLineMatcher::new(&config.format)?;
    let corpus = FileProcessor::new(config.encoding).load(file)?;
    if line == 0 || line > corpus.len() {
        bail!("line {} is outside {} ({} lines)", line, file.display(), corpus.len());
    }

    let index = line - 1;
    let target = matcher
        .position(&corpus.lines[index])
        .ok_or_else(|| anyhow!("line {} is not a token line", line))?;
    let graph = SentenceGraph::build(&corpus.lines, index, &matcher)
        .ok_or_else(|| anyhow!("no sentence around line {}", line))?;

    info!(
        nodes = graph.node_count(),
        edges = graph.edge_count(),
        position = target,
        "Built sentence graph"
    );

    let stdout = io::stdout();
    let mut out = stdout.lock();
    writeln!(out, "node\tlemma\tsteps\tpath\trep_path")?;
    for step in PathFinder::new(&graph, target).find() {
        writeln!(
            out,
            "{}\t{}\t{}\t{}\t{}",
            step.node,
            graph.lemma(step.node),
            step.hops,
            step.explicit_path,
            step.implicit_path
        )?;
    }

    Ok(())
}

/// Occurrences from --token/--tokens, or every occurrence in the corpus.
fn resolve_occurrences(
    extractor: &WindowExtractor,
    target_type: &str,
    tokens: Vec<String>,
    tokens_file: Option<PathBuf>,
    files: &[PathBuf],
) -> Result<Vec<OccurrenceId>> {
    let mut raw = tokens;
    if let Some(path) = tokens_file {
        let content = std::fs::read_to_string(&path)
            .with_context(|| format!("reading {}", path.display()))?;
        raw.extend(
            content
                .lines()
                .map(str::trim)
                .filter(|l| !l.is_empty())
                .map(String::from),
        );
    }

    if raw.is_empty() {
        let processor = FileProcessor::new(extractor.config().encoding);
        return Ok(discover(
            extractor.matcher().as_ref(),
            &processor,
            target_type,
            files,
        ));
    }

    raw.iter()
        .map(|id| id.parse::<OccurrenceId>().map_err(Into::into))
        .collect()
}

/// Every occurrence of `target_type` in `files`; unreadable files are skipped.
fn discover<M: LineMatcher + ?Sized>(
    matcher: &M,
    processor: &FileProcessor,
    target_type: &str,
    files: &[PathBuf],
) -> Vec<OccurrenceId> {
    let mut found = Vec::new();
    for path in files {
        match processor.load(path) {
            Ok(file) => found.extend(find_occurrences(matcher, target_type, &file)),
            Err(e) => warn!(path = %path.display(), error = %e, "Skipping unreadable file"),
        }
    }
    info!(target_type, occurrences = found.len(), "Discovered occurrences");
    found
}

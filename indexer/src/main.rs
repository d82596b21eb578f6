use anyhow::{bail, Context, Result};
use boolcore::persist::{load_index, save_index, IndexPaths, SnapshotFormat};
use boolcore::tokenizer::{index_lines, tokenize, TokenizerOptions};
use boolcore::{merge_with, BooleanIndex, DocId, MergeMode};
use clap::{Args, Parser, Subcommand, ValueEnum};
use tracing_subscriber::{EnvFilter, fmt};
use walkdir::WalkDir;

use std::fs;
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "indexer")]
#[command(about = "Build, inspect and merge boolean term/document indexes", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, ValueEnum)]
enum Format {
    Json,
    Bincode,
}

impl From<Format> for SnapshotFormat {
    fn from(f: Format) -> Self {
        match f {
            Format::Json => SnapshotFormat::Json,
            Format::Bincode => SnapshotFormat::Bincode,
        }
    }
}

#[derive(Args)]
struct PruneArgs {
    /// Drop terms whose document frequency is below this value
    #[arg(long)]
    min_df: Option<f64>,
    /// Drop terms whose document frequency is above this value
    #[arg(long)]
    max_df: Option<f64>,
    /// Interpret the bounds as a fraction of all documents
    #[arg(long, default_value_t = false)]
    percentile: bool,
}

impl PruneArgs {
    fn is_set(&self) -> bool { self.min_df.is_some() || self.max_df.is_some() }
}

#[derive(Subcommand)]
enum Commands {
    /// Build an index from a text file or a directory of .txt files, one document per line
    Build {
        /// Input path (file or directory)
        #[arg(long)]
        input: String,
        /// Output index directory
        #[arg(long)]
        output: String,
        #[arg(long, value_enum, default_value_t = Format::Json)]
        format: Format,
        /// Seed the vocabulary from this file (one term per line) and freeze it
        #[arg(long)]
        vocabulary: Option<String>,
        /// NFKC-normalise and lowercase tokens
        #[arg(long, default_value_t = false)]
        lowercase: bool,
        /// Stem tokens with the English Snowball stemmer
        #[arg(long, default_value_t = false)]
        stem: bool,
        /// Drop English stopwords
        #[arg(long, default_value_t = false)]
        stopwords: bool,
        #[command(flatten)]
        prune: PruneArgs,
    },
    /// Print the dictionary and, optionally, every document vector
    Show {
        #[arg(long)]
        index: String,
        #[arg(long, default_value_t = false)]
        vectors: bool,
    },
    /// Document frequency of a term, or its presence in one document
    Query {
        #[arg(long)]
        index: String,
        #[arg(long)]
        term: String,
        #[arg(long)]
        doc: Option<DocId>,
    },
    /// Remove terms outside a document-frequency range
    Prune {
        #[arg(long)]
        index: String,
        /// Write the pruned index here instead of overwriting the input
        #[arg(long)]
        output: Option<String>,
        #[arg(long, value_enum, default_value_t = Format::Json)]
        format: Format,
        #[command(flatten)]
        prune: PruneArgs,
    },
    /// Union several index directories into one
    Merge {
        #[arg(long, num_args = 1.., required = true)]
        inputs: Vec<String>,
        #[arg(long)]
        output: String,
        #[arg(long, value_enum, default_value_t = Format::Json)]
        format: Format,
        /// Sum presence values instead of OR-ing them (compatibility mode)
        #[arg(long, default_value_t = false)]
        legacy_sum: bool,
    },
}

fn main() -> Result<()> {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Build { input, output, format, vocabulary, lowercase, stem, stopwords, prune } => {
            let opts = TokenizerOptions { lowercase, stem, remove_stopwords: stopwords };
            build_index(&input, &output, format.into(), vocabulary.as_deref(), &opts, &prune)
        }
        Commands::Show { index, vectors } => show_index(&index, vectors),
        Commands::Query { index, term, doc } => query_index(&index, &term, doc),
        Commands::Prune { index, output, format, prune } => {
            if !prune.is_set() { bail!("prune needs --min-df and/or --max-df"); }
            let paths = IndexPaths::new(&index);
            let mut idx: BooleanIndex = load_index(&paths)?;
            let removed = idx.prune(prune.min_df, prune.max_df, prune.percentile);
            let out = output.unwrap_or(index);
            save_index(&IndexPaths::new(&out), &idx, format.into(), now())?;
            tracing::info!(removed, remaining = idx.num_terms(), output = %out, "pruned index");
            Ok(())
        }
        Commands::Merge { inputs, output, format, legacy_sum } => {
            let mode = if legacy_sum { MergeMode::LegacySum } else { MergeMode::Or };
            merge_indexes(&inputs, &output, format.into(), mode)
        }
    }
}

fn build_index(input: &str, output: &str, format: SnapshotFormat, vocabulary: Option<&str>, opts: &TokenizerOptions, prune: &PruneArgs) -> Result<()> {
    let mut index: BooleanIndex = match vocabulary {
        Some(path) => {
            let text = fs::read_to_string(path).with_context(|| format!("reading vocabulary {path}"))?;
            let terms: Vec<String> = text.lines().flat_map(|line| tokenize(line, opts)).collect();
            let mut index = BooleanIndex::with_terms(terms);
            index.freeze();
            index
        }
        None => BooleanIndex::new(),
    };

    let files = collect_inputs(Path::new(input))?;
    if files.is_empty() {
        bail!("no input files found at {input}");
    }

    let mut next_doc: DocId = 0;
    for file in &files {
        let text = fs::read_to_string(file).with_context(|| format!("reading {}", file.display()))?;
        let first = next_doc;
        next_doc = index_lines(&mut index, text.lines(), first, opts);
        tracing::debug!(file = %file.display(), documents = next_doc - first, "ingested file");
    }
    tracing::info!(num_docs = index.num_documents(), num_terms = index.num_terms(), "ingested documents");

    if prune.is_set() {
        let removed = index.prune(prune.min_df, prune.max_df, prune.percentile);
        tracing::info!(removed, "pruned vocabulary");
    }

    save_index(&IndexPaths::new(output), &index, format, now())?;
    tracing::info!(output, "index build complete");
    Ok(())
}

/// A single file, or every `.txt` file under a directory in path order.
fn collect_inputs(input_path: &Path) -> Result<Vec<PathBuf>> {
    let mut files: Vec<PathBuf> = Vec::new();
    if input_path.is_dir() {
        for entry in WalkDir::new(input_path).sort_by_file_name().into_iter().filter_map(|e| e.ok()) {
            let p = entry.path();
            if p.is_file() && p.extension().and_then(|s| s.to_str()) == Some("txt") {
                files.push(p.to_path_buf());
            }
        }
    } else if input_path.is_file() {
        files.push(input_path.to_path_buf());
    }
    Ok(files)
}

fn show_index(index: &str, vectors: bool) -> Result<()> {
    let idx: BooleanIndex = load_index(&IndexPaths::new(index))?;
    println!("{idx}");
    println!("dictionary count : {}", idx.num_terms());
    for (term, postings) in idx.items() {
        let docs: Vec<String> = postings.keys().map(|d| d.to_string()).collect();
        println!("{term} : [{}]", docs.join(", "));
    }
    if vectors {
        for doc in idx.documents() {
            let vector = idx.generate_document_vector(&doc)?;
            println!("doc#{doc} : {}", serde_json::to_string(&vector)?);
        }
    }
    Ok(())
}

fn query_index(index: &str, term: &str, doc: Option<DocId>) -> Result<()> {
    let idx: BooleanIndex = load_index(&IndexPaths::new(index))?;
    match doc {
        Some(doc) => println!("{}", idx.get_term_exists(term, &doc)?),
        None => println!("{}", idx.get_document_frequency(term)?),
    }
    Ok(())
}

fn merge_indexes(inputs: &[String], output: &str, format: SnapshotFormat, mode: MergeMode) -> Result<()> {
    let loaded = inputs
        .iter()
        .map(|dir| load_index::<DocId>(&IndexPaths::new(dir)).with_context(|| format!("loading {dir}")))
        .collect::<Result<Vec<_>>>()?;
    let merged = merge_with(&loaded, mode);
    save_index(&IndexPaths::new(output), &merged, format, now())?;
    tracing::info!(inputs = loaded.len(), num_terms = merged.num_terms(), num_docs = merged.num_documents(), output, "merge complete");
    Ok(())
}

fn now() -> String {
    time::OffsetDateTime::now_utc().format(&time::format_description::well_known::Rfc3339).unwrap_or_else(|_| "".into())
}

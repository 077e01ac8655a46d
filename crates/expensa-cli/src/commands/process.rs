//! Process command - extract fields from a single document and categorize it.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;

use clap::Args;
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use serde::Serialize;
use tracing::{debug, info, warn};

use expensa_core::invoice::FieldExtractionEngine;
use expensa_core::models::config::ExpensaConfig;
use expensa_core::pdf::{document_content, ContentKind};
use expensa_core::{ClassificationService, ExpenseStore};

use super::{load_config, open_service};

/// Arguments for the process command.
#[derive(Args)]
pub struct ProcessArgs {
    /// Input file (PDF or plain text)
    #[arg(required = true)]
    input: PathBuf,

    /// Output file (default: stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "json")]
    format: OutputFormat,

    /// Include the full extracted text
    #[arg(long)]
    show_text: bool,
}

#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub enum OutputFormat {
    /// JSON output
    Json,
    /// CSV output
    Csv,
    /// Plain text summary
    Text,
}

/// A processed document, shaped like a confirmation entry so it can be
/// reviewed and fed back to `expensa confirm`.
#[derive(Debug, Clone, Serialize)]
pub struct ProcessedDocument {
    pub file: String,
    pub value: String,
    pub date: String,
    pub description: String,
    pub full_description: String,
    pub category: String,
    /// The online learner's opinion, when it has one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggestion: Option<String>,
    #[serde(skip)]
    pub processing_time_ms: u64,
    /// Time spent in the field rules alone.
    #[serde(skip)]
    pub extraction_time_ms: u64,
}

/// File extensions the pipeline can read.
pub fn is_supported(path: &Path) -> bool {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_lowercase();
    matches!(ext.as_str(), "pdf" | "txt")
}

/// Extract fields from a document and predict its category.
pub fn analyze_document<S: ExpenseStore>(
    path: &Path,
    engine: &FieldExtractionEngine,
    service: &ClassificationService<S>,
    config: &ExpensaConfig,
) -> anyhow::Result<ProcessedDocument> {
    let start = Instant::now();

    let content = document_content(path, config.pdf.min_text_length)?;
    if content.kind == ContentKind::Empty {
        warn!(
            "Little or no text extracted from {} ({} chars, {} pages)",
            path.display(),
            content.text.trim().len(),
            content.pages
        );
    }
    let text = content.text;

    let result = engine.parse(&text);
    let fields = result.fields;
    let category = service.predict(&text);
    let suggestion = service.suggest(&text);

    debug!(
        "{}: {} of 3 fields found, category {:?}",
        path.display(),
        fields.found_count(),
        category
    );

    Ok(ProcessedDocument {
        file: path
            .file_name()
            .and_then(|s| s.to_str())
            .unwrap_or_default()
            .to_string(),
        value: fields.value.to_string(),
        date: fields.date.to_string(),
        description: fields.description.to_string(),
        full_description: text,
        category,
        suggestion,
        processing_time_ms: start.elapsed().as_millis() as u64,
        extraction_time_ms: result.processing_time_ms,
    })
}

pub async fn run(args: ProcessArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let start = Instant::now();

    let config = load_config(config_path)?;

    // Check input file exists
    if !args.input.exists() {
        anyhow::bail!("Input file not found: {}", args.input.display());
    }
    if !is_supported(&args.input) {
        anyhow::bail!("Unsupported file format: {}", args.input.display());
    }

    let service = open_service(&config)?;
    let engine = FieldExtractionEngine::new();

    info!("Processing file: {}", args.input.display());

    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} [{elapsed_precise}] {msg}")?,
    );
    pb.set_message("Extracting fields...");

    let mut document = analyze_document(&args.input, &engine, &service, &config)?;

    pb.finish_and_clear();

    if !args.show_text {
        document.full_description = String::new();
    }

    let output = format_document(&document, args.format)?;

    if let Some(output_path) = &args.output {
        fs::write(output_path, &output)?;
        println!(
            "{} Output written to {}",
            style("✓").green(),
            output_path.display()
        );
    } else {
        println!("{}", output);
    }

    debug!("Total processing time: {:?}", start.elapsed());

    Ok(())
}

pub fn format_document(document: &ProcessedDocument, format: OutputFormat) -> anyhow::Result<String> {
    match format {
        OutputFormat::Json => Ok(serde_json::to_string_pretty(document)?),
        OutputFormat::Csv => format_csv(document),
        OutputFormat::Text => Ok(format_text(document)),
    }
}

fn format_csv(document: &ProcessedDocument) -> anyhow::Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);

    wtr.write_record(["file", "value", "date", "description", "category", "suggestion"])?;
    wtr.write_record([
        document.file.as_str(),
        &document.value,
        &document.date,
        &document.description,
        &document.category,
        document.suggestion.as_deref().unwrap_or(""),
    ])?;

    let data = String::from_utf8(wtr.into_inner()?)?;
    Ok(data)
}

fn format_text(document: &ProcessedDocument) -> String {
    let mut output = String::new();

    output.push_str(&format!("File:        {}\n", document.file));
    output.push_str(&format!("Date:        {}\n", document.date));
    output.push_str(&format!("Value:       {}\n", document.value));
    output.push_str(&format!("Description: {}\n", document.description));
    output.push_str(&format!("Category:    {}\n", document.category));
    if let Some(suggestion) = &document.suggestion {
        if suggestion != &document.category {
            output.push_str(&format!("Suggested:   {}\n", suggestion));
        }
    }

    if !document.full_description.is_empty() {
        output.push_str("\n");
        output.push_str(&document.full_description);
        output.push_str("\n");
    }

    output
}

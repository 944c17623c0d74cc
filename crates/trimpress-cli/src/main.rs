// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// trimpress: turn a manuscript (PDF, image, DOCX, or plain text) into a
// print-ready PDF sized to a trim, with bleed and a safe zone.
//
// One pass per invocation: extract, apply any `--edit`s in order, export.

mod edit;

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, ValueEnum};
use tracing::{info, warn};

use trimpress_core::error::Result;
use trimpress_core::human_errors::humanize_error;
use trimpress_core::{
    ExportConfig, PlacementPolicy, SourceKind, TextFont, TrimSize, compute_bleed_spec, safe_rect,
    trim_rect,
};
use trimpress_document::{
    Compositor, ContentExtractor, ExtractionStatus, Gesture, OutputDocument, PdfOutputWriter,
    Session, TextStyle,
};

#[derive(Debug, Parser)]
#[command(name = "trimpress")]
#[command(version, about = "Print-ready PDFs with trim, bleed, and safe zone", long_about = None)]
#[command(after_help = "EXAMPLES:
    trimpress book.pdf --trim 8.5x8.5            Square picture book with bleed
    trimpress story.docx --trim 6x9 --no-bleed   Novel trim, no bleed
    trimpress scans.pdf --edit up:3 --edit delete:1
    trimpress --list-sizes                      Show the standard trim sizes")]
struct Cli {
    /// Manuscript to convert (PDF, PNG/JPEG/TIFF, DOCX, or .txt)
    #[arg(value_name = "INPUT", required_unless_present = "list_sizes")]
    input: Option<PathBuf>,

    /// Output PDF [default: INPUT with a `-print.pdf` suffix]
    #[arg(short, long, value_name = "OUTPUT")]
    output: Option<PathBuf>,

    /// JSON configuration file; flags below override it
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Trim size: a catalog label or WIDTHxHEIGHT in inches
    #[arg(short, long)]
    trim: Option<TrimSize>,

    /// Do not add bleed to the page size
    #[arg(long)]
    no_bleed: bool,

    /// Image placement: fill-to-bleed or shrink-to-safe-zone
    #[arg(short, long)]
    policy: Option<PlacementPolicy>,

    /// Rasterisation DPI for paginated sources (150-200)
    #[arg(long)]
    dpi: Option<u32>,

    /// Font for text pages
    #[arg(long, value_enum)]
    font: Option<FontArg>,

    /// Title written into the PDF
    #[arg(long)]
    title: Option<String>,

    /// Treat the input as this kind instead of guessing from the extension
    #[arg(long, value_enum)]
    kind: Option<KindArg>,

    /// Edit before export: up:N, down:N, delete:N, text:N=TEXT (repeatable)
    #[arg(short, long = "edit", value_name = "EDIT", value_parser = edit::parse_edit)]
    edits: Vec<Gesture>,

    /// Write the per-page placement report as JSON
    #[arg(long, value_name = "FILE")]
    report: Option<PathBuf>,

    /// List the standard trim sizes and exit
    #[arg(long)]
    list_sizes: bool,

    /// Only log warnings and errors
    #[arg(short, long)]
    quiet: bool,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum KindArg {
    Paginated,
    Flowable,
}

impl From<KindArg> for SourceKind {
    fn from(arg: KindArg) -> Self {
        match arg {
            KindArg::Paginated => SourceKind::Paginated,
            KindArg::Flowable => SourceKind::Flowable,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum FontArg {
    Helvetica,
    HelveticaBold,
    TimesRoman,
    Courier,
}

impl From<FontArg> for TextFont {
    fn from(arg: FontArg) -> Self {
        match arg {
            FontArg::Helvetica => TextFont::Helvetica,
            FontArg::HelveticaBold => TextFont::HelveticaBold,
            FontArg::TimesRoman => TextFont::TimesRoman,
            FontArg::Courier => TextFont::Courier,
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let default_level = if cli.quiet { "warn" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    if cli.list_sizes {
        list_sizes();
        return ExitCode::SUCCESS;
    }

    match run(&cli) {
        Ok(path) => {
            if !cli.quiet {
                println!("{}", path.display());
            }
            ExitCode::SUCCESS
        }
        Err(err) => {
            let human = humanize_error(&err);
            eprintln!("error: {}", human.message);
            eprintln!("  {}", human.suggestion);
            ExitCode::FAILURE
        }
    }
}

fn list_sizes() {
    for (label, size) in TrimSize::catalog() {
        println!("{label:<32} {size}");
    }
}

/// Extract, edit, and export. Returns the path written.
fn run(cli: &Cli) -> Result<PathBuf> {
    let Some(input) = cli.input.as_deref() else {
        return Err(trimpress_core::TrimpressError::Config(
            "no input file given".into(),
        ));
    };

    let config = resolve_config(cli)?;
    let spec = compute_bleed_spec(config.trim, config.bleed)?;
    info!(
        trim = %config.trim,
        bleed = config.bleed,
        output_in = ?(spec.output_width, spec.output_height),
        trim_rect = ?trim_rect(&spec),
        safe_rect = ?safe_rect(&spec),
        "Page geometry"
    );

    let bytes = std::fs::read(input)?;
    let declared = cli
        .kind
        .map(SourceKind::from)
        .or_else(|| extension_kind(input));

    let extractor = ContentExtractor::with_defaults(&config)?;
    let mut session = Session::load(&bytes, declared, &extractor)?;
    drop(bytes);
    if session.status() == ExtractionStatus::Empty {
        warn!(input = %input.display(), "Nothing to lay out");
    }

    for gesture in &cli.edits {
        session.apply(gesture.clone())?;
    }

    let compositor = Compositor::new(TextStyle::from_config(&config), config.title.clone());
    let mut writer = PdfOutputWriter::new(config.max_page_pixels);
    let output = session.export(&compositor, &spec, config.policy, &mut writer)?;
    report_degradations(output);

    let output_path = cli
        .output
        .clone()
        .unwrap_or_else(|| default_output_path(input));
    std::fs::write(&output_path, &output.bytes)?;
    info!(path = %output_path.display(), pages = output.page_count(), "PDF written");

    if let Some(report_path) = &cli.report {
        std::fs::write(report_path, serde_json::to_vec_pretty(output)?)?;
        info!(path = %report_path.display(), "Placement report written");
    }

    Ok(output_path)
}

/// Config file (or defaults) with command-line overrides applied.
fn resolve_config(cli: &Cli) -> Result<ExportConfig> {
    let mut config = match &cli.config {
        Some(path) => ExportConfig::from_json_file(path)?,
        None => ExportConfig::default(),
    };

    if let Some(trim) = cli.trim {
        config.trim = trim;
    }
    if cli.no_bleed {
        config.bleed = false;
    }
    if let Some(policy) = cli.policy {
        config.policy = policy;
    }
    if let Some(dpi) = cli.dpi {
        config.dpi = dpi;
    }
    if let Some(font) = cli.font {
        config.font = font.into();
    }
    if let Some(title) = &cli.title {
        config.title = title.clone();
    }

    config.validate()?;
    Ok(config)
}

fn extension_kind(path: &Path) -> Option<SourceKind> {
    path.extension()
        .and_then(|ext| ext.to_str())
        .and_then(SourceKind::from_extension)
}

fn default_output_path(input: &Path) -> PathBuf {
    let stem = input
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_else(|| "manuscript".into());
    input.with_file_name(format!("{stem}-print.pdf"))
}

fn report_degradations(output: &OutputDocument) {
    for degradation in &output.degradations {
        warn!(page = degradation.page() + 1, ?degradation, "Page degraded");
    }
}

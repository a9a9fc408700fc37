//! docingest command-line interface
//!
//! ```bash
//! docingest extract contrat.pdf --format json --classify
//! docingest batch a.docx b.xlsx c.png
//! docingest formats
//! docingest health
//! docingest fingerprint contrat.pdf
//! ```

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use docingest::analysis::{extract_entities, registry};
use docingest::{ExtractionConfig, ExtractionResult, OcrLanguage, TypeTag};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "docingest")]
#[command(about = "Extract text and metadata from PDF, Office, image and text documents")]
#[command(version)]
struct Cli {
    /// Enable debug logging (overridden by RUST_LOG)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Extract one document
    Extract {
        /// Document to extract
        path: PathBuf,

        /// Type tag to use instead of detecting it (pdf, docx, jpg, ...)
        #[arg(short = 't', long = "type")]
        type_tag: Option<TypeTag>,

        /// Disable OCR for scanned PDFs and images
        #[arg(long)]
        no_ocr: bool,

        /// OCR language code (fr, en). Unrecognized codes use the French profile
        #[arg(short, long)]
        language: Option<String>,

        /// Configuration file (.toml, .yaml, .yml or .json)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Output format
        #[arg(short, long, value_enum, default_value = "text")]
        format: OutputFormat,

        /// Classify the document and extract entities into the metadata
        #[arg(long)]
        classify: bool,
    },

    /// Extract several documents concurrently, printing one JSON line each
    Batch {
        /// Documents to extract
        #[arg(required = true)]
        paths: Vec<PathBuf>,

        /// Configuration file (.toml, .yaml, .yml or .json)
        #[arg(short, long)]
        config: Option<PathBuf>,
    },

    /// List supported document types
    Formats {
        /// Output format
        #[arg(short, long, value_enum, default_value = "text")]
        format: OutputFormat,
    },

    /// Check that LibreOffice, pdftoppm and the OCR engine are available
    Health {
        /// Configuration file (.toml, .yaml, .yml or .json)
        #[arg(short, long)]
        config: Option<PathBuf>,
    },

    /// Print the SHA-256 content fingerprint of a file
    Fingerprint {
        path: PathBuf,
    },
}

#[derive(Clone, Copy, Debug, Default, ValueEnum)]
enum OutputFormat {
    #[default]
    Text,
    Json,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match run(cli.command).await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

async fn run(command: Commands) -> Result<ExitCode> {
    match command {
        Commands::Extract {
            path,
            type_tag,
            no_ocr,
            language,
            config,
            format,
            classify,
        } => {
            let mut config = load_config(config.as_deref())?;
            apply_overrides(&mut config, no_ocr, language);

            let mut result = docingest::extract_file(&path, type_tag, &config)
                .await
                .with_context(|| format!("Failed to extract '{}'", path.display()))?;

            if classify {
                annotate(&mut result, &config.ocr.language)?;
            }

            match format {
                OutputFormat::Text => println!("{}", result.text_content),
                OutputFormat::Json => println!(
                    "{}",
                    serde_json::to_string_pretty(&result).context("Failed to serialize extraction result")?
                ),
            }
            Ok(ExitCode::SUCCESS)
        }

        Commands::Batch { paths, config } => {
            let config = load_config(config.as_deref())?;
            let results = docingest::batch_extract_files(paths.clone(), &config).await;

            let mut failures = 0usize;
            for (path, result) in paths.iter().zip(results) {
                let line = match result {
                    Ok(result) => serde_json::to_string(&result).context("Failed to serialize extraction result")?,
                    Err(e) => {
                        failures += 1;
                        serde_json::json!({
                            "path": path.display().to_string(),
                            "error": e.to_string(),
                        })
                        .to_string()
                    }
                };
                println!("{}", line);
            }

            if failures > 0 {
                tracing::warn!(failures, total = paths.len(), "Some documents failed to extract");
            }
            Ok(ExitCode::SUCCESS)
        }

        Commands::Formats { format } => {
            let formats = docingest::supported_formats();
            match format {
                OutputFormat::Text => {
                    for info in &formats {
                        println!(
                            "{:<6} {:<22} {:<12} {}",
                            info.name,
                            serde_json::to_value(info.family)?.as_str().unwrap_or_default(),
                            info.extensions.join(","),
                            info.mime_type
                        );
                    }
                }
                OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&formats)?),
            }
            Ok(ExitCode::SUCCESS)
        }

        Commands::Health { config } => {
            let config = load_config(config.as_deref())?;
            let report = docingest::check_dependencies(&config).await;
            println!("{}", serde_json::to_string_pretty(&report)?);

            Ok(if report.all_available() {
                ExitCode::SUCCESS
            } else {
                ExitCode::FAILURE
            })
        }

        Commands::Fingerprint { path } => {
            let fingerprint = docingest::fingerprint_file(&path)
                .await
                .with_context(|| format!("Failed to fingerprint '{}'", path.display()))?;
            println!("{}", fingerprint);
            Ok(ExitCode::SUCCESS)
        }
    }
}

/// Explicit file first, then `docingest.toml` discovery, then defaults.
fn load_config(explicit: Option<&Path>) -> Result<ExtractionConfig> {
    if let Some(path) = explicit {
        return ExtractionConfig::from_file(path)
            .with_context(|| format!("Failed to load configuration from '{}'", path.display()));
    }

    match ExtractionConfig::discover().context("Failed to discover docingest.toml")? {
        Some(config) => Ok(config),
        None => Ok(ExtractionConfig::default()),
    }
}

fn apply_overrides(config: &mut ExtractionConfig, no_ocr: bool, language: Option<String>) {
    if no_ocr {
        config.ocr.enabled = false;
    }
    if let Some(language) = language {
        if OcrLanguage::from_code(&language) == OcrLanguage::French && !language.trim().eq_ignore_ascii_case("fr") {
            tracing::warn!(code = %language, "Unrecognized language code, using French");
        }
        config.ocr.language = language;
    }
}

fn annotate(result: &mut ExtractionResult, language: &str) -> Result<()> {
    if registry::get().is_none() {
        registry::initialize_default().context("Failed to initialize model registry")?;
    }
    let classifier = registry::classifier().context("Model registry has no classifier")?;

    let classification = classifier.classify(&result.text_content, language);
    let entities = extract_entities(&result.text_content);

    result
        .metadata
        .additional
        .insert("classification".to_string(), serde_json::to_value(classification)?);
    result
        .metadata
        .additional
        .insert("entities".to_string(), serde_json::to_value(entities)?);
    Ok(())
}

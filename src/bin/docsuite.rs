//! CLI binary for docsuite.
//!
//! A thin shim over the library crate: each subcommand maps its flags to
//! library calls and prints the result as text or JSON.

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use docsuite::assist::Assistant;
use docsuite::compare::{self, CompareOptions};
use docsuite::extract::Extractor;
use docsuite::languages;
use docsuite::ocr::{calculate_ocr_confidence, quick_fix_ocr};
use docsuite::structure;
use docsuite::{OutputFormat, SuiteConfig};
use indicatif::{ProgressBar, ProgressStyle};
use serde::Serialize;
use std::io::{self, Read, Write};
use std::path::PathBuf;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

// ── ANSI colour helpers ──────────────────────────────────────────────────────

fn green(s: &str) -> String {
    format!("\x1b[32m{s}\x1b[0m")
}
fn red(s: &str) -> String {
    format!("\x1b[31m{s}\x1b[0m")
}
fn dim(s: &str) -> String {
    format!("\x1b[2m{s}\x1b[0m")
}
fn bold(s: &str) -> String {
    format!("\x1b[1m{s}\x1b[0m")
}
fn cyan(s: &str) -> String {
    format!("\x1b[36m{s}\x1b[0m")
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # Outline of a Markdown file as JSON
  docsuite parse README.md

  # Compare two revisions, write a side-by-side HTML view
  docsuite compare v1.md v2.md --html diff.html

  # Word-level changes only
  docsuite compare v1.md v2.md --words

  # Extract a document (local path or URL) and summarise it
  docsuite extract https://example.com/notes.md --summary

  # Rule-based OCR cleanup plus a quality score
  docsuite ocr scan.txt --score

  # Model-assisted OCR correction
  docsuite ocr scan.txt --ai --language de

  # Read several charts, two at a time
  docsuite chart fig1.png fig2.png --concurrency 2

  # Supported OCR languages / detect the language of a file
  docsuite languages
  docsuite languages --detect letter.txt

ENVIRONMENT VARIABLES:
  OPENAI_API_KEY          OpenAI API key
  ANTHROPIC_API_KEY       Anthropic API key
  EDGEQUAKE_LLM_PROVIDER  Override provider (openai, anthropic, gemini, ollama)
  EDGEQUAKE_MODEL         Override model ID
  RUST_LOG                Log filter (overrides -v / -q)
"#;

/// Parse, compare, extract and clean up documents.
#[derive(Parser, Debug)]
#[command(
    name = "docsuite",
    version,
    about = "Parse, compare, extract and clean up documents",
    arg_required_else_help = true,
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    #[command(flatten)]
    llm: LlmArgs,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, global = true, env = "DOCSUITE_VERBOSE")]
    verbose: bool,

    /// Suppress all output except errors.
    #[arg(short, long, global = true, env = "DOCSUITE_QUIET")]
    quiet: bool,
}

#[derive(Args, Debug)]
struct LlmArgs {
    /// LLM model ID.
    #[arg(long, global = true, env = "EDGEQUAKE_MODEL")]
    model: Option<String>,

    /// LLM provider: openai, anthropic, gemini, ollama, azure.
    #[arg(long, global = true, env = "EDGEQUAKE_PROVIDER")]
    provider: Option<String>,

    /// LLM temperature (0.0–2.0).
    #[arg(long, global = true, env = "DOCSUITE_TEMPERATURE", default_value_t = 0.1)]
    temperature: f32,

    /// Max LLM output tokens per call.
    #[arg(long, global = true, env = "DOCSUITE_MAX_TOKENS", default_value_t = 2048)]
    max_tokens: usize,

    /// Retries per LLM call.
    #[arg(long, global = true, env = "DOCSUITE_MAX_RETRIES", default_value_t = 3)]
    max_retries: u32,

    /// Per-call LLM timeout in seconds.
    #[arg(long, global = true, env = "DOCSUITE_API_TIMEOUT", default_value_t = 60)]
    api_timeout: u64,

    /// Concurrent LLM calls for batch work.
    #[arg(short, long, global = true, env = "DOCSUITE_CONCURRENCY", default_value_t = 4)]
    concurrency: usize,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Split Markdown into headings, paragraphs, lists and code blocks.
    Parse {
        /// Markdown file, or `-` for stdin.
        input: String,

        /// Output: json (elements), markdown (re-rendered) or text.
        #[arg(long, default_value = "json")]
        format: OutputFormat,
    },

    /// Compare two text documents.
    Compare {
        first: PathBuf,
        second: PathBuf,

        /// Label for the first document (defaults to its file name).
        #[arg(long)]
        name1: Option<String>,

        /// Label for the second document (defaults to its file name).
        #[arg(long)]
        name2: Option<String>,

        /// Unchanged lines kept around each change.
        #[arg(long, env = "DOCSUITE_CONTEXT_LINES", default_value_t = compare::DEFAULT_CONTEXT_LINES)]
        context: usize,

        /// Print a unified diff instead of the comparison report.
        #[arg(long, conflicts_with = "words")]
        unified: bool,

        /// Print word-level changes instead of the comparison report.
        #[arg(long)]
        words: bool,

        /// Also write a side-by-side HTML view to this file.
        #[arg(long)]
        html: Option<PathBuf>,

        /// Emit JSON.
        #[arg(long)]
        json: bool,
    },

    /// Extract a local file or HTTP/HTTPS URL.
    Extract {
        input: String,

        /// Output: markdown, json or text.
        #[arg(long, env = "DOCSUITE_OUTPUT_FORMAT", default_value = "markdown")]
        format: OutputFormat,

        /// Upload size limit in MB.
        #[arg(long, env = "DOCSUITE_MAX_FILE_SIZE_MB", default_value_t = 50)]
        max_file_size_mb: u64,

        /// Skip table detection.
        #[arg(long)]
        no_tables: bool,

        /// Skip image extraction.
        #[arg(long)]
        no_images: bool,

        /// Directory the converter saves extracted images into.
        #[arg(long, env = "DOCSUITE_IMAGE_DIR")]
        image_dir: Option<PathBuf>,

        /// HTTP download timeout in seconds.
        #[arg(long, env = "DOCSUITE_DOWNLOAD_TIMEOUT", default_value_t = 120)]
        download_timeout: u64,

        /// Add an itemised summary (model-assisted when a provider is set).
        #[arg(long)]
        summary: bool,

        /// Add structured-data extraction (needs a provider).
        #[arg(long)]
        structured: bool,

        /// Write to this file instead of stdout.
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Clean up OCR output.
    Ocr {
        /// Text file, or `-` for stdin.
        input: String,

        /// Correct with the model (rule-based when no provider is set).
        #[arg(long)]
        ai: bool,

        /// Language code of the text.
        #[arg(long, default_value = languages::DEFAULT_LANGUAGE)]
        language: String,

        /// Free-form description of the document, passed to the model.
        #[arg(long)]
        context: Option<String>,

        /// Print a quality score instead of the corrected text.
        #[arg(long)]
        score: bool,

        /// Emit JSON.
        #[arg(long)]
        json: bool,
    },

    /// Read charts (or diagrams) from images with a vision model.
    Chart {
        #[arg(required = true)]
        images: Vec<PathBuf>,

        /// Expected chart or diagram type.
        #[arg(long)]
        hint: Option<String>,

        /// Treat the images as diagrams.
        #[arg(long)]
        diagram: bool,

        /// Disable the spinner.
        #[arg(long, env = "DOCSUITE_NO_PROGRESS")]
        no_progress: bool,
    },

    /// List OCR languages, or detect the language of a file.
    Languages {
        /// Text file to detect the language of, or `-` for stdin.
        #[arg(long)]
        detect: Option<String>,

        /// Emit JSON.
        #[arg(long)]
        json: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    let filter = if cli.verbose {
        "debug"
    } else if cli.quiet {
        "error"
    } else {
        "warn"
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(io::stderr)
        .init();

    let quiet = cli.quiet;
    match cli.command {
        Command::Parse { ref input, format } => run_parse(input, format).await,
        Command::Compare {
            ref first,
            ref second,
            ref name1,
            ref name2,
            context,
            unified,
            words,
            ref html,
            json,
        } => {
            let a = read_file(first).await?;
            let b = read_file(second).await?;
            let options = CompareOptions {
                doc1_name: name1.clone().unwrap_or_else(|| file_label(first)),
                doc2_name: name2.clone().unwrap_or_else(|| file_label(second)),
                context_lines: context,
            };

            if let Some(path) = html {
                let page = compare::generate_html_diff(&a, &b, &options.doc1_name, &options.doc2_name);
                tokio::fs::write(path, page)
                    .await
                    .with_context(|| format!("Failed to write HTML diff to {}", path.display()))?;
                if !quiet {
                    eprintln!("{} HTML diff  →  {}", green("✔"), bold(&path.display().to_string()));
                }
            }

            if unified {
                let text = compare::unified_diff_text(
                    &a,
                    &b,
                    &options.doc1_name,
                    &options.doc2_name,
                    options.context_lines,
                );
                print!("{text}");
            } else if words {
                let changes = compare::get_word_level_diff(&a, &b);
                if json {
                    print_json(&changes)?;
                } else {
                    for change in &changes {
                        println!("{}", describe_word_change(change));
                    }
                }
            } else {
                let result = compare::compare_with(&a, &b, &options);
                if json {
                    print_json(&result)?;
                } else {
                    print_comparison(&result);
                }
            }
            Ok(())
        }
        Command::Extract {
            ref input,
            format,
            max_file_size_mb,
            no_tables,
            no_images,
            ref image_dir,
            download_timeout,
            summary,
            structured,
            ref output,
        } => {
            let config = build_config(&cli.llm, |b| {
                let b = b
                    .max_file_size_mb(max_file_size_mb)
                    .extract_tables(!no_tables)
                    .extract_images(!no_images)
                    .download_timeout_secs(download_timeout)
                    .default_output_format(format);
                match image_dir {
                    Some(dir) => b.image_dir(dir),
                    None => b,
                }
            })?;
            run_extract(input, &config, summary, structured, output.as_ref(), quiet).await
        }
        Command::Ocr {
            ref input,
            ai,
            ref language,
            ref context,
            score,
            json,
        } => {
            if !languages::is_supported(language) {
                anyhow::bail!("Unsupported language code '{}' (see `docsuite languages`)", language);
            }
            let text = read_input(input).await?;

            if score {
                let quality = calculate_ocr_confidence(&text);
                if json {
                    print_json(&quality)?;
                } else {
                    println!(
                        "Confidence:  {:.3}  ({})",
                        quality.confidence,
                        format!("{:?}", quality.quality).to_lowercase()
                    );
                    println!("Words:       {}", quality.total_words);
                    println!("Issues:      {}", quality.potential_issues);
                    for issue in &quality.issues {
                        println!(
                            "  {} {} × {}  {}",
                            cyan("•"),
                            issue.kind,
                            issue.count,
                            dim(&issue.examples.join(", "))
                        );
                    }
                }
                return Ok(());
            }

            if ai {
                let config = build_config(&cli.llm, |b| b)?;
                let assistant = Assistant::new(&config);
                let correction = assistant.fix_ocr(&text, language, context.as_deref()).await;
                if json {
                    print_json(&correction)?;
                } else {
                    write_stdout(&correction.corrected_text)?;
                    if !quiet {
                        if let Some(ref err) = correction.ai_error {
                            eprintln!("{} model correction failed: {}", cyan("⚠"), err);
                        }
                    }
                }
            } else {
                let fixed = quick_fix_ocr(&text);
                if json {
                    print_json(&serde_json::json!({ "corrected_text": fixed }))?;
                } else {
                    write_stdout(&fixed)?;
                }
            }
            Ok(())
        }
        Command::Chart {
            ref images,
            ref hint,
            diagram,
            no_progress,
        } => {
            let config = build_config(&cli.llm, |b| b)?;
            let assistant = Assistant::new(&config);
            run_chart(&assistant, images, hint.as_deref(), diagram, !quiet && !no_progress).await
        }
        Command::Languages { ref detect, json } => {
            if let Some(input) = detect {
                let text = read_input(input).await?;
                let code = languages::detect_language(&text);
                if json {
                    print_json(&serde_json::json!({
                        "code": code,
                        "name": languages::language_name(code),
                        "rtl": languages::is_rtl_language(code),
                    }))?;
                } else {
                    println!("{}  {}", code, languages::language_name(code));
                }
            } else {
                let all = languages::supported_languages();
                if json {
                    print_json(&all)?;
                } else {
                    for lang in &all {
                        println!("{:<6} {}", lang.code, lang.name);
                    }
                }
            }
            Ok(())
        }
    }
}

/// Map the shared LLM flags onto a [`SuiteConfig`], letting the subcommand
/// add its own settings.
fn build_config(
    llm: &LlmArgs,
    extra: impl FnOnce(docsuite::SuiteConfigBuilder) -> docsuite::SuiteConfigBuilder,
) -> Result<SuiteConfig> {
    let mut builder = SuiteConfig::builder()
        .temperature(llm.temperature)
        .max_tokens(llm.max_tokens)
        .max_retries(llm.max_retries)
        .api_timeout_secs(llm.api_timeout)
        .concurrency(llm.concurrency);
    if let Some(ref model) = llm.model {
        builder = builder.model(model.clone());
    }
    if let Some(ref provider) = llm.provider {
        builder = builder.provider_name(provider.clone());
    }
    extra(builder).build().context("Invalid configuration")
}

async fn run_parse(input: &str, format: OutputFormat) -> Result<()> {
    let markdown = read_input(input).await?;
    let elements = structure::parse(&markdown);
    match format {
        OutputFormat::Json => print_json(&elements),
        OutputFormat::Markdown => write_stdout(&structure::render_markdown(&elements)),
        OutputFormat::Text => write_stdout(&structure::plain_text(&elements)),
    }
}

/// Extraction output, optionally with the assist results attached.
#[derive(Serialize)]
struct ExtractReport<'a> {
    #[serde(flatten)]
    extraction: &'a docsuite::ExtractionResult,
    #[serde(skip_serializing_if = "Option::is_none")]
    summary: Option<docsuite::assist::DocumentSummary>,
    #[serde(skip_serializing_if = "Option::is_none")]
    structured_data: Option<docsuite::assist::StructuredData>,
}

async fn run_extract(
    input: &str,
    config: &SuiteConfig,
    want_summary: bool,
    want_structured: bool,
    output: Option<&PathBuf>,
    quiet: bool,
) -> Result<()> {
    let extractor = Extractor::with_text_converter(config);
    let result = extractor
        .extract(input)
        .await
        .with_context(|| format!("Failed to extract '{input}'"))?;

    let assistant = if want_summary || want_structured {
        Some(Assistant::new(config))
    } else {
        None
    };
    let mut summary = None;
    let mut structured_data = None;
    if let Some(ref assistant) = assistant {
        if want_summary {
            summary = Some(
                assistant
                    .summarize(&result.markdown, result.tables.len(), result.num_pages)
                    .await,
            );
        }
        if want_structured {
            structured_data = Some(assistant.extract_structured_data(&result.text).await);
        }
    }

    let rendered = match config.default_output_format {
        OutputFormat::Json => serde_json::to_string_pretty(&ExtractReport {
            extraction: &result,
            summary,
            structured_data,
        })
        .context("Failed to serialise output")?,
        OutputFormat::Markdown | OutputFormat::Text => {
            let mut body = if config.default_output_format == OutputFormat::Markdown {
                result.markdown.clone()
            } else {
                result.text.clone()
            };
            if let Some(summary) = summary {
                body.push_str("\n\n## Summary\n\n");
                body.push_str(&summary.summary);
                for point in &summary.key_points {
                    body.push_str("\n- ");
                    body.push_str(point);
                }
            }
            if let Some(data) = structured_data {
                body.push_str("\n\n## Structured data\n\n```json\n");
                body.push_str(&serde_json::to_string_pretty(&data).context("Failed to serialise structured data")?);
                body.push_str("\n```");
            }
            body
        }
    };

    if let Some(path) = output {
        tokio::fs::write(path, &rendered)
            .await
            .with_context(|| format!("Failed to write {}", path.display()))?;
        if !quiet {
            eprintln!(
                "{}  {}  {} pages  {} tables  {} images  →  {}",
                green("✔"),
                result.filename,
                result.num_pages,
                result.tables.len(),
                result.images.len(),
                bold(&path.display().to_string()),
            );
        }
    } else {
        write_stdout(&rendered)?;
    }
    Ok(())
}

async fn run_chart(
    assistant: &Assistant,
    images: &[PathBuf],
    hint: Option<&str>,
    diagram: bool,
    show_progress: bool,
) -> Result<()> {
    let spinner = show_progress.then(|| {
        let bar = ProgressBar::new_spinner();
        bar.set_style(
            ProgressStyle::with_template("{spinner:.cyan} {prefix:.bold}  {msg}  ⏱ {elapsed}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner())
                .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"]),
        );
        bar.set_prefix("Analysing");
        bar.set_message(format!("{} image(s)…", images.len()));
        bar.enable_steady_tick(Duration::from_millis(80));
        bar
    });

    let mut failures = 0usize;
    let mut report = serde_json::Map::new();
    if diagram {
        for path in images {
            let value = match assistant.analyze_diagram(path, hint).await {
                Ok(info) => serde_json::to_value(&info).context("Failed to serialise diagram")?,
                Err(e) => {
                    failures += 1;
                    serde_json::json!({ "error": e.to_string() })
                }
            };
            report.insert(path.display().to_string(), value);
        }
    } else {
        for (path, outcome) in assistant.analyze_charts(images, hint).await {
            let value = match outcome {
                Ok(chart) => serde_json::to_value(&chart).context("Failed to serialise chart")?,
                Err(e) => {
                    failures += 1;
                    serde_json::json!({ "error": e.to_string() })
                }
            };
            report.insert(path.display().to_string(), value);
        }
    }

    if let Some(bar) = spinner {
        bar.finish_and_clear();
        if failures == 0 {
            eprintln!("{} {} image(s) analysed", green("✔"), bold(&images.len().to_string()));
        } else {
            eprintln!(
                "{} {}/{} image(s) unreadable",
                red("✘"),
                red(&failures.to_string()),
                images.len()
            );
        }
    }
    print_json(&serde_json::Value::Object(report))
}

fn print_comparison(result: &docsuite::ComparisonResult) {
    println!(
        "{}  {}  vs  {}",
        bold("Compare"),
        result.doc1_name,
        result.doc2_name
    );
    println!(
        "Similarity:  {:.2}%   ({} → {} lines)",
        result.similarity_percent, result.total_lines_doc1, result.total_lines_doc2
    );
    println!("{}", result.summary);
    for diff in &result.diffs {
        let line = format!("{:>5}  {}", diff.line_number, diff.content);
        match diff.change {
            docsuite::ChangeType::Added => println!("{} {}", green("+"), green(&line)),
            docsuite::ChangeType::Removed => println!("{} {}", red("-"), red(&line)),
            _ => println!("{} {}", cyan("~"), line),
        }
    }
}

fn describe_word_change(change: &docsuite::WordChange) -> String {
    use docsuite::WordChange;
    match change {
        WordChange::Changed { old, new, position } => {
            format!("{} @{}  {} → {}", cyan("~"), position, red(old), green(new))
        }
        WordChange::Removed { content, position } => {
            format!("{} @{}  {}", red("-"), position, red(content))
        }
        WordChange::Added { content, position } => {
            format!("{} @{}  {}", green("+"), position, green(content))
        }
    }
}

fn file_label(path: &std::path::Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

async fn read_file(path: &std::path::Path) -> Result<String> {
    tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read {}", path.display()))
}

/// Read a file, or stdin for `-`.
async fn read_input(input: &str) -> Result<String> {
    if input == "-" {
        let mut buf = String::new();
        io::stdin()
            .read_to_string(&mut buf)
            .context("Failed to read stdin")?;
        return Ok(buf);
    }
    read_file(std::path::Path::new(input)).await
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value).context("Failed to serialise output")?;
    println!("{json}");
    Ok(())
}

fn write_stdout(text: &str) -> Result<()> {
    let stdout = io::stdout();
    let mut handle = stdout.lock();
    handle
        .write_all(text.as_bytes())
        .context("Failed to write to stdout")?;
    if !text.ends_with('\n') {
        handle.write_all(b"\n").ok();
    }
    Ok(())
}

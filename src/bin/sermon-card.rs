//! CLI binary for sermon-card.
//!
//! A thin shim over the library crate that maps CLI flags
//! to `SessionConfig`, drives one `Session`, and writes the result.

use anyhow::{Context, Result};
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use sermon_card::{
    load_sermon_text, render_page, render_view, save_images, write_atomic, PhaseKind,
    SermonAnalysis, Session, SessionConfig, SessionObserver, ViewType,
};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};
use tracing_subscriber::EnvFilter;

// ── ANSI colour helpers (no extra deps) ──────────────────────────────────────

fn green(s: &str) -> String {
    format!("\x1b[32m{s}\x1b[0m")
}
fn yellow(s: &str) -> String {
    format!("\x1b[33m{s}\x1b[0m")
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

const TICKS: &[&str] = &["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"];

// ── CLI progress observer using indicatif ────────────────────────────────────

/// Terminal observer: a spinner while reading and analysing, then a bar
/// over the three illustrations with one log line per image.
struct CliProgress {
    bar: ProgressBar,
    image_started: Mutex<Option<Instant>>,
}

impl CliProgress {
    fn new() -> Arc<Self> {
        let bar = ProgressBar::new(0);
        let spinner_style = ProgressStyle::with_template("{spinner:.cyan} {prefix:.bold}  {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_strings(TICKS);

        bar.set_style(spinner_style);
        bar.set_prefix("Reading");
        bar.set_message("Opening PDF…");
        bar.enable_steady_tick(Duration::from_millis(80));

        Arc::new(Self {
            bar,
            image_started: Mutex::new(None),
        })
    }

    fn activate_bar(&self, total: usize) {
        let progress_style = ProgressStyle::with_template(
            "{spinner:.cyan} {prefix:.bold}  \
             [{bar:42.green/238}] {pos}/{len} images  ⏱ {elapsed_precise}",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("█▉▊▋▌▍▎▏  ")
        .tick_strings(TICKS);

        self.bar.set_length(total as u64);
        self.bar.set_position(0);
        self.bar.set_style(progress_style);
        self.bar.set_prefix("Illustrating");
    }

    fn finish(&self) {
        self.bar.finish_and_clear();
    }
}

impl SessionObserver for CliProgress {
    fn on_text_extracted(&self, page_count: usize, chars: usize) {
        self.bar.println(format!(
            "{} {}",
            cyan("◆"),
            bold(&format!("Read {page_count} pages ({chars} characters)"))
        ));
    }

    fn on_phase_change(&self, _from: PhaseKind, to: PhaseKind) {
        match to {
            PhaseKind::Analyzing => {
                self.bar.set_prefix("Analyzing");
                self.bar.set_message("Summarising the sermon…");
            }
            PhaseKind::GeneratingImages => {
                // Length is set by the first on_image_start.
                self.bar.set_prefix("Illustrating");
            }
            PhaseKind::Result | PhaseKind::Idle => self.finish(),
        }
    }

    fn on_image_start(&self, index: usize, total: usize) {
        if index == 0 {
            self.activate_bar(total);
        }
        if let Ok(mut started) = self.image_started.lock() {
            *started = Some(Instant::now());
        }
    }

    fn on_image_complete(&self, index: usize, total: usize, fallback: bool) {
        let elapsed = self
            .image_started
            .lock()
            .ok()
            .and_then(|mut s| s.take())
            .map(|t| t.elapsed().as_secs_f64())
            .unwrap_or(0.0);

        let (mark, note) = if fallback {
            (yellow("⚠"), yellow("fallback image"))
        } else {
            (green("✓"), dim("generated"))
        };
        self.bar.println(format!(
            "  {} Image {}/{}  {}  {}",
            mark,
            index + 1,
            total,
            note,
            dim(&format!("{elapsed:.1}s")),
        ));
        self.bar.inc(1);
    }
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # Both layouts in one page, card shown first
  sermon-card sermon.pdf -o sermon.html

  # Infographic fragment only
  sermon-card --view infographic --fragment sermon.pdf > infographic.html

  # Structured summary as JSON, images saved next to it
  sermon-card --json --images-dir images/ sermon.pdf -o sermon.json

  # From a URL
  sermon-card https://church.example/media/2024-03-31.pdf -o easter.html

  # Check what text the PDF yields (no API key needed)
  sermon-card --extract-only sermon.pdf

ENVIRONMENT VARIABLES:
  GEMINI_API_KEY          Google Gemini API key (API_KEY is also accepted)
  PDFIUM_LIB_PATH         Path to libpdfium (file or directory)
  SERMON_CARD_*           Every flag, e.g. SERMON_CARD_TEXT_MODEL
  RUST_LOG                Overrides the log filter

SETUP:
  1. Set API key:     export GEMINI_API_KEY=AIza...
  2. Summarise:       sermon-card sermon.pdf -o sermon.html

  Text extraction needs the PDFium shared library. Place libpdfium in the
  working directory, install it system-wide, or point PDFIUM_LIB_PATH at it.
"#;

/// Turn a sermon PDF into an illustrated summary card and infographic.
#[derive(Parser, Debug)]
#[command(
    name = "sermon-card",
    version,
    about = "Turn a sermon PDF into an illustrated summary card and infographic",
    long_about = "Extract the text of a sermon PDF (local file or URL), summarise it with a \
Gemini text model, illustrate each point with a Gemini image model, and render the result as \
an evangelism summary card or an infographic.",
    arg_required_else_help = true,
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    /// Local PDF file path or HTTP/HTTPS URL.
    input: String,

    /// Write the result to this file instead of stdout.
    #[arg(short, long, env = "SERMON_CARD_OUTPUT")]
    output: Option<PathBuf>,

    /// Layout shown first (or the only one, with --fragment).
    #[arg(long, env = "SERMON_CARD_VIEW", value_enum, default_value = "card")]
    view: ViewArg,

    /// Emit only the selected layout instead of a page with both.
    #[arg(long, env = "SERMON_CARD_FRAGMENT")]
    fragment: bool,

    /// Output the structured summary (with images) as JSON.
    #[arg(long, env = "SERMON_CARD_JSON")]
    json: bool,

    /// Also save generated illustrations to this directory.
    #[arg(long, env = "SERMON_CARD_IMAGES_DIR")]
    images_dir: Option<PathBuf>,

    /// Print the extracted text only; no API calls.
    #[arg(long, env = "SERMON_CARD_EXTRACT_ONLY")]
    extract_only: bool,

    /// Gemini model for the summary.
    #[arg(long, env = "SERMON_CARD_TEXT_MODEL", default_value = sermon_card::config::DEFAULT_TEXT_MODEL)]
    text_model: String,

    /// Gemini model for the illustrations.
    #[arg(long, env = "SERMON_CARD_IMAGE_MODEL", default_value = sermon_card::config::DEFAULT_IMAGE_MODEL)]
    image_model: String,

    /// Gemini API root.
    #[arg(long, env = "SERMON_CARD_API_BASE_URL")]
    api_base_url: Option<String>,

    /// Gemini API key. Defaults to GEMINI_API_KEY, then API_KEY.
    #[arg(long, env = "SERMON_CARD_API_KEY", hide_env_values = true)]
    api_key: Option<String>,

    /// Temperature for the summary call (0.0–2.0).
    #[arg(long, env = "SERMON_CARD_TEMPERATURE", default_value_t = 0.4)]
    temperature: f32,

    /// Per-request API timeout in seconds.
    #[arg(long, env = "SERMON_CARD_API_TIMEOUT", default_value_t = 120)]
    api_timeout: u64,

    /// HTTP download timeout in seconds.
    #[arg(long, env = "SERMON_CARD_DOWNLOAD_TIMEOUT", default_value_t = 120)]
    download_timeout: u64,

    /// PDF user password for encrypted documents.
    #[arg(long, env = "SERMON_CARD_PASSWORD", hide_env_values = true)]
    password: Option<String>,

    /// Path to a text file containing a custom system instruction.
    #[arg(long, env = "SERMON_CARD_SYSTEM_INSTRUCTION")]
    system_instruction: Option<PathBuf>,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, env = "SERMON_CARD_VERBOSE")]
    verbose: bool,

    /// Suppress all output except errors.
    #[arg(short, long, env = "SERMON_CARD_QUIET")]
    quiet: bool,

    /// Disable progress bar.
    #[arg(long, env = "SERMON_CARD_NO_PROGRESS")]
    no_progress: bool,
}

#[derive(clap::ValueEnum, Clone, Copy, Debug)]
enum ViewArg {
    Card,
    Infographic,
}

impl From<ViewArg> for ViewType {
    fn from(v: ViewArg) -> Self {
        match v {
            ViewArg::Card => ViewType::SummaryCard,
            ViewArg::Infographic => ViewType::Infographic,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    // Library INFO logs would fight the progress bar for the terminal.
    let show_progress = !cli.quiet && !cli.no_progress && !cli.extract_only;
    let filter = if cli.verbose {
        "debug"
    } else if cli.quiet || show_progress {
        "error"
    } else {
        "info"
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(io::stderr)
        .init();

    let progress = show_progress.then(CliProgress::new);
    let config = build_config(&cli, progress.clone()).await?;

    // ── Extract-only mode ────────────────────────────────────────────────
    if cli.extract_only {
        let extracted = load_sermon_text(&cli.input, &config)
            .await
            .context("Failed to read PDF")?;
        if !cli.quiet {
            eprintln!(
                "{} {} pages, {} characters",
                cyan("◆"),
                extracted.page_count,
                extracted.trimmed_chars()
            );
        }
        return emit(cli.output.as_deref(), &extracted.text).await;
    }

    // ── Run session ──────────────────────────────────────────────────────
    let start = Instant::now();
    let mut session = Session::new(config).context("Failed to start session")?;
    session.set_view(cli.view.into());
    let view = session.view();

    let outcome = session.submit_pdf(&cli.input).await;
    if let Some(ref p) = progress {
        p.finish();
    }
    let analysis = outcome.context("Could not create the summary")?;

    let rendered = render_output(&cli, analysis, view)?;
    emit(cli.output.as_deref(), &rendered).await?;

    if let Some(ref dir) = cli.images_dir {
        let saved = save_images(analysis, dir)
            .await
            .context("Failed to save images")?;
        if !cli.quiet {
            eprintln!("   {} images saved to {}", saved.len(), dir.display());
        }
    }

    if !cli.quiet {
        let fallbacks = analysis
            .generated_images()
            .iter()
            .filter(|i| !i.is_inline())
            .count();
        eprintln!(
            "{}  {}  {}  {}ms{}",
            if fallbacks == 0 { green("✔") } else { yellow("⚠") },
            bold(&analysis.title),
            dim(&analysis.scripture),
            start.elapsed().as_millis(),
            cli.output
                .as_ref()
                .map(|p| format!("  →  {}", bold(&p.display().to_string())))
                .unwrap_or_default(),
        );
        if fallbacks > 0 {
            eprintln!("   {fallbacks} illustration(s) replaced by fallback images");
        }
    }

    Ok(())
}

fn render_output(cli: &Cli, analysis: &SermonAnalysis, view: ViewType) -> Result<String> {
    if cli.json {
        return serde_json::to_string_pretty(analysis).context("Failed to serialise summary");
    }
    Ok(if cli.fragment {
        render_view(analysis, view)
    } else {
        render_page(analysis, view)
    })
}

/// Write to `path` atomically, or to stdout with a trailing newline.
async fn emit(path: Option<&Path>, contents: &str) -> Result<()> {
    if let Some(path) = path {
        return write_atomic(path, contents.as_bytes())
            .await
            .context("Failed to write output");
    }

    let stdout = io::stdout();
    let mut handle = stdout.lock();
    handle
        .write_all(contents.as_bytes())
        .context("Failed to write to stdout")?;
    if !contents.ends_with('\n') {
        handle
            .write_all(b"\n")
            .context("Failed to write to stdout")?;
    }
    Ok(())
}

/// Map CLI args to `SessionConfig`.
async fn build_config(cli: &Cli, progress: Option<Arc<CliProgress>>) -> Result<SessionConfig> {
    let mut builder = SessionConfig::builder()
        .text_model(&cli.text_model)
        .image_model(&cli.image_model)
        .temperature(cli.temperature)
        .api_timeout_secs(cli.api_timeout)
        .download_timeout_secs(cli.download_timeout);

    if let Some(ref url) = cli.api_base_url {
        builder = builder.api_base_url(url);
    }
    if let Some(ref key) = cli.api_key {
        builder = builder.api_key(key);
    }
    if let Some(ref pwd) = cli.password {
        builder = builder.password(pwd);
    }
    if let Some(ref path) = cli.system_instruction {
        let instruction = tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read system instruction from {:?}", path))?;
        builder = builder.system_instruction(instruction);
    }
    if let Some(p) = progress {
        builder = builder.observer(p as Arc<dyn SessionObserver>);
    }

    builder.build().context("Invalid configuration")
}

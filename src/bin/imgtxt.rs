//! CLI binary for imgtxt.
//!
//! A thin shim over the library crate: flags become a `ClientConfig`, the
//! input path feeds the local picker or camera, and notices are printed.

use anyhow::{Context, Result};
use async_trait::async_trait;
use clap::Parser;
use imgtxt::{
    activate_download, ClientConfig, ConversionScreen, HttpConversionService, ImgTxtError,
    LocalCamera, LocalDocumentPicker, Notice, NoticeKind, NoticeSink, OutputFormat, Platform,
    RecognitionLanguage, UrlOpener,
};
use indicatif::{ProgressBar, ProgressStyle};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

// ── ANSI colour helpers (no extra deps) ──────────────────────────────────────

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

// ── Notices on stderr ────────────────────────────────────────────────────────

/// Prints each notice as one line on stderr. Errors are always shown;
/// the success line is dropped in quiet mode.
struct CliNoticeSink {
    quiet: bool,
}

impl NoticeSink for CliNoticeSink {
    fn notify(&self, notice: &Notice) {
        match notice.kind {
            NoticeKind::Success if self.quiet => {}
            NoticeKind::Success => eprintln!(
                "{} {}  {}",
                green("✔"),
                bold(&notice.title),
                notice.message
            ),
            NoticeKind::Error => eprintln!(
                "{} {}  {}",
                red("✘"),
                bold(&notice.title),
                notice.message
            ),
        }
    }
}

// ── Download link activation ─────────────────────────────────────────────────

/// Opens a download link by fetching it into a directory.
struct DownloadOpener {
    service: Arc<HttpConversionService>,
    dest_dir: PathBuf,
    quiet: bool,
}

#[async_trait]
impl UrlOpener for DownloadOpener {
    async fn open(&self, url: &str) -> Result<(), ImgTxtError> {
        let path = self.service.download(url, &self.dest_dir).await?;
        if !self.quiet {
            eprintln!("{} saved {}", cyan("↓"), bold(&path.display().to_string()));
        }
        Ok(())
    }
}

fn upload_spinner() -> ProgressBar {
    let bar = ProgressBar::new_spinner();
    bar.set_style(
        ProgressStyle::with_template("{spinner:.cyan} {prefix:.bold}  {msg}  ⏱ {elapsed_precise}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"]),
    );
    bar.set_prefix("Converting");
    bar.set_message("Uploading…");
    bar.enable_steady_tick(Duration::from_millis(80));
    bar
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # Recognise English text in a scan, print it to stdout
  imgtxt scan.png

  # French PDF, plain-text output, save the generated file
  imgtxt --language fra --format txt letter.pdf --download ./out

  # Treat a photo as a camera capture (named camera_<millis>.jpg)
  imgtxt --capture photo.jpg

  # Talk to a local service, JSON result
  imgtxt --base-url http://localhost:5000 --json receipt.jpg

LANGUAGES:
  eng (English, default), fra (French), deu (German), ara (Arabic), hin (Hindi)

FORMATS:
  docx (Word, default), txt (plain text)

ENVIRONMENT VARIABLES:
  IMGTXT_BASE_URL   Conversion service origin
  IMGTXT_LANGUAGE   Default recognition language
  IMGTXT_FORMAT     Default output format
  IMGTXT_PLATFORM   URI rules for the file part (ios, android, other)
  IMGTXT_TIMEOUT    Request timeout in seconds
  RUST_LOG          Log filter (overrides --verbose / --quiet)
"#;

/// Upload an image or PDF to the conversion service and print the text.
#[derive(Parser, Debug)]
#[command(
    name = "imgtxt",
    version,
    about = "Convert images and PDFs to text through the image-to-text service",
    long_about = "Upload an image or PDF to the image-to-text conversion service, choose the \
recognition language and output format, and get back the recognised text plus a download link \
for the generated document.",
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    /// Image or PDF to upload (as picked from a file chooser).
    #[arg(conflicts_with = "capture")]
    input: Option<PathBuf>,

    /// Upload this image as a camera capture.
    #[arg(long)]
    capture: Option<PathBuf>,

    /// Recognition language.
    #[arg(short, long, env = "IMGTXT_LANGUAGE", value_enum, default_value = "eng")]
    language: LanguageArg,

    /// Output document format.
    #[arg(short, long, env = "IMGTXT_FORMAT", value_enum, default_value = "docx")]
    format: FormatArg,

    /// Conversion service origin.
    #[arg(long, env = "IMGTXT_BASE_URL", default_value = imgtxt::DEFAULT_BASE_URL)]
    base_url: String,

    /// URI rules for the uploaded file part. Defaults to the host platform.
    #[arg(long, env = "IMGTXT_PLATFORM", value_enum)]
    platform: Option<PlatformArg>,

    /// Request timeout in seconds (default: none).
    #[arg(long, env = "IMGTXT_TIMEOUT")]
    timeout: Option<u64>,

    /// Write the recognised text (or the JSON with `--json`) to this file
    /// instead of stdout.
    #[arg(short, long, env = "IMGTXT_OUTPUT")]
    output: Option<PathBuf>,

    /// Fetch the generated document into this directory.
    #[arg(long, env = "IMGTXT_DOWNLOAD_DIR")]
    download: Option<PathBuf>,

    /// Print the result as JSON.
    #[arg(long)]
    json: bool,

    /// Disable the upload spinner.
    #[arg(long, env = "IMGTXT_NO_PROGRESS")]
    no_progress: bool,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, env = "IMGTXT_VERBOSE")]
    verbose: bool,

    /// Suppress all output except errors and the result itself.
    #[arg(short, long, env = "IMGTXT_QUIET")]
    quiet: bool,
}

#[derive(clap::ValueEnum, Clone, Copy, Debug)]
enum LanguageArg {
    Eng,
    Fra,
    Deu,
    Ara,
    Hin,
}

impl From<LanguageArg> for RecognitionLanguage {
    fn from(v: LanguageArg) -> Self {
        match v {
            LanguageArg::Eng => RecognitionLanguage::Eng,
            LanguageArg::Fra => RecognitionLanguage::Fra,
            LanguageArg::Deu => RecognitionLanguage::Deu,
            LanguageArg::Ara => RecognitionLanguage::Ara,
            LanguageArg::Hin => RecognitionLanguage::Hin,
        }
    }
}

#[derive(clap::ValueEnum, Clone, Copy, Debug)]
enum FormatArg {
    Docx,
    Txt,
}

impl From<FormatArg> for OutputFormat {
    fn from(v: FormatArg) -> Self {
        match v {
            FormatArg::Docx => OutputFormat::Docx,
            FormatArg::Txt => OutputFormat::Txt,
        }
    }
}

#[derive(clap::ValueEnum, Clone, Copy, Debug)]
enum PlatformArg {
    Ios,
    Android,
    Other,
}

impl From<PlatformArg> for Platform {
    fn from(v: PlatformArg) -> Self {
        match v {
            PlatformArg::Ios => Platform::Ios,
            PlatformArg::Android => Platform::Android,
            PlatformArg::Other => Platform::Other,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    // The spinner gives all the feedback that matters; keep INFO logs from
    // tearing it up unless the user asked for them.
    let show_progress = !cli.quiet && !cli.no_progress && !cli.json;
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

    // ── Wire the screen ──────────────────────────────────────────────────
    let config = build_config(&cli)?;
    let service = Arc::new(
        HttpConversionService::new(config.clone()).context("Failed to create HTTP client")?,
    );
    let screen = ConversionScreen::new(config, service.clone())
        .with_notice_sink(Arc::new(CliNoticeSink { quiet: cli.quiet }))
        .with_picker(Arc::new(LocalDocumentPicker::new(cli.input.clone())))
        .with_camera(Arc::new(LocalCamera::new(cli.capture.clone())));

    // ── Acquire ──────────────────────────────────────────────────────────
    if cli.capture.is_some() {
        screen
            .capture_from_camera()
            .await
            .context("Camera capture failed")?;
    } else if cli.input.is_some() {
        screen.pick_file().await.context("Could not pick file")?;
    }

    if !cli.quiet {
        if let Some(name) = screen.view().selected {
            eprintln!(
                "{} Selected: {}  {}",
                cyan("◆"),
                bold(&name),
                dim(&format!("[{} → {}]", screen.state().language(), screen.state().format()))
            );
        }
    }

    // ── Upload ───────────────────────────────────────────────────────────
    let spinner = show_progress.then(upload_spinner);
    let outcome = screen.upload().await;
    if let Some(bar) = spinner {
        bar.finish_and_clear();
    }
    outcome.context("Conversion failed")?;

    // ── Present ──────────────────────────────────────────────────────────
    let view = screen.view();

    if cli.json {
        let json = serde_json::to_string_pretty(&view).context("Failed to serialise result")?;
        match &cli.output {
            Some(path) => write_output(path, &json, "JSON", cli.quiet).await?,
            None => println!("{json}"),
        }
    } else if let Some(text) = &view.text {
        if let Some(path) = &cli.output {
            write_output(path, text, "text", cli.quiet).await?;
        } else {
            let stdout = io::stdout();
            let mut handle = stdout.lock();
            handle
                .write_all(text.as_bytes())
                .context("Failed to write to stdout")?;
            if !text.ends_with('\n') {
                handle.write_all(b"\n").ok();
            }
        }
    } else if !cli.quiet {
        eprintln!("{}", dim("(no text recognised)"));
    }

    if let Some(url) = &view.download_url {
        if !cli.quiet && !cli.json {
            eprintln!("{} Download: {}", cyan("⇩"), url);
        }
    }

    if let Some(dir) = &cli.download {
        let opener = DownloadOpener {
            service,
            dest_dir: dir.clone(),
            quiet: cli.quiet,
        };
        let opened = activate_download(&view, &opener)
            .await
            .context("Failed to download generated file")?;
        if !opened && !cli.quiet {
            eprintln!("{}", dim("(no download link returned)"));
        }
    }

    Ok(())
}

/// Write the rendered result to `-o`, replacing any existing file.
async fn write_output(path: &Path, contents: &str, what: &str, quiet: bool) -> Result<()> {
    imgtxt::output::write_atomic(path, contents.as_bytes())
        .await
        .with_context(|| format!("Failed to write {what} output"))?;
    if !quiet {
        eprintln!("{} {what} written to {}", green("✔"), bold(&path.display().to_string()));
    }
    Ok(())
}

/// Map CLI args to `ClientConfig`.
fn build_config(cli: &Cli) -> Result<ClientConfig> {
    let mut builder = ClientConfig::builder()
        .base_url(&cli.base_url)
        .language(cli.language.into())
        .format(cli.format.into());

    if let Some(p) = cli.platform {
        builder = builder.platform(p.into());
    }
    if let Some(secs) = cli.timeout {
        builder = builder.timeout_secs(secs);
    }

    builder.build().context("Invalid configuration")
}

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::Parser;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use jobfill::browser::FillerBrowser;
use jobfill::config::Config;
use jobfill::filler::{FillReport, FormFiller};
use jobfill::llm::LlmClient;
use jobfill::panel;
use jobfill::parser;
use jobfill::resume::ResumeDocument;

const RESUME_EXTENSIONS: &[&str] = &["pdf", "docx", "doc"];
const DEFAULT_CONFIG: &str = "jobfill.toml";

/// Auto-fill job application forms from a resume.
#[derive(Parser, Debug)]
#[command(name = "jobfill", version)]
struct Cli {
    /// Path to the resume file (PDF or Word)
    #[arg(short, long)]
    resume: Option<PathBuf>,

    /// Job application URL to open
    #[arg(short, long)]
    url: Option<String>,

    /// Path to the TOML configuration file
    #[arg(short, long, default_value = DEFAULT_CONFIG)]
    config: PathBuf,

    /// Log level (error, warn, info, debug, trace); RUST_LOG overrides
    #[arg(long, default_value = "info")]
    log_level: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&cli.log_level)),
        )
        .init();

    info!("jobfill v{} starting", env!("CARGO_PKG_VERSION"));

    let config = load_config(&cli.config)?;

    let resume_path = match cli.resume {
        Some(path) => path,
        None => find_resume_file(Path::new("resumes"))?,
    };

    info!("parsing resume: {}", resume_path.display());
    let resume = parser::parse_file(&resume_path)?;
    resume.save(&config.output.parsed_resume)?;
    info!(
        "parsed resume data saved to {}",
        config.output.parsed_resume.display()
    );
    log_resume_summary(&resume);

    let llm = LlmClient::new(config.llm.clone())?;

    let browser = FillerBrowser::launch(&config.browser)
        .await
        .context("starting browser")?;

    let target = cli.url.as_deref().unwrap_or("about:blank");
    if cli.url.is_none() {
        info!("no target URL provided, navigate to the job application form manually");
    }
    let page = browser.new_page(target).await.context("opening page")?;

    let filler = FormFiller::new(&page, &resume, &llm, &config.automation);
    loop {
        panel::inject(&page).await?;
        let area = panel::wait_for_selection(&page).await?;
        panel::wait_for_start(&page).await?;

        let report = filler.fill_area(&area).await;
        log_fill_report(&report);

        if !panel::ask_continue(&page).await {
            break;
        }
    }

    info!("form filling completed, browser stays open for review (Ctrl-C to exit)");
    tokio::signal::ctrl_c()
        .await
        .context("waiting for Ctrl-C")?;

    browser.close().await?;
    Ok(())
}

/// An explicitly-given config path must exist; the default path quietly
/// falls back to built-in defaults when absent.
fn load_config(path: &Path) -> Result<Config> {
    if path.exists() {
        Ok(Config::load(path)?)
    } else if path == Path::new(DEFAULT_CONFIG) {
        Ok(Config::default())
    } else {
        bail!("configuration file {} not found", path.display());
    }
}

/// First supported resume file in the given directory.
fn find_resume_file(dir: &Path) -> Result<PathBuf> {
    if !dir.is_dir() {
        bail!(
            "resume directory '{}' not found; pass --resume or create it",
            dir.display()
        );
    }
    for entry in std::fs::read_dir(dir)? {
        let path = entry?.path();
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase());
        if let Some(ext) = ext {
            if RESUME_EXTENSIONS.contains(&ext.as_str()) {
                info!("found resume file: {}", path.display());
                return Ok(path);
            }
        }
    }
    bail!(
        "no resume files found in '{}'; supported formats: {}",
        dir.display(),
        RESUME_EXTENSIONS.join(", ")
    );
}

fn log_resume_summary(resume: &ResumeDocument) {
    let info = &resume.personal_info;
    info!(
        "parsed resume for: {}",
        info.name.as_deref().unwrap_or("Unknown")
    );
    info!("email: {}", info.email.as_deref().unwrap_or("Not found"));
    info!("found {} work experiences", resume.work_experience.len());
    info!("found {} education entries", resume.education.len());
    info!("found {} skills", resume.skills.len());
}

fn log_fill_report(report: &FillReport) {
    info!("=== auto-fill results ===");
    info!("total fields found: {}", report.total_fields);
    info!("fields successfully filled: {}", report.filled_fields);
    for err in &report.errors {
        warn!("  - {err}");
    }
    let rate = if report.total_fields > 0 {
        report.filled_fields as f64 / report.total_fields as f64 * 100.0
    } else {
        0.0
    };
    info!("success rate: {rate:.1}%");
    if report.success {
        info!("auto-fill completed successfully");
    } else {
        error!("auto-fill completed with errors");
    }
}

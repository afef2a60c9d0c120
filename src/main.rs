//! # PNG Minify - Main Entry Point
//!
//! Questo è il punto di ingresso principale dell'applicazione.
//!
//! ## Responsabilità:
//! - Parsing degli argomenti della command line con `clap`
//! - Inizializzazione del sistema di logging con `tracing`
//! - Caricamento della configurazione e override dai flag
//! - Verifica del tool, discovery dei PNG e avvio del batch
//!
//! ## Flusso di esecuzione:
//! 1. Parsa gli argomenti CLI (directory, tool, quality, workers, etc.)
//! 2. Configura il logging (INFO o DEBUG a seconda del flag verbose)
//! 3. Carica il file di configurazione e applica gli override
//! 4. Verifica che pngquant sia presente e compatibile
//! 5. Trova i PNG, crea i job e avvia il BatchRunner
//! 6. Stampa il riepilogo (testo o JSON)
//!
//! ## Esempio di utilizzo:
//! ```bash
//! png-minify Assets/Textures --tool /usr/local/bin/pngquant --quality 80 --workers 4
//! ```

use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, warn};

use png_minify::file_manager::FileManager;
use png_minify::json_output::{JsonMessage, JsonSink};
use png_minify::progress::ProgressManager;
use png_minify::{BatchRunner, CompressionJob, Config, OutputSink, RunnerOptions, ToolVerifier};

#[derive(Parser)]
#[command(name = "png-minify")]
#[command(about = "Minify every PNG under a directory with pngquant")]
struct Args {
    /// Directory containing PNG files to minify
    target_directory: PathBuf,

    /// Path to the pngquant binary (default: look it up on PATH)
    #[arg(short, long)]
    tool: Option<PathBuf>,

    /// Quality passed to pngquant (0-100)
    #[arg(short, long)]
    quality: Option<u8>,

    /// Suffix pngquant adds to its output files
    #[arg(long)]
    suffix: Option<String>,

    /// Keep artifacts even when they are larger than the original
    #[arg(long)]
    no_skip_if_larger: bool,

    /// Number of concurrent pngquant processes
    #[arg(short, long)]
    workers: Option<usize>,

    /// Per-file timeout in seconds (0 = none)
    #[arg(long)]
    timeout: Option<u64>,

    /// Configuration file (default: <config dir>/png-minify/config.json)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Output progress and status as JSON lines
    #[arg(long)]
    json: bool,

    /// Verbose logging
    #[arg(short, long)]
    verbose: bool,
}

impl Args {
    /// Apply command line overrides on top of the loaded configuration
    fn apply(&self, mut config: Config) -> Config {
        if let Some(ref tool) = self.tool {
            config.tool_path = Some(tool.clone());
        }
        if let Some(quality) = self.quality {
            config.quality = quality;
        }
        if let Some(ref suffix) = self.suffix {
            config.artifact_suffix = suffix.clone();
        }
        if self.no_skip_if_larger {
            config.skip_if_larger = false;
        }
        if let Some(workers) = self.workers {
            config.workers = workers;
        }
        if let Some(timeout) = self.timeout {
            config.timeout_secs = timeout;
        }
        if self.json {
            config.json_output = true;
        }
        config
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logging; keep stdout clean for JSON consumers
    let subscriber = tracing_subscriber::fmt()
        .with_max_level(if args.verbose {
            tracing::Level::DEBUG
        } else {
            tracing::Level::INFO
        })
        .with_writer(std::io::stderr)
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;

    let config_path = args.config.clone().or_else(Config::default_path);
    let config = match config_path {
        Some(ref path) => Config::from_file(path).await?,
        None => Config::default(),
    };
    let config = args.apply(config);
    config.validate()?;

    if let Err(e) = run(&args, &config).await {
        if config.json_output {
            JsonMessage::error(e.to_string(), e.chain().nth(1).map(|s| s.to_string())).emit();
        }
        return Err(e);
    }

    Ok(())
}

async fn run(args: &Args, config: &Config) -> Result<()> {
    let start_time = std::time::Instant::now();

    if !args.target_directory.is_dir() {
        return Err(anyhow::anyhow!(
            "Target directory does not exist: {}",
            args.target_directory.display()
        ));
    }

    let tool_path = config.tool_path.clone().or_else(|| ToolVerifier::resolve("pngquant"));
    let tool_path = ToolVerifier::new(config.version_marker.clone()).check(tool_path.as_deref())?;
    info!("Using {}", tool_path.display());

    let files = FileManager::find_png_files(&args.target_directory, &config.artifact_suffix)?;
    info!("png files: {}", files.len());
    let mut jobs = CompressionJob::from_paths(&files).await;

    if config.json_output {
        JsonMessage::start(tool_path.clone(), jobs.len(), config.quality, config.workers).emit();
    }

    let runner = BatchRunner::new(RunnerOptions::from(config));
    let canceller = runner.canceller();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupted, cancelling batch");
            canceller.cancel();
        }
    });

    let progress = if config.json_output {
        ProgressManager::hidden(jobs.len() as u64)
    } else {
        ProgressManager::new(jobs.len() as u64, runner.options().workers > 1)
    };
    let sink: Arc<dyn OutputSink> = if config.json_output {
        Arc::new(JsonSink)
    } else {
        Arc::new(progress.clone())
    };

    let summary = runner.run(&tool_path, &mut jobs, config.quality, sink).await?;

    if config.json_output {
        for job in &jobs {
            JsonMessage::file_result(job).emit();
        }
        JsonMessage::complete(&summary, start_time.elapsed().as_secs_f64()).emit();
    } else {
        progress.finish(&summary.to_string());
        info!("{}", summary);
        if summary.files_failed > 0 {
            warn!("{} of {} files failed, see the log above", summary.files_failed, summary.files);
        }
    }

    Ok(())
}

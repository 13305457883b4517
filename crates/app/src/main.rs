use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use pixcycle_core::{AppConfig, DayWindow, PixletToolchain, PlaybackScheduler, SystemClock};
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

#[tokio::main(flavor = "current_thread")]
async fn main() -> pixcycle_core::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.log_level);

    let window = DayWindow::parse(&cli.day_start, &cli.day_end)?;
    let mut config = match &cli.catalog {
        Some(path) => AppConfig::from_json_file(path)?,
        None => AppConfig::default(),
    };
    if let Some(secs) = cli.command_timeout {
        config.scheduler.command_timeout_secs = Some(secs);
    }

    let toolchain =
        PixletToolchain::new(cli.pixlet.clone()).with_timeout(config.scheduler.command_timeout()?);

    tracing::info!(device = %cli.device, ?window, "starting scheduler");
    let scheduler =
        match PlaybackScheduler::bootstrap(&config, &cli.device, window, toolchain, SystemClock)
            .await
        {
            Ok(scheduler) => scheduler,
            Err(err) => {
                tracing::error!(%err, "startup failed");
                return Err(err);
            }
        };

    let cancel = CancellationToken::new();
    tokio::spawn(shutdown_on_ctrl_c(cancel.clone()));

    scheduler.run(&cancel).await;
    Ok(())
}

async fn shutdown_on_ctrl_c(cancel: CancellationToken) {
    match tokio::signal::ctrl_c().await {
        Ok(()) => tracing::info!("interrupt received, stopping after the current step"),
        Err(err) => tracing::warn!(%err, "cannot listen for ctrl-c"),
    }
    cancel.cancel();
}

fn init_tracing(level: Option<LogLevel>) {
    let filter = match level {
        Some(level) => EnvFilter::new(level.as_directive()),
        None => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
    };
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}

#[derive(Parser, Debug)]
#[command(author, version, about = "Cycle a pixel display through a playlist of apps", long_about = None)]
struct Cli {
    /// Name (or part of the name) of the target device.
    #[arg(long)]
    device: String,
    /// Start of the day window, HH:MM.
    #[arg(long, default_value = "07:00")]
    day_start: String,
    /// End of the day window, HH:MM.
    #[arg(long, default_value = "23:00")]
    day_end: String,
    /// Overrides RUST_LOG.
    #[arg(long, value_enum)]
    log_level: Option<LogLevel>,
    /// JSON playlist file. The built-in playlist is used when omitted.
    #[arg(long)]
    catalog: Option<PathBuf>,
    /// Path to the pixlet executable.
    #[arg(long, default_value = "pixlet")]
    pixlet: PathBuf,
    /// Kill external commands that run longer than this many seconds.
    #[arg(long)]
    command_timeout: Option<f64>,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl LogLevel {
    fn as_directive(self) -> &'static str {
        match self {
            Self::Trace => "trace",
            Self::Debug => "debug",
            Self::Info => "info",
            Self::Warn => "warn",
            Self::Error => "error",
        }
    }
}

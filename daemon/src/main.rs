use anyhow::{Context, Result};
use clap::Parser;
use governor_daemon::{
    config::Config,
    host::LinuxHost,
    logging,
    monitor::Monitor,
    sampler::ProcNetDevSource,
    units::format_size,
};
use std::path::PathBuf;
use tracing::{debug, info, warn};
use tracing_subscriber::filter::LevelFilter;

#[derive(Parser, Debug)]
#[command(
    name = "traffic-governor",
    version,
    about = "Suspend bandwidth-hungry processes while traffic over a rolling window is above a limit"
)]
struct Cli {
    /// Path to the TOML config file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Write a default config file to the config path and exit
    #[arg(long)]
    init: bool,

    /// Log at debug level unless RUST_LOG says otherwise
    #[arg(short, long)]
    verbose: bool,
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!("Failed to listen for Ctrl-C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                warn!("Failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config_path = cli.config.unwrap_or_else(Config::config_path);

    if cli.init {
        if config_path.exists() {
            anyhow::bail!("{} already exists", config_path.display());
        }
        Config::template()
            .save(&config_path)
            .with_context(|| format!("writing {}", config_path.display()))?;
        println!(
            "Wrote default config to {}; list the processes to suspend under [watch]",
            config_path.display()
        );
        return Ok(());
    }

    let config = Config::load_or_default(&config_path)
        .with_context(|| format!("loading {}", config_path.display()))?;
    let settings = config
        .validate()
        .with_context(|| format!("invalid configuration in {}", config_path.display()))?;

    let level = if cli.verbose { LevelFilter::DEBUG } else { LevelFilter::INFO };
    logging::init(level, settings.log_file.as_deref()).context("setting up logging")?;

    info!("traffic-governor {} starting", env!("CARGO_PKG_VERSION"));
    info!(
        "Limit {} per {:?}, sampling every {:?}",
        format_size(settings.limit),
        settings.window,
        settings.sample_interval
    );
    if let Some(log_file) = &settings.log_file {
        info!("Logging to {}", log_file.display());
    }
    for name in &settings.processes {
        debug!("Watching {}", name);
    }

    let source = ProcNetDevSource::new(settings.counter, settings.include_loopback);
    let notifier = settings.notification_method.notifier();
    let mut monitor = Monitor::new(source, LinuxHost::new(), notifier, &settings)?;

    let report = monitor.run(shutdown_signal()).await;
    for (name, e) in &report.failures {
        warn!("Could not resume {}: {}", name, e);
    }
    info!("traffic-governor stopped");
    Ok(())
}

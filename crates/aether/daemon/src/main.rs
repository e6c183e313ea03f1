//! Aether Daemon - runs a sensing session against simulated sensors
//!
//! The daemon provides:
//! - Layered configuration (defaults, file, environment, flags)
//! - Synthetic microphone, compass and haptic motor
//! - A live console readout of the session feed
//! - Graceful shutdown on Ctrl+C, SIGTERM or after a fixed duration

use std::io::Write;
use std::time::Duration;

use aether_core::{Profile, SessionController, SessionSnapshot, StdRandom};
use clap::Parser;
use tokio::time::sleep;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod config;
mod console;
mod error;
mod simulation;

use config::{DaemonConfig, LoggingConfig};
use console::ConsoleRenderer;
use error::{DaemonError, DaemonResult};

/// Aether Daemon CLI
#[derive(Parser)]
#[command(name = "aetherd")]
#[command(about = "Aether Daemon - entropy, glitch and anomaly loop on simulated sensors", long_about = None)]
#[command(version)]
struct Cli {
    /// Configuration file path
    #[arg(short, long, env = "AETHER_CONFIG")]
    config: Option<String>,

    /// Tuning profile (classic, sensitive)
    #[arg(short, long, env = "AETHER_PROFILE")]
    profile: Option<String>,

    /// Log level
    #[arg(long, env = "AETHER_LOG_LEVEL")]
    log_level: Option<String>,

    /// Enable JSON logging
    #[arg(long, env = "AETHER_LOG_JSON")]
    json: bool,

    /// Stop after this many seconds (0 runs until interrupted)
    #[arg(short, long, env = "AETHER_DURATION_SECS")]
    duration_secs: Option<u64>,

    /// Seed for reproducible runs
    #[arg(long, env = "AETHER_SEED")]
    seed: Option<u64>,

    /// Simulate a device without a vibration motor
    #[arg(long)]
    no_haptics: bool,
}

impl Cli {
    /// Apply command-line overrides on top of the loaded configuration.
    fn apply(&self, config: &mut DaemonConfig) -> DaemonResult<()> {
        if let Some(profile) = &self.profile {
            let profile: Profile = profile.parse().map_err(DaemonError::Config)?;
            config.apply_profile(profile);
        }
        if let Some(level) = &self.log_level {
            config.logging.level = level.clone();
        }
        if self.json {
            config.logging.json = true;
        }
        if let Some(secs) = self.duration_secs {
            config.simulation.duration_secs = secs;
        }
        if self.seed.is_some() {
            config.simulation.seed = self.seed;
        }
        if self.no_haptics {
            config.simulation.haptics = false;
        }
        Ok(())
    }
}

#[tokio::main]
async fn main() -> DaemonResult<()> {
    let cli = Cli::parse();

    // Load configuration
    let mut config = DaemonConfig::load(cli.config.as_deref())?;
    cli.apply(&mut config)?;
    config
        .session
        .validate()
        .map_err(|e| DaemonError::Config(e.to_string()))?;

    init_tracing(&config.logging);

    println!(
        r#"
     _    _____ _____ _   _ _____ ____
    / \  | ____|_   _| | | | ____|  _ \
   / _ \ |  _|   | | | |_| |  _| | |_) |
  / ___ \| |___  | | |  _  | |___|  _ <
 /_/   \_\_____| |_| |_| |_|_____|_| \_\

  Version: {}
  Tick: {} ms   Glitch > {}   Anomaly > {} (gate {})
"#,
        env!("CARGO_PKG_VERSION"),
        config.session.sampling.tick_interval_ms,
        config.session.glitch.threshold,
        config.session.anomaly.threshold,
        config.session.anomaly.gate,
    );

    let capabilities = simulation::capabilities(&config.simulation);
    let mut session = SessionController::new(config.session.clone(), capabilities);
    if let Some(seed) = config.simulation.seed {
        session = session.with_random(StdRandom::seeded(seed));
    }
    let mut feed = session.subscribe();
    session.start().await?;

    let mut renderer = ConsoleRenderer::new();
    let mut stdout = std::io::stdout();

    let shutdown = shutdown_signal();
    tokio::pin!(shutdown);
    let deadline = run_for(config.simulation.duration_secs);
    tokio::pin!(deadline);

    loop {
        tokio::select! {
            _ = &mut shutdown => break,
            _ = &mut deadline => {
                tracing::info!(
                    secs = config.simulation.duration_secs,
                    "Run duration elapsed, stopping"
                );
                break;
            }
            changed = feed.changed() => {
                if changed.is_err() {
                    break;
                }
                let snapshot = feed.borrow_and_update().clone();
                draw(&mut stdout, &mut renderer, &snapshot)?;
            }
        }
    }

    session.stop().await;
    draw(&mut stdout, &mut renderer, &session.snapshot())?;
    writeln!(stdout)?;
    Ok(())
}

fn init_tracing(logging: &LoggingConfig) {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| logging.level.clone().into());

    // Logs go to stderr so they do not tear the status line.
    if logging.json {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_writer(std::io::stderr),
            )
            .init();
    } else {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }
}

fn draw(
    out: &mut impl Write,
    renderer: &mut ConsoleRenderer,
    snapshot: &SessionSnapshot,
) -> DaemonResult<()> {
    let frame = renderer.render(snapshot);
    for line in &frame.new_lines {
        write!(out, "\r\x1b[2K{}\n", line)?;
    }
    write!(out, "\r\x1b[2K{}", frame.status)?;
    out.flush()?;
    Ok(())
}

async fn run_for(secs: u64) {
    if secs == 0 {
        std::future::pending::<()>().await;
    } else {
        sleep(Duration::from_secs(secs)).await;
    }
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::warn!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::warn!(error = %e, "Failed to install signal handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C, stopping session");
        }
        _ = terminate => {
            tracing::info!("Received terminate signal, stopping session");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_overrides() {
        let cli = Cli::parse_from([
            "aetherd",
            "--profile",
            "sensitive",
            "--seed",
            "42",
            "--duration-secs",
            "5",
            "--no-haptics",
            "--log-level",
            "debug",
        ]);
        let mut config = DaemonConfig::default();
        cli.apply(&mut config).unwrap();

        assert_eq!(config.session.glitch.threshold, 50.0);
        assert_eq!(config.simulation.seed, Some(42));
        assert_eq!(config.simulation.duration_secs, 5);
        assert!(!config.simulation.haptics);
        assert_eq!(config.logging.level, "debug");
    }

    #[test]
    fn test_unknown_profile_rejected() {
        let cli = Cli::parse_from(["aetherd", "--profile", "loud"]);
        let mut config = DaemonConfig::default();
        assert!(matches!(
            cli.apply(&mut config),
            Err(DaemonError::Config(_))
        ));
    }

    #[test]
    fn test_draw_writes_status_line() {
        let snapshot = SessionSnapshot::idle(aether_core::SessionId::generate());
        let mut out = Vec::new();
        let mut renderer = ConsoleRenderer::new();
        draw(&mut out, &mut renderer, &snapshot).unwrap();

        let text = String::from_utf8(out).unwrap();
        assert!(text.starts_with("\r\x1b[2K"));
        assert!(text.contains("not started"));
        assert!(!text.contains('\n'));
    }
}

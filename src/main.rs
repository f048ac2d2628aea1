use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use pocket_lock::{
    AppConfig, Message, Notifier, PocketLockApp, QuietHoursScheduler, Response, Ringer,
    SchedulerAction, SimulatedRinger, StatusNotification, SystemClock, UnavailableRinger,
    config::RingerBackend,
    console::{self, ConsoleCommand, HELP},
};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::{mpsc, watch};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

#[derive(Parser, Debug)]
#[command(name = "pocket-lock")]
#[command(about = "Pocket lock controls and quiet-hours ringer scheduler")]
struct Args {
    /// Run only the quiet-hours scheduler (no interactive controls)
    #[arg(long)]
    daemon: bool,

    /// Load configuration from this file instead of the default locations
    #[arg(long)]
    config: Option<PathBuf>,
}

fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logging; stdout belongs to the console
    let filter = EnvFilter::builder()
        .with_default_directive(tracing::level_filters::LevelFilter::INFO.into())
        .parse_lossy("pocket_lock=debug");

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();

    let config = match &args.config {
        Some(path) => AppConfig::load_from(path),
        None => AppConfig::load(),
    }
    .context("Failed to load configuration")?;

    // Single-threaded by design: one tick source plus user input on the same task
    let rt = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("Failed to create tokio runtime")?;

    let result = if args.daemon {
        rt.block_on(run_daemon(config))
    } else {
        rt.block_on(run_console(config))
    };

    // A pending stdin read must not keep the process alive
    rt.shutdown_background();
    result
}

fn build_ringer(config: &AppConfig) -> Arc<dyn Ringer> {
    match config.ringer.backend {
        RingerBackend::Simulated => Arc::new(SimulatedRinger::default()),
        RingerBackend::None => Arc::new(UnavailableRinger),
    }
}

fn build_notifier(open_requests: Option<mpsc::UnboundedSender<()>>) -> Arc<dyn Notifier> {
    #[cfg(feature = "desktop")]
    {
        Arc::new(match open_requests {
            Some(tx) => pocket_lock::DesktopNotifier::with_open_requests(tx),
            None => pocket_lock::DesktopNotifier::new(),
        })
    }
    #[cfg(not(feature = "desktop"))]
    {
        let _ = open_requests;
        Arc::new(pocket_lock::UnavailableNotifier)
    }
}

/// Run in daemon mode - post the status notification and keep the scheduler ticking
async fn run_daemon(config: AppConfig) -> Result<()> {
    tracing::info!("Starting Pocket Lock in daemon mode");

    let mut notification = StatusNotification::new(&config.notification, build_notifier(None));
    notification.activate();

    if !config.schedule.enabled {
        tracing::warn!("Quiet-hours schedule is disabled; the scheduler will stay idle");
    }
    let scheduler = QuietHoursScheduler::new(
        config.schedule,
        build_ringer(&config),
        Arc::new(SystemClock),
    );

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let interval = Duration::from_secs(config.scheduler.tick_interval_secs);
    let handle = tokio::spawn(scheduler.run(interval, shutdown_rx));

    tokio::signal::ctrl_c()
        .await
        .context("Failed to listen for shutdown signal")?;
    tracing::info!("Shutting down");

    let _ = shutdown_tx.send(true);
    handle.await.context("Scheduler task failed")?;
    Ok(())
}

/// Run the interactive console - stdin lines drive the app, the timer drives the scheduler
async fn run_console(config: AppConfig) -> Result<()> {
    let (open_tx, mut open_rx) = mpsc::unbounded_channel();
    let mut app = PocketLockApp::new(
        &config,
        Arc::new(SystemClock),
        build_ringer(&config),
        build_notifier(Some(open_tx)),
    );

    let started = tokio::time::Instant::now();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    let mut ticker = tokio::time::interval(Duration::from_secs(config.scheduler.tick_interval_secs));
    ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);

    println!("{HELP}");

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                let response = app.update(Message::Tick);
                if let Response::Scheduler(SchedulerAction::SetMode(_)) = response {
                    println!("{}", console::describe(&response));
                }
            }
            line = lines.next_line() => {
                let Some(line) = line.context("Failed to read input")? else {
                    break;
                };
                match console::parse_line(&line, started.elapsed()) {
                    Ok(None) => {}
                    Ok(Some(ConsoleCommand::Quit)) => break,
                    Ok(Some(ConsoleCommand::Help)) => println!("{HELP}"),
                    Ok(Some(ConsoleCommand::Status)) => {
                        let snapshot = serde_json::to_string_pretty(&app.snapshot())
                            .context("Failed to serialize status")?;
                        println!("{snapshot}");
                    }
                    Ok(Some(ConsoleCommand::Send(message))) => {
                        let response = app.update(message);
                        println!("{}", console::describe(&response));
                    }
                    Err(e) => println!("error: {e}"),
                }
            }
            Some(()) = open_rx.recv() => {
                // Clicking the notification dismisses it on most servers
                println!("controls reopened from notification\n{HELP}");
                app.update(Message::ActivateNotification);
            }
            _ = &mut ctrl_c => break,
        }
    }

    tracing::info!("Console closed");
    Ok(())
}

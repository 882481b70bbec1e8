use clap::Parser;
use colored::*;
use std::process;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tokio_util::task::TaskTracker;
use tracing::{error, info};

use relaybot::api::OpenAiGateway;
use relaybot::cli::Args;
use relaybot::config::Config;
use relaybot::conversation::{ConversationManager, ConversationStore, JsonFileStore};
use relaybot::dispatch::{Blocklist, Dispatcher};
use relaybot::logging::init_tracing;
use relaybot::maintenance::{self, MaintenanceSchedule};
use relaybot::models::now_millis;
use relaybot::platform::console;
use relaybot::rate_limit::RateLimiter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    init_tracing(args.verbose);

    // Handle --clear option
    if args.clear_memory {
        let path = match Config::memory_file_from_env_and_args(&args) {
            Ok(path) => path,
            Err(e) => {
                eprintln!("{} {}", "Error:".red(), e);
                process::exit(1);
            }
        };
        match JsonFileStore::new(&path).clear() {
            Ok(()) => {
                println!(
                    "{}",
                    format!("All conversation memory cleared ({}).", path.display()).green()
                );
                return Ok(());
            }
            Err(e) => {
                eprintln!("{}", format!("Error clearing memory: {}", e).red());
                process::exit(1);
            }
        }
    }

    // Missing credentials end the process before anything connects.
    let config = match Config::from_env_and_args(&args) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{} {}", "Error:".red(), e);
            process::exit(1);
        }
    };

    let store: Arc<dyn ConversationStore> = Arc::new(JsonFileStore::new(&config.memory_file));
    let memory = Arc::new(ConversationManager::open(store, config.history.clone()));

    let report = memory.purge(now_millis(), config.inactivity_limit_ms());
    if let Err(e) = memory.flush().await {
        error!(error = %e, "initial save failed");
    }

    if args.purge {
        println!(
            "{}",
            format!(
                "Removed {} inactive conversation(s), trimmed {}; {} remain.",
                report.removed,
                report.trimmed,
                memory.len()
            )
            .green()
        );
        return Ok(());
    }

    let gateway = match OpenAiGateway::new(
        &config.api_key,
        &config.api_endpoint,
        config.request_timeout,
    ) {
        Ok(gateway) => gateway,
        Err(e) => {
            eprintln!("{} {}", "Error:".red(), e);
            process::exit(1);
        }
    };
    info!(endpoint = gateway.endpoint(), model = %config.model.model, "completion gateway ready");

    let limiter = Arc::new(RateLimiter::new());
    let mut dispatcher = Dispatcher::new(Arc::clone(&memory), Arc::new(gateway), config.model.clone())
        .with_filter(config.event_filter())
        .with_rate_limit(Arc::clone(&limiter), config.min_interval_ms)
        .with_replies(config.replies.clone());
    if !config.blocked_words.is_empty() {
        dispatcher = dispatcher.with_pre_filter(Arc::new(Blocklist::new(&config.blocked_words)));
    }
    let dispatcher = Arc::new(dispatcher);

    let cancel = CancellationToken::new();
    let ticker = maintenance::spawn(
        Arc::clone(&memory),
        limiter,
        MaintenanceSchedule {
            flush_interval: config.flush_interval,
            purge_interval: config.purge_interval,
            inactivity_limit_ms: config.inactivity_limit_ms(),
            min_interval_ms: config.min_interval_ms,
        },
        cancel.child_token(),
    );

    let tracker = TaskTracker::new();
    tokio::select! {
        result = console::run(dispatcher, &tracker, cancel.clone()) => {
            if let Err(e) = result {
                error!(error = %e, "input loop failed");
            }
        }
        _ = shutdown_signal() => info!("shutdown requested, saving memory"),
    }

    cancel.cancel();
    tracker.close();
    tracker.wait().await;
    let _ = ticker.await;

    if let Err(e) = memory.flush_now().await {
        eprintln!("{}", format!("Error saving memory: {}", e).red());
        process::exit(1);
    }
    info!(conversations = memory.len(), "memory saved, exiting");

    // The stdin reader can still be parked on a blocking read; don't wait for it.
    process::exit(0);
}

/// Wait for Ctrl+C or SIGTERM for graceful shutdown.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!(error = %e, "failed to install Ctrl+C handler");
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
                error!(error = %e, "failed to install SIGTERM handler");
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

// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use std::sync::Arc;

use clap::Parser;
use tokio_util::sync::CancellationToken;
use tracing::error;

use paneward::config::{Cli, Command};
use paneward::credential::NoCredentialService;
use paneward::envelope::Envelope;
use paneward::error::CoreError;
use paneward::monitor::{Monitor, MonitorConfig};
use paneward::probe::probe;
use paneward::restart::{restart_batch_parallel, restart_batch_sequential, RestartConfig};
use paneward::tm::mock::MockAdapter;
use paneward::tm::TmAdapter;
use paneward::warning::WarningSink;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    // The real terminal-multiplexer adapter is an external collaborator
    // wired up by the process embedding this crate; a mock stands in
    // here so the binary stays runnable standalone for smoke-testing.
    let adapter: Arc<dyn TmAdapter> = Arc::new(MockAdapter::new());

    let exit_code = match cli.command {
        Command::Monitor(args) => run_monitor(adapter, args).await,
        Command::Diagnose(args) => run_diagnose(adapter, args).await,
        Command::Probe(args) => run_probe(adapter, args).await,
        Command::SmartRestart(args) => run_smart_restart(adapter, args).await,
    };

    std::process::exit(exit_code);
}

fn print_envelope<T: serde::Serialize>(envelope: &Envelope<T>) {
    match serde_json::to_string(envelope) {
        Ok(line) => println!("{line}"),
        Err(e) => error!("failed to serialize response envelope: {e}"),
    }
}

async fn run_monitor(adapter: Arc<dyn TmAdapter>, args: paneward::config::MonitorArgs) -> i32 {
    let sink = match &args.out_file {
        Some(path) => match WarningSink::to_file(path) {
            Ok(s) => Arc::new(s),
            Err(e) => {
                error!("fatal: could not open warning sink: {e}");
                return 1;
            }
        },
        None => Arc::new(WarningSink::stdout()),
    };

    let config = MonitorConfig {
        session: args.session,
        interval: args.interval.max(paneward::config::MIN_MONITOR_INTERVAL),
        provider_refresh: args.provider_refresh,
        capture_lines: args.capture_lines,
        sample_window: args.sample_window,
        ..MonitorConfig::default()
    };

    let monitor = Monitor::new(adapter, Arc::new(NoCredentialService), sink, config);
    let cancel = CancellationToken::new();

    let ctrl_c_cancel = cancel.clone();
    tokio::spawn(async move {
        let _ = tokio::signal::ctrl_c().await;
        ctrl_c_cancel.cancel();
    });

    monitor.run(&cancel).await;
    0
}

/// Default responsiveness-probe budget for `diagnose`, matching the
/// probe engine's own default (spec'd range `[100, 60000]` ms).
const DIAGNOSE_PROBE_TIMEOUT: std::time::Duration = std::time::Duration::from_millis(5000);

async fn run_diagnose(adapter: Arc<dyn TmAdapter>, args: paneward::config::TargetArgs) -> i32 {
    let cancel = CancellationToken::new();
    let result: Result<_, CoreError> = async {
        let target = args.target.parse()?;
        let monitor = Monitor::new(
            adapter,
            Arc::new(NoCredentialService),
            Arc::new(WarningSink::stdout()),
            MonitorConfig::default(),
        );
        monitor.diagnose_pane(&target, DIAGNOSE_PROBE_TIMEOUT, &cancel).await
    }
    .await;

    match result {
        Ok(check) => {
            print_envelope(&Envelope::ok(format!(
                "health_state={:?} process={} stall={} error={} confidence={:.2} reason={}",
                check.health_state, check.process, check.stall, check.error, check.confidence, check.reason
            )));
            0
        }
        Err(e) => {
            print_envelope::<()>(&Envelope::err(e.code, e.reason));
            2
        }
    }
}

async fn run_probe(adapter: Arc<dyn TmAdapter>, args: paneward::config::ProbeArgs) -> i32 {
    let cancel = CancellationToken::new();
    let result: Result<_, CoreError> = async {
        paneward::config::validate_probe_args(&args)?;
        let target = args.target.parse()?;
        let timeout = std::time::Duration::from_millis(args.timeout_ms);
        probe(adapter.as_ref(), &target, args.method, timeout, args.aggressive, &cancel).await
    }
    .await;

    match result {
        Ok(outcome) => {
            print_envelope(&Envelope::ok(format!(
                "responsive={} confidence={:?} recommendation={:?}",
                outcome.responsive, outcome.confidence, outcome.recommendation
            )));
            0
        }
        Err(e) => {
            print_envelope::<()>(&Envelope::err(e.code, e.reason));
            2
        }
    }
}

async fn run_smart_restart(adapter: Arc<dyn TmAdapter>, args: paneward::config::RestartArgs) -> i32 {
    let cancel = CancellationToken::new();
    let targets: Result<Vec<_>, CoreError> = args.targets.iter().map(|t| t.parse()).collect();
    let targets = match targets {
        Ok(t) => t,
        Err(e) => {
            print_envelope::<()>(&Envelope::err(e.code, e.reason));
            return 2;
        }
    };

    let config = RestartConfig::default();
    let follow_up = args.follow_up.as_deref();

    let (summary, _results) = if args.parallel {
        restart_batch_parallel(adapter.as_ref(), &targets, args.force, args.dry_run, follow_up, &config, &cancel)
            .await
    } else {
        restart_batch_sequential(adapter.as_ref(), &targets, args.force, args.dry_run, follow_up, &config, &cancel)
            .await
    };

    print_envelope(&Envelope::ok(format!(
        "restarted={} skipped={} waiting={} failed={} would_restart={}",
        summary.restarted, summary.skipped, summary.waiting, summary.failed, summary.would_restart
    )));

    if summary.failed > 0 {
        1
    } else {
        0
    }
}

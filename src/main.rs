use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use clap::{value_parser, Arg, ArgAction, ArgMatches, Command};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use testbed_harness::activity::ActivityEvent;
use testbed_harness::config::{BackendUrls, HarnessConfig, DEFAULT_GATEWAY, DEFAULT_MONITOR, DEFAULT_RESERVAS};
use testbed_harness::experiment::{PathOutcome, RunPhase};
use testbed_harness::{Dashboard, Hypothesis};

fn cli() -> Command {
    Command::new("testbed-harness")
        .version("0.1.0")
        .about("Health polling and tactic-vs-naive experiments against the microservices testbed")
        .arg(
            Arg::new("reservas")
                .long("reservas")
                .env("TESTBED_RESERVAS_URL")
                .default_value(DEFAULT_RESERVAS)
                .help("Reservations service (host:port or URL)"),
        )
        .arg(
            Arg::new("gateway")
                .long("gateway")
                .env("TESTBED_GATEWAY_URL")
                .default_value(DEFAULT_GATEWAY)
                .help("Search gateway (host:port or URL)"),
        )
        .arg(
            Arg::new("monitor")
                .long("monitor")
                .env("TESTBED_MONITOR_URL")
                .default_value(DEFAULT_MONITOR)
                .help("Monitor service exposing /health-check"),
        )
        .arg(
            Arg::new("poll-interval-ms")
                .long("poll-interval-ms")
                .env("TESTBED_POLL_INTERVAL_MS")
                .default_value("5000")
                .value_parser(value_parser!(u64))
                .help("Health poll period"),
        )
        .arg(
            Arg::new("timeout-ms")
                .long("timeout-ms")
                .env("TESTBED_TIMEOUT_MS")
                .default_value("10000")
                .value_parser(value_parser!(u64))
                .help("Timeout for every outbound request"),
        )
        .arg(
            Arg::new("activity-capacity")
                .long("activity-capacity")
                .env("TESTBED_ACTIVITY_CAPACITY")
                .value_parser(value_parser!(usize))
                .help("Keep at most this many activity events (default: unbounded)"),
        )
        .arg(
            Arg::new("reservation-id")
                .long("reservation-id")
                .default_value("1")
                .value_parser(value_parser!(u64))
                .help("Reservation paid for by H2"),
        )
        .arg(
            Arg::new("run")
                .long("run")
                .value_delimiter(',')
                .action(ArgAction::Append)
                .help("Hypotheses to run at startup, e.g. h1,h3"),
        )
}

fn config_from(matches: &ArgMatches) -> Result<(HarnessConfig, Vec<Hypothesis>)> {
    let url = |name: &str| matches.get_one::<String>(name).map(String::as_str).unwrap_or_default();
    let millis = |name: &str| Duration::from_millis(matches.get_one::<u64>(name).copied().unwrap_or_default());

    let config = HarnessConfig {
        backends: BackendUrls::new(url("reservas"), url("gateway"), url("monitor"))?,
        poll_interval: millis("poll-interval-ms"),
        request_timeout: millis("timeout-ms"),
        activity_capacity: matches.get_one::<usize>("activity-capacity").copied(),
        reservation_id: matches.get_one::<u64>("reservation-id").copied().unwrap_or(1),
    };
    config.validate()?;

    let runs = matches
        .get_many::<String>("run")
        .into_iter()
        .flatten()
        .map(|raw| raw.parse::<Hypothesis>().map_err(|e| anyhow!(e)))
        .collect::<Result<Vec<_>>>()?;

    Ok((config, runs))
}

fn print_event(event: &ActivityEvent) {
    println!(
        "[{}] {:<7} {:<18} {}",
        event.timestamp.format("%H:%M:%S%.3f"),
        event.kind,
        event.source,
        event.message
    );
}

fn print_status(dashboard: &Dashboard) {
    for service in dashboard.registry().snapshot().iter() {
        println!("  {:<12} {:<12} {}", service.id, service.status, service.last_updated);
    }
    for hypothesis in Hypothesis::ALL {
        let state = dashboard.runner().state(hypothesis);
        let ms = |o: Option<&PathOutcome>| {
            o.map(|o| format!("{} ms", o.elapsed_ms)).unwrap_or_else(|| "-".to_string())
        };
        let phase = match state.phase {
            RunPhase::Idle => "idle",
            RunPhase::Running => "running",
            RunPhase::Done => "done",
        };
        println!("  {hypothesis}  {phase:<8} tactic {:<10} naive {}", ms(state.tactic.as_ref()), ms(state.naive.as_ref()));
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // 1. Setup Logging
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let subscriber = FmtSubscriber::builder().with_env_filter(filter).finish();
    tracing::subscriber::set_global_default(subscriber).context("setting default subscriber failed")?;

    let (config, runs) = config_from(&cli().get_matches())?;
    tracing::info!(?config, "Starting testbed harness");

    let mut dashboard = Dashboard::new(&config)?;

    // 2. Activity printer (oldest first on the terminal)
    let mut feed = dashboard.activity().subscribe();
    for event in feed.current().iter().rev() {
        print_event(event);
    }
    let printer = tokio::spawn(async move {
        while let Some(event) = feed.recv().await {
            print_event(&event);
        }
    });

    dashboard.start();
    for hypothesis in runs {
        dashboard.run(hypothesis);
    }

    // 3. Console commands until Ctrl-C / quit
    println!("Commands: h1 | h2 | h3 | status | quit");
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdin_open = true;
    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => break,
            line = lines.next_line(), if stdin_open => {
                // Detached stdin: keep polling until Ctrl-C.
                let Ok(Some(line)) = line else {
                    stdin_open = false;
                    continue;
                };
                let command = line.trim();
                match command {
                    "" => continue,
                    "quit" | "exit" => break,
                    "status" => print_status(&dashboard),
                    other => match other.parse::<Hypothesis>() {
                        Ok(hypothesis) => {
                            dashboard.run(hypothesis);
                        }
                        Err(e) => println!("{e}"),
                    },
                }
            }
        }
    }

    dashboard.shutdown().await;
    printer.abort();
    Ok(())
}

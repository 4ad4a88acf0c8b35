use std::path::PathBuf;
use std::sync::atomic::Ordering;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use chrono::Local;
use clap::Parser;
use config::Map;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use enginewatch::alert::message;
use enginewatch::faults::{DEFAULT_FAULT_TEMPERATURE, FAULT_TEMPERATURE_RANGE};
use enginewatch::source::serial::{self, SerialSettings};
use enginewatch::{
    report, DataSource, FaultScenario, Monitor, Notifier, Settings, SimulatedSource, SourceError,
    StopReason, StreamSource, TelegramNotifier,
};

#[derive(Parser, Debug)]
#[command(name = "enginewatch")]
#[command(about = "Predictive-maintenance monitor for serial engine telemetry")]
#[command(version)]
struct Args {
    /// Configuration file (TOML)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Serial port to read from (defaults to the first likely microcontroller port)
    #[arg(short, long, conflicts_with_all = ["simulate", "replay"])]
    port: Option<String>,

    /// Serial baud rate
    #[arg(short, long)]
    baud: Option<u32>,

    /// Use synthetic readings instead of a serial device
    #[arg(long, conflicts_with = "replay")]
    simulate: bool,

    /// Seed for --simulate, for repeatable runs
    #[arg(long, requires = "simulate")]
    seed: Option<u64>,

    /// Replay telemetry lines from a capture file
    #[arg(long)]
    replay: Option<PathBuf>,

    /// Number of loop iterations
    #[arg(short = 'n', long)]
    iterations: Option<usize>,

    /// Pause between iterations (e.g., "1s", "500ms")
    #[arg(short, long)]
    interval: Option<String>,

    /// Rows kept in the sample table
    #[arg(long)]
    capacity: Option<usize>,

    /// Temperature warning threshold (°C)
    #[arg(long)]
    temp_min: Option<f64>,

    /// Temperature critical threshold (°C)
    #[arg(long)]
    temp_max: Option<f64>,

    /// Low RPM critical threshold
    #[arg(long)]
    rpm_min: Option<f64>,

    /// High RPM critical threshold
    #[arg(long)]
    rpm_max: Option<f64>,

    /// Vibration warning threshold (m/s²)
    #[arg(long)]
    vib_medium: Option<f64>,

    /// Vibration critical threshold (m/s²)
    #[arg(long)]
    vib_high: Option<f64>,

    /// Disable Telegram alerts
    #[arg(long)]
    no_telegram: bool,

    /// Write the sample table to a CSV file after the run
    #[arg(short, long)]
    export: Option<PathBuf>,

    /// List serial ports and exit
    #[arg(long)]
    list_ports: bool,

    /// Send a test alert and exit
    #[arg(long, conflicts_with = "list_ports")]
    test_alert: bool,

    /// Verify the Telegram bot token and exit
    #[arg(long, conflicts_with_all = ["list_ports", "test_alert"])]
    check_telegram: bool,

    /// Describe a fault scenario, alert about it and exit
    #[arg(long, value_enum)]
    simulate_fault: Option<FaultScenario>,

    /// Engine temperature reported with --simulate-fault (°C)
    #[arg(long, default_value_t = DEFAULT_FAULT_TEMPERATURE, requires = "simulate_fault")]
    fault_temp: f64,
}

impl Args {
    /// Command-line flags take precedence over file and environment.
    fn apply(&self, settings: &mut Settings) {
        if let Some(port) = &self.port {
            settings.serial.port = Some(port.clone());
        }
        if let Some(baud) = self.baud {
            settings.serial.baud = baud;
        }
        if let Some(iterations) = self.iterations {
            settings.monitor.iterations = iterations;
        }
        if let Some(interval) = &self.interval {
            settings.monitor.interval = interval.clone();
        }
        if let Some(capacity) = self.capacity {
            settings.monitor.capacity = capacity;
        }

        let t = &mut settings.thresholds;
        let overrides = [
            (self.temp_min, &mut t.temp_min),
            (self.temp_max, &mut t.temp_max),
            (self.rpm_min, &mut t.rpm_min),
            (self.rpm_max, &mut t.rpm_max),
            (self.vib_medium, &mut t.vib_medium),
            (self.vib_high, &mut t.vib_high),
        ];
        for (flag, field) in overrides {
            if let Some(value) = flag {
                *field = value;
            }
        }

        if self.no_telegram {
            settings.telegram.enabled = false;
        }
    }
}

/// Load file and environment settings, then apply flags and validate the result.
///
/// `env` replaces the process environment when given.
fn resolve_settings(args: &Args, env: Option<Map<String, String>>) -> Result<Settings> {
    let mut settings = Settings::load_with_env(args.config.as_deref(), env)?;
    args.apply(&mut settings);
    settings.validate()?;
    Ok(settings)
}

fn main() -> Result<()> {
    let args = Args::parse();

    // RUST_LOG controls verbosity (default: info)
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    let settings = resolve_settings(&args, None)?;

    if args.list_ports {
        return list_ports(&settings);
    }

    let rt = tokio::runtime::Runtime::new()?;

    if args.check_telegram {
        return rt.block_on(check_telegram(&settings));
    }

    if args.test_alert {
        return rt.block_on(send_test_alert(&settings));
    }

    if let Some(scenario) = args.simulate_fault {
        return rt.block_on(simulate_fault(&settings, scenario, args.fault_temp));
    }

    rt.block_on(run_monitor(&args, &settings))
}

/// Print detected serial ports, marking the default choice
fn list_ports(settings: &Settings) -> Result<()> {
    let ports = serial::list_ports()?;
    if ports.is_empty() {
        println!("No serial ports detected");
        return Ok(());
    }

    let default = serial::default_port(&ports, settings.serial.port.as_deref());
    for port in &ports {
        let marker = if Some(port.as_str()) == default { "*" } else { " " };
        println!("{} {}", marker, port);
    }
    Ok(())
}

/// Build the Telegram notifier, requiring credentials.
fn telegram(settings: &Settings) -> Result<TelegramNotifier> {
    TelegramNotifier::from_settings(&settings.telegram)
        .context("set TELEGRAM_TOKEN and TELEGRAM_CHAT_ID or the [telegram] section")
}

async fn check_telegram(settings: &Settings) -> Result<()> {
    let notifier = telegram(settings)?;
    println!("Token: {}", notifier.masked_token());
    println!("Chat ID: {}", notifier.chat_id());

    let username = notifier
        .check_connection()
        .await
        .context("Telegram connection check failed")?;
    match username {
        Some(name) => println!("Telegram connection OK (bot @{})", name),
        None => println!("Telegram connection OK"),
    }
    Ok(())
}

async fn send_test_alert(settings: &Settings) -> Result<()> {
    let notifier = telegram(settings)?;
    let text = message::test_alert(Local::now().naive_local());
    notifier.send(&text).await.context("failed to send test alert")?;
    println!("Test alert sent to {}", notifier.describe());
    Ok(())
}

/// Missing credentials only skip the alert; the scenario is still printed.
async fn simulate_fault(
    settings: &Settings,
    scenario: FaultScenario,
    temperature: f64,
) -> Result<()> {
    if !FAULT_TEMPERATURE_RANGE.contains(&temperature) {
        bail!(
            "--fault-temp must be between {} and {} °C",
            FAULT_TEMPERATURE_RANGE.start(),
            FAULT_TEMPERATURE_RANGE.end()
        );
    }

    println!("{}", scenario.describe());

    let Some(notifier) = alert_notifier(settings) else {
        return Ok(());
    };
    let text = message::compose(
        Local::now().naive_local(),
        &scenario.alert_body(temperature),
        Vec::<String>::new(),
        None,
    );
    match notifier.send(&text).await {
        Ok(()) => println!("Simulation alert sent"),
        Err(e) => warn!(error = %e, "failed to send simulation alert"),
    }
    Ok(())
}

/// Alerts stay off when disabled or when credentials are missing.
fn alert_notifier(settings: &Settings) -> Option<Arc<dyn Notifier>> {
    if !settings.telegram.enabled {
        info!("Telegram alerts disabled");
        return None;
    }
    match TelegramNotifier::from_settings(&settings.telegram) {
        Ok(notifier) => {
            info!(token = %notifier.masked_token(), "Telegram alerts enabled");
            Some(Arc::new(notifier))
        }
        Err(e) => {
            warn!(error = %e, "Telegram alerts unavailable");
            None
        }
    }
}

/// Open the configured data source
async fn open_source(args: &Args, settings: &Settings) -> Result<Box<dyn DataSource>> {
    if args.simulate {
        let source = match args.seed {
            Some(seed) => SimulatedSource::seeded(seed),
            None => SimulatedSource::new(),
        };
        return Ok(Box::new(source));
    }

    if let Some(path) = &args.replay {
        let source = StreamSource::replay_file(path)
            .await
            .with_context(|| format!("failed to replay {}", path.display()))?;
        return Ok(Box::new(source));
    }

    let ports = serial::list_ports()?;
    let port = match &settings.serial.port {
        Some(port) => port.clone(),
        None => serial::default_port(&ports, None)
            .ok_or(SourceError::NoPorts)?
            .to_string(),
    };

    info!(port = %port, baud = settings.serial.baud, "opening serial port");
    let source = serial::open(&SerialSettings::new(port, settings.serial.baud)).await?;
    Ok(Box::new(source))
}

async fn run_monitor(args: &Args, settings: &Settings) -> Result<()> {
    let source = open_source(args, settings).await?;
    let interval = settings.monitor.interval()?;

    let mut monitor = Monitor::new(source, settings.thresholds.clone(), settings.monitor.capacity);
    if let Some(notifier) = alert_notifier(settings) {
        monitor = monitor.with_notifier(notifier);
    }

    let stop = monitor.stop_handle();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("interrupt received, stopping after the current iteration");
            stop.store(false, Ordering::SeqCst);
        }
    });

    let outcome = monitor.run(settings.monitor.iterations, interval).await;
    match outcome.reason {
        StopReason::Completed => println!("Monitoring complete ({} readings)", outcome.readings),
        StopReason::Stopped => println!("Monitoring stopped ({} readings)", outcome.readings),
        StopReason::Exhausted => println!("Source closed ({} readings)", outcome.readings),
    }

    let analysis = monitor.window_analysis();
    match report::summarize(monitor.table(), &analysis) {
        Some(summary) => println!("\n{}", summary),
        None => println!("No samples collected"),
    }

    if let Some(path) = &args.export {
        match report::export_csv(monitor.table(), path) {
            Ok(rows) => println!("Exported {} samples to {}", rows, path.display()),
            Err(e) => warn!(error = %e, path = %path.display(), "export failed"),
        }
    }

    Ok(())
}

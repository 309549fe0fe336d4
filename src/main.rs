//! ki-input - Main Entry Point
//!
//! Runs an input script against an emulator over the virtual system interface
//! and reports what was executed. It handles CLI argument parsing,
//! configuration loading and the drain loop.

use anyhow::{Context, Result};
use clap::{Arg, ArgAction, Command};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::signal;
use tracing::{error, info, warn, Level};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use ki_input_emulator::{
    config::{CliArgs, EmulatorSettings, Profile},
    control::{CapsLockActive, Deadline, LoopControl, QueuesDrained},
    input::{Emulator, VirtualInterface},
    script::Script,
    NAME, VERSION,
};

/// ANSI color codes for terminal output
mod colors {
    pub const RESET: &str = "\x1b[0m";
    pub const BOLD: &str = "\x1b[1m";
    pub const DIM: &str = "\x1b[2m";
    pub const CYAN: &str = "\x1b[36m";
    pub const GREEN: &str = "\x1b[32m";
    pub const YELLOW: &str = "\x1b[33m";
    pub const BLUE: &str = "\x1b[34m";
}

/// Print the startup banner with version
fn print_banner() {
    println!(
        "\n{cyan}{bold}  ki-input{reset} {dim}v{version}{reset}\n{dim}  Human-like keyboard and mouse emulation{reset}\n",
        cyan = colors::CYAN,
        bold = colors::BOLD,
        reset = colors::RESET,
        dim = colors::DIM,
        version = VERSION
    );
}

/// Print configuration summary
fn print_config_summary(settings: &EmulatorSettings, script_path: &Path, steps: usize) {
    println!(
        "{bold}{blue}Configuration:{reset}",
        bold = colors::BOLD,
        blue = colors::BLUE,
        reset = colors::RESET
    );
    println!(
        "  {dim}Profile:{reset}        {}",
        settings.profile,
        dim = colors::DIM,
        reset = colors::RESET
    );
    println!(
        "  {dim}Seed:{reset}           {}",
        settings
            .seed
            .map(|s| s.to_string())
            .unwrap_or_else(|| "random".to_string()),
        dim = colors::DIM,
        reset = colors::RESET
    );
    println!(
        "  {dim}Screen:{reset}         {}x{}",
        settings.screen_width,
        settings.screen_height,
        dim = colors::DIM,
        reset = colors::RESET
    );
    println!(
        "  {dim}Timeout:{reset}        {}ms",
        settings.drain_timeout_ms,
        dim = colors::DIM,
        reset = colors::RESET
    );
    println!(
        "  {dim}Caps-Lock abort:{reset} {}",
        if settings.abort_on_caps_lock {
            format!("{green}enabled{reset}", green = colors::GREEN, reset = colors::RESET)
        } else {
            format!("{yellow}disabled{reset}", yellow = colors::YELLOW, reset = colors::RESET)
        },
        dim = colors::DIM,
        reset = colors::RESET
    );
    println!(
        "  {dim}Script:{reset}         {} ({} steps)",
        script_path.display(),
        steps,
        dim = colors::DIM,
        reset = colors::RESET
    );
    println!();
}

/// Build the CLI command parser
fn build_cli() -> Command {
    Command::new(NAME)
        .version(VERSION)
        .author("KI-Browser Team")
        .about("Runs keyboard and mouse scripts with human-like timing")
        .arg(
            Arg::new("config")
                .short('c')
                .long("config")
                .value_name("FILE")
                .help("Path to configuration file (TOML or JSON)")
                .value_parser(clap::value_parser!(PathBuf)),
        )
        .arg(
            Arg::new("script")
                .short('s')
                .long("script")
                .value_name("FILE")
                .help("Path to the input script (TOML or JSON)")
                .required(true)
                .value_parser(clap::value_parser!(PathBuf)),
        )
        .arg(
            Arg::new("profile")
                .short('p')
                .long("profile")
                .value_name("PROFILE")
                .help("Timing profile: human, fast or custom")
                .value_parser(["human", "fast", "custom"]),
        )
        .arg(
            Arg::new("seed")
                .long("seed")
                .value_name("NUMBER")
                .help("Seed for a reproducible run")
                .value_parser(clap::value_parser!(u64)),
        )
        .arg(
            Arg::new("width")
                .long("width")
                .value_name("PIXELS")
                .help("Virtual screen width")
                .value_parser(clap::value_parser!(u32)),
        )
        .arg(
            Arg::new("height")
                .long("height")
                .value_name("PIXELS")
                .help("Virtual screen height")
                .value_parser(clap::value_parser!(u32)),
        )
        .arg(
            Arg::new("timeout")
                .long("timeout")
                .value_name("MS")
                .help("Maximum time to wait for the script in milliseconds")
                .value_parser(clap::value_parser!(u64)),
        )
        .arg(
            Arg::new("abort-on-caps-lock")
                .long("abort-on-caps-lock")
                .help("Stop as soon as Caps-Lock is active")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .help("Enable verbose logging")
                .action(ArgAction::Count),
        )
        .arg(
            Arg::new("quiet")
                .short('q')
                .long("quiet")
                .help("Suppress output except errors")
                .action(ArgAction::SetTrue)
                .conflicts_with("verbose"),
        )
}

/// Parse CLI arguments into CliArgs struct
fn parse_cli_args(matches: &clap::ArgMatches) -> CliArgs {
    let mut args = CliArgs::default();

    args.config_file = matches.get_one::<PathBuf>("config").cloned();
    args.profile = matches
        .get_one::<String>("profile")
        .and_then(|p| p.parse::<Profile>().ok());
    args.seed = matches.get_one::<u64>("seed").copied();
    args.width = matches.get_one::<u32>("width").copied();
    args.height = matches.get_one::<u32>("height").copied();
    args.timeout_ms = matches.get_one::<u64>("timeout").copied();

    if matches.get_flag("abort-on-caps-lock") {
        args.abort_on_caps_lock = Some(true);
    }

    args
}

/// Initialize the tracing/logging subsystem
fn init_tracing(verbosity: u8, quiet: bool) {
    let level = if quiet {
        Level::ERROR
    } else {
        match verbosity {
            0 => Level::INFO,
            1 => Level::DEBUG,
            _ => Level::TRACE,
        }
    };

    let filter = EnvFilter::from_default_env().add_directive(level.into());

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(true).with_thread_names(true))
        .with(filter)
        .init();
}

/// Builds the drain loop stopping once the script ran, timed out or was aborted
fn build_loop_control(
    settings: &EmulatorSettings,
    emulator: &Arc<Emulator<VirtualInterface>>,
) -> Result<LoopControl> {
    let mut control = LoopControl::new(Duration::from_millis(settings.poll_interval_ms))?;
    control.add_shutdown_condition(QueuesDrained::new(Arc::clone(emulator)));
    control.add_shutdown_condition(Deadline::after(Duration::from_millis(
        settings.drain_timeout_ms,
    )));
    if settings.abort_on_caps_lock {
        control.add_shutdown_condition(CapsLockActive::new(Arc::clone(emulator)));
    }
    Ok(control)
}

/// Main application entry point
#[tokio::main]
async fn main() -> Result<()> {
    // Parse CLI arguments
    let matches = build_cli().get_matches();

    // Get verbosity settings before loading config
    let verbosity = matches.get_count("verbose");
    let quiet = matches.get_flag("quiet");

    // Initialize logging
    init_tracing(verbosity, quiet);

    // Convert matches to CliArgs
    let cli_args = parse_cli_args(&matches);
    let script_path = matches
        .get_one::<PathBuf>("script")
        .cloned()
        .context("No script given")?;

    // Load configuration with full precedence chain
    let settings = cli_args
        .load_settings()
        .context("Failed to load configuration")?;

    let script = Script::from_file(&script_path)
        .with_context(|| format!("Failed to load script {}", script_path.display()))?;

    if !quiet {
        print_banner();
        print_config_summary(&settings, &script_path, script.len());
    }

    let interface = VirtualInterface::new(settings.screen_width, settings.screen_height);
    let strategy = settings.strategy().context("Failed to build deviation strategy")?;
    let emulator = Arc::new(
        Emulator::with_strategy(strategy, interface).context("Failed to start input emulator")?,
    );

    let started = Instant::now();
    script.apply(&emulator);
    info!(steps = script.len(), "Script enqueued");

    let mut control = build_loop_control(&settings, &emulator)?;
    let drain = tokio::task::spawn_blocking(move || while control.wait() {});

    tokio::select! {
        result = drain => {
            result.context("Drain task failed")?;
        }
        result = signal::ctrl_c() => {
            match result {
                Ok(()) => {
                    println!();
                    info!("Received shutdown signal, discarding pending input...");
                }
                Err(e) => {
                    error!("Failed to listen for shutdown signal: {}", e);
                }
            }
        }
    }

    if !emulator.is_idle() {
        warn!(
            mouse = emulator.action_count_mouse(),
            keyboard = emulator.action_count_keyboard(),
            "Script did not finish, discarding pending actions"
        );
        emulator.clear();
    }

    let interface = emulator.interface();
    println!(
        "{green}{bold}Script finished{reset} in {:.2?}",
        started.elapsed(),
        green = colors::GREEN,
        bold = colors::BOLD,
        reset = colors::RESET
    );
    println!(
        "  {dim}Input events:{reset}   {}",
        interface.event_total(),
        dim = colors::DIM,
        reset = colors::RESET
    );
    println!(
        "  {dim}Errors:{reset}         {}",
        emulator.error_counter(),
        dim = colors::DIM,
        reset = colors::RESET
    );
    println!(
        "  {dim}Cursor:{reset}         {}",
        interface.cursor(),
        dim = colors::DIM,
        reset = colors::RESET
    );
    println!(
        "  {dim}Wheel:{reset}          {}",
        interface.wheel_position(),
        dim = colors::DIM,
        reset = colors::RESET
    );

    Ok(())
}

//! The control box: wires [`intersection_control_core`] into a running
//! process. Parses CLI flags, constructs the singleton, blocks until a
//! shutdown signal, then drains every worker thread before exiting (spec
//! §5 Cancellation, §6.5 exit codes).
use std::process::ExitCode;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use clap::Parser;

use intersection_control_core::cloud::{CloudClient, HttpCloudClient};
use intersection_control_core::config::{HardwareFactory, SimHardwareFactory};
use intersection_control_core::verbose::{init_logger, set_verbose_level, VerboseLevel};
use intersection_control_core::TrafficControlSystem;

/// Intersection controller control box.
#[derive(Parser, Debug)]
#[command(name = "controlbox", version, about = "Intersection traffic control box")]
struct Cli {
    /// Base URL of the cloud management service (spec §6.1).
    #[arg(long, default_value = "http://localhost:8080")]
    cloud_base_url: String,

    /// Traffic management center identifier sent with emergency records.
    #[arg(long, default_value = "tmc-0")]
    tmcid: String,

    /// This control box's own identifier, sent with emergency records.
    #[arg(long, default_value = "controlbox-0")]
    controlbox_id: String,

    /// Logging verbosity: none, main, additional, detailed, all.
    #[arg(long, default_value = "main")]
    verbose: String,
}

fn parse_verbose(level: &str) -> VerboseLevel {
    match level {
        "none" => VerboseLevel::None,
        "additional" => VerboseLevel::Additional,
        "detailed" => VerboseLevel::Detailed,
        "all" => VerboseLevel::All,
        _ => VerboseLevel::Main,
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    set_verbose_level(parse_verbose(&cli.verbose));
    init_logger();

    let cloud_client: Arc<dyn CloudClient> = Arc::new(HttpCloudClient::new(cli.cloud_base_url));
    // Real GPIO/PWM/SPI wiring is out of scope for this crate (spec §1); a
    // deployment supplies its own `HardwareFactory` by embedding the library
    // directly rather than going through this binary.
    let hw: Box<dyn HardwareFactory> = Box::new(SimHardwareFactory::new());

    let system = TrafficControlSystem::new(cloud_client, hw, cli.tmcid, cli.controlbox_id, None);

    let shutdown_requested = Arc::new(AtomicBool::new(false));
    let handler_flag = Arc::clone(&shutdown_requested);
    ctrlc::set_handler(move || {
        handler_flag.store(true, Ordering::SeqCst);
    })
    .expect("failed to install SIGINT/SIGTERM handler");

    while !shutdown_requested.load(Ordering::SeqCst) && !system.is_failed() {
        std::thread::sleep(std::time::Duration::from_millis(200));
    }

    match system.shutdown() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("controlbox exiting after fatal error: {}", err);
            ExitCode::from(err.exit_code() as u8)
        }
    }
}

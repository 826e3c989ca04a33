// RFID Tag Simulator - Main Entry Point
//
// You can run it via Cargo:
//
// ```console
// $ cargo build --release
// $ ./target/release/rfid-tag-simulator --config simulator.json --verbose
// ```
//
// Or without a broker, printing events to stdout:
//
// ```console
// $ ./target/release/rfid-tag-simulator --epc AA11 --total-epcs 10 --stdout
// ```

use anyhow::Context;
use clap::Parser;
use rfid_tag_simulator::simulation::{LoggingConfig, SimulationStatistics, Simulator};
use rfid_tag_simulator::sink::{BrokerConnector, BrokerEndpoint, MqttConnector, StdoutConnector};
use rfid_tag_simulator::types::{CliArgs, SimulatorConfig};
use std::process;
use tracing::{error, info};

#[tokio::main]
async fn main() {
    let args = CliArgs::parse();

    if args.print_config {
        match SimulatorConfig::default().print_json() {
            Ok(json) => {
                println!("{}", json);
                return;
            }
            Err(e) => {
                eprintln!("Failed to serialize default configuration: {}", e);
                process::exit(1);
            }
        }
    }

    let mut logging = LoggingConfig::for_verbosity(args.verbose, args.debug);
    if args.json_logs {
        logging = logging.with_json_format();
    }
    if let Some(directory) = &args.log_dir {
        logging = logging.with_file_logging(directory.clone());
    }
    let _logging_guard = match logging.init() {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("Failed to initialize logging: {}", e);
            process::exit(1);
        }
    };

    info!("Starting RFID Tag Simulator");

    let config = match SimulatorConfig::from_cli_args(&args) {
        Ok(config) => config,
        Err(e) => {
            error!("Failed to load configuration: {}", e);
            process::exit(1);
        }
    };

    if let Err(e) = config.validate() {
        error!("Configuration validation failed: {}", e);
        process::exit(1);
    }

    if args.dry_run {
        eprintln!("Configuration validation successful!");
        eprintln!("Dry run mode - simulation will not be executed.");
        print_configuration_summary(&config, args.stdout);
        return;
    }

    print_startup_banner(&config, args.stdout);

    let result = if args.stdout {
        run(config, StdoutConnector::new()).await
    } else {
        run(config, MqttConnector::new()).await
    };

    match result {
        Ok(statistics) => {
            eprintln!();
            eprintln!("{}", statistics);
            info!("RFID Tag Simulator stopped");
        }
        Err(e) => {
            error!("Simulation failed: {:#}", e);
            process::exit(1);
        }
    }
}

/// Run the simulation until Ctrl-C
async fn run<C: BrokerConnector>(
    config: SimulatorConfig,
    connector: C,
) -> anyhow::Result<SimulationStatistics> {
    let simulator = Simulator::spawn(config, connector);
    simulator.start().context("Failed to start simulation")?;

    tokio::signal::ctrl_c().await.context("Failed to listen for Ctrl-C")?;
    info!("Ctrl-C received, stopping simulation");

    simulator.stop().context("Failed to stop simulation")?;
    let statistics = simulator.shutdown().await.context("Simulator did not shut down cleanly")?;
    Ok(statistics)
}

fn print_startup_banner(config: &SimulatorConfig, stdout: bool) {
    eprintln!("RFID Tag Simulator");
    eprintln!("==================");
    eprintln!("Synthetic item movement and threshold crossing events");
    eprintln!();

    print_configuration_summary(config, stdout);
    eprintln!();
    eprintln!("Press Ctrl-C to stop.");
}

/// Print configuration summary
fn print_configuration_summary(config: &SimulatorConfig, stdout: bool) {
    eprintln!("Configuration:");
    eprintln!("  Zones: {}", describe_list(&config.zones));
    eprintln!(
        "  Thresholds: {}",
        describe_list(&config.thresholds.iter().map(ToString::to_string).collect::<Vec<_>>())
    );
    eprintln!(
        "  EPCs: {} configured, {} total",
        config.epcs.explicit.len(),
        config.population_size()
    );
    if config.epcs.save {
        eprintln!("  EPC Output: {}", config.epcs.output);
    }
    eprintln!("  Tag Heartbeat: {}ms", config.tag_heartbeat_duration);
    eprintln!("  Reporting Interval: {}ms", config.reporting_interval);
    if stdout {
        eprintln!("  Sink: stdout");
    } else {
        let endpoint = BrokerEndpoint::from_config(&config.mqtt);
        eprintln!("  Broker: {}", endpoint.url());
        eprintln!("  Client Id: {}", config.mqtt.client_id.as_deref().unwrap_or("(generated)"));
        eprintln!("  Authentication: {}", if config.mqtt.auth { "enabled" } else { "disabled" });
    }
    if let Some(seed) = config.seed {
        eprintln!("  Random Seed: {}", seed);
    }
}

fn describe_list(items: &[String]) -> String {
    if items.is_empty() {
        "(none)".to_string()
    } else {
        items.join(", ")
    }
}

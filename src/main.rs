//! Simulator entry point: CLI wiring and config-driven engine construction.

use std::process;

use solar_bess_sim::cli::{self, CliOptions};
use solar_bess_sim::config::ScenarioConfig;
use solar_bess_sim::io::export::export_csv;
use solar_bess_sim::reporting::print_report;
use solar_bess_sim::sim::kpi::KpiReport;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

/// Installs the stderr log subscriber. `RUST_LOG` overrides the default level.
fn init_tracing(quiet: bool) {
    let default_level = if quiet {
        "solar_bess_sim=warn"
    } else {
        "solar_bess_sim=info"
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();
}

/// Loads the scenario selected on the command line and applies overrides.
///
/// Returns the scenario and a label naming where it came from.
fn load_scenario(opts: &CliOptions) -> (ScenarioConfig, String) {
    let (mut scenario, label) = if let Some(ref path) = opts.scenario {
        match ScenarioConfig::from_toml_file(path) {
            Ok(cfg) => (cfg, path.display().to_string()),
            Err(e) => fail(&e),
        }
    } else {
        let name = opts.preset.as_deref().unwrap_or("baseline");
        match ScenarioConfig::from_preset(name) {
            Ok(cfg) => (cfg, name.to_string()),
            Err(e) => fail(&e),
        }
    };

    if let Some(seed) = opts.seed {
        scenario.simulation.seed = seed;
    }

    (scenario, label)
}

fn fail(e: &dyn std::fmt::Display) -> ! {
    error!("{e}");
    process::exit(1);
}

fn main() {
    let opts = match cli::parse_args() {
        Ok(opts) => opts,
        Err(msg) => {
            eprintln!("error: {msg}");
            cli::print_usage();
            process::exit(1);
        }
    };

    if opts.help {
        cli::print_usage();
        return;
    }

    init_tracing(opts.quiet);

    let (scenario, label) = load_scenario(&opts);

    let errors = scenario.validate();
    if !errors.is_empty() {
        for e in &errors {
            error!("{e}");
        }
        process::exit(1);
    }

    #[cfg(feature = "tui")]
    if opts.tui {
        let app = solar_bess_sim::tui::App::from_scenario(scenario, &label)
            .unwrap_or_else(|e| fail(&e));
        if let Err(e) = solar_bess_sim::tui::run(app) {
            fail(&format!("TUI failed: {e}"));
        }
        return;
    }

    let mut engine = scenario.build_engine().unwrap_or_else(|e| fail(&e));
    info!(scenario = %label, "scenario loaded");

    let output = engine.run();
    let kpi = KpiReport::from_records(&output.records, output.final_battery.capacity_kwh);

    if let Err(e) = print_report(&output.records, &kpi, opts.quiet) {
        fail(&format!("failed to write report: {e}"));
    }

    if let Some(ref path) = opts.telemetry_out {
        if let Err(e) = export_csv(&output.records, path) {
            fail(&format!("failed to write CSV: {e}"));
        }
        info!(path = %path.display(), "telemetry written");
    }

    #[cfg(feature = "api")]
    if opts.serve {
        use std::net::SocketAddr;
        use std::sync::Arc;

        use solar_bess_sim::sim::controller::Controller;

        let state = Arc::new(solar_bess_sim::api::AppState {
            config: engine.config().clone(),
            controller: engine.controller().name().to_string(),
            kpi,
            records: output.records,
            final_battery: output.final_battery,
        });
        let addr = SocketAddr::from(([0, 0, 0, 0], opts.port));
        let rt = tokio::runtime::Runtime::new()
            .unwrap_or_else(|e| fail(&format!("failed to create tokio runtime: {e}")));
        if let Err(e) = rt.block_on(solar_bess_sim::api::serve(state, addr)) {
            fail(&format!("API server failed on {addr}: {e}"));
        }
    }
}

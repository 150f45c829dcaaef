use std::env;
use std::path::PathBuf;

/// Default port for `--serve`.
pub const DEFAULT_PORT: u16 = 3000;

/// Parsed command-line options.
#[derive(Debug, Clone, PartialEq)]
pub struct CliOptions {
    pub scenario: Option<PathBuf>,
    pub preset: Option<String>,
    pub seed: Option<u64>,
    pub telemetry_out: Option<PathBuf>,
    pub quiet: bool,
    pub serve: bool,
    pub port: u16,
    pub tui: bool,
    pub help: bool,
}

impl Default for CliOptions {
    fn default() -> Self {
        Self {
            scenario: None,
            preset: None,
            seed: None,
            telemetry_out: None,
            quiet: false,
            serve: false,
            port: DEFAULT_PORT,
            tui: false,
            help: false,
        }
    }
}

/// Parses the process arguments.
///
/// # Errors
///
/// Returns a message describing the first malformed argument.
pub fn parse_args() -> Result<CliOptions, String> {
    let args: Vec<String> = env::args().skip(1).collect();
    parse_args_from(&args)
}

/// Parses `args` (without the program name).
///
/// When neither `--scenario` nor `--preset` is given, the `baseline` preset
/// is selected.
///
/// # Errors
///
/// Returns a message describing the first malformed argument.
pub fn parse_args_from(args: &[String]) -> Result<CliOptions, String> {
    let mut i = 0usize;
    let mut opts = CliOptions::default();

    while i < args.len() {
        match args[i].as_str() {
            "--scenario" => {
                i += 1;
                let path = args.next_or_err(
                    i,
                    "missing value for --scenario (expected a TOML file path)",
                )?;
                if opts.scenario.replace(PathBuf::from(path)).is_some() {
                    return Err("--scenario provided more than once".to_string());
                }
            }
            "--preset" => {
                i += 1;
                let name =
                    args.next_or_err(i, "missing value for --preset (expected a preset name)")?;
                if opts.preset.replace(name.to_string()).is_some() {
                    return Err("--preset provided more than once".to_string());
                }
            }
            "--seed" => {
                i += 1;
                let raw = args.next_or_err(i, "missing value for --seed (expected a u64)")?;
                let seed = raw
                    .parse::<u64>()
                    .map_err(|_| format!("--seed value \"{raw}\" is not a valid u64"))?;
                opts.seed = Some(seed);
            }
            "--telemetry-out" => {
                i += 1;
                let path = args.next_or_err(
                    i,
                    "missing value for --telemetry-out (expected a file path)",
                )?;
                if opts.telemetry_out.replace(PathBuf::from(path)).is_some() {
                    return Err("--telemetry-out provided more than once".to_string());
                }
            }
            "--quiet" | "-q" => opts.quiet = true,
            #[cfg(feature = "api")]
            "--serve" => opts.serve = true,
            #[cfg(feature = "api")]
            "--port" => {
                i += 1;
                let raw = args.next_or_err(i, "missing value for --port (expected a u16)")?;
                opts.port = raw
                    .parse::<u16>()
                    .map_err(|_| format!("--port value \"{raw}\" is not a valid u16"))?;
            }
            #[cfg(feature = "tui")]
            "--tui" => opts.tui = true,
            "--help" | "-h" => opts.help = true,
            other => return Err(format!("unknown argument: {other}")),
        }
        i += 1;
    }

    if opts.scenario.is_some() && opts.preset.is_some() {
        return Err(
            "arguments `--scenario` and `--preset` are mutually exclusive; choose one source"
                .to_string(),
        );
    }

    if opts.serve && opts.tui {
        return Err("arguments `--serve` and `--tui` are mutually exclusive".to_string());
    }

    if opts.tui && opts.telemetry_out.is_some() {
        return Err(
            "arguments `--tui` and `--telemetry-out` are mutually exclusive; \
             export from a batch run instead"
                .to_string(),
        );
    }

    if opts.scenario.is_none() && opts.preset.is_none() {
        opts.preset = Some("baseline".to_string());
    }

    Ok(opts)
}

trait SliceArgExt {
    fn next_or_err(&self, index: usize, err: &str) -> Result<&str, String>;
}

impl SliceArgExt for [String] {
    fn next_or_err(&self, index: usize, err: &str) -> Result<&str, String> {
        self.get(index)
            .map(String::as_str)
            .ok_or_else(|| err.to_string())
    }
}

/// Prints usage to stderr.
pub fn print_usage() {
    eprintln!("solar-bess-sim: solar production, battery storage and grid release over one day");
    eprintln!();
    eprintln!("Usage: solar-bess-sim [OPTIONS]");
    eprintln!();
    eprintln!("Options:");
    eprintln!("  --scenario <path>        Load scenario from TOML config file");
    eprintln!(
        "  --preset <name>          Use a built-in preset ({})",
        crate::config::ScenarioConfig::PRESETS.join(", ")
    );
    eprintln!("  --seed <u64>             Override random seed");
    eprintln!("  --telemetry-out <path>   Export timestep records to CSV");
    eprintln!("  --quiet, -q              Print only the KPI report");
    #[cfg(feature = "api")]
    {
        eprintln!("  --serve                  Start REST API server after simulation");
        eprintln!("  --port <u16>             API server port (default: {DEFAULT_PORT})");
    }
    #[cfg(feature = "tui")]
    eprintln!("  --tui                    Replay the run in a terminal plot");
    eprintln!("  --help, -h               Show this help message");
    eprintln!();
    eprintln!("If no --scenario or --preset is given, the baseline preset is used.");
}

use std::process::{Command, Output};

fn run_cli(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_solar-bess-sim"))
        .args(args)
        .output()
        .expect("solar-bess-sim process should run")
}

fn parse_metric(stdout: &str, label: &str, unit: &str) -> f64 {
    let line = stdout
        .lines()
        .find(|line| line.trim_start().starts_with(label))
        .unwrap_or_else(|| panic!("missing KPI line `{label}` in output: {stdout}"));

    let raw = line
        .split_once(':')
        .map(|(_, right)| right.trim())
        .unwrap_or_else(|| panic!("invalid KPI format for line `{line}`"));

    let numeric = raw
        .split_once(unit)
        .map_or(raw, |(left, _)| left)
        .trim();
    numeric
        .parse::<f64>()
        .unwrap_or_else(|_| panic!("failed parsing `{numeric}` from KPI line `{line}`"))
}

#[test]
fn scenario_file_prints_every_step_and_kpis() {
    let output = run_cli(&["--scenario", "scenarios/baseline.toml"]);
    assert!(
        output.status.success(),
        "stderr={}",
        String::from_utf8_lossy(&output.stderr)
    );
    let stdout = String::from_utf8(output.stdout).expect("stdout should be valid UTF-8");
    assert_eq!(stdout.lines().filter(|l| l.starts_with("t=")).count(), 24);
    assert!(stdout.contains("--- KPI Report ---"));
}

#[test]
fn scenario_file_matches_baseline_preset() {
    let file = run_cli(&["--scenario", "scenarios/baseline.toml", "--quiet"]);
    let preset = run_cli(&["--preset", "baseline", "--quiet"]);
    assert!(file.status.success() && preset.status.success());
    assert_eq!(file.stdout, preset.stdout);
}

#[test]
fn presets_produce_distinct_dynamics() {
    let kpis = |preset: &str| {
        let output = run_cli(&["--preset", preset, "--quiet"]);
        assert!(output.status.success(), "preset {preset} failed");
        let stdout = String::from_utf8(output.stdout).expect("utf8");
        (
            parse_metric(&stdout, "Curtailed:", "kWh"),
            parse_metric(&stdout, "Storage losses:", "kWh"),
        )
    };
    let (base_curtailed, base_losses) = kpis("baseline");
    let (_, lossless_losses) = kpis("lossless");
    let (undersized_curtailed, _) = kpis("undersized");

    assert!(lossless_losses < base_losses);
    assert!(undersized_curtailed > base_curtailed + 1.0);
}

#[test]
fn quarter_hourly_scenario_runs() {
    let output = run_cli(&["--scenario", "scenarios/quarter_hourly_cloudy.toml"]);
    assert!(output.status.success());
    let stdout = String::from_utf8(output.stdout).expect("utf8");
    assert_eq!(stdout.lines().filter(|l| l.starts_with("t=")).count(), 96);
}

#[test]
fn invalid_scenario_exits_nonzero_without_output() {
    let output = run_cli(&["--scenario", "scenarios/invalid_reserve.toml"]);
    assert_eq!(output.status.code(), Some(1));
    assert!(output.stdout.is_empty(), "nothing should be simulated");
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("battery.min_reserve_kwh"), "stderr={stderr}");
}

#[test]
fn unknown_preset_exits_nonzero() {
    let output = run_cli(&["--preset", "sunny"]);
    assert_eq!(output.status.code(), Some(1));
}

#[test]
fn conflicting_sources_exit_nonzero() {
    let output = run_cli(&["--scenario", "scenarios/baseline.toml", "--preset", "baseline"]);
    assert_eq!(output.status.code(), Some(1));
}

#[test]
fn telemetry_out_writes_csv() {
    let path = std::env::temp_dir().join(format!("solar-bess-sim-{}.csv", std::process::id()));
    let path_str = path.to_str().expect("utf8 temp path");
    let output = run_cli(&["--preset", "baseline", "--quiet", "--telemetry-out", path_str]);
    assert!(output.status.success());

    let csv = std::fs::read_to_string(&path).expect("csv written");
    let _ = std::fs::remove_file(&path);
    let mut lines = csv.lines();
    assert!(lines.next().is_some_and(|h| h.starts_with("timestep,time_hr,")));
    assert_eq!(lines.count(), 24);
}

#[test]
fn unwritable_telemetry_path_exits_nonzero() {
    let output = run_cli(&[
        "--preset",
        "baseline",
        "--quiet",
        "--telemetry-out",
        "no/such/dir/out.csv",
    ]);
    assert_eq!(output.status.code(), Some(1));
}

#[test]
fn series_scenario_runs_from_another_directory() {
    let scenario = std::path::Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("scenarios/measured_profiles.toml");
    let output = Command::new(env!("CARGO_BIN_EXE_solar-bess-sim"))
        .arg("--scenario")
        .arg(&scenario)
        .arg("--quiet")
        .current_dir(std::env::temp_dir())
        .output()
        .expect("solar-bess-sim process should run");
    assert!(
        output.status.success(),
        "stderr={}",
        String::from_utf8_lossy(&output.stderr)
    );
    let stdout = String::from_utf8(output.stdout).expect("stdout should be valid UTF-8");
    assert!(stdout.contains("--- KPI Report ---"));
}

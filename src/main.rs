//! Simulator entry point — CLI wiring from artifact to KPI report.

use std::path::Path;
use std::process;

use dr_sim::artifact;
use dr_sim::config::RunConfig;
use dr_sim::demo;
use dr_sim::error::Result;
use dr_sim::io::export::export_csv;
use dr_sim::kpi::KpiReport;
use dr_sim::series::LoadSeries;

/// Parsed CLI arguments.
struct CliArgs {
    artifact_path: Option<String>,
    config_path: Option<String>,
    preset: Option<String>,
    seed: u64,
    days: usize,
    export_csv: Option<String>,
    write_artifact: Option<String>,
    #[cfg(feature = "api")]
    serve: bool,
    #[cfg(feature = "api")]
    port: u16,
}

fn print_help() {
    eprintln!("dr-sim — demand-response scenario simulator over load forecasts");
    eprintln!();
    eprintln!("Usage: dr-sim [OPTIONS]");
    eprintln!();
    eprintln!("Options:");
    eprintln!("  --artifact <path>        Load baseline forecast from an artifact JSON file");
    eprintln!("  --config <path>          Load run configuration from a TOML file");
    eprintln!("  --preset <name>          Use a built-in preset (baseline, peak-shave, ev-overnight)");
    eprintln!("  --seed <u64>             Seed for the synthetic demo baseline (default: 42)");
    eprintln!("  --days <n>               Days of synthetic demo baseline (default: 1)");
    eprintln!("  --export-csv <path>      Export baseline/adjusted comparison to CSV");
    eprintln!("  --write-artifact <path>  Write the adjusted series as a forecast artifact");
    #[cfg(feature = "api")]
    {
        eprintln!("  --serve                  Start REST API server over the baseline");
        eprintln!("  --port <u16>             API server port (default: 3000)");
    }
    eprintln!("  --help                   Show this help message");
    eprintln!();
    eprintln!("Without --artifact, a seeded synthetic demo baseline is used.");
    eprintln!("Without --config or --preset, the baseline preset is used.");
}

fn parse_args() -> CliArgs {
    let args: Vec<String> = std::env::args().collect();
    let mut cli = CliArgs {
        artifact_path: None,
        config_path: None,
        preset: None,
        seed: 42,
        days: 1,
        export_csv: None,
        write_artifact: None,
        #[cfg(feature = "api")]
        serve: false,
        #[cfg(feature = "api")]
        port: 3000,
    };

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--help" | "-h" => {
                print_help();
                process::exit(0);
            }
            "--artifact" => {
                i += 1;
                if i >= args.len() {
                    eprintln!("error: --artifact requires a path argument");
                    process::exit(1);
                }
                cli.artifact_path = Some(args[i].clone());
            }
            "--config" => {
                i += 1;
                if i >= args.len() {
                    eprintln!("error: --config requires a path argument");
                    process::exit(1);
                }
                cli.config_path = Some(args[i].clone());
            }
            "--preset" => {
                i += 1;
                if i >= args.len() {
                    eprintln!("error: --preset requires a name argument");
                    process::exit(1);
                }
                cli.preset = Some(args[i].clone());
            }
            "--seed" => {
                i += 1;
                if i >= args.len() {
                    eprintln!("error: --seed requires a u64 argument");
                    process::exit(1);
                }
                if let Ok(s) = args[i].parse::<u64>() {
                    cli.seed = s;
                } else {
                    eprintln!("error: --seed value \"{}\" is not a valid u64", args[i]);
                    process::exit(1);
                }
            }
            "--days" => {
                i += 1;
                if i >= args.len() {
                    eprintln!("error: --days requires a positive integer argument");
                    process::exit(1);
                }
                match args[i].parse::<usize>() {
                    Ok(d) if d > 0 => cli.days = d,
                    _ => {
                        eprintln!(
                            "error: --days value \"{}\" is not a positive integer",
                            args[i]
                        );
                        process::exit(1);
                    }
                }
            }
            "--export-csv" => {
                i += 1;
                if i >= args.len() {
                    eprintln!("error: --export-csv requires a path argument");
                    process::exit(1);
                }
                cli.export_csv = Some(args[i].clone());
            }
            "--write-artifact" => {
                i += 1;
                if i >= args.len() {
                    eprintln!("error: --write-artifact requires a path argument");
                    process::exit(1);
                }
                cli.write_artifact = Some(args[i].clone());
            }
            #[cfg(feature = "api")]
            "--serve" => {
                cli.serve = true;
            }
            #[cfg(feature = "api")]
            "--port" => {
                i += 1;
                if i >= args.len() {
                    eprintln!("error: --port requires a u16 argument");
                    process::exit(1);
                }
                if let Ok(p) = args[i].parse::<u16>() {
                    cli.port = p;
                } else {
                    eprintln!("error: --port value \"{}\" is not a valid u16", args[i]);
                    process::exit(1);
                }
            }
            other => {
                eprintln!("error: unknown argument \"{other}\"");
                print_help();
                process::exit(1);
            }
        }
        i += 1;
    }

    cli
}

/// Loads the baseline series: from the artifact when given, else synthetic.
fn load_baseline(cli: &CliArgs) -> Result<LoadSeries> {
    match &cli.artifact_path {
        Some(path) => artifact::load(Path::new(path)),
        None => Ok(demo::demo_series(cli.days, cli.seed)),
    }
}

fn main() {
    let cli = parse_args();

    // Run config: --config takes priority, then --preset, then baseline
    let config = if let Some(ref path) = cli.config_path {
        match RunConfig::from_toml_file(Path::new(path)) {
            Ok(cfg) => cfg,
            Err(e) => {
                eprintln!("error: {e}");
                process::exit(1);
            }
        }
    } else if let Some(ref name) = cli.preset {
        match RunConfig::from_preset(name) {
            Ok(cfg) => cfg,
            Err(e) => {
                eprintln!("error: {e}");
                process::exit(1);
            }
        }
    } else {
        RunConfig::baseline()
    };

    let baseline = match load_baseline(&cli) {
        Ok(series) => series,
        Err(e) => {
            eprintln!("error: {e}");
            process::exit(1);
        }
    };

    let (scenario, settings, writer_settings) = match (
        config.scenario(),
        config.engine_settings(),
        config.writer_settings(),
    ) {
        (Ok(s), Ok(e), Ok(w)) => (s, e, w),
        (scenario, engine, writer) => {
            for err in [scenario.err(), engine.err(), writer.err()].into_iter().flatten() {
                eprintln!("error: {err}");
            }
            process::exit(1);
        }
    };

    let adjusted = scenario.apply(&baseline, &settings);
    let kpi = match KpiReport::compare(&baseline, &adjusted) {
        Ok(kpi) => kpi,
        Err(e) => {
            eprintln!("error: {e}");
            process::exit(1);
        }
    };

    println!(
        "Baseline: {} samples at {:.1}-minute spacing",
        baseline.len(),
        baseline.interval_hours() * 60.0
    );
    println!("Scenario: {scenario}");
    println!("\n{kpi}");

    if let Some(ref path) = cli.export_csv {
        if let Err(e) = export_csv(&baseline, &adjusted, Path::new(path)) {
            eprintln!("error: failed to write CSV: {e}");
            process::exit(1);
        }
        eprintln!("Comparison written to {path}");
    }

    if let Some(ref path) = cli.write_artifact {
        if let Err(e) = artifact::export_artifact(&adjusted, &writer_settings, Path::new(path)) {
            eprintln!("error: failed to write artifact: {e}");
            process::exit(1);
        }
        eprintln!("Adjusted artifact written to {path}");
    }

    // Start API server if requested
    #[cfg(feature = "api")]
    if cli.serve {
        use std::net::SocketAddr;
        use std::sync::Arc;

        let state = Arc::new(dr_sim::api::AppState {
            baseline,
            settings,
        });
        let addr = SocketAddr::from(([0, 0, 0, 0], cli.port));
        let rt = tokio::runtime::Runtime::new().unwrap_or_else(|e| {
            eprintln!("error: failed to create tokio runtime: {e}");
            process::exit(1);
        });
        rt.block_on(dr_sim::api::serve(state, addr));
    }
}

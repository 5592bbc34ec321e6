//! Household emissions simulator entry point: CLI wiring, backfill and reporting.

use std::path::Path;
use std::process;

use chrono::{Days, NaiveDate, Utc};
use tracing::Level;

use home_emissions::aggregate::RangeAggregator;
use home_emissions::batch::BatchRunner;
use home_emissions::config::ScenarioConfig;
use home_emissions::io::export::export_csv;
use home_emissions::record::MemoryStore;
use home_emissions::sim::EmissionSimulator;

/// Parsed CLI arguments.
struct CliArgs {
    scenario_path: Option<String>,
    preset: Option<String>,
    seed_override: Option<u64>,
    end_date: Option<NaiveDate>,
    days: Option<u32>,
    csv_out: Option<String>,
    verbose: bool,
    #[cfg(feature = "api")]
    serve: bool,
    #[cfg(feature = "api")]
    port: u16,
}

fn print_help() {
    eprintln!("home-emissions — synthetic household CO2 emissions simulator");
    eprintln!();
    eprintln!("Usage: home-emissions [OPTIONS]");
    eprintln!();
    eprintln!("Options:");
    eprintln!("  --scenario <path>        Load scenario from TOML config file");
    eprintln!("  --preset <name>          Use a built-in preset (baseline, southern, neighborhood)");
    eprintln!("  --seed <u64>             Override random seed");
    eprintln!("  --end-date <YYYY-MM-DD>  Last simulated day (default: today, UTC)");
    eprintln!("  --days <n>               Override number of days to backfill");
    eprintln!("  --csv-out <path>         Export stored records to CSV");
    eprintln!("  -v, --verbose            Enable debug logging");
    #[cfg(feature = "api")]
    {
        eprintln!("  --serve                  Start REST API server after the backfill");
        eprintln!("  --port <u16>             API server port (default: 3000)");
    }
    eprintln!("  --help                   Show this help message");
    eprintln!();
    eprintln!("If no --scenario or --preset is given, the baseline preset is used.");
}

/// Returns the value following flag `args[*i]`, or exits.
fn flag_value<'a>(args: &'a [String], i: &mut usize, what: &str) -> &'a str {
    let flag = &args[*i];
    *i += 1;
    match args.get(*i) {
        Some(v) => v.as_str(),
        None => {
            eprintln!("error: {flag} requires {what}");
            process::exit(1);
        }
    }
}

fn parse_or_exit<T: std::str::FromStr>(flag: &str, value: &str, what: &str) -> T {
    value.parse().unwrap_or_else(|_| {
        eprintln!("error: {flag} value \"{value}\" is not a valid {what}");
        process::exit(1);
    })
}

fn parse_args() -> CliArgs {
    let args: Vec<String> = std::env::args().collect();
    let mut cli = CliArgs {
        scenario_path: None,
        preset: None,
        seed_override: None,
        end_date: None,
        days: None,
        csv_out: None,
        verbose: false,
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
            "--scenario" => {
                cli.scenario_path = Some(flag_value(&args, &mut i, "a path argument").to_string());
            }
            "--preset" => {
                cli.preset = Some(flag_value(&args, &mut i, "a name argument").to_string());
            }
            "--seed" => {
                let v = flag_value(&args, &mut i, "a u64 argument");
                cli.seed_override = Some(parse_or_exit("--seed", v, "u64"));
            }
            "--end-date" => {
                let v = flag_value(&args, &mut i, "a date argument");
                cli.end_date = Some(parse_or_exit("--end-date", v, "YYYY-MM-DD date"));
            }
            "--days" => {
                let v = flag_value(&args, &mut i, "a u32 argument");
                cli.days = Some(parse_or_exit("--days", v, "u32"));
            }
            "--csv-out" => {
                cli.csv_out = Some(flag_value(&args, &mut i, "a path argument").to_string());
            }
            "--verbose" | "-v" => {
                cli.verbose = true;
            }
            #[cfg(feature = "api")]
            "--serve" => {
                cli.serve = true;
            }
            #[cfg(feature = "api")]
            "--port" => {
                let v = flag_value(&args, &mut i, "a u16 argument");
                cli.port = parse_or_exit("--port", v, "u16");
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

fn main() {
    let cli = parse_args();

    let level = if cli.verbose { Level::DEBUG } else { Level::INFO };
    let subscriber = tracing_subscriber::fmt::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .finish();
    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("warning: failed to install log subscriber: {e}");
    }

    // Load config: --scenario takes priority, then --preset, then baseline default
    let mut scenario = if let Some(ref path) = cli.scenario_path {
        match ScenarioConfig::from_toml_file(Path::new(path)) {
            Ok(cfg) => cfg,
            Err(e) => {
                eprintln!("{e}");
                process::exit(1);
            }
        }
    } else if let Some(ref name) = cli.preset {
        match ScenarioConfig::from_preset(name) {
            Ok(cfg) => cfg,
            Err(e) => {
                eprintln!("{e}");
                process::exit(1);
            }
        }
    } else {
        ScenarioConfig::baseline()
    };

    if let Some(seed) = cli.seed_override {
        scenario.simulation.seed = seed;
    }
    if let Some(days) = cli.days {
        scenario.simulation.days = days;
    }
    if cli.end_date.is_some() {
        scenario.simulation.end_date = cli.end_date;
    }

    let errors = scenario.validate();
    if !errors.is_empty() {
        for e in &errors {
            eprintln!("{e}");
        }
        process::exit(1);
    }

    let sim_cfg = &scenario.simulation;
    let end = sim_cfg.end_date.unwrap_or_else(|| Utc::now().date_naive());
    let Some(start) = end.checked_sub_days(Days::new(u64::from(sim_cfg.days - 1))) else {
        eprintln!("error: {} days before {end} is out of range", sim_cfg.days);
        process::exit(1);
    };
    tracing::info!(
        homes = scenario.homes.len(),
        %start,
        %end,
        seed = sim_cfg.seed,
        "backfilling scenario"
    );

    let simulator = EmissionSimulator::new(scenario.noise.to_noise_config());
    let factors = scenario.emission_factors.to_factor_table();
    let store = MemoryStore::new();
    let report = BatchRunner::new(&simulator, &factors, &store, sim_cfg.seed).backfill(
        &scenario.homes,
        start,
        end,
        false,
    );
    for failure in &report.failures {
        eprintln!("warning: {failure}");
    }
    println!("Backfill: {report}");

    let aggregator = RangeAggregator::new(&store);
    for home in &scenario.homes {
        println!("\n=== {} ===", home.id);
        match aggregator.get_range(&home.id, sim_cfg.days, end) {
            Ok(range) => println!("{range}"),
            Err(e) => eprintln!("error: range for {}: {e}", home.id),
        }
        match aggregator.get_comparison(&home.id, sim_cfg.days, end) {
            Ok(cmp) => println!("{cmp}"),
            Err(e) => eprintln!("error: comparison for {}: {e}", home.id),
        }
    }

    if let Some(ref path) = cli.csv_out {
        if let Err(e) = export_csv(&store.all(), Path::new(path)) {
            eprintln!("error: failed to write CSV: {e}");
            process::exit(1);
        }
        tracing::info!(path = %path, records = store.len(), "records written");
    }

    #[cfg(feature = "api")]
    if cli.serve {
        use std::net::SocketAddr;
        use std::sync::Arc;

        let state = Arc::new(home_emissions::api::AppState { store, today: end });
        let addr = SocketAddr::from(([0, 0, 0, 0], cli.port));
        let rt = tokio::runtime::Runtime::new().unwrap_or_else(|e| {
            eprintln!("error: failed to create tokio runtime: {e}");
            process::exit(1);
        });
        if let Err(e) = rt.block_on(home_emissions::api::serve(state, addr)) {
            eprintln!("error: API server failed: {e}");
            process::exit(1);
        }
    }
}

//! Assembler entry point — CLI wiring and scenario-driven pipeline construction.

use std::path::Path;
use std::process;

use dynsim_assembly::config::{ConfigError, ScenarioConfig};
use dynsim_assembly::io::export::export_csv;
use dynsim_assembly::model::{EventDescriptor, ModelDescriptor};
use dynsim_assembly::network::StaticNetwork;
use dynsim_assembly::pipeline::{Assembler, AssemblySettings};

/// Parsed CLI arguments.
struct CliArgs {
    scenario_path: Option<String>,
    preset: Option<String>,
    engine_version: Option<String>,
    report_out: Option<String>,
}

fn print_help() {
    eprintln!("dynsim-assembly — Dynamic simulation input assembler for power grids");
    eprintln!();
    eprintln!("Usage: dynsim-assembly [OPTIONS]");
    eprintln!();
    eprintln!("Options:");
    eprintln!("  --scenario <path>         Load scenario from TOML config file");
    eprintln!("  --preset <name>           Use a built-in preset (baseline, signal_n, staged)");
    eprintln!("  --engine-version <tag>    Override the target engine version");
    eprintln!("  --report-out <path>       Export the outcome table to CSV");
    eprintln!("  --help                    Show this help message");
    eprintln!();
    eprintln!("If no --scenario or --preset is given, the baseline preset is used.");
}

fn parse_args() -> CliArgs {
    let args: Vec<String> = std::env::args().collect();
    let mut cli = CliArgs {
        scenario_path: None,
        preset: None,
        engine_version: None,
        report_out: None,
    };

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--help" | "-h" => {
                print_help();
                process::exit(0);
            }
            "--scenario" => {
                i += 1;
                if i >= args.len() {
                    eprintln!("error: --scenario requires a path argument");
                    process::exit(1);
                }
                cli.scenario_path = Some(args[i].clone());
            }
            "--preset" => {
                i += 1;
                if i >= args.len() {
                    eprintln!("error: --preset requires a name argument");
                    process::exit(1);
                }
                cli.preset = Some(args[i].clone());
            }
            "--engine-version" => {
                i += 1;
                if i >= args.len() {
                    eprintln!("error: --engine-version requires a version argument");
                    process::exit(1);
                }
                cli.engine_version = Some(args[i].clone());
            }
            "--report-out" => {
                i += 1;
                if i >= args.len() {
                    eprintln!("error: --report-out requires a path argument");
                    process::exit(1);
                }
                cli.report_out = Some(args[i].clone());
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

/// Builds the assembler inputs from a validated scenario.
#[expect(clippy::type_complexity)]
fn build_inputs(
    cfg: &ScenarioConfig,
) -> Result<
    (
        AssemblySettings,
        Vec<ModelDescriptor>,
        Vec<EventDescriptor>,
        StaticNetwork,
    ),
    ConfigError,
> {
    Ok((
        cfg.build_settings()?,
        cfg.build_models()?,
        cfg.build_events()?,
        cfg.build_network(),
    ))
}

fn main() {
    let cli = parse_args();

    tracing_subscriber::fmt::init();

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

    // Apply engine version override
    if let Some(version) = cli.engine_version {
        scenario.engine.version = version;
    }

    // Validate
    let errors = scenario.validate();
    if !errors.is_empty() {
        for e in &errors {
            eprintln!("{e}");
        }
        process::exit(1);
    }

    // Build and assemble
    let (settings, models, events, network) = match build_inputs(&scenario) {
        Ok(parts) => parts,
        Err(e) => {
            eprintln!("{e}");
            process::exit(1);
        }
    };
    let mut assembler = Assembler::new(settings);
    if let Some(partition) = scenario.build_partition() {
        assembler = assembler.with_partition(partition);
    }
    let assembly = match assembler.assemble(models, events, &network) {
        Ok(assembly) => assembly,
        Err(e) => {
            eprintln!("error: {e}");
            process::exit(1);
        }
    };

    // Print per-warning detail, then the summary
    println!("{}", assembly.report);
    println!("\n{assembly}");

    // Export CSV if requested
    if let Some(ref path) = cli.report_out {
        if let Err(e) = export_csv(&assembly, Path::new(path)) {
            eprintln!("error: failed to write CSV: {e}");
            process::exit(1);
        }
        eprintln!("Outcome table written to {path}");
    }
}

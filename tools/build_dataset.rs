//! Accelerometer Dataset Build Tool
//!
//! Configuration-driven tool that turns a raw accelerometer CSV into windowed
//! and labeled NumPy artifacts.
//!
//! # Usage
//!
//! ```bash
//! # Full run: CSV → windows → labels
//! cargo run --release --bin build_dataset -- --config dataset.toml \
//!     --input accelerometer.csv --output dataset/
//!
//! # Full run straight from the ingestion database
//! cargo run --release --bin build_dataset -- --config dataset.toml \
//!     --db health_data.db --device watch-1 --output dataset/
//!
//! # Relabel existing windows with new rules
//! cargo run --release --bin build_dataset -- --config dataset.toml \
//!     --label-only --output dataset/
//!
//! # Generate sample config
//! cargo run --release --bin build_dataset -- --generate-config dataset.toml
//! ```
//!
//! Set `RUST_LOG=debug` for per-period and per-window detail.

use motion_dataset::prelude::*;
use std::path::PathBuf;
use std::process;

#[derive(Debug, Default)]
struct Args {
    config: Option<PathBuf>,
    input: Option<PathBuf>,
    db: Option<PathBuf>,
    device: Option<String>,
    output: Option<PathBuf>,
    label_only: bool,
}

/// Main entry point for the build tool
fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let argv: Vec<String> = std::env::args().collect();
    if argv.len() < 2 {
        print_usage(&argv[0]);
        process::exit(1);
    }

    let mut args = Args::default();
    let mut i = 1;
    while i < argv.len() {
        match argv[i].as_str() {
            "--config" => args.config = Some(PathBuf::from(value_of(&argv, &mut i, "--config"))),
            "--input" => args.input = Some(PathBuf::from(value_of(&argv, &mut i, "--input"))),
            "--db" => args.db = Some(PathBuf::from(value_of(&argv, &mut i, "--db"))),
            "--device" => args.device = Some(value_of(&argv, &mut i, "--device")),
            "--output" => args.output = Some(PathBuf::from(value_of(&argv, &mut i, "--output"))),
            "--label-only" => args.label_only = true,
            "--generate-config" => {
                let path = value_of(&argv, &mut i, "--generate-config");
                generate_sample_config(&path);
                return;
            }
            "--help" | "-h" => {
                print_usage(&argv[0]);
                return;
            }
            other => {
                eprintln!("Unknown argument: {other}");
                print_usage(&argv[0]);
                process::exit(1);
            }
        }
        i += 1;
    }

    if let Err(e) = run(args) {
        eprintln!("❌ {e}");
        process::exit(1);
    }
}

fn value_of(argv: &[String], i: &mut usize, flag: &str) -> String {
    *i += 1;
    match argv.get(*i) {
        Some(value) => value.clone(),
        None => {
            eprintln!("Error: {flag} requires a value");
            process::exit(1);
        }
    }
}

fn print_usage(program: &str) {
    eprintln!(
        r#"
Accelerometer Dataset Build Tool

Usage:
    {program} --config <path.toml> --input <samples.csv> --output <dir>
    {program} --config <path.toml> --db <health_data.db> [--device <id>] --output <dir>
    {program} --config <path.toml> --label-only --output <dir>
    {program} --generate-config <path.toml>
    {program} --help

Options:
    --config <path>           Pipeline configuration (TOML or JSON)
    --input <path>            CSV with x, y, z, timestamp columns
    --db <path>               SQLite store with an accelerometer table
    --device <id>             Only read this device's samples (with --db)
    --output <dir>            Artifact directory
    --label-only              Relabel windows already in --output
    --generate-config <path>  Write a sample configuration
"#
    );
}

fn load_config(path: Option<&PathBuf>) -> Result<PipelineConfig> {
    match path {
        Some(p) if p.extension().is_some_and(|ext| ext == "json") => PipelineConfig::load_json(p),
        Some(p) => PipelineConfig::load_toml(p),
        None => {
            log::warn!("No --config given, using defaults with no label rules");
            Ok(PipelineConfig::default())
        }
    }
}

fn run(args: Args) -> Result<()> {
    let output_dir = args
        .output
        .ok_or_else(|| DatasetError::Config("--output is required".to_string()))?;
    let config = load_config(args.config.as_ref())?;
    let pipeline = Pipeline::from_config(config)?;

    if args.label_only {
        let (labeling, quality) = pipeline.label_from_dir(&output_dir)?;
        pipeline.export_labeled(&labeling, &quality, &output_dir)?;
        println!("{}", labeling.report.render(labeling.dataset.class_mapping()));
        println!("{}", quality.render());
        return Ok(());
    }

    let output = match (args.input, args.db) {
        (Some(input), None) => pipeline.run(&CsvSampleSource::new(&input))?,
        (None, Some(db)) => {
            let mut source = SqliteSampleSource::new(&db);
            if let Some(device) = args.device {
                source = source.with_device(device);
            }
            pipeline.run(&source)?
        }
        (Some(_), Some(_)) => {
            return Err(DatasetError::Config("use either --input or --db, not both".to_string()))
        }
        (None, None) => {
            return Err(DatasetError::Config(
                "--input or --db is required unless --label-only".to_string(),
            ))
        }
    };
    pipeline.export(&output, &output_dir)?;

    let stats = &output.windowing.stats;
    println!("✅ Samples loaded: {}", output.windowing.samples_loaded);
    println!(
        "✅ Periods: {} ({} too short)",
        stats.periods_total(),
        stats.periods_skipped()
    );
    println!(
        "✅ Windows: {} ({} candidates, {} dropped for low coverage)",
        stats.windows_emitted(),
        stats.candidates(),
        stats.dropped_low_coverage()
    );
    println!();
    println!(
        "{}",
        output
            .labeling
            .report
            .render(output.labeling.dataset.class_mapping())
    );
    println!("{}", output.quality.render());
    println!("✅ Artifacts written to {}", output_dir.display());
    Ok(())
}

/// Generate a sample configuration file
fn generate_sample_config(path: &str) {
    let config = PipelineBuilder::new()
        .rule("2025-07-25", "14:55:00", "16:15:00", "sedentary")
        .rule("2025-08-01", "16:16:00", "16:57:00", "light")
        .rule("2025-08-04", "16:35:00", "17:29:59", "sedentary")
        .rule("2025-08-04", "17:30:00", "18:15:00", "sleep")
        .rule("2025-08-04", "18:20:00", "18:31:00", "moderate-vigorous")
        .categories(["light", "moderate-vigorous", "sedentary", "sleep"])
        .experiment("wrist-accelerometer", "Wrist-worn accelerometer, activity labels")
        .build_config();

    let result = config.and_then(|c| c.save_toml(path));
    match result {
        Ok(()) => {
            println!("✅ Generated sample config: {path}");
            println!("\nEdit labeling.rules to match your recording sessions.");
        }
        Err(e) => {
            eprintln!("Error generating config: {e}");
            process::exit(1);
        }
    }
}

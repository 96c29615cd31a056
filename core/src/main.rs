use clap::Parser;
use log::{error, info};
use phantomqa_core::cli::report::TextReport;
use phantomqa_core::cli::{Cli, Command, OutputFormat};
use phantomqa_core::{
    Diagnostics, DicomFileSource, NemaBodyWorkflow, OverlayWriter, QaConfig, QaError,
    RoiInspector, TorsoWorkflow, WeeklyWorkflow,
};
use std::fmt;
use std::process;

fn main() {
    let cli = Cli::parse();

    setup_logging(cli.verbose);

    let directory = cli.command.directory();
    if !directory.is_dir() {
        eprintln!("Error: {} is not a directory", directory.display());
        process::exit(1);
    }

    info!("Processing directory: {}", directory.display());

    let config = match load_config(&cli) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {}", e);
            process::exit(1);
        }
    };

    let mut overlays = match &cli.overlay_dir {
        Some(dir) => match OverlayWriter::new(dir) {
            Ok(writer) => Some(writer),
            Err(e) => {
                eprintln!("Error: cannot create overlay directory {}: {}", dir.display(), e);
                process::exit(1);
            }
        },
        None => None,
    };
    let mut no_overlays = ();
    let inspector: &mut dyn RoiInspector = match overlays.as_mut() {
        Some(writer) => writer,
        None => &mut no_overlays,
    };

    let mut diagnostics = Diagnostics::new();
    let source = DicomFileSource::new();

    let result = match &cli.command {
        Command::Weekly { directory } => {
            match WeeklyWorkflow::new(source, config.weekly).run_directory(
                directory,
                inspector,
                &mut diagnostics,
            ) {
                Ok(report) => output(&report, &diagnostics, &cli.format),
                Err(QaError::NoCandidateSlices) => {
                    println!(
                        "No candidate slices: no DICOM files could be loaded from {}",
                        directory.display()
                    );
                    Ok(())
                }
                Err(e) => Err(e),
            }
        }
        Command::NemaBody { directory } => NemaBodyWorkflow::new(source, config.nema_body)
            .run_directory(directory, inspector, &mut diagnostics)
            .and_then(|report| output(&report, &diagnostics, &cli.format)),
        Command::Torso { directory } => TorsoWorkflow::new(source, config.torso)
            .run_directory(directory, inspector, &mut diagnostics)
            .and_then(|report| output(&report, &diagnostics, &cli.format)),
    };

    if let Err(e) = result {
        error!("Processing failed: {}", e);
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

fn setup_logging(verbose: bool) {
    if verbose {
        env_logger::Builder::from_default_env()
            .filter_level(log::LevelFilter::Debug)
            .init();
    } else {
        env_logger::Builder::from_default_env()
            .filter_level(log::LevelFilter::Info)
            .init();
    }
}

#[cfg(feature = "json")]
fn load_config(cli: &Cli) -> phantomqa_core::Result<QaConfig> {
    match &cli.config {
        Some(path) => {
            info!("Loading settings from {}", path.display());
            QaConfig::from_json_file(path)
        }
        None => Ok(QaConfig::default()),
    }
}

#[cfg(not(feature = "json"))]
fn load_config(_cli: &Cli) -> phantomqa_core::Result<QaConfig> {
    Ok(QaConfig::default())
}

#[cfg(feature = "json")]
fn output<T>(report: &T, diagnostics: &Diagnostics, format: &OutputFormat) -> phantomqa_core::Result<()>
where
    T: serde::Serialize,
    for<'a> TextReport<'a, T>: fmt::Display,
{
    match format {
        OutputFormat::Text => println!("{}", TextReport::new(report, diagnostics.warnings())),
        OutputFormat::Json => {
            let value = serde_json::json!({
                "report": report,
                "warnings": diagnostics.warnings(),
            });
            let text = serde_json::to_string_pretty(&value)
                .map_err(|e| QaError::InvalidValue(format!("cannot serialize report: {}", e)))?;
            println!("{}", text);
        }
    }
    Ok(())
}

#[cfg(not(feature = "json"))]
fn output<T>(report: &T, diagnostics: &Diagnostics, format: &OutputFormat) -> phantomqa_core::Result<()>
where
    for<'a> TextReport<'a, T>: fmt::Display,
{
    match format {
        OutputFormat::Text => {
            println!("{}", TextReport::new(report, diagnostics.warnings()));
            Ok(())
        }
        OutputFormat::Json => Err(QaError::Config(
            "JSON output requires the 'json' feature".to_string(),
        )),
    }
}

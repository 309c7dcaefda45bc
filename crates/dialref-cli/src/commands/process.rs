//! Process command - fill a referral form from the patient's PDFs.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;

use clap::Args;
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{debug, info};

use dialref_core::models::config::DialrefConfig;
use dialref_core::models::form::FormRecord;
use dialref_core::referral::{AssemblyReport, FormAssembler, Uploads};
use dialref_core::ValueSource;

/// Arguments for the process command.
#[derive(Args)]
pub struct ProcessArgs {
    /// Registration sheet with the patient's demographics (PDF)
    #[arg(long)]
    demographics: Option<PathBuf>,

    /// Clinical evolution or summary (PDF)
    #[arg(long)]
    clinical: Option<PathBuf>,

    /// Laboratory results (PDF)
    #[arg(long)]
    labs: Option<PathBuf>,

    /// Output file (default: stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "json")]
    format: OutputFormat,

    /// Do not call the geocoding service
    #[arg(long)]
    offline: bool,

    /// How weight, blood pressure and lab values are filled
    #[arg(long, value_enum)]
    values: Option<ValuesArg>,

    /// Seed for reproducible random values
    #[arg(long)]
    seed: Option<u64>,

    /// Print extraction warnings and timing
    #[arg(long)]
    show_warnings: bool,
}

#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub enum OutputFormat {
    /// JSON object keyed by form field
    Json,
    /// CSV with a header row
    Csv,
    /// Plain text grouped by form page
    Text,
}

#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub enum ValuesArg {
    /// Random values in plausible ranges
    Random,
    /// Fixed mid-range values
    Fixed,
    /// Leave empty for manual entry
    Manual,
}

impl From<ValuesArg> for ValueSource {
    fn from(arg: ValuesArg) -> Self {
        match arg {
            ValuesArg::Random => ValueSource::Random,
            ValuesArg::Fixed => ValueSource::Fixed,
            ValuesArg::Manual => ValueSource::Manual,
        }
    }
}

pub fn run(args: ProcessArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let start = Instant::now();

    let mut config = if let Some(path) = config_path {
        DialrefConfig::from_file(Path::new(path))?
    } else {
        DialrefConfig::default()
    };
    apply_overrides(&mut config, &args);
    config.validate()?;

    let demographics = read_upload(args.demographics.as_deref())?;
    let clinical = read_upload(args.clinical.as_deref())?;
    let labs = read_upload(args.labs.as_deref())?;

    let uploads = Uploads {
        demographics: demographics.as_deref(),
        clinical: clinical.as_deref(),
        labs: labs.as_deref(),
    };

    let pb = ProgressBar::new(100);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] {bar:40.cyan/blue} {msg}")?
            .progress_chars("##-"),
    );

    pb.set_message("Preparing...");
    pb.set_position(10);
    let mut assembler = FormAssembler::from_config(&config);

    pb.set_message("Reading PDFs and extracting fields...");
    pb.set_position(30);
    let report = assembler.run(&uploads);

    pb.set_position(100);
    pb.finish_and_clear();

    info!(
        "Form assembled with {} warnings in {}ms",
        report.warnings.len(),
        report.processing_time_ms
    );

    let output = format_record(&report.record, args.format)?;

    if let Some(output_path) = &args.output {
        fs::write(output_path, &output)?;
        println!(
            "{} Output written to {}",
            style("✓").green(),
            output_path.display()
        );
    } else {
        println!("{}", output);
    }

    if args.show_warnings {
        print_warnings(&report);
    }

    debug!("Total processing time: {:?}", start.elapsed());

    Ok(())
}

fn apply_overrides(config: &mut DialrefConfig, args: &ProcessArgs) {
    if args.offline {
        config.geocoder.enabled = false;
    }
    if let Some(values) = args.values {
        config.clinical.source = values.into();
    }
    if args.seed.is_some() {
        config.clinical.seed = args.seed;
    }
}

fn read_upload(path: Option<&Path>) -> anyhow::Result<Option<Vec<u8>>> {
    let Some(path) = path else {
        return Ok(None);
    };
    if !path.exists() {
        anyhow::bail!("Input file not found: {}", path.display());
    }
    info!("Reading {}", path.display());
    Ok(Some(fs::read(path)?))
}

fn print_warnings(report: &AssemblyReport) {
    eprintln!();
    if report.warnings.is_empty() {
        eprintln!("{} No warnings", style("✓").green());
    } else {
        eprintln!("{}", style("Warnings:").yellow());
        for warning in &report.warnings {
            eprintln!("  - {}", warning);
        }
    }
    eprintln!(
        "{} Processing time: {}ms",
        style("ℹ").blue(),
        report.processing_time_ms
    );
}

fn format_record(record: &FormRecord, format: OutputFormat) -> anyhow::Result<String> {
    match format {
        OutputFormat::Json => Ok(serde_json::to_string_pretty(record)?),
        OutputFormat::Csv => format_csv(record),
        OutputFormat::Text => Ok(format_text(record)),
    }
}

fn format_csv(record: &FormRecord) -> anyhow::Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);

    wtr.write_record(record.iter().map(|(spec, _)| spec.key))?;
    wtr.write_record(record.iter().map(|(_, value)| value))?;

    let data = String::from_utf8(wtr.into_inner()?)?;
    Ok(data)
}

fn format_text(record: &FormRecord) -> String {
    let mut output = String::new();

    for (page, fields) in record.pages() {
        output.push_str(&format!("Página {}\n", page));
        for (spec, value) in fields {
            output.push_str(&format!("  {}: {}\n", spec.label, value));
        }
        output.push('\n');
    }

    output
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_csv_has_header_and_one_row() {
        let csv = format_csv(&FormRecord::new()).unwrap();
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].starts_with("email,consentimento,hospital"));
        assert!(lines[0].contains("telefone fixo"));
    }

    #[test]
    fn test_text_is_grouped_by_page() {
        let text = format_text(&FormRecord::new());
        assert!(text.starts_with("Página 1\n  Email: \n"));
        let page3 = text.find("Página 3").unwrap();
        let page4 = text.find("Página 4").unwrap();
        let name = text.find("Nome do paciente").unwrap();
        assert!(page3 < name && name < page4);
    }
}

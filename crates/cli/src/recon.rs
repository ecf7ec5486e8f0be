//! `kir run | validate | cities`: config-driven school reconciliation.

use std::path::{Path, PathBuf};

use kir_recon::audit::generate_audit;
use kir_recon::city_mapping::{
    apply_city_mapping, check_city_variations, load_city_mapping, VariationStatus,
};
use kir_recon::dataset::{load_records, save_records};
use kir_recon::model::CompetitionRecord;
use kir_recon::registry::load_registry;
use kir_recon::school_mapping::load_school_mapping;
use kir_recon::{ReconConfig, ReconInput, ReconResult};
use tracing::{info, warn};

use crate::exit_codes::{EXIT_INVALID_CONFIG, EXIT_IO};
use crate::CliError;

/// Read, parse and validate the config; relative paths resolve against its directory.
fn load_config(config_path: &Path) -> Result<ReconConfig, CliError> {
    let config_str = std::fs::read_to_string(config_path).map_err(|e| {
        CliError::usage(format!("cannot read config {}: {e}", config_path.display()))
    })?;

    let mut config = ReconConfig::from_toml(&config_str)?;
    let base_dir = config_path.parent().unwrap_or_else(|| Path::new("."));
    config.resolve_paths(base_dir);
    Ok(config)
}

fn load_dataset(config: &ReconConfig) -> Result<Vec<CompetitionRecord>, CliError> {
    let path = config.paths.dataset.as_deref().ok_or_else(|| {
        CliError::with_code(EXIT_INVALID_CONFIG, "no dataset configured")
            .with_hint("set [paths] dataset in the config")
    })?;
    if !path.exists() {
        return Err(CliError::with_code(
            EXIT_IO,
            format!("dataset not found: {}", path.display()),
        ));
    }
    Ok(load_records(path)?)
}

// ---------------------------------------------------------------------------
// run
// ---------------------------------------------------------------------------

pub fn cmd_run(
    config_path: PathBuf,
    json_output: bool,
    report: Option<PathBuf>,
) -> Result<(), CliError> {
    let config = load_config(&config_path)?;
    let records = load_dataset(&config)?;
    let input = ReconInput::load(&config, records)?;

    let result = kir_recon::run(&config, &input);

    if let Some(path) = &config.paths.reconciled {
        save_records(path, &result.records)?;
    } else {
        warn!("no [paths] reconciled configured, reconciled dataset not written");
    }

    if let Some(path) = &config.paths.audit {
        generate_audit(&result.matches, path)?;
    } else {
        warn!("no [paths] audit configured, audit file not written");
    }

    let json_str = serde_json::to_string_pretty(&result)
        .map_err(|e| CliError::general(format!("JSON serialization error: {e}")))?;

    if let Some(path) = report.as_ref().or(config.paths.report.as_ref()) {
        write_report(path, &json_str)?;
        info!("wrote report {}", path.display());
    }

    if json_output {
        println!("{json_str}");
    }

    print_summary(&result);
    Ok(())
}

/// Write the JSON report, creating parent directories like the other outputs.
fn write_report(path: &Path, json: &str) -> Result<(), CliError> {
    let io_err = |e: std::io::Error| {
        CliError::with_code(EXIT_IO, format!("cannot write report {}: {e}", path.display()))
    };
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(io_err)?;
    }
    std::fs::write(path, json).map_err(io_err)
}

/// Human summary to stderr.
fn print_summary(result: &ReconResult) {
    let s = &result.summary;
    eprintln!(
        "reconciled {} of {} records: {} unique pairs, {} applied, {} not applied",
        s.output_rows, s.input_rows, s.unique_pairs, s.applied_pairs, s.not_applied_pairs,
    );
    eprintln!(
        "cities: {} corrected, {} dropped, {} unmapped variations",
        s.city_corrections.corrected, s.city_corrections.dropped, s.unmapped_city_variations,
    );
    let methods: Vec<String> = s
        .method_counts
        .iter()
        .filter(|(_, n)| **n > 0)
        .map(|(m, n)| format!("{m} {n}"))
        .collect();
    if !methods.is_empty() {
        eprintln!("methods: {}", methods.join(", "));
    }
    if s.missing_rows > 0 {
        eprintln!("warning: {} records had no match result", s.missing_rows);
    }
}

// ---------------------------------------------------------------------------
// validate
// ---------------------------------------------------------------------------

pub fn cmd_validate(config_path: PathBuf) -> Result<(), CliError> {
    let config = load_config(&config_path)?;
    let registry = load_registry(&config.registry.path, &config.registry)?;
    let city_mapping = load_city_mapping(config.overrides.city_mapping_file.as_deref());
    let school_mapping = load_school_mapping(config.overrides.school_mapping_file.as_deref());

    eprintln!("config ok: {}", config_path.display());
    eprintln!("  registry:        {} schools", registry.len());
    eprintln!("  city mappings:   {}", city_mapping.len());
    eprintln!("  school mappings: {}", school_mapping.len());
    eprintln!(
        "  thresholds:      medium {} / high {}",
        config.matching.medium, config.matching.high
    );
    Ok(())
}

// ---------------------------------------------------------------------------
// cities
// ---------------------------------------------------------------------------

pub fn cmd_cities(config_path: PathBuf, json_output: bool) -> Result<(), CliError> {
    let config = load_config(&config_path)?;
    let records = load_dataset(&config)?;
    let mapping = load_city_mapping(config.overrides.city_mapping_file.as_deref());

    let (corrected, _) = apply_city_mapping(&records, &mapping);
    let variations = check_city_variations(&corrected, &mapping);

    if json_output {
        let json_str = serde_json::to_string_pretty(&variations)
            .map_err(|e| CliError::general(format!("JSON serialization error: {e}")))?;
        println!("{json_str}");
        return Ok(());
    }

    if variations.is_empty() {
        eprintln!("no schools with city variations");
        return Ok(());
    }

    for v in &variations {
        println!("{}", v.school_name);
        for usage in &v.cities {
            let status = match usage.status {
                VariationStatus::Valid => "valid",
                VariationStatus::Unmapped => "UNMAPPED",
            };
            println!("  {:<32} {status}", usage.city);
        }
    }
    let unmapped = variations.iter().filter(|v| v.has_unmapped()).count();
    eprintln!(
        "{} schools with city variations, {unmapped} need review",
        variations.len()
    );
    Ok(())
}

use anyhow::{Context, Result};
use log::info;
use std::path::PathBuf;

use t3chomp::schedule::{
    merge_registry_pkas, GeneratorConfig, LogpSolvent, MergeOptions, Protocol, ScheduleGenerator,
};

/// Merge a registry and a pKa table, then generate one import file per tray.
#[allow(clippy::too_many_arguments)]
pub fn run(
    regi: PathBuf,
    pka: PathBuf,
    filter_file: Option<PathBuf>,
    sample_col: String,
    output: PathBuf,
    protocol: Protocol,
    concentration: f64,
    volume: f64,
    logp_solvent: Option<LogpSolvent>,
) -> Result<()> {
    if protocol.needs_solvent() && logp_solvent.is_none() {
        anyhow::bail!("--logp-solvent is required when --protocol is logp");
    }

    info!("Generating {protocol} CSV for import");
    let options = MergeOptions {
        registry_id_col: &sample_col,
        filter_file: filter_file.as_deref(),
        ..MergeOptions::default()
    };
    let table = merge_registry_pkas(&regi, &pka, &options)
        .with_context(|| format!("merging {} with {}", regi.display(), pka.display()))?;
    info!("Found {} samples with estimated pKa values", table.len());

    let config = GeneratorConfig {
        protocol,
        concentration_mm: concentration,
        volume_ul: volume,
        solvent: logp_solvent,
    };
    let generator = ScheduleGenerator::new(table, config)?;
    let files = generator
        .write_files(&output)
        .with_context(|| format!("writing import files to {}", output.display()))?;
    info!("Wrote {} tray file(s) to {}", files.len(), output.display());
    Ok(())
}

use anyhow::{Context, Result};
use std::path::PathBuf;

use t3chomp::t3r::{AssayCategory, LogpResultFile, PkaResultFile};

/// Print a summary of one .t3r result file.
pub fn run(file: PathBuf) -> Result<()> {
    let category = AssayCategory::sniff(&file)
        .with_context(|| format!("identifying assay category of {}", file.display()))?;

    println!("File:     {}", file.display());
    println!("Category: {category}");

    match category {
        AssayCategory::Pka => {
            let doc = PkaResultFile::open(&file)?;
            println!("Sample:   {}", doc.file().sample_name()?);
            println!("Assay:    {}", doc.file().assay_name()?);
            println!("Quality:  {}", doc.file().assay_quality()?);
            if let Ok(start) = doc.file().assay_start_time() {
                println!("Started:  {start}");
            }
            let measured = doc.measured_pkas()?;
            println!("pKas:     {}", measured.len());
            println!("Formatted: {}", doc.formatted_pkas()?);
            if let Some(cosolvent) = doc.cosolvent_name() {
                println!("Cosolvent: {cosolvent}");
            }
        }
        AssayCategory::Logp => {
            let doc = LogpResultFile::open(&file)?;
            println!("Sample:   {}", doc.file().sample_name()?);
            println!("Assay:    {}", doc.file().assay_name()?);
            println!("Quality:  {}", doc.file().assay_quality()?);
            if let Ok(start) = doc.file().assay_start_time() {
                println!("Started:  {start}");
            }
            let result = doc.logp_measurement()?;
            println!("logP:     {} (rmsd {})", result.value, result.rmsd);
            println!("Solvent:  {}", result.solvent);
        }
    }
    Ok(())
}

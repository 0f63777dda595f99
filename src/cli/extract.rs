use anyhow::{Context, Result};
use log::{error, info};
use serde::Serialize;
use std::path::{Path, PathBuf};

use t3chomp::batch::{BatchExtractor, ResultSet};
use t3chomp::t3r::AssayCategory;

/// Extract result rows from .t3r files into a results CSV plus a
/// failed-files CSV.
pub fn run(path: PathBuf, protocol: AssayCategory, output: Option<PathBuf>) -> Result<()> {
    if !path.exists() {
        anyhow::bail!("Input path does not exist: {}", path.display());
    }

    let extractor = BatchExtractor::new(&path)
        .with_context(|| format!("enumerating result files under {}", path.display()))?;
    info!("Extracting data from {} t3r file(s)", extractor.num_files());

    match protocol {
        AssayCategory::Pka => finish(extractor.extract_pka(), output),
        AssayCategory::Logp => finish(extractor.extract_logp(), output),
    }
}

fn finish<R: Serialize>(set: ResultSet<R>, output: Option<PathBuf>) -> Result<()> {
    match output {
        Some(output) => {
            set.write_results_csv(&output)
                .with_context(|| format!("writing results to {}", output.display()))?;
            info!("Finished parsing, wrote {}", output.display());

            let failed_path = output
                .parent()
                .filter(|p| !p.as_os_str().is_empty())
                .unwrap_or_else(|| Path::new("."))
                .join("failed_filenames.csv");
            set.write_failed_csv(&failed_path)
                .with_context(|| format!("writing failed files to {}", failed_path.display()))?;
        }
        None => {
            info!("No output file provided, writing to stdout");
            print!("{}", set.results_csv_string()?);
        }
    }
    if set.num_failed() > 0 {
        error!("{} files failed to parse", set.num_failed());
    }
    Ok(())
}

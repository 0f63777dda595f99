//! Tray batching and schedule import file generation.

use std::fs;
use std::path::{Path, PathBuf};

use log::info;

use super::protocols::{LogpSolvent, Protocol};
use super::table::{ScheduleRow, ScheduleTable};
use super::ScheduleError;

/// Fixed marker line opening every import file.
const HEADER_SECTION: &str = "ScheduleImportCsv\n\n";

/// Calibration line emitted once per tray by the Fast UV protocol.
const FAST_UV_CALIBRATION: &str = "Fast UV Buffer Calib MeOH";

/// Dosing parameters for volume-based protocols.
#[derive(Debug, Clone, Copy)]
pub struct GeneratorConfig {
    /// Protocol selecting tray capacity and line templates
    pub protocol: Protocol,
    /// Sample concentration in mM
    pub concentration_mm: f64,
    /// Sample volume in µL (emitted in mL on experiment lines)
    pub volume_ul: f64,
    /// Partition solvent, required by the logP protocol
    pub solvent: Option<LogpSolvent>,
}

impl GeneratorConfig {
    /// Config for a protocol with the workflow's default dosing
    /// (10 mM, 5 µL).
    pub fn new(protocol: Protocol) -> Self {
        Self {
            protocol,
            concentration_mm: 10.0,
            volume_ul: 5.0,
            solvent: None,
        }
    }
}

/// Generates SiriusT3 import files from a validated sample table, one file
/// per tray.
#[derive(Debug)]
pub struct ScheduleGenerator {
    table: ScheduleTable,
    config: GeneratorConfig,
}

impl ScheduleGenerator {
    /// Validate protocol requirements against the table up front: the logP
    /// protocol needs a solvent, mass-dosing protocols need `fw` and `mg`
    /// on every row.
    pub fn new(table: ScheduleTable, config: GeneratorConfig) -> Result<Self, ScheduleError> {
        if config.protocol.needs_solvent() && config.solvent.is_none() {
            return Err(ScheduleError::MissingSolvent);
        }
        if config.protocol.needs_mass_columns() {
            for row in table.rows() {
                if row.fw.is_none() {
                    return Err(ScheduleError::MissingValue {
                        sample: row.sample_id.clone(),
                        column: "fw".to_string(),
                    });
                }
                if row.mg.is_none() {
                    return Err(ScheduleError::MissingValue {
                        sample: row.sample_id.clone(),
                        column: "mg".to_string(),
                    });
                }
            }
        }
        Ok(Self { table, config })
    }

    /// Total number of samples across all trays.
    pub fn num_samples(&self) -> usize {
        self.table.len()
    }

    /// Number of import files that will be written.
    pub fn num_trays(&self) -> usize {
        let capacity = self.config.protocol.samples_per_tray();
        self.table.len().div_ceil(capacity)
    }

    /// Render the full import file for one tray.
    pub fn tray_file(&self, tray: &[ScheduleRow], tray_name: &str) -> String {
        let mut out = String::from(HEADER_SECTION);
        out.push_str(&self.sample_section(tray));
        out.push_str(&format!("\n\nTRAY,{tray_name}\n"));
        out.push_str(&self.experiment_section(tray));
        out
    }

    /// Sample section: one positional CSV line per sample.
    fn sample_section(&self, tray: &[ScheduleRow]) -> String {
        let lines: Vec<String> = tray
            .iter()
            .map(|row| {
                format!(
                    "{},{},SYM,{},MW,{}",
                    row.sample_id,
                    row.pkas.trim_end_matches(','),
                    row.well,
                    row.mw
                )
            })
            .collect();
        lines.join("\n")
    }

    /// Experiment section: protocol-specific instrument command lines.
    fn experiment_section(&self, tray: &[ScheduleRow]) -> String {
        let volume = self.config.volume_ul / 1000.0;
        let concentration = self.config.concentration_mm;
        let mut lines: Vec<String> = Vec::new();

        match self.config.protocol {
            Protocol::FastUvPska => {
                // One shared calibration per tray, then one assay per sample.
                lines.push(FAST_UV_CALIBRATION.to_string());
                for row in tray {
                    let s = &row.sample_id;
                    lines.push(format!(
                        "Fast UV psKa,title,pka of {s},{s},{s},1,volume,{volume},Concentration,{concentration},DMSO,1"
                    ));
                }
            }
            Protocol::UvMetricPska => {
                // Calibration is added automatically by the instrument.
                for row in tray {
                    let s = &row.sample_id;
                    lines.push(format!(
                        "UV-metric psKa,title,UV-metric psKa of {s} by volume,{s},{s},1,volume,{volume},Concentration,{concentration},DMSO,1"
                    ));
                }
            }
            Protocol::PhMetricPska => {
                for row in tray {
                    let s = &row.sample_id;
                    let fw = row.fw.as_deref().unwrap_or_default();
                    let mg = row.mg.as_deref().unwrap_or_default();
                    lines.push(format!(
                        "pH-metric psKa,title,pH-metric psKa of {s} by weight,{s},{s},1,fw,{fw},mg,{mg}"
                    ));
                    lines.push("Clean Up".to_string());
                }
            }
            Protocol::Logp => {
                let solvent = self
                    .config
                    .solvent
                    .map(LogpSolvent::as_str)
                    .unwrap_or_default();
                for row in tray {
                    let s = &row.sample_id;
                    let fw = row.fw.as_deref().unwrap_or_default();
                    let mg = row.mg.as_deref().unwrap_or_default();
                    lines.push(format!(
                        "pH-metric medium logP {solvent},title,logP of {s},{s},{s},1,fw,{fw},mg,{mg}"
                    ));
                    lines.push("Clean Up".to_string());
                    lines.push("Clean Up".to_string());
                }
            }
        }
        lines.join("\n")
    }

    /// Create the output directory and write one import file per tray.
    ///
    /// A pre-existing output directory is a hard error before any file is
    /// written, preventing silent overwrite of a previous schedule.
    pub fn write_files<P: AsRef<Path>>(&self, output_dir: P) -> Result<Vec<PathBuf>, ScheduleError> {
        let output_dir = output_dir.as_ref();
        if output_dir.exists() {
            return Err(ScheduleError::OutputExists(output_dir.to_path_buf()));
        }
        fs::create_dir(output_dir)?;

        let tray_base = output_dir
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| output_dir.display().to_string());

        let capacity = self.config.protocol.samples_per_tray();
        let mut written = Vec::new();
        for (idx, tray) in self.table.trays(capacity).enumerate() {
            let tray_name = format!("{tray_base}_{idx}");
            let path = output_dir.join(format!("tray_{idx}.csv"));
            fs::write(&path, self.tray_file(tray, &tray_name))?;
            info!("Wrote {}", path.display());
            written.push(path);
        }
        Ok(written)
    }
}

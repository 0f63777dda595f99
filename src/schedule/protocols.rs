//! Instrument protocols and their tray/template parameters.

use std::fmt;

use clap::ValueEnum;

/// A SiriusT3 scheduling protocol. Each protocol fixes the tray capacity
/// and the experiment-section template emitted per sample.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Protocol {
    /// Fast UV psKa: 47 samples per tray plus one shared buffer calibration
    FastUvPska,
    /// UV-metric psKa by volume: 24 samples per tray
    UvMetricPska,
    /// pH-metric psKa by weight: 24 samples per tray with cleanup steps
    PhMetricPska,
    /// pH-metric medium logP: 16 samples per tray with double cleanup steps
    Logp,
}

impl Protocol {
    /// Fixed tray capacity for this protocol.
    pub fn samples_per_tray(self) -> usize {
        match self {
            Self::FastUvPska => 47,
            Self::UvMetricPska => 24,
            Self::PhMetricPska => 24,
            Self::Logp => 16,
        }
    }

    /// Whether the protocol doses by mass and therefore needs `fw`/`mg`
    /// values for every sample.
    pub fn needs_mass_columns(self) -> bool {
        matches!(self, Self::PhMetricPska | Self::Logp)
    }

    /// Whether the protocol needs a caller-selected partition solvent.
    pub fn needs_solvent(self) -> bool {
        matches!(self, Self::Logp)
    }
}

impl fmt::Display for Protocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::FastUvPska => "fast-uv-pska",
            Self::UvMetricPska => "uv-metric-pska",
            Self::PhMetricPska => "ph-metric-pska",
            Self::Logp => "logp",
        };
        f.write_str(name)
    }
}

/// Partition solvents accepted by the logP protocol.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogpSolvent {
    /// 1-octanol (the classic logP partition solvent)
    Octanol,
    /// Toluene
    Toluene,
    /// Cyclohexane
    Cyclohexane,
    /// Chloroform
    Chloroform,
}

impl LogpSolvent {
    /// Lowercase solvent name as written into experiment lines.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Octanol => "octanol",
            Self::Toluene => "toluene",
            Self::Cyclohexane => "cyclohexane",
            Self::Chloroform => "chloroform",
        }
    }
}

impl fmt::Display for LogpSolvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

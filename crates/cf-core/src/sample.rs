//! Naming conventions of the HSCP gluino → neutralino signal samples.
//!
//! Ntuple files are named
//! `gluino<mass>_chi10<mass>_<ctau>_<decay>_<era>.root`, e.g.
//! `gluino1800_chi101300_0p1mm_lightDecay_130X_mcRun3_2023_realistic_postBPix_v2.root`.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{Error, Result};

/// Production era used when none is given.
pub const DEFAULT_ERA: &str = "130X_mcRun3_2023_realistic_postBPix_v2";

/// Decay channel of the signal sample.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DecayChannel {
    /// `lightDecay`
    Light,
    /// `heavyDecay`
    Heavy,
}

impl DecayChannel {
    /// Token used in file names.
    pub fn as_str(&self) -> &'static str {
        match self {
            DecayChannel::Light => "lightDecay",
            DecayChannel::Heavy => "heavyDecay",
        }
    }

    /// One-letter code used in plot labels.
    pub fn code(&self) -> char {
        match self {
            DecayChannel::Light => 'L',
            DecayChannel::Heavy => 'H',
        }
    }
}

impl fmt::Display for DecayChannel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DecayChannel {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "lightDecay" => Ok(DecayChannel::Light),
            "heavyDecay" => Ok(DecayChannel::Heavy),
            other => Err(Error::Validation(format!(
                "unknown decay type '{other}' (expected lightDecay or heavyDecay)"
            ))),
        }
    }
}

/// Which decay channels a grid plot covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecaySelection {
    /// A single channel.
    One(DecayChannel),
    /// Light first, then heavy.
    Both,
}

impl DecaySelection {
    /// Channels in processing order.
    pub fn channels(&self) -> Vec<DecayChannel> {
        match self {
            DecaySelection::One(ch) => vec![*ch],
            DecaySelection::Both => vec![DecayChannel::Light, DecayChannel::Heavy],
        }
    }

    /// Token used in output file names (`lightDecay`, `heavyDecay` or `both`).
    pub fn as_str(&self) -> &'static str {
        match self {
            DecaySelection::One(ch) => ch.as_str(),
            DecaySelection::Both => "both",
        }
    }
}

impl FromStr for DecaySelection {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        if s.eq_ignore_ascii_case("both") {
            return Ok(DecaySelection::Both);
        }
        s.parse().map(DecaySelection::One)
    }
}

/// Proper decay length token as it appears in file names (`0p1mm`, `10000mm`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CTau(String);

impl CTau {
    /// Wrap a raw token.
    pub fn new(token: impl Into<String>) -> Result<Self> {
        let token = token.into();
        let token = token.trim();
        if token.is_empty() {
            return Err(Error::Validation("empty ctau value".into()));
        }
        Ok(Self(token.to_string()))
    }

    /// Parse a comma-separated list (`"0p1mm, 1mm,10mm"`).
    pub fn parse_list(s: &str) -> Result<Vec<CTau>> {
        s.split(',').map(CTau::new).collect()
    }

    /// Raw token.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Short human-readable value in mm: `1000mm → 1k`, `10000mm → 10k`, `0p1mm → 0.1`.
    pub fn display(&self) -> String {
        match self.0.as_str() {
            "1000mm" => "1k".to_string(),
            "10000mm" => "10k".to_string(),
            other => other.replace("mm", "").replace('p', "."),
        }
    }

    /// Legend label of a ratio plot: `cτ = 0.1 mm (L)`.
    pub fn legend_label(&self, decay: DecayChannel) -> String {
        format!("c\u{03C4} = {} mm ({})", self.display(), decay.code())
    }

    /// Row label of a grid plot: `0.1 (L)`.
    pub fn grid_label(&self, decay: DecayChannel) -> String {
        format!("{} ({})", self.display(), decay.code())
    }
}

impl fmt::Display for CTau {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for CTau {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        CTau::new(s)
    }
}

/// One simulated signal parameter point.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignalPoint {
    /// Gluino mass in GeV.
    pub gluino_mass: u32,
    /// Neutralino mass in GeV.
    pub neutralino_mass: u32,
    /// Proper decay length token.
    pub ctau: CTau,
    /// Decay channel.
    pub decay: DecayChannel,
    /// Production era.
    pub era: String,
}

impl SignalPoint {
    /// Ntuple file name of this point.
    pub fn file_name(&self) -> String {
        format!(
            "gluino{}_chi10{}_{}_{}_{}.root",
            self.gluino_mass, self.neutralino_mass, self.ctau, self.decay, self.era
        )
    }
}

/// Default output name of a ratio plot (without extension).
pub fn ratio_output_name(
    hist_name: &str,
    gluino_mass: u32,
    neutralino_mass: u32,
    numerator: &CTau,
    denominator: &CTau,
    decay: DecayChannel,
) -> String {
    format!(
        "ratio_{hist_name}_gluino{gluino_mass}_chi10{neutralino_mass}_{numerator}_vs_{denominator}_{decay}"
    )
}

/// Default output name of a grid plot (without extension).
pub fn grid_output_name(
    hist_name: &str,
    gluino_mass: u32,
    neutralino_mass: u32,
    decays: DecaySelection,
    ctaus: &[CTau],
) -> String {
    let ctau_str = ctaus.iter().map(CTau::as_str).collect::<Vec<_>>().join("_");
    format!(
        "2D_{hist_name}_gluino{gluino_mass}_chi10{neutralino_mass}_{}_{ctau_str}",
        decays.as_str()
    )
}

//! Analysis tunables - grid resolution, search limits, roughness model.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Equal-tempered frequency grid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GridConfig {
    /// Steps per octave. 12 = semitones, 24 = quarter tones.
    /// Default: 24
    #[serde(default = "GridConfig::default_divisions")]
    pub divisions: u32,

    /// Reference pitch, always an exact grid entry.
    /// Default: 440.0
    #[serde(default = "GridConfig::default_reference_hz")]
    pub reference_hz: f64,

    /// Lowest audible frequency covered by the grid (C0).
    /// Default: 16.3515978313
    #[serde(default = "GridConfig::default_low_hz")]
    pub low_hz: f64,

    /// Upper bound of the grid.
    /// Default: 4300.0
    #[serde(default = "GridConfig::default_high_hz")]
    pub high_hz: f64,
}

impl GridConfig {
    fn default_divisions() -> u32 {
        24
    }

    fn default_reference_hz() -> f64 {
        440.0
    }

    fn default_low_hz() -> f64 {
        16.3515978313
    }

    fn default_high_hz() -> f64 {
        4300.0
    }
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            divisions: Self::default_divisions(),
            reference_hz: Self::default_reference_hz(),
            low_hz: Self::default_low_hz(),
            high_hz: Self::default_high_hz(),
        }
    }
}

/// Which subharmonic wins when overtone candidates score equally.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Tiebreak {
    /// Prefer the highest subharmonic (closest to the chord itself).
    #[default]
    Highest,
    /// Prefer the lowest subharmonic.
    Lowest,
}

impl fmt::Display for Tiebreak {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Tiebreak::Highest => write!(f, "highest"),
            Tiebreak::Lowest => write!(f, "lowest"),
        }
    }
}

impl FromStr for Tiebreak {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "highest" | "default" => Ok(Tiebreak::Highest),
            "lowest" => Ok(Tiebreak::Lowest),
            other => Err(format!("unknown tiebreak '{}', expected highest or lowest", other)),
        }
    }
}

/// Limits for the overtone and FM searches.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchConfig {
    /// Largest subharmonic divisor tried per chord note.
    /// Default: 10
    #[serde(default = "SearchConfig::default_max_subharmonics")]
    pub max_subharmonics: u32,

    /// Sidebands (K) precomputed per carrier/modulator pair.
    /// Default: 20
    #[serde(default = "SearchConfig::default_max_sidebands")]
    pub max_sidebands: usize,

    /// Overtone tie policy.
    #[serde(default)]
    pub tiebreak: Tiebreak,
}

impl SearchConfig {
    fn default_max_subharmonics() -> u32 {
        10
    }

    fn default_max_sidebands() -> usize {
        20
    }
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            max_subharmonics: Self::default_max_subharmonics(),
            max_sidebands: Self::default_max_sidebands(),
            tiebreak: Tiebreak::default(),
        }
    }
}

/// Coefficients of the Vassilakis roughness model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoughnessConfig {
    /// Exponential decay rate of the first term. Default: 3.5
    #[serde(default = "RoughnessConfig::default_b1")]
    pub b1: f64,

    /// Exponential decay rate of the second term. Default: 5.75
    #[serde(default = "RoughnessConfig::default_b2")]
    pub b2: f64,

    /// Slope of the critical-band scaling. Default: 0.0207
    #[serde(default = "RoughnessConfig::default_s1")]
    pub s1: f64,

    /// Offset of the critical-band scaling. Default: 18.96
    #[serde(default = "RoughnessConfig::default_s2")]
    pub s2: f64,

    /// Interval of maximum roughness. Default: 0.24
    #[serde(default = "RoughnessConfig::default_d_max")]
    pub d_max: f64,
}

impl RoughnessConfig {
    fn default_b1() -> f64 {
        3.5
    }

    fn default_b2() -> f64 {
        5.75
    }

    fn default_s1() -> f64 {
        0.0207
    }

    fn default_s2() -> f64 {
        18.96
    }

    fn default_d_max() -> f64 {
        0.24
    }
}

impl Default for RoughnessConfig {
    fn default() -> Self {
        Self {
            b1: Self::default_b1(),
            b2: Self::default_b2(),
            s1: Self::default_s1(),
            s2: Self::default_s2(),
            d_max: Self::default_d_max(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_grid_defaults() {
        let grid = GridConfig::default();
        assert_eq!(grid.divisions, 24);
        assert_eq!(grid.reference_hz, 440.0);
        assert!(grid.low_hz < grid.reference_hz);
        assert!(grid.high_hz > grid.reference_hz);
    }

    #[test]
    fn test_tiebreak_from_str() {
        assert_eq!("lowest".parse::<Tiebreak>().unwrap(), Tiebreak::Lowest);
        assert_eq!("Highest".parse::<Tiebreak>().unwrap(), Tiebreak::Highest);
        assert_eq!("default".parse::<Tiebreak>().unwrap(), Tiebreak::Highest);
        assert!("middle".parse::<Tiebreak>().is_err());
    }

    #[test]
    fn test_roughness_defaults() {
        let r = RoughnessConfig::default();
        assert_eq!(r.b1, 3.5);
        assert_eq!(r.b2, 5.75);
        assert_eq!(r.s1, 0.0207);
        assert_eq!(r.s2, 18.96);
        assert_eq!(r.d_max, 0.24);
    }
}

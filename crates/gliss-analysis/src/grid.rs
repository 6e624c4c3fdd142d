use glissconf::GridConfig;
use tracing::debug;

use crate::note::Spelling;
use crate::{Error, Result};

/// Slack for floating-point error when deciding whether a lattice point
/// sits on the configured bounds (C0 is 1e-11 Hz below the default LOW).
const BOUND_EPSILON: f64 = 1e-6;

/// Equal-tempered frequency lattice.
///
/// Entries are `reference_hz * 2^(k / divisions)` for every integer `k`
/// whose frequency falls inside `[low_hz, high_hz]`. The reference pitch is
/// always an exact entry. The grid is immutable once built.
#[derive(Debug, Clone, PartialEq)]
pub struct Grid {
    divisions: u32,
    reference_hz: f64,
    low_hz: f64,
    high_hz: f64,
    reference_index: usize,
    freqs: Vec<f64>,
}

impl Grid {
    /// Build the lattice described by `config`.
    pub fn new(config: &GridConfig) -> Result<Self> {
        let (low_hz, high_hz, reference_hz) = (config.low_hz, config.high_hz, config.reference_hz);

        if config.divisions == 0 {
            return Err(Error::InvalidDivisions(config.divisions));
        }
        let valid_range = low_hz.is_finite()
            && high_hz.is_finite()
            && low_hz > 0.0
            && low_hz <= reference_hz
            && reference_hz <= high_hz;
        if !valid_range {
            return Err(Error::InvalidRange {
                low: low_hz,
                high: high_hz,
            });
        }

        let grid = Self::build(config);
        debug!(
            divisions = grid.divisions,
            entries = grid.freqs.len(),
            lowest = grid.freqs[0],
            highest = grid.freqs[grid.freqs.len() - 1],
            "built frequency grid"
        );
        Ok(grid)
    }

    /// Lattice construction for an already validated config.
    fn build(config: &GridConfig) -> Self {
        let div = config.divisions as f64;
        let first = (div * (config.low_hz / config.reference_hz).log2() - BOUND_EPSILON).ceil() as i64;
        let last = (div * (config.high_hz / config.reference_hz).log2() + BOUND_EPSILON).floor() as i64;

        let freqs = (first..=last)
            .map(|k| config.reference_hz * 2f64.powf(k as f64 / div))
            .collect();

        Self {
            divisions: config.divisions,
            reference_hz: config.reference_hz,
            low_hz: config.low_hz,
            high_hz: config.high_hz,
            reference_index: (-first) as usize,
            freqs,
        }
    }

    /// Default range and reference with a different resolution.
    pub fn with_divisions(divisions: u32) -> Result<Self> {
        Self::new(&GridConfig {
            divisions,
            ..GridConfig::default()
        })
    }

    pub fn divisions(&self) -> u32 {
        self.divisions
    }

    pub fn reference_hz(&self) -> f64 {
        self.reference_hz
    }

    /// Position of the reference pitch in the lattice.
    pub fn reference_index(&self) -> usize {
        self.reference_index
    }

    /// Configured lower bound (LOW). Subharmonics below this are discarded.
    pub fn low_hz(&self) -> f64 {
        self.low_hz
    }

    /// Configured upper bound (HIGH).
    pub fn high_hz(&self) -> f64 {
        self.high_hz
    }

    pub fn len(&self) -> usize {
        self.freqs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.freqs.is_empty()
    }

    /// All lattice frequencies, ascending.
    pub fn frequencies(&self) -> &[f64] {
        &self.freqs
    }

    /// Frequency at a grid index.
    pub fn frequency(&self, step: usize) -> Option<f64> {
        self.freqs.get(step).copied()
    }

    /// Index of the lattice entry nearest to `freq` by absolute difference.
    ///
    /// Frequencies outside the lattice clamp to the first or last index.
    /// Exact midpoints resolve to the lower entry. Index 0 is an ordinary
    /// result: the lowest entry is reachable like any other.
    pub fn index(&self, freq: f64) -> usize {
        let last = self.freqs.len() - 1;
        let upper = self.freqs.partition_point(|&f| f < freq);
        if upper == 0 {
            return 0;
        }
        if upper > last {
            return last;
        }
        let below = upper - 1;
        if (freq - self.freqs[below]).abs() <= (self.freqs[upper] - freq).abs() {
            below
        } else {
            upper
        }
    }

    /// Vectorized [`Grid::index`].
    pub fn indices(&self, freqs: &[f64]) -> Vec<usize> {
        freqs.iter().map(|&f| self.index(f)).collect()
    }

    /// Nearest lattice frequency.
    pub fn snap(&self, freq: f64) -> f64 {
        self.freqs[self.index(freq)]
    }

    /// Lattice entries between two frequencies (inclusive), ordered from
    /// `start` towards `end`. This is the pitch set a glissando between the
    /// two frequencies passes through.
    pub fn range(&self, start: f64, end: f64) -> Vec<f64> {
        let (low, high) = if start <= end { (start, end) } else { (end, start) };
        let mut notes: Vec<f64> = self
            .freqs
            .iter()
            .copied()
            .filter(|&f| f >= low && f <= high)
            .collect();
        if start > end {
            notes.reverse();
        }
        notes
    }

    /// Note spelling matching the lattice resolution.
    pub fn spelling(&self) -> Spelling {
        if self.divisions == 12 {
            Spelling::Semitone
        } else {
            Spelling::QuarterTone
        }
    }
}

impl Default for Grid {
    /// The quarter-tone grid from C0 to 4300 Hz around A440.
    fn default() -> Self {
        Self::build(&GridConfig::default())
    }
}

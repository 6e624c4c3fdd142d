//! Carrier/modulator sideband search.
//!
//! A [`SidebandTable`] holds, for every ordered pair of grid frequencies
//! `(carrier, modulator)`, the first `K` sum tones `c + k·m`, the first `K`
//! difference tones `|c - k·m|` and the carrier, both as frequencies and as
//! grid steps. It is built once and only read afterwards, so one table can
//! serve any number of searches, including from several threads.

use serde::{Deserialize, Serialize};
use tracing::{debug, info, trace};

use crate::chord::Chord;
use crate::distance::chord_distance;
use crate::grid::Grid;
use crate::roughness::RoughnessModel;
use crate::{Error, Result};

/// Sum tones, difference tones and carrier of one carrier/modulator pair,
/// in table order.
fn sideband_tones(carrier: f64, modulator: f64, sidebands: usize) -> Vec<f64> {
    let mut tones = Vec::with_capacity(2 * sidebands + 1);
    tones.extend((1..=sidebands).map(|k| carrier + k as f64 * modulator));
    tones.extend((1..=sidebands).map(|k| (carrier - k as f64 * modulator).abs()));
    tones.push(carrier);
    tones
}

/// Precomputed sidebands for every grid pair.
#[derive(Debug, Clone)]
pub struct SidebandTable {
    grid: Grid,
    sidebands: usize,
    tones: Vec<f64>,
    steps: Vec<usize>,
}

impl SidebandTable {
    /// Tabulate `sidebands` sum and difference tones for every pair of
    /// entries in `grid`.
    pub fn build(grid: &Grid, sidebands: usize) -> Result<Self> {
        if sidebands == 0 {
            return Err(Error::SidebandsOutOfRange {
                requested: 0,
                available: 0,
            });
        }

        let freqs = grid.frequencies();
        let width = 2 * sidebands + 1;
        let mut tones = Vec::with_capacity(freqs.len() * freqs.len() * width);
        for &carrier in freqs {
            for &modulator in freqs {
                tones.extend(sideband_tones(carrier, modulator, sidebands));
            }
        }
        let steps = grid.indices(&tones);

        info!(
            grid_size = freqs.len(),
            sidebands,
            entries = tones.len(),
            "built sideband table"
        );

        Ok(Self {
            grid: grid.clone(),
            sidebands,
            tones,
            steps,
        })
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    /// The `K` the table was built with.
    pub fn sidebands(&self) -> usize {
        self.sidebands
    }

    fn width(&self) -> usize {
        2 * self.sidebands + 1
    }

    fn offset(&self, carrier: usize, modulator: usize) -> usize {
        (carrier * self.grid.len() + modulator) * self.width()
    }

    /// `[sum_1..K, diff_1..K, carrier]` for a pair of grid indices.
    pub fn tones(&self, carrier: usize, modulator: usize) -> &[f64] {
        let start = self.offset(carrier, modulator);
        &self.tones[start..start + self.width()]
    }

    /// Grid steps of [`SidebandTable::tones`].
    pub fn steps(&self, carrier: usize, modulator: usize) -> &[usize] {
        let start = self.offset(carrier, modulator);
        &self.steps[start..start + self.width()]
    }

    /// Steps of a pair restricted to the first `k` sidebands on each side.
    fn truncated_steps(&self, carrier: usize, modulator: usize, k: usize) -> Vec<usize> {
        truncate(self.steps(carrier, modulator), self.sidebands, k)
    }
}

/// Keep the first `k` sums, the first `k` differences and the carrier of a
/// row laid out with `full` sidebands per side.
fn truncate<T: Copy>(row: &[T], full: usize, k: usize) -> Vec<T> {
    let mut out = Vec::with_capacity(2 * k + 1);
    out.extend_from_slice(&row[..k]);
    out.extend_from_slice(&row[full..full + k]);
    out.push(row[2 * full]);
    out
}

/// One input note that coincides with a sideband.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SidebandMatch {
    /// The input note.
    pub frequency: f64,
    /// `+k` for the k-th sum tone, `-k` for the k-th difference tone, 0 for
    /// the carrier.
    pub sideband: i32,
    /// The sideband frequency it coincides with.
    pub tone: f64,
}

/// A chord made of a carrier, its sum tones and its difference tones.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FmChord {
    /// Every tone of the sideband set, ascending.
    pub chord: Chord,
    pub carrier: f64,
    pub modulator: f64,
    pub sidebands: usize,
}

impl FmChord {
    /// Sideband chord of `carrier` and `modulator`, both clamped to the
    /// grid's range.
    pub fn new(grid: &Grid, carrier: f64, modulator: f64, sidebands: usize) -> Self {
        let carrier = carrier.clamp(grid.low_hz(), grid.high_hz());
        let modulator = modulator.clamp(grid.low_hz(), grid.high_hz());
        let chord = Chord::new(grid, sideband_tones(carrier, modulator, sidebands), 1.0);
        Self {
            chord,
            carrier,
            modulator,
            sidebands,
        }
    }

    /// `carrier + k·modulator` for k = 1..=sidebands.
    pub fn sum_tones(&self) -> Vec<f64> {
        (1..=self.sidebands)
            .map(|k| self.carrier + k as f64 * self.modulator)
            .collect()
    }

    /// `|carrier - k·modulator|` for k = 1..=sidebands.
    pub fn difference_tones(&self) -> Vec<f64> {
        (1..=self.sidebands)
            .map(|k| (self.carrier - k as f64 * self.modulator).abs())
            .collect()
    }

    /// Sum tones, then difference tones, then the carrier.
    pub fn full_tones(&self) -> Vec<f64> {
        sideband_tones(self.carrier, self.modulator, self.sidebands)
    }

    /// Notes of `target` that share a grid step with a sideband. Each note
    /// reports the first sideband it lands on, searching the carrier first,
    /// then sum and difference tones by increasing order.
    pub fn sideband_matches(&self, grid: &Grid, target: &Chord) -> Vec<SidebandMatch> {
        let mut labelled = vec![(0i32, self.carrier)];
        for (k, (sum, diff)) in self
            .sum_tones()
            .into_iter()
            .zip(self.difference_tones())
            .enumerate()
        {
            let k = k as i32 + 1;
            labelled.push((k, sum));
            labelled.push((-k, diff));
        }

        target
            .frequencies()
            .iter()
            .filter_map(|&frequency| {
                let step = grid.index(frequency);
                labelled
                    .iter()
                    .find(|(_, tone)| grid.index(*tone) == step)
                    .map(|&(sideband, tone)| SidebandMatch {
                        frequency,
                        sideband,
                        tone,
                    })
            })
            .collect()
    }
}

/// One best-fitting carrier/modulator pair.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FmSolution {
    /// Chord distance between the input and the sideband set.
    pub distance: usize,
    /// Roughness of the full sideband set.
    pub roughness: f64,
    pub chord: FmChord,
}

/// Carrier/modulator pairs whose sidebands best explain `chord`.
///
/// Pairs are first narrowed to those that bring at least one note as close
/// as any pair can. Each survivor is scored by [`chord_distance`] between
/// the chord and its sideband steps (carrier included); every pair at the
/// lowest score is returned, ordered by roughness, then carrier, then
/// modulator. `sidebands` limits the search to the first `k` sidebands on
/// each side (default: all of the table's).
pub fn nearest_fm_chord(
    table: &SidebandTable,
    chord: &Chord,
    sidebands: Option<usize>,
    roughness: &RoughnessModel,
) -> Result<Vec<FmSolution>> {
    if chord.is_empty() {
        return Err(Error::EmptyChord);
    }
    let k = sidebands.unwrap_or(table.sidebands());
    if k == 0 || k > table.sidebands() {
        return Err(Error::SidebandsOutOfRange {
            requested: k,
            available: table.sidebands(),
        });
    }

    let grid = table.grid();
    let targets = grid.indices(chord.frequencies());
    let size = grid.len();

    // per pair, per note: distance to the nearest sideband step
    let mut pair_mins = Vec::with_capacity(size * size * targets.len());
    let mut global_mins = vec![usize::MAX; targets.len()];
    for c in 0..size {
        for m in 0..size {
            let steps = table.truncated_steps(c, m, k);
            for (i, &t) in targets.iter().enumerate() {
                let d = steps.iter().map(|&s| s.abs_diff(t)).min().unwrap_or(usize::MAX);
                global_mins[i] = global_mins[i].min(d);
                pair_mins.push(d);
            }
        }
    }

    let mut best = usize::MAX;
    let mut winners: Vec<(usize, usize)> = Vec::new();
    let mut candidates = 0usize;
    for (pair, mins) in pair_mins.chunks(targets.len()).enumerate() {
        if !mins.iter().zip(&global_mins).any(|(d, g)| d == g) {
            continue;
        }
        candidates += 1;
        let (c, m) = (pair / size, pair % size);
        let distance = chord_distance(&targets, &table.truncated_steps(c, m, k));
        trace!(carrier = c, modulator = m, distance, "fm candidate");
        if distance < best {
            best = distance;
            winners.clear();
        }
        if distance == best {
            winners.push((c, m));
        }
    }

    let mut solutions: Vec<FmSolution> = winners
        .into_iter()
        .map(|(c, m)| {
            let tones = truncate(table.tones(c, m), table.sidebands(), k);
            let carrier = grid.frequencies()[c];
            let modulator = grid.frequencies()[m];
            FmSolution {
                distance: best,
                roughness: roughness.roughness(&tones),
                chord: FmChord {
                    chord: Chord::new(grid, tones, chord.duration()),
                    carrier,
                    modulator,
                    sidebands: k,
                },
            }
        })
        .collect();

    solutions.sort_by(|a, b| {
        a.roughness
            .total_cmp(&b.roughness)
            .then(a.chord.carrier.total_cmp(&b.chord.carrier))
            .then(a.chord.modulator.total_cmp(&b.chord.modulator))
    });

    debug!(
        candidates,
        solutions = solutions.len(),
        distance = best,
        sidebands = k,
        "resolved fm chord"
    );
    Ok(solutions)
}

use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::chord::Chord;
use crate::grid::Grid;
use crate::{Error, Result};

/// Partial numbers `0..MAX_INHARMONIC_TONES` generate the sum and difference
/// tones of a carrier/modulator pair.
pub const MAX_INHARMONIC_TONES: usize = 200;

/// Tones at or below this are inaudible and dropped.
const AUDIBLE_FLOOR_HZ: f64 = 16.0;

/// How carriers are chosen for the greedy search.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CarrierMode {
    /// Every ordered pair of distinct chord notes as carrier and modulator.
    #[default]
    ChordNotes,
    /// The mean half-interval over all note pairs as the carrier, each
    /// chord note as the modulator.
    AverageInterval,
}

/// Result of [`nearest_inharmonic`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InharmonicMatch {
    /// One tone per input note, as assigned greedily.
    pub chord: Chord,
    /// [`Chord::distance`] from the input to `chord`.
    pub distance: usize,
    pub carrier: f64,
    pub modulator: f64,
}

/// Nearest inharmonic chord by greedy assignment.
///
/// For each carrier/modulator pair the tones `i·mod + carrier` and
/// `|i·mod - carrier|` are snapped to the grid and deduplicated within each
/// series, so a tone present in both can be assigned twice. Input notes,
/// lowest first, each take the remaining tone closest in Hz. The first pair
/// with the strictly smallest distance wins.
pub fn nearest_inharmonic(grid: &Grid, chord: &Chord, mode: CarrierMode) -> Result<InharmonicMatch> {
    if chord.len() < 2 {
        return Err(Error::TooFewNotes {
            needed: 2,
            got: chord.len(),
        });
    }

    let notes = chord.frequencies();
    let pairs: Vec<(f64, f64)> = match mode {
        CarrierMode::ChordNotes => notes
            .iter()
            .flat_map(|&c| notes.iter().map(move |&m| (c, m)))
            .filter(|(c, m)| c != m)
            .collect(),
        CarrierMode::AverageInterval => {
            let carrier = average_half_interval(notes);
            notes.iter().map(|&m| (carrier, m)).collect()
        }
    };

    let mut best: Option<InharmonicMatch> = None;
    for (carrier, modulator) in pairs {
        let mut pool = Chord::new(grid, inharmonic_tones(grid, carrier, modulator), 0.0);
        let mut matched = Vec::with_capacity(notes.len());
        for &note in notes {
            let Some(tone) = pool.closest(note) else {
                break;
            };
            matched.push(tone);
            pool.remove(tone);
        }

        let matched = Chord::new(grid, matched, chord.duration());
        let distance = chord.distance(&matched);
        trace!(carrier, modulator, distance, "inharmonic candidate");

        if best.as_ref().map_or(true, |b| distance < b.distance) {
            best = Some(InharmonicMatch {
                chord: matched,
                distance,
                carrier,
                modulator,
            });
        }
    }

    // at least two distinct notes give at least one pair; equal notes give none
    let best = best.ok_or(Error::NoCandidate)?;
    debug!(
        carrier = best.carrier,
        modulator = best.modulator,
        distance = best.distance,
        ?mode,
        "resolved inharmonic chord"
    );
    Ok(best)
}

/// Audible sum tones followed by audible difference tones of a pair,
/// snapped to the grid. Each series holds a grid step at most once.
fn inharmonic_tones(grid: &Grid, carrier: f64, modulator: f64) -> Vec<f64> {
    let sums = (0..MAX_INHARMONIC_TONES).map(|i| i as f64 * modulator + carrier);
    let diffs = (0..MAX_INHARMONIC_TONES).map(|i| (i as f64 * modulator - carrier).abs());

    let mut tones = snapped_series(grid, sums);
    tones.extend(snapped_series(grid, diffs));
    tones
}

fn snapped_series(grid: &Grid, series: impl Iterator<Item = f64>) -> Vec<f64> {
    let mut seen = vec![false; grid.len()];
    let mut tones = Vec::new();
    for freq in series.filter(|&f| f > AUDIBLE_FLOOR_HZ) {
        let step = grid.index(freq);
        if !seen[step] {
            seen[step] = true;
            tones.push(grid.frequencies()[step]);
        }
    }
    tones
}

/// Mean of `|a - b| / 2` over all unordered note pairs.
fn average_half_interval(notes: &[f64]) -> f64 {
    let mut total = 0.0;
    let mut count = 0usize;
    for (i, &a) in notes.iter().enumerate() {
        for &b in &notes[i + 1..] {
            total += (a - b).abs() / 2.0;
            count += 1;
        }
    }
    if count == 0 {
        0.0
    } else {
        total / count as f64
    }
}

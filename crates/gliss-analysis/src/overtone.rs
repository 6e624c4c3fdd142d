use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::chord::Chord;
use crate::grid::Grid;
use crate::{Error, Result, Tiebreak};

/// A chord explained as partials of a single fundamental.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OvertoneChord {
    /// The nearest harmonic of the fundamental for each input note.
    pub chord: Chord,
    /// Unquantized subharmonic the series was built from.
    pub fundamental: f64,
    /// Summed grid-step error between the input and `chord`.
    pub steps: usize,
}

impl OvertoneChord {
    /// The first `n` partials of the fundamental, starting with the
    /// fundamental itself.
    pub fn partials(&self, n: usize) -> Vec<f64> {
        (1..=n).map(|k| k as f64 * self.fundamental).collect()
    }

    /// Notes of the chord that land on the same grid step as one of the
    /// first `n` partials, paired with the partial number.
    pub fn coincident_partials(&self, grid: &Grid, n: usize) -> Vec<(usize, f64)> {
        let partial_steps: Vec<usize> = grid.indices(&self.partials(n));
        self.chord
            .frequencies()
            .iter()
            .zip(self.chord.steps())
            .filter_map(|(&freq, step)| {
                partial_steps
                    .iter()
                    .position(|s| s == step)
                    .map(|i| (i + 1, freq))
            })
            .collect()
    }
}

struct Candidate {
    sub: f64,
    harmonics: Vec<f64>,
    score: usize,
}

/// Nearest overtone chord by subharmonic search.
///
/// Every note is divided by `1..=max_subharmonics`. Subharmonics below the
/// grid's lower bound are skipped; the rest snap to the grid and generate a
/// harmonic for each note (`round(note / sub) * sub`). The candidate whose
/// harmonics are positionally closest in grid steps wins; `tiebreak` picks
/// between equal scores by subharmonic height.
pub fn nearest_ot_chord(
    grid: &Grid,
    chord: &Chord,
    max_subharmonics: u32,
    tiebreak: Tiebreak,
) -> Result<OvertoneChord> {
    if chord.is_empty() {
        return Err(Error::EmptyChord);
    }

    if let [single] = chord.frequencies() {
        return Ok(OvertoneChord {
            chord: chord.clone(),
            fundamental: *single,
            steps: 0,
        });
    }

    let mut best: Option<Candidate> = None;
    let mut considered = 0usize;

    for &freq in chord.frequencies() {
        for k in 1..=max_subharmonics {
            let Some(sub) = subharmonic(grid, freq, k) else {
                continue;
            };
            considered += 1;

            let snapped = grid.snap(sub);
            let harmonics = nearest_harmonics(snapped, chord.frequencies());
            let score: usize = grid
                .indices(&harmonics)
                .iter()
                .zip(chord.steps())
                .map(|(h, t)| h.abs_diff(*t))
                .sum();
            trace!(sub, k, score, "overtone candidate");

            let replace = match &best {
                None => true,
                Some(b) if score < b.score => true,
                Some(b) if score == b.score => match tiebreak {
                    Tiebreak::Highest => sub > b.sub,
                    Tiebreak::Lowest => sub < b.sub,
                },
                Some(_) => false,
            };
            if replace {
                best = Some(Candidate {
                    sub,
                    harmonics,
                    score,
                });
            }
        }
    }

    let best = best.ok_or(Error::NoCandidate)?;
    debug!(
        considered,
        fundamental = best.sub,
        score = best.score,
        "resolved overtone chord"
    );

    Ok(OvertoneChord {
        chord: Chord::new(grid, best.harmonics, chord.duration()),
        fundamental: best.sub,
        steps: best.score,
    })
}

/// The multiple of `fundamental` nearest to each frequency. Frequencies
/// below half the fundamental round to 0 Hz.
fn nearest_harmonics(fundamental: f64, freqs: &[f64]) -> Vec<f64> {
    freqs
        .iter()
        .map(|&f| (f / fundamental).round() * fundamental)
        .collect()
}

/// `freq / k`, or `None` when it falls below the grid.
fn subharmonic(grid: &Grid, freq: f64, k: u32) -> Option<f64> {
    let sub = freq / k as f64;
    (sub >= grid.low_hz()).then_some(sub)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn harmonic_series_round_trip() {
        let grid = Grid::default();
        for f in [65.40639, 110.0, 146.83] {
            let chord = Chord::new(&grid, [f, 2.0 * f, 3.0 * f], 1.0);
            let ot = nearest_ot_chord(&grid, &chord, 3, Tiebreak::Highest).unwrap();
            assert_eq!(ot.chord.steps(), chord.steps());
            assert_eq!(ot.steps, 0);
            assert!((ot.fundamental - f).abs() < 1e-6, "{} vs {}", ot.fundamental, f);
        }
    }

    #[test]
    fn c_major_fits_exactly() {
        let grid = Grid::default();
        let chord = Chord::new(&grid, [261.63, 329.63, 392.00], 1.0);
        let ot = nearest_ot_chord(&grid, &chord, 10, Tiebreak::Highest).unwrap();
        assert_eq!(ot.steps, 0);
        assert_eq!(ot.chord.steps(), chord.steps());
        assert!(ot.fundamental < 261.63);
    }

    #[test]
    fn single_note_is_its_own_fundamental() {
        let grid = Grid::default();
        let chord = Chord::new(&grid, [440.0], 1.0);
        for tiebreak in [Tiebreak::Highest, Tiebreak::Lowest] {
            let ot = nearest_ot_chord(&grid, &chord, 10, tiebreak).unwrap();
            assert_eq!(ot.fundamental, 440.0);
            assert_eq!(ot.chord, chord);
        }
    }

    #[test]
    fn lowest_tiebreak_prefers_deeper_fundamental() {
        let grid = Grid::default();
        let chord = Chord::new(&grid, [220.0, 440.0, 660.0], 1.0);
        let high = nearest_ot_chord(&grid, &chord, 8, Tiebreak::Highest).unwrap();
        let low = nearest_ot_chord(&grid, &chord, 8, Tiebreak::Lowest).unwrap();
        assert_eq!(high.steps, low.steps);
        assert!(low.fundamental < high.fundamental);
    }

    #[test]
    fn harmonics_round_to_nearest_multiple() {
        assert_eq!(nearest_harmonics(100.0, &[190.0, 310.0]), vec![200.0, 300.0]);
        // below half the fundamental there is no partial to round to
        assert_eq!(nearest_harmonics(440.0, &[100.0, 880.0]), vec![0.0, 880.0]);
    }

    #[test]
    fn empty_chord_is_an_error() {
        let grid = Grid::default();
        let chord = Chord::new(&grid, Vec::<f64>::new(), 1.0);
        assert!(matches!(
            nearest_ot_chord(&grid, &chord, 4, Tiebreak::Highest),
            Err(Error::EmptyChord)
        ));
    }

    #[test]
    fn nothing_above_the_grid_floor() {
        let grid = Grid::default();
        let chord = Chord::new(&grid, [5.0, 8.0], 1.0);
        assert!(matches!(
            nearest_ot_chord(&grid, &chord, 4, Tiebreak::Highest),
            Err(Error::NoCandidate)
        ));
    }

    #[test]
    fn partials_and_coincidences() {
        let grid = Grid::default();
        let chord = Chord::new(&grid, [220.0, 330.0, 440.0], 1.0);
        let ot = nearest_ot_chord(&grid, &chord, 4, Tiebreak::Highest).unwrap();
        assert!((ot.fundamental - 110.0).abs() < 1e-9);

        let partials = ot.partials(4);
        assert_eq!(partials.len(), 4);
        assert!((partials[3] - 440.0).abs() < 1e-6);

        let numbers: Vec<usize> = ot
            .coincident_partials(&grid, 4)
            .iter()
            .map(|&(n, _)| n)
            .collect();
        assert_eq!(numbers, vec![2, 3, 4]);
    }
}

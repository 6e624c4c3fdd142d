use serde::{Deserialize, Serialize};
use std::fmt;

use crate::distance::directed_distance;
use crate::grid::Grid;
use crate::note::{Note, Spelling};

/// A set of simultaneous frequencies, kept in ascending order, with the
/// grid step of every frequency cached at construction.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Chord {
    frequencies: Vec<f64>,
    steps: Vec<usize>,
    duration: f64,
}

impl Chord {
    pub fn new(grid: &Grid, frequencies: impl IntoIterator<Item = f64>, duration: f64) -> Self {
        let mut frequencies: Vec<f64> = frequencies.into_iter().collect();
        frequencies.sort_by(f64::total_cmp);
        let steps = grid.indices(&frequencies);
        Self {
            frequencies,
            steps,
            duration,
        }
    }

    pub fn from_notes(grid: &Grid, notes: &[Note], duration: f64) -> Self {
        Self::new(grid, notes.iter().map(Note::frequency), duration)
    }

    pub fn len(&self) -> usize {
        self.frequencies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frequencies.is_empty()
    }

    /// Frequencies, ascending.
    pub fn frequencies(&self) -> &[f64] {
        &self.frequencies
    }

    /// Grid index of each frequency, same order as [`Chord::frequencies`].
    pub fn steps(&self) -> &[usize] {
        &self.steps
    }

    pub fn duration(&self) -> f64 {
        self.duration
    }

    pub fn highest(&self) -> Option<f64> {
        self.frequencies.last().copied()
    }

    pub fn lowest(&self) -> Option<f64> {
        self.frequencies.first().copied()
    }

    /// The note nearest to `target` in Hz (not in grid steps).
    /// The lower note wins an exact tie.
    pub fn closest(&self, target: f64) -> Option<f64> {
        let mut best: Option<(f64, f64)> = None;
        for &f in &self.frequencies {
            let d = (f - target).abs();
            if best.map_or(true, |(_, best_d)| d < best_d) {
                best = Some((f, d));
            }
        }
        best.map(|(f, _)| f)
    }

    /// Sum over this chord's notes of the step distance to the nearest
    /// note of `other`. Not symmetric when the chords differ in size.
    pub fn distance(&self, other: &Chord) -> usize {
        directed_distance(&self.steps, &other.steps)
    }

    /// Remove the first note equal to `note`. Returns whether one was found.
    pub fn remove(&mut self, note: f64) -> bool {
        match self.frequencies.iter().position(|&f| f == note) {
            Some(i) => {
                self.frequencies.remove(i);
                self.steps.remove(i);
                true
            }
            None => false,
        }
    }

    /// Equal after quantization to the grid.
    pub fn same_steps(&self, other: &Chord) -> bool {
        self.steps == other.steps
    }

    pub fn to_notes(&self, spelling: Spelling) -> Vec<Note> {
        self.frequencies
            .iter()
            .map(|&f| Note::from_frequency(f, spelling))
            .collect()
    }
}

impl PartialEq for Chord {
    /// Frequencies only; duration is ignored.
    fn eq(&self, other: &Self) -> bool {
        self.frequencies == other.frequencies
    }
}

impl fmt::Display for Chord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<String> = self
            .to_notes(Spelling::QuarterTone)
            .iter()
            .map(Note::to_string)
            .collect();
        f.write_str(&names.join(", "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn chord(grid: &Grid, names: &[&str]) -> Chord {
        let notes: Vec<Note> = names.iter().map(|n| n.parse().unwrap()).collect();
        Chord::from_notes(grid, &notes, 1.0)
    }

    #[test]
    fn sorted_on_construction() {
        let grid = Grid::default();
        let c = Chord::new(&grid, [392.0, 261.63, 329.63], 1.0);
        assert_eq!(c.frequencies(), &[261.63, 329.63, 392.0]);
        assert_eq!(c.steps().len(), c.len());
    }

    #[test]
    fn c_major_to_c_minor_is_two_steps() {
        let grid = Grid::default();
        let major = chord(&grid, &["C4", "E4", "G4"]);
        let minor = chord(&grid, &["C4", "E4b", "G4"]);
        assert_eq!(major.distance(&minor), 2);
    }

    #[test]
    fn raw_frequency_triads() {
        let grid = Grid::default();
        let major = Chord::new(&grid, [261.63, 329.63, 392.00], 1.0);
        let minor = Chord::new(&grid, [261.63, 311.13, 392.00], 1.0);
        assert_eq!(major.distance(&minor), 2);
    }

    #[test]
    fn distance_depends_on_direction() {
        let grid = Grid::default();
        let major = chord(&grid, &["C4", "E4", "G4"]);
        let minor7 = chord(&grid, &["C4", "E4b", "G4", "B4b"]);

        assert_eq!(major.distance(&minor7), 2);
        // Bb4 is six quarter tones above G4
        assert_eq!(minor7.distance(&major), 8);
    }

    #[test]
    fn highest_and_lowest() {
        let grid = Grid::default();
        let c = chord(&grid, &["E4", "C4", "G4"]);
        assert_eq!(c.highest(), Some("G4".parse::<Note>().unwrap().frequency()));
        assert_eq!(c.lowest(), Some("C4".parse::<Note>().unwrap().frequency()));

        let empty = Chord::new(&grid, Vec::<f64>::new(), 0.0);
        assert_eq!(empty.highest(), None);
        assert_eq!(empty.closest(440.0), None);
    }

    #[test]
    fn closest_by_frequency() {
        let grid = Grid::default();
        let c = chord(&grid, &["C4", "E4", "G4"]);
        let c_sharp = "C4#".parse::<Note>().unwrap().frequency();
        assert_eq!(c.closest(c_sharp), c.lowest());
    }

    #[test]
    fn remove_first_occurrence_only() {
        let grid = Grid::default();
        let mut c = Chord::new(&grid, [220.0, 440.0, 440.0], 1.0);
        assert!(c.remove(440.0));
        assert_eq!(c.frequencies(), &[220.0, 440.0]);
        assert_eq!(c.steps().len(), 2);

        assert!(!c.remove(330.0));
        assert_eq!(c.len(), 2);
    }

    #[test]
    fn equality_ignores_duration() {
        let grid = Grid::default();
        let a = Chord::new(&grid, [220.0, 440.0], 1.0);
        let b = Chord::new(&grid, [440.0, 220.0], 3.0);
        assert_eq!(a, b);
    }

    #[test]
    fn same_steps_after_quantization() {
        let grid = Grid::default();
        let a = Chord::new(&grid, [220.0, 440.0], 1.0);
        let b = Chord::new(&grid, [221.0, 439.0], 1.0);
        assert!(a != b);
        assert!(a.same_steps(&b));
    }

    #[test]
    fn display_uses_note_names() {
        let grid = Grid::default();
        let c = Chord::new(&grid, [261.63, 133.0, 440.0], 1.0);
        assert_eq!(c.to_string(), "C3+, C4, A4");
    }
}

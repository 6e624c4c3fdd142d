//! Quantized chord analysis.
//!
//! Chords of arbitrary frequencies are measured against an equal-tempered
//! [`Grid`] and explained by two generative models: an overtone series
//! ([`nearest_ot_chord`]) and a carrier/modulator sideband set
//! ([`nearest_fm_chord`]). [`calc_roughness`] scores any frequency set with
//! the Vassilakis roughness model.
//!
//! ```
//! use gliss_analysis::{nearest_ot_chord, Chord, Grid, Tiebreak};
//!
//! let grid = Grid::default();
//! let chord = Chord::new(&grid, [110.0, 220.0, 330.0], 1.0);
//! let ot = nearest_ot_chord(&grid, &chord, 3, Tiebreak::Highest).unwrap();
//! assert!((ot.fundamental - 110.0).abs() < 1e-9);
//! ```

pub mod chord;
pub mod distance;
pub mod fm;
pub mod grid;
pub mod inharmonic;
pub mod note;
pub mod overtone;
pub mod roughness;

pub use chord::Chord;
pub use distance::{chord_distance, directed_distance};
pub use fm::{nearest_fm_chord, FmChord, FmSolution, SidebandMatch, SidebandTable};
pub use glissconf::Tiebreak;
pub use grid::Grid;
pub use inharmonic::{nearest_inharmonic, CarrierMode, InharmonicMatch, MAX_INHARMONIC_TONES};
pub use note::{Accidental, Letter, Note, Spelling, MAX_OCTAVE};
pub use overtone::{nearest_ot_chord, OvertoneChord};
pub use roughness::{calc_roughness, RoughnessModel};

/// Errors from chord analysis operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("chord has no notes")]
    EmptyChord,

    #[error("need at least {needed} notes, chord has {got}")]
    TooFewNotes { needed: usize, got: usize },

    #[error("no subharmonic of the chord lies inside the grid")]
    NoCandidate,

    #[error("sideband count {requested} outside 1..={available}")]
    SidebandsOutOfRange { requested: usize, available: usize },

    #[error("grid divisions must be positive, got {0}")]
    InvalidDivisions(u32),

    #[error("invalid grid range {low} Hz .. {high} Hz")]
    InvalidRange { low: f64, high: f64 },

    #[error("cannot parse note name: {0}")]
    ParseNote(String),
}

pub type Result<T> = std::result::Result<T, Error>;

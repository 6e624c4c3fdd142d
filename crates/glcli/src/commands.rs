//! CLI command implementations

use anyhow::{Context, Result};
use gliss_analysis::{
    nearest_fm_chord, nearest_inharmonic, nearest_ot_chord, CarrierMode, Chord, Grid, Note,
    RoughnessModel, SidebandTable, Tiebreak,
};
use glissconf::{ConfigSources, GlissConfig};
use serde::Serialize;

/// Output format shared by all commands.
#[derive(Debug, Clone, Copy)]
pub struct Output {
    pub json: bool,
}

impl Output {
    fn emit<T: Serialize>(&self, value: &T, human: impl FnOnce() -> String) -> Result<()> {
        if self.json {
            println!("{}", serde_json::to_string_pretty(value)?);
        } else {
            println!("{}", human());
        }
        Ok(())
    }
}

/// Accept either a frequency in Hz or a note name.
pub fn parse_pitch(s: &str) -> Result<f64, String> {
    let freq = match s.parse::<f64>() {
        Ok(freq) => freq,
        Err(_) => s
            .parse::<Note>()
            .map(|n| n.frequency())
            .map_err(|e| format!("'{}' is neither a frequency nor a note name ({})", s, e))?,
    };
    if !(freq.is_finite() && freq > 0.0) {
        return Err(format!("frequency must be positive, got {}", s));
    }
    Ok(freq)
}

fn build_grid(config: &GlissConfig) -> Result<Grid> {
    Grid::new(&config.grid).context("Invalid grid configuration")
}

fn names(chord: &Chord, grid: &Grid) -> String {
    chord
        .to_notes(grid.spelling())
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(" ")
}

fn hz_list(freqs: &[f64]) -> String {
    freqs
        .iter()
        .map(|f| format!("{:.2}", f))
        .collect::<Vec<_>>()
        .join(" ")
}

#[derive(Serialize)]
struct GridSummary {
    divisions: u32,
    entries: usize,
    reference_hz: f64,
    reference_index: usize,
    lowest: f64,
    highest: f64,
}

/// Print grid size and bounds
pub fn grid(config: &GlissConfig, out: Output) -> Result<()> {
    let grid = build_grid(config)?;
    let summary = GridSummary {
        divisions: grid.divisions(),
        entries: grid.len(),
        reference_hz: grid.reference_hz(),
        reference_index: grid.reference_index(),
        lowest: grid.frequencies()[0],
        highest: grid.frequencies()[grid.len() - 1],
    };
    out.emit(&summary, || {
        format!(
            "divisions: {}\nentries: {}\nreference: {} Hz at index {}\nrange: {:.4} Hz .. {:.4} Hz",
            summary.divisions,
            summary.entries,
            summary.reference_hz,
            summary.reference_index,
            summary.lowest,
            summary.highest
        )
    })
}

#[derive(Serialize)]
struct NamedPitch {
    frequency: f64,
    step: usize,
    note: String,
}

/// Print the note name and grid step of each frequency
pub fn notes(config: &GlissConfig, freqs: &[f64], out: Output) -> Result<()> {
    let grid = build_grid(config)?;
    let rows: Vec<NamedPitch> = freqs
        .iter()
        .map(|&frequency| NamedPitch {
            frequency,
            step: grid.index(frequency),
            note: Note::from_frequency(frequency, grid.spelling()).to_string(),
        })
        .collect();
    out.emit(&rows, || {
        rows.iter()
            .map(|r| format!("{:>10.2} Hz  {:<5} step {}", r.frequency, r.note, r.step))
            .collect::<Vec<_>>()
            .join("\n")
    })
}

/// Print total roughness
pub fn roughness(config: &GlissConfig, freqs: &[f64], out: Output) -> Result<()> {
    let model = RoughnessModel::from(&config.roughness);
    let value = model.roughness(freqs);
    out.emit(&value, || format!("{:.6}", value))
}

/// Resolve the nearest overtone chord
pub fn overtone(
    config: &GlissConfig,
    freqs: &[f64],
    max_sub: Option<u32>,
    lowest: bool,
    out: Output,
) -> Result<()> {
    let grid = build_grid(config)?;
    let chord = Chord::new(&grid, freqs.iter().copied(), 1.0);
    let tiebreak = if lowest {
        Tiebreak::Lowest
    } else {
        config.search.tiebreak
    };
    let max_sub = max_sub.unwrap_or(config.search.max_subharmonics);

    let ot = nearest_ot_chord(&grid, &chord, max_sub, tiebreak)?;
    out.emit(&ot, || {
        format!(
            "fundamental: {:.2} Hz ({})\nchord: {}\nhz: {}\nsteps off: {}",
            ot.fundamental,
            Note::from_frequency(ot.fundamental, grid.spelling()),
            names(&ot.chord, &grid),
            hz_list(ot.chord.frequencies()),
            ot.steps
        )
    })
}

/// Resolve the nearest sideband chords
pub fn fm(
    config: &GlissConfig,
    freqs: &[f64],
    sidebands: Option<usize>,
    limit: usize,
    out: Output,
) -> Result<()> {
    let grid = build_grid(config)?;
    let table = SidebandTable::build(&grid, config.search.max_sidebands)?;
    let chord = Chord::new(&grid, freqs.iter().copied(), 1.0);
    let model = RoughnessModel::from(&config.roughness);

    let mut solutions = nearest_fm_chord(&table, &chord, sidebands, &model)?;
    let total = solutions.len();
    solutions.truncate(limit);

    out.emit(&solutions, || {
        let mut lines = vec![format!(
            "{} solution(s) at distance {}",
            total,
            solutions.first().map_or(0, |s| s.distance)
        )];
        for s in &solutions {
            let matches = s.chord.sideband_matches(&grid, &chord);
            let labels: Vec<String> = matches
                .iter()
                .map(|m| format!("{:.2}@{:+}", m.frequency, m.sideband))
                .collect();
            lines.push(format!(
                "carrier {:.2} Hz, modulator {:.2} Hz, roughness {:.4}  [{}]",
                s.chord.carrier,
                s.chord.modulator,
                s.roughness,
                labels.join(" ")
            ));
        }
        lines.join("\n")
    })
}

/// Greedy inharmonic search
pub fn inharmonic(config: &GlissConfig, freqs: &[f64], avg_carrier: bool, out: Output) -> Result<()> {
    let grid = build_grid(config)?;
    let chord = Chord::new(&grid, freqs.iter().copied(), 1.0);
    let mode = if avg_carrier {
        CarrierMode::AverageInterval
    } else {
        CarrierMode::ChordNotes
    };

    let found = nearest_inharmonic(&grid, &chord, mode)?;
    out.emit(&found, || {
        format!(
            "carrier: {:.2} Hz\nmodulator: {:.2} Hz\nchord: {}\nhz: {}\ndistance: {}",
            found.carrier,
            found.modulator,
            names(&found.chord, &grid),
            hz_list(found.chord.frequencies()),
            found.distance
        )
    })
}

/// Print the effective configuration, with its sources as comments
pub fn show_config(config: &GlissConfig, sources: &ConfigSources) {
    for path in &sources.files {
        println!("# loaded: {}", path.display());
    }
    for var in &sources.env_overrides {
        println!("# env: {}", var);
    }
    print!("{}", config.to_toml());
}

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use crate::Error;

/// Quarter tones per octave used for note spelling.
const QUARTERS_PER_OCTAVE: i64 = 24;

/// Largest octave number, in either direction, a note name may carry.
pub const MAX_OCTAVE: i32 = 100;

/// Quarter-tone span of `MAX_OCTAVE` octaves either side of A4.
const MAX_STEPS: i64 = MAX_OCTAVE as i64 * QUARTERS_PER_OCTAVE;

/// Concert pitch of A4, the origin of note steps.
const A4_HZ: f64 = 440.0;

/// Quarter-tone names from C upward, in sharp-side spelling.
const QUARTER_TONE_NAMES: [(Letter, Accidental); 24] = [
    (Letter::C, Accidental::Natural),
    (Letter::C, Accidental::QuarterSharp),
    (Letter::C, Accidental::Sharp),
    (Letter::C, Accidental::ThreeQuarterSharp),
    (Letter::D, Accidental::Natural),
    (Letter::D, Accidental::QuarterSharp),
    (Letter::D, Accidental::Sharp),
    (Letter::D, Accidental::ThreeQuarterSharp),
    (Letter::E, Accidental::Natural),
    (Letter::E, Accidental::QuarterSharp),
    (Letter::F, Accidental::Natural),
    (Letter::F, Accidental::QuarterSharp),
    (Letter::F, Accidental::Sharp),
    (Letter::F, Accidental::ThreeQuarterSharp),
    (Letter::G, Accidental::Natural),
    (Letter::G, Accidental::QuarterSharp),
    (Letter::G, Accidental::Sharp),
    (Letter::G, Accidental::ThreeQuarterSharp),
    (Letter::A, Accidental::Natural),
    (Letter::A, Accidental::QuarterSharp),
    (Letter::A, Accidental::Sharp),
    (Letter::A, Accidental::ThreeQuarterSharp),
    (Letter::B, Accidental::Natural),
    (Letter::B, Accidental::QuarterSharp),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Letter {
    C,
    D,
    E,
    F,
    G,
    A,
    B,
}

impl Letter {
    /// Quarter tones from A in the same octave.
    fn offset(self) -> i64 {
        match self {
            Letter::C => -18,
            Letter::D => -14,
            Letter::E => -10,
            Letter::F => -8,
            Letter::G => -4,
            Letter::A => 0,
            Letter::B => 4,
        }
    }

    fn from_char(c: char) -> Option<Self> {
        match c.to_ascii_uppercase() {
            'C' => Some(Letter::C),
            'D' => Some(Letter::D),
            'E' => Some(Letter::E),
            'F' => Some(Letter::F),
            'G' => Some(Letter::G),
            'A' => Some(Letter::A),
            'B' => Some(Letter::B),
            _ => None,
        }
    }
}

impl fmt::Display for Letter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Letter::C => "C",
            Letter::D => "D",
            Letter::E => "E",
            Letter::F => "F",
            Letter::G => "G",
            Letter::A => "A",
            Letter::B => "B",
        };
        f.write_str(s)
    }
}

/// Quarter-tone aware accidentals.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Accidental {
    /// `--`
    ThreeQuarterFlat,
    /// `b`
    Flat,
    /// `-`
    QuarterFlat,
    #[default]
    Natural,
    /// `+`
    QuarterSharp,
    /// `#`
    Sharp,
    /// `++`
    ThreeQuarterSharp,
}

impl Accidental {
    /// Offset in quarter tones.
    pub fn quarter_tones(self) -> i64 {
        match self {
            Accidental::ThreeQuarterFlat => -3,
            Accidental::Flat => -2,
            Accidental::QuarterFlat => -1,
            Accidental::Natural => 0,
            Accidental::QuarterSharp => 1,
            Accidental::Sharp => 2,
            Accidental::ThreeQuarterSharp => 3,
        }
    }

    pub fn symbol(self) -> &'static str {
        match self {
            Accidental::ThreeQuarterFlat => "--",
            Accidental::Flat => "b",
            Accidental::QuarterFlat => "-",
            Accidental::Natural => "",
            Accidental::QuarterSharp => "+",
            Accidental::Sharp => "#",
            Accidental::ThreeQuarterSharp => "++",
        }
    }

    fn from_symbol(s: &str) -> Option<Self> {
        match s {
            "--" => Some(Accidental::ThreeQuarterFlat),
            "b" => Some(Accidental::Flat),
            "-" => Some(Accidental::QuarterFlat),
            "" => Some(Accidental::Natural),
            "+" => Some(Accidental::QuarterSharp),
            "#" => Some(Accidental::Sharp),
            "++" => Some(Accidental::ThreeQuarterSharp),
            _ => None,
        }
    }
}

/// Resolution used when naming an arbitrary frequency.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Spelling {
    /// Nearest semitone: naturals and sharps only.
    Semitone,
    /// Nearest quarter tone: adds `+` and `++`.
    QuarterTone,
}

/// A named pitch: letter, octave (C-based, A4 = 440 Hz) and accidental.
///
/// Two notes are equal when they sound the same, so `E#4 == F4`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Note {
    pub letter: Letter,
    pub octave: i32,
    pub accidental: Accidental,
}

impl Note {
    pub fn new(letter: Letter, octave: i32, accidental: Accidental) -> Self {
        Self {
            letter,
            octave,
            accidental,
        }
    }

    pub fn natural(letter: Letter, octave: i32) -> Self {
        Self::new(letter, octave, Accidental::Natural)
    }

    /// Quarter tones from A4.
    pub fn steps(&self) -> i64 {
        (i64::from(self.octave) - 4) * QUARTERS_PER_OCTAVE
            + self.letter.offset()
            + self.accidental.quarter_tones()
    }

    pub fn frequency(&self) -> f64 {
        A4_HZ * 2f64.powf(self.steps() as f64 / QUARTERS_PER_OCTAVE as f64)
    }

    /// Distance in quarter tones.
    pub fn distance(&self, other: &Note) -> u64 {
        self.steps().abs_diff(other.steps())
    }

    /// Name the pitch nearest to `freq`.
    ///
    /// Frequencies beyond `MAX_OCTAVE` octaves of A4 (including 0 Hz and
    /// infinity) saturate at the outermost name; NaN names A4.
    pub fn from_frequency(freq: f64, spelling: Spelling) -> Self {
        let limit = MAX_STEPS as f64;
        let exact = (QUARTERS_PER_OCTAVE as f64 * (freq / A4_HZ).log2()).clamp(-limit, limit);
        let steps = match spelling {
            Spelling::QuarterTone => exact.round() as i64,
            Spelling::Semitone => (exact / 2.0).round() as i64 * 2,
        };
        Self::from_steps(steps)
    }

    /// Sharp-side spelling of a quarter-tone step count relative to A4.
    /// Counts beyond `MAX_OCTAVE` octaves saturate.
    pub fn from_steps(steps: i64) -> Self {
        let steps = steps.clamp(-MAX_STEPS, MAX_STEPS);
        // count from C4, which sits 18 quarter tones below A4
        let from_c4 = steps - Letter::C.offset();
        let octave = 4 + from_c4.div_euclid(QUARTERS_PER_OCTAVE) as i32;
        let (letter, accidental) = QUARTER_TONE_NAMES[from_c4.rem_euclid(QUARTERS_PER_OCTAVE) as usize];
        Self::new(letter, octave, accidental)
    }
}

impl PartialEq for Note {
    fn eq(&self, other: &Self) -> bool {
        self.steps() == other.steps()
    }
}

impl Eq for Note {}

impl PartialOrd for Note {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Note {
    fn cmp(&self, other: &Self) -> Ordering {
        self.steps().cmp(&other.steps())
    }
}

impl fmt::Display for Note {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}{}", self.letter, self.octave, self.accidental.symbol())
    }
}

impl FromStr for Note {
    type Err = Error;

    /// Parses `C4`, `E4b`, `F4+`, `B3++`, `C-1`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let bad = || Error::ParseNote(s.to_string());

        let mut chars = s.chars();
        let letter = chars.next().and_then(Letter::from_char).ok_or_else(bad)?;
        let rest = chars.as_str();

        // a leading '-' directly before digits is a negative octave
        let (negative, rest) = match rest.strip_prefix('-') {
            Some(tail) if tail.starts_with(|c: char| c.is_ascii_digit()) => (true, tail),
            _ => (false, rest),
        };
        let digits = rest.chars().take_while(|c| c.is_ascii_digit()).count();
        if digits == 0 {
            return Err(bad());
        }
        let octave: i32 = rest[..digits].parse().map_err(|_| bad())?;
        if octave > MAX_OCTAVE {
            return Err(bad());
        }
        let octave = if negative { -octave } else { octave };
        let accidental = Accidental::from_symbol(&rest[digits..]).ok_or_else(bad)?;

        Ok(Self::new(letter, octave, accidental))
    }
}

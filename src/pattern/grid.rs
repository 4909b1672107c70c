//! Rhythm grids: Fixed-length symbol strings over a subdivision.
//!
//! `x` hit, `X` or `>` accent, `g` ghost, `-` `.` `_` rest. Spaces and `|`
//! are visual separators and are ignored.

use serde::{Deserialize, Serialize};

use crate::error::StyleError;
use crate::event::{Beat, TICKS_PER_BEAT};

/// Grid step length.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Subdivision {
    Quarter,
    Eighth,
    #[default]
    Sixteenth,
    EighthTriplet,
    SixteenthTriplet,
}

impl Subdivision {
    /// Length of one step in quarter-note ticks.
    pub fn step(self) -> Beat {
        let ticks = match self {
            Subdivision::Quarter => TICKS_PER_BEAT,
            Subdivision::Eighth => TICKS_PER_BEAT / 2,
            Subdivision::Sixteenth => TICKS_PER_BEAT / 4,
            Subdivision::EighthTriplet => TICKS_PER_BEAT / 3,
            Subdivision::SixteenthTriplet => TICKS_PER_BEAT / 6,
        };
        Beat::from_ticks(ticks)
    }
}

/// One grid cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GridSymbol {
    Rest,
    Hit,
    Accent,
    Ghost,
}

impl GridSymbol {
    /// Parse one character. `Ok(None)` for separators.
    fn from_char(c: char) -> Result<Option<Self>, char> {
        match c {
            'x' => Ok(Some(GridSymbol::Hit)),
            'X' | '>' => Ok(Some(GridSymbol::Accent)),
            'g' => Ok(Some(GridSymbol::Ghost)),
            '-' | '.' | '_' => Ok(Some(GridSymbol::Rest)),
            '|' => Ok(None),
            c if c.is_whitespace() => Ok(None),
            other => Err(other),
        }
    }

    pub fn is_rest(self) -> bool {
        self == GridSymbol::Rest
    }
}

/// A parsed grid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Grid {
    symbols: Vec<GridSymbol>,
}

impl Grid {
    /// Parse a grid string for `voice`.
    pub fn parse(voice: &str, text: &str) -> Result<Self, StyleError> {
        let mut symbols = Vec::with_capacity(text.len());
        for c in text.chars() {
            match GridSymbol::from_char(c) {
                Ok(Some(symbol)) => symbols.push(symbol),
                Ok(None) => {}
                Err(symbol) => {
                    return Err(StyleError::InvalidGridSymbol {
                        voice: voice.to_string(),
                        symbol,
                    })
                }
            }
        }
        if symbols.is_empty() {
            return Err(StyleError::EmptyGrid(voice.to_string()));
        }
        Ok(Self { symbols })
    }

    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }

    /// Symbol at a global step index; the grid repeats cyclically.
    pub fn at(&self, step: u64) -> GridSymbol {
        self.symbols[(step % self.symbols.len() as u64) as usize]
    }

    /// Number of steps from `step` to the next sounding step (at least 1,
    /// at most the grid length).
    pub fn steps_to_next_sound(&self, step: u64) -> u64 {
        let len = self.symbols.len() as u64;
        (1..len)
            .find(|&d| !self.at(step + d).is_rest())
            .unwrap_or(len)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn subdivision_steps() {
        assert_eq!(Subdivision::Quarter.step(), Beat::from_beats(1));
        assert_eq!(Subdivision::Eighth.step(), Beat::from_beats_f64(0.5));
        assert_eq!(Subdivision::Sixteenth.step(), Beat::from_beats_f64(0.25));
        assert_eq!(Subdivision::EighthTriplet.step().ticks(), 320);
        assert_eq!(Subdivision::SixteenthTriplet.step().ticks(), 160);
    }

    #[test]
    fn parse_symbols() {
        let grid = Grid::parse("snare", "x-X> g._").unwrap();
        assert_eq!(grid.len(), 7);
        assert_eq!(grid.at(0), GridSymbol::Hit);
        assert_eq!(grid.at(1), GridSymbol::Rest);
        assert_eq!(grid.at(2), GridSymbol::Accent);
        assert_eq!(grid.at(3), GridSymbol::Accent);
        assert_eq!(grid.at(4), GridSymbol::Ghost);
        assert_eq!(grid.at(5), GridSymbol::Rest);
    }

    #[test]
    fn separators_ignored() {
        let a = Grid::parse("kick", "x--- x--- | x--- x---").unwrap();
        let b = Grid::parse("kick", "x---x---x---x---").unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn invalid_symbol() {
        let err = Grid::parse("kick", "x--?").unwrap_err();
        assert!(matches!(
            err,
            StyleError::InvalidGridSymbol { symbol: '?', .. }
        ));
    }

    #[test]
    fn empty_grid() {
        assert!(matches!(
            Grid::parse("kick", " | "),
            Err(StyleError::EmptyGrid(_))
        ));
    }

    #[test]
    fn cyclic_lookup() {
        let grid = Grid::parse("hat", "x-").unwrap();
        assert_eq!(grid.at(0), GridSymbol::Hit);
        assert_eq!(grid.at(5), GridSymbol::Rest);
        assert_eq!(grid.at(6), GridSymbol::Hit);
    }

    #[test]
    fn steps_to_next_sound_wraps() {
        let grid = Grid::parse("bass", "x--x----").unwrap();
        assert_eq!(grid.steps_to_next_sound(0), 3);
        assert_eq!(grid.steps_to_next_sound(3), 5);
        let single = Grid::parse("crash", "x---").unwrap();
        assert_eq!(single.steps_to_next_sound(0), 4);
    }
}

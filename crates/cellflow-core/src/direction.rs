//! Grid-cell flow direction codes.
//!
//! Numeric codes follow the clockwise-from-North convention used in the
//! output attribute column: 0 = dirty, 1 = N … 8 = NW.
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Final flow-exit direction of a grid cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "u8", try_from = "u8")]
pub enum Direction {
    /// Pour point lies strictly inside the cell (usually the cell sits on the
    /// channel itself). A valid result, not an error.
    Dirty,
    N,
    NE,
    E,
    SE,
    S,
    SW,
    W,
    NW,
}

impl Direction {
    /// Every direction in code order, `Dirty` first.
    pub const ALL: [Direction; 9] = [
        Direction::Dirty,
        Direction::N,
        Direction::NE,
        Direction::E,
        Direction::SE,
        Direction::S,
        Direction::SW,
        Direction::W,
        Direction::NW,
    ];

    pub fn code(self) -> u8 {
        match self {
            Direction::Dirty => 0,
            Direction::N => 1,
            Direction::NE => 2,
            Direction::E => 3,
            Direction::SE => 4,
            Direction::S => 5,
            Direction::SW => 6,
            Direction::W => 7,
            Direction::NW => 8,
        }
    }

    pub fn from_code(code: u8) -> Option<Self> {
        Self::ALL.get(code as usize).copied()
    }

    /// Compass label. `Dirty` has no label.
    pub fn label(self) -> Option<&'static str> {
        match self {
            Direction::Dirty => None,
            Direction::N => Some("N"),
            Direction::NE => Some("NE"),
            Direction::E => Some("E"),
            Direction::SE => Some("SE"),
            Direction::S => Some("S"),
            Direction::SW => Some("SW"),
            Direction::W => Some("W"),
            Direction::NW => Some("NW"),
        }
    }

    pub fn from_label(label: &str) -> Option<Self> {
        match label {
            "N" => Some(Direction::N),
            "NE" => Some(Direction::NE),
            "E" => Some(Direction::E),
            "SE" => Some(Direction::SE),
            "S" => Some(Direction::S),
            "SW" => Some(Direction::SW),
            "W" => Some(Direction::W),
            "NW" => Some(Direction::NW),
            _ => None,
        }
    }

    pub fn diagonal(self) -> Option<Diagonal> {
        match self {
            Direction::NE => Some(Diagonal::NE),
            Direction::SE => Some(Diagonal::SE),
            Direction::SW => Some(Diagonal::SW),
            Direction::NW => Some(Diagonal::NW),
            _ => None,
        }
    }

    pub fn is_diagonal(self) -> bool {
        self.diagonal().is_some()
    }
}

impl From<Direction> for u8 {
    fn from(d: Direction) -> u8 {
        d.code()
    }
}

impl TryFrom<u8> for Direction {
    type Error = String;

    fn try_from(code: u8) -> Result<Self, Self::Error> {
        Direction::from_code(code).ok_or_else(|| format!("invalid direction code {code}"))
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label().unwrap_or("dirty"))
    }
}

impl FromStr for Direction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.eq_ignore_ascii_case("dirty") {
            return Ok(Direction::Dirty);
        }
        Direction::from_label(s).ok_or_else(|| format!("unknown direction label {s:?}"))
    }
}

/// The four diagonal directions. Used both for a cell's naive corner result
/// and for the coarse quadrant of its neighbour region.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Diagonal {
    NE,
    SE,
    SW,
    NW,
}

impl Diagonal {
    pub const ALL: [Diagonal; 4] = [Diagonal::NE, Diagonal::SE, Diagonal::SW, Diagonal::NW];

    /// Assemble from the vertical (north?) and horizontal (west?) halves.
    pub fn from_halves(north: bool, west: bool) -> Self {
        match (north, west) {
            (true, true) => Diagonal::NW,
            (true, false) => Diagonal::NE,
            (false, true) => Diagonal::SW,
            (false, false) => Diagonal::SE,
        }
    }

    /// Unit signs (x, y) of this diagonal; +y is north.
    pub fn signs(self) -> (f64, f64) {
        match self {
            Diagonal::NE => (1.0, 1.0),
            Diagonal::SE => (1.0, -1.0),
            Diagonal::SW => (-1.0, -1.0),
            Diagonal::NW => (-1.0, 1.0),
        }
    }
}

impl From<Diagonal> for Direction {
    fn from(d: Diagonal) -> Direction {
        match d {
            Diagonal::NE => Direction::NE,
            Diagonal::SE => Direction::SE,
            Diagonal::SW => Direction::SW,
            Diagonal::NW => Direction::NW,
        }
    }
}

impl fmt::Display for Diagonal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        Direction::from(*self).fmt(f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn label_code_roundtrip_for_all_labels() {
        for label in ["N", "NE", "E", "SE", "S", "SW", "W", "NW"] {
            let d = Direction::from_label(label).unwrap();
            assert_eq!(d.label(), Some(label));
            assert_eq!(Direction::from_code(d.code()), Some(d));
        }
    }

    #[test]
    fn codes_match_output_table() {
        let expected = [(1, "N"), (2, "NE"), (3, "E"), (4, "SE"), (5, "S"), (6, "SW"), (7, "W"), (8, "NW")];
        for (code, label) in expected {
            assert_eq!(Direction::from_code(code).and_then(Direction::label), Some(label));
        }
    }

    #[test]
    fn dirty_has_code_zero_and_no_label() {
        assert_eq!(Direction::Dirty.code(), 0);
        assert_eq!(Direction::Dirty.label(), None);
        assert_eq!(Direction::from_label("dirty"), None);
        assert_eq!("dirty".parse::<Direction>(), Ok(Direction::Dirty));
    }

    #[test]
    fn codes_above_eight_are_rejected() {
        assert_eq!(Direction::from_code(9), None);
        assert!(Direction::try_from(200u8).is_err());
    }

    #[test]
    fn serde_uses_numeric_code() {
        assert_eq!(serde_json::to_string(&Direction::SW).unwrap(), "6");
        let d: Direction = serde_json::from_str("0").unwrap();
        assert_eq!(d, Direction::Dirty);
        assert!(serde_json::from_str::<Direction>("12").is_err());
    }

    #[test]
    fn only_corners_are_diagonal() {
        let diagonals: Vec<_> = Direction::ALL.iter().filter(|d| d.is_diagonal()).collect();
        assert_eq!(diagonals, [&Direction::NE, &Direction::SE, &Direction::SW, &Direction::NW]);
        for d in Diagonal::ALL {
            assert_eq!(Direction::from(d).diagonal(), Some(d));
        }
    }

    #[test]
    fn halves_assemble_quadrants() {
        assert_eq!(Diagonal::from_halves(true, true), Diagonal::NW);
        assert_eq!(Diagonal::from_halves(true, false), Diagonal::NE);
        assert_eq!(Diagonal::from_halves(false, true), Diagonal::SW);
        assert_eq!(Diagonal::from_halves(false, false), Diagonal::SE);
    }
}

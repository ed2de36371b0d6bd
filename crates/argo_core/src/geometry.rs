use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// A fully numeric rectangle in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub north: f64,
    pub south: f64,
    pub east: f64,
    pub west: f64,
}

impl Rect {
    pub fn new(north: f64, south: f64, east: f64, west: f64) -> Self {
        Self {
            north,
            south,
            east,
            west,
        }
    }

    /// `north > south` and `east > west`, all values finite.
    pub fn is_valid(&self) -> bool {
        [self.north, self.south, self.east, self.west]
            .iter()
            .all(|v| v.is_finite())
            && self.north > self.south
            && self.east > self.west
    }
}

/// Which edge of a bound a field edits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BoundField {
    North,
    South,
    East,
    West,
}

impl BoundField {
    pub const ALL: [BoundField; 4] = [
        BoundField::North,
        BoundField::South,
        BoundField::East,
        BoundField::West,
    ];

    pub fn name(self) -> &'static str {
        match self {
            BoundField::North => "north",
            BoundField::South => "south",
            BoundField::East => "east",
            BoundField::West => "west",
        }
    }
}

impl fmt::Display for BoundField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for BoundField {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "north" | "n" => Ok(BoundField::North),
            "south" | "s" => Ok(BoundField::South),
            "east" | "e" => Ok(BoundField::East),
            "west" | "w" => Ok(BoundField::West),
            other => Err(format!("unknown bound field '{other}'")),
        }
    }
}

/// A bound whose edges may individually be unset.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Bound {
    pub north: Option<f64>,
    pub south: Option<f64>,
    pub east: Option<f64>,
    pub west: Option<f64>,
}

impl Bound {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn get(&self, field: BoundField) -> Option<f64> {
        match field {
            BoundField::North => self.north,
            BoundField::South => self.south,
            BoundField::East => self.east,
            BoundField::West => self.west,
        }
    }

    pub fn set(&mut self, field: BoundField, value: Option<f64>) {
        let slot = match field {
            BoundField::North => &mut self.north,
            BoundField::South => &mut self.south,
            BoundField::East => &mut self.east,
            BoundField::West => &mut self.west,
        };
        *slot = value;
    }

    pub fn is_empty(&self) -> bool {
        BoundField::ALL.iter().all(|f| self.get(*f).is_none())
    }

    /// The numeric rectangle, if every edge is set. Validity is not checked.
    pub fn as_rect(&self) -> Option<Rect> {
        Some(Rect {
            north: self.north?,
            south: self.south?,
            east: self.east?,
            west: self.west?,
        })
    }

    /// The rectangle if it is fully set and valid; the only form ever sent out.
    pub fn valid_rect(&self) -> Option<Rect> {
        self.as_rect().filter(Rect::is_valid)
    }

    pub fn is_valid(&self) -> bool {
        self.valid_rect().is_some()
    }
}

impl From<Rect> for Bound {
    fn from(rect: Rect) -> Self {
        Self {
            north: Some(rect.north),
            south: Some(rect.south),
            east: Some(rect.east),
            west: Some(rect.west),
        }
    }
}

/// Parses a numeric field. Blank, unparseable and non-finite input is unset.
pub fn parse_coordinate(raw: &str) -> Option<f64> {
    raw.trim()
        .parse::<f64>()
        .ok()
        .filter(|value| value.is_finite())
}

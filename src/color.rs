use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::ColorError;

/// Stone colour. Empty intersections are modelled as `Option<Color>::None`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Color {
    #[serde(rename = "B")]
    Black,
    #[serde(rename = "W")]
    White,
}

impl Color {
    pub const fn opposite(self) -> Self {
        match self {
            Color::Black => Color::White,
            Color::White => Color::Black,
        }
    }

    /// Colour implied by a move or placement property (`B`, `W`, `AB`, `AW`).
    pub fn from_sgf_prop(prop: &str) -> Result<Self, ColorError> {
        match prop {
            "B" | "AB" => Ok(Color::Black),
            "W" | "AW" => Ok(Color::White),
            other => Err(ColorError(other.to_string())),
        }
    }

    /// Parse a single colour letter, ignoring case (used by `PL`).
    pub fn from_letter(letter: &str) -> Option<Self> {
        match letter {
            "B" | "b" => Some(Color::Black),
            "W" | "w" => Some(Color::White),
            _ => None,
        }
    }

    pub const fn as_sgf(self) -> &'static str {
        match self {
            Color::Black => "B",
            Color::White => "W",
        }
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_sgf())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn opposite_flips() {
        assert_eq!(Color::Black.opposite(), Color::White);
        assert_eq!(Color::White.opposite(), Color::Black);
    }

    #[test]
    fn colour_from_properties() {
        assert_eq!(Color::from_sgf_prop("AB"), Ok(Color::Black));
        assert_eq!(Color::from_sgf_prop("W"), Ok(Color::White));
        assert!(Color::from_sgf_prop("C").is_err());
        assert_eq!(Color::from_letter("w"), Some(Color::White));
        assert_eq!(Color::from_letter("x"), None);
    }
}

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::PointError;

/// Largest coordinate an SGF letter can address (`Z` = 51).
pub const MAX_SGF_COORD: u8 = 51;

/// An intersection, with `(0, 0)` at the top-left corner as in SGF.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Point {
    pub x: u8,
    pub y: u8,
}

#[inline]
const fn letter_to_coord(letter: u8) -> Option<u8> {
    match letter {
        b'a'..=b'z' => Some(letter - b'a'),
        b'A'..=b'Z' => Some(letter - b'A' + 26),
        _ => None,
    }
}

#[inline]
const fn coord_to_letter(coord: u8) -> Option<char> {
    match coord {
        0..=25 => Some((b'a' + coord) as char),
        26..=MAX_SGF_COORD => Some((b'A' + coord - 26) as char),
        _ => None,
    }
}

impl Point {
    pub const fn new(x: u8, y: u8) -> Self {
        Self { x, y }
    }

    /// Decode a two-letter SGF coordinate such as `"ab"` into `{0,1}`.
    pub fn from_sgf(value: &str) -> Result<Self, PointError> {
        let bytes = value.as_bytes();
        if bytes.len() != 2 {
            return Err(PointError::BadLength(value.to_string()));
        }
        let decode = |letter: u8| {
            letter_to_coord(letter).ok_or_else(|| PointError::BadLetter {
                value: value.to_string(),
                coord: letter as char,
            })
        };
        Ok(Self::new(decode(bytes[0])?, decode(bytes[1])?))
    }

    pub fn to_sgf(self) -> Result<String, PointError> {
        let x = coord_to_letter(self.x).ok_or(PointError::OutOfRange(self))?;
        let y = coord_to_letter(self.y).ok_or(PointError::OutOfRange(self))?;
        Ok([x, y].iter().collect())
    }

    /// Orthogonal neighbours that stay inside a `size x size` board.
    pub fn neighbours(self, size: u8) -> smallvec::SmallVec<[Point; 4]> {
        let mut out = smallvec::SmallVec::new();
        if self.x > 0 {
            out.push(Point::new(self.x - 1, self.y));
        }
        if self.x + 1 < size {
            out.push(Point::new(self.x + 1, self.y));
        }
        if self.y > 0 {
            out.push(Point::new(self.x, self.y - 1));
        }
        if self.y + 1 < size {
            out.push(Point::new(self.x, self.y + 1));
        }
        out
    }
}

impl fmt::Display for Point {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{{},{}}}", self.x, self.y)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_sgf_letters() {
        assert_eq!(Point::from_sgf("ab"), Ok(Point::new(0, 1)));
        assert_eq!(Point::from_sgf("sa"), Ok(Point::new(18, 0)));
        assert_eq!(Point::from_sgf("AZ"), Ok(Point::new(26, 51)));
    }

    #[test]
    fn rejects_malformed_coordinates() {
        assert_eq!(Point::from_sgf(""), Err(PointError::BadLength(String::new())));
        assert!(matches!(Point::from_sgf("abc"), Err(PointError::BadLength(_))));
        assert!(matches!(
            Point::from_sgf("a1"),
            Err(PointError::BadLetter { coord: '1', .. })
        ));
    }

    #[test]
    fn encodes_to_sgf() {
        assert_eq!(Point::new(12, 2).to_sgf().as_deref(), Ok("mc"));
        assert_eq!(Point::new(30, 0).to_sgf().as_deref(), Ok("Ea"));
        assert!(Point::new(52, 0).to_sgf().is_err());
    }

    #[test]
    fn neighbours_respect_edges() {
        assert_eq!(Point::new(0, 0).neighbours(19).len(), 2);
        assert_eq!(Point::new(0, 5).neighbours(19).len(), 3);
        assert_eq!(Point::new(5, 5).neighbours(19).len(), 4);
        assert_eq!(Point::new(0, 0).neighbours(1).len(), 0);
    }
}

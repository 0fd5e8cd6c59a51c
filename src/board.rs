use std::fmt;

use hashbrown::HashSet;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use wasm_bindgen::prelude::*;

use crate::color::Color;
use crate::error::BoardError;
use crate::movetree::Move;
use crate::point::{Point, MAX_SGF_COORD};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoardState {
    size: u8,
    /// Row-major intersections, `None` when empty.
    cells: Vec<Option<Color>>,
    /// Point that may not be retaken on the next move.
    ko: Option<Point>,
}

impl BoardState {
    pub fn new(size: u8) -> Result<Self, BoardError> {
        if size == 0 || size > MAX_SGF_COORD + 1 {
            return Err(BoardError::BadSize(size));
        }
        Ok(Self {
            size,
            cells: vec![None; usize::from(size) * usize::from(size)],
            ko: None,
        })
    }

    #[inline]
    fn idx(&self, point: Point) -> usize {
        usize::from(point.y) * usize::from(self.size) + usize::from(point.x)
    }

    pub fn size(&self) -> u8 {
        self.size
    }

    pub fn in_bounds(&self, point: Point) -> bool {
        point.x < self.size && point.y < self.size
    }

    pub fn color_at(&self, point: Point) -> Option<Color> {
        if !self.in_bounds(point) {
            return None;
        }
        self.cells[self.idx(point)]
    }

    pub fn ko(&self) -> Option<Point> {
        self.ko
    }

    fn set(&mut self, point: Point, color: Option<Color>) {
        let index = self.idx(point);
        self.cells[index] = color;
    }

    /// Play a move, removing captured groups. Returns the captured stones sorted by point.
    ///
    /// Passes change nothing but clear the ko point. On error the board is left untouched.
    pub fn place_stone(&mut self, mv: Move) -> Result<Vec<Move>, BoardError> {
        let Some(point) = mv.point else {
            self.ko = None;
            return Ok(Vec::new());
        };
        if !self.in_bounds(point) {
            return Err(BoardError::OutOfBounds {
                point,
                size: self.size,
            });
        }
        if self.color_at(point).is_some() {
            return Err(BoardError::Occupied(point));
        }

        self.set(point, Some(mv.color));

        let captured = self.find_captured_groups(point, mv.color.opposite());
        if captured.is_empty() && !self.has_liberties(point) {
            self.set(point, None);
            return Err(BoardError::Suicide(point));
        }
        if captured.len() == 1 && self.ko == Some(point) {
            self.set(point, None);
            return Err(BoardError::Ko(point));
        }
        // Only a lone stone that captured a lone stone can be retaken at once.
        self.ko = if captured.len() == 1 && self.group_size(point) == 1 {
            Some(captured[0])
        } else {
            None
        };

        let opponent = mv.color.opposite();
        let mut out: Vec<Move> = captured.iter().map(|&p| Move::new(opponent, p)).collect();
        for &p in &captured {
            self.set(p, None);
        }
        out.sort();
        Ok(out)
    }

    /// Force-place setup stones without capture logic, then reject positions that leave any
    /// touched group without liberties.
    pub fn set_placements(&mut self, placements: &[Move]) -> Result<(), BoardError> {
        for mv in placements {
            if let Some(point) = mv.point {
                if !self.in_bounds(point) {
                    return Err(BoardError::OutOfBounds {
                        point,
                        size: self.size,
                    });
                }
                self.set(point, Some(mv.color));
            }
        }

        let mut explored: HashSet<Point> = HashSet::new();
        let touched = placements
            .iter()
            .filter_map(|mv| mv.point)
            .flat_map(|point| std::iter::once(point).chain(point.neighbours(self.size)));
        for point in touched {
            if explored.contains(&point) || self.color_at(point).is_none() {
                continue;
            }
            let (group, captured) = self.stone_group(point);
            if captured {
                let mut group: Vec<Point> = group.into_iter().collect();
                group.sort();
                return Err(BoardError::InvalidState(group));
            }
            explored.extend(group);
        }
        Ok(())
    }

    /// Every stone on the board, ordered row by row.
    pub fn stones(&self) -> Vec<Move> {
        let mut out = Vec::new();
        for y in 0..self.size {
            for x in 0..self.size {
                let point = Point::new(x, y);
                if let Some(color) = self.color_at(point) {
                    out.push(Move::new(color, point));
                }
            }
        }
        out
    }

    fn find_captured_groups(&self, point: Point, opponent: Color) -> Vec<Point> {
        let mut captured: HashSet<Point> = HashSet::new();
        for neighbour in point.neighbours(self.size) {
            if self.color_at(neighbour) != Some(opponent) || captured.contains(&neighbour) {
                continue;
            }
            let (group, dead) = self.stone_group(neighbour);
            if dead {
                captured.extend(group);
            }
        }
        let mut out: Vec<Point> = captured.into_iter().collect();
        out.sort();
        out
    }

    fn has_liberties(&self, point: Point) -> bool {
        !self.stone_group(point).1
    }

    fn group_size(&self, point: Point) -> usize {
        self.stone_group(point).0.len()
    }

    /// Flood fill from `point`, returning the group and whether it has no liberties.
    fn stone_group(&self, point: Point) -> (HashSet<Point>, bool) {
        let color = self.color_at(point);
        let mut group = HashSet::new();
        let mut captured = true;
        let mut stack: SmallVec<[Point; 16]> = SmallVec::new();
        stack.push(point);
        while let Some(current) = stack.pop() {
            match self.color_at(current) {
                None => captured = false,
                c if c == color && group.insert(current) => {
                    stack.extend(current.neighbours(self.size));
                }
                _ => {}
            }
        }
        (group, captured)
    }
}

impl fmt::Display for BoardState {
    /// Rows such as `[B W . *]`, where `*` marks the ko point.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for y in 0..self.size {
            if y > 0 {
                writeln!(f)?;
            }
            let row: Vec<&str> = (0..self.size)
                .map(|x| {
                    let point = Point::new(x, y);
                    if self.ko == Some(point) {
                        "*"
                    } else {
                        self.color_at(point).map_or(".", Color::as_sgf)
                    }
                })
                .collect();
            write!(f, "[{}]", row.join(" "))?;
        }
        Ok(())
    }
}

/// A thin wasm-bindgen friendly board wrapper.
#[wasm_bindgen]
pub struct GoBoard {
    state: BoardState,
}

#[wasm_bindgen]
impl GoBoard {
    #[wasm_bindgen(constructor)]
    pub fn new(size: u8) -> Result<GoBoard, JsValue> {
        let state = BoardState::new(size).map_err(crate::error::GliftError::from)?;
        Ok(GoBoard { state })
    }

    /// Play `color` (`"B"` or `"W"`) at `(x, y)` and return the captured stones.
    #[wasm_bindgen(js_name = placeStone)]
    pub fn place_stone(&mut self, color: &str, x: u8, y: u8) -> Result<JsValue, JsValue> {
        let color = Color::from_letter(color)
            .ok_or_else(|| JsValue::from(js_sys::Error::new("color must be \"B\" or \"W\"")))?;
        let captures = self
            .state
            .place_stone(Move::new(color, Point::new(x, y)))
            .map_err(crate::error::GliftError::from)?;
        serde_wasm_bindgen::to_value(&captures).map_err(JsValue::from)
    }

    /// Every stone as `{ color, point: { x, y } }`.
    pub fn stones(&self) -> Result<JsValue, JsValue> {
        serde_wasm_bindgen::to_value(&self.state.stones()).map_err(JsValue::from)
    }

    pub fn size(&self) -> u8 {
        self.state.size()
    }

    #[wasm_bindgen(js_name = toString)]
    pub fn to_string_js(&self) -> String {
        self.state.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn black(x: u8, y: u8) -> Move {
        Move::new(Color::Black, Point::new(x, y))
    }

    fn white(x: u8, y: u8) -> Move {
        Move::new(Color::White, Point::new(x, y))
    }

    fn board_with(size: u8, stones: &[Move]) -> BoardState {
        let mut board = BoardState::new(size).expect("valid size");
        for &mv in stones {
            board.place_stone(mv).expect("legal setup move");
        }
        board
    }

    #[test]
    fn rejects_bad_sizes() {
        assert_eq!(BoardState::new(0), Err(BoardError::BadSize(0)));
        assert_eq!(BoardState::new(53), Err(BoardError::BadSize(53)));
        assert!(BoardState::new(19).is_ok());
    }

    #[test]
    fn captures_single_stone() {
        let mut board = board_with(9, &[white(1, 1), black(0, 1), black(1, 0), black(2, 1)]);
        let captured = board.place_stone(black(1, 2)).expect("legal capture");
        assert_eq!(captured, vec![white(1, 1)]);
        assert_eq!(board.color_at(Point::new(1, 1)), None);
    }

    #[test]
    fn captures_group_on_edge() {
        // White pair on the top edge, black surrounds it.
        let mut board = board_with(
            5,
            &[white(1, 0), white(2, 0), black(0, 0), black(3, 0), black(1, 1)],
        );
        let captured = board.place_stone(black(2, 1)).expect("legal capture");
        assert_eq!(captured, vec![white(1, 0), white(2, 0)]);
        assert_eq!(board.ko(), None);
    }

    #[test]
    fn suicide_is_rejected_and_undone() {
        let mut board = board_with(5, &[black(1, 0), black(0, 1)]);
        assert_eq!(
            board.place_stone(white(0, 0)),
            Err(BoardError::Suicide(Point::new(0, 0)))
        );
        assert_eq!(board.color_at(Point::new(0, 0)), None);
    }

    #[test]
    fn capturing_is_not_suicide() {
        // White at the corner with one liberty; black fills it while having no liberties itself.
        let mut board = board_with(
            5,
            &[white(0, 0), white(2, 0), white(1, 1), black(0, 1)],
        );
        let captured = board.place_stone(black(1, 0)).expect("capture saves black");
        assert_eq!(captured, vec![white(0, 0)]);
    }

    #[test]
    fn ko_cannot_be_retaken_immediately() {
        // . B W .
        // B W . W
        // . B W .
        let mut board = board_with(
            5,
            &[
                black(1, 0),
                white(2, 0),
                black(0, 1),
                white(1, 1),
                white(3, 1),
                black(1, 2),
                white(2, 2),
            ],
        );
        let captured = board.place_stone(black(2, 1)).expect("black takes ko");
        assert_eq!(captured, vec![white(1, 1)]);
        assert_eq!(board.ko(), Some(Point::new(1, 1)));
        assert_eq!(
            board.place_stone(white(1, 1)),
            Err(BoardError::Ko(Point::new(1, 1)))
        );

        // After a move elsewhere the ko may be retaken.
        board.place_stone(white(4, 4)).expect("tenuki");
        board.place_stone(black(4, 3)).expect("answer");
        let captured = board.place_stone(white(1, 1)).expect("retake");
        assert_eq!(captured, vec![black(2, 1)]);
    }

    #[test]
    fn occupied_and_out_of_bounds() {
        let mut board = board_with(3, &[black(1, 1)]);
        assert_eq!(
            board.place_stone(white(1, 1)),
            Err(BoardError::Occupied(Point::new(1, 1)))
        );
        assert!(matches!(
            board.place_stone(white(3, 0)),
            Err(BoardError::OutOfBounds { size: 3, .. })
        ));
    }

    #[test]
    fn pass_clears_ko() {
        let mut board = BoardState::new(5).expect("valid size");
        board.ko = Some(Point::new(2, 2));
        assert_eq!(board.place_stone(Move::pass(Color::White)), Ok(Vec::new()));
        assert_eq!(board.ko(), None);
    }

    #[test]
    fn placements_without_liberties_are_invalid() {
        let mut board = BoardState::new(3).expect("valid size");
        assert!(board.set_placements(&[black(0, 0), white(1, 0)]).is_ok());
        let err = board
            .set_placements(&[white(0, 1)])
            .expect_err("black corner stone is dead");
        assert_eq!(err, BoardError::InvalidState(vec![Point::new(0, 0)]));
    }

    #[test]
    fn display_marks_ko() {
        let mut board = board_with(3, &[black(0, 0), white(2, 2)]);
        board.ko = Some(Point::new(1, 1));
        assert_eq!(board.to_string(), "[B . .]\n[. * .]\n[. . W]");
    }

    #[test]
    fn stones_are_row_major() {
        let board = board_with(3, &[white(2, 0), black(0, 1)]);
        assert_eq!(board.stones(), vec![white(2, 0), black(0, 1)]);
    }
}

//! Variation paths through a [`MoveTree`].
//!
//! A path such as `[0, 1, 0]` means: take variation 0, then variation 1, then variation 0. Paths
//! also have a compact string form where `-` separates variations and `AxN` repeats variation `A`
//! `N` times:
//!
//! ```text
//! -            []
//! 0 / -0       [0]
//! 2-3          [2, 3]
//! 0x4          [0, 0, 0, 0]
//! 1-2x1-0-2x3  [1, 2, 0, 2, 2, 2]
//! ```

use std::fmt;
use std::ops::Deref;

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::board::BoardState;
use crate::error::{BoardError, TreepathError};
use crate::movetree::{Move, MoveTree, NodeId};

/// Longest path `parse` will expand a repeat into.
pub const MAX_PATH_LEN: usize = 10_000;

#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Treepath(Vec<usize>);

#[derive(Clone, Copy, PartialEq, Eq)]
enum ParseState {
    Variation,
    Repeat(usize),
}

impl Treepath {
    pub fn new() -> Self {
        Self(Vec::new())
    }

    pub fn parse(path: &str) -> Result<Self, TreepathError> {
        if path.is_empty() || path == "-" {
            return Ok(Self::new());
        }

        let mut out = Vec::new();
        let mut state = ParseState::Variation;
        let mut buf = String::new();

        let take_number = |buf: &mut String, index: usize| -> Result<usize, TreepathError> {
            if buf.is_empty() {
                return Err(TreepathError::MissingNumber {
                    path: path.to_string(),
                    index,
                });
            }
            let n = buf.parse::<usize>().map_err(|_| TreepathError::BadNumber {
                path: path.to_string(),
                index,
            })?;
            buf.clear();
            Ok(n)
        };

        // A trailing sentinel flushes the last number through the same transition as '-'.
        for (index, ch) in path.chars().chain(std::iter::once('\n')).enumerate() {
            match ch {
                '0'..='9' => buf.push(ch),
                '-' if index == 0 => {}
                '-' | '\n' => {
                    let n = take_number(&mut buf, index)?;
                    match state {
                        ParseState::Variation => out.push(n),
                        ParseState::Repeat(_) if n > MAX_PATH_LEN.saturating_sub(out.len()) => {
                            return Err(TreepathError::BadNumber {
                                path: path.to_string(),
                                index,
                            })
                        }
                        ParseState::Repeat(variation) => {
                            out.extend(std::iter::repeat(variation).take(n));
                            state = ParseState::Variation;
                        }
                    }
                }
                'x' => {
                    let n = take_number(&mut buf, index)?;
                    match state {
                        ParseState::Variation => state = ParseState::Repeat(n),
                        ParseState::Repeat(_) => {
                            return Err(TreepathError::DoubleRepeat {
                                path: path.to_string(),
                                index,
                            })
                        }
                    }
                }
                other => {
                    return Err(TreepathError::UnexpectedChar {
                        path: path.to_string(),
                        index,
                        ch: other,
                    })
                }
            }
        }
        Ok(Self(out))
    }

    pub fn as_slice(&self) -> &[usize] {
        &self.0
    }

    pub fn push(&mut self, variation: usize) {
        self.0.push(variation);
    }

    pub fn pop(&mut self) -> Option<usize> {
        self.0.pop()
    }

    /// Short-hand form, e.g. `[1,2,0,0,2,2,2]` becomes `-1-2-0x2-2x3`.
    pub fn compact_string(&self) -> String {
        if self.0.is_empty() {
            return "-".to_string();
        }
        let mut out = String::new();
        let mut runs: SmallVec<[(usize, usize); 8]> = SmallVec::new();
        for &variation in &self.0 {
            match runs.last_mut() {
                Some((prev, count)) if *prev == variation => *count += 1,
                _ => runs.push((variation, 1)),
            }
        }
        for (variation, count) in runs {
            if count == 1 {
                out.push_str(&format!("-{variation}"));
            } else {
                out.push_str(&format!("-{variation}x{count}"));
            }
        }
        out
    }

    /// Follow the path from `from` until it ends or a variation is missing.
    pub fn apply(&self, tree: &MoveTree, from: NodeId) -> NodeId {
        let mut cursor = from;
        for &variation in &self.0 {
            match tree.next(cursor, variation) {
                Some(next) => cursor = next,
                None => break,
            }
        }
        cursor
    }

    /// Replay placements and moves from `from` (inclusive) along the path onto a copy of
    /// `board`. Returns the new board and every stone captured on the way, sorted.
    pub fn apply_to_board(
        &self,
        tree: &MoveTree,
        from: NodeId,
        board: &BoardState,
    ) -> Result<(BoardState, Vec<Move>), TreepathError> {
        let mut board = board.clone();
        let mut captures = Vec::new();
        let mut traversed = Treepath::new();
        let mut cursor = Some(from);
        let mut step = 0;

        while let Some(id) = cursor {
            apply_node(tree, id, &mut board, &mut captures).map_err(|source| TreepathError::Apply {
                path: traversed.to_string(),
                source,
            })?;
            cursor = self
                .0
                .get(step)
                .and_then(|&variation| tree.next(id, variation));
            if let Some(&variation) = self.0.get(step) {
                traversed.push(variation);
            }
            step += 1;
        }
        captures.sort();
        Ok((board, captures))
    }
}

fn apply_node(
    tree: &MoveTree,
    id: NodeId,
    board: &mut BoardState,
    captures: &mut Vec<Move>,
) -> Result<(), BoardError> {
    let node = tree.node(id);
    if !node.placements.is_empty() {
        board.set_placements(&node.placements)?;
    }
    if let Some(mv) = node.mv {
        captures.extend(board.place_stone(mv)?);
    }
    Ok(())
}

impl From<Vec<usize>> for Treepath {
    fn from(path: Vec<usize>) -> Self {
        Self(path)
    }
}

impl Deref for Treepath {
    type Target = [usize];

    fn deref(&self) -> &[usize] {
        &self.0
    }
}

impl fmt::Display for Treepath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self.0.iter().map(usize::to_string).collect();
        write!(f, "[{}]", parts.join(","))
    }
}

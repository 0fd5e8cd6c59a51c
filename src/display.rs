//! Text and HTML rendering of a board position.
//!
//! A position is first flattened into a grid of [`Intersection`]s (board lines, stones and marks)
//! clipped to a [`CropBox`]; the grid is then written out either as unicode rows or as a themed
//! HTML fragment.

use std::fmt::Write as _;

use serde::{Deserialize, Serialize};

use crate::bbox::CropBox;
use crate::board::BoardState;
use crate::color::Color;
use crate::movetree::{MoveTree, NodeId};
use crate::point::Point;

/// Everything that can be drawn on an intersection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Symbol {
    Empty,
    TopLeft,
    TopRight,
    BottomLeft,
    BottomRight,
    TopEdge,
    BottomEdge,
    LeftEdge,
    RightEdge,
    Center,
    StarPoint,
    BlackStone,
    WhiteStone,
    Triangle,
    Square,
    Circle,
    Xmark,
    TextLabel,
}

impl Symbol {
    pub const fn as_char(self) -> char {
        match self {
            Symbol::Empty => ' ',
            Symbol::TopLeft => '┏',
            Symbol::TopRight => '┓',
            Symbol::BottomLeft => '┗',
            Symbol::BottomRight => '┛',
            Symbol::TopEdge => '┳',
            Symbol::BottomEdge => '┻',
            Symbol::LeftEdge => '┣',
            Symbol::RightEdge => '┫',
            Symbol::Center => '╋',
            Symbol::StarPoint => '✻',
            Symbol::BlackStone => '●',
            Symbol::WhiteStone => '○',
            Symbol::Triangle => '▴',
            Symbol::Square => '□',
            Symbol::Circle => '⊙',
            Symbol::Xmark => '☓',
            Symbol::TextLabel => '☒',
        }
    }

    /// Mark symbol for an SGF markup property.
    pub fn from_mark_prop(prop: &str) -> Option<Self> {
        match prop {
            "TR" => Some(Symbol::Triangle),
            "SQ" => Some(Symbol::Square),
            "CR" => Some(Symbol::Circle),
            "MA" => Some(Symbol::Xmark),
            "LB" => Some(Symbol::TextLabel),
            _ => None,
        }
    }

    fn stone(color: Color) -> Self {
        match color {
            Color::Black => Symbol::BlackStone,
            Color::White => Symbol::WhiteStone,
        }
    }
}

const MARK_PROPS: [&str; 5] = ["TR", "SQ", "CR", "MA", "LB"];

/// One intersection of a rendered position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Intersection {
    pub point: Point,
    /// Board line shape underneath.
    pub base: Symbol,
    pub stone: Option<Color>,
    pub mark: Option<Symbol>,
    pub label: Option<String>,
}

impl Intersection {
    /// What a single character cell shows: a mark beats a stone, a stone beats the lines.
    pub fn top_symbol(&self) -> Symbol {
        self.mark
            .or_else(|| self.stone.map(Symbol::stone))
            .unwrap_or(self.base)
    }

    fn cell_text(&self) -> String {
        match (&self.mark, &self.label) {
            (Some(Symbol::TextLabel), Some(label)) => label.chars().next().map_or_else(
                || Symbol::TextLabel.as_char().to_string(),
                |ch| ch.to_string(),
            ),
            _ => self.top_symbol().as_char().to_string(),
        }
    }
}

fn star_points(size: u8) -> &'static [u8] {
    match size {
        19 => &[3, 9, 15],
        13 => &[3, 6, 9],
        9 => &[2, 4, 6],
        _ => &[],
    }
}

fn base_symbol(point: Point, size: u8) -> Symbol {
    let last = size.saturating_sub(1);
    let stars = star_points(size);
    match (point.x, point.y) {
        (0, 0) => Symbol::TopLeft,
        (x, 0) if x == last => Symbol::TopRight,
        (0, y) if y == last => Symbol::BottomLeft,
        (x, y) if x == last && y == last => Symbol::BottomRight,
        (_, 0) => Symbol::TopEdge,
        (_, y) if y == last => Symbol::BottomEdge,
        (0, _) => Symbol::LeftEdge,
        (x, _) if x == last => Symbol::RightEdge,
        (x, y) if stars.contains(&x) && stars.contains(&y) => Symbol::StarPoint,
        _ => Symbol::Center,
    }
}

/// Grid of intersections for the board and node marks, row by row within `crop`.
pub fn snapshot(
    board: &BoardState,
    tree: &MoveTree,
    node: NodeId,
    crop: &CropBox,
) -> Vec<Vec<Intersection>> {
    let size = board.size();
    let bbox = crop.bbox;
    let mut rows: Vec<Vec<Intersection>> = (bbox.top_left.y..=bbox.bot_right.y.min(size - 1))
        .map(|y| {
            (bbox.top_left.x..=bbox.bot_right.x.min(size - 1))
                .map(|x| {
                    let point = Point::new(x, y);
                    Intersection {
                        point,
                        base: base_symbol(point, size),
                        stone: board.color_at(point),
                        mark: None,
                        label: None,
                    }
                })
                .collect()
        })
        .collect();

    for prop in MARK_PROPS {
        let Some(symbol) = Symbol::from_mark_prop(prop) else {
            continue;
        };
        for value in tree.property_values(node, prop) {
            let (coord, label) = match value.split_once(':') {
                Some((coord, label)) => (coord, Some(label.to_string())),
                None => (value.as_str(), None),
            };
            let Ok(point) = Point::from_sgf(coord) else {
                continue;
            };
            if !bbox.contains(point) {
                continue;
            }
            let row = usize::from(point.y - bbox.top_left.y);
            let col = usize::from(point.x - bbox.top_left.x);
            if let Some(cell) = rows.get_mut(row).and_then(|r| r.get_mut(col)) {
                cell.mark = Some(symbol);
                cell.label = label;
            }
        }
    }
    rows
}

/// Column letters skip `I`, as on a physical board.
fn column_label(x: u8) -> char {
    let letter = b'A' + x;
    (if letter >= b'I' { letter + 1 } else { letter }) as char
}

/// Unicode rows, optionally framed with board coordinates.
pub fn render_text(grid: &[Vec<Intersection>], size: u8, coords: bool) -> String {
    let mut out = String::new();
    if coords {
        if let Some(first) = grid.first() {
            out.push_str("   ");
            for cell in first {
                out.push(column_label(cell.point.x));
            }
            out.push('\n');
        }
    }
    for (i, row) in grid.iter().enumerate() {
        if i > 0 {
            out.push('\n');
        }
        if coords {
            if let Some(cell) = row.first() {
                let _ = write!(out, "{:>2} ", size - cell.point.y);
            }
        }
        for cell in row {
            out.push_str(&cell.cell_text());
        }
    }
    out
}

/// Visual theme of the rendered board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Theme {
    #[default]
    Default,
    Depth,
    Moody,
    Textbook,
    Transparent,
}

/// Colours applied to the HTML rendering.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Palette {
    pub board: &'static str,
    pub lines: &'static str,
    pub black: &'static str,
    pub white: &'static str,
    pub comment: &'static str,
}

impl Theme {
    pub const fn css_class(self) -> &'static str {
        match self {
            Theme::Default => "glift-theme-default",
            Theme::Depth => "glift-theme-depth",
            Theme::Moody => "glift-theme-moody",
            Theme::Textbook => "glift-theme-textbook",
            Theme::Transparent => "glift-theme-transparent",
        }
    }

    pub const fn palette(self) -> Palette {
        match self {
            Theme::Default => Palette {
                board: "#f5be7e",
                lines: "#000000",
                black: "#000000",
                white: "#ffffff",
                comment: "#ffffff",
            },
            Theme::Depth => Palette {
                board: "#f5be7e",
                lines: "#5a3d1c",
                black: "#111111",
                white: "#f0f0f0",
                comment: "#fdf2e3",
            },
            Theme::Moody => Palette {
                board: "#3f3f3f",
                lines: "#c0c0c0",
                black: "#000000",
                white: "#e6e6e6",
                comment: "#555555",
            },
            Theme::Textbook => Palette {
                board: "#ffffff",
                lines: "#000000",
                black: "#000000",
                white: "#ffffff",
                comment: "#ffffff",
            },
            Theme::Transparent => Palette {
                board: "transparent",
                lines: "#000000",
                black: "#000000",
                white: "#ffffff",
                comment: "transparent",
            },
        }
    }
}

pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    out
}

/// Themed HTML fragment: a `<pre>` board followed by the escaped comment.
pub fn render_html(grid: &[Vec<Intersection>], theme: Theme, comment: &str, status: &str) -> String {
    let palette = theme.palette();
    let mut out = String::new();
    let _ = write!(
        out,
        "<div class=\"glift {}\"><pre class=\"glift-board\" style=\"background:{};color:{}\">",
        theme.css_class(),
        palette.board,
        palette.lines
    );
    for (i, row) in grid.iter().enumerate() {
        if i > 0 {
            out.push('\n');
        }
        for cell in row {
            match (cell.mark, cell.stone) {
                (None, Some(color)) => {
                    let fill = match color {
                        Color::Black => palette.black,
                        Color::White => palette.white,
                    };
                    let _ = write!(
                        out,
                        "<span class=\"glift-stone\" style=\"color:{fill}\">{}</span>",
                        cell.cell_text()
                    );
                }
                _ => out.push_str(&escape_html(&cell.cell_text())),
            }
        }
    }
    out.push_str("</pre>");
    if !status.is_empty() {
        let _ = write!(out, "<div class=\"glift-status\">{}</div>", escape_html(status));
    }
    let _ = write!(
        out,
        "<div class=\"glift-comment\" style=\"background:{}\">{}</div></div>",
        palette.comment,
        escape_html(comment)
    );
    out
}

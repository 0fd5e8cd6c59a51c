use thiserror::Error;
use wasm_bindgen::JsValue;

use crate::point::Point;

/// Failures converting between SGF coordinates and [`Point`]s.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PointError {
    #[error("sgf point must be exactly two letters, but was {0:?}")]
    BadLength(String),
    #[error("could not convert coordinate {coord:?} of sgf point {value:?}; only a-zA-Z are allowed")]
    BadLetter { value: String, coord: char },
    #[error("point {0} cannot be expressed as an sgf coordinate")]
    OutOfRange(Point),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("property {0:?} does not name a stone colour")]
pub struct ColorError(pub String);

/// Property conversion failures raised while reading or writing node properties.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PropError {
    #[error("property {prop} is root-only, but was found at move {move_num}, variation {var_num}")]
    RootOnly {
        prop: String,
        move_num: usize,
        var_num: usize,
    },
    #[error("SZ: {0}")]
    Size(String),
    #[error("KM: {0}")]
    Komi(String),
    #[error("PL: {0}")]
    InitPlayer(String),
    #[error("B/W: {0}")]
    Move(String),
    #[error("C: {0}")]
    Comment(String),
    #[error(transparent)]
    Point(#[from] PointError),
    #[error(transparent)]
    Color(#[from] ColorError),
}

/// Parse failure with the position of the offending character.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SgfError {
    #[error("during state {state}, at index {index}, line {line}, column {column}, char {ch:?}: {message}")]
    Syntax {
        state: &'static str,
        index: usize,
        line: usize,
        column: usize,
        ch: char,
        message: String,
    },
    #[error("at index {index}, line {line}, column {column}: {source}")]
    Property {
        index: usize,
        line: usize,
        column: usize,
        #[source]
        source: PropError,
    },
    #[error("unexpected end of input: {0}")]
    UnexpectedEof(String),
    #[error("no game tree found in input")]
    Empty,
    #[error("serialising: {0}")]
    Serialize(#[from] PropError),
}

/// Illegal moves and invalid setup positions.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BoardError {
    #[error("illegal move: {point} out of bounds for {size}x{size} board")]
    OutOfBounds { point: Point, size: u8 },
    #[error("illegal move: {0} is already occupied")]
    Occupied(Point),
    #[error("illegal move: {0} is suicidal")]
    Suicide(Point),
    #[error("illegal move: {0} retakes a ko")]
    Ko(Point),
    #[error("invalid board state: stones at {0:?} have no liberties")]
    InvalidState(Vec<Point>),
    #[error("board size must be between 1 and 52, was {0}")]
    BadSize(u8),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TreepathError {
    #[error("path {path:?} at index {index}: separators '-', 'x' and the end must follow a digit")]
    MissingNumber { path: String, index: usize },
    #[error("path {path:?} at index {index}: bad number")]
    BadNumber { path: String, index: usize },
    #[error("path {path:?} at index {index}: a repeat 'x' cannot follow another repeat")]
    DoubleRepeat { path: String, index: usize },
    #[error("path {path:?} at index {index}: unexpected character {ch:?}")]
    UnexpectedChar { path: String, index: usize, ch: char },
    #[error("at traversed path {path}: {source}")]
    Apply {
        path: String,
        #[source]
        source: BoardError,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProblemError {
    #[error("the problem is already finished")]
    Finished,
    #[error("widget type {0} does not accept problem moves")]
    NotAProblem(String),
    #[error(transparent)]
    Board(#[from] BoardError),
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum OptionsError {
    #[error("option {0} must be set to a non-empty value")]
    Missing(&'static str),
    #[error("invalid options: {0}")]
    Decode(String),
}

/// Top-level error returned by the widget façade.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum GliftError {
    #[error(transparent)]
    Sgf(#[from] SgfError),
    #[error(transparent)]
    Board(#[from] BoardError),
    #[error(transparent)]
    Treepath(#[from] TreepathError),
    #[error(transparent)]
    Problem(#[from] ProblemError),
    #[error(transparent)]
    Options(#[from] OptionsError),
    #[error("{operation} is not available for {widget_type} widgets")]
    Unsupported {
        operation: &'static str,
        widget_type: &'static str,
    },
    #[error("no element with id {0:?} in the document")]
    MissingElement(String),
    #[error("no browser document is available")]
    NoDocument,
}

impl From<GliftError> for JsValue {
    fn from(err: GliftError) -> Self {
        JsValue::from(js_sys::Error::new(&err.to_string()))
    }
}

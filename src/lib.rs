#![deny(clippy::unwrap_used)]
//! WebAssembly port of the glift Go widgets: SGF parsing, board rules and embeddable viewers.
//!
//! The crate is layered bottom-up:
//!
//! * [`sgf`] parses SGF text into a [`MoveTree`], an arena of game-record nodes whose known
//!   properties (`SZ`, `KM`, `B`/`W`, `AB`/`AW`, `C`, ...) are converted by [`props`].
//! * [`BoardState`] applies moves and setup stones with capture, suicide and ko rules, and a
//!   [`Treepath`] replays a variation path onto it.
//! * [`display`] turns a position into a grid of intersection symbols and renders it as text or
//!   themed HTML, cropped to the region a problem uses ([`CropBox`]).
//! * [`Widget`] ties it together behind the options object accepted by [`create`], running either
//!   a game viewer or a problem with correct/incorrect grading ([`ProblemSession`]).
//!
//! From JavaScript:
//!
//! ```js
//! glift.create({
//!   sgf: problemSgf,
//!   sgfDefaults: { widgetType: 'STANDARD_PROBLEM' },
//!   divId: "glift_display1",
//!   display: { theme: 'DEPTH' },
//! });
//! ```

pub mod bbox;
mod board;
mod color;
pub mod display;
mod error;
mod movetree;
mod point;
pub mod problem;
pub mod props;
pub mod sample;
pub mod sgf;
mod treepath;
mod widget;

pub use bbox::{CropBox, CroppingPreset};
pub use board::{BoardState, GoBoard};
pub use color::Color;
pub use display::Theme;
pub use error::{
    BoardError, ColorError, GliftError, OptionsError, PointError, ProblemError, PropError,
    SgfError, TreepathError,
};
pub use movetree::{GameInfo, Move, MoveTree, Node, NodeId};
pub use point::Point;
pub use problem::{ProblemConditions, ProblemResult, ProblemSession};
pub use treepath::Treepath;
pub use widget::{
    create, default_options, DisplayOptions, GliftWidget, SgfDefaults, Widget, WidgetOptions,
    WidgetType,
};

use wasm_bindgen::prelude::*;

/// Install a panic hook sending Rust panics to the browser console. The hook is only compiled in
/// when the `console_error_panic_hook` feature is enabled (default).
#[wasm_bindgen]
pub fn init_panic_hook() {
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();
}

/// Route `log` records at or above `level` (`error`, `warn`, `info`, `debug`, `trace`) to the
/// browser console. Calling it twice is harmless.
#[wasm_bindgen(js_name = initLogging)]
pub fn init_logging(level: &str) -> Result<(), JsValue> {
    let level: log::Level = level
        .parse()
        .map_err(|_| JsValue::from(js_sys::Error::new(&format!("unknown log level {level:?}"))))?;
    if console_log::init_with_level(level).is_err() {
        log::debug!("logger already installed");
    }
    Ok(())
}

/// Mount the bundled corner problem into `#glift_display1` with the depth theme.
#[wasm_bindgen(js_name = createSample)]
pub fn create_sample() -> Result<GliftWidget, JsValue> {
    let widget = Widget::create(sample::sample_options())?;
    widget.mount()?;
    Ok(GliftWidget::from_widget(widget))
}

/// Parse `sgf` and write it back out in canonical form.
#[wasm_bindgen(js_name = normalizeSgf)]
pub fn normalize_sgf(sgf: &str) -> Result<String, JsValue> {
    let tree = sgf::parse(sgf).map_err(GliftError::from)?;
    Ok(sgf::serialize(&tree).map_err(GliftError::from)?)
}

/// Replay `path` (e.g. `"1-0"`) and return a single-node SGF with the position as setup stones.
#[wasm_bindgen(js_name = flattenSgf)]
pub fn flatten_sgf(sgf: &str, path: &str) -> Result<String, JsValue> {
    let tree = sgf::parse(sgf).map_err(GliftError::from)?;
    let path = Treepath::parse(path).map_err(GliftError::from)?;
    let flat = problem::flatten(&tree, &path)?;
    Ok(sgf::serialize(&flat).map_err(GliftError::from)?)
}

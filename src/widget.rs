use log::{debug, info};
use serde::{Deserialize, Serialize};
use wasm_bindgen::prelude::*;

use crate::bbox::{auto_crop, CropBox};
use crate::board::BoardState;
use crate::display::{self, Theme};
use crate::error::{GliftError, OptionsError, ProblemError};
use crate::movetree::{Move, MoveTree, NodeId};
use crate::point::Point;
use crate::problem::{ProblemConditions, ProblemResult, ProblemSession};
use crate::sgf;
use crate::treepath::Treepath;

/// Element id filled in by [`WidgetOptions::default`]. Decoded options must name one.
pub const DEFAULT_DIV_ID: &str = "glift_display";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum WidgetType {
    StandardProblem,
    CorrectVariationsProblem,
    Example,
    #[default]
    GameViewer,
    ReducedGameViewer,
}

impl WidgetType {
    pub const fn is_problem(self) -> bool {
        matches!(
            self,
            WidgetType::StandardProblem | WidgetType::CorrectVariationsProblem
        )
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            WidgetType::StandardProblem => "STANDARD_PROBLEM",
            WidgetType::CorrectVariationsProblem => "CORRECT_VARIATIONS_PROBLEM",
            WidgetType::Example => "EXAMPLE",
            WidgetType::GameViewer => "GAME_VIEWER",
            WidgetType::ReducedGameViewer => "REDUCED_GAME_VIEWER",
        }
    }
}

/// Per-record behaviour (`sgfDefaults`).
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SgfDefaults {
    #[serde(default)]
    pub widget_type: WidgetType,
    /// Treepath to the position shown first, e.g. `"0x3"`. Empty means the root.
    #[serde(default)]
    pub initial_position: String,
    #[serde(default)]
    pub problem_conditions: ProblemConditions,
}

/// Rendering options (`display`).
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DisplayOptions {
    #[serde(default)]
    pub theme: Theme,
    #[serde(default)]
    pub draw_board_coords: bool,
}

/// The object handed to `create`, mirroring the JavaScript options literal:
///
/// ```js
/// { sgf: "(;...)", sgfDefaults: { widgetType: 'STANDARD_PROBLEM' },
///   divId: "glift_display1", display: { theme: 'DEPTH' } }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WidgetOptions {
    #[serde(default)]
    pub sgf: String,
    #[serde(default)]
    pub sgf_defaults: SgfDefaults,
    #[serde(default)]
    pub div_id: String,
    #[serde(default)]
    pub display: DisplayOptions,
}

impl Default for WidgetOptions {
    fn default() -> Self {
        Self {
            sgf: String::new(),
            sgf_defaults: SgfDefaults::default(),
            div_id: DEFAULT_DIV_ID.to_string(),
            display: DisplayOptions::default(),
        }
    }
}

impl WidgetOptions {
    pub fn from_json(json: &str) -> Result<Self, OptionsError> {
        serde_json::from_str(json).map_err(|err| OptionsError::Decode(err.to_string()))
    }

    pub fn validate(&self) -> Result<(), OptionsError> {
        if self.sgf.trim().is_empty() {
            return Err(OptionsError::Missing("sgf"));
        }
        if self.div_id.trim().is_empty() {
            return Err(OptionsError::Missing("divId"));
        }
        Ok(())
    }
}

#[derive(Debug, Clone)]
enum Mode {
    Viewer { current: NodeId, board: BoardState },
    Problem(ProblemSession),
}

/// A parsed record plus the state of whatever widget is showing it.
#[derive(Debug, Clone)]
pub struct Widget {
    options: WidgetOptions,
    tree: MoveTree,
    crop: CropBox,
    start: NodeId,
    mode: Mode,
}

impl Widget {
    pub fn create(options: WidgetOptions) -> Result<Self, GliftError> {
        options.validate()?;
        let tree = sgf::parse(&options.sgf)?;
        let widget_type = options.sgf_defaults.widget_type;

        let initial = Treepath::parse(&options.sgf_defaults.initial_position)?;
        let start = initial.apply(&tree, tree.root());
        let crop = if widget_type.is_problem() {
            auto_crop(&tree)
        } else {
            CropBox::full(tree.board_size())
        };

        let mode = if widget_type.is_problem() {
            let conditions = options.sgf_defaults.problem_conditions.clone();
            Mode::Problem(ProblemSession::new(&tree, start, conditions)?)
        } else {
            Mode::Viewer {
                current: start,
                board: board_at(&tree, start)?,
            }
        };
        info!(
            "created {} widget for #{} ({} nodes)",
            widget_type.as_str(),
            options.div_id,
            tree.len()
        );
        Ok(Self {
            options,
            tree,
            crop,
            start,
            mode,
        })
    }

    pub fn options(&self) -> &WidgetOptions {
        &self.options
    }

    pub fn widget_type(&self) -> WidgetType {
        self.options.sgf_defaults.widget_type
    }

    pub fn tree(&self) -> &MoveTree {
        &self.tree
    }

    pub fn crop(&self) -> &CropBox {
        &self.crop
    }

    pub fn current(&self) -> NodeId {
        match &self.mode {
            Mode::Viewer { current, .. } => *current,
            Mode::Problem(session) => session.current(),
        }
    }

    pub fn board(&self) -> &BoardState {
        match &self.mode {
            Mode::Viewer { board, .. } => board,
            Mode::Problem(session) => session.board(),
        }
    }

    pub fn current_path(&self) -> Treepath {
        self.tree.path_to(self.current())
    }

    pub fn comment(&self) -> &str {
        &self.tree.node(self.current()).comment
    }

    /// Moves available from the current position, in variation order.
    pub fn variations(&self) -> Vec<Move> {
        self.tree
            .node(self.current())
            .children()
            .iter()
            .filter_map(|&child| self.tree.node(child).mv)
            .collect()
    }

    fn viewer_only(&self, operation: &'static str) -> Result<(), GliftError> {
        let widget_type = self.widget_type();
        if widget_type.is_problem() || widget_type == WidgetType::Example {
            return Err(GliftError::Unsupported {
                operation,
                widget_type: widget_type.as_str(),
            });
        }
        Ok(())
    }

    /// Step into `variation`. Returns `false` when there is no such child.
    pub fn next(&mut self, variation: usize) -> Result<bool, GliftError> {
        self.viewer_only("next")?;
        let Mode::Viewer { current, board } = &mut self.mode else {
            return Ok(false);
        };
        let Some(child) = self.tree.next(*current, variation) else {
            return Ok(false);
        };
        let node = self.tree.node(child);
        let mut next_board = board.clone();
        if !node.placements.is_empty() {
            next_board.set_placements(&node.placements)?;
        }
        if let Some(mv) = node.mv {
            next_board.place_stone(mv)?;
        }
        *board = next_board;
        *current = child;
        Ok(true)
    }

    /// Step back towards the initial position. Returns `false` at the start.
    pub fn prev(&mut self) -> Result<bool, GliftError> {
        self.viewer_only("prev")?;
        if self.current() == self.start {
            return Ok(false);
        }
        match self.tree.parent(self.current()) {
            Some(parent) => {
                self.jump(parent)?;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Jump to the node reached by `path` from the root.
    pub fn go_to(&mut self, path: &Treepath) -> Result<(), GliftError> {
        self.viewer_only("goTo")?;
        let target = path.apply(&self.tree, self.tree.root());
        self.jump(target)
    }

    fn jump(&mut self, target: NodeId) -> Result<(), GliftError> {
        let board = board_at(&self.tree, target)?;
        debug!("jumping to {}", self.tree.path_to(target).compact_string());
        self.mode = Mode::Viewer {
            current: target,
            board,
        };
        Ok(())
    }

    /// Play a solver move in a problem widget.
    pub fn play(&mut self, x: u8, y: u8) -> Result<ProblemResult, GliftError> {
        let widget_type = self.widget_type();
        let Mode::Problem(session) = &mut self.mode else {
            return Err(ProblemError::NotAProblem(widget_type.as_str().to_string()).into());
        };
        Ok(session.play(&self.tree, Point::new(x, y))?)
    }

    pub fn problem_result(&self) -> Option<ProblemResult> {
        match &self.mode {
            Mode::Problem(session) => session.result(),
            Mode::Viewer { .. } => None,
        }
    }

    /// Correct continuations from the current position (problem widgets only).
    pub fn correct_moves(&self) -> Vec<Point> {
        match &self.mode {
            Mode::Problem(session) => session.correct_moves(&self.tree),
            Mode::Viewer { .. } => Vec::new(),
        }
    }

    /// Back to the initial position.
    pub fn reset(&mut self) -> Result<(), GliftError> {
        if let Mode::Problem(session) = &mut self.mode {
            session.reset();
            return Ok(());
        }
        self.jump(self.start)
    }

    fn status(&self) -> &'static str {
        match self.problem_result() {
            Some(result) => result.as_str(),
            None => "",
        }
    }

    pub fn render_text(&self) -> String {
        let grid = display::snapshot(self.board(), &self.tree, self.current(), &self.crop);
        display::render_text(&grid, self.board().size(), self.options.display.draw_board_coords)
    }

    pub fn render_html(&self) -> String {
        let grid = display::snapshot(self.board(), &self.tree, self.current(), &self.crop);
        display::render_html(
            &grid,
            self.options.display.theme,
            self.comment(),
            self.status(),
        )
    }

    /// Write the rendered widget into the element named by `divId`.
    pub fn mount(&self) -> Result<(), GliftError> {
        mount_html(&self.options.div_id, &self.render_html())
    }
}

fn board_at(tree: &MoveTree, target: NodeId) -> Result<BoardState, GliftError> {
    let empty = BoardState::new(tree.board_size())?;
    let (board, _) = tree.path_to(target).apply_to_board(tree, tree.root(), &empty)?;
    Ok(board)
}

#[cfg(target_arch = "wasm32")]
fn mount_html(div_id: &str, html: &str) -> Result<(), GliftError> {
    let document = web_sys::window()
        .and_then(|window| window.document())
        .ok_or(GliftError::NoDocument)?;
    let container = document
        .get_element_by_id(div_id)
        .ok_or_else(|| GliftError::MissingElement(div_id.to_string()))?;
    container.set_inner_html(html);
    Ok(())
}

#[cfg(not(target_arch = "wasm32"))]
fn mount_html(_div_id: &str, _html: &str) -> Result<(), GliftError> {
    Err(GliftError::NoDocument)
}

/// JavaScript handle returned by [`create`].
#[wasm_bindgen]
pub struct GliftWidget {
    widget: Widget,
}

#[wasm_bindgen]
impl GliftWidget {
    /// Re-render into the widget's element.
    pub fn draw(&self) -> Result<(), JsValue> {
        self.widget.mount().map_err(JsValue::from)
    }

    #[wasm_bindgen(js_name = divId)]
    pub fn div_id(&self) -> String {
        self.widget.options().div_id.clone()
    }

    #[wasm_bindgen(js_name = widgetType)]
    pub fn widget_type(&self) -> String {
        self.widget.widget_type().as_str().to_string()
    }

    /// Play at `(x, y)` and redraw. Resolves to `CORRECT`, `INCORRECT` or `INDETERMINATE`.
    #[wasm_bindgen(js_name = playAt)]
    pub fn play_at(&mut self, x: u8, y: u8) -> Result<String, JsValue> {
        let result = self.widget.play(x, y)?;
        self.widget.mount()?;
        Ok(result.as_str().to_string())
    }

    pub fn next(&mut self, variation: usize) -> Result<bool, JsValue> {
        let moved = self.widget.next(variation)?;
        self.widget.mount()?;
        Ok(moved)
    }

    pub fn prev(&mut self) -> Result<bool, JsValue> {
        let moved = self.widget.prev()?;
        self.widget.mount()?;
        Ok(moved)
    }

    #[wasm_bindgen(js_name = goTo)]
    pub fn go_to(&mut self, path: &str) -> Result<(), JsValue> {
        let path = Treepath::parse(path).map_err(GliftError::from)?;
        self.widget.go_to(&path)?;
        self.widget.mount()?;
        Ok(())
    }

    pub fn reset(&mut self) -> Result<(), JsValue> {
        self.widget.reset()?;
        self.widget.mount()?;
        Ok(())
    }

    /// Current position as a compact treepath such as `-1-0`.
    #[wasm_bindgen(js_name = currentPath)]
    pub fn current_path(&self) -> String {
        self.widget.current_path().compact_string()
    }

    pub fn comment(&self) -> String {
        self.widget.comment().to_string()
    }

    #[wasm_bindgen(js_name = correctMoves)]
    pub fn correct_moves(&self) -> Result<JsValue, JsValue> {
        serde_wasm_bindgen::to_value(&self.widget.correct_moves()).map_err(JsValue::from)
    }

    #[wasm_bindgen(js_name = boardText)]
    pub fn board_text(&self) -> String {
        self.widget.render_text()
    }

    pub fn html(&self) -> String {
        self.widget.render_html()
    }

    /// The record as SGF, normalised by a parse and write.
    pub fn sgf(&self) -> Result<String, JsValue> {
        sgf::serialize(self.widget.tree()).map_err(|err| JsValue::from(GliftError::from(err)))
    }
}

impl GliftWidget {
    pub fn from_widget(widget: Widget) -> Self {
        Self { widget }
    }
}

/// Build a widget from a JavaScript options object and render it into `divId`.
#[wasm_bindgen]
pub fn create(options: JsValue) -> Result<GliftWidget, JsValue> {
    let options: WidgetOptions = serde_wasm_bindgen::from_value(options)
        .map_err(|err| GliftError::from(OptionsError::Decode(err.to_string())))?;
    let widget = Widget::create(options)?;
    widget.mount()?;
    Ok(GliftWidget::from_widget(widget))
}

/// Options with every default filled in.
#[wasm_bindgen(js_name = defaultOptions)]
pub fn default_options() -> Result<JsValue, JsValue> {
    serde_wasm_bindgen::to_value(&WidgetOptions::default()).map_err(JsValue::from)
}

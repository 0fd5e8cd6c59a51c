use std::collections::BTreeMap;

use log::{debug, info};
use serde::{Deserialize, Serialize};

use crate::board::BoardState;
use crate::color::Color;
use crate::error::{GliftError, ProblemError};
use crate::movetree::{Move, MoveTree, NodeId};
use crate::point::Point;
use crate::treepath::Treepath;

/// Property key to substrings marking a correct position. An empty list means the property
/// only has to be present.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProblemConditions(pub BTreeMap<String, Vec<String>>);

impl Default for ProblemConditions {
    fn default() -> Self {
        let mut conditions = BTreeMap::new();
        conditions.insert("GB".to_string(), Vec::new());
        conditions.insert(
            "C".to_string(),
            vec![
                "Correct".to_string(),
                "is correct".to_string(),
                "is the correct".to_string(),
            ],
        );
        Self(conditions)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ProblemResult {
    Correct,
    Incorrect,
    Indeterminate,
}

impl ProblemResult {
    pub const fn as_str(self) -> &'static str {
        match self {
            ProblemResult::Correct => "CORRECT",
            ProblemResult::Incorrect => "INCORRECT",
            ProblemResult::Indeterminate => "INDETERMINATE",
        }
    }
}

/// Whether the position at `node` satisfies any of `conditions`.
pub fn is_correct_position(tree: &MoveTree, node: NodeId, conditions: &ProblemConditions) -> bool {
    conditions.0.iter().any(|(key, needles)| {
        if needles.is_empty() {
            return tree.has_property(node, key);
        }
        tree.property_values(node, key)
            .iter()
            .any(|value| needles.iter().any(|needle| value.contains(needle.as_str())))
    })
}

/// Whether any position in the subtree rooted at `node` is correct.
pub fn leads_to_correct(tree: &MoveTree, node: NodeId, conditions: &ProblemConditions) -> bool {
    tree.descendants(node)
        .into_iter()
        .any(|id| is_correct_position(tree, id, conditions))
}

/// Children of `node` that can still reach a correct position.
pub fn correct_next_moves(
    tree: &MoveTree,
    node: NodeId,
    conditions: &ProblemConditions,
) -> Vec<NodeId> {
    tree.node(node)
        .children()
        .iter()
        .copied()
        .filter(|&child| leads_to_correct(tree, child, conditions))
        .collect()
}

/// Colour the solver plays: `PL`, else the first move's colour, else black.
pub fn solver_color(tree: &MoveTree) -> Color {
    if let Some(player) = tree.game_info().and_then(|info| info.player) {
        return player;
    }
    let mut first = None;
    tree.traverse(tree.root(), |_, node| {
        if first.is_none() {
            first = node.mv.map(|mv| mv.color);
        }
    });
    first.unwrap_or(Color::Black)
}

/// Replay `path` from the root and return a one-node record whose setup stones hold the
/// resulting position. Root game info, comment and raw properties carry over.
pub fn flatten(tree: &MoveTree, path: &Treepath) -> Result<MoveTree, GliftError> {
    let empty = BoardState::new(tree.board_size())?;
    let (board, _) = path.apply_to_board(tree, tree.root(), &empty)?;

    let mut placements = board.stones();
    placements.sort_by_key(|mv| mv.color);

    let source = tree.node(tree.root());
    let mut flat = MoveTree::new();
    let root = flat.root();
    let node = flat.node_mut(root);
    node.game_info = source.game_info.clone();
    node.comment = source.comment.clone();
    node.properties = source.properties.clone();
    node.placements = placements;
    debug!(
        "flattened {} into {} setup stones",
        path.compact_string(),
        node.placements.len()
    );
    Ok(flat)
}

/// Tracks a solver working through a problem from a start position.
#[derive(Debug, Clone)]
pub struct ProblemSession {
    start: NodeId,
    start_board: BoardState,
    current: NodeId,
    board: BoardState,
    solver: Color,
    conditions: ProblemConditions,
    finished: Option<ProblemResult>,
    /// Stone shown after a move that left the tree.
    stray: Option<Move>,
}

impl ProblemSession {
    pub fn new(
        tree: &MoveTree,
        start: NodeId,
        conditions: ProblemConditions,
    ) -> Result<Self, GliftError> {
        let empty = BoardState::new(tree.board_size())?;
        let path = tree.path_to(start);
        let (board, _) = path.apply_to_board(tree, tree.root(), &empty)?;
        let solver = solver_color(tree);
        debug!("problem starts at {} with {} to play", path.compact_string(), solver);
        Ok(Self {
            start,
            start_board: board.clone(),
            current: start,
            board,
            solver,
            conditions,
            finished: None,
            stray: None,
        })
    }

    pub fn board(&self) -> &BoardState {
        &self.board
    }

    pub fn current(&self) -> NodeId {
        self.current
    }

    pub fn solver(&self) -> Color {
        self.solver
    }

    pub fn result(&self) -> Option<ProblemResult> {
        self.finished
    }

    pub fn conditions(&self) -> &ProblemConditions {
        &self.conditions
    }

    /// Path from the start position to the current node.
    pub fn path(&self, tree: &MoveTree) -> Treepath {
        let full = tree.path_to(self.current);
        let skip = tree.node(self.start).move_num();
        Treepath::from(full.as_slice()[skip..].to_vec())
    }

    /// Play the solver's stone at `point` and, when the line continues, the opponent's reply.
    pub fn play(&mut self, tree: &MoveTree, point: Point) -> Result<ProblemResult, ProblemError> {
        if self.finished.is_some() {
            return Err(ProblemError::Finished);
        }
        let mv = Move::new(self.solver, point);
        let mut next_board = self.board.clone();
        next_board.place_stone(mv)?;

        let matching = tree
            .node(self.current)
            .children()
            .iter()
            .copied()
            .find(|&child| tree.node(child).mv == Some(mv));

        let Some(reached) = matching else {
            info!("move {mv} is not in the problem tree");
            self.board = next_board;
            self.stray = Some(mv);
            return Ok(self.finish(ProblemResult::Incorrect));
        };
        if is_correct_position(tree, reached, &self.conditions) {
            self.commit(reached, next_board);
            return Ok(self.finish(ProblemResult::Correct));
        }
        let Some(response) = tree.next(reached, 0) else {
            self.commit(reached, next_board);
            return Ok(self.finish(ProblemResult::Incorrect));
        };

        if let Some(reply) = tree.node(response).mv {
            next_board.place_stone(reply)?;
        }
        self.commit(response, next_board);
        debug!("responded with variation 0 at {}", self.path(tree).compact_string());

        if tree.node(response).is_leaf() {
            let result = if is_correct_position(tree, response, &self.conditions) {
                ProblemResult::Correct
            } else {
                ProblemResult::Incorrect
            };
            return Ok(self.finish(result));
        }
        Ok(ProblemResult::Indeterminate)
    }

    /// Solver moves from the current position that can still reach a correct position.
    pub fn correct_moves(&self, tree: &MoveTree) -> Vec<Point> {
        correct_next_moves(tree, self.current, &self.conditions)
            .into_iter()
            .filter_map(|child| tree.node(child).mv.and_then(|mv| mv.point))
            .collect()
    }

    pub fn stray_move(&self) -> Option<Move> {
        self.stray
    }

    pub fn reset(&mut self) {
        self.current = self.start;
        self.board = self.start_board.clone();
        self.finished = None;
        self.stray = None;
    }

    fn commit(&mut self, node: NodeId, board: BoardState) {
        self.current = node;
        self.board = board;
    }

    fn finish(&mut self, result: ProblemResult) -> ProblemResult {
        info!("problem finished: {}", result.as_str());
        self.finished = Some(result);
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::BoardError;
    use crate::sample::PROBLEM_SGF;
    use crate::sgf;

    fn pt(sgf: &str) -> Point {
        Point::from_sgf(sgf).expect("valid coordinate")
    }

    fn session(tree: &MoveTree) -> ProblemSession {
        ProblemSession::new(tree, tree.root(), ProblemConditions::default()).expect("valid start")
    }

    #[test]
    fn default_conditions_match_gb_and_comments() {
        let tree = sgf::parse("(;C[start](;B[aa]GB[1])(;B[bb]C[That is correct!])(;B[cc]C[nope]))")
            .expect("parses");
        let conditions = ProblemConditions::default();
        let root = tree.root();
        let ids: Vec<NodeId> = tree.node(root).children().to_vec();
        assert!(is_correct_position(&tree, ids[0], &conditions));
        assert!(is_correct_position(&tree, ids[1], &conditions));
        assert!(!is_correct_position(&tree, ids[2], &conditions));
        assert!(!is_correct_position(&tree, root, &conditions));
        assert_eq!(correct_next_moves(&tree, root, &conditions), vec![ids[0], ids[1]]);
    }

    #[test]
    fn sample_problem_correct_variations() {
        let tree = sgf::parse(PROBLEM_SGF).expect("sample parses");
        let conditions = ProblemConditions::default();
        let correct: Vec<Point> = correct_next_moves(&tree, tree.root(), &conditions)
            .into_iter()
            .filter_map(|id| tree.node(id).mv.and_then(|mv| mv.point))
            .collect();
        assert_eq!(correct, vec![pt("ma")]);
        assert_eq!(solver_color(&tree), Color::Black);
    }

    #[test]
    fn solving_the_sample_problem() {
        let tree = sgf::parse(PROBLEM_SGF).expect("sample parses");
        let mut session = session(&tree);

        assert_eq!(session.play(&tree, pt("ma")), Ok(ProblemResult::Indeterminate));
        assert_eq!(session.board().color_at(pt("oa")), Some(Color::White));
        assert_eq!(session.path(&tree).as_slice(), &[1, 0]);

        assert_eq!(session.play(&tree, pt("nc")), Ok(ProblemResult::Indeterminate));
        assert_eq!(session.board().color_at(pt("nd")), Some(Color::White));

        assert_eq!(session.play(&tree, pt("mc")), Ok(ProblemResult::Correct));
        assert_eq!(session.result(), Some(ProblemResult::Correct));
        assert_eq!(session.play(&tree, pt("aa")), Err(ProblemError::Finished));
    }

    #[test]
    fn failing_lines_are_incorrect() {
        let tree = sgf::parse(PROBLEM_SGF).expect("sample parses");

        // B[mc] W[nc]: the reply ends the line and white lives.
        let mut session = session(&tree);
        assert_eq!(session.play(&tree, pt("mc")), Ok(ProblemResult::Incorrect));
        assert_eq!(session.board().color_at(pt("nc")), Some(Color::White));

        session.reset();
        assert_eq!(session.result(), None);
        assert_eq!(session.current(), tree.root());
        assert_eq!(session.board().color_at(pt("mc")), None);

        // A stone outside the tree is shown and ends the attempt.
        assert_eq!(session.play(&tree, pt("sk")), Ok(ProblemResult::Incorrect));
        assert_eq!(session.stray_move(), Some(Move::new(Color::Black, pt("sk"))));
        assert_eq!(session.board().color_at(pt("sk")), Some(Color::Black));
    }

    #[test]
    fn illegal_moves_leave_the_session_untouched() {
        let tree = sgf::parse(PROBLEM_SGF).expect("sample parses");
        let mut session = session(&tree);
        assert!(matches!(
            session.play(&tree, pt("pa")),
            Err(ProblemError::Board(_))
        ));
        assert_eq!(session.result(), None);
        assert_eq!(session.current(), tree.root());
    }

    #[test]
    fn illegal_reply_leaves_the_session_untouched() {
        let tree = sgf::parse("(;SZ[9];B[aa];W[aa];B[bb]C[Correct])").expect("parses");
        let mut session = session(&tree);
        assert_eq!(
            session.play(&tree, pt("aa")),
            Err(ProblemError::Board(BoardError::Occupied(pt("aa"))))
        );
        assert_eq!(session.current(), tree.root());
        assert!(session.board().stones().is_empty());
        assert_eq!(session.result(), None);
    }

    #[test]
    fn flatten_turns_a_line_into_setup_stones() {
        let tree = sgf::parse(PROBLEM_SGF).expect("sample parses");
        let path = Treepath::parse("1-0").expect("valid path");
        let flat = flatten(&tree, &path).expect("legal line");

        let root = flat.node(flat.root());
        assert_eq!(flat.len(), 1);
        assert_eq!(root.mv, None);
        assert_eq!(flat.board_size(), 19);
        assert!(root.comment.starts_with("Black to play."));
        assert_eq!(root.properties.get("RU"), Some(&vec!["Japanese".to_string()]));
        assert!(root.placements.contains(&Move::new(Color::Black, pt("ma"))));
        assert!(root.placements.contains(&Move::new(Color::White, pt("oa"))));
        assert_eq!(
            root.placements.iter().filter(|mv| mv.color == Color::Black).count(),
            17
        );
        assert_eq!(
            root.placements.iter().filter(|mv| mv.color == Color::White).count(),
            12
        );

        let written = sgf::serialize(&flat).expect("serialises");
        assert_eq!(sgf::parse(&written).expect("reparses"), flat);
    }

    #[test]
    fn initial_player_overrides_first_move() {
        let tree = sgf::parse("(;PL[W];B[aa])").expect("parses");
        assert_eq!(solver_color(&tree), Color::White);
        let tree = sgf::parse("(;;W[aa])").expect("parses");
        assert_eq!(solver_color(&tree), Color::White);
        let tree = sgf::parse("(;C[empty])").expect("parses");
        assert_eq!(solver_color(&tree), Color::Black);
    }

    #[test]
    fn conditions_deserialise_from_map() {
        let conditions: ProblemConditions =
            serde_json::from_str(r#"{"GB": [], "C": ["Right"]}"#).expect("valid json");
        assert_eq!(conditions.0.get("C"), Some(&vec!["Right".to_string()]));
    }
}

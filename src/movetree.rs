//! Arena-backed tree of moves read from an SGF record.
//!
//! Nodes live in a single `Vec` and refer to each other through [`NodeId`]s, so the tree can be
//! walked in both directions without reference counting. The root always has id `0`.

use std::collections::{BTreeMap, VecDeque};
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::color::Color;
use crate::point::Point;
use crate::treepath::Treepath;

/// Board size assumed when `SZ` is absent.
pub const DEFAULT_BOARD_SIZE: u8 = 19;

/// A coloured move; `point == None` is a pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Move {
    pub color: Color,
    pub point: Option<Point>,
}

impl Move {
    pub const fn new(color: Color, point: Point) -> Self {
        Self {
            color,
            point: Some(point),
        }
    }

    pub const fn pass(color: Color) -> Self {
        Self { color, point: None }
    }

    pub const fn is_pass(&self) -> bool {
        self.point.is_none()
    }
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.point {
            Some(point) => write!(f, "{{{}, {}}}", self.color, point),
            None => write!(f, "{{{}, pass}}", self.color),
        }
    }
}

/// Typed game properties that may only appear on the root.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GameInfo {
    /// Between 1 and 25; `0` means unspecified and reads as 19x19.
    pub size: u8,
    pub komi: Option<f64>,
    /// Player to move first, from `PL`.
    pub player: Option<Color>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeId(pub usize);

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Node {
    move_num: usize,
    var_num: usize,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    pub mv: Option<Move>,
    /// Setup stones (`AB`/`AW`), not moves.
    pub placements: Vec<Move>,
    pub comment: String,
    pub game_info: Option<GameInfo>,
    /// Properties without a typed converter, kept verbatim.
    pub properties: BTreeMap<String, Vec<String>>,
}

impl Node {
    /// Depth of the node; the root is move 0.
    pub fn move_num(&self) -> usize {
        self.move_num
    }

    /// Index of this node among its siblings; 0 is the main line.
    pub fn var_num(&self) -> usize {
        self.var_num
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct MoveTree {
    nodes: Vec<Node>,
}

impl Default for MoveTree {
    fn default() -> Self {
        Self::new()
    }
}

impl MoveTree {
    pub fn new() -> Self {
        Self {
            nodes: vec![Node::default()],
        }
    }

    pub const fn root(&self) -> NodeId {
        NodeId(0)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Panics on ids that did not come from this tree.
    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.0]
    }

    pub fn node_mut(&mut self, id: NodeId) -> &mut Node {
        &mut self.nodes[id.0]
    }

    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.0)
    }

    /// Append a fresh child under `parent` and return its id.
    pub fn add_child(&mut self, parent: NodeId) -> NodeId {
        let id = NodeId(self.nodes.len());
        let parent_node = &mut self.nodes[parent.0];
        let child = Node {
            move_num: parent_node.move_num + 1,
            var_num: parent_node.children.len(),
            parent: Some(parent),
            ..Node::default()
        };
        parent_node.children.push(id);
        self.nodes.push(child);
        id
    }

    /// Child at `variation`, if present.
    pub fn next(&self, id: NodeId, variation: usize) -> Option<NodeId> {
        self.node(id).children.get(variation).copied()
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.node(id).parent
    }

    pub fn game_info(&self) -> Option<&GameInfo> {
        self.nodes[0].game_info.as_ref()
    }

    pub fn board_size(&self) -> u8 {
        match self.game_info().map(|info| info.size) {
            Some(size) if size > 0 => size,
            _ => DEFAULT_BOARD_SIZE,
        }
    }

    /// Treepath leading from the root to `id`.
    pub fn path_to(&self, id: NodeId) -> Treepath {
        let mut path = Vec::new();
        let mut cursor = id;
        while let Some(parent) = self.node(cursor).parent {
            path.push(self.node(cursor).var_num);
            cursor = parent;
        }
        path.reverse();
        Treepath::from(path)
    }

    /// Raw values for `key`, with typed properties folded back in so callers can match on
    /// `C`, `B`/`W` and `AB`/`AW` the same way as on unprocessed ones.
    pub fn property_values(&self, id: NodeId, key: &str) -> Vec<String> {
        let node = self.node(id);
        match key {
            "C" if !node.comment.is_empty() => vec![node.comment.clone()],
            "B" | "W" => node
                .mv
                .filter(|mv| mv.color.as_sgf() == key)
                .map(|mv| {
                    mv.point
                        .and_then(|point| point.to_sgf().ok())
                        .unwrap_or_default()
                })
                .into_iter()
                .collect(),
            "AB" | "AW" => node
                .placements
                .iter()
                .filter(|mv| Color::from_sgf_prop(key).ok() == Some(mv.color))
                .filter_map(|mv| mv.point.and_then(|point| point.to_sgf().ok()))
                .collect(),
            _ => node.properties.get(key).cloned().unwrap_or_default(),
        }
    }

    pub fn has_property(&self, id: NodeId, key: &str) -> bool {
        let node = self.node(id);
        match key {
            "C" => !node.comment.is_empty(),
            "B" | "W" => node.mv.is_some_and(|mv| mv.color.as_sgf() == key),
            _ => node.properties.contains_key(key) || !self.property_values(id, key).is_empty(),
        }
    }

    /// Breadth-first walk starting at `from`.
    pub fn traverse(&self, from: NodeId, mut visit: impl FnMut(NodeId, &Node)) {
        let mut queue = VecDeque::from([from]);
        while let Some(id) = queue.pop_front() {
            let node = self.node(id);
            visit(id, node);
            queue.extend(node.children.iter().copied());
        }
    }

    /// Walk the main line (variation 0 at each step) starting at `from`.
    pub fn traverse_main_branch(&self, from: NodeId, mut visit: impl FnMut(NodeId, &Node)) {
        let mut cursor = Some(from);
        while let Some(id) = cursor {
            let node = self.node(id);
            visit(id, node);
            cursor = node.children.first().copied();
        }
    }

    /// Depth-first pre-order listing of the subtree rooted at `from`.
    pub fn descendants(&self, from: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack = vec![from];
        while let Some(id) = stack.pop() {
            out.push(id);
            stack.extend(self.node(id).children.iter().rev().copied());
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small_tree() -> MoveTree {
        // root -> a -> b
        //      \-> c
        let mut tree = MoveTree::new();
        let root = tree.root();
        let a = tree.add_child(root);
        tree.node_mut(a).mv = Some(Move::new(Color::Black, Point::new(2, 2)));
        let b = tree.add_child(a);
        tree.node_mut(b).mv = Some(Move::pass(Color::White));
        let c = tree.add_child(root);
        tree.node_mut(c).comment = "side line".to_string();
        tree
    }

    #[test]
    fn children_get_move_and_variation_numbers() {
        let tree = small_tree();
        let c = tree.next(tree.root(), 1).expect("second variation");
        assert_eq!(tree.node(c).move_num(), 1);
        assert_eq!(tree.node(c).var_num(), 1);
        let b = tree
            .next(tree.root(), 0)
            .and_then(|a| tree.next(a, 0))
            .expect("main line");
        assert_eq!(tree.node(b).move_num(), 2);
        assert_eq!(tree.next(b, 0), None);
    }

    #[test]
    fn traversal_orders() {
        let tree = small_tree();
        let mut bfs = Vec::new();
        tree.traverse(tree.root(), |id, _| bfs.push(id.0));
        assert_eq!(bfs, vec![0, 1, 3, 2]);

        let mut main = Vec::new();
        tree.traverse_main_branch(tree.root(), |id, _| main.push(id.0));
        assert_eq!(main, vec![0, 1, 2]);

        let dfs: Vec<usize> = tree.descendants(tree.root()).iter().map(|id| id.0).collect();
        assert_eq!(dfs, vec![0, 1, 2, 3]);
    }

    #[test]
    fn path_to_node() {
        let tree = small_tree();
        assert_eq!(tree.path_to(NodeId(2)).as_slice(), &[0, 0]);
        assert_eq!(tree.path_to(NodeId(3)).as_slice(), &[1]);
        assert!(tree.path_to(tree.root()).is_empty());
    }

    #[test]
    fn property_lookup_includes_typed_fields() {
        let tree = small_tree();
        assert_eq!(tree.property_values(NodeId(3), "C"), vec!["side line".to_string()]);
        assert_eq!(tree.property_values(NodeId(1), "B"), vec!["cc".to_string()]);
        assert!(tree.property_values(NodeId(1), "W").is_empty());
        assert!(tree.has_property(NodeId(2), "W"));
        assert!(!tree.has_property(NodeId(2), "GB"));
        assert_eq!(tree.board_size(), DEFAULT_BOARD_SIZE);
    }
}

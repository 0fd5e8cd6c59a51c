//! Typed conversion of SGF properties to and from [`Node`] fields.
//!
//! Each converter owns a set of property identifiers and a scope. Properties without a converter
//! are kept verbatim in [`Node::properties`].

use log::debug;

use crate::color::Color;
use crate::error::PropError;
use crate::movetree::{GameInfo, Move, MoveTree, Node, NodeId};
use crate::point::Point;

/// Every property defined by FF[4]; anything else is still kept, but logged.
pub const KNOWN_PROPERTIES: &[&str] = &[
    "AB", "AE", "AN", "AP", "AR", "AW", "B", "BL", "BM", "BR", "BT", "C", "CA", "CP", "CR", "DD",
    "DM", "DO", "DT", "EV", "FF", "FG", "GB", "GC", "GM", "GN", "GW", "HA", "HO", "IT", "KM",
    "KO", "LB", "LN", "MA", "MN", "N", "OB", "ON", "OT", "OW", "PB", "PC", "PL", "PM", "PW", "RE",
    "RO", "RU", "SL", "SO", "SQ", "ST", "SZ", "TB", "TE", "TM", "TR", "TW", "UC", "US", "V", "VW",
    "W", "WL", "WR", "WT",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scope {
    /// Only valid on the root node.
    Root,
    All,
}

type FromSgf = fn(&mut Node, &str, &[String]) -> Result<(), PropError>;
type ToSgf = fn(&Node) -> Result<String, PropError>;

pub struct Converter {
    pub props: &'static [&'static str],
    pub scope: Scope,
    from: FromSgf,
    to: ToSgf,
}

/// Converters in serialisation order.
static CONVERTERS: [Converter; 6] = [
    Converter {
        props: &["SZ"],
        scope: Scope::Root,
        from: size_from,
        to: size_to,
    },
    Converter {
        props: &["KM"],
        scope: Scope::Root,
        from: komi_from,
        to: komi_to,
    },
    Converter {
        props: &["PL"],
        scope: Scope::Root,
        from: init_player_from,
        to: init_player_to,
    },
    Converter {
        props: &["B", "W"],
        scope: Scope::All,
        from: move_from,
        to: move_to,
    },
    Converter {
        props: &["AB", "AW"],
        scope: Scope::All,
        from: placements_from,
        to: placements_to,
    },
    Converter {
        props: &["C"],
        scope: Scope::All,
        from: comment_from,
        to: comment_to,
    },
];

pub fn converter(prop: &str) -> Option<&'static Converter> {
    CONVERTERS.iter().find(|conv| conv.props.contains(&prop))
}

pub fn is_known(prop: &str) -> bool {
    KNOWN_PROPERTIES.contains(&prop)
}

/// Store `values` for `prop` on node `id`, through its converter when one exists.
pub fn process_property(
    tree: &mut MoveTree,
    id: NodeId,
    prop: &str,
    values: &[String],
) -> Result<(), PropError> {
    let node = tree.node_mut(id);
    let Some(conv) = converter(prop) else {
        if !is_known(prop) {
            debug!("keeping unknown SGF property {prop} at move {}", node.move_num());
        }
        node.properties
            .entry(prop.to_string())
            .or_default()
            .extend(values.iter().cloned());
        return Ok(());
    };
    if conv.scope == Scope::Root && (node.move_num() != 0 || node.var_num() != 0) {
        return Err(PropError::RootOnly {
            prop: prop.to_string(),
            move_num: node.move_num(),
            var_num: node.var_num(),
        });
    }
    (conv.from)(node, prop, values)
}

/// Serialise every property of `node` (without the leading `;`).
pub fn write_node(node: &Node) -> Result<String, PropError> {
    let mut out = String::new();
    for conv in &CONVERTERS {
        if conv.scope == Scope::Root && node.move_num() != 0 {
            continue;
        }
        out.push_str(&(conv.to)(node)?);
    }
    for (key, values) in &node.properties {
        out.push_str(key);
        for value in values {
            out.push('[');
            out.push_str(&escape(value));
            out.push(']');
        }
    }
    Ok(out)
}

/// Escape property text so that it survives a parse.
pub fn escape(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for ch in value.chars() {
        if ch == ']' || ch == '\\' {
            out.push('\\');
        }
        out.push(ch);
    }
    out
}

fn game_info(node: &mut Node) -> &mut GameInfo {
    node.game_info.get_or_insert_with(GameInfo::default)
}

fn size_from(node: &mut Node, _prop: &str, data: &[String]) -> Result<(), PropError> {
    let [value] = data else {
        return Err(PropError::Size(format!(
            "expected exactly one value, found {}",
            data.len()
        )));
    };
    let size: u32 = value
        .trim()
        .parse()
        .map_err(|_| PropError::Size(format!("{value:?} is not an integer")))?;
    let size = u8::try_from(size)
        .ok()
        .filter(|size| (1..=25).contains(size))
        .ok_or_else(|| {
            PropError::Size(format!("size was {size}, but must be between 1 and 25"))
        })?;
    game_info(node).size = size;
    Ok(())
}

fn size_to(node: &Node) -> Result<String, PropError> {
    match node.game_info.as_ref().map(|info| info.size) {
        None | Some(0) => Ok(String::new()),
        Some(size @ 1..=25) => Ok(format!("SZ[{size}]")),
        Some(size) => Err(PropError::Size(format!(
            "size was {size}, but only values between 1 and 25 are allowed"
        ))),
    }
}

fn valid_komi(komi: f64) -> bool {
    let fraction = komi.fract().abs();
    fraction == 0.0 || fraction == 0.5
}

fn komi_from(node: &mut Node, _prop: &str, data: &[String]) -> Result<(), PropError> {
    let [value] = data else {
        return Err(PropError::Komi(format!(
            "expected exactly one value, found {}",
            data.len()
        )));
    };
    let komi: f64 = value
        .trim()
        .parse()
        .map_err(|_| PropError::Komi(format!("{value:?} is not a number")))?;
    if !valid_komi(komi) {
        return Err(PropError::Komi(format!(
            "value was {komi}, but only .0 or .5 fractions are allowed"
        )));
    }
    game_info(node).komi = Some(komi);
    Ok(())
}

fn komi_to(node: &Node) -> Result<String, PropError> {
    match node.game_info.as_ref().and_then(|info| info.komi) {
        None => Ok(String::new()),
        Some(komi) if valid_komi(komi) => Ok(format!("KM[{komi:.1}]")),
        Some(komi) => Err(PropError::Komi(format!(
            "value was {komi}, but only .0 or .5 fractions are allowed"
        ))),
    }
}

fn init_player_from(node: &mut Node, _prop: &str, data: &[String]) -> Result<(), PropError> {
    let [value] = data else {
        return Err(PropError::InitPlayer(format!(
            "requires exactly one value, but had {}",
            data.len()
        )));
    };
    let color = Color::from_letter(value)
        .ok_or_else(|| PropError::InitPlayer(format!("invalid value {value:?}")))?;
    game_info(node).player = Some(color);
    Ok(())
}

fn init_player_to(node: &Node) -> Result<String, PropError> {
    Ok(node
        .game_info
        .as_ref()
        .and_then(|info| info.player)
        .map(|color| format!("PL[{color}]"))
        .unwrap_or_default())
}

fn move_from(node: &mut Node, prop: &str, data: &[String]) -> Result<(), PropError> {
    let color = Color::from_sgf_prop(prop)?;
    if node.mv.is_some() {
        return Err(PropError::Move("found two moves on one node".to_string()));
    }
    let mv = match data {
        [] => Move::pass(color),
        [value] if value.is_empty() => Move::pass(color),
        [value] => Move::new(color, Point::from_sgf(value)?),
        _ => {
            return Err(PropError::Move(format!(
                "expected zero or one value, found {}",
                data.len()
            )))
        }
    };
    node.mv = Some(mv);
    Ok(())
}

fn move_to(node: &Node) -> Result<String, PropError> {
    let Some(mv) = node.mv else {
        return Ok(String::new());
    };
    let point = match mv.point {
        Some(point) => point.to_sgf()?,
        None => String::new(),
    };
    Ok(format!("{}[{point}]", mv.color))
}

fn placements_from(node: &mut Node, prop: &str, data: &[String]) -> Result<(), PropError> {
    let color = Color::from_sgf_prop(prop)?;
    for value in data {
        node.placements.push(Move::new(color, Point::from_sgf(value)?));
    }
    // Stored black first, matching the order `placements_to` writes.
    node.placements.sort_by_key(|mv| mv.color);
    Ok(())
}

fn placements_to(node: &Node) -> Result<String, PropError> {
    let mut out = String::new();
    for color in [Color::Black, Color::White] {
        let mut points = node
            .placements
            .iter()
            .filter(|mv| mv.color == color)
            .filter_map(|mv| mv.point)
            .peekable();
        if points.peek().is_none() {
            continue;
        }
        out.push('A');
        out.push_str(color.as_sgf());
        for point in points {
            out.push('[');
            out.push_str(&point.to_sgf()?);
            out.push(']');
        }
    }
    Ok(out)
}

fn comment_from(node: &mut Node, _prop: &str, data: &[String]) -> Result<(), PropError> {
    if !node.comment.is_empty() {
        return Err(PropError::Comment(format!(
            "already found on node: {:?}",
            node.comment
        )));
    }
    match data {
        [] => Ok(()),
        [value] => {
            node.comment = value.clone();
            Ok(())
        }
        _ => Err(PropError::Comment(format!(
            "comment only allows one value, found {}",
            data.len()
        ))),
    }
}

fn comment_to(node: &Node) -> Result<String, PropError> {
    if node.comment.is_empty() {
        return Ok(String::new());
    }
    Ok(format!("C[{}]", escape(&node.comment)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn values(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn size_is_validated() {
        let mut tree = MoveTree::new();
        let root = tree.root();
        assert!(process_property(&mut tree, root, "SZ", &values(&["13"])).is_ok());
        assert_eq!(tree.board_size(), 13);
        assert!(matches!(
            process_property(&mut tree, root, "SZ", &values(&["26"])),
            Err(PropError::Size(_))
        ));
        assert!(matches!(
            process_property(&mut tree, root, "SZ", &values(&["19:19"])),
            Err(PropError::Size(_))
        ));
        assert_eq!(
            process_property(&mut tree, root, "SZ", &values(&["300"])),
            Err(PropError::Size(
                "size was 300, but must be between 1 and 25".to_string()
            ))
        );
    }

    #[test]
    fn komi_allows_half_points_only() {
        let mut tree = MoveTree::new();
        let root = tree.root();
        assert!(process_property(&mut tree, root, "KM", &values(&["6.5"])).is_ok());
        assert_eq!(tree.game_info().and_then(|info| info.komi), Some(6.5));
        assert!(process_property(&mut tree, root, "KM", &values(&["0.00"])).is_ok());
        assert!(matches!(
            process_property(&mut tree, root, "KM", &values(&["6.25"])),
            Err(PropError::Komi(_))
        ));
        assert_eq!(komi_to(tree.node(root)).as_deref(), Ok("KM[0.0]"));
    }

    #[test]
    fn root_only_properties_rejected_elsewhere() {
        let mut tree = MoveTree::new();
        let child = tree.add_child(tree.root());
        assert_eq!(
            process_property(&mut tree, child, "PL", &values(&["B"])),
            Err(PropError::RootOnly {
                prop: "PL".to_string(),
                move_num: 1,
                var_num: 0,
            })
        );
    }

    #[test]
    fn moves_and_passes() {
        let mut tree = MoveTree::new();
        let a = tree.add_child(tree.root());
        let b = tree.add_child(a);
        process_property(&mut tree, a, "B", &values(&["mc"])).expect("move");
        process_property(&mut tree, b, "W", &values(&[""])).expect("pass");
        assert_eq!(tree.node(a).mv, Some(Move::new(Color::Black, Point::new(12, 2))));
        assert_eq!(tree.node(b).mv, Some(Move::pass(Color::White)));
        assert!(matches!(
            process_property(&mut tree, a, "W", &values(&["aa"])),
            Err(PropError::Move(_))
        ));
        assert_eq!(move_to(tree.node(b)).as_deref(), Ok("W[]"));
    }

    #[test]
    fn placements_group_by_colour() {
        let mut tree = MoveTree::new();
        let root = tree.root();
        process_property(&mut tree, root, "AW", &values(&["pa", "qa"])).expect("white");
        process_property(&mut tree, root, "AB", &values(&["na"])).expect("black");
        assert_eq!(
            tree.node(root).placements,
            vec![
                Move::new(Color::Black, Point::new(13, 0)),
                Move::new(Color::White, Point::new(15, 0)),
                Move::new(Color::White, Point::new(16, 0)),
            ]
        );
        assert_eq!(
            placements_to(tree.node(root)).as_deref(),
            Ok("AB[na]AW[pa][qa]")
        );
        assert!(matches!(
            process_property(&mut tree, root, "AB", &values(&[""])),
            Err(PropError::Point(_))
        ));
    }

    #[test]
    fn comments_are_escaped_on_write() {
        let mut tree = MoveTree::new();
        let root = tree.root();
        process_property(&mut tree, root, "C", &values(&["a [k] \\ b"])).expect("comment");
        assert_eq!(comment_to(tree.node(root)).as_deref(), Ok("C[a [k\\] \\\\ b]"));
        assert!(matches!(
            process_property(&mut tree, root, "C", &values(&["again"])),
            Err(PropError::Comment(_))
        ));
    }

    #[test]
    fn unknown_properties_are_kept_raw() {
        let mut tree = MoveTree::new();
        let root = tree.root();
        process_property(&mut tree, root, "GB", &values(&["1"])).expect("raw");
        process_property(&mut tree, root, "XX", &values(&["custom"])).expect("raw");
        let written = write_node(tree.node(root)).expect("serialises");
        assert_eq!(written, "GB[1]XX[custom]");
    }
}

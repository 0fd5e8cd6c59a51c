//! SGF reader and writer.
//!
//! The reader is a small state machine over characters:
//!
//! ```text
//!               push '(' / pop ')'
//!               V ^
//!               | |  -------------------']'--
//!               V ^  V                      |
//! BEGINNING => BETWEEN => PROPERTY => PROPERTY DATA
//!               |    V                      ^
//!               |    --------------'['-------
//!               V
//!              DONE
//! ```
//!
//! Property values are collected per identifier and handed to [`crate::props`] when the next
//! identifier, node or branch starts.

use log::debug;

use crate::error::{PropError, SgfError};
use crate::movetree::{MoveTree, NodeId};
use crate::props;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Beginning,
    Between,
    Property,
    PropData,
    Done,
}

impl State {
    const fn name(self) -> &'static str {
        match self {
            State::Beginning => "beginning",
            State::Between => "between",
            State::Property => "property",
            State::PropData => "propertyData",
            State::Done => "done",
        }
    }
}

/// Pending identifier and values not yet stored on a node.
#[derive(Default)]
struct PropBuffer {
    prop: String,
    values: Vec<String>,
}

struct Parser {
    tree: MoveTree,
    state: State,
    index: usize,
    line: usize,
    column: usize,
    ch: char,
    opened: bool,
    escaped: bool,
    buf: String,
    pending: PropBuffer,
    branches: Vec<NodeId>,
    current: NodeId,
}

/// Parse the first game of an SGF collection.
pub fn parse(input: &str) -> Result<MoveTree, SgfError> {
    Parser::new().run(input)
}

impl Parser {
    fn new() -> Self {
        let tree = MoveTree::new();
        let current = tree.root();
        Self {
            tree,
            state: State::Beginning,
            index: 0,
            line: 1,
            column: 0,
            ch: '\0',
            opened: false,
            escaped: false,
            buf: String::new(),
            pending: PropBuffer::default(),
            branches: Vec::new(),
            current,
        }
    }

    fn run(mut self, input: &str) -> Result<MoveTree, SgfError> {
        for ch in input.chars() {
            self.index += 1;
            self.column += 1;
            self.ch = ch;
            if ch == '\n' {
                self.line += 1;
                self.column = 0;
            }

            match self.state {
                State::Beginning => self.beginning()?,
                State::Between => self.between()?,
                State::Property => self.property()?,
                State::PropData => self.prop_data(),
                State::Done => {
                    if ch.is_whitespace() {
                        continue;
                    }
                    if ch == '(' {
                        debug!("ignoring further games after index {}", self.index);
                        break;
                    }
                    return Err(self.syntax("unexpected character after the game tree"));
                }
            }
        }

        match self.state {
            State::Done => Ok(self.tree),
            State::Beginning if !self.opened => Err(SgfError::Empty),
            State::PropData => Err(SgfError::UnexpectedEof(format!(
                "property {} has an unterminated value",
                self.pending.prop
            ))),
            _ => Err(SgfError::UnexpectedEof(format!(
                "expected to end on the root branch, but {} branch(es) are still open",
                self.branches.len().max(1)
            ))),
        }
    }

    fn syntax(&self, message: &str) -> SgfError {
        SgfError::Syntax {
            state: self.state.name(),
            index: self.index,
            line: self.line,
            column: self.column,
            ch: self.ch,
            message: message.to_string(),
        }
    }

    fn property_error(&self, source: PropError) -> SgfError {
        SgfError::Property {
            index: self.index,
            line: self.line,
            column: self.column,
            source,
        }
    }

    /// Store the pending property on the current node.
    fn flush(&mut self) -> Result<(), SgfError> {
        let pending = std::mem::take(&mut self.pending);
        if pending.prop.is_empty() {
            return Ok(());
        }
        props::process_property(&mut self.tree, self.current, &pending.prop, &pending.values)
            .map_err(|err| self.property_error(err))
    }

    fn beginning(&mut self) -> Result<(), SgfError> {
        match self.ch {
            c if c.is_whitespace() => Ok(()),
            '(' if !self.opened => {
                self.opened = true;
                self.branches.push(self.tree.root());
                Ok(())
            }
            ';' if self.opened => {
                self.current = self.tree.root();
                self.state = State::Between;
                Ok(())
            }
            _ => Err(self.syntax("unexpected character")),
        }
    }

    fn between(&mut self) -> Result<(), SgfError> {
        match self.ch {
            c if c.is_whitespace() => Ok(()),
            c if c.is_ascii_uppercase() => {
                // AW[aw][bw]
                // ^
                self.flush()?;
                self.buf.push(c);
                self.state = State::Property;
                Ok(())
            }
            '[' => {
                // AW[aw][bw]
                //       ^
                if self.pending.prop.is_empty() {
                    return Err(self.syntax("property value without an identifier"));
                }
                self.state = State::PropData;
                Ok(())
            }
            '(' => {
                self.flush()?;
                self.branches.push(self.current);
                Ok(())
            }
            ';' => {
                self.flush()?;
                self.current = self.tree.add_child(self.current);
                Ok(())
            }
            ')' => {
                self.flush()?;
                let Some(parent) = self.branches.pop() else {
                    return Err(self.syntax("unbalanced ')'; likely an empty variation"));
                };
                self.current = parent;
                if self.branches.is_empty() {
                    self.state = State::Done;
                }
                Ok(())
            }
            _ => Err(self.syntax("unexpected character between properties")),
        }
    }

    fn property(&mut self) -> Result<(), SgfError> {
        match self.ch {
            c if c.is_ascii_uppercase() => {
                self.buf.push(c);
                Ok(())
            }
            c if c.is_whitespace() => Ok(()),
            '[' => {
                self.pending.prop = std::mem::take(&mut self.buf);
                self.state = State::PropData;
                Ok(())
            }
            _ => Err(self.syntax("unexpected character in property identifier")),
        }
    }

    fn prop_data(&mut self) {
        let ch = self.ch;
        if self.escaped {
            // C[foo \] bar]: only ']' and '\' are unescaped, anything else is kept verbatim.
            if ch != ']' && ch != '\\' {
                self.buf.push('\\');
            }
            self.buf.push(ch);
            self.escaped = false;
        } else if ch == '\\' {
            self.escaped = true;
        } else if ch == ']' {
            let value = std::mem::take(&mut self.buf);
            self.pending.values.push(value);
            self.state = State::Between;
        } else {
            self.buf.push(ch);
        }
    }
}

/// Write `tree` back out as SGF. Parentheses wrap children only where the tree branches.
pub fn serialize(tree: &MoveTree) -> Result<String, SgfError> {
    let mut out = String::from("(");
    write_subtree(tree, tree.root(), &mut out)?;
    out.push(')');
    Ok(out)
}

fn write_subtree(tree: &MoveTree, from: NodeId, out: &mut String) -> Result<(), SgfError> {
    let mut cursor = from;
    loop {
        let node = tree.node(cursor);
        out.push(';');
        out.push_str(&props::write_node(node)?);
        match node.children() {
            [] => return Ok(()),
            [only] => cursor = *only,
            children => {
                for &child in children {
                    out.push('(');
                    write_subtree(tree, child, out)?;
                    out.push(')');
                }
                return Ok(());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::Color;
    use crate::movetree::Move;
    use crate::point::Point;

    #[test]
    fn parses_root_properties() {
        let tree = parse("(;GM[1]SZ[9]KM[6.5]PL[W]C[hello]AB[aa][bb]AW[cc])").expect("parses");
        let root = tree.node(tree.root());
        assert_eq!(tree.board_size(), 9);
        assert_eq!(tree.game_info().and_then(|info| info.komi), Some(6.5));
        assert_eq!(tree.game_info().and_then(|info| info.player), Some(Color::White));
        assert_eq!(root.comment, "hello");
        assert_eq!(root.placements.len(), 3);
        assert_eq!(root.properties.get("GM"), Some(&vec!["1".to_string()]));
    }

    #[test]
    fn parses_variations() {
        let tree = parse("(;SZ[9](;B[aa];W[bb])(;B[cc]))").expect("parses");
        let root = tree.root();
        assert_eq!(tree.node(root).children().len(), 2);
        let first = tree.next(root, 0).expect("main line");
        let second = tree.next(root, 1).expect("variation");
        assert_eq!(tree.node(first).mv, Some(Move::new(Color::Black, Point::new(0, 0))));
        assert_eq!(tree.node(second).mv, Some(Move::new(Color::Black, Point::new(2, 2))));
        let reply = tree.next(first, 0).expect("reply");
        assert_eq!(tree.node(reply).mv, Some(Move::new(Color::White, Point::new(1, 1))));
        assert_eq!(tree.node(reply).move_num(), 2);
    }

    #[test]
    fn handles_escapes_and_whitespace() {
        let tree = parse("  (\n ;C[foo 1[k\\] bar \\\\ baz \\z]\n  ;B [aa] )\n").expect("parses");
        assert_eq!(tree.node(tree.root()).comment, "foo 1[k] bar \\ baz \\z");
        assert_eq!(tree.len(), 2);
    }

    #[test]
    fn ignores_following_games() {
        let tree = parse("(;C[one])(;C[two])").expect("parses");
        assert_eq!(tree.node(tree.root()).comment, "one");
    }

    #[test]
    fn reports_positions_of_syntax_errors() {
        let err = parse("(;B[aa]\n;w[bb])").expect_err("lowercase identifier");
        assert!(matches!(
            err,
            SgfError::Syntax {
                state: "between",
                line: 2,
                column: 2,
                ch: 'w',
                ..
            }
        ));
    }

    #[test]
    fn reports_unbalanced_input() {
        assert!(matches!(parse("(;B[aa]"), Err(SgfError::UnexpectedEof(_))));
        assert!(matches!(parse("(;C[never closed"), Err(SgfError::UnexpectedEof(_))));
        assert!(matches!(parse("(;B[aa](;W[bb])"), Err(SgfError::UnexpectedEof(_))));
        assert!(matches!(parse(""), Err(SgfError::Empty)));
        assert!(matches!(parse(";B[aa])"), Err(SgfError::Syntax { .. })));
        assert!(matches!(parse("(;B[aa]))"), Err(SgfError::Syntax { .. })));
    }

    #[test]
    fn property_errors_carry_position() {
        let err = parse("(;SZ[19];SZ[9])").expect_err("root-only property on a move");
        assert!(matches!(
            err,
            SgfError::Property {
                source: PropError::RootOnly { move_num: 1, .. },
                ..
            }
        ));
        assert!(matches!(
            parse("(;B[zz!])"),
            Err(SgfError::Property { source: PropError::Point(_), .. })
        ));
    }

    #[test]
    fn serialises_and_reparses() {
        let input = "(;GM[1]SZ[9]C[a\\]b](;B[aa];W[bb])(;B[cc]C[side]))";
        let tree = parse(input).expect("parses");
        let written = serialize(&tree).expect("serialises");
        assert_eq!(written, "(;SZ[9]C[a\\]b]GM[1](;B[aa];W[bb])(;B[cc]C[side]))");
        assert_eq!(parse(&written).expect("reparses"), tree);
    }

    #[test]
    fn serialises_passes() {
        let tree = parse("(;;B[];W[tt])").expect("parses");
        let first = tree.next(tree.root(), 0).expect("child node");
        assert_eq!(tree.node(first).mv, Some(Move::pass(Color::Black)));
        let written = serialize(&tree).expect("serialises");
        assert_eq!(written, "(;;B[];W[tt])");
        assert_eq!(parse(&written).expect("reparses"), tree);

        let on_root = parse("(;B[];W[tt])").expect("parses");
        assert_eq!(serialize(&on_root).expect("serialises"), "(;B[];W[tt])");
    }
}

// Copyright (C) 2024 Tristan Gerritsen <tristan@thewoosh.org>
// All Rights Reserved.

use std::{path::Path, str::FromStr};

use log::{debug, trace};

use super::{AbstractNode, AstError, NodeId, NodeKind};

/// The pruned syntax tree, stored as an arena indexed by [`NodeId`]. Node `0`
/// is always the `Prog` root. Immutable after loading.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AbstractSyntaxTree {
    nodes: Vec<AbstractNode>,
}

impl AbstractSyntaxTree {
    pub fn from_file(path: &Path) -> Result<Self, AstError> {
        let contents = std::fs::read_to_string(path)
            .map_err(|source| AstError::Io { path: path.to_path_buf(), source })?;

        debug!("Loading AST from {}", path.display());
        contents.parse()
    }

    #[must_use]
    pub fn root(&self) -> &AbstractNode {
        &self.nodes[NodeId::ROOT.index()]
    }

    #[must_use]
    pub fn node(&self, id: NodeId) -> &AbstractNode {
        &self.nodes[id.index()]
    }

    /// The `index`th child of `id`. Only call this for children the node
    /// shape guarantees; shapes are validated while loading.
    #[must_use]
    pub fn child(&self, id: NodeId, index: usize) -> &AbstractNode {
        self.node(self.node(id).children[index])
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &AbstractNode> + DoubleEndedIterator {
        self.nodes.iter()
    }

    /// The name bound by a `ForLoop`: the variable on the left of its
    /// initializing assignment.
    #[must_use]
    pub fn control_variable(&self, for_loop: NodeId) -> &AbstractNode {
        debug_assert_eq!(self.node(for_loop).kind, NodeKind::ForLoop);
        let initializer = self.node(for_loop).children[0];
        self.child(initializer, 0)
    }
}

impl FromStr for AbstractSyntaxTree {
    type Err = AstError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut lines = Vec::new();
        for (line_index, line) in s.lines().enumerate() {
            if line.trim().is_empty() {
                continue;
            }

            lines.push(parse_line(line_index + 1, line)?);
        }

        if lines.is_empty() {
            return Err(AstError::Empty);
        }

        let count = lines.len();
        let mut slots: Vec<Option<AbstractNode>> = vec![None; count];
        for node in lines {
            let id = node.id.index();
            let Some(slot) = slots.get_mut(id) else {
                return Err(AstError::IdOutOfRange { id, count });
            };

            if slot.is_some() {
                return Err(AstError::DuplicateId { id });
            }

            *slot = Some(node);
        }

        // Every slot is filled: `count` distinct ids, all below `count`.
        let mut nodes: Vec<AbstractNode> = slots.into_iter().flatten().collect();

        link_parents(&mut nodes)?;

        let tree = Self { nodes };
        tree.validate()?;

        debug!("Loaded AST with {} nodes", tree.len());
        Ok(tree)
    }
}

fn parse_line(line: usize, text: &str) -> Result<AbstractNode, AstError> {
    let malformed = || AstError::MalformedLine { line, text: text.trim().to_string() };

    let trimmed = text.trim();
    let (id, rest) = trimmed.split_once(char::is_whitespace).ok_or_else(malformed)?;
    let id: usize = id.parse().map_err(|_| malformed())?;

    let rest = rest.trim_start();
    let kind_end = rest.find(|c: char| !c.is_ascii_alphabetic()).unwrap_or(rest.len());
    let kind_name = &rest[..kind_end];
    if kind_name.is_empty() {
        return Err(malformed());
    }

    let kind = NodeKind::from_str(kind_name)
        .map_err(|_| AstError::UnknownNodeKind { line, kind: kind_name.to_string() })?;

    let mut rest = &rest[kind_end..];
    let mut literal = None;
    if let Some(payload) = rest.strip_prefix('(') {
        // Children are plain integers, so the final `)` closes the literal
        // even when a string literal itself contains parentheses.
        let close = payload.rfind(')').ok_or_else(malformed)?;
        literal = Some(strip_quotes(&payload[..close]).to_string());
        rest = &payload[close + 1..];
    }

    let children = rest.split_whitespace()
        .map(|child| child.parse::<usize>().map(NodeId::new))
        .collect::<Result<Vec<_>, _>>()
        .map_err(|_| malformed())?;

    trace!("Line {line}: node {id} {kind} {literal:?} {children:?}");

    Ok(AbstractNode {
        id: NodeId::new(id),
        kind,
        literal,
        children,
        parent: None,
    })
}

fn strip_quotes(literal: &str) -> &str {
    if literal.len() >= 2 && literal.starts_with('"') && literal.ends_with('"') {
        &literal[1..literal.len() - 1]
    } else {
        literal
    }
}

fn link_parents(nodes: &mut [AbstractNode]) -> Result<(), AstError> {
    let count = nodes.len();

    for parent in 0..count {
        for child_index in 0..nodes[parent].children.len() {
            let child = nodes[parent].children[child_index].index();
            if child >= count {
                return Err(AstError::DanglingChild { parent, child });
            }

            if let Some(first) = nodes[child].parent {
                return Err(AstError::MultipleParents { child, first: first.index(), second: parent });
            }

            nodes[child].parent = Some(NodeId::new(parent));
        }
    }

    if let Some(first) = nodes[NodeId::ROOT.index()].parent {
        return Err(AstError::MultipleParents { child: 0, first: first.index(), second: first.index() });
    }

    Ok(())
}

// validation
impl AbstractSyntaxTree {
    fn validate(&self) -> Result<(), AstError> {
        let root = self.root();
        if root.kind != NodeKind::Prog {
            return Err(AstError::RootNotProg { kind: root.kind });
        }

        self.validate_connected()?;

        for node in &self.nodes {
            self.validate_literal(node)?;
            self.validate_shape(node)?;
        }

        Ok(())
    }

    fn validate_connected(&self) -> Result<(), AstError> {
        let mut visited = vec![false; self.nodes.len()];
        let mut worklist = vec![NodeId::ROOT];

        while let Some(id) = worklist.pop() {
            visited[id.index()] = true;
            worklist.extend_from_slice(&self.node(id).children);
        }

        match visited.iter().position(|visited| !visited) {
            Some(id) => Err(AstError::Detached { id }),
            None => Ok(()),
        }
    }

    fn validate_literal(&self, node: &AbstractNode) -> Result<(), AstError> {
        let id = node.id.index();
        let kind = node.kind;

        match (&node.literal, kind.carries_literal()) {
            (None, true) => Err(AstError::MissingLiteral { id, kind }),
            (Some(_), false) => Err(AstError::UnexpectedLiteral { id, kind }),
            (Some(literal), true) if literal.is_empty() && kind != NodeKind::String => {
                Err(AstError::MissingLiteral { id, kind })
            }
            (Some(literal), true) if kind == NodeKind::Number && literal.parse::<i64>().is_err() => {
                Err(AstError::InvalidNumber { id, literal: literal.clone() })
            }
            _ => Ok(()),
        }
    }

    fn validate_shape(&self, node: &AbstractNode) -> Result<(), AstError> {
        let kind = node.kind;
        let malformed = |expected| AstError::MalformedShape { id: node.id.index(), kind, expected };

        if !kind.arity().contains(&node.children.len()) {
            return Err(malformed(arity_description(kind)));
        }

        let child_kind = |index: usize| node.child(index).map(|child| self.node(child).kind);

        match kind {
            NodeKind::Prog => {
                let parent_kind = node.parent.map(|parent| self.node(parent).kind);
                if node.id != NodeId::ROOT && parent_kind != Some(NodeKind::Proc) {
                    return Err(malformed("to be the root or a procedure body"));
                }

                if child_kind(0) != Some(NodeKind::Code) {
                    return Err(malformed("a Code block as first child"));
                }

                if node.children.len() == 2 && child_kind(1) != Some(NodeKind::ProcDefs) {
                    return Err(malformed("a ProcDefs block as second child"));
                }
            }

            NodeKind::ProcDefs => {
                if node.children.iter().any(|child| self.node(*child).kind != NodeKind::Proc) {
                    return Err(malformed("only Proc children"));
                }
            }

            NodeKind::Proc => {
                if !matches!(child_kind(0), Some(NodeKind::Prog | NodeKind::Code)) {
                    return Err(malformed("a Prog or Code block as body"));
                }
            }

            NodeKind::Assign | NodeKind::Input => {
                if child_kind(0) != Some(NodeKind::Var) {
                    return Err(malformed("a Var as destination"));
                }
            }

            NodeKind::CondBranch => {
                if node.children[1..].iter().any(|child| self.node(*child).kind != NodeKind::Code) {
                    return Err(malformed("Code blocks as branches"));
                }
            }

            NodeKind::WhileLoop => {
                if child_kind(1) != Some(NodeKind::Code) {
                    return Err(malformed("a Code block as body"));
                }
            }

            NodeKind::ForLoop => {
                if child_kind(0) != Some(NodeKind::Assign) || child_kind(2) != Some(NodeKind::Assign) {
                    return Err(malformed("assignments as initializer and increment"));
                }

                if child_kind(3) != Some(NodeKind::Code) {
                    return Err(malformed("a Code block as body"));
                }
            }

            _ => (),
        }

        Ok(())
    }
}

fn arity_description(kind: NodeKind) -> &'static str {
    match kind.arity().into_inner() {
        (0, 0) => "no children",
        (1, 1) => "exactly one child",
        (2, 2) => "exactly two children",
        (4, 4) => "exactly four children",
        (1, 2) => "one or two children",
        (2, 3) => "two or three children",
        _ => "a different number of children",
    }
}

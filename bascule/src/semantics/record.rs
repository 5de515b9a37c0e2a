// Copyright (C) 2024 Tristan Gerritsen <tristan@thewoosh.org>
// All Rights Reserved.

use std::fmt::{Display, Write};

use crate::{AbstractNode, NodeId, NodeKind};

use super::{NameType, SemanticError};

/// Everything the semantic analyzer learned about a single node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SemanticRecord {
    pub(super) id: NodeId,
    pub(super) kind: NodeKind,
    pub(super) scope_id: usize,
    pub(super) name: String,
    pub(super) name_type: NameType,
    pub(super) usage_source: Option<NodeId>,
    pub(super) flow_start: Option<NodeId>,
    pub(super) reachable: bool,
    pub(super) error: Option<SemanticError>,
}

impl SemanticRecord {
    #[must_use]
    pub(super) fn new(node: &AbstractNode) -> Self {
        Self {
            id: node.id(),
            kind: node.kind(),
            scope_id: 0,
            name: node.literal().unwrap_or_default().to_string(),
            name_type: NameType::Error,
            usage_source: None,
            flow_start: None,
            reachable: false,
            error: None,
        }
    }

    #[must_use]
    pub fn id(&self) -> NodeId {
        self.id
    }

    #[must_use]
    pub fn kind(&self) -> NodeKind {
        self.kind
    }

    #[must_use]
    pub fn scope_id(&self) -> usize {
        self.scope_id
    }

    /// The renamed snippet: `P<n>` for procedures, `V<n>` for variables,
    /// `U` for unresolved usages, or the literal text of a literal.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn name_type(&self) -> NameType {
        self.name_type
    }

    /// The declaration a `Var`/`Call` resolves to. Declarations point at
    /// themselves.
    #[must_use]
    pub fn usage_source(&self) -> Option<NodeId> {
        self.usage_source
    }

    /// The node that last gave this entity a value, if any.
    #[must_use]
    pub fn flow_start(&self) -> Option<NodeId> {
        self.flow_start
    }

    #[must_use]
    pub fn is_reachable(&self) -> bool {
        self.reachable
    }

    #[must_use]
    pub fn error(&self) -> Option<SemanticError> {
        self.error
    }
}

impl Display for SemanticRecord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}::{} ", self.scope_id, self.kind)?;

        if !self.name.is_empty() {
            write!(f, "{} ", self.name)?;
        }

        if let Some(source) = self.usage_source {
            write!(f, "From {source}: ")?;
        }

        if let Some(error) = &self.error {
            write!(f, " [ERROR] {error} ")?;
        }

        match self.name_type {
            NameType::Control => (),
            NameType::Error => f.write_str(" [ERROR] Type mismatch!")?,
            other => other.fmt(f)?,
        }

        if !self.reachable {
            return f.write_str(" [UNREACHABLE]");
        }

        match self.kind {
            NodeKind::Var | NodeKind::True | NodeKind::False | NodeKind::Number | NodeKind::String => {
                if self.flow_start.is_some() {
                    f.write_str("(Has Value)")
                } else {
                    f.write_str(" [ERROR] No Value!")
                }
            }

            NodeKind::NumDecl | NodeKind::StrDecl | NodeKind::BoolDecl => f.write_str("(No Value)"),

            _ => Ok(()),
        }
    }
}

/// Writes the tree-shaped indentation used by the semantic report.
pub(super) fn write_indent(f: &mut impl Write, depth_markers: &[bool]) -> std::fmt::Result {
    for has_later_sibling in depth_markers {
        f.write_str(if *has_later_sibling { "|  " } else { "   " })?;
    }

    Ok(())
}

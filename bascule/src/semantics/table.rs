// Copyright (C) 2024 Tristan Gerritsen <tristan@thewoosh.org>
// All Rights Reserved.

use std::{fmt::Display, ops::Index};

use crate::{AbstractSyntaxTree, NodeId, NodeKind};

use super::{record::write_indent, NameType, SemanticProblem, SemanticRecord};

/// The output of semantic analysis: exactly one record per AST node,
/// indexed by node id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SemanticTable {
    pub(super) records: Vec<SemanticRecord>,
}

impl SemanticTable {
    #[must_use]
    pub fn get(&self, id: NodeId) -> &SemanticRecord {
        &self.records[id.index()]
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &SemanticRecord> {
        self.records.iter()
    }

    /// Every finding of the analysis, in node-id order. None of these stop
    /// compilation; they are what the semantic report flags.
    #[must_use]
    pub fn problems(&self, tree: &AbstractSyntaxTree) -> Vec<(NodeId, SemanticProblem)> {
        let mut problems = Vec::new();

        for record in &self.records {
            let node = tree.node(record.id);
            let original_name = || node.literal().unwrap_or_default().to_string();

            if let Some(error) = record.error {
                problems.push((record.id, SemanticProblem::Redeclaration { name: original_name(), error }));
            }

            let is_usage = matches!(record.kind, NodeKind::Var | NodeKind::Call);
            if is_usage && record.usage_source.is_none() {
                problems.push((record.id, SemanticProblem::UnresolvedName { name: original_name() }));
            } else if record.name_type == NameType::Error {
                problems.push((record.id, SemanticProblem::TypeMismatch { kind: record.kind }));
            }

            if !record.reachable {
                let parent_reachable = node.parent()
                    .map_or(true, |parent| self.get(parent).reachable);

                if parent_reachable {
                    problems.push((record.id, SemanticProblem::Unreachable { kind: record.kind }));
                }
                continue;
            }

            if record.kind == NodeKind::Var
                && record.usage_source.is_some()
                && record.flow_start.is_none()
                && record.name_type != NameType::Procedure
                && !is_destination(tree, record.id)
            {
                problems.push((record.id, SemanticProblem::NoValue { name: original_name() }));
            }
        }

        problems
    }

    #[must_use]
    pub fn report<'a>(&'a self, tree: &'a AbstractSyntaxTree) -> SemanticReport<'a> {
        SemanticReport { table: self, tree }
    }
}

impl Index<NodeId> for SemanticTable {
    type Output = SemanticRecord;

    fn index(&self, index: NodeId) -> &Self::Output {
        self.get(index)
    }
}

/// A `Var` that is written to rather than read.
fn is_destination(tree: &AbstractSyntaxTree, id: NodeId) -> bool {
    let Some(parent) = tree.node(id).parent() else {
        return false;
    };

    let parent = tree.node(parent);
    matches!(parent.kind(), NodeKind::Assign | NodeKind::Input) && parent.child(0) == Some(id)
}

/// The human-readable semantic listing: one line per node, indented by tree
/// depth.
pub struct SemanticReport<'a> {
    table: &'a SemanticTable,
    tree: &'a AbstractSyntaxTree,
}

impl SemanticReport<'_> {
    fn write_node(&self, f: &mut std::fmt::Formatter<'_>, id: NodeId, markers: &mut Vec<bool>) -> std::fmt::Result {
        write!(f, "{:<3}|", id.index())?;
        write_indent(f, markers)?;
        writeln!(f, "{}", self.table.get(id))?;

        let children = self.tree.node(id).children();
        for (index, child) in children.iter().enumerate() {
            markers.push(index + 1 != children.len());
            self.write_node(f, *child, markers)?;
            markers.pop();
        }

        Ok(())
    }
}

impl Display for SemanticReport<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.write_node(f, NodeId::ROOT, &mut Vec::new())
    }
}

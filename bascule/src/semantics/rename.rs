// Copyright (C) 2024 Tristan Gerritsen <tristan@thewoosh.org>
// All Rights Reserved.

use log::trace;

use crate::{NodeId, NodeKind};

use super::SemanticAnalyzer;

/// Snippet given to usages that resolve to nothing.
const UNRESOLVED: &str = "U";

impl SemanticAnalyzer<'_> {
    /// Gives every procedure a unique `P<n>` name and every variable
    /// declaration a unique `V<n>` name, then copies those names onto the
    /// usages resolving to them.
    pub(super) fn rename(&mut self) {
        let tree = self.tree;

        self.rename_declarations(NodeId::ROOT);

        for node in tree.iter() {
            if !matches!(node.kind(), NodeKind::Var | NodeKind::Call) {
                continue;
            }

            let name = match self.record(node.id()).usage_source {
                Some(source) => self.record(source).name.clone(),
                None => UNRESOLVED.to_string(),
            };

            self.record_mut(node.id()).name = name;
        }
    }

    /// Walks the tree in order. A `Prog` numbers its own procedures, last to
    /// first, before anything inside it is visited.
    fn rename_declarations(&mut self, id: NodeId) {
        let tree = self.tree;
        let node = tree.node(id);

        if node.kind() == NodeKind::Prog {
            if let Some(definitions) = node.child(1) {
                self.rename_procedures(definitions);
            }
        }

        if node.kind().is_variable_declaration() || node.kind() == NodeKind::ForLoop {
            let name = format!("V{}", self.variable_count);
            self.variable_count += 1;

            trace!("Variable declared at node {id} is now {name}");
            self.record_mut(id).name = name;
        }

        for child in node.children() {
            self.rename_declarations(*child);
        }
    }

    fn rename_procedures(&mut self, definitions: NodeId) {
        let tree = self.tree;

        for procedure in tree.node(definitions).children().iter().rev() {
            let name = format!("P{}", self.procedure_count);
            self.procedure_count += 1;

            trace!("Procedure at node {procedure} is now {name}");
            self.record_mut(*procedure).name = name;
        }
    }
}

// Copyright (C) 2024 Tristan Gerritsen <tristan@thewoosh.org>
// All Rights Reserved.

use log::trace;

use crate::{NodeId, NodeKind};

use super::{ScopeKind, SemanticAnalyzer};

impl SemanticAnalyzer<'_> {
    /// Marks `id` reachable, records where its value comes from, and returns
    /// whether control never falls through past it.
    pub(super) fn establish_flow(&mut self, id: NodeId, parent: Option<NodeId>) -> bool {
        let tree = self.tree;
        let node = tree.node(id);
        let mut halts = false;

        match node.kind() {
            NodeKind::Number | NodeKind::String | NodeKind::True | NodeKind::False => {
                self.record_mut(id).flow_start = Some(id);
            }

            NodeKind::Var => {
                let origin = self.flow.resolve(&self.record(id).name);
                self.record_mut(id).flow_start = origin;
            }

            NodeKind::Prog => {
                let definitions = node.child(1);
                if let Some(definitions) = definitions {
                    self.establish_flow(definitions, Some(id));
                }

                for child in node.children() {
                    if Some(*child) != definitions {
                        self.establish_flow(*child, Some(id));
                    }
                }
            }

            NodeKind::Code => {
                let is_block = parent.is_some_and(|parent| tree.node(parent).kind() != NodeKind::Prog);
                if is_block {
                    self.flow.push(ScopeKind::Block);
                }

                for child in node.children() {
                    if self.establish_flow(*child, Some(id)) {
                        halts = true;
                        break;
                    }
                }

                if is_block {
                    self.flow.pop();
                }
            }

            NodeKind::Input => {
                self.establish_children(id);

                let target = node.children()[0];
                self.record_mut(id).flow_start = Some(id);
                self.record_mut(target).flow_start = Some(id);
                self.bind_value(target, id);
            }

            NodeKind::Assign => {
                self.establish_children(id);

                let (target, value) = (node.children()[0], node.children()[1]);
                let origin = self.record(value).flow_start;
                self.record_mut(id).flow_start = origin;
                self.record_mut(target).flow_start = origin;

                if origin.is_some() {
                    self.bind_value(target, value);
                }
            }

            kind if kind.is_binary_operator() => {
                self.establish_children(id);

                if self.all_have_values(&node.children()[..2]) {
                    self.record_mut(id).flow_start = Some(id);
                }
            }

            NodeKind::NotExpr | NodeKind::Output | NodeKind::WhileLoop => {
                self.establish_children(id);
                self.inherit_guard_value(id, node.children()[0]);
            }

            NodeKind::CondBranch => {
                let children = node.children();
                self.establish_flow(children[0], Some(id));

                let then_halts = self.establish_flow(children[1], Some(id));
                let else_halts = children.get(2)
                    .map(|otherwise| self.establish_flow(*otherwise, Some(id)));

                halts = then_halts && else_halts == Some(true);
                self.inherit_guard_value(id, children[0]);
            }

            NodeKind::ForLoop => {
                self.establish_children(id);

                if self.all_have_values(&node.children()[..3]) {
                    self.record_mut(id).flow_start = Some(id);
                }
            }

            NodeKind::Call => {
                let callee = self.record(id).usage_source
                    .filter(|source| tree.node(*source).kind() == NodeKind::Proc);

                match callee {
                    Some(callee) if self.active_procedures.contains(&callee) => {
                        trace!("Call at node {id} re-enters procedure {callee}, not descending");
                    }
                    Some(callee) => {
                        self.establish_flow(callee, Some(id));
                    }
                    None => (),
                }
            }

            NodeKind::Proc => {
                let via_call = parent.is_some_and(|parent| tree.node(parent).kind() == NodeKind::Call);
                if !via_call {
                    self.flow.push(ScopeKind::Procedure);
                }

                self.active_procedures.push(id);
                // Halting inside a procedure never halts the caller's block.
                self.establish_children(id);
                self.active_procedures.pop();

                if !via_call {
                    self.flow.pop();
                }
            }

            NodeKind::Halt => {
                halts = true;
            }

            _ => {
                self.establish_children(id);
            }
        }

        self.record_mut(id).reachable = true;
        halts
    }

    fn establish_children(&mut self, id: NodeId) {
        for child in self.tree.node(id).children() {
            self.establish_flow(*child, Some(id));
        }
    }

    fn all_have_values(&self, children: &[NodeId]) -> bool {
        children.iter().all(|child| self.record(*child).flow_start.is_some())
    }

    fn inherit_guard_value(&mut self, id: NodeId, guard: NodeId) {
        if self.record(guard).flow_start.is_some() {
            self.record_mut(id).flow_start = Some(guard);
        }
    }

    /// Records that the variable used at `target` now holds the value
    /// produced at `origin`. Unresolved variables are never bound.
    fn bind_value(&mut self, target: NodeId, origin: NodeId) {
        let record = self.record(target);
        if record.usage_source.is_none() {
            return;
        }

        let name = record.name.clone();
        trace!("{name} gets its value from node {origin}");
        self.flow.bind(name, origin);
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    use crate::{AbstractSyntaxTree, SemanticProblem, SemanticTable};

    use super::*;

    fn analyze(input: &str) -> (AbstractSyntaxTree, SemanticTable) {
        let tree: AbstractSyntaxTree = input.parse().expect("test AST should load");
        let table = SemanticAnalyzer::analyze(&tree);
        (tree, table)
    }

    fn reachable(table: &SemanticTable, id: usize) -> bool {
        table.get(NodeId::new(id)).is_reachable()
    }

    fn origin(table: &SemanticTable, id: usize) -> Option<NodeId> {
        table.get(NodeId::new(id)).flow_start()
    }

    #[test]
    fn nodes_after_halt_are_unreachable() {
        let (tree, table) = analyze("\
0 Prog 1
1 Code 2 3 4
2 NumDecl(x)
3 Halt
4 Output 5
5 Number(1)
");

        assert!(reachable(&table, 2));
        assert!(reachable(&table, 3));
        assert!(!reachable(&table, 4));
        assert!(!reachable(&table, 5));

        let unreachable: Vec<_> = table.problems(&tree).into_iter()
            .filter(|(_, problem)| matches!(problem, SemanticProblem::Unreachable { .. }))
            .map(|(id, _)| id)
            .collect();
        assert_eq!(unreachable, vec![NodeId::new(4)]);
    }

    const BOTH_ARMS_HALT: &str = "\
0 Prog 1
1 Code 2 7
2 CondBranch 3 4 5
3 True
4 Code 6
5 Code 8
6 Halt
7 Output 9
8 Halt
9 Number(1)
";

    const ONLY_THEN_ARM: &str = "\
0 Prog 1
1 Code 2 5
2 CondBranch 3 4
3 True
4 Code 6
5 Output 7
6 Halt
7 Number(1)
";

    #[rstest]
    #[case::both_arms_halt(BOTH_ARMS_HALT, 7, false)]
    #[case::only_then_arm(ONLY_THEN_ARM, 5, true)]
    fn branch_halts_only_when_both_arms_halt(#[case] input: &str, #[case] output: usize, #[case] expected: bool) {
        let (_, table) = analyze(input);

        assert!(reachable(&table, 6));
        assert_eq!(reachable(&table, output), expected);
    }

    #[test]
    fn halt_in_a_loop_body_does_not_halt_the_enclosing_block() {
        let (_, table) = analyze("\
0 Prog 1
1 Code 2 5
2 WhileLoop 3 4
3 True
4 Code 6
5 Output 7
6 Halt
7 Number(1)
");

        assert!(reachable(&table, 6));
        assert!(reachable(&table, 5));
    }

    #[test]
    fn halting_procedure_does_not_halt_the_caller() {
        let (_, table) = analyze("\
0 Prog 1 5
1 Code 2 3
2 Call(stop)
3 Output 4
4 Number(1)
5 ProcDefs 6
6 Proc(stop) 7
7 Code 8
8 Halt
");

        assert!(reachable(&table, 3));
        assert!(reachable(&table, 8));
    }

    #[test]
    fn assignment_gives_a_variable_its_value() {
        let (tree, table) = analyze("\
0 Prog 1
1 Code 2 3 4 7 9
2 NumDecl(x)
3 NumDecl(y)
4 Assign 5 6
5 Var(x)
6 Number(3)
7 Output 8
8 Var(x)
9 Output 10
10 Var(y)
");

        assert_eq!(origin(&table, 4), Some(NodeId::new(6)));
        assert_eq!(origin(&table, 5), Some(NodeId::new(6)));
        assert_eq!(origin(&table, 8), Some(NodeId::new(6)));
        assert_eq!(origin(&table, 7), Some(NodeId::new(8)));
        assert_eq!(origin(&table, 10), None);

        let no_value: Vec<_> = table.problems(&tree).into_iter()
            .filter(|(_, problem)| matches!(problem, SemanticProblem::NoValue { .. }))
            .collect();
        assert_eq!(no_value, vec![(NodeId::new(10), SemanticProblem::NoValue { name: "y".to_string() })]);
    }

    #[test]
    fn input_gives_a_variable_its_value() {
        let (_, table) = analyze("\
0 Prog 1
1 Code 2 3 5
2 NumDecl(x)
3 Input 4
4 Var(x)
5 Output 6
6 Var(x)
");

        assert_eq!(origin(&table, 4), Some(NodeId::new(3)));
        assert_eq!(origin(&table, 6), Some(NodeId::new(3)));
    }

    #[test]
    fn values_assigned_in_a_block_stay_in_that_block() {
        let (_, table) = analyze("\
0 Prog 1
1 Code 2 3 9
2 NumDecl(x)
3 WhileLoop 4 5
4 False
5 Code 6
6 Assign 7 8
7 Var(x)
8 Number(1)
9 Output 10
10 Var(x)
");

        assert_eq!(origin(&table, 7), Some(NodeId::new(8)));
        assert_eq!(origin(&table, 10), None);
    }

    #[test]
    fn recursive_procedures_terminate() {
        let (_, table) = analyze("\
0 Prog 1 3
1 Code 2
2 Call(again)
3 ProcDefs 4
4 Proc(again) 5
5 Code 6
6 Call(again)
");

        assert!(table.iter().all(|record| record.is_reachable()));
    }

    #[test]
    fn unresolved_names_are_reported_once() {
        let (tree, table) = analyze("\
0 Prog 1
1 Code 2
2 Output 3
3 Var(ghost)
");

        let problems = table.problems(&tree);
        assert_eq!(problems, vec![
            (NodeId::new(2), SemanticProblem::TypeMismatch { kind: NodeKind::Output }),
            (NodeId::new(3), SemanticProblem::UnresolvedName { name: "ghost".to_string() }),
        ]);
    }
}

// Copyright (C) 2024 Tristan Gerritsen <tristan@thewoosh.org>
// All Rights Reserved.

use log::{debug, trace};

use crate::{AbstractSyntaxTree, NodeId, NodeKind};

use super::{NameType, ScopeKind, ScopeStack, SemanticError, SemanticRecord, SemanticTable};

/// Scope-aware name resolution, type inference and flow checking over an
/// [`AbstractSyntaxTree`]. Runs three passes: population, renaming and flow
/// establishment. Findings are stored on the records and never abort the
/// analysis.
#[derive(Debug)]
pub struct SemanticAnalyzer<'tree> {
    pub(super) tree: &'tree AbstractSyntaxTree,
    pub(super) records: Vec<SemanticRecord>,
    pub(super) symbols: ScopeStack<NodeId>,
    pub(super) flow: ScopeStack<NodeId>,
    pub(super) scope_count: usize,
    pub(super) variable_count: usize,
    pub(super) procedure_count: usize,

    /// Procedures whose flow is being established on the current call path.
    pub(super) active_procedures: Vec<NodeId>,
}

impl<'tree> SemanticAnalyzer<'tree> {
    #[must_use]
    pub fn analyze(tree: &'tree AbstractSyntaxTree) -> SemanticTable {
        let mut this = Self {
            tree,
            records: tree.iter().map(SemanticRecord::new).collect(),
            symbols: ScopeStack::new(),
            flow: ScopeStack::new(),
            scope_count: 0,
            variable_count: 0,
            procedure_count: 0,
            active_procedures: Vec::new(),
        };

        this.populate(NodeId::ROOT, 0);
        this.rename();

        this.flow.push(ScopeKind::Program);
        this.establish_flow(NodeId::ROOT, None);
        this.flow.pop();

        debug_assert_eq!(this.symbols.depth(), 0, "Symbol scopes are unbalanced");
        debug_assert_eq!(this.flow.depth(), 0, "Flow scopes are unbalanced");

        this.dump_records();

        SemanticTable {
            records: this.records,
        }
    }

    #[must_use]
    pub(super) fn record(&self, id: NodeId) -> &SemanticRecord {
        &self.records[id.index()]
    }

    #[must_use]
    pub(super) fn record_mut(&mut self, id: NodeId) -> &mut SemanticRecord {
        &mut self.records[id.index()]
    }

    #[must_use]
    fn next_scope_id(&mut self) -> usize {
        self.scope_count += 1;
        self.scope_count
    }

    #[allow(unused)]
    fn dump_records(&self) {
        debug!("Semantic records:");
        for record in &self.records {
            debug!("    {:<3} {record}", record.id.index());
        }
    }
}

// population
impl SemanticAnalyzer<'_> {
    fn populate(&mut self, id: NodeId, scope_id: usize) {
        let tree = self.tree;
        let node = tree.node(id);

        if node.kind() != NodeKind::Proc {
            self.record_mut(id).scope_id = scope_id;
        }

        match node.kind() {
            NodeKind::Prog => {
                self.symbols.push(ScopeKind::Program);

                if let Some(definitions) = node.child(1) {
                    self.populate_procedures(definitions, scope_id);
                }

                for child in node.children() {
                    self.populate(*child, scope_id);
                }

                self.symbols.pop();
            }

            NodeKind::Proc => {
                // Declared and given its scope id by the procedure pre-pass.
                // A `Prog` body inherits that id and opens its own scope.
                let body_scope = self.record(id).scope_id;
                let opens_scope = tree.child(id, 0).kind() != NodeKind::Prog;

                if opens_scope {
                    self.symbols.push(ScopeKind::Procedure);
                }
                for child in node.children() {
                    self.populate(*child, body_scope);
                }
                if opens_scope {
                    self.symbols.pop();
                }
            }

            NodeKind::ForLoop => {
                let loop_scope = self.next_scope_id();
                let control = tree.control_variable(id).literal().unwrap_or_default();

                let record = self.record_mut(id);
                record.scope_id = loop_scope;
                record.usage_source = Some(id);
                record.name = control.to_string();
                record.name_type = NameType::Number;

                self.symbols.push(ScopeKind::LoopVariable);
                self.symbols.bind_innermost(control, id);

                for child in node.children() {
                    self.populate(*child, loop_scope);
                }

                self.symbols.pop();
            }

            NodeKind::NumDecl | NodeKind::StrDecl | NodeKind::BoolDecl => {
                self.declare(id, SemanticError::RedeclaredVariable);
            }

            NodeKind::Var | NodeKind::Call => {
                let name = node.literal().unwrap_or_default();
                let source = self.symbols.resolve(name);
                trace!("Usage of `{name}` at node {id} resolves to {source:?}");
                self.record_mut(id).usage_source = source;
            }

            _ => {
                for child in node.children() {
                    self.populate(*child, scope_id);
                }
            }
        }

        self.establish_type(id);
    }

    /// Declares every procedure up front, last to first, so calls to a
    /// procedure defined further down still resolve.
    fn populate_procedures(&mut self, definitions: NodeId, scope_id: usize) {
        self.record_mut(definitions).scope_id = scope_id;

        let tree = self.tree;
        for procedure in tree.node(definitions).children().iter().rev() {
            let procedure_scope = self.next_scope_id();
            self.record_mut(*procedure).scope_id = procedure_scope;

            self.declare(*procedure, SemanticError::RedeclaredProcedure);
            self.establish_type(*procedure);
        }
    }

    fn declare(&mut self, id: NodeId, error: SemanticError) {
        let tree = self.tree;
        let name = tree.node(id).literal().unwrap_or_default();

        if self.symbols.is_bound_locally(name) {
            debug!("Node {id} redeclares `{name}`");
            self.record_mut(id).error = Some(error);
        }

        self.record_mut(id).usage_source = Some(id);
        self.symbols.bind(name, id);
    }

    fn establish_type(&mut self, id: NodeId) {
        let node = self.tree.node(id);
        let child_type = |index: usize| {
            node.child(index)
                .map(|child| self.record(child).name_type)
                .unwrap_or_default()
        };
        let both = |lhs: NameType, rhs: NameType| child_type(0) == lhs && child_type(1) == rhs;

        let inferred = match node.kind() {
            NodeKind::Number | NodeKind::NumDecl | NodeKind::ForLoop => Some(NameType::Number),
            NodeKind::String | NodeKind::StrDecl => Some(NameType::String),
            NodeKind::True | NodeKind::False | NodeKind::BoolDecl => Some(NameType::Boolean),
            NodeKind::Proc => Some(NameType::Procedure),

            NodeKind::Halt | NodeKind::Code | NodeKind::ProcDefs | NodeKind::Prog => Some(NameType::Control),

            NodeKind::Var => self.record(id).usage_source
                .map(|source| self.record(source).name_type),

            NodeKind::Call => self.record(id).usage_source
                .filter(|source| self.tree.node(*source).kind() == NodeKind::Proc)
                .map(|_| NameType::Procedure),

            NodeKind::Assign => {
                let target = child_type(0);
                (target.is_value() && target == child_type(1)).then_some(target)
            }

            NodeKind::Input | NodeKind::Output => {
                let value = child_type(0);
                value.is_value().then_some(value)
            }

            NodeKind::AddExpr | NodeKind::SubExpr | NodeKind::MultExpr => {
                both(NameType::Number, NameType::Number).then_some(NameType::Number)
            }

            NodeKind::LessExpr | NodeKind::GreaterExpr => {
                both(NameType::Number, NameType::Number).then_some(NameType::Boolean)
            }

            NodeKind::EqExpr => {
                let lhs = child_type(0);
                (lhs.is_value() && lhs == child_type(1)).then_some(NameType::Boolean)
            }

            NodeKind::AndExpr | NodeKind::OrExpr => {
                both(NameType::Boolean, NameType::Boolean).then_some(NameType::Boolean)
            }

            NodeKind::NotExpr => (child_type(0) == NameType::Boolean).then_some(NameType::Boolean),

            NodeKind::CondBranch | NodeKind::WhileLoop => {
                (child_type(0) == NameType::Boolean).then_some(NameType::Control)
            }
        };

        if let Some(name_type) = inferred {
            self.record_mut(id).name_type = name_type;
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    use crate::{SemanticProblem, SemanticTable};

    use super::*;

    fn analyze(input: &str) -> (AbstractSyntaxTree, SemanticTable) {
        let tree: AbstractSyntaxTree = input.parse().expect("test AST should load");
        let table = SemanticAnalyzer::analyze(&tree);
        (tree, table)
    }

    fn record(table: &SemanticTable, id: usize) -> &SemanticRecord {
        table.get(NodeId::new(id))
    }

    const FOR_LOOP: &str = "\
0 Prog 1
1 Code 2 3 17
2 NumDecl(x)
3 ForLoop 4 7 10 15
4 Assign 5 6
5 Var(i)
6 Number(0)
7 LessExpr 8 9
8 Var(i)
9 Number(3)
10 Assign 11 12
11 Var(i)
12 AddExpr 13 14
13 Var(i)
14 Number(1)
15 Code 16 18
16 NumDecl(x)
17 Output 19
18 NumDecl(y)
19 Var(y)
";

    #[test]
    fn every_node_has_a_record() {
        let (tree, table) = analyze(FOR_LOOP);
        assert_eq!(table.len(), tree.len());

        for (index, record) in table.iter().enumerate() {
            assert_eq!(record.id(), NodeId::new(index));
            assert_eq!(record.kind(), tree.node(NodeId::new(index)).kind());
        }
    }

    #[test]
    fn redeclaration_in_same_scope_is_flagged_on_second_declaration() {
        let (_, table) = analyze("\
0 Prog 1
1 Code 2 3
2 NumDecl(x)
3 StrDecl(x)
");

        assert_eq!(record(&table, 2).error(), None);
        assert_eq!(record(&table, 3).error(), Some(SemanticError::RedeclaredVariable));
    }

    #[test]
    fn shadowing_inside_a_procedure_is_not_a_redeclaration() {
        let (_, table) = analyze("\
0 Prog 1 3
1 Code 2
2 NumDecl(x)
3 ProcDefs 4
4 Proc(p) 5
5 Code 6
6 NumDecl(x)
");

        assert_eq!(record(&table, 2).error(), None);
        assert_eq!(record(&table, 6).error(), None);
    }

    #[test]
    fn procedures_are_declared_last_to_first() {
        let (_, table) = analyze("\
0 Prog 1 2
1 Code
2 ProcDefs 3 5
3 Proc(p) 4
4 Code
5 Proc(p) 6
6 Code
");

        assert_eq!(record(&table, 5).error(), None);
        assert_eq!(record(&table, 3).error(), Some(SemanticError::RedeclaredProcedure));
    }

    #[test]
    fn loop_body_declarations_bind_in_the_enclosing_scope() {
        let (_, table) = analyze(FOR_LOOP);

        // `x` already lives in the program scope the loop body binds into.
        assert_eq!(record(&table, 16).error(), Some(SemanticError::RedeclaredVariable));

        // `y` is declared in the body but stays visible after the loop.
        assert_eq!(record(&table, 18).error(), None);
        assert_eq!(record(&table, 19).usage_source(), Some(NodeId::new(18)));
    }

    #[test]
    fn loop_variable_resolves_to_the_loop() {
        let (_, table) = analyze(FOR_LOOP);

        for usage in [5, 8, 11, 13] {
            assert_eq!(record(&table, usage).usage_source(), Some(NodeId::new(3)));
            assert_eq!(record(&table, usage).name_type(), NameType::Number);
        }

        assert_eq!(record(&table, 3).scope_id(), 1);
        assert_eq!(record(&table, 8).scope_id(), 1);
        assert_eq!(record(&table, 2).scope_id(), 0);
    }

    #[test]
    fn redeclaring_the_loop_variable_in_the_body_is_flagged() {
        let (_, table) = analyze("\
0 Prog 1
1 Code 2
2 ForLoop 3 6 9 14
3 Assign 4 5
4 Var(i)
5 Number(0)
6 LessExpr 7 8
7 Var(i)
8 Number(3)
9 Assign 10 11
10 Var(i)
11 AddExpr 12 13
12 Var(i)
13 Number(1)
14 Code 15
15 NumDecl(i)
");

        assert_eq!(record(&table, 15).error(), Some(SemanticError::RedeclaredVariable));
    }

    #[rstest]
    #[case::number_plus_number("AddExpr", "Number(1)", "Number(2)", NameType::Number)]
    #[case::number_times_number("MultExpr", "Number(1)", "Number(2)", NameType::Number)]
    #[case::number_plus_string("AddExpr", "Number(1)", "String(a)", NameType::Error)]
    #[case::and_of_booleans("AndExpr", "True", "False", NameType::Boolean)]
    #[case::or_of_boolean_and_number("OrExpr", "True", "Number(1)", NameType::Error)]
    #[case::equal_numbers("EqExpr", "Number(1)", "Number(2)", NameType::Boolean)]
    #[case::equal_strings("EqExpr", "String(a)", "String(b)", NameType::Boolean)]
    #[case::equal_booleans("EqExpr", "True", "False", NameType::Boolean)]
    #[case::equal_mismatch("EqExpr", "Number(1)", "String(b)", NameType::Error)]
    #[case::less_than_numbers("LessExpr", "Number(1)", "Number(2)", NameType::Boolean)]
    #[case::greater_than_strings("GreaterExpr", "String(a)", "String(b)", NameType::Error)]
    fn binary_operator_types(#[case] operator: &str, #[case] lhs: &str, #[case] rhs: &str, #[case] expected: NameType) {
        let (_, table) = analyze(&format!("0 Prog 1\n1 Code 2\n2 Output 3\n3 {operator} 4 5\n4 {lhs}\n5 {rhs}\n"));

        assert_eq!(record(&table, 3).name_type(), expected);
    }

    #[test]
    fn type_errors_propagate_upwards() {
        let (tree, table) = analyze("\
0 Prog 1
1 Code 2
2 Output 3
3 AddExpr 4 7
4 AddExpr 5 6
5 Number(1)
6 String(a)
7 Number(2)
");

        assert_eq!(record(&table, 4).name_type(), NameType::Error);
        assert_eq!(record(&table, 3).name_type(), NameType::Error);
        assert_eq!(record(&table, 2).name_type(), NameType::Error);
        assert_eq!(record(&table, 1).name_type(), NameType::Control);

        let mismatches = table.problems(&tree).into_iter()
            .filter(|(_, problem)| matches!(problem, SemanticProblem::TypeMismatch { .. }))
            .count();
        assert_eq!(mismatches, 3);
    }

    #[test]
    fn assignment_types_must_agree() {
        let (_, table) = analyze("\
0 Prog 1
1 Code 2 3 4 7
2 NumDecl(n)
3 BoolDecl(b)
4 Assign 5 6
5 Var(n)
6 Number(4)
7 Assign 8 9
8 Var(b)
9 Number(4)
");

        assert_eq!(record(&table, 4).name_type(), NameType::Number);
        assert_eq!(record(&table, 7).name_type(), NameType::Error);
    }

    #[test]
    fn guards_must_be_boolean() {
        let (_, table) = analyze("\
0 Prog 1
1 Code 2 5
2 WhileLoop 3 4
3 True
4 Code
5 CondBranch 6 7
6 Number(1)
7 Code
");

        assert_eq!(record(&table, 2).name_type(), NameType::Control);
        assert_eq!(record(&table, 5).name_type(), NameType::Error);
    }
}

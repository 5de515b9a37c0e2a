// Copyright (C) 2024 Tristan Gerritsen <tristan@thewoosh.org>
// All Rights Reserved.

use bascule::{AbstractSyntaxTree, NodeId, NodeKind, SemanticTable};
use log::{debug, trace, warn};

use crate::{Instruction, IntermediateLine, IntermediateProgram, Label, Operand, Operator, Register, RegisterClass, RegisterPool};

/// Lowers an analyzed tree into the symbolic pseudo-assembly.
#[derive(Debug)]
pub struct CodeGenerator<'a> {
    tree: &'a AbstractSyntaxTree,
    table: &'a SemanticTable,
    registers: RegisterPool,
    lines: Vec<IntermediateLine>,
    label_count: usize,

    /// Where `Halt` jumps to: the final `END`.
    end_label: Label,
}

impl<'a> CodeGenerator<'a> {
    #[must_use]
    pub fn generate(tree: &'a AbstractSyntaxTree, table: &'a SemanticTable) -> IntermediateProgram {
        let mut this = Self {
            tree,
            table,
            registers: RegisterPool::new(),
            lines: Vec::new(),
            label_count: 0,
            end_label: Label::Control(0),
        };

        this.end_label = this.create_label();
        this.translate_statement(NodeId::ROOT);

        this.link_label(this.end_label.clone());
        this.emit(Instruction::End);

        debug!("Generated {} lines using {} registers and {} labels", this.lines.len(), this.registers.allocated(), this.label_count);

        let program = IntermediateProgram { lines: this.lines };
        trace!("Intermediate program:\n{program}");
        program
    }

    #[must_use]
    fn create_label(&mut self) -> Label {
        let label = Label::Control(self.label_count);
        self.label_count += 1;
        label
    }

    fn link_label(&mut self, label: Label) {
        self.lines.push(IntermediateLine::Label(label));
    }

    fn emit(&mut self, instruction: Instruction) {
        self.lines.push(IntermediateLine::Instruction(instruction));
    }

    /// The register of the variable a `Var` node refers to.
    #[must_use]
    fn variable_register(&mut self, id: NodeId) -> Register {
        let record = self.table.get(id);
        self.registers.variable(record.name(), RegisterClass::of(record.name_type()))
    }

    /// A fresh register able to hold the value of `id`.
    #[must_use]
    fn temporary_for(&mut self, id: NodeId) -> Register {
        self.registers.temporary(RegisterClass::of(self.table.get(id).name_type()))
    }

    #[must_use]
    fn procedure_label(&self, call: NodeId) -> Option<Label> {
        let record = self.table.get(call);
        record.usage_source()
            .filter(|source| self.tree.node(*source).kind() == NodeKind::Proc)
            .map(|_| Label::Procedure(record.name().to_string()))
    }
}

// statements
impl CodeGenerator<'_> {
    fn translate_statement(&mut self, id: NodeId) {
        let tree = self.tree;
        let node = tree.node(id);
        let children = node.children();

        match node.kind() {
            NodeKind::NumDecl | NodeKind::StrDecl | NodeKind::BoolDecl => (),

            NodeKind::Halt => {
                self.emit(Instruction::Goto { target: self.end_label.clone() });
            }

            NodeKind::Call => match self.procedure_label(id) {
                Some(target) => self.emit(Instruction::Gosub { target }),
                None => warn!("Call to unresolved procedure `{}` at node {id}, no code emitted", node.literal().unwrap_or_default()),
            },

            NodeKind::Proc => {
                self.link_label(Label::Procedure(self.table.get(id).name().to_string()));
                for child in children {
                    self.translate_statement(*child);
                }
                self.emit(Instruction::Return);
            }

            NodeKind::ProcDefs => {
                let skip = self.create_label();
                self.emit(Instruction::Goto { target: skip.clone() });

                for child in children {
                    self.translate_statement(*child);
                }

                self.link_label(skip);
            }

            NodeKind::CondBranch => {
                let then_label = self.create_label();
                let else_label = self.create_label();
                let end_label = self.create_label();

                self.translate_boolean(children[0], &then_label, &else_label);

                self.link_label(then_label);
                self.translate_statement(children[1]);

                if let Some(otherwise) = children.get(2) {
                    self.emit(Instruction::Goto { target: end_label.clone() });
                    self.link_label(else_label);
                    self.translate_statement(*otherwise);
                    self.link_label(end_label);
                } else {
                    self.link_label(else_label);
                }
            }

            NodeKind::WhileLoop => {
                self.translate_loop(children[0], &[children[1]]);
            }

            NodeKind::ForLoop => {
                self.translate_statement(children[0]);
                self.translate_loop(children[1], &[children[3], children[2]]);
            }

            NodeKind::Assign => {
                let destination = self.variable_register(children[0]);
                self.translate_expression(children[1], destination);
            }

            NodeKind::Input => {
                let destination = self.variable_register(children[0]);
                self.translate_expression(id, destination);
            }

            NodeKind::Output => {
                let destination = self.temporary_for(children[0]);
                self.translate_expression(id, destination);
            }

            _ => {
                for child in children {
                    self.translate_statement(*child);
                }
            }
        }
    }

    fn translate_loop(&mut self, condition: NodeId, body: &[NodeId]) {
        let guard_label = self.create_label();
        let body_label = self.create_label();
        let exit_label = self.create_label();

        self.link_label(guard_label.clone());
        self.translate_boolean(condition, &body_label, &exit_label);

        self.link_label(body_label);
        for statement in body {
            self.translate_statement(*statement);
        }

        self.emit(Instruction::Goto { target: guard_label });
        self.link_label(exit_label);
    }
}

// expressions
impl CodeGenerator<'_> {
    fn translate_expression(&mut self, id: NodeId, destination: Register) {
        let tree = self.tree;
        let node = tree.node(id);
        let children = node.children();

        match node.kind() {
            NodeKind::Number => {
                // Validated as an integer while loading the tree.
                let value = node.literal().and_then(|literal| literal.parse().ok()).unwrap_or_default();
                self.emit(Instruction::Let { destination, source: Operand::Number(value) });
            }

            NodeKind::String => {
                let value = node.literal().unwrap_or_default().to_string();
                self.emit(Instruction::Let { destination, source: Operand::String(value) });
            }

            NodeKind::True => self.emit(Instruction::Let { destination, source: Operand::Number(1) }),
            NodeKind::False => self.emit(Instruction::Let { destination, source: Operand::Number(0) }),

            NodeKind::Var => {
                let source = self.variable_register(id);
                self.emit(Instruction::Let { destination, source: source.into() });
            }

            NodeKind::Input => self.emit(Instruction::Input { destination }),

            NodeKind::Output => {
                self.translate_expression(children[0], destination);
                self.emit(Instruction::Print { source: destination.into() });
            }

            NodeKind::NotExpr | NodeKind::AndExpr | NodeKind::OrExpr | NodeKind::EqExpr => {
                let true_label = self.create_label();
                let false_label = self.create_label();

                self.emit(Instruction::Let { destination, source: Operand::Number(0) });
                self.translate_boolean(id, &true_label, &false_label);
                self.link_label(true_label);
                self.emit(Instruction::Let { destination, source: Operand::Number(1) });
                self.link_label(false_label);
            }

            kind => match arithmetic_operator(kind) {
                Some(operator) => {
                    let lhs = self.temporary_for(children[0]);
                    let rhs = self.temporary_for(children[1]);

                    self.translate_expression(children[0], lhs);
                    self.translate_expression(children[1], rhs);

                    self.emit(Instruction::Compute { destination, lhs: lhs.into(), operator, rhs: rhs.into() });
                }

                None => trace!("{kind} at node {id} has no value, no code emitted"),
            },
        }
    }
}

// booleans
impl CodeGenerator<'_> {
    /// Emits code that jumps to `when_true` or `when_false` depending on the
    /// value of `id`, without materializing that value where avoidable.
    fn translate_boolean(&mut self, id: NodeId, when_true: &Label, when_false: &Label) {
        let tree = self.tree;
        let node = tree.node(id);
        let children = node.children();

        match node.kind() {
            NodeKind::True => self.emit(Instruction::Goto { target: when_true.clone() }),
            NodeKind::False => self.emit(Instruction::Goto { target: when_false.clone() }),

            NodeKind::OrExpr => {
                let next = self.create_label();
                self.translate_boolean(children[0], when_true, &next);
                self.link_label(next);
                self.translate_boolean(children[1], when_true, when_false);
            }

            NodeKind::AndExpr => {
                let next = self.create_label();
                self.translate_boolean(children[0], &next, when_false);
                self.link_label(next);
                self.translate_boolean(children[1], when_true, when_false);
            }

            NodeKind::NotExpr => {
                self.translate_boolean(children[0], when_false, when_true);
            }

            kind => match comparison_operator(kind) {
                Some(comparison) => {
                    let lhs = self.temporary_for(children[0]);
                    let rhs = self.temporary_for(children[1]);

                    self.translate_expression(children[0], lhs);
                    self.translate_expression(children[1], rhs);

                    self.emit(Instruction::If { lhs: lhs.into(), comparison, rhs: rhs.into(), target: when_true.clone() });
                    self.emit(Instruction::Goto { target: when_false.clone() });
                }

                None => {
                    let value = self.temporary_for(id);
                    self.translate_expression(id, value);

                    self.emit(Instruction::If { lhs: value.into(), comparison: Operator::Equal, rhs: Operand::Number(1), target: when_true.clone() });
                    self.emit(Instruction::Goto { target: when_false.clone() });
                }
            },
        }
    }
}

/// Operators lowered into a single `LET dst = lhs op rhs`.
#[must_use]
fn arithmetic_operator(kind: NodeKind) -> Option<Operator> {
    match kind {
        NodeKind::AddExpr => Some(Operator::Add),
        NodeKind::SubExpr => Some(Operator::Subtract),
        NodeKind::MultExpr => Some(Operator::Multiply),
        NodeKind::LessExpr => Some(Operator::Less),
        NodeKind::GreaterExpr => Some(Operator::Greater),
        _ => None,
    }
}

#[must_use]
fn comparison_operator(kind: NodeKind) -> Option<Operator> {
    match kind {
        NodeKind::EqExpr => Some(Operator::Equal),
        NodeKind::LessExpr => Some(Operator::Less),
        NodeKind::GreaterExpr => Some(Operator::Greater),
        _ => None,
    }
}

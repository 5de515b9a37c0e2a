// Copyright (C) 2024 Tristan Gerritsen <tristan@thewoosh.org>
// All Rights Reserved.

use std::{collections::HashMap, fmt::Display};

use log::{debug, error};

use super::{Instruction, Label, NumberedProgram};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IntermediateLine {
    /// A label definition. Takes up no index once sequentialized.
    Label(Label),
    Instruction(Instruction),
}

impl Display for IntermediateLine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Label(label) => label.fmt(f),
            Self::Instruction(instruction) => instruction.fmt(f),
        }
    }
}

/// The symbolic program produced by the code generator.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IntermediateProgram {
    pub(crate) lines: Vec<IntermediateLine>,
}

impl IntermediateProgram {
    #[must_use]
    pub fn lines(&self) -> &[IntermediateLine] {
        &self.lines
    }

    #[must_use]
    pub fn instruction_count(&self) -> usize {
        self.lines.iter()
            .filter(|line| matches!(line, IntermediateLine::Instruction(..)))
            .count()
    }

    /// Resolves every label into the index of the first instruction following
    /// its definition, numbering the instructions from 0.
    #[must_use]
    pub fn sequentialize(&self) -> NumberedProgram {
        let mut positions = HashMap::new();
        let mut index: usize = 0;
        for line in &self.lines {
            match line {
                IntermediateLine::Label(label) => {
                    let previous = positions.insert(label, index);
                    debug_assert_eq!(previous, None, "Label {label} was linked twice");
                }
                IntermediateLine::Instruction(..) => index += 1,
            }
        }

        let count = index;
        let last = count.saturating_sub(1);

        let instructions = self.lines.iter()
            .filter_map(|line| match line {
                IntermediateLine::Label(..) => None,
                IntermediateLine::Instruction(instruction) => Some(instruction),
            })
            .map(|instruction| {
                instruction.clone().map_target(|label| {
                    let position = positions.get(&label).copied();
                    debug_assert!(position.is_some(), "Label {label} was never linked");
                    debug_assert!(position.map_or(true, |position| position < count), "Label {label} points past the end");

                    position.filter(|position| *position < count).unwrap_or_else(|| {
                        error!("Label {label} does not resolve to an instruction, using line {last}");
                        last
                    })
                })
            })
            .collect();

        let program = NumberedProgram { instructions };
        debug!("Sequentialized {} lines into {} instructions", self.lines.len(), program.len());
        program
    }
}

impl Display for IntermediateProgram {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for line in &self.lines {
            writeln!(f, "{line}")?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use crate::{Operand, Register, RegisterClass};

    use super::*;

    fn instruction(instruction: Instruction) -> IntermediateLine {
        IntermediateLine::Instruction(instruction)
    }

    #[test]
    fn labels_resolve_to_the_next_instruction() {
        let a = Register::new(0, RegisterClass::Number);
        let program = IntermediateProgram {
            lines: vec![
                instruction(Instruction::Goto { target: Label::Control(1) }),
                IntermediateLine::Label(Label::Control(2)),
                instruction(Instruction::Let { destination: a, source: Operand::Number(1) }),
                IntermediateLine::Label(Label::Control(1)),
                IntermediateLine::Label(Label::Control(0)),
                instruction(Instruction::If {
                    lhs: a.into(),
                    comparison: crate::Operator::Equal,
                    rhs: Operand::Number(1),
                    target: Label::Control(2),
                }),
                instruction(Instruction::End),
            ],
        };

        let numbered = program.sequentialize();

        assert_eq!(program.instruction_count(), 4);
        assert_eq!(numbered.to_string(), "\
0 GOTO 2
1 LET AA = 1
2 IF AA = 1 THEN GOTO 1
3 END
");
    }

    #[test]
    fn empty_program_numbers_nothing() {
        let numbered = IntermediateProgram::default().sequentialize();
        assert!(numbered.is_empty());
    }

    #[test]
    fn text_form_has_bare_label_lines() {
        let program = IntermediateProgram {
            lines: vec![
                IntermediateLine::Label(Label::Procedure("P0".into())),
                instruction(Instruction::Return),
            ],
        };

        assert_eq!(program.to_string(), "#P0\nRETURN\n");
    }
}

// Copyright (C) 2024 Tristan Gerritsen <tristan@thewoosh.org>
// All Rights Reserved.

use std::fmt::Display;

use strum::{AsRefStr, Display as StrumDisplay, EnumString};

use super::{Operand, Register};

/// A symbolic jump target. Control labels are numbered per run, procedure
/// labels reuse the renamed procedure identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Label {
    Control(usize),
    Procedure(String),
}

impl Display for Label {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Control(id) => write!(f, "#{id}"),
            Self::Procedure(name) => write!(f, "#{name}"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, AsRefStr, StrumDisplay, EnumString)]
#[strum(serialize_all = "UPPERCASE")]
pub enum Opcode {
    Let,
    If,
    Goto,
    Gosub,
    Return,
    Input,
    Print,
    End,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, AsRefStr, StrumDisplay, EnumString)]
pub enum Operator {
    #[strum(serialize = "+")]
    Add,

    #[strum(serialize = "-")]
    Subtract,

    #[strum(serialize = "*")]
    Multiply,

    #[strum(serialize = "=")]
    Equal,

    #[strum(serialize = "<")]
    Less,

    #[strum(serialize = ">")]
    Greater,
}

impl Operator {
    #[must_use]
    pub const fn is_comparison(&self) -> bool {
        matches!(self, Self::Equal | Self::Less | Self::Greater)
    }
}

/// One instruction of the pseudo-assembly. Jump targets are symbolic
/// [`Label`]s before sequentialization and line indices after it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Instruction<Target = Label> {
    /// `LET dst = src`
    Let {
        destination: Register,
        source: Operand,
    },

    /// `LET dst = lhs op rhs`
    Compute {
        destination: Register,
        lhs: Operand,
        operator: Operator,
        rhs: Operand,
    },

    /// `IF lhs op rhs THEN GOTO target`
    If {
        lhs: Operand,
        comparison: Operator,
        rhs: Operand,
        target: Target,
    },

    Goto {
        target: Target,
    },

    Gosub {
        target: Target,
    },

    Return,

    Input {
        destination: Register,
    },

    Print {
        source: Operand,
    },

    End,
}

impl<Target> Instruction<Target> {
    #[must_use]
    pub const fn opcode(&self) -> Opcode {
        match self {
            Self::Let { .. } | Self::Compute { .. } => Opcode::Let,
            Self::If { .. } => Opcode::If,
            Self::Goto { .. } => Opcode::Goto,
            Self::Gosub { .. } => Opcode::Gosub,
            Self::Return => Opcode::Return,
            Self::Input { .. } => Opcode::Input,
            Self::Print { .. } => Opcode::Print,
            Self::End => Opcode::End,
        }
    }

    /// The register this instruction overwrites.
    #[must_use]
    pub fn destination_register(&self) -> Option<Register> {
        match self {
            Self::Let { destination, .. } => Some(*destination),
            Self::Compute { destination, .. } => Some(*destination),
            Self::Input { destination } => Some(*destination),
            _ => None,
        }
    }

    /// The registers this instruction reads.
    #[must_use]
    pub fn source_registers(&self) -> Vec<Register> {
        let operands = match self {
            Self::Let { source, .. } => vec![source],
            Self::Compute { lhs, rhs, .. } => vec![lhs, rhs],
            Self::If { lhs, rhs, .. } => vec![lhs, rhs],
            Self::Print { source } => vec![source],
            _ => Vec::new(),
        };

        operands.into_iter()
            .filter_map(Operand::as_register)
            .collect()
    }

    #[must_use]
    pub fn target(&self) -> Option<&Target> {
        match self {
            Self::If { target, .. } | Self::Goto { target } | Self::Gosub { target } => Some(target),
            _ => None,
        }
    }

    /// Rewrites the jump target, keeping everything else.
    pub fn map_target<T>(self, f: impl FnOnce(Target) -> T) -> Instruction<T> {
        match self {
            Self::Let { destination, source } => Instruction::Let { destination, source },
            Self::Compute { destination, lhs, operator, rhs } => Instruction::Compute { destination, lhs, operator, rhs },
            Self::If { lhs, comparison, rhs, target } => Instruction::If { lhs, comparison, rhs, target: f(target) },
            Self::Goto { target } => Instruction::Goto { target: f(target) },
            Self::Gosub { target } => Instruction::Gosub { target: f(target) },
            Self::Return => Instruction::Return,
            Self::Input { destination } => Instruction::Input { destination },
            Self::Print { source } => Instruction::Print { source },
            Self::End => Instruction::End,
        }
    }
}

impl<Target: Display> Display for Instruction<Target> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.opcode().as_ref())?;

        match self {
            Self::Let { destination, source } => write!(f, " {destination} = {source}"),
            Self::Compute { destination, lhs, operator, rhs } => write!(f, " {destination} = {lhs} {operator} {rhs}"),
            Self::If { lhs, comparison, rhs, target } => write!(f, " {lhs} {comparison} {rhs} THEN GOTO {target}"),
            Self::Goto { target } | Self::Gosub { target } => write!(f, " {target}"),
            Self::Input { destination } => write!(f, " {destination}"),
            Self::Print { source } => write!(f, " {source}"),
            Self::Return | Self::End => Ok(()),
        }
    }
}

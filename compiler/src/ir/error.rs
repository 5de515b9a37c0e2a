// Copyright (C) 2024 Tristan Gerritsen <tristan@thewoosh.org>
// All Rights Reserved.

use thiserror::Error;

/// Why a numbered program could not be read back from its text form.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NumberedProgramError {
    #[error("line {line}: expected instruction index {expected}, found `{found}`")]
    UnexpectedIndex {
        line: usize,
        expected: usize,
        found: String,
    },

    #[error("line {line}: unknown opcode `{opcode}`")]
    UnknownOpcode {
        line: usize,
        opcode: String,
    },

    #[error("line {line}: expected {expected}, but the line ended")]
    UnexpectedEnd {
        line: usize,
        expected: &'static str,
    },

    #[error("line {line}: expected {expected}, found `{found}`")]
    UnexpectedToken {
        line: usize,
        expected: &'static str,
        found: String,
    },

    #[error("line {line}: `{name}` is not a register name")]
    InvalidRegister {
        line: usize,
        name: String,
    },

    #[error("line {line}: string operand is missing its closing quote")]
    UnterminatedString {
        line: usize,
    },

    #[error("line {line}: jump target {target} is outside the program of {count} instructions")]
    TargetOutOfRange {
        line: usize,
        target: usize,
        count: usize,
    },
}

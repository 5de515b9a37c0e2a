// Copyright (C) 2024 Tristan Gerritsen <tristan@thewoosh.org>
// All Rights Reserved.

mod error;
mod instruction;
mod numbered;
mod operand;
mod program;
mod register;

pub use self::{
    error::NumberedProgramError,
    instruction::{
        Instruction,
        Label,
        Opcode,
        Operator,
    },
    numbered::NumberedProgram,
    operand::Operand,
    program::{
        IntermediateLine,
        IntermediateProgram,
    },
    register::{
        InvalidRegisterName,
        Register,
        RegisterClass,
        RegisterPool,
    },
};

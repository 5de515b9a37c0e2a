// Copyright (C) 2024 Tristan Gerritsen <tristan@thewoosh.org>
// All Rights Reserved.

mod analysis;
mod codegen;
mod ir;
mod pipeline;
mod register_allocation;

pub use self::{
    analysis::{
        FlowReport,
        LivenessAnalyzer,
        LivenessLine,
        SuccessorReport,
    },
    codegen::CodeGenerator,
    ir::{
        Instruction,
        IntermediateLine,
        IntermediateProgram,
        InvalidRegisterName,
        Label,
        NumberedProgram,
        NumberedProgramError,
        Opcode,
        Operand,
        Operator,
        Register,
        RegisterClass,
        RegisterPool,
    },
    pipeline::{
        AllocationArtifacts,
        CompilationArtifacts,
        Pipeline,
    },
    register_allocation::{
        Color,
        Coloring,
        InterferenceGraph,
        RegisterColorer,
    },
};

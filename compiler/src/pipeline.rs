// Copyright (C) 2024 Tristan Gerritsen <tristan@thewoosh.org>
// All Rights Reserved.

use bascule::{AbstractSyntaxTree, SemanticAnalyzer, SemanticTable};
use log::debug;

use crate::{CodeGenerator, Coloring, InterferenceGraph, IntermediateProgram, LivenessAnalyzer, NumberedProgram, RegisterColorer};

/// Runs every stage for one compilation. Stages keep their state to
/// themselves, so independent runs never affect each other.
#[derive(Debug)]
pub struct Pipeline;

impl Pipeline {
    #[must_use]
    pub fn compile(tree: &AbstractSyntaxTree) -> CompilationArtifacts {
        let semantics = SemanticAnalyzer::analyze(tree);
        debug!("Semantic analysis found {} problems", semantics.problems(tree).len());

        let intermediate = CodeGenerator::generate(tree, &semantics);
        let program = intermediate.sequentialize();
        debug!("Numbered program:\n{program}");

        let allocation = Self::allocate(&program);

        CompilationArtifacts {
            semantics,
            intermediate,
            program,
            allocation,
        }
    }

    /// Liveness and coloring only, for a program that is already numbered.
    #[must_use]
    pub fn allocate(program: &NumberedProgram) -> AllocationArtifacts {
        let liveness = LivenessAnalyzer::analyze(program);
        let graph = InterferenceGraph::build(&liveness);
        let coloring = RegisterColorer::color(&graph);

        AllocationArtifacts {
            liveness,
            graph,
            coloring,
        }
    }
}

#[derive(Debug, Clone)]
pub struct CompilationArtifacts {
    semantics: SemanticTable,
    intermediate: IntermediateProgram,
    program: NumberedProgram,
    allocation: AllocationArtifacts,
}

impl CompilationArtifacts {
    #[must_use]
    pub fn semantics(&self) -> &SemanticTable {
        &self.semantics
    }

    #[must_use]
    pub fn intermediate(&self) -> &IntermediateProgram {
        &self.intermediate
    }

    #[must_use]
    pub fn program(&self) -> &NumberedProgram {
        &self.program
    }

    #[must_use]
    pub fn allocation(&self) -> &AllocationArtifacts {
        &self.allocation
    }
}

#[derive(Debug, Clone)]
pub struct AllocationArtifacts {
    liveness: LivenessAnalyzer,
    graph: InterferenceGraph,
    coloring: Coloring,
}

impl AllocationArtifacts {
    #[must_use]
    pub fn liveness(&self) -> &LivenessAnalyzer {
        &self.liveness
    }

    #[must_use]
    pub fn graph(&self) -> &InterferenceGraph {
        &self.graph
    }

    #[must_use]
    pub fn coloring(&self) -> &Coloring {
        &self.coloring
    }
}

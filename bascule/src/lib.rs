// Copyright (C) 2024 Tristan Gerritsen <tristan@thewoosh.org>
// All Rights Reserved.

#![deny(elided_lifetimes_in_paths)]

mod ast;
mod semantics;

pub use self::{
    ast::{
        AbstractNode,
        AbstractSyntaxTree,
        AstError,
        NodeId,
        NodeKind,
    },
    semantics::{
        NameType,
        Scope,
        ScopeKind,
        ScopeStack,
        SemanticAnalyzer,
        SemanticError,
        SemanticProblem,
        SemanticRecord,
        SemanticReport,
        SemanticTable,
    },
};

// Copyright (C) 2024 Tristan Gerritsen <tristan@thewoosh.org>
// All Rights Reserved.

mod analyzer;
mod diagnostic;
mod flow;
mod name_type;
mod record;
mod rename;
mod scope;
mod table;

pub use self::{
    analyzer::SemanticAnalyzer,
    diagnostic::{
        SemanticError,
        SemanticProblem,
    },
    name_type::NameType,
    record::SemanticRecord,
    scope::{
        Scope,
        ScopeKind,
        ScopeStack,
    },
    table::{
        SemanticReport,
        SemanticTable,
    },
};

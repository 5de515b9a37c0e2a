// Copyright (C) 2024 Tristan Gerritsen <tristan@thewoosh.org>
// All Rights Reserved.

use strum::AsRefStr;
use thiserror::Error;

use crate::NodeKind;

/// An error annotation stored on the declaring node's record. Never fatal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error, AsRefStr)]
#[strum(serialize_all = "kebab-case")]
pub enum SemanticError {
    #[error("Redeclaration of Variable!")]
    RedeclaredVariable,

    #[error("Redeclaration of Procedure!")]
    RedeclaredProcedure,
}

/// A finding listed by [`SemanticTable::problems`](super::SemanticTable::problems).
#[derive(Debug, Clone, PartialEq, Eq, Error, AsRefStr)]
#[strum(serialize_all = "kebab-case")]
pub enum SemanticProblem {
    #[error("`{name}` is already declared in this scope")]
    Redeclaration {
        name: String,
        error: SemanticError,
    },

    #[error("`{name}` is not declared in any enclosing scope")]
    UnresolvedName {
        name: String,
    },

    #[error("type mismatch in {kind}")]
    TypeMismatch {
        kind: NodeKind,
    },

    #[error("{kind} can never be reached")]
    Unreachable {
        kind: NodeKind,
    },

    #[error("`{name}` is read before it has a value")]
    NoValue {
        name: String,
    },
}

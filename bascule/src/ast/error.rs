// Copyright (C) 2024 Tristan Gerritsen <tristan@thewoosh.org>
// All Rights Reserved.

use std::path::PathBuf;

use thiserror::Error;

use super::NodeKind;

/// A structural failure while loading the AST encoding. These are fatal:
/// none of the compilation stages are run over a tree that failed to load.
#[derive(Debug, Error)]
pub enum AstError {
    #[error("could not read AST file `{}`: {source}", .path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("the AST encoding contains no nodes")]
    Empty,

    #[error("line {line}: malformed node `{text}`")]
    MalformedLine {
        line: usize,
        text: String,
    },

    #[error("line {line}: unknown node kind `{kind}`")]
    UnknownNodeKind {
        line: usize,
        kind: String,
    },

    #[error("node id {id} appears more than once")]
    DuplicateId {
        id: usize,
    },

    #[error("node id {id} is out of range: {count} nodes were given, so ids must be 0..{count}")]
    IdOutOfRange {
        id: usize,
        count: usize,
    },

    #[error("node {id} ({kind}) requires a literal")]
    MissingLiteral {
        id: usize,
        kind: NodeKind,
    },

    #[error("node {id} ({kind}) does not take a literal")]
    UnexpectedLiteral {
        id: usize,
        kind: NodeKind,
    },

    #[error("node {id}: `{literal}` is not a valid number")]
    InvalidNumber {
        id: usize,
        literal: String,
    },

    #[error("node {parent} refers to child {child}, which does not exist")]
    DanglingChild {
        parent: usize,
        child: usize,
    },

    #[error("node {child} is claimed as a child by both node {first} and node {second}")]
    MultipleParents {
        child: usize,
        first: usize,
        second: usize,
    },

    #[error("node {id} is not connected to the root")]
    Detached {
        id: usize,
    },

    #[error("the root node must be a Prog, found {kind}")]
    RootNotProg {
        kind: NodeKind,
    },

    #[error("node {id} ({kind}) is malformed: expected {expected}")]
    MalformedShape {
        id: usize,
        kind: NodeKind,
        expected: &'static str,
    },
}

// Copyright (C) 2024 Tristan Gerritsen <tristan@thewoosh.org>
// All Rights Reserved.

mod error;
mod node;
mod node_kind;
mod tree;

pub use self::{
    error::AstError,
    node::{AbstractNode, NodeId},
    node_kind::NodeKind,
    tree::AbstractSyntaxTree,
};

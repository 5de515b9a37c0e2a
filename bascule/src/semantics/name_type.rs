// Copyright (C) 2024 Tristan Gerritsen <tristan@thewoosh.org>
// All Rights Reserved.

use strum::{AsRefStr, Display};

/// The inferred type of a node. Every node starts out as [`NameType::Error`]
/// and only acquires a definite type through bottom-up propagation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, AsRefStr, Display)]
pub enum NameType {
    Number,
    String,
    Boolean,
    Procedure,

    /// Nodes without a runtime value, such as blocks and `Halt`.
    Control,

    #[default]
    Error,
}

impl NameType {
    /// Types a variable can hold at run time.
    #[must_use]
    pub const fn is_value(&self) -> bool {
        matches!(self, Self::Number | Self::String | Self::Boolean)
    }
}

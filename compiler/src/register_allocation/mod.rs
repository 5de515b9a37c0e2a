// Copyright (C) 2024 Tristan Gerritsen <tristan@thewoosh.org>
// All Rights Reserved.

mod colorer;
mod interference;

pub use self::{
    colorer::{
        Color,
        Coloring,
        RegisterColorer,
    },
    interference::InterferenceGraph,
};

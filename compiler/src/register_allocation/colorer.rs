// Copyright (C) 2024 Tristan Gerritsen <tristan@thewoosh.org>
// All Rights Reserved.

use std::{collections::{BTreeMap, HashSet}, fmt::Display};

use log::{debug, trace};

use crate::Register;

use super::InterferenceGraph;

/// An opaque register class. Two vertices share a color only when they never
/// interfere.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Color(usize);

impl Color {
    #[must_use]
    pub const fn id(&self) -> usize {
        self.0
    }
}

impl Display for Color {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Color: {}", self.0)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Coloring {
    colors: BTreeMap<Register, Color>,
    color_count: usize,
}

impl Coloring {
    #[must_use]
    pub fn color_of(&self, register: Register) -> Option<Color> {
        self.colors.get(&register).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (Register, Color)> + '_ {
        self.colors.iter().map(|(register, color)| (*register, *color))
    }

    /// The number of register classes needed.
    #[must_use]
    pub fn color_count(&self) -> usize {
        self.color_count
    }

    /// Whether no edge of `graph` connects two vertices of the same color.
    #[must_use]
    pub fn is_proper_for(&self, graph: &InterferenceGraph) -> bool {
        graph.edges().iter().all(|(x, y)| self.color_of(*x) != self.color_of(*y))
    }
}

impl Display for Coloring {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for (register, color) in &self.colors {
            writeln!(f, "{register} := {color}")?;
        }

        Ok(())
    }
}

/// Greedy coloring, highest degree first.
#[derive(Debug)]
pub struct RegisterColorer<'graph> {
    graph: &'graph InterferenceGraph,
    coloring: Coloring,
}

impl<'graph> RegisterColorer<'graph> {
    #[must_use]
    pub fn color(graph: &'graph InterferenceGraph) -> Coloring {
        let mut this = Self {
            graph,
            coloring: Coloring::default(),
        };

        // Degrees are taken once, before anything is colored.
        let mut worklist: Vec<(Register, usize)> = graph.vertices().iter()
            .map(|register| (*register, graph.degree(*register)))
            .collect();
        worklist.sort_by_key(|(_, degree)| *degree);

        while let Some((register, degree)) = worklist.pop() {
            let color = this.pick_color(register);
            trace!("Coloring {register} (degree {degree}) with {color}");
            this.coloring.colors.insert(register, color);
        }

        debug!("Colored {} registers using {} colors", this.coloring.colors.len(), this.coloring.color_count);
        this.coloring
    }

    /// The last color not used by any neighbor, or a new one.
    fn pick_color(&mut self, register: Register) -> Color {
        let taken: HashSet<Color> = self.graph.neighbors(register)
            .filter_map(|neighbor| self.coloring.color_of(neighbor))
            .collect();

        let available = (0..self.coloring.color_count)
            .map(Color)
            .filter(|color| !taken.contains(color))
            .last();

        available.unwrap_or_else(|| {
            let color = Color(self.coloring.color_count);
            self.coloring.color_count += 1;
            color
        })
    }
}

// Copyright (C) 2024 Tristan Gerritsen <tristan@thewoosh.org>
// All Rights Reserved.

use std::{collections::BTreeSet, fmt::Display};

use log::debug;

use crate::{LivenessAnalyzer, Register};

/// Which registers must hold distinct values at the same time.
///
/// Edges are kept per occurrence: a pair interfering on several lines is
/// listed once for each of them, and each occurrence counts towards the
/// degree of both ends.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InterferenceGraph {
    vertices: BTreeSet<Register>,
    edges: Vec<(Register, Register)>,
}

impl InterferenceGraph {
    #[must_use]
    pub fn build(liveness: &LivenessAnalyzer) -> Self {
        let vertices: BTreeSet<Register> = liveness.lines().iter()
            .flat_map(|line| line.kills().iter().copied())
            .collect();

        let mut edges = Vec::new();
        for line in liveness.lines() {
            for killed in line.kills() {
                for live in line.live_out() {
                    if killed != live && vertices.contains(live) {
                        edges.push((*killed, *live));
                    }
                }
            }
        }

        let graph = Self { vertices, edges };
        graph.dump_edges();
        graph
    }

    #[must_use]
    pub fn vertices(&self) -> &BTreeSet<Register> {
        &self.vertices
    }

    #[must_use]
    pub fn edges(&self) -> &[(Register, Register)] {
        &self.edges
    }

    #[must_use]
    pub fn degree(&self, register: Register) -> usize {
        self.edges.iter()
            .filter(|(x, y)| *x == register || *y == register)
            .count()
    }

    pub fn neighbors(&self, register: Register) -> impl Iterator<Item = Register> + '_ {
        self.edges.iter().filter_map(move |(x, y)| {
            if *x == register {
                Some(*y)
            } else if *y == register {
                Some(*x)
            } else {
                None
            }
        })
    }

    #[must_use]
    pub fn interferes(&self, a: Register, b: Register) -> bool {
        self.neighbors(a).any(|neighbor| neighbor == b)
    }

    #[allow(unused)]
    fn dump_edges(&self) {
        debug!("Interference graph of {} vertices and {} edges:", self.vertices.len(), self.edges.len());
        for (x, y) in &self.edges {
            debug!("    {x} <-> {y}");
        }
    }
}

impl Display for InterferenceGraph {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for (x, y) in &self.edges {
            writeln!(f, "{x} <-> {y}")?;
        }

        Ok(())
    }
}

// Copyright (C) 2024 Tristan Gerritsen <tristan@thewoosh.org>
// All Rights Reserved.

use std::fmt::Display;

use bascule::{AbstractSyntaxTree, NodeId, SemanticProblem};
use colored::{Color, Colorize};

pub fn print_section(title: &str, body: impl Display) {
    println!("{}", format!("== {title} ==").bold());
    print!("{body}");
    println!();
}

pub fn print_problems(tree: &AbstractSyntaxTree, problems: &[(NodeId, SemanticProblem)]) {
    for (id, problem) in problems {
        let color = match problem {
            SemanticProblem::Unreachable { .. } | SemanticProblem::NoValue { .. } => Color::Yellow,
            _ => Color::Red,
        };

        eprintln!(
            "{}: {} {}",
            problem.as_ref().color(color).bold(),
            problem.to_string().bold(),
            format!("(node {} {})", id.index(), tree.node(*id).kind()).blue(),
        );
    }

    match problems.len() {
        0 => (),
        1 => eprintln!("1 semantic problem found"),
        count => eprintln!("{count} semantic problems found"),
    }
}

pub fn print_error(error: &anyhow::Error) {
    eprintln!("{}: {}", "error".red().bold(), error.to_string().bold());

    for cause in error.chain().skip(1) {
        eprintln!("  {} {cause}", "caused by:".red());
    }
}

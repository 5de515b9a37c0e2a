// Copyright (C) 2024 Tristan Gerritsen <tristan@thewoosh.org>
// All Rights Reserved.

#![deny(elided_lifetimes_in_paths)]

mod logger;
mod printer;

use std::{fs, path::{Path, PathBuf}, process::exit};

use anyhow::Context;
use bascule::AbstractSyntaxTree;
use bascule_compiler::{AllocationArtifacts, NumberedProgram, Pipeline};
use clap::Subcommand;
use logger::Logger;

use self::printer::{print_error, print_problems, print_section};

#[derive(clap::Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Commands,

    #[arg(short, long, global = true)]
    verbose: bool,
}

impl Args {
    pub fn parse_args() -> Self {
        use clap::Parser;
        Self::parse()
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Compile a pruned AST into a numbered program.
    Compile {
        ast_file: PathBuf,

        /// Directory to write `auxiliary.txt` and `output.bas` into.
        #[arg(long)]
        output: Option<PathBuf>,
    },

    /// Run liveness analysis and register coloring on a numbered program.
    Liveness {
        program_file: PathBuf,
    },
}

fn main() {
    let args = Args::parse_args();
    Logger::initialize(args.verbose);

    let result = match args.command {
        Commands::Compile { ast_file, output } => compile(&ast_file, output.as_deref()),
        Commands::Liveness { program_file } => liveness(&program_file),
    };

    if let Err(error) = result {
        print_error(&error);
        exit(1);
    }
}

fn compile(ast_file: &Path, output: Option<&Path>) -> anyhow::Result<()> {
    let tree = AbstractSyntaxTree::from_file(ast_file)
        .with_context(|| format!("failed to load AST from {}", ast_file.display()))?;

    let artifacts = Pipeline::compile(&tree);

    print_section("Semantic analysis", artifacts.semantics().report(&tree));
    print_problems(&tree, &artifacts.semantics().problems(&tree));

    print_section("Intermediate code", artifacts.intermediate());
    print_section("Numbered program", artifacts.program());
    print_allocation(artifacts.allocation());

    if let Some(directory) = output {
        fs::create_dir_all(directory)
            .with_context(|| format!("failed to create {}", directory.display()))?;

        write_artifact(&directory.join("auxiliary.txt"), artifacts.intermediate().to_string())?;
        write_artifact(&directory.join("output.bas"), artifacts.program().to_string())?;
    }

    Ok(())
}

fn liveness(program_file: &Path) -> anyhow::Result<()> {
    let text = fs::read_to_string(program_file)
        .with_context(|| format!("failed to read {}", program_file.display()))?;

    let program: NumberedProgram = text.parse()
        .with_context(|| format!("failed to decode numbered program {}", program_file.display()))?;

    print_allocation(&Pipeline::allocate(&program));
    Ok(())
}

fn print_allocation(allocation: &AllocationArtifacts) {
    let liveness = allocation.liveness();
    log::info!("Liveness converged after {} sweeps", liveness.sweeps());

    print_section("Liveness", liveness.successor_report());
    print_section("In/Out", liveness.flow_report());
    print_section("Interference", allocation.graph());
    print_section("Coloring", allocation.coloring());
}

fn write_artifact(path: &Path, contents: String) -> anyhow::Result<()> {
    fs::write(path, contents)
        .with_context(|| format!("failed to write {}", path.display()))?;
    log::info!("Wrote {}", path.display());
    Ok(())
}

// Copyright (C) 2024 Tristan Gerritsen <tristan@thewoosh.org>
// All Rights Reserved.

use bascule::{AbstractSyntaxTree, NodeId};
use bascule_compiler::{CompilationArtifacts, NumberedProgram, Opcode, Pipeline, Register};
use pretty_assertions::assert_eq;
use rstest::rstest;

const SINGLE_ASSIGNMENT: &str = "\
0 Prog 1
1 Code 2 3
2 NumDecl(x)
3 Assign 4 5
4 Var(x)
5 Number(1)
";

const COUNTDOWN: &str = "\
0 Prog 1 27
1 Code 2 3 4 7 10 25 26
2 NumDecl(n)
3 StrDecl(s)
4 Assign 5 6
5 Var(n)
6 Number(3)
7 Assign 8 9
8 Var(s)
9 String(\"done\")
10 WhileLoop 11 14
11 GreaterExpr 12 13
12 Var(n)
13 Number(0)
14 Code 15 20
15 Assign 16 17
16 Var(n)
17 SubExpr 18 19
18 Var(n)
19 Number(1)
20 CondBranch 21 23 24
21 OrExpr 22 30
22 False
23 Code 31
24 Code 32
25 Call(report)
26 Output 33
27 ProcDefs 28
28 Proc(report) 29
29 Code 34
30 EqExpr 35 36
31 Call(report)
32 Halt
33 Var(s)
34 Output 37
35 Var(n)
36 Number(2)
37 Var(n)
";

const THREE_LIVE_VALUES: &str = "\
0 Prog 1
1 Code 2 3 4 5 8 11 14
2 NumDecl(a)
3 NumDecl(b)
4 NumDecl(c)
5 Assign 6 7
6 Var(a)
7 Number(1)
8 Assign 9 10
9 Var(b)
10 Number(2)
11 Assign 12 13
12 Var(c)
13 Number(3)
14 Output 15
15 AddExpr 16 19
16 AddExpr 17 18
17 Var(a)
18 Var(b)
19 Var(c)
";

const NESTED_PROCEDURES: &str = "\
0 Prog 1 2
 1 Code 3
  3 Call(\"p\")
 2 ProcDefs 4
  4 Proc(\"p\") 5
   5 Prog 6 7
    6 Code 8 9
     8 Call(\"q\")
     9 Output 11
      11 String(\"p\")
    7 ProcDefs 10
     10 Proc(\"q\") 12
      12 Prog 13
       13 Code 14
        14 Output 15
         15 String(\"q\")
";

fn compile(input: &str) -> CompilationArtifacts {
    let _ = env_logger::builder().is_test(true).filter(None, log::LevelFilter::max()).try_init();

    let tree: AbstractSyntaxTree = input.parse().expect("test AST should load");
    Pipeline::compile(&tree)
}

#[test]
fn single_assignment_compiles_to_one_let() {
    let artifacts = compile(SINGLE_ASSIGNMENT);

    assert_eq!(artifacts.semantics().get(NodeId::new(4)).name(), "V0");
    assert!(artifacts.semantics().get(NodeId::new(4)).is_reachable());

    let program = artifacts.program();
    assert_eq!(program.to_string(), "0 LET AA = 1\n1 END\n");

    let lets = program.instructions().iter()
        .filter(|instruction| instruction.opcode() == Opcode::Let)
        .count();
    assert_eq!(lets, 1);
    assert!(program.instructions().iter().all(|instruction| instruction.target().is_none()));

    let liveness = artifacts.allocation().liveness();
    assert!(liveness.lines().last().expect("program is not empty").live_out().is_empty());

    assert!(artifacts.allocation().graph().edges().is_empty());
    assert_eq!(artifacts.allocation().coloring().color_count(), 1);
    assert_eq!(artifacts.allocation().coloring().to_string(), "AA := Color: 0\n");
}

#[rstest]
#[case::single_assignment(SINGLE_ASSIGNMENT)]
#[case::countdown(COUNTDOWN)]
#[case::three_live_values(THREE_LIVE_VALUES)]
#[case::nested_procedures(NESTED_PROCEDURES)]
fn numbered_lines_are_contiguous_and_targets_resolve(#[case] input: &str) {
    let artifacts = compile(input);
    let program = artifacts.program();

    assert_eq!(program.len(), artifacts.intermediate().instruction_count());

    let text = program.to_string();
    for (expected, line) in text.lines().enumerate() {
        let index = line.split_whitespace().next().expect("line has an index");
        assert_eq!(index, expected.to_string());
    }

    for instruction in program.instructions() {
        if let Some(target) = instruction.target() {
            assert!(*target < program.len(), "{instruction} jumps past the end");
        }
    }

    assert_eq!(program.instructions().last().map(|instruction| instruction.opcode()), Some(Opcode::End));
}

#[rstest]
#[case::single_assignment(SINGLE_ASSIGNMENT)]
#[case::countdown(COUNTDOWN)]
#[case::three_live_values(THREE_LIVE_VALUES)]
#[case::nested_procedures(NESTED_PROCEDURES)]
fn liveness_is_idempotent(#[case] input: &str) {
    let artifacts = compile(input);
    let mut liveness = artifacts.allocation().liveness().clone();

    assert_eq!(liveness.solve(), 1);
    assert_eq!(liveness.lines(), artifacts.allocation().liveness().lines());
}

#[rstest]
#[case::single_assignment(SINGLE_ASSIGNMENT)]
#[case::countdown(COUNTDOWN)]
#[case::three_live_values(THREE_LIVE_VALUES)]
#[case::nested_procedures(NESTED_PROCEDURES)]
fn coloring_is_proper(#[case] input: &str) {
    let artifacts = compile(input);
    let allocation = artifacts.allocation();

    assert!(allocation.coloring().is_proper_for(allocation.graph()));

    for register in allocation.graph().vertices() {
        assert!(allocation.coloring().color_of(*register).is_some(), "{register} was not colored");
    }
}

#[test]
fn three_simultaneously_live_values_need_three_colors() {
    let artifacts = compile(THREE_LIVE_VALUES);
    let semantics = artifacts.semantics();

    let [a, b, c] = [6, 9, 12].map(|id| semantics.get(NodeId::new(id)).name().to_string());
    assert_eq!([a.as_str(), b.as_str(), c.as_str()], ["V0", "V1", "V2"]);

    let graph = artifacts.allocation().graph();
    let variables: Vec<Register> = ["AA", "AB", "AC"].iter()
        .map(|name| name.parse().expect("valid register name"))
        .collect();

    for (index, x) in variables.iter().enumerate() {
        for y in &variables[index + 1..] {
            assert!(graph.interferes(*x, *y), "{x} and {y} should interfere");
        }
    }

    assert!(artifacts.allocation().coloring().color_count() >= 3);
}

#[test]
fn procedures_are_skipped_and_called() {
    let artifacts = compile(COUNTDOWN);
    let intermediate = artifacts.intermediate().to_string();

    assert!(intermediate.contains("GOSUB #P0\n"));
    assert!(intermediate.contains("\n#P0\n"));
    assert!(intermediate.contains("RETURN\n#"));
    assert!(intermediate.ends_with("\n#0\nEND\n"));
}

#[test]
fn nested_procedures_are_laid_out_inside_their_parent() {
    let artifacts = compile(NESTED_PROCEDURES);
    let semantics = artifacts.semantics();

    assert_eq!(semantics.get(NodeId::new(4)).name(), "P0");
    assert_eq!(semantics.get(NodeId::new(10)).name(), "P1");
    assert_eq!(semantics.get(NodeId::new(3)).name(), "P0");
    assert_eq!(semantics.get(NodeId::new(8)).name(), "P1");
    assert_eq!(semantics.get(NodeId::new(5)).scope_id(), semantics.get(NodeId::new(4)).scope_id());

    assert_eq!(artifacts.intermediate().to_string(), "\
GOSUB #P0
GOTO #1
#P0
GOSUB #P1
LET AA$ = \"p\"
PRINT AA$
GOTO #2
#P1
LET AB$ = \"q\"
PRINT AB$
RETURN
#2
RETURN
#1
#0
END
");

    assert_eq!(artifacts.program().to_string(), "\
0 GOSUB 2
1 GOTO 10
2 GOSUB 6
3 LET AA$ = \"p\"
4 PRINT AA$
5 GOTO 9
6 LET AB$ = \"q\"
7 PRINT AB$
8 RETURN
9 RETURN
10 END
");
}

#[test]
fn numbered_program_round_trips_through_text() {
    let artifacts = compile(COUNTDOWN);

    let text = artifacts.program().to_string();
    let reread: NumberedProgram = text.parse().expect("generated program should read back");
    assert_eq!(&reread, artifacts.program());

    let allocation = Pipeline::allocate(&reread);
    assert_eq!(allocation.coloring(), artifacts.allocation().coloring());
    assert_eq!(
        allocation.liveness().flow_report().to_string(),
        artifacts.allocation().liveness().flow_report().to_string(),
    );
}

#[test]
fn semantic_report_has_a_line_per_node() {
    let tree: AbstractSyntaxTree = COUNTDOWN.parse().expect("test AST should load");
    let artifacts = Pipeline::compile(&tree);

    let report = artifacts.semantics().report(&tree).to_string();
    assert_eq!(report.lines().count(), tree.len());
    assert!(report.starts_with("0  |0::Prog"));
}

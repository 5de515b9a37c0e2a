// Copyright (C) 2024 Tristan Gerritsen <tristan@thewoosh.org>
// All Rights Reserved.

use std::{collections::BTreeSet, fmt::Display};

use log::{debug, trace, warn};

use crate::{Instruction, NumberedProgram, Register};

/// The dataflow facts of a single numbered line.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LivenessLine {
    successors: BTreeSet<usize>,
    generates: BTreeSet<Register>,
    kills: BTreeSet<Register>,
    live_in: BTreeSet<Register>,
    live_out: BTreeSet<Register>,
}

impl LivenessLine {
    #[must_use]
    pub fn successors(&self) -> &BTreeSet<usize> {
        &self.successors
    }

    /// Registers read by this line.
    #[must_use]
    pub fn generates(&self) -> &BTreeSet<Register> {
        &self.generates
    }

    /// Registers overwritten by this line.
    #[must_use]
    pub fn kills(&self) -> &BTreeSet<Register> {
        &self.kills
    }

    #[must_use]
    pub fn live_in(&self) -> &BTreeSet<Register> {
        &self.live_in
    }

    #[must_use]
    pub fn live_out(&self) -> &BTreeSet<Register> {
        &self.live_out
    }
}

/// Backward may-be-live analysis over a [`NumberedProgram`].
///
/// A line only takes the live-in set of successors at or after itself into
/// account. Backward jumps (loops, returns) therefore do not feed liveness
/// back up the program.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LivenessAnalyzer {
    lines: Vec<LivenessLine>,
    sweeps: usize,
}

impl LivenessAnalyzer {
    /// Derives successors, gen and kill sets without solving.
    #[must_use]
    pub fn new(program: &NumberedProgram) -> Self {
        let count = program.len();
        let mut return_addresses = Vec::new();

        let lines = program.instructions().iter()
            .enumerate()
            .map(|(index, instruction)| {
                let mut line = LivenessLine {
                    generates: instruction.source_registers().into_iter().collect(),
                    kills: instruction.destination_register().into_iter().collect(),
                    ..Default::default()
                };

                if index + 1 < count {
                    line.successors = successors_of(index, instruction, &mut return_addresses);
                    line.successors.retain(|successor| *successor < count);
                }

                line
            })
            .collect();

        Self { lines, sweeps: 0 }
    }

    #[must_use]
    pub fn analyze(program: &NumberedProgram) -> Self {
        let mut this = Self::new(program);
        this.solve();
        this.dump_result();
        this
    }

    /// Sweeps the lines last-to-first until a sweep changes nothing.
    /// Returns the number of sweeps, including the final unchanged one.
    pub fn solve(&mut self) -> usize {
        self.sweeps = 0;

        loop {
            self.sweeps += 1;
            let mut changed = false;

            for index in (0..self.lines.len()).rev() {
                let live_out: BTreeSet<Register> = self.lines[index].successors.iter()
                    .filter(|successor| **successor >= index)
                    .flat_map(|successor| self.lines[*successor].live_in.iter().copied())
                    .collect();

                let line = &self.lines[index];
                let live_in: BTreeSet<Register> = line.generates.iter()
                    .chain(live_out.difference(&line.kills))
                    .copied()
                    .collect();

                let line = &mut self.lines[index];
                if line.live_in != live_in || line.live_out != live_out {
                    changed = true;
                    line.live_in = live_in;
                    line.live_out = live_out;
                }
            }

            trace!("Liveness sweep {} changed: {changed}", self.sweeps);
            if !changed {
                break;
            }
        }

        debug!("Liveness reached a fixed point after {} sweeps", self.sweeps);
        self.sweeps
    }

    #[must_use]
    pub fn lines(&self) -> &[LivenessLine] {
        &self.lines
    }

    /// Number of sweeps the last [`solve`](Self::solve) needed.
    #[must_use]
    pub fn sweeps(&self) -> usize {
        self.sweeps
    }

    /// `Succ[i] = {…} --|-- Gen[i] = {…} --|-- Kill[i] = {…}` per line.
    #[must_use]
    pub fn successor_report(&self) -> SuccessorReport<'_> {
        SuccessorReport { lines: &self.lines }
    }

    /// `In[i] = {…} --|-- Out[i] = {…}` per line.
    #[must_use]
    pub fn flow_report(&self) -> FlowReport<'_> {
        FlowReport { lines: &self.lines }
    }

    #[allow(unused)]
    pub fn dump_result(&self) {
        debug!("Liveness of {} lines:", self.lines.len());
        for (index, line) in self.lines.iter().enumerate() {
            debug!("    {index}: in={} out={}", set(&line.live_in), set(&line.live_out));
        }
    }
}

fn successors_of(index: usize, instruction: &Instruction<usize>, return_addresses: &mut Vec<usize>) -> BTreeSet<usize> {
    match instruction {
        Instruction::If { target, .. } => BTreeSet::from([*target, index + 1]),
        Instruction::Goto { target } => BTreeSet::from([*target]),

        Instruction::Gosub { target } => {
            return_addresses.push(index);
            BTreeSet::from([*target])
        }

        Instruction::Return => match return_addresses.pop() {
            Some(address) => BTreeSet::from([address + 1]),
            None => {
                warn!("RETURN on line {index} has no matching GOSUB before it");
                BTreeSet::new()
            }
        },

        _ => BTreeSet::from([index + 1]),
    }
}

struct DisplaySet<'a, T>(&'a BTreeSet<T>);

impl<T: Display> Display for DisplaySet<'_, T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("{")?;
        for (position, item) in self.0.iter().enumerate() {
            if position != 0 {
                f.write_str(", ")?;
            }
            item.fmt(f)?;
        }
        f.write_str("}")
    }
}

fn set<T>(items: &BTreeSet<T>) -> DisplaySet<'_, T> {
    DisplaySet(items)
}

pub struct SuccessorReport<'a> {
    lines: &'a [LivenessLine],
}

impl Display for SuccessorReport<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for (index, line) in self.lines.iter().enumerate() {
            writeln!(
                f,
                "Succ[{index}] = {} --|-- Gen[{index}] = {} --|-- Kill[{index}] = {}",
                set(&line.successors), set(&line.generates), set(&line.kills),
            )?;
        }

        Ok(())
    }
}

pub struct FlowReport<'a> {
    lines: &'a [LivenessLine],
}

impl Display for FlowReport<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for (index, line) in self.lines.iter().enumerate() {
            writeln!(f, "In[{index}] = {} --|-- Out[{index}] = {}", set(&line.live_in), set(&line.live_out))?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use crate::RegisterClass;

    use super::*;

    fn analyze(program: &str) -> LivenessAnalyzer {
        LivenessAnalyzer::analyze(&program.parse::<NumberedProgram>().expect("test program should parse"))
    }

    fn registers(names: &[&str]) -> BTreeSet<Register> {
        names.iter().map(|name| name.parse().unwrap()).collect()
    }

    const STRAIGHT_LINE: &str = "\
0 LET AA = 1
1 LET AB = 2
2 LET AC = AA + AB
3 PRINT AC
4 END
";

    #[test]
    fn straight_line_liveness() {
        let liveness = analyze(STRAIGHT_LINE);
        let lines = liveness.lines();

        assert_eq!(lines[0].live_out(), &registers(&["AA"]));
        assert_eq!(lines[1].live_in(), &registers(&["AA"]));
        assert_eq!(lines[1].live_out(), &registers(&["AA", "AB"]));
        assert_eq!(lines[2].live_in(), &registers(&["AA", "AB"]));
        assert_eq!(lines[2].live_out(), &registers(&["AC"]));
        assert_eq!(lines[3].live_out(), &registers(&[]));
        assert_eq!(lines[4].successors(), &BTreeSet::new());
    }

    #[test]
    fn successors_gen_and_kill() {
        let liveness = analyze("\
0 IF AA < 3 THEN GOTO 3
1 GOSUB 4
2 GOTO 6
3 INPUT AB
4 PRINT AB$
5 RETURN
6 END
");
        let lines = liveness.lines();

        assert_eq!(lines[0].successors(), &BTreeSet::from([1, 3]));
        assert_eq!(lines[0].generates(), &registers(&["AA"]));
        assert_eq!(lines[1].successors(), &BTreeSet::from([4]));
        assert_eq!(lines[2].successors(), &BTreeSet::from([6]));
        assert_eq!(lines[3].kills(), &registers(&["AB"]));
        assert_eq!(lines[4].generates(), &BTreeSet::from([Register::new(1, RegisterClass::String)]));
        assert_eq!(lines[5].successors(), &BTreeSet::from([2]));
        assert_eq!(lines[6].successors(), &BTreeSet::new());
    }

    #[test]
    fn return_goes_back_to_the_latest_call() {
        let liveness = analyze("\
0 GOSUB 5
1 GOSUB 7
2 GOTO 9
3 RETURN
4 RETURN
5 PRINT AA
6 RETURN
7 PRINT AB
8 RETURN
9 END
");
        let lines = liveness.lines();

        // Pairs up in line order: line 3 returns to the GOSUB on line 1.
        assert_eq!(lines[3].successors(), &BTreeSet::from([2]));
        assert_eq!(lines[4].successors(), &BTreeSet::from([1]));
        assert_eq!(lines[6].successors(), &BTreeSet::new());
    }

    #[test]
    fn backward_successors_are_ignored() {
        let liveness = analyze("\
0 LET AA = 0
1 PRINT AA
2 GOTO 1
3 END
");
        let lines = liveness.lines();

        assert_eq!(lines[2].successors(), &BTreeSet::from([1]));
        assert_eq!(lines[2].live_out(), &registers(&[]));
        assert_eq!(lines[0].live_out(), &registers(&["AA"]));
    }

    #[test]
    fn solving_again_changes_nothing() {
        let mut liveness = analyze(STRAIGHT_LINE);
        let converged = liveness.clone();

        assert_eq!(converged.sweeps(), 2);
        assert_eq!(liveness.solve(), 1);
        assert_eq!(liveness.lines(), converged.lines());
    }

    #[test]
    fn reports() {
        let liveness = analyze("\
0 LET AA = 1
1 PRINT AA
2 END
");

        assert_eq!(liveness.successor_report().to_string(), "\
Succ[0] = {1} --|-- Gen[0] = {} --|-- Kill[0] = {AA}
Succ[1] = {2} --|-- Gen[1] = {AA} --|-- Kill[1] = {}
Succ[2] = {} --|-- Gen[2] = {} --|-- Kill[2] = {}
");

        assert_eq!(liveness.flow_report().to_string(), "\
In[0] = {} --|-- Out[0] = {AA}
In[1] = {AA} --|-- Out[1] = {}
In[2] = {} --|-- Out[2] = {}
");
    }
}

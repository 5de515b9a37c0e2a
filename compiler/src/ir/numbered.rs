// Copyright (C) 2024 Tristan Gerritsen <tristan@thewoosh.org>
// All Rights Reserved.

use std::{fmt::Display, iter::Peekable, str::FromStr, vec::IntoIter};

use log::{debug, trace};

use super::{Instruction, NumberedProgramError, Opcode, Operand, Operator, Register};

/// The final, flat program: instruction `i` is line `i`, and every jump
/// target is a line index.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NumberedProgram {
    pub(crate) instructions: Vec<Instruction<usize>>,
}

impl NumberedProgram {
    #[must_use]
    pub fn new(instructions: Vec<Instruction<usize>>) -> Self {
        Self { instructions }
    }

    #[must_use]
    pub fn instructions(&self) -> &[Instruction<usize>] {
        &self.instructions
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.instructions.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.instructions.is_empty()
    }
}

impl Display for NumberedProgram {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for (index, instruction) in self.instructions.iter().enumerate() {
            writeln!(f, "{index} {instruction}")?;
        }

        Ok(())
    }
}

impl FromStr for NumberedProgram {
    type Err = NumberedProgramError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lines: Vec<(usize, &str)> = s.lines()
            .enumerate()
            .map(|(index, text)| (index + 1, text))
            .filter(|(_, text)| !text.trim().is_empty())
            .collect();

        let count = lines.len();
        let mut instructions = Vec::with_capacity(count);

        for (expected, (line, text)) in lines.into_iter().enumerate() {
            let mut parser = LineParser {
                line,
                count,
                tokens: tokenize(line, text)?.into_iter().peekable(),
            };

            let index = parser.next("an instruction index")?;
            if index.parse::<usize>().ok() != Some(expected) {
                return Err(NumberedProgramError::UnexpectedIndex { line, expected, found: index.to_string() });
            }

            let instruction = parser.instruction()?;
            parser.finish()?;

            trace!("Read line {expected}: {instruction}");
            instructions.push(instruction);
        }

        debug!("Read numbered program of {} instructions", instructions.len());
        Ok(Self { instructions })
    }
}

/// Splits on whitespace, keeping a double-quoted string as one token.
fn tokenize(line: usize, text: &str) -> Result<Vec<&str>, NumberedProgramError> {
    let mut tokens = Vec::new();
    let mut rest = text.trim_start();

    while !rest.is_empty() {
        let end = if let Some(string) = rest.strip_prefix('"') {
            let close = string.find('"').ok_or(NumberedProgramError::UnterminatedString { line })?;
            close + 2
        } else {
            rest.find(char::is_whitespace).unwrap_or(rest.len())
        };

        tokens.push(&rest[..end]);
        rest = rest[end..].trim_start();
    }

    Ok(tokens)
}

struct LineParser<'text> {
    line: usize,
    count: usize,
    tokens: Peekable<IntoIter<&'text str>>,
}

impl<'text> LineParser<'text> {
    fn next(&mut self, expected: &'static str) -> Result<&'text str, NumberedProgramError> {
        self.tokens.next()
            .ok_or(NumberedProgramError::UnexpectedEnd { line: self.line, expected })
    }

    fn unexpected(&self, expected: &'static str, found: &str) -> NumberedProgramError {
        NumberedProgramError::UnexpectedToken { line: self.line, expected, found: found.to_string() }
    }

    fn keyword(&mut self, keyword: &'static str) -> Result<(), NumberedProgramError> {
        let token = self.next(keyword)?;
        if token != keyword {
            return Err(self.unexpected(keyword, token));
        }

        Ok(())
    }

    fn instruction(&mut self) -> Result<Instruction<usize>, NumberedProgramError> {
        let token = self.next("an opcode")?;
        let opcode = Opcode::from_str(token)
            .map_err(|_| NumberedProgramError::UnknownOpcode { line: self.line, opcode: token.to_string() })?;

        Ok(match opcode {
            Opcode::Let => {
                let destination = self.register()?;
                self.keyword("=")?;
                let source = self.operand()?;

                if self.tokens.peek().is_none() {
                    Instruction::Let { destination, source }
                } else {
                    let operator = self.operator()?;
                    let rhs = self.operand()?;
                    Instruction::Compute { destination, lhs: source, operator, rhs }
                }
            }

            Opcode::If => {
                let lhs = self.operand()?;
                let comparison = self.operator()?;
                let rhs = self.operand()?;
                self.keyword("THEN")?;
                self.keyword("GOTO")?;
                let target = self.target()?;
                Instruction::If { lhs, comparison, rhs, target }
            }

            Opcode::Goto => Instruction::Goto { target: self.target()? },
            Opcode::Gosub => Instruction::Gosub { target: self.target()? },
            Opcode::Return => Instruction::Return,
            Opcode::Input => Instruction::Input { destination: self.register()? },
            Opcode::Print => Instruction::Print { source: self.operand()? },
            Opcode::End => Instruction::End,
        })
    }

    fn register(&mut self) -> Result<Register, NumberedProgramError> {
        let token = self.next("a register")?;
        token.parse()
            .map_err(|_| NumberedProgramError::InvalidRegister { line: self.line, name: token.to_string() })
    }

    fn operand(&mut self) -> Result<Operand, NumberedProgramError> {
        let token = self.next("an operand")?;

        if let Some(string) = token.strip_prefix('"') {
            let string = string.strip_suffix('"').unwrap_or(string);
            return Ok(Operand::String(string.to_string()));
        }

        let digits = token.strip_prefix('-').unwrap_or(token);
        if digits.starts_with(|c: char| c.is_ascii_digit()) {
            return token.parse()
                .map(Operand::Number)
                .map_err(|_| self.unexpected("a number", token));
        }

        if token.starts_with(|c: char| c.is_ascii_alphabetic()) {
            return token.parse()
                .map(Operand::Register)
                .map_err(|_| NumberedProgramError::InvalidRegister { line: self.line, name: token.to_string() });
        }

        Err(self.unexpected("an operand", token))
    }

    fn operator(&mut self) -> Result<Operator, NumberedProgramError> {
        let token = self.next("an operator")?;
        Operator::from_str(token).map_err(|_| self.unexpected("an operator", token))
    }

    fn target(&mut self) -> Result<usize, NumberedProgramError> {
        let token = self.next("a jump target")?;
        let target: usize = token.parse().map_err(|_| self.unexpected("a jump target", token))?;

        if target >= self.count {
            return Err(NumberedProgramError::TargetOutOfRange { line: self.line, target, count: self.count });
        }

        Ok(target)
    }

    fn finish(&mut self) -> Result<(), NumberedProgramError> {
        match self.tokens.next() {
            Some(token) => Err(self.unexpected("the end of the line", token)),
            None => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    use crate::RegisterClass;

    use super::*;

    const PROGRAM: &str = "\
0 LET AA = 1
1 LET AB$ = \"hello  world\"
2 IF AA < 10 THEN GOTO 5
3 LET AA = AA - -2
4 GOSUB 7
5 PRINT AB$
6 INPUT AC
7 RETURN
8 GOTO 9
9 END
";

    #[test]
    fn text_form_reads_back_unchanged() {
        let program: NumberedProgram = PROGRAM.parse().unwrap();

        assert_eq!(program.len(), 10);
        assert_eq!(program.to_string(), PROGRAM);
    }

    #[test]
    fn reads_operands() {
        let program: NumberedProgram = PROGRAM.parse().unwrap();

        assert_eq!(program.instructions()[1], Instruction::Let {
            destination: Register::new(1, RegisterClass::String),
            source: Operand::String("hello  world".to_string()),
        });

        assert_eq!(program.instructions()[3], Instruction::Compute {
            destination: Register::new(0, RegisterClass::Number),
            lhs: Operand::Register(Register::new(0, RegisterClass::Number)),
            operator: Operator::Subtract,
            rhs: Operand::Number(-2),
        });
    }

    #[test]
    fn blank_lines_are_skipped() {
        let program: NumberedProgram = "\n0 GOTO 1\n\n1 END\n".parse().unwrap();
        assert_eq!(program.len(), 2);
    }

    #[rstest]
    #[case::gap("0 END\n2 END\n", NumberedProgramError::UnexpectedIndex { line: 2, expected: 1, found: "2".into() })]
    #[case::opcode("0 JUMP 0\n", NumberedProgramError::UnknownOpcode { line: 1, opcode: "JUMP".into() })]
    #[case::truncated("0 LET AA =\n", NumberedProgramError::UnexpectedEnd { line: 1, expected: "an operand" })]
    #[case::register("0 INPUT x\n", NumberedProgramError::InvalidRegister { line: 1, name: "x".into() })]
    #[case::quote("0 PRINT \"open\n", NumberedProgramError::UnterminatedString { line: 1 })]
    #[case::target("0 GOTO 1\n", NumberedProgramError::TargetOutOfRange { line: 1, target: 1, count: 1 })]
    #[case::trailing("0 END now\n", NumberedProgramError::UnexpectedToken { line: 1, expected: "the end of the line", found: "now".into() })]
    #[case::keyword("0 IF AA = 1 GOTO 0\n", NumberedProgramError::UnexpectedToken { line: 1, expected: "THEN", found: "GOTO".into() })]
    fn rejects(#[case] input: &str, #[case] expected: NumberedProgramError) {
        assert_eq!(input.parse::<NumberedProgram>(), Err(expected));
    }
}

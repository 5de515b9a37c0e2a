// Copyright (C) 2024 Tristan Gerritsen <tristan@thewoosh.org>
// All Rights Reserved.

use std::fmt::{Display, Write};

use super::Register;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Operand {
    Number(i64),

    /// Printed between double quotes.
    String(String),

    Register(Register),
}

impl Operand {
    #[must_use]
    pub fn as_register(&self) -> Option<Register> {
        match self {
            Self::Register(register) => Some(*register),
            _ => None,
        }
    }
}

impl Display for Operand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Number(number) => number.fmt(f),
            Self::String(string) => {
                f.write_char('"')?;
                f.write_str(string)?;
                f.write_char('"')
            }
            Self::Register(register) => register.fmt(f),
        }
    }
}

impl From<Register> for Operand {
    fn from(value: Register) -> Self {
        Self::Register(value)
    }
}

impl From<i64> for Operand {
    fn from(value: i64) -> Self {
        Self::Number(value)
    }
}

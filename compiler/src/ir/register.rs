// Copyright (C) 2024 Tristan Gerritsen <tristan@thewoosh.org>
// All Rights Reserved.

use std::{collections::HashMap, fmt::{Display, Write}, str::FromStr};

use bascule::NameType;

const LETTERS: usize = 26;

/// The narrowest register names are two letters wide.
const MINIMUM_WIDTH: u32 = 2;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum RegisterClass {
    #[default]
    Number,

    /// Spelled with a trailing `$`.
    String,
}

impl RegisterClass {
    #[must_use]
    pub fn of(name_type: NameType) -> Self {
        match name_type {
            NameType::String => Self::String,
            _ => Self::Number,
        }
    }
}

/// A named storage location: `AA`, `AB`, …, `ZZ`, `AAA`, … with a trailing
/// `$` for the string class. Ordering follows the name order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Register {
    index: usize,
    class: RegisterClass,
}

impl Register {
    #[must_use]
    pub const fn new(index: usize, class: RegisterClass) -> Self {
        Self { index, class }
    }

    #[must_use]
    pub const fn index(&self) -> usize {
        self.index
    }

    #[must_use]
    pub const fn class(&self) -> RegisterClass {
        self.class
    }
}

impl Display for Register {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut remaining = self.index;
        let mut width = MINIMUM_WIDTH;
        while let Some(count) = LETTERS.checked_pow(width).filter(|count| remaining >= *count) {
            remaining -= count;
            width += 1;
        }

        for position in (0..width).rev() {
            let digit = (remaining / LETTERS.pow(position)) % LETTERS;
            f.write_char(char::from(b'A' + digit as u8))?;
        }

        if self.class == RegisterClass::String {
            f.write_char('$')?;
        }

        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InvalidRegisterName;

impl FromStr for Register {
    type Err = InvalidRegisterName;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (letters, class) = match s.strip_suffix('$') {
            Some(letters) => (letters, RegisterClass::String),
            None => (s, RegisterClass::Number),
        };

        let width = u32::try_from(letters.len()).map_err(|_| InvalidRegisterName)?;
        if width < MINIMUM_WIDTH || !letters.bytes().all(|b| b.is_ascii_uppercase()) {
            return Err(InvalidRegisterName);
        }

        let mut index: usize = 0;
        for narrower in MINIMUM_WIDTH..width {
            index = LETTERS.checked_pow(narrower)
                .and_then(|count| index.checked_add(count))
                .ok_or(InvalidRegisterName)?;
        }

        let mut value: usize = 0;
        for letter in letters.bytes() {
            value = value.checked_mul(LETTERS)
                .and_then(|value| value.checked_add(usize::from(letter - b'A')))
                .ok_or(InvalidRegisterName)?;
        }

        let index = index.checked_add(value).ok_or(InvalidRegisterName)?;
        Ok(Self { index, class })
    }
}

/// Hands out register names for one compilation run. User variables and
/// temporaries draw from the same namespace, so a name is never reused.
#[derive(Debug, Default)]
pub struct RegisterPool {
    next_index: usize,
    variables: HashMap<String, Register>,
}

impl RegisterPool {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn temporary(&mut self, class: RegisterClass) -> Register {
        let register = Register::new(self.next_index, class);
        self.next_index += 1;
        register
    }

    /// The register of a (renamed) user variable. The class is fixed by the
    /// first request for that name.
    #[must_use]
    pub fn variable(&mut self, name: &str, class: RegisterClass) -> Register {
        if let Some(register) = self.variables.get(name) {
            return *register;
        }

        let register = self.temporary(class);
        self.variables.insert(name.to_string(), register);
        register
    }

    #[must_use]
    pub fn allocated(&self) -> usize {
        self.next_index
    }
}

// Copyright (C) 2024 Tristan Gerritsen <tristan@thewoosh.org>
// All Rights Reserved.

use std::ops::RangeInclusive;

use strum::{AsRefStr, Display, EnumIter, EnumString};

/// The closed set of node kinds the pruned syntax tree can contain. The
/// spelling of every variant is exactly the spelling used in the AST text
/// encoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[derive(AsRefStr, Display, EnumIter, EnumString)]
pub enum NodeKind {
    AddExpr,
    AndExpr,
    Assign,
    BoolDecl,
    Call,
    Code,
    CondBranch,
    EqExpr,
    False,
    ForLoop,
    GreaterExpr,
    Halt,
    Input,
    LessExpr,
    MultExpr,
    NotExpr,
    Number,
    NumDecl,
    OrExpr,
    Output,
    Proc,
    ProcDefs,
    Prog,
    StrDecl,
    String,
    SubExpr,
    True,
    Var,
    WhileLoop,
}

impl NodeKind {
    /// Whether the encoding carries a `(<literal>)` payload for this kind.
    #[must_use]
    pub const fn carries_literal(&self) -> bool {
        matches!(
            self,
            Self::Number | Self::String | Self::Var | Self::Call | Self::Proc
                | Self::StrDecl | Self::NumDecl | Self::BoolDecl
        )
    }

    /// Variable declarations. The control variable of a `ForLoop` is
    /// declared by the loop itself and is not part of this set.
    #[must_use]
    pub const fn is_variable_declaration(&self) -> bool {
        matches!(self, Self::NumDecl | Self::StrDecl | Self::BoolDecl)
    }

    #[must_use]
    pub const fn is_literal(&self) -> bool {
        matches!(self, Self::Number | Self::String | Self::True | Self::False)
    }

    #[must_use]
    pub const fn is_binary_operator(&self) -> bool {
        matches!(
            self,
            Self::AddExpr | Self::SubExpr | Self::MultExpr
                | Self::EqExpr | Self::LessExpr | Self::GreaterExpr
                | Self::AndExpr | Self::OrExpr
        )
    }

    /// The number of children a well-formed node of this kind has.
    #[must_use]
    pub fn arity(&self) -> RangeInclusive<usize> {
        match self {
            Self::Number | Self::String | Self::True | Self::False
                | Self::Var | Self::Call | Self::Halt
                | Self::NumDecl | Self::StrDecl | Self::BoolDecl => 0..=0,

            Self::Code | Self::ProcDefs => 0..=usize::MAX,

            Self::Prog => 1..=2,
            Self::Proc | Self::Input | Self::Output | Self::NotExpr => 1..=1,
            Self::CondBranch => 2..=3,
            Self::WhileLoop | Self::Assign => 2..=2,
            Self::ForLoop => 4..=4,

            Self::AddExpr | Self::SubExpr | Self::MultExpr
                | Self::EqExpr | Self::LessExpr | Self::GreaterExpr
                | Self::AndExpr | Self::OrExpr => 2..=2,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use rstest::rstest;
    use strum::IntoEnumIterator;

    use super::*;

    #[rstest]
    #[case("Prog", NodeKind::Prog)]
    #[case("ForLoop", NodeKind::ForLoop)]
    #[case("String", NodeKind::String)]
    #[case("NumDecl", NodeKind::NumDecl)]
    fn parses_exact_spelling(#[case] input: &str, #[case] expected: NodeKind) {
        assert_eq!(NodeKind::from_str(input).ok(), Some(expected));
    }

    #[rstest]
    #[case("prog")]
    #[case("Loop")]
    #[case("")]
    fn rejects_unknown_spelling(#[case] input: &str) {
        assert!(NodeKind::from_str(input).is_err());
    }

    #[test]
    fn display_round_trips_every_kind() {
        for kind in NodeKind::iter() {
            assert_eq!(NodeKind::from_str(&kind.to_string()).ok(), Some(kind));
        }
    }

    #[test]
    fn literal_kinds_other_than_procedures_are_leaves() {
        for kind in NodeKind::iter().filter(|kind| kind.carries_literal() && *kind != NodeKind::Proc) {
            assert_eq!(kind.arity(), 0..=0, "{kind} carries a literal but may have children");
        }
    }
}

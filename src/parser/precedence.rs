//! Operator precedence and associativity
//!
//! The grammar shares tokens between its logic and term sublanguages (`:`
//! alone is a type annotation, half of the quantifier separator `::` and the
//! slice separator). Instead of per-rule grouping, every binding decision is
//! read from one declarative table, ordered from loosest to tightest.
//!
//! A prefix form takes the precedence of its operator token and a quantifier
//! takes the precedence of its last terminal (`:`), so a quantifier body
//! absorbs none of the binary logic operators.

use crate::parser::lexer::TokenKind;
use rustc_hash::FxHashMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Assoc {
    Left,
    Right,
    NonAssoc,
}

/// Binding strength of one token. Higher levels bind tighter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Precedence {
    pub level: u8,
    pub assoc: Assoc,
}

impl Precedence {
    /// Lowest level an operator to the right may have and still be absorbed
    /// into this operator's right operand.
    pub fn rhs_floor(self) -> u8 {
        match self.assoc {
            Assoc::Right => self.level,
            Assoc::Left | Assoc::NonAssoc => self.level + 1,
        }
    }
}

/// Precedence declarations, loosest first.
pub const PRECEDENCE: &[(Assoc, &[TokenKind])] = &[
    (Assoc::Left, &[TokenKind::Semi]),
    (Assoc::NonAssoc, &[TokenKind::Struct]),
    (Assoc::NonAssoc, &[TokenKind::Else]),
    (Assoc::NonAssoc, &[TokenKind::In]),
    (Assoc::NonAssoc, &[TokenKind::Iff]),
    (Assoc::Right, &[TokenKind::Arrow]),
    (Assoc::Left, &[TokenKind::And, TokenKind::Or]),
    (Assoc::Left, &[TokenKind::Not]),
    (Assoc::Left, &[TokenKind::Eq, TokenKind::Ne]),
    (
        Assoc::Left,
        &[TokenKind::Le, TokenKind::Lt, TokenKind::Ge, TokenKind::Gt],
    ),
    (Assoc::Left, &[TokenKind::Colon]),
    (Assoc::Left, &[TokenKind::Plus, TokenKind::Minus]),
    (Assoc::Left, &[TokenKind::ShiftLeft, TokenKind::ShiftRight]),
    (Assoc::Left, &[TokenKind::BitNot]),
    (Assoc::Left, &[TokenKind::BitOr, TokenKind::BitAnd]),
    (
        Assoc::Left,
        &[TokenKind::Times, TokenKind::Div, TokenKind::Mod],
    ),
    (Assoc::Left, &[TokenKind::Dot]),
];

/// Lookup table built once from [`PRECEDENCE`].
#[derive(Debug, Clone)]
pub struct PrecedenceTable {
    levels: FxHashMap<TokenKind, Precedence>,
}

impl Default for PrecedenceTable {
    fn default() -> Self {
        Self::new()
    }
}

impl PrecedenceTable {
    pub fn new() -> Self {
        let mut levels = FxHashMap::default();
        for (index, &(assoc, kinds)) in PRECEDENCE.iter().enumerate() {
            let precedence = Precedence {
                level: index as u8 + 1,
                assoc,
            };
            for &kind in kinds {
                levels.insert(kind, precedence);
            }
        }
        Self { levels }
    }

    /// Declared precedence of `kind`, if it has one.
    pub fn get(&self, kind: TokenKind) -> Option<Precedence> {
        self.levels.get(&kind).copied()
    }

    /// Floor for the operand of a rule whose precedence comes from `kind`
    /// (a prefix operator or a quantifier's trailing `:`).
    pub fn rule_floor(&self, kind: TokenKind) -> u8 {
        self.get(kind).map_or(0, Precedence::rhs_floor)
    }
}

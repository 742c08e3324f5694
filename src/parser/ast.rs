// AST (Abstract Syntax Tree) definitions for specification programs

use std::fmt;

/// Integer literal, kept as its decimal digits (no sign, unbounded width).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Number(String);

impl Number {
    pub fn new(digits: impl Into<String>) -> Self {
        Number(digits.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Value as `u64`, or `None` if it does not fit.
    pub fn to_u64(&self) -> Option<u64> {
        self.0.parse().ok()
    }

    /// Value as `u128`, or `None` if it does not fit.
    pub fn to_u128(&self) -> Option<u128> {
        self.0.parse().ok()
    }
}

impl fmt::Display for Number {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Typed entry of a parameter or return list: `name: type`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SymbolDecl {
    pub name: String,
    /// Type rendered as a string: `int`, `struct foo`, `relation r`, `int*`, ...
    pub ty: String,
}

impl SymbolDecl {
    pub fn new(name: impl Into<String>, ty: impl Into<String>) -> Self {
        SymbolDecl {
            name: name.into(),
            ty: ty.into(),
        }
    }
}

/// Binary operators of the logic sublanguage
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogicOp {
    And,
    Or,
    Eq,
    Ne,
    Iff,     // <->
    Implies, // ->
    Lt,
    Gt,
    Le,
    Ge,
}

impl LogicOp {
    pub fn symbol(self) -> &'static str {
        match self {
            LogicOp::And => "&&",
            LogicOp::Or => "||",
            LogicOp::Eq => "==",
            LogicOp::Ne => "!=",
            LogicOp::Iff => "<->",
            LogicOp::Implies => "->",
            LogicOp::Lt => "<",
            LogicOp::Gt => ">",
            LogicOp::Le => "<=",
            LogicOp::Ge => ">=",
        }
    }
}

impl fmt::Display for LogicOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

/// Unary operator of the logic sublanguage
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogicUnaryOp {
    Not,
}

/// Arithmetic and bitwise operators of parenthesized term groups
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    BitOr,
    BitAnd,
    ShiftLeft,  // written `>>`
    ShiftRight, // written `<<`
}

impl BinaryOp {
    pub fn symbol(self) -> &'static str {
        match self {
            BinaryOp::Add => "+",
            BinaryOp::Sub => "-",
            BinaryOp::Mul => "*",
            BinaryOp::Div => "/",
            BinaryOp::Mod => "%",
            BinaryOp::BitOr => "|",
            BinaryOp::BitAnd => "&",
            BinaryOp::ShiftLeft => ">>",
            BinaryOp::ShiftRight => "<<",
        }
    }
}

impl fmt::Display for BinaryOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

/// Unary term operators
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    Neg,    // -x
    BitNot, // ~x
}

/// Action, function and relation-definition body with an optional fuzz gate
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionDecl {
    pub name: String,
    pub params: Vec<SymbolDecl>,
    pub returns: Vec<SymbolDecl>,
    pub body: Vec<Expr>,
    /// `fuzz { P }`: inputs generated for fuzzing must satisfy `P`.
    pub fuzz: Option<Expr>,
}

/// Top-level declarations
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Stmt {
    /// `type Name`
    Type { name: String },
    /// `extern fun f(params) returns (returns);`
    ExternFunction {
        name: String,
        params: Vec<SymbolDecl>,
        returns: Vec<SymbolDecl>,
    },
    /// `action` and `fun` definitions
    Action(ActionDecl),
    /// `constant NAME : type := 42`
    Constant {
        name: String,
        type_name: String,
        value: Number,
    },
    /// `relation R(params) returns (returns)`
    Relation {
        name: String,
        params: Vec<SymbolDecl>,
        returns: Vec<SymbolDecl>,
    },
    /// `after init { ... }`
    Init { body: Vec<Expr> },
}

/// Statements, logic expressions and terms.
///
/// Bodies hold statement-level variants; logic positions accept any term
/// (a term is truthy), so the three layers share one node type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Expr {
    // Statements
    Require(Box<Expr>),
    /// `[error] requires P`: only checked on the error path.
    ErrorRequire(Box<Expr>),
    /// `requires !error`
    RequireNoErr,
    Return(Option<Box<Expr>>),
    Atomic {
        guard: Box<Expr>,
        body: Vec<Expr>,
    },
    Await(Box<Expr>),
    IfThenElse {
        condition: Box<Expr>,
        then_body: Vec<Expr>,
        else_body: Option<Vec<Expr>>,
    },
    Let {
        name: String,
        ty: Option<String>,
        init: Box<Expr>,
        body: Vec<Expr>,
        /// `let x : T (n) in { ... }` pins a concrete size `n` instead of an initializer.
        explicit_size: bool,
    },
    /// `call f(args)`
    InlineCall {
        name: String,
        args: Vec<Expr>,
    },
    /// `extern call f(args)`
    ExternCall {
        name: String,
        args: Vec<Expr>,
    },
    Assign {
        lhs: Box<Expr>,
        rhs: Box<Expr>,
    },
    Delete(Box<Expr>),
    Insert(Box<Expr>),

    // Logic
    Exists {
        var: String,
        domain: Box<Expr>,
        body: Box<Expr>,
    },
    ForAll {
        var: String,
        domain: Box<Expr>,
        body: Box<Expr>,
    },
    UnaryLogic {
        op: LogicUnaryOp,
        operand: Box<Expr>,
    },
    BinaryLogic {
        op: LogicOp,
        lhs: Box<Expr>,
        rhs: Box<Expr>,
    },

    // Terms
    Binary {
        op: BinaryOp,
        lhs: Box<Expr>,
        rhs: Box<Expr>,
    },
    Unary {
        op: UnaryOp,
        operand: Box<Expr>,
    },
    /// `base[low:high]`
    Range {
        base: Box<Expr>,
        low: Box<Expr>,
        high: Box<Expr>,
    },
    /// `base[index]`
    Dereference {
        base: Box<Expr>,
        index: Box<Expr>,
    },
    Sizeof(Box<Expr>),
    BaseAddr(Box<Expr>),
    Number(Number),
    /// `object.member`
    Member {
        object: Box<Expr>,
        member: Box<Expr>,
    },
    /// `base(args)`: relation membership or function application
    Arity {
        base: Box<Expr>,
        args: Vec<Expr>,
    },
    /// Identifier or quoted string
    Identifier(String),
    /// `*` argument: matches any value
    Wildcard,
}

impl Expr {
    pub fn ident(name: impl Into<String>) -> Self {
        Expr::Identifier(name.into())
    }

    pub fn number(digits: impl Into<String>) -> Self {
        Expr::Number(Number::new(digits))
    }

    /// Returns `true` for the two call forms, which may stand alone as statements.
    pub fn is_call(&self) -> bool {
        matches!(self, Expr::InlineCall { .. } | Expr::ExternCall { .. })
    }
}

/// Top-level program structure
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Program {
    pub statements: Vec<Stmt>, // Declarations in source order
}

impl Program {
    pub fn new() -> Self {
        Program::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_operator_symbols() {
        assert_eq!(LogicOp::Implies.to_string(), "->");
        assert_eq!(LogicOp::Iff.symbol(), "<->");
        assert_eq!(LogicOp::Le.to_string(), "<=");
        // Shift names follow their token, not their text.
        assert_eq!(BinaryOp::ShiftLeft.to_string(), ">>");
        assert_eq!(BinaryOp::ShiftRight.symbol(), "<<");
        assert_eq!(BinaryOp::Mod.to_string(), "%");
    }

    #[test]
    fn test_number_keeps_digits() {
        let number = Number::new("007");

        assert_eq!(number.as_str(), "007");
        assert_eq!(number.to_string(), "007");
        assert_eq!(number.to_u64(), Some(7));
    }
}

//! # Introduction
//!
//! Soteria reads interface specifications for enclave boundaries and turns
//! them into a typed syntax tree.  A specification declares the types,
//! relations and external functions of an interface, then describes each
//! action with preconditions, state updates and return values.
//!
//! ## Pipeline
//!
//! ```text
//! Source → Lexer → Tokens → Parser → Program
//! ```
//!
//! 1. [`parser::lexer`] — splits the source into [`Token`]s, skipping
//!    whitespace and `#` comments.
//! 2. [`parser::parse`] — builds a [`Program`] (or a single statement
//!    [`Expr`]) using the operator table in [`parser::precedence`].
//! 3. [`parser::ast`] — the node types handed to later tools.
//!
//! A [`Grammar`] holds the reserved-word and precedence tables.  Build it once
//! and reuse it; every call to [`Grammar::parse_program`] is independent.
//!
//! ```
//! let program = soteria::parse_program("type fd relation open (f: fd) returns ()").unwrap();
//! assert_eq!(program.statements.len(), 2);
//! ```

pub mod parser;

pub use parser::ast::{
    ActionDecl, BinaryOp, Expr, LogicOp, LogicUnaryOp, Number, Program, Stmt, SymbolDecl, UnaryOp,
};
pub use parser::lexer::{LexError, Lexer, Token, TokenKind};
pub use parser::{Grammar, ParseError, Parser, SyntaxError, MAX_NESTING};

/// Parse a whole specification with a freshly built [`Grammar`].
pub fn parse_program(source: &str) -> Result<Program, ParseError> {
    Grammar::new().parse_program(source)
}

/// Parse a single statement with a freshly built [`Grammar`].
pub fn parse_expr(source: &str) -> Result<Expr, ParseError> {
    Grammar::new().parse_expr(source)
}

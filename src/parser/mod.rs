//! Specification source parser
//!
//! This module transforms specification text into an Abstract Syntax Tree (AST):
//! - [`lexer`]: Tokenization (source text → tokens)
//! - [`parse`]: Parsing (tokens → AST), split across `impl Parser` blocks
//! - [`precedence`]: Binding strength and associativity of operators
//! - [`ast`]: AST node definitions
//!
//! # Language
//!
//! A program is a sequence of declarations:
//! - `type`, `relation`, `constant` and `extern fun` signatures
//! - `action` and `fun` definitions with statement bodies
//! - one or more `after init { ... }` blocks
//!
//! Statements cover preconditions, returns, `let`, `if`, `atomic`, `await`,
//! calls, assignments and relation updates. Conditions are written in a logic
//! sublanguage with quantifiers; values are terms with member access,
//! indexing, slicing and parenthesized arithmetic.
//!
//! # Parser Implementation
//!
//! Hand-written recursive descent parser with precedence climbing for binary operators.
//! No external parser generator dependencies.

pub mod ast;
mod declarations;
mod expressions;
pub mod lexer;
pub mod parse;
pub mod precedence;
mod statements;

pub use parse::{Grammar, ParseError, Parser, SyntaxError, MAX_NESTING};

//! Statement parsing implementation
//!
//! This module handles the statement-level forms that make up action,
//! function and init bodies:
//!
//! - Preconditions: `requires P`, `[error] requires P`, `requires !error`
//! - `return` with or without a value
//! - Concurrency blocks: `atomic (guard) { ... }`, `await stmt`
//! - `if P then { ... } [else { ... }]`
//! - `let` bindings (plain, typed, explicit size)
//! - Calls, assignments, relation `insert`/`delete`
//!
//! # Grammar
//!
//! ```text
//! exprlist ::= (expr ";")*
//! expr     ::= "(" logicexpr ")"
//!            | "requires" logicexpr | "[" "error" "]" "requires" logicexpr
//!            | "requires" "!" "error"
//!            | "return" [exprterm]
//!            | "atomic" "(" exprterm ")" "{" exprlist "}"
//!            | "await" expr
//!            | "if" logicexpr "then" "{" exprlist "}" ["else" "{" exprlist "}"]
//!            | "let" ID ":=" exprterm "in" "{" exprlist "}"
//!            | "let" ID ":" type ":=" exprterm "in" "{" exprlist "}"
//!            | "let" ID ":" type "(" exprterm ")" "in" "{" exprlist "}"
//!            | "call" ID arity | "extern" "call" ID arity
//!            | exprterm ":=" exprterm
//!            | "delete" exprterm | "insert" exprterm
//! ```
//!
//! All parsing methods are implemented as `pub(crate)` methods on the [`Parser`] struct.

use crate::parser::ast::*;
use crate::parser::expressions::Operand;
use crate::parser::lexer::TokenKind;
use crate::parser::parse::{Parser, ParseResult};

impl Parser<'_> {
    /// Parse `{ (expr ;)* }`
    pub(crate) fn parse_block(&mut self, opening: &'static str) -> ParseResult<Vec<Expr>> {
        self.expect(TokenKind::LBrace, opening)?;

        let mut statements = Vec::new();
        while !self.check(TokenKind::RBrace) {
            statements.push(self.parse_statement()?);
            self.expect(TokenKind::Semi, "';' after statement")?;
        }

        self.expect(TokenKind::RBrace, "'}' to close the block")?;
        Ok(statements)
    }

    /// Parse one statement (without its trailing `;`)
    pub(crate) fn parse_statement(&mut self) -> ParseResult<Expr> {
        self.nested(|parser| parser.parse_statement_form())
    }

    fn parse_statement_form(&mut self) -> ParseResult<Expr> {
        match self.peek_kind() {
            Some(TokenKind::Requires) => self.parse_requires(),
            Some(TokenKind::LBracket) => {
                self.advance();
                self.expect(TokenKind::Error, "'error' in '[error] requires'")?;
                self.expect(TokenKind::RBracket, "']' after '[error'")?;
                self.expect(TokenKind::Requires, "'requires' after '[error]'")?;
                let condition = self.parse_logic()?;
                Ok(Expr::ErrorRequire(Box::new(condition)))
            }
            Some(TokenKind::Return) => {
                self.advance();
                let value = match self.peek_kind() {
                    Some(kind) if kind.starts_term() => Some(Box::new(self.parse_term(0)?)),
                    _ => None,
                };
                Ok(Expr::Return(value))
            }
            Some(TokenKind::Atomic) => self.parse_atomic(),
            Some(TokenKind::Await) => {
                self.advance();
                let inner = self.parse_statement()?;
                Ok(Expr::Await(Box::new(inner)))
            }
            Some(TokenKind::If) => self.parse_if(),
            Some(TokenKind::Let) => self.parse_let(),
            Some(TokenKind::Delete) => {
                self.advance();
                Ok(Expr::Delete(Box::new(self.parse_term(0)?)))
            }
            Some(TokenKind::Insert) => {
                self.advance();
                Ok(Expr::Insert(Box::new(self.parse_term(0)?)))
            }
            Some(TokenKind::LParen) => match self.parse_paren_group()? {
                Operand::Logic(expr) => Ok(expr),
                Operand::Term(term) => self.finish_term_statement(term),
            },
            Some(kind) if kind.starts_term() => {
                let term = self.parse_term(0)?;
                self.finish_term_statement(term)
            }
            _ => Err(self.unexpected("a statement")),
        }
    }

    /// `requires P` or `requires !error`
    fn parse_requires(&mut self) -> ParseResult<Expr> {
        self.expect(TokenKind::Requires, "'requires'")?;

        if self.check(TokenKind::Not) && self.peek_kind_ahead(1) == Some(TokenKind::Error) {
            self.advance();
            self.advance();
            return Ok(Expr::RequireNoErr);
        }

        let condition = self.parse_logic()?;
        Ok(Expr::Require(Box::new(condition)))
    }

    /// `atomic (guard) { ... }`
    fn parse_atomic(&mut self) -> ParseResult<Expr> {
        self.expect(TokenKind::Atomic, "'atomic'")?;
        self.expect(TokenKind::LParen, "'(' after 'atomic'")?;
        let guard = self.parse_term(0)?;
        self.expect(TokenKind::RParen, "')' after atomic guard")?;
        let body = self.parse_block("'{' to open the atomic body")?;

        Ok(Expr::Atomic {
            guard: Box::new(guard),
            body,
        })
    }

    /// `if P then { ... } [else { ... }]`
    fn parse_if(&mut self) -> ParseResult<Expr> {
        self.expect(TokenKind::If, "'if'")?;
        let condition = self.parse_logic()?;
        self.expect(TokenKind::Then, "'then' after if condition")?;
        let then_body = self.parse_block("'{' after 'then'")?;

        let else_body = if self.match_token(TokenKind::Else) {
            Some(self.parse_block("'{' after 'else'")?)
        } else {
            None
        };

        Ok(Expr::IfThenElse {
            condition: Box::new(condition),
            then_body,
            else_body,
        })
    }

    /// The three `let` forms
    fn parse_let(&mut self) -> ParseResult<Expr> {
        self.expect(TokenKind::Let, "'let'")?;
        let name = self.expect_identifier("a name after 'let'")?;

        let (ty, init, explicit_size) = if self.match_token(TokenKind::Assign) {
            (None, self.parse_term(0)?, false)
        } else {
            self.expect(TokenKind::Colon, "':' or ':=' after let name")?;
            let ty = self.parse_type()?;

            if self.match_token(TokenKind::Assign) {
                (Some(ty), self.parse_term(0)?, false)
            } else if self.match_token(TokenKind::LParen) {
                let size = self.parse_term(0)?;
                self.expect(TokenKind::RParen, "')' after explicit size")?;
                (Some(ty), size, true)
            } else {
                return Err(self.unexpected("':=' or '(' after let type"));
            }
        };

        self.expect(TokenKind::In, "'in' after let initializer")?;
        let body = self.parse_block("'{' to open the let body")?;

        Ok(Expr::Let {
            name,
            ty,
            init: Box::new(init),
            body,
            explicit_size,
        })
    }

    /// A statement that began with a term: an assignment, or a bare call.
    fn finish_term_statement(&mut self, term: Expr) -> ParseResult<Expr> {
        if self.match_token(TokenKind::Assign) {
            let rhs = self.parse_term(0)?;
            return Ok(Expr::Assign {
                lhs: Box::new(term),
                rhs: Box::new(rhs),
            });
        }

        if term.is_call() {
            return Ok(term);
        }

        Err(self.unexpected("':=' after assignment target"))
    }
}

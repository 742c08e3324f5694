//! Main parser coordinator
//!
//! This module provides the [`Grammar`] and [`Parser`] structs and the core
//! parsing infrastructure: error types, token helpers and the two entry
//! points (whole program, single statement).
//!
//! # Parser Architecture
//!
//! The parser is recursive descent with precedence climbing:
//! - This module: Grammar/Parser structs, helper methods, and coordination
//! - `declarations`: top-level declarations, signatures and types
//! - `statements`: statement-level forms inside `{ ... }` bodies
//! - `expressions`: logic expressions and terms, driven by the precedence table
//!
//! # Implementation
//!
//! Parser methods are split across multiple files using `impl Parser` blocks,
//! allowing each module to extend the Parser with related functionality while
//! maintaining access to the shared parser state.
//!
//! Tokens are pulled from the lexer on demand through a two-token lookahead
//! window. A lexical error is reported only once the parser reaches the
//! offending position, so errors come out in source order.
//!
//! Nesting (groups, prefix operators, quantifiers, nested bodies) is limited
//! to [`MAX_NESTING`] levels; deeper input fails with
//! [`SyntaxError::NestingTooDeep`].
//!
//! [`Grammar`] owns the tables that are built once (reserved words and
//! precedence). It is immutable after construction, so one instance can serve
//! any number of parses, including from several threads. A [`Parser`] holds the
//! state of one parse and must not be shared.

use std::collections::VecDeque;

use crate::parser::ast::*;
use crate::parser::lexer::{LexError, Lexer, Token, TokenKind, TokenStream};
use crate::parser::precedence::PrecedenceTable;
use thiserror::Error;
use tracing::debug;

/// Deepest accepted nesting of groups, prefix operators and bodies.
pub const MAX_NESTING: usize = 128;

/// Tokens held ahead of the cursor, current token included.
const LOOKAHEAD: usize = 2;

/// The token stream matched no grammar rule.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SyntaxError {
    #[error("syntax error detected for line {line} value {value} (expected {expected})")]
    UnexpectedToken {
        line: usize,
        kind: TokenKind,
        value: String,
        expected: &'static str,
    },
    #[error("syntax error detected: unexpected end of input at line {line} (expected {expected})")]
    UnexpectedEof { line: usize, expected: &'static str },
    #[error("syntax error detected for line {line}: nesting deeper than {limit} levels")]
    NestingTooDeep { line: usize, limit: usize },
}

impl SyntaxError {
    pub fn line(&self) -> usize {
        match self {
            SyntaxError::UnexpectedToken { line, .. }
            | SyntaxError::UnexpectedEof { line, .. }
            | SyntaxError::NestingTooDeep { line, .. } => *line,
        }
    }
}

/// Any failure of a parse call. Both kinds are terminal.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error(transparent)]
    Lex(#[from] LexError),
    #[error(transparent)]
    Syntax(#[from] SyntaxError),
}

impl ParseError {
    pub fn line(&self) -> usize {
        match self {
            ParseError::Lex(err) => err.line,
            ParseError::Syntax(err) => err.line(),
        }
    }
}

pub(crate) type ParseResult<T> = Result<T, ParseError>;

/// Reserved-word and precedence tables, built once and shared by every parse.
#[derive(Debug, Clone, Default)]
pub struct Grammar {
    lexer: Lexer,
    precedence: PrecedenceTable,
}

impl Grammar {
    pub fn new() -> Self {
        Self {
            lexer: Lexer::new(),
            precedence: PrecedenceTable::new(),
        }
    }

    /// Parser that lexes `source` as it goes.
    pub fn parser(&self, source: &str) -> Parser<'_> {
        Parser::new(&self.precedence, TokenSource::Lexer(self.lexer.tokens(source)))
    }

    /// Parser over tokens produced elsewhere. End-of-input errors report the
    /// line of the last token.
    pub fn token_parser(&self, tokens: Vec<Token>) -> Parser<'_> {
        Parser::new(&self.precedence, TokenSource::Tokens(tokens.into_iter()))
    }

    /// Parse a whole specification.
    pub fn parse_program(&self, source: &str) -> Result<Program, ParseError> {
        self.parser(source).parse_program()
    }

    /// Parse exactly one statement-level expression (no trailing `;`).
    pub fn parse_expr(&self, source: &str) -> Result<Expr, ParseError> {
        self.parser(source).parse_single_expr()
    }
}

enum TokenSource<'g> {
    Lexer(TokenStream<'g>),
    Tokens(std::vec::IntoIter<Token>),
}

impl Iterator for TokenSource<'_> {
    type Item = Result<Token, LexError>;

    fn next(&mut self) -> Option<Self::Item> {
        match self {
            TokenSource::Lexer(stream) => stream.next(),
            TokenSource::Tokens(tokens) => tokens.next().map(Ok),
        }
    }
}

/// Recursive descent parser over one token source
pub struct Parser<'g> {
    pub(crate) precedence: &'g PrecedenceTable,
    source: TokenSource<'g>,
    lookahead: VecDeque<Token>,
    /// Lexical error waiting behind the buffered tokens.
    lex_error: Option<LexError>,
    exhausted: bool,
    /// Line reported for end-of-input errors.
    end_line: usize,
    consumed: usize,
    depth: usize,
}

impl<'g> Parser<'g> {
    fn new(precedence: &'g PrecedenceTable, source: TokenSource<'g>) -> Self {
        let mut parser = Parser {
            precedence,
            source,
            lookahead: VecDeque::with_capacity(LOOKAHEAD),
            lex_error: None,
            exhausted: false,
            end_line: 1,
            consumed: 0,
            depth: 0,
        };
        parser.fill();
        parser
    }
}

impl Parser<'_> {
    /// Parse the entire program (top-level declarations)
    pub fn parse_program(&mut self) -> Result<Program, ParseError> {
        let mut program = Program::new();

        while !self.is_at_end() {
            let decl = self.parse_declaration().inspect_err(|err| {
                debug!(error = %err, tokens = self.consumed, "parse failed");
            })?;
            program.statements.push(decl);
        }

        debug!(
            statements = program.statements.len(),
            tokens = self.consumed,
            lines = self.end_line,
            "parsed program"
        );
        Ok(program)
    }

    /// Parse a single statement that must span the whole input
    pub fn parse_single_expr(&mut self) -> Result<Expr, ParseError> {
        let expr = self.parse_statement()?;

        if !self.is_at_end() {
            return Err(self.unexpected("end of input"));
        }

        Ok(expr)
    }

    // ===== Token source =====

    fn fill(&mut self) {
        while self.lookahead.len() < LOOKAHEAD && !self.exhausted {
            match self.source.next() {
                Some(Ok(token)) => {
                    self.end_line = token.line;
                    self.lookahead.push_back(token);
                }
                Some(Err(err)) => {
                    self.lex_error = Some(err);
                    self.exhausted = true;
                }
                None => {
                    if let TokenSource::Lexer(stream) = &self.source {
                        self.end_line = stream.line();
                    }
                    self.exhausted = true;
                }
            }
        }
    }

    // ===== Helper methods =====

    pub(crate) fn peek(&self) -> Option<&Token> {
        self.lookahead.front()
    }

    pub(crate) fn peek_kind(&self) -> Option<TokenKind> {
        self.peek().map(|token| token.kind)
    }

    /// Kind of the token `n` places after the current one (`n < 2`).
    pub(crate) fn peek_kind_ahead(&self, n: usize) -> Option<TokenKind> {
        self.lookahead.get(n).map(|token| token.kind)
    }

    pub(crate) fn check(&self, kind: TokenKind) -> bool {
        self.peek_kind() == Some(kind)
    }

    pub(crate) fn match_token(&mut self, kind: TokenKind) -> bool {
        if self.check(kind) {
            self.advance();
            true
        } else {
            false
        }
    }

    /// Consume the current token. Callers check `peek_kind` first.
    pub(crate) fn advance(&mut self) -> Option<Token> {
        let token = self.lookahead.pop_front()?;
        self.consumed += 1;
        self.fill();
        Some(token)
    }

    /// `true` once every token is consumed and the source ended cleanly.
    pub(crate) fn is_at_end(&self) -> bool {
        self.lookahead.is_empty() && self.lex_error.is_none()
    }

    pub(crate) fn expect(&mut self, kind: TokenKind, expected: &'static str) -> ParseResult<Token> {
        if self.check(kind) {
            if let Some(token) = self.advance() {
                return Ok(token);
            }
        }
        Err(self.unexpected(expected))
    }

    pub(crate) fn expect_identifier(&mut self, expected: &'static str) -> ParseResult<String> {
        self.expect(TokenKind::Id, expected).map(|token| token.text)
    }

    /// Error for the current position: the offending token, a lexical error
    /// reached at this point, or end of input.
    pub(crate) fn unexpected(&self, expected: &'static str) -> ParseError {
        match (self.peek(), &self.lex_error) {
            (Some(token), _) => SyntaxError::UnexpectedToken {
                line: token.line,
                kind: token.kind,
                value: token.text.clone(),
                expected,
            }
            .into(),
            (None, Some(err)) => err.clone().into(),
            (None, None) => SyntaxError::UnexpectedEof {
                line: self.end_line,
                expected,
            }
            .into(),
        }
    }

    /// Run `parse` one nesting level deeper, failing past [`MAX_NESTING`].
    pub(crate) fn nested<T>(
        &mut self,
        parse: impl FnOnce(&mut Self) -> ParseResult<T>,
    ) -> ParseResult<T> {
        if self.depth >= MAX_NESTING {
            let line = self.peek().map_or(self.end_line, |token| token.line);
            return Err(SyntaxError::NestingTooDeep {
                line,
                limit: MAX_NESTING,
            }
            .into());
        }

        self.depth += 1;
        let result = parse(self);
        self.depth -= 1;
        result
    }
}

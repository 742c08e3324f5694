//! Expression parsing implementation
//!
//! This module handles the two expression sublanguages using precedence
//! climbing driven by [`PrecedenceTable`](crate::parser::precedence::PrecedenceTable):
//!
//! - Logic expressions: `&&`, `||`, `==`, `!=`, `<`, `<=`, `>`, `>=`, `->`,
//!   `<->`, prefix `!`, and the quantifiers `forall x in D :: P` and
//!   `exists x in D :: P`
//! - Terms: identifiers, integer literals, parenthesized arithmetic and
//!   bitwise groups, unary `-` and `~`, member access `a.b`, indexing
//!   `a[i]`, slicing `a[lo:hi]`, application `R(x, *)`, `sizeof(t)`,
//!   `baseaddr(t)`, `call f(...)` and `extern call f(...)`
//!
//! Every term is also a valid logic expression. Arithmetic only appears inside
//! parentheses: `(a + b * c)` is a term, `a + b` on its own is not.
//!
//! # Parentheses
//!
//! In logic position `(` is either a logic group `(P)` or an arithmetic group
//! `(t op t ...)`. The group is arithmetic exactly when its first operand is a
//! bare term followed by an arithmetic operator; only arithmetic groups are
//! terms, so `(a).b` is rejected while `(a + 1).b` is accepted.
//!
//! All parsing methods are implemented as `pub(crate)` methods on the [`Parser`] struct.

use crate::parser::ast::*;
use crate::parser::lexer::TokenKind;
use crate::parser::parse::{Parser, ParseResult};
use crate::parser::precedence::{Assoc, Precedence};

/// A parsed logic-position operand, tagged with whether it is still a term.
pub(crate) enum Operand {
    Term(Expr),
    Logic(Expr),
}

impl Operand {
    pub(crate) fn into_expr(self) -> Expr {
        match self {
            Operand::Term(expr) | Operand::Logic(expr) => expr,
        }
    }
}

impl LogicOp {
    fn from_token(kind: TokenKind) -> Option<Self> {
        let op = match kind {
            TokenKind::And => LogicOp::And,
            TokenKind::Or => LogicOp::Or,
            TokenKind::Eq => LogicOp::Eq,
            TokenKind::Ne => LogicOp::Ne,
            TokenKind::Iff => LogicOp::Iff,
            TokenKind::Arrow => LogicOp::Implies,
            TokenKind::Lt => LogicOp::Lt,
            TokenKind::Gt => LogicOp::Gt,
            TokenKind::Le => LogicOp::Le,
            TokenKind::Ge => LogicOp::Ge,
            _ => return None,
        };
        Some(op)
    }
}

impl BinaryOp {
    fn from_token(kind: TokenKind) -> Option<Self> {
        let op = match kind {
            TokenKind::Plus => BinaryOp::Add,
            TokenKind::Minus => BinaryOp::Sub,
            TokenKind::Times => BinaryOp::Mul,
            TokenKind::Div => BinaryOp::Div,
            TokenKind::Mod => BinaryOp::Mod,
            TokenKind::BitOr => BinaryOp::BitOr,
            TokenKind::BitAnd => BinaryOp::BitAnd,
            TokenKind::ShiftLeft => BinaryOp::ShiftLeft,
            TokenKind::ShiftRight => BinaryOp::ShiftRight,
            _ => return None,
        };
        Some(op)
    }
}

impl Parser<'_> {
    /// Parse a logic expression (top-level entry point)
    pub(crate) fn parse_logic(&mut self) -> ParseResult<Expr> {
        Ok(self.parse_logic_bp(0)?.into_expr())
    }

    /// Precedence climbing over binary logic operators at or above `floor`
    fn parse_logic_bp(&mut self, floor: u8) -> ParseResult<Operand> {
        self.nested(|parser| parser.climb_logic(floor))
    }

    fn climb_logic(&mut self, floor: u8) -> ParseResult<Operand> {
        let mut lhs = self.parse_logic_atom()?;

        while let Some((op, prec)) = self.peek_logic_op() {
            if prec.level < floor {
                break;
            }
            self.advance();

            let rhs = self.parse_logic_bp(prec.rhs_floor())?.into_expr();
            lhs = Operand::Logic(Expr::BinaryLogic {
                op,
                lhs: Box::new(lhs.into_expr()),
                rhs: Box::new(rhs),
            });

            // `a <-> b <-> c` has no parse.
            if prec.assoc == Assoc::NonAssoc
                && self.peek_logic_op().is_some_and(|(_, next)| next == prec)
            {
                return Err(self.unexpected("no second non-associative operator"));
            }
        }

        Ok(lhs)
    }

    /// Prefix forms, groups, and plain terms
    fn parse_logic_atom(&mut self) -> ParseResult<Operand> {
        match self.peek_kind() {
            Some(TokenKind::Not) => {
                self.advance();
                let floor = self.precedence.rule_floor(TokenKind::Not);
                let operand = self.parse_logic_bp(floor)?.into_expr();
                Ok(Operand::Logic(Expr::UnaryLogic {
                    op: LogicUnaryOp::Not,
                    operand: Box::new(operand),
                }))
            }
            Some(TokenKind::Forall) | Some(TokenKind::Exists) => {
                self.parse_quantifier().map(Operand::Logic)
            }
            Some(TokenKind::LParen) => self.parse_paren_group(),
            Some(kind) if kind.starts_term() => Ok(Operand::Term(self.parse_term(0)?)),
            _ => Err(self.unexpected("a logic expression")),
        }
    }

    /// `forall x in D :: P` / `exists x in D :: P`
    fn parse_quantifier(&mut self) -> ParseResult<Expr> {
        let is_forall = self.check(TokenKind::Forall);
        self.advance();

        let var = self.expect_identifier("a bound variable after the quantifier")?;
        self.expect(TokenKind::In, "'in' after the bound variable")?;
        let domain = Box::new(self.parse_term(0)?);
        self.expect(TokenKind::Colon, "'::' after the quantifier domain")?;
        self.expect(TokenKind::Colon, "'::' after the quantifier domain")?;

        let floor = self.precedence.rule_floor(TokenKind::Colon);
        let body = Box::new(self.parse_logic_bp(floor)?.into_expr());

        Ok(if is_forall {
            Expr::ForAll { var, domain, body }
        } else {
            Expr::Exists { var, domain, body }
        })
    }

    /// `(` in logic or statement position: a logic group or an arithmetic group
    pub(crate) fn parse_paren_group(&mut self) -> ParseResult<Operand> {
        self.expect(TokenKind::LParen, "'('")?;

        match self.parse_logic_bp(0)? {
            Operand::Term(first) if self.peek_arith_op().is_some() => {
                let group = self.parse_arith_chain(first, 0)?;
                self.expect(TokenKind::RParen, "')' to close the arithmetic group")?;
                Ok(Operand::Term(self.parse_term_postfix(group, 0)?))
            }
            inner => {
                self.expect(TokenKind::RParen, "')' to close the group")?;
                Ok(Operand::Logic(inner.into_expr()))
            }
        }
    }

    /// Parse a term whose `.` chains bind at or above `floor`
    pub(crate) fn parse_term(&mut self, floor: u8) -> ParseResult<Expr> {
        self.nested(|parser| {
            let atom = parser.parse_term_atom()?;
            parser.parse_term_postfix(atom, floor)
        })
    }

    /// Member access, indexing, slicing and application after a term
    fn parse_term_postfix(&mut self, mut term: Expr, floor: u8) -> ParseResult<Expr> {
        loop {
            match self.peek_kind() {
                Some(TokenKind::LBracket) => {
                    term = self.parse_subscript(term)?;
                }
                Some(TokenKind::LParen) => {
                    let args = self.parse_arity()?;
                    term = Expr::Arity {
                        base: Box::new(term),
                        args,
                    };
                }
                Some(TokenKind::Dot) => {
                    let Some(prec) = self.precedence.get(TokenKind::Dot) else {
                        break;
                    };
                    if prec.level < floor {
                        break;
                    }
                    self.advance();

                    let member = self.parse_term(prec.rhs_floor())?;
                    term = Expr::Member {
                        object: Box::new(term),
                        member: Box::new(member),
                    };
                }
                _ => break,
            }
        }

        Ok(term)
    }

    /// Parse primary terms and prefix term operators
    fn parse_term_atom(&mut self) -> ParseResult<Expr> {
        match self.peek_kind() {
            Some(TokenKind::Id) => {
                let name = self.expect_identifier("an identifier")?;
                Ok(Expr::Identifier(name))
            }
            Some(TokenKind::IntLit) => {
                let literal = self.expect(TokenKind::IntLit, "an integer literal")?;
                Ok(Expr::Number(Number::new(literal.text)))
            }
            Some(TokenKind::LParen) => self.parse_arith_group(),
            Some(TokenKind::Minus) | Some(TokenKind::BitNot) => self.parse_unary(),
            Some(TokenKind::Sizeof) | Some(TokenKind::Baseaddr) => {
                let is_sizeof = self.check(TokenKind::Sizeof);
                self.advance();
                self.expect(TokenKind::LParen, "'(' after layout operator")?;
                let inner = Box::new(self.parse_term(0)?);
                self.expect(TokenKind::RParen, "')' after layout operand")?;

                Ok(if is_sizeof {
                    Expr::Sizeof(inner)
                } else {
                    Expr::BaseAddr(inner)
                })
            }
            Some(TokenKind::Call) => {
                self.advance();
                let name = self.expect_identifier("a function name after 'call'")?;
                let args = self.parse_arity()?;
                Ok(Expr::InlineCall { name, args })
            }
            Some(TokenKind::Extern) => {
                self.advance();
                self.expect(TokenKind::Call, "'call' after 'extern'")?;
                let name = self.expect_identifier("a function name after 'extern call'")?;
                let args = self.parse_arity()?;
                Ok(Expr::ExternCall { name, args })
            }
            _ => Err(self.unexpected("a term")),
        }
    }

    /// `-t`, `~t`, and the parenthesized forms `-(t)` and `-(t op t)`
    fn parse_unary(&mut self) -> ParseResult<Expr> {
        let op = if self.check(TokenKind::Minus) {
            UnaryOp::Neg
        } else {
            UnaryOp::BitNot
        };
        let Some(token) = self.advance() else {
            return Err(self.unexpected("'-' or '~'"));
        };
        let floor = self.precedence.rule_floor(token.kind);

        if self.match_token(TokenKind::LParen) {
            let inner = self.parse_term(0)?;

            // `-(t)` negates `t` itself; postfix forms then apply to the result.
            if self.match_token(TokenKind::RParen) {
                return Ok(Expr::Unary {
                    op,
                    operand: Box::new(inner),
                });
            }

            if self.peek_arith_op().is_none() {
                return Err(self.unexpected("')' or an arithmetic operator"));
            }
            let group = self.parse_arith_chain(inner, 0)?;
            self.expect(TokenKind::RParen, "')' to close the arithmetic group")?;
            let operand = self.parse_term_postfix(group, floor)?;

            return Ok(Expr::Unary {
                op,
                operand: Box::new(operand),
            });
        }

        let operand = self.parse_term(floor)?;
        Ok(Expr::Unary {
            op,
            operand: Box::new(operand),
        })
    }

    /// `(t op t ...)` where only a term may follow `(`
    fn parse_arith_group(&mut self) -> ParseResult<Expr> {
        self.expect(TokenKind::LParen, "'('")?;
        let first = self.parse_term(0)?;

        if self.peek_arith_op().is_none() {
            return Err(self.unexpected("an arithmetic operator"));
        }
        let group = self.parse_arith_chain(first, 0)?;

        self.expect(TokenKind::RParen, "')' to close the arithmetic group")?;
        Ok(group)
    }

    /// Precedence climbing over arithmetic and bitwise operators inside a group
    fn parse_arith_chain(&mut self, mut lhs: Expr, floor: u8) -> ParseResult<Expr> {
        while let Some((op, prec)) = self.peek_arith_op() {
            if prec.level < floor {
                break;
            }
            self.advance();

            let first = self.parse_term(0)?;
            let rhs = self.parse_arith_chain(first, prec.rhs_floor())?;
            lhs = Expr::Binary {
                op,
                lhs: Box::new(lhs),
                rhs: Box::new(rhs),
            };
        }

        Ok(lhs)
    }

    /// `base[index]` or `base[low:high]`
    fn parse_subscript(&mut self, base: Expr) -> ParseResult<Expr> {
        self.expect(TokenKind::LBracket, "'['")?;
        let low = self.parse_term(0)?;

        if self.match_token(TokenKind::Colon) {
            let high = self.parse_term(0)?;
            self.expect(TokenKind::RBracket, "']' to close the slice")?;
            return Ok(Expr::Range {
                base: Box::new(base),
                low: Box::new(low),
                high: Box::new(high),
            });
        }

        self.expect(TokenKind::RBracket, "':' or ']' in subscript")?;
        Ok(Expr::Dereference {
            base: Box::new(base),
            index: Box::new(low),
        })
    }

    /// Argument list `(a, *, b.c)`; `*` matches any value.
    ///
    /// A comma directly after `(` is tolerated, as in `(, a)`.
    pub(crate) fn parse_arity(&mut self) -> ParseResult<Vec<Expr>> {
        self.expect(TokenKind::LParen, "'(' to open an argument list")?;

        let mut args = Vec::new();
        if !self.check(TokenKind::RParen) && !self.check(TokenKind::Comma) {
            args.push(self.parse_argument()?);
        }
        while self.match_token(TokenKind::Comma) {
            args.push(self.parse_argument()?);
        }

        self.expect(TokenKind::RParen, "')' to close the argument list")?;
        Ok(args)
    }

    fn parse_argument(&mut self) -> ParseResult<Expr> {
        if self.match_token(TokenKind::Times) {
            return Ok(Expr::Wildcard);
        }
        self.parse_term(0)
    }

    fn peek_logic_op(&self) -> Option<(LogicOp, Precedence)> {
        let kind = self.peek_kind()?;
        Some((LogicOp::from_token(kind)?, self.precedence.get(kind)?))
    }

    fn peek_arith_op(&self) -> Option<(BinaryOp, Precedence)> {
        let kind = self.peek_kind()?;
        Some((BinaryOp::from_token(kind)?, self.precedence.get(kind)?))
    }
}

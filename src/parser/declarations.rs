//! Declaration parsing implementation
//!
//! This module handles parsing of top-level declarations:
//!
//! - Forward type declarations: `type Name`
//! - Extern function signatures: `extern fun f(a: int) returns (r: int);`
//! - Actions and functions: `action A(...) returns (...) [fuzz { P }] := { ... }`
//! - Constants: `constant MAX : int := 10`
//! - Relation signatures: `relation R(x: int) returns (y: int)`
//! - The initialization block: `after init { ... }`
//! - Parameter lists and type strings
//!
//! # Grammar
//!
//! ```text
//! stmt      ::= "after" "init" "{" exprlist "}"
//!             | "type" ID
//!             | "extern" "fun" ID aritydef "returns" aritydef ";"
//!             | "fun" ID aritydef "returns" aritydef define "{" exprlist "}"
//!             | "constant" ID ":" ID ":=" INTLIT
//!             | "relation" ID aritydef "returns" aritydef
//!             | "action" ID aritydef "returns" aritydef ["fuzz" "{" logicexpr "}"]
//!               define "{" exprlist "}"
//! define    ::= ":=" | "="
//! aritydef  ::= "(" [ID ":" type] ("," ID ":" type)* ")"
//! type      ::= basetype ["[" [exprterm] "]"]
//! basetype  ::= ID | "struct" ID | "relation" ID
//! ```
//!
//! All parsing methods are implemented as `pub(crate)` methods on the [`Parser`] struct.

use crate::parser::ast::*;
use crate::parser::lexer::TokenKind;
use crate::parser::parse::{Parser, ParseResult};
use tracing::trace;

/// Name, parameters and returns shared by every signature form.
type Signature = (String, Vec<SymbolDecl>, Vec<SymbolDecl>);

impl Parser<'_> {
    /// Parse one top-level declaration
    pub(crate) fn parse_declaration(&mut self) -> ParseResult<Stmt> {
        let decl = match self.peek_kind() {
            Some(TokenKind::After) => self.parse_init_block()?,
            Some(TokenKind::Type) => {
                self.advance();
                let name = self.expect_identifier("a type name after 'type'")?;
                Stmt::Type { name }
            }
            Some(TokenKind::Extern) => self.parse_extern_function()?,
            Some(TokenKind::Fun) => {
                self.advance();
                let (name, params, returns) = self.parse_signature()?;
                let body = self.parse_definition_body()?;
                Stmt::Action(ActionDecl {
                    name,
                    params,
                    returns,
                    body,
                    fuzz: None,
                })
            }
            Some(TokenKind::Constant) => self.parse_constant()?,
            Some(TokenKind::Relation) => {
                self.advance();
                let (name, params, returns) = self.parse_signature()?;
                Stmt::Relation {
                    name,
                    params,
                    returns,
                }
            }
            Some(TokenKind::Action) => self.parse_action()?,
            _ => return Err(self.unexpected("a declaration")),
        };

        trace!(?decl, "declaration");
        Ok(decl)
    }

    /// Parse `after init { ... }`
    fn parse_init_block(&mut self) -> ParseResult<Stmt> {
        self.expect(TokenKind::After, "'after'")?;
        self.expect(TokenKind::Init, "'init' after 'after'")?;
        let body = self.parse_block("'{' to open the init block")?;
        Ok(Stmt::Init { body })
    }

    /// Parse `extern fun f(params) returns (returns);`
    fn parse_extern_function(&mut self) -> ParseResult<Stmt> {
        self.expect(TokenKind::Extern, "'extern'")?;
        self.expect(TokenKind::Fun, "'fun' after 'extern'")?;
        let (name, params, returns) = self.parse_signature()?;
        self.expect(TokenKind::Semi, "';' after extern function signature")?;

        Ok(Stmt::ExternFunction {
            name,
            params,
            returns,
        })
    }

    /// Parse `constant NAME : type := INTLIT`
    fn parse_constant(&mut self) -> ParseResult<Stmt> {
        self.expect(TokenKind::Constant, "'constant'")?;
        let name = self.expect_identifier("a constant name")?;
        self.expect(TokenKind::Colon, "':' after constant name")?;
        let type_name = self.expect_identifier("a constant type")?;
        self.expect(TokenKind::Assign, "':=' after constant type")?;
        let value = self.expect(TokenKind::IntLit, "an integer constant value")?;

        Ok(Stmt::Constant {
            name,
            type_name,
            value: Number::new(value.text),
        })
    }

    /// Parse an action definition with its optional fuzz predicate
    fn parse_action(&mut self) -> ParseResult<Stmt> {
        self.expect(TokenKind::Action, "'action'")?;
        let (name, params, returns) = self.parse_signature()?;

        let fuzz = if self.match_token(TokenKind::Fuzz) {
            self.expect(TokenKind::LBrace, "'{' after 'fuzz'")?;
            let predicate = self.parse_logic()?;
            self.expect(TokenKind::RBrace, "'}' after fuzz predicate")?;
            Some(predicate)
        } else {
            None
        };

        let body = self.parse_definition_body()?;

        Ok(Stmt::Action(ActionDecl {
            name,
            params,
            returns,
            body,
            fuzz,
        }))
    }

    /// Parse `ID aritydef returns aritydef`
    fn parse_signature(&mut self) -> ParseResult<Signature> {
        let name = self.expect_identifier("a name for the signature")?;
        let params = self.parse_aritydef()?;
        self.expect(TokenKind::Returns, "'returns' after parameter list")?;
        let returns = self.parse_aritydef()?;
        Ok((name, params, returns))
    }

    /// Parse `:= { ... }` (or `= { ... }`) after an action or function signature
    fn parse_definition_body(&mut self) -> ParseResult<Vec<Expr>> {
        if !self.match_token(TokenKind::Assign) && !self.match_token(TokenKind::Define) {
            return Err(self.unexpected("':=' before the definition body"));
        }
        self.parse_block("'{' to open the definition body")
    }

    /// Parse a typed parameter list: `(a: int, b: struct s[])`
    ///
    /// A comma directly after `(` is tolerated, as in `(, a: int)`.
    pub(crate) fn parse_aritydef(&mut self) -> ParseResult<Vec<SymbolDecl>> {
        self.expect(TokenKind::LParen, "'(' to open a parameter list")?;

        let mut entries = Vec::new();
        if !self.check(TokenKind::RParen) && !self.check(TokenKind::Comma) {
            entries.push(self.parse_typed_symbol()?);
        }
        while self.match_token(TokenKind::Comma) {
            entries.push(self.parse_typed_symbol()?);
        }

        self.expect(TokenKind::RParen, "')' to close the parameter list")?;
        Ok(entries)
    }

    fn parse_typed_symbol(&mut self) -> ParseResult<SymbolDecl> {
        let name = self.expect_identifier("a parameter name")?;
        self.expect(TokenKind::Colon, "':' after parameter name")?;
        let ty = self.parse_type()?;
        Ok(SymbolDecl { name, ty })
    }

    /// Parse a type into its string form.
    ///
    /// Array suffixes collapse to `*`; a bound such as `[n]` is parsed and
    /// then dropped, so `int[]` and `int[n]` both yield `int*`.
    pub(crate) fn parse_type(&mut self) -> ParseResult<String> {
        let base = match self.peek_kind() {
            Some(TokenKind::Id) => self.expect_identifier("a type name")?,
            Some(TokenKind::Struct) | Some(TokenKind::Relation) => {
                let keyword = self.advance().map(|token| token.text).unwrap_or_default();
                let name = self.expect_identifier("a type name")?;
                format!("{keyword} {name}")
            }
            _ => return Err(self.unexpected("a type")),
        };

        if self.match_token(TokenKind::LBracket) {
            if !self.check(TokenKind::RBracket) {
                self.parse_term(0)?;
            }
            self.expect(TokenKind::RBracket, "']' to close the array type")?;
            return Ok(format!("{base}*"));
        }

        Ok(base)
    }
}

#[cfg(test)]
mod tests {
    use crate::parser::ast::*;
    use crate::parser::parse::Grammar;

    fn single(source: &str) -> Stmt {
        let mut program = Grammar::new().parse_program(source).unwrap();
        assert_eq!(program.statements.len(), 1);
        program.statements.remove(0)
    }

    #[test]
    fn test_type_strings() {
        let stmt = single(
            "relation R (a: int, b: struct s, c: relation r, d: byte[], e: byte[(n + 1)]) returns ()",
        );

        let Stmt::Relation { params, returns, .. } = stmt else {
            panic!("Expected relation declaration");
        };
        assert!(returns.is_empty());
        assert_eq!(
            params,
            vec![
                SymbolDecl::new("a", "int"),
                SymbolDecl::new("b", "struct s"),
                SymbolDecl::new("c", "relation r"),
                SymbolDecl::new("d", "byte*"),
                SymbolDecl::new("e", "byte*"),
            ]
        );
    }

    #[test]
    fn test_leading_comma_in_parameter_list() {
        let stmt = single("extern fun f(, x: int) returns ();");

        assert_eq!(
            stmt,
            Stmt::ExternFunction {
                name: "f".to_string(),
                params: vec![SymbolDecl::new("x", "int")],
                returns: vec![],
            }
        );
    }

    #[test]
    fn test_fun_definition() {
        let stmt = single("fun f (x: int) returns (r: int) := { return x; }");

        assert_eq!(
            stmt,
            Stmt::Action(ActionDecl {
                name: "f".to_string(),
                params: vec![SymbolDecl::new("x", "int")],
                returns: vec![SymbolDecl::new("r", "int")],
                body: vec![Expr::Return(Some(Box::new(Expr::ident("x"))))],
                fuzz: None,
            })
        );
    }

    #[test]
    fn test_action_with_fuzz_predicate() {
        let stmt = single(
            "action open (fd: int) returns () fuzz { fd >= 0 } := { requires valid(fd); }",
        );

        let Stmt::Action(action) = stmt else {
            panic!("Expected action declaration");
        };
        assert_eq!(
            action.fuzz,
            Some(Expr::BinaryLogic {
                op: LogicOp::Ge,
                lhs: Box::new(Expr::ident("fd")),
                rhs: Box::new(Expr::number("0")),
            })
        );
        assert_eq!(action.body.len(), 1);
    }

    #[test]
    fn test_init_block() {
        let stmt = single("after init { count := 0; insert open(*); }");

        let Stmt::Init { body } = stmt else {
            panic!("Expected init block");
        };
        assert_eq!(body.len(), 2);
        assert_eq!(
            body[1],
            Expr::Insert(Box::new(Expr::Arity {
                base: Box::new(Expr::ident("open")),
                args: vec![Expr::Wildcard],
            }))
        );
    }

    #[test]
    fn test_constant_keeps_wide_literal() {
        let stmt = single("constant BIG : u128 := 340282366920938463463374607431768211455");

        let Stmt::Constant { value, .. } = stmt else {
            panic!("Expected constant declaration");
        };
        assert_eq!(value.to_u64(), None);
        assert_eq!(value.to_u128(), Some(u128::MAX));
    }
}

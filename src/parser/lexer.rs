//! Lexer (tokenizer) for specification source text
//!
//! Converts raw source text into a flat [`Token`] stream consumed by the parser.
//! Whitespace and `#` line comments are dropped; every other character either
//! starts a token or aborts the scan with a [`LexError`].
//!
//! Quoted strings (`"..."`) are deliberately lexed as [`TokenKind::Id`]: the
//! parser and downstream tools treat a quoted value exactly like an identifier.

use rustc_hash::FxHashMap;
use std::fmt;
use thiserror::Error;
use tracing::trace;

/// Every kind of token the lexer can produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    // Punctuation
    Comma,    // ,
    LParen,   // (
    RParen,   // )
    LBrace,   // {
    RBrace,   // }
    LBracket, // [
    RBracket, // ]
    Semi,     // ;
    Dot,      // .
    Colon,    // :
    Assign,   // :=
    Define,   // =

    // Arithmetic
    Plus,  // +
    Minus, // -
    Times, // *
    Div,   // /
    Mod,   // %

    // Bitwise. The shift names do not match their text: `ShiftLeft` is
    // spelled `>>` and `ShiftRight` is spelled `<<`.
    BitAnd,     // &
    BitOr,      // |
    BitNot,     // ~
    ShiftLeft,  // >>
    ShiftRight, // <<

    // Logic and comparison
    And,   // &&
    Or,    // ||
    Not,   // !
    Eq,    // ==
    Ne,    // !=
    Lt,    // <
    Le,    // <=
    Gt,    // >
    Ge,    // >=
    Arrow, // ->
    Iff,   // <->

    // Keywords
    Relation,
    Action,
    Type,
    Requires,
    Return,
    Returns,
    Constant,
    Forall,
    Exists,
    Delete,
    Insert,
    Init,
    After,
    Sizeof,
    Baseaddr,
    Fun,
    Extern,
    Let,
    In,
    Call,
    Error,
    If,
    Then,
    Else,
    Struct,
    Fuzz,
    Atomic,
    Await,

    // Identifiers (and quoted strings) and integer literals
    Id,
    IntLit,
}

/// Reserved words and the token kind each one lexes to.
pub const KEYWORDS: &[(&str, TokenKind)] = &[
    ("relation", TokenKind::Relation),
    ("action", TokenKind::Action),
    ("type", TokenKind::Type),
    ("requires", TokenKind::Requires),
    ("return", TokenKind::Return),
    ("returns", TokenKind::Returns),
    ("constant", TokenKind::Constant),
    ("forall", TokenKind::Forall),
    ("exists", TokenKind::Exists),
    ("delete", TokenKind::Delete),
    ("insert", TokenKind::Insert),
    ("init", TokenKind::Init),
    ("after", TokenKind::After),
    ("sizeof", TokenKind::Sizeof),
    ("baseaddr", TokenKind::Baseaddr),
    ("fun", TokenKind::Fun),
    ("extern", TokenKind::Extern),
    ("let", TokenKind::Let),
    ("in", TokenKind::In),
    ("call", TokenKind::Call),
    ("error", TokenKind::Error),
    ("if", TokenKind::If),
    ("then", TokenKind::Then),
    ("else", TokenKind::Else),
    ("struct", TokenKind::Struct),
    ("fuzz", TokenKind::Fuzz),
    ("atomic", TokenKind::Atomic),
    ("await", TokenKind::Await),
];

impl TokenKind {
    /// Returns `true` for reserved words.
    pub fn is_keyword(self) -> bool {
        KEYWORDS.iter().any(|&(_, kind)| kind == self)
    }

    /// Returns `true` if a term (`exprterm`) can begin with this token.
    pub fn starts_term(self) -> bool {
        matches!(
            self,
            TokenKind::LParen
                | TokenKind::Id
                | TokenKind::IntLit
                | TokenKind::Minus
                | TokenKind::BitNot
                | TokenKind::Sizeof
                | TokenKind::Baseaddr
                | TokenKind::Call
                | TokenKind::Extern
        )
    }

    /// Fixed source text of punctuation and operator tokens.
    pub fn symbol(self) -> Option<&'static str> {
        let text = match self {
            TokenKind::Comma => ",",
            TokenKind::LParen => "(",
            TokenKind::RParen => ")",
            TokenKind::LBrace => "{",
            TokenKind::RBrace => "}",
            TokenKind::LBracket => "[",
            TokenKind::RBracket => "]",
            TokenKind::Semi => ";",
            TokenKind::Dot => ".",
            TokenKind::Colon => ":",
            TokenKind::Assign => ":=",
            TokenKind::Define => "=",
            TokenKind::Plus => "+",
            TokenKind::Minus => "-",
            TokenKind::Times => "*",
            TokenKind::Div => "/",
            TokenKind::Mod => "%",
            TokenKind::BitAnd => "&",
            TokenKind::BitOr => "|",
            TokenKind::BitNot => "~",
            TokenKind::ShiftLeft => ">>",
            TokenKind::ShiftRight => "<<",
            TokenKind::And => "&&",
            TokenKind::Or => "||",
            TokenKind::Not => "!",
            TokenKind::Eq => "==",
            TokenKind::Ne => "!=",
            TokenKind::Lt => "<",
            TokenKind::Le => "<=",
            TokenKind::Gt => ">",
            TokenKind::Ge => ">=",
            TokenKind::Arrow => "->",
            TokenKind::Iff => "<->",
            _ => return None,
        };
        Some(text)
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(symbol) = self.symbol() {
            return write!(f, "'{}'", symbol);
        }
        match self {
            TokenKind::Id => write!(f, "identifier"),
            TokenKind::IntLit => write!(f, "integer literal"),
            keyword => {
                let word = KEYWORDS
                    .iter()
                    .find(|&&(_, kind)| kind == *keyword)
                    .map_or("?", |&(word, _)| word);
                write!(f, "'{}'", word)
            }
        }
    }
}

/// A single lexed token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    /// Exact source text, quotes included for quoted strings.
    pub text: String,
    /// 1-based line the token starts on.
    pub line: usize,
}

impl Token {
    pub fn new(kind: TokenKind, text: impl Into<String>, line: usize) -> Self {
        Self {
            kind,
            text: text.into(),
            line,
        }
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "'{}'", self.text)
    }
}

/// Raised on the first character no token rule accepts.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("illegal character '{character}' at line {line}")]
pub struct LexError {
    pub line: usize,
    pub character: char,
}

/// Tokenizer holding the reserved-word table.
///
/// Build it once and reuse it; each call to [`Lexer::tokens`] starts an
/// independent scan.
#[derive(Debug, Clone)]
pub struct Lexer {
    keywords: FxHashMap<&'static str, TokenKind>,
}

impl Default for Lexer {
    fn default() -> Self {
        Self::new()
    }
}

impl Lexer {
    pub fn new() -> Self {
        Self {
            keywords: KEYWORDS.iter().copied().collect(),
        }
    }

    /// Kind of a reserved word, or `None` for ordinary identifiers.
    pub fn keyword(&self, word: &str) -> Option<TokenKind> {
        self.keywords.get(word).copied()
    }

    /// Lazily scan `source`. Calling this again restarts from the first character.
    pub fn tokens<'l>(&'l self, source: &str) -> TokenStream<'l> {
        TokenStream {
            lexer: self,
            input: source.chars().collect(),
            position: 0,
            line: 1,
            finished: false,
        }
    }

    /// Tokenize the entire input, failing on the first illegal character.
    pub fn tokenize(&self, source: &str) -> Result<Vec<Token>, LexError> {
        self.tokens(source).collect()
    }
}

/// Pull-based token iterator over one source text.
///
/// Yields `Ok(token)` until the input is exhausted, or a single `Err` after
/// which the stream is finished.
pub struct TokenStream<'l> {
    lexer: &'l Lexer,
    input: Vec<char>,
    position: usize,
    line: usize,
    finished: bool,
}

impl TokenStream<'_> {
    /// Current line counter (1-based).
    pub fn line(&self) -> usize {
        self.line
    }

    fn next_token(&mut self) -> Result<Option<Token>, LexError> {
        self.skip_whitespace_and_comments();

        let line = self.line;
        let start = self.position;
        let Some(ch) = self.advance() else {
            return Ok(None);
        };

        let kind = match ch {
            '"' => return self.quoted(start, line).map(Some),
            '0'..='9' => return Ok(Some(self.integer(start, line))),
            'a'..='z' | 'A'..='Z' | '_' => {
                return Ok(Some(self.identifier_or_keyword(start, line)))
            }

            ',' => TokenKind::Comma,
            '(' => TokenKind::LParen,
            ')' => TokenKind::RParen,
            '{' => TokenKind::LBrace,
            '}' => TokenKind::RBrace,
            '[' => TokenKind::LBracket,
            ']' => TokenKind::RBracket,
            ';' => TokenKind::Semi,
            '.' => TokenKind::Dot,
            '+' => TokenKind::Plus,
            '*' => TokenKind::Times,
            '/' => TokenKind::Div,
            '%' => TokenKind::Mod,
            '~' => TokenKind::BitNot,
            ':' => {
                if self.match_char('=') {
                    TokenKind::Assign
                } else {
                    TokenKind::Colon
                }
            }
            '-' => {
                if self.match_char('>') {
                    TokenKind::Arrow
                } else {
                    TokenKind::Minus
                }
            }
            '<' => {
                if self.peek() == Some('-') && self.peek_ahead(1) == Some('>') {
                    self.advance();
                    self.advance();
                    TokenKind::Iff
                } else if self.match_char('=') {
                    TokenKind::Le
                } else if self.match_char('<') {
                    TokenKind::ShiftRight
                } else {
                    TokenKind::Lt
                }
            }
            '>' => {
                if self.match_char('=') {
                    TokenKind::Ge
                } else if self.match_char('>') {
                    TokenKind::ShiftLeft
                } else {
                    TokenKind::Gt
                }
            }
            '=' => {
                if self.match_char('=') {
                    TokenKind::Eq
                } else {
                    TokenKind::Define
                }
            }
            '!' => {
                if self.match_char('=') {
                    TokenKind::Ne
                } else {
                    TokenKind::Not
                }
            }
            '&' => {
                if self.match_char('&') {
                    TokenKind::And
                } else {
                    TokenKind::BitAnd
                }
            }
            '|' => {
                if self.match_char('|') {
                    TokenKind::Or
                } else {
                    TokenKind::BitOr
                }
            }

            _ => {
                return Err(LexError {
                    line,
                    character: ch,
                })
            }
        };

        Ok(Some(self.token(kind, start, line)))
    }

    /// `"..."` up to the nearest closing quote on the same line, no escapes.
    fn quoted(&mut self, start: usize, line: usize) -> Result<Token, LexError> {
        while let Some(ch) = self.peek() {
            if ch == '\n' {
                break;
            }
            self.advance();
            if ch == '"' {
                return Ok(self.token(TokenKind::Id, start, line));
            }
        }

        // No closing quote: the opening quote itself is the offending character.
        Err(LexError {
            line,
            character: '"',
        })
    }

    fn integer(&mut self, start: usize, line: usize) -> Token {
        while self.peek().is_some_and(|ch| ch.is_ascii_digit()) {
            self.advance();
        }
        self.token(TokenKind::IntLit, start, line)
    }

    fn identifier_or_keyword(&mut self, start: usize, line: usize) -> Token {
        while self
            .peek()
            .is_some_and(|ch| ch.is_ascii_alphanumeric() || ch == '_')
        {
            self.advance();
        }

        let text: String = self.input[start..self.position].iter().collect();
        let kind = self.lexer.keyword(&text).unwrap_or(TokenKind::Id);
        Token::new(kind, text, line)
    }

    fn token(&self, kind: TokenKind, start: usize, line: usize) -> Token {
        let text: String = self.input[start..self.position].iter().collect();
        Token::new(kind, text, line)
    }

    fn skip_whitespace_and_comments(&mut self) {
        while let Some(ch) = self.peek() {
            match ch {
                ' ' | '\t' | '\r' => {
                    self.advance();
                }
                '\n' => {
                    self.line += 1;
                    self.advance();
                }
                '#' => {
                    // The newline is left for the line counter.
                    while self.peek().is_some_and(|ch| ch != '\n') {
                        self.advance();
                    }
                }
                _ => break,
            }
        }
    }

    fn match_char(&mut self, expected: char) -> bool {
        if self.peek() == Some(expected) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn peek(&self) -> Option<char> {
        self.input.get(self.position).copied()
    }

    fn peek_ahead(&self, n: usize) -> Option<char> {
        self.input.get(self.position + n).copied()
    }

    fn advance(&mut self) -> Option<char> {
        let ch = self.peek()?;
        self.position += 1;
        Some(ch)
    }
}

impl Iterator for TokenStream<'_> {
    type Item = Result<Token, LexError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }

        match self.next_token() {
            Ok(Some(token)) => {
                trace!(kind = ?token.kind, text = %token.text, line = token.line, "token");
                Some(Ok(token))
            }
            Ok(None) => {
                self.finished = true;
                None
            }
            Err(err) => {
                self.finished = true;
                Some(Err(err))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(source: &str) -> Vec<TokenKind> {
        Lexer::new()
            .tokenize(source)
            .unwrap()
            .into_iter()
            .map(|t| t.kind)
            .collect()
    }

    #[test]
    fn test_simple_tokens() {
        let tokens = Lexer::new().tokenize("type Foo").unwrap();

        assert_eq!(tokens.len(), 2);
        assert_eq!(tokens[0], Token::new(TokenKind::Type, "type", 1));
        assert_eq!(tokens[1], Token::new(TokenKind::Id, "Foo", 1));
    }

    #[test]
    fn test_operators() {
        assert_eq!(
            kinds(":= : <-> <= << < -> - == = != ! && & || |"),
            vec![
                TokenKind::Assign,
                TokenKind::Colon,
                TokenKind::Iff,
                TokenKind::Le,
                TokenKind::ShiftRight,
                TokenKind::Lt,
                TokenKind::Arrow,
                TokenKind::Minus,
                TokenKind::Eq,
                TokenKind::Define,
                TokenKind::Ne,
                TokenKind::Not,
                TokenKind::And,
                TokenKind::BitAnd,
                TokenKind::Or,
                TokenKind::BitOr,
            ]
        );
    }

    #[test]
    fn test_shift_names_follow_text_not_meaning() {
        assert_eq!(
            kinds(">> <<"),
            vec![TokenKind::ShiftLeft, TokenKind::ShiftRight]
        );
    }

    #[test]
    fn test_lt_minus_without_gt_is_two_tokens() {
        assert_eq!(
            kinds("a<-1"),
            vec![
                TokenKind::Id,
                TokenKind::Lt,
                TokenKind::Minus,
                TokenKind::IntLit
            ]
        );
    }

    #[test]
    fn test_comments_and_line_numbers() {
        let source = "type A # a comment := !\n\n\ntype B";
        let tokens = Lexer::new().tokenize(source).unwrap();

        assert_eq!(tokens.len(), 4);
        assert_eq!(tokens[1].line, 1);
        assert_eq!(tokens[2].line, 4);
        assert_eq!(tokens[3].text, "B");
    }

    #[test]
    fn test_quoted_string_is_identifier() {
        let tokens = Lexer::new().tokenize(r#"f("a b", "relation")"#).unwrap();

        assert_eq!(tokens[2], Token::new(TokenKind::Id, "\"a b\"", 1));
        assert_eq!(tokens[4], Token::new(TokenKind::Id, "\"relation\"", 1));
    }

    #[test]
    fn test_quoted_string_is_not_greedy() {
        let tokens = Lexer::new().tokenize(r#""a" x "b""#).unwrap();

        assert_eq!(tokens.len(), 3);
        assert_eq!(tokens[0].text, "\"a\"");
        assert_eq!(tokens[2].text, "\"b\"");
    }

    #[test]
    fn test_unterminated_quote_is_illegal() {
        let err = Lexer::new().tokenize("x \"abc\n\"").unwrap_err();
        assert_eq!(
            err,
            LexError {
                line: 1,
                character: '"'
            }
        );
    }

    #[test]
    fn test_illegal_character() {
        let err = Lexer::new().tokenize("type A\n  @").unwrap_err();
        assert_eq!(
            err,
            LexError {
                line: 2,
                character: '@'
            }
        );
    }

    #[test]
    fn test_stream_stops_after_error() {
        let lexer = Lexer::new();
        let mut stream = lexer.tokens("a $ b");

        assert!(matches!(stream.next(), Some(Ok(_))));
        assert!(matches!(stream.next(), Some(Err(_))));
        assert!(stream.next().is_none());
    }

    #[test]
    fn test_stream_is_restartable() {
        let lexer = Lexer::new();
        let source = "relation R\n(x: int)";

        let mut first = lexer.tokens(source);
        let head = first.next().unwrap().unwrap();
        assert_eq!(head.kind, TokenKind::Relation);

        let second: Vec<_> = lexer.tokens(source).collect::<Result<_, _>>().unwrap();
        assert_eq!(second.len(), 7);
        assert_eq!(second[0], head);
    }

    #[test]
    fn test_line_counter_tracks_newline_runs() {
        let lexer = Lexer::new();
        let mut stream = lexer.tokens("a\n\n\nb\n");

        stream.next();
        stream.next();
        assert_eq!(stream.line(), 4);
        assert!(stream.next().is_none());
        assert_eq!(stream.line(), 5);
    }

    #[test]
    fn test_integer_literal_keeps_text() {
        let tokens = Lexer::new()
            .tokenize("123456789012345678901234567890")
            .unwrap();
        assert_eq!(tokens[0].kind, TokenKind::IntLit);
        assert_eq!(tokens[0].text, "123456789012345678901234567890");
    }
}

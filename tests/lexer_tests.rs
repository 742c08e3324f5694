use proptest::prelude::*;
use soteria::parser::lexer::KEYWORDS;
use soteria::{LexError, Lexer, TokenKind};

const FRAGMENTS: &[&str] = &[
    "relation", "action", "requires", "forall", "in", "::", ":=", "=", ":", "x", "fd_1",
    "_tmp", "42", "0", "\"etc/passwd\"", "(", ")", "{", "}", "[", "]", ",", ";", ".", "+",
    "-", "*", "/", "%", "&", "|", "~", ">>", "<<", "&&", "||", "!", "==", "!=", "<", "<=",
    ">", ">=", "->", "<->",
];

const SEPARATORS: &[&str] = &[" ", "\n", "\t", " # note\n"];

#[test]
fn test_action_header_tokens() {
    let tokens = Lexer::new()
        .tokenize("action open (path: char[], flags: int) returns (fd: int) :=")
        .expect("Tokenizing failed");

    let kinds: Vec<TokenKind> = tokens.iter().map(|t| t.kind).collect();
    assert_eq!(
        kinds,
        vec![
            TokenKind::Action,
            TokenKind::Id,
            TokenKind::LParen,
            TokenKind::Id,
            TokenKind::Colon,
            TokenKind::Id,
            TokenKind::LBracket,
            TokenKind::RBracket,
            TokenKind::Comma,
            TokenKind::Id,
            TokenKind::Colon,
            TokenKind::Id,
            TokenKind::RParen,
            TokenKind::Returns,
            TokenKind::LParen,
            TokenKind::Id,
            TokenKind::Colon,
            TokenKind::Id,
            TokenKind::RParen,
            TokenKind::Assign,
        ]
    );
}

#[test]
fn test_quantifier_separator_is_two_colons() {
    let tokens = Lexer::new()
        .tokenize("forall x in D :: P(x)")
        .expect("Tokenizing failed");

    assert_eq!(tokens[4].kind, TokenKind::Colon);
    assert_eq!(tokens[5].kind, TokenKind::Colon);
}

#[test]
fn test_keyword_prefix_is_identifier() {
    let tokens = Lexer::new()
        .tokenize("returns returned inx in")
        .expect("Tokenizing failed");

    let kinds: Vec<TokenKind> = tokens.iter().map(|t| t.kind).collect();
    assert_eq!(
        kinds,
        vec![TokenKind::Returns, TokenKind::Id, TokenKind::Id, TokenKind::In]
    );
}

#[test]
fn test_line_numbers_skip_comments() {
    let source = "# header comment\ntype fd # trailing\n\n\nrelation open (f: fd) returns ()\n";
    let tokens = Lexer::new().tokenize(source).expect("Tokenizing failed");

    assert_eq!(tokens[0].line, 2);
    assert_eq!(tokens[1].line, 2);
    assert_eq!(tokens[2].text, "relation");
    assert_eq!(tokens[2].line, 5);
}

#[test]
fn test_unterminated_quote_reports_line() {
    let err = Lexer::new()
        .tokenize("type a\nlet s := \"oops\n\"")
        .unwrap_err();

    assert_eq!(
        err,
        LexError {
            line: 2,
            character: '"'
        }
    );
    assert_eq!(err.to_string(), "illegal character '\"' at line 2");
}

#[test]
fn test_keyword_table_is_complete() {
    let lexer = Lexer::new();
    assert_eq!(KEYWORDS.len(), 28);

    for &(word, kind) in KEYWORDS {
        assert!(kind.is_keyword());
        assert_eq!(lexer.keyword(word), Some(kind));
        assert_eq!(kind.to_string(), format!("'{word}'"));
    }
    assert!(!TokenKind::Id.is_keyword());
}

proptest! {
    #[test]
    fn prop_keywords_always_win(index in 0..KEYWORDS.len()) {
        let (word, kind) = KEYWORDS[index];
        let tokens = Lexer::new().tokenize(word).unwrap();

        prop_assert_eq!(tokens.len(), 1);
        prop_assert_eq!(tokens[0].kind, kind);
    }

    #[test]
    fn prop_non_reserved_words_are_identifiers(word in "[a-zA-Z_][a-zA-Z0-9_]{0,12}") {
        prop_assume!(KEYWORDS.iter().all(|&(reserved, _)| reserved != word));
        let tokens = Lexer::new().tokenize(&word).unwrap();

        prop_assert_eq!(tokens.len(), 1);
        prop_assert_eq!(tokens[0].kind, TokenKind::Id);
        prop_assert_eq!(&tokens[0].text, &word);
    }

    #[test]
    fn prop_token_text_is_lossless(
        parts in prop::collection::vec(prop::sample::select(FRAGMENTS), 0..40),
        separators in prop::collection::vec(prop::sample::select(SEPARATORS), 40),
    ) {
        let mut source = String::new();
        for (part, separator) in parts.iter().zip(&separators) {
            source.push_str(part);
            source.push_str(separator);
        }

        let lexer = Lexer::new();
        let tokens = lexer.tokenize(&source).unwrap();

        let rebuilt: String = tokens.iter().map(|t| t.text.as_str()).collect();
        let expected: String = parts.concat();
        prop_assert_eq!(rebuilt, expected);

        // `::` is the only fragment that lexes to more than one token.
        let expected_count = parts.iter().map(|p| if *p == "::" { 2 } else { 1 }).sum::<usize>();
        prop_assert_eq!(tokens.len(), expected_count);
    }
}

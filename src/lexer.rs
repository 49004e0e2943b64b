use std::fmt;

use log::{debug, trace};
use serde::{Deserialize, Serialize};

pub const KEYWORDS: [&str; 6] = ["if", "else", "while", "then", "do", "end"];

// Longest first: `<=` must never scan as `<` followed by `=`.
pub const OPERATORS: [&str; 9] = ["==", "!=", "<=", ">=", "+", "-", "=", "<", ">"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenKind {
    Keyword,
    Number,
    Identifier,
    String,
    Operator,
    Unknown,
}

impl TokenKind {
    pub const ALL: [TokenKind; 6] = [
        TokenKind::Keyword,
        TokenKind::Number,
        TokenKind::Identifier,
        TokenKind::String,
        TokenKind::Operator,
        TokenKind::Unknown,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            TokenKind::Keyword => "keyword",
            TokenKind::Number => "number",
            TokenKind::Identifier => "identifier",
            TokenKind::String => "string",
            TokenKind::Operator => "operator",
            TokenKind::Unknown => "unknown",
        }
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.name())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Token {
    pub kind: TokenKind,
    pub lexeme: String,
}

impl Token {
    pub fn new(kind: TokenKind, lexeme: impl Into<String>) -> Self {
        Self {
            kind,
            lexeme: lexeme.into(),
        }
    }
}

/// One piece of the scanned input. Whitespace runs only show up here;
/// [`Lexer::tokenize`] drops them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lexeme<'a> {
    Whitespace(&'a str),
    Token(TokenKind, &'a str),
}

impl<'a> Lexeme<'a> {
    pub fn text(&self) -> &'a str {
        match self {
            Lexeme::Whitespace(text) | Lexeme::Token(_, text) => text,
        }
    }
}

/// Scanning position over a borrowed source. `pos` is a byte offset and
/// always sits on a char boundary.
#[derive(Debug, Clone)]
pub struct Cursor<'a> {
    source: &'a str,
    pos: usize,
}

impl<'a> Cursor<'a> {
    pub fn new(source: &'a str) -> Self {
        Self { source, pos: 0 }
    }

    pub fn pos(&self) -> usize {
        self.pos
    }

    pub fn is_eof(&self) -> bool {
        self.pos >= self.source.len()
    }

    pub fn rest(&self) -> &'a str {
        &self.source[self.pos..]
    }

    pub fn peek(&self) -> Option<char> {
        self.rest().chars().next()
    }

    pub fn advance(&mut self) -> Option<char> {
        let ch = self.peek()?;
        self.pos += ch.len_utf8();
        Some(ch)
    }

    pub fn eat_while(&mut self, mut predicate: impl FnMut(char) -> bool) {
        while let Some(ch) = self.peek() {
            if !predicate(ch) {
                break;
            }
            self.pos += ch.len_utf8();
        }
    }

    /// Consumes `expected` if the input continues with it.
    pub fn eat_str(&mut self, expected: &str) -> bool {
        if self.rest().starts_with(expected) {
            self.pos += expected.len();
            true
        } else {
            false
        }
    }

    pub fn slice_from(&self, start: usize) -> &'a str {
        &self.source[start..self.pos]
    }
}

pub struct Lexer<'a> {
    cursor: Cursor<'a>,
}

impl<'a> Lexer<'a> {
    pub fn new(input: &'a str) -> Self {
        Self {
            cursor: Cursor::new(input),
        }
    }

    /// All tokens of the input in order, whitespace discarded.
    pub fn tokenize(&mut self) -> Vec<Token> {
        debug!("Starting tokenization");
        let mut tokens = Vec::new();
        while let Some(lexeme) = self.next_lexeme() {
            if let Lexeme::Token(kind, text) = lexeme {
                tokens.push(Token::new(kind, text));
            }
        }
        debug!("Tokenization complete. Total tokens: {}", tokens.len());
        tokens
    }

    /// Every piece of the input, whitespace included. Concatenating the
    /// texts gives back the input.
    pub fn lexemes(&mut self) -> Vec<Lexeme<'a>> {
        self.by_ref().collect()
    }

    fn next_lexeme(&mut self) -> Option<Lexeme<'a>> {
        if self.cursor.is_eof() {
            return None;
        }
        let ch = self.cursor.peek()?;
        let start = self.cursor.pos();

        let lexeme = if ch.is_whitespace() {
            self.cursor.eat_while(char::is_whitespace);
            Lexeme::Whitespace(self.cursor.slice_from(start))
        } else if ch.is_alphabetic() || ch == '_' {
            self.read_id_or_kwd(start)
        } else if ch.is_ascii_digit() {
            self.read_number(start)
        } else if ch == '"' {
            self.read_string(start)
        } else if let Some(op) = self.read_operator() {
            Lexeme::Token(TokenKind::Operator, op)
        } else {
            self.cursor.advance();
            Lexeme::Token(TokenKind::Unknown, self.cursor.slice_from(start))
        };

        trace!("Scanned {:?} at byte {}", lexeme, start);
        Some(lexeme)
    }

    fn read_id_or_kwd(&mut self, start: usize) -> Lexeme<'a> {
        self.cursor.eat_while(|ch| ch.is_alphanumeric() || ch == '_');
        let word = self.cursor.slice_from(start);
        if KEYWORDS.contains(&word) {
            Lexeme::Token(TokenKind::Keyword, word)
        } else {
            Lexeme::Token(TokenKind::Identifier, word)
        }
    }

    fn read_number(&mut self, start: usize) -> Lexeme<'a> {
        self.cursor.eat_while(|ch| ch.is_ascii_digit());
        Lexeme::Token(TokenKind::Number, self.cursor.slice_from(start))
    }

    // An unterminated string runs to the end of input and is still a string.
    fn read_string(&mut self, start: usize) -> Lexeme<'a> {
        self.cursor.advance();
        self.cursor.eat_while(|ch| ch != '"');
        self.cursor.eat_str("\"");
        Lexeme::Token(TokenKind::String, self.cursor.slice_from(start))
    }

    fn read_operator(&mut self) -> Option<&'a str> {
        let start = self.cursor.pos();
        OPERATORS
            .iter()
            .find(|op| self.cursor.eat_str(op))
            .map(|_| self.cursor.slice_from(start))
    }
}

impl<'a> Iterator for Lexer<'a> {
    type Item = Lexeme<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_lexeme()
    }
}

/// Tokenizes `source`. Never fails: anything unrecognized becomes a
/// [`TokenKind::Unknown`] token.
pub fn scan(source: &str) -> Vec<Token> {
    Lexer::new(source).tokenize()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(source: &str) -> Vec<(TokenKind, String)> {
        scan(source)
            .into_iter()
            .map(|t| (t.kind, t.lexeme))
            .collect()
    }

    fn tok(kind: TokenKind, lexeme: &str) -> (TokenKind, String) {
        (kind, lexeme.to_string())
    }

    #[test]
    fn scans_simple_assignment() {
        assert_eq!(
            kinds("x = 5"),
            vec![
                tok(TokenKind::Identifier, "x"),
                tok(TokenKind::Operator, "="),
                tok(TokenKind::Number, "5"),
            ]
        );
    }

    #[test]
    fn keywords_need_an_exact_match() {
        assert_eq!(kinds("if"), vec![tok(TokenKind::Keyword, "if")]);
        assert_eq!(kinds("iffy"), vec![tok(TokenKind::Identifier, "iffy")]);
        assert_eq!(kinds("End"), vec![tok(TokenKind::Identifier, "End")]);
        for word in KEYWORDS {
            assert_eq!(kinds(word), vec![tok(TokenKind::Keyword, word)]);
        }
    }

    #[test]
    fn identifiers_take_underscores_and_digits() {
        assert_eq!(
            kinds("_tmp1 x_2"),
            vec![
                tok(TokenKind::Identifier, "_tmp1"),
                tok(TokenKind::Identifier, "x_2"),
            ]
        );
    }

    #[test]
    fn number_stops_at_first_non_digit() {
        assert_eq!(
            kinds("3abc 4.5"),
            vec![
                tok(TokenKind::Number, "3"),
                tok(TokenKind::Identifier, "abc"),
                tok(TokenKind::Number, "4"),
                tok(TokenKind::Unknown, "."),
                tok(TokenKind::Number, "5"),
            ]
        );
    }

    #[test]
    fn operators_are_matched_greedily() {
        assert_eq!(kinds(">="), vec![tok(TokenKind::Operator, ">=")]);
        assert_eq!(
            kinds("a!=b"),
            vec![
                tok(TokenKind::Identifier, "a"),
                tok(TokenKind::Operator, "!="),
                tok(TokenKind::Identifier, "b"),
            ]
        );
        assert_eq!(
            kinds("==="),
            vec![tok(TokenKind::Operator, "=="), tok(TokenKind::Operator, "=")]
        );
        assert_eq!(
            kinds("=<"),
            vec![tok(TokenKind::Operator, "="), tok(TokenKind::Operator, "<")]
        );
    }

    #[test]
    fn lone_bang_is_unknown() {
        assert_eq!(
            kinds("!x"),
            vec![tok(TokenKind::Unknown, "!"), tok(TokenKind::Identifier, "x")]
        );
    }

    #[test]
    fn strings_keep_their_quotes() {
        assert_eq!(
            kinds("s = \"a b\" t"),
            vec![
                tok(TokenKind::Identifier, "s"),
                tok(TokenKind::Operator, "="),
                tok(TokenKind::String, "\"a b\""),
                tok(TokenKind::Identifier, "t"),
            ]
        );
    }

    #[test]
    fn unterminated_string_runs_to_end() {
        assert_eq!(
            kinds("x = \"abc"),
            vec![
                tok(TokenKind::Identifier, "x"),
                tok(TokenKind::Operator, "="),
                tok(TokenKind::String, "\"abc"),
            ]
        );
        assert_eq!(kinds("\""), vec![tok(TokenKind::String, "\"")]);
    }

    #[test]
    fn unknown_characters_are_single_tokens() {
        assert_eq!(
            kinds("x = $"),
            vec![
                tok(TokenKind::Identifier, "x"),
                tok(TokenKind::Operator, "="),
                tok(TokenKind::Unknown, "$"),
            ]
        );
        assert_eq!(
            kinds("(€)"),
            vec![
                tok(TokenKind::Unknown, "("),
                tok(TokenKind::Unknown, "€"),
                tok(TokenKind::Unknown, ")"),
            ]
        );
    }

    #[test]
    fn non_ascii_letters_form_identifiers() {
        assert_eq!(
            kinds("größe = \"日本\""),
            vec![
                tok(TokenKind::Identifier, "größe"),
                tok(TokenKind::Operator, "="),
                tok(TokenKind::String, "\"日本\""),
            ]
        );
    }

    #[test]
    fn empty_and_blank_input() {
        assert!(scan("").is_empty());
        assert!(scan(" \t\r\n  ").is_empty());
        assert_eq!(
            Lexer::new(" \t\r\n  ").lexemes(),
            vec![Lexeme::Whitespace(" \t\r\n  ")]
        );
    }

    #[test]
    fn lexemes_cover_the_input() {
        let source = "while  i <= 10 do\n\ti = i + 1 # \"x\nend ";
        let rebuilt: String = Lexer::new(source).lexemes().iter().map(|l| l.text()).collect();
        assert_eq!(rebuilt, source);
    }

    #[test]
    fn cursor_stays_on_char_boundaries() {
        let mut cursor = Cursor::new("é=");
        assert_eq!(cursor.advance(), Some('é'));
        assert_eq!(cursor.pos(), 2);
        assert!(cursor.eat_str("="));
        assert!(cursor.is_eof());
        assert_eq!(cursor.advance(), None);
    }

    #[test]
    fn kind_names_match_serde() {
        for kind in TokenKind::ALL {
            let json = serde_json::to_string(&kind).unwrap();
            assert_eq!(json, format!("\"{}\"", kind.name()));
        }
    }
}

use std::fmt;

use log::{debug, trace};

use crate::lexer::{Token, TokenKind};

/// What the checker was looking for when it gave up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Expected {
    Kind(TokenKind),
    Literal(TokenKind, &'static str),
    /// A number, identifier or string.
    Primary,
    /// A primary following the given binary operator.
    OperandAfter(String),
}

impl Expected {
    fn matches(&self, token: &Token) -> bool {
        match self {
            Expected::Kind(kind) => token.kind == *kind,
            Expected::Literal(kind, value) => token.kind == *kind && token.lexeme == *value,
            Expected::Primary | Expected::OperandAfter(_) => is_primary(token.kind),
        }
    }
}

impl fmt::Display for Expected {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expected::Kind(kind) => write!(f, "{}", kind),
            Expected::Literal(_, value) => write!(f, "'{}'", value),
            Expected::Primary => write!(f, "number, identifier or string"),
            Expected::OperandAfter(op) => write!(f, "number, identifier or string after '{}'", op),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyntaxError {
    UnexpectedToken {
        expected: Expected,
        /// `None` when the token sequence ran out.
        found: Option<Token>,
    },
    UnexpectedKeyword {
        keyword: String,
    },
}

impl fmt::Display for SyntaxError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SyntaxError::UnexpectedToken { expected, found: Some(token) } => {
                write!(f, "expected {}, found {} '{}'", expected, token.kind, token.lexeme)
            }
            SyntaxError::UnexpectedToken { expected, found: None } => {
                write!(f, "expected {}, found end of input", expected)
            }
            SyntaxError::UnexpectedKeyword { keyword } => {
                write!(f, "unexpected keyword '{}'", keyword)
            }
        }
    }
}

impl std::error::Error for SyntaxError {}

fn is_primary(kind: TokenKind) -> bool {
    match kind {
        TokenKind::Number | TokenKind::Identifier | TokenKind::String => true,
        TokenKind::Keyword | TokenKind::Operator | TokenKind::Unknown => false,
    }
}

/// Recursive-descent checker over a borrowed token sequence with a single
/// lookahead. Every rule stops at the first mismatch.
pub struct Parser<'t> {
    tokens: &'t [Token],
    pos: usize,
}

impl<'t> Parser<'t> {
    pub fn new(tokens: &'t [Token]) -> Self {
        Parser { tokens, pos: 0 }
    }

    fn current_token(&self) -> Option<&'t Token> {
        self.tokens.get(self.pos)
    }

    fn is_at_end(&self) -> bool {
        self.pos >= self.tokens.len()
    }

    /// Checks the lookahead against `expected`, advancing past it on a match.
    pub fn consume(&mut self, expected: Expected) -> Result<&'t str, SyntaxError> {
        match self.current_token() {
            Some(token) if expected.matches(token) => {
                trace!("Consumed {} '{}'", token.kind, token.lexeme);
                self.pos += 1;
                Ok(token.lexeme.as_str())
            }
            found => Err(SyntaxError::UnexpectedToken {
                expected,
                found: found.cloned(),
            }),
        }
    }

    fn expect_keyword(&mut self, word: &'static str) -> Result<&'t str, SyntaxError> {
        self.consume(Expected::Literal(TokenKind::Keyword, word))
    }

    /// Statements until the input runs out. Open `if`/`while` blocks are kept
    /// on a stack of pending terminators, so nesting depth costs heap, not
    /// call stack.
    pub fn parse_program(&mut self) -> Result<(), SyntaxError> {
        let mut open_blocks: Vec<&'static str> = Vec::new();
        loop {
            match (open_blocks.last(), self.current_token()) {
                (None, None) => return Ok(()),
                (Some(&terminator), token) if token.map_or(true, |t| t.lexeme == terminator) => {
                    self.expect_keyword(terminator)?;
                    open_blocks.pop();
                    continue;
                }
                _ => {}
            }
            if let Some(terminator) = self.parse_statement()? {
                open_blocks.push(terminator);
            }
        }
    }

    /// Parses one statement. For `if`/`while` only the header is consumed and
    /// the keyword that closes the body is returned.
    fn parse_statement(&mut self) -> Result<Option<&'static str>, SyntaxError> {
        let Some(token) = self.current_token() else {
            return self.parse_assignment().map(|()| None);
        };
        match token.kind {
            TokenKind::Keyword => match token.lexeme.as_str() {
                "if" => self.parse_if().map(Some),
                "while" => self.parse_while().map(Some),
                _ => Err(SyntaxError::UnexpectedKeyword {
                    keyword: token.lexeme.clone(),
                }),
            },
            TokenKind::Identifier
            | TokenKind::Number
            | TokenKind::String
            | TokenKind::Operator
            | TokenKind::Unknown => self.parse_assignment().map(|()| None),
        }
    }

    fn parse_if(&mut self) -> Result<&'static str, SyntaxError> {
        self.expect_keyword("if")?;
        self.parse_expression()?;
        self.expect_keyword("then")?;
        Ok("end")
    }

    fn parse_while(&mut self) -> Result<&'static str, SyntaxError> {
        self.expect_keyword("while")?;
        self.parse_expression()?;
        self.expect_keyword("do")?;
        Ok("end")
    }

    fn parse_assignment(&mut self) -> Result<(), SyntaxError> {
        self.consume(Expected::Kind(TokenKind::Identifier))?;
        self.consume(Expected::Literal(TokenKind::Operator, "="))?;
        self.parse_expression()
    }

    /// `primary (Operator primary)?`. A second operator is left for the
    /// caller to trip over.
    pub fn parse_expression(&mut self) -> Result<(), SyntaxError> {
        self.consume(Expected::Primary)?;
        if matches!(self.current_token(), Some(token) if token.kind == TokenKind::Operator) {
            let op = self.consume(Expected::Kind(TokenKind::Operator))?;
            self.consume(Expected::OperandAfter(op.to_string()))?;
        }
        Ok(())
    }
}

/// Checks a whole token sequence as a program.
pub fn check(tokens: &[Token]) -> Result<(), SyntaxError> {
    debug!("Checking {} token(s)", tokens.len());
    let result = Parser::new(tokens).parse_program();
    if let Err(e) = &result {
        debug!("Syntax check failed: {}", e);
    }
    result
}

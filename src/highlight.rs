use colored::{Color, Colorize};
use log::trace;
use serde::{Deserialize, Serialize};

use crate::lexer::{scan, Token, TokenKind};
use crate::parser::check;

pub const TITLE: &str = "Real-Time Syntax Highlighter";

/// Byte range of one token inside the analyzed text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Span {
    pub start: usize,
    pub end: usize,
    pub kind: TokenKind,
}

/// Result of one editor refresh: where to paint and whether the buffer is a
/// valid program.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Highlight {
    /// The analyzed buffer, trimmed. Span offsets point into this.
    pub text: String,
    pub spans: Vec<Span>,
    pub valid: bool,
    pub error: Option<String>,
}

impl Highlight {
    pub fn analyze(buffer: &str) -> Self {
        let text = buffer.trim();
        let tokens = scan(text);
        let spans = locate_spans(text, &tokens);
        let error = check(&tokens).err().map(|e| e.to_string());
        Highlight {
            text: text.to_string(),
            spans,
            valid: error.is_none(),
            error,
        }
    }

    pub fn status(&self) -> &'static str {
        status_line(self.valid)
    }

    pub fn title(&self) -> String {
        format!("{} - {}", TITLE, self.status())
    }

    pub fn render(&self, palette: &Palette) -> String {
        render(&self.text, &self.spans, palette)
    }
}

pub fn status_line(valid: bool) -> &'static str {
    if valid {
        "Valid Syntax"
    } else {
        "Invalid Syntax"
    }
}

/// Finds each token's lexeme in `text`, searching forward from the end of the
/// previous hit. A token whose lexeme is not found gets no span and does not
/// move the search position.
pub fn locate_spans(text: &str, tokens: &[Token]) -> Vec<Span> {
    let mut spans = Vec::with_capacity(tokens.len());
    let mut cursor = 0;
    for token in tokens {
        match text[cursor..].find(token.lexeme.as_str()) {
            Some(offset) => {
                let start = cursor + offset;
                let end = start + token.lexeme.len();
                spans.push(Span {
                    start,
                    end,
                    kind: token.kind,
                });
                cursor = end;
            }
            None => trace!("No span for '{}' after byte {}", token.lexeme, cursor),
        }
    }
    spans
}

/// Foreground color per token kind. `None` leaves the text uncolored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Palette {
    pub keyword: Option<Color>,
    pub number: Option<Color>,
    pub identifier: Option<Color>,
    pub string: Option<Color>,
    pub operator: Option<Color>,
    pub unknown: Option<Color>,
}

impl Default for Palette {
    fn default() -> Self {
        Palette {
            keyword: Some(Color::Blue),
            number: Some(Color::Green),
            identifier: None,
            string: Some(Color::Magenta),
            operator: Some(Color::Red),
            unknown: Some(Color::TrueColor {
                r: 255,
                g: 165,
                b: 0,
            }),
        }
    }
}

impl Palette {
    pub fn plain() -> Self {
        Palette {
            keyword: None,
            number: None,
            identifier: None,
            string: None,
            operator: None,
            unknown: None,
        }
    }

    pub fn color_for(&self, kind: TokenKind) -> Option<Color> {
        match kind {
            TokenKind::Keyword => self.keyword,
            TokenKind::Number => self.number,
            TokenKind::Identifier => self.identifier,
            TokenKind::String => self.string,
            TokenKind::Operator => self.operator,
            TokenKind::Unknown => self.unknown,
        }
    }
}

/// Paints `spans` over `text`. Text between spans is copied unchanged.
pub fn render(text: &str, spans: &[Span], palette: &Palette) -> String {
    let mut out = String::with_capacity(text.len());
    let mut last = 0;
    for span in spans {
        out.push_str(&text[last..span.start]);
        let piece = &text[span.start..span.end];
        match palette.color_for(span.kind) {
            Some(color) => out.push_str(&piece.color(color).to_string()),
            None => out.push_str(piece),
        }
        last = span.end;
    }
    out.push_str(&text[last..]);
    out
}
